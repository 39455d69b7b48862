//! Desktop window for the memorial board.

mod image_loader;
mod style;

pub use image_loader::{ImageLoader, ImageLoaderError};

use crate::style::Palette;
use auth::AdminGate;
use gallery::state::{AdminOutcome, ClickAction, GalleryState};
use gallery::{
    BulkDeleteReport, Gallery, LoadedGallery, MediaRecord, MediaType, PruneOutcome, ReconcileReport,
    UploadProgress, UploadReport,
};
use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, image, mouse_area, progress_bar, row, scrollable, text, text_input, Column,
    Row, Space,
};
use iced::{
    executor, keyboard, subscription, theme, Alignment, Application, Command, ContentFit, Element, Length,
    Settings, Subscription, Theme,
};
use rfd::AsyncFileDialog;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};

const NOTICE_DISPLAY_DURATION: Duration = Duration::from_secs(6);
const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "heic", "bmp", "mp4", "mov", "avi", "mkv", "webm", "m4v", "3gp", "flv",
];

pub struct UiFlags {
    pub gallery: Arc<Gallery>,
    pub admin_gate: Option<AdminGate>,
    pub cache_dir: PathBuf,
    pub image_workers: usize,
}

#[cfg_attr(feature = "trace-spans", tracing::instrument(skip(flags)))]
pub fn run(flags: UiFlags) -> iced::Result {
    MemorialBoard::run(Settings::with_flags(flags))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    AdminSecret { input: String },
    ConfirmDelete(MediaRecord),
    ConfirmBulkDelete(usize),
    ConfirmSync,
}

#[derive(Debug, Clone)]
pub enum Message {
    LoadGallery,
    GalleryLoaded(Result<LoadedGallery, String>),
    PreviewLoaded(String, Result<Handle, ImageLoaderError>),
    ViewerImageLoaded(String, Result<Handle, ImageLoaderError>),
    Pruned(String, Result<PruneOutcome, String>),
    ToggleSort,
    ShowSortMenu,
    SortMenuTimer(u64),
    PickFiles,
    FilesPicked(Vec<PathBuf>),
    StartUpload,
    UploadProgress(UploadProgress),
    UploadFinished(Result<UploadReport, String>),
    AdminButton,
    SecretChanged(String),
    SubmitSecret,
    CancelDialog,
    ConfirmDialog,
    ToggleBulk,
    SelectAll,
    DeselectAll,
    BulkDeleteRequested,
    BulkDeleted(Result<BulkDeleteReport, String>),
    ItemClicked(String),
    Deleted(String, Result<(), String>),
    SyncRequested,
    Synced(Result<ReconcileReport, String>),
    CloseViewer,
    OpenInPlayer(String),
    EscapePressed,
    DismissNotice(u64),
    NoticeExpired(u64),
    Noop,
}

pub struct MemorialBoard {
    gallery: Arc<Gallery>,
    admin_gate: Option<AdminGate>,
    state: GalleryState,
    dialog: Option<Dialog>,
    image_loader: ImageLoader,
    previews: HashMap<String, Handle>,
    full_images: HashMap<String, Handle>,
    progress_receiver: Option<Arc<Mutex<mpsc::UnboundedReceiver<UploadProgress>>>>,
}

impl MemorialBoard {
    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }

    fn notice(&mut self, msg: impl Into<String>) -> Command<Message> {
        let id = self.state.notify(msg);
        Self::notice_timeout(id)
    }

    fn notice_timeout(id: u64) -> Command<Message> {
        Command::perform(
            async {
                sleep(NOTICE_DISPLAY_DURATION).await;
            },
            move |_| Message::NoticeExpired(id),
        )
    }

    fn sort_menu_timer(generation: u64, delay: Duration) -> Command<Message> {
        Command::perform(
            async move {
                sleep(delay).await;
            },
            move |_| Message::SortMenuTimer(generation),
        )
    }

    fn reload() -> Command<Message> {
        Command::perform(async {}, |_| Message::LoadGallery)
    }

    fn load_preview(&self, record: &MediaRecord) -> Option<Command<Message>> {
        if self.previews.contains_key(&record.id) {
            return None;
        }
        let url = record.preview_url()?.to_string();
        let loader = self.image_loader.clone();
        let id = record.id.clone();
        Some(Command::perform(
            async move { loader.load(&url).await },
            move |res| Message::PreviewLoaded(id, res),
        ))
    }

    fn load_viewer_image(&self, record: &MediaRecord) -> Command<Message> {
        if record.media_type.is_video() || self.full_images.contains_key(&record.id) {
            return Command::none();
        }
        let loader = self.image_loader.clone();
        let url = record.media_url.clone();
        let id = record.id.clone();
        Command::perform(
            async move { loader.load(&url).await },
            move |res| Message::ViewerImageLoaded(id, res),
        )
    }

    fn submit_secret(&mut self) -> Command<Message> {
        let Some(Dialog::AdminSecret { input }) = self.dialog.take() else {
            return Command::none();
        };
        let outcome = self.state.toggle_admin(self.admin_gate.as_ref(), Some(&input));
        match outcome {
            AdminOutcome::Enabled => tracing::info!("Admin mode enabled"),
            AdminOutcome::Disabled => tracing::info!("Admin mode disabled"),
            AdminOutcome::Cancelled => return Command::none(),
            AdminOutcome::IncorrectSecret | AdminOutcome::Unavailable => {}
        }
        match self.state.latest_notice_id() {
            Some(id) => Self::notice_timeout(id),
            None => Command::none(),
        }
    }

    fn confirm_dialog(&mut self) -> Command<Message> {
        let gallery = self.gallery.clone();
        match self.dialog.take() {
            Some(Dialog::ConfirmDelete(record)) => {
                let id = record.id.clone();
                Command::perform(
                    async move { gallery.delete_record(&record).await.map_err(|e| e.to_string()) },
                    move |res| Message::Deleted(id, res),
                )
            }
            Some(Dialog::ConfirmBulkDelete(_)) => {
                let selection = self.state.selected_in_display_order();
                Command::perform(
                    async move { gallery.bulk_delete(&selection).await.map_err(|e| e.to_string()) },
                    Message::BulkDeleted,
                )
            }
            Some(Dialog::ConfirmSync) => Command::perform(
                async move { gallery.reconcile().await.map_err(|e| e.to_string()) },
                Message::Synced,
            ),
            Some(dialog @ Dialog::AdminSecret { .. }) => {
                self.dialog = Some(dialog);
                self.submit_secret()
            }
            None => Command::none(),
        }
    }
}

impl Application for MemorialBoard {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = UiFlags;

    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let mut state = GalleryState::new();
        state.loading = true;
        let (generation, delay) = state.sort_menu.start();

        let app = Self {
            gallery: flags.gallery,
            admin_gate: flags.admin_gate,
            state,
            dialog: None,
            image_loader: ImageLoader::new(flags.cache_dir, flags.image_workers),
            previews: HashMap::new(),
            full_images: HashMap::new(),
            progress_receiver: None,
        };

        (
            app,
            Command::batch(vec![Self::reload(), Self::sort_menu_timer(generation, delay)]),
        )
    }

    fn title(&self) -> String {
        String::from("In Loving Memory")
    }

    fn theme(&self) -> Theme {
        Theme::Light
    }

    #[cfg_attr(feature = "trace-spans", tracing::instrument(skip(self)))]
    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::LoadGallery => {
                self.state.loading = true;
                let gallery = self.gallery.clone();
                let mode = self.state.sort_mode;
                return Command::perform(
                    async move { gallery.load(mode).await.map_err(|e| e.to_string()) },
                    Message::GalleryLoaded,
                );
            }
            Message::GalleryLoaded(Ok(loaded)) => {
                self.state.set_loaded(loaded);
                let commands: Vec<Command<Message>> = self
                    .state
                    .records
                    .iter()
                    .filter_map(|record| self.load_preview(record))
                    .collect();
                return Command::batch(commands);
            }
            Message::GalleryLoaded(Err(error)) => {
                self.state.loading = false;
                tracing::error!(%error, "Failed to load gallery");
                return self.notice(format!("Failed to load gallery: {}", error));
            }
            Message::PreviewLoaded(id, Ok(handle)) => {
                self.previews.insert(id, handle);
            }
            Message::PreviewLoaded(id, Err(error)) => {
                if !error.is_missing() {
                    tracing::warn!(id = %id, %error, "Preview unavailable, keeping record");
                    return Command::none();
                }
                tracing::warn!(id = %id, %error, "Preview media is missing");
                let broken = self
                    .state
                    .records
                    .iter()
                    .find(|r| r.id == id && r.media_type == MediaType::Image)
                    .cloned();
                if let Some(record) = broken {
                    let gallery = self.gallery.clone();
                    return Command::perform(
                        async move { gallery.prune_broken(&record).await.map_err(|e| e.to_string()) },
                        move |res| Message::Pruned(id, res),
                    );
                }
            }
            Message::Pruned(id, result) => match result {
                Ok(PruneOutcome::Removed) => {
                    self.state.remove_record(&id);
                    self.previews.remove(&id);
                }
                Ok(_) => {}
                Err(error) => tracing::warn!(id = %id, %error, "Failed to prune broken record"),
            },
            Message::ViewerImageLoaded(id, result) => match result {
                Ok(handle) => {
                    self.full_images.insert(id, handle);
                }
                Err(error) => tracing::warn!(id = %id, %error, "Failed to load full image"),
            },
            Message::ToggleSort => {
                let mode = self.state.sort_mode.toggled();
                self.state.set_sort_mode(mode, &mut rand::rng());
                let (generation, delay) = self.state.sort_menu.interact();
                return Self::sort_menu_timer(generation, delay);
            }
            Message::ShowSortMenu => {
                let (generation, delay) = self.state.sort_menu.interact();
                return Self::sort_menu_timer(generation, delay);
            }
            Message::SortMenuTimer(generation) => {
                self.state.sort_menu.expire(generation);
            }
            Message::PickFiles => {
                return Command::perform(
                    async {
                        AsyncFileDialog::new()
                            .add_filter("Photos and videos", MEDIA_EXTENSIONS)
                            .pick_files()
                            .await
                            .map(|files| files.iter().map(|f| f.path().to_path_buf()).collect())
                            .unwrap_or_default()
                    },
                    Message::FilesPicked,
                );
            }
            Message::FilesPicked(paths) => {
                if !paths.is_empty() && !self.state.upload.uploading {
                    self.state.upload.select_files(paths);
                }
            }
            Message::StartUpload => match self.state.upload.begin() {
                Ok(paths) => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    self.progress_receiver = Some(Arc::new(Mutex::new(rx)));
                    let gallery = self.gallery.clone();
                    return Command::perform(
                        async move {
                            gallery
                                .upload_files(&paths, Some(tx))
                                .await
                                .map_err(|e| e.to_string())
                        },
                        Message::UploadFinished,
                    );
                }
                Err(e) => return self.notice(e.to_string()),
            },
            Message::UploadProgress(update) => {
                self.state.upload.record_progress(update);
            }
            Message::UploadFinished(result) => {
                self.progress_receiver = None;
                match result {
                    Ok(report) => {
                        let mut commands = vec![Self::reload()];
                        if let Some(error) = &report.batch_error {
                            commands.push(self.notice(format!("Uploaded files could not be recorded: {}", error)));
                        } else if report.failed() > 0 {
                            commands.push(self.notice(format!("{} file(s) failed to upload", report.failed())));
                        }
                        self.state.upload.finish(report);
                        return Command::batch(commands);
                    }
                    Err(error) => {
                        self.state.upload.abort();
                        return self.notice(format!("Upload failed: {}", error));
                    }
                }
            }
            Message::AdminButton => {
                self.dialog = Some(Dialog::AdminSecret { input: String::new() });
            }
            Message::SecretChanged(value) => {
                if let Some(Dialog::AdminSecret { input }) = &mut self.dialog {
                    *input = value;
                }
            }
            Message::SubmitSecret => return self.submit_secret(),
            Message::CancelDialog => {
                self.dialog = None;
            }
            Message::ConfirmDialog => return self.confirm_dialog(),
            Message::ToggleBulk => {
                self.state.toggle_bulk();
            }
            Message::SelectAll => self.state.select_all(),
            Message::DeselectAll => self.state.deselect_all(),
            Message::BulkDeleteRequested => {
                if self.state.selected.is_empty() {
                    return self.notice("No items selected");
                }
                self.dialog = Some(Dialog::ConfirmBulkDelete(self.state.selected.len()));
            }
            Message::BulkDeleted(result) => match result {
                Ok(report) => {
                    self.state.finish_bulk_delete();
                    let notice = self.notice(format!(
                        "Deleted {} item(s), {} error(s)",
                        report.success_count(),
                        report.error_count()
                    ));
                    return Command::batch(vec![notice, Self::reload()]);
                }
                Err(error) => return self.notice(format!("Bulk delete failed: {}", error)),
            },
            Message::ItemClicked(id) => match self.state.click(&id) {
                ClickAction::OpenedViewer => {
                    if let Some(record) = self.state.viewer.clone() {
                        return self.load_viewer_image(&record);
                    }
                }
                ClickAction::ConfirmDelete(record) => {
                    self.dialog = Some(Dialog::ConfirmDelete(record));
                }
                ClickAction::Toggled { .. } | ClickAction::Ignored => {}
            },
            Message::Deleted(id, result) => match result {
                Ok(()) => {
                    self.state.remove_record(&id);
                    self.previews.remove(&id);
                    self.full_images.remove(&id);
                    return self.notice("Item deleted");
                }
                Err(error) => return self.notice(format!("Error deleting item: {}", error)),
            },
            Message::SyncRequested => {
                if self.state.admin_mode {
                    self.dialog = Some(Dialog::ConfirmSync);
                }
            }
            Message::Synced(result) => {
                let notice = match result {
                    Ok(report) => self.notice(format!(
                        "Sync complete: {} in storage, {} recorded, {} added, {} failed",
                        report.in_storage, report.recorded, report.added, report.failed
                    )),
                    Err(error) => self.notice(format!("Sync failed: {}", error)),
                };
                return Command::batch(vec![notice, Self::reload()]);
            }
            Message::CloseViewer => self.state.close_viewer(),
            Message::OpenInPlayer(url) => {
                if let Err(e) = webbrowser::open(&url) {
                    return self.notice(format!("Could not open video: {}", e));
                }
            }
            Message::EscapePressed => {
                if self.dialog.is_some() {
                    self.dialog = None;
                } else {
                    self.state.escape();
                }
            }
            Message::DismissNotice(id) | Message::NoticeExpired(id) => {
                self.state.dismiss_notice(id);
            }
            Message::Noop => {}
        }
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subs = vec![keyboard::on_key_press(|key, _modifiers| match key {
            keyboard::Key::Named(keyboard::key::Named::Escape) => Some(Message::EscapePressed),
            _ => None,
        })];

        if let Some(progress_rx) = &self.progress_receiver {
            let progress_rx = progress_rx.clone();
            subs.push(subscription::unfold(
                ("upload-progress", self.state.upload.generation),
                progress_rx,
                |rx| async move {
                    let next = {
                        let mut lock = rx.lock().await;
                        lock.recv().await
                    };
                    match next {
                        Some(update) => (Message::UploadProgress(update), rx),
                        None => {
                            // Sender dropped: the upload is over, stay idle until unsubscribed.
                            futures::future::pending::<()>().await;
                            (Message::Noop, rx)
                        }
                    }
                },
            ));
        }

        Subscription::batch(subs)
    }

    fn view(&self) -> Element<Message> {
        if let Some(dialog) = &self.dialog {
            return self.dialog_view(dialog);
        }
        if let Some(record) = &self.state.viewer {
            return self.viewer_view(record);
        }

        let content = column![
            self.header_view(),
            self.notices_view(),
            self.upload_view(),
            self.grid_view()
        ]
        .spacing(Palette::SPACING)
        .padding(20);

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

impl MemorialBoard {
    fn header_view(&self) -> Element<Message> {
        let mut bar = row![text("In Loving Memory").size(28)]
            .spacing(Palette::SPACING)
            .align_items(Alignment::Center);

        if self.state.sort_menu.is_visible() {
            let label = match self.state.sort_mode {
                gallery::SortMode::Random => "Sort: Random",
                gallery::SortMode::Date => "Sort: Date",
            };
            bar = bar.push(
                button(text(label))
                    .style(theme::Button::Secondary)
                    .on_press(Message::ToggleSort),
            );
        } else {
            bar = bar.push(
                button(text("⋯"))
                    .style(theme::Button::Text)
                    .on_press(Message::ShowSortMenu),
            );
        }

        bar = bar.push(Space::with_width(Length::Fill));

        if self.state.admin_mode {
            let bulk_label = if self.state.bulk_mode { "Cancel bulk" } else { "Bulk delete" };
            bar = bar
                .push(button(text(bulk_label)).style(theme::Button::Secondary).on_press(Message::ToggleBulk))
                .push(button(text("Sync storage")).style(theme::Button::Secondary).on_press(Message::SyncRequested));
        }
        if self.state.bulk_mode {
            bar = bar
                .push(button(text("Select all")).style(theme::Button::Secondary).on_press(Message::SelectAll))
                .push(button(text("Deselect all")).style(theme::Button::Secondary).on_press(Message::DeselectAll))
                .push(
                    button(text(format!("Delete selected ({})", self.state.selected.len())))
                        .style(theme::Button::Destructive)
                        .on_press(Message::BulkDeleteRequested),
                );
        }

        let admin_label = if self.state.admin_mode { "Exit admin" } else { "Admin" };
        bar = bar.push(
            button(text(admin_label))
                .style(theme::Button::Text)
                .on_press(Message::AdminButton),
        );
        bar.into()
    }

    fn notices_view(&self) -> Element<Message> {
        let mut notices = Column::new().spacing(4);
        for notice in &self.state.notices {
            notices = notices.push(
                container(
                    row![
                        text(&notice.text).width(Length::Fill),
                        button(text("✕"))
                            .style(theme::Button::Text)
                            .on_press(Message::DismissNotice(notice.id)),
                    ]
                    .align_items(Alignment::Center),
                )
                .padding(6)
                .style(style::notice_container_style()),
            );
        }
        notices.into()
    }

    fn upload_view(&self) -> Element<Message> {
        let panel = &self.state.upload;

        let mut choose = button(text("Choose files")).style(theme::Button::Secondary);
        if !panel.uploading {
            choose = choose.on_press(Message::PickFiles);
        }
        let mut upload = button(text(if panel.uploading { "Uploading..." } else { "Upload" }))
            .style(theme::Button::Primary);
        if panel.can_upload() {
            upload = upload.on_press(Message::StartUpload);
        }

        let mut body = column![
            text("Share a memory").size(20),
            row![choose, upload, text(format!("{} file(s) selected", panel.selection.len()))]
                .spacing(Palette::SPACING)
                .align_items(Alignment::Center),
        ]
        .spacing(8);

        for (name, percent) in &panel.progress {
            body = body.push(
                row![
                    text(name).width(Length::Fixed(240.0)),
                    progress_bar(0.0..=100.0, f32::from(*percent)).height(Length::Fixed(10.0)),
                    text(format!("{}%", percent)),
                ]
                .spacing(8)
                .align_items(Alignment::Center),
            );
        }

        for result in &panel.results {
            let line = match &result.error {
                None => text(format!("✓ {}", result.file_name)).style(Palette::SUCCESS),
                Some(error) => text(format!("✗ {}: {}", result.file_name, error)).style(Palette::ERROR),
            };
            body = body.push(line);
        }

        container(body).padding(12).width(Length::Fill).style(style::card()).into()
    }

    fn grid_view(&self) -> Element<Message> {
        if self.state.records.is_empty() {
            let label = if self.state.loading { "Loading..." } else { "No memories shared yet" };
            return text(label).style(Palette::MUTED).into();
        }

        let mut grid = Column::new().spacing(Palette::SPACING);
        for chunk in self.state.records.chunks(Palette::TILES_PER_ROW) {
            let mut tiles = Row::new().spacing(Palette::SPACING);
            for record in chunk {
                tiles = tiles.push(self.tile_view(record));
            }
            grid = grid.push(tiles);
        }
        grid.into()
    }

    fn tile_view<'a>(&'a self, record: &'a MediaRecord) -> Element<'a, Message> {
        let preview: Element<Message> = match self.previews.get(&record.id) {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Cover)
                .into(),
            None => container(text(if record.media_type.is_video() { "▶" } else { "..." }).size(32))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x()
                .center_y()
                .into(),
        };

        let selected = self.state.is_selected(&record.id);
        let mut body = column![preview].spacing(4);
        if record.media_type.is_video() {
            body = body.push(text("▶ Video").size(12));
        }
        if self.state.bulk_mode {
            body = body.push(text(if selected { "☑ Selected" } else { "☐" }).size(12));
        }

        let tile_style = if selected { style::selected_tile() } else { style::card() };
        mouse_area(
            container(body)
                .width(Length::Fixed(Palette::TILE_SIZE))
                .height(Length::Fixed(Palette::TILE_SIZE + 30.0))
                .padding(4)
                .style(tile_style),
        )
        .on_press(Message::ItemClicked(record.id.clone()))
        .into()
    }

    fn viewer_view<'a>(&'a self, record: &'a MediaRecord) -> Element<'a, Message> {
        let media: Element<Message> = match record.media_type {
            MediaType::Image => match self.full_images.get(&record.id).or_else(|| self.previews.get(&record.id)) {
                Some(handle) => image(handle.clone()).width(Length::Fill).height(Length::Fill).into(),
                None => text("Loading...").into(),
            },
            MediaType::Video => {
                let mut video = Column::new().spacing(8).align_items(Alignment::Center);
                if let Some(handle) = self.previews.get(&record.id) {
                    video = video.push(image(handle.clone()).width(Length::Fill));
                }
                video
                    .push(
                        button(text("▶ Play video"))
                            .style(theme::Button::Primary)
                            .on_press(Message::OpenInPlayer(record.media_url.clone())),
                    )
                    .into()
            }
        };

        let close = button(text("✕").size(20))
            .style(theme::Button::Text)
            .on_press(Message::CloseViewer);
        let content = column![
            row![Space::with_width(Length::Fill), close],
            media,
            text(&record.file_name),
        ]
        .spacing(8)
        .max_width(1100.0);

        // Clicks inside the content must not reach the backdrop.
        let inner = mouse_area(container(content).padding(16)).on_press(Message::Noop);

        mouse_area(
            container(inner)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x()
                .center_y()
                .style(style::backdrop()),
        )
        .on_press(Message::CloseViewer)
        .into()
    }

    fn dialog_view<'a>(&'a self, dialog: &'a Dialog) -> Element<'a, Message> {
        let cancel = button(text("Cancel"))
            .style(theme::Button::Secondary)
            .on_press(Message::CancelDialog);

        let body = match dialog {
            Dialog::AdminSecret { input } => column![
                text("Enter admin password"),
                text_input("Password", input)
                    .secure(true)
                    .on_input(Message::SecretChanged)
                    .on_submit(Message::SubmitSecret),
                row![
                    cancel,
                    button(text("OK")).style(theme::Button::Primary).on_press(Message::SubmitSecret)
                ]
                .spacing(8),
            ],
            Dialog::ConfirmDelete(record) => column![
                text(format!("Delete \"{}\"? This cannot be undone.", record.file_name)),
                row![
                    cancel,
                    button(text("Delete")).style(theme::Button::Destructive).on_press(Message::ConfirmDialog)
                ]
                .spacing(8),
            ],
            Dialog::ConfirmBulkDelete(count) => column![
                text(format!("Delete {} selected item(s)? This cannot be undone.", count)),
                row![
                    cancel,
                    button(text("Delete")).style(theme::Button::Destructive).on_press(Message::ConfirmDialog)
                ]
                .spacing(8),
            ],
            Dialog::ConfirmSync => column![
                text("Scan storage and add any missing items to the gallery?"),
                row![
                    cancel,
                    button(text("Sync")).style(theme::Button::Primary).on_press(Message::ConfirmDialog)
                ]
                .spacing(8),
            ],
        };

        container(
            container(body.spacing(12))
                .padding(20)
                .max_width(440.0)
                .style(style::card()),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x()
        .center_y()
        .style(style::backdrop())
        .into()
    }
}
