use clap::{Parser, Subcommand};
use gallery::{Gallery, MediaRecord, SortMode, UploadProgress};
use std::path::PathBuf;
use storage::ObjectStore;
use tokio::sync::mpsc;
use tracing_appender::rolling;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

#[path = "../backend.rs"]
mod backend;
#[path = "../config.rs"]
mod config;

#[derive(Parser)]
#[command(
    name = "memorial_cli",
    author,
    version,
    about = "Memorial board maintenance CLI"
)]
struct Cli {
    /// Override log level (e.g. info, debug)
    #[arg(long)]
    log_level: Option<String>,
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Storage backend: local or firebase
    #[arg(long)]
    backend: Option<config::BackendKind>,
    /// Directory for local media, records and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload photos and videos
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List gallery items as `id - type - url`
    List {
        /// random or date
        #[arg(long, default_value = "random")]
        sort: SortMode,
        /// Maximum number of items to display
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show record and storage counts
    Status,
    /// Delete one item and its stored media
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Delete several items, continuing past failures
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<String>,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Record every stored media object that has no metadata
    Sync {
        /// Confirm the scan
        #[arg(long)]
        yes: bool,
    },
    /// Export metadata documents to a JSON file
    Export {
        #[arg(long)]
        file: PathBuf,
    },
    /// Import metadata documents from a JSON file
    Import {
        #[arg(long)]
        file: PathBuf,
    },
    /// Store the backend access token in the system keyring
    SetToken { token: String },
    /// Write the effective configuration to the config file
    SaveConfig,
}

fn require_confirmation(yes: bool, action: &str) -> Result<(), Box<dyn std::error::Error>> {
    if yes {
        Ok(())
    } else {
        Err(format!("Refusing to {} without --yes", action).into())
    }
}

/// Look up records by id, failing on the first unknown one.
async fn find_records(gallery: &Gallery, ids: &[String]) -> Result<Vec<MediaRecord>, Box<dyn std::error::Error>> {
    let loaded = gallery.load(SortMode::Date).await?;
    ids.iter()
        .map(|id| -> Result<MediaRecord, Box<dyn std::error::Error>> {
            loaded
                .records
                .iter()
                .find(|r| &r.id == id)
                .cloned()
                .ok_or_else(|| format!("No item with id {}", id).into())
        })
        .collect()
}

#[cfg_attr(feature = "trace-spans", tracing::instrument)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = config::AppConfigOverrides {
        log_level: cli.log_level.clone(),
        backend: cli.backend,
        data_dir: cli.data_dir.clone(),
    };
    let cfg = config::AppConfig::load_from(cli.config.clone()).apply_overrides(&overrides);
    std::fs::create_dir_all(&cfg.data_dir)?;
    let file_appender = rolling::daily(&cfg.data_dir, "memorial.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cfg.log_level.clone()))
        .with_writer(std::io::stderr.and(file_writer))
        .init();

    match &cli.command {
        Commands::SetToken { token } => {
            auth::store_access_token(token)?;
            println!("Access token stored");
            return Ok(());
        }
        Commands::SaveConfig => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            cfg.save_to(Some(path.clone()))?;
            println!("Configuration written to {}", path.display());
            return Ok(());
        }
        _ => {}
    }

    let gallery = backend::build_gallery(&cfg).await?;

    match cli.command {
        Commands::Upload { files } => {
            let (tx, mut rx) = mpsc::unbounded_channel::<UploadProgress>();
            let printer = tokio::spawn(async move {
                while let Some(p) = rx.recv().await {
                    println!("{}: {}%", p.file_name, p.percent);
                }
            });
            let report = gallery.upload_files(&files, Some(tx)).await?;
            let _ = printer.await;

            for result in &report.results {
                match &result.error {
                    None => println!("✓ {} ({})", result.file_name, result.media_type),
                    Some(e) => println!("✗ {}: {}", result.file_name, e),
                }
            }
            println!("Uploaded {} of {} file(s)", report.succeeded(), report.results.len());
            if let Some(e) = report.batch_error {
                return Err(format!("Uploaded files could not be recorded: {}", e).into());
            }
        }
        Commands::List { sort, limit } => {
            let loaded = gallery.load(sort).await?;
            let limit = limit.unwrap_or(loaded.records.len());
            for record in loaded.records.iter().take(limit) {
                println!("{} - {} - {}", record.id, record.media_type, record.media_url);
            }
        }
        Commands::Status => {
            let loaded = gallery.load(SortMode::Date).await?;
            let objects = gallery.objects().list(storage::keys::MEDIA_PREFIX).await?;
            println!("Backend: {}", cfg.backend);
            println!("Items: {}", loaded.records.len());
            println!("Skipped documents: {}", loaded.skipped);
            println!("Stored media objects: {}", objects.len());
        }
        Commands::Delete { id, yes } => {
            require_confirmation(yes, "delete")?;
            let records = find_records(&gallery, std::slice::from_ref(&id)).await?;
            for record in &records {
                gallery.delete_record(record).await?;
            }
            println!("Deleted {}", id);
        }
        Commands::BulkDelete { ids, yes } => {
            require_confirmation(yes, "delete")?;
            let records = find_records(&gallery, &ids).await?;
            let report = gallery.bulk_delete(&records).await?;
            for (id, error) in &report.failed {
                println!("✗ {}: {}", id, error);
            }
            println!(
                "Deleted {} item(s), {} error(s)",
                report.success_count(),
                report.error_count()
            );
        }
        Commands::Sync { yes } => {
            require_confirmation(yes, "sync")?;
            let report = gallery.reconcile().await?;
            println!(
                "Sync complete: {} in storage, {} recorded, {} added, {} failed",
                report.in_storage, report.recorded, report.added, report.failed
            );
        }
        Commands::Export { file } => {
            let count = gallery.export_records(&file).await?;
            println!("Exported {} record(s) to {}", count, file.display());
        }
        Commands::Import { file } => {
            let report = gallery.import_records(&file).await?;
            println!("Imported {} record(s), skipped {}", report.imported, report.skipped);
        }
        Commands::SetToken { .. } | Commands::SaveConfig => {}
    }

    Ok(())
}
