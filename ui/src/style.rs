//! Colors and container styles for the memorial board.

use iced::theme;
use iced::widget::container;
use iced::{Border, Color, Shadow};

pub struct Palette;

impl Palette {
    pub const PRIMARY: Color = Color { r: 0.36, g: 0.29, b: 0.45, a: 1.0 };
    pub const SURFACE: Color = Color { r: 0.98, g: 0.97, b: 0.96, a: 1.0 };
    pub const ON_SURFACE: Color = Color { r: 0.15, g: 0.13, b: 0.12, a: 1.0 };
    pub const MUTED: Color = Color { r: 0.45, g: 0.43, b: 0.42, a: 1.0 };
    pub const ERROR: Color = Color { r: 0.75, g: 0.1, b: 0.1, a: 1.0 };
    pub const SUCCESS: Color = Color { r: 0.1, g: 0.5, b: 0.25, a: 1.0 };
    pub const BACKDROP: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.85 };

    pub const SPACING: u16 = 12;
    pub const TILE_SIZE: f32 = 180.0;
    pub const TILES_PER_ROW: usize = 5;
}

/// Container that looks like a card.
pub fn card() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &iced::Theme| container::Appearance {
        background: Some(Palette::SURFACE.into()),
        text_color: Some(Palette::ON_SURFACE),
        border: Border {
            color: Palette::MUTED,
            width: 1.0,
            radius: 6.0.into(),
        },
        shadow: Shadow::default(),
    }))
}

/// Highlighted tile in bulk mode.
pub fn selected_tile() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &iced::Theme| container::Appearance {
        background: Some(Color { a: 0.15, ..Palette::PRIMARY }.into()),
        text_color: Some(Palette::ON_SURFACE),
        border: Border {
            color: Palette::PRIMARY,
            width: 3.0,
            radius: 6.0.into(),
        },
        shadow: Shadow::default(),
    }))
}

pub fn backdrop() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &iced::Theme| container::Appearance {
        background: Some(Palette::BACKDROP.into()),
        text_color: Some(Color::WHITE),
        border: Border::default(),
        shadow: Shadow::default(),
    }))
}

pub fn notice_container_style() -> theme::Container {
    theme::Container::Custom(Box::new(|_theme: &iced::Theme| container::Appearance {
        text_color: Some(Palette::ON_SURFACE),
        background: Some(Color::from_rgb(1.0, 0.95, 0.88).into()),
        border: Border {
            color: Color::from_rgb(0.85, 0.6, 0.2),
            width: 1.0,
            radius: 2.0.into(),
        },
        shadow: Shadow::default(),
    }))
}
