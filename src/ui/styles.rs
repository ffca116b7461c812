use ratatui::style::{Color, Modifier, Style};

use crate::config::Theme;

/// Theme-resolved color palette. Built once per frame from the active
/// theme preference.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub primary: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub muted: Color,
    pub text: Color,
    pub highlight_bg: Color,
    pub status_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                primary: Color::Rgb(96, 144, 224),
                accent: Color::Rgb(192, 160, 64),
                success: Color::Rgb(96, 176, 96),
                error: Color::Rgb(208, 80, 80),
                muted: Color::Rgb(128, 128, 128),
                text: Color::White,
                highlight_bg: Color::Rgb(48, 48, 64),
                status_bg: Color::Rgb(32, 32, 40),
            },
            Theme::Light => Self {
                primary: Color::Rgb(32, 80, 160),
                accent: Color::Rgb(144, 112, 16),
                success: Color::Rgb(32, 112, 32),
                error: Color::Rgb(160, 32, 32),
                muted: Color::Rgb(112, 112, 112),
                text: Color::Black,
                highlight_bg: Color::Rgb(208, 216, 232),
                status_bg: Color::Rgb(224, 224, 232),
            },
        }
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn list_item_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.primary)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn search_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.text)
    }

    pub fn help_key_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}
