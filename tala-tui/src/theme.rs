//! Terra theme and color utilities.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct TerraTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl TerraTheme {
    pub fn terra() -> Self {
        Self {
            bg: Color::Rgb(16, 20, 16),
            bg_highlight: Color::Rgb(38, 48, 38),
            primary: Color::Rgb(110, 200, 120),
            primary_dim: Color::Rgb(60, 110, 66),
            secondary: Color::Rgb(210, 180, 100),
            success: Color::Rgb(120, 220, 120),
            warning: Color::Rgb(235, 200, 80),
            error: Color::Rgb(230, 90, 80),
            info: Color::Rgb(120, 180, 230),
            text: Color::Rgb(225, 230, 225),
            text_dim: Color::Rgb(140, 150, 140),
            text_muted: Color::Rgb(80, 90, 80),
            border: Color::Rgb(70, 80, 70),
            border_focus: Color::Rgb(110, 200, 120),
        }
    }
}

impl Default for TerraTheme {
    fn default() -> Self {
        Self::terra()
    }
}

pub fn notification_color(level: &NotificationLevel, theme: &TerraTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Color for a migrator cell: flagged cells show in the error color.
pub fn cell_color(flagged: bool, theme: &TerraTheme) -> Color {
    if flagged {
        theme.error
    } else {
        theme.text
    }
}
