//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

use crate::render::Rgba;

/// Dashboard palette.
pub struct Theme;

impl Theme {
    // Background colors
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;
    pub const SELECTED_BG: Color = Color::DarkGray;
    /// Backdrop behind pixel surfaces (slate-900).
    pub const CANVAS_BG: (u8, u8, u8) = (15, 23, 42);

    // Foreground colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;

    // Highlight colors
    pub const HIGHLIGHT_OK: Color = Color::Green;
    pub const HIGHLIGHT_WARN: Color = Color::Yellow;
    pub const HIGHLIGHT_CRITICAL: Color = Color::Red;

    // Tab colors
    pub const TAB_ACTIVE: Color = Color::Cyan;
    pub const TAB_INACTIVE: Color = Color::DarkGray;
}

/// Pixel colors for the rendered surfaces.
pub struct Palette;

impl Palette {
    pub fn track() -> Rgba {
        Rgba::from_hsl(217.0, 0.33, 0.17)
    }

    pub fn canvas() -> Rgba {
        let (r, g, b) = Theme::CANVAS_BG;
        Rgba::from_rgb8(r, g, b)
    }
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Header bar style.
    pub fn header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Selected row style.
    pub fn selected() -> Style {
        Style::default()
            .bg(Theme::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Table header style.
    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn ok() -> Style {
        Style::default().fg(Theme::HIGHLIGHT_OK)
    }

    pub fn warning() -> Style {
        Style::default().fg(Theme::HIGHLIGHT_WARN)
    }

    pub fn critical() -> Style {
        Style::default()
            .fg(Theme::HIGHLIGHT_CRITICAL)
            .add_modifier(Modifier::BOLD)
    }

    /// Active tab style.
    pub fn tab_active() -> Style {
        Style::default()
            .fg(Theme::TAB_ACTIVE)
            .add_modifier(Modifier::BOLD)
    }

    /// Inactive tab style.
    pub fn tab_inactive() -> Style {
        Style::default().fg(Theme::TAB_INACTIVE)
    }

    /// Dimmed text style.
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Value label in the color of its chart.
    pub fn metric(color: Rgba) -> Style {
        let (r, g, b) = color.to_rgb8();
        Style::default()
            .fg(Color::Rgb(r, g, b))
            .add_modifier(Modifier::BOLD)
    }

    /// Label column in key/value panels.
    pub fn label() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Section header style for popups.
    pub fn section_header() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    /// Help key style (highlighted keys in help popup).
    pub fn help_key() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    /// Colors an appliance state string (UP/DOWN, ACTIVE/LOCKED...).
    pub fn state(value: &str) -> Style {
        match value.to_ascii_uppercase().as_str() {
            "UP" | "ACTIVE" | "SUCCESS" | "ENABLED" | "IN SYNC" | "SUCCESSFUL" => Self::ok(),
            "DOWN" | "LOCKED" | "FAILED" | "FAILURE" | "DISABLED" => Self::critical(),
            "OUT OF SERVICE" | "EXPIRED" | "PARTIAL-UP" | "UNKNOWN" => Self::warning(),
            _ => Self::default(),
        }
    }
}
