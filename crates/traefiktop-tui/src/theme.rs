//! Palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

use traefiktop_core::ServiceStatus;

// ── Palette ───────────────────────────────────────────────────────────

pub const TRAEFIK_CYAN: Color = Color::Rgb(36, 161, 193); // #24a1c1
pub const ACCENT_PURPLE: Color = Color::Rgb(189, 147, 249); // #bd93f9
pub const UP_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const DOWN_RED: Color = Color::Rgb(255, 99, 99); // #ff6363
pub const WARN_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36

// ── Semantic styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(TRAEFIK_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn border_focused() -> Style {
    Style::default().fg(ACCENT_PURPLE)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(TRAEFIK_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn table_selected() -> Style {
    Style::default()
        .fg(ACCENT_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn label() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn value() -> Style {
    Style::default().fg(DIM_WHITE)
}

pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(TRAEFIK_CYAN).add_modifier(Modifier::BOLD)
}

pub fn search_active() -> Style {
    Style::default().fg(WARN_YELLOW).add_modifier(Modifier::BOLD)
}

pub fn error_text() -> Style {
    Style::default().fg(DOWN_RED).add_modifier(Modifier::BOLD)
}

/// Error banner shown above stale data.
pub fn error_banner() -> Style {
    Style::default().fg(BG_HIGHLIGHT).bg(DOWN_RED).add_modifier(Modifier::BOLD)
}

pub fn status_style(status: ServiceStatus) -> Style {
    match status {
        ServiceStatus::Up => Style::default().fg(UP_GREEN),
        ServiceStatus::Down => Style::default().fg(DOWN_RED).add_modifier(Modifier::BOLD),
        ServiceStatus::Unknown => Style::default().fg(WARN_YELLOW),
    }
}

pub fn status_icon(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Up => "●",
        ServiceStatus::Down => "✗",
        ServiceStatus::Unknown => "?",
    }
}
