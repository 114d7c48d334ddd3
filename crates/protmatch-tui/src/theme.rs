//! Color scheme and styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// The color palette for protmatch's TUI.
///
/// RGB colors on the terminal's own background, with green/red reserved
/// for "has matches" / "no matches".
pub struct Theme;

impl Theme {
    // ── Base colors ─────────────────────────────────────────
    pub fn fg() -> Color {
        Color::Rgb(200, 200, 200)
    }

    pub fn fg_dim() -> Color {
        Color::Rgb(100, 100, 100)
    }

    pub fn fg_muted() -> Color {
        Color::Rgb(140, 140, 140)
    }

    // ── Accent colors ───────────────────────────────────────
    pub fn accent() -> Color {
        Color::Rgb(110, 170, 255)
    }

    pub fn success() -> Color {
        Color::Rgb(80, 200, 120)
    }

    pub fn warning() -> Color {
        Color::Rgb(230, 180, 80)
    }

    pub fn error() -> Color {
        Color::Rgb(240, 80, 80)
    }

    // ── Structural colors ───────────────────────────────────
    pub fn border_color() -> Color {
        Color::Rgb(60, 60, 60)
    }

    pub fn match_bg() -> Color {
        Color::Rgb(120, 90, 20)
    }

    // ── Composite styles ────────────────────────────────────

    pub fn title() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default().fg(Self::fg()).add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Self::accent())
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal() -> Style {
        Style::default().fg(Self::fg())
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::fg_dim())
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::fg_muted())
    }

    pub fn border() -> Style {
        Style::default().fg(Self::border_color())
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::accent())
    }

    pub fn key_hint() -> Style {
        Style::default().fg(Self::accent())
    }

    pub fn error_text() -> Style {
        Style::default().fg(Self::error())
    }

    pub fn warning_text() -> Style {
        Style::default().fg(Self::warning())
    }

    /// A highlighted stretch of sequence.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Color::Rgb(255, 240, 200))
            .bg(Self::match_bg())
    }

    /// Green when a record has at least one match, red otherwise.
    pub fn match_count(count: usize) -> Style {
        if count > 0 {
            Style::default().fg(Self::success())
        } else {
            Style::default().fg(Self::error())
        }
    }
}
