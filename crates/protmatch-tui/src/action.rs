//! Action enum — the central message bus for the TUI.
//! All user interactions and async results flow through here.

use protmatch_core::Event;

/// Every possible action that can occur in the application.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Global ──────────────────────────────────────────────
    /// Quit the application.
    Quit,
    /// Toggle help overlay.
    ToggleHelp,
    /// Display a status message in the status bar.
    SetStatus(String),
    /// Clear the status message.
    ClearStatus,
    /// A tick event for redraws after resizes.
    Tick,
    /// Leave the text fields so keys act as shortcuts.
    EnterNormalMode,
    /// Return keyboard focus to the text fields.
    EnterEditingMode,

    // ── Text Input ───────────────────────────────────────────
    /// A character was typed (only sent when in input mode).
    CharInput(char),
    /// Backspace pressed (only sent when in input mode).
    BackspaceInput,
    /// Delete word (Ctrl+W).
    DeleteWord,
    /// Enter in the accession editor.
    NewlineInput,
    /// Switch focus between the pattern field and the accession editor.
    SwitchInputField,
    /// Bulk paste from bracketed paste mode (terminal sends entire text at once).
    PasteBulk(String),

    // ── Session ─────────────────────────────────────────────
    /// The pattern field now holds this text.
    PatternEdited(String),
    /// The accession editor now holds this text.
    AccessionsEdited(String),
    /// A background fetch settled.
    Settled(Event),

    // ── Scrolling ───────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
}

/// Whether the app is in a text-input mode where raw keys should
/// be forwarded to the focused field instead of interpreted as
/// global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal mode — keys are global shortcuts.
    Normal,
    /// Text input mode — keys go to the focused text field.
    Editing,
}

impl InputMode {
    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Normal => "NORMAL",
            InputMode::Editing => "EDIT",
        }
    }
}

/// Which text field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pattern,
    Accessions,
}

impl Focus {
    pub fn toggle(&self) -> Focus {
        match self {
            Focus::Pattern => Focus::Accessions,
            Focus::Accessions => Focus::Pattern,
        }
    }
}
