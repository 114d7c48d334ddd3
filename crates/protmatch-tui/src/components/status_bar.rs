//! Status bar at the bottom of the TUI.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use protmatch_core::{FetchState, State};

use crate::action::{Action, InputMode};
use crate::components::Component;
use crate::theme::Theme;

/// Per-state entry counts shown on the right of the bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub loading: usize,
    pub loaded: usize,
    pub failed: usize,
}

impl Tally {
    pub fn of(state: &State) -> Self {
        let mut tally = Tally::default();
        for (_, fs) in state.input.fastas().iter() {
            match fs {
                FetchState::Loading => tally.loading += 1,
                FetchState::Ok(_) => tally.loaded += 1,
                FetchState::Error { .. } => tally.failed += 1,
            }
        }
        tally
    }
}

pub struct StatusBarComponent {
    /// Current status message.
    pub message: String,
    /// Current input mode, for the badge.
    pub mode: InputMode,
    /// Compiler message for an invalid pattern; shown instead of `message`.
    pub pattern_error: Option<String>,
    pub tally: Tally,
}

impl StatusBarComponent {
    pub fn new() -> Self {
        Self {
            message: "Paste accessions, one per line. F1 for help.".to_string(),
            mode: InputMode::Editing,
            pattern_error: None,
            tally: Tally::default(),
        }
    }

    pub fn sync(&mut self, state: &State) {
        self.pattern_error = state.pattern.error.clone();
        self.tally = Tally::of(state);
    }
}

impl Component for StatusBarComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::SetStatus(msg) => {
                self.message = msg.clone();
                None
            }
            Action::ClearStatus => {
                self.message.clear();
                None
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = area.width as usize;

        let counts = format!(
            "{} loading · {} ok · {} failed",
            self.tally.loading, self.tally.loaded, self.tally.failed
        );
        let counts_len = counts.chars().count() + 1;

        let badge = self.mode.label();
        let badge_len = badge.len() + 2;

        let (text, style) = match &self.pattern_error {
            Some(err) => (
                format!("invalid pattern: {}", err.lines().last().unwrap_or_default()),
                Theme::error_text(),
            ),
            None => (self.message.clone(), Theme::dim()),
        };

        // Truncate message to remaining space
        let msg_budget = width
            .saturating_sub(badge_len)
            .saturating_sub(counts_len)
            .saturating_sub(4);

        let msg: String = if text.chars().count() > msg_budget {
            if msg_budget > 3 {
                let kept: String = text.chars().take(msg_budget - 3).collect();
                format!("{kept}...")
            } else {
                String::new()
            }
        } else {
            text
        };

        // Pad to push counts to the right edge
        let used = badge_len + 2 + msg.chars().count();
        let pad = width.saturating_sub(used + counts_len);

        let counts_style = if self.tally.loading > 0 {
            Theme::warning_text()
        } else {
            Theme::key_hint()
        };

        let line = Line::from(vec![
            Span::styled(format!(" {} ", badge), Theme::muted()),
            Span::styled("  ", Theme::dim()),
            Span::styled(msg, style),
            Span::raw(" ".repeat(pad)),
            Span::styled(counts, counts_style),
            Span::raw(" "),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protmatch_core::sequence::{Accession, SequenceRecord};
    use protmatch_core::state::{plan_input, Event, FETCH_FAILED_MESSAGE};

    #[test]
    fn tally_counts_each_fetch_state() {
        let state = State::default();
        let state = state.reduce(Event::InputChanged(plan_input(&state.input, "A\nB\nC\n").input));
        let state = state.reduce(Event::ProteinFetched(SequenceRecord {
            accession: Accession::new("A"),
            title: ">sp|A|X".into(),
            sequence: "MK".into(),
        }));
        let state = state.reduce(Event::ProteinFetchFailed {
            accession: Accession::new("B"),
            message: FETCH_FAILED_MESSAGE.into(),
        });
        assert_eq!(
            Tally::of(&state),
            Tally {
                loading: 1,
                loaded: 1,
                failed: 1
            }
        );
    }
}
