//! Side panel: pattern field on top, accession editor below with a
//! right-aligned status column beside it.
//!
//! Both fields are controlled views. Typing never edits the panel's copy of
//! the text; it emits `PatternEdited`/`AccessionsEdited` with the new text
//! and the App feeds that through the controller, then syncs the panel from
//! the resulting state. Committed lines therefore re-render from the map,
//! and a duplicated line disappears as soon as it is committed.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use protmatch_core::{FetchState, InputState, State};

use crate::action::{Action, Focus};
use crate::components::Component;
use crate::theme::Theme;

/// Width of the status column, including padding.
const STATUS_WIDTH: u16 = 16;

const CURSOR: &str = "▏";

pub struct AccessionPanelComponent {
    /// Which field receives typed characters.
    pub focus: Focus,
    /// Whether keys are currently routed to the text fields.
    pub editing: bool,
    pattern: String,
    pattern_error: Option<String>,
    input: InputState,
}

impl AccessionPanelComponent {
    pub fn new() -> Self {
        Self {
            focus: Focus::Accessions,
            editing: true,
            pattern: String::new(),
            pattern_error: None,
            input: InputState::default(),
        }
    }

    /// Refresh the displayed text from controller state.
    pub fn sync(&mut self, state: &State) {
        self.pattern = state.pattern.input.clone();
        self.pattern_error = state.pattern.error.clone();
        self.input = state.input.clone();
    }

    /// Apply `edit` to a copy of the focused field and report the result.
    fn edited(&self, edit: impl FnOnce(&mut String)) -> Action {
        match self.focus {
            Focus::Pattern => {
                let mut text = self.pattern.clone();
                edit(&mut text);
                Action::PatternEdited(text)
            }
            Focus::Accessions => {
                let mut text = self.input.text();
                edit(&mut text);
                Action::AccessionsEdited(text)
            }
        }
    }

    fn is_focused(&self, field: Focus) -> bool {
        self.editing && self.focus == field
    }

    fn render_pattern(&self, frame: &mut Frame, area: Rect) {
        let focused = self.is_focused(Focus::Pattern);
        let title = match &self.pattern_error {
            Some(_) => Span::styled(" Pattern (invalid) ", Theme::error_text()),
            None => Span::styled(" Pattern ", Theme::title()),
        };
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(if focused {
                Theme::border_focused()
            } else {
                Theme::border()
            });

        let mut spans = Vec::new();
        if self.pattern.is_empty() && !focused {
            spans.push(Span::styled("regex, e.g. N[^P][ST]", Theme::dim()));
        } else {
            spans.push(Span::styled(self.pattern.clone(), Theme::normal()));
        }
        if focused {
            spans.push(Span::styled(CURSOR, Theme::key_hint()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_accessions(&self, frame: &mut Frame, area: Rect) {
        let focused = self.is_focused(Focus::Accessions);
        let block = Block::default()
            .title(Line::from(Span::styled(" Accessions ", Theme::title())))
            .borders(Borders::ALL)
            .border_style(if focused {
                Theme::border_focused()
            } else {
                Theme::border()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::horizontal([
            Constraint::Length(STATUS_WIDTH),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        let text = self.input.text();
        let mut editor: Vec<Line> = text
            .split('\n')
            .map(|line| Line::styled(line.to_string(), Theme::normal()))
            .collect();
        if text.is_empty() && !focused {
            editor = vec![Line::styled("paste accessions", Theme::dim())];
        }
        if focused {
            if let Some(last) = editor.last_mut() {
                last.spans.push(Span::styled(CURSOR, Theme::key_hint()));
            }
        }

        // Keep the line being typed in view; both columns share the offset
        // so each status stays beside its accession.
        let scroll = editor.len().saturating_sub(inner.height as usize) as u16;

        let status: Vec<Line> = self
            .input
            .fastas()
            .iter()
            .map(|(_, fs)| status_line(fs))
            .collect();

        frame.render_widget(
            Paragraph::new(status)
                .alignment(Alignment::Right)
                .scroll((scroll, 0)),
            columns[0],
        );
        frame.render_widget(Paragraph::new(editor).scroll((scroll, 0)), columns[2]);
    }
}

fn status_line(state: &FetchState) -> Line<'static> {
    match state {
        FetchState::Loading => Line::styled("loading", Theme::dim()),
        FetchState::Error { message } => Line::styled(message.clone(), Theme::error_text()),
        FetchState::Ok(set) => Line::styled(
            set.matches.len().to_string(),
            Theme::match_count(set.matches.len()),
        ),
    }
}

/// Drop trailing whitespace, then the word before it.
fn delete_word(text: &mut String) {
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    let start = text
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    text.truncate(start);
}

impl Component for AccessionPanelComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::SwitchInputField => {
                self.focus = self.focus.toggle();
                None
            }
            Action::CharInput(c) => Some(self.edited(|text| text.push(*c))),
            Action::BackspaceInput => Some(self.edited(|text| {
                text.pop();
            })),
            Action::DeleteWord => Some(self.edited(delete_word)),
            Action::NewlineInput => match self.focus {
                Focus::Pattern => {
                    self.focus = Focus::Accessions;
                    None
                }
                Focus::Accessions => Some(self.edited(|text| text.push('\n'))),
            },
            Action::PasteBulk(pasted) => {
                let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
                match self.focus {
                    Focus::Pattern => {
                        let line = pasted.lines().next().unwrap_or_default().to_string();
                        Some(self.edited(|text| text.push_str(&line)))
                    }
                    Focus::Accessions => Some(self.edited(|text| text.push_str(&pasted))),
                }
            }
            _ => None,
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).split(area);
        self.render_pattern(frame, chunks[0]);
        self.render_accessions(frame, chunks[1]);
    }
}
