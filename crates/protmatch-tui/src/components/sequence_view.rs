//! Main panel: every accession's record, wrapped, with pattern matches
//! highlighted.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use tracing::warn;

use protmatch_core::highlight::{self, Fragment};
use protmatch_core::{Accession, FetchState, InputState};

use crate::action::Action;
use crate::components::Component;
use crate::theme::Theme;

/// Lines moved by PageUp/PageDown.
const PAGE: u16 = 20;

pub struct SequenceViewComponent {
    input: InputState,
    /// Characters per sequence line; 0 disables wrapping.
    wrap: usize,
    /// Index of the first visible line.
    scroll: u16,
}

impl SequenceViewComponent {
    pub fn new(wrap: usize) -> Self {
        Self {
            input: InputState::default(),
            wrap,
            scroll: 0,
        }
    }

    pub fn sync(&mut self, input: &InputState) {
        self.input = input.clone();
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> u16 {
        let total: usize = self
            .input
            .fastas()
            .iter()
            .map(|(_, fs)| line_count(fs, self.wrap))
            .sum();
        total.saturating_sub(1).min(u16::MAX as usize) as u16
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (self.scroll as i32 + delta).clamp(0, self.max_scroll() as i32);
        self.scroll = next as u16;
    }
}

/// Number of lines `entry_lines` produces for an entry.
fn line_count(state: &FetchState, wrap: usize) -> usize {
    match state {
        FetchState::Loading | FetchState::Error { .. } => 3,
        FetchState::Ok(set) => {
            let len = set.record.sequence.len();
            let body = if wrap == 0 || len == 0 {
                1
            } else {
                len.div_ceil(wrap)
            };
            body + 2
        }
    }
}

/// Render one entry: a header, its body and a blank separator line.
pub fn entry_lines(accession: &Accession, state: &FetchState, wrap: usize) -> Vec<Line<'static>> {
    match state {
        FetchState::Loading => vec![
            Line::styled(format!(">{accession}"), Theme::muted()),
            Line::styled("loading...", Theme::dim()),
            Line::default(),
        ],
        FetchState::Error { message } => vec![
            Line::styled(format!(">{accession}"), Theme::muted()),
            Line::styled(message.clone(), Theme::error_text()),
            Line::default(),
        ],
        FetchState::Ok(set) => {
            let mut lines = vec![Line::styled(
                set.record.title.clone(),
                Theme::match_count(set.matches.len()),
            )];
            let fragments = highlight::highlight(&set.record.sequence, &set.matches, wrap)
                .unwrap_or_else(|e| {
                    warn!(accession = %accession, error = %e, "Cannot highlight matches");
                    vec![Fragment::plain(&highlight::wrap_text(&set.record.sequence, wrap))]
                });
            lines.extend(fragment_lines(&fragments));
            lines.push(Line::default());
            lines
        }
    }
}

/// Turn fragments into display lines, breaking at every `\n`.
pub fn fragment_lines(fragments: &[Fragment]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for fragment in fragments {
        let style = if fragment.is_highlighted() {
            Theme::highlight()
        } else {
            Theme::normal()
        };
        let mut parts = fragment.text.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                current.push(Span::styled(first.to_string(), style));
            }
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut current)));
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

impl Component for SequenceViewComponent {
    fn handle_action(&mut self, action: &Action) -> Option<Action> {
        match action {
            Action::ScrollUp => self.scroll_by(-1),
            Action::ScrollDown => self.scroll_by(1),
            Action::PageUp => self.scroll_by(-(PAGE as i32)),
            Action::PageDown => self.scroll_by(PAGE as i32),
            _ => {}
        }
        None
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let count = self.input.fastas().len();
        let block = Block::default()
            .title(Line::from(Span::styled(
                format!(" Sequences ({count}) "),
                Theme::title(),
            )))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let lines: Vec<Line> = self
            .input
            .fastas()
            .iter()
            .flat_map(|(accession, fs)| entry_lines(accession, fs, self.wrap))
            .collect();

        frame.render_widget(
            Paragraph::new(lines).block(block).scroll((self.scroll, 0)),
            area,
        );
    }
}
