//! Main application state and render loop.

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::{Frame, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use protmatch_core::config::DisplayConfig;
use protmatch_core::{Dispatch, Event, InputController, SequenceFetcher};

use crate::action::{Action, InputMode};
use crate::components::accession_panel::AccessionPanelComponent;
use crate::components::help::HelpComponent;
use crate::components::sequence_view::SequenceViewComponent;
use crate::components::status_bar::StatusBarComponent;
use crate::components::Component;
use crate::event::{self, EventHandler, InputModeFlag};

/// Width of the side panel holding the pattern field and accession editor.
const SIDE_PANEL_WIDTH: u16 = 44;

/// Main application state.
pub struct App {
    /// Whether the app should exit.
    should_quit: bool,
    /// Keys go to the text fields or act as shortcuts.
    input_mode: InputMode,
    /// Shared flag to tell the EventHandler which key-mapping to use.
    input_mode_flag: InputModeFlag,
    tick_rate: Duration,

    /// Owns the session state and spawns the fetches.
    controller: InputController,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,

    // Components
    accession_panel: AccessionPanelComponent,
    sequence_view: SequenceViewComponent,
    status_bar: StatusBarComponent,
    help: HelpComponent,
}

impl App {
    pub fn new(fetcher: Arc<dyn SequenceFetcher>, display: &DisplayConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Action>();

        // Fetch results come back on the action channel.
        let settled_tx = tx.clone();
        let dispatch: Dispatch = Arc::new(move |event: Event| {
            let _ = settled_tx.send(Action::Settled(event));
        });

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            input_mode_flag: event::new_input_mode_flag(),
            tick_rate: Duration::from_millis(display.tick_rate_ms.max(10)),
            controller: InputController::new(fetcher, dispatch),
            tx,
            rx,
            accession_panel: AccessionPanelComponent::new(),
            sequence_view: SequenceViewComponent::new(display.wrap_width),
            status_bar: StatusBarComponent::new(),
            help: HelpComponent::new(),
        }
    }

    /// Pre-fill the pattern field from CLI args.
    pub fn set_initial_pattern(&mut self, pattern: &str) {
        self.controller.change_pattern(pattern);
        self.sync_views();
    }

    /// Pre-fill committed accessions from CLI args. Must be called from
    /// within the tokio runtime, since it starts fetches.
    pub fn set_initial_accessions(&mut self, accessions: &[String]) {
        if accessions.is_empty() {
            return;
        }
        let mut text = accessions.join("\n");
        text.push('\n');
        self.controller.change_input(&text);
        self.sync_views();
    }

    /// Run the TUI application.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Set up terminal.
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let result = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(mut terminal) => {
                // Start the event handler with the shared input mode flag.
                let event_handler =
                    EventHandler::new(self.tx.clone(), self.tick_rate, self.input_mode_flag.clone());
                tokio::spawn(async move {
                    event_handler.run().await;
                });

                let result = self.main_loop(&mut terminal).await;
                let _ = terminal.show_cursor();
                result
            }
            Err(e) => Err(e.into()),
        };

        // Restore the terminal even when the loop failed.
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste)?;

        info!("TUI closed");
        result
    }

    /// Draw and process actions until `Quit` or the channel closes.
    async fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        self.sync_input_mode();

        loop {
            terminal.draw(|frame| {
                self.render(frame);
            })?;

            let Some(action) = self.rx.recv().await else {
                break;
            };
            self.handle_action(&action);

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn sync_input_mode(&self) {
        let mode = if self.help.visible {
            InputMode::Normal
        } else {
            self.input_mode
        };
        event::set_input_mode(&self.input_mode_flag, mode);
    }

    /// Push the controller's current state into every view.
    fn sync_views(&mut self) {
        let state = self.controller.state();
        self.accession_panel.sync(state);
        self.accession_panel.editing = self.input_mode == InputMode::Editing;
        self.sequence_view.sync(&state.input);
        self.status_bar.sync(state);
        self.status_bar.mode = self.input_mode;
    }

    /// Dispatch an action to the controller and all components.
    fn handle_action(&mut self, action: &Action) {
        // Global actions first.
        match action {
            Action::Quit => {
                self.should_quit = true;
                return;
            }
            Action::EnterNormalMode => self.input_mode = InputMode::Normal,
            Action::EnterEditingMode => self.input_mode = InputMode::Editing,
            Action::PatternEdited(text) => self.controller.change_pattern(text),
            Action::AccessionsEdited(text) => self.controller.change_input(text),
            Action::Settled(event) => {
                self.report_settled(event);
                self.controller.apply(event.clone());
            }
            _ => {}
        }

        // Text editing only reaches the panel while in editing mode.
        let routed = !self.help.visible
            && (self.input_mode == InputMode::Editing
                || matches!(action, Action::SwitchInputField));
        let result = if routed {
            self.accession_panel.handle_action(action)
        } else {
            None
        };

        self.sequence_view.handle_action(action);
        self.help.handle_action(action);
        self.status_bar.handle_action(action);

        self.sync_views();
        self.sync_input_mode();

        // Handle chained actions from components.
        if let Some(chained) = result {
            self.handle_action(&chained);
        }
    }

    /// Post a status message for fetch results that still matter.
    fn report_settled(&self, event: &Event) {
        let fastas = self.controller.input().fastas();
        let status = match event {
            Event::ProteinFetched(record) => fastas
                .get(&record.accession)
                .filter(|fs| fs.is_loading())
                .map(|_| format!("Loaded {}", record.accession)),
            Event::ProteinFetchFailed { accession, message } => fastas
                .get(accession)
                .filter(|fs| fs.is_loading())
                .map(|_| format!("{accession}: {message}")),
            Event::PatternChanged(_) | Event::InputChanged(_) => None,
        };
        if let Some(status) = status {
            let _ = self.tx.send(Action::SetStatus(status));
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);
        let columns = Layout::horizontal([
            Constraint::Length(SIDE_PANEL_WIDTH),
            Constraint::Min(0),
        ])
        .split(rows[0]);

        self.accession_panel.render(frame, columns[0]);
        self.sequence_view.render(frame, columns[1]);
        self.status_bar.render(frame, rows[1]);

        // Overlays render last.
        self.help.render(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use protmatch_core::{Accession, FetchState, ProtmatchError, SequenceRecord};
    use ratatui::backend::TestBackend;

    struct OfflineFetcher;

    #[async_trait]
    impl SequenceFetcher for OfflineFetcher {
        async fn fetch_sequence(
            &self,
            accession: &Accession,
        ) -> protmatch_core::Result<SequenceRecord> {
            Err(ProtmatchError::Fetch(format!("{accession}: offline")))
        }
    }

    fn app() -> App {
        App::new(Arc::new(OfflineFetcher), &DisplayConfig::default())
    }

    #[tokio::test]
    async fn main_loop_returns_after_quit() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        app.tx.send(Action::Quit).unwrap();

        app.main_loop(&mut terminal).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn typed_accession_is_committed_before_quit() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        for action in [
            Action::CharInput('q'),
            Action::CharInput('9'),
            Action::CharInput('y'),
            Action::NewlineInput,
            Action::Quit,
        ] {
            app.tx.send(action).unwrap();
        }

        app.main_loop(&mut terminal).await.unwrap();
        let fastas = app.controller.input().fastas();
        assert_eq!(fastas.keys(), vec![Accession::new("Q9Y")]);
        assert!(matches!(
            fastas.get(&Accession::new("Q9Y")),
            Some(FetchState::Loading) | Some(FetchState::Error { .. })
        ));
    }
}
