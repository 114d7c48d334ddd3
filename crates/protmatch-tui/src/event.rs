//! Terminal event handling: captures keyboard, paste, and resize events
//! from crossterm and dispatches them as Actions.
//!
//! The handler operates in two modes:
//! - Normal: keys are mapped to global shortcuts (quit, help, scroll).
//! - Editing: keys are forwarded as raw CharInput/BackspaceInput so the
//!   pattern field and accession editor can receive typed characters.
//!
//! The current InputMode is shared between the App and EventHandler via
//! an Arc<AtomicU8>. A single blocking reader owns the terminal input, so
//! every event it reads reaches the channel.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

use crate::action::{Action, InputMode};

/// Encode InputMode as u8 for atomic sharing.
const MODE_NORMAL: u8 = 0;
const MODE_EDITING: u8 = 1;

/// Shared flag the App sets so the EventHandler knows which keymap to use.
pub type InputModeFlag = Arc<AtomicU8>;

pub fn new_input_mode_flag() -> InputModeFlag {
    Arc::new(AtomicU8::new(MODE_EDITING))
}

pub fn set_input_mode(flag: &InputModeFlag, mode: InputMode) {
    let val = match mode {
        InputMode::Normal => MODE_NORMAL,
        InputMode::Editing => MODE_EDITING,
    };
    flag.store(val, Ordering::Relaxed);
}

fn get_input_mode(flag: &InputModeFlag) -> InputMode {
    match flag.load(Ordering::Relaxed) {
        MODE_EDITING => InputMode::Editing,
        _ => InputMode::Normal,
    }
}

/// How long the reader waits for input before re-checking the channel.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Reads terminal events on a dedicated blocking task and sends Actions;
/// ticks come from a separate interval.
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Action>,
    tick_rate: Duration,
    mode_flag: InputModeFlag,
}

impl EventHandler {
    pub fn new(
        tx: mpsc::UnboundedSender<Action>,
        tick_rate: Duration,
        mode_flag: InputModeFlag,
    ) -> Self {
        Self {
            tx,
            tick_rate,
            mode_flag,
        }
    }

    /// Run until the receiving side of the channel is dropped. Should be
    /// spawned in a task.
    pub async fn run(self) {
        let reader_tx = self.tx.clone();
        let reader_flag = self.mode_flag.clone();
        tokio::task::spawn_blocking(move || {
            forward_events(read_terminal_event, &reader_tx, &reader_flag);
        });

        let mut interval = tokio::time::interval(self.tick_rate);
        loop {
            interval.tick().await;
            if self.tx.send(Action::Tick).is_err() {
                break;
            }
        }
    }
}

/// Wait up to `POLL_INTERVAL` for one terminal event.
fn read_terminal_event() -> io::Result<Option<Event>> {
    if event::poll(POLL_INTERVAL)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Pull events from `next` and send their Actions until the channel closes
/// or the source fails. `Ok(None)` means nothing arrived yet.
fn forward_events(
    mut next: impl FnMut() -> io::Result<Option<Event>>,
    tx: &mpsc::UnboundedSender<Action>,
    mode_flag: &InputModeFlag,
) {
    while !tx.is_closed() {
        let event = match next() {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "Terminal event source failed");
                break;
            }
        };
        if let Some(action) = map_event(event, get_input_mode(mode_flag)) {
            if tx.send(action).is_err() {
                break;
            }
        }
    }
}

fn map_event(event: Event, mode: InputMode) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(key, mode),
        Event::Paste(text) => Some(Action::PasteBulk(text)),
        Event::Resize(_, _) => Some(Action::Tick),
        _ => None,
    }
}

fn map_key(key: KeyEvent, mode: InputMode) -> Option<Action> {
    // Ctrl+C always quits regardless of mode.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }
    if key.code == KeyCode::F(1) {
        return Some(Action::ToggleHelp);
    }

    match mode {
        InputMode::Editing => map_key_editing(key),
        InputMode::Normal => map_key_normal(key),
    }
}

/// Key mapping when a text field is focused. Most keys become character
/// input; only a few are reserved for navigation.
fn map_key_editing(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('w') | KeyCode::Backspace => Some(Action::DeleteWord),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(Action::EnterNormalMode),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchInputField),
        KeyCode::Enter => Some(Action::NewlineInput),
        KeyCode::Up => Some(Action::ScrollUp),
        KeyCode::Down => Some(Action::ScrollDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Backspace => Some(Action::BackspaceInput),
        KeyCode::Char(c) => Some(Action::CharInput(c)),
        _ => None,
    }
}

/// Key mapping in normal mode: global shortcuts.
fn map_key_normal(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('i') | KeyCode::Enter => Some(Action::EnterEditingMode),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::SwitchInputField),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::PageDown),
        KeyCode::Esc => Some(Action::ClearStatus),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn editing_mode_forwards_characters() {
        assert!(matches!(map_key_editing(key(KeyCode::Char('q'))), Some(Action::CharInput('q'))));
        assert!(matches!(map_key_editing(key(KeyCode::Enter)), Some(Action::NewlineInput)));
        assert!(matches!(map_key_editing(key(KeyCode::Esc)), Some(Action::EnterNormalMode)));
        assert!(matches!(
            map_key_editing(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)),
            Some(Action::DeleteWord)
        ));
    }

    #[test]
    fn normal_mode_maps_shortcuts() {
        assert!(matches!(map_key_normal(key(KeyCode::Char('q'))), Some(Action::Quit)));
        assert!(matches!(map_key_normal(key(KeyCode::Char('i'))), Some(Action::EnterEditingMode)));
        assert!(matches!(map_key_normal(key(KeyCode::Char('j'))), Some(Action::ScrollDown)));
        assert!(map_key_normal(key(KeyCode::Char('x'))).is_none());
    }

    #[test]
    fn every_read_event_is_forwarded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let flag = new_input_mode_flag();
        let mut source = vec![
            Ok(Some(Event::Key(key(KeyCode::Char('q'))))),
            Ok(None),
            Ok(Some(Event::Key(key(KeyCode::Char('9'))))),
            Ok(None),
            Ok(None),
            Ok(Some(Event::Paste("A0\nB1".into()))),
            Ok(Some(Event::Key(key(KeyCode::Enter)))),
            Err(io::Error::new(io::ErrorKind::Other, "closed")),
        ]
        .into_iter();

        forward_events(|| source.next().unwrap_or(Ok(None)), &tx, &flag);

        let mut received = Vec::new();
        while let Ok(action) = rx.try_recv() {
            received.push(action);
        }
        assert_eq!(received.len(), 4);
        assert!(matches!(received[0], Action::CharInput('q')));
        assert!(matches!(received[1], Action::CharInput('9')));
        assert!(matches!(&received[2], Action::PasteBulk(text) if text == "A0\nB1"));
        assert!(matches!(received[3], Action::NewlineInput));
    }

    #[test]
    fn forwarding_stops_when_receiver_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let flag = new_input_mode_flag();
        let mut calls = 0;
        forward_events(
            || {
                calls += 1;
                Ok(Some(Event::Key(key(KeyCode::Char('a')))))
            },
            &tx,
            &flag,
        );
        assert_eq!(calls, 0);
    }

    #[test]
    fn mode_flag_selects_keymap() {
        let flag = new_input_mode_flag();
        let (tx, mut rx) = mpsc::unbounded_channel();
        set_input_mode(&flag, InputMode::Normal);
        let mut source = vec![
            Ok(Some(Event::Key(key(KeyCode::Char('q'))))),
            Err(io::Error::new(io::ErrorKind::Other, "closed")),
        ]
        .into_iter();
        forward_events(|| source.next().unwrap_or(Ok(None)), &tx, &flag);
        assert!(matches!(rx.try_recv(), Ok(Action::Quit)));
    }
}
