use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::session::Key;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrainerEvent {
    Key(KeyEvent),
    /// New terminal size as columns, rows.
    Resize(u16, u16),
    Tick,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TrainerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let event = match event::read() {
                Ok(CtEvent::Key(key)) => TrainerEvent::Key(key),
                Ok(CtEvent::Resize(cols, rows)) => TrainerEvent::Resize(cols, rows),
                Ok(_) => continue,
                Err(err) => {
                    debug!(%err, "terminal event reader stopped");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TrainerEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TrainerEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TrainerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> TrainerEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                TrainerEvent::Tick
            }
        }
    }
}

/// What a terminal key press means to the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Key(Key),
    Quit,
}

/// Maps a terminal key press, `None` for keys without a meaning.
pub fn translate(key: &KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('d') if ctrl => Action::Key(Key::Eot),
        KeyCode::Char('x') if ctrl => Action::Key(Key::Cancel),
        KeyCode::Char('h') if ctrl => Action::Key(Key::Backspace),
        KeyCode::Char('j') | KeyCode::Char('m') if ctrl => Action::Key(Key::Enter),
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(ch) => Action::Key(Key::Char(ch)),
        KeyCode::Tab => Action::Key(Key::Tab),
        KeyCode::Enter => Action::Key(Key::Enter),
        KeyCode::Backspace => Action::Key(Key::Backspace),
        KeyCode::Esc => Action::Key(Key::Eot),
        _ => return None,
    };
    Some(action)
}
