use std::time::{Duration, Instant};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Unset,
    Running {
        started: Instant,
    },
    Stopped {
        started: Instant,
        stopped: Instant,
    },
}

/// Monotonic stopwatch used to time one quote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    state: State,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a timer from explicit bounds. A missing `stopped` leaves it running.
    ///
    /// `stopped` earlier than `started` is treated as `started`.
    pub fn with_bounds(started: Instant, stopped: Option<Instant>) -> Self {
        let state = match stopped {
            Some(stopped) => State::Stopped {
                started,
                stopped: stopped.max(started),
            },
            None => State::Running { started },
        };
        Self { state }
    }

    pub fn start(&mut self) -> Result<()> {
        match self.state {
            State::Unset => {
                self.state = State::Running {
                    started: Instant::now(),
                };
                Ok(())
            }
            _ => Err(Error::TimerAlreadyStarted),
        }
    }

    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            State::Running { started } => {
                self.state = State::Stopped {
                    started,
                    stopped: Instant::now(),
                };
                Ok(())
            }
            _ => Err(Error::TimerNotRunning),
        }
    }

    pub fn reset(&mut self) {
        self.state = State::Unset;
    }

    pub fn elapsed(&self) -> Duration {
        match self.state {
            State::Unset => Duration::ZERO,
            State::Running { started } => started.elapsed(),
            State::Stopped { started, stopped } => stopped.duration_since(started),
        }
    }

    pub fn started_at(&self) -> Option<Instant> {
        match self.state {
            State::Unset => None,
            State::Running { started } | State::Stopped { started, .. } => Some(started),
        }
    }

    pub fn stopped_at(&self) -> Option<Instant> {
        match self.state {
            State::Stopped { stopped, .. } => Some(stopped),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.state == State::Unset
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, State::Stopped { .. })
    }
}
