use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    error::Result,
    pad::{InputBox, BACKSPACE},
    quote::Quote,
    quote_generator::DEFAULT_TABSIZE,
    resize::Resize,
};

/// Keys the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Enter,
    Backspace,
    /// End of transmission: finishes an active round, skips an idle one.
    Eot,
    /// Start the round over.
    Cancel,
}

/// Whether a key was typed or queued by the session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Keyboard,
    Queue,
}

/// What the outer loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Restart,
    Stop,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lines have to be finished with an explicit Enter.
    pub strict: bool,
    /// Enter types the next line's leading whitespace.
    pub indent: bool,
    /// Enter continues comments.
    pub syntax: bool,
    pub tabsize: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strict: false,
            indent: true,
            syntax: true,
            tabsize: DEFAULT_TABSIZE,
        }
    }
}

/// A cursor racing through the quote. Speeds are in characters per second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub name: String,
    pub pos: usize,
    pub speed: f64,
}

impl Player {
    pub fn new(name: impl Into<String>, speed: f64) -> Self {
        Self {
            name: name.into(),
            pos: 0,
            speed,
        }
    }
}

/// Per keystroke state machine of one typing round.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: SessionConfig,
    pub player: Player,
    pub robot: Player,
    pub input: InputBox,
    /// Set by the first key of a round, cleared when the round stops.
    pub active: bool,
    /// Cleared when the round stops, only backspace gets through afterwards.
    pub writable: bool,
    queue: VecDeque<Key>,
}

impl Session {
    pub fn new(config: SessionConfig, player: Player, robot: Player) -> Self {
        Self {
            config,
            player,
            robot,
            input: InputBox::new(0, 0),
            active: false,
            writable: true,
            queue: VecDeque::new(),
        }
    }

    /// Prepares a fresh round for `quote`.
    pub fn load(&mut self, quote: &Quote) {
        self.input.reshape_pad(quote.len().max(1), quote.width() + 1);
        self.queue.clear();
        self.active = false;
        self.writable = true;
        self.player.pos = 0;
        self.player.speed = 0.0;
        self.robot.pos = 0;
        debug!(lines = quote.len(), chars = quote.strlen(), "loaded quote");
    }

    /// Keys queued by the session, oldest first.
    pub fn queue(&self) -> &VecDeque<Key> {
        &self.queue
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    /// Processes queued keys until the queue is empty or a key ends the round.
    pub fn drain(&mut self, quote: &mut Quote) -> Result<Outcome> {
        while let Some(key) = self.queue.pop_front() {
            let outcome = self.process(quote, key, Origin::Queue)?;
            if outcome != Outcome::Continue {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Continue)
    }

    pub fn process(&mut self, quote: &mut Quote, key: Key, origin: Origin) -> Result<Outcome> {
        trace!(?key, ?origin, "process");

        match key {
            Key::Cancel => {
                debug!("round restarted");
                return Ok(Outcome::Restart);
            }
            Key::Eot if self.active => {
                if quote.stats.timer.is_running() {
                    quote.stats.timer.stop()?;
                }
                self.active = false;
                self.writable = false;
                debug!(
                    elapsed = ?quote.stats.timer.elapsed(),
                    good = quote.stats.keystrokes_good,
                    typo = quote.stats.keystrokes_typo,
                    "round stopped"
                );
                return Ok(Outcome::Stop);
            }
            Key::Eot => return Ok(Outcome::Break),
            Key::Enter if !self.active && !self.writable => return Ok(Outcome::Break),
            _ => {}
        }

        if !self.writable && key != Key::Backspace {
            return Ok(Outcome::Continue);
        }

        let keyboard = origin == Origin::Keyboard;
        let accepted = match key {
            Key::Backspace => self.backspace(),
            Key::Enter => self.enter(quote, keyboard),
            Key::Tab => self.tab(quote, keyboard),
            Key::Char(ch) => self.character(quote, ch, keyboard),
            Key::Eot | Key::Cancel => false,
        };

        if accepted && self.writable {
            self.active = true;
            if quote.stats.timer.is_unset() {
                quote.stats.timer.start()?;
                debug!("round started");
            }
            let (row, col) = self.input.cursor();
            if quote.is_complete(row, col)
                && quote.is_correct()
                && quote.stats.timer.is_running()
            {
                quote.stats.timer.stop()?;
                self.queue.push_back(Key::Eot);
            }
        }

        let (row, col) = self.input.cursor();
        self.player.pos = quote.strpos(row, col);
        Ok(Outcome::Continue)
    }

    pub fn update_player_speed(&mut self, quote: &Quote) {
        self.player.speed = quote.stats.speed();
    }

    pub fn update_robot_pos(&mut self, quote: &Quote) {
        let elapsed = quote.stats.timer.elapsed().as_secs_f64();
        let pos = (elapsed * self.robot.speed).floor() as usize;
        self.robot.pos = pos.min(quote.strlen());
    }

    fn line_end(&self, quote: &Quote, row: usize) -> usize {
        if self.config.strict {
            quote.eol(row)
        } else {
            quote.trimmed_eol(row)
        }
    }

    fn queue_text(&mut self, text: &str) {
        self.queue.extend(text.chars().map(Key::Char));
    }

    fn backspace(&mut self) -> bool {
        let (row, col) = self.input.cursor();
        if (row, col) == (0, 0) {
            return false;
        }
        if col > 0 && self.input.cell(row, col - 1) == ' ' {
            // back to the previous tab stop, over spaces only
            let tabsize = self.config.tabsize.max(1);
            let stop = (col - 1) / tabsize * tabsize;
            let mut col = col;
            while col > stop && self.input.cell(row, col - 1) == ' ' {
                self.input.putch(BACKSPACE);
                col -= 1;
            }
        } else {
            self.input.putch(BACKSPACE);
        }
        true
    }

    fn enter(&mut self, quote: &mut Quote, keyboard: bool) -> bool {
        let (row, col) = self.input.cursor();
        if quote.is_last_line(row) || col < self.line_end(quote, row) {
            return false;
        }

        self.input.putch('\n');
        if keyboard {
            quote.stats.keystrokes_enter += 1;
        }

        let next = row + 1;
        let indentation = if self.config.indent {
            quote.indentation(next).to_string()
        } else {
            String::new()
        };
        self.queue_text(&indentation);

        if self.config.syntax {
            let budget = quote.eol(next).saturating_sub(indentation.chars().count());
            if let Some(prefix) = self
                .input
                .continue_comment(row, 0, col, budget, self.config.indent)
            {
                self.queue_text(&prefix);
            }
        }
        true
    }

    /// Shared gate of characters and tabs. `Some` short-circuits the key.
    fn check_line_end(&mut self, quote: &Quote, key: Key) -> Option<bool> {
        let (row, col) = self.input.cursor();
        if quote.is_complete(row, col) {
            return Some(false);
        }
        if !quote.is_last_line(row) && col >= self.line_end(quote, row) {
            if !self.config.strict && matches!(key, Key::Tab | Key::Char(' ')) {
                self.queue.push_back(Key::Enter);
                return Some(true);
            }
            return Some(false);
        }
        None
    }

    fn tab(&mut self, quote: &mut Quote, keyboard: bool) -> bool {
        if let Some(accepted) = self.check_line_end(quote, Key::Tab) {
            return accepted;
        }

        let (row, col) = self.input.cursor();
        let tabsize = self.config.tabsize.max(1);
        let width = tabsize - col % tabsize;
        let spaces = (col..col + width).all(|col| quote.expected(row, col) == Some(' '));

        if spaces {
            if keyboard {
                quote.stats.keystrokes_tab += 1;
            }
            self.queue_text(&" ".repeat(width));
        } else {
            quote.is_typo(row, col, '\t', true);
            quote.stats.keystrokes_typo += usize::from(keyboard);
            self.input.putch(' ');
        }
        true
    }

    fn character(&mut self, quote: &mut Quote, ch: char, keyboard: bool) -> bool {
        if let Some(accepted) = self.check_line_end(quote, Key::Char(ch)) {
            return accepted;
        }

        let (row, col) = self.input.cursor();
        let count = usize::from(keyboard);
        if keyboard && ch == ' ' {
            quote.stats.keystrokes_space += 1;
        }
        if quote.is_typo(row, col, ch, true) {
            quote.stats.keystrokes_typo += count;
        } else {
            quote.stats.keystrokes_good += count;
        }
        self.input.putch(ch);
        true
    }
}

impl Resize for Session {
    fn resize(&mut self, dy: i32, dx: i32) {
        self.input.resize(dy, dx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Timer;
    use assert_matches::assert_matches;
    use std::time::{Duration, Instant};

    fn session() -> Session {
        Session::new(
            SessionConfig::default(),
            Player::new("you", 0.0),
            Player::new("robot", 1.0),
        )
    }

    fn type_keys(session: &mut Session, quote: &mut Quote, text: &str) {
        for ch in text.chars() {
            session.process(quote, Key::Char(ch), Origin::Keyboard).unwrap();
        }
    }

    #[test]
    fn test_update_player_speed() {
        let mut session = session();
        let mut quote = Quote::new(["foo"]);
        let started = Instant::now();
        quote.stats.keystrokes_good = 1000;
        quote.stats.timer = Timer::with_bounds(started, Some(started + Duration::from_secs(100)));

        session.update_player_speed(&quote);
        assert_eq!(session.player.speed, 10.0);
    }

    #[test]
    fn test_update_robot_pos() {
        let mut session = session();
        let mut quote = Quote::new(["foo bar baz"]);
        let started = Instant::now();
        quote.stats.timer = Timer::with_bounds(started, Some(started + Duration::from_secs(5)));

        session.update_robot_pos(&quote);
        assert_eq!(session.robot.pos, 5);

        session.robot.speed = 100.0;
        session.update_robot_pos(&quote);
        assert_eq!(session.robot.pos, quote.strlen());
    }

    #[test]
    fn test_completes_once() {
        let mut session = session();
        let mut quote = Quote::new(["foo bar"]);
        session.load(&quote);

        type_keys(&mut session, &mut quote, "foo bar");
        assert_eq!(session.player.pos, 7);
        assert!(quote.stats.timer.is_stopped());
        assert_eq!(session.queue().iter().collect::<Vec<_>>(), vec![&Key::Eot]);

        assert_matches!(session.drain(&mut quote), Ok(Outcome::Stop));
        assert!(!session.active);
        assert!(!session.writable);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn test_control_keys() {
        let mut session = session();
        let mut quote = Quote::new(["foo", "bar"]);
        session.load(&quote);

        assert_matches!(
            session.process(&mut quote, Key::Cancel, Origin::Keyboard),
            Ok(Outcome::Restart)
        );
        assert_matches!(
            session.process(&mut quote, Key::Eot, Origin::Keyboard),
            Ok(Outcome::Break)
        );

        session.process(&mut quote, Key::Char('f'), Origin::Keyboard).unwrap();
        assert!(session.active);
        assert!(quote.stats.timer.is_running());
        assert_matches!(
            session.process(&mut quote, Key::Eot, Origin::Keyboard),
            Ok(Outcome::Stop)
        );
        assert!(quote.stats.timer.is_stopped());

        assert_matches!(
            session.process(&mut quote, Key::Enter, Origin::Keyboard),
            Ok(Outcome::Break)
        );
    }

    #[test]
    fn test_backspace_after_stop() {
        let mut session = session();
        let mut quote = Quote::new(["foo"]);
        session.load(&quote);
        type_keys(&mut session, &mut quote, "fo");
        session.process(&mut quote, Key::Eot, Origin::Keyboard).unwrap();

        session.process(&mut quote, Key::Char('o'), Origin::Keyboard).unwrap();
        assert_eq!(session.player.pos, 2);

        session.process(&mut quote, Key::Backspace, Origin::Keyboard).unwrap();
        assert_eq!(session.player.pos, 1);
        assert!(!session.active);
        assert!(quote.stats.timer.is_stopped());
    }

    #[test]
    fn test_tab_typo() {
        let mut session = session();
        let mut quote = Quote::new(["foo bar"]);
        session.load(&quote);

        session.process(&mut quote, Key::Tab, Origin::Keyboard).unwrap();
        assert_eq!(session.player.pos, 1);
        assert_eq!(quote.stats.keystrokes_typo, 1);
        assert_eq!(quote.stats.keystrokes_tab, 0);
        assert_eq!(quote.stats.typos.get(&(0, 0)), Some(&true));
        assert_eq!(quote.stats.typocounts[&'f'][&'\t'], 1);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn test_queued_keys_are_not_counted() {
        let mut session = session();
        let mut quote = Quote::new(["ab"]);
        session.load(&quote);

        session.process(&mut quote, Key::Char('a'), Origin::Queue).unwrap();
        session.process(&mut quote, Key::Char('x'), Origin::Queue).unwrap();
        assert_eq!(quote.stats.keystrokes_good, 0);
        assert_eq!(quote.stats.keystrokes_typo, 0);
        assert_eq!(quote.stats.typos.get(&(0, 1)), Some(&true));
    }

    #[test]
    fn test_load_resets_round() {
        let mut session = session();
        let mut quote = Quote::new(["foo", "barbaz"]);
        session.load(&quote);
        type_keys(&mut session, &mut quote, "fo");
        session.active = true;

        let quote = Quote::new(["foo", "barbaz"]);
        session.load(&quote);
        assert!(!session.active);
        assert!(session.writable);
        assert_eq!(session.player.pos, 0);
        assert_eq!(session.input.cursor(), (0, 0));
        assert_eq!(session.input.pad().height(), 2);
        assert_eq!(session.input.pad().width(), 7);
    }
}
