use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    progress::ProgressBar,
    quote::Quote,
    quote_generator::QuoteGenerator,
    resize::Resize,
    runtime::{Action, TrainerEvent},
    session::{Key, Origin, Outcome, Session},
    stats::SpeedUnit,
};

/// Columns kept free around the quote.
pub const HORIZONTAL_MARGIN: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// One typing session: the quote being typed and everything that drives it.
pub struct App {
    generator: QuoteGenerator,
    pub quote: Quote,
    pub session: Session,
    pub state: AppState,
    pub unit: SpeedUnit,
    pub player_bar: ProgressBar,
    pub robot_bar: ProgressBar,
    pub rounds: usize,
    quit: bool,
}

impl App {
    pub fn new(
        mut generator: QuoteGenerator,
        mut session: Session,
        unit: SpeedUnit,
    ) -> Result<Self> {
        let quote = generator.next_quote()?;
        let width = generator.width();
        session.input.set_viewport(generator.maxlines(), width + 1);
        let mut app = Self {
            generator,
            quote,
            session,
            state: AppState::Typing,
            unit,
            player_bar: ProgressBar::new(width),
            robot_bar: ProgressBar::new(width),
            rounds: 1,
            quit: false,
        };
        app.load();
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn generator(&self) -> &QuoteGenerator {
        &self.generator
    }

    pub fn handle_event(&mut self, event: TrainerEvent) -> Result<()> {
        match event {
            TrainerEvent::Key(key) => match crate::runtime::translate(&key) {
                Some(Action::Key(key)) => self.handle_key(key),
                Some(Action::Quit) => {
                    self.quit = true;
                    Ok(())
                }
                None => Ok(()),
            },
            TrainerEvent::Resize(cols, rows) => {
                self.on_resize(cols, rows);
                Ok(())
            }
            TrainerEvent::Tick => {
                self.on_tick();
                Ok(())
            }
        }
    }

    /// Feeds one typed key, then everything the session queued in response.
    pub fn handle_key(&mut self, key: Key) -> Result<()> {
        let mut outcome = self.session.process(&mut self.quote, key, Origin::Keyboard)?;
        if outcome == Outcome::Continue {
            outcome = self.session.drain(&mut self.quote)?;
        }
        self.apply(outcome)
    }

    fn apply(&mut self, outcome: Outcome) -> Result<()> {
        match outcome {
            Outcome::Continue => self.refresh_bars(),
            Outcome::Restart => {
                self.quote = Quote::new(self.quote.lines().to_vec());
                self.load();
            }
            Outcome::Stop => {
                self.session.update_player_speed(&self.quote);
                self.session.update_robot_pos(&self.quote);
                self.refresh_bars();
                self.state = AppState::Results;
                info!(
                    speed = self.unit.from_cps(self.quote.stats.speed()),
                    unit = %self.unit,
                    accuracy = self.quote.stats.accuracy(),
                    "round finished"
                );
            }
            Outcome::Break => self.next_quote()?,
        }
        Ok(())
    }

    fn next_quote(&mut self) -> Result<()> {
        match self.generator.next_quote() {
            Ok(quote) => {
                self.quote = quote;
                self.rounds += 1;
                self.load();
                Ok(())
            }
            Err(Error::SourceExhausted) => {
                debug!("quote source exhausted");
                self.quit = true;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn load(&mut self) {
        self.session.load(&self.quote);
        self.state = AppState::Typing;
        let strlen = self.quote.strlen();
        self.player_bar.set_end(strlen);
        self.robot_bar.set_end(strlen);
        self.refresh_bars();
    }

    fn refresh_bars(&mut self) {
        self.player_bar.set_cur(self.session.player.pos);
        self.robot_bar.set_cur(self.session.robot.pos);
    }

    pub fn on_tick(&mut self) {
        if self.quote.stats.timer.is_running() {
            self.session.update_robot_pos(&self.quote);
            self.session.update_player_speed(&self.quote);
            self.refresh_bars();
        }
    }

    /// Follows a new terminal size. The quote is wrapped again as long as the round
    /// has not started.
    pub fn on_resize(&mut self, cols: u16, _rows: u16) {
        let available = cols.saturating_sub(2 * HORIZONTAL_MARGIN) as usize;
        let target = available.min(self.generator.maxwidth());
        let dx = target as i64 - self.generator.width() as i64;
        let dx = dx.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        if dx == 0 {
            return;
        }

        self.generator.resize(0, dx);
        self.session.resize(0, dx);
        self.player_bar.resize(0, dx);
        self.robot_bar.resize(0, dx);
        debug!(width = self.generator.width(), "viewport resized");

        if self.state == AppState::Typing && self.quote.stats.timer.is_unset() {
            if let Some(quote) = self.generator.rewrap() {
                self.quote = quote;
                self.load();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Player, SessionConfig};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn app(text: &'static str, maxwidth: usize) -> App {
        let generator = QuoteGenerator::new(
            move |_: usize| -> Option<String> { Some(text.to_string()) },
            5,
            maxwidth,
        );
        let session = Session::new(
            SessionConfig::default(),
            Player::new("you", 0.0),
            Player::new("robot", 0.0),
        );
        App::new(generator, session, SpeedUnit::Cpm).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(Key::Char(ch)).unwrap();
        }
    }

    #[test]
    fn test_finishing_shows_results() {
        let mut app = app("foo bar", 20);
        type_text(&mut app, "foo bar");
        assert_eq!(app.state, AppState::Results);
        assert!(app.quote.stats.timer.is_stopped());
        assert_eq!(app.player_bar.pos(), 1.0);

        app.handle_key(Key::Enter).unwrap();
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.rounds, 2);
        assert_eq!(app.session.player.pos, 0);
    }

    #[test]
    fn test_restart_keeps_lines() {
        let mut app = app("foo bar", 20);
        type_text(&mut app, "fox");
        assert!(!app.quote.stats.typos.is_empty());

        app.handle_key(Key::Cancel).unwrap();
        assert_eq!(app.quote.lines(), &["foo bar"]);
        assert!(app.quote.stats.typos.is_empty());
        assert!(app.quote.stats.timer.is_unset());
        assert_eq!(app.rounds, 1);
    }

    #[test]
    fn test_exhausted_source_quits() {
        let mut calls = 0;
        let generator = QuoteGenerator::new(
            move |_: usize| -> Option<String> {
                calls += 1;
                (calls == 1).then(|| "abc".to_string())
            },
            5,
            20,
        );
        let session = Session::new(
            SessionConfig::default(),
            Player::new("you", 0.0),
            Player::new("robot", 0.0),
        );
        let mut app = App::new(generator, session, SpeedUnit::Cpm).unwrap();

        app.handle_key(Key::Eot).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app("foo", 20);
        app.handle_event(TrainerEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn test_resize_rewraps_until_started() {
        let mut app = app("aaaa bbbb cccc", 20);
        assert_eq!(app.quote.lines(), &["aaaa bbbb cccc"]);

        app.on_resize(10 + 2 * HORIZONTAL_MARGIN, 24);
        assert_eq!(app.generator().width(), 10);
        assert_eq!(app.quote.lines(), &["aaaa bbbb", "cccc"]);

        type_text(&mut app, "a");
        app.on_resize(5 + 2 * HORIZONTAL_MARGIN, 24);
        assert_eq!(app.generator().width(), 5);
        assert_eq!(app.quote.lines(), &["aaaa bbbb", "cccc"]);
        assert_eq!(app.session.player.pos, 1);
    }

    #[test]
    fn test_resize_never_exceeds_maxwidth() {
        let mut app = app("foo", 20);
        app.on_resize(200, 50);
        assert_eq!(app.generator().width(), 20);
    }
}
