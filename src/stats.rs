use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::timer::Timer;

/// Average word length used by the words-per-minute unit.
pub const AVERAGE_WORD_LENGTH: f64 = 5.0;

/// Characters on an average page, used by the pages-per-minute unit.
pub const AVERAGE_PAGE_LENGTH: f64 = 250.0;

/// Display unit for typing speed. Speeds are stored in characters per second.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    #[strum(serialize = "CPS")]
    Cps,
    #[default]
    #[strum(serialize = "CPM")]
    Cpm,
    #[strum(serialize = "WPM")]
    Wpm,
    #[strum(serialize = "PPM")]
    Ppm,
    #[strum(serialize = "CPH")]
    Cph,
}

impl SpeedUnit {
    /// How many of this unit one character per second is worth.
    pub fn multiplier(&self) -> f64 {
        match self {
            SpeedUnit::Cps => 1.0,
            SpeedUnit::Cpm => 60.0,
            SpeedUnit::Wpm => 60.0 / AVERAGE_WORD_LENGTH,
            SpeedUnit::Ppm => 60.0 / AVERAGE_PAGE_LENGTH,
            SpeedUnit::Cph => 3600.0,
        }
    }

    pub fn from_cps(&self, cps: f64) -> f64 {
        cps * self.multiplier()
    }

    pub fn to_cps(&self, value: f64) -> f64 {
        value / self.multiplier()
    }
}

/// One expected character together with the wrong characters typed in its place.
pub type TypoRanking = Vec<(char, Vec<(char, usize)>)>;

/// Per quote input statistics.
#[derive(Debug, Clone, Default)]
pub struct InputStats {
    /// Positions that were typed wrong. `true` while the error is still present.
    pub typos: HashMap<(usize, usize), bool>,
    /// expected character -> typed character -> count
    pub typocounts: BTreeMap<char, BTreeMap<char, usize>>,
    pub keystrokes_good: usize,
    pub keystrokes_typo: usize,
    pub keystrokes_tab: usize,
    pub keystrokes_space: usize,
    pub keystrokes_enter: usize,
    pub timer: Timer,
}

impl InputStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_typo(&mut self, row: usize, col: usize, count: usize) {
        self.typos.insert((row, col), true);
        self.keystrokes_typo += count;
    }

    pub fn fix_typo(&mut self, row: usize, col: usize, count: usize) {
        self.typos.insert((row, col), false);
        self.keystrokes_good += count;
    }

    pub fn record_confusion(&mut self, expected: char, typed: char) {
        *self
            .typocounts
            .entry(expected)
            .or_default()
            .entry(typed)
            .or_insert(0) += 1;
    }

    pub fn has_live_typos(&self) -> bool {
        self.typos.values().any(|&wrong| wrong)
    }

    /// Good keystrokes per whole elapsed second. Zero until a full second has passed.
    pub fn speed(&self) -> f64 {
        let seconds = self.timer.elapsed().as_secs();
        if seconds == 0 {
            return 0.0;
        }
        self.keystrokes_good as f64 / seconds as f64
    }

    /// Share of good keystrokes in percent.
    pub fn accuracy(&self) -> f64 {
        let total = self.keystrokes_good + self.keystrokes_typo;
        if total == 0 {
            return 0.0;
        }
        (self.keystrokes_good as f64 / total as f64 * 100.0).round()
    }

    /// Most mistyped characters first, ranked by their total mistake count.
    ///
    /// Ties are broken by character order, both for the expected characters and for
    /// the substitutions listed under each of them.
    pub fn typo_highscore(&self) -> TypoRanking {
        self.typocounts
            .iter()
            .map(|(&expected, typed)| {
                let substitutions = typed
                    .iter()
                    .map(|(&ch, &count)| (ch, count))
                    .sorted_by(|a, b| b.1.cmp(&a.1))
                    .collect::<Vec<_>>();
                (expected, substitutions)
            })
            .sorted_by_key(|(_, substitutions)| {
                std::cmp::Reverse(substitutions.iter().map(|(_, count)| count).sum::<usize>())
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.typos.clear();
        self.typocounts.clear();
        self.keystrokes_good = 0;
        self.keystrokes_typo = 0;
        self.keystrokes_tab = 0;
        self.keystrokes_space = 0;
        self.keystrokes_enter = 0;
        self.timer.reset();
    }
}
