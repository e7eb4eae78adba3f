use crate::stats::InputStats;

/// A passage to type, already cleaned and wrapped into lines.
///
/// Positions are `(row, col)` pairs into [`Quote::lines`]. Every position maps onto a
/// flat offset into the concatenated lines (see [`Quote::strpos`]); positions past the
/// end clamp to [`Quote::strlen`].
#[derive(Debug, Clone, Default)]
pub struct Quote {
    lines: Vec<String>,
    strlen: usize,
    pub stats: InputStats,
}

impl Quote {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        let strlen = lines.iter().map(|line| line.chars().count()).sum();
        Self {
            lines,
            strlen,
            stats: InputStats::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strlen == 0
    }

    /// Total number of characters over all lines.
    pub fn strlen(&self) -> usize {
        self.strlen
    }

    /// Width of the widest line.
    pub fn width(&self) -> usize {
        (0..self.lines.len())
            .map(|row| self.eol(row))
            .max()
            .unwrap_or(0)
    }

    /// Flat offset of a position, clamped to `strlen`.
    pub fn strpos(&self, row: usize, col: usize) -> usize {
        if row >= self.lines.len() {
            return self.strlen;
        }
        let before: usize = (0..row).map(|r| self.eol(r)).sum();
        before + col.min(self.eol(row))
    }

    /// Whether the position points at a character of the quote.
    pub fn in_range(&self, row: usize, col: usize) -> bool {
        row < self.lines.len() && col < self.eol(row)
    }

    /// Length of a line, 0 for rows outside of the quote.
    pub fn eol(&self, row: usize) -> usize {
        self.line(row).map_or(0, |line| line.chars().count())
    }

    /// Length of a line without its trailing whitespace.
    pub fn trimmed_eol(&self, row: usize) -> usize {
        self.line(row)
            .map_or(0, |line| line.trim_end().chars().count())
    }

    /// Leading whitespace of a line.
    pub fn indentation(&self, row: usize) -> &str {
        self.line(row).map_or("", |line| {
            let trimmed = line.trim_start();
            &line[..line.len() - trimmed.len()]
        })
    }

    pub fn is_eol(&self, row: usize, col: usize) -> bool {
        row < self.lines.len() && col >= self.eol(row)
    }

    pub fn is_last_line(&self, row: usize) -> bool {
        row + 1 >= self.lines.len()
    }

    pub fn is_complete(&self, row: usize, col: usize) -> bool {
        self.strpos(row, col) >= self.strlen
    }

    /// The character expected at a position.
    pub fn expected(&self, row: usize, col: usize) -> Option<char> {
        self.line(row).and_then(|line| line.chars().nth(col))
    }

    /// Compares `ch` with the expected character. Positions outside of the quote are
    /// always typos.
    ///
    /// With `record` the outcome is booked into [`Quote::stats`]: a typo marks the
    /// position and counts the confusion, a correct character clears a previously
    /// marked position. Keystroke counters are left to the caller.
    pub fn is_typo(&mut self, row: usize, col: usize, ch: char, record: bool) -> bool {
        let Some(expected) = self.expected(row, col) else {
            return true;
        };

        let typo = expected != ch;
        if record {
            if typo {
                self.stats.add_typo(row, col, 0);
                self.stats.record_confusion(expected, ch);
            } else if self.stats.typos.contains_key(&(row, col)) {
                self.stats.fix_typo(row, col, 0);
            }
        }
        typo
    }

    /// No position is currently marked as a typo.
    pub fn is_correct(&self) -> bool {
        !self.stats.has_live_typos()
    }
}
