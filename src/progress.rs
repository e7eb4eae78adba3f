use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::resize::{apply_delta, Resize};

/// Maps a bounded counter onto a number of filled cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressBar {
    cur: usize,
    end: usize,
    width: usize,
}

impl ProgressBar {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    pub fn cur(&self) -> usize {
        self.cur
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// May run past `end`, only [`ProgressBar::pos`] is clamped.
    pub fn set_cur(&mut self, cur: usize) {
        self.cur = cur;
    }

    /// An `end` of 0 also rewinds the counter.
    pub fn set_end(&mut self, end: usize) {
        self.end = end;
        if end == 0 {
            self.cur = 0;
        }
    }

    /// Progress between 0 and 1.
    pub fn pos(&self) -> f64 {
        if self.end == 0 {
            return 0.0;
        }
        (self.cur as f64 / self.end as f64).min(1.0)
    }

    pub fn filled(&self) -> usize {
        (self.pos() * self.width as f64).floor() as usize
    }
}

impl Resize for ProgressBar {
    fn resize(&mut self, _dy: i32, dx: i32) {
        self.width = apply_delta(self.width, dx);
    }
}

/// Draws a [`ProgressBar`] on the first row of the area.
pub struct Bar<'a> {
    progress: &'a ProgressBar,
    style: Style,
    symbol: &'a str,
}

impl<'a> Bar<'a> {
    pub fn new(progress: &'a ProgressBar) -> Self {
        Self {
            progress,
            style: Style::default().add_modifier(Modifier::REVERSED),
            symbol: " ",
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn symbol(mut self, symbol: &'a str) -> Self {
        self.symbol = symbol;
        self
    }
}

impl Widget for Bar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let filled = self.progress.filled().min(area.width as usize) as u16;
        for x in area.left()..area.left() + filled {
            buf[(x, area.top())]
                .set_symbol(self.symbol)
                .set_style(self.style);
        }
    }
}
