use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    resize::{apply_delta, Resize},
};

pub const BACKSPACE: char = '\x08';
pub const DELETE: char = '\x7f';

/// Comment markers that continue onto the next line, and what they continue as.
const COMMENT_MARKERS: [(&str, &str); 4] = [("/*", " *"), ("//", "//"), ("#", "#"), ("*", "*")];
const COMMENT_CLOSE: &str = "*/";

/// A fixed size character grid with an editing cursor.
///
/// The last cell is never written, so a full pad keeps its cursor in place instead
/// of running off the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pad {
    height: usize,
    width: usize,
    cells: Vec<Vec<char>>,
    row: usize,
    col: usize,
    /// Column each row was left at by a newline.
    breaks: HashMap<usize, usize>,
}

impl Pad {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![vec![' '; width]; height],
            row: 0,
            col: 0,
            breaks: HashMap::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn move_to(&mut self, row: usize, col: usize) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(Error::OutOfRange {
                row,
                col,
                height: self.height,
                width: self.width,
            });
        }
        self.row = row;
        self.col = col;
        Ok(())
    }

    /// Character at a cell, blank outside of the grid.
    pub fn cell(&self, row: usize, col: usize) -> char {
        self.cells
            .get(row)
            .and_then(|line| line.get(col))
            .copied()
            .unwrap_or(' ')
    }

    pub fn line(&self, row: usize) -> String {
        self.cells
            .get(row)
            .map(|line| line.iter().collect())
            .unwrap_or_default()
    }

    fn is_last_cell(&self, row: usize, col: usize) -> bool {
        row + 1 >= self.height && col + 1 >= self.width
    }

    /// Dispatches newlines and backspaces, everything else is written.
    pub fn putch(&mut self, ch: char) {
        match ch {
            '\n' | '\r' => self.newline(),
            BACKSPACE | DELETE => self.backspace(),
            ch => self.put(ch),
        }
    }

    pub fn put(&mut self, ch: char) {
        if self.height == 0 || self.width == 0 || self.is_last_cell(self.row, self.col) {
            return;
        }
        self.cells[self.row][self.col] = ch;
        if self.col + 1 < self.width {
            self.col += 1;
        } else {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn newline(&mut self) {
        if self.row + 1 >= self.height {
            return;
        }
        self.breaks.insert(self.row, self.col);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        match (self.row, self.col) {
            (0, 0) => {}
            (row, 0) => {
                self.row = row - 1;
                match self.breaks.remove(&self.row) {
                    Some(col) => self.col = col,
                    None => {
                        self.col = self.width.saturating_sub(1);
                        self.cells[self.row][self.col] = ' ';
                    }
                }
            }
            (row, col) => {
                self.col = col - 1;
                self.cells[row][self.col] = ' ';
            }
        }
    }

    /// First non-blank column at or after `skip`, 0 when there is none.
    pub fn sol(&self, row: usize, skip: usize) -> usize {
        (skip..self.width)
            .find(|&col| self.cell(row, col) != ' ')
            .unwrap_or(0)
    }

    /// Column after the last non-blank cell, 0 for a blank row.
    pub fn eol(&self, row: usize) -> usize {
        (0..self.width)
            .rev()
            .find(|&col| self.cell(row, col) != ' ')
            .map_or(0, |col| col + 1)
    }

    /// Prefix that continues a comment started on `row` onto the next line.
    ///
    /// Only `row[fromcol..tocol]` is looked at and the marker has to be its first
    /// non-blank text. With `indent` the whitespace after the marker is carried over,
    /// but only while that leaves room for one more character within `budget`.
    pub fn continue_comment(
        &self,
        row: usize,
        fromcol: usize,
        tocol: usize,
        budget: usize,
        indent: bool,
    ) -> Option<String> {
        let text: String = (fromcol..tocol.min(self.width))
            .map(|col| self.cell(row, col))
            .collect();
        let text = text.trim_start();
        if text.contains(COMMENT_CLOSE) {
            return None;
        }

        let (marker, continuation) = COMMENT_MARKERS
            .iter()
            .find(|(marker, _)| text.starts_with(marker))?;
        let rest = &text[marker.len()..];
        let spacing = &rest[..rest.len() - rest.trim_start().len()];

        let indented = format!("{continuation}{spacing}");
        if indent && indented.chars().count() < budget {
            Some(indented)
        } else if continuation.chars().count() <= budget {
            Some(continuation.to_string())
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        for line in &mut self.cells {
            line.fill(' ');
        }
        self.row = 0;
        self.col = 0;
        self.breaks.clear();
    }

    /// Replaces the grid with an empty one of the given size.
    pub fn reshape(&mut self, height: usize, width: usize) {
        *self = Self::new(height, width);
    }
}

/// Viewport onto a [`Pad`] that keeps the cursor visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBox {
    pad: Pad,
    height: usize,
    width: usize,
    top: usize,
    left: usize,
}

impl InputBox {
    /// An input box whose pad matches the viewport.
    pub fn new(height: usize, width: usize) -> Self {
        Self::with_pad(height, width, height, width)
    }

    pub fn with_pad(height: usize, width: usize, pad_height: usize, pad_width: usize) -> Self {
        Self {
            pad: Pad::new(pad_height, pad_width),
            height,
            width,
            top: 0,
            left: 0,
        }
    }

    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Pad coordinates of the viewport's top left corner.
    pub fn offset(&self) -> (usize, usize) {
        (self.top, self.left)
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.pad.cursor()
    }

    pub fn move_to(&mut self, row: usize, col: usize) -> Result<()> {
        self.pad.move_to(row, col)?;
        self.scroll();
        Ok(())
    }

    pub fn putch(&mut self, ch: char) {
        self.pad.putch(ch);
        self.scroll();
    }

    pub fn cell(&self, row: usize, col: usize) -> char {
        self.pad.cell(row, col)
    }

    pub fn line(&self, row: usize) -> String {
        self.pad.line(row)
    }

    pub fn sol(&self, row: usize, skip: usize) -> usize {
        self.pad.sol(row, skip)
    }

    pub fn eol(&self, row: usize) -> usize {
        self.pad.eol(row)
    }

    pub fn continue_comment(
        &self,
        row: usize,
        fromcol: usize,
        tocol: usize,
        budget: usize,
        indent: bool,
    ) -> Option<String> {
        self.pad.continue_comment(row, fromcol, tocol, budget, indent)
    }

    pub fn reset(&mut self) {
        self.pad.reset();
        self.top = 0;
        self.left = 0;
    }

    /// Starts over on an empty pad of the given size.
    pub fn reshape_pad(&mut self, height: usize, width: usize) {
        self.pad.reshape(height, width);
        self.top = 0;
        self.left = 0;
    }

    pub fn set_viewport(&mut self, height: usize, width: usize) {
        self.height = height;
        self.width = width;
        self.top = 0;
        self.left = 0;
        self.scroll();
    }

    fn scroll(&mut self) {
        let (row, col) = self.pad.cursor();
        if row < self.top {
            self.top = row;
        } else if self.height > 0 && row >= self.top + self.height {
            self.top = row + 1 - self.height;
        }
        if col < self.left {
            self.left = col;
        } else if self.width > 0 && col >= self.left + self.width {
            self.left = col + 1 - self.width;
        }
    }
}

impl Resize for InputBox {
    fn resize(&mut self, dy: i32, dx: i32) {
        self.set_viewport(apply_delta(self.height, dy), apply_delta(self.width, dx));
    }
}
