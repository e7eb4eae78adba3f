use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    quote::Quote,
    resize::{apply_delta, Resize},
};

pub const DEFAULT_TABSIZE: usize = 8;

/// How many empty candidates are skipped before giving up on a source.
const MAX_ATTEMPTS: usize = 16;

/// Supplier of raw candidate text.
pub trait QuoteSource {
    /// Next candidate of at most about `maxsize` characters, or `None` once exhausted.
    fn fetch(&mut self, maxsize: usize) -> Option<String>;
}

impl<F> QuoteSource for F
where
    F: FnMut(usize) -> Option<String>,
{
    fn fetch(&mut self, maxsize: usize) -> Option<String> {
        self(maxsize)
    }
}

/// Options applied when turning raw text into quote lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    /// Trim every line and collapse runs of whitespace.
    pub strip: bool,
    pub tabsize: usize,
    /// Wrap column. 0 wraps at the generator width.
    pub wrap: usize,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            strip: false,
            tabsize: DEFAULT_TABSIZE,
            wrap: 0,
        }
    }
}

/// Turns raw text from a [`QuoteSource`] into [`Quote`]s that fit the viewport.
pub struct QuoteGenerator {
    source: Box<dyn QuoteSource>,
    maxlines: usize,
    maxwidth: usize,
    width: usize,
    options: CleanOptions,
    raw: Option<String>,
}

impl QuoteGenerator {
    pub fn new(source: impl QuoteSource + 'static, maxlines: usize, maxwidth: usize) -> Self {
        Self::from_boxed(Box::new(source), maxlines, maxwidth)
    }

    pub fn from_boxed(source: Box<dyn QuoteSource>, maxlines: usize, maxwidth: usize) -> Self {
        Self {
            source,
            maxlines,
            maxwidth,
            width: maxwidth,
            options: CleanOptions::default(),
            raw: None,
        }
    }

    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    /// Overrides the wrap width derived from `maxwidth`.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn maxlines(&self) -> usize {
        self.maxlines
    }

    pub fn maxwidth(&self) -> usize {
        self.maxwidth
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// The column lines are wrapped at, 0 when wrapping is disabled.
    pub fn wrap_width(&self) -> usize {
        match self.options.wrap {
            0 => self.width,
            wrap => wrap.min(self.width),
        }
    }

    /// Raw text of the most recent quote.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Pulls the next raw candidate from the source without cleaning it.
    pub fn fetch_raw(&mut self) -> Option<String> {
        self.source.fetch(self.maxlines * self.maxwidth)
    }

    pub fn next_quote(&mut self) -> Result<Quote> {
        for _ in 0..MAX_ATTEMPTS {
            let raw = self.fetch_raw().ok_or(Error::SourceExhausted)?;
            let lines = self.clean(&raw);
            if lines.iter().any(|line| !line.is_empty()) {
                debug!(lines = lines.len(), chars = raw.len(), "generated quote");
                self.raw = Some(raw);
                return Ok(Quote::new(lines));
            }
            warn!("skipping quote candidate without any text");
        }
        Err(Error::SourceExhausted)
    }

    /// Cleans the cached raw text again, picking up a changed width.
    pub fn rewrap(&self) -> Option<Quote> {
        self.raw.as_deref().map(|raw| Quote::new(self.clean(raw)))
    }

    /// Cleans raw text into quote lines. Pure in `raw` and the current options.
    pub fn clean(&self, raw: &str) -> Vec<String> {
        let wrap = self.wrap_width();

        raw.lines()
            .map(|line| {
                let line = expand_tabs(line, self.options.tabsize);
                if self.options.strip {
                    collapse_whitespace(&line)
                } else {
                    line
                }
            })
            .flat_map(|line| match wrap {
                0 => vec![line.chars().take(self.maxwidth).collect()],
                width => wrap_line(&line, width),
            })
            .take(self.maxlines)
            .collect()
    }
}

impl Iterator for QuoteGenerator {
    type Item = Quote;

    fn next(&mut self) -> Option<Quote> {
        self.next_quote().ok()
    }
}

impl Resize for QuoteGenerator {
    /// Only the width follows the viewport, the line budget stays fixed.
    fn resize(&mut self, _dy: i32, dx: i32) {
        self.width = apply_delta(self.width, dx);
    }
}

/// Replaces tabs with spaces up to the next multiple of `tabsize`.
pub fn expand_tabs(line: &str, tabsize: usize) -> String {
    let mut expanded = String::with_capacity(line.len());
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            if tabsize > 0 {
                let fill = tabsize - column % tabsize;
                expanded.extend(std::iter::repeat(' ').take(fill));
                column += fill;
            }
        } else {
            expanded.push(ch);
            column += 1;
        }
    }
    expanded
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a line into alternating runs of whitespace and words.
fn chunks(line: &str) -> VecDeque<String> {
    let mut chunks = VecDeque::new();
    let mut current = String::new();
    let mut in_space = false;
    for ch in line.chars() {
        let space = ch.is_whitespace();
        if !current.is_empty() && space != in_space {
            chunks.push_back(std::mem::take(&mut current));
        }
        in_space = space;
        current.push(ch);
    }
    if !current.is_empty() {
        chunks.push_back(current);
    }
    chunks
}

fn is_blank(chunk: &str) -> bool {
    chunk.chars().all(char::is_whitespace)
}

/// Greedy word wrap.
///
/// Whitespace at a break is dropped, the first line keeps its indentation and words
/// wider than `width` are split. An empty line stays a single empty line.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut chunks = chunks(line);
    let mut lines = Vec::new();

    while !chunks.is_empty() {
        if !lines.is_empty() && chunks.front().is_some_and(|chunk| is_blank(chunk)) {
            chunks.pop_front();
        }

        let mut current: Vec<String> = Vec::new();
        let mut current_len = 0;
        while let Some(chunk) = chunks.front() {
            let len = chunk.chars().count();
            if current_len + len > width {
                break;
            }
            current_len += len;
            current.extend(chunks.pop_front());
        }

        if let Some(chunk) = chunks.front_mut() {
            if chunk.chars().count() > width && (current_len < width || current.is_empty()) {
                let space_left = width.saturating_sub(current_len).max(1);
                let head: String = chunk.chars().take(space_left).collect();
                let tail: String = chunk.chars().skip(space_left).collect();
                current_len += space_left;
                current.push(head);
                *chunk = tail;
            }
        }

        if current.last().is_some_and(|chunk| is_blank(chunk)) {
            current.pop();
        }
        if !current.is_empty() {
            lines.push(current.concat());
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

    const PARAGRAPHS: &str = " foo\tbarbaz    qux \nabcdefghijklmnopqrstuvwxyz\n\nxxx\tyyy zzz\n\n abc ";

    fn expected_paragraphs() -> Vec<String> {
        [
            " foo",
            "barbaz",
            "qux",
            "abcdefghij",
            "klmnopqrst",
            "uvwxyz",
            "",
            "xxx yyy",
            "zzz",
            "",
        ]
        .map(String::from)
        .to_vec()
    }

    fn generator(raw: &'static str, maxlines: usize, maxwidth: usize) -> QuoteGenerator {
        QuoteGenerator::new(
            move |maxsize: usize| -> Option<String> { Some(raw.chars().take(maxsize).collect()) },
            maxlines,
            maxwidth,
        )
    }

    #[test]
    fn test_fetch_raw_respects_size_hint() {
        let mut quotegen = generator(ALPHABET, 2, 10);
        assert_eq!(quotegen.fetch_raw().unwrap(), &ALPHABET[..20]);
    }

    #[test]
    fn test_iteration() {
        let mut quotegen = generator(ALPHABET, 2, 10);
        let quote = quotegen.next().unwrap();
        assert_eq!(quote.strlen(), 20);
        assert_eq!(quote.lines(), &[&ALPHABET[..10], &ALPHABET[10..20]]);
        assert_eq!(quotegen.raw(), Some(&ALPHABET[..20]));
    }

    #[test]
    fn test_clean_width_and_line_budget() {
        let mut quotegen = generator(ALPHABET, 2, 10);
        let raw = quotegen.fetch_raw().unwrap();

        quotegen.set_width(20);
        assert_eq!(quotegen.clean(&raw), vec![&ALPHABET[..20]]);

        quotegen.set_width(10);
        assert_eq!(quotegen.clean(&raw), vec![&ALPHABET[..10], &ALPHABET[10..20]]);

        quotegen.set_width(5);
        assert_eq!(quotegen.clean(&raw), vec![&ALPHABET[..5], &ALPHABET[5..10]]);
    }

    #[test]
    fn test_clean_strip() {
        let raw = " foo barbaz    qux ";
        let strip = generator(raw, 1, 50).with_options(CleanOptions {
            strip: true,
            ..Default::default()
        });
        assert_eq!(strip.clean(raw), vec!["foo barbaz qux"]);

        let keep = generator(raw, 1, 50);
        assert_eq!(keep.clean(raw), vec![" foo barbaz    qux"]);
    }

    #[test]
    fn test_clean_expands_tabs() {
        let raw = " foo\tbarbaz    qux ";
        let eight = generator(raw, 1, 50).with_options(CleanOptions {
            tabsize: 8,
            ..Default::default()
        });
        assert_eq!(eight.clean(raw), vec![" foo    barbaz    qux"]);

        let five = generator(raw, 1, 50).with_options(CleanOptions {
            tabsize: 5,
            ..Default::default()
        });
        assert_eq!(five.clean(raw), vec![" foo barbaz    qux"]);
    }

    #[test]
    fn test_clean_wraps_paragraphs() {
        let options = |wrap| CleanOptions {
            strip: false,
            tabsize: 4,
            wrap,
        };

        let explicit = generator(PARAGRAPHS, 10, 50).with_options(options(10));
        assert_eq!(explicit.clean(PARAGRAPHS), expected_paragraphs());

        // wrap column past the last column
        let clamped = generator(PARAGRAPHS, 10, 10).with_options(options(20));
        assert_eq!(clamped.clean(PARAGRAPHS), expected_paragraphs());

        let auto = generator(PARAGRAPHS, 10, 10).with_options(options(0));
        assert_eq!(auto.clean(PARAGRAPHS), expected_paragraphs());

        let auto_with_width = generator(PARAGRAPHS, 10, 50)
            .with_options(options(0))
            .with_width(10);
        assert_eq!(auto_with_width.clean(PARAGRAPHS), expected_paragraphs());
    }

    #[test]
    fn test_resize_rewraps() {
        let mut quotegen = generator(PARAGRAPHS, 10, 50).with_options(CleanOptions {
            strip: false,
            tabsize: 4,
            wrap: 0,
        });
        let raw = quotegen.fetch_raw().unwrap();
        assert_ne!(quotegen.clean(&raw), expected_paragraphs());

        quotegen.resize(0, -40);
        assert_eq!(quotegen.width(), 10);
        assert_eq!(quotegen.clean(&raw), expected_paragraphs());
        // cleaning is repeatable
        assert_eq!(quotegen.clean(&raw), expected_paragraphs());

        quotegen.resize(0, -40);
        assert_eq!(quotegen.width(), 0);
    }

    #[test]
    fn test_rewrap_uses_cached_text() {
        let mut quotegen = generator("aaa bbb ccc", 5, 20);
        assert!(quotegen.rewrap().is_none());

        let quote = quotegen.next().unwrap();
        assert_eq!(quote.lines(), &["aaa bbb ccc"]);

        quotegen.resize(0, -15);
        let rewrapped = quotegen.rewrap().unwrap();
        assert_eq!(rewrapped.lines(), &["aaa", "bbb", "ccc"]);
    }

    #[test]
    fn test_zero_width_truncates() {
        let quotegen = generator("", 2, 4).with_width(0);
        assert_eq!(quotegen.wrap_width(), 0);
        assert_eq!(
            quotegen.clean("abcdef ghi\nxy\nzzz"),
            vec!["abcd".to_string(), "xy".to_string()]
        );
    }

    #[test]
    fn test_skips_blank_candidates() {
        let mut calls = 0;
        let mut quotegen = QuoteGenerator::new(
            move |_: usize| -> Option<String> {
                calls += 1;
                Some(if calls < 3 { "   \n".into() } else { "text".into() })
            },
            3,
            10,
        );
        assert_eq!(quotegen.next().unwrap().lines(), &["text"]);
    }

    #[test]
    fn test_exhausted_source() {
        let mut quotegen = QuoteGenerator::new(|_: usize| -> Option<String> { None }, 3, 10);
        assert!(matches!(quotegen.next_quote(), Err(Error::SourceExhausted)));
        assert!(quotegen.next().is_none());
    }

    #[test]
    fn test_wrap_line_splits_long_words_into_remaining_space() {
        assert_eq!(wrap_line("ab abcdefghijklmno", 10), vec!["ab abcdefg", "hijklmno"]);
        assert_eq!(wrap_line("", 10), vec![""]);
        assert_eq!(wrap_line("    ", 10), vec![""]);
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("a\tb", 4), "a   b");
        assert_eq!(expand_tabs("\t", 4), "    ");
        assert_eq!(expand_tabs("abcd\tx", 4), "abcd    x");
        assert_eq!(expand_tabs("a\tb", 0), "ab");
    }
}
