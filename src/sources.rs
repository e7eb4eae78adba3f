use std::{fs, path::PathBuf};

use cgisf_lib::cgisf;
use include_dir::{include_dir, Dir};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    quote_generator::QuoteSource,
};

static QUOTE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/quotes");

/// Splits text into paragraphs separated by blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// Cuts text down to at most `maxsize` characters, at a whitespace boundary when
/// there is one.
pub fn trim_to_size(text: &str, maxsize: usize) -> String {
    if text.chars().count() <= maxsize {
        return text.to_string();
    }
    let head: String = text.chars().take(maxsize).collect();
    match head.rfind(char::is_whitespace) {
        Some(cut) if cut > 0 => head[..cut].trim_end().to_string(),
        _ => head,
    }
}

/// Picks random paragraphs out of a fixed collection.
#[derive(Debug, Clone, Default)]
pub struct ParagraphSource {
    paragraphs: Vec<String>,
}

impl ParagraphSource {
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self { paragraphs }
    }

    /// The corpus bundled with the binary.
    pub fn builtin() -> Self {
        let paragraphs = QUOTE_DIR
            .files()
            .filter_map(|file| file.contents_utf8())
            .flat_map(paragraphs)
            .collect::<Vec<_>>();
        debug!(count = paragraphs.len(), "loaded builtin quotes");
        Self { paragraphs }
    }

    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let mut collected = Vec::new();
        for path in paths {
            let text = fs::read_to_string(path).map_err(|error| Error::ReadSource {
                path: path.clone(),
                error,
            })?;
            let found = paragraphs(&text);
            if found.is_empty() {
                warn!(path = %path.display(), "quote file has no text");
            }
            collected.extend(found);
        }
        debug!(count = collected.len(), files = paths.len(), "loaded quote files");
        Ok(Self::new(collected))
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

impl QuoteSource for ParagraphSource {
    fn fetch(&mut self, maxsize: usize) -> Option<String> {
        let mut rng = rand::thread_rng();
        self.paragraphs
            .choose(&mut rng)
            .map(|paragraph| trim_to_size(paragraph, maxsize))
    }
}

/// Random nonsense sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSource;

impl QuoteSource for SentenceSource {
    fn fetch(&mut self, maxsize: usize) -> Option<String> {
        let rng = &mut rand::thread_rng();
        let count = rng.gen_range(1..4);
        let text = (0..count)
            .map(|_| {
                cgisf(
                    rng.gen_range(1..3),
                    rng.gen_range(1..3),
                    rng.gen_range(1..5),
                    rng.gen_bool(0.5),
                    rng.gen_range(1..3),
                    rng.gen_bool(0.5),
                )
            })
            .map(|sentence| sentence.trim().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Some(trim_to_size(&text, maxsize))
    }
}

/// The same text every round.
#[derive(Debug, Clone)]
pub struct FixedSource(pub String);

impl QuoteSource for FixedSource {
    fn fetch(&mut self, maxsize: usize) -> Option<String> {
        Some(trim_to_size(&self.0, maxsize))
    }
}

/// Picks the source from the user's choices. A prompt wins over files, files win
/// over sentences, the builtin corpus is the fallback.
pub fn select_source(
    prompt: Option<String>,
    files: &[PathBuf],
    sentences: bool,
) -> Result<Box<dyn QuoteSource>> {
    if let Some(prompt) = prompt {
        return Ok(Box::new(FixedSource(prompt)));
    }
    if !files.is_empty() {
        return Ok(Box::new(ParagraphSource::from_files(files)?));
    }
    if sentences {
        return Ok(Box::new(SentenceSource));
    }
    Ok(Box::new(ParagraphSource::builtin()))
}
