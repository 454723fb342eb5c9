//! Recursive character text splitter
//!
//! Splits text on the coarsest separator present (paragraph, line, sentence,
//! word, then single characters), greedily merges the pieces back into windows
//! of at most `chunk_size` characters, and carries up to `chunk_overlap`
//! characters from the end of one window into the next. Every length here is a
//! count of `char`s, not bytes.

use regex::Regex;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::warn;

use grounded_core::{Document, Error, IndexingConfig, Result, START_INDEX_KEY};

/// Separators tried in order: paragraph, line, sentence, word, character.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveCharacterTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    keep_separator: bool,
    is_separator_regex: bool,
    strip_whitespace: bool,
    add_start_index: bool,
}

/// A separator compiled for one `split_text` call. `None` is the empty
/// separator, which splits into single characters.
struct Separator {
    text: String,
    pattern: Option<Regex>,
}

impl RecursiveCharacterTextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidInput("chunk_size must be greater than 0".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::InvalidInput(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            keep_separator: true,
            is_separator_regex: false,
            strip_whitespace: true,
            add_start_index: true,
        })
    }

    pub fn from_config(config: &IndexingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn with_separators<I, S>(mut self, separators: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let separators: Vec<String> = separators.into_iter().map(Into::into).collect();
        if separators.is_empty() {
            return Err(Error::InvalidInput("at least one separator is required".to_string()));
        }
        self.separators = separators;
        Ok(self)
    }

    /// Keep each separator attached to the start of the piece that follows it
    pub fn with_keep_separator(mut self, keep: bool) -> Self {
        self.keep_separator = keep;
        self
    }

    /// Treat separators as regular expressions instead of literal text
    pub fn with_separator_regex(mut self, is_regex: bool) -> Self {
        self.is_separator_regex = is_regex;
        self
    }

    pub fn with_strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_whitespace = strip;
        self
    }

    /// Record each chunk's character offset in its parent as `start_index`
    pub fn with_add_start_index(mut self, add: bool) -> Self {
        self.add_start_index = add;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split one text into chunks of at most `chunk_size` characters
    pub fn split_text(&self, text: &str) -> Result<Vec<String>> {
        let separators = self.compile_separators()?;
        Ok(self.split_recursive(text, &separators))
    }

    /// Split every document, keeping document order and copying metadata
    pub fn split_documents(&self, documents: &[Document]) -> Result<Vec<Document>> {
        let separators = self.compile_separators()?;
        let mut chunks = Vec::new();

        for document in documents {
            let mut index = 0usize;
            let mut previous_len = 0usize;

            for chunk in self.split_recursive(&document.content, &separators) {
                let mut metadata = document.metadata.clone();

                if self.add_start_index {
                    let from = (index + previous_len).saturating_sub(self.chunk_overlap);
                    match find_char_offset(&document.content, &chunk, from) {
                        Some(found) => {
                            index = found;
                            metadata.insert(START_INDEX_KEY.to_string(), Value::from(found));
                        }
                        None => warn!(
                            source = document.source().unwrap_or("<unknown>"),
                            "chunk text not found in parent document; start_index omitted"
                        ),
                    }
                    previous_len = chunk.chars().count();
                }

                chunks.push(Document::with_metadata(chunk, metadata));
            }
        }

        Ok(chunks)
    }

    fn compile_separators(&self) -> Result<Vec<Separator>> {
        self.separators
            .iter()
            .map(|text| {
                if text.is_empty() {
                    return Ok(Separator {
                        text: String::new(),
                        pattern: None,
                    });
                }

                let source = if self.is_separator_regex {
                    text.clone()
                } else {
                    regex::escape(text)
                };
                let pattern = Regex::new(&source)
                    .map_err(|e| Error::Splitter(format!("invalid separator '{}': {}", text, e)))?;

                Ok(Separator {
                    text: text.clone(),
                    pattern: Some(pattern),
                })
            })
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[Separator]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // First separator that occurs in the text; the empty one always does.
        let mut chosen = separators.len().saturating_sub(1);
        let mut remaining: &[Separator] = &[];
        for (i, separator) in separators.iter().enumerate() {
            match &separator.pattern {
                None => {
                    chosen = i;
                    break;
                }
                Some(pattern) if pattern.is_match(text) => {
                    chosen = i;
                    remaining = &separators[i + 1..];
                    break;
                }
                Some(_) => {}
            }
        }

        let Some(separator) = separators.get(chosen) else {
            return vec![text.to_string()];
        };

        let splits = self.split_on(text, separator);
        let merge_separator = if self.keep_separator {
            ""
        } else {
            separator.text.as_str()
        };

        let mut good_splits: Vec<&str> = Vec::new();
        for split in splits {
            if split.chars().count() < self.chunk_size {
                good_splits.push(split);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits, merge_separator));
                good_splits.clear();
            }

            if remaining.is_empty() {
                final_chunks.push(split.to_string());
            } else {
                final_chunks.extend(self.split_recursive(split, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, merge_separator));
        }

        final_chunks
    }

    fn split_on<'t>(&self, text: &'t str, separator: &Separator) -> Vec<&'t str> {
        let Some(pattern) = &separator.pattern else {
            return text
                .char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect();
        };

        let pieces: Vec<&str> = if self.keep_separator {
            let mut pieces = Vec::new();
            let mut last = 0;
            for m in pattern.find_iter(text) {
                pieces.push(&text[last..m.start()]);
                last = m.start();
            }
            pieces.push(&text[last..]);
            pieces
        } else {
            pattern.split(text).collect()
        };

        pieces.into_iter().filter(|p| !p.is_empty()).collect()
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let separator_len = separator.chars().count();
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &split in splits {
            let len = split.chars().count();
            let joined_len = |current: &VecDeque<(&str, usize)>| {
                if current.is_empty() { 0 } else { separator_len }
            };

            if total + len + joined_len(&current) > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        total,
                        chunk_size = self.chunk_size,
                        "created a chunk longer than the configured size"
                    );
                }

                if !current.is_empty() {
                    if let Some(doc) = self.join_docs(&current, separator) {
                        docs.push(doc);
                    }

                    // Drop from the front until only the overlap remains and
                    // the next split fits.
                    while !current.is_empty()
                        && (total > self.chunk_overlap
                            || (total + len + joined_len(&current) > self.chunk_size && total > 0))
                    {
                        let sep = if current.len() > 1 { separator_len } else { 0 };
                        if let Some((_, first_len)) = current.pop_front() {
                            total = total.saturating_sub(first_len + sep);
                        }
                    }
                }
            }

            current.push_back((split, len));
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if let Some(doc) = self.join_docs(&current, separator) {
            docs.push(doc);
        }

        docs
    }

    fn join_docs(&self, docs: &VecDeque<(&str, usize)>, separator: &str) -> Option<String> {
        let joined = docs
            .iter()
            .map(|(s, _)| *s)
            .collect::<Vec<_>>()
            .join(separator);
        let text = if self.strip_whitespace {
            joined.trim().to_string()
        } else {
            joined
        };

        (!text.is_empty()).then_some(text)
    }
}

/// Char offset of `needle` in `haystack`, searching from char offset `from`
fn find_char_offset(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let from_byte = haystack
        .char_indices()
        .nth(from)
        .map(|(b, _)| b)
        .unwrap_or(haystack.len());

    haystack[from_byte..]
        .find(needle)
        .map(|byte| from + haystack[from_byte..from_byte + byte].chars().count())
}
