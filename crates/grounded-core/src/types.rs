//! Common types used across the grounded pipeline

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key holding the URL or file path a document came from
pub const SOURCE_KEY: &str = "source";

/// Metadata key holding a chunk's character offset in its parent document
pub const START_INDEX_KEY: &str = "start_index";

/// A unit of text plus the metadata describing where it came from.
///
/// Loaders produce one `Document` per web page or file; the splitter produces
/// one per chunk, copying the parent's metadata and adding `start_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Create a document tagged with its source
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert(SOURCE_KEY.to_string(), Value::String(source.into()));
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Create a document with caller-supplied metadata
    pub fn with_metadata(content: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }

    pub fn start_index(&self) -> Option<usize> {
        self.metadata
            .get(START_INDEX_KEY)
            .and_then(Value::as_u64)
            .map(|i| i as usize)
    }

    /// Length of the content in characters, not bytes
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Join document contents with a blank line between them, in order.
pub fn join_contents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
