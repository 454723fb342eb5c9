//! Document indexer trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Document, Result};

/// Result of an indexing operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexingResult {
    pub documents_indexed: usize,
    pub chunks_indexed: usize,
    pub ids: Vec<String>,
}

/// Configuration for document indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Texts sent to the embedding model per request
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 10,
        }
    }
}

/// Trait for document indexers
///
/// An indexer splits documents into chunks and hands them to a vector store.
/// Any failure aborts the whole call; nothing is skipped.
#[async_trait]
pub trait DocumentIndexer: Send + Sync {
    /// Split and index documents in order
    async fn index_documents(&self, documents: Vec<Document>) -> Result<IndexingResult>;

    /// Get indexing statistics
    async fn stats(&self) -> Result<serde_json::Value>;
}
