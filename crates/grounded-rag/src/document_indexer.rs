//! Document indexer implementation

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use grounded_core::{
    Document, DocumentIndexer, Error, IndexingConfig, IndexingResult, Result, VectorStore,
};

use crate::splitter::RecursiveCharacterTextSplitter;

/// Splits documents and stores the chunks in any VectorStore
pub struct LocalDocumentIndexer<V: VectorStore> {
    vector_store: Arc<V>,
    splitter: RecursiveCharacterTextSplitter,
    config: IndexingConfig,
    total_chunks: AtomicUsize,
}

impl<V: VectorStore> LocalDocumentIndexer<V> {
    /// Create a new indexer with the default chunking configuration
    pub fn new(vector_store: Arc<V>) -> Result<Self> {
        Self::with_config(vector_store, IndexingConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(vector_store: Arc<V>, config: IndexingConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(Error::Configuration(
                "Indexing batch size must be greater than 0".to_string(),
            ));
        }

        let splitter = RecursiveCharacterTextSplitter::from_config(&config)?;
        Ok(Self {
            vector_store,
            splitter,
            config,
            total_chunks: AtomicUsize::new(0),
        })
    }

    /// Replace the splitter, e.g. to use custom separators
    pub fn with_splitter(mut self, splitter: RecursiveCharacterTextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn vector_store(&self) -> &Arc<V> {
        &self.vector_store
    }
}

#[async_trait]
impl<V: VectorStore + 'static> DocumentIndexer for LocalDocumentIndexer<V> {
    async fn index_documents(&self, documents: Vec<Document>) -> Result<IndexingResult> {
        let documents_indexed = documents.len();
        let chunks = self.splitter.split_documents(&documents)?;
        info!(
            documents = documents_indexed,
            chunks = chunks.len(),
            "split documents"
        );

        let mut ids = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.batch_size) {
            let batch_ids = self.vector_store.add_documents(batch.to_vec()).await?;
            debug!(batch = batch_ids.len(), stored = ids.len() + batch_ids.len(), "indexed batch");
            ids.extend(batch_ids);
        }

        self.total_chunks.fetch_add(ids.len(), Ordering::Relaxed);

        Ok(IndexingResult {
            documents_indexed,
            chunks_indexed: ids.len(),
            ids,
        })
    }

    async fn stats(&self) -> Result<serde_json::Value> {
        Ok(json!({
            "indexer_type": "local",
            "total_chunks": self.total_chunks.load(Ordering::Relaxed),
            "stored_documents": self.vector_store.count().await?,
            "chunk_size": self.config.chunk_size,
            "chunk_overlap": self.config.chunk_overlap,
            "batch_size": self.config.batch_size,
        }))
    }
}
