//! In-memory vector store

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

use grounded_core::{
    DistanceMetric, Document, EmbeddingProvider, Error, Result, ScoredDocument, SearchConfig,
    SearchResult, VectorStore,
};

struct Entry {
    id: String,
    document: Document,
    embedding: Vec<f32>,
}

/// Brute-force vector store held entirely in memory.
///
/// Entries are kept in insertion order; search scores every entry and uses a
/// stable sort, so equal scores come back in the order they were added.
pub struct InMemoryVectorStore {
    embeddings: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<Entry>>,
    metric: DistanceMetric,
}

impl InMemoryVectorStore {
    /// Create an empty store that embeds with `embeddings`
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embeddings,
            entries: RwLock::new(Vec::new()),
            metric: DistanceMetric::default(),
        }
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn embeddings(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embeddings
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add(&self, document: Document, embedding: Vec<f32>) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        entries.push(Entry {
            id: id.clone(),
            document,
            embedding,
        });
        Ok(id)
    }

    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embeddings.embed_documents(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(Error::VectorStore(format!(
                "Embedding provider returned {} vectors for {} documents",
                vectors.len(),
                documents.len()
            )));
        }

        let mut entries = self
            .entries
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut ids = Vec::with_capacity(documents.len());
        for (document, embedding) in documents.into_iter().zip(vectors) {
            let id = Uuid::new_v4().to_string();
            entries.push(Entry {
                id: id.clone(),
                document,
                embedding,
            });
            ids.push(id);
        }

        debug!(added = ids.len(), total = entries.len(), "stored documents");
        Ok(ids)
    }

    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult> {
        let vector = self.embeddings.embed_query(query).await?;
        self.search_by_vector(&vector, config).await
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .map(|entry| {
                let score = self.metric.similarity(vector, &entry.embedding);
                (if score.is_nan() { f32::NEG_INFINITY } else { score }, entry)
            })
            .filter(|(score, _)| config.score_threshold.is_none_or(|t| *score >= t))
            .collect();

        // Stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(config.top_k);

        let documents: Vec<ScoredDocument> = scored
            .into_iter()
            .map(|(score, entry)| ScoredDocument {
                id: entry.id.clone(),
                document: entry.document.clone(),
                score,
            })
            .collect();

        let total = documents.len();
        Ok(SearchResult { documents, total })
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.document.clone()))
    }

    async fn count(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(entries.len())
    }
}
