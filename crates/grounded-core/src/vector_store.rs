//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Document, Result};

/// Number of results returned when the caller does not say otherwise
pub const DEFAULT_TOP_K: usize = 4;

/// A document returned from a similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: String,
    pub document: Document,
    pub score: f32,
}

/// Search result from vector store, most similar first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<ScoredDocument>,
    pub total: usize,
}

impl SearchResult {
    /// Drop ids and scores, keeping the documents in rank order
    pub fn into_documents(self) -> Vec<Document> {
        self.documents.into_iter().map(|d| d.document).collect()
    }
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            score_threshold: None,
        }
    }
}

/// How two vectors are compared. Every variant yields a score where
/// larger means more similar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    /// Negated L2 distance
    Euclidean,
    DotProduct,
}

impl DistanceMetric {
    /// Score `b` against `a`. Mismatched dimensions score as least similar.
    pub fn similarity(self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return f32::NEG_INFINITY;
        }

        match self {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::Euclidean => {
                -a.iter()
                    .zip(b.iter())
                    .map(|(x, y)| (x - y) * (x - y))
                    .sum::<f32>()
                    .sqrt()
            }
            DistanceMetric::DotProduct => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
        }
    }
}

/// Cosine similarity; zero vectors score 0.0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Trait for vector stores
///
/// Stores keep insertion order and never de-duplicate. Search results are
/// ordered most similar first, with ties resolved by insertion order.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store one document with a precomputed embedding, returning its id
    async fn add(&self, document: Document, embedding: Vec<f32>) -> Result<String>;

    /// Embed and store documents, returning their ids in input order
    async fn add_documents(&self, documents: Vec<Document>) -> Result<Vec<String>>;

    /// Embed `query` and search for similar documents
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchResult>;

    /// Search using a query embedding
    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Get a document by ID
    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// Get the total number of stored documents
    async fn count(&self) -> Result<usize>;
}
