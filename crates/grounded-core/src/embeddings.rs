//! Embedding provider trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding model providers
///
/// Implementations must return vectors of one fixed dimension for a given
/// model, and the same vector for the same text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, returning one vector per input in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding model ID being used
    fn model_id(&self) -> &str;
}
