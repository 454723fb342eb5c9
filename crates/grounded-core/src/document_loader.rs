//! Document loader trait

use async_trait::async_trait;

use crate::{Document, Result};

/// Trait for anything that produces the raw documents of a corpus
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load every document this loader is configured for, in a stable order
    async fn load(&self) -> Result<Vec<Document>>;

    /// Short label for logs, e.g. "web" or "directory"
    fn kind(&self) -> &'static str;
}
