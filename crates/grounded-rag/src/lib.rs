//! Retrieval-augmented generation for grounded
//!
//! This crate provides the concrete pieces of the pipeline: web and directory
//! loaders, a recursive character splitter, an in-memory vector store, a
//! document indexer, the bundled prompt registry and the retrieve/generate
//! pipeline itself.

mod document_indexer;
mod loader;
mod pipeline;
mod prompt;
mod splitter;
mod vector_store;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use document_indexer::LocalDocumentIndexer;
pub use loader::{
    Corpus, DEFAULT_USER_AGENT, DEFAULT_WEB_TIMEOUT_SECS, DirectoryLoader, WebLoader,
    parse_html_document,
};
pub use pipeline::{GenerateStage, Pipeline, PipelineBuilder, RetrieveStage, rag_pipeline};
pub use prompt::{PromptRegistry, RAG_PROMPT_ID, rag_prompt};
pub use splitter::{DEFAULT_SEPARATORS, RecursiveCharacterTextSplitter};
pub use vector_store::InMemoryVectorStore;

// Re-export core types for convenience
pub use grounded_core::{
    ChatPromptTemplate, Document, DocumentIndexer, DocumentLoader, EmbeddingProvider, Error,
    IndexingConfig, IndexingResult, LLMProvider, PipelineState, Result, SearchConfig,
    SearchResult, Stage, VectorStore,
};
