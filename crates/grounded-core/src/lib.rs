//! Core traits and types for grounded
//!
//! This crate defines the capability-facing interfaces of the RAG pipeline:
//! document loaders, generative models, embedding models, vector stores,
//! document indexers, prompt templates and pipeline stages. Concrete
//! implementations live in the `grounded-ollama` and `grounded-rag` crates.

pub mod document_indexer;
pub mod document_loader;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod types;
pub mod vector_store;

pub use document_indexer::{DocumentIndexer, IndexingConfig, IndexingResult};
pub use document_loader::DocumentLoader;
pub use embeddings::EmbeddingProvider;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use pipeline::{PipelineState, Stage};
pub use prompt::{ChatMessage, ChatPromptTemplate, PromptTemplate, PromptValue, Role};
pub use types::*;
pub use vector_store::{
    DEFAULT_TOP_K, DistanceMetric, ScoredDocument, SearchConfig, SearchResult, VectorStore,
    cosine_similarity,
};
