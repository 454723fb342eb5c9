//! Ollama integration for grounded
//!
//! This crate provides the Ollama implementations of the `LLMProvider` and
//! `EmbeddingProvider` traits on top of one shared HTTP client.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::{OllamaClient, OllamaEmbeddings, OllamaLLM};
pub use config::{DEFAULT_HOST, DEFAULT_TIMEOUT_SECS, OllamaConfig};

// Re-export core types for convenience
pub use grounded_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};
