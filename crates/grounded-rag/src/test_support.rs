//! Offline stand-ins for the model servers, used by unit tests

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use grounded_core::{EmbeddingProvider, GenerationConfig, GenerationResult, LLMProvider, Result};

/// Deterministic bag-of-words embeddings: each lowercased word is hashed
/// into one of `dimension` buckets.
pub struct HashEmbeddings {
    dimension: usize,
}

impl Default for HashEmbeddings {
    fn default() -> Self {
        Self { dimension: 256 }
    }
}

impl HashEmbeddings {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() % self.dimension as u64) as usize;
            embedding[idx] += 1.0;
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed(text))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_id(&self) -> &str {
        "hash-embeddings"
    }
}

/// LLM that answers with a fixed string and remembers every prompt it saw
pub struct RecordingLLM {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingLLM {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for RecordingLLM {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        self.generate_with_config(prompt, &GenerationConfig::default())
            .await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        _config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(GenerationResult {
            text: self.answer.clone(),
            model_id: "recording".to_string(),
            tokens_used: None,
        })
    }

    fn model_id(&self) -> &str {
        "recording"
    }
}
