//! Ollama HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use grounded_core::{
    EmbeddingProvider, Error, GenerationConfig, GenerationResult, LLMProvider, Result,
};

use crate::config::OllamaConfig;

/// Shared HTTP transport for an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

#[derive(Serialize, Default)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Which call failed, so transport errors land in the right `Error` variant
#[derive(Clone, Copy)]
enum Api {
    Generate,
    Embed,
    Tags,
}

impl Api {
    fn error(self, message: String) -> Error {
        match self {
            Api::Generate | Api::Tags => Error::LLMProvider(message),
            Api::Embed => Error::Embedding(message),
        }
    }
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Names of the models the server has pulled
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.config.endpoint("/api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let tags: TagsResponse = Self::read_json(response, Api::Tags).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, api: Api) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!(%url, "sending Ollama request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Self::read_json(response, api).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, api: Api) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(api.error(format!(
                "Ollama API request failed with status {}: {}",
                status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Generative model served by Ollama (`/api/generate`, non-streaming)
#[derive(Debug, Clone)]
pub struct OllamaLLM {
    client: OllamaClient,
    model: String,
    defaults: GenerationConfig,
}

impl OllamaLLM {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client,
            defaults: GenerationConfig {
                model_id: model.clone(),
                ..Default::default()
            },
            model,
        }
    }

    /// Sampling options applied by `generate`
    pub fn with_defaults(mut self, defaults: GenerationConfig) -> Self {
        self.defaults = defaults;
        self
    }
}

#[async_trait]
impl LLMProvider for OllamaLLM {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        self.generate_with_config(prompt, &self.defaults).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let model = if config.model_id.is_empty() {
            self.model.as_str()
        } else {
            config.model_id.as_str()
        };

        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                num_predict: config.max_tokens,
                stop: config.stop_sequences.clone(),
            },
        };

        debug!(model, prompt_chars = prompt.chars().count(), "generating");
        let response: GenerateResponse = self
            .client
            .post_json("/api/generate", &request, Api::Generate)
            .await?;

        Ok(GenerationResult {
            text: response.response,
            model_id: model.to_string(),
            tokens_used: response.eval_count,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Embedding model served by Ollama (`/api/embed`)
#[derive(Debug, Clone)]
pub struct OllamaEmbeddings {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbeddings {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("Ollama returned no embedding for query".to_string()))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        debug!(model = %self.model, count = texts.len(), "embedding");
        let response: EmbedResponse = self
            .client
            .post_json("/api/embed", &request, Api::Embed)
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings from Ollama, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
