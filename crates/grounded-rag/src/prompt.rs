//! Bundled prompt templates and the registry used to look them up by id

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use grounded_core::{ChatPromptTemplate, Error, PromptTemplate, Result, Role};

/// Id of the question-answering prompt the pipeline uses by default
pub const RAG_PROMPT_ID: &str = "rlm/rag-prompt";

const RAG_PROMPT_TEMPLATE: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Question: {question}\n\
Context: {context}\n\
Answer:";

/// The standard RAG prompt: one human message with `question` and `context`
pub fn rag_prompt() -> ChatPromptTemplate {
    ChatPromptTemplate::new(
        RAG_PROMPT_ID,
        vec![(Role::Human, PromptTemplate::new(RAG_PROMPT_TEMPLATE))],
    )
}

/// On-disk form of a prompt, as read by [`PromptRegistry::load_file`]
#[derive(Debug, Deserialize)]
struct PromptFile {
    id: String,
    #[serde(default)]
    version: Option<String>,
    messages: Vec<PromptFileMessage>,
}

#[derive(Debug, Deserialize)]
struct PromptFileMessage {
    role: Role,
    template: String,
}

/// Prompt templates keyed by id, each with one or more versions.
///
/// `pull("owner/name")` returns the newest registered version;
/// `pull("owner/name:v1")` returns that exact version.
#[derive(Debug, Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, Vec<(String, ChatPromptTemplate)>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the prompts shipped with this crate
    pub fn bundled() -> Self {
        let mut registry = Self::new();
        registry.register(rag_prompt(), "latest");
        registry
    }

    /// Add a template under its own id; a repeated version replaces the old one
    pub fn register(&mut self, template: ChatPromptTemplate, version: impl Into<String>) {
        let version = version.into();
        let versions = self.prompts.entry(template.id.clone()).or_default();
        versions.retain(|(v, _)| *v != version);
        versions.push((version, template));
    }

    /// Parse a JSON prompt definition and register it
    ///
    /// ```json
    /// {"id": "me/qa", "version": "v2", "messages": [{"role": "human", "template": "{question}"}]}
    /// ```
    pub fn register_json(&mut self, json: &str) -> Result<String> {
        let file: PromptFile = serde_json::from_str(json)
            .map_err(|e| Error::Prompt(format!("Invalid prompt definition: {}", e)))?;

        if file.messages.is_empty() {
            return Err(Error::Prompt(format!("Prompt '{}' has no messages", file.id)));
        }

        let id = file.id.clone();
        let messages = file
            .messages
            .into_iter()
            .map(|m| (m.role, PromptTemplate::new(m.template)))
            .collect();
        self.register(
            ChatPromptTemplate::new(file.id, messages),
            file.version.unwrap_or_else(|| "latest".to_string()),
        );
        Ok(id)
    }

    /// Read a JSON prompt definition from disk and register it
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Prompt(format!("Failed to read prompt file {}: {}", path.display(), e))
        })?;
        let id = self.register_json(&json)?;
        debug!(id = %id, path = %path.display(), "registered prompt");
        Ok(id)
    }

    /// Look up a template by `id` or `id:version`
    pub fn pull(&self, reference: &str) -> Result<ChatPromptTemplate> {
        let (id, version) = match reference.rsplit_once(':') {
            Some((id, version)) => (id, Some(version)),
            None => (reference, None),
        };

        let versions = self
            .prompts
            .get(id)
            .ok_or_else(|| Error::Prompt(format!("Unknown prompt id '{}'", id)))?;

        let found = match version {
            Some(version) => versions.iter().find(|(v, _)| v == version),
            None => versions.last(),
        };

        found.map(|(_, template)| template.clone()).ok_or_else(|| {
            Error::Prompt(format!(
                "Unknown version '{}' of prompt '{}'",
                version.unwrap_or_default(),
                id
            ))
        })
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.prompts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
