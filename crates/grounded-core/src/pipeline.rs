//! Pipeline state and stage trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Document, Result};

/// Per-question record threaded through every stage.
///
/// Created fresh for each invocation and handed back to the caller once the
/// last stage has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub question: String,
    pub context: Vec<Document>,
    pub answer: String,
}

impl PipelineState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }
}

/// One step of a sequential pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable name used in logs and errors
    fn name(&self) -> &str;

    /// Consume the state and return it with this stage's fields filled in
    async fn run(&self, state: PipelineState) -> Result<PipelineState>;
}
