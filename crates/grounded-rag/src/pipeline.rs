//! Sequential retrieve-then-generate pipeline

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use grounded_core::{
    ChatPromptTemplate, Error, LLMProvider, PipelineState, PromptValue, Result, SearchConfig,
    Stage, VectorStore, join_contents,
};

/// Fixed, ordered list of stages run once per question.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order on a fresh state for `question`.
    /// The first stage error is returned as is.
    pub async fn invoke(&self, question: &str) -> Result<PipelineState> {
        let mut state = PipelineState::new(question);
        for stage in &self.stages {
            debug!(stage = stage.name(), "running stage");
            state = stage
                .run(state)
                .await
                .inspect_err(|e| error!(stage = stage.name(), error = %e, "stage failed"))?;
        }
        Ok(state)
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append several stages, run in the order given
    pub fn add_sequence(mut self, stages: Vec<Box<dyn Stage>>) -> Self {
        self.stages.extend(stages);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(Error::Pipeline("Pipeline needs at least one stage".to_string()));
        }
        Ok(Pipeline {
            stages: self.stages,
        })
    }
}

/// Fills `context` with the top-k chunks for the question
pub struct RetrieveStage<V: VectorStore> {
    store: Arc<V>,
    config: SearchConfig,
}

impl<V: VectorStore> RetrieveStage<V> {
    pub fn new(store: Arc<V>, config: SearchConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl<V: VectorStore + 'static> Stage for RetrieveStage<V> {
    fn name(&self) -> &str {
        "retrieve"
    }

    async fn run(&self, mut state: PipelineState) -> Result<PipelineState> {
        let result = self.store.search(&state.question, &self.config).await?;
        info!(retrieved = result.total, top_k = self.config.top_k, "retrieved context");
        state.context = result.into_documents();
        Ok(state)
    }
}

/// Renders the prompt from question and context, then asks the model
pub struct GenerateStage<L: LLMProvider> {
    llm: Arc<L>,
    prompt: ChatPromptTemplate,
}

impl<L: LLMProvider> GenerateStage<L> {
    pub fn new(llm: Arc<L>, prompt: ChatPromptTemplate) -> Self {
        Self { llm, prompt }
    }

    /// The exact prompt that `run` would send for this state
    pub fn render_prompt(&self, state: &PipelineState) -> Result<PromptValue> {
        let values = HashMap::from([
            ("question".to_string(), state.question.clone()),
            ("context".to_string(), join_contents(&state.context)),
        ]);
        self.prompt.render(&values)
    }
}

#[async_trait]
impl<L: LLMProvider + 'static> Stage for GenerateStage<L> {
    fn name(&self) -> &str {
        "generate"
    }

    async fn run(&self, mut state: PipelineState) -> Result<PipelineState> {
        if state.context.is_empty() {
            warn!("no context retrieved; generating without it");
        }

        let prompt = self.render_prompt(&state)?;
        let result = self.llm.generate(&prompt.to_prompt_string()).await?;
        debug!(model = %result.model_id, tokens = ?result.tokens_used, "generated answer");

        state.answer = result.text;
        Ok(state)
    }
}

/// The standard two-stage pipeline: retrieve, then generate
pub fn rag_pipeline<V, L>(
    store: Arc<V>,
    llm: Arc<L>,
    prompt: ChatPromptTemplate,
    search: SearchConfig,
) -> Result<Pipeline>
where
    V: VectorStore + 'static,
    L: LLMProvider + 'static,
{
    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(RetrieveStage::new(store, search)),
        Box::new(GenerateStage::new(llm, prompt)),
    ];
    Pipeline::builder().add_sequence(stages).build()
}
