use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use grounded_core::{Document, DocumentIndexer};
use grounded_ollama::{OllamaClient, OllamaConfig, OllamaEmbeddings, OllamaLLM};
use grounded_rag::{
    Corpus, DirectoryLoader, InMemoryVectorStore, LocalDocumentIndexer, PromptRegistry,
    WebLoader, rag_pipeline,
};

mod config;
mod ui;

use config::{AppConfig, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::try_from(cli)?;
    debug!(?config, "starting");

    // Model server
    let client = OllamaClient::new(OllamaConfig::from_env()?)?;
    debug!(
        host = %client.config().host,
        timeout_secs = client.config().timeout_secs,
        "using Ollama server"
    );
    check_models(&client, &config).await;
    let embeddings = Arc::new(OllamaEmbeddings::new(client.clone(), &config.embedding_model));
    let llm = Arc::new(OllamaLLM::new(client, &config.model));

    // Corpus
    let web =
        WebLoader::new([config.url.as_str()], &config.user_agent)?.with_timeout(config.web_timeout)?;
    let files = DirectoryLoader::new(&config.dir, &config.extension);
    let corpus = Corpus::load(&web, &files)
        .await
        .context("Failed to load documents")?;

    ui::print_loaded_web_documents(corpus.web.len());
    ui::print_total_characters(corpus.first().map(Document::char_count).unwrap_or(0));

    // Index
    let store = Arc::new(InMemoryVectorStore::new(embeddings));
    let indexer = LocalDocumentIndexer::with_config(store.clone(), config.indexing.clone())?;
    let indexed = indexer
        .index_documents(corpus.documents())
        .await
        .context("Failed to index documents")?;
    info!(
        documents = indexed.documents_indexed,
        chunks = indexed.chunks_indexed,
        "indexed corpus"
    );

    // Prompt
    let mut registry = PromptRegistry::bundled();
    if let Some(path) = &config.prompt_file {
        registry.load_file(path)?;
    }
    let prompt = registry.pull(&config.prompt)?;

    // Answer
    let pipeline = rag_pipeline(store, llm, prompt, config.search.clone())?;
    let state = pipeline
        .invoke(&config.question)
        .await
        .context("Failed to answer question")?;

    ui::print_answer(&state.answer);
    Ok(())
}

/// Warn early when a configured model is not pulled on the server
async fn check_models(client: &OllamaClient, config: &AppConfig) {
    match client.list_models().await {
        Ok(models) => {
            for wanted in [&config.model, &config.embedding_model] {
                let present = models
                    .iter()
                    .any(|m| m == wanted || m.strip_suffix(":latest") == Some(wanted.as_str()));
                if !present {
                    warn!(model = %wanted, "model not found on Ollama server");
                }
            }
        }
        Err(e) => debug!(error = %e, "could not list Ollama models"),
    }
}
