//! Command line and environment configuration

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use grounded_core::{IndexingConfig, SearchConfig};
use grounded_rag::{DEFAULT_USER_AGENT, DEFAULT_WEB_TIMEOUT_SECS, RAG_PROMPT_ID};

pub const DEFAULT_URL: &str =
    "https://www.blackhillsinfosec.com/using-pyrit-to-assess-large-language-models-llms/";
pub const DEFAULT_MODEL: &str = "BlackHillsInfoSec/llama-3.1-8b-abliterated";
pub const DEFAULT_EMBEDDING_MODEL: &str = "mxbai-embed-large";
pub const DEFAULT_QUESTION: &str = "What are some username passwords?";

#[derive(Parser, Debug)]
#[command(name = "grounded")]
#[command(about = "Answer a question from a web page and local text files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Question to answer
    #[arg(default_value = DEFAULT_QUESTION)]
    pub question: String,

    /// Web page to load
    #[arg(long, env = "GROUNDED_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Directory searched recursively for text files
    #[arg(long, env = "GROUNDED_DIR", default_value = "./")]
    pub dir: PathBuf,

    /// File extension of the local documents
    #[arg(long, default_value = "txt")]
    pub extension: String,

    /// Maximum chunk length in characters
    #[arg(long, default_value_t = 1000)]
    pub chunk_size: usize,

    /// Characters shared by neighbouring chunks
    #[arg(long, default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = grounded_core::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Prompt id, optionally with `:version`
    #[arg(long, default_value = RAG_PROMPT_ID)]
    pub prompt: String,

    /// JSON prompt definition to register before resolving `--prompt`
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Generative model served by Ollama
    #[arg(long, env = "GROUNDED_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Embedding model served by Ollama
    #[arg(long, env = "GROUNDED_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// User-Agent sent when fetching the web page
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Seconds to wait for the web page
    #[arg(long, env = "GROUNDED_WEB_TIMEOUT_SECS", default_value_t = DEFAULT_WEB_TIMEOUT_SECS)]
    pub web_timeout_secs: u64,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub question: String,
    pub url: String,
    pub dir: PathBuf,
    pub extension: String,
    pub indexing: IndexingConfig,
    pub search: SearchConfig,
    pub prompt: String,
    pub prompt_file: Option<PathBuf>,
    pub model: String,
    pub embedding_model: String,
    pub user_agent: String,
    pub web_timeout: Duration,
}

impl TryFrom<Cli> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.top_k == 0 {
            bail!("--top-k must be at least 1");
        }
        if cli.web_timeout_secs == 0 {
            bail!("--web-timeout-secs must be at least 1");
        }
        if cli.chunk_overlap >= cli.chunk_size {
            bail!(
                "--chunk-overlap ({}) must be smaller than --chunk-size ({})",
                cli.chunk_overlap,
                cli.chunk_size
            );
        }

        Ok(Self {
            question: cli.question,
            url: cli.url,
            dir: cli.dir,
            extension: cli.extension,
            indexing: IndexingConfig {
                chunk_size: cli.chunk_size,
                chunk_overlap: cli.chunk_overlap,
                ..IndexingConfig::default()
            },
            search: SearchConfig {
                top_k: cli.top_k,
                score_threshold: None,
            },
            prompt: cli.prompt,
            prompt_file: cli.prompt_file,
            model: cli.model,
            embedding_model: cli.embedding_model,
            user_agent: cli.user_agent,
            web_timeout: Duration::from_secs(cli.web_timeout_secs),
        })
    }
}
