//! Document loaders for web pages and local text files

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use walkdir::{DirEntry, WalkDir};

use grounded_core::{Document, DocumentLoader, Error, Result, SOURCE_KEY};

pub const DEFAULT_USER_AGENT: &str = concat!("grounded/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_WEB_TIMEOUT_SECS: u64 = 60;

/// Fetches web pages and keeps the text of every node, with no element filtering.
pub struct WebLoader {
    urls: Vec<Url>,
    user_agent: String,
    timeout: Duration,
    client: Client,
}

impl WebLoader {
    /// Create a loader for `urls`; every URL must be absolute http(s)
    pub fn new<I, S>(urls: I, user_agent: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|raw| parse_web_url(raw.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let timeout = Duration::from_secs(DEFAULT_WEB_TIMEOUT_SECS);
        Ok(Self {
            urls,
            client: build_client(user_agent, timeout)?,
            user_agent: user_agent.to_string(),
            timeout,
        })
    }

    /// Replace the per-request timeout (default [`DEFAULT_WEB_TIMEOUT_SECS`])
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(&self.user_agent, timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, url: &Url) -> Result<Document> {
        info!(%url, "fetching web page");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Loader(format!(
                "Fetching {} failed with status {}",
                url,
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(parse_html_document(&html, url.as_str()))
    }
}

#[async_trait]
impl DocumentLoader for WebLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            documents.push(self.fetch(url).await?);
        }
        Ok(documents)
    }

    fn kind(&self) -> &'static str {
        "web"
    }
}

fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

fn parse_web_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Loader(format!("Invalid URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Loader(format!(
            "Unsupported URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

/// Turn a whole HTML page into one document.
///
/// The content is every text node concatenated in document order, scripts
/// and styles included. `title`, `description` and `language` are added to
/// the metadata when the page declares them.
pub fn parse_html_document(html: &str, source: &str) -> Document {
    let page = Html::parse_document(html);
    let content: String = page.root_element().text().collect();

    let mut metadata = Map::new();
    metadata.insert(SOURCE_KEY.to_string(), Value::String(source.to_string()));

    if let Ok(selector) = Selector::parse("title") {
        if let Some(title) = page.select(&selector).next() {
            let title: String = title.text().collect();
            metadata.insert("title".to_string(), Value::String(title.trim().to_string()));
        }
    }

    if let Ok(selector) = Selector::parse(r#"meta[name="description"]"#) {
        if let Some(content) = page
            .select(&selector)
            .next()
            .and_then(|meta| meta.value().attr("content"))
        {
            metadata.insert("description".to_string(), Value::String(content.to_string()));
        }
    }

    if let Some(lang) = page.root_element().value().attr("lang") {
        metadata.insert("language".to_string(), Value::String(lang.to_string()));
    }

    Document::with_metadata(content, metadata)
}

/// Reads every file with a given extension under a directory as UTF-8 text.
pub struct DirectoryLoader {
    path: PathBuf,
    extension: String,
    recursive: bool,
    load_hidden: bool,
}

impl DirectoryLoader {
    /// Load `*.{extension}` files under `path`, recursively, skipping hidden entries
    pub fn new(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            recursive: true,
            load_hidden: false,
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_load_hidden(mut self, load_hidden: bool) -> Self {
        self.load_hidden = load_hidden;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Matching file paths in file-name order
    pub fn matching_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.path.is_dir() {
            return Err(Error::Loader(format!(
                "Directory not found: {}",
                self.path.display()
            )));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&self.path)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.load_hidden || entry.depth() == 0 || !is_hidden(entry));

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::Loader(e.to_string()))?;
            if entry.file_type().is_file() && self.has_extension(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        Ok(paths)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[async_trait]
impl DocumentLoader for DirectoryLoader {
    async fn load(&self) -> Result<Vec<Document>> {
        let paths = self.matching_paths()?;
        let mut documents = Vec::with_capacity(paths.len());

        for path in paths {
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                Error::Loader(format!("Failed to read {}: {}", path.display(), e))
            })?;
            debug!(path = %path.display(), chars = content.chars().count(), "loaded file");
            documents.push(Document::new(content, path.display().to_string()));
        }

        Ok(documents)
    }

    fn kind(&self) -> &'static str {
        "directory"
    }
}

/// Documents loaded at startup, web pages first.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub web: Vec<Document>,
    pub files: Vec<Document>,
}

impl Corpus {
    /// Run both loaders; any failure aborts the whole load.
    pub async fn load(web: &dyn DocumentLoader, files: &dyn DocumentLoader) -> Result<Self> {
        let web_documents = web.load().await?;
        info!(count = web_documents.len(), kind = web.kind(), "loaded documents");
        let file_documents = files.load().await?;
        info!(count = file_documents.len(), kind = files.kind(), "loaded documents");

        Ok(Self {
            web: web_documents,
            files: file_documents,
        })
    }

    /// All documents, web pages first
    pub fn documents(&self) -> Vec<Document> {
        self.web.iter().chain(self.files.iter()).cloned().collect()
    }

    pub fn first(&self) -> Option<&Document> {
        self.web.first().or_else(|| self.files.first())
    }

    pub fn len(&self) -> usize {
        self.web.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
