//! Ollama configuration

use grounded_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the Ollama model server connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST)
    }
}

impl OllamaConfig {
    /// Create configuration for an explicit host
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: normalize_host(&host.into()),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create configuration from environment variables (and `.env`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("OLLAMA_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let timeout_secs = match lookup("OLLAMA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Configuration(format!(
                    "OLLAMA_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            host: normalize_host(&host),
            timeout_secs,
        })
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Full URL of an API endpoint, e.g. `endpoint("/api/embed")`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }
}

/// Accept `OLLAMA_HOST` the way the Ollama CLI does: a bare `host:port`
/// means plain HTTP.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = OllamaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, OllamaConfig::default());
        assert_eq!(config.endpoint("/api/embed"), "http://localhost:11434/api/embed");
    }

    #[test]
    fn test_bare_host_gets_scheme() {
        let config = OllamaConfig::from_lookup(lookup(&[("OLLAMA_HOST", "10.0.0.5:11434/")])).unwrap();
        assert_eq!(config.host, "http://10.0.0.5:11434");
    }

    #[test]
    fn test_invalid_timeout() {
        let err = OllamaConfig::from_lookup(lookup(&[("OLLAMA_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
