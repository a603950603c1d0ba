//! Run configuration

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Default proxy list path
pub const DEFAULT_PROXY_LIST: &str = "proxy.txt";

/// Default output file path
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Default number of probes in flight
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for one validation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// URL fetched through every proxy
    pub target_url: String,
    /// File with one proxy descriptor per line
    pub proxy_list_path: PathBuf,
    /// Append-only file receiving successful results
    pub output_path: PathBuf,
    /// Whether response bodies are echoed and persisted
    pub echo_body: bool,
    /// Maximum number of probes in flight
    pub max_concurrency: usize,
    /// Deadline for each probe
    pub timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            proxy_list_path: PathBuf::from(DEFAULT_PROXY_LIST),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            echo_body: false,
            max_concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RunConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }

    pub fn with_proxy_list(mut self, path: impl Into<PathBuf>) -> Self {
        self.proxy_list_path = path.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_echo_body(mut self, echo_body: bool) -> Self {
        self.echo_body = echo_body;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the settings that must hold before any file is touched
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}
