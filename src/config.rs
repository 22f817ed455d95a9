use crate::sinks::DEFAULT_LOG_FILE;
use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Collector endpoint for the HTTP sink. Absent or empty disables HTTP export.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Upper bound on each external command a reader runs (ps, vm_stat, powershell).
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Snapshots waiting to be posted; when full, new snapshots are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// How long shutdown waits for queued posts before abandoning them.
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            queue_capacity: default_queue_capacity(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.into()
}

fn default_command_timeout_ms() -> u64 {
    10_000
}

fn default_http_timeout_ms() -> u64 {
    5000
}

fn default_queue_capacity() -> usize {
    16
}

fn default_shutdown_grace_ms() -> u64 {
    5000
}

impl MonitorConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("configuration file {path} could not be read"))?;
        Self::load_from_str(&s).with_context(|| format!("invalid configuration in {path}"))
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: MonitorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Trimmed `api_url`, or `None` when unset or blank.
    pub fn http_sink_url(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.interval_ms > 0,
            "interval_ms must be > 0, got {}",
            self.interval_ms
        );
        anyhow::ensure!(
            self.command_timeout_ms > 0,
            "command_timeout_ms must be > 0, got {}",
            self.command_timeout_ms
        );
        anyhow::ensure!(!self.log_file.trim().is_empty(), "log_file must be non-empty");
        anyhow::ensure!(
            self.http.timeout_ms > 0,
            "http.timeout_ms must be > 0, got {}",
            self.http.timeout_ms
        );
        anyhow::ensure!(
            self.http.queue_capacity > 0,
            "http.queue_capacity must be > 0, got {}",
            self.http.queue_capacity
        );
        if let Some(url) = self.http_sink_url() {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| anyhow::anyhow!("api_url {url:?} is not a valid URL: {e}"))?;
            anyhow::ensure!(
                matches!(parsed.scheme(), "http" | "https"),
                "api_url must use http or https, got {}",
                parsed.scheme()
            );
        }
        Ok(())
    }
}
