// Snapshot sinks and the dispatcher that isolates their failures

mod console;
mod file;
pub mod http;

pub use console::ConsoleSink;
pub use file::{DEFAULT_LOG_FILE, FileSink, format_log_line};
pub use http::{ExportSummary, HttpExporter, HttpSink};

use crate::config::MonitorConfig;
use crate::models::SystemStats;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export queue full; snapshot dropped")]
    QueueFull,

    #[error("export queue closed")]
    QueueClosed,
}

/// Consumer of a snapshot. Errors are reported to the dispatcher, which logs them
/// and moves on; a failing sink never stops the loop or the sinks after it.
pub trait StatsSink: Send + Sync {
    fn name(&self) -> &str;

    fn on_stats_collected(&self, stats: &SystemStats) -> Result<(), SinkError>;
}

/// Sinks in registration order.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn StatsSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl StatsSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Hands `stats` to every sink in order. Returns how many sinks failed.
    pub fn dispatch(&self, stats: &SystemStats) -> usize {
        let mut failed = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.on_stats_collected(stats) {
                failed += 1;
                tracing::warn!(
                    sink = sink.name(),
                    error = %e,
                    operation = "on_stats_collected",
                    "sink failed"
                );
            }
        }
        failed
    }
}

/// Console and file sinks always; the HTTP sink only when `api_url` is set.
/// Must be called inside a tokio runtime when an HTTP sink is configured.
pub fn build(config: &MonitorConfig) -> anyhow::Result<(SinkSet, Option<HttpExporter>)> {
    let mut sinks = SinkSet::new();
    sinks.push(ConsoleSink::new());
    sinks.push(FileSink::new(&config.log_file));

    let exporter = match config.http_sink_url() {
        Some(url) => {
            let (sink, exporter) = http::spawn(url, &config.http)?;
            sinks.push(sink);
            Some(exporter)
        }
        None => {
            tracing::info!("api_url not set; HTTP export disabled");
            None
        }
    };
    Ok((sinks, exporter))
}
