// Best-effort HTTP export: the sink enqueues, a background task posts.
// The queue is bounded; on shutdown it is drained for a grace period, then abandoned.

use super::{SinkError, StatsSink};
use crate::config::HttpConfig;
use crate::models::{StatsPayload, SystemStats};
use crate::version;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Duration;

#[derive(Debug, Default)]
struct Counters {
    queued: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
}

/// Outcome of the exporter's lifetime, reported at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    pub sent: u64,
    pub failed: u64,
    /// Enqueued but neither sent nor failed when the grace period ran out.
    pub abandoned: u64,
}

/// Non-blocking: enqueues the payload and returns. Delivery, ordering across
/// cycles and retries are not guaranteed.
pub struct HttpSink {
    tx: mpsc::Sender<StatsPayload>,
    counters: Arc<Counters>,
}

impl StatsSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    fn on_stats_collected(&self, stats: &SystemStats) -> Result<(), SinkError> {
        match self.tx.try_send(StatsPayload::from(stats)) {
            Ok(()) => {
                self.counters.queued.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(SinkError::QueueFull),
            Err(TrySendError::Closed(_)) => Err(SinkError::QueueClosed),
        }
    }
}

/// Handle to the background exporter task.
pub struct HttpExporter {
    handle: tokio::task::JoinHandle<()>,
    counters: Arc<Counters>,
    grace: Duration,
}

impl HttpExporter {
    /// Waits up to the configured grace period for queued posts to finish, then aborts
    /// whatever is still in flight. The [`HttpSink`] must already be dropped, otherwise
    /// the queue never closes and the full grace period is spent.
    pub async fn shutdown(self) -> ExportSummary {
        let abort = self.handle.abort_handle();
        let drained = tokio::time::timeout(self.grace, self.handle).await.is_ok();
        if !drained {
            abort.abort();
        }

        let queued = self.counters.queued.load(Ordering::Relaxed);
        let sent = self.counters.sent.load(Ordering::Relaxed);
        let failed = self.counters.failed.load(Ordering::Relaxed);
        let summary = ExportSummary {
            sent,
            failed,
            abandoned: queued.saturating_sub(sent + failed),
        };
        if summary.abandoned > 0 {
            tracing::warn!(
                abandoned = summary.abandoned,
                grace_ms = self.grace.as_millis() as u64,
                "HTTP exports abandoned at shutdown"
            );
        } else {
            tracing::debug!(sent, failed, "HTTP exporter drained");
        }
        summary
    }
}

/// Builds the client, spawns the exporter task and returns the sink feeding it.
pub fn spawn(url: &str, config: &HttpConfig) -> anyhow::Result<(HttpSink, HttpExporter)> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(version::user_agent())
        .build()?;
    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let counters = Arc::new(Counters::default());
    let handle = tokio::spawn(run_exporter(rx, client, url.to_string(), counters.clone()));

    tracing::info!(url, queue_capacity = config.queue_capacity, "HTTP export enabled");
    Ok((
        HttpSink {
            tx,
            counters: counters.clone(),
        },
        HttpExporter {
            handle,
            counters,
            grace: Duration::from_millis(config.shutdown_grace_ms),
        },
    ))
}

async fn run_exporter(
    mut rx: mpsc::Receiver<StatsPayload>,
    client: reqwest::Client,
    url: String,
    counters: Arc<Counters>,
) {
    while let Some(payload) = rx.recv().await {
        match post(&client, &url, &payload).await {
            Ok(()) => {
                counters.sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, operation = "post_stats", "failed to post stats");
            }
        }
    }
    tracing::debug!("HTTP export queue closed");
}

async fn post(client: &reqwest::Client, url: &str, payload: &StatsPayload) -> reqwest::Result<()> {
    client
        .post(url)
        .json(payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
