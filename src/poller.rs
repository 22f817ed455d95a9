// Polling loop: collect, dispatch to sinks, sleep. Stops only on the external shutdown signal.
// The sleep follows the tick, so the period is interval + collect time + sink time.

use crate::aggregator::StatsAggregator;
use crate::models::SystemStats;
use crate::sinks::SinkSet;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::Duration;
use tracing::Instrument;

pub struct Poller {
    aggregator: Arc<StatsAggregator>,
    sinks: SinkSet,
    interval: Duration,
}

impl Poller {
    pub fn new(aggregator: StatsAggregator, sinks: SinkSet, interval: Duration) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            sinks,
            interval,
        }
    }

    /// One cycle. Collection runs on the blocking pool since readers sleep and shell out.
    pub async fn tick(&self) -> SystemStats {
        let aggregator = self.aggregator.clone();
        let stats = match tokio::task::spawn_blocking(move || aggregator.collect()).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, operation = "collect", "collection task failed");
                SystemStats::default()
            }
        };
        let failed = self.sinks.dispatch(&stats);
        tracing::debug!(
            cpu = stats.cpu_usage_percent,
            ram_used_mb = stats.ram_used_mb,
            disk_used_mb = stats.disk_used_mb,
            sinks = self.sinks.len(),
            failed,
            "cycle complete"
        );
        stats
    }

    /// Runs until `shutdown` fires (or its sender is dropped). Returns the number of cycles.
    /// Consumes the poller so its sinks are dropped on return, closing the HTTP queue.
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) -> u64 {
        let span = tracing::debug_span!("poller", interval_ms = self.interval.as_millis() as u64);
        async move {
            let mut cycles: u64 = 0;
            loop {
                self.tick().await;
                cycles += 1;
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
            tracing::debug!(cycles, "poller shutting down");
            cycles
        }
        .instrument(span)
        .await
    }
}
