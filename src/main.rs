use anyhow::Result;
use std::time::Duration;
use system_monitor::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout belongs to the console sink
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::MonitorConfig::load()?;

    let platform = models::Platform::current();
    let aggregator = aggregator::StatsAggregator::for_platform(
        platform,
        &readers::SamplingOptions {
            command_timeout: Duration::from_millis(app_config.command_timeout_ms),
        },
    );
    let (sink_set, exporter) = sinks::build(&app_config)?;
    tracing::info!(
        version = version::VERSION,
        platform = platform.as_str(),
        interval_ms = app_config.interval_ms,
        sinks = ?sink_set.names(),
        "System monitor started. Press Ctrl+C to stop."
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let poller = poller::Poller::new(
        aggregator,
        sink_set,
        Duration::from_millis(app_config.interval_ms),
    );
    let poller_handle = tokio::spawn(poller.run(shutdown_rx));

    wait_for_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    match poller_handle.await {
        Ok(cycles) => tracing::debug!(cycles, "poller stopped"),
        Err(e) => tracing::warn!(error = %e, "poller task failed"),
    }

    if let Some(exporter) = exporter {
        let summary = exporter.shutdown().await;
        tracing::info!(
            sent = summary.sent,
            failed = summary.failed,
            abandoned = summary.abandoned,
            "HTTP export stopped"
        );
    }
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
