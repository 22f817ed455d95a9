// Poller tests: ticks until the external shutdown signal, isolating sink failures

mod common;

use common::{BrokenSink, RecordingSink, failing_readers, fixed_readers, journal};
use system_monitor::aggregator::StatsAggregator;
use system_monitor::models::{Platform, ResourceUsage, SystemStats};
use system_monitor::poller::Poller;
use system_monitor::sinks::SinkSet;
use tokio::time::Duration;

fn aggregator() -> StatsAggregator {
    StatsAggregator::from_readers(
        Platform::Linux,
        fixed_readers(
            15.0,
            ResourceUsage::new(8000.0, 16000.0),
            ResourceUsage::ZERO,
        ),
    )
}

#[tokio::test]
async fn tick_collects_and_dispatches_once() {
    let log = journal();
    let mut sinks = SinkSet::new();
    sinks.push(RecordingSink::new("rec", log.clone()));
    let poller = Poller::new(aggregator(), sinks, Duration::from_secs(60));

    let stats = poller.tick().await;
    assert_eq!(stats.cpu_usage_percent, 15.0);
    assert_eq!(stats.disk(), ResourceUsage::ZERO);
    assert_eq!(log.lock().unwrap().as_slice(), &[("rec".to_string(), stats)]);
}

#[tokio::test]
async fn tick_with_failing_readers_yields_zero_snapshot() {
    let log = journal();
    let mut sinks = SinkSet::new();
    sinks.push(RecordingSink::new("rec", log.clone()));
    let poller = Poller::new(
        StatsAggregator::from_readers(Platform::Other, failing_readers()),
        sinks,
        Duration::from_secs(60),
    );
    assert_eq!(poller.tick().await, SystemStats::default());
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn run_keeps_ticking_past_broken_sink_until_shutdown() {
    let log = journal();
    let mut sinks = SinkSet::new();
    sinks.push(BrokenSink);
    sinks.push(RecordingSink::new("rec", log.clone()));
    let poller = Poller::new(aggregator(), sinks, Duration::from_millis(20));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(poller.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(200)).await;
    let _ = shutdown_tx.send(());
    let cycles = handle.await.unwrap();

    assert!(cycles >= 2, "expected several cycles, got {cycles}");
    assert_eq!(log.lock().unwrap().len() as u64, cycles);
}

#[tokio::test]
async fn run_waits_for_the_interval_between_ticks() {
    let log = journal();
    let mut sinks = SinkSet::new();
    sinks.push(RecordingSink::new("rec", log.clone()));
    let poller = Poller::new(aggregator(), sinks, Duration::from_secs(3600));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(poller.run(shutdown_rx));
    tokio::time::sleep(Duration::from_millis(150)).await;
    let _ = shutdown_tx.send(());

    assert_eq!(handle.await.unwrap(), 1);
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dropped_shutdown_sender_stops_the_loop() {
    let poller = Poller::new(aggregator(), SinkSet::new(), Duration::from_millis(10));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    drop(shutdown_tx);
    assert_eq!(poller.run(shutdown_rx).await, 1);
}
