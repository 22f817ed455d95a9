// Aggregator tests: snapshot assembly and invariants

mod common;

use common::{FixedReader, failing_readers, fixed_readers};
use system_monitor::aggregator::StatsAggregator;
use system_monitor::models::{Platform, ResourceUsage, SystemStats};
use system_monitor::readers::{ReaderSet, SamplingOptions};

#[test]
fn collect_assembles_all_three_readings() {
    let agg = StatsAggregator::from_readers(
        Platform::Linux,
        fixed_readers(
            15.0,
            ResourceUsage::new(8000.0, 16000.0),
            ResourceUsage::new(61440.0, 102400.0),
        ),
    );
    assert_eq!(
        agg.collect(),
        SystemStats {
            cpu_usage_percent: 15.0,
            ram_used_mb: 8000.0,
            ram_total_mb: 16000.0,
            disk_used_mb: 61440.0,
            disk_total_mb: 102400.0,
        }
    );
}

#[test]
fn collect_never_fails_when_every_reader_fails() {
    let agg = StatsAggregator::from_readers(Platform::Other, failing_readers());
    assert_eq!(agg.collect(), SystemStats::default());
}

#[test]
fn missing_root_volume_zeroes_disk_only() {
    let readers = ReaderSet {
        cpu: Box::new(FixedReader::ok(42.5)),
        memory: Box::new(FixedReader::ok(ResourceUsage::new(1.0, 2.0))),
        disk: Box::new(FixedReader::<ResourceUsage>::failing()),
    };
    let stats = StatsAggregator::from_readers(Platform::Linux, readers).collect();
    assert_eq!(stats.cpu_usage_percent, 42.5);
    assert_eq!(stats.ram(), ResourceUsage::new(1.0, 2.0));
    assert_eq!(stats.disk_used_mb, 0.0);
    assert_eq!(stats.disk_total_mb, 0.0);
}

#[test]
fn inconsistent_pairs_are_reported_as_zero() {
    let bad_pairs = [
        ResourceUsage::new(-2.0, 0.0),
        ResourceUsage::new(10.0, 5.0),
        ResourceUsage::new(3.0, 0.0),
        ResourceUsage::new(f64::NAN, 4.0),
    ];
    for pair in bad_pairs {
        let stats = StatsAggregator::from_readers(
            Platform::Linux,
            fixed_readers(1.0, pair, pair),
        )
        .collect();
        assert_eq!(stats.ram(), ResourceUsage::ZERO, "{pair:?}");
        assert_eq!(stats.disk(), ResourceUsage::ZERO, "{pair:?}");
    }
}

#[test]
fn cpu_outside_range_is_clamped() {
    let high = StatsAggregator::from_readers(
        Platform::MacOs,
        fixed_readers(250.0, ResourceUsage::ZERO, ResourceUsage::ZERO),
    );
    assert_eq!(high.collect().cpu_usage_percent, 100.0);
    let nan = StatsAggregator::from_readers(
        Platform::MacOs,
        fixed_readers(f64::NAN, ResourceUsage::ZERO, ResourceUsage::ZERO),
    );
    assert_eq!(nan.collect().cpu_usage_percent, 0.0);
}

#[test]
fn live_snapshot_keeps_used_within_total() {
    let agg = StatsAggregator::for_platform(Platform::current(), &SamplingOptions::default());
    assert_eq!(agg.platform(), Platform::current());
    let stats = agg.collect();
    assert!((0.0..=100.0).contains(&stats.cpu_usage_percent));
    for pair in [stats.ram(), stats.disk()] {
        assert!(pair.used_mb >= 0.0 && pair.total_mb >= 0.0);
        if pair.total_mb > 0.0 {
            assert!(pair.used_mb <= pair.total_mb);
        }
    }
}
