// Assembles one SystemStats snapshot from the platform's readers

use crate::models::{Platform, ResourceUsage, SystemStats};
use crate::readers::{CpuReader, DiskReader, MemoryReader, ReaderSet, SamplingOptions};
use tracing::instrument;

pub struct StatsAggregator {
    platform: Platform,
    cpu: CpuReader,
    memory: MemoryReader,
    disk: DiskReader,
}

impl StatsAggregator {
    /// Readers are chosen here, once; `collect` never re-checks the platform.
    pub fn for_platform(platform: Platform, options: &SamplingOptions) -> Self {
        Self::from_readers(platform, ReaderSet::for_platform(platform, options))
    }

    pub fn from_readers(platform: Platform, readers: ReaderSet) -> Self {
        let ReaderSet { cpu, memory, disk } = readers;
        Self {
            platform,
            cpu,
            memory,
            disk,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Never fails. Blocks for as long as the slowest reader (about one second
    /// on Windows, plus any external command on macOS/Windows).
    #[instrument(skip(self), fields(platform = self.platform.as_str(), operation = "collect"))]
    pub fn collect(&self) -> SystemStats {
        let cpu = self.cpu.read_or_default();
        let cpu = if cpu.is_finite() {
            cpu.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let ram = normalize("memory", self.memory.read_or_default());
        let disk = normalize("disk", self.disk.read_or_default());
        SystemStats::new(cpu, ram, disk)
    }
}

/// Replaces an inconsistent pair with `(0, 0)` so a snapshot never carries a partial value.
fn normalize(metric: &'static str, usage: ResourceUsage) -> ResourceUsage {
    if usage.is_consistent() {
        usage
    } else {
        tracing::debug!(
            metric,
            used_mb = usage.used_mb,
            total_mb = usage.total_mb,
            "inconsistent pair; reporting zero"
        );
        ResourceUsage::ZERO
    }
}
