// Snapshot produced once per sampling cycle

use serde::{Deserialize, Serialize};
use std::fmt;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Rounds to two decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A used/total pair in megabytes. `(0, 0)` means "could not measure".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    pub used_mb: f64,
    pub total_mb: f64,
}

impl ResourceUsage {
    pub const ZERO: ResourceUsage = ResourceUsage {
        used_mb: 0.0,
        total_mb: 0.0,
    };

    pub fn new(used_mb: f64, total_mb: f64) -> Self {
        Self { used_mb, total_mb }
    }

    /// Builds a pair from a byte total and free byte count, rounded to 2 decimals.
    pub fn from_bytes(total_bytes: u64, free_bytes: u64) -> Self {
        let total_mb = total_bytes as f64 / BYTES_PER_MB;
        let free_mb = free_bytes as f64 / BYTES_PER_MB;
        Self {
            used_mb: round2(total_mb - free_mb),
            total_mb: round2(total_mb),
        }
    }

    /// True when the pair can be published as-is: both values non-negative and finite,
    /// `used <= total`, and a zero total only alongside a zero used.
    pub fn is_consistent(&self) -> bool {
        if !self.used_mb.is_finite() || !self.total_mb.is_finite() {
            return false;
        }
        if self.used_mb < 0.0 || self.total_mb < 0.0 {
            return false;
        }
        if self.total_mb == 0.0 {
            return self.used_mb == 0.0;
        }
        self.used_mb <= self.total_mb
    }
}

/// One sampling cycle's view of the host. Handed to sinks by reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub cpu_usage_percent: f64,
    pub ram_used_mb: f64,
    pub ram_total_mb: f64,
    pub disk_used_mb: f64,
    pub disk_total_mb: f64,
}

impl SystemStats {
    pub fn new(cpu_usage_percent: f64, ram: ResourceUsage, disk: ResourceUsage) -> Self {
        Self {
            cpu_usage_percent,
            ram_used_mb: ram.used_mb,
            ram_total_mb: ram.total_mb,
            disk_used_mb: disk.used_mb,
            disk_total_mb: disk.total_mb,
        }
    }

    pub fn ram(&self) -> ResourceUsage {
        ResourceUsage::new(self.ram_used_mb, self.ram_total_mb)
    }

    pub fn disk(&self) -> ResourceUsage {
        ResourceUsage::new(self.disk_used_mb, self.disk_total_mb)
    }
}

/// `CPU: 15.5% | RAM: 8000/16000 MB | Disk: 0/0 MB`
impl fmt::Display for SystemStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU: {}% | RAM: {}/{} MB | Disk: {}/{} MB",
            self.cpu_usage_percent,
            self.ram_used_mb,
            self.ram_total_mb,
            self.disk_used_mb,
            self.disk_total_mb
        )
    }
}
