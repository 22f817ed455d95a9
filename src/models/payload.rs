// JSON body posted by the HTTP sink

use super::SystemStats;
use serde::Serialize;

/// `{"cpu": <number>, "ram_used": <number>, "disk_used": <number>}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsPayload {
    pub cpu: f64,
    pub ram_used: f64,
    pub disk_used: f64,
}

impl From<&SystemStats> for StatsPayload {
    fn from(stats: &SystemStats) -> Self {
        Self {
            cpu: stats.cpu_usage_percent,
            ram_used: stats.ram_used_mb,
            disk_used: stats.disk_used_mb,
        }
    }
}
