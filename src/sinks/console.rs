// Console sink: one line per snapshot on stdout

use super::{SinkError, StatsSink};
use crate::models::SystemStats;
use std::io::Write;

/// Prints each snapshot to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl StatsSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn on_stats_collected(&self, stats: &SystemStats) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "[console] {stats}")?;
        Ok(())
    }
}
