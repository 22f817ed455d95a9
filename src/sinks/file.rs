// Append-only text log, one line per cycle

use super::{SinkError, StatsSink};
use crate::models::SystemStats;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "monitor_log.txt";

/// `2024-05-01 12:00:00Z | CPU: 15% | RAM: 8000/16000 MB | Disk: 0/0 MB`
pub fn format_log_line(stats: &SystemStats, at: DateTime<Utc>) -> String {
    format!("{} | {}", at.format("%Y-%m-%d %H:%M:%SZ"), stats)
}

/// Opens the file per write; never truncates or rotates it.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn on_stats_collected(&self, stats: &SystemStats) -> Result<(), SinkError> {
        let mut line = format_log_line(stats, Utc::now());
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
