// Shared test helpers: scripted readers and a recording sink

#![allow(dead_code)]

use system_monitor::models::{ResourceUsage, SystemStats};
use system_monitor::readers::{ReadError, Reader, ReaderSet};
use system_monitor::sinks::{SinkError, StatsSink};
use std::sync::{Arc, Mutex};

/// Returns a fixed value, or fails when built with `failing`.
pub struct FixedReader<T> {
    value: Option<T>,
}

impl<T> FixedReader<T> {
    pub fn ok(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub fn failing() -> Self {
        Self { value: None }
    }
}

impl<T: Default + Clone + Send + Sync> Reader for FixedReader<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        "fixed"
    }

    fn read(&self) -> Result<T, ReadError> {
        self.value.clone().ok_or(ReadError::Unsupported)
    }
}

pub fn fixed_readers(cpu: f64, ram: ResourceUsage, disk: ResourceUsage) -> ReaderSet {
    ReaderSet {
        cpu: Box::new(FixedReader::ok(cpu)),
        memory: Box::new(FixedReader::ok(ram)),
        disk: Box::new(FixedReader::ok(disk)),
    }
}

pub fn failing_readers() -> ReaderSet {
    ReaderSet {
        cpu: Box::new(FixedReader::<f64>::failing()),
        memory: Box::new(FixedReader::<ResourceUsage>::failing()),
        disk: Box::new(FixedReader::<ResourceUsage>::failing()),
    }
}

/// Records every snapshot it receives, tagged with its name, into a shared journal.
pub struct RecordingSink {
    name: String,
    journal: Arc<Mutex<Vec<(String, SystemStats)>>>,
}

impl RecordingSink {
    pub fn new(name: &str, journal: Arc<Mutex<Vec<(String, SystemStats)>>>) -> Self {
        Self {
            name: name.to_string(),
            journal,
        }
    }
}

impl StatsSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_stats_collected(&self, stats: &SystemStats) -> Result<(), SinkError> {
        self.journal
            .lock()
            .unwrap()
            .push((self.name.clone(), *stats));
        Ok(())
    }
}

/// Always fails, like a file sink pointed at an unwritable path.
pub struct BrokenSink;

impl StatsSink for BrokenSink {
    fn name(&self) -> &str {
        "broken"
    }

    fn on_stats_collected(&self, _stats: &SystemStats) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }
}

pub fn journal() -> Arc<Mutex<Vec<(String, SystemStats)>>> {
    Arc::new(Mutex::new(Vec::new()))
}
