// Per-platform metric readers (CPU, memory, disk), selected once at startup

mod command;
pub mod disk;
pub mod linux;
pub mod macos;
pub mod windows;

pub use command::run_command;

use crate::models::{Platform, ResourceUsage};
use std::path::PathBuf;
use std::time::Duration;

/// Why a reader could not produce a measurement. Never leaves the reader's
/// public contract: [`Reader::read_or_default`] collapses it to the zero fallback.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("field {0} not present")]
    MissingField(&'static str),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("no ready volume mounted at {0}")]
    NoRootVolume(PathBuf),

    #[error("sysinfo lock poisoned")]
    Poisoned,

    #[error("unsupported platform")]
    Unsupported,
}

/// One metric strategy. `read` is the explicit result; `read_or_default`
/// is the never-failing contract the aggregator relies on.
pub trait Reader: Send + Sync {
    type Output: Default;

    fn name(&self) -> &'static str;

    fn read(&self) -> Result<Self::Output, ReadError>;

    fn read_or_default(&self) -> Self::Output {
        match self.read() {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(reader = self.name(), error = %e, "measurement unavailable; using zero");
                Default::default()
            }
        }
    }
}

pub type CpuReader = Box<dyn Reader<Output = f64>>;
pub type MemoryReader = Box<dyn Reader<Output = ResourceUsage>>;
pub type DiskReader = Box<dyn Reader<Output = ResourceUsage>>;

/// Knobs shared by the readers that shell out.
#[derive(Debug, Clone)]
pub struct SamplingOptions {
    pub command_timeout: Duration,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(10),
        }
    }
}

/// Reader for a metric the platform has no strategy for.
pub struct Unsupported<T> {
    name: &'static str,
    _output: std::marker::PhantomData<fn() -> T>,
}

impl<T> Unsupported<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _output: std::marker::PhantomData,
        }
    }
}

impl<T: Default> Reader for Unsupported<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&self) -> Result<T, ReadError> {
        Err(ReadError::Unsupported)
    }
}

/// The three strategies for one platform.
pub struct ReaderSet {
    pub cpu: CpuReader,
    pub memory: MemoryReader,
    pub disk: DiskReader,
}

impl ReaderSet {
    pub fn for_platform(platform: Platform, options: &SamplingOptions) -> Self {
        let disk: DiskReader = Box::new(disk::VolumeDiskReader::new(platform.root_mount()));
        match platform {
            Platform::Linux => Self {
                cpu: Box::new(linux::ProcStatCpuReader::default()),
                memory: Box::new(linux::MeminfoReader::default()),
                disk,
            },
            Platform::Windows => Self {
                cpu: Box::new(windows::ProcessorTimeReader::new()),
                memory: Box::new(windows::CimMemoryReader::new(options.command_timeout)),
                disk,
            },
            Platform::MacOs => Self {
                cpu: Box::new(macos::PsCpuReader::new(options.command_timeout)),
                memory: Box::new(macos::VmStatReader::new(options.command_timeout)),
                disk,
            },
            Platform::Other => Self {
                cpu: Box::new(Unsupported::new("cpu")),
                memory: Box::new(Unsupported::new("memory")),
                disk,
            },
        }
    }
}
