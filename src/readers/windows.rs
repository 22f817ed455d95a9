// Windows readers: two-sample processor time via sysinfo, memory via a CIM query.

use super::{ReadError, Reader, run_command};
use crate::models::{ResourceUsage, round2};
use std::sync::Mutex;
use std::time::Duration;
use sysinfo::System;

/// Gap between the warm-up sample and the measured sample.
pub const SAMPLE_DELAY: Duration = Duration::from_secs(1);

const CIM_QUERY: &str = "Get-CimInstance -ClassName Win32_OperatingSystem | \
                         Format-List TotalVisibleMemorySize,FreePhysicalMemory";

/// System-wide processor time. Blocks the caller for [`SAMPLE_DELAY`]:
/// the first refresh only primes the counters and its value is discarded.
pub struct ProcessorTimeReader {
    sys: Mutex<System>,
}

impl Default for ProcessorTimeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorTimeReader {
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new()),
        }
    }
}

impl Reader for ProcessorTimeReader {
    type Output = f64;

    fn name(&self) -> &'static str {
        "windows.cpu"
    }

    fn read(&self) -> Result<f64, ReadError> {
        let mut sys = self.sys.lock().map_err(|_| ReadError::Poisoned)?;
        sys.refresh_cpu_all();
        std::thread::sleep(SAMPLE_DELAY.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        sys.refresh_cpu_all();
        let usage = sys.global_cpu_usage() as f64;
        Ok(round2(usage).clamp(0.0, 100.0))
    }
}

/// Value of `key` from `Format-List` output (`Key : Value` lines).
fn cim_kb(output: &str, key: &'static str) -> Result<f64, ReadError> {
    let raw = output
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
        .ok_or(ReadError::MissingField(key))?;
    raw.parse::<u64>()
        .map(|kb| kb as f64)
        .map_err(|e| ReadError::Parse(format!("{key} {raw:?}: {e}")))
}

/// `TotalVisibleMemorySize` and `FreePhysicalMemory` (both kB) to a used/total MB pair.
pub fn parse_cim_memory(output: &str) -> Result<ResourceUsage, ReadError> {
    let total_mb = cim_kb(output, "TotalVisibleMemorySize")? / 1024.0;
    let free_mb = cim_kb(output, "FreePhysicalMemory")? / 1024.0;
    Ok(ResourceUsage::new(
        round2(total_mb - free_mb),
        round2(total_mb),
    ))
}

pub struct CimMemoryReader {
    program: String,
    timeout: Duration,
}

impl CimMemoryReader {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("powershell", timeout)
    }

    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Reader for CimMemoryReader {
    type Output = ResourceUsage;

    fn name(&self) -> &'static str {
        "windows.memory"
    }

    fn read(&self) -> Result<ResourceUsage, ReadError> {
        let out = run_command(
            &self.program,
            &["-NoProfile", "-NonInteractive", "-Command", CIM_QUERY],
            self.timeout,
        )?;
        parse_cim_memory(&out)
    }
}
