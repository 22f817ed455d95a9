// macOS readers: summed per-process CPU from `ps`, memory pages from `vm_stat`.

use super::{ReadError, Reader, run_command};
use crate::models::{ResourceUsage, round2};
use std::time::Duration;

/// Sums the %cpu column of every process into a single line.
const CPU_PIPELINE: &str = "ps -A -o %cpu | awk '{s+=$1} END {print s}'";

/// vm_stat reports page counts; the page size is taken as fixed.
pub const PAGE_SIZE: u64 = 4096;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Parses the single numeric line printed by the CPU pipeline.
/// The sum can exceed 100 on multi-core hosts; it is clamped to `[0, 100]`.
pub fn parse_cpu_sum(output: &str) -> Result<f64, ReadError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or(ReadError::MissingField("cpu sum"))?;
    let value: f64 = line
        .parse()
        .map_err(|e| ReadError::Parse(format!("cpu sum {line:?}: {e}")))?;
    if !value.is_finite() {
        return Err(ReadError::Parse(format!("cpu sum {line:?} is not finite")));
    }
    Ok(round2(value).clamp(0.0, 100.0))
}

/// Page counts pulled out of `vm_stat` output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageCounts {
    pub free: u64,
    pub active: u64,
    pub inactive: u64,
    pub wired: u64,
}

impl PageCounts {
    /// `used = active + inactive + wired`, `total = used + free`, in MB.
    pub fn usage(&self) -> ResourceUsage {
        // f64 throughout: page counts near u64::MAX must not overflow.
        let page_mb = PAGE_SIZE as f64 / BYTES_PER_MB;
        let used_pages = self.active as f64 + self.inactive as f64 + self.wired as f64;
        let total_pages = used_pages + self.free as f64;
        ResourceUsage::new(
            round2(used_pages * page_mb),
            round2(total_pages * page_mb),
        )
    }
}

/// Integer after the colon on the first line containing `label`, trailing `.` removed.
fn vm_stat_pages(output: &str, label: &str) -> Result<u64, ReadError> {
    let Some(line) = output.lines().find(|l| l.contains(label)) else {
        return Ok(0);
    };
    let raw = line
        .split_once(':')
        .map(|(_, v)| v.trim().trim_end_matches('.'))
        .ok_or_else(|| ReadError::Parse(format!("{label}: no value")))?;
    raw.parse::<u64>()
        .map_err(|e| ReadError::Parse(format!("{label} {raw:?}: {e}")))
}

/// Missing labels count as zero pages; a present label with a non-numeric value is an error.
pub fn parse_vm_stat(output: &str) -> Result<PageCounts, ReadError> {
    Ok(PageCounts {
        free: vm_stat_pages(output, "Pages free")?,
        active: vm_stat_pages(output, "Pages active")?,
        inactive: vm_stat_pages(output, "Pages inactive")?,
        wired: vm_stat_pages(output, "Pages wired down")?,
    })
}

pub struct PsCpuReader {
    shell: String,
    timeout: Duration,
}

impl PsCpuReader {
    pub fn new(timeout: Duration) -> Self {
        Self::with_shell("/bin/sh", timeout)
    }

    pub fn with_shell(shell: impl Into<String>, timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            timeout,
        }
    }
}

impl Reader for PsCpuReader {
    type Output = f64;

    fn name(&self) -> &'static str {
        "macos.cpu"
    }

    fn read(&self) -> Result<f64, ReadError> {
        let out = run_command(&self.shell, &["-c", CPU_PIPELINE], self.timeout)?;
        parse_cpu_sum(&out)
    }
}

pub struct VmStatReader {
    program: String,
    timeout: Duration,
}

impl VmStatReader {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("vm_stat", timeout)
    }

    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Reader for VmStatReader {
    type Output = ResourceUsage;

    fn name(&self) -> &'static str {
        "macos.memory"
    }

    fn read(&self) -> Result<ResourceUsage, ReadError> {
        let out = run_command(&self.program, &[], self.timeout)?;
        Ok(parse_vm_stat(&out)?.usage())
    }
}
