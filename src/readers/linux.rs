// Linux readers: /proc/stat aggregate CPU line and /proc/meminfo.

use super::{ReadError, Reader};
use crate::models::{ResourceUsage, round2};
use std::path::{Path, PathBuf};

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";

fn read_file(path: &Path) -> Result<String, ReadError> {
    std::fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// CPU% from the aggregate `cpu` line: `(user+nice+system) / (user+nice+system+idle) * 100`.
///
/// This is a single read, so the ratio is the average since boot rather than a
/// recent-window rate. Callers wanting a windowed value must diff two reads.
pub fn parse_proc_stat(content: &str) -> Result<f64, ReadError> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or(ReadError::MissingField("cpu"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(4)
        .map(|f| {
            f.parse::<u64>()
                .map_err(|e| ReadError::Parse(format!("cpu field {f:?}: {e}")))
        })
        .collect::<Result<_, _>>()?;
    let [user, nice, system, idle] = fields[..] else {
        return Err(ReadError::Parse(format!(
            "cpu line has {} fields, need 4",
            fields.len()
        )));
    };

    // Summed as f64: counters near u64::MAX must not overflow.
    let used = user as f64 + nice as f64 + system as f64;
    let total = used + idle as f64;
    if total == 0.0 {
        return Ok(0.0);
    }
    Ok(round2(used / total * 100.0))
}

/// Value in kB of the first line starting with `key`, or 0 if absent or not an unsigned integer.
fn meminfo_kb(content: &str, key: &str) -> f64 {
    content
        .lines()
        .find(|l| l.starts_with(key))
        .and_then(|l| l.split_once(':'))
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(0.0, |kb| kb as f64)
}

/// `(MemTotal - MemAvailable) / 1024` and `MemTotal / 1024`, rounded to 2 decimals.
///
/// A missing key counts as 0; with `MemTotal` absent but `MemAvailable` present the
/// used value comes out negative. The aggregator zeroes such pairs.
pub fn parse_meminfo(content: &str) -> ResourceUsage {
    let total_kb = meminfo_kb(content, "MemTotal");
    let available_kb = meminfo_kb(content, "MemAvailable");
    ResourceUsage::new(
        round2((total_kb - available_kb) / 1024.0),
        round2(total_kb / 1024.0),
    )
}

pub struct ProcStatCpuReader {
    path: PathBuf,
}

impl ProcStatCpuReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcStatCpuReader {
    fn default() -> Self {
        Self::new(PROC_STAT)
    }
}

impl Reader for ProcStatCpuReader {
    type Output = f64;

    fn name(&self) -> &'static str {
        "linux.cpu"
    }

    fn read(&self) -> Result<f64, ReadError> {
        parse_proc_stat(&read_file(&self.path)?)
    }
}

pub struct MeminfoReader {
    path: PathBuf,
}

impl MeminfoReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for MeminfoReader {
    fn default() -> Self {
        Self::new(PROC_MEMINFO)
    }
}

impl Reader for MeminfoReader {
    type Output = ResourceUsage;

    fn name(&self) -> &'static str {
        "linux.memory"
    }

    fn read(&self) -> Result<ResourceUsage, ReadError> {
        Ok(parse_meminfo(&read_file(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  4705 356 584 3699 23 23 0 0 0 0\n\
                        cpu0 1393 280 237 4493 1 5 0 0 0 0\n\
                        intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]\n";

    #[test]
    fn proc_stat_uses_aggregate_line_only() {
        // used = 4705 + 356 + 584 = 5645, total = 5645 + 3699 = 9344
        assert_eq!(parse_proc_stat(STAT).unwrap(), 60.41);
    }

    #[test]
    fn proc_stat_four_fields_is_enough() {
        assert_eq!(parse_proc_stat("cpu 100 0 50 850").unwrap(), 15.0);
    }

    #[test]
    fn proc_stat_huge_counters_do_not_overflow() {
        let max = u64::MAX;
        let pct = parse_proc_stat(&format!("cpu {max} 1 0 0")).unwrap();
        assert_eq!(pct, 100.0);
        let pct = parse_proc_stat(&format!("cpu {max} {max} {max} {max}")).unwrap();
        assert_eq!(pct, 75.0);
    }

    #[test]
    fn proc_stat_all_zero_is_zero() {
        assert_eq!(parse_proc_stat("cpu 0 0 0 0 0 0 0 0").unwrap(), 0.0);
    }

    #[test]
    fn proc_stat_rejects_truncated_and_garbage() {
        assert!(parse_proc_stat("cpu 1 2").is_err());
        assert!(parse_proc_stat("cpu a b c d").is_err());
        assert!(parse_proc_stat("").is_err());
        assert!(parse_proc_stat("cpu0 1 2 3 4").is_err());
    }

    #[test]
    fn meminfo_scenario() {
        let usage = parse_meminfo("MemTotal: 16384000 kB\nMemAvailable: 8192000 kB\n");
        assert_eq!(usage, ResourceUsage::new(8000.0, 16000.0));
    }

    #[test]
    fn meminfo_rounds_to_two_decimals() {
        let usage = parse_meminfo("MemTotal:        1000 kB\nMemFree: 10 kB\nMemAvailable:     1 kB\n");
        assert_eq!(usage, ResourceUsage::new(0.98, 0.98));
    }

    #[test]
    fn meminfo_first_match_wins() {
        let usage = parse_meminfo(
            "MemTotal: 2048 kB\nMemAvailable: 1024 kB\nMemTotal: 999999 kB\nMemAvailable: 0 kB\n",
        );
        assert_eq!(usage, ResourceUsage::new(1.0, 2.0));
    }

    #[test]
    fn meminfo_missing_total_yields_negative_used() {
        let usage = parse_meminfo("MemAvailable: 2048 kB\n");
        assert_eq!(usage, ResourceUsage::new(-2.0, 0.0));
    }

    #[test]
    fn meminfo_non_integer_tokens_count_as_missing() {
        assert_eq!(
            parse_meminfo("MemTotal: NaN kB\nMemAvailable: 1.5e3 kB\n"),
            ResourceUsage::ZERO
        );
        assert_eq!(
            parse_meminfo("MemTotal: inf kB\nMemAvailable: -5 kB\n"),
            ResourceUsage::ZERO
        );
        // Only the malformed key drops to 0; the valid one is kept.
        assert_eq!(
            parse_meminfo("MemTotal: 2048 kB\nMemAvailable: -5 kB\n"),
            ResourceUsage::new(2.0, 2.0)
        );
    }

    #[test]
    fn meminfo_garbage_is_zero_pair() {
        assert_eq!(parse_meminfo("nonsense\n\n:::"), ResourceUsage::ZERO);
        assert_eq!(parse_meminfo("MemTotal: lots kB"), ResourceUsage::ZERO);
    }
}
