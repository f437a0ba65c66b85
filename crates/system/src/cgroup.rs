//! cgroup v2 accounting files.
//!
//! Inside a container these are the only figures that describe the container
//! itself rather than the host it runs on.

use crate::source::SourceError;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Value of `memory.max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLimit {
    /// The literal `max`: no limit below physical RAM.
    Unlimited,
    Bytes(u64),
}

#[derive(Debug, Clone, Copy)]
struct CpuReading {
    usage_usec: u64,
    at:         Instant,
}

/// Reads CPU and memory usage from a cgroup v2 directory.
///
/// CPU usage is a rate, so the first call only records a baseline and
/// returns [`SourceError::Warmup`].
#[derive(Debug)]
pub struct CgroupReader {
    root:     PathBuf,
    last_cpu: Option<CpuReading>,
}

impl CgroupReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:     root.into(),
            last_cpu: None,
        }
    }

    pub fn cpu_percent(&mut self) -> Result<f64, SourceError> {
        self.cpu_percent_at(Instant::now())
    }

    /// CPU time consumed since the previous call as a share of wall time.
    /// Multi-core containers can exceed 100.
    pub fn cpu_percent_at(&mut self, now: Instant) -> Result<f64, SourceError> {
        let path = self.root.join("cpu.stat");
        let raw = read(&path)?;
        let usage_usec = parse_cpu_stat(&raw).ok_or_else(|| SourceError::Parse {
            path:   path.clone(),
            detail: "no usage_usec line".to_string(),
        })?;

        let previous = self.last_cpu.replace(CpuReading { usage_usec, at: now });
        let Some(previous) = previous else {
            return Err(SourceError::Warmup("cgroup cpu"));
        };

        let elapsed = now.saturating_duration_since(previous.at).as_secs_f64();
        if elapsed <= 0.0 {
            return Err(SourceError::Warmup("cgroup cpu"));
        }

        let used = usage_usec.saturating_sub(previous.usage_usec) as f64;
        Ok(used / (elapsed * 1_000_000.0) * 100.0)
    }

    /// `memory.current` over `memory.max`; an unlimited cgroup is measured
    /// against `physical_total` bytes.
    pub fn memory_percent(&self, physical_total: u64) -> Result<f64, SourceError> {
        let current_path = self.root.join("memory.current");
        let current = read(&current_path)?;
        let used: u64 = current.trim().parse().map_err(|e| SourceError::Parse {
            path:   current_path,
            detail: format!("{e}"),
        })?;

        let max_path = self.root.join("memory.max");
        let max = read(&max_path)?;
        let limit = match parse_memory_max(&max) {
            Some(MemoryLimit::Bytes(bytes)) => bytes,
            Some(MemoryLimit::Unlimited) => physical_total,
            None => {
                return Err(SourceError::Parse {
                    path:   max_path,
                    detail: format!("unexpected value '{}'", max.trim()),
                })
            }
        };

        if limit == 0 {
            return Err(SourceError::Unavailable("memory limit"));
        }
        Ok(used as f64 / limit as f64 * 100.0)
    }
}

fn read(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract `usage_usec` from the contents of `cpu.stat`.
pub fn parse_cpu_stat(raw: &str) -> Option<u64> {
    raw.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some("usage_usec"), Some(value)) => value.parse().ok(),
            _ => None,
        }
    })
}

pub fn parse_memory_max(raw: &str) -> Option<MemoryLimit> {
    match raw.trim() {
        "max" => Some(MemoryLimit::Unlimited),
        value => value.parse().ok().map(MemoryLimit::Bytes),
    }
}
