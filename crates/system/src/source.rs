use crate::cgroup::CgroupReader;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use thiserror::Error;
use tracing::trace;

/// Why a metric could not be read.  Never leaves the sampler: every variant is
/// replaced by a synthetic fallback value.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed '{}': {detail}", path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("{0}: baseline recorded, no rate yet")]
    Warmup(&'static str),

    #[error("{0} unavailable")]
    Unavailable(&'static str),
}

/// Anything that can report CPU, RAM and disk usage as percentages.
pub trait MetricSource: Send {
    fn cpu_percent(&mut self) -> Result<f64, SourceError>;
    fn ram_percent(&mut self) -> Result<f64, SourceError>;
    fn disk_percent(&mut self) -> Result<f64, SourceError>;
}

/// Reads the machine the process runs on: cgroup v2 accounting when present,
/// `sysinfo` otherwise.
pub struct HostSource {
    cgroup:           CgroupReader,
    sys:              System,
    cpu_refreshed_at: Instant,
    disk_path:        PathBuf,
}

impl HostSource {
    pub fn new(cgroup_root: impl Into<PathBuf>, disk_path: impl Into<PathBuf>) -> Self {
        let mut sys = System::new();
        // Prime CPU counters so the first delta has something to compare to.
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        Self {
            cgroup: CgroupReader::new(cgroup_root),
            sys,
            cpu_refreshed_at: Instant::now(),
            disk_path: disk_path.into(),
        }
    }

    fn system_cpu(&mut self) -> Result<f64, SourceError> {
        self.system_cpu_at(Instant::now())
    }

    /// sysinfo usage is only meaningful once `MINIMUM_CPU_UPDATE_INTERVAL`
    /// has passed since the previous refresh.  Earlier calls (the first tick
    /// fires right after priming) report warmup and keep the old baseline.
    fn system_cpu_at(&mut self, now: Instant) -> Result<f64, SourceError> {
        if now.saturating_duration_since(self.cpu_refreshed_at) < MINIMUM_CPU_UPDATE_INTERVAL {
            return Err(SourceError::Warmup("sysinfo cpu"));
        }
        self.sys.refresh_cpu_usage();
        self.cpu_refreshed_at = now;
        let per_core: Vec<f32> = self.sys.cpus().iter().map(|c| c.cpu_usage()).collect();
        if per_core.is_empty() {
            return Err(SourceError::Unavailable("cpu list"));
        }
        Ok(f64::from(per_core.iter().sum::<f32>()) / per_core.len() as f64)
    }
}

impl MetricSource for HostSource {
    fn cpu_percent(&mut self) -> Result<f64, SourceError> {
        match self.cgroup.cpu_percent() {
            Ok(pct) => Ok(pct),
            Err(e) => {
                trace!(error = %e, "cgroup cpu unavailable; using sysinfo");
                self.system_cpu()
            }
        }
    }

    fn ram_percent(&mut self) -> Result<f64, SourceError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();

        match self.cgroup.memory_percent(total) {
            Ok(pct) => Ok(pct),
            Err(e) => {
                trace!(error = %e, "cgroup memory unavailable; using sysinfo");
                if total == 0 {
                    return Err(SourceError::Unavailable("memory totals"));
                }
                Ok(self.sys.used_memory() as f64 / total as f64 * 100.0)
            }
        }
    }

    fn disk_percent(&mut self) -> Result<f64, SourceError> {
        let disks = Disks::new_with_refreshed_list();
        let mounts = disks
            .list()
            .iter()
            .map(|d| (d.mount_point(), d.total_space(), d.available_space()));

        mount_usage(&self.disk_path, mounts).ok_or(SourceError::Unavailable("disk usage"))
    }
}

/// Usage percentage of the mount that holds `path`: the mount point with the
/// most path components that is a prefix of `path`.
pub fn mount_usage<'a>(
    path: &Path,
    mounts: impl IntoIterator<Item = (&'a Path, u64, u64)>,
) -> Option<f64> {
    let (_, total, available) = mounts
        .into_iter()
        .filter(|(mount, _, _)| path.starts_with(mount))
        .max_by_key(|(mount, _, _)| depth(mount))?;

    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available);
    Some(used as f64 / total as f64 * 100.0)
}

fn depth(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deepest_matching_mount_wins() {
        let mounts = [
            (Path::new("/"), 1000, 900),
            (Path::new("/tmp"), 200, 50),
            (Path::new("/var"), 100, 0),
        ];
        assert_eq!(mount_usage(Path::new("/tmp/x"), mounts), Some(75.0));
        assert_eq!(mount_usage(Path::new("/home"), mounts), Some(10.0));
    }

    #[test]
    fn prefix_match_is_per_component() {
        // "/tmpfs" must not be attributed to "/tmp".
        let mounts = [(Path::new("/"), 100, 60), (Path::new("/tmp"), 100, 0)];
        assert_eq!(mount_usage(Path::new("/tmpfs"), mounts), Some(40.0));
    }

    #[test]
    fn no_mount_or_empty_disk_is_none() {
        assert_eq!(mount_usage(Path::new("/tmp"), std::iter::empty()), None);
        assert_eq!(mount_usage(Path::new("/tmp"), [(Path::new("/"), 0, 0)]), None);
    }

    #[test]
    fn cpu_read_right_after_priming_is_warmup() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = HostSource::new(dir.path().join("no-cgroup"), std::env::temp_dir());
        let primed = source.cpu_refreshed_at;
        assert!(matches!(source.system_cpu_at(primed), Err(SourceError::Warmup(_))));
        assert_eq!(source.cpu_refreshed_at, primed);
    }

    #[test]
    fn cpu_read_after_update_interval_moves_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = HostSource::new(dir.path().join("no-cgroup"), std::env::temp_dir());
        let later = source.cpu_refreshed_at + MINIMUM_CPU_UPDATE_INTERVAL;

        if let Ok(pct) = source.system_cpu_at(later) {
            assert!((0.0..=100.0).contains(&pct), "bad reading {pct}");
        }
        assert_eq!(source.cpu_refreshed_at, later);
        assert!(matches!(source.system_cpu_at(later), Err(SourceError::Warmup(_))));
    }

    #[test]
    fn host_source_reports_something_or_errors_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = HostSource::new(dir.path().join("no-cgroup"), std::env::temp_dir());
        for result in [source.cpu_percent(), source.ram_percent(), source.disk_percent()] {
            if let Ok(pct) = result {
                assert!(pct.is_finite() && pct >= 0.0, "bad reading {pct}");
            }
        }
    }
}
