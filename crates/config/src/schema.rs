use pulse_core::{HealthThresholds, HealthWeights};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `pulse.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Background sampling loop settings.
    pub sampler: SamplerConfig,
    /// Health score weights and status thresholds.
    pub health: HealthConfig,
    /// How local timestamps are rendered.
    pub display: DisplayConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address; `HOST` overrides it.
    pub host: String,
    /// Bind port; `PORT` overrides it.
    pub port: u16,
    /// How often the dashboard page re-polls `/analyze` (seconds).
    pub refresh_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host:         "0.0.0.0".to_string(),
            port:         8080,
            refresh_secs: 5,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Seconds between two samples.
    pub interval_secs: u64,
    /// Number of samples retained in the rolling history.
    pub history_capacity: usize,
    /// cgroup v2 mount read for container CPU / memory figures.
    pub cgroup_root: PathBuf,
    /// Any path on the filesystem whose usage is reported as disk usage.
    pub disk_path: PathBuf,
    /// Maximum ± noise added to real CPU readings (percentage points).
    pub cpu_jitter: f64,
    /// Maximum ± noise added to real RAM readings.
    pub ram_jitter: f64,
    /// Maximum ± noise added to real disk readings.
    pub disk_jitter: f64,
    /// Fixed RNG seed for reproducible synthetic values; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval_secs:    5,
            history_capacity: 50,
            cgroup_root:      PathBuf::from("/sys/fs/cgroup"),
            disk_path:        PathBuf::from("/tmp"),
            cpu_jitter:       2.0,
            ram_jitter:       2.0,
            disk_jitter:      3.0,
            seed:             None,
        }
    }
}

impl SamplerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub weights:    HealthWeights,
    pub thresholds: HealthThresholds,
}

/// Fixed UTC offset used for the human-facing timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Minutes east of UTC (India Standard Time by default).
    pub utc_offset_minutes: i32,
    /// Suffix appended to the rendered time, e.g. `"IST"`.
    pub label: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            label:              "IST".to_string(),
        }
    }
}
