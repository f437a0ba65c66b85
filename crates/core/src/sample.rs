use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single point-in-time observation of resource usage.
///
/// Percentages are clamped to `0.0 – 100.0` by [`Sample::new`], the only way
/// to build one, so every `Sample` is in range regardless of what the metric
/// source reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    timestamp:          DateTime<Utc>,
    cpu_percent:        f64,
    ram_percent:        f64,
    disk_percent:       f64,
    api_requests:       u32,
    error_rate_percent: f64,
    simulated_users:    u32,
    active_sessions:    u32,
}

impl Sample {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        cpu_percent: f64,
        ram_percent: f64,
        disk_percent: f64,
        api_requests: u32,
        error_rate_percent: f64,
        simulated_users: u32,
        active_sessions: u32,
    ) -> Self {
        Self {
            timestamp,
            cpu_percent: clamp_percent(cpu_percent),
            ram_percent: clamp_percent(ram_percent),
            disk_percent: clamp_percent(disk_percent),
            api_requests,
            error_rate_percent: clamp_percent(error_rate_percent),
            simulated_users,
            active_sessions,
        }
    }

    /// Resource-only sample with zeroed traffic counters.
    pub fn resources(
        timestamp: DateTime<Utc>,
        cpu_percent: f64,
        ram_percent: f64,
        disk_percent: f64,
        error_rate_percent: f64,
    ) -> Self {
        Self::new(timestamp, cpu_percent, ram_percent, disk_percent, 0, error_rate_percent, 0, 0)
    }

    /// Wall-clock time the sample was taken.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn cpu_percent(&self) -> f64 {
        self.cpu_percent
    }

    pub fn ram_percent(&self) -> f64 {
        self.ram_percent
    }

    /// Usage of the filesystem holding the monitored path.
    pub fn disk_percent(&self) -> f64 {
        self.disk_percent
    }

    /// API requests observed in the last minute.
    pub fn api_requests(&self) -> u32 {
        self.api_requests
    }

    /// Share of failed requests.
    pub fn error_rate_percent(&self) -> f64 {
        self.error_rate_percent
    }

    pub fn simulated_users(&self) -> u32 {
        self.simulated_users
    }

    pub fn active_sessions(&self) -> u32 {
        self.active_sessions
    }
}

/// Clamp to `[0, 100]`; NaN collapses to zero.
fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Round to two decimal places, the precision every reported figure uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
