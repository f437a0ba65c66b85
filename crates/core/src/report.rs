use crate::health::HealthStatus;
use crate::sample::Sample;
use serde::Serialize;

/// Everything the JSON endpoint, the dashboard and the PDF export show.
///
/// Built fresh for every request and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Short random identifier (8 upper-case hex characters).
    pub report_id: String,
    /// RFC 3339 UTC timestamp of assembly.
    pub timestamp: String,
    /// The same instant rendered in the configured display offset,
    /// e.g. `"2026-10-19 13:30:00 IST"`.
    pub timestamp_local: String,
    pub uptime_seconds: f64,
    pub health_score: f64,
    pub status: HealthStatus,
    pub status_message: String,
    pub resources: Resources,
    pub container: ContainerInfo,
    pub deployment: DeploymentInfo,
    pub runtime_info: RuntimeInfo,
    pub meta: ReportMeta,
    /// Rolling history, oldest first.
    pub history_snapshot: Vec<Sample>,
}

/// Resource figures of the sample the report was scored on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resources {
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
    pub error_rate: f64,
    pub api_requests: u32,
    pub cpu_cores: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub hostname: String,
    pub local_ip: String,
    pub process_id: u32,
    pub threads: usize,
}

/// Where the process is deployed. Missing identifiers carry placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentInfo {
    pub project: String,
    pub service: String,
    pub revision: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    pub version: String,
    pub platform: String,
}

/// Synthetic traffic figures of the scored sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportMeta {
    pub simulated_users: u32,
    pub active_sessions: u32,
    pub api_requests_last_min: u32,
    pub error_rate_percent: f64,
}

impl Resources {
    pub fn from_sample(sample: &Sample, cpu_cores: usize) -> Self {
        Self {
            cpu: sample.cpu_percent(),
            ram: sample.ram_percent(),
            disk: sample.disk_percent(),
            error_rate: sample.error_rate_percent(),
            api_requests: sample.api_requests(),
            cpu_cores,
        }
    }
}

impl ReportMeta {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            simulated_users: sample.simulated_users(),
            active_sessions: sample.active_sessions(),
            api_requests_last_min: sample.api_requests(),
            error_rate_percent: sample.error_rate_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn resources_and_meta_mirror_the_sample() {
        let s = Sample::new(Utc::now(), 12.5, 40.0, 61.25, 420, 1.5, 77, 33);
        let r = Resources::from_sample(&s, 8);
        assert_eq!((r.cpu, r.ram, r.disk, r.error_rate), (12.5, 40.0, 61.25, 1.5));
        assert_eq!((r.api_requests, r.cpu_cores), (420, 8));

        let m = ReportMeta::from_sample(&s);
        assert_eq!((m.simulated_users, m.active_sessions, m.api_requests_last_min), (77, 33, 420));
    }
}
