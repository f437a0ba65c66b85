use pulse_core::{ContainerInfo, DeploymentInfo, RuntimeInfo};
use std::net::ToSocketAddrs;
use std::num::NonZeroUsize;
use sysinfo::System;

/// Placeholder for any identifier that could not be determined.
pub const UNKNOWN: &str = "unknown";
const LOOPBACK: &str = "127.0.0.1";

/// Static facts about the process and where it is deployed, collected once at
/// start-up.  Nothing here can fail: every missing value becomes a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMetadata {
    pub container:  ContainerInfo,
    pub deployment: DeploymentInfo,
    pub runtime:    RuntimeInfo,
    pub cpu_cores:  usize,
}

impl HostMetadata {
    pub fn collect() -> Self {
        Self::collect_with(|key| std::env::var(key).ok())
    }

    /// Collect using `lookup` as the environment.
    pub fn collect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let hostname = System::host_name()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let local_ip = resolve_ipv4(&hostname).unwrap_or_else(|| LOOPBACK.to_string());
        let cpu_cores = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Self {
            container: ContainerInfo {
                hostname,
                local_ip,
                process_id: std::process::id(),
                threads: cpu_cores,
            },
            deployment: DeploymentInfo {
                project:  env_or("GOOGLE_CLOUD_PROJECT", UNKNOWN),
                service:  env_or("K_SERVICE", "local_service"),
                revision: env_or("K_REVISION", "local_rev"),
            },
            runtime: RuntimeInfo {
                version:  env!("CARGO_PKG_VERSION").to_string(),
                platform: platform(),
            },
            cpu_cores,
        }
    }
}

fn resolve_ipv4(hostname: &str) -> Option<String> {
    if hostname == UNKNOWN {
        return None;
    }
    (hostname, 0)
        .to_socket_addrs()
        .ok()?
        .find(|addr| addr.is_ipv4())
        .map(|addr| addr.ip().to_string())
}

fn platform() -> String {
    let os = System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_string());
    format!("{os} ({})", std::env::consts::ARCH)
}
