pub mod schema;

pub use schema::{DisplayConfig, HealthConfig, PulseConfig, SamplerConfig, ServerConfig};

use pulse_core::{PulseError, Result};
use std::path::{Path, PathBuf};

/// Longest offset `chrono::FixedOffset` accepts, in minutes.
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// Largest history the dashboard and PDF export are expected to carry.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Load configuration from a TOML file.  Returns `PulseConfig::default()` if
/// the file doesn't exist so the service always starts with sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<PulseConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(PulseConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| PulseError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration from TOML text.
pub fn parse(raw: &str) -> Result<PulseConfig> {
    toml::from_str(raw).map_err(|e| PulseError::Config(format!("TOML parse error: {e}")))
}

/// Return the config path: `$PULSE_CONFIG` if set, otherwise
/// `pulse/pulse.toml` under `$XDG_CONFIG_HOME` (or `~/.config`).
pub fn default_path() -> PathBuf {
    if let Ok(explicit) = std::env::var("PULSE_CONFIG") {
        return PathBuf::from(explicit);
    }

    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("pulse").join("pulse.toml")
}

impl PulseConfig {
    /// Apply `HOST` / `PORT` from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `HOST` / `PORT` using `lookup` as the environment.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| PulseError::Config(format!("invalid PORT '{port}': {e}")))?;
        }
        Ok(())
    }

    /// Reject settings the sampler or renderers cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sampler.interval_secs == 0 {
            return Err(PulseError::Config("sampler.interval_secs must be at least 1".into()));
        }
        if self.sampler.history_capacity == 0 {
            return Err(PulseError::Config("sampler.history_capacity must be at least 1".into()));
        }
        if self.sampler.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(PulseError::Config(format!(
                "sampler.history_capacity {} exceeds {MAX_HISTORY_CAPACITY}",
                self.sampler.history_capacity
            )));
        }
        if self.server.refresh_secs == 0 {
            return Err(PulseError::Config("server.refresh_secs must be at least 1".into()));
        }

        let jitters = [
            self.sampler.cpu_jitter,
            self.sampler.ram_jitter,
            self.sampler.disk_jitter,
        ];
        if jitters.iter().any(|j| !j.is_finite() || *j < 0.0) {
            return Err(PulseError::Config("sampler jitter must be a non-negative number".into()));
        }

        let w = &self.health.weights;
        if [w.cpu, w.ram, w.disk, w.error].iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(PulseError::Config("health weights must be non-negative numbers".into()));
        }

        let t = &self.health.thresholds;
        if !(0.0..=100.0).contains(&t.moderate) || !(0.0..=100.0).contains(&t.healthy) {
            return Err(PulseError::Config("health thresholds must lie in 0..=100".into()));
        }
        if t.moderate > t.healthy {
            return Err(PulseError::Config(format!(
                "health.thresholds.moderate ({}) exceeds healthy ({})",
                t.moderate, t.healthy
            )));
        }

        if self.display.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(PulseError::Config(format!(
                "display.utc_offset_minutes {} is outside ±{MAX_OFFSET_MINUTES}",
                self.display.utc_offset_minutes
            )));
        }

        Ok(())
    }
}
