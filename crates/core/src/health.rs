//! Health scoring.
//!
//! The score is `100 - (weighted sum of the sample's percentages)`, clamped to
//! `0 – 100`. It is a pure function of the sample and the configured weights.

use crate::sample::{round2, Sample};
use serde::{Deserialize, Serialize};

/// Per-metric weights applied to a sample's percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
    pub error: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            cpu:   0.35,
            ram:   0.35,
            disk:  0.2,
            error: 1.0,
        }
    }
}

/// Score boundaries between the three status bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    /// Scores strictly above this are [`HealthStatus::Optimal`].
    pub healthy: f64,
    /// Scores strictly above this (and not above `healthy`) are
    /// [`HealthStatus::Moderate`]; everything else is critical.
    pub moderate: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            healthy:  80.0,
            moderate: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Optimal,
    Moderate,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Optimal => "optimal",
            HealthStatus::Moderate => "moderate",
            HealthStatus::Critical => "critical",
        }
    }

    /// Human-readable status line shown in reports.
    pub fn message(&self) -> &'static str {
        match self {
            HealthStatus::Optimal => "System is performing optimally.",
            HealthStatus::Moderate => "Moderate resource pressure detected.",
            HealthStatus::Critical => "Critical resource exhaustion!",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthScore {
    /// Score in `0.0 – 100.0`, rounded to two decimals.
    pub value: f64,
    pub status: HealthStatus,
}

impl HealthScore {
    pub fn message(&self) -> &'static str {
        self.status.message()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthScorer {
    weights:    HealthWeights,
    thresholds: HealthThresholds,
}

impl HealthScorer {
    pub fn new(weights: HealthWeights, thresholds: HealthThresholds) -> Self {
        Self { weights, thresholds }
    }

    pub fn score(&self, sample: &Sample) -> HealthScore {
        let w = &self.weights;
        let load = sample.cpu_percent() * w.cpu
            + sample.ram_percent() * w.ram
            + sample.disk_percent() * w.disk
            + sample.error_rate_percent() * w.error;

        let raw = 100.0 - load;
        // NaN never compares, so it falls to the critical end.
        let value = if raw.is_nan() { 0.0 } else { round2(raw.clamp(0.0, 100.0)) };

        HealthScore {
            value,
            status: self.classify(value),
        }
    }

    pub fn classify(&self, value: f64) -> HealthStatus {
        if value > self.thresholds.healthy {
            HealthStatus::Optimal
        } else if value > self.thresholds.moderate {
            HealthStatus::Moderate
        } else {
            HealthStatus::Critical
        }
    }
}
