use crate::source::{MetricSource, SourceError};
use chrono::{DateTime, Utc};
use pulse_core::{round2, Sample};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Range of the synthetic value substituted for a failed read.
const FALLBACK_MIN: f64 = 0.1;
const FALLBACK_MAX: f64 = 5.0;

/// Floor applied to real readings so an idle host never reports exactly zero.
const READING_FLOOR: f64 = 0.1;

const MAX_API_REQUESTS: u32 = 1_000;
const MAX_ERROR_RATE: f64 = 5.0;
const MAX_SIMULATED_USERS: u32 = 500;
const MAX_ACTIVE_SESSIONS: u32 = 400;

/// Maximum ± noise added to each real reading, in percentage points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub cpu:  f64,
    pub ram:  f64,
    pub disk: f64,
}

impl Jitter {
    pub const NONE: Jitter = Jitter { cpu: 0.0, ram: 0.0, disk: 0.0 };
}

impl Default for Jitter {
    fn default() -> Self {
        Self { cpu: 2.0, ram: 2.0, disk: 3.0 }
    }
}

/// Turns a [`MetricSource`] into [`Sample`]s.
///
/// Sampling never fails: a read error is replaced by a small random value so
/// the monitoring loop keeps producing data. Traffic counters have no real
/// source and are always synthetic. All randomness comes from one seedable
/// RNG owned here.
pub struct MetricSampler {
    source: Box<dyn MetricSource>,
    rng:    ChaCha8Rng,
    jitter: Jitter,
}

impl MetricSampler {
    /// `seed` makes every synthetic value reproducible; `None` seeds from
    /// OS entropy.
    pub fn new(source: impl MetricSource + 'static, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            source: Box::new(source),
            rng,
            jitter: Jitter::default(),
        }
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn sample(&mut self) -> Sample {
        self.sample_at(Utc::now())
    }

    pub fn sample_at(&mut self, timestamp: DateTime<Utc>) -> Sample {
        let cpu = self.source.cpu_percent();
        let cpu = self.settle("cpu", cpu, self.jitter.cpu);

        let ram = self.source.ram_percent();
        let ram = self.settle("ram", ram, self.jitter.ram);

        let disk = self.source.disk_percent();
        let disk = self.settle("disk", disk, self.jitter.disk);

        let api_requests = self.rng.gen_range(0..=MAX_API_REQUESTS);
        let error_rate = round2(self.rng.gen::<f64>() * MAX_ERROR_RATE);
        let simulated_users = self.rng.gen_range(0..=MAX_SIMULATED_USERS);
        let active_sessions = self.rng.gen_range(0..=MAX_ACTIVE_SESSIONS);

        Sample::new(
            timestamp,
            cpu,
            ram,
            disk,
            api_requests,
            error_rate,
            simulated_users,
            active_sessions,
        )
    }

    /// Jittered, clamped reading, or a fallback if the read failed.
    fn settle(&mut self, metric: &'static str, reading: Result<f64, SourceError>, jitter: f64) -> f64 {
        match reading {
            Ok(value) if value.is_finite() => {
                let noise = if jitter > 0.0 {
                    self.rng.gen_range(-jitter..=jitter)
                } else {
                    0.0
                };
                round2((value + noise).clamp(READING_FLOOR, 100.0))
            }
            Ok(value) => {
                debug!(metric, value, "non-finite reading; using fallback");
                self.fallback()
            }
            Err(e) => {
                debug!(metric, error = %e, "metric read failed; using fallback");
                self.fallback()
            }
        }
    }

    fn fallback(&mut self) -> f64 {
        round2(self.rng.gen_range(FALLBACK_MIN..=FALLBACK_MAX))
    }
}

impl std::fmt::Debug for MetricSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricSampler")
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}
