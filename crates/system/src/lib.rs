pub mod assembler;
pub mod cgroup;
pub mod history;
pub mod host;
pub mod sampler;
pub mod source;

pub use assembler::{LocalClock, ReportAssembler};
pub use history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
pub use host::HostMetadata;
pub use sampler::{Jitter, MetricSampler};
pub use source::{HostSource, MetricSource, SourceError};

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// Shortest interval the sampling loop accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Spawn a background Tokio task that takes a sample every `interval` and
/// appends it to `history`.  The first sample is taken immediately.
///
/// The task runs until aborted.  A panic while sampling is logged and only
/// costs that one tick.
pub fn spawn_sampler(
    mut sampler: MetricSampler,
    history: Arc<HistoryBuffer>,
    interval: Duration,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);
    info!(interval_ms = interval.as_millis() as u64, "sampling loop started");

    tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick: u64 = 0;

        loop {
            ticker.tick().await;
            tick += 1;
            record_tick(&mut sampler, &history, tick);
        }
    })
}

/// Take one sample and append it.  Returns `false` if sampling panicked.
pub fn record_tick(sampler: &mut MetricSampler, history: &HistoryBuffer, tick: u64) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| sampler.sample())) {
        Ok(sample) => {
            history.append(sample);
            debug!(
                tick,
                cpu = sample.cpu_percent(),
                ram = sample.ram_percent(),
                disk = sample.disk_percent(),
                "sample recorded"
            );
            true
        }
        Err(_) => {
            error!(tick, "sampler panicked; skipping this tick");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports the call count as CPU usage so ticks can be told apart.
    struct Counter {
        calls:    u32,
        panic_on: Option<u32>,
    }

    impl Counter {
        fn new() -> Self {
            Self { calls: 0, panic_on: None }
        }
    }

    impl MetricSource for Counter {
        fn cpu_percent(&mut self) -> Result<f64, SourceError> {
            self.calls += 1;
            if self.panic_on == Some(self.calls) {
                panic!("simulated sampler failure");
            }
            Ok(f64::from(self.calls))
        }
        fn ram_percent(&mut self) -> Result<f64, SourceError> {
            Ok(10.0)
        }
        fn disk_percent(&mut self) -> Result<f64, SourceError> {
            Ok(20.0)
        }
    }

    fn counting_sampler(source: Counter) -> MetricSampler {
        MetricSampler::new(source, Some(5)).with_jitter(Jitter::NONE)
    }

    #[test]
    fn panicking_tick_is_skipped() {
        let history = HistoryBuffer::new(10);
        let mut sampler = counting_sampler(Counter { calls: 0, panic_on: Some(2) });

        assert!(record_tick(&mut sampler, &history, 1));
        assert!(!record_tick(&mut sampler, &history, 2));
        assert!(record_tick(&mut sampler, &history, 3));

        let cpus: Vec<f64> = history.snapshot().iter().map(|s| s.cpu_percent()).collect();
        assert_eq!(cpus, vec![1.0, 3.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn fifty_two_ticks_keep_ticks_three_onwards() {
        let history = Arc::new(HistoryBuffer::new(50));
        let handle = spawn_sampler(
            counting_sampler(Counter::new()),
            Arc::clone(&history),
            Duration::from_secs(5),
        );

        // Ticks fire at t = 0, 5, ..., 255: 52 in total.
        time::sleep(Duration::from_secs(257)).await;
        handle.abort();

        let snap = history.snapshot();
        assert_eq!(snap.len(), 50);
        assert_eq!(snap[0].cpu_percent(), 3.0);
        assert_eq!(snap[49].cpu_percent(), 52.0);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_survives_a_panic() {
        let history = Arc::new(HistoryBuffer::new(50));
        let handle = spawn_sampler(
            counting_sampler(Counter { calls: 0, panic_on: Some(1) }),
            Arc::clone(&history),
            Duration::from_secs(5),
        );

        time::sleep(Duration::from_secs(12)).await;
        assert!(!handle.is_finished());
        handle.abort();

        let cpus: Vec<f64> = history.snapshot().iter().map(|s| s.cpu_percent()).collect();
        assert_eq!(cpus, vec![2.0, 3.0]);
    }
}
