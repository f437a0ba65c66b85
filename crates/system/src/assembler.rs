use crate::history::HistoryBuffer;
use crate::host::HostMetadata;
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use pulse_core::{round2, HealthReport, HealthScorer, PulseError, ReportMeta, Resources, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Renders instants in a fixed UTC offset with a label, e.g.
/// `2026-10-19 13:30:00 IST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalClock {
    offset: FixedOffset,
    label:  String,
}

impl LocalClock {
    /// Falls back to UTC when the offset is out of range.
    pub fn new(offset_minutes: i32, label: impl Into<String>) -> Self {
        match offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
        {
            Some(offset) => Self {
                offset,
                label: label.into(),
            },
            None => {
                warn!(offset_minutes, "display offset out of range; using UTC");
                Self::utc()
            }
        }
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            label:  "UTC".to_string(),
        }
    }

    pub fn format(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            instant.with_timezone(&self.offset).format("%Y-%m-%d %H:%M:%S"),
            self.label
        )
    }
}

/// Builds a [`HealthReport`] from the newest sample in the history.
///
/// Holds no mutable state, so any number of requests can assemble reports
/// concurrently.  Sampling itself is left to the background task; the
/// assembler only reads what that task has already recorded.
#[derive(Debug)]
pub struct ReportAssembler {
    history:  Arc<HistoryBuffer>,
    scorer:   HealthScorer,
    metadata: HostMetadata,
    clock:    LocalClock,
    started:  Instant,
}

impl ReportAssembler {
    pub fn new(
        history: Arc<HistoryBuffer>,
        scorer: HealthScorer,
        metadata: HostMetadata,
        clock: LocalClock,
    ) -> Self {
        Self {
            history,
            scorer,
            metadata,
            clock,
            started: Instant::now(),
        }
    }

    pub fn history(&self) -> &Arc<HistoryBuffer> {
        &self.history
    }

    pub fn assemble(&self) -> Result<HealthReport> {
        self.assemble_at(Utc::now())
    }

    pub fn assemble_at(&self, now: DateTime<Utc>) -> Result<HealthReport> {
        // Score the newest entry of the same snapshot that is returned, so the
        // headline figures always match the tail of `history_snapshot`.
        let history = self.history.snapshot();
        let latest = *history.last().ok_or(PulseError::NoSamples)?;
        let score = self.scorer.score(&latest);

        Ok(HealthReport {
            report_id: report_id(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            timestamp_local: self.clock.format(now),
            uptime_seconds: round2(self.started.elapsed().as_secs_f64()),
            health_score: score.value,
            status: score.status,
            status_message: score.message().to_string(),
            resources: Resources::from_sample(&latest, self.metadata.cpu_cores),
            container: self.metadata.container.clone(),
            deployment: self.metadata.deployment.clone(),
            runtime_info: self.metadata.runtime.clone(),
            meta: ReportMeta::from_sample(&latest),
            history_snapshot: history,
        })
    }
}

/// Eight upper-case hex characters from a fresh v4 UUID.
fn report_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id.to_uppercase()
}
