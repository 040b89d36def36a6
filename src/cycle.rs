//! Moves a sampled occurrence onto the current cycle.
//!
//! The upstream page shows one start/end sample per event, rendered at some
//! unknown time in the past. Events are assumed to repeat on a fixed period
//! (one day by default), so the window that matters to a reader is the one
//! that is running now or the next one to start.
//!
//! Events on any other cadence resolve to a wrong window without warning.

use crate::error::SyncError;

/// One day in milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Period assumption used by [`CyclePolicy::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePolicy {
    period_ms: i64,
}

/// A resolved occurrence window in epoch milliseconds, `start_ms < end_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Window {
    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn is_active_at(&self, now_ms: i64) -> bool {
        self.start_ms <= now_ms && now_ms < self.end_ms
    }
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self::daily()
    }
}

impl CyclePolicy {
    pub fn daily() -> Self {
        Self { period_ms: DAY_MS }
    }

    /// Build a policy with a custom period. Rejects non-positive periods.
    pub fn with_period(period_ms: i64) -> Result<Self, SyncError> {
        if period_ms <= 0 {
            return Err(SyncError::Config(format!(
                "cycle period must be positive, got {period_ms} ms"
            )));
        }
        Ok(Self { period_ms })
    }

    pub fn period_ms(&self) -> i64 {
        self.period_ms
    }

    /// Resolve the window of the sample's occurrence that is active at
    /// `now_ms`, or the next one if none is active.
    ///
    /// The sample duration is kept (floored at 1 ms). A sample that has not
    /// started yet is returned as-is. Otherwise the sample is shifted by the
    /// number of whole periods elapsed since its start, plus one more if that
    /// window already ended at `now_ms` (the end bound is exclusive).
    pub fn resolve(&self, sample_start_ms: i64, sample_end_ms: i64, now_ms: i64) -> Window {
        let duration = sample_end_ms.saturating_sub(sample_start_ms).max(1);

        let elapsed_periods = if now_ms < sample_start_ms {
            0
        } else {
            now_ms.saturating_sub(sample_start_ms).div_euclid(self.period_ms)
        };

        let mut start_ms =
            sample_start_ms.saturating_add(elapsed_periods.saturating_mul(self.period_ms));
        let mut end_ms = start_ms.saturating_add(duration);

        if now_ms >= end_ms {
            start_ms = start_ms.saturating_add(self.period_ms);
            end_ms = end_ms.saturating_add(self.period_ms);
        }

        Window { start_ms, end_ms }
    }
}
