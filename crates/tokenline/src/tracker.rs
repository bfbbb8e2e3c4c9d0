//! One invocation's worth of usage tracking.
//!
//! Load the ledger, fold in the snapshot's cumulative counters, persist,
//! then compute both windows. No step here can fail the invocation: an
//! unreadable ledger starts fresh and an unwritable one is only logged.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokenline_core::{SessionId, TokenPair, UsageEvent, UsageLedger, WindowSpec, WindowStats};
use tracing::{debug, warn};

use crate::config::LimitsConfig;
use crate::error::Result;
use crate::store::LedgerStore;

/// Stats for one named window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowReport {
    pub label: String,
    pub stats: WindowStats,
}

/// What the renderer needs from the usage subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageReport {
    pub short: WindowReport,
    pub long: WindowReport,
    /// Event appended by this invocation, if any.
    pub recorded: Option<UsageEvent>,
    /// False when the ledger could not be written.
    pub persisted: bool,
    pub event_count: usize,
    pub session_count: usize,
}

/// Machine-readable form printed by `tokenline usage --json`.
#[derive(Debug, Serialize)]
pub struct UsageSummary {
    pub windows: Vec<WindowSummary>,
    pub events: usize,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct WindowSummary {
    pub label: String,
    pub percentage: f64,
    pub total_tokens: u64,
    pub remaining_seconds: i64,
    pub events: usize,
}

impl From<&WindowReport> for WindowSummary {
    fn from(report: &WindowReport) -> Self {
        Self {
            label: report.label.clone(),
            percentage: report.stats.percentage,
            total_tokens: report.stats.total_tokens.as_u64(),
            remaining_seconds: report.stats.time_remaining.num_seconds(),
            events: report.stats.event_count,
        }
    }
}

impl From<&UsageReport> for UsageSummary {
    fn from(report: &UsageReport) -> Self {
        Self {
            windows: vec![(&report.short).into(), (&report.long).into()],
            events: report.event_count,
            sessions: report.session_count,
        }
    }
}

/// Drives the ledger through one observation.
pub struct UsageTracker<S> {
    store: S,
    short: WindowSpec,
    long: WindowSpec,
    retention: TimeDelta,
}

impl<S: LedgerStore> UsageTracker<S> {
    pub fn new(store: S, short: WindowSpec, long: WindowSpec, retention: TimeDelta) -> Self {
        Self {
            store,
            short,
            long,
            retention,
        }
    }

    /// Builds a tracker from the `[limits]` config section.
    pub fn from_config(store: S, limits: &LimitsConfig) -> Result<Self> {
        Ok(Self::new(
            store,
            limits.short_window()?,
            limits.long_window()?,
            limits.retention(),
        ))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the ledger, starting fresh if it cannot be read.
    pub fn load_ledger(&self) -> UsageLedger {
        match self.store.load() {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(error = %e, "Unreadable usage ledger, starting fresh");
                UsageLedger::new()
            }
        }
    }

    /// Records one observation and reports both windows.
    ///
    /// The report reflects the updated ledger even when saving fails.
    pub fn observe(
        &self,
        session_id: SessionId,
        cumulative: TokenPair,
        now: DateTime<Utc>,
    ) -> UsageReport {
        let mut ledger = self.load_ledger();
        let recorded = ledger.record_observation(session_id, cumulative, now, self.retention);

        let persisted = match self.store.save(&ledger) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Usage ledger not saved");
                false
            }
        };

        let mut report = self.report(&ledger, now);
        report.recorded = recorded;
        report.persisted = persisted;
        report
    }

    /// Reports both windows from the stored ledger without recording.
    pub fn current(&self, now: DateTime<Utc>) -> UsageReport {
        let mut ledger = self.load_ledger();
        ledger.prune(now, self.retention);
        self.report(&ledger, now)
    }

    /// Computes both windows over `ledger`.
    pub fn report(&self, ledger: &UsageLedger, now: DateTime<Utc>) -> UsageReport {
        let events = ledger.events();
        let short = WindowReport {
            label: self.short.label.clone(),
            stats: self.short.stats(events, now),
        };
        let long = WindowReport {
            label: self.long.label.clone(),
            stats: self.long.stats(events, now),
        };

        debug!(
            short_pct = short.stats.percentage,
            long_pct = long.stats.percentage,
            events = events.len(),
            "Computed usage windows"
        );

        UsageReport {
            short,
            long,
            recorded: None,
            persisted: true,
            event_count: events.len(),
            session_count: ledger.cursors().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn tracker() -> UsageTracker<MemoryStore> {
        UsageTracker::from_config(MemoryStore::new(), &LimitsConfig::default()).unwrap()
    }

    #[test]
    fn test_observe_persists_event() {
        let tracker = tracker();
        let report = tracker.observe(SessionId::new("a"), TokenPair::new(100, 50), t0());

        assert!(report.recorded.is_some());
        assert!(report.persisted);
        assert_eq!(tracker.store().snapshot().events().len(), 1);
    }

    #[test]
    fn test_repeat_observation_records_nothing() {
        let tracker = tracker();
        tracker.observe(SessionId::new("a"), TokenPair::new(100, 50), t0());
        let report = tracker.observe(
            SessionId::new("a"),
            TokenPair::new(100, 50),
            t0() + TimeDelta::seconds(5),
        );

        assert!(report.recorded.is_none());
        assert_eq!(report.event_count, 1);
        assert_eq!(report.short.stats.total_tokens.as_u64(), 150);
    }

    #[test]
    fn test_current_does_not_record() {
        let tracker = tracker();
        tracker.observe(SessionId::new("a"), TokenPair::new(1_000_000, 200_000), t0());

        let report = tracker.current(t0() + TimeDelta::hours(1));
        assert!((report.short.stats.percentage - 24.0).abs() < 1e-9);
        assert_eq!(report.short.stats.time_remaining, TimeDelta::hours(4));
        assert_eq!(tracker.store().snapshot().events().len(), 1);
    }

    #[test]
    fn test_summary_shape() {
        let tracker = tracker();
        let report = tracker.observe(SessionId::new("a"), TokenPair::new(10, 0), t0());
        let summary = UsageSummary::from(&report);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["windows"][0]["label"], "5h");
        assert_eq!(json["windows"][1]["label"], "7d");
        assert_eq!(json["windows"][0]["total_tokens"], 10);
        assert_eq!(json["windows"][0]["remaining_seconds"], 5 * 3600);
        assert_eq!(json["sessions"], 1);
    }
}
