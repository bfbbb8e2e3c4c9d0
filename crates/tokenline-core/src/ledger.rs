//! The usage ledger: delta events plus per-session watermarks.
//!
//! The ledger is reloaded from disk on every invocation, updated with one
//! observation and written back. Events older than the retention horizon
//! are dropped on each update, and sessions whose events have all aged out
//! lose their watermark.

use crate::{SessionId, TokenCount, TokenPair, Watermarks};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest tracked window, in days. Events older than this are pruned.
pub const RETENTION_DAYS: i64 = 7;

/// Default retention horizon (the long window).
pub fn default_retention() -> TimeDelta {
    TimeDelta::days(RETENTION_DAYS)
}

/// Tokens consumed by one session between two consecutive observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// When the increment was observed (epoch milliseconds on disk).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Input tokens added since the previous observation.
    pub input: TokenCount,
    /// Output tokens added since the previous observation.
    pub output: TokenCount,
    pub session_id: SessionId,
}

impl UsageEvent {
    pub fn new(timestamp: DateTime<Utc>, delta: TokenPair, session_id: SessionId) -> Self {
        Self {
            timestamp,
            input: delta.input,
            output: delta.output,
            session_id,
        }
    }

    pub fn delta(&self) -> TokenPair {
        TokenPair {
            input: self.input,
            output: self.output,
        }
    }

    /// Input plus output.
    pub fn total(&self) -> TokenCount {
        self.input.saturating_add(self.output)
    }
}

/// Persisted usage history.
///
/// `events` is kept in insertion order but nothing relies on it being
/// sorted; aggregation filters by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedger {
    #[serde(default)]
    events: Vec<UsageEvent>,
    #[serde(default)]
    cursors: Watermarks<SessionId>,
}

impl UsageLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// All retained events.
    pub fn events(&self) -> &[UsageEvent] {
        &self.events
    }

    /// Per-session watermarks.
    pub fn cursors(&self) -> &Watermarks<SessionId> {
        &self.cursors
    }

    /// Last cumulative counters seen for a session, zero if unseen.
    pub fn cursor(&self, session_id: &SessionId) -> TokenPair {
        self.cursors.get(session_id)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.cursors.is_empty()
    }

    /// Converts a cumulative observation into a delta event.
    ///
    /// Prunes events older than `retention`, appends an event when either
    /// counter grew, moves the session's watermark to `cumulative`, and
    /// drops watermarks of other sessions that no longer own any event.
    /// The observed session keeps its watermark even without events, so
    /// the next observation cannot count its whole total again.
    /// Returns the appended event, if any.
    ///
    /// Repeating an observation with the same totals appends nothing.
    pub fn record_observation(
        &mut self,
        session_id: SessionId,
        cumulative: TokenPair,
        now: DateTime<Utc>,
        retention: TimeDelta,
    ) -> Option<UsageEvent> {
        self.prune(now, retention);

        let delta = self.cursors.advance(session_id.clone(), cumulative);
        let event = if delta.has_usage() {
            let event = UsageEvent::new(now, delta, session_id.clone());
            self.events.push(event.clone());
            Some(event)
        } else {
            None
        };

        self.forget_idle_sessions(&session_id);

        debug!(
            session_id = %session_id,
            input = delta.input.as_u64(),
            output = delta.output.as_u64(),
            appended = event.is_some(),
            events = self.events.len(),
            "Recorded observation"
        );

        event
    }

    /// Removes events with a timestamp before `now - retention`.
    ///
    /// A cutoff before chrono's earliest date keeps every event. Returns
    /// how many events were removed.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: TimeDelta) -> usize {
        let Some(cutoff) = now.checked_sub_signed(retention) else {
            return 0;
        };
        let before = self.events.len();
        self.events.retain(|event| event.timestamp >= cutoff);
        let removed = before - self.events.len();
        if removed > 0 {
            debug!(removed, "Pruned aged-out usage events");
        }
        removed
    }

    /// Drops watermarks of sessions without any retained event.
    ///
    /// The session observed in the current cycle keeps its watermark even
    /// without events, so a repeated observation cannot be re-counted.
    fn forget_idle_sessions(&mut self, current: &SessionId) {
        let events = &self.events;
        self.cursors.retain(|session_id| {
            session_id == current || events.iter().any(|e| &e.session_id == session_id)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sid(id: &str) -> SessionId {
        SessionId::new(id)
    }

    fn delta_sum(ledger: &UsageLedger) -> TokenPair {
        ledger
            .events()
            .iter()
            .fold(TokenPair::zero(), |acc, e| acc + e.delta())
    }

    #[test]
    fn test_identical_observations_are_idempotent() {
        let mut ledger = UsageLedger::new();
        let first = ledger.record_observation(sid("a"), TokenPair::new(100, 50), t0(), default_retention());
        let second = ledger.record_observation(sid("a"), TokenPair::new(100, 50), t0(), default_retention());

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(delta_sum(&ledger), TokenPair::new(100, 50));
    }

    #[test]
    fn test_growing_counters_are_not_double_counted() {
        let mut ledger = UsageLedger::new();
        ledger.record_observation(sid("a"), TokenPair::new(100, 50), t0(), default_retention());
        ledger.record_observation(
            sid("a"),
            TokenPair::new(150, 80),
            t0() + TimeDelta::seconds(3),
            default_retention(),
        );

        assert_eq!(ledger.events().len(), 2);
        assert_eq!(delta_sum(&ledger), TokenPair::new(150, 80));
        assert_eq!(ledger.events()[1].delta(), TokenPair::new(50, 30));
    }

    #[test]
    fn test_decreasing_counters_record_nothing() {
        let mut ledger = UsageLedger::new();
        ledger.record_observation(sid("a"), TokenPair::new(100, 50), t0(), default_retention());
        let event = ledger.record_observation(
            sid("a"),
            TokenPair::new(10, 5),
            t0() + TimeDelta::minutes(1),
            default_retention(),
        );

        assert!(event.is_none());
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(ledger.cursor(&sid("a")), TokenPair::new(10, 5));
    }

    #[test]
    fn test_zero_observation_creates_cursor_only() {
        let mut ledger = UsageLedger::new();
        let event = ledger.record_observation(sid("fresh"), TokenPair::zero(), t0(), default_retention());
        assert!(event.is_none());
        assert!(ledger.events().is_empty());
        assert!(ledger.cursors().contains(&sid("fresh")));
    }

    #[test]
    fn test_old_events_are_pruned_on_record() {
        let mut ledger = UsageLedger::new();
        let now = t0();
        ledger.record_observation(sid("old"), TokenPair::new(500, 0), now - TimeDelta::days(8), default_retention());
        ledger.record_observation(sid("recent"), TokenPair::new(300, 0), now - TimeDelta::days(6), default_retention());

        ledger.record_observation(sid("b"), TokenPair::new(1, 1), now, default_retention());

        let sessions: Vec<&str> = ledger.events().iter().map(|e| e.session_id.as_str()).collect();
        assert_eq!(sessions, vec!["recent", "b"]);
    }

    #[test]
    fn test_aged_out_sessions_lose_cursor() {
        let mut ledger = UsageLedger::new();
        let now = t0();
        ledger.record_observation(sid("old"), TokenPair::new(500, 0), now - TimeDelta::days(8), default_retention());
        assert!(ledger.cursors().contains(&sid("old")));

        ledger.record_observation(sid("b"), TokenPair::new(1, 1), now, default_retention());

        assert!(!ledger.cursors().contains(&sid("old")));
        assert!(ledger.cursors().contains(&sid("b")));
    }

    #[test]
    fn test_current_session_keeps_cursor_without_events() {
        let mut ledger = UsageLedger::new();
        let now = t0();
        ledger.record_observation(sid("a"), TokenPair::new(500, 0), now - TimeDelta::days(8), default_retention());

        // Same totals after the only event aged out: nothing new, cursor kept.
        let event = ledger.record_observation(sid("a"), TokenPair::new(500, 0), now, default_retention());
        assert!(event.is_none());
        assert!(ledger.events().is_empty());
        assert_eq!(ledger.cursor(&sid("a")), TokenPair::new(500, 0));

        let again = ledger.record_observation(sid("a"), TokenPair::new(500, 0), now, default_retention());
        assert!(again.is_none());
    }

    #[test]
    fn test_prune_boundary_is_inclusive() {
        let mut ledger = UsageLedger::new();
        let now = t0();
        ledger.record_observation(sid("edge"), TokenPair::new(1, 0), now - TimeDelta::days(7), default_retention());
        assert_eq!(ledger.prune(now, default_retention()), 0);
        assert_eq!(ledger.prune(now + TimeDelta::milliseconds(1), default_retention()), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut ledger = UsageLedger::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        ledger.record_observation(sid("abc"), TokenPair::new(120, 40), now, default_retention());

        let value = serde_json::to_value(&ledger).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "events": [
                    {"timestamp": 1_700_000_000_123_i64, "input": 120, "output": 40, "session_id": "abc"}
                ],
                "cursors": {"abc": {"input": 120, "output": 40}}
            })
        );

        let back: UsageLedger = serde_json::from_value(value).unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let ledger: UsageLedger = serde_json::from_str("{}").unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unrepresentable_retention_keeps_everything() {
        let mut ledger = UsageLedger::new();
        ledger.record_observation(sid("a"), TokenPair::new(10, 0), t0(), default_retention());

        let huge = TimeDelta::days(100_000_000);
        let event = ledger.record_observation(sid("a"), TokenPair::new(25, 0), t0() + TimeDelta::days(30), huge);

        assert!(event.is_some());
        assert_eq!(ledger.events().len(), 2);
    }
}
