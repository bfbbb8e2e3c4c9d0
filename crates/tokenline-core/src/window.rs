//! Rolling-window quota estimates.
//!
//! A window answers two questions over the trailing `duration`: how much of
//! the token quota has been consumed, and how long until the oldest counted
//! event falls out of the window.

use crate::error::{DomainError, DomainResult};
use crate::session::format_seconds;
use crate::{TokenCount, UsageEvent};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// Length of the short window, in hours.
pub const SHORT_WINDOW_HOURS: i64 = 5;

/// Length of the long window, in days.
pub const LONG_WINDOW_DAYS: i64 = 7;

/// Longest window accepted, in days.
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Longest window accepted.
pub fn max_window() -> TimeDelta {
    TimeDelta::days(MAX_WINDOW_DAYS)
}

/// One trailing window with its quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    /// Short label shown in the status line ("5h", "7d").
    pub label: String,
    pub duration: TimeDelta,
    pub limit: TokenCount,
}

impl WindowSpec {
    /// Creates a window, rejecting durations that are not positive or
    /// exceed [`MAX_WINDOW_DAYS`].
    pub fn new(label: impl Into<String>, duration: TimeDelta, limit: TokenCount) -> DomainResult<Self> {
        if duration <= TimeDelta::zero() || duration > max_window() {
            return Err(DomainError::InvalidFieldValue {
                field: "window duration".to_string(),
                value: format!("{}s", duration.num_seconds()),
                expected: format!("a positive duration of at most {MAX_WINDOW_DAYS} days"),
            });
        }
        Ok(Self {
            label: label.into(),
            duration,
            limit,
        })
    }

    /// Computes this window's stats over `events`.
    pub fn stats(&self, events: &[UsageEvent], now: DateTime<Utc>) -> WindowStats {
        compute_window_stats(events, self.duration, self.limit, now)
    }
}

/// Consumption within one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Share of the quota consumed, clamped to 0..=100.
    pub percentage: f64,
    /// Time until the oldest counted event leaves the window.
    pub time_remaining: TimeDelta,
    pub total_tokens: TokenCount,
    pub event_count: usize,
}

impl WindowStats {
    /// Formats the time remaining, e.g. "3h 12m".
    pub fn format_remaining(&self) -> String {
        format_seconds(self.time_remaining.num_seconds().max(0) as u64)
    }

    /// Formats the percentage without decimals, e.g. "24%".
    pub fn format_percentage(&self) -> String {
        format!("{:.0}%", self.percentage)
    }
}

impl fmt::Display for WindowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.format_percentage(), self.format_remaining())
    }
}

/// Aggregates `events` over the trailing `window` ending at `now`.
///
/// Events count when `now - timestamp < window`. The percentage is
/// `total / limit * 100` clamped at 100; a zero limit reports 0. With no
/// counted events the full window is reported as remaining.
pub fn compute_window_stats(
    events: &[UsageEvent],
    window: TimeDelta,
    limit: TokenCount,
    now: DateTime<Utc>,
) -> WindowStats {
    let mut total_tokens = TokenCount::zero();
    let mut oldest: Option<DateTime<Utc>> = None;
    let mut event_count = 0;

    for event in events
        .iter()
        .filter(|e| now.signed_duration_since(e.timestamp) < window)
    {
        total_tokens += event.total();
        event_count += 1;
        oldest = Some(match oldest {
            Some(ts) if ts <= event.timestamp => ts,
            _ => event.timestamp,
        });
    }

    let percentage = if limit.is_zero() {
        0.0
    } else {
        (total_tokens.as_u64() as f64 * 100.0 / limit.as_u64() as f64).min(100.0)
    };

    // An end past chrono's range reports the whole window.
    let time_remaining = match oldest.and_then(|ts| ts.checked_add_signed(window)) {
        Some(end) => end.signed_duration_since(now).max(TimeDelta::zero()),
        None => window,
    };

    WindowStats {
        percentage,
        time_remaining,
        total_tokens,
        event_count,
    }
}
