//! tokenline core - Shared types for Claude Code usage tracking
//!
//! This crate provides the domain types behind the status line: token
//! counters, the per-session watermark that turns cumulative totals into
//! deltas, the persisted usage ledger, and rolling-window estimates.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, or `todo!()` outside tests.

pub mod cost;
pub mod error;
pub mod ledger;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod tokens;
pub mod watermark;
pub mod window;

// Re-exports for convenience
pub use cost::Money;
pub use error::{DomainError, DomainResult};
pub use ledger::{default_retention, UsageEvent, UsageLedger, RETENTION_DAYS};
pub use model::{model_label, version_label, ModelFamily, ModelVersion};
pub use session::{format_seconds, LinesChanged, SessionDuration, SessionId, UNKNOWN_SESSION};
pub use snapshot::{StatusSnapshot, DEFAULT_CONTEXT_WINDOW};
pub use tokens::{TokenCount, TokenPair};
pub use watermark::Watermarks;
pub use window::{
    compute_window_stats, max_window, WindowSpec, WindowStats, LONG_WINDOW_DAYS,
    MAX_WINDOW_DAYS, SHORT_WINDOW_HOURS,
};
