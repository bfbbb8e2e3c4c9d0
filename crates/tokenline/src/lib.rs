//! tokenline - Library modules
//!
//! Everything behind the `tokenline` binary apart from argument parsing and
//! logging setup.
//!
//! # Architecture
//!
//! One invocation is a straight pipeline:
//!
//! 1. **Parse**: the stdin payload becomes a `StatusSnapshot`
//! 2. **Track**: the `UsageTracker` folds the snapshot's cumulative counters
//!    into the persisted ledger and computes both usage windows
//! 3. **Render**: snapshot, windows and git state become three lines
//!
//! No stage can fail the invocation; each degrades to a default and logs.

pub mod config;
pub mod error;
pub mod git;
pub mod paths;
pub mod render;
pub mod setup;
pub mod status;
pub mod store;
pub mod tracker;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};
pub use status::{run_status, StatusOutput};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
pub use tracker::{UsageReport, UsageSummary, UsageTracker};
