//! Error types for the tokenline CLI.
//!
//! These errors never reach the status line itself: the render path logs
//! them and degrades to the best available output. They surface only from
//! explicit subcommands and from tests.
//!
//! **Panic-Free Policy:** No `.unwrap()`, `.expect()`, `panic!()`,
//! `unreachable!()`, or `todo!()` outside tests.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// CLI Error Type
// ============================================================================

/// tokenline application errors.
#[derive(Error, Debug)]
pub enum CliError {
    /// The usage ledger could not be written.
    ///
    /// The current invocation still renders from the in-memory ledger.
    #[error("Failed to write usage ledger {}: {source}", path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file exists but could not be read or parsed.
    #[error("Invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// Domain-level validation failure.
    #[error(transparent)]
    Domain(#[from] tokenline_core::DomainError),

    /// I/O error passthrough.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error passthrough.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Convenience Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

// ============================================================================
// Tests
// ============================================================================
