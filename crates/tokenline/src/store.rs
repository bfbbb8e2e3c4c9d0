//! Durable storage for the usage ledger.
//!
//! The ledger is a single JSON document, read whole at the start of an
//! invocation and rewritten whole at the end. Writes go to a sibling temp
//! file that is renamed over the target, so concurrent readers see either
//! the old or the new document, never a partial one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokenline_core::UsageLedger;
use tracing::debug;

use crate::error::{CliError, Result};

/// Load/save seam for the usage ledger.
pub trait LedgerStore {
    /// Reads the persisted ledger. A store that was never written loads
    /// as an empty ledger.
    fn load(&self) -> Result<UsageLedger>;

    /// Replaces the persisted ledger.
    fn save(&self, ledger: &UsageLedger) -> Result<()>;
}

// ============================================================================
// JSON file store
// ============================================================================

/// Ledger stored as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "usage.json".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }

    fn write_error(&self, source: std::io::Error) -> CliError {
        CliError::StoreWrite {
            path: self.path.clone(),
            source,
        }
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<UsageLedger> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No usage ledger yet");
                return Ok(UsageLedger::new());
            }
            Err(e) => return Err(e.into()),
        };

        let ledger: UsageLedger = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            events = ledger.events().len(),
            sessions = ledger.cursors().len(),
            "Loaded usage ledger"
        );
        Ok(ledger)
    }

    fn save(&self, ledger: &UsageLedger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
            }
        }

        let content = serde_json::to_vec_pretty(ledger)?;

        // Write to a temporary file first, then rename (atomic operation)
        let temp_path = self.temp_path();
        fs::write(&temp_path, content).map_err(|e| self.write_error(e))?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.write_error(e));
        }

        debug!(
            path = %self.path.display(),
            events = ledger.events().len(),
            "Saved usage ledger"
        );
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Ledger held in memory; used for `--dry-run` and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<UsageLedger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing ledger.
    pub fn with_ledger(ledger: UsageLedger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }

    /// Copy of the currently stored ledger.
    pub fn snapshot(&self) -> UsageLedger {
        match self.ledger.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<UsageLedger> {
        Ok(self.snapshot())
    }

    fn save(&self, ledger: &UsageLedger) -> Result<()> {
        match self.ledger.lock() {
            Ok(mut guard) => *guard = ledger.clone(),
            Err(poisoned) => *poisoned.into_inner() = ledger.clone(),
        }
        Ok(())
    }
}
