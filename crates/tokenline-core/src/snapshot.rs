//! Typed view of one Claude Code status line payload.

use crate::{model_label, version_label, LinesChanged, Money, SessionDuration, SessionId, TokenCount, TokenPair};

/// Context window size assumed when the payload does not report one.
pub const DEFAULT_CONTEXT_WINDOW: u64 = 200_000;

/// Data extracted from Claude Code's status line JSON.
///
/// Every field has a usable default so a partial or empty payload still
/// renders and still feeds the usage ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    /// Session id, or the sentinel when absent.
    pub session_id: SessionId,
    /// Cumulative input/output tokens for the session so far.
    pub cumulative: TokenPair,
    /// Tokens currently occupying the context window.
    pub context_tokens: TokenCount,
    /// Maximum context window size for the model.
    pub context_window_size: u64,
    pub model_id: Option<String>,
    pub model_display_name: Option<String>,
    /// Working directory, preferring `workspace.current_dir`.
    pub cwd: Option<String>,
    /// Claude Code version string.
    pub version: Option<String>,
    pub cost: Money,
    pub duration: SessionDuration,
    pub lines: LinesChanged,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            session_id: SessionId::unknown(),
            cumulative: TokenPair::zero(),
            context_tokens: TokenCount::zero(),
            context_window_size: DEFAULT_CONTEXT_WINDOW,
            model_id: None,
            model_display_name: None,
            cwd: None,
            version: None,
            cost: Money::zero(),
            duration: SessionDuration::default(),
            lines: LinesChanged::default(),
        }
    }
}

impl StatusSnapshot {
    /// Label for the model segment, e.g. "Opus 4.5".
    pub fn model_label(&self) -> String {
        model_label(self.model_id.as_deref(), self.model_display_name.as_deref())
    }

    /// Label for the Claude Code version, e.g. "v1.0.80".
    pub fn version_label(&self) -> Option<String> {
        self.version.as_deref().and_then(version_label)
    }

    /// Returns the percentage of context window used (0.0 to 100.0).
    pub fn context_percentage(&self) -> f64 {
        if self.context_window_size == 0 {
            return 0.0;
        }
        let usage = self.context_tokens.as_u64() as f64 / self.context_window_size as f64;
        (usage * 100.0).min(100.0)
    }
}
