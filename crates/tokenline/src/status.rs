//! One status line invocation, from stdin payload to printed lines.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokenline_core::StatusSnapshot;
use tokenline_protocol::read_snapshot;
use tracing::debug;

use crate::config::Config;
use crate::git::{git_info, GitInfo};
use crate::render::{self, Painter, RenderOptions};
use crate::store::LedgerStore;
use crate::tracker::{UsageReport, UsageTracker};

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct StatusOutput {
    pub snapshot: StatusSnapshot,
    pub usage: UsageReport,
    pub git: Option<GitInfo>,
    pub lines: [String; 3],
}

/// Runs the status pipeline against an already chosen store.
///
/// Parse, record, look up git, render. Never fails: every stage degrades
/// to a default.
pub async fn run_status<S: LedgerStore>(
    input: &str,
    config: &Config,
    tracker: &UsageTracker<S>,
    painter: Painter,
    home: Option<&Path>,
    now: DateTime<Utc>,
) -> StatusOutput {
    let snapshot = read_snapshot(input);
    debug!(
        session_id = %snapshot.session_id,
        input_tokens = %snapshot.cumulative.input,
        output_tokens = %snapshot.cumulative.output,
        "Parsed status payload"
    );

    let usage = tracker.observe(snapshot.session_id.clone(), snapshot.cumulative, now);

    let git = match (config.display.git, working_dir(&snapshot)) {
        (true, Some(cwd)) => git_info(&cwd, config.display.git_timeout()).await,
        _ => None,
    };

    let options = RenderOptions {
        painter,
        path_segments: config.display.path_segments,
        home,
    };
    let lines = render::render(&snapshot, &usage, git.as_ref(), &options);

    StatusOutput {
        snapshot,
        usage,
        git,
        lines,
    }
}

fn working_dir(snapshot: &StatusSnapshot) -> Option<PathBuf> {
    snapshot
        .cwd
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn tracker() -> UsageTracker<MemoryStore> {
        UsageTracker::from_config(MemoryStore::new(), &Config::default().limits).unwrap()
    }

    #[tokio::test]
    async fn test_run_status_records_and_renders() {
        let dir = tempfile::tempdir().unwrap();
        let payload = serde_json::json!({
            "session_id": "abc",
            "cwd": dir.path(),
            "model": {"id": "claude-sonnet-4-20250514", "display_name": "Sonnet 4"},
            "context_window": {"total_input_tokens": 1_000_000, "total_output_tokens": 200_000}
        })
        .to_string();
        let tracker = tracker();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        let output = run_status(&payload, &Config::default(), &tracker, Painter::plain(), None, now).await;

        assert!(output.usage.recorded.is_some());
        assert!(output.git.is_none());
        assert!(output.lines[0].starts_with("Sonnet 4"));
        assert_eq!(output.lines[2], "5h 24% (5h)  7d 2% (7d)");
    }

    #[tokio::test]
    async fn test_run_status_on_garbage_input() {
        let tracker = tracker();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let output = run_status("not json", &Config::default(), &tracker, Painter::plain(), None, now).await;

        assert!(output.snapshot.session_id.is_unknown());
        assert!(output.usage.recorded.is_none());
        assert_eq!(output.lines[0], "Claude");
    }

    #[tokio::test]
    async fn test_git_disabled_skips_lookup() {
        let mut config = Config::default();
        config.display.git = false;
        let tracker = tracker();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let cwd = std::env::current_dir().unwrap();
        let payload = serde_json::json!({"session_id": "abc", "cwd": cwd}).to_string();

        let output = run_status(&payload, &config, &tracker, Painter::plain(), None, now).await;
        assert!(output.git.is_none());
    }
}
