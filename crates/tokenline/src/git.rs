//! Git integration for the status line.
//!
//! Runs a single `git status --porcelain --branch` in the session's working
//! directory under a timeout.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Every failure, including a timeout, collapses to "no git information"

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while querying git.
#[derive(Debug, Error)]
pub enum GitError {
    /// git did not answer in time
    #[error("git timed out after {0:?}")]
    Timeout(Duration),

    /// Failed to execute git
    #[error("git command failed: {0}")]
    CommandFailed(String),

    /// Output did not contain a branch header
    #[error("unexpected git status output")]
    UnexpectedOutput,
}

// ============================================================================
// Types
// ============================================================================

/// Branch and working tree state of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitInfo {
    /// Branch name, or "HEAD" when detached.
    pub branch: String,
    /// Number of modified, staged, or untracked paths.
    pub changed_files: usize,
}

impl GitInfo {
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.changed_files > 0
    }
}

// ============================================================================
// Public Functions
// ============================================================================

/// Looks up git state for `cwd`, returning None on any failure.
pub async fn git_info(cwd: &Path, timeout: Duration) -> Option<GitInfo> {
    match query_git(cwd, timeout).await {
        Ok(info) => Some(info),
        Err(e) => {
            debug!(error = %e, cwd = %cwd.display(), "No git information");
            None
        }
    }
}

/// Runs `git status` in `cwd` and parses its output.
///
/// The child is killed if the timeout elapses first.
///
/// # Errors
///
/// * `GitError::Timeout` - git did not exit within `timeout`
/// * `GitError::CommandFailed` - git is missing or exited non-zero
/// * `GitError::UnexpectedOutput` - no `## ` branch header was printed
pub async fn query_git(cwd: &Path, timeout: Duration) -> Result<GitInfo, GitError> {
    let mut command = Command::new("git");
    command
        .arg("--no-optional-locks")
        .arg("-C")
        .arg(cwd)
        .args(["status", "--porcelain=v1", "--branch"])
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| GitError::Timeout(timeout))?
        .map_err(|e| GitError::CommandFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed(stderr.trim().to_string()));
    }

    parse_status(&String::from_utf8_lossy(&output.stdout))
}

/// Parses `git status --porcelain --branch` output.
pub fn parse_status(output: &str) -> Result<GitInfo, GitError> {
    let mut lines = output.lines();
    let branch = lines
        .next()
        .and_then(parse_branch_header)
        .ok_or(GitError::UnexpectedOutput)?;
    let changed_files = lines.filter(|line| !line.trim().is_empty()).count();

    Ok(GitInfo {
        branch,
        changed_files,
    })
}

/// Extracts the branch from a `## ...` header line.
///
/// Handles `## main...origin/main [ahead 1]`, `## No commits yet on main`
/// and `## HEAD (no branch)`.
fn parse_branch_header(line: &str) -> Option<String> {
    let header = line.strip_prefix("## ")?.trim();

    for prefix in ["No commits yet on ", "Initial commit on "] {
        if let Some(branch) = header.strip_prefix(prefix) {
            return Some(branch.trim().to_string());
        }
    }

    if header.starts_with("HEAD (no branch)") {
        return Some("HEAD".to_string());
    }

    let branch = header
        .split("...")
        .next()
        .and_then(|s| s.split_whitespace().next())?;
    Some(branch.to_string())
}

// ============================================================================
// Tests
// ============================================================================
