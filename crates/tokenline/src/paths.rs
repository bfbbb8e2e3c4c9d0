//! Filesystem locations for tokenline state.

use std::path::PathBuf;

/// Directory for the usage ledger and log file.
///
/// `$XDG_STATE_HOME/tokenline`, falling back to the local data dir and
/// finally `/tmp/tokenline`.
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("tokenline")
}

/// Log file written by the binary.
pub fn log_file_path() -> PathBuf {
    state_dir().join("tokenline.log")
}

/// Claude Code user settings.
pub fn claude_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude").join("settings.json"))
}
