//! User configuration loaded from `config.toml`.
//!
//! Every key is optional; a missing file means defaults. Lookup order for
//! the file is `--config`, `TOKENLINE_CONFIG`, then
//! `$XDG_CONFIG_HOME/tokenline/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tokenline_core::{default_retention, max_window, TokenCount, WindowSpec};
use tracing::{debug, warn};

use crate::error::{CliError, Result};
use crate::paths;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TOKENLINE_CONFIG";

/// Environment variable overriding the usage ledger location.
pub const STORE_ENV: &str = "TOKENLINE_STORE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
    pub display: DisplayConfig,
}

/// Window lengths and their token quotas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub short_window_hours: u32,
    pub short_window_tokens: u64,
    pub long_window_days: u32,
    pub long_window_tokens: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            short_window_hours: 5,
            short_window_tokens: 5_000_000,
            long_window_days: 7,
            long_window_tokens: 50_000_000,
        }
    }
}

impl LimitsConfig {
    /// The short (rate-limit) window, e.g. "5h".
    pub fn short_window(&self) -> Result<WindowSpec> {
        Ok(WindowSpec::new(
            format!("{}h", self.short_window_hours),
            TimeDelta::hours(i64::from(self.short_window_hours)),
            TokenCount::new(self.short_window_tokens),
        )?)
    }

    /// The long (weekly) window, e.g. "7d".
    pub fn long_window(&self) -> Result<WindowSpec> {
        Ok(WindowSpec::new(
            format!("{}d", self.long_window_days),
            TimeDelta::days(i64::from(self.long_window_days)),
            TokenCount::new(self.long_window_tokens),
        )?)
    }

    /// How long events are kept: the longest window, never less than the
    /// default seven days and never more than the longest accepted window.
    pub fn retention(&self) -> TimeDelta {
        let short = TimeDelta::hours(i64::from(self.short_window_hours));
        let long = TimeDelta::days(i64::from(self.long_window_days));
        default_retention().max(short).max(long).min(max_window())
    }

    /// Checks that both windows can be built.
    pub fn validate(&self) -> Result<()> {
        self.short_window()?;
        self.long_window()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit ledger path; defaults to the state directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
    /// Trailing path segments kept when shortening the working directory.
    pub path_segments: usize,
    pub git: bool,
    pub git_timeout_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            path_segments: 3,
            git: true,
            git_timeout_ms: 2_000,
        }
    }
}

impl DisplayConfig {
    pub fn git_timeout(&self) -> Duration {
        Duration::from_millis(self.git_timeout_ms)
    }
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tokenline").join("config.toml"))
    }

    /// Picks the config file: explicit path, then `TOKENLINE_CONFIG`, then
    /// the default location.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::default_path)
    }

    /// Loads a config file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| CliError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads the config, falling back to defaults on any error.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Replaces window limits that cannot form a window with the defaults.
    pub fn normalize_limits(&mut self) {
        if let Err(e) = self.limits.validate() {
            warn!(error = %e, "Invalid window limits, using defaults");
            self.limits = LimitsConfig::default();
        }
    }

    /// Applies environment overrides (`TOKENLINE_STORE`).
    pub fn apply_env(&mut self) {
        if let Some(store) = std::env::var_os(STORE_ENV) {
            if !store.is_empty() {
                self.storage.path = Some(PathBuf::from(store));
            }
        }
    }

    /// Where the usage ledger lives.
    pub fn store_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| paths::state_dir().join("usage.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tracker::UsageTracker;
    use chrono::{TimeZone, Utc};
    use tokenline_core::{SessionId, TokenPair};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.limits.short_window_hours, 5);
        assert_eq!(config.limits.short_window_tokens, 5_000_000);
        assert_eq!(config.limits.long_window_days, 7);
        assert!(config.display.color);
        assert_eq!(config.display.path_segments, 3);
        assert_eq!(config.display.git_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[limits]
short_window_tokens = 1000

[display]
git = false
"#,
        )
        .unwrap();

        assert_eq!(config.limits.short_window_tokens, 1000);
        assert_eq!(config.limits.short_window_hours, 5);
        assert!(!config.display.git);
        assert!(config.display.color);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_window_specs() {
        let limits = LimitsConfig::default();
        let short = limits.short_window().unwrap();
        let long = limits.long_window().unwrap();
        assert_eq!(short.label, "5h");
        assert_eq!(short.duration, TimeDelta::hours(5));
        assert_eq!(long.label, "7d");
        assert_eq!(long.limit.as_u64(), 50_000_000);
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let limits = LimitsConfig {
            short_window_hours: 0,
            ..Default::default()
        };
        assert!(matches!(limits.short_window(), Err(CliError::Domain(_))));
    }

    #[test]
    fn test_retention_covers_longest_window() {
        assert_eq!(LimitsConfig::default().retention(), TimeDelta::days(7));
        let wide = LimitsConfig {
            long_window_days: 30,
            ..Default::default()
        };
        assert_eq!(wide.retention(), TimeDelta::days(30));
        let narrow = LimitsConfig {
            long_window_days: 1,
            ..Default::default()
        };
        assert_eq!(narrow.retention(), TimeDelta::days(7));
    }

    #[test]
    fn test_overlong_window_falls_back_to_defaults() {
        let mut config: Config = toml::from_str("[limits]\nlong_window_days = 100000000\n").unwrap();

        assert!(matches!(config.limits.long_window(), Err(CliError::Domain(_))));
        assert_eq!(config.limits.retention(), max_window());

        config.normalize_limits();
        assert_eq!(config.limits, LimitsConfig::default());

        let tracker = UsageTracker::from_config(MemoryStore::new(), &config.limits).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let report = tracker.observe(SessionId::new("a"), TokenPair::new(100, 0), now);
        assert_eq!(report.event_count, 1);
    }

    #[test]
    fn test_valid_limits_are_kept() {
        let mut config: Config = toml::from_str("[limits]\nshort_window_hours = 8\n").unwrap();
        config.normalize_limits();
        assert_eq!(config.limits.short_window_hours, 8);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits\nshort_window_hours = ").unwrap();

        assert!(matches!(Config::load(&path), Err(CliError::Config { .. })));
        assert_eq!(Config::load_or_default(Some(&path)), Config::default());
    }

    #[test]
    fn test_store_path_prefers_explicit() {
        let mut config = Config::default();
        config.storage.path = Some(PathBuf::from("/data/usage.json"));
        assert_eq!(config.store_path(), PathBuf::from("/data/usage.json"));
    }
}
