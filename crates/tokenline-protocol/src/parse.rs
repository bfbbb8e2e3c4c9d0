//! Parsing Claude Code status line JSON.
//!
//! Claude Code pipes one JSON object to the status line command on every
//! refresh. Any field may be missing, null, or of an unexpected type; each
//! one degrades to its default independently instead of failing the whole
//! payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokenline_core::{
    DomainError, DomainResult, LinesChanged, Money, SessionDuration, SessionId, StatusSnapshot,
    TokenCount, TokenPair, DEFAULT_CONTEXT_WINDOW,
};
use tracing::{debug, warn};

/// Raw status line JSON structure from Claude Code.
///
/// All fields are optional to handle partial updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatusLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<RawModel>,
    #[serde(default, deserialize_with = "lenient")]
    pub workspace: Option<RawWorkspace>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: Option<RawCost>,
    #[serde(default, deserialize_with = "lenient")]
    pub context_window: Option<RawContextWindow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawModel {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWorkspace {
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCost {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_cost_usd: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_duration_ms: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_lines_added: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_lines_removed: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContextWindow {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_input_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_output_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub context_window_size: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub current_usage: Option<RawCurrentUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCurrentUsage {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cache_creation_input_tokens: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub cache_read_input_tokens: u64,
}

impl RawStatusLine {
    /// Parses a status line payload.
    ///
    /// Only fails when the input is not a JSON object at all.
    pub fn parse(input: &str) -> DomainResult<Self> {
        serde_json::from_str(input).map_err(|e| DomainError::ParseError {
            field: "status line".to_string(),
            reason: e.to_string(),
        })
    }

    /// Converts raw JSON data to a StatusSnapshot, filling defaults.
    pub fn to_snapshot(&self) -> StatusSnapshot {
        let cost = self.cost.clone().unwrap_or_default();
        let context = self.context_window.clone().unwrap_or_default();
        let current = context.current_usage.clone().unwrap_or_default();
        let model = self.model.clone().unwrap_or_default();

        // Context in use = cache reads + fresh input + cache writes.
        let context_tokens = TokenCount::new(current.cache_read_input_tokens)
            .saturating_add(TokenCount::new(current.input_tokens))
            .saturating_add(TokenCount::new(current.cache_creation_input_tokens));

        let cwd = self
            .workspace
            .as_ref()
            .and_then(|w| w.current_dir.clone())
            .or_else(|| self.cwd.clone());

        StatusSnapshot {
            session_id: SessionId::from_optional(self.session_id.as_deref()),
            cumulative: TokenPair::new(context.total_input_tokens, context.total_output_tokens),
            context_tokens,
            context_window_size: if context.context_window_size == 0 {
                DEFAULT_CONTEXT_WINDOW
            } else {
                context.context_window_size
            },
            model_id: model.id,
            model_display_name: model.display_name,
            cwd,
            version: self.version.clone(),
            cost: Money::from_usd(cost.total_cost_usd),
            duration: SessionDuration::from_total_ms(cost.total_duration_ms),
            lines: LinesChanged::new(cost.total_lines_added, cost.total_lines_removed),
        }
    }
}

/// Reads a snapshot from raw stdin contents.
///
/// Malformed input yields the default snapshot (sentinel session, zero
/// counters) so the status line still renders.
pub fn read_snapshot(input: &str) -> StatusSnapshot {
    if input.trim().is_empty() {
        debug!("Empty status line payload");
        return StatusSnapshot::default();
    }
    match RawStatusLine::parse(input) {
        Ok(raw) => raw.to_snapshot(),
        Err(e) => {
            warn!(error = %e, "Malformed status line payload, using defaults");
            StatusSnapshot::default()
        }
    }
}

// ============================================================================
// Lenient field deserializers
// ============================================================================

/// Deserializes a nested object, turning anything that is not a valid
/// object into None.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(object @ Value::Object(_)) => serde_json::from_value(object).ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u64).unwrap_or(0))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|f| f.is_finite() && *f >= 0.0).unwrap_or(0.0))
}

/// Non-negative integers, numeric strings, and non-negative floats
/// (truncated). Everything else is rejected.
fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_status_line() {
        let json = r#"{
            "session_id": "test-123",
            "cwd": "/home/u/project",
            "model": {"id": "claude-opus-4-5-20251101", "display_name": "Opus 4.5"},
            "workspace": {"current_dir": "/home/u/project/src", "project_dir": "/home/u/project"},
            "version": "1.0.80",
            "cost": {
                "total_cost_usd": 0.35,
                "total_duration_ms": 35000,
                "total_lines_added": 150,
                "total_lines_removed": 30
            },
            "context_window": {
                "total_input_tokens": 5000,
                "total_output_tokens": 1200,
                "context_window_size": 200000,
                "current_usage": {
                    "input_tokens": 1000,
                    "output_tokens": 500,
                    "cache_creation_input_tokens": 2000,
                    "cache_read_input_tokens": 40000
                }
            }
        }"#;

        let snapshot = read_snapshot(json);
        assert_eq!(snapshot.session_id.as_str(), "test-123");
        assert_eq!(snapshot.cumulative, TokenPair::new(5000, 1200));
        assert_eq!(snapshot.context_tokens.as_u64(), 43_000);
        assert_eq!(snapshot.cwd.as_deref(), Some("/home/u/project/src"));
        assert_eq!(snapshot.model_label(), "Opus 4.5");
        assert_eq!(snapshot.version_label().as_deref(), Some("v1.0.80"));
        assert!((snapshot.cost.as_usd() - 0.35).abs() < 0.001);
        assert_eq!(snapshot.duration.total_ms(), 35_000);
        assert_eq!(snapshot.lines, LinesChanged::new(150, 30));
    }

    #[test]
    fn test_missing_session_id_uses_sentinel() {
        let snapshot = read_snapshot(r#"{"context_window": {"total_input_tokens": 10}}"#);
        assert!(snapshot.session_id.is_unknown());
        assert_eq!(snapshot.cumulative, TokenPair::new(10, 0));
    }

    #[test]
    fn test_null_fields_default() {
        let json = r#"{
            "session_id": null,
            "model": null,
            "cost": null,
            "context_window": {"total_input_tokens": null, "current_usage": null}
        }"#;
        let snapshot = read_snapshot(json);
        assert!(snapshot.session_id.is_unknown());
        assert_eq!(snapshot.cumulative, TokenPair::zero());
        assert_eq!(snapshot.context_window_size, DEFAULT_CONTEXT_WINDOW);
    }

    #[test]
    fn test_invalid_numbers_default_to_zero() {
        let json = r#"{
            "session_id": "s",
            "context_window": {
                "total_input_tokens": -5,
                "total_output_tokens": "42",
                "context_window_size": "lots"
            },
            "cost": {"total_cost_usd": "free", "total_duration_ms": 12.7}
        }"#;
        let snapshot = read_snapshot(json);
        assert_eq!(snapshot.cumulative, TokenPair::new(0, 42));
        assert_eq!(snapshot.context_window_size, DEFAULT_CONTEXT_WINDOW);
        assert!(snapshot.cost.is_zero());
        assert_eq!(snapshot.duration.total_ms(), 12);
    }

    #[test]
    fn test_wrongly_typed_objects_are_ignored() {
        let json = r#"{"session_id": "s", "model": "opus", "context_window": [1, 2]}"#;
        let snapshot = read_snapshot(json);
        assert_eq!(snapshot.session_id.as_str(), "s");
        assert_eq!(snapshot.model_id, None);
        assert_eq!(snapshot.cumulative, TokenPair::zero());
    }

    #[test]
    fn test_numeric_session_id() {
        let snapshot = read_snapshot(r#"{"session_id": 1234}"#);
        assert_eq!(snapshot.session_id.as_str(), "1234");
    }

    #[test]
    fn test_malformed_json_yields_default() {
        assert_eq!(read_snapshot("{ not json"), StatusSnapshot::default());
        assert_eq!(read_snapshot(""), StatusSnapshot::default());
        assert_eq!(read_snapshot("[]"), StatusSnapshot::default());
    }

    #[test]
    fn test_parse_reports_error() {
        let err = RawStatusLine::parse("nope").unwrap_err();
        assert!(matches!(err, DomainError::ParseError { .. }));
    }

    #[test]
    fn test_cwd_fallback_without_workspace() {
        let snapshot = read_snapshot(r#"{"cwd": "/tmp/x"}"#);
        assert_eq!(snapshot.cwd.as_deref(), Some("/tmp/x"));
    }
}
