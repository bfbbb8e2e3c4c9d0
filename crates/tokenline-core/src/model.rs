//! Claude model identification and display labels.
//!
//! Model ids arrive in two shapes:
//! - current: `claude-<family>-<major>[-<minor>][-<date>]` (`claude-opus-4-5-20251101`)
//! - legacy:  `claude-<major>[-<minor>]-<family>[-<date>]` (`claude-3-5-haiku-20241022`)
//!
//! Both map to `"<Family> <major>[.<minor>]"`.

use std::fmt;

/// Label used when a snapshot carries no model at all.
pub const DEFAULT_MODEL_LABEL: &str = "Claude";

/// Claude model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Opus,
    Sonnet,
    Haiku,
}

impl ModelFamily {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "opus" => Some(Self::Opus),
            "sonnet" => Some(Self::Sonnet),
            "haiku" => Some(Self::Haiku),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Opus => "Opus",
            Self::Sonnet => "Sonnet",
            Self::Haiku => "Haiku",
        }
    }
}

/// A parsed Claude model version, e.g. Opus 4.5.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelVersion {
    pub family: ModelFamily,
    pub major: u32,
    pub minor: Option<u32>,
}

impl ModelVersion {
    /// Parses a model id, returning None for non-Claude or unrecognised ids.
    pub fn from_id(id: &str) -> Option<Self> {
        // Provider-prefixed ids ("us.anthropic.claude-...") and context
        // suffixes ("...[1m]") are tolerated.
        let start = id.find("claude-")?;
        let rest = id.get(start + "claude-".len()..)?;
        let rest = rest.split('[').next().unwrap_or(rest);

        let tokens: Vec<&str> = rest
            .split('-')
            .take_while(|t| !is_date_token(t))
            .collect();

        let (family, numbers): (ModelFamily, Vec<&str>) = match tokens.first() {
            Some(first) if ModelFamily::parse(first).is_some() => {
                let family = ModelFamily::parse(first)?;
                (family, tokens.iter().skip(1).copied().collect())
            }
            _ => {
                let family_pos = tokens.iter().position(|t| ModelFamily::parse(t).is_some())?;
                let family = tokens.get(family_pos).and_then(|t| ModelFamily::parse(t))?;
                (family, tokens.iter().take(family_pos).copied().collect())
            }
        };

        let mut versions = numbers.iter().map_while(|t| t.parse::<u32>().ok());
        let major = versions.next()?;
        let minor = versions.next();

        Some(Self {
            family,
            major,
            minor,
        })
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{} {}.{}", self.family.name(), self.major, minor),
            None => write!(f, "{} {}", self.family.name(), self.major),
        }
    }
}

/// Release dates are the only 8-digit tokens in a model id.
fn is_date_token(token: &str) -> bool {
    token.len() == 8 && token.chars().all(|c| c.is_ascii_digit())
}

/// Returns the label shown for a model.
///
/// Prefers the parsed Claude version, then the payload's display name,
/// then the raw id.
pub fn model_label(id: Option<&str>, display_name: Option<&str>) -> String {
    let id = id.map(str::trim).filter(|s| !s.is_empty());
    let display_name = display_name.map(str::trim).filter(|s| !s.is_empty());

    if let Some(version) = id.and_then(ModelVersion::from_id) {
        return version.to_string();
    }
    display_name
        .or(id)
        .unwrap_or(DEFAULT_MODEL_LABEL)
        .to_string()
}

/// Formats a Claude Code version string as "v1.2.3".
pub fn version_label(version: &str) -> Option<String> {
    let version = version.trim().trim_start_matches(['v', 'V']);
    if version.is_empty() {
        None
    } else {
        Some(format!("v{version}"))
    }
}
