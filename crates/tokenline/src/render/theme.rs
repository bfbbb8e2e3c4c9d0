//! Shared theme utilities for the status line.
//!
//! Colors are emitted as ANSI escapes through `crossterm::style`, or not at
//! all when color is disabled.

use crossterm::style::{style, Color, Stylize};

/// Environment variable that disables color when set to any non-empty value.
pub const NO_COLOR_ENV: &str = "NO_COLOR";

pub const MODEL_COLOR: Color = Color::Cyan;
pub const PATH_COLOR: Color = Color::Blue;
pub const BRANCH_COLOR: Color = Color::Magenta;
pub const DIRTY_COLOR: Color = Color::Yellow;
pub const MUTED_COLOR: Color = Color::DarkGrey;
pub const ADDED_COLOR: Color = Color::Green;
pub const REMOVED_COLOR: Color = Color::Red;

/// Returns the appropriate color for a usage or context percentage.
///
/// Color coding follows a traffic-light pattern:
/// - Green (< 50%): plenty of headroom
/// - Yellow (50-79%): elevated usage
/// - Red (>= 80%): close to the limit
pub fn usage_color(percentage: f64) -> Color {
    if percentage >= 80.0 {
        Color::Red
    } else if percentage >= 50.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// True when `NO_COLOR` is set to a non-empty value.
pub fn no_color_requested() -> bool {
    std::env::var_os(NO_COLOR_ENV)
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

/// Applies colors, or passes text through untouched when disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            style(text).with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str, color: Color) -> String {
        if self.enabled {
            style(text).with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Paints a percentage-driven value with its traffic-light color.
    pub fn usage(&self, text: &str, percentage: f64) -> String {
        self.paint(text, usage_color(percentage))
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, MUTED_COLOR)
    }
}
