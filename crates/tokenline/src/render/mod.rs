//! Status line rendering.
//!
//! Builds the three lines Claude Code prints under the prompt:
//!
//! ```text
//! Opus 4.5 v1.0.80  ~/code/tokenline  main*2
//! ctx ██░░░░░░░░ 21%  $0.35  2m 15s  +150 -30
//! 5h 24% (3h 12m)  7d 2% (6d 23h)
//! ```

pub mod path;
pub mod theme;

use std::path::Path;

use tokenline_core::StatusSnapshot;

use crate::git::GitInfo;
use crate::tracker::{UsageReport, WindowReport};

pub use path::shorten_path;
pub use theme::{no_color_requested, usage_color, Painter};

/// Width of the context bar in cells.
pub const BAR_WIDTH: usize = 10;

const SEPARATOR: &str = "  ";

/// Inputs that shape the output but are not part of the data.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub painter: Painter,
    /// Trailing path segments kept when shortening the working directory.
    pub path_segments: usize,
    pub home: Option<&'a Path>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            painter: Painter::plain(),
            path_segments: 3,
            home: None,
        }
    }
}

/// Renders the complete status line.
///
/// Always returns three lines; segments without data are left out.
pub fn render(
    snapshot: &StatusSnapshot,
    usage: &UsageReport,
    git: Option<&GitInfo>,
    options: &RenderOptions<'_>,
) -> [String; 3] {
    [
        session_line(snapshot, git, options),
        context_line(snapshot, &options.painter),
        usage_line(usage, &options.painter),
    ]
}

/// Line 1: model, Claude Code version, directory and branch.
fn session_line(snapshot: &StatusSnapshot, git: Option<&GitInfo>, options: &RenderOptions<'_>) -> String {
    let painter = &options.painter;
    let mut model = painter.bold(&snapshot.model_label(), theme::MODEL_COLOR);
    if let Some(version) = snapshot.version_label() {
        model.push(' ');
        model.push_str(&painter.muted(&version));
    }

    let mut segments = vec![model];

    if let Some(cwd) = snapshot.cwd.as_deref().filter(|c| !c.is_empty()) {
        let short = shorten_path(cwd, options.home, options.path_segments);
        segments.push(painter.paint(&short, theme::PATH_COLOR));
    }

    if let Some(git) = git {
        let mut branch = painter.paint(&git.branch, theme::BRANCH_COLOR);
        if git.is_dirty() {
            branch.push_str(&painter.paint(&format!("*{}", git.changed_files), theme::DIRTY_COLOR));
        }
        segments.push(branch);
    }

    segments.join(SEPARATOR)
}

/// Line 2: context usage, cost, duration and line changes.
fn context_line(snapshot: &StatusSnapshot, painter: &Painter) -> String {
    let pct = snapshot.context_percentage();
    let mut segments = vec![format!(
        "{} {} {}",
        painter.muted("ctx"),
        painter.usage(&context_bar(pct, BAR_WIDTH), pct),
        painter.usage(&format!("{pct:.0}%"), pct),
    )];

    segments.push(snapshot.cost.format());

    if !snapshot.duration.is_zero() {
        segments.push(snapshot.duration.format());
    }

    if !snapshot.lines.is_empty() {
        segments.push(format!(
            "{} {}",
            painter.paint(&format!("+{}", snapshot.lines.added), theme::ADDED_COLOR),
            painter.paint(&format!("-{}", snapshot.lines.removed), theme::REMOVED_COLOR),
        ));
    }

    segments.join(SEPARATOR)
}

/// Line 3: both usage windows.
fn usage_line(usage: &UsageReport, painter: &Painter) -> String {
    [&usage.short, &usage.long]
        .into_iter()
        .map(|window| window_segment(window, painter))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn window_segment(window: &WindowReport, painter: &Painter) -> String {
    let stats = &window.stats;
    format!(
        "{} {} {}",
        painter.muted(&window.label),
        painter.usage(&stats.format_percentage(), stats.percentage),
        painter.muted(&format!("({})", stats.format_remaining())),
    )
}

/// Fixed-width bar for a 0-100 percentage.
pub fn context_bar(percentage: f64, width: usize) -> String {
    let ratio = if percentage.is_finite() {
        (percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
