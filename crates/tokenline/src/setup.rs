//! statusLine configuration for Claude Code integration
//!
//! Installs and removes the `statusLine` entry in Claude Code's
//! `~/.claude/settings.json` that points at the tokenline binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::paths;

/// Marker used to recognise our own statusLine command.
const COMMAND_MARKER: &str = "tokenline";

/// What `install_status_line` did to the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Added,
    /// Replaced another tool's statusLine command.
    Replaced { previous: Option<String> },
    AlreadyConfigured,
}

/// Reads Claude Code settings, returns empty object if file doesn't exist
fn read_settings(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(json!({}));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Writes Claude Code settings
fn write_settings(path: &Path, settings: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Creates the statusLine configuration entry.
fn create_status_line_entry(command: &str) -> Value {
    json!({
        "type": "command",
        "command": command,
        "padding": 0
    })
}

fn status_line_command(status_line: &Value) -> Option<&str> {
    status_line.get("command").and_then(|c| c.as_str())
}

/// Checks if tokenline is configured for statusLine
fn has_tokenline_status_line(status_line: &Value) -> bool {
    status_line_command(status_line)
        .map(|cmd| cmd.contains(COMMAND_MARKER))
        .unwrap_or(false)
}

/// Points the settings file's statusLine at `command`.
pub fn install_status_line(settings_path: &Path, command: &str) -> Result<InstallOutcome> {
    let mut settings = read_settings(settings_path)?;
    if !settings.is_object() {
        anyhow::bail!("{} is not a JSON object", settings_path.display());
    }

    let outcome = match settings.get("statusLine") {
        Some(existing) if has_tokenline_status_line(existing) => {
            if status_line_command(existing) == Some(command) {
                return Ok(InstallOutcome::AlreadyConfigured);
            }
            InstallOutcome::Replaced {
                previous: status_line_command(existing).map(str::to_string),
            }
        }
        Some(existing) => InstallOutcome::Replaced {
            previous: status_line_command(existing).map(str::to_string),
        },
        None => InstallOutcome::Added,
    };

    settings["statusLine"] = create_status_line_entry(command);
    write_settings(settings_path, &settings)?;
    Ok(outcome)
}

/// Removes our statusLine entry. Returns false if none was configured,
/// leaving another tool's entry untouched.
pub fn remove_status_line(settings_path: &Path) -> Result<bool> {
    if !settings_path.exists() {
        return Ok(false);
    }

    let mut settings = read_settings(settings_path)?;
    let ours = settings
        .get("statusLine")
        .map(has_tokenline_status_line)
        .unwrap_or(false);
    if !ours {
        return Ok(false);
    }

    if let Some(obj) = settings.as_object_mut() {
        obj.remove("statusLine");
    }
    write_settings(settings_path, &settings)?;
    Ok(true)
}

/// Installs tokenline as the Claude Code status line
pub fn setup() -> Result<()> {
    let settings_path = paths::claude_settings_path().context("Could not determine home directory")?;
    let exe = std::env::current_exe().context("Could not locate the tokenline binary")?;
    let command = exe.to_string_lossy().to_string();

    println!("Configuring statusLine in {}...", settings_path.display());
    match install_status_line(&settings_path, &command)? {
        InstallOutcome::Added => println!("  statusLine - added"),
        InstallOutcome::Replaced { previous } => match previous {
            Some(prev) => println!("  statusLine - replaced `{prev}`"),
            None => println!("  statusLine - replaced"),
        },
        InstallOutcome::AlreadyConfigured => println!("  statusLine - already configured"),
    }
    println!("\nRestart Claude Code to see the new status line.");

    Ok(())
}

/// Removes tokenline from Claude Code settings
pub fn uninstall() -> Result<()> {
    let settings_path = paths::claude_settings_path().context("Could not determine home directory")?;

    if remove_status_line(&settings_path)? {
        println!("statusLine configuration removed");
    } else {
        println!("statusLine - not configured by tokenline");
    }

    let store = paths::state_dir();
    println!("Usage history is kept in {}", store.display());
    Ok(())
}
