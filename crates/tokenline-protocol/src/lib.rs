//! tokenline protocol - Claude Code status line input
//!
//! This crate turns the JSON payload Claude Code pipes to a status line
//! command into a [`tokenline_core::StatusSnapshot`].

pub mod parse;

pub use parse::{
    read_snapshot, RawContextWindow, RawCost, RawCurrentUsage, RawModel, RawStatusLine,
    RawWorkspace,
};
