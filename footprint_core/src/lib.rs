#![forbid(unsafe_code)]

//! Core domain model and business logic for the carbon footprint tracker.
//!
//! This crate provides:
//! - Domain types (inputs, levels, snapshots, game state)
//! - Threshold classifier and diet feedback
//! - Gamification (points, streaks, badges)
//! - Bounded history and dashboard aggregates
//! - Per-session persistence and history export
//! - Best-effort headline lookup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod input;
pub mod classify;
pub mod gamification;
pub mod history;
pub mod state;
pub mod news;
pub mod export;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, NewsError, Result};
pub use types::*;
pub use config::Config;
pub use history::{History, HISTORY_CAPACITY};
pub use classify::{classify, classify_diet};
pub use state::{FileSessionStore, MemorySessionStore, SessionId, SessionStore};
pub use news::{headlines, NewsSource, StaticNewsSource};
pub use engine::{apply_submission, Tracker};
