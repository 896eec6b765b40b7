//! Core domain types for the carbon footprint tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Footprint inputs and their classification
//! - Gamification state (points, streak, badges)
//! - Snapshots and the per-session record
//! - Engine outputs consumed by the presentation layer

use crate::history::History;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Inputs
// ============================================================================

/// One day's self-reported emissions, kg CO2e per component
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FootprintInput {
    #[serde(default)]
    pub travel: f64,
    #[serde(default)]
    pub electricity: f64,
    #[serde(default)]
    pub diet: f64,
    #[serde(default)]
    pub shopping: f64,
}

impl FootprintInput {
    /// Sum of the four components, rounded to 2 decimal places
    pub fn total(&self) -> f64 {
        round2(self.travel + self.electricity + self.diet + self.shopping)
    }
}

/// Raw, unparsed form values as received from the presentation layer
///
/// `None` means the field was not submitted at all and counts as zero.
#[derive(Clone, Debug, Default)]
pub struct RawInput {
    pub travel: Option<String>,
    pub electricity: Option<String>,
    pub diet: Option<String>,
    pub shopping: Option<String>,
}

/// Round to 2 decimal places, ties to even
///
/// Values too large to scale are returned unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round_ties_even() / 100.0
}

// ============================================================================
// Classification
// ============================================================================

/// Qualitative impact bucket
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    Moderate,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Low => "Low",
            Level::Moderate => "Moderate",
            Level::High => "High",
        };
        f.write_str(name)
    }
}

/// Outcome of classifying a footprint total
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub level: Level,
    pub score: i32,
    pub message: String,
}

/// Feedback for the diet component alone
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DietReport {
    pub category: Level,
    pub text: String,
    pub tips: Vec<String>,
}

// ============================================================================
// Gamification
// ============================================================================

/// Non-revocable achievements
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Badge {
    #[serde(rename = "Eco Enthusiast")]
    EcoEnthusiast,
    #[serde(rename = "7-Day Streak")]
    SevenDayStreak,
    #[serde(rename = "Low Impact Day")]
    LowImpactDay,
}

impl Badge {
    pub fn name(&self) -> &'static str {
        match self {
            Badge::EcoEnthusiast => "Eco Enthusiast",
            Badge::SevenDayStreak => "7-Day Streak",
            Badge::LowImpactDay => "Low Impact Day",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Points, streak and badges accumulated by one session
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub badges: BTreeSet<Badge>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_date: Option<DateTime<Utc>>,
}

// ============================================================================
// History and Session Types
// ============================================================================

/// One recorded submission
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub travel: f64,
    pub electricity: f64,
    pub diet: f64,
    pub shopping: f64,
    pub total: f64,
    pub level: Level,
}

/// Everything persisted for a single session
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub last_inputs: Option<FootprintInput>,
    #[serde(default)]
    pub snapshots: History,
    #[serde(default)]
    pub game: GameState,
}

// ============================================================================
// Engine Outputs
// ============================================================================

/// A headline shown on the dashboard
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            url: None,
        }
    }
}

/// Result of an accepted submission
#[derive(Clone, Debug, Serialize)]
pub struct SubmissionOutcome {
    pub input: FootprintInput,
    pub total: f64,
    pub level: Level,
    pub score: i32,
    pub message: String,
    pub diet_report: DietReport,
    pub game: GameState,
    /// Badges this submission earned for the first time
    pub new_badges: Vec<Badge>,
}

/// Read-only overview of a session
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub labels: Vec<String>,
    pub totals: Vec<f64>,
    pub latest: Option<Snapshot>,
    pub average: f64,
    pub game: GameState,
    pub news: Vec<NewsItem>,
}
