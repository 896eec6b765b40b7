//! Points, streak and badge tracking.
//!
//! This module implements the incentive rules applied once per submission:
//! - Points: 30 for a Low total, 15 for Moderate, 5 for High
//! - Streak: consecutive UTC calendar days with at least one submission
//! - Badges: awarded once and never taken away
//!
//! Repeated submissions on the same day each award points.

use crate::classify::level_for;
use crate::{Badge, GameState, Level};
use chrono::{DateTime, Days, Utc};

/// Points reaching this earn [`Badge::EcoEnthusiast`]
pub const ENTHUSIAST_POINTS: u32 = 100;
/// Streak reaching this earns [`Badge::SevenDayStreak`]
pub const STREAK_BADGE_DAYS: u32 = 7;

/// Points awarded for one submission
pub fn points_for(total: f64) -> u32 {
    match level_for(total) {
        Level::Low => 30,
        Level::Moderate => 15,
        Level::High => 5,
    }
}

/// Compute the next streak value
fn next_streak(state: &GameState, now: DateTime<Utc>) -> u32 {
    let Some(last) = state.last_date else {
        return 1;
    };

    let today = now.date_naive();
    let last_day = last.date_naive();

    if last_day.checked_add_days(Days::new(1)) == Some(today) {
        state.streak.saturating_add(1)
    } else if today == last_day {
        state.streak
    } else {
        1
    }
}

/// Apply one submission to the game state
///
/// Returns the badges earned for the first time by this call.
pub fn update(state: &mut GameState, total: f64, now: DateTime<Utc>) -> Vec<Badge> {
    state.points = state.points.saturating_add(points_for(total));
    state.streak = next_streak(state, now);
    state.last_date = Some(now);

    let qualifies = [
        (Badge::EcoEnthusiast, state.points >= ENTHUSIAST_POINTS),
        (Badge::SevenDayStreak, state.streak >= STREAK_BADGE_DAYS),
        (Badge::LowImpactDay, level_for(total) == Level::Low),
    ];

    let earned: Vec<Badge> = qualifies
        .into_iter()
        .filter(|(badge, ok)| *ok && state.badges.insert(*badge))
        .map(|(badge, _)| badge)
        .collect();

    tracing::info!(
        "Gamification updated: {} points, streak {}, {} badges",
        state.points,
        state.streak,
        state.badges.len()
    );
    for badge in &earned {
        tracing::info!("Badge earned: {}", badge);
    }

    earned
}
