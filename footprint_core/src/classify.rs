//! Threshold classifier for footprint totals and the diet component.
//!
//! Both functions are pure: the same input always produces the same output.
//!
//! Scores are deliberately left unclamped. A total well above the High
//! threshold yields a negative score.

use crate::{Classification, DietReport, Level};
use once_cell::sync::Lazy;

/// Totals below this are Low
pub const LOW_THRESHOLD: f64 = 8.0;
/// Totals at or above this are High
pub const HIGH_THRESHOLD: f64 = 15.0;

/// Diet values below this are Low
pub const DIET_LOW_THRESHOLD: f64 = 1.0;
/// Diet values at or above this are High
pub const DIET_HIGH_THRESHOLD: f64 = 3.0;

static DIET_REPORTS: Lazy<[DietReport; 3]> = Lazy::new(|| {
    [
        diet_report(Level::Low, "Low footprint diet.", ["Plant meals", "Local produce"]),
        diet_report(
            Level::Moderate,
            "Moderate diet impact.",
            ["Reduce red meat", "Seasonal veggies"],
        ),
        diet_report(
            Level::High,
            "High diet impact.",
            ["2-3 meat meals/week", "Legumes and grains"],
        ),
    ]
});

fn diet_report(category: Level, text: &str, tips: [&str; 2]) -> DietReport {
    DietReport {
        category,
        text: text.to_string(),
        tips: tips.iter().map(|t| t.to_string()).collect(),
    }
}

/// Map a total to its level for bucketing (shared with gamification)
pub fn level_for(total: f64) -> Level {
    if total < LOW_THRESHOLD {
        Level::Low
    } else if total < HIGH_THRESHOLD {
        Level::Moderate
    } else {
        Level::High
    }
}

/// Classify a footprint total into a level, score and message
///
/// Scoring per level:
/// - Low: `100 - trunc(total / 8 * 40)`
/// - Moderate: `70 - trunc((total - 8) / 7 * 20)`
/// - High: `40 - trunc((total - 15) / 20 * 30)`
pub fn classify(total: f64) -> Classification {
    let level = level_for(total);

    // `as i32` truncates toward zero
    let (score, message) = match level {
        Level::Low => (
            100 - (total / LOW_THRESHOLD * 40.0) as i32,
            "Excellent, your footprint is low!",
        ),
        Level::Moderate => (
            70 - ((total - LOW_THRESHOLD) / 7.0 * 20.0) as i32,
            "Moderate footprint. Improve habits.",
        ),
        Level::High => (
            40 - ((total - HIGH_THRESHOLD) / 20.0 * 30.0) as i32,
            "High footprint! Reduce energy and travel.",
        ),
    };

    tracing::debug!("Classified total {} as {} (score {})", total, level, score);

    Classification {
        level,
        score,
        message: message.to_string(),
    }
}

/// Classify the diet component on its own scale
pub fn classify_diet(diet_kg: f64) -> DietReport {
    let idx = if diet_kg < DIET_LOW_THRESHOLD {
        0
    } else if diet_kg < DIET_HIGH_THRESHOLD {
        1
    } else {
        2
    };
    DIET_REPORTS[idx].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_low_example() {
        let result = classify(4.0);
        assert_eq!(result.level, Level::Low);
        assert_eq!(result.score, 80);
    }

    #[test]
    fn test_moderate_example() {
        let result = classify(10.0);
        assert_eq!(result.level, Level::Moderate);
        assert_eq!(result.score, 65);
    }

    #[test]
    fn test_high_example() {
        let result = classify(20.0);
        assert_eq!(result.level, Level::High);
        assert_eq!(result.score, 33);
    }

    #[test]
    fn test_boundaries_are_exact() {
        assert_eq!(classify(7.999).level, Level::Low);
        assert_eq!(classify(8.0).level, Level::Moderate);
        assert_eq!(classify(14.999).level, Level::Moderate);
        assert_eq!(classify(15.0).level, Level::High);
    }

    #[test]
    fn test_boundary_scores() {
        assert_eq!(classify(0.0).score, 100);
        assert_eq!(classify(8.0).score, 70);
        assert_eq!(classify(15.0).score, 40);
    }

    #[test]
    fn test_extreme_total_goes_negative() {
        // 40 - trunc(85 / 20 * 30) = 40 - 127
        let result = classify(100.0);
        assert_eq!(result.level, Level::High);
        assert_eq!(result.score, -87);
    }

    #[test]
    fn test_diet_categories() {
        let low = classify_diet(0.5);
        assert_eq!(low.category, Level::Low);
        assert_eq!(low.tips, vec!["Plant meals", "Local produce"]);

        let moderate = classify_diet(1.0);
        assert_eq!(moderate.category, Level::Moderate);
        assert_eq!(moderate.text, "Moderate diet impact.");

        let high = classify_diet(3.0);
        assert_eq!(high.category, Level::High);
        assert_eq!(high.tips, vec!["2-3 meat meals/week", "Legumes and grains"]);
    }

    proptest! {
        #[test]
        fn classify_is_pure(total in 0.0f64..1_000.0) {
            prop_assert_eq!(classify(total), classify(total));
        }

        #[test]
        fn classify_diet_is_pure(diet in 0.0f64..100.0) {
            prop_assert_eq!(classify_diet(diet), classify_diet(diet));
        }

        #[test]
        fn level_matches_thresholds(total in 0.0f64..1_000.0) {
            let level = classify(total).level;
            let expected = if total < 8.0 {
                Level::Low
            } else if total < 15.0 {
                Level::Moderate
            } else {
                Level::High
            };
            prop_assert_eq!(level, expected);
        }

        #[test]
        fn scores_stay_within_band_below_35(total in 0.0f64..35.0) {
            let result = classify(total);
            match result.level {
                Level::Low => prop_assert!(result.score > 60 && result.score <= 100),
                Level::Moderate => prop_assert!(result.score > 50 && result.score <= 70),
                Level::High => prop_assert!(result.score > 10 && result.score <= 40),
            }
        }
    }
}
