use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;

/// Points for one correct answer.
///
/// `streak` is the consecutive-correct count *including* this answer.
#[must_use]
pub fn points_for_correct(cfg: &ScoringConfig, streak: u32, elapsed_secs: f64) -> u32 {
    let streak_bonus = if streak > 1 {
        (streak - 1).saturating_mul(cfg.streak_step)
    } else {
        0
    };
    cfg.base_points
        .saturating_add(streak_bonus)
        .saturating_add(time_bonus(cfg, elapsed_secs))
}

#[must_use]
pub fn time_bonus(cfg: &ScoringConfig, elapsed_secs: f64) -> u32 {
    if elapsed_secs < cfg.fast_threshold_secs {
        cfg.fast_bonus
    } else if elapsed_secs < cfg.steady_threshold_secs {
        cfg.steady_bonus
    } else {
        0
    }
}

/// End-of-session rating tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    VeryGood,
    Passing,
    NeedsImprovement,
}

impl Rating {
    #[must_use]
    pub fn from_accuracy(cfg: &ScoringConfig, accuracy: f64) -> Self {
        if accuracy >= cfg.excellent_accuracy {
            Self::Excellent
        } else if accuracy >= cfg.very_good_accuracy {
            Self::VeryGood
        } else if accuracy >= cfg.pass_accuracy {
            Self::Passing
        } else {
            Self::NeedsImprovement
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Passing => "Passing",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_in_a_row_answered_fast_scores_140() {
        let cfg = ScoringConfig::default();
        assert_eq!(points_for_correct(&cfg, 3, 5.0), 140);
    }

    #[test]
    fn first_correct_has_no_streak_bonus() {
        let cfg = ScoringConfig::default();
        assert_eq!(points_for_correct(&cfg, 1, 25.0), 100);
        assert_eq!(points_for_correct(&cfg, 1, 15.0), 110);
    }

    #[test]
    fn time_bonus_boundaries_are_exclusive() {
        let cfg = ScoringConfig::default();
        assert_eq!(time_bonus(&cfg, 9.99), 20);
        assert_eq!(time_bonus(&cfg, 10.0), 10);
        assert_eq!(time_bonus(&cfg, 20.0), 0);
    }

    #[test]
    fn rating_tiers() {
        let cfg = ScoringConfig::default();
        assert_eq!(Rating::from_accuracy(&cfg, 90.0), Rating::Excellent);
        assert_eq!(Rating::from_accuracy(&cfg, 80.0), Rating::VeryGood);
        assert_eq!(Rating::from_accuracy(&cfg, 70.0), Rating::Passing);
        assert_eq!(Rating::from_accuracy(&cfg, 69.9), Rating::NeedsImprovement);
    }
}
