//! Tunable engine parameters.
//!
//! Every field carries a serde default so partial JSON documents load cleanly.
//! The full-exam blueprint is not configurable; see [`crate::constants::EXAM_BLUEPRINT`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("{higher} ({higher_value:.2}) must exceed {lower} ({lower_value:.2})")]
    OrderViolation {
        higher: &'static str,
        higher_value: f64,
        lower: &'static str,
        lower_value: f64,
    },
}

/// Top-level configuration grouping every tunable subsystem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate every subsystem.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.progression.validate()?;
        self.session.validate()?;
        Ok(())
    }
}

/// Per-answer scoring and end-of-session rating thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "ScoringConfig::default_base_points")]
    pub base_points: u32,
    #[serde(default = "ScoringConfig::default_streak_step")]
    pub streak_step: u32,
    #[serde(default = "ScoringConfig::default_fast_threshold_secs")]
    pub fast_threshold_secs: f64,
    #[serde(default = "ScoringConfig::default_fast_bonus")]
    pub fast_bonus: u32,
    #[serde(default = "ScoringConfig::default_steady_threshold_secs")]
    pub steady_threshold_secs: f64,
    #[serde(default = "ScoringConfig::default_steady_bonus")]
    pub steady_bonus: u32,
    #[serde(default = "ScoringConfig::default_pass_accuracy")]
    pub pass_accuracy: f64,
    #[serde(default = "ScoringConfig::default_very_good_accuracy")]
    pub very_good_accuracy: f64,
    #[serde(default = "ScoringConfig::default_excellent_accuracy")]
    pub excellent_accuracy: f64,
}

impl ScoringConfig {
    const fn default_base_points() -> u32 {
        100
    }

    const fn default_streak_step() -> u32 {
        10
    }

    const fn default_fast_threshold_secs() -> f64 {
        10.0
    }

    const fn default_fast_bonus() -> u32 {
        20
    }

    const fn default_steady_threshold_secs() -> f64 {
        20.0
    }

    const fn default_steady_bonus() -> u32 {
        10
    }

    const fn default_pass_accuracy() -> f64 {
        70.0
    }

    const fn default_very_good_accuracy() -> f64 {
        75.0
    }

    const fn default_excellent_accuracy() -> f64 {
        90.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_points == 0 {
            return Err(ConfigError::MinViolation {
                field: "scoring.base_points",
                min: 1,
                value: 0,
            });
        }
        for (field, value) in [
            ("scoring.pass_accuracy", self.pass_accuracy),
            ("scoring.very_good_accuracy", self.very_good_accuracy),
            ("scoring.excellent_accuracy", self.excellent_accuracy),
        ] {
            check_percent(field, value)?;
        }
        check_order(
            ("scoring.excellent_accuracy", self.excellent_accuracy),
            ("scoring.very_good_accuracy", self.very_good_accuracy),
        )?;
        check_order(
            ("scoring.very_good_accuracy", self.very_good_accuracy),
            ("scoring.pass_accuracy", self.pass_accuracy),
        )?;
        if self.fast_threshold_secs.is_nan() || self.fast_threshold_secs <= 0.0 {
            return Err(ConfigError::RangeViolation {
                field: "scoring.fast_threshold_secs",
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                value: self.fast_threshold_secs,
            });
        }
        check_order(
            ("scoring.steady_threshold_secs", self.steady_threshold_secs),
            ("scoring.fast_threshold_secs", self.fast_threshold_secs),
        )
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: Self::default_base_points(),
            streak_step: Self::default_streak_step(),
            fast_threshold_secs: Self::default_fast_threshold_secs(),
            fast_bonus: Self::default_fast_bonus(),
            steady_threshold_secs: Self::default_steady_threshold_secs(),
            steady_bonus: Self::default_steady_bonus(),
            pass_accuracy: Self::default_pass_accuracy(),
            very_good_accuracy: Self::default_very_good_accuracy(),
            excellent_accuracy: Self::default_excellent_accuracy(),
        }
    }
}

/// Experience curve and readiness gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    #[serde(default = "ProgressionConfig::default_xp_per_level")]
    pub xp_per_level: u32,
    #[serde(default = "ProgressionConfig::default_weak_min_answers")]
    pub weak_min_answers: u32,
    #[serde(default = "ProgressionConfig::default_weak_accuracy_threshold")]
    pub weak_accuracy_threshold: f64,
    #[serde(default = "ProgressionConfig::default_recommend_min_answers")]
    pub recommend_min_answers: u32,
}

impl ProgressionConfig {
    const fn default_xp_per_level() -> u32 {
        500
    }

    const fn default_weak_min_answers() -> u32 {
        5
    }

    const fn default_weak_accuracy_threshold() -> f64 {
        70.0
    }

    const fn default_recommend_min_answers() -> u32 {
        10
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.xp_per_level == 0 {
            return Err(ConfigError::MinViolation {
                field: "progression.xp_per_level",
                min: 1,
                value: 0,
            });
        }
        if self.weak_min_answers == 0 {
            return Err(ConfigError::MinViolation {
                field: "progression.weak_min_answers",
                min: 1,
                value: 0,
            });
        }
        check_percent(
            "progression.weak_accuracy_threshold",
            self.weak_accuracy_threshold,
        )
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_level: Self::default_xp_per_level(),
            weak_min_answers: Self::default_weak_min_answers(),
            weak_accuracy_threshold: Self::default_weak_accuracy_threshold(),
            recommend_min_answers: Self::default_recommend_min_answers(),
        }
    }
}

/// Session sizing and in-session achievement thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Questions per single-domain session; 0 draws the whole domain pool.
    #[serde(default)]
    pub domain_question_count: usize,
    #[serde(default = "SessionConfig::default_mixed_question_count")]
    pub mixed_question_count: usize,
    #[serde(default = "SessionConfig::default_streak_badge_threshold")]
    pub streak_badge_threshold: u32,
    #[serde(default = "SessionConfig::default_speed_run_min_questions")]
    pub speed_run_min_questions: u32,
    #[serde(default = "SessionConfig::default_speed_run_limit_secs")]
    pub speed_run_limit_secs: f64,
}

impl SessionConfig {
    const fn default_mixed_question_count() -> usize {
        20
    }

    const fn default_streak_badge_threshold() -> u32 {
        10
    }

    const fn default_speed_run_min_questions() -> u32 {
        10
    }

    const fn default_speed_run_limit_secs() -> f64 {
        300.0
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mixed_question_count == 0 {
            return Err(ConfigError::MinViolation {
                field: "session.mixed_question_count",
                min: 1,
                value: 0,
            });
        }
        if self.streak_badge_threshold < 2 {
            return Err(ConfigError::MinViolation {
                field: "session.streak_badge_threshold",
                min: 2,
                value: self.streak_badge_threshold,
            });
        }
        if self.speed_run_limit_secs.is_nan() || self.speed_run_limit_secs <= 0.0 {
            return Err(ConfigError::RangeViolation {
                field: "session.speed_run_limit_secs",
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
                value: self.speed_run_limit_secs,
            });
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            domain_question_count: 0,
            mixed_question_count: Self::default_mixed_question_count(),
            streak_badge_threshold: Self::default_streak_badge_threshold(),
            speed_run_min_questions: Self::default_speed_run_min_questions(),
            speed_run_limit_secs: Self::default_speed_run_limit_secs(),
        }
    }
}

fn check_percent(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::RangeViolation {
            field,
            min: 0.0,
            max: 100.0,
            value,
        });
    }
    Ok(())
}

fn check_order(
    (higher, higher_value): (&'static str, f64),
    (lower, lower_value): (&'static str, f64),
) -> Result<(), ConfigError> {
    if higher_value <= lower_value {
        return Err(ConfigError::OrderViolation {
            higher,
            higher_value,
            lower,
            lower_value,
        });
    }
    Ok(())
}
