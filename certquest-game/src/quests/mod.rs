//! Quest definitions, the validated catalog, and lifecycle orchestration.

pub mod catalog;
pub mod manager;

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::domain::{Difficulty, ExamDomain};
use crate::numbers::{percentage, u32_to_f64, usize_to_f64};

pub use catalog::QuestCatalog;
pub use manager::{ObjectiveOutcome, QuestError, QuestManager};

/// Prerequisite quest ids; most quests have zero or one.
pub type PrerequisiteList = SmallVec<[String; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    Tutorial,
    #[default]
    Learning,
    Challenge,
    HandsOn,
    Assessment,
    Story,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestStatus {
    #[default]
    Locked,
    Available,
    InProgress,
    Completed,
    /// Present in saved data but never entered by any transition.
    Failed,
}

impl QuestStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Available => "available",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Countable sub-task owned by a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub description: String,
    pub target_count: u32,
    #[serde(default)]
    pub current_count: u32,
}

impl Objective {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.current_count >= self.target_count
    }

    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        percentage(self.current_count, self.target_count)
    }

    /// Add `amount`, clamped at the target. Returns true when this call completes it.
    pub fn advance(&mut self, amount: u32) -> bool {
        let was_completed = self.is_completed();
        self.current_count = self
            .current_count
            .saturating_add(amount)
            .min(self.target_count);
        !was_completed && self.is_completed()
    }

    pub(crate) fn restore_count(&mut self, count: u32) {
        self.current_count = count.min(self.target_count);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub experience_points: u32,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub certificate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub story_context: String,
    pub domain: ExamDomain,
    #[serde(default)]
    pub quest_type: QuestType,
    #[serde(default)]
    pub status: QuestStatus,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
    #[serde(default)]
    pub prerequisites: PrerequisiteList,
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub reward: Reward,
}

impl Quest {
    /// True only when there is at least one objective and all are complete.
    #[must_use]
    pub fn all_objectives_complete(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(Objective::is_completed)
    }

    /// Mean of the objective percentages.
    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        if self.objectives.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .objectives
            .iter()
            .map(Objective::progress_percentage)
            .sum();
        total / usize_to_f64(self.objectives.len())
    }

    #[must_use]
    pub fn objective(&self, objective_id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == objective_id)
    }

    #[must_use]
    pub fn requires(&self, quest_id: &str) -> bool {
        self.prerequisites.iter().any(|p| p == quest_id)
    }

    /// Total count across objectives, used for progress bars.
    #[must_use]
    pub fn objective_totals(&self) -> (f64, f64) {
        self.objectives.iter().fold((0.0, 0.0), |(cur, tgt), o| {
            (cur + u32_to_f64(o.current_count), tgt + u32_to_f64(o.target_count))
        })
    }
}
