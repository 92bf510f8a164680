//! Fixed gameplay constants shared across modules.

use crate::domain::ExamDomain;

/// Stratified full practice exam blueprint: questions drawn per domain, in draw order.
pub const EXAM_BLUEPRINT: [(ExamDomain, usize); 4] = [
    (ExamDomain::Technology, 17),
    (ExamDomain::CloudConcepts, 17),
    (ExamDomain::SecurityAndCompliance, 16),
    (ExamDomain::BillingAndPricing, 10),
];

/// Total number of questions in a full practice exam.
pub const EXAM_QUESTION_COUNT: usize = 60;

pub const STREAK_MASTER_BADGE: &str = "Streak Master";
pub const PERFECT_SCORE_BADGE: &str = "Perfect Score";
pub const SPEED_RUNNER_BADGE: &str = "Speed Runner";
pub const PRACTICE_EXAM_BADGE: &str = "Practice Exam Complete";

/// Persistence keys for the player and leaderboard documents.
pub const PLAYER_KEY: &str = "player";
pub const LEADERBOARD_KEY: &str = "leaderboard";
/// Entries kept in the persisted leaderboard.
pub const LEADERBOARD_CAPACITY: usize = 100;
pub const QUEST_KEY_PREFIX: &str = "quest/";

/// Bundled data assets.
pub const QUESTIONS_JSON: &str = include_str!("../assets/data/questions.json");
pub const QUESTS_JSON: &str = include_str!("../assets/data/quests.json");
pub const BADGES_JSON: &str = include_str!("../assets/data/badges.json");
