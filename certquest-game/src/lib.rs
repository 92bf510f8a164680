//! CertQuest Progression Engine
//!
//! Platform-agnostic core logic for the CertQuest exam-prep game: the quest graph,
//! quiz sessions and scoring, stratified question draws, and readiness analytics.
//! Rendering, input and storage media are supplied by the host.

pub mod badges;
pub mod bank;
pub mod config;
pub mod constants;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod leaderboard;
pub mod numbers;
pub mod progress;
pub mod question;
pub mod quests;
pub mod readiness;
pub mod rng;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use badges::{BadgeAward, BadgeCatalog, BadgeDefinition, BadgeTier, LabService};
pub use bank::{BankError, DrawCount, ExamDraw, QuestionBank, Shortfall};
pub use config::{ConfigError, EngineConfig, ProgressionConfig, ScoringConfig, SessionConfig};
pub use data::{CatalogError, StaticDataLoader, StaticLoadError};
pub use domain::{Difficulty, ExamDomain, StudyMode};
pub use engine::{ActionOutcome, ActionResult, GameEngine, PlayerAction};
pub use error::EngineError;
pub use events::{EventBus, GameEvent, SubscriptionId};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use progress::{DomainProgress, PlayerProgress, ProgressStore};
pub use question::{Question, QuestionData};
pub use quests::{
    Objective, ObjectiveOutcome, Quest, QuestCatalog, QuestError, QuestManager, QuestStatus,
    QuestType, Reward,
};
pub use readiness::{
    CertificationStatus, ConfidenceWeighted, DomainSnapshot, ReadinessAnalyzer, ReadinessFormula,
    ReadinessLevel, ReadinessReport, Recommendation, WeightedAccuracy,
};
pub use rng::RngBundle;
pub use session::{
    AnswerOutcome, GameSession, QuestionTimer, Rating, SessionEngine, SessionError,
    SessionSummary,
};
pub use storage::{MemoryStore, QuestRecord, SaveRepository, StorageError};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the question pool
    ///
    /// # Errors
    ///
    /// Returns an error if the question data cannot be loaded or fails validation.
    fn load_question_data(&self) -> Result<QuestionData, Self::Error>;

    /// Load the quest definitions
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or is not a valid prerequisite graph.
    fn load_quest_catalog(&self) -> Result<QuestCatalog, Self::Error>;

    /// Load the badge definitions
    ///
    /// # Errors
    ///
    /// Returns an error if the badge catalog cannot be loaded.
    fn load_badge_catalog(&self) -> Result<BadgeCatalog, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Minimal key-value contract the engine persists through.
/// Values are JSON documents.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the document stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous document
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_question_data(&self) -> Result<QuestionData, Self::Error> {
            Ok(QuestionData::empty())
        }

        fn load_quest_catalog(&self) -> Result<QuestCatalog, Self::Error> {
            Ok(QuestCatalog::empty())
        }

        fn load_badge_catalog(&self) -> Result<BadgeCatalog, Self::Error> {
            Ok(BadgeCatalog::default())
        }

        fn load_config<T>(&self, _config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let parsed = serde_json::from_str("{}")
                .or_else(|_| serde_json::from_str("null"))
                .unwrap();
            Ok(parsed)
        }
    }

    #[test]
    fn empty_content_blocks_sessions_but_not_startup() {
        let mut engine = GameEngine::initialize(
            &FixtureLoader,
            MemoryStore::new(),
            FixtureLoader.load_config("engine").unwrap(),
            1,
            "Empty",
        )
        .unwrap();
        let err = engine
            .handle(PlayerAction::StartSession {
                mode: StudyMode::FullPracticeExam,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Session(SessionError::EmptyQuestionPool { .. })
        ));
        assert!(engine.session().is_none());
        assert_eq!(engine.quests().total_count(), 0);
    }

    #[test]
    fn invalid_config_is_rejected_at_startup() {
        let mut config = EngineConfig::default();
        config.scoring.pass_accuracy = 140.0;
        let result = GameEngine::initialize(&FixtureLoader, MemoryStore::new(), config, 1, "x");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
