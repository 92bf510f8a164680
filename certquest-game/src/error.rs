use thiserror::Error;

use crate::bank::BankError;
use crate::config::ConfigError;
use crate::data::CatalogError;
use crate::quests::QuestError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Any failure surfaced by [`crate::GameEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Quest(#[from] QuestError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),
    #[error("game data could not be loaded: {source}")]
    DataLoad {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EngineError {
    /// True for gameplay-rule rejections that leave all state unchanged.
    #[must_use]
    pub const fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::Quest(
                QuestError::QuestNotAvailable { .. } | QuestError::PrerequisiteNotMet { .. }
            ) | Self::Session(SessionError::InvalidAnswerIndex { .. })
        )
    }
}
