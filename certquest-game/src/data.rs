//! Bundled data assets and catalog validation errors.

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::DataLoader;
use crate::badges::BadgeCatalog;
use crate::config::EngineConfig;
use crate::constants::{BADGES_JSON, QUESTIONS_JSON, QUESTS_JSON};
use crate::question::QuestionData;
use crate::quests::QuestCatalog;

/// Problems found while loading or validating bundled catalogs.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("question `{question_id}` has an empty prompt")]
    EmptyPrompt { question_id: String },
    #[error("question `{question_id}` needs at least two options (got {count})")]
    TooFewOptions { question_id: String, count: usize },
    #[error("question `{question_id}` marks option {index} correct but has {option_count} options")]
    CorrectIndexOutOfRange {
        question_id: String,
        index: usize,
        option_count: usize,
    },
    #[error("quest `{quest_id}` has no objectives")]
    EmptyObjectives { quest_id: String },
    #[error("quest `{quest_id}` repeats objective `{objective_id}`")]
    DuplicateObjective {
        quest_id: String,
        objective_id: String,
    },
    #[error("objective `{objective_id}` of quest `{quest_id}` has a zero target")]
    ZeroTarget {
        quest_id: String,
        objective_id: String,
    },
    #[error("quest `{quest_id}` requires unknown quest `{prerequisite}`")]
    UnknownPrerequisite {
        quest_id: String,
        prerequisite: String,
    },
    #[error("quest `{quest_id}` is part of a prerequisite cycle")]
    PrerequisiteCycle { quest_id: String },
    #[error("quest `{quest_id}` rewards unknown badge `{badge}`")]
    UnknownBadge { quest_id: String, badge: String },
}

/// Data loader serving the assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

/// Errors raised by [`StaticDataLoader`].
#[derive(Debug, Error)]
pub enum StaticLoadError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("config `{name}` could not be parsed: {source}")]
    Config {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no bundled config named `{0}`")]
    UnknownConfig(String),
}

impl DataLoader for StaticDataLoader {
    type Error = StaticLoadError;

    fn load_question_data(&self) -> Result<QuestionData, Self::Error> {
        Ok(QuestionData::from_json(QUESTIONS_JSON)?)
    }

    fn load_quest_catalog(&self) -> Result<QuestCatalog, Self::Error> {
        Ok(QuestCatalog::from_json(QUESTS_JSON)?)
    }

    fn load_badge_catalog(&self) -> Result<BadgeCatalog, Self::Error> {
        Ok(BadgeCatalog::from_json(BADGES_JSON)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        if config_name != "engine" {
            return Err(StaticLoadError::UnknownConfig(config_name.to_string()));
        }
        let value = serde_json::to_value(EngineConfig::default()).map_err(|source| {
            StaticLoadError::Config {
                name: config_name.to_string(),
                source,
            }
        })?;
        serde_json::from_value(value).map_err(|source| StaticLoadError::Config {
            name: config_name.to_string(),
            source,
        })
    }
}
