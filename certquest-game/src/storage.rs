//! Persisted document shapes and the repository that maps them onto a key-value store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::KeyValueStore;
use crate::constants::{LEADERBOARD_KEY, PLAYER_KEY, QUEST_KEY_PREFIX};
use crate::leaderboard::Leaderboard;
use crate::progress::PlayerProgress;
use crate::quests::{Quest, QuestManager, QuestStatus};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write `{key}`: {message}")]
    WriteFailure { key: String, message: String },
    #[error("failed to read `{key}`: {message}")]
    ReadFailure { key: String, message: String },
    #[error("stored document `{key}` is not valid: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("document `{key}` could not be serialized: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveRecord {
    pub id: String,
    pub current_count: u32,
    #[serde(default)]
    pub is_completed: bool,
}

/// Saved lifecycle state of one quest, keyed by `quest/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRecord {
    pub status: QuestStatus,
    #[serde(default)]
    pub objectives: Vec<ObjectiveRecord>,
}

impl QuestRecord {
    #[must_use]
    pub fn from_quest(quest: &Quest) -> Self {
        Self {
            status: quest.status,
            objectives: quest
                .objectives
                .iter()
                .map(|o| ObjectiveRecord {
                    id: o.id.clone(),
                    current_count: o.current_count,
                    is_completed: o.is_completed(),
                })
                .collect(),
        }
    }

    /// Saved counts; the completion flag is re-derived on restore.
    #[must_use]
    pub fn counts(&self) -> Vec<(String, u32)> {
        self.objectives
            .iter()
            .map(|o| (o.id.clone(), o.current_count))
            .collect()
    }
}

#[must_use]
pub fn quest_key(quest_id: &str) -> String {
    format!("{QUEST_KEY_PREFIX}{quest_id}")
}

/// Typed load/save over an injected [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct SaveRepository<S> {
    store: S,
}

impl<S: KeyValueStore> SaveRepository<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// # Errors
    ///
    /// Returns an error if the store fails or the document does not parse.
    pub fn load_player(&self) -> Result<Option<PlayerProgress>, StorageError> {
        self.read(PLAYER_KEY)
    }

    /// # Errors
    ///
    /// Returns `StorageError::WriteFailure` when the store rejects the write.
    pub fn save_player(&self, player: &PlayerProgress) -> Result<(), StorageError> {
        self.write(PLAYER_KEY, player)
    }

    /// # Errors
    ///
    /// Returns an error if the store fails or the record does not parse.
    pub fn load_quest(&self, quest_id: &str) -> Result<Option<QuestRecord>, StorageError> {
        self.read(&quest_key(quest_id))
    }

    /// # Errors
    ///
    /// Returns `StorageError::WriteFailure` when the store rejects the write.
    pub fn save_quest(&self, quest: &Quest) -> Result<(), StorageError> {
        self.write(&quest_key(&quest.id), &QuestRecord::from_quest(quest))
    }

    /// # Errors
    ///
    /// Returns an error if the store fails or the document does not parse.
    pub fn load_leaderboard(&self) -> Result<Option<Leaderboard>, StorageError> {
        self.read(LEADERBOARD_KEY)
    }

    /// # Errors
    ///
    /// Returns `StorageError::WriteFailure` when the store rejects the write.
    pub fn save_leaderboard(&self, board: &Leaderboard) -> Result<(), StorageError> {
        self.write(LEADERBOARD_KEY, board)
    }

    /// Write the player document and every quest record.
    ///
    /// # Errors
    ///
    /// Stops at the first failed write; earlier writes stay in place.
    pub fn save_all(&self, player: &PlayerProgress, quests: &[Quest]) -> Result<(), StorageError> {
        self.save_player(player)?;
        for quest in quests {
            self.save_quest(quest)?;
        }
        Ok(())
    }

    /// Apply saved records for every catalog quest, then reopen newly unlockable ones.
    ///
    /// Returns how many records were applied.
    ///
    /// # Errors
    ///
    /// Returns an error if any stored record cannot be read.
    pub fn restore_quests(&self, manager: &mut QuestManager) -> Result<usize, StorageError> {
        let ids: Vec<String> = manager.quests().iter().map(|q| q.id.clone()).collect();
        let mut applied = 0;
        for id in ids {
            if let Some(record) = self.load_quest(&id)? {
                if manager.restore(&id, record.status, &record.counts()) {
                    applied += 1;
                }
            }
        }
        manager.reconcile_unlocks();
        Ok(applied)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let raw = self
            .store
            .get(key)
            .map_err(|e| StorageError::ReadFailure {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        raw.map(|json| {
            serde_json::from_str(&json).map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store
            .set(key, &json)
            .map_err(|e| StorageError::WriteFailure {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        debug!("persisted `{key}` ({} bytes)", json.len());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MemoryStoreError {
    #[error("writes are disabled")]
    WritesDisabled,
}

/// In-memory store whose clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail until re-enabled.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(MemoryStoreError::WritesDisabled);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
