use std::collections::HashMap;

use log::{debug, info};
use thiserror::Error;

use crate::domain::ExamDomain;
use crate::events::GameEvent;
use crate::numbers::percentage_usize;
use crate::progress::ProgressStore;

use super::{Quest, QuestCatalog, QuestStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestError {
    #[error("quest `{quest_id}` does not exist")]
    QuestNotFound { quest_id: String },
    #[error("quest `{quest_id}` is {status} and cannot be started")]
    QuestNotAvailable {
        quest_id: String,
        status: QuestStatus,
    },
    #[error("quest `{quest_id}` requires {missing:?} to be completed first")]
    PrerequisiteNotMet {
        quest_id: String,
        missing: Vec<String>,
    },
    #[error("quest `{quest_id}` has no objective `{objective_id}`")]
    ObjectiveNotFound {
        quest_id: String,
        objective_id: String,
    },
}

/// What `complete_objective` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveOutcome {
    /// The quest was not in progress; nothing changed.
    Ignored { status: QuestStatus },
    Advanced {
        current_count: u32,
        target_count: u32,
        objective_completed: bool,
        quest_completed: bool,
    },
}

impl ObjectiveOutcome {
    #[must_use]
    pub const fn quest_completed(&self) -> bool {
        matches!(
            self,
            Self::Advanced {
                quest_completed: true,
                ..
            }
        )
    }
}

/// Sole owner of quest status and objective counters.
#[derive(Debug, Clone, Default)]
pub struct QuestManager {
    quests: Vec<Quest>,
    index: HashMap<String, usize>,
    /// Inverse prerequisite edges: quest id -> quests that list it.
    dependents: HashMap<String, Vec<usize>>,
    events: Vec<GameEvent>,
}

impl QuestManager {
    /// Seed lifecycle state from a validated catalog.
    ///
    /// Quests without prerequisites start Available; every other quest starts Locked.
    #[must_use]
    pub fn initialize_catalog(catalog: QuestCatalog) -> Self {
        let mut quests = catalog.quests;
        let mut index = HashMap::with_capacity(quests.len());
        let mut dependents: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, quest) in quests.iter_mut().enumerate() {
            quest.status = if quest.prerequisites.is_empty() {
                QuestStatus::Available
            } else {
                QuestStatus::Locked
            };
            for objective in &mut quest.objectives {
                objective.current_count = 0;
            }
            index.insert(quest.id.clone(), idx);
            for prereq in &quest.prerequisites {
                dependents.entry(prereq.clone()).or_default().push(idx);
            }
        }
        debug!("quest catalog initialized with {} quest(s)", quests.len());
        Self {
            quests,
            index,
            dependents,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn quest(&self, quest_id: &str) -> Option<&Quest> {
        self.index.get(quest_id).map(|&idx| &self.quests[idx])
    }

    /// All quests in catalog order.
    #[must_use]
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn available_quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests
            .iter()
            .filter(|q| q.status == QuestStatus::Available)
    }

    pub fn quests_by_domain(&self, domain: ExamDomain) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(move |q| q.domain == domain)
    }

    /// Quests that list `quest_id` as a prerequisite.
    #[must_use]
    pub fn unlocks_of(&self, quest_id: &str) -> Vec<&Quest> {
        self.dependents
            .get(quest_id)
            .map(|deps| deps.iter().map(|&idx| &self.quests[idx]).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.quests
            .iter()
            .filter(|q| q.status == QuestStatus::Completed)
            .count()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.quests.len()
    }

    #[must_use]
    pub fn completion_percentage(&self) -> f64 {
        percentage_usize(self.completed_count(), self.total_count())
    }

    /// Prerequisites of `quest_id` that are not yet Completed, in declaration order.
    #[must_use]
    pub fn missing_prerequisites(&self, quest_id: &str) -> Vec<String> {
        self.quest(quest_id)
            .map(|quest| {
                quest
                    .prerequisites
                    .iter()
                    .filter(|p| !self.is_completed(p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move an Available quest whose prerequisites are all Completed into progress.
    ///
    /// # Errors
    ///
    /// `QuestNotFound` for unknown ids, `PrerequisiteNotMet` when any prerequisite
    /// is incomplete, and `QuestNotAvailable` for every other non-Available status.
    /// State is unchanged on error.
    pub fn start_quest(&mut self, quest_id: &str) -> Result<(), QuestError> {
        let idx = self.position(quest_id)?;
        let status = self.quests[idx].status;
        if !matches!(status, QuestStatus::Locked | QuestStatus::Available) {
            return Err(QuestError::QuestNotAvailable {
                quest_id: quest_id.to_string(),
                status,
            });
        }
        let missing = self.missing_prerequisites(quest_id);
        if !missing.is_empty() {
            return Err(QuestError::PrerequisiteNotMet {
                quest_id: quest_id.to_string(),
                missing,
            });
        }
        if status != QuestStatus::Available {
            return Err(QuestError::QuestNotAvailable {
                quest_id: quest_id.to_string(),
                status,
            });
        }

        self.quests[idx].status = QuestStatus::InProgress;
        info!("quest started: {quest_id}");
        self.events.push(GameEvent::QuestStarted {
            quest_id: quest_id.to_string(),
        });
        Ok(())
    }

    /// Advance one objective by `amount`, completing the quest when every objective is done.
    ///
    /// Quests that are not in progress are left alone and reported as
    /// [`ObjectiveOutcome::Ignored`].
    ///
    /// # Errors
    ///
    /// `QuestNotFound` or `ObjectiveNotFound` for unknown ids.
    pub fn complete_objective(
        &mut self,
        quest_id: &str,
        objective_id: &str,
        amount: u32,
        progress: &mut ProgressStore,
    ) -> Result<ObjectiveOutcome, QuestError> {
        let idx = self.position(quest_id)?;
        let quest = &mut self.quests[idx];
        let Some(objective) = quest.objectives.iter_mut().find(|o| o.id == objective_id) else {
            return Err(QuestError::ObjectiveNotFound {
                quest_id: quest_id.to_string(),
                objective_id: objective_id.to_string(),
            });
        };
        if quest.status != QuestStatus::InProgress {
            debug!("objective {objective_id} ignored: quest {quest_id} is {}", quest.status);
            return Ok(ObjectiveOutcome::Ignored {
                status: quest.status,
            });
        }

        let objective_completed = objective.advance(amount);
        let current_count = objective.current_count;
        let target_count = objective.target_count;
        if objective_completed {
            debug!("objective completed: {quest_id}/{objective_id}");
            self.events.push(GameEvent::ObjectiveCompleted {
                quest_id: quest_id.to_string(),
                objective_id: objective_id.to_string(),
            });
        }

        let quest_completed = self.quests[idx].all_objectives_complete();
        if quest_completed {
            self.complete_quest(idx, progress);
        }
        Ok(ObjectiveOutcome::Advanced {
            current_count,
            target_count,
            objective_completed,
            quest_completed,
        })
    }

    /// Re-apply a persisted record. Returns false when the quest id is unknown.
    pub fn restore(&mut self, quest_id: &str, status: QuestStatus, counts: &[(String, u32)]) -> bool {
        let Some(&idx) = self.index.get(quest_id) else {
            debug!("ignoring saved record for unknown quest {quest_id}");
            return false;
        };
        let quest = &mut self.quests[idx];
        for (objective_id, count) in counts {
            if let Some(objective) = quest.objectives.iter_mut().find(|o| &o.id == objective_id) {
                objective.restore_count(*count);
            }
        }
        quest.status = status;
        if status == QuestStatus::Completed {
            for objective in &mut quest.objectives {
                objective.current_count = objective.target_count;
            }
        }
        true
    }

    /// Open any Locked quest whose prerequisites are all Completed. Used after a restore.
    pub fn reconcile_unlocks(&mut self) -> usize {
        let ready: Vec<usize> = (0..self.quests.len())
            .filter(|&idx| {
                let quest = &self.quests[idx];
                quest.status == QuestStatus::Locked
                    && quest.prerequisites.iter().all(|p| self.is_completed(p))
            })
            .collect();
        for &idx in &ready {
            self.quests[idx].status = QuestStatus::Available;
        }
        ready.len()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn position(&self, quest_id: &str) -> Result<usize, QuestError> {
        self.index
            .get(quest_id)
            .copied()
            .ok_or_else(|| QuestError::QuestNotFound {
                quest_id: quest_id.to_string(),
            })
    }

    fn is_completed(&self, quest_id: &str) -> bool {
        self.quest(quest_id)
            .is_some_and(|q| q.status == QuestStatus::Completed)
    }

    // Runs at most once per quest: the status check guards re-entry.
    fn complete_quest(&mut self, idx: usize, progress: &mut ProgressStore) {
        if self.quests[idx].status == QuestStatus::Completed {
            return;
        }
        self.quests[idx].status = QuestStatus::Completed;
        let quest_id = self.quests[idx].id.clone();
        let reward = self.quests[idx].reward.clone();
        info!("quest completed: {quest_id}");
        self.events.push(GameEvent::QuestCompleted {
            quest_id: quest_id.clone(),
        });

        progress.add_experience(reward.experience_points);
        for badge in &reward.badges {
            progress.award_badge(badge);
        }
        if let Some(certificate) = &reward.certificate {
            progress.award_certificate(certificate);
        }
        self.events.push(GameEvent::RewardGranted {
            quest_id: quest_id.clone(),
            experience_points: reward.experience_points,
            badges: reward.badges,
        });
        // Reward effects are published ahead of the unlocks they precede.
        self.events.extend(progress.drain_events());

        let candidates = self.dependents.get(&quest_id).cloned().unwrap_or_default();
        for dep in candidates {
            let unlockable = {
                let quest = &self.quests[dep];
                quest.status == QuestStatus::Locked
                    && quest.prerequisites.iter().all(|p| self.is_completed(p))
            };
            if unlockable {
                self.quests[dep].status = QuestStatus::Available;
                let unlocked = self.quests[dep].id.clone();
                info!("quest unlocked: {unlocked}");
                self.events.push(GameEvent::QuestUnlocked { quest_id: unlocked });
            }
        }
    }
}
