//! Host-facing façade: one `initialize`, then discrete `handle` calls.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::bank::QuestionBank;
use crate::badges::{BadgeAward, BadgeCatalog, LabService};
use crate::config::EngineConfig;
use crate::domain::StudyMode;
use crate::error::EngineError;
use crate::events::{EventBus, GameEvent, SubscriptionId};
use crate::leaderboard::Leaderboard;
use crate::progress::{PlayerProgress, ProgressStore};
use crate::question::Question;
use crate::quests::{ObjectiveOutcome, QuestManager};
use crate::readiness::{ReadinessAnalyzer, ReadinessFormula, ReadinessReport};
use crate::rng::RngBundle;
use crate::session::{AnswerOutcome, GameSession, SessionEngine, SessionSummary};
use crate::storage::{SaveRepository, StorageError};
use crate::{DataLoader, KeyValueStore};

/// A discrete user action dispatched by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    StartSession { mode: StudyMode },
    SubmitAnswer { selected: usize, elapsed_secs: f64 },
    /// Answer timed by the session's own clock since the question was shown.
    SubmitTimedAnswer { selected: usize },
    EndSession,
    AbandonSession,
    StartQuest { quest_id: String },
    CompleteObjective {
        quest_id: String,
        objective_id: String,
        amount: u32,
    },
    CompleteLab { service: LabService },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    SessionStarted { mode: StudyMode, question_count: usize },
    Answered(AnswerOutcome),
    SessionEnded(SessionSummary),
    SessionAbandoned { answered: Option<usize> },
    QuestStarted { quest_id: String },
    Objective(ObjectiveOutcome),
    LabCompleted {
        service: LabService,
        award: BadgeAward,
        experience_points: u32,
        /// `None` when the loaded catalog has no matching objective.
        objective: Option<ObjectiveOutcome>,
    },
}

/// What `handle` returns: the action's result plus every notification it raised.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub result: ActionResult,
    pub events: Vec<GameEvent>,
    /// False when a state change could not be written; see [`GameEngine::pending_write`].
    pub persisted: bool,
}

pub struct GameEngine<S: KeyValueStore> {
    config: EngineConfig,
    bank: QuestionBank,
    rngs: RngBundle,
    progress: ProgressStore,
    sessions: SessionEngine,
    quests: QuestManager,
    readiness: ReadinessAnalyzer,
    leaderboard: Leaderboard,
    repository: SaveRepository<S>,
    bus: EventBus,
    pending_write: bool,
}

impl<S: KeyValueStore> GameEngine<S> {
    /// Load and validate game data, then restore the saved profile or start a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid config, unloadable or inconsistent catalogs,
    /// or saved documents that cannot be read.
    pub fn initialize<L: DataLoader>(
        loader: &L,
        store: S,
        config: EngineConfig,
        seed: u64,
        player_name: &str,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let questions = loader.load_question_data().map_err(data_load)?;
        let catalog = loader.load_quest_catalog().map_err(data_load)?;
        let badges = loader.load_badge_catalog().map_err(data_load)?;
        catalog.validate_badges(&badges)?;

        let repository = SaveRepository::new(store);
        let player = match repository.load_player()? {
            Some(saved) => {
                info!("restored profile for {}", saved.player_name);
                saved
            }
            None => {
                info!("creating new profile for {player_name}");
                PlayerProgress::new(player_name)
            }
        };
        let mut quests = QuestManager::initialize_catalog(catalog);
        let restored = repository.restore_quests(&mut quests)?;
        debug!("restored {restored} quest record(s)");
        let leaderboard = repository.load_leaderboard()?.unwrap_or_default();

        Ok(Self {
            bank: QuestionBank::new(questions),
            rngs: RngBundle::from_user_seed(seed),
            progress: ProgressStore::new(player, badges, config.progression.clone()),
            sessions: SessionEngine::new(config.scoring.clone(), config.session.clone()),
            quests,
            readiness: ReadinessAnalyzer::new(config.progression.clone()),
            leaderboard,
            repository,
            bus: EventBus::new(),
            pending_write: false,
            config,
        })
    }

    /// Apply one action, publish its events, and persist if state changed.
    ///
    /// # Errors
    ///
    /// Returns the component error for rejected actions. Rejections change nothing.
    /// A failed save is not an error: it is logged and retried on the next change.
    pub fn handle(&mut self, action: PlayerAction) -> Result<ActionOutcome, EngineError> {
        let (result, mutated) = self.dispatch(action)?;
        let mut events = self.sessions.drain_events();
        events.extend(self.quests.drain_events());
        events.extend(self.progress.drain_events());
        for event in &events {
            self.bus.publish(event);
        }
        let persisted = if mutated { self.persist() } else { !self.pending_write };
        Ok(ActionOutcome {
            result,
            events,
            persisted,
        })
    }

    fn dispatch(&mut self, action: PlayerAction) -> Result<(ActionResult, bool), EngineError> {
        let handled = match action {
            PlayerAction::StartSession { mode } => {
                let session = self.sessions.start(mode, &self.bank, &self.rngs)?;
                let question_count = session.question_count();
                (
                    ActionResult::SessionStarted {
                        mode,
                        question_count,
                    },
                    false,
                )
            }
            PlayerAction::SubmitAnswer {
                selected,
                elapsed_secs,
            } => {
                let outcome =
                    self.sessions
                        .submit_answer(selected, elapsed_secs, &mut self.progress)?;
                (ActionResult::Answered(outcome), true)
            }
            PlayerAction::SubmitTimedAnswer { selected } => {
                let elapsed_secs = self.sessions.question_elapsed_secs().unwrap_or_default();
                let outcome =
                    self.sessions
                        .submit_answer(selected, elapsed_secs, &mut self.progress)?;
                (ActionResult::Answered(outcome), true)
            }
            PlayerAction::EndSession => {
                let summary = self.sessions.end(&mut self.progress)?;
                (ActionResult::SessionEnded(summary), true)
            }
            PlayerAction::AbandonSession => {
                let answered = self.sessions.abandon().map(|s| s.current_index());
                (ActionResult::SessionAbandoned { answered }, false)
            }
            PlayerAction::StartQuest { quest_id } => {
                self.quests.start_quest(&quest_id)?;
                (ActionResult::QuestStarted { quest_id }, true)
            }
            PlayerAction::CompleteObjective {
                quest_id,
                objective_id,
                amount,
            } => {
                let outcome = self.quests.complete_objective(
                    &quest_id,
                    &objective_id,
                    amount,
                    &mut self.progress,
                )?;
                let changed = matches!(outcome, ObjectiveOutcome::Advanced { .. });
                (ActionResult::Objective(outcome), changed)
            }
            PlayerAction::CompleteLab { service } => {
                let (quest_id, objective_id) = service.objective();
                let objective = match self.quests.complete_objective(
                    quest_id,
                    objective_id,
                    1,
                    &mut self.progress,
                ) {
                    Ok(outcome) => Some(outcome),
                    Err(err) => {
                        debug!("{} lab has no objective to advance: {err}", service.label());
                        None
                    }
                };
                let experience_points = service.experience_points();
                self.progress.add_experience(experience_points);
                let award = self.progress.award_badge(service.badge_name());
                info!("{} lab completed", service.label());
                (
                    ActionResult::LabCompleted {
                        service,
                        award,
                        experience_points,
                        objective,
                    },
                    true,
                )
            }
        };
        Ok(handled)
    }

    /// Write every document now. In-memory state stays authoritative either way.
    ///
    /// # Errors
    ///
    /// Returns the first failed write; `pending_write` stays set until a save succeeds.
    pub fn save(&mut self) -> Result<(), StorageError> {
        self.leaderboard.record(self.progress.player());
        let result = self
            .repository
            .save_all(self.progress.player(), self.quests.quests())
            .and_then(|()| self.repository.save_leaderboard(&self.leaderboard));
        self.pending_write = result.is_err();
        result
    }

    fn persist(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(err) => {
                warn!("save failed, will retry on next change: {err}");
                false
            }
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Swap the readiness aggregation used by [`GameEngine::readiness`].
    pub fn set_readiness_formula<F: ReadinessFormula + 'static>(&mut self, formula: F) {
        self.readiness = std::mem::take(&mut self.readiness).with_formula(formula);
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        self.progress.player()
    }

    #[must_use]
    pub const fn progress_store(&self) -> &ProgressStore {
        &self.progress
    }

    #[must_use]
    pub const fn quests(&self) -> &QuestManager {
        &self.quests
    }

    #[must_use]
    pub const fn badges(&self) -> &BadgeCatalog {
        self.progress.badges()
    }

    #[must_use]
    pub const fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn readiness(&self) -> ReadinessReport {
        self.readiness.dashboard(self.progress.player())
    }

    #[must_use]
    pub const fn readiness_analyzer(&self) -> &ReadinessAnalyzer {
        &self.readiness
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.sessions.current_question()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&GameSession> {
        self.sessions.session()
    }

    #[must_use]
    pub const fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// True while the last save attempt failed.
    #[must_use]
    pub const fn pending_write(&self) -> bool {
        self.pending_write
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        self.repository.store()
    }
}

fn data_load<E>(err: E) -> EngineError
where
    E: std::error::Error + Send + Sync + 'static,
{
    EngineError::DataLoad {
        source: Box::new(err),
    }
}
