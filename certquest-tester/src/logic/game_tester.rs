use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use certquest_game::storage::MemoryStoreError;
use certquest_game::{
    ActionResult, EngineConfig, GameEngine, KeyValueStore, MemoryStore, PlayerAction,
    SessionSummary, StaticDataLoader, StudyMode,
};
use log::debug;

use crate::common::FileStore;
use crate::logic::policy::SimulatedPlayer;

/// Where one scenario iteration keeps its save documents.
#[derive(Debug, Clone)]
pub enum SaveSlot {
    Memory(MemoryStore),
    Files(FileStore),
}

#[derive(Debug, thiserror::Error)]
pub enum SaveSlotError {
    #[error(transparent)]
    Memory(#[from] MemoryStoreError),
    #[error(transparent)]
    Files(#[from] io::Error),
}

impl KeyValueStore for SaveSlot {
    type Error = SaveSlotError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        match self {
            Self::Memory(store) => Ok(store.get(key)?),
            Self::Files(store) => Ok(store.get(key)?),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        match self {
            Self::Memory(store) => Ok(store.set(key, value)?),
            Self::Files(store) => Ok(store.set(key, value)?),
        }
    }
}

pub type HarnessEngine = GameEngine<SaveSlot>;

/// Boots engines against the bundled data and drives them like a player would.
#[derive(Debug, Clone)]
pub struct GameTester {
    save_dir: Option<PathBuf>,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(save_dir: Option<PathBuf>, verbose: bool) -> Self {
        Self { save_dir, verbose }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// An empty save slot for one run. With `--save-dir` this is a fresh
    /// `<dir>/<scenario>/seed-<seed>` directory, otherwise an in-memory store.
    pub fn fresh_slot(&self, scenario_key: &str, seed: u64) -> Result<SaveSlot> {
        let Some(base) = &self.save_dir else {
            return Ok(SaveSlot::Memory(MemoryStore::new()));
        };
        let dir = base.join(scenario_key).join(format!("seed-{seed}"));
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("failed to clear {}", dir.display()))?;
        }
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
        debug!("saving run to {}", dir.display());
        Ok(SaveSlot::Files(FileStore::new(dir)))
    }

    pub fn boot(&self, slot: SaveSlot, seed: u64, player_name: &str) -> Result<HarnessEngine> {
        GameEngine::initialize(
            &StaticDataLoader,
            slot,
            EngineConfig::default(),
            seed,
            player_name,
        )
        .context("engine failed to initialize")
    }

    /// Start a session in `mode`, answer every question, and end it.
    pub fn play_session(
        &self,
        engine: &mut HarnessEngine,
        mode: StudyMode,
        player: &mut SimulatedPlayer,
    ) -> Result<SessionSummary> {
        let started = engine.handle(PlayerAction::StartSession { mode })?;
        let ActionResult::SessionStarted { question_count, .. } = started.result else {
            bail!("starting a {mode} session returned {:?}", started.result);
        };
        let mut answered = 0;
        loop {
            let Some(question) = engine.current_question() else {
                break;
            };
            let (selected, elapsed_secs) = player.answer(question);
            engine.handle(PlayerAction::SubmitAnswer {
                selected,
                elapsed_secs,
            })?;
            answered += 1;
            ensure!(
                answered <= question_count,
                "{mode} session kept serving questions past {question_count}"
            );
        }
        let ended = engine.handle(PlayerAction::EndSession)?;
        let ActionResult::SessionEnded(summary) = ended.result else {
            bail!("ending a {mode} session returned {:?}", ended.result);
        };
        if self.verbose {
            println!(
                "     ↳ {} ({}): {}/{} correct, {} pts, rating {}",
                mode,
                player.profile(),
                summary.correct_answers,
                summary.question_count,
                summary.session_score,
                summary.rating.label()
            );
        }
        Ok(summary)
    }

    /// Start `quest_id` and fill every objective. Returns whether the quest completed.
    pub fn finish_quest(&self, engine: &mut HarnessEngine, quest_id: &str) -> Result<bool> {
        engine.handle(PlayerAction::StartQuest {
            quest_id: quest_id.to_string(),
        })?;
        let remaining: Vec<(String, u32)> = engine
            .quests()
            .quest(quest_id)
            .with_context(|| format!("quest {quest_id} vanished after starting"))?
            .objectives
            .iter()
            .map(|o| (o.id.clone(), o.target_count.saturating_sub(o.current_count)))
            .collect();
        let mut completed = false;
        for (objective_id, amount) in remaining {
            let outcome = engine.handle(PlayerAction::CompleteObjective {
                quest_id: quest_id.to_string(),
                objective_id,
                amount,
            })?;
            if let ActionResult::Objective(objective) = outcome.result {
                completed |= objective.quest_completed();
            }
        }
        if self.verbose {
            println!("     ↳ quest {quest_id} completed: {completed}");
        }
        Ok(completed)
    }
}
