//! Local high-score table. Network transport is left to the host.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::constants::LEADERBOARD_CAPACITY;
use crate::progress::PlayerProgress;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub total_score: u64,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub overall_accuracy: f64,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn from_progress(player: &PlayerProgress) -> Self {
        Self {
            player_name: player.player_name.clone(),
            total_score: player.total_score,
            total_questions: player.total_answered(),
            correct_answers: player.total_correct(),
            overall_accuracy: player.overall_accuracy(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for this player, keeping only the top
    /// [`LEADERBOARD_CAPACITY`] scores.
    pub fn record(&mut self, player: &PlayerProgress) {
        let entry = LeaderboardEntry::from_progress(player);
        match self
            .entries
            .iter_mut()
            .find(|e| e.player_name == entry.player_name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        if self.entries.len() > LEADERBOARD_CAPACITY {
            self.entries.sort_by(rank_order);
            self.entries.truncate(LEADERBOARD_CAPACITY);
        }
    }

    /// Highest score first; equal scores order by name.
    #[must_use]
    pub fn ranked(&self) -> Vec<&LeaderboardEntry> {
        let mut ranked: Vec<_> = self.entries.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        ranked
    }

    /// The first `n` entries of [`Leaderboard::ranked`].
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<&LeaderboardEntry> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// 1-based position in [`Leaderboard::ranked`].
    #[must_use]
    pub fn rank_of(&self, player_name: &str) -> Option<usize> {
        self.ranked()
            .iter()
            .position(|e| e.player_name == player_name)
            .map(|i| i + 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rank_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    match b.total_score.cmp(&a.total_score) {
        Ordering::Equal => a.player_name.cmp(&b.player_name),
        other => other,
    }
}
