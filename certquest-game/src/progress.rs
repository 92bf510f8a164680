//! Per-player aggregate state and the only API allowed to mutate it.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::badges::{BadgeAward, BadgeCatalog, BadgeDefinition, BadgeTier};
use crate::config::ProgressionConfig;
use crate::domain::{ExamDomain, StudyMode};
use crate::events::GameEvent;
use crate::numbers::{percentage, percentage_usize, u32_to_f64};

/// Answer counters for one exam domain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DomainProgress {
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Running mean of seconds spent per answered question.
    pub average_time_per_question: f64,
    pub level_completed: bool,
}

impl DomainProgress {
    /// Accuracy as 0-100; zero when nothing has been answered.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct_answers, self.questions_answered)
    }

    fn record(&mut self, correct: bool, elapsed_secs: f64) {
        self.questions_answered = self.questions_answered.saturating_add(1);
        if correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
        } else {
            self.wrong_answers = self.wrong_answers.saturating_add(1);
        }
        let n = u32_to_f64(self.questions_answered);
        self.average_time_per_question =
            (self.average_time_per_question * (n - 1.0) + elapsed_secs) / n;
    }
}

/// Persisted player profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub player_name: String,
    pub total_score: u64,
    pub level: u32,
    pub experience_points: u32,
    /// Badge names in the order they were earned.
    #[serde(default)]
    pub badges_earned: Vec<String>,
    /// Unix time each badge was earned.
    #[serde(default)]
    pub badge_earned_at: BTreeMap<String, u64>,
    #[serde(default)]
    pub domain_progress: BTreeMap<ExamDomain, DomainProgress>,
    #[serde(default)]
    pub completed_challenges: Vec<StudyMode>,
    #[serde(default)]
    pub certificates: Vec<String>,
}

impl PlayerProgress {
    /// Fresh profile at level 1 with one zeroed entry per domain.
    #[must_use]
    pub fn new(player_name: impl Into<String>) -> Self {
        let mut progress = Self {
            player_name: player_name.into(),
            total_score: 0,
            level: 1,
            experience_points: 0,
            badges_earned: Vec::new(),
            badge_earned_at: BTreeMap::new(),
            domain_progress: BTreeMap::new(),
            completed_challenges: Vec::new(),
            certificates: Vec::new(),
        };
        progress.ensure_domains();
        progress
    }

    /// Insert missing domain entries and repair a zero level after loading.
    pub fn ensure_domains(&mut self) {
        for domain in ExamDomain::ALL {
            self.domain_progress.entry(domain).or_default();
        }
        self.level = self.level.max(1);
    }

    #[must_use]
    pub fn domain(&self, domain: ExamDomain) -> DomainProgress {
        self.domain_progress
            .get(&domain)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn has_badge(&self, name: &str) -> bool {
        self.badges_earned.iter().any(|b| b == name)
    }

    #[must_use]
    pub fn total_answered(&self) -> u32 {
        self.domain_progress
            .values()
            .map(|d| d.questions_answered)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.domain_progress
            .values()
            .map(|d| d.correct_answers)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn overall_accuracy(&self) -> f64 {
        percentage(self.total_correct(), self.total_answered())
    }
}

/// Owner of the player profile. Every mutation flows through here.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    player: PlayerProgress,
    badges: BadgeCatalog,
    config: ProgressionConfig,
    events: Vec<GameEvent>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(mut player: PlayerProgress, badges: BadgeCatalog, config: ProgressionConfig) -> Self {
        player.ensure_domains();
        Self {
            player,
            badges,
            config,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub const fn player(&self) -> &PlayerProgress {
        &self.player
    }

    #[must_use]
    pub const fn badges(&self) -> &BadgeCatalog {
        &self.badges
    }

    #[must_use]
    pub const fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Count one answer against `domain` and fold `elapsed_secs` into its running mean.
    pub fn record_answer(&mut self, domain: ExamDomain, correct: bool, elapsed_secs: f64) {
        let entry = self.player.domain_progress.entry(domain).or_default();
        entry.record(correct, elapsed_secs);
        debug!(
            "{} answer recorded for {} ({}/{})",
            if correct { "correct" } else { "wrong" },
            domain.key(),
            entry.correct_answers,
            entry.questions_answered
        );
    }

    pub fn add_score(&mut self, points: u32) {
        self.player.total_score = self.player.total_score.saturating_add(u64::from(points));
    }

    /// XP needed to leave the current level.
    #[must_use]
    pub fn xp_for_next_level(&self) -> u32 {
        self.player.level.saturating_mul(self.config.xp_per_level)
    }

    /// Add experience, levelling up while the threshold is met. Returns levels gained.
    pub fn add_experience(&mut self, xp: u32) -> u32 {
        self.player.experience_points = self.player.experience_points.saturating_add(xp);
        let mut gained = 0;
        loop {
            let needed = self.xp_for_next_level();
            if needed == 0 || self.player.experience_points < needed {
                break;
            }
            self.player.experience_points -= needed;
            self.player.level = self.player.level.saturating_add(1);
            gained += 1;
            info!("{} reached level {}", self.player.player_name, self.player.level);
            self.events.push(GameEvent::LevelUp {
                level: self.player.level,
            });
        }
        gained
    }

    /// Award a catalog badge; unknown and repeated awards change nothing.
    pub fn award_badge(&mut self, name: &str) -> BadgeAward {
        let Some(definition) = self.badges.get(name) else {
            warn!("ignoring award of unknown badge `{name}`");
            return BadgeAward::Unknown;
        };
        if self.player.has_badge(name) {
            return BadgeAward::AlreadyEarned;
        }
        let tier = definition.tier;
        self.player.badges_earned.push(name.to_string());
        self.player
            .badge_earned_at
            .insert(name.to_string(), unix_now());
        info!("badge earned: {name}");
        self.events.push(GameEvent::BadgeEarned {
            name: name.to_string(),
            tier,
        });
        BadgeAward::Awarded
    }

    /// Record a certificate; returns false if it was already held.
    pub fn award_certificate(&mut self, name: &str) -> bool {
        if self.player.certificates.iter().any(|c| c == name) {
            return false;
        }
        self.player.certificates.push(name.to_string());
        info!("certificate earned: {name}");
        self.events.push(GameEvent::CertificateEarned {
            name: name.to_string(),
        });
        true
    }

    pub fn mark_level_completed(&mut self, domain: ExamDomain) {
        self.player
            .domain_progress
            .entry(domain)
            .or_default()
            .level_completed = true;
    }

    pub fn record_challenge(&mut self, mode: StudyMode) {
        if !self.player.completed_challenges.contains(&mode) {
            self.player.completed_challenges.push(mode);
        }
    }

    #[must_use]
    pub fn earned_badges(&self) -> Vec<&BadgeDefinition> {
        self.player
            .badges_earned
            .iter()
            .filter_map(|name| self.badges.get(name))
            .collect()
    }

    #[must_use]
    pub fn badge_count_by_tier(&self, tier: BadgeTier) -> usize {
        self.earned_badges()
            .into_iter()
            .filter(|b| b.tier == tier)
            .count()
    }

    /// Earned share of the badge catalog, 0-100.
    #[must_use]
    pub fn badge_completion_percentage(&self) -> f64 {
        percentage_usize(self.earned_badges().len(), self.badges.len())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BadgeCatalog {
        BadgeCatalog::from_json(
            r#"{"badges":[
                {"name":"Cloud Novice","domain":"cloud_concepts","tier":"bronze"},
                {"name":"IAM Expert","domain":"security_and_compliance","tier":"gold"},
                {"name":"Scaling Master","domain":"technology","tier":"gold"},
                {"name":"CCP Ready!","domain":"cloud_concepts","tier":"platinum"}
            ]}"#,
        )
        .unwrap()
    }

    fn store() -> ProgressStore {
        ProgressStore::new(
            PlayerProgress::new("Ada"),
            catalog(),
            ProgressionConfig::default(),
        )
    }

    #[test]
    fn counters_stay_consistent() {
        let mut store = store();
        store.record_answer(ExamDomain::Technology, true, 4.0);
        store.record_answer(ExamDomain::Technology, false, 8.0);
        store.record_answer(ExamDomain::Technology, true, 12.0);
        let tech = store.player().domain(ExamDomain::Technology);
        assert_eq!(tech.questions_answered, 3);
        assert_eq!(tech.correct_answers + tech.wrong_answers, tech.questions_answered);
        assert!((tech.average_time_per_question - 8.0).abs() < 1e-9);
        assert!((tech.accuracy() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn experience_carries_remainder_across_levels() {
        let mut store = store();
        assert_eq!(store.xp_for_next_level(), 500);
        assert_eq!(store.add_experience(450), 0);
        // 450 + 1200 = 1650 -> level 2 after 500 (1150 left) -> level 3 after 1000 (150 left)
        assert_eq!(store.add_experience(1200), 2);
        assert_eq!(store.player().level, 3);
        assert_eq!(store.player().experience_points, 150);
        let levels: Vec<_> = store
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::LevelUp { level } => Some(level),
                _ => None,
            })
            .collect();
        assert_eq!(levels, vec![2, 3]);
    }

    #[test]
    fn badge_awards_are_idempotent() {
        let mut store = store();
        assert_eq!(store.award_badge("IAM Expert"), BadgeAward::Awarded);
        assert_eq!(store.award_badge("IAM Expert"), BadgeAward::AlreadyEarned);
        assert_eq!(store.award_badge("Imaginary"), BadgeAward::Unknown);
        assert_eq!(store.player().badges_earned, vec!["IAM Expert".to_string()]);
        assert!(store.player().badge_earned_at.contains_key("IAM Expert"));
        assert_eq!(store.drain_events().len(), 1);
    }

    #[test]
    fn badge_queries_follow_catalog() {
        let mut store = store();
        store.award_badge("IAM Expert");
        store.award_badge("Scaling Master");
        store.award_badge("Cloud Novice");
        assert_eq!(store.badge_count_by_tier(BadgeTier::Gold), 2);
        assert_eq!(store.badge_count_by_tier(BadgeTier::Platinum), 0);
        assert!((store.badge_completion_percentage() - 75.0).abs() < 1e-9);
        assert_eq!(store.earned_badges()[0].name, "IAM Expert");
    }

    #[test]
    fn loaded_profile_gains_missing_domains() {
        let json = r#"{"player_name":"Bo","total_score":10,"level":0,"experience_points":5}"#;
        let player: PlayerProgress = serde_json::from_str(json).unwrap();
        let store = ProgressStore::new(player, catalog(), ProgressionConfig::default());
        assert_eq!(store.player().domain_progress.len(), 4);
        assert_eq!(store.player().level, 1);
    }

    #[test]
    fn certificates_and_challenges_deduplicate() {
        let mut store = store();
        assert!(store.award_certificate("AWS CCP Certification Readiness"));
        assert!(!store.award_certificate("AWS CCP Certification Readiness"));
        store.record_challenge(StudyMode::FullPracticeExam);
        store.record_challenge(StudyMode::FullPracticeExam);
        assert_eq!(store.player().completed_challenges.len(), 1);
    }
}
