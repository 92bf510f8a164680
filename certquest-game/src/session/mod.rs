//! Quiz session state machine: draw, answer, score, and close out.

pub mod scoring;
pub mod timer;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bank::{BankError, DrawCount, QuestionBank};
use crate::config::{ScoringConfig, SessionConfig};
use crate::constants::{PERFECT_SCORE_BADGE, SPEED_RUNNER_BADGE, STREAK_MASTER_BADGE};
use crate::domain::{ExamDomain, StudyMode};
use crate::events::GameEvent;
use crate::numbers::{percentage, sanitize_seconds, usize_to_u32};
use crate::progress::ProgressStore;
use crate::question::Question;
use crate::rng::RngBundle;

pub use scoring::{Rating, points_for_correct, time_bonus};
pub use timer::QuestionTimer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("answer index {index} is out of range for {option_count} options")]
    InvalidAnswerIndex { index: usize, option_count: usize },
    #[error("no questions available for {mode}")]
    EmptyQuestionPool { mode: StudyMode },
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error("no quiz session is active")]
    NoActiveSession,
    #[error("every question in this session has already been answered")]
    SessionAlreadyComplete,
}

/// One in-flight quiz. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    mode: StudyMode,
    questions: Vec<Question>,
    current_index: usize,
    correct_answers: u32,
    consecutive_correct: u32,
    best_streak: u32,
    total_time_secs: f64,
    score: u64,
    shown: QuestionTimer,
}

impl GameSession {
    fn new(mode: StudyMode, questions: Vec<Question>) -> Self {
        Self {
            mode,
            questions,
            current_index: 0,
            correct_answers: 0,
            consecutive_correct: 0,
            best_streak: 0,
            total_time_secs: 0.0,
            score: 0,
            shown: QuestionTimer::start(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> StudyMode {
        self.mode
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub const fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub const fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    #[must_use]
    pub const fn total_time_secs(&self) -> f64 {
        self.total_time_secs
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Seconds since the current question was put on screen.
    #[must_use]
    pub fn question_elapsed_secs(&self) -> f64 {
        self.shown.elapsed_secs()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    /// Accuracy over every drawn question, answered or not.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        percentage(self.correct_answers, usize_to_u32(self.questions.len()))
    }
}

/// Result of a single submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub question_id: String,
    pub domain: ExamDomain,
    pub correct: bool,
    pub correct_index: usize,
    pub points: u32,
    pub streak: u32,
    pub explanation: String,
    pub session_complete: bool,
}

/// Summary handed back when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mode: StudyMode,
    pub question_count: usize,
    pub answered: usize,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub rating: Rating,
    pub passed: bool,
    pub session_score: u64,
    pub best_streak: u32,
    pub total_time_secs: f64,
    pub badges_awarded: Vec<String>,
}

/// Drives at most one [`GameSession`] at a time.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    scoring: ScoringConfig,
    config: SessionConfig,
    active: Option<GameSession>,
    events: Vec<GameEvent>,
}

impl SessionEngine {
    #[must_use]
    pub const fn new(scoring: ScoringConfig, config: SessionConfig) -> Self {
        Self {
            scoring,
            config,
            active: None,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub const fn session(&self) -> Option<&GameSession> {
        self.active.as_ref()
    }

    /// Draw questions for `mode` and open a fresh session, replacing any active one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuestionPool` if the draw is empty, or the
    /// bank's `EmptyDomainPool` for a sized draw from an empty domain.
    pub fn start(
        &mut self,
        mode: StudyMode,
        bank: &QuestionBank,
        rngs: &RngBundle,
    ) -> Result<&GameSession, SessionError> {
        let questions = match mode {
            StudyMode::Domain(domain) => {
                let count = match self.config.domain_question_count {
                    0 => DrawCount::All,
                    n => DrawCount::Exactly(n),
                };
                bank.draw_for_domain(domain, count, rngs)?
            }
            StudyMode::MixedChallenge => {
                bank.draw_mixed(DrawCount::Exactly(self.config.mixed_question_count), rngs)
            }
            StudyMode::FullPracticeExam => bank.draw_full_exam(rngs).questions,
        };
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionPool { mode });
        }
        if let Some(previous) = self.active.take() {
            debug!(
                "discarding unfinished {} session at question {}",
                previous.mode.label(),
                previous.current_index
            );
        }
        info!("{} session started with {} question(s)", mode.label(), questions.len());
        self.events.push(GameEvent::SessionStarted {
            mode,
            question_count: questions.len(),
        });
        Ok(self.active.insert(GameSession::new(mode, questions)))
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.active.as_ref().and_then(GameSession::current_question)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.active.as_ref().is_some_and(GameSession::is_complete)
    }

    #[must_use]
    pub fn question_elapsed_secs(&self) -> Option<f64> {
        self.active.as_ref().map(GameSession::question_elapsed_secs)
    }

    /// Score an answer to the current question and record it against its domain.
    ///
    /// Negative or non-finite `elapsed_secs` are treated as zero.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidAnswerIndex` for an out-of-range option,
    /// leaving all state untouched, or a lifecycle error when no question is pending.
    pub fn submit_answer(
        &mut self,
        selected_index: usize,
        elapsed_secs: f64,
        progress: &mut ProgressStore,
    ) -> Result<AnswerOutcome, SessionError> {
        let session = self.active.as_mut().ok_or(SessionError::NoActiveSession)?;
        let question = session
            .current_question()
            .ok_or(SessionError::SessionAlreadyComplete)?;
        if selected_index >= question.option_count() {
            return Err(SessionError::InvalidAnswerIndex {
                index: selected_index,
                option_count: question.option_count(),
            });
        }

        let elapsed = sanitize_seconds(elapsed_secs);
        let correct = question.is_correct(selected_index);
        let question_id = question.id.clone();
        let domain = question.domain;
        let correct_index = question.correct_index;
        let explanation = question.explanation.clone();

        let points = if correct {
            session.correct_answers = session.correct_answers.saturating_add(1);
            session.consecutive_correct = session.consecutive_correct.saturating_add(1);
            session.best_streak = session.best_streak.max(session.consecutive_correct);
            points_for_correct(&self.scoring, session.consecutive_correct, elapsed)
        } else {
            session.consecutive_correct = 0;
            0
        };
        session.score = session.score.saturating_add(u64::from(points));
        session.total_time_secs += elapsed;
        session.current_index += 1;
        session.shown = QuestionTimer::start();

        progress.add_score(points);
        progress.record_answer(domain, correct, elapsed);
        if correct && session.consecutive_correct == self.config.streak_badge_threshold {
            progress.award_badge(STREAK_MASTER_BADGE);
        }

        debug!(
            "answer to {question_id}: correct={correct} points={points} streak={}",
            session.consecutive_correct
        );
        Ok(AnswerOutcome {
            question_id,
            domain,
            correct,
            correct_index,
            points,
            streak: session.consecutive_correct,
            explanation,
            session_complete: session.is_complete(),
        })
    }

    /// Close the active session, rate it, and apply completion effects.
    ///
    /// Ending early is allowed; accuracy still divides by the drawn question count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` if nothing is running.
    pub fn end(&mut self, progress: &mut ProgressStore) -> Result<SessionSummary, SessionError> {
        let session = self.active.take().ok_or(SessionError::NoActiveSession)?;
        let accuracy = session.accuracy();
        let rating = Rating::from_accuracy(&self.scoring, accuracy);
        let passed = accuracy >= self.scoring.pass_accuracy;
        let answered = session.current_index;

        if passed {
            match session.mode {
                StudyMode::Domain(domain) => progress.mark_level_completed(domain),
                mode => progress.record_challenge(mode),
            }
        }

        let mut badges_awarded = Vec::new();
        let perfect = usize_to_u32(session.question_count()) == session.correct_answers;
        if perfect && progress.award_badge(PERFECT_SCORE_BADGE).is_new() {
            badges_awarded.push(PERFECT_SCORE_BADGE.to_string());
        }
        let speed_run = usize_to_u32(answered) >= self.config.speed_run_min_questions
            && session.total_time_secs < self.config.speed_run_limit_secs;
        if speed_run && progress.award_badge(SPEED_RUNNER_BADGE).is_new() {
            badges_awarded.push(SPEED_RUNNER_BADGE.to_string());
        }

        info!(
            "{} session ended: {:.1}% ({})",
            session.mode.label(),
            accuracy,
            rating.label()
        );
        self.events.push(GameEvent::SessionCompleted {
            mode: session.mode,
            accuracy,
            rating,
        });
        Ok(SessionSummary {
            mode: session.mode,
            question_count: session.question_count(),
            answered,
            correct_answers: session.correct_answers,
            accuracy,
            rating,
            passed,
            session_score: session.score,
            best_streak: session.best_streak,
            total_time_secs: session.total_time_secs,
            badges_awarded,
        })
    }

    /// Drop the active session. Per-answer progress already recorded stays.
    pub fn abandon(&mut self) -> Option<GameSession> {
        let dropped = self.active.take();
        if let Some(session) = &dropped {
            info!(
                "{} session abandoned after {} answer(s)",
                session.mode.label(),
                session.current_index
            );
        }
        dropped
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::BadgeCatalog;
    use crate::config::ProgressionConfig;
    use crate::domain::Difficulty;
    use crate::progress::PlayerProgress;
    use crate::question::QuestionData;

    fn question(id: &str, domain: ExamDomain) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 2,
            explanation: format!("because {id}"),
            domain,
            difficulty: Difficulty::Easy,
            tags: Vec::new(),
        }
    }

    fn bank(domain: ExamDomain, count: usize) -> QuestionBank {
        QuestionBank::new(QuestionData {
            questions: (0..count)
                .map(|i| question(&format!("q{i}"), domain))
                .collect(),
        })
    }

    fn progress() -> ProgressStore {
        let badges = BadgeCatalog::from_json(
            r#"{"badges":[
                {"name":"Perfect Score","domain":"cloud_concepts","tier":"gold"},
                {"name":"Speed Runner","domain":"cloud_concepts","tier":"silver"},
                {"name":"Streak Master","domain":"cloud_concepts","tier":"gold"}
            ]}"#,
        )
        .unwrap();
        ProgressStore::new(PlayerProgress::new("Tess"), badges, ProgressionConfig::default())
    }

    fn engine() -> SessionEngine {
        SessionEngine::new(ScoringConfig::default(), SessionConfig::default())
    }

    #[test]
    fn streak_and_time_bonuses_accumulate() {
        let bank = bank(ExamDomain::Technology, 4);
        let rngs = RngBundle::from_user_seed(1);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::Domain(ExamDomain::Technology), &bank, &rngs)
            .unwrap();

        let first = engine.submit_answer(2, 5.0, &mut progress).unwrap();
        let second = engine.submit_answer(2, 15.0, &mut progress).unwrap();
        let third = engine.submit_answer(2, 5.0, &mut progress).unwrap();
        assert_eq!(first.points, 120);
        assert_eq!(second.points, 120);
        assert_eq!(third.points, 140);
        assert_eq!(third.streak, 3);

        let miss = engine.submit_answer(0, 1.0, &mut progress).unwrap();
        assert!(!miss.correct);
        assert_eq!(miss.points, 0);
        assert_eq!(miss.streak, 0);
        assert!(miss.session_complete);
        assert_eq!(progress.player().total_score, 380);
    }

    #[test]
    fn invalid_index_leaves_state_untouched() {
        let bank = bank(ExamDomain::BillingAndPricing, 2);
        let rngs = RngBundle::from_user_seed(2);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::Domain(ExamDomain::BillingAndPricing), &bank, &rngs)
            .unwrap();
        let before = engine.session().cloned();
        let err = engine.submit_answer(4, 3.0, &mut progress).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidAnswerIndex {
                index: 4,
                option_count: 4
            }
        );
        assert_eq!(engine.session().cloned(), before);
        assert_eq!(progress.player().total_answered(), 0);
    }

    #[test]
    fn question_clock_runs_only_with_a_session() {
        let bank = bank(ExamDomain::Technology, 2);
        let rngs = RngBundle::from_user_seed(4);
        let mut engine = engine();
        let mut progress = progress();
        assert_eq!(engine.question_elapsed_secs(), None);
        engine
            .start(StudyMode::Domain(ExamDomain::Technology), &bank, &rngs)
            .unwrap();
        let elapsed = engine.question_elapsed_secs().unwrap();
        assert!((0.0..60.0).contains(&elapsed));
        engine.submit_answer(0, elapsed, &mut progress).unwrap();
        assert!(engine.question_elapsed_secs().is_some_and(|s| s < 60.0));
        engine.end(&mut progress).unwrap();
        assert_eq!(engine.question_elapsed_secs(), None);
    }

    #[test]
    fn empty_pool_blocks_start() {
        let bank = bank(ExamDomain::Technology, 3);
        let rngs = RngBundle::from_user_seed(3);
        let mut engine = engine();
        let err = engine
            .start(StudyMode::Domain(ExamDomain::CloudConcepts), &bank, &rngs)
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::EmptyQuestionPool {
                mode: StudyMode::Domain(ExamDomain::CloudConcepts)
            }
        );
        assert!(engine.session().is_none());
        let empty = QuestionBank::default();
        assert!(matches!(
            engine.start(StudyMode::FullPracticeExam, &empty, &rngs),
            Err(SessionError::EmptyQuestionPool { .. })
        ));
    }

    #[test]
    fn submitting_past_the_end_is_rejected() {
        let bank = bank(ExamDomain::Technology, 1);
        let rngs = RngBundle::from_user_seed(4);
        let mut engine = engine();
        let mut progress = progress();
        assert_eq!(
            engine.submit_answer(0, 1.0, &mut progress),
            Err(SessionError::NoActiveSession)
        );
        engine
            .start(StudyMode::Domain(ExamDomain::Technology), &bank, &rngs)
            .unwrap();
        engine.submit_answer(2, 1.0, &mut progress).unwrap();
        assert!(engine.is_complete());
        assert!(engine.current_question().is_none());
        assert_eq!(
            engine.submit_answer(2, 1.0, &mut progress),
            Err(SessionError::SessionAlreadyComplete)
        );
    }

    #[test]
    fn perfect_fast_session_awards_achievements() {
        let bank = bank(ExamDomain::CloudConcepts, 10);
        let rngs = RngBundle::from_user_seed(5);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::Domain(ExamDomain::CloudConcepts), &bank, &rngs)
            .unwrap();
        for _ in 0..10 {
            engine.submit_answer(2, 3.0, &mut progress).unwrap();
        }
        assert!(progress.player().has_badge(STREAK_MASTER_BADGE));
        let summary = engine.end(&mut progress).unwrap();
        assert_eq!(summary.rating, Rating::Excellent);
        assert_eq!(summary.best_streak, 10);
        assert_eq!(
            summary.badges_awarded,
            vec![PERFECT_SCORE_BADGE.to_string(), SPEED_RUNNER_BADGE.to_string()]
        );
        assert!(progress.player().domain(ExamDomain::CloudConcepts).level_completed);
    }

    #[test]
    fn early_end_divides_by_drawn_count() {
        let bank = bank(ExamDomain::Technology, 10);
        let rngs = RngBundle::from_user_seed(6);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::Domain(ExamDomain::Technology), &bank, &rngs)
            .unwrap();
        for _ in 0..5 {
            engine.submit_answer(2, 30.0, &mut progress).unwrap();
        }
        let summary = engine.end(&mut progress).unwrap();
        assert_eq!(summary.answered, 5);
        assert!((summary.accuracy - 50.0).abs() < 1e-9);
        assert!(!summary.passed);
        assert!(summary.badges_awarded.is_empty());
        assert!(!progress.player().domain(ExamDomain::Technology).level_completed);
        assert_eq!(engine.end(&mut progress), Err(SessionError::NoActiveSession));
    }

    #[test]
    fn synthetic_session_records_challenge() {
        let bank = bank(ExamDomain::SecurityAndCompliance, 5);
        let rngs = RngBundle::from_user_seed(7);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::MixedChallenge, &bank, &rngs)
            .unwrap();
        assert_eq!(engine.session().map(GameSession::question_count), Some(5));
        while !engine.is_complete() {
            engine.submit_answer(2, 12.0, &mut progress).unwrap();
        }
        let summary = engine.end(&mut progress).unwrap();
        assert!(summary.passed);
        assert_eq!(
            progress.player().completed_challenges,
            vec![StudyMode::MixedChallenge]
        );
        assert_eq!(
            progress
                .player()
                .domain(ExamDomain::SecurityAndCompliance)
                .questions_answered,
            5
        );
    }

    #[test]
    fn abandon_keeps_recorded_answers() {
        let bank = bank(ExamDomain::Technology, 3);
        let rngs = RngBundle::from_user_seed(8);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::Domain(ExamDomain::Technology), &bank, &rngs)
            .unwrap();
        engine.submit_answer(2, 4.0, &mut progress).unwrap();
        assert!(engine.abandon().is_some());
        assert!(engine.session().is_none());
        assert_eq!(progress.player().total_answered(), 1);
        let kinds: Vec<_> = engine.drain_events();
        assert!(matches!(kinds.as_slice(), [GameEvent::SessionStarted { question_count: 3, .. }]));
    }

    #[test]
    fn negative_elapsed_counts_as_instant() {
        let bank = bank(ExamDomain::Technology, 2);
        let rngs = RngBundle::from_user_seed(9);
        let mut engine = engine();
        let mut progress = progress();
        engine
            .start(StudyMode::Domain(ExamDomain::Technology), &bank, &rngs)
            .unwrap();
        let outcome = engine.submit_answer(2, -4.0, &mut progress).unwrap();
        assert_eq!(outcome.points, 120);
        let tech = progress.player().domain(ExamDomain::Technology);
        assert!(tech.average_time_per_question.abs() < f64::EPSILON);
    }
}
