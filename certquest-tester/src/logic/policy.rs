use std::collections::BTreeMap;
use std::fmt;

use certquest_game::{ExamDomain, Question};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// How a simulated player performs: per-domain hit rate and answer pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyProfile {
    pub name: &'static str,
    default_accuracy: f64,
    domain_accuracy: BTreeMap<ExamDomain, f64>,
    pub min_secs: f64,
    pub max_secs: f64,
}

impl StudyProfile {
    #[must_use]
    pub fn uniform(name: &'static str, accuracy: f64) -> Self {
        Self {
            name,
            default_accuracy: accuracy.clamp(0.0, 1.0),
            domain_accuracy: BTreeMap::new(),
            min_secs: 4.0,
            max_secs: 45.0,
        }
    }

    /// A steady candidate who gets roughly three in four right.
    #[must_use]
    pub fn balanced() -> Self {
        Self::uniform("Balanced", 0.75)
    }

    /// Strong everywhere except `weak`.
    #[must_use]
    pub fn lopsided(weak: ExamDomain) -> Self {
        Self::uniform("Lopsided", 0.95).with_domain(weak, 0.2)
    }

    #[must_use]
    pub fn with_domain(mut self, domain: ExamDomain, accuracy: f64) -> Self {
        self.domain_accuracy.insert(domain, accuracy.clamp(0.0, 1.0));
        self
    }

    #[must_use]
    pub fn with_pace(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.min_secs = min_secs.min(max_secs).max(0.0);
        self.max_secs = max_secs.max(self.min_secs);
        self
    }

    #[must_use]
    pub fn accuracy_for(&self, domain: ExamDomain) -> f64 {
        self.domain_accuracy
            .get(&domain)
            .copied()
            .unwrap_or(self.default_accuracy)
    }
}

impl fmt::Display for StudyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Seeded stand-in for a human answering questions.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    profile: StudyProfile,
    rng: ChaCha20Rng,
}

impl SimulatedPlayer {
    #[must_use]
    pub fn new(profile: StudyProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub const fn profile(&self) -> &StudyProfile {
        &self.profile
    }

    /// Pick an option index and an elapsed time for `question`.
    pub fn answer(&mut self, question: &Question) -> (usize, f64) {
        let option_count = question.options.len();
        let correct = self
            .rng
            .gen_bool(self.profile.accuracy_for(question.domain));
        let selected = if correct || option_count < 2 {
            question.correct_index
        } else {
            let offset = self.rng.gen_range(1..option_count);
            (question.correct_index + offset) % option_count
        };
        let elapsed = if self.profile.max_secs > self.profile.min_secs {
            self.rng
                .gen_range(self.profile.min_secs..self.profile.max_secs)
        } else {
            self.profile.min_secs
        };
        (selected, elapsed)
    }

    /// Pick one of `len` items; used to vary quest order between iterations.
    pub fn pick(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.gen_range(0..len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certquest_game::Difficulty;

    fn question(domain: ExamDomain) -> Question {
        Question {
            id: "q".to_string(),
            prompt: "prompt".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 2,
            explanation: String::new(),
            domain,
            difficulty: Difficulty::Easy,
            tags: Vec::new(),
        }
    }

    #[test]
    fn certain_profiles_always_or_never_hit() {
        let q = question(ExamDomain::Technology);
        let mut ace = SimulatedPlayer::new(StudyProfile::uniform("Ace", 1.0), 7);
        let mut guesser = SimulatedPlayer::new(StudyProfile::uniform("Miss", 0.0), 7);
        for _ in 0..50 {
            assert_eq!(ace.answer(&q).0, 2);
            let (selected, _) = guesser.answer(&q);
            assert_ne!(selected, 2);
            assert!(selected < 4);
        }
    }

    #[test]
    fn lopsided_profile_only_overrides_the_weak_domain() {
        let profile = StudyProfile::lopsided(ExamDomain::BillingAndPricing);
        assert!((profile.accuracy_for(ExamDomain::BillingAndPricing) - 0.2).abs() < f64::EPSILON);
        assert!((profile.accuracy_for(ExamDomain::CloudConcepts) - 0.95).abs() < f64::EPSILON);
        let clamped = StudyProfile::uniform("x", 3.0);
        assert!((clamped.accuracy_for(ExamDomain::Technology) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn elapsed_times_respect_pace_and_seed() {
        let q = question(ExamDomain::CloudConcepts);
        let profile = StudyProfile::balanced().with_pace(2.0, 6.0);
        let mut first = SimulatedPlayer::new(profile.clone(), 99);
        let mut second = SimulatedPlayer::new(profile, 99);
        for _ in 0..20 {
            let a = first.answer(&q);
            assert_eq!(a, second.answer(&q));
            assert!((2.0..6.0).contains(&a.1));
        }
        let mut fixed = SimulatedPlayer::new(StudyProfile::balanced().with_pace(5.0, 5.0), 1);
        assert!((fixed.answer(&q).1 - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pick_handles_empty_lists() {
        let mut player = SimulatedPlayer::new(StudyProfile::balanced(), 3);
        assert_eq!(player.pick(0), None);
        assert!(player.pick(5).is_some_and(|i| i < 5));
    }
}
