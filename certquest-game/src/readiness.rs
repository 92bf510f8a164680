//! Read-only readiness analytics over a player profile.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::badges::LabService;
use crate::config::ProgressionConfig;
use crate::constants::PRACTICE_EXAM_BADGE;
use crate::domain::ExamDomain;
use crate::numbers::{clamp_percent, u32_to_f64};
use crate::progress::{DomainProgress, PlayerProgress};

/// Aggregation of per-domain accuracy into one 0-100 readiness score.
///
/// Implementations must be non-decreasing in every domain's accuracy.
pub trait ReadinessFormula: fmt::Debug {
    fn name(&self) -> &'static str;

    fn score(&self, player: &PlayerProgress) -> f64;
}

/// Exam-weighted mean of domain accuracies; unanswered domains contribute zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedAccuracy;

impl ReadinessFormula for WeightedAccuracy {
    fn name(&self) -> &'static str {
        "weighted-accuracy"
    }

    fn score(&self, player: &PlayerProgress) -> f64 {
        let total: f64 = ExamDomain::ALL
            .iter()
            .map(|&d| d.exam_weight() * player.domain(d).accuracy())
            .sum();
        clamp_percent(total)
    }
}

/// Like [`WeightedAccuracy`], discounting domains with fewer than `full_confidence_at` answers.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceWeighted {
    pub full_confidence_at: u32,
}

impl Default for ConfidenceWeighted {
    fn default() -> Self {
        Self {
            full_confidence_at: 10,
        }
    }
}

impl ReadinessFormula for ConfidenceWeighted {
    fn name(&self) -> &'static str {
        "confidence-weighted"
    }

    fn score(&self, player: &PlayerProgress) -> f64 {
        let full = u32_to_f64(self.full_confidence_at.max(1));
        let total: f64 = ExamDomain::ALL
            .iter()
            .map(|&d| {
                let progress = player.domain(d);
                let confidence = (u32_to_f64(progress.questions_answered) / full).min(1.0);
                d.exam_weight() * progress.accuracy() * confidence
            })
            .sum();
        clamp_percent(total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    Excellent,
    Ready,
    NearlyReady,
    Learning,
    Beginning,
    StartingOut,
}

impl ReadinessLevel {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::Excellent,
            s if s >= 80.0 => Self::Ready,
            s if s >= 70.0 => Self::NearlyReady,
            s if s >= 50.0 => Self::Learning,
            s if s >= 30.0 => Self::Beginning,
            _ => Self::StartingOut,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent - Exam Ready!",
            Self::Ready => "Ready - Almost There!",
            Self::NearlyReady => "Nearly Ready - Keep Going!",
            Self::Learning => "Learning - Making Progress",
            Self::Beginning => "Beginning - Keep Studying",
            Self::StartingOut => "Starting Out - Lots to Learn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Ready,
    AlmostReady,
    NotReady,
}

impl CertificationStatus {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Ready
        } else if score >= 70.0 {
            Self::AlmostReady
        } else {
            Self::NotReady
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    MorePractice { domain: ExamDomain, answered: u32 },
    ReviewDomain { domain: ExamDomain, accuracy: f64 },
    HandsOnLab { service: LabService },
    TakePracticeExam,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MorePractice { domain, answered } => write!(
                f,
                "Practice more {} questions (only {answered} answered)",
                domain.display_name()
            ),
            Self::ReviewDomain { domain, accuracy } => write!(
                f,
                "Review {} concepts ({accuracy:.0}% accuracy)",
                domain.display_name()
            ),
            Self::HandsOnLab { service } => {
                write!(f, "Complete the {} hands-on lab", service.label())
            }
            Self::TakePracticeExam => f.write_str("Take a full practice exam"),
        }
    }
}

/// Progress-bar view of one domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub domain: ExamDomain,
    pub exam_weight: f64,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub accuracy: f64,
    pub average_time_per_question: f64,
    pub level_completed: bool,
}

impl DomainSnapshot {
    fn new(domain: ExamDomain, progress: DomainProgress) -> Self {
        Self {
            domain,
            exam_weight: domain.exam_weight(),
            questions_answered: progress.questions_answered,
            correct_answers: progress.correct_answers,
            accuracy: progress.accuracy(),
            average_time_per_question: progress.average_time_per_question,
            level_completed: progress.level_completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub formula: String,
    pub overall_readiness: f64,
    pub level: ReadinessLevel,
    pub status: CertificationStatus,
    pub total_answered: u32,
    pub overall_accuracy: f64,
    pub domains: Vec<DomainSnapshot>,
    pub weak_domains: Vec<ExamDomain>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug)]
pub struct ReadinessAnalyzer {
    config: ProgressionConfig,
    formula: Box<dyn ReadinessFormula>,
}

impl ReadinessAnalyzer {
    #[must_use]
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            config,
            formula: Box::new(WeightedAccuracy),
        }
    }

    #[must_use]
    pub fn with_formula<F: ReadinessFormula + 'static>(mut self, formula: F) -> Self {
        self.formula = Box::new(formula);
        self
    }

    #[must_use]
    pub fn formula(&self) -> &dyn ReadinessFormula {
        self.formula.as_ref()
    }

    /// Domains with enough answers to judge and accuracy below the threshold.
    #[must_use]
    pub fn weak_domains(&self, player: &PlayerProgress) -> Vec<ExamDomain> {
        ExamDomain::ALL
            .into_iter()
            .filter(|&d| {
                let progress = player.domain(d);
                progress.questions_answered >= self.config.weak_min_answers
                    && progress.accuracy() < self.config.weak_accuracy_threshold
            })
            .collect()
    }

    #[must_use]
    pub fn overall_readiness(&self, player: &PlayerProgress) -> f64 {
        clamp_percent(self.formula.score(player))
    }

    #[must_use]
    pub fn recommendations(&self, player: &PlayerProgress) -> Vec<Recommendation> {
        let mut out = Vec::new();
        for domain in ExamDomain::ALL {
            let progress = player.domain(domain);
            if progress.questions_answered < self.config.recommend_min_answers {
                out.push(Recommendation::MorePractice {
                    domain,
                    answered: progress.questions_answered,
                });
            } else if progress.accuracy() < self.config.weak_accuracy_threshold {
                out.push(Recommendation::ReviewDomain {
                    domain,
                    accuracy: progress.accuracy(),
                });
            }
        }
        out.extend(
            LabService::ALL
                .into_iter()
                .filter(|s| !player.has_badge(s.badge_name()))
                .map(|service| Recommendation::HandsOnLab { service }),
        );
        if !player.has_badge(PRACTICE_EXAM_BADGE) {
            out.push(Recommendation::TakePracticeExam);
        }
        out
    }

    #[must_use]
    pub fn dashboard(&self, player: &PlayerProgress) -> ReadinessReport {
        let overall_readiness = self.overall_readiness(player);
        ReadinessReport {
            formula: self.formula.name().to_string(),
            overall_readiness,
            level: ReadinessLevel::from_score(overall_readiness),
            status: CertificationStatus::from_score(overall_readiness),
            total_answered: player.total_answered(),
            overall_accuracy: player.overall_accuracy(),
            domains: ExamDomain::ALL
                .into_iter()
                .map(|d| DomainSnapshot::new(d, player.domain(d)))
                .collect(),
            weak_domains: self.weak_domains(player),
            recommendations: self.recommendations(player),
        }
    }
}

impl Default for ReadinessAnalyzer {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}
