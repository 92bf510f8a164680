//! Exam content domains and the study modes built on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four content areas covered by the certification exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamDomain {
    CloudConcepts,
    SecurityAndCompliance,
    Technology,
    BillingAndPricing,
}

impl ExamDomain {
    /// Every content domain in dashboard order.
    pub const ALL: [Self; 4] = [
        Self::CloudConcepts,
        Self::SecurityAndCompliance,
        Self::Technology,
        Self::BillingAndPricing,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CloudConcepts => "Cloud Concepts",
            Self::SecurityAndCompliance => "Security & Compliance",
            Self::Technology => "Technology",
            Self::BillingAndPricing => "Billing & Pricing",
        }
    }

    /// Share of the real exam this domain accounts for.
    #[must_use]
    pub const fn exam_weight(self) -> f64 {
        match self {
            Self::CloudConcepts => 0.26,
            Self::SecurityAndCompliance => 0.25,
            Self::Technology => 0.33,
            Self::BillingAndPricing => 0.16,
        }
    }

    /// Stable snake_case key used in persisted documents and CLI output.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::CloudConcepts => "cloud_concepts",
            Self::SecurityAndCompliance => "security_and_compliance",
            Self::Technology => "technology",
            Self::BillingAndPricing => "billing_and_pricing",
        }
    }
}

impl fmt::Display for ExamDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a quiz session draws from: a single domain or one of the synthetic modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    Domain(ExamDomain),
    MixedChallenge,
    FullPracticeExam,
}

impl StudyMode {
    /// Content domain backing this mode, if it is a single-domain session.
    #[must_use]
    pub const fn content_domain(self) -> Option<ExamDomain> {
        match self {
            Self::Domain(domain) => Some(domain),
            Self::MixedChallenge | Self::FullPracticeExam => None,
        }
    }

    #[must_use]
    pub const fn is_synthetic(self) -> bool {
        self.content_domain().is_none()
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Domain(domain) => domain.display_name(),
            Self::MixedChallenge => "Mixed Challenge",
            Self::FullPracticeExam => "Full Practice Exam",
        }
    }
}

impl From<ExamDomain> for StudyMode {
    fn from(value: ExamDomain) -> Self {
        Self::Domain(value)
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Question and quest difficulty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}
