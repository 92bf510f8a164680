//! Question pool and the sampling operations sessions draw from.

use log::{debug, warn};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::EXAM_BLUEPRINT;
use crate::domain::ExamDomain;
use crate::question::{Question, QuestionData};
use crate::rng::RngBundle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("no questions available for {domain}")]
    EmptyDomainPool { domain: ExamDomain },
}

/// How many questions a draw should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawCount {
    /// The whole filtered pool, shuffled.
    #[default]
    All,
    /// At most this many questions; zero behaves like [`DrawCount::All`].
    Exactly(usize),
}

impl DrawCount {
    /// Map a signed request onto a draw count, treating `count <= 0` as the whole pool.
    #[must_use]
    pub fn from_signed(count: i64) -> Self {
        usize::try_from(count)
            .ok()
            .filter(|n| *n > 0)
            .map_or(Self::All, Self::Exactly)
    }

    const fn limit(self) -> Option<usize> {
        match self {
            Self::Exactly(n) if n > 0 => Some(n),
            Self::Exactly(_) | Self::All => None,
        }
    }
}

/// A domain that could not fill its full-exam quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub domain: ExamDomain,
    pub wanted: usize,
    pub available: usize,
}

/// Result of the stratified full-exam draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamDraw {
    pub questions: Vec<Question>,
    pub shortfall: Vec<Shortfall>,
}

impl ExamDraw {
    #[must_use]
    pub fn count_for(&self, domain: ExamDomain) -> usize {
        self.questions.iter().filter(|q| q.domain == domain).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shortfall.is_empty()
    }
}

/// Domain-tagged question pool.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(data: QuestionData) -> Self {
        Self {
            questions: data.questions,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn pool_size(&self, domain: ExamDomain) -> usize {
        self.questions.iter().filter(|q| q.domain == domain).count()
    }

    /// Shuffle the questions of one domain and keep up to `count` of them.
    ///
    /// # Errors
    ///
    /// Returns `BankError::EmptyDomainPool` when a positive count is requested
    /// from a domain with no questions.
    pub fn draw_for_domain(
        &self,
        domain: ExamDomain,
        count: DrawCount,
        rngs: &RngBundle,
    ) -> Result<Vec<Question>, BankError> {
        let mut pool = self.filtered(domain);
        if pool.is_empty() && count.limit().is_some() {
            return Err(BankError::EmptyDomainPool { domain });
        }
        pool.shuffle(&mut *rngs.domain_draw());
        truncate(&mut pool, count);
        debug!("drew {} {} question(s)", pool.len(), domain.key());
        Ok(pool)
    }

    /// Shuffle the entire pool across all domains and keep up to `count`.
    #[must_use]
    pub fn draw_mixed(&self, count: DrawCount, rngs: &RngBundle) -> Vec<Question> {
        let mut pool = self.questions.clone();
        pool.shuffle(&mut *rngs.mixed_draw());
        truncate(&mut pool, count);
        debug!("drew {} mixed question(s)", pool.len());
        pool
    }

    /// Stratified practice exam following [`EXAM_BLUEPRINT`].
    ///
    /// Domains with too few questions contribute what they have and are
    /// reported in [`ExamDraw::shortfall`].
    #[must_use]
    pub fn draw_full_exam(&self, rngs: &RngBundle) -> ExamDraw {
        let mut questions = Vec::new();
        let mut shortfall = Vec::new();
        for (domain, wanted) in EXAM_BLUEPRINT {
            let mut pool = self.filtered(domain);
            pool.shuffle(&mut *rngs.exam_draw());
            if pool.len() < wanted {
                warn!(
                    "full exam short on {}: wanted {wanted}, have {}",
                    domain.key(),
                    pool.len()
                );
                shortfall.push(Shortfall {
                    domain,
                    wanted,
                    available: pool.len(),
                });
            }
            pool.truncate(wanted);
            questions.extend(pool);
        }
        debug!("drew full exam with {} question(s)", questions.len());
        ExamDraw {
            questions,
            shortfall,
        }
    }

    fn filtered(&self, domain: ExamDomain) -> Vec<Question> {
        self.questions
            .iter()
            .filter(|q| q.domain == domain)
            .cloned()
            .collect()
    }
}

fn truncate(pool: &mut Vec<Question>, count: DrawCount) {
    if let Some(limit) = count.limit() {
        pool.truncate(limit);
    }
}
