use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::CatalogError;
use crate::domain::{Difficulty, ExamDomain};

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
    pub domain: ExamDomain,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, selected_index: usize) -> bool {
        selected_index == self.correct_index
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.prompt.trim().is_empty() {
            return Err(CatalogError::EmptyPrompt {
                question_id: self.id.clone(),
            });
        }
        if self.options.len() < 2 {
            return Err(CatalogError::TooFewOptions {
                question_id: self.id.clone(),
                count: self.options.len(),
            });
        }
        if self.correct_index >= self.options.len() {
            return Err(CatalogError::CorrectIndexOutOfRange {
                question_id: self.id.clone(),
                index: self.correct_index,
                option_count: self.options.len(),
            });
        }
        Ok(())
    }
}

/// Container for the full question pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuestionData {
    pub questions: Vec<Question>,
}

impl QuestionData {
    /// Create an empty pool (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            questions: Vec::new(),
        }
    }

    /// Load and validate the question pool from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or a record is malformed.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Build a pool from pre-parsed questions, validating every record.
    ///
    /// # Errors
    ///
    /// Returns an error if any record is malformed or ids repeat.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let data = Self { questions };
        data.validate()?;
        Ok(data)
    }

    /// Check every record and id uniqueness.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "question",
                    id: question.id.clone(),
                });
            }
            question.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn count_for(&self, domain: ExamDomain) -> usize {
        self.questions.iter().filter(|q| q.domain == domain).count()
    }
}
