//! Static badge definitions. Earned state lives in [`crate::progress::PlayerProgress`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::CatalogError;
use crate::domain::ExamDomain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub domain: ExamDomain,
    pub tier: BadgeTier,
}

/// Outcome of an award attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeAward {
    Awarded,
    AlreadyEarned,
    Unknown,
}

impl BadgeAward {
    #[must_use]
    pub const fn is_new(self) -> bool {
        matches!(self, Self::Awarded)
    }
}

/// Hands-on service labs run by external simulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabService {
    S3,
    Ec2,
    Lambda,
    Iam,
}

impl LabService {
    pub const ALL: [Self; 4] = [Self::S3, Self::Ec2, Self::Lambda, Self::Iam];

    /// Badge awarded when the lab is finished.
    #[must_use]
    pub const fn badge_name(self) -> &'static str {
        match self {
            Self::S3 => "Amazon S3 Hands-On Expert",
            Self::Ec2 => "Amazon EC2 Hands-On Expert",
            Self::Lambda => "AWS Lambda Hands-On Expert",
            Self::Iam => "AWS IAM Hands-On Expert",
        }
    }

    /// Quest objective the lab stands in for, as `(quest_id, objective_id)`.
    #[must_use]
    pub const fn objective(self) -> (&'static str, &'static str) {
        match self {
            Self::S3 => ("TECH_STORAGE_001", "create_bucket"),
            Self::Ec2 => ("TECH_COMPUTE_001", "configure_instance"),
            Self::Lambda => ("TECH_LAMBDA_001", "deploy_function"),
            Self::Iam => ("SEC_IAM_001", "create_policy"),
        }
    }

    /// Experience for working through every step of the lab.
    #[must_use]
    pub const fn experience_points(self) -> u32 {
        match self {
            Self::S3 => 700,
            Self::Ec2 => 750,
            Self::Lambda => 950,
            Self::Iam => 975,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::S3 => "S3",
            Self::Ec2 => "EC2",
            Self::Lambda => "Lambda",
            Self::Iam => "IAM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BadgeCatalog {
    badges: Vec<BadgeDefinition>,
    index: HashMap<String, usize>,
}

impl BadgeCatalog {
    /// Load badge definitions from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a badge name repeats.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        #[derive(Deserialize)]
        struct Wire {
            badges: Vec<BadgeDefinition>,
        }
        let wire: Wire = serde_json::from_str(json)?;
        Self::from_definitions(wire.badges)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` when a badge name repeats.
    pub fn from_definitions(badges: Vec<BadgeDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(badges.len());
        for (position, badge) in badges.iter().enumerate() {
            if index.insert(badge.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId {
                    kind: "badge",
                    id: badge.name.clone(),
                });
            }
        }
        Ok(Self { badges, index })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BadgeDefinition> {
        self.index.get(name).map(|&i| &self.badges[i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn by_domain(&self, domain: ExamDomain) -> impl Iterator<Item = &BadgeDefinition> {
        self.badges.iter().filter(move |b| b.domain == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.badges.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.badges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}
