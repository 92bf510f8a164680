use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::badges::BadgeCatalog;
use crate::data::CatalogError;
use crate::domain::ExamDomain;

use super::Quest;

/// Static quest definitions, validated as a graph on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestCatalog {
    pub quests: Vec<Quest>,
}

impl QuestCatalog {
    #[must_use]
    pub const fn empty() -> Self {
        Self { quests: Vec::new() }
    }

    /// Parse quest definitions from JSON and check their structure.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON, or the first
    /// structural problem reported by [`QuestCatalog::validate`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn from_quests(quests: Vec<Quest>) -> Result<Self, CatalogError> {
        let catalog = Self { quests };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check ids, objectives, prerequisite references, and that prerequisites form a DAG.
    ///
    /// # Errors
    ///
    /// Returns the first violation in catalog order.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut ids = HashSet::with_capacity(self.quests.len());
        for quest in &self.quests {
            if !ids.insert(quest.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "quest",
                    id: quest.id.clone(),
                });
            }
            validate_objectives(quest)?;
        }

        for quest in &self.quests {
            if let Some(missing) = quest
                .prerequisites
                .iter()
                .find(|p| !ids.contains(p.as_str()))
            {
                return Err(CatalogError::UnknownPrerequisite {
                    quest_id: quest.id.clone(),
                    prerequisite: missing.clone(),
                });
            }
        }

        self.check_acyclic()
    }

    /// Every badge a quest rewards must exist in `badges`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownBadge` for the first dangling reference.
    pub fn validate_badges(&self, badges: &BadgeCatalog) -> Result<(), CatalogError> {
        for quest in &self.quests {
            if let Some(badge) = quest.reward.badges.iter().find(|b| !badges.contains(b)) {
                return Err(CatalogError::UnknownBadge {
                    quest_id: quest.id.clone(),
                    badge: badge.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, quest_id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == quest_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn by_domain(&self, domain: ExamDomain) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(move |q| q.domain == domain)
    }

    // Kahn's algorithm: whatever never reaches in-degree zero sits on a cycle.
    fn check_acyclic(&self) -> Result<(), CatalogError> {
        let position: HashMap<&str, usize> = self
            .quests
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.as_str(), i))
            .collect();
        let mut in_degree: Vec<usize> = self.quests.iter().map(|q| q.prerequisites.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.quests.len()];
        for (idx, quest) in self.quests.iter().enumerate() {
            for prereq in &quest.prerequisites {
                if let Some(&p) = position.get(prereq.as_str()) {
                    dependents[p].push(idx);
                }
            }
        }

        let mut ready: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter_map(|(i, &d)| (d == 0).then_some(i))
            .collect();
        let mut visited = 0;
        while let Some(idx) = ready.pop_front() {
            visited += 1;
            for &dep in &dependents[idx] {
                in_degree[dep] -= 1;
                if in_degree[dep] == 0 {
                    ready.push_back(dep);
                }
            }
        }

        if visited == self.quests.len() {
            return Ok(());
        }
        let stuck = in_degree
            .iter()
            .position(|&d| d > 0)
            .map_or_else(String::new, |i| self.quests[i].id.clone());
        Err(CatalogError::PrerequisiteCycle { quest_id: stuck })
    }
}

fn validate_objectives(quest: &Quest) -> Result<(), CatalogError> {
    if quest.objectives.is_empty() {
        return Err(CatalogError::EmptyObjectives {
            quest_id: quest.id.clone(),
        });
    }
    let mut seen = HashSet::with_capacity(quest.objectives.len());
    for objective in &quest.objectives {
        if !seen.insert(objective.id.as_str()) {
            return Err(CatalogError::DuplicateObjective {
                quest_id: quest.id.clone(),
                objective_id: objective.id.clone(),
            });
        }
        if objective.target_count == 0 {
            return Err(CatalogError::ZeroTarget {
                quest_id: quest.id.clone(),
                objective_id: objective.id.clone(),
            });
        }
    }
    Ok(())
}
