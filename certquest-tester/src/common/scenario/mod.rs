use anyhow::Result;

use crate::logic::game_tester::{GameTester, HarnessEngine, SaveSlot};

pub mod progression;
pub mod study;

/// Per-iteration inputs handed to a scenario body.
#[derive(Debug, Clone)]
pub struct ScenarioCtx<'a> {
    pub key: &'static str,
    pub seed: u64,
    pub tester: &'a GameTester,
}

impl ScenarioCtx<'_> {
    /// A fresh save slot plus an engine booted on it.
    pub fn boot_fresh(&self, player_name: &str) -> Result<(SaveSlot, HarnessEngine)> {
        let slot = self.tester.fresh_slot(self.key, self.seed)?;
        let engine = self.tester.boot(slot.clone(), self.seed, player_name)?;
        Ok((slot, engine))
    }
}

/// Runs one iteration and returns a one-line note for verbose output.
pub type ScenarioCheck = fn(&ScenarioCtx<'_>) -> Result<String>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    check: ScenarioCheck,
}

impl TestScenario {
    #[must_use]
    pub const fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        check: ScenarioCheck,
    ) -> Self {
        Self {
            key,
            name,
            description,
            check,
        }
    }

    pub fn run(&self, ctx: &ScenarioCtx<'_>) -> Result<String> {
        (self.check)(ctx)
    }
}

pub const SCENARIOS: [TestScenario; 5] = [
    TestScenario::new(
        "smoke",
        "Smoke Test",
        "One domain study session end to end",
        study::smoke,
    ),
    TestScenario::new(
        "full-exam",
        "Full Practice Exam",
        "Stratified 60-question draw and a complete exam run",
        study::full_exam,
    ),
    TestScenario::new(
        "quest-chain",
        "Quest Chain",
        "Play the whole quest graph, checking prerequisite gating",
        progression::quest_chain,
    ),
    TestScenario::new(
        "weak-domains",
        "Weak Domain Detection",
        "A lopsided player is flagged in exactly their weak domain",
        study::weak_domains,
    ),
    TestScenario::new(
        "persistence-roundtrip",
        "Persistence Round Trip",
        "Saved progress and quest state survive an engine restart",
        progression::persistence_roundtrip,
    ),
];

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "exam" | "full-practice-exam" => "full-exam",
        "quests" => "quest-chain",
        "weak" => "weak-domains",
        "persistence" | "roundtrip" => "persistence-roundtrip",
        other => return SCENARIOS.iter().find(|s| s.key == other).copied(),
    };
    SCENARIOS.iter().find(|s| s.key == key).copied()
}

pub fn list_scenarios() -> impl Iterator<Item = (&'static str, &'static str)> {
    SCENARIOS.iter().map(|s| (s.key, s.description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_knows_aliases() {
        assert_eq!(get_scenario("SMOKE").map(|s| s.key), Some("smoke"));
        assert_eq!(get_scenario("exam").map(|s| s.key), Some("full-exam"));
        assert_eq!(
            get_scenario("roundtrip").map(|s| s.key),
            Some("persistence-roundtrip")
        );
        assert!(get_scenario("vehicle-system").is_none());
    }

    #[test]
    fn every_listed_scenario_resolves() {
        let keys: Vec<_> = list_scenarios().map(|(key, _)| key).collect();
        assert_eq!(keys.len(), 5);
        for key in keys {
            assert!(get_scenario(key).is_some(), "{key}");
        }
    }
}
