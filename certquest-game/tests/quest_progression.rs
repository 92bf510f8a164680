use std::collections::BTreeSet;

use certquest_game::constants::{BADGES_JSON, QUESTS_JSON};
use certquest_game::{
    BadgeCatalog, ObjectiveOutcome, PlayerProgress, ProgressStore, ProgressionConfig,
    QuestCatalog, QuestError, QuestManager, QuestStatus,
};

fn manager() -> QuestManager {
    QuestManager::initialize_catalog(QuestCatalog::from_json(QUESTS_JSON).unwrap())
}

fn progress() -> ProgressStore {
    ProgressStore::new(
        PlayerProgress::new("Sage"),
        BadgeCatalog::from_json(BADGES_JSON).unwrap(),
        ProgressionConfig::default(),
    )
}

fn status(manager: &QuestManager, id: &str) -> QuestStatus {
    manager.quest(id).map(|q| q.status).unwrap()
}

/// Start `quest_id` and fill every objective.
fn finish(manager: &mut QuestManager, progress: &mut ProgressStore, quest_id: &str) {
    manager.start_quest(quest_id).unwrap();
    let objectives: Vec<(String, u32)> = manager
        .quest(quest_id)
        .unwrap()
        .objectives
        .iter()
        .map(|o| (o.id.clone(), o.target_count))
        .collect();
    for (objective_id, target) in objectives {
        manager
            .complete_objective(quest_id, &objective_id, target, progress)
            .unwrap();
    }
}

#[test]
fn only_root_quest_can_start_on_a_fresh_catalog() {
    let ids: Vec<String> = manager().quests().iter().map(|q| q.id.clone()).collect();
    for id in ids {
        let mut fresh = manager();
        let before = status(&fresh, &id);
        let result = fresh.start_quest(&id);
        if id == "CC_INTRO_001" {
            assert_eq!(result, Ok(()));
            assert_eq!(status(&fresh, &id), QuestStatus::InProgress);
        } else {
            assert!(
                matches!(result, Err(QuestError::PrerequisiteNotMet { .. })),
                "{id}: {result:?}"
            );
            assert_eq!(status(&fresh, &id), before);
        }
    }
}

#[test]
fn incomplete_prerequisite_blocks_start_and_leaves_status() {
    let mut manager = manager();
    manager.start_quest("CC_INTRO_001").unwrap();
    let err = manager.start_quest("CC_DEPLOY_001").unwrap_err();
    assert_eq!(
        err,
        QuestError::PrerequisiteNotMet {
            quest_id: "CC_DEPLOY_001".into(),
            missing: vec!["CC_INTRO_001".into()],
        }
    );
    assert_eq!(status(&manager, "CC_DEPLOY_001"), QuestStatus::Locked);
}

#[test]
fn completion_is_idempotent_and_rewards_once() {
    let mut manager = manager();
    let mut progress = progress();
    finish(&mut manager, &mut progress, "CC_INTRO_001");
    assert_eq!(status(&manager, "CC_INTRO_001"), QuestStatus::Completed);
    assert_eq!(progress.player().experience_points, 100);
    assert!(progress.player().has_badge("Cloud Novice"));

    for _ in 0..3 {
        let outcome = manager
            .complete_objective("CC_INTRO_001", "answer_questions", 5, &mut progress)
            .unwrap();
        assert_eq!(
            outcome,
            ObjectiveOutcome::Ignored {
                status: QuestStatus::Completed
            }
        );
    }
    let quest = manager.quest("CC_INTRO_001").unwrap();
    assert!(quest.objectives.iter().all(|o| o.current_count == o.target_count));
    assert_eq!(progress.player().experience_points, 100);
    assert_eq!(progress.player().badges_earned, vec!["Cloud Novice".to_string()]);
}

#[test]
fn quest_completes_only_with_every_objective() {
    let mut manager = manager();
    let mut progress = progress();
    manager.start_quest("CC_INTRO_001").unwrap();
    let partial = manager
        .complete_objective("CC_INTRO_001", "answer_questions", 2, &mut progress)
        .unwrap();
    assert!(!partial.quest_completed());
    manager
        .complete_objective("CC_INTRO_001", "learn_cloud_basics", 1, &mut progress)
        .unwrap();
    assert_eq!(status(&manager, "CC_INTRO_001"), QuestStatus::InProgress);
    let last = manager
        .complete_objective("CC_INTRO_001", "answer_questions", 1, &mut progress)
        .unwrap();
    assert_eq!(
        last,
        ObjectiveOutcome::Advanced {
            current_count: 3,
            target_count: 3,
            objective_completed: true,
            quest_completed: true,
        }
    );
    assert!((manager.quest("CC_INTRO_001").unwrap().progress_percentage() - 100.0).abs() < 1e-9);
}

#[test]
fn scaling_quest_waits_for_all_three_branches() {
    let mut manager = manager();
    let mut progress = progress();
    let chain = [
        "CC_INTRO_001",
        "CC_DEPLOY_001",
        "CC_BENEFITS_001",
        "CC_GLOBAL_001",
        "CC_WELLARCH_001",
        "SEC_INTRO_001",
        "SEC_IAM_001",
        "SEC_ENCRYPT_001",
        "SEC_COMPLIANCE_001",
        "TECH_INTRO_001",
    ];
    for id in chain {
        finish(&mut manager, &mut progress, id);
    }
    let unlocked: BTreeSet<_> = manager
        .unlocks_of("TECH_INTRO_001")
        .iter()
        .map(|q| q.id.as_str())
        .collect();
    assert_eq!(
        unlocked,
        BTreeSet::from(["TECH_COMPUTE_001", "TECH_DATABASE_001", "TECH_STORAGE_001"])
    );

    finish(&mut manager, &mut progress, "TECH_COMPUTE_001");
    finish(&mut manager, &mut progress, "TECH_LAMBDA_001");
    finish(&mut manager, &mut progress, "TECH_STORAGE_001");
    assert_eq!(status(&manager, "TECH_SCALING_001"), QuestStatus::Locked);
    assert_eq!(
        manager.start_quest("TECH_SCALING_001"),
        Err(QuestError::PrerequisiteNotMet {
            quest_id: "TECH_SCALING_001".into(),
            missing: vec!["TECH_DATABASE_001".into()],
        })
    );
    finish(&mut manager, &mut progress, "TECH_DATABASE_001");
    assert_eq!(status(&manager, "TECH_SCALING_001"), QuestStatus::Available);
}

#[test]
fn whole_catalog_can_be_played_through() {
    let mut manager = manager();
    let mut progress = progress();
    loop {
        let Some(next) = manager.available_quests().next().map(|q| q.id.clone()) else {
            break;
        };
        finish(&mut manager, &mut progress, &next);
    }
    assert_eq!(manager.completed_count(), 20);
    assert!((manager.completion_percentage() - 100.0).abs() < 1e-9);

    let player = progress.player();
    assert_eq!(player.badges_earned.len(), 20);
    assert_eq!(
        player.certificates,
        vec!["AWS CCP Certification Readiness".to_string()]
    );
    // 6150 XP total: levels 1-4 consume 500 + 1000 + 1500 + 2000.
    assert_eq!(player.level, 5);
    assert_eq!(player.experience_points, 1150);
}

#[test]
fn unknown_ids_are_reported() {
    let mut manager = manager();
    let mut progress = progress();
    assert_eq!(
        manager.start_quest("NOPE"),
        Err(QuestError::QuestNotFound {
            quest_id: "NOPE".into()
        })
    );
    assert!(matches!(
        manager.complete_objective("NOPE", "x", 1, &mut progress),
        Err(QuestError::QuestNotFound { .. })
    ));
    assert!(matches!(
        manager.complete_objective("CC_INTRO_001", "x", 1, &mut progress),
        Err(QuestError::ObjectiveNotFound { .. })
    ));
}
