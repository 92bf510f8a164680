use certquest_game::{
    EngineConfig, ExamDomain, GameEngine, KeyValueStore, LabService, MemoryStore, PlayerAction,
    QuestStatus, StaticDataLoader, StudyMode,
};
use serde_json::Value;

fn boot(store: MemoryStore, name: &str) -> GameEngine<MemoryStore> {
    GameEngine::initialize(&StaticDataLoader, store, EngineConfig::default(), 99, name).unwrap()
}

fn answer_current(engine: &mut GameEngine<MemoryStore>, elapsed_secs: f64) {
    let selected = engine.current_question().map(|q| q.correct_index).unwrap();
    engine
        .handle(PlayerAction::SubmitAnswer {
            selected,
            elapsed_secs,
        })
        .unwrap();
}

#[test]
fn player_document_has_the_documented_shape() {
    let store = MemoryStore::new();
    let mut engine = boot(store.clone(), "Harper");
    engine
        .handle(PlayerAction::StartSession {
            mode: StudyMode::Domain(ExamDomain::Technology),
        })
        .unwrap();
    answer_current(&mut engine, 6.0);

    let raw = store.get("player").unwrap().unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["player_name"], "Harper");
    assert_eq!(doc["total_score"], 120);
    assert_eq!(doc["level"], 1);
    assert_eq!(doc["experience_points"], 0);
    assert!(doc["badges_earned"].is_array());
    let tech = &doc["domain_progress"]["technology"];
    assert_eq!(tech["questions_answered"], 1);
    assert_eq!(tech["correct_answers"], 1);
    assert_eq!(tech["wrong_answers"], 0);
    assert_eq!(tech["level_completed"], false);
}

#[test]
fn quest_records_restore_after_restart() {
    let store = MemoryStore::new();
    {
        let mut engine = boot(store.clone(), "Harper");
        engine
            .handle(PlayerAction::StartQuest {
                quest_id: "CC_INTRO_001".into(),
            })
            .unwrap();
        engine
            .handle(PlayerAction::CompleteObjective {
                quest_id: "CC_INTRO_001".into(),
                objective_id: "answer_questions".into(),
                amount: 2,
            })
            .unwrap();
    }
    let raw = store.get("quest/CC_INTRO_001").unwrap().unwrap();
    let record: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["status"], "in_progress");
    assert_eq!(record["objectives"][1]["id"], "answer_questions");
    assert_eq!(record["objectives"][1]["current_count"], 2);
    assert_eq!(record["objectives"][1]["is_completed"], false);

    let engine = boot(store, "Ignored");
    let quest = engine.quests().quest("CC_INTRO_001").unwrap();
    assert_eq!(quest.status, QuestStatus::InProgress);
    assert_eq!(quest.objective("answer_questions").map(|o| o.current_count), Some(2));
    assert_eq!(engine.progress().player_name, "Harper");
}

#[test]
fn tampered_records_are_clamped_and_unknown_ids_ignored() {
    let store = MemoryStore::new();
    store
        .set(
            "quest/CC_INTRO_001",
            r#"{"status":"in_progress","objectives":[
                {"id":"answer_questions","current_count":99,"is_completed":false},
                {"id":"bogus","current_count":4,"is_completed":true}
            ]}"#,
        )
        .unwrap();
    store
        .set("quest/RETIRED_QUEST", r#"{"status":"completed","objectives":[]}"#)
        .unwrap();
    let engine = boot(store, "Pat");
    let quest = engine.quests().quest("CC_INTRO_001").unwrap();
    let objective = quest.objective("answer_questions").unwrap();
    assert_eq!(objective.current_count, objective.target_count);
    assert!(objective.is_completed());
    assert!(engine.quests().quest("RETIRED_QUEST").is_none());
    assert_eq!(engine.quests().total_count(), 20);
}

#[test]
fn completed_prerequisite_in_save_reopens_dependent() {
    let store = MemoryStore::new();
    store
        .set("quest/CC_INTRO_001", r#"{"status":"completed"}"#)
        .unwrap();
    let engine = boot(store, "Pat");
    assert_eq!(
        engine.quests().quest("CC_DEPLOY_001").map(|q| q.status),
        Some(QuestStatus::Available)
    );
}

#[test]
fn write_failure_keeps_memory_authoritative_until_retry() {
    let store = MemoryStore::new();
    let mut engine = boot(store.clone(), "Robin");
    store.set_fail_writes(true);
    let outcome = engine
        .handle(PlayerAction::CompleteLab {
            service: LabService::Iam,
        })
        .unwrap();
    assert!(!outcome.persisted);
    assert!(engine.pending_write());
    assert!(engine.progress().has_badge("AWS IAM Hands-On Expert"));
    assert!(store.get("player").unwrap().is_none());

    store.set_fail_writes(false);
    engine
        .handle(PlayerAction::CompleteLab {
            service: LabService::Ec2,
        })
        .unwrap();
    assert!(!engine.pending_write());
    let raw = store.get("player").unwrap().unwrap();
    assert!(raw.contains("AWS IAM Hands-On Expert"));
    assert!(raw.contains("Amazon EC2 Hands-On Expert"));
}

#[test]
fn leaderboard_is_shared_across_profiles_in_one_store() {
    let store = MemoryStore::new();
    let mut engine = boot(store.clone(), "Kai");
    engine
        .handle(PlayerAction::CompleteLab {
            service: LabService::S3,
        })
        .unwrap();
    let raw = store.get("leaderboard").unwrap().unwrap();
    let board: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(board["entries"][0]["player_name"], "Kai");
    assert_eq!(engine.leaderboard().rank_of("Kai"), Some(1));
}
