use anyhow::{Context, Result, bail, ensure};
use certquest_game::{
    EngineError, ExamDomain, LabService, PlayerAction, PlayerProgress, QuestError, QuestManager,
    QuestStatus, StudyMode,
};

use super::ScenarioCtx;
use crate::logic::policy::{SimulatedPlayer, StudyProfile};

const CERTIFICATE: &str = "AWS CCP Certification Readiness";

pub fn quest_chain(ctx: &ScenarioCtx<'_>) -> Result<String> {
    let (_, mut engine) = ctx.boot_fresh("Quest Runner")?;
    let total = engine.quests().total_count();
    ensure!(total == 20, "catalog holds {total} quests");

    let gated: Vec<String> = engine
        .quests()
        .quests()
        .iter()
        .filter(|q| !q.prerequisites.is_empty())
        .map(|q| q.id.clone())
        .collect();
    for id in &gated {
        let status = engine.quests().quest(id).map(|q| q.status);
        ensure!(
            status == Some(QuestStatus::Locked),
            "{id} starts {status:?} despite prerequisites"
        );
        match engine.handle(PlayerAction::StartQuest {
            quest_id: id.clone(),
        }) {
            Err(EngineError::Quest(QuestError::PrerequisiteNotMet { .. })) => {}
            other => bail!("starting gated quest {id} on a fresh profile gave {other:?}"),
        }
    }

    let mut picker = SimulatedPlayer::new(StudyProfile::balanced(), ctx.seed);
    let mut order = Vec::with_capacity(total);
    loop {
        let available: Vec<String> = engine
            .quests()
            .available_quests()
            .map(|q| q.id.clone())
            .collect();
        let Some(index) = picker.pick(available.len()) else {
            break;
        };
        let next = &available[index];
        let missing = engine.quests().missing_prerequisites(next);
        ensure!(missing.is_empty(), "{next} was available while missing {missing:?}");
        ensure!(
            ctx.tester.finish_quest(&mut engine, next)?,
            "{next} did not complete after filling every objective"
        );
        order.push(next.clone());
        ensure!(order.len() <= total, "quest loop did not settle");
    }

    ensure!(
        engine.quests().completed_count() == total,
        "stalled after {} of {total} quests; locked: {:?}",
        engine.quests().completed_count(),
        locked_ids(engine.quests())
    );
    let player = engine.progress();
    ensure!(
        player.certificates.iter().any(|c| c == CERTIFICATE),
        "certificate not granted"
    );
    ensure!(
        player.badges_earned.len() >= total,
        "only {} badges after {total} quests",
        player.badges_earned.len()
    );

    Ok(format!(
        "{} quests, level {}, first three: {}",
        order.len(),
        player.level,
        order.iter().take(3).cloned().collect::<Vec<_>>().join(" > ")
    ))
}

fn locked_ids(quests: &QuestManager) -> Vec<&str> {
    quests
        .quests()
        .iter()
        .filter(|q| q.status != QuestStatus::Completed)
        .map(|q| q.id.as_str())
        .collect()
}

type QuestSnapshot = Vec<(String, QuestStatus, Vec<u32>)>;

fn snapshot(quests: &QuestManager) -> QuestSnapshot {
    quests
        .quests()
        .iter()
        .map(|q| {
            (
                q.id.clone(),
                q.status,
                q.objectives.iter().map(|o| o.current_count).collect(),
            )
        })
        .collect()
}

/// Field-by-field comparison; averages are floats that pass through JSON text.
fn compare_progress(before: &PlayerProgress, after: &PlayerProgress) -> Result<()> {
    ensure!(before.player_name == after.player_name, "player name changed");
    ensure!(before.total_score == after.total_score, "total score changed");
    ensure!(before.level == after.level, "level changed");
    ensure!(
        before.experience_points == after.experience_points,
        "experience changed"
    );
    ensure!(before.badges_earned == after.badges_earned, "badges changed");
    ensure!(before.certificates == after.certificates, "certificates changed");
    ensure!(
        before.completed_challenges == after.completed_challenges,
        "completed challenges changed"
    );
    for domain in ExamDomain::ALL {
        let (a, b) = (before.domain(domain), after.domain(domain));
        ensure!(
            a.questions_answered == b.questions_answered
                && a.correct_answers == b.correct_answers
                && a.wrong_answers == b.wrong_answers
                && a.level_completed == b.level_completed,
            "{domain} counters changed: {a:?} vs {b:?}"
        );
        ensure!(
            (a.average_time_per_question - b.average_time_per_question).abs() < 1e-9,
            "{domain} average time changed"
        );
    }
    Ok(())
}

pub fn persistence_roundtrip(ctx: &ScenarioCtx<'_>) -> Result<String> {
    let (slot, mut engine) = ctx.boot_fresh("Persistence Runner")?;
    let mut player = SimulatedPlayer::new(StudyProfile::balanced(), ctx.seed);
    ctx.tester.play_session(
        &mut engine,
        StudyMode::Domain(ExamDomain::CloudConcepts),
        &mut player,
    )?;
    ctx.tester.finish_quest(&mut engine, "CC_INTRO_001")?;
    engine.handle(PlayerAction::StartQuest {
        quest_id: "CC_DEPLOY_001".into(),
    })?;
    let first_objective = engine
        .quests()
        .quest("CC_DEPLOY_001")
        .and_then(|q| q.objectives.first())
        .map(|o| o.id.clone())
        .context("CC_DEPLOY_001 has no objectives")?;
    engine.handle(PlayerAction::CompleteObjective {
        quest_id: "CC_DEPLOY_001".into(),
        objective_id: first_objective,
        amount: 1,
    })?;
    engine.handle(PlayerAction::CompleteLab {
        service: LabService::Iam,
    })?;
    ensure!(!engine.pending_write(), "a save failed during play");

    let progress = engine.progress().clone();
    let quests = snapshot(engine.quests());
    let board: Vec<(String, u64)> = engine
        .leaderboard()
        .ranked()
        .iter()
        .map(|e| (e.player_name.clone(), e.total_score))
        .collect();
    drop(engine);

    let reopened = ctx.tester.boot(slot, ctx.seed, "Someone Else")?;
    compare_progress(&progress, reopened.progress())?;
    ensure!(
        snapshot(reopened.quests()) == quests,
        "quest state differs after restart"
    );
    let reopened_board: Vec<(String, u64)> = reopened
        .leaderboard()
        .ranked()
        .iter()
        .map(|e| (e.player_name.clone(), e.total_score))
        .collect();
    ensure!(reopened_board == board, "leaderboard differs after restart");
    ensure!(
        reopened.quests().quest("CC_DEPLOY_001").map(|q| q.status)
            == Some(QuestStatus::InProgress),
        "in-progress quest was not restored"
    );

    Ok(format!(
        "{} pts, {} badge(s), {} quest record(s) restored",
        progress.total_score,
        progress.badges_earned.len(),
        quests
            .iter()
            .filter(|(_, status, _)| *status != QuestStatus::Locked)
            .count()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::game_tester::GameTester;

    fn ctx<'a>(tester: &'a GameTester, key: &'static str, seed: u64) -> ScenarioCtx<'a> {
        ScenarioCtx { key, seed, tester }
    }

    #[test]
    fn progression_scenarios_pass_in_memory() {
        let tester = GameTester::new(None, false);
        for seed in [3_u64, 77] {
            quest_chain(&ctx(&tester, "quest-chain", seed)).unwrap();
            persistence_roundtrip(&ctx(&tester, "persistence-roundtrip", seed)).unwrap();
        }
    }

    #[test]
    fn persistence_roundtrip_passes_on_disk() {
        let dir = std::env::temp_dir().join(format!(
            "certquest-roundtrip-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let tester = GameTester::new(Some(dir.clone()), false);
        persistence_roundtrip(&ctx(&tester, "persistence-roundtrip", 9)).unwrap();
        assert!(
            dir.join("persistence-roundtrip")
                .join("seed-9")
                .join("quest")
                .join("CC_INTRO_001.json")
                .exists()
        );
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn snapshot_captures_status_and_counts() {
        let tester = GameTester::new(None, false);
        let (_, engine) = ctx(&tester, "unit", 1).boot_fresh("Unit").unwrap();
        let snap = snapshot(engine.quests());
        assert_eq!(snap.len(), 20);
        assert!(
            snap.iter()
                .any(|(id, status, _)| id == "CC_INTRO_001" && *status == QuestStatus::Available)
        );
    }
}
