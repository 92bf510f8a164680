use std::collections::HashSet;
use std::hash::Hasher;

use anyhow::{Result, ensure};
use certquest_game::constants::{EXAM_BLUEPRINT, EXAM_QUESTION_COUNT};
use certquest_game::numbers::{percentage, usize_to_u32};
use certquest_game::{
    DataLoader, ExamDomain, Question, QuestionBank, Recommendation, RngBundle, StaticDataLoader,
    StudyMode,
};
use twox_hash::XxHash64;

use super::ScenarioCtx;
use crate::logic::policy::{SimulatedPlayer, StudyProfile};

fn domain_for_seed(seed: u64, shift: u64) -> ExamDomain {
    let index = usize::try_from(seed.wrapping_add(shift) % 4).unwrap_or(0);
    ExamDomain::ALL[index]
}

fn fingerprint(questions: &[Question]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for question in questions {
        hasher.write(question.id.as_bytes());
        hasher.write_u8(0xff);
    }
    hasher.finish()
}

pub fn smoke(ctx: &ScenarioCtx<'_>) -> Result<String> {
    let (_, mut engine) = ctx.boot_fresh("Smoke Runner")?;
    let domain = domain_for_seed(ctx.seed, 0);
    let pool = engine.bank().pool_size(domain);
    let wanted = match engine.config().session.domain_question_count {
        0 => pool,
        n => n.min(pool),
    };
    let mut player = SimulatedPlayer::new(StudyProfile::balanced(), ctx.seed);
    let summary = ctx
        .tester
        .play_session(&mut engine, StudyMode::Domain(domain), &mut player)?;

    ensure!(
        summary.question_count == wanted,
        "{domain} session served {} questions, expected {wanted}",
        summary.question_count
    );
    ensure!(summary.answered == summary.question_count, "session ended early");

    let progress = engine.progress().domain(domain);
    ensure!(
        progress.questions_answered == usize_to_u32(summary.answered),
        "domain progress counted {} answers for {} submitted",
        progress.questions_answered,
        summary.answered
    );
    ensure!(
        progress.correct_answers + progress.wrong_answers == progress.questions_answered,
        "correct + wrong does not add up to answered"
    );
    ensure!(
        progress.correct_answers == summary.correct_answers,
        "summary and progress disagree on correct answers"
    );
    let expected = percentage(summary.correct_answers, usize_to_u32(summary.question_count));
    ensure!(
        (summary.accuracy - expected).abs() < 1e-9,
        "summary accuracy {} != {expected}",
        summary.accuracy
    );
    ensure!(
        engine.progress().total_score >= summary.session_score,
        "total score below session score"
    );
    ensure!(!engine.pending_write(), "save did not complete");

    Ok(format!(
        "{domain}: {}/{} correct, rating {}",
        summary.correct_answers,
        summary.question_count,
        summary.rating.label()
    ))
}

pub fn full_exam(ctx: &ScenarioCtx<'_>) -> Result<String> {
    let bank = QuestionBank::new(StaticDataLoader.load_question_data()?);
    let draw = bank.draw_full_exam(&RngBundle::from_user_seed(ctx.seed));
    ensure!(draw.is_complete(), "bundled pool short: {:?}", draw.shortfall);
    ensure!(
        draw.questions.len() == EXAM_QUESTION_COUNT,
        "drew {} questions",
        draw.questions.len()
    );
    for (domain, wanted) in EXAM_BLUEPRINT {
        ensure!(
            draw.count_for(domain) == wanted,
            "{domain}: drew {} of {wanted}",
            draw.count_for(domain)
        );
    }
    let ids: HashSet<_> = draw.questions.iter().map(|q| q.id.as_str()).collect();
    ensure!(ids.len() == draw.questions.len(), "duplicate question drawn");

    let (_, mut engine) = ctx.boot_fresh("Exam Runner")?;
    let mut player = SimulatedPlayer::new(StudyProfile::balanced().with_pace(20.0, 90.0), ctx.seed);
    let summary = ctx
        .tester
        .play_session(&mut engine, StudyMode::FullPracticeExam, &mut player)?;
    ensure!(
        summary.question_count == EXAM_QUESTION_COUNT,
        "engine served {} exam questions",
        summary.question_count
    );
    for (domain, wanted) in EXAM_BLUEPRINT {
        let answered = engine.progress().domain(domain).questions_answered;
        ensure!(
            answered == usize_to_u32(wanted),
            "{domain}: credited {answered} answers, blueprint says {wanted}"
        );
    }

    // A second engine on the same seed must serve the same exam as the standalone draw.
    let (_, mut replay) = ctx.boot_fresh("Exam Replay")?;
    replay.handle(certquest_game::PlayerAction::StartSession {
        mode: StudyMode::FullPracticeExam,
    })?;
    let served = replay.session().map(|s| fingerprint(s.questions()));
    ensure!(
        served == Some(fingerprint(&draw.questions)),
        "engine draw diverged from the bank draw for seed {}",
        ctx.seed
    );

    Ok(format!(
        "{:.1}% ({})",
        summary.accuracy,
        summary.rating.label()
    ))
}

pub fn weak_domains(ctx: &ScenarioCtx<'_>) -> Result<String> {
    let weak = domain_for_seed(ctx.seed, 1);
    let (_, mut engine) = ctx.boot_fresh("Lopsided Runner")?;
    let mut player = SimulatedPlayer::new(StudyProfile::lopsided(weak), ctx.seed);
    for domain in ExamDomain::ALL {
        ctx.tester
            .play_session(&mut engine, StudyMode::Domain(domain), &mut player)?;
    }

    let report = engine.readiness();
    ensure!(
        report.weak_domains == vec![weak],
        "expected only {weak} flagged, got {:?}",
        report.weak_domains
    );
    ensure!(
        report
            .recommendations
            .iter()
            .any(|r| matches!(r, Recommendation::ReviewDomain { domain, .. } if *domain == weak)),
        "no review recommendation for {weak}"
    );
    ensure!(
        !report
            .recommendations
            .iter()
            .any(|r| matches!(r, Recommendation::MorePractice { .. })),
        "every domain was practised but more practice is still recommended"
    );
    ensure!(
        (0.0..=100.0).contains(&report.overall_readiness),
        "readiness {} out of range",
        report.overall_readiness
    );

    Ok(format!(
        "{weak} flagged at {:.0}%, readiness {:.1}",
        engine.progress().domain(weak).accuracy(),
        report.overall_readiness
    ))
}
