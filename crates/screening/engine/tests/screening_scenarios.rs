//! End-to-end screening scenarios driving the orchestrator through the
//! public API, from session start to terminal outcome and replay.

use screening_compiler::compile_tree;
use screening_engine::memory::{InMemorySessionRepository, InMemoryTreeRepository};
use screening_engine::{ScreeningOrchestrator, SessionRepository, SubmitOutcome};
use screening_types::{
    CoreSymptom, DiseaseId, DiseaseSpec, EntryCriteria, EpidemiologyCheck, LabTrigger, NodeId,
    Outcome, RiskFactor, SessionStatus, SevereCriterion, WarningSign,
};
use std::sync::Arc;

fn dengue() -> DiseaseId {
    DiseaseId::new("dengue")
}

fn measles() -> DiseaseId {
    DiseaseId::new("measles")
}

/// Full-width dengue-like spec exercising every block
fn dengue_spec() -> DiseaseSpec {
    DiseaseSpec::new(
        dengue(),
        "Dengue",
        EntryCriteria::new("Fever for 2-7 days?")
            .with_min_symptom_count(2)
            .with_epidemiology(EpidemiologyCheck::new(
                "endemic_season",
                "Rainy season or local outbreak?",
            )),
    )
    .with_risk_factor(RiskFactor::hard_gate(
        "endemic_area",
        "Lives in or visited an endemic area?",
    ))
    .with_risk_factor(RiskFactor::soft_weight(
        "standing_water",
        "Standing water near the home?",
    ))
    .with_severe_criterion(SevereCriterion::new("bleeding", "Spontaneous bleeding?"))
    .with_symptom(CoreSymptom::primary(
        "retro_orbital_pain",
        "Pain behind the eyes?",
    ))
    .with_symptom(CoreSymptom::secondary("rash", "Skin rash?"))
    .with_warning_sign(WarningSign::new(
        "abdominal_pain",
        "Intense, continuous abdominal pain?",
        Outcome::ReferImmediately,
    ))
    .with_lab_trigger(LabTrigger::new("ns1", "NS1 antigen positive?", true))
}

/// Minimal second disease for multi-disease sessions
fn measles_spec() -> DiseaseSpec {
    DiseaseSpec::new(
        measles(),
        "Measles",
        EntryCriteria::new("Fever and rash for 3+ days?").with_min_symptom_count(2),
    )
    .with_severe_criterion(SevereCriterion::new(
        "unable_to_drink",
        "Unable to drink or breastfeed?",
    ))
    .with_symptom(CoreSymptom::primary("koplik", "Koplik spots in the mouth?"))
    .with_symptom(CoreSymptom::primary("conjunctivitis", "Red, watery eyes?"))
}

struct Harness {
    orchestrator: ScreeningOrchestrator,
    sessions: Arc<InMemorySessionRepository>,
}

fn harness(specs: &[DiseaseSpec]) -> Harness {
    // RUST_LOG=debug makes scenario runs readable when debugging
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();

    let trees = Arc::new(InMemoryTreeRepository::new());
    for spec in specs {
        let tree = compile_tree(spec, 1).unwrap().activate();
        trees.insert(tree).unwrap();
    }
    let sessions = Arc::new(InMemorySessionRepository::new());
    Harness {
        orchestrator: ScreeningOrchestrator::new(trees, sessions.clone()),
        sessions,
    }
}

fn next_id(result: &SubmitOutcome) -> &NodeId {
    match result {
        SubmitOutcome::Next { question } => &question.id,
        other => panic!("expected a next question, got {:?}", other),
    }
}

#[tokio::test]
async fn single_severe_answer_is_an_emergency() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();

    // No other answers; the severe criterion alone forces the outcome
    let result = h
        .orchestrator
        .submit_answer(
            &start.session_id,
            &NodeId::indexed(dengue(), "severe_criteria", 0),
            true,
        )
        .await
        .unwrap();
    assert_eq!(
        result,
        SubmitOutcome::Closed {
            outcome: Outcome::Emergency
        }
    );

    let replay = h
        .orchestrator
        .replay_session(&start.session_id)
        .await
        .unwrap();
    assert!(replay.matches);
    assert_eq!(replay.stored_outcome, Outcome::Emergency);
}

#[tokio::test]
async fn symptom_threshold_walk_ends_diagnosed() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();
    let s = &start.session_id;
    assert_eq!(start.initial_questions[0].id, NodeId::entry_gate(dengue()));

    // Drive the session through every block in compiled order
    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::entry_gate(dengue()), true)
        .await
        .unwrap();
    assert_eq!(next_id(&result), &NodeId::indexed(dengue(), "epidemiology", 0));

    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "epidemiology", 0), true)
        .await
        .unwrap();
    assert_eq!(next_id(&result), &NodeId::indexed(dengue(), "risk_factor", 0));

    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "risk_factor", 0), true)
        .await
        .unwrap();
    assert_eq!(
        next_id(&result),
        &NodeId::indexed(dengue(), "severe_criteria", 0)
    );

    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "severe_criteria", 0), false)
        .await
        .unwrap();
    assert_eq!(next_id(&result), &NodeId::indexed(dengue(), "symptom", 0));

    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "symptom", 0), true)
        .await
        .unwrap();
    assert_eq!(next_id(&result), &NodeId::indexed(dengue(), "warning_sign", 0));

    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "warning_sign", 0), false)
        .await
        .unwrap();
    assert_eq!(next_id(&result), &NodeId::indexed(dengue(), "symptom", 1));

    // Second counting symptom reaches the threshold of 2
    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "symptom", 1), true)
        .await
        .unwrap();
    assert_eq!(
        result,
        SubmitOutcome::Closed {
            outcome: Outcome::Diagnosed
        }
    );

    let replay = h.orchestrator.replay_session(s).await.unwrap();
    assert!(replay.matches);
}

#[tokio::test]
async fn refer_warning_sign_closes_with_referral() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();

    let result = h
        .orchestrator
        .submit_answer(
            &start.session_id,
            &NodeId::indexed(dengue(), "warning_sign", 0),
            true,
        )
        .await
        .unwrap();
    assert_eq!(
        result,
        SubmitOutcome::Closed {
            outcome: Outcome::ReferImmediately
        }
    );

    let replay = h
        .orchestrator
        .replay_session(&start.session_id)
        .await
        .unwrap();
    assert!(replay.matches);
}

#[tokio::test]
async fn emergency_outranks_other_diseases() {
    let h = harness(&[dengue_spec(), measles_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();
    let s = &start.session_id;

    assert_eq!(start.locked_versions.len(), 2);
    // Initial questions come back ordered by disease id
    assert_eq!(start.initial_questions[0].id, NodeId::entry_gate(dengue()));
    assert_eq!(start.initial_questions[1].id, NodeId::entry_gate(measles()));

    // Measles accumulates a non-terminal answer first
    h.orchestrator
        .submit_answer(s, &NodeId::indexed(measles(), "symptom", 0), true)
        .await
        .unwrap();

    // Dengue's severe criterion wins the ranking on the next submission
    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "severe_criteria", 0), true)
        .await
        .unwrap();
    assert_eq!(
        result,
        SubmitOutcome::Closed {
            outcome: Outcome::Emergency
        }
    );
}

#[tokio::test]
async fn replay_collapses_simultaneous_emergencies() {
    let h = harness(&[dengue_spec(), measles_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();
    let s = &start.session_id;

    // Write both severe answers straight into the log, as a backend
    // migration or bulk import might
    h.sessions
        .upsert_answer(s, &NodeId::indexed(dengue(), "severe_criteria", 0), true)
        .await
        .unwrap();
    h.sessions
        .upsert_answer(s, &NodeId::indexed(measles(), "severe_criteria", 0), true)
        .await
        .unwrap();

    let replay = h.orchestrator.replay_session(s).await.unwrap();
    assert_eq!(replay.replayed_outcome, Outcome::Emergency);
    // Session never went through submit, so the stored outcome is stale
    assert_eq!(replay.stored_outcome, Outcome::Pending);
    assert!(!replay.matches);
}

#[tokio::test]
async fn replay_detects_tampered_outcome() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();
    h.orchestrator
        .submit_answer(
            &start.session_id,
            &NodeId::indexed(dengue(), "severe_criteria", 0),
            true,
        )
        .await
        .unwrap();

    // Flip the stored outcome behind the orchestrator's back
    let mut session = h
        .sessions
        .find_session(&start.session_id)
        .await
        .unwrap()
        .unwrap();
    session.outcome = Outcome::Diagnosed;
    h.sessions.update_session(session).await.unwrap();

    let replay = h
        .orchestrator
        .replay_session(&start.session_id)
        .await
        .unwrap();
    assert!(!replay.matches);
    assert_eq!(replay.stored_outcome, Outcome::Diagnosed);
    assert_eq!(replay.replayed_outcome, Outcome::Emergency);
}

#[tokio::test]
async fn negative_entry_gate_leaves_session_pending() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();

    // Traversal lands on the excluded terminal; aggregation stays pending
    // and the session remains open with nothing left to ask
    let result = h
        .orchestrator
        .submit_answer(&start.session_id, &NodeId::entry_gate(dengue()), false)
        .await
        .unwrap();
    assert_eq!(result, SubmitOutcome::Pending);

    let status = h
        .orchestrator
        .session_status(&start.session_id)
        .await
        .unwrap();
    assert_eq!(status.status, SessionStatus::Active);
    assert_eq!(status.outcome, Outcome::Pending);
}

#[tokio::test]
async fn positive_lab_exhausts_questions_without_closing() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();
    let s = &start.session_id;

    // Everything negative except the lab: no aggregation rule fires, and
    // the positive lab routes traversal to its terminal, so no question
    // remains
    for (key, answer) in [
        ("entry_gate", true),
        ("epidemiology__0", true),
        ("risk_factor__0", true),
        ("severe_criteria__0", false),
        ("symptom__0", false),
        ("warning_sign__0", false),
        ("symptom__1", false),
    ] {
        let node_id: NodeId = format!("dengue__{}", key).parse().unwrap();
        h.orchestrator.submit_answer(s, &node_id, answer).await.unwrap();
    }

    let result = h
        .orchestrator
        .submit_answer(s, &NodeId::indexed(dengue(), "lab_trigger", 0), true)
        .await
        .unwrap();
    assert_eq!(result, SubmitOutcome::Pending);
}

#[tokio::test]
async fn start_session_scoped_to_requested_diseases() {
    let h = harness(&[dengue_spec(), measles_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[measles()])
        .await
        .unwrap();

    assert_eq!(start.locked_versions.len(), 1);
    assert!(start.locked_versions.contains_key(&measles()));

    // Nodes outside the session's scope are rejected
    let result = h
        .orchestrator
        .submit_answer(&start.session_id, &NodeId::entry_gate(dengue()), true)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn resubmission_returns_the_same_result() {
    let h = harness(&[dengue_spec()]);
    let start = h
        .orchestrator
        .start_session("child-1", "village-7", &[])
        .await
        .unwrap();
    let gate = NodeId::entry_gate(dengue());

    let first = h
        .orchestrator
        .submit_answer(&start.session_id, &gate, true)
        .await
        .unwrap();
    let second = h
        .orchestrator
        .submit_answer(&start.session_id, &gate, true)
        .await
        .unwrap();
    assert_eq!(first, second);

    let log = h.sessions.answers_for(&start.session_id).await.unwrap();
    assert_eq!(log.len(), 1);
}
