mod common;

use common::{test_config, FakeBoard, FakeJob, ScriptedOperator};
use job_apply_agent::error::ApplyError;
use job_apply_agent::infrastructure::{HeadlessOperator, ReviewDecision};
use job_apply_agent::models::{FieldKind, FormField, JobPosting, SessionState};
use job_apply_agent::workflow::{EasyApplyFlow, FormState};

fn posting(job: &FakeJob) -> JobPosting {
    job.card.clone().into_posting()
}

fn flow() -> EasyApplyFlow {
    let dir = tempfile::tempdir().unwrap();
    EasyApplyFlow::from_config(&test_config(dir.path()))
}

#[tokio::test]
async fn test_multi_page_form_is_submitted() {
    let job = FakeJob::new("1", "Frontend Developer", "Acme").form_pages(vec![
        vec![FormField::text(0, "First name"), FormField::text(1, "Mobile phone number")],
        vec![FormField {
            index: 0,
            label: "Do you require visa sponsorship?".into(),
            kind: FieldKind::Dropdown {
                options: vec!["Select an option".into(), "Yes".into(), "No".into()],
            },
        }],
    ]);
    let board = FakeBoard::with_open_job(job.clone());
    let mut session = SessionState::new(false);

    let outcome = flow()
        .run(&board, &HeadlessOperator, &posting(&job), None, &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.final_state, FormState::Submitted);
    assert_eq!(outcome.pages, 2);
    assert_eq!(outcome.questions_answered, 3);
    assert_eq!(outcome.resume_uploaded, None);

    let state = board.state();
    assert_eq!(state.next_clicks, 1);
    assert_eq!(state.submitted, vec!["1".to_string()]);
    assert!(state
        .filled
        .contains(&("Do you require visa sponsorship?".to_string(), "No".to_string())));
}

#[tokio::test]
async fn test_stuck_form_fails_at_threshold_without_operator() {
    let job = FakeJob::new("2", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    board.state().never_review = true;
    let mut session = SessionState::new(false);

    let err = flow()
        .run(&board, &HeadlessOperator, &posting(&job), None, &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplyError::Unanswerable { iterations: 14 }));
    assert_eq!(board.state().next_clicks, 14);
    assert!(board.state().submitted.is_empty());
}

#[tokio::test]
async fn test_stuck_form_escalates_to_operator() {
    let job = FakeJob::new("3", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    board.state().never_review = true;
    let operator = ScriptedOperator::interactive(Vec::new());
    let mut session = SessionState::new(false);

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.settings.max_escalations = 1;
    let flow = EasyApplyFlow::from_config(&config);

    let err = flow
        .run(&board, &operator, &posting(&job), None, &mut session)
        .await
        .unwrap_err();

    assert_eq!(operator.alert_count(), 1);
    assert!(matches!(err, ApplyError::Unanswerable { iterations: 28 }));
    assert_eq!(board.state().next_clicks, 28);
}

#[tokio::test]
async fn test_operator_can_discard_at_review() {
    let job = FakeJob::new("4", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    let operator = ScriptedOperator::interactive(vec![ReviewDecision::Discard]);
    let mut session = SessionState::new(true);

    let err = flow()
        .run(&board, &operator, &posting(&job), None, &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplyError::Discarded));
    assert!(board.state().submitted.is_empty());
}

#[tokio::test]
async fn test_disable_pause_applies_to_rest_of_session() {
    let job = FakeJob::new("5", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    let operator = ScriptedOperator::interactive(vec![ReviewDecision::DisableFuturePauses]);
    let mut session = SessionState::new(true);

    flow()
        .run(&board, &operator, &posting(&job), None, &mut session)
        .await
        .unwrap();

    assert!(!session.pause_before_submit);
    assert_eq!(board.state().submitted, vec!["5".to_string()]);
}

#[tokio::test]
async fn test_blocked_submit_is_reported() {
    let job = FakeJob::new("6", "Frontend Developer", "Acme").submit_blocked();
    let board = FakeBoard::with_open_job(job.clone());
    let mut session = SessionState::new(false);

    let err = flow()
        .run(&board, &HeadlessOperator, &posting(&job), None, &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplyError::SubmitNotActionable));
}

#[tokio::test]
async fn test_resume_upload_clears_session_flag() {
    let dir = tempfile::tempdir().unwrap();
    let resume = dir.path().join("resume.pdf");
    std::fs::write(&resume, b"%PDF").unwrap();

    let job = FakeJob::new("7", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    let mut session = SessionState::new(false);
    assert!(session.use_new_resume);

    let outcome = flow()
        .run(&board, &HeadlessOperator, &posting(&job), Some(resume.as_path()), &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.resume_uploaded.as_deref(), Some(resume.as_path()));
    assert!(!session.use_new_resume);
    assert_eq!(board.state().uploads.len(), 1);
}

#[tokio::test]
async fn test_no_review_answer_does_not_submit() {
    let job = FakeJob::new("8", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    let operator = ScriptedOperator::interactive(Vec::new());
    let mut session = SessionState::new(true);

    let err = flow()
        .run(&board, &operator, &posting(&job), None, &mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, ApplyError::Discarded));
    assert!(board.state().submitted.is_empty());
}

#[tokio::test]
async fn test_threshold_of_one_still_answers_first_page() {
    let job = FakeJob::new("9", "Frontend Developer", "Acme");
    let board = FakeBoard::with_open_job(job.clone());
    let mut session = SessionState::new(false);

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.settings.escalation_threshold = 1;

    let outcome = EasyApplyFlow::from_config(&config)
        .run(&board, &HeadlessOperator, &posting(&job), None, &mut session)
        .await
        .unwrap();

    assert_eq!(outcome.final_state, FormState::Submitted);
    assert_eq!(outcome.pages, 1);
}
