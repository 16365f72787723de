//! Deployment monitor tests

use actions_api::{RunConclusion, RunStatus};
use chrono::Utc;
use goldpath::deploy::monitor::{self, MonitorOptions, MonitorSession, MonitorState};
use goldpath::models::deployment::{RepoRef, RunHandle};
use goldpath::present::status::{PresenterEvent, RecordingPresenter, Severity, StatusElement};
use secrecy::SecretString;

use crate::support::*;

fn session() -> MonitorSession {
    MonitorSession::new(RunHandle {
        repo: RepoRef::new("acme", "infra").unwrap(),
        template: gp1(),
        dispatched_at: Utc::now(),
    })
}

fn token() -> SecretString {
    SecretString::from("ghp_test".to_string())
}

async fn monitor_with(api: &FakeApi, presenter: &RecordingPresenter) -> (MonitorState, MonitorSession) {
    let sleep = recording_sleep(api.log.clone());
    let mut session = session();
    let state = monitor::run(
        api,
        &token(),
        &mut session,
        &MonitorOptions::default(),
        presenter,
        |d| (sleep)(d),
    )
    .await;
    (state, session)
}

#[tokio::test]
async fn test_monitor_reaches_success_on_completed_tick() {
    let log = new_log();
    let api = FakeApi::new(log.clone()).with_listings([
        listing(run(7, RunStatus::Queued, None)),
        listing(run(7, RunStatus::InProgress, None)),
        listing(run(7, RunStatus::Completed, Some(RunConclusion::Success))),
        listing(run(7, RunStatus::Completed, Some(RunConclusion::Failure))),
    ]);
    let presenter = RecordingPresenter::new();

    let (state, session) = monitor_with(&api, &presenter).await;

    assert_eq!(state, MonitorState::Success { run_id: 7 });
    assert_eq!(session.attempts(), 3);
    assert_eq!(api.count("list"), 3);
    assert_eq!(api.count("sleep 30"), 2);
    assert_eq!(
        events(&log),
        vec![
            "list acme/infra deploy.yml 5",
            "sleep 30",
            "list acme/infra deploy.yml 5",
            "sleep 30",
            "list acme/infra deploy.yml 5",
        ]
    );

    assert_eq!(presenter.deploy_enabled(), Some(true));
    assert_eq!(
        presenter.last_status(StatusElement::App).unwrap().text,
        "Complete"
    );
    assert!(presenter
        .events()
        .contains(&PresenterEvent::WorkflowLink(
            "https://github.com/acme/infra/actions/runs/7".to_string()
        )));
}

#[tokio::test]
async fn test_monitor_fails_immediately_on_completed_failure() {
    let log = new_log();
    let api = FakeApi::new(log.clone()).with_listings([
        listing(run(8, RunStatus::Completed, Some(RunConclusion::Failure))),
        listing(run(8, RunStatus::Queued, None)),
    ]);
    let presenter = RecordingPresenter::new();

    let (state, _) = monitor_with(&api, &presenter).await;

    assert_eq!(
        state,
        MonitorState::Failure {
            run_id: 8,
            conclusion: "failure".to_string()
        }
    );
    assert_eq!(api.count("list"), 1);
    assert_eq!(api.count("sleep"), 0);

    let infra = presenter.last_status(StatusElement::Infra).unwrap();
    assert_eq!(infra.text, "Failed: failure");
    assert_eq!(infra.severity, Severity::Error);
    assert_eq!(presenter.deploy_enabled(), Some(true));
}

#[tokio::test]
async fn test_monitor_times_out_after_ceiling() {
    let log = new_log();
    let api = FakeApi::new(log.clone())
        .with_listings((0..121).map(|_| listing(run(9, RunStatus::InProgress, None))));
    let presenter = RecordingPresenter::new();

    let (state, session) = monitor_with(&api, &presenter).await;

    assert_eq!(state, MonitorState::Timeout);
    assert_eq!(session.attempts(), 120);
    assert_eq!(api.count("list"), 120);
    assert_eq!(api.count("sleep"), 119);
    assert_eq!(
        presenter.last_status(StatusElement::Infra).unwrap().text,
        "Timeout"
    );
    assert_eq!(presenter.deploy_enabled(), Some(true));
}

#[tokio::test]
async fn test_monitor_aborts_after_consecutive_errors() {
    let log = new_log();
    let api = FakeApi::new(log.clone())
        .with_listings((0..10).map(|_| transport_error()));
    let presenter = RecordingPresenter::new();

    let (state, session) = monitor_with(&api, &presenter).await;

    assert!(matches!(state, MonitorState::Aborted { .. }));
    assert_eq!(session.attempts(), 5);
    assert_eq!(api.count("list"), 5);
    assert_eq!(
        presenter.last_status(StatusElement::Infra).unwrap().text,
        "Monitoring error"
    );
    assert_eq!(presenter.deploy_enabled(), Some(true));
}

#[tokio::test]
async fn test_monitor_tolerates_sporadic_errors() {
    let log = new_log();
    let mut script = Vec::new();
    for _ in 0..3 {
        script.extend((0..4).map(|_| transport_error()));
        script.push(listing(run(3, RunStatus::InProgress, None)));
    }
    script.push(listing(run(3, RunStatus::Completed, Some(RunConclusion::Success))));
    let api = FakeApi::new(log.clone()).with_listings(script);
    let presenter = RecordingPresenter::new();

    let (state, session) = monitor_with(&api, &presenter).await;

    assert_eq!(state, MonitorState::Success { run_id: 3 });
    assert_eq!(session.attempts(), 16);
}

#[tokio::test]
async fn test_monitor_waits_through_empty_listing() {
    let log = new_log();
    let api = FakeApi::new(log.clone()).with_listings([
        Ok(vec![]),
        listing(run(4, RunStatus::Completed, Some(RunConclusion::Success))),
    ]);
    let presenter = RecordingPresenter::new();

    let (state, session) = monitor_with(&api, &presenter).await;

    assert_eq!(state, MonitorState::Success { run_id: 4 });
    assert_eq!(session.latest().unwrap().id, 4);
}
