//! Deployment controller tests

use std::sync::Arc;
use std::time::Duration;

use actions_api::{RunConclusion, RunStatus};
use goldpath::deploy::controller::{DeploymentController, SleepFn, SleepFuture};
use goldpath::deploy::monitor::{MonitorOptions, MonitorState};
use goldpath::deploy::trigger::DeploymentTrigger;
use goldpath::present::status::RecordingPresenter;
use goldpath::storage::store::MemoryStore;

use crate::support::*;

const REPO_URL: &str = "https://github.com/acme/web-app";

fn controller(api: Arc<FakeApi>, sleep_fn: SleepFn) -> (DeploymentController, Arc<RecordingPresenter>) {
    let presenter = Arc::new(RecordingPresenter::new());
    let trigger = DeploymentTrigger::new(
        api.clone(),
        Arc::new(MemoryStore::new()),
        Arc::new(FixedCredentials::new(Some("ghp_token"))),
        "main",
    );
    let controller = DeploymentController::new(
        trigger,
        api,
        presenter.clone(),
        MonitorOptions::default(),
        Duration::from_secs(5),
        sleep_fn,
    );
    (controller, presenter)
}

fn never_wake() -> SleepFn {
    Arc::new(|_d: Duration| -> SleepFuture { Box::pin(std::future::pending()) })
}

#[tokio::test]
async fn test_monitoring_starts_after_delay() {
    let log = new_log();
    let api = Arc::new(FakeApi::new(log.clone()).with_listings([
        listing(run(5, RunStatus::InProgress, None)),
        listing(run(5, RunStatus::Completed, Some(RunConclusion::Success))),
    ]));
    let (mut controller, presenter) = controller(api.clone(), recording_sleep(log.clone()));

    tokio_test::assert_ok!(controller.deploy(&request(REPO_URL)).await);
    let state = controller.wait().await;

    assert_eq!(state, Some(MonitorState::Success { run_id: 5 }));
    assert_eq!(
        events(&log),
        vec![
            "dispatch acme/infra deploy.yml ghp_token",
            "sleep 5",
            "list acme/infra deploy.yml 5",
            "sleep 30",
            "list acme/infra deploy.yml 5",
        ]
    );
    assert_eq!(presenter.deploy_enabled(), Some(true));
}

#[tokio::test]
async fn test_invalid_deploy_starts_no_session() {
    let log = new_log();
    let api = Arc::new(FakeApi::new(log.clone()));
    let (mut controller, _) = controller(api, recording_sleep(log.clone()));

    assert!(controller.deploy(&request("")).await.is_err());
    assert!(controller.active_session().is_none());
    assert!(events(&log).is_empty());
}

#[tokio::test]
async fn test_new_deploy_supersedes_active_session() {
    let log = new_log();
    let api = Arc::new(FakeApi::new(log.clone()));
    let (mut controller, _) = controller(api.clone(), never_wake());

    let first = controller.deploy(&request(REPO_URL)).await.unwrap();
    assert_eq!(controller.active_session(), Some(first));

    let second = controller.deploy(&request(REPO_URL)).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(controller.active_session(), Some(second));

    assert_eq!(api.count("dispatch"), 2);
    // both sessions were still waiting out the start delay
    assert_eq!(api.count("list"), 0);

    assert!(controller.cancel_active());
    assert!(controller.active_session().is_none());
    assert!(!controller.cancel_active());
}

#[tokio::test]
async fn test_cancel_after_interrupted_wait_stops_polling() {
    let log = new_log();
    let in_progress = std::iter::repeat_with(|| listing(run(9, RunStatus::InProgress, None)));
    let api = Arc::new(FakeApi::new(log.clone()).with_listings(in_progress.take(120)));
    let short_sleep: SleepFn = Arc::new(|_d: Duration| -> SleepFuture {
        Box::pin(tokio::time::sleep(Duration::from_millis(5)))
    });
    let (mut controller, _) = controller(api.clone(), short_sleep);

    let id = tokio_test::assert_ok!(controller.deploy(&request(REPO_URL)).await);
    tokio::select! {
        _ = controller.wait() => panic!("monitoring finished early"),
        _ = tokio::time::sleep(Duration::from_millis(70)) => {}
    }

    // the interrupted wait leaves the session with the controller
    assert_eq!(controller.active_session(), Some(id));
    assert!(controller.cancel_active());

    let polled = api.count("list");
    assert!(polled > 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(api.count("list"), polled);
    assert!(controller.active_session().is_none());
}
