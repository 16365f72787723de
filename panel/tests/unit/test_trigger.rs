//! Deployment trigger tests

use std::sync::Arc;

use goldpath::deploy::trigger::DeploymentTrigger;
use goldpath::errors::PanelError;
use goldpath::models::template::TemplateStatus;
use goldpath::present::status::{PresenterEvent, RecordingPresenter, StatusElement};
use goldpath::storage::store::{KeyValueStore, MemoryStore, OWNER_KEY, REPO_KEY, TOKEN_KEY};

use crate::support::*;

const REPO_URL: &str = "https://github.com/acme/web-app";

struct Harness {
    api: Arc<FakeApi>,
    store: Arc<MemoryStore>,
    credentials: Arc<FixedCredentials>,
    trigger: DeploymentTrigger,
}

fn harness(api: FakeApi, token: Option<&'static str>) -> Harness {
    let api = Arc::new(api);
    let store = Arc::new(MemoryStore::new());
    let credentials = Arc::new(FixedCredentials::new(token));
    let trigger = DeploymentTrigger::new(api.clone(), store.clone(), credentials.clone(), "main");
    Harness {
        api,
        store,
        credentials,
        trigger,
    }
}

fn notices(presenter: &RecordingPresenter) -> Vec<String> {
    presenter
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PresenterEvent::Notice(n) => Some(n),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_missing_repo_url_makes_no_request() {
    let h = harness(FakeApi::new(new_log()), Some("ghp_token"));
    let presenter = RecordingPresenter::new();

    let result = h.trigger.trigger(&request(""), &presenter).await;

    assert!(matches!(result, Err(PanelError::ValidationError(_))));
    assert_eq!(events(&h.api.log).len(), 0);
    assert_eq!(*h.credentials.asked.lock().unwrap(), 0);
    assert!(notices(&presenter)[0].contains("repository URL"));
}

#[tokio::test]
async fn test_invalid_inputs_make_no_request() {
    let h = harness(FakeApi::new(new_log()), Some("ghp_token"));
    let presenter = RecordingPresenter::new();

    let mut wrong_host = request("https://gitlab.com/acme/web-app");
    assert!(h.trigger.trigger(&wrong_host, &presenter).await.is_err());

    wrong_host.repo_url = REPO_URL.to_string();
    wrong_host.owner = "  ".to_string();
    assert!(h.trigger.trigger(&wrong_host, &presenter).await.is_err());

    let mut coming_soon = request(REPO_URL);
    coming_soon.template.status = TemplateStatus::ComingSoon;
    assert!(h.trigger.trigger(&coming_soon, &presenter).await.is_err());

    assert_eq!(events(&h.api.log).len(), 0);
}

#[tokio::test]
async fn test_declined_credential_aborts_silently() {
    let h = harness(FakeApi::new(new_log()), None);
    let presenter = RecordingPresenter::new();

    let result = h.trigger.trigger(&request(REPO_URL), &presenter).await;

    assert!(matches!(result, Err(PanelError::CredentialMissing)));
    assert_eq!(events(&h.api.log).len(), 0);
    assert!(notices(&presenter).is_empty());
}

#[tokio::test]
async fn test_successful_dispatch_issues_one_post() {
    let h = harness(FakeApi::new(new_log()), Some("ghp_token"));
    let presenter = RecordingPresenter::new();
    let mut req = request(REPO_URL);
    req.values.insert("instance-type".to_string(), "t2.small".to_string());

    let dispatched = tokio_test::assert_ok!(h.trigger.trigger(&req, &presenter).await);

    assert_eq!(dispatched.handle.repo.to_string(), "acme/infra");
    assert_eq!(h.api.count("dispatch"), 1);
    assert_eq!(h.api.count("list"), 0);

    let sent = h.api.dispatched.lock().unwrap();
    let (repo, workflow, body) = &sent[0];
    assert_eq!(repo, "acme/infra");
    assert_eq!(workflow, "deploy.yml");
    assert_eq!(body.git_ref, "main");
    assert_eq!(body.inputs["instance_type"], "t2.small");
    assert_eq!(body.inputs["app_type"], "nodejs");
    assert_eq!(body.inputs["repo_url"], REPO_URL);
    assert_eq!(body.inputs["cleanup_after_deployment"], "false");
    assert_eq!(body.inputs["golden_path"], "gp1");
    drop(sent);

    assert_eq!(h.store.get(OWNER_KEY).await.unwrap().as_deref(), Some("acme"));
    assert_eq!(h.store.get(REPO_KEY).await.unwrap().as_deref(), Some("infra"));
    assert_eq!(h.store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("ghp_token"));

    assert!(notices(&presenter)[0].contains("Instance Type: t2.small"));
    assert!(presenter.events().contains(&PresenterEvent::WorkflowLink(
        "https://github.com/acme/infra/actions".to_string()
    )));
    assert_eq!(presenter.deploy_enabled(), Some(false));
}

#[tokio::test]
async fn test_each_trigger_dispatches_again() {
    let h = harness(FakeApi::new(new_log()), Some("ghp_token"));
    let presenter = RecordingPresenter::new();

    h.trigger.trigger(&request(REPO_URL), &presenter).await.unwrap();
    h.trigger.trigger(&request(REPO_URL), &presenter).await.unwrap();

    assert_eq!(h.api.count("dispatch"), 2);
    // the credential is prompted once, then read from the store
    assert_eq!(*h.credentials.asked.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_rejected_dispatch_reports_hint() {
    let api = FakeApi::new(new_log()).reject_dispatch(404, "Not Found");
    let h = harness(api, Some("ghp_token"));
    let presenter = RecordingPresenter::new();

    let result = h.trigger.trigger(&request(REPO_URL), &presenter).await;

    match result {
        Err(PanelError::DispatchRejected { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected result: {:?}", other.map(|d| d.handle)),
    }

    let notice = notices(&presenter).pop().unwrap();
    assert!(notice.contains("404 - Not Found"));
    assert!(notice.contains("workflow file not found"));
    assert_eq!(presenter.deploy_enabled(), Some(true));
    assert_eq!(
        presenter.last_status(StatusElement::Infra).unwrap().text,
        "Failed to start"
    );
}
