//! Shared fakes

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actions_api::{DispatchRequest, RunConclusion, RunStatus, WorkflowRun};
use async_trait::async_trait;
use goldpath::authn::credentials::{CredentialOutcome, CredentialProvider};
use goldpath::deploy::controller::{SleepFn, SleepFuture};
use goldpath::deploy::trigger::TriggerRequest;
use goldpath::errors::PanelError;
use goldpath::http::actions::WorkflowApi;
use goldpath::models::deployment::RepoRef;
use goldpath::models::template::{Template, TemplateStatus};
use secrecy::{ExposeSecret, SecretString};

/// Ordered log of everything the fakes observed
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Scripted workflow API
pub struct FakeApi {
    pub log: EventLog,
    dispatch_result: Mutex<Option<PanelError>>,
    listings: Mutex<VecDeque<Result<Vec<WorkflowRun>, PanelError>>>,
    pub dispatched: Mutex<Vec<(String, String, DispatchRequest)>>,
}

impl FakeApi {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            dispatch_result: Mutex::new(None),
            listings: Mutex::new(VecDeque::new()),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    pub fn reject_dispatch(self, status: u16, message: &str) -> Self {
        *self.dispatch_result.lock().unwrap() = Some(PanelError::DispatchRejected {
            status,
            message: message.to_string(),
        });
        self
    }

    pub fn with_listings<I>(self, listings: I) -> Self
    where
        I: IntoIterator<Item = Result<Vec<WorkflowRun>, PanelError>>,
    {
        self.listings.lock().unwrap().extend(listings);
        self
    }

    pub fn count(&self, prefix: &str) -> usize {
        events(&self.log).iter().filter(|e| e.starts_with(prefix)).count()
    }
}

#[async_trait]
impl WorkflowApi for FakeApi {
    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow_file: &str,
        token: &SecretString,
        request: &DispatchRequest,
    ) -> Result<(), PanelError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("dispatch {} {} {}", repo, workflow_file, token.expose_secret()));
        self.dispatched
            .lock()
            .unwrap()
            .push((repo.to_string(), workflow_file.to_string(), request.clone()));
        match self.dispatch_result.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_workflow_runs(
        &self,
        repo: &RepoRef,
        workflow_file: &str,
        _token: &SecretString,
        per_page: u8,
    ) -> Result<Vec<WorkflowRun>, PanelError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("list {} {} {}", repo, workflow_file, per_page));
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PanelError::PollError("script exhausted".to_string())))
    }
}

/// Provider answering with a fixed token, recording whether it was asked
pub struct FixedCredentials {
    pub token: Option<&'static str>,
    pub asked: Mutex<u32>,
}

impl FixedCredentials {
    pub fn new(token: Option<&'static str>) -> Self {
        Self {
            token,
            asked: Mutex::new(0),
        }
    }
}

#[async_trait]
impl CredentialProvider for FixedCredentials {
    async fn request_token(&self) -> Result<CredentialOutcome, PanelError> {
        *self.asked.lock().unwrap() += 1;
        Ok(match self.token {
            Some(t) => CredentialOutcome::Provided(SecretString::from(t.to_string())),
            None => CredentialOutcome::Declined,
        })
    }

    async fn confirm(&self, _question: &str) -> Result<bool, PanelError> {
        Ok(false)
    }
}

/// Sleep that returns immediately and logs the requested duration
pub fn recording_sleep(log: EventLog) -> SleepFn {
    Arc::new(move |d: Duration| -> SleepFuture {
        log.lock().unwrap().push(format!("sleep {}", d.as_secs()));
        Box::pin(async {})
    })
}

pub fn run(id: u64, status: RunStatus, conclusion: Option<RunConclusion>) -> WorkflowRun {
    WorkflowRun {
        id,
        status,
        conclusion,
        html_url: None,
    }
}

pub fn listing(run: WorkflowRun) -> Result<Vec<WorkflowRun>, PanelError> {
    // an older run behind the newest one must be ignored
    Ok(vec![
        run,
        self::run(1, RunStatus::Completed, Some(RunConclusion::Success)),
    ])
}

pub fn transport_error() -> Result<Vec<WorkflowRun>, PanelError> {
    Err(PanelError::PollError("503: Service Unavailable".to_string()))
}

pub fn gp1() -> Template {
    Template {
        id: "gp1".to_string(),
        name: "EC2 Web App".to_string(),
        description: "Single instance web application".to_string(),
        tech_stack: vec!["EC2".to_string(), "Terraform".to_string()],
        features: vec![],
        status: TemplateStatus::Functional,
        workflow_file: "deploy.yml".to_string(),
    }
}

pub fn request(repo_url: &str) -> TriggerRequest {
    TriggerRequest {
        template: gp1(),
        owner: "acme".to_string(),
        repo: "infra".to_string(),
        repo_url: repo_url.to_string(),
        values: BTreeMap::new(),
    }
}
