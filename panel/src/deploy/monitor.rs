//! Deployment monitor
//!
//! A session starts in `Polling` and ends in exactly one terminal state.
//! Checks are chained: the next one is scheduled only after the previous
//! request has resolved, so two checks of one session never overlap.

use std::future::Future;
use std::time::Duration;

use actions_api::{RunConclusion, RunStatus, WorkflowRun};
use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::PanelError;
use crate::http::actions::WorkflowApi;
use crate::models::deployment::RunHandle;
use crate::present::status::{run_updates, Severity, StatusElement, StatusPresenter, StatusUpdate};
use crate::storage::settings::MonitorSettings;

/// Monitor options
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Delay between checks
    pub interval: Duration,

    /// Checks performed before giving up
    pub max_attempts: u32,

    /// Consecutive failed checks before aborting
    pub max_consecutive_errors: u32,

    /// Runs requested per listing; only the newest is consulted
    pub runs_per_page: u8,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: 120, // ~60 minutes
            max_consecutive_errors: 5,
            runs_per_page: 5,
        }
    }
}

impl From<&MonitorSettings> for MonitorOptions {
    fn from(settings: &MonitorSettings) -> Self {
        Self {
            interval: Duration::from_secs(settings.interval_secs),
            max_attempts: settings.max_attempts,
            max_consecutive_errors: settings.max_consecutive_errors,
            runs_per_page: settings.runs_per_page,
        }
    }
}

/// Monitor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorState {
    Polling,
    Success { run_id: u64 },
    Failure { run_id: u64, conclusion: String },
    Timeout,
    Aborted { last_error: String },
}

impl MonitorState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorState::Polling)
    }

    /// The successful run id, or why there is none
    pub fn into_result(self, max_attempts: u32) -> Result<u64, PanelError> {
        match self {
            MonitorState::Success { run_id } => Ok(run_id),
            MonitorState::Failure { run_id, conclusion } => {
                Err(PanelError::RunFailed { run_id, conclusion })
            }
            MonitorState::Timeout => Err(PanelError::Timeout(max_attempts)),
            MonitorState::Aborted { last_error } => Err(PanelError::PollError(last_error)),
            MonitorState::Polling => Err(PanelError::Internal(
                "monitoring stopped before the run finished".to_string(),
            )),
        }
    }
}

/// A monitoring session for one dispatched deployment
#[derive(Debug, Clone)]
pub struct MonitorSession {
    id: Uuid,
    handle: RunHandle,
    attempts: u32,
    error_streak: u32,
    state: MonitorState,
    latest: Option<WorkflowRun>,
}

impl MonitorSession {
    pub fn new(handle: RunHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            handle,
            attempts: 0,
            error_streak: 0,
            state: MonitorState::Polling,
            latest: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn error_streak(&self) -> u32 {
        self.error_streak
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Latest observed run; earlier observations are not kept
    pub fn latest(&self) -> Option<&WorkflowRun> {
        self.latest.as_ref()
    }

    /// Apply the outcome of one check.
    ///
    /// `Ok(None)` means the listing had no runs yet. Outcomes arriving after
    /// the session reached a terminal state are discarded.
    pub fn observe(
        &mut self,
        outcome: Result<Option<WorkflowRun>, PanelError>,
        options: &MonitorOptions,
    ) -> &MonitorState {
        if self.state.is_terminal() {
            debug!("Session {} already finished, discarding check result", self.id);
            return &self.state;
        }

        self.attempts += 1;

        match outcome {
            Ok(run) => {
                self.error_streak = 0;
                if let Some(run) = run {
                    if run.status == RunStatus::Completed {
                        self.state = match &run.conclusion {
                            Some(RunConclusion::Success) => MonitorState::Success { run_id: run.id },
                            other => MonitorState::Failure {
                                run_id: run.id,
                                conclusion: other
                                    .as_ref()
                                    .map(|c| c.to_string())
                                    .unwrap_or_else(|| "unknown".to_string()),
                            },
                        };
                    }
                    self.latest = Some(run);
                }
            }
            Err(e) => {
                self.error_streak += 1;
                warn!(
                    "Error monitoring deployment (attempt {}, {} in a row): {}",
                    self.attempts, self.error_streak, e
                );
                if self.error_streak >= options.max_consecutive_errors {
                    self.state = MonitorState::Aborted {
                        last_error: e.to_string(),
                    };
                }
            }
        }

        if !self.state.is_terminal() && self.attempts >= options.max_attempts {
            self.state = MonitorState::Timeout;
        }

        &self.state
    }
}

/// Poll until the session reaches a terminal state, reflecting every check
/// through `presenter`. The first check runs immediately.
pub async fn run<A, P, S, F>(
    api: &A,
    token: &SecretString,
    session: &mut MonitorSession,
    options: &MonitorOptions,
    presenter: &P,
    sleep_fn: S,
) -> MonitorState
where
    A: WorkflowApi + ?Sized,
    P: StatusPresenter + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!(
        "Monitoring {} for {} (session {})",
        session.handle.template.workflow_file, session.handle.repo, session.id
    );

    loop {
        check(api, token, session, options, presenter).await;
        if session.state.is_terminal() {
            break;
        }
        sleep_fn(options.interval).await;
    }

    present_terminal(session, presenter);
    info!(
        "Session {} finished after {} checks, {}s after dispatch: {:?}",
        session.id,
        session.attempts,
        (Utc::now() - session.handle.dispatched_at).num_seconds(),
        session.state
    );
    session.state.clone()
}

async fn check<A, P>(
    api: &A,
    token: &SecretString,
    session: &mut MonitorSession,
    options: &MonitorOptions,
    presenter: &P,
) where
    A: WorkflowApi + ?Sized,
    P: StatusPresenter + ?Sized,
{
    let handle = &session.handle;
    let outcome = api
        .list_workflow_runs(&handle.repo, &handle.template.workflow_file, token, options.runs_per_page)
        .await
        .map(|runs| runs.into_iter().next());

    if let Ok(Some(run)) = &outcome {
        debug!(
            "Checking deployment status: {} - {:?}",
            run.status, run.conclusion
        );
        for update in run_updates(run) {
            presenter.update(update);
        }
        presenter.set_workflow_link(&handle.repo.run_url(run.id));
    }

    session.observe(outcome, options);
}

fn present_terminal<P: StatusPresenter + ?Sized>(session: &MonitorSession, presenter: &P) {
    let repo = &session.handle.repo;
    match &session.state {
        MonitorState::Polling => {}
        MonitorState::Success { run_id } => {
            presenter.update(StatusUpdate::new(StatusElement::App, "Complete", Severity::Success));
            presenter.update(StatusUpdate::new(
                StatusElement::PublicIp,
                "Check Workflow Logs",
                Severity::Success,
            ));
            presenter.set_deploy_control(true, "Deploy Another Instance");
            presenter.notify(&format!(
                "Deployment completed successfully!\n\n\
                 Workflow Run: {}\n\n\
                 The EC2 public IP address is available in the workflow logs.",
                repo.run_url(*run_id)
            ));
        }
        MonitorState::Failure { run_id, conclusion } => {
            presenter.update(StatusUpdate::new(
                StatusElement::Infra,
                format!("Failed: {}", conclusion),
                Severity::Error,
            ));
            presenter.update(StatusUpdate::new(StatusElement::App, "Failed", Severity::Error));
            presenter.set_deploy_control(true, "Retry Deployment");
            presenter.notify(&format!(
                "Deployment failed!\n\n\
                 Check logs: {}\n\n\
                 Common issues:\n\
                 1. AWS secrets not added to repository\n\
                 2. Invalid AWS credentials\n\
                 3. Insufficient AWS permissions\n\
                 4. Application build/start errors",
                repo.run_url(*run_id)
            ));
        }
        MonitorState::Timeout => {
            presenter.update(StatusUpdate::new(StatusElement::Infra, "Timeout", Severity::Error));
            presenter.update(StatusUpdate::new(StatusElement::App, "Timeout", Severity::Error));
            presenter.set_deploy_control(true, "Deploy EC2 Instance");
            presenter.notify(&format!(
                "Deployment monitoring timed out. Please check GitHub Actions manually: {}",
                repo.actions_url()
            ));
        }
        MonitorState::Aborted { last_error } => {
            presenter.update(StatusUpdate::new(
                StatusElement::Infra,
                "Monitoring error",
                Severity::Error,
            ));
            presenter.set_deploy_control(true, "Deploy EC2 Instance");
            presenter.notify(&format!(
                "Stopped monitoring after repeated errors ({}). Check {} for the run status.",
                last_error,
                repo.actions_url()
            ));
        }
    }
}
