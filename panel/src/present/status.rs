//! Status projection: run state to user-facing text

use std::fmt;
use std::sync::Mutex;

use actions_api::{RunConclusion, RunStatus, WorkflowRun};

/// Presentation style of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Pending,
    Running,
    Success,
    Error,
}

/// Status elements shown while a deployment is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusElement {
    Infra,
    App,
    PublicIp,
}

impl StatusElement {
    pub fn id(&self) -> &'static str {
        match self {
            StatusElement::Infra => "infra-status",
            StatusElement::App => "app-status",
            StatusElement::PublicIp => "public-ip",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusElement::Infra => "Infrastructure",
            StatusElement::App => "Application",
            StatusElement::PublicIp => "Public IP",
        }
    }
}

impl fmt::Display for StatusElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One UI mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub element: StatusElement,
    pub text: String,
    pub severity: Severity,
}

impl StatusUpdate {
    pub fn new(element: StatusElement, text: impl Into<String>, severity: Severity) -> Self {
        Self {
            element,
            text: text.into(),
            severity,
        }
    }
}

/// Status lines for an observed run
pub fn run_updates(run: &WorkflowRun) -> Vec<StatusUpdate> {
    use Severity::*;
    use StatusElement::*;

    match (&run.status, run.final_conclusion()) {
        (RunStatus::Queued, _) => vec![StatusUpdate::new(Infra, "Queued...", Pending)],
        (RunStatus::InProgress, _) => vec![
            StatusUpdate::new(Infra, "Provisioning Infrastructure...", Running),
            StatusUpdate::new(App, "Deploying Application...", Running),
        ],
        (RunStatus::Completed, Some(RunConclusion::Success)) => vec![
            StatusUpdate::new(Infra, "Infrastructure Ready", Success),
            StatusUpdate::new(App, "Application Deployed", Success),
        ],
        (RunStatus::Completed, conclusion) => {
            let conclusion = conclusion.map_or_else(|| "unknown".to_string(), |c| c.to_string());
            vec![
                StatusUpdate::new(Infra, format!("Failed: {}", conclusion), Error),
                StatusUpdate::new(App, "Failed", Error),
            ]
        }
        (RunStatus::Other(raw), _) => {
            vec![StatusUpdate::new(Infra, format!("Waiting ({})...", raw), Pending)]
        }
    }
}

/// UI sink for status changes, as a trait for testability
pub trait StatusPresenter: Send + Sync {
    /// Set the text and severity of a status element
    fn update(&self, update: StatusUpdate);

    /// Show a message the user must see (summary, success, failure guidance)
    fn notify(&self, message: &str);

    /// Enable or disable the deploy control
    fn set_deploy_control(&self, enabled: bool, label: &str);

    /// Point the workflow link at `url`
    fn set_workflow_link(&self, url: &str);
}

/// Everything a presenter was asked to show, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    Status(StatusUpdate),
    Notice(String),
    DeployControl { enabled: bool, label: String },
    WorkflowLink(String),
}

/// Presenter that records events instead of drawing them
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Latest text shown for `element`
    pub fn last_status(&self, element: StatusElement) -> Option<StatusUpdate> {
        self.events().into_iter().rev().find_map(|e| match e {
            PresenterEvent::Status(u) if u.element == element => Some(u),
            _ => None,
        })
    }

    /// Latest deploy control state
    pub fn deploy_enabled(&self) -> Option<bool> {
        self.events().into_iter().rev().find_map(|e| match e {
            PresenterEvent::DeployControl { enabled, .. } => Some(enabled),
            _ => None,
        })
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }
}

impl StatusPresenter for RecordingPresenter {
    fn update(&self, update: StatusUpdate) {
        self.push(PresenterEvent::Status(update));
    }

    fn notify(&self, message: &str) {
        self.push(PresenterEvent::Notice(message.to_string()));
    }

    fn set_deploy_control(&self, enabled: bool, label: &str) {
        self.push(PresenterEvent::DeployControl {
            enabled,
            label: label.to_string(),
        });
    }

    fn set_workflow_link(&self, url: &str) {
        self.push(PresenterEvent::WorkflowLink(url.to_string()));
    }
}
