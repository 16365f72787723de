//! Deployment trigger

use std::collections::BTreeMap;
use std::sync::Arc;

use actions_api::DispatchRequest;
use chrono::Utc;
use secrecy::SecretString;
use tracing::{error, info};

use crate::authn::credentials::{obtain_credential, CredentialProvider};
use crate::errors::PanelError;
use crate::form::builder::build_config;
use crate::http::actions::WorkflowApi;
use crate::models::deployment::{DeploymentConfig, RepoRef, RunHandle};
use crate::models::template::Template;
use crate::present::status::{Severity, StatusElement, StatusPresenter, StatusUpdate};
use crate::storage::store::{KeyValueStore, OWNER_KEY, REPO_KEY};

/// Everything the user entered for one deploy attempt
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    pub template: Template,

    /// Owner of the repository hosting the workflows
    pub owner: String,

    /// Name of the repository hosting the workflows
    pub repo: String,

    /// Application source repository
    pub repo_url: String,

    /// Template field values keyed by field name; absent fields take defaults
    pub values: BTreeMap<String, String>,
}

/// A successful dispatch
pub struct Dispatched {
    pub handle: RunHandle,
    pub token: SecretString,
}

/// Validates input and dispatches the template's workflow
pub struct DeploymentTrigger {
    api: Arc<dyn WorkflowApi>,
    store: Arc<dyn KeyValueStore>,
    credentials: Arc<dyn CredentialProvider>,
    git_ref: String,
}

impl DeploymentTrigger {
    pub fn new(
        api: Arc<dyn WorkflowApi>,
        store: Arc<dyn KeyValueStore>,
        credentials: Arc<dyn CredentialProvider>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            credentials,
            git_ref: git_ref.into(),
        }
    }

    /// Validate, obtain a credential and issue exactly one dispatch request.
    ///
    /// Validation errors and a declined credential never reach the network.
    /// Failures are reported through `presenter` before being returned, except
    /// `CredentialMissing`, which aborts silently.
    pub async fn trigger(
        &self,
        request: &TriggerRequest,
        presenter: &dyn StatusPresenter,
    ) -> Result<Dispatched, PanelError> {
        let (repo, config) = match validate(request) {
            Ok(validated) => validated,
            Err(e) => {
                presenter.notify(&e.to_string());
                return Err(e);
            }
        };

        self.store.set(OWNER_KEY, &repo.owner).await?;
        self.store.set(REPO_KEY, &repo.repo).await?;

        let token = obtain_credential(self.store.as_ref(), self.credentials.as_ref()).await?;

        presenter.update(StatusUpdate::new(
            StatusElement::Infra,
            "Starting deployment...",
            Severity::Running,
        ));
        presenter.update(StatusUpdate::new(
            StatusElement::App,
            "Waiting for infrastructure...",
            Severity::Pending,
        ));
        presenter.update(StatusUpdate::new(
            StatusElement::PublicIp,
            "Will be available in logs...",
            Severity::Pending,
        ));
        presenter.set_deploy_control(false, "Deploying...");

        let summary = summary(&repo, &config);
        let body = DispatchRequest {
            git_ref: self.git_ref.clone(),
            inputs: config.into_inputs(),
        };
        info!(
            "Triggering {} on {} with inputs {:?}",
            request.template.workflow_file, repo, body.inputs
        );

        if let Err(e) = self
            .api
            .dispatch_workflow(&repo, &request.template.workflow_file, &token, &body)
            .await
        {
            error!("Deployment error: {}", e);
            presenter.set_deploy_control(true, "Deploy EC2 Instance");
            presenter.update(StatusUpdate::new(
                StatusElement::Infra,
                "Failed to start",
                Severity::Error,
            ));
            presenter.update(StatusUpdate::new(StatusElement::App, "Failed", Severity::Error));
            presenter.notify(&failure_notice(&e));
            return Err(e);
        }

        info!("Workflow triggered successfully");
        presenter.update(StatusUpdate::new(
            StatusElement::Infra,
            "Workflow triggered successfully",
            Severity::Running,
        ));
        presenter.set_workflow_link(&repo.actions_url());
        presenter.notify(&summary);

        Ok(Dispatched {
            handle: RunHandle {
                repo,
                template: request.template.clone(),
                dispatched_at: Utc::now(),
            },
            token,
        })
    }
}

fn validate(request: &TriggerRequest) -> Result<(RepoRef, DeploymentConfig), PanelError> {
    if !request.template.is_functional() {
        return Err(PanelError::ValidationError(format!(
            "{} is coming soon and cannot be deployed yet",
            request.template.name
        )));
    }
    let repo = RepoRef::new(&request.owner, &request.repo)?;
    let config = build_config(&request.template, &request.values, &request.repo_url)?;
    Ok((repo, config))
}

fn summary(repo: &RepoRef, config: &DeploymentConfig) -> String {
    let field = |key: &str| config.get(key).unwrap_or("-").to_string();
    let cleanup = if config.get("cleanup_after_deployment") == Some("true") {
        "Yes"
    } else {
        "No"
    };
    format!(
        "Deployment started successfully!\n\n\
         Configuration:\n\
         - Workflow repository: {}\n\
         - Instance Type: {}\n\
         - App Type: {}\n\
         - Source repository: {}\n\
         - Auto-cleanup: {}\n\n\
         Progress: {}\n\
         The EC2 public IP will be shown in the workflow summary. \
         Deployment typically takes 5-10 minutes.",
        repo,
        field("instance_type"),
        field("app_type"),
        field("repo_url"),
        cleanup,
        repo.actions_url()
    )
}

/// User-facing explanation of a failed dispatch
pub fn failure_notice(err: &PanelError) -> String {
    match err.hint() {
        Some(hint) => format!("Failed to start deployment!\n\n{}\n{}", err, hint),
        None => format!("Failed to start deployment!\n\nError: {}", err),
    }
}
