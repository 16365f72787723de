//! Workflow dispatch and run listing

use actions_api::{DispatchRequest, WorkflowRun, WorkflowRunsResponse};
use async_trait::async_trait;
use secrecy::SecretString;

use crate::errors::PanelError;
use crate::http::client::HttpClient;
use crate::models::deployment::RepoRef;

/// Remote workflow API, as a trait for testability
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Start a workflow run. Not idempotent: every call starts a new run.
    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow_file: &str,
        token: &SecretString,
        request: &DispatchRequest,
    ) -> Result<(), PanelError>;

    /// Most recent runs of a workflow, newest first
    async fn list_workflow_runs(
        &self,
        repo: &RepoRef,
        workflow_file: &str,
        token: &SecretString,
        per_page: u8,
    ) -> Result<Vec<WorkflowRun>, PanelError>;
}

fn workflow_path(repo: &RepoRef, workflow_file: &str) -> String {
    format!(
        "/repos/{}/{}/actions/workflows/{}",
        repo.owner, repo.repo, workflow_file
    )
}

#[async_trait]
impl WorkflowApi for HttpClient {
    async fn dispatch_workflow(
        &self,
        repo: &RepoRef,
        workflow_file: &str,
        token: &SecretString,
        request: &DispatchRequest,
    ) -> Result<(), PanelError> {
        let path = format!("{}/dispatches", workflow_path(repo, workflow_file));
        self.post_no_content(&path, token, request).await
    }

    async fn list_workflow_runs(
        &self,
        repo: &RepoRef,
        workflow_file: &str,
        token: &SecretString,
        per_page: u8,
    ) -> Result<Vec<WorkflowRun>, PanelError> {
        let path = format!(
            "{}/runs?per_page={}",
            workflow_path(repo, workflow_file),
            per_page
        );
        let response: WorkflowRunsResponse = self.get(&path, token).await?;
        Ok(response.workflow_runs)
    }
}
