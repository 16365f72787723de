//! Deployment models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::errors::PanelError;
use crate::models::template::Template;

/// Repository hosting the deployment workflows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// Build a reference from user input; both parts are trimmed and required
    pub fn new(owner: &str, repo: &str) -> Result<Self, PanelError> {
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() {
            return Err(PanelError::ValidationError(
                "GitHub owner and repository name are required".to_string(),
            ));
        }
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Page listing all workflow runs
    pub fn actions_url(&self) -> String {
        format!("https://github.com/{}/{}/actions", self.owner, self.repo)
    }

    /// Page for a single workflow run
    pub fn run_url(&self, run_id: u64) -> String {
        format!("{}/runs/{}", self.actions_url(), run_id)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Workflow inputs for one deploy attempt, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentConfig(BTreeMap<String, String>);

impl DeploymentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn into_inputs(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// A dispatched deployment, handed to the monitor
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub repo: RepoRef,
    pub template: Template,
    pub dispatched_at: DateTime<Utc>,
}
