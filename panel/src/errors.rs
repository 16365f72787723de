//! Error types for the deployment panel

use thiserror::Error;

/// Main error type for the deployment panel
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// User-correctable input problem, raised before any network call
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The user declined to supply a credential
    #[error("Credential missing")]
    CredentialMissing,

    #[error("Template catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to trigger workflow: {status} - {message}")]
    DispatchRejected { status: u16, message: String },

    /// Transient failure while checking a run
    #[error("Poll error: {0}")]
    PollError(String),

    #[error("Deployment failed: run {run_id} concluded with {conclusion}")]
    RunFailed { run_id: u64, conclusion: String },

    #[error("Deployment monitoring timed out after {0} checks")]
    Timeout(u32),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PanelError {
    /// Canned guidance for a rejected dispatch, keyed by status code
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PanelError::DispatchRejected { status: 404, .. } => Some(
                "Possible causes: workflow file not found, repository name or owner incorrect, \
                 or the token doesn't have access to this repository",
            ),
            PanelError::DispatchRejected { status: 403, .. } => Some(
                "Permission denied: the token needs the \"repo\" and \"workflow\" scopes \
                 and access to this repository",
            ),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PanelError {
    fn from(err: anyhow::Error) -> Self {
        PanelError::Internal(err.to_string())
    }
}
