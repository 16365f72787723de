//! Credential provider and acquisition flow

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::errors::PanelError;
use crate::storage::store::{KeyValueStore, TOKEN_KEY};

/// Outcome of asking the user for a credential
pub enum CredentialOutcome {
    Provided(SecretString),
    Declined,
}

/// Source of credentials when none is stored, as a trait for testability
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Ask for a token
    async fn request_token(&self) -> Result<CredentialOutcome, PanelError>;

    /// Ask a yes/no question
    async fn confirm(&self, question: &str) -> Result<bool, PanelError>;
}

const TOKEN_PREFIXES: &[&str] = &["ghp_", "github_pat_"];

const TOKEN_INSTRUCTIONS: &str = "\
GitHub Personal Access Token Required

To trigger the deployment workflow, enter a GitHub Personal Access Token:
  1. GitHub.com -> Settings -> Developer settings -> Personal access tokens -> Tokens (classic)
  2. Generate new token (classic)
  3. Select scopes: \"repo\" and \"workflow\"
  4. Copy the token and paste it below

The token is stored locally in your goldpath store.";

/// Return the stored credential, or ask `provider` for one and store it.
///
/// Any decline (empty entry, explicit refusal, rejecting an unusual format)
/// yields `CredentialMissing`.
pub async fn obtain_credential(
    store: &dyn KeyValueStore,
    provider: &dyn CredentialProvider,
) -> Result<SecretString, PanelError> {
    if let Some(token) = store.get(TOKEN_KEY).await? {
        if !token.trim().is_empty() {
            return Ok(SecretString::from(token));
        }
    }

    let token = match provider.request_token().await? {
        CredentialOutcome::Provided(token) => token.expose_secret().trim().to_string(),
        CredentialOutcome::Declined => String::new(),
    };
    if token.is_empty() {
        warn!("GitHub token required but not provided");
        return Err(PanelError::CredentialMissing);
    }

    if !has_known_prefix(&token) {
        let proceed = provider
            .confirm(
                "The token format looks unusual. Classic tokens start with \"ghp_\", \
                 fine-grained tokens with \"github_pat_\". Proceed anyway?",
            )
            .await?;
        if !proceed {
            return Err(PanelError::CredentialMissing);
        }
    }

    store.set(TOKEN_KEY, &token).await?;
    info!("GitHub token stored locally");
    Ok(SecretString::from(token))
}

fn has_known_prefix(token: &str) -> bool {
    TOKEN_PREFIXES.iter().any(|p| token.starts_with(p))
}

/// Interactive provider reading from stdin
#[derive(Debug, Default)]
pub struct StdinCredentialProvider;

impl StdinCredentialProvider {
    async fn prompt(&self, text: &str) -> Result<Option<String>, PanelError> {
        let mut stderr = tokio::io::stderr();
        stderr.write_all(text.as_bytes()).await?;
        stderr.flush().await?;

        let mut line = String::new();
        let read = BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[async_trait]
impl CredentialProvider for StdinCredentialProvider {
    async fn request_token(&self) -> Result<CredentialOutcome, PanelError> {
        let text = format!("{}\n\nEnter your GitHub token: ", TOKEN_INSTRUCTIONS);
        Ok(match self.prompt(&text).await? {
            Some(token) if !token.is_empty() => CredentialOutcome::Provided(SecretString::from(token)),
            _ => CredentialOutcome::Declined,
        })
    }

    async fn confirm(&self, question: &str) -> Result<bool, PanelError> {
        let answer = self.prompt(&format!("{} [y/N] ", question)).await?;
        Ok(matches!(answer.as_deref(), Some("y") | Some("Y") | Some("yes")))
    }
}
