//! HTTP client implementation

use std::time::Duration;

use actions_api::ErrorResponse;
use reqwest::{header, Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::PanelError;
use crate::storage::settings::ApiSettings;

/// HTTP client for the workflow API
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(settings: &ApiSettings) -> Result<Self, PanelError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_str(&settings.accept)
                .map_err(|e| PanelError::ConfigError(format!("Invalid accept header: {}", e)))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
    ) -> Result<T, PanelError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = error_message(response).await;
            error!("HTTP GET failed: {} - {}", status, message);
            return Err(PanelError::PollError(format!("{}: {}", status, message)));
        }

        let body = response.json().await?;
        Ok(body)
    }

    /// Make a POST request whose response body is ignored
    pub async fn post_no_content<B: Serialize>(
        &self,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<(), PanelError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.expose_secret())
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = error_message(response).await;
            error!("HTTP POST failed: {} - {}", status, message);
            return Err(PanelError::DispatchRejected { status, message });
        }

        Ok(())
    }
}

/// The `message` field of an error body, else the raw body
async fn error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    parse_error_message(&body)
}

fn parse_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            message: Some(message),
            ..
        }) => message,
        _ if body.trim().is_empty() => "Unknown error".to_string(),
        _ => body.trim().to_string(),
    }
}
