//! HTTP client for the account service.

use crate::auth::{AuthError, HttpPost};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// [`HttpPost`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestPost {
    client: Client,
}

impl ReqwestPost {
    /// Builds a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mcwire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpPost for ReqwestPost {
    async fn post_json(&self, url: &str, body: String) -> Result<String, AuthError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;
        tracing::debug!("Account service replied {} ({} bytes)", status, text.len());

        // Rejections carry a JSON body; anything else is a transport failure.
        if !status.is_success() && text.trim().is_empty() {
            return Err(AuthError::Http(format!("status {}", status)));
        }
        Ok(text)
    }
}
