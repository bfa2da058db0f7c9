//! Account authentication.
//!
//! The login sequence only needs the display name and, for online servers,
//! the access token and profile id. Where they come from is left to a
//! [`CredentialSource`]. [`YggdrasilAuth`] is the stock source: it speaks the
//! account service's JSON contract and delegates the HTTP request itself to
//! an injected [`HttpPost`] handle.

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use uuid::Uuid;

/// Default account service endpoint.
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://authserver.mojang.com/authenticate";

/// Session credentials returned by a [`CredentialSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub client_token: Option<String>,
    pub profile_id: Uuid,
    pub display_name: String,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{error}: {message}")]
    Rejected { error: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Produces credentials for a username and password.
pub trait CredentialSource {
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Credentials, AuthError>> + Send;
}

/// Sends a JSON body to a URL and returns the response body.
///
/// Implementations should return the body for error statuses too; the
/// account service reports rejections in it.
pub trait HttpPost {
    fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<String, AuthError>> + Send;
}

/// Account service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub endpoint: String,
    pub client_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            client_token: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    agent: Agent,
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_token: Option<&'a str>,
    request_user: bool,
}

#[derive(Debug, Serialize)]
struct Agent {
    name: &'static str,
    version: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateResponse {
    access_token: String,
    #[serde(default)]
    client_token: Option<String>,
    #[serde(default)]
    selected_profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_message: String,
}

/// Credential source backed by the account service.
pub struct YggdrasilAuth<H> {
    http: H,
    config: AuthConfig,
}

impl<H: HttpPost> YggdrasilAuth<H> {
    pub fn new(http: H, config: AuthConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Builds the request body for an authentication call.
    pub fn request_body(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let request = AuthenticateRequest {
            agent: Agent {
                name: "Minecraft",
                version: 1,
            },
            username,
            password,
            client_token: self.config.client_token.as_deref(),
            request_user: true,
        };
        Ok(serde_json::to_string(&request)?)
    }

    /// Interprets a response body, success or error.
    pub fn parse_response(body: &str) -> Result<Credentials, AuthError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if value.get("error").is_some() {
            let rejected: ErrorResponse = serde_json::from_value(value)?;
            return Err(AuthError::Rejected {
                error: rejected.error,
                message: rejected.error_message,
            });
        }

        let response: AuthenticateResponse = serde_json::from_value(value)?;
        let profile = response
            .selected_profile
            .ok_or_else(|| AuthError::InvalidResponse("account has no selected profile".into()))?;
        let profile_id = Uuid::try_parse(&profile.id)
            .map_err(|_| AuthError::InvalidResponse(format!("bad profile id {}", profile.id)))?;

        Ok(Credentials {
            access_token: response.access_token,
            client_token: response.client_token,
            profile_id,
            display_name: profile.name,
        })
    }
}

impl<H: HttpPost + Sync> CredentialSource for YggdrasilAuth<H> {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Credentials, AuthError> {
        tracing::debug!("Authenticating {} against {}", username, self.config.endpoint);
        let body = self.request_body(username, password)?;
        let response = self.http.post_json(&self.config.endpoint, body).await?;
        let credentials = Self::parse_response(&response)?;
        tracing::info!("Authenticated as {}", credentials.display_name);
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedHttp {
        response: String,
        requests: Mutex<Vec<(String, String)>>,
    }

    impl CannedHttp {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpPost for CannedHttp {
        async fn post_json(&self, url: &str, body: String) -> Result<String, AuthError> {
            self.requests.lock().unwrap().push((url.to_string(), body));
            Ok(self.response.clone())
        }
    }

    const SUCCESS: &str = r#"{
        "accessToken": "token-123",
        "clientToken": "client-abc",
        "selectedProfile": {"id": "069a79f444e94726a5befca90e38aaf5", "name": "Notch"}
    }"#;

    #[test]
    fn test_request_body() {
        let auth = YggdrasilAuth::new(CannedHttp::new("{}"), AuthConfig::default());
        let body = auth.request_body("user@example.com", "hunter2").unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(json["agent"]["name"], "Minecraft");
        assert_eq!(json["agent"]["version"], 1);
        assert_eq!(json["username"], "user@example.com");
        assert_eq!(json["password"], "hunter2");
        assert_eq!(json["requestUser"], true);
        assert!(json.get("clientToken").is_none());
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let config = AuthConfig {
            endpoint: "http://127.0.0.1:1/authenticate".into(),
            client_token: Some("client-abc".into()),
        };
        let auth = YggdrasilAuth::new(CannedHttp::new(SUCCESS), config);

        let credentials = auth.authenticate("user", "pass").await.unwrap();
        assert_eq!(credentials.access_token, "token-123");
        assert_eq!(credentials.display_name, "Notch");
        assert_eq!(
            credentials.profile_id.hyphenated().to_string(),
            "069a79f4-44e9-4726-a5be-fca90e38aaf5"
        );

        let requests = auth.http.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "http://127.0.0.1:1/authenticate");
        assert!(requests[0].1.contains("\"clientToken\":\"client-abc\""));
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let body = r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid credentials. Invalid username or password."}"#;
        let auth = YggdrasilAuth::new(CannedHttp::new(body), AuthConfig::default());

        match auth.authenticate("user", "wrong").await {
            Err(AuthError::Rejected { error, message }) => {
                assert_eq!(error, "ForbiddenOperationException");
                assert!(message.starts_with("Invalid credentials"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_without_profile() {
        let result = YggdrasilAuth::<CannedHttp>::parse_response(r#"{"accessToken":"t"}"#);
        assert!(matches!(result, Err(AuthError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_response_not_json() {
        let result = YggdrasilAuth::<CannedHttp>::parse_response("<html>");
        assert!(matches!(result, Err(AuthError::Json(_))));
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(AuthConfig::default().endpoint, DEFAULT_AUTH_ENDPOINT);
    }
}
