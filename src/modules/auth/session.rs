use log::{info, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

use super::registration::RegisterRequest;
use super::store::CredentialStore;
use super::tokens;
use crate::modules::http::{ApiError, ApiRequest, Method, Transport};
use crate::modules::notifications::{Notification, NotificationKind, Notifier};
use crate::modules::routing::{Navigator, Route};
use crate::modules::utils::logging::log_auth_event;
use crate::{LOGIN_PATH, REGISTER_PATH};

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGOUT_SUCCESS: &str = "Signed out successfully!";
pub const SESSION_EXPIRED: &str =
    "Your session has expired or you do not have permission. Please log in again.";
pub const LOGIN_REQUIRED: &str = "You need to log in to access this page.";
pub const REGISTER_SUCCESS: &str = "Registration successful! You can now log in.";

/// What the UI needs to know about the signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub username: String,
    pub role: Option<String>,
    /// Token expiry (seconds since epoch), informational only
    pub expires_at: Option<i64>,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "jwtToken")]
    jwt_token: Option<String>,
}

/// Owns the session: login, logout and registration flows, session queries
/// and the global notification channel.
pub struct SessionManager {
    api_base_url: String,
    credentials: CredentialStore,
    transport: Arc<dyn Transport>,
    notifier: Notifier,
    navigator: Arc<dyn Navigator>,
}

impl SessionManager {
    pub fn new(
        api_base_url: impl Into<String>,
        credentials: CredentialStore,
        transport: Arc<dyn Transport>,
        notifier: Notifier,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            credentials,
            transport,
            notifier,
            navigator,
        }
    }

    /// Exchange credentials for a token and persist the new session
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::invalid_input("Username and password are required"));
        }

        let request = ApiRequest::new(Method::Post, self.url(LOGIN_PATH))
            .header("Content-Type", "application/json")
            .body(Some(json!({ "username": username, "password": password })));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                log_auth_event("login", username, false, Some(e.message.as_str()));
                return Err(e);
            }
        };
        if !response.is_success() {
            let error = ApiError::from_response(response.status, &response.body);
            log_auth_event("login", username, false, Some(error.message.as_str()));
            return Err(error);
        }

        let parsed: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::decode(response.status, e))?;
        let token = match parsed.jwt_token {
            Some(token) if is_usable_token(&token) => token,
            Some(_) => {
                log_auth_event("login", username, false, Some("unusable token in response"));
                return Err(ApiError::decode(
                    response.status,
                    "login response carried a token that cannot be sent as a bearer credential",
                ));
            }
            None => {
                log_auth_event("login", username, false, Some("no token in response"));
                return Err(ApiError::decode(
                    response.status,
                    "login response did not include a token",
                ));
            }
        };

        let claims = tokens::decode(&token);
        let role = claims.as_ref().and_then(|c| c.primary_role());
        if role.is_none() {
            warn!("No role found in the token; clearing any stored role");
        }

        self.credentials.save(&token, username, role.as_deref())?;
        self.show_message(LOGIN_SUCCESS, NotificationKind::Success);
        log_auth_event("login", username, true, role.as_deref());

        Ok(SessionInfo {
            username: username.to_string(),
            role,
            expires_at: claims.and_then(|c| c.exp),
        })
    }

    /// Create an account. Leaves the current session untouched.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        request.validate().map_err(ApiError::invalid_input)?;

        let body = serde_json::to_value(request).map_err(|e| ApiError::invalid_input(e.to_string()))?;
        let http_request = ApiRequest::new(Method::Post, self.url(REGISTER_PATH))
            .header("Content-Type", "application/json")
            .body(Some(body));

        let response = self.transport.send(http_request).await?;
        if !response.is_success() {
            let error = ApiError::from_response(response.status, &response.body);
            log_auth_event("register", &request.username, false, Some(error.message.as_str()));
            return Err(error);
        }

        log_auth_event("register", &request.username, true, Some(request.rol.to_string().as_str()));
        Ok(())
    }

    /// Clear the session and send the user to the login screen. Safe to call repeatedly.
    pub fn logout(&self) {
        let username = self.credentials.get_username();
        if let Err(e) = self.credentials.clear() {
            warn!("Session could not be fully cleared: {}", e);
        }
        self.show_message(LOGOUT_SUCCESS, NotificationKind::Success);
        self.navigator.navigate(Route::Login);
        log_auth_event("logout", username.as_deref().unwrap_or("anonymous"), true, None);
    }

    /// The stored token, if it is usable as a bearer credential.
    ///
    /// This is the single authentication test shared by the guard and the
    /// request pipeline.
    pub fn current_token(&self) -> Option<String> {
        let token = self.credentials.get_token()?;
        if token.is_empty() {
            return None;
        }
        if !is_usable_token(&token) {
            warn!("Stored token is not a valid header value; treating session as absent");
            return None;
        }
        Some(token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    pub fn get_token(&self) -> Option<String> {
        self.credentials.get_token()
    }

    pub fn get_username(&self) -> Option<String> {
        self.credentials.get_username()
    }

    pub fn get_role(&self) -> Option<String> {
        self.credentials.get_role()
    }

    /// Snapshot of the stored session, with the expiry decoded from the token
    pub fn current_session(&self) -> Option<SessionInfo> {
        let token = self.current_token()?;
        Some(SessionInfo {
            username: self.get_username().unwrap_or_default(),
            role: self.get_role(),
            expires_at: tokens::decode(&token).and_then(|c| c.exp),
        })
    }

    pub fn show_message(&self, message: impl Into<String>, kind: NotificationKind) {
        let message = message.into();
        info!("[{}] {}", kind, message);
        self.notifier.publish(message, kind);
    }

    pub fn messages(&self) -> watch::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn latest_message(&self) -> Notification {
        self.notifier.latest()
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.api_base_url, path)
    }
}

/// Non-empty and printable ASCII throughout, so it fits in an `Authorization` header
fn is_usable_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_graphic())
}

/// Join a base URL and an API path with exactly one slash between them
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
