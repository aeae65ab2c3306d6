use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::errors::ApiError;
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::modules::auth::session::{join_url, SessionManager, SESSION_EXPIRED};
use crate::modules::notifications::NotificationKind;
use crate::modules::utils::logging::log_request;

/// Wraps every authenticated API call.
///
/// Attaches the bearer token when one is stored, turns 401/403 into a forced
/// logout, and normalizes all failures into `ApiError`. Nothing is retried
/// and every failure is still returned to the caller.
#[derive(Clone)]
pub struct RequestPipeline {
    session: Arc<SessionManager>,
    transport: Arc<dyn Transport>,
}

impl RequestPipeline {
    pub fn new(session: Arc<SessionManager>, transport: Arc<dyn Transport>) -> Self {
        Self { session, transport }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::Get, path, None, &[]).await?;
        parse_body(&response)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::Post, path, Some(to_json(body)?), &[])
            .await?;
        parse_body(&response)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::Put, path, Some(to_json(body)?), &[])
            .await?;
        parse_body(&response)
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(Method::Patch, path, Some(to_json(body)?), &[])
            .await?;
        parse_body(&response)
    }

    /// PATCH with query parameters and no body, as used by state toggles
    pub async fn patch_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::Patch, path, None, query).await?;
        parse_body(&response)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, ApiError> {
        let sent_token = self.session.current_token();

        let mut request = ApiRequest::new(method, join_url(self.session.api_base_url(), path))
            .header("Content-Type", "application/json")
            .query(query)
            .body(body);
        if let Some(token) = &sent_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                log_request(method.as_str(), path, None, false);
                return Err(e);
            }
        };

        if response.is_success() {
            log_request(method.as_str(), path, Some(response.status), true);
            return Ok(response);
        }

        log_request(method.as_str(), path, Some(response.status), false);
        let error = ApiError::from_response(response.status, &response.body);
        if error.is_auth_failure() {
            self.expire_session(sent_token.as_deref());
        }
        Err(error)
    }

    fn expire_session(&self, sent_token: Option<&str>) {
        // A newer login replaced the credentials this request went out with
        if let Some(current) = self.session.current_token() {
            if sent_token != Some(current.as_str()) {
                warn!("Ignoring auth failure for a request sent under a previous session");
                return;
            }
        }
        self.session.logout();
        self.session
            .show_message(SESSION_EXPIRED, NotificationKind::Error);
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::invalid_input(format!("Invalid request body: {}", e)))
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` accept them
fn parse_body<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ApiError> {
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| ApiError::decode(response.status, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::session::tests::{harness, Harness};
    use crate::modules::auth::tokens::tests::make_token;
    use crate::modules::http::ApiErrorKind;
    use crate::modules::routing::Route;
    use serde_json::json;

    fn pipeline(h: &Harness) -> RequestPipeline {
        RequestPipeline::new(h.session.clone(), h.transport.clone())
    }

    async fn log_in(h: &Harness, roles: &str) -> String {
        let token = make_token(&format!(r#"{{"roles":{}}}"#, roles));
        h.transport
            .respond(200, &json!({ "jwtToken": token }).to_string());
        h.session.login("alice", "pw").await.unwrap();
        token
    }

    #[tokio::test]
    async fn test_bearer_header_when_authenticated() {
        let h = harness();
        let token = log_in(&h, r#"["ROLE_ADMIN"]"#).await;
        let pipeline = pipeline(&h);

        h.transport.respond(200, r#"[{"id":1}]"#);
        let rows: Vec<Value> = pipeline.get("/v1/usuarios/todos").await.unwrap();
        assert_eq!(rows.len(), 1);

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.url, "http://localhost:8080/api/v1/usuarios/todos");
        let expected = format!("Bearer {}", token);
        assert_eq!(request.header_value("Authorization"), Some(expected.as_str()));
        assert_eq!(request.header_value("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_no_header_without_token() {
        let h = harness();
        let pipeline = pipeline(&h);

        h.transport.respond(200, "[]");
        let _: Vec<Value> = pipeline.get("/v1/pedidos/todos").await.unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.header_value("Authorization"), None);
        assert!(request.headers.iter().all(|(k, _)| !k.eq_ignore_ascii_case("authorization")));
    }

    #[tokio::test]
    async fn test_forbidden_expires_session() {
        let h = harness();
        log_in(&h, r#"["ROLE_CLIENTE"]"#).await;
        let pipeline = pipeline(&h);

        h.transport.respond(403, r#"{"message":"Access denied"}"#);
        let error = pipeline.get::<Value>("/v1/usuarios/todos").await.unwrap_err();

        // The caller still sees the original failure
        assert_eq!(error.kind, ApiErrorKind::Authentication);
        assert_eq!(error.status, Some(403));
        assert_eq!(error.message, "Access denied");

        assert_eq!(h.session.get_token(), None);
        assert!(!h.session.is_authenticated());
        assert_eq!(h.location.current(), Some(Route::Login));
        let latest = h.session.latest_message();
        assert_eq!(latest.message.as_deref(), Some(SESSION_EXPIRED));
        assert_eq!(latest.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_unauthorized_expires_session() {
        let h = harness();
        let token = log_in(&h, r#"["ROLE_CONDUCTOR"]"#).await;
        let pipeline = pipeline(&h);

        h.transport.respond(401, r#"{"message":"Token expired"}"#);
        let error = pipeline.get::<Value>("/v1/pedidos/todos").await.unwrap_err();

        assert_eq!(error.kind, ApiErrorKind::Authentication);
        assert_eq!(error.status, Some(401));
        assert_eq!(h.session.get_token(), None);
        assert_eq!(h.session.get_username(), None);
        assert_eq!(h.session.get_role(), None);
        assert_eq!(h.location.current(), Some(Route::Login));
        assert_eq!(h.session.latest_message().message.as_deref(), Some(SESSION_EXPIRED));

        // Login went out bare; the failing request carried the session token
        let sent = h.transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].header_value("Authorization"), None);
        let expected = format!("Bearer {}", token);
        assert_eq!(sent[1].header_value("Authorization"), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn test_unauthorized_without_session_still_notifies() {
        let h = harness();
        let pipeline = pipeline(&h);

        h.transport.respond(401, "");
        let error = pipeline
            .post::<_, Value>("/v1/pedidos", &json!({"origen": "A"}))
            .await
            .unwrap_err();

        assert_eq!(error.message, "Server error: 401");
        assert_eq!(h.session.latest_message().message.as_deref(), Some(SESSION_EXPIRED));
    }

    #[tokio::test]
    async fn test_late_failure_does_not_clear_newer_session() {
        let h = harness();
        let pipeline = pipeline(&h);
        log_in(&h, r#"["ROLE_ADMIN"]"#).await;
        let old_token = h.session.current_token();

        // Simulate a request that went out under the old token and a fresh
        // login that landed before its 401 came back
        h.transport.respond(200, &json!({ "jwtToken": make_token(r#"{"roles":["ROLE_CLIENTE"]}"#) }).to_string());
        h.session.login("bob", "pw").await.unwrap();
        pipeline.expire_session(old_token.as_deref());

        assert!(h.session.is_authenticated());
        assert_eq!(h.session.get_username().as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_validation_error_keeps_session() {
        let h = harness();
        log_in(&h, r#"["ROLE_ADMIN"]"#).await;
        let pipeline = pipeline(&h);

        h.transport.respond(400, r#"{"message":"La identificación es obligatoria"}"#);
        let error = pipeline
            .put::<_, Value>("/v1/conductores/3", &json!({"nombreCompleto": "Ana"}))
            .await
            .unwrap_err();

        assert_eq!(error.kind, ApiErrorKind::Validation);
        assert_eq!(error.message, "La identificación es obligatoria");
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_network_failure_keeps_session() {
        let h = harness();
        log_in(&h, r#"["ROLE_ADMIN"]"#).await;
        let pipeline = pipeline(&h);

        h.transport.fail(ApiError::network("connection refused"));
        let error = pipeline.get::<Value>("/v1/vehiculos/todos").await.unwrap_err();

        assert_eq!(error.kind, ApiErrorKind::Network);
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_patch_query_and_empty_body() {
        let h = harness();
        log_in(&h, r#"["ROLE_ADMIN"]"#).await;
        let pipeline = pipeline(&h);

        h.transport.respond(204, "");
        let _: () = pipeline
            .patch_query("/v1/conductores/3/estado", &[("activo", "false".to_string())])
            .await
            .unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.body, None);
        assert_eq!(request.query, vec![("activo".to_string(), "false".to_string())]);
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let h = harness();
        let pipeline = pipeline(&h);

        h.transport.respond(200, "<html>");
        let error = pipeline.get::<Vec<Value>>("/v1/clientes/todos").await.unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Decode);
        assert_eq!(error.status, Some(200));
    }
}
