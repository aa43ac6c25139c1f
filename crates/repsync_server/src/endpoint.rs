//! HTTP endpoint adapter.
//!
//! The adapter maps raw request material (bearer token bytes, body
//! bytes) to a status code and JSON body. It is transport-agnostic so
//! it can sit behind any HTTP server, a test harness, or the CLI's
//! loopback dispatch.

use crate::auth::{AuthConfig, TokenValidator};
use crate::error::ServerError;
use crate::handler::{HandlerContext, RequestHandler};
use crate::tenant::TenantDirectory;
use repsync_engine::CallerContext;
use repsync_protocol::{PushRequest, UserId};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Path of the push endpoint.
pub const PUSH_PATH: &str = "/api/sync/push";

/// A transport-level response: status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON-encoded body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Serializes a value as the JSON body of a response.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(err) => {
                error!(error = %err, "response serialization failed");
                Self::error(500, "Internal server error")
            }
        }
    }

    /// Builds an `{"error": ...}` response.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: serde_json::to_vec(&json!({"error": message})).unwrap_or_default(),
        }
    }
}

/// The sync push endpoint.
pub struct SyncEndpoint {
    handler: RequestHandler,
    tenants: Arc<dyn TenantDirectory>,
    validator: Option<TokenValidator>,
}

impl SyncEndpoint {
    /// Creates the endpoint over a handler context and tenant
    /// directory.
    ///
    /// The token validator is built from the context's config when
    /// authentication is enabled; otherwise the raw token bytes are
    /// taken as the caller's user id (development mode).
    pub fn new(context: Arc<HandlerContext>, tenants: Arc<dyn TenantDirectory>) -> Self {
        let validator = match (context.config.require_auth, context.config.auth_secret.as_ref()) {
            (true, Some(secret)) => Some(TokenValidator::new(AuthConfig::new(secret.clone()))),
            _ => None,
        };

        Self {
            handler: RequestHandler::new(context),
            tenants,
            validator,
        }
    }

    /// Routes a request by path.
    pub fn dispatch(&self, path: &str, token: Option<&[u8]>, body: &[u8]) -> HttpResponse {
        match path {
            PUSH_PATH => self.handle_push(token, body),
            _ => HttpResponse::error(404, "Not found"),
        }
    }

    /// Handles `POST /api/sync/push`.
    pub fn handle_push(&self, token: Option<&[u8]>, body: &[u8]) -> HttpResponse {
        let user = match self.authenticate(token) {
            Ok(user) => user,
            Err(_) => return HttpResponse::error(401, "Authentication required"),
        };

        let Some(tenant) = self.tenants.resolve(&user) else {
            return HttpResponse::error(400, "Tenant context required");
        };

        let request: PushRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(err) => {
                return HttpResponse::json(
                    400,
                    &json!({
                        "error": "Invalid request format",
                        "issues": [err.to_string()],
                    }),
                );
            }
        };

        let caller = CallerContext::new(user, tenant.tenant_id);
        match self.handler.handle_push(&caller, request) {
            Ok(response) => HttpResponse::json(200, &response),
            Err(err) if err.is_client_error() => HttpResponse::error(400, &err.to_string()),
            Err(err) => {
                error!(error = %err, "push handling failed");
                HttpResponse::error(500, "Internal server error")
            }
        }
    }

    fn authenticate(&self, token: Option<&[u8]>) -> Result<UserId, ServerError> {
        let token = token.ok_or_else(|| {
            ServerError::AuthenticationFailed("missing bearer token".into())
        })?;

        match &self.validator {
            Some(validator) => validator.validate_token(token),
            None => {
                let user = std::str::from_utf8(token).map_err(|_| {
                    ServerError::AuthenticationFailed("malformed bearer token".into())
                })?;
                Ok(UserId::new(user))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::tenant::StaticTenantDirectory;
    use repsync_engine::{MemoryChangeLog, Reconciler};
    use repsync_protocol::TenantId;
    use repsync_store::MemoryStore;
    use serde_json::Value;

    fn make_endpoint(config: ServerConfig) -> (SyncEndpoint, Arc<StaticTenantDirectory>) {
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryChangeLog::new()),
        ));
        let context = Arc::new(HandlerContext::new(config, reconciler));
        let tenants = Arc::new(StaticTenantDirectory::new());
        let endpoint = SyncEndpoint::new(context, Arc::clone(&tenants) as Arc<dyn TenantDirectory>);
        (endpoint, tenants)
    }

    fn body_json(response: &HttpResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    fn push_body() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "operations": [{
                "id": "op-1",
                "type": "create",
                "entity": "workout",
                "entityId": "w1",
                "payload": {"name": "Leg Day"},
                "timestamp": "2024-03-01T10:00:00Z",
                "retryCount": 0,
                "tenantId": "t1"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn missing_token_is_unauthenticated() {
        let (endpoint, _) = make_endpoint(ServerConfig::default());
        let response = endpoint.handle_push(None, &push_body());

        assert_eq!(response.status, 401);
        assert_eq!(body_json(&response)["error"], "Authentication required");
    }

    #[test]
    fn unresolved_tenant_is_a_bad_request() {
        let (endpoint, _) = make_endpoint(ServerConfig::default());
        let response = endpoint.handle_push(Some(b"u1"), &push_body());

        assert_eq!(response.status, 400);
        assert_eq!(body_json(&response)["error"], "Tenant context required");
    }

    #[test]
    fn malformed_body_reports_issues() {
        let (endpoint, tenants) = make_endpoint(ServerConfig::default());
        tenants.assign(UserId::new("u1"), TenantId::new("t1"));

        let response = endpoint.handle_push(Some(b"u1"), b"{\"operations\": [{}]}");

        assert_eq!(response.status, 400);
        let body = body_json(&response);
        assert_eq!(body["error"], "Invalid request format");
        assert!(body["issues"].as_array().is_some_and(|a| !a.is_empty()));
    }

    #[test]
    fn successful_push_partitions() {
        let (endpoint, tenants) = make_endpoint(ServerConfig::default());
        tenants.assign(UserId::new("u1"), TenantId::new("t1"));

        let response = endpoint.handle_push(Some(b"u1"), &push_body());
        assert_eq!(response.status, 200);

        let body = body_json(&response);
        assert_eq!(body["succeeded"].as_array().unwrap().len(), 1);
        assert_eq!(body["succeeded"][0]["serverVersion"], 1);
        assert!(body["conflicts"].as_array().unwrap().is_empty());
        assert!(body["failed"].as_array().unwrap().is_empty());
    }

    #[test]
    fn per_operation_failures_are_still_200() {
        let (endpoint, tenants) = make_endpoint(ServerConfig::default());
        tenants.assign(UserId::new("u1"), TenantId::new("t1"));

        let body = serde_json::to_vec(&json!({
            "operations": [{
                "id": "op-1",
                "type": "create",
                "entity": "meal_plan",
                "entityId": "m1",
                "payload": {},
                "timestamp": "2024-03-01T10:00:00Z",
                "tenantId": "t1"
            }]
        }))
        .unwrap();

        let response = endpoint.handle_push(Some(b"u1"), &body);
        assert_eq!(response.status, 200);

        let parsed = body_json(&response);
        assert_eq!(parsed["failed"][0]["error"], "Unknown entity type: meal_plan");
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let (endpoint, tenants) =
            make_endpoint(ServerConfig::default().with_max_push_batch(0));
        tenants.assign(UserId::new("u1"), TenantId::new("t1"));

        let response = endpoint.handle_push(Some(b"u1"), &push_body());
        assert_eq!(response.status, 400);
    }

    #[test]
    fn unknown_path_is_404() {
        let (endpoint, _) = make_endpoint(ServerConfig::default());
        let response = endpoint.dispatch("/api/sync/pull", Some(b"u1"), b"{}");
        assert_eq!(response.status, 404);
    }

    #[test]
    fn auth_mode_requires_valid_tokens() {
        let secret = b"test-secret-key-32-bytes-long!!".to_vec();
        let (endpoint, tenants) =
            make_endpoint(ServerConfig::default().with_auth(secret.clone()));
        tenants.assign(UserId::new("u1"), TenantId::new("t1"));

        // Raw user ids no longer pass.
        let response = endpoint.handle_push(Some(b"u1"), &push_body());
        assert_eq!(response.status, 401);

        // A minted token does.
        let validator = TokenValidator::new(AuthConfig::new(secret));
        let token = validator.create_token(&UserId::new("u1"));
        let response = endpoint.handle_push(Some(&token), &push_body());
        assert_eq!(response.status, 200);
    }
}
