//! Main sync server.

use crate::auth::{AuthConfig, TokenValidator};
use crate::config::ServerConfig;
use crate::endpoint::{HttpResponse, SyncEndpoint};
use crate::handler::HandlerContext;
use crate::tenant::{StaticTenantDirectory, TenantDirectory};
use repsync_engine::{ChangeLogRecorder, MemoryChangeLog, Reconciler};
use repsync_protocol::{TenantId, UserId};
use repsync_store::{EntityStore, MemoryStore};
use std::sync::Arc;

/// The sync server.
///
/// Wires config, store, change log, tenant directory, and the push
/// endpoint together. The embedding application exposes HTTP routes
/// that forward to [`SyncServer::dispatch`] or
/// [`SyncServer::handle_push`].
///
/// # Example
///
/// ```
/// use repsync_server::{ServerConfig, SyncServer};
/// use repsync_protocol::{TenantId, UserId};
///
/// let server = SyncServer::new(ServerConfig::default());
/// server.register_user(UserId::new("u1"), TenantId::new("t1"));
///
/// let body = br#"{"operations": []}"#;
/// let response = server.handle_push(Some(b"u1"), body);
/// assert_eq!(response.status, 200);
/// ```
pub struct SyncServer {
    endpoint: SyncEndpoint,
    context: Arc<HandlerContext>,
    directory: Arc<StaticTenantDirectory>,
    validator: Option<TokenValidator>,
}

impl SyncServer {
    /// Creates a sync server with in-memory store and change log.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryChangeLog::new()),
        )
    }

    /// Creates a sync server over a caller-supplied store and
    /// change-log recorder.
    pub fn with_parts(
        config: ServerConfig,
        store: Arc<dyn EntityStore>,
        changelog: Arc<dyn ChangeLogRecorder>,
    ) -> Self {
        let validator = config
            .auth_secret
            .as_ref()
            .filter(|_| config.require_auth)
            .map(|secret| TokenValidator::new(AuthConfig::new(secret.clone())));

        let reconciler = Arc::new(Reconciler::new(store, changelog));
        let context = Arc::new(HandlerContext::new(config, reconciler));
        let directory = Arc::new(StaticTenantDirectory::new());
        let endpoint = SyncEndpoint::new(
            Arc::clone(&context),
            Arc::clone(&directory) as Arc<dyn TenantDirectory>,
        );

        Self {
            endpoint,
            context,
            directory,
            validator,
        }
    }

    /// Assigns a user to a tenant in the built-in directory.
    pub fn register_user(&self, user: UserId, tenant: TenantId) {
        self.directory.assign(user, tenant);
    }

    /// Mints a session token for a user.
    ///
    /// Returns `None` when authentication is disabled; in that mode
    /// the raw user id bytes act as the bearer token.
    #[must_use]
    pub fn issue_token(&self, user: &UserId) -> Option<Vec<u8>> {
        self.validator
            .as_ref()
            .map(|validator| validator.create_token(user))
    }

    /// Routes a request by path.
    pub fn dispatch(&self, path: &str, token: Option<&[u8]>, body: &[u8]) -> HttpResponse {
        self.endpoint.dispatch(path, token, body)
    }

    /// Handles `POST /api/sync/push`.
    pub fn handle_push(&self, token: Option<&[u8]>, body: &[u8]) -> HttpResponse {
        self.endpoint.handle_push(token, body)
    }

    /// Returns the underlying entity store.
    pub fn store(&self) -> &Arc<dyn EntityStore> {
        self.context.reconciler.store()
    }
}
