//! Request handlers for sync endpoints.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use repsync_engine::{CallerContext, Reconciler};
use repsync_protocol::{PushRequest, PushResponse};
use std::sync::Arc;

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// The reconciler (shared across all handlers).
    pub reconciler: Arc<Reconciler>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, reconciler: Arc<Reconciler>) -> Self {
        Self { config, reconciler }
    }
}

/// Handler for sync requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles a push request for an authenticated, tenant-resolved
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the batch exceeds the configured
    /// size. Individual operation failures are never errors; they are
    /// reported inside the [`PushResponse`] partition.
    pub fn handle_push(
        &self,
        caller: &CallerContext,
        request: PushRequest,
    ) -> ServerResult<PushResponse> {
        if request.operations.len() > self.context.config.max_push_batch as usize {
            return Err(ServerError::InvalidRequest(format!(
                "Too many operations: {} > {}",
                request.operations.len(),
                self.context.config.max_push_batch
            )));
        }

        Ok(self
            .context
            .reconciler
            .apply_batch(caller, request.operations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repsync_engine::MemoryChangeLog;
    use repsync_protocol::{EntityId, EntityKind, OperationType, SyncOperation, TenantId, UserId};
    use repsync_store::MemoryStore;
    use serde_json::json;

    fn make_handler(max_batch: u32) -> RequestHandler {
        let config = ServerConfig::default().with_max_push_batch(max_batch);
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryChangeLog::new()),
        ));
        RequestHandler::new(Arc::new(HandlerContext::new(config, reconciler)))
    }

    fn caller() -> CallerContext {
        CallerContext::new(UserId::new("u1"), TenantId::new("t1"))
    }

    fn make_op(id: &str) -> SyncOperation {
        SyncOperation::new(
            OperationType::Create,
            EntityKind::Workout,
            EntityId::new(id),
            json!({"name": "Leg Day"}),
            TenantId::new("t1"),
        )
    }

    #[test]
    fn push_within_limit() {
        let handler = make_handler(10);
        let request = PushRequest::new(vec![make_op("w1"), make_op("w2")]);

        let response = handler.handle_push(&caller(), request).unwrap();
        assert_eq!(response.succeeded.len(), 2);
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let handler = make_handler(1);
        let request = PushRequest::new(vec![make_op("w1"), make_op("w2")]);

        let result = handler.handle_push(&caller(), request);
        assert!(matches!(result, Err(ServerError::InvalidRequest(_))));
    }

    #[test]
    fn empty_batch_is_fine() {
        let handler = make_handler(10);
        let response = handler
            .handle_push(&caller(), PushRequest::new(vec![]))
            .unwrap();
        assert!(response.is_empty());
    }
}
