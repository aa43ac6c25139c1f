//! # RepSync Server
//!
//! Push endpoint and request handling for RepSync.
//!
//! This crate provides:
//! - `SyncEndpoint` for `POST /api/sync/push` (status code + JSON body)
//! - Authentication middleware (HMAC-SHA256 tokens)
//! - Tenant context resolution
//! - The `SyncServer` façade wiring store, change log, and endpoint
//!
//! # Architecture
//!
//! The endpoint is transport-agnostic: callers hand in the raw bearer
//! token and request body bytes and get back a status code and JSON
//! body. Binding it to a socket, TLS, and routing middleware is the
//! embedding application's concern.
//!
//! # Status mapping
//!
//! - 401 — caller not authenticated
//! - 400 — no tenant context, malformed body, or oversized batch
//! - 200 — the three-way partition, even when operations failed
//!   individually
//! - 500 — unexpected handler failure

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod endpoint;
mod error;
mod handler;
mod server;
mod tenant;

pub use auth::{AuthConfig, TokenValidator};
pub use config::ServerConfig;
pub use endpoint::{HttpResponse, SyncEndpoint, PUSH_PATH};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use server::SyncServer;
pub use tenant::{StaticTenantDirectory, TenantContext, TenantDirectory};
