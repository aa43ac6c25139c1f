//! Replay operations and dump the change log they produce.

use super::load_push_body;
use repsync_engine::{ChangeLogRecorder, MemoryChangeLog};
use repsync_protocol::{TenantId, UserId};
use repsync_server::{ServerConfig, SyncServer};
use repsync_store::{EntityStore, MemoryStore};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Runs the `inspect-log` command.
pub fn run(
    operations: &Path,
    user: &str,
    tenant: &str,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn Error>> {
    let body = load_push_body(operations)?;

    let changelog = Arc::new(MemoryChangeLog::new());
    let server = SyncServer::with_parts(
        ServerConfig::default(),
        Arc::new(MemoryStore::new()) as Arc<dyn EntityStore>,
        Arc::clone(&changelog) as Arc<dyn ChangeLogRecorder>,
    );
    server.register_user(UserId::new(user), TenantId::new(tenant));

    let response = server.handle_push(Some(user.as_bytes()), &body);
    if response.status != 200 {
        return Err(format!(
            "server returned {}: {}",
            response.status,
            String::from_utf8_lossy(&response.body)
        )
        .into());
    }

    let mut entries = changelog.entries();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    info!(count = entries.len(), "change log entries recorded");

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            for entry in &entries {
                println!(
                    "{} {} {} tenant={} at={}",
                    entry.operation,
                    entry.entity_kind,
                    entry.entity_id,
                    entry.tenant_id,
                    entry.recorded_at.to_rfc3339()
                );
            }
        }
    }

    Ok(())
}
