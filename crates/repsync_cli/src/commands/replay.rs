//! Replay a batch of operations against an in-memory server.

use super::load_push_body;
use repsync_protocol::{PushResponse, TenantId, UserId};
use repsync_server::{ServerConfig, SyncServer};
use std::error::Error;
use std::path::Path;
use tracing::info;

/// Runs the `replay` command.
pub fn run(operations: &Path, user: &str, tenant: &str, format: &str) -> Result<(), Box<dyn Error>> {
    let body = load_push_body(operations)?;

    let server = SyncServer::new(ServerConfig::default());
    server.register_user(UserId::new(user), TenantId::new(tenant));

    info!(user, tenant, "replaying operations from {}", operations.display());
    let response = server.handle_push(Some(user.as_bytes()), &body);

    if response.status != 200 {
        return Err(format!(
            "server returned {}: {}",
            response.status,
            String::from_utf8_lossy(&response.body)
        )
        .into());
    }

    match format {
        "json" => {
            let value: serde_json::Value = serde_json::from_slice(&response.body)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            let parsed: PushResponse = serde_json::from_slice(&response.body)?;
            print_summary(&parsed);
        }
    }

    Ok(())
}

fn print_summary(response: &PushResponse) {
    println!("succeeded: {}", response.succeeded.len());
    println!("conflicts: {}", response.conflicts.len());
    println!("failed:    {}", response.failed.len());

    for accepted in &response.succeeded {
        match accepted.server_version {
            Some(version) => println!(
                "  + {} {} {} -> v{}",
                accepted.operation.op_type,
                accepted.operation.entity,
                accepted.operation.entity_id,
                version
            ),
            None => println!(
                "  + {} {} {} (no-op)",
                accepted.operation.op_type, accepted.operation.entity, accepted.operation.entity_id
            ),
        }
    }
    for conflicted in &response.conflicts {
        println!(
            "  ! {} {} {}: {:?}",
            conflicted.operation.op_type,
            conflicted.operation.entity,
            conflicted.operation.entity_id,
            conflicted.conflict.kind
        );
    }
    for failed in &response.failed {
        println!(
            "  x {} {} {}: {}",
            failed.operation.op_type,
            failed.operation.entity,
            failed.operation.entity_id,
            failed.error
        );
    }
}
