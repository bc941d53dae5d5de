//! Periodic reclamation of expired locks and session leases.
//!
//! Lazy expiry in the read paths already makes an aged-out lock behave as
//! unlocked the instant it lapses; this task only reclaims stored state and
//! tells connected viewers about it. Each tick runs three bounded bulk
//! statements -- never one long transaction over the whole table -- and a
//! tick that finds nothing is a no-op. A failed step is logged and retried
//! on the next tick; the task never terminates the process.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use scribepad_db::repositories::{LockRepo, SessionRepo};
use scribepad_db::DbPool;
use scribepad_events::{EventBus, NoteEvent};

use crate::config::ServerConfig;

/// Run the reconciliation sweep loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    event_bus: Arc<EventBus>,
    config: Arc<ServerConfig>,
    cancel: CancellationToken,
) {
    tracing::info!(
        server = %config.server_name,
        interval_secs = config.sweep_interval_secs,
        session_ttl_mins = config.session_ttl_mins,
        lock_ttl_mins = config.lock_ttl_mins,
        "Reconciliation sweeper started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reconciliation sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                sweep(&pool, &event_bus, &config).await;
            }
        }
    }
}

/// One full sweep: dead-holder locks, over-age locks, expired sessions.
async fn sweep(pool: &DbPool, event_bus: &EventBus, config: &ServerConfig) {
    // 1. Locks whose holder has no live session left (cascading
    //    revoke-on-session-expiry).
    match LockRepo::release_for_dead_holders(pool, config.session_ttl_mins).await {
        Ok(released) if !released.is_empty() => {
            tracing::info!(count = released.len(), "Sweep: released locks of dead holders");
            for note_id in released {
                event_bus.publish(NoteEvent::lock_released(note_id));
            }
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(error = %e, "Sweep: dead-holder lock release failed");
        }
    }

    // 2. Locks whose own lease has aged out, independent of session state.
    match LockRepo::release_expired(pool, config.lock_ttl_mins).await {
        Ok(released) if !released.is_empty() => {
            tracing::info!(count = released.len(), "Sweep: released expired locks");
            for note_id in released {
                event_bus.publish(NoteEvent::lock_released(note_id));
            }
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(error = %e, "Sweep: expired lock release failed");
        }
    }

    // 3. Session leases past their expiry or activity-stale.
    match SessionRepo::delete_expired(pool, config.session_ttl_mins).await {
        Ok(deleted) if deleted > 0 => {
            tracing::info!(deleted, "Sweep: removed expired sessions");
        }
        Ok(_) => {
            tracing::debug!("Sweep: nothing to reclaim");
        }
        Err(e) => {
            tracing::error!(error = %e, "Sweep: session cleanup failed");
        }
    }
}
