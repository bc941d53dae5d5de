use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: scribepad_db::DbPool,
    /// Server configuration, including lease timings.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection registry for this process.
    pub ws_manager: Arc<WsManager>,
    /// In-process event bus for lock and note state transitions.
    pub event_bus: Arc<scribepad_events::EventBus>,
}
