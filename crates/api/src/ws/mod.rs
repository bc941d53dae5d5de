//! WebSocket infrastructure for real-time state synchronization.
//!
//! Provides the authenticated upgrade handler, the per-process connection
//! registry with room scoping, the keep-alive heartbeat, and the relay that
//! fans bus events out to connected clients.

mod handler;
mod heartbeat;
pub mod manager;
mod relay;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
pub use relay::EventRelay;
