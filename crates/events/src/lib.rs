//! Scribepad event infrastructure.
//!
//! Provides the in-process publish/subscribe hub used to keep connected
//! viewers synchronized on note and lock state:
//!
//! - [`EventBus`] -- fan-out hub backed by `tokio::sync::broadcast`.
//! - [`NoteEvent`] -- the typed union of every broadcast state transition.

pub mod bus;

pub use bus::{EventBus, NoteEvent};
