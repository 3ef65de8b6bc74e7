//! Player events
//!
//! Event-based communication for UI synchronization. The controller queues
//! events as it mutates state; the UI layer drains the queue after every
//! intent and every engine callback and repaints from the payloads.

use crate::types::PlayerState;
use serde::{Deserialize, Serialize};

/// Events emitted by the player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Lifecycle state changed
    StateChanged { state: PlayerState },

    /// A new source started loading
    SourceChanged { name: String, reference: String },

    /// Playback position update
    PositionUpdate {
        position_secs: f64,
        duration_secs: f64,
    },

    /// Volume level or mute flag changed
    VolumeChanged { level: f32, muted: bool },

    /// A source was appended to the catalog
    CatalogChanged { length: usize },

    /// A user-visible failure occurred
    Error { message: String },
}
