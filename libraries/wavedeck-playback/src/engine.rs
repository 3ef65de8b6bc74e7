//! Waveform engine collaborator contract
//!
//! The engine is an external decode-and-render library: it takes a source
//! URL, draws the waveform into its surface, and owns actual audio output.
//! The controller only drives it through this trait and reacts to its
//! lifecycle events, so the browser adapter and the test doubles are
//! interchangeable.

use serde::{Deserialize, Serialize};

/// Rendering options handed to the engine at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    pub wave_color: String,
    pub progress_color: String,
    pub cursor_color: String,
    /// Waveform height in pixels
    pub height: u32,
    /// Normalize peaks to the tallest sample
    pub normalize: bool,
    /// Bar width in pixels
    pub bar_width: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            wave_color: "white".to_string(),
            progress_color: "#39ff14".to_string(),
            cursor_color: "#39ff14".to_string(),
            height: 50,
            normalize: false,
            bar_width: 2,
        }
    }
}

/// Lifecycle events emitted by an engine instance
///
/// Events reach the controller via
/// [`handle_engine_event`](crate::PlayerController::handle_engine_event),
/// tagged with the generation that was current when the emitting instance
/// subscribed. The tag is what lets the controller drop events from an
/// instance it has already replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Decode finished; duration and volume are readable
    Ready,

    /// Playback position advanced
    TimeUpdate { seconds: f64 },

    /// Decode or playback failure
    Error { message: String },
}

/// An engine instance owned by the controller
///
/// The controller holds at most one instance at a time. Replacing it always
/// runs `unsubscribe` then `destroy` on the old instance before the new one
/// is created; `destroy` must be idempotent-safe.
pub trait WaveformEngine {
    /// Begin an asynchronous decode of `url`; `Ready` or `Error` follows
    fn load(&mut self, url: &str);

    /// Attach lifecycle event delivery, tagging events with `generation`
    fn subscribe(&mut self, generation: u64);

    /// Detach all lifecycle event delivery
    fn unsubscribe(&mut self);

    /// Toggle between playing and paused
    fn play_pause(&mut self);

    /// Set the output gain (0.0-1.0)
    fn set_volume(&mut self, level: f32);

    /// Current output gain
    fn volume(&self) -> f32;

    /// Total duration in seconds; meaningful once ready
    fn duration(&self) -> f64;

    /// Playback position in seconds
    fn current_time(&self) -> f64;

    /// Release the instance and everything it holds
    fn destroy(&mut self);
}

/// Creates engine instances for the controller
pub trait EngineFactory {
    type Engine: WaveformEngine;

    /// Create a fresh instance bound to the controller's surface
    fn create(&mut self, options: &EngineOptions) -> Self::Engine;
}
