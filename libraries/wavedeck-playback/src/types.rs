//! Core types for the player controller

use crate::engine::EngineOptions;
use serde::{Deserialize, Serialize};

/// Player lifecycle state
///
/// `Idle → Loading → Ready ⇄ Playing`, with `Error` reachable from `Loading`
/// or `Ready`/`Playing`. `Error` is left only by loading a new source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No engine instance exists
    Idle,

    /// A load has been issued; the engine is decoding
    Loading,

    /// Decode complete, duration known, engine paused
    Ready,

    /// Engine advancing; position updates arrive on a playback cadence
    Playing,

    /// Decode or engine failure; display values frozen at last known state
    Error,
}

/// Volume slider presentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliderStyle {
    /// Bare range input
    Simple,

    /// Range input with a "Volume: NN%" / "Muted" caption
    #[default]
    Labeled,
}

/// Configuration for the player controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume level (0.0-1.0, default: 0.5)
    pub volume: f32,

    /// Step applied by the volume up/down controls (default: 0.1)
    pub volume_step: f32,

    /// Volume slider presentation (default: labeled)
    pub slider: SliderStyle,

    /// Rendering options handed to the waveform engine
    pub engine: EngineOptions,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            volume_step: 0.1,
            slider: SliderStyle::default(),
            engine: EngineOptions::default(),
        }
    }
}
