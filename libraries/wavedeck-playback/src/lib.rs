//! wavedeck - Playback Controller
//!
//! Platform-agnostic playback and visualization state management for the
//! wavedeck waveform player.
//!
//! This crate provides:
//! - The player state machine (idle / loading / ready / playing / error)
//! - Volume control with an independent mute flag and slider coupling rules
//! - A seeded, append-only source catalog with an upload policy
//! - Owned, self-revoking object-URL handles for uploaded files
//! - Deferred play intent across asynchronous source loads
//! - Stale-callback protection when sources are swapped rapidly
//! - Time display formatting
//!
//! # Architecture
//!
//! The waveform engine - the library that decodes audio and renders the
//! waveform - is a collaborator behind the [`WaveformEngine`] and
//! [`EngineFactory`] traits. The controller owns at most one engine instance
//! at a time and always tears the old one down before creating the next, so
//! a half-decoded instance can never write into the state that replaced it.
//! Browser bindings live in the [`wasm`] module behind the `wasm` feature.
//!
//! # Example
//!
//! ```rust
//! use wavedeck_playback::{
//!     AudioSource, EngineEvent, EngineFactory, EngineOptions, PlayerConfig,
//!     PlayerController, PlayerState, SourceCatalog, WaveformEngine,
//! };
//!
//! // A do-nothing engine; real deployments adapt a rendering library.
//! struct NullEngine;
//!
//! impl WaveformEngine for NullEngine {
//!     fn load(&mut self, _url: &str) {}
//!     fn subscribe(&mut self, _generation: u64) {}
//!     fn unsubscribe(&mut self) {}
//!     fn play_pause(&mut self) {}
//!     fn set_volume(&mut self, _level: f32) {}
//!     fn volume(&self) -> f32 {
//!         1.0
//!     }
//!     fn duration(&self) -> f64 {
//!         180.0
//!     }
//!     fn current_time(&self) -> f64 {
//!         0.0
//!     }
//!     fn destroy(&mut self) {}
//! }
//!
//! struct NullFactory;
//!
//! impl EngineFactory for NullFactory {
//!     type Engine = NullEngine;
//!     fn create(&mut self, _options: &EngineOptions) -> NullEngine {
//!         NullEngine
//!     }
//! }
//!
//! let catalog = SourceCatalog::seeded([
//!     AudioSource::bundled("Default Audio 1", "/audio/default1.mp3"),
//! ]);
//! let mut player = PlayerController::with_catalog(
//!     NullFactory,
//!     PlayerConfig::default(),
//!     catalog,
//! );
//!
//! player.select_index(0).unwrap();
//! assert_eq!(player.state(), PlayerState::Loading);
//!
//! // Asking to play before the decode finishes is honored at ready.
//! player.toggle_play_pause();
//! player.handle_engine_event(player.generation(), EngineEvent::Ready);
//! assert_eq!(player.state(), PlayerState::Playing);
//! ```

mod catalog;
mod controller;
mod engine;
mod error;
mod events;
mod format;
mod source;
mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use catalog::SourceCatalog;
pub use controller::PlayerController;
pub use engine::{EngineEvent, EngineFactory, EngineOptions, WaveformEngine};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use format::format_time;
pub use source::{AudioSource, ObjectUrl, SourceRef, UploadedFile};
pub use types::{PlayerConfig, PlayerState, SliderStyle};
pub use volume::Volume;
