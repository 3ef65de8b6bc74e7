//! WASM bindings for wavedeck-playback
//!
//! This module provides WebAssembly bindings for the player controller,
//! allowing the core playback logic to drive a JS waveform engine in the
//! browser. The page supplies an engine factory function; everything else -
//! state, volume policy, catalog, upload handling - stays in Rust.

pub mod controller;
pub mod engine;
pub mod types;

pub use controller::WasmPlayerController;
pub use engine::{JsEngineFactory, JsWaveformEngine};
pub use types::{SeedEntry, SourceView, WebFileUpload};
