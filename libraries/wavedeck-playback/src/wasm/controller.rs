//! WASM-compatible player controller wrapper
//!
//! Wraps the core controller with a JavaScript-friendly API: camelCase
//! methods for user intents, callback registration for derived view state,
//! and the browser entry points for file uploads and drag-and-drop.

use super::engine::{EventInbox, JsEngineFactory};
use super::types::{SeedEntry, SourceView, WebFileUpload};
use crate::{
    format_time, AudioSource, PlaybackError, PlayerConfig, PlayerController, PlayerEvent,
    PlayerState, SliderStyle, SourceCatalog,
};
use js_sys::Function;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type Inner = PlayerController<JsEngineFactory>;

#[derive(Clone, Default)]
struct JsCallbacks {
    on_state_change: Option<Function>,
    on_source_change: Option<Function>,
    on_time_update: Option<Function>,
    on_volume_change: Option<Function>,
    on_catalog_change: Option<Function>,
    on_error: Option<Function>,
}

/// Browser facade over the player controller
///
/// The constructor takes the waveform surface element, an engine factory
/// function `(surface, options) -> instance`, an optional configuration
/// object, and an optional `[{name, url}]` default catalog.
#[wasm_bindgen]
pub struct WasmPlayerController {
    // The slot indirection lets the dispatch closure exist before the
    // controller it feeds.
    inner: Rc<RefCell<Option<Inner>>>,
    callbacks: Rc<RefCell<JsCallbacks>>,
    _dispatch: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl WasmPlayerController {
    /// Create a new player controller
    #[wasm_bindgen(constructor)]
    pub fn new(
        surface: JsValue,
        engine_factory: Function,
        config: JsValue,
        seeds: JsValue,
    ) -> Result<WasmPlayerController, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|err| JsValue::from_str(&err.to_string()))?
        };

        let seeds: Vec<SeedEntry> = if seeds.is_undefined() || seeds.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(seeds).map_err(|err| JsValue::from_str(&err.to_string()))?
        };

        let inbox: EventInbox = Rc::new(RefCell::new(VecDeque::new()));
        let inner: Rc<RefCell<Option<Inner>>> = Rc::new(RefCell::new(None));
        let callbacks = Rc::new(RefCell::new(JsCallbacks::default()));

        let dispatch = {
            let inbox = Rc::clone(&inbox);
            let inner = Rc::clone(&inner);
            let callbacks = Rc::clone(&callbacks);
            Closure::wrap(Box::new(move || {
                let queued = {
                    let mut guard = inner.borrow_mut();
                    let Some(player) = guard.as_mut() else {
                        return;
                    };
                    loop {
                        // Scoped so the inbox is free while the event is handled.
                        let next = { inbox.borrow_mut().pop_front() };
                        let Some((generation, event)) = next else {
                            break;
                        };
                        player.handle_engine_event(generation, event);
                    }
                    player.take_events()
                };
                // Borrows are released before any JS callback runs, so a
                // callback may safely call back into the controller.
                emit_events(&queued, &callbacks);
            }) as Box<dyn FnMut()>)
        };

        let dispatch_fn: Function = dispatch.as_ref().unchecked_ref::<Function>().clone();
        let factory = JsEngineFactory::new(engine_factory, surface, inbox, dispatch_fn);

        let catalog = SourceCatalog::seeded(
            seeds
                .into_iter()
                .map(|seed| AudioSource::bundled(seed.name, seed.url)),
        );
        *inner.borrow_mut() = Some(PlayerController::with_catalog(factory, config, catalog));

        Ok(Self {
            inner,
            callbacks,
            _dispatch: dispatch,
        })
    }

    // ===== Callback registration =====

    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&self, callback: Function) {
        self.callbacks.borrow_mut().on_state_change = Some(callback);
    }

    #[wasm_bindgen(js_name = onSourceChange)]
    pub fn on_source_change(&self, callback: Function) {
        self.callbacks.borrow_mut().on_source_change = Some(callback);
    }

    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&self, callback: Function) {
        self.callbacks.borrow_mut().on_time_update = Some(callback);
    }

    #[wasm_bindgen(js_name = onVolumeChange)]
    pub fn on_volume_change(&self, callback: Function) {
        self.callbacks.borrow_mut().on_volume_change = Some(callback);
    }

    #[wasm_bindgen(js_name = onCatalogChange)]
    pub fn on_catalog_change(&self, callback: Function) {
        self.callbacks.borrow_mut().on_catalog_change = Some(callback);
    }

    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&self, callback: Function) {
        self.callbacks.borrow_mut().on_error = Some(callback);
    }

    // ===== Source selection =====

    /// Load a catalog entry by selector index
    #[wasm_bindgen(js_name = selectSource)]
    pub fn select_source(&self, index: usize) -> Result<(), JsValue> {
        self.with_player(|player| player.select_index(index))
            .map_err(fail)
    }

    /// Validate, append, and load an uploaded file
    #[wasm_bindgen(js_name = uploadFile)]
    pub fn upload_file(&self, file: web_sys::File) -> Result<(), JsValue> {
        self.with_player(|player| player.upload(&WebFileUpload::new(file)).map(|_| ()))
            .map_err(fail)
    }

    /// Drop-zone handler; suppresses the browser's default navigation
    #[wasm_bindgen(js_name = handleDrop)]
    pub fn handle_drop(&self, event: web_sys::DragEvent) -> Result<(), JsValue> {
        event.prevent_default();

        let file = event
            .data_transfer()
            .and_then(|transfer| transfer.files())
            .and_then(|files| files.get(0));

        match file {
            Some(file) => self.upload_file(file),
            None => Ok(()),
        }
    }

    /// Drag-over handler; required for the drop event to fire at all
    #[wasm_bindgen(js_name = handleDragOver)]
    pub fn handle_drag_over(&self, event: &web_sys::DragEvent) {
        event.prevent_default();
    }

    // ===== Transport and volume =====

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) {
        let _ = self.with_player(|player| {
            player.toggle_play_pause();
            Ok(())
        });
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, level: f32) {
        let _ = self.with_player(|player| {
            player.set_volume(level);
            Ok(())
        });
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        let _ = self.with_player(|player| {
            player.toggle_mute();
            Ok(())
        });
    }

    #[wasm_bindgen(js_name = volumeUp)]
    pub fn volume_up(&self) {
        let _ = self.with_player(|player| {
            player.volume_up();
            Ok(())
        });
    }

    #[wasm_bindgen(js_name = volumeDown)]
    pub fn volume_down(&self) {
        let _ = self.with_player(|player| {
            player.volume_down();
            Ok(())
        });
    }

    /// Release the engine and every held resource
    pub fn dispose(&self) {
        let _ = self.with_player(|player| {
            player.dispose();
            Ok(())
        });
    }

    // ===== State queries =====

    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.read(|player| state_name(player.state()).to_string())
            .unwrap_or_else(|| "idle".to_string())
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.read(PlayerController::is_playing).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> f64 {
        self.read(PlayerController::current_time).unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = getDuration)]
    pub fn get_duration(&self) -> f64 {
        self.read(PlayerController::duration).unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> f32 {
        self.read(PlayerController::volume_level).unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = isMuted)]
    pub fn is_muted(&self) -> bool {
        self.read(PlayerController::is_muted).unwrap_or(false)
    }

    /// Slider binding value: zero while muted, else the stored level
    #[wasm_bindgen(js_name = sliderVolume)]
    pub fn slider_volume(&self) -> f32 {
        self.read(PlayerController::effective_volume).unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = volumeLabel)]
    pub fn volume_label(&self) -> String {
        self.read(PlayerController::volume_label)
            .unwrap_or_else(|| "Muted".to_string())
    }

    /// Configured slider presentation: `"simple"` or `"labeled"`
    #[wasm_bindgen(js_name = sliderStyle)]
    pub fn slider_style(&self) -> String {
        self.read(|player| match player.config().slider {
            SliderStyle::Simple => "simple".to_string(),
            SliderStyle::Labeled => "labeled".to_string(),
        })
        .unwrap_or_else(|| "labeled".to_string())
    }

    #[wasm_bindgen(js_name = displayName)]
    pub fn display_name(&self) -> Option<String> {
        self.read(|player| player.display_name().map(ToString::to_string))
            .flatten()
    }

    /// Selector index of the active source
    #[wasm_bindgen(js_name = activeIndex)]
    pub fn active_index(&self) -> Option<u32> {
        self.read(|player| player.active_index().map(|index| index as u32))
            .flatten()
    }

    #[wasm_bindgen(js_name = catalogLength)]
    pub fn catalog_length(&self) -> usize {
        self.read(|player| player.catalog().len()).unwrap_or(0)
    }

    /// Catalog entries as `[{name, url}]` for selector rendering
    pub fn catalog(&self) -> Result<JsValue, JsValue> {
        let views: Vec<SourceView> = self
            .read(|player| player.catalog().iter().map(SourceView::from).collect())
            .unwrap_or_default();
        serde_wasm_bindgen::to_value(&views).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    #[wasm_bindgen(js_name = formattedPosition)]
    pub fn formatted_position(&self) -> String {
        format_time(self.get_position())
    }

    #[wasm_bindgen(js_name = formattedDuration)]
    pub fn formatted_duration(&self) -> String {
        format_time(self.get_duration())
    }
}

impl WasmPlayerController {
    fn with_player<R>(
        &self,
        op: impl FnOnce(&mut Inner) -> Result<R, PlaybackError>,
    ) -> Result<R, PlaybackError> {
        let (result, queued) = {
            let mut guard = self.inner.borrow_mut();
            let Some(player) = guard.as_mut() else {
                return Err(PlaybackError::LoadFailure(
                    "player not initialized".to_string(),
                ));
            };
            let result = op(player);
            (result, player.take_events())
        };
        emit_events(&queued, &self.callbacks);
        result
    }

    fn read<R>(&self, op: impl FnOnce(&Inner) -> R) -> Option<R> {
        self.inner.borrow().as_ref().map(op)
    }
}

/// Format a position in seconds as `HH:MM:SS`
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time_js(seconds: f64) -> String {
    format_time(seconds)
}

fn fail(err: PlaybackError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn state_name(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Idle => "idle",
        PlayerState::Loading => "loading",
        PlayerState::Ready => "ready",
        PlayerState::Playing => "playing",
        PlayerState::Error => "error",
    }
}

fn emit_events(events: &[PlayerEvent], callbacks: &Rc<RefCell<JsCallbacks>>) {
    // Snapshot the handles so no borrow is live while JS runs; a callback
    // that re-registers callbacks affects the next batch, not this one.
    let snapshot = callbacks.borrow().clone();

    for event in events {
        let result = match event {
            PlayerEvent::StateChanged { state } => {
                snapshot.on_state_change.as_ref().map(|callback| {
                    callback.call1(&JsValue::NULL, &JsValue::from_str(state_name(*state)))
                })
            }
            PlayerEvent::SourceChanged { name, reference } => {
                snapshot.on_source_change.as_ref().map(|callback| {
                    callback.call2(
                        &JsValue::NULL,
                        &JsValue::from_str(name),
                        &JsValue::from_str(reference),
                    )
                })
            }
            PlayerEvent::PositionUpdate {
                position_secs,
                duration_secs,
            } => snapshot.on_time_update.as_ref().map(|callback| {
                callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_f64(*position_secs),
                    &JsValue::from_f64(*duration_secs),
                )
            }),
            PlayerEvent::VolumeChanged { level, muted } => {
                snapshot.on_volume_change.as_ref().map(|callback| {
                    callback.call2(
                        &JsValue::NULL,
                        &JsValue::from_f64(f64::from(*level)),
                        &JsValue::from_bool(*muted),
                    )
                })
            }
            PlayerEvent::CatalogChanged { length } => {
                snapshot.on_catalog_change.as_ref().map(|callback| {
                    callback.call1(&JsValue::NULL, &JsValue::from_f64(*length as f64))
                })
            }
            PlayerEvent::Error { message } => snapshot
                .on_error
                .as_ref()
                .map(|callback| callback.call1(&JsValue::NULL, &JsValue::from_str(message))),
        };

        if let Some(Err(err)) = result {
            web_sys::console::warn_2(&JsValue::from_str("player callback failed"), &err);
        }
    }
}
