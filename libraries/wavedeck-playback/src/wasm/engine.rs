//! Waveform engine adapter over a JS engine instance
//!
//! The page hands the constructor a factory function `(surface, options) ->
//! instance`; the instance is expected to expose the engine contract
//! (`load`, `playPause`, `setVolume`, `getVolume`, `getDuration`,
//! `getCurrentTime`, `destroy`) plus `on`/`off` subscription management for
//! the `ready`, `time-update`, and `error` events.
//!
//! Engine callbacks never reach the controller directly: each handler pushes
//! a generation-tagged event into a shared inbox and schedules the dispatch
//! function on a fresh task. Even an engine that fires events synchronously
//! from inside `load` cannot reenter the controller that way.

use crate::engine::{EngineEvent, EngineFactory, EngineOptions, WaveformEngine};
use js_sys::{Array, Function, Reflect};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Events queued by engine callbacks until the dispatch task drains them
pub(crate) type EventInbox = Rc<RefCell<VecDeque<(u64, EngineEvent)>>>;

const EVENT_NAMES: [&str; 3] = ["ready", "time-update", "error"];

/// One live JS engine instance
pub struct JsWaveformEngine {
    instance: JsValue,
    inbox: EventInbox,
    dispatch: Function,
    handlers: Vec<Closure<dyn FnMut(JsValue)>>,
    destroyed: bool,
}

impl JsWaveformEngine {
    fn new(instance: JsValue, inbox: EventInbox, dispatch: Function) -> Self {
        Self {
            instance,
            inbox,
            dispatch,
            handlers: Vec::new(),
            destroyed: false,
        }
    }

    fn call(&self, name: &str, args: &[&JsValue]) -> Option<JsValue> {
        let method = Reflect::get(&self.instance, &JsValue::from_str(name)).ok()?;
        let method: Function = method.dyn_into().ok()?;

        let list = Array::new();
        for &arg in args {
            list.push(arg);
        }

        match Reflect::apply(&method, &self.instance, &list) {
            Ok(value) => Some(value),
            Err(err) => {
                web_sys::console::warn_2(
                    &JsValue::from_str(&format!("engine call '{name}' failed")),
                    &err,
                );
                None
            }
        }
    }

    fn number(&self, name: &str) -> f64 {
        self.call(name, &[])
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0)
    }
}

impl WaveformEngine for JsWaveformEngine {
    fn load(&mut self, url: &str) {
        self.call("load", &[&JsValue::from_str(url)]);
    }

    fn subscribe(&mut self, generation: u64) {
        self.unsubscribe();

        for name in EVENT_NAMES {
            let inbox = Rc::clone(&self.inbox);
            let dispatch = self.dispatch.clone();

            let handler = Closure::wrap(Box::new(move |payload: JsValue| {
                let event = match name {
                    "ready" => EngineEvent::Ready,
                    "time-update" => EngineEvent::TimeUpdate {
                        seconds: payload.as_f64().unwrap_or(0.0),
                    },
                    _ => EngineEvent::Error {
                        message: payload
                            .as_string()
                            .unwrap_or_else(|| format!("{payload:?}")),
                    },
                };
                inbox.borrow_mut().push_back((generation, event));

                if let Some(window) = web_sys::window() {
                    let _ = window.set_timeout_with_callback(&dispatch);
                }
            }) as Box<dyn FnMut(JsValue)>);

            self.call("on", &[&JsValue::from_str(name), handler.as_ref()]);
            self.handlers.push(handler);
        }
    }

    fn unsubscribe(&mut self) {
        if self.handlers.is_empty() {
            return;
        }
        for name in EVENT_NAMES {
            self.call("off", &[&JsValue::from_str(name)]);
        }
        // Dropping the closures invalidates the JS-side functions.
        self.handlers.clear();
    }

    fn play_pause(&mut self) {
        self.call("playPause", &[]);
    }

    fn set_volume(&mut self, level: f32) {
        self.call("setVolume", &[&JsValue::from_f64(f64::from(level))]);
    }

    fn volume(&self) -> f32 {
        self.number("getVolume") as f32
    }

    fn duration(&self) -> f64 {
        self.number("getDuration")
    }

    fn current_time(&self) -> f64 {
        self.number("getCurrentTime")
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.call("destroy", &[]);
    }
}

/// Creates JS engine instances through the page-supplied factory function
pub struct JsEngineFactory {
    create_fn: Function,
    surface: JsValue,
    inbox: EventInbox,
    dispatch: Function,
}

impl JsEngineFactory {
    pub(crate) fn new(
        create_fn: Function,
        surface: JsValue,
        inbox: EventInbox,
        dispatch: Function,
    ) -> Self {
        Self {
            create_fn,
            surface,
            inbox,
            dispatch,
        }
    }
}

impl EngineFactory for JsEngineFactory {
    type Engine = JsWaveformEngine;

    fn create(&mut self, options: &EngineOptions) -> JsWaveformEngine {
        let options = serde_wasm_bindgen::to_value(options).unwrap_or(JsValue::UNDEFINED);

        let instance = match self.create_fn.call2(&JsValue::NULL, &self.surface, &options) {
            Ok(instance) => instance,
            Err(err) => {
                web_sys::console::warn_2(&JsValue::from_str("engine factory failed"), &err);
                JsValue::UNDEFINED
            }
        };

        JsWaveformEngine::new(instance, Rc::clone(&self.inbox), self.dispatch.clone())
    }
}
