//! Player controller - core orchestration
//!
//! Single owner of all player state: lifecycle, play intent, volume, the
//! active source, the catalog, and the one live engine instance. Everything
//! else in the system is either a collaborator behind a trait (the engine)
//! or a stateless view over the controller's getters and event stream.
//!
//! Lifecycle: `Idle → Loading → Ready ⇄ Playing`, with `Error` reachable
//! while loading or playing. Swapping sources always tears the old engine
//! down before the new one exists, and every engine event carries the
//! generation it was subscribed under, so a replaced instance cannot write
//! into current state even if its callbacks straggle.

use crate::{
    catalog::SourceCatalog,
    engine::{EngineEvent, EngineFactory, WaveformEngine},
    error::Result,
    events::PlayerEvent,
    source::{AudioSource, UploadedFile},
    types::{PlayerConfig, PlayerState},
    volume::Volume,
};
use std::collections::VecDeque;

/// The player state machine
pub struct PlayerController<F: EngineFactory> {
    factory: F,
    config: PlayerConfig,
    catalog: SourceCatalog,

    state: PlayerState,
    engine: Option<F::Engine>,
    /// Bumped on every engine creation; events from older instances are stale
    generation: u64,
    /// Intended play/pause state; applied at `Ready` when it arrives mid-load
    play_intent: bool,

    volume: Volume,
    duration: f64,
    current_time: f64,
    active: Option<AudioSource>,

    events: VecDeque<PlayerEvent>,
    disposed: bool,
}

impl<F: EngineFactory> PlayerController<F> {
    /// Create a controller with an empty catalog
    pub fn new(factory: F, config: PlayerConfig) -> Self {
        Self::with_catalog(factory, config, SourceCatalog::new())
    }

    /// Create a controller over a seeded catalog
    pub fn with_catalog(factory: F, config: PlayerConfig, catalog: SourceCatalog) -> Self {
        let volume = Volume::new(config.volume);
        Self {
            factory,
            config,
            catalog,
            state: PlayerState::Idle,
            engine: None,
            generation: 0,
            play_intent: false,
            volume,
            duration: 0.0,
            current_time: 0.0,
            active: None,
            events: VecDeque::new(),
            disposed: false,
        }
    }

    // ===== Source selection =====

    /// Select a catalog entry by index
    pub fn select_index(&mut self, index: usize) -> Result<()> {
        let source = self.catalog.get(index)?.clone();
        self.select_source(source);
        Ok(())
    }

    /// Load `source`, replacing whatever was active
    ///
    /// Re-selecting the already-active reference while the engine is ready
    /// or playing is a no-op. The play intent survives the swap, so a track
    /// change mid-playback resumes playing once the new source is ready.
    pub fn select_source(&mut self, source: AudioSource) {
        if self.disposed {
            tracing::warn!("select_source on a disposed controller ignored");
            return;
        }

        if let Some(active) = &self.active {
            if active.reference == source.reference
                && matches!(self.state, PlayerState::Ready | PlayerState::Playing)
            {
                tracing::debug!(name = %source.name, "source already active");
                return;
            }
        }

        // Old instance goes away completely before the new one exists.
        self.teardown_engine();
        self.generation += 1;

        self.duration = 0.0;
        self.current_time = 0.0;

        tracing::debug!(name = %source.name, generation = self.generation, "loading source");
        self.push_event(PlayerEvent::SourceChanged {
            name: source.name.clone(),
            reference: source.url().to_string(),
        });

        let url = source.url().to_string();
        self.active = Some(source);

        let mut engine = self.factory.create(&self.config.engine);
        engine.subscribe(self.generation);
        engine.load(&url);
        self.engine = Some(engine);

        self.set_state(PlayerState::Loading);
    }

    /// Validate, append, and select an uploaded file
    pub fn upload(&mut self, file: &dyn UploadedFile) -> Result<AudioSource> {
        let source = match self.catalog.add_upload(file) {
            Ok(source) => source,
            Err(err) => {
                self.push_event(PlayerEvent::Error {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };

        self.push_event(PlayerEvent::CatalogChanged {
            length: self.catalog.len(),
        });
        self.select_source(source.clone());
        Ok(source)
    }

    // ===== Transport =====

    /// Flip the intended play/pause state
    ///
    /// Ready and Playing forward the toggle to the engine immediately. While
    /// loading, only the intent flips; it is applied when ready fires. Idle
    /// and Error ignore the toggle entirely.
    pub fn toggle_play_pause(&mut self) {
        match self.state {
            PlayerState::Ready => {
                self.play_intent = true;
                if let Some(engine) = self.engine.as_mut() {
                    engine.play_pause();
                }
                self.set_state(PlayerState::Playing);
            }
            PlayerState::Playing => {
                self.play_intent = false;
                if let Some(engine) = self.engine.as_mut() {
                    engine.play_pause();
                }
                self.set_state(PlayerState::Ready);
            }
            PlayerState::Loading => {
                self.play_intent = !self.play_intent;
            }
            PlayerState::Idle | PlayerState::Error => {}
        }
    }

    // ===== Volume =====

    /// Set the volume level (0.0-1.0); zero mutes, above zero un-mutes
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set(level);
        self.push_volume();
    }

    /// Toggle mute without touching the stored level
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.push_volume();
    }

    /// Nudge the volume by `delta`, saturating at the bounds
    pub fn adjust_volume(&mut self, delta: f32) {
        self.volume.adjust(delta);
        self.push_volume();
    }

    /// Step up by the configured increment
    pub fn volume_up(&mut self) {
        self.adjust_volume(self.config.volume_step);
    }

    /// Step down by the configured increment
    pub fn volume_down(&mut self) {
        self.adjust_volume(-self.config.volume_step);
    }

    fn push_volume(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(self.volume.effective());
        }
        self.push_event(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    // ===== Engine callbacks =====

    /// Deliver an engine lifecycle event
    ///
    /// `generation` is the value the emitting instance was subscribed with;
    /// anything but the current generation is a straggler from a torn-down
    /// instance and is discarded.
    pub fn handle_engine_event(&mut self, generation: u64, event: EngineEvent) {
        if generation != self.generation || self.engine.is_none() {
            tracing::warn!(
                generation,
                current = self.generation,
                ?event,
                "discarding stale engine event"
            );
            return;
        }

        match event {
            EngineEvent::Ready => self.on_ready(),
            EngineEvent::TimeUpdate { seconds } => self.on_time_update(seconds),
            EngineEvent::Error { message } => self.on_error(message),
        }
    }

    fn on_ready(&mut self) {
        if self.state != PlayerState::Loading {
            tracing::warn!(state = ?self.state, "ready event outside of loading ignored");
            return;
        }

        let (duration, engine_level) = match self.engine.as_ref() {
            Some(engine) => (engine.duration().max(0.0), engine.volume()),
            None => return,
        };

        self.duration = duration;
        self.current_time = 0.0;

        // A fresh instance comes up at its own default volume; adopt it
        // unless muted, then push the effective value so mute carries over.
        self.volume.adopt(engine_level);
        let effective = self.volume.effective();
        if let Some(engine) = self.engine.as_mut() {
            engine.set_volume(effective);
        }

        self.push_event(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
        });
        self.push_event(PlayerEvent::PositionUpdate {
            position_secs: 0.0,
            duration_secs: self.duration,
        });
        self.set_state(PlayerState::Ready);

        if self.play_intent {
            if let Some(engine) = self.engine.as_mut() {
                engine.play_pause();
            }
            self.set_state(PlayerState::Playing);
        }
    }

    fn on_time_update(&mut self, seconds: f64) {
        if !matches!(self.state, PlayerState::Ready | PlayerState::Playing) {
            return;
        }
        if !seconds.is_finite() {
            return;
        }

        self.current_time = seconds.clamp(0.0, self.duration);
        self.push_event(PlayerEvent::PositionUpdate {
            position_secs: self.current_time,
            duration_secs: self.duration,
        });
    }

    fn on_error(&mut self, message: String) {
        tracing::error!(%message, "engine error");

        // Duration and position stay frozen for display; the instance is
        // released so nothing dangles while the machine sits in Error.
        self.teardown_engine();
        self.set_state(PlayerState::Error);
        self.push_event(PlayerEvent::Error { message });
    }

    // ===== Teardown =====

    fn teardown_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.unsubscribe();
            engine.destroy();
            tracing::debug!(generation = self.generation, "engine torn down");
        }
    }

    /// Release the engine and every held resource, from any state
    ///
    /// Clearing the catalog and the active source drops the controller's
    /// object-URL handles, revoking uploaded URLs. Idempotent; also runs
    /// from `Drop`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.teardown_engine();
        self.active = None;
        self.catalog.clear();
        self.play_intent = false;
        self.set_state(PlayerState::Idle);
    }

    // ===== State queries =====

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn volume_level(&self) -> f32 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// The value the engine is driven with: `0.0` while muted
    pub fn effective_volume(&self) -> f32 {
        self.volume.effective()
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn active_source(&self) -> Option<&AudioSource> {
        self.active.as_ref()
    }

    /// Selector index of the active source, if it is a catalog entry
    pub fn active_index(&self) -> Option<usize> {
        let active = self.active.as_ref()?;
        self.catalog.index_of(&active.reference)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.active.as_ref().map(|source| source.name.as_str())
    }

    /// Caption for the labeled slider style
    pub fn volume_label(&self) -> String {
        if self.volume.is_muted() {
            "Muted".to_string()
        } else {
            format!("Volume: {}%", (self.volume.level() * 100.0).round() as u32)
        }
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Generation of the live engine instance
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drain the queued UI events
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain(..).collect()
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state != state {
            self.state = state;
            self.push_event(PlayerEvent::StateChanged { state });
        }
    }

    fn push_event(&mut self, event: PlayerEvent) {
        self.events.push_back(event);
    }
}

impl<F: EngineFactory> Drop for PlayerController<F> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{MockFactory, MockLog};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn controller_with_defaults() -> (PlayerController<MockFactory>, Rc<RefCell<MockLog>>) {
        let factory = MockFactory::new(180.0, 1.0);
        let log = Rc::clone(&factory.log);
        let catalog = SourceCatalog::seeded([
            AudioSource::bundled("Default Audio 1", "/audio/default1.mp3"),
            AudioSource::bundled("Default Audio 2", "/audio/default2.mp3"),
        ]);
        let controller = PlayerController::with_catalog(factory, PlayerConfig::default(), catalog);
        (controller, log)
    }

    #[test]
    fn starts_idle_with_no_engine() {
        let (controller, log) = controller_with_defaults();
        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(log.borrow().created, 0);
        assert_eq!(controller.duration(), 0.0);
        assert!(controller.display_name().is_none());
    }

    #[test]
    fn select_creates_subscribes_and_loads() {
        let (mut controller, log) = controller_with_defaults();

        controller.select_index(0).unwrap();
        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(controller.display_name(), Some("Default Audio 1"));

        let log = log.borrow();
        assert_eq!(log.created, 1);
        assert_eq!(log.subscribes, 1);
        assert_eq!(log.subscribed_generations, vec![1]);
        assert_eq!(log.loads, vec!["/audio/default1.mp3".to_string()]);
    }

    #[test]
    fn ready_without_toggle_lands_in_ready() {
        let (mut controller, _log) = controller_with_defaults();
        controller.select_index(0).unwrap();

        controller.handle_engine_event(1, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Ready);
        assert_eq!(controller.duration(), 180.0);
        assert_eq!(controller.current_time(), 0.0);
    }

    #[test]
    fn toggle_during_loading_defers_until_ready() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();

        controller.toggle_play_pause();
        // Still loading: nothing was forwarded to the engine yet.
        assert_eq!(controller.state(), PlayerState::Loading);
        assert_eq!(log.borrow().play_pauses, 0);

        controller.handle_engine_event(1, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Playing);
        assert_eq!(log.borrow().play_pauses, 1);
    }

    #[test]
    fn double_toggle_during_loading_cancels_the_intent() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();

        controller.toggle_play_pause();
        controller.toggle_play_pause();

        controller.handle_engine_event(1, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Ready);
        assert_eq!(log.borrow().play_pauses, 0);
    }

    #[test]
    fn play_pause_round_trip() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        controller.toggle_play_pause();
        assert_eq!(controller.state(), PlayerState::Playing);

        controller.toggle_play_pause();
        assert_eq!(controller.state(), PlayerState::Ready);
        assert_eq!(log.borrow().play_pauses, 2);
    }

    #[test]
    fn toggle_is_inert_in_idle_and_error() {
        let (mut controller, log) = controller_with_defaults();

        controller.toggle_play_pause();
        assert_eq!(controller.state(), PlayerState::Idle);

        controller.select_index(0).unwrap();
        controller.handle_engine_event(
            1,
            EngineEvent::Error {
                message: "decode failed".to_string(),
            },
        );
        assert_eq!(controller.state(), PlayerState::Error);

        let before = log.borrow().play_pauses;
        controller.toggle_play_pause();
        assert_eq!(controller.state(), PlayerState::Error);
        assert_eq!(log.borrow().play_pauses, before);
    }

    #[test]
    fn swapping_sources_destroys_the_old_engine_first() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        controller.select_index(1).unwrap();
        assert_eq!(controller.state(), PlayerState::Loading);

        let log = log.borrow();
        assert_eq!(log.created, 2);
        assert_eq!(log.unsubscribes, 1);
        assert_eq!(log.destroys, 1);
        assert_eq!(log.subscribed_generations, vec![1, 2]);
    }

    #[test]
    fn reselecting_the_active_source_is_a_no_op() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        controller.select_index(0).unwrap();
        assert_eq!(controller.state(), PlayerState::Ready);
        assert_eq!(log.borrow().created, 1);
    }

    #[test]
    fn reselecting_while_loading_restarts_the_load() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();

        // Not ready yet, so the same reference loads again from scratch.
        controller.select_index(0).unwrap();
        assert_eq!(log.borrow().created, 2);
        assert_eq!(controller.state(), PlayerState::Loading);
    }

    #[test]
    fn stale_ready_from_a_replaced_engine_is_discarded() {
        let (mut controller, _log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.select_index(1).unwrap();

        // Generation 1 belongs to the torn-down first engine.
        controller.handle_engine_event(1, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Loading);

        controller.handle_engine_event(2, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Ready);
        assert_eq!(controller.display_name(), Some("Default Audio 2"));
    }

    #[test]
    fn play_intent_survives_a_mid_playback_swap() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);
        controller.toggle_play_pause();
        assert!(controller.is_playing());

        controller.select_index(1).unwrap();
        controller.handle_engine_event(2, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Playing);
        // One toggle from the user, one replay on the new instance.
        assert_eq!(log.borrow().play_pauses, 2);
    }

    #[test]
    fn ready_adopts_engine_volume_and_pushes_effective() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        // Engine default is 1.0; adopted since not muted, then pushed back.
        assert_eq!(controller.volume_level(), 1.0);
        assert_eq!(log.borrow().volumes_pushed, vec![1.0]);
    }

    #[test]
    fn mute_survives_a_source_swap() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        controller.toggle_mute();
        controller.select_index(1).unwrap();
        controller.handle_engine_event(2, EngineEvent::Ready);

        assert!(controller.is_muted());
        assert_eq!(controller.effective_volume(), 0.0);
        // The ready reconciliation pushed 0.0, not the engine default.
        assert_eq!(log.borrow().volumes_pushed.last(), Some(&0.0));
    }

    #[test]
    fn volume_changes_reach_the_engine_as_effective_values() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        controller.set_volume(0.3);
        controller.toggle_mute();
        controller.toggle_mute();

        let pushed = log.borrow().volumes_pushed.clone();
        // ready reconciliation, set, mute, unmute
        assert_eq!(pushed, vec![1.0, 0.3, 0.0, 0.3]);
    }

    #[test]
    fn time_updates_are_clamped_to_duration() {
        let (mut controller, _log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        controller.handle_engine_event(1, EngineEvent::TimeUpdate { seconds: 42.0 });
        assert_eq!(controller.current_time(), 42.0);

        controller.handle_engine_event(1, EngineEvent::TimeUpdate { seconds: 999.0 });
        assert_eq!(controller.current_time(), 180.0);

        controller.handle_engine_event(1, EngineEvent::TimeUpdate { seconds: -3.0 });
        assert_eq!(controller.current_time(), 0.0);
    }

    #[test]
    fn error_freezes_display_state_and_releases_the_engine() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);
        controller.handle_engine_event(1, EngineEvent::TimeUpdate { seconds: 42.0 });

        controller.handle_engine_event(
            1,
            EngineEvent::Error {
                message: "corrupt frame".to_string(),
            },
        );

        assert_eq!(controller.state(), PlayerState::Error);
        assert_eq!(controller.duration(), 180.0);
        assert_eq!(controller.current_time(), 42.0);
        assert_eq!(controller.display_name(), Some("Default Audio 1"));
        assert_eq!(log.borrow().destroys, 1);

        // A straggling time update from the dead instance changes nothing.
        controller.handle_engine_event(1, EngineEvent::TimeUpdate { seconds: 50.0 });
        assert_eq!(controller.current_time(), 42.0);
    }

    #[test]
    fn error_recovers_through_a_new_selection() {
        let (mut controller, _log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(
            1,
            EngineEvent::Error {
                message: "decode failed".to_string(),
            },
        );

        controller.select_index(1).unwrap();
        controller.handle_engine_event(2, EngineEvent::Ready);
        assert_eq!(controller.state(), PlayerState::Ready);
        assert_eq!(controller.display_name(), Some("Default Audio 2"));
    }

    #[test]
    fn select_index_out_of_range_changes_nothing() {
        let (mut controller, log) = controller_with_defaults();

        assert!(controller.select_index(9).is_err());
        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(log.borrow().created, 0);
    }

    #[test]
    fn dispose_balances_every_subscription_from_any_state() {
        type Prepare = fn(&mut PlayerController<MockFactory>);
        let preparations: [Prepare; 4] = [
            |_| {},
            |c| {
                c.select_index(0).unwrap();
            },
            |c| {
                c.select_index(0).unwrap();
                c.handle_engine_event(1, EngineEvent::Ready);
            },
            |c| {
                c.select_index(0).unwrap();
                c.handle_engine_event(1, EngineEvent::Ready);
                c.toggle_play_pause();
            },
        ];
        for prepare in preparations {
            let (mut controller, log) = controller_with_defaults();
            prepare(&mut controller);
            controller.dispose();

            let log = log.borrow();
            assert_eq!(log.subscribes, log.unsubscribes);
            assert_eq!(log.created, log.destroys);
            assert_eq!(controller.state(), PlayerState::Idle);
        }
    }

    #[test]
    fn dispose_is_idempotent_and_drop_reuses_it() {
        let (mut controller, log) = controller_with_defaults();
        controller.select_index(0).unwrap();

        controller.dispose();
        controller.dispose();
        drop(controller);

        let log = log.borrow();
        assert_eq!(log.destroys, 1);
        assert_eq!(log.unsubscribes, 1);
    }

    #[test]
    fn volume_label_tracks_mute_state() {
        let (mut controller, _log) = controller_with_defaults();
        assert_eq!(controller.volume_label(), "Volume: 50%");

        controller.toggle_mute();
        assert_eq!(controller.volume_label(), "Muted");

        controller.toggle_mute();
        controller.set_volume(0.75);
        assert_eq!(controller.volume_label(), "Volume: 75%");
    }

    #[test]
    fn events_narrate_a_load_cycle() {
        let (mut controller, _log) = controller_with_defaults();
        controller.select_index(0).unwrap();
        controller.handle_engine_event(1, EngineEvent::Ready);

        let events = controller.take_events();
        assert!(events.contains(&PlayerEvent::SourceChanged {
            name: "Default Audio 1".to_string(),
            reference: "/audio/default1.mp3".to_string(),
        }));
        assert!(events.contains(&PlayerEvent::StateChanged {
            state: PlayerState::Loading,
        }));
        assert!(events.contains(&PlayerEvent::StateChanged {
            state: PlayerState::Ready,
        }));

        // Drained: a second take yields nothing new.
        assert!(controller.take_events().is_empty());
    }

    #[test]
    fn active_index_follows_the_selection() {
        let (mut controller, _log) = controller_with_defaults();
        assert_eq!(controller.active_index(), None);

        controller.select_index(1).unwrap();
        assert_eq!(controller.active_index(), Some(1));
    }
}
