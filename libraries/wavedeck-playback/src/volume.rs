//! Volume control with an independent mute flag
//!
//! The stored level and the mute flag are separate: muting suppresses output
//! without touching the level, so unmuting restores the previous loudness.
//! Only the effective value (`0.0` while muted) is ever pushed to the engine.

/// Volume controller
///
/// Level is a linear gain in `[0.0, 1.0]`, matching what the slider produces
/// and what the engine consumes.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Stored level (0.0-1.0)
    level: f32,

    /// Mute state (preserves the stored level)
    muted: bool,
}

impl Volume {
    /// Create a new volume controller
    ///
    /// A zero initial level starts out muted, consistent with [`set`].
    ///
    /// [`set`]: Volume::set
    pub fn new(level: f32) -> Self {
        let level = sanitize(level);
        Self {
            level,
            muted: level == 0.0,
        }
    }

    /// Set the level from user input (0.0-1.0, clamped)
    ///
    /// Two coupling rules apply:
    /// - moving the slider above zero while muted un-mutes;
    /// - setting the level to exactly zero mutes, rather than leaving a
    ///   "hearing nothing but not muted" state.
    pub fn set(&mut self, level: f32) {
        let level = sanitize(level);
        if self.muted && level > 0.0 {
            self.muted = false;
        }
        self.level = level;
        if level == 0.0 {
            self.muted = true;
        }
    }

    /// Nudge the level by `delta`, saturating at both bounds
    pub fn adjust(&mut self, delta: f32) {
        self.set(self.level + delta);
    }

    /// Adopt an engine-reported level without the slider coupling rules
    ///
    /// Used when a freshly created engine reports its default volume. While
    /// muted the stored level is kept so the mute survives a source swap.
    pub fn adopt(&mut self, level: f32) {
        if !self.muted {
            self.level = sanitize(level);
        }
    }

    /// Toggle mute; the stored level is untouched
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Get the stored level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get the value to push to the engine: `0.0` while muted, else the level
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.5)
    }
}

fn sanitize(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
