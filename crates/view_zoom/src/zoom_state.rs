//! Per-entity zoom state and the pure math that moves it.
//!
//! `ZoomState` is also the capability marker: an entity can adjust its zoom
//! exactly when it carries one. All mutators keep
//! `min_zoom <= target <= max_zoom` componentwise.

use bevy::prelude::*;

use crate::config::{DEFAULT_MAX_ZOOM, IDENTITY_ZOOM};
use crate::eye::Eye;

/// Clamp a zoom value into `[min, max]` componentwise.
///
/// Written as `max(min, min(max, value))` so a NaN component lands on a bound
/// and an inverted range never panics.
#[inline]
pub fn clamp_zoom(value: Vec2, min: Vec2, max: Vec2) -> Vec2 {
    value.min(max).max(min)
}

/// Exponential interpolation factor for a given rate and delta time.
///
/// `1 - exp(-gain * dt)` lies in `[0, 1)` for every `dt >= 0`, so a step
/// scaled by it can never pass the target, however long the frame was. For
/// small `dt` it is `gain * dt` to first order.
#[inline]
pub fn exp_lerp_factor(gain: f32, dt: f32) -> f32 {
    1.0 - (-gain * dt).exp()
}

/// Outcome of one interpolation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// `current` moved closer to `target`.
    Moved,
    /// `current` is now exactly `target`; the entity can be deactivated.
    Converged,
    /// Non-positive `dt`: nothing moved.
    Unchanged,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
#[require(Eye)]
pub struct ZoomState {
    pub(crate) current: Vec2,
    pub(crate) target: Vec2,
    pub(crate) max_zoom: Vec2,
}

impl ZoomState {
    /// Capability with the given cap. `current` and `target` are placeholders
    /// until the attach step copies them from the entity's `Eye`.
    pub fn new(max_zoom: Vec2) -> Self {
        Self {
            current: IDENTITY_ZOOM,
            target: IDENTITY_ZOOM,
            max_zoom,
        }
    }

    /// State for a view whose zoom is currently `view_zoom`.
    ///
    /// `current` keeps the view's value so nothing pops; `target` is clamped
    /// into bounds, and the cap is never allowed below `min_zoom`.
    pub fn attached(view_zoom: Vec2, max_zoom: Vec2, min_zoom: Vec2) -> Self {
        let max_zoom = max_zoom.max(min_zoom);
        Self {
            current: view_zoom,
            target: clamp_zoom(view_zoom, min_zoom, max_zoom),
            max_zoom,
        }
    }

    #[inline]
    pub fn current(&self) -> Vec2 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    #[inline]
    pub fn max_zoom(&self) -> Vec2 {
        self.max_zoom
    }

    /// True while the rendered value still differs from the target.
    #[inline]
    pub fn needs_interpolation(&self) -> bool {
        self.current != self.target
    }

    /// Move `current` toward `target` for `dt` seconds at `gain`.
    pub fn advance(&mut self, dt: f32, gain: f32, epsilon: f32) -> Advance {
        let delta = self.target - self.current;
        if delta.length_squared() < epsilon {
            self.current = self.target;
            return Advance::Converged;
        }
        if dt <= 0.0 {
            return Advance::Unchanged;
        }
        self.current += delta * exp_lerp_factor(gain, dt);
        Advance::Moved
    }

    /// One zoom step in (`target / step`) or out (`target * step`).
    ///
    /// Returns false when the clamped result equals the current target, which
    /// is how repeated presses at a limit stay silent.
    pub fn step_zoom(&mut self, zoom_in: bool, step: f32, min_zoom: Vec2) -> bool {
        let factor = if zoom_in { 1.0 / step } else { step };
        let proposed = clamp_zoom(self.target * factor, min_zoom, self.max_zoom);
        if proposed == self.target {
            return false;
        }
        self.target = proposed;
        true
    }

    /// Return the target to identity (clamped into bounds).
    pub fn reset(&mut self, min_zoom: Vec2) -> bool {
        let identity = clamp_zoom(IDENTITY_ZOOM, min_zoom, self.max_zoom);
        if self.target == identity {
            return false;
        }
        self.target = identity;
        true
    }

    /// Replace the cap and re-clamp the target under it.
    pub fn set_max_zoom(&mut self, max_zoom: Vec2, min_zoom: Vec2) -> bool {
        let max_zoom = max_zoom.max(min_zoom);
        let target = clamp_zoom(self.target, min_zoom, max_zoom);
        let changed = max_zoom != self.max_zoom || target != self.target;
        self.max_zoom = max_zoom;
        self.target = target;
        changed
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ZOOM)
    }
}
