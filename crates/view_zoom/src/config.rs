//! Zoom tunables.
//!
//! Module-level constants hold the shipped values. [`ZoomParams`] is the
//! runtime resource systems actually read, so a host can override any of them
//! (e.g. from a JSON file) without recompiling.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::zoom_error::ZoomError;

/// Multiplicative step applied per zoom-in / zoom-out press.
pub const ZOOM_STEP: f32 = 1.2;
/// How many zoom-in presses from identity reach the minimum zoom.
pub const MIN_ZOOM_STEPS: i32 = 10;
/// Interpolation rate in 1/seconds (higher = snappier).
pub const ZOOM_GAIN: f32 = 8.0;
/// Squared distance below which `current` snaps onto `target`.
pub const CONVERGENCE_EPSILON: f32 = 1e-7;
/// The "no magnification" zoom value that reset returns to.
pub const IDENTITY_ZOOM: Vec2 = Vec2::ONE;
/// Cap used when a viewer is attached without an explicit max zoom.
pub const DEFAULT_MAX_ZOOM: Vec2 = Vec2::splat(1.5);

/// Runtime zoom parameters shared by every viewer in the process.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomParams {
    /// Multiplicative step per press (must be > 1).
    pub zoom_step: f32,
    /// Process-wide lower bound for `target` (most magnified).
    pub min_zoom: [f32; 2],
    /// Upper bound handed to viewers attached without one.
    pub default_max_zoom: [f32; 2],
    /// Interpolation rate in 1/seconds.
    pub gain: f32,
    /// Squared-distance convergence threshold.
    pub convergence_epsilon: f32,
}

impl Default for ZoomParams {
    fn default() -> Self {
        let min = ZOOM_STEP.powi(-MIN_ZOOM_STEPS);
        Self {
            zoom_step: ZOOM_STEP,
            min_zoom: [min, min],
            default_max_zoom: DEFAULT_MAX_ZOOM.to_array(),
            gain: ZOOM_GAIN,
            convergence_epsilon: CONVERGENCE_EPSILON,
        }
    }
}

impl ZoomParams {
    #[inline]
    pub fn min_zoom(&self) -> Vec2 {
        Vec2::from_array(self.min_zoom)
    }

    #[inline]
    pub fn default_max_zoom(&self) -> Vec2 {
        Vec2::from_array(self.default_max_zoom)
    }

    /// Reject parameter sets that would break the clamp or interpolation math.
    pub fn validate(&self) -> Result<(), ZoomError> {
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(ZoomError::InvalidParams(format!(
                "zoom_step must be a finite value > 1, got {}",
                self.zoom_step
            )));
        }
        if !self.gain.is_finite() || self.gain <= 0.0 {
            return Err(ZoomError::InvalidParams(format!(
                "gain must be a finite value > 0, got {}",
                self.gain
            )));
        }
        if !self.convergence_epsilon.is_finite() || self.convergence_epsilon <= 0.0 {
            return Err(ZoomError::InvalidParams(format!(
                "convergence_epsilon must be a finite value > 0, got {}",
                self.convergence_epsilon
            )));
        }
        let min = self.min_zoom();
        let max = self.default_max_zoom();
        if !min.is_finite() || min.cmple(Vec2::ZERO).any() {
            return Err(ZoomError::InvalidParams(format!(
                "min_zoom must be finite and positive, got {min}"
            )));
        }
        if !max.is_finite() || max.cmplt(min).any() {
            return Err(ZoomError::InvalidParams(format!(
                "default_max_zoom {max} must be finite and >= min_zoom {min}"
            )));
        }
        Ok(())
    }

    /// Parse and validate parameters from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ZoomError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Read, parse and validate a JSON parameter file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ZoomError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Like [`Self::load_from_path`], but logs a warning and falls back to
    /// the defaults instead of failing.
    pub fn load_or_warn(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_path(path) {
            Ok(params) => params,
            Err(e) => {
                warn!(
                    "ZoomParams: could not load {}, falling back to defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
