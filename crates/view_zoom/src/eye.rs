//! The view object a zoom controller drives.
//!
//! `Eye` stands in for the host's camera/eye: the controller reads its zoom
//! once when zoom control is attached and writes it every tick the rendered
//! zoom moves. Writes go through `Mut<Eye>`, so the host's own replication
//! can pick them up with `Changed<Eye>`.

use bevy::prelude::*;

use crate::config::IDENTITY_ZOOM;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Eye {
    /// Rendered 2D zoom factor (lower = more magnified).
    pub zoom: Vec2,
}

impl Eye {
    pub fn new(zoom: Vec2) -> Self {
        Self { zoom }
    }
}

impl Default for Eye {
    fn default() -> Self {
        Self {
            zoom: IDENTITY_ZOOM,
        }
    }
}

/// Viewer whose zoom keys are read on this instance.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct LocalViewer;
