//! Per-tick interpolation of the rendered zoom.
//!
//! Input and snapshots only ever move `target`. Each `FixedUpdate` tick,
//! `advance_active_zooms` walks the active viewers, steps `current` toward
//! `target` with the exponential factor from
//! [`exp_lerp_factor`](crate::zoom_state::exp_lerp_factor), mirrors the result
//! onto the viewer's `Eye`, and deactivates viewers that have converged.

use bevy::prelude::*;

use crate::activation::{ActivationTracker, ZoomActive};
use crate::config::ZoomParams;
use crate::eye::Eye;
use crate::zoom_state::{Advance, ZoomState};
use crate::ZoomSet;

/// System: advance every active viewer by one fixed timestep.
///
/// `dt` is the configured `Time<Fixed>` timestep rather than the elapsed
/// delta, so a tick always represents the same simulated duration.
/// The eye is only written when `current` actually changed, keeping the
/// host's change detection (and therefore its replication) quiet otherwise.
pub fn advance_active_zooms(
    fixed: Res<Time<Fixed>>,
    params: Res<ZoomParams>,
    mut viewers: Query<(Entity, &mut ZoomState, &mut Eye), With<ZoomActive>>,
    mut tracker: ActivationTracker,
) {
    let dt = fixed.timestep().as_secs_f32();
    for (entity, mut state, mut eye) in &mut viewers {
        let before = state.current();
        let outcome = state.advance(dt, params.gain, params.convergence_epsilon);
        if state.current() != before {
            eye.zoom = state.current();
        }
        if outcome == Advance::Converged {
            debug!("{:?} zoom converged at {}", entity, state.current());
            tracker.remove(entity);
        }
    }
}

pub struct InterpolationPlugin;

impl Plugin for InterpolationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            advance_active_zooms.in_set(ZoomSet::Interpolate),
        );
    }
}
