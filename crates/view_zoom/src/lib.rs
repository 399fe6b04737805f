use bevy::prelude::*;

pub mod activation;
pub mod config;
pub mod eye;
pub mod input_router;
pub mod interpolation;
pub mod keybindings;
pub mod lifecycle;
pub mod state_sync;
pub mod zoom_error;
pub mod zoom_state;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use activation::{ActivationTracker, ZoomActive};
pub use config::ZoomParams;
pub use eye::{Eye, LocalViewer};
pub use input_router::{InputCommandTable, InputOutcome, ZoomAction, ZoomInput};
pub use state_sync::{
    InboundZoomSnapshot, OutboundZoomSnapshot, ReplicationRole, ZoomSnapshot, ZoomSyncPending,
};
pub use zoom_error::ZoomError;
pub use zoom_state::ZoomState;

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Ordered phases for zoom systems in the `FixedUpdate` schedule.
///
/// Configured as a chain: `Attach` → `Input` → `Replication` → `Interpolate`.
/// Everything that can move a target (new viewers, input, snapshots) lands
/// before the tick's interpolation step, so a change is visible on the same
/// tick it was applied.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoomSet {
    /// Initialize viewers that just gained zoom control; clean up ones that lost it.
    Attach,
    /// Route this tick's `ZoomInput` events.
    Input,
    /// Apply inbound snapshots, then emit outbound ones.
    Replication,
    /// Step `current` toward `target` for active viewers.
    Interpolate,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Everything needed to give entities synchronized, smoothly interpolated zoom.
///
/// Insert a [`ReplicationRole`] and/or [`ZoomParams`] before adding the plugin
/// to override the defaults (authoritative, shipped constants).
pub struct ViewZoomPlugin;

impl Plugin for ViewZoomPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoomParams>().configure_sets(
            FixedUpdate,
            (
                ZoomSet::Attach,
                ZoomSet::Input,
                ZoomSet::Replication,
                ZoomSet::Interpolate,
            )
                .chain(),
        );

        app.add_plugins((
            lifecycle::LifecyclePlugin,
            keybindings::KeyBindingsPlugin,
            input_router::InputRouterPlugin,
            state_sync::StateSyncPlugin,
            interpolation::InterpolationPlugin,
        ));
    }
}
