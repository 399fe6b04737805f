//! Integration tests for the zoom controller using the `TestViewers` harness.
//!
//! These spin up a headless Bevy App with `ViewZoomPlugin` and check behavior
//! across attach, input, replication and interpolation together.

mod command_table_tests;

use bevy::prelude::*;

use crate::input_router::{InputCommandTable, ZoomAction};
use crate::test_harness::TestViewers;

// ===========================================================================
// Harness bootstrap
// ===========================================================================

#[test]
fn empty_instance_has_no_active_viewers() {
    let mut viewers = TestViewers::new();
    assert_eq!(viewers.active_count(), 0);
    assert!(viewers.drain_outbound().is_empty());
}

#[test]
fn startup_binds_all_zoom_actions() {
    let viewers = TestViewers::new();
    let table = viewers.world().resource::<InputCommandTable>();
    for &action in ZoomAction::ALL {
        assert!(table.is_bound(action), "{} not bound", action.name());
    }
}

#[test]
fn spawned_viewer_starts_idle_at_its_view_zoom() {
    let mut viewers = TestViewers::new();
    let e = viewers.spawn_viewer(Vec2::new(0.8, 1.2), Vec2::splat(5.0));
    let state = viewers.state(e);
    assert_eq!(state.current(), Vec2::new(0.8, 1.2));
    assert_eq!(state.target(), Vec2::new(0.8, 1.2));
    assert!(!viewers.is_active(e));
}
