//! Rebinding, unbinding and shutdown of the zoom command table.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::prelude::*;

use crate::input_router::{zoom, InputCommandTable, InputOutcome, ZoomAction};
use crate::test_harness::TestViewers;

#[test]
fn test_app_exit_clears_bindings() {
    let mut viewers = TestViewers::new();
    let e = viewers.spawn_viewer(Vec2::ONE, Vec2::splat(5.0));
    assert_eq!(viewers.world().resource::<InputCommandTable>().len(), 3);

    viewers.world_mut().send_event(AppExit::Success);
    viewers.world_mut().run_schedule(Last);
    assert!(viewers.world().resource::<InputCommandTable>().is_empty());

    viewers.press(e, ZoomAction::ZoomOut);
    viewers.tick(1);
    assert_eq!(viewers.state(e).target(), Vec2::ONE);
    assert!(!viewers.is_active(e));
}

#[test]
fn test_unbound_action_is_a_no_op() {
    let mut viewers = TestViewers::new();
    let e = viewers.spawn_viewer(Vec2::ONE, Vec2::splat(5.0));
    assert!(viewers
        .world_mut()
        .resource_mut::<InputCommandTable>()
        .unbind(ZoomAction::ZoomIn));

    viewers.press(e, ZoomAction::ZoomIn);
    viewers.press(e, ZoomAction::ZoomOut);
    viewers.tick(1);
    assert!((viewers.state(e).target().x - 1.2).abs() < 1e-5);
}

#[test]
fn test_custom_handler_replaces_builtin() {
    let mut viewers = TestViewers::new();
    let e = viewers.spawn_viewer(Vec2::ONE, Vec2::splat(5.0));
    viewers.drain_outbound();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    viewers
        .world_mut()
        .resource_mut::<InputCommandTable>()
        .bind(ZoomAction::ZoomIn, move |world, entity| {
            seen.fetch_add(1, Ordering::SeqCst);
            // Double step.
            zoom(world, entity, true);
            zoom(world, entity, true);
            InputOutcome::Consumed
        });

    viewers.press(e, ZoomAction::ZoomIn);
    viewers.tick(1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let expected = 1.0 / (1.2f32 * 1.2);
    assert!((viewers.state(e).target().x - expected).abs() < 1e-5);
    assert_eq!(viewers.drain_outbound().len(), 1);
}

#[test]
fn test_handlers_skip_entities_without_zoom_control() {
    let mut viewers = TestViewers::new();
    let bare = viewers.spawn_bare_eye();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    viewers
        .world_mut()
        .resource_mut::<InputCommandTable>()
        .bind(ZoomAction::ResetZoom, move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            InputOutcome::Passthrough
        });

    viewers.press(bare, ZoomAction::ResetZoom);
    viewers.tick(1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
