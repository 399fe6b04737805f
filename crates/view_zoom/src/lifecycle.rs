//! Attaching and detaching zoom control.
//!
//! A viewer gains zoom control when a `ZoomState` is inserted next to its
//! `Eye`. The first tick after that, `init_attached_zoom` copies the eye's
//! existing zoom into the state so a late-joining observer starts from what
//! is already on screen rather than snapping from a default, and the
//! authority announces the new state. Removing the state drops the transient
//! markers with it.

use bevy::prelude::*;

use crate::activation::{ActivationTracker, ZoomActive};
use crate::config::ZoomParams;
use crate::eye::Eye;
use crate::state_sync::{ReplicationRole, ZoomSyncPending};
use crate::zoom_state::ZoomState;
use crate::ZoomSet;

/// System: initialize newly attached zoom control from the view.
///
/// On the authority the attach-time `(target, max_zoom)` is queued for
/// replication, so observers learn the cap before the first input.
pub fn init_attached_zoom(
    mut commands: Commands,
    role: Res<ReplicationRole>,
    params: Res<ZoomParams>,
    mut attached: Query<(Entity, &Eye, &mut ZoomState), Added<ZoomState>>,
    mut tracker: ActivationTracker,
) {
    for (entity, eye, mut state) in &mut attached {
        *state = ZoomState::attached(eye.zoom, state.max_zoom(), params.min_zoom());
        debug!(
            "{:?} gained zoom control at {} (max {})",
            entity,
            state.target(),
            state.max_zoom()
        );
        if state.needs_interpolation() {
            tracker.add(entity);
        }
        if *role == ReplicationRole::Authoritative {
            commands.entity(entity).insert(ZoomSyncPending);
        }
    }
}

/// System: clear transient markers from viewers that lost zoom control.
pub fn cleanup_detached_zoom(mut commands: Commands, mut removed: RemovedComponents<ZoomState>) {
    for entity in removed.read() {
        if let Some(mut e) = commands.get_entity(entity) {
            e.remove::<(ZoomActive, ZoomSyncPending)>();
        }
    }
}

pub struct LifecyclePlugin;

impl Plugin for LifecyclePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (cleanup_detached_zoom, init_attached_zoom)
                .chain()
                .in_set(ZoomSet::Attach),
        );
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::activation::is_active;

    fn new_world() -> World {
        let mut world = World::new();
        world.insert_resource(ZoomParams::default());
        world.init_resource::<ReplicationRole>();
        world
    }

    #[test]
    fn test_attach_copies_eye_zoom() {
        let mut world = new_world();
        let e = world
            .spawn((Eye::new(Vec2::new(0.8, 1.1)), ZoomState::new(Vec2::splat(2.0))))
            .id();
        world.run_system_once(init_attached_zoom).unwrap();
        let state = world.get::<ZoomState>(e).unwrap();
        assert_eq!(state.current(), Vec2::new(0.8, 1.1));
        assert_eq!(state.target(), Vec2::new(0.8, 1.1));
        assert!(!is_active(&world, e));
    }

    #[test]
    fn test_attach_out_of_bounds_activates() {
        let mut world = new_world();
        let e = world
            .spawn((Eye::new(Vec2::splat(4.0)), ZoomState::new(Vec2::splat(2.0))))
            .id();
        world.run_system_once(init_attached_zoom).unwrap();
        let state = world.get::<ZoomState>(e).unwrap();
        assert_eq!(state.current(), Vec2::splat(4.0));
        assert_eq!(state.target(), Vec2::splat(2.0));
        assert!(is_active(&world, e));
    }

    #[test]
    fn test_attach_requests_sync_on_authority_only() {
        let mut world = new_world();
        let e = world.spawn(ZoomState::new(Vec2::splat(2.0))).id();
        world.run_system_once(init_attached_zoom).unwrap();
        assert!(world.get::<ZoomSyncPending>(e).is_some());

        let mut world = new_world();
        world.insert_resource(ReplicationRole::Observer);
        let e = world.spawn(ZoomState::new(Vec2::splat(2.0))).id();
        world.run_system_once(init_attached_zoom).unwrap();
        assert!(world.get::<ZoomSyncPending>(e).is_none());
    }

    #[test]
    fn test_required_eye_defaults_to_identity() {
        let mut world = new_world();
        let e = world.spawn(ZoomState::new(Vec2::splat(2.0))).id();
        world.run_system_once(init_attached_zoom).unwrap();
        assert_eq!(world.get::<Eye>(e).unwrap().zoom, Vec2::ONE);
        assert_eq!(world.get::<ZoomState>(e).unwrap().target(), Vec2::ONE);
    }

    #[test]
    fn test_detach_drops_markers() {
        let mut world = new_world();
        let e = world
            .spawn((
                Eye::default(),
                ZoomState::new(Vec2::splat(2.0)),
                ZoomActive,
                ZoomSyncPending,
            ))
            .id();
        world.entity_mut(e).remove::<ZoomState>();
        world.run_system_once(cleanup_detached_zoom).unwrap();
        assert!(world.get::<ZoomActive>(e).is_none());
        assert!(world.get::<ZoomSyncPending>(e).is_none());
        assert!(world.get::<Eye>(e).is_some());
    }
}
