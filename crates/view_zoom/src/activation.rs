//! Which viewers need interpolation this tick.
//!
//! Activation is a zero-sized `ZoomActive` marker. The interpolation query
//! filters on it, so Bevy only visits archetypes holding active viewers and
//! idle ones cost nothing per tick. The marker is local bookkeeping: it is
//! never replicated and never saved.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Marker: this viewer's `current` zoom still has to move toward its target.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ZoomActive;

/// Add/remove access to the active set from ordinary systems.
///
/// Mutations are deferred through `Commands`; `is_active` reports the set as
/// it was when the system started.
#[derive(SystemParam)]
pub struct ActivationTracker<'w, 's> {
    commands: Commands<'w, 's>,
    active: Query<'w, 's, (), With<ZoomActive>>,
}

impl ActivationTracker<'_, '_> {
    /// Mark an entity active. Idempotent; ignored for missing entities.
    pub fn add(&mut self, entity: Entity) {
        if let Some(mut e) = self.commands.get_entity(entity) {
            e.try_insert(ZoomActive);
        }
    }

    /// Clear an entity's mark. Idempotent; safe on entities that never had it.
    pub fn remove(&mut self, entity: Entity) {
        if let Some(mut e) = self.commands.get_entity(entity) {
            e.remove::<ZoomActive>();
        }
    }

    #[inline]
    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.contains(entity)
    }
}

/// Immediate-mode counterpart of [`ActivationTracker::add`] for exclusive code.
pub fn activate(world: &mut World, entity: Entity) {
    if let Ok(mut e) = world.get_entity_mut(entity) {
        e.insert(ZoomActive);
    }
}

pub fn is_active(world: &World, entity: Entity) -> bool {
    world
        .get_entity(entity)
        .is_ok_and(|e| e.contains::<ZoomActive>())
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;

    #[test]
    fn test_activate_is_idempotent() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        activate(&mut world, e);
        activate(&mut world, e);
        assert!(is_active(&world, e));
        assert_eq!(world.query::<&ZoomActive>().iter(&world).count(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        world
            .run_system_once(move |mut tracker: ActivationTracker| {
                tracker.remove(e);
                tracker.remove(e);
            })
            .unwrap();
        assert!(!is_active(&world, e));
        assert!(world.get_entity(e).is_ok());
    }

    #[test]
    fn test_despawned_entity_is_ignored() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        world.despawn(e);
        activate(&mut world, e);
        world
            .run_system_once(move |mut tracker: ActivationTracker| {
                tracker.add(e);
                tracker.remove(e);
            })
            .unwrap();
        assert!(!is_active(&world, e));
    }

    #[derive(Resource, Default)]
    struct Seen(Vec<bool>);

    fn toggle(
        mut tracker: ActivationTracker,
        targets: Query<Entity, With<Name>>,
        mut seen: ResMut<Seen>,
    ) {
        for e in &targets {
            seen.0.push(tracker.is_active(e));
            if tracker.is_active(e) {
                tracker.remove(e);
            } else {
                tracker.add(e);
                tracker.add(e);
            }
        }
    }

    #[test]
    fn test_tracker_param_defers_and_toggles() {
        let mut world = World::new();
        world.init_resource::<Seen>();
        let e = world.spawn(Name::new("viewer")).id();

        world.run_system_once(toggle).unwrap();
        assert!(is_active(&world, e));
        world.run_system_once(toggle).unwrap();
        assert!(!is_active(&world, e));

        assert_eq!(world.resource::<Seen>().0, vec![false, true]);
    }
}
