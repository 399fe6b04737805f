//! Zoom input routing: named actions → state mutations.
//!
//! Input arrives as [`ZoomInput`] events, one per press edge, carrying the
//! entity whose view should change. `dispatch_zoom_inputs` looks each action
//! up in the [`InputCommandTable`] and runs its handler. The table is filled
//! at startup and emptied when the app exits, so the bindings live exactly as
//! long as the plugin's app does.
//!
//! Zoom is an auxiliary effect, not a command: every built-in handler answers
//! [`InputOutcome::Passthrough`], and the dispatcher reads events through its
//! own cursor instead of draining them, so other systems still see them.

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use crate::activation::activate;
use crate::config::ZoomParams;
use crate::state_sync::request_sync;
use crate::zoom_state::ZoomState;
use crate::ZoomSet;

// ---------------------------------------------------------------------------
// Actions and events
// ---------------------------------------------------------------------------

/// The three zoom actions a viewer can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomAction {
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

impl ZoomAction {
    /// Stable name used by bindings UIs and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::ResetZoom => "reset_zoom",
        }
    }

    pub const ALL: &'static [ZoomAction] = &[Self::ZoomIn, Self::ZoomOut, Self::ResetZoom];
}

/// A press-edge zoom action from `entity`'s controller.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ZoomInput {
    pub entity: Entity,
    pub action: ZoomAction,
}

/// Whether a handler claimed its input exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Other consumers may still react to the same input.
    Passthrough,
    /// The handler owns this input; nothing else should act on it.
    Consumed,
}

// ---------------------------------------------------------------------------
// Router operations
// ---------------------------------------------------------------------------

/// Whether `entity` currently has zoom control.
pub fn can_adjust(world: &World, entity: Entity) -> bool {
    world.get::<ZoomState>(entity).is_some()
}

/// Step `entity`'s target one notch in or out.
///
/// Returns true if the target changed; the viewer is then activated and a
/// sync is requested. Entities without zoom control and presses that clamp
/// back onto the current target do nothing.
pub fn zoom(world: &mut World, entity: Entity, zoom_in: bool) -> bool {
    let (step, min_zoom) = {
        let params = world.resource::<ZoomParams>();
        (params.zoom_step, params.min_zoom())
    };
    let Some(mut state) = world.get_mut::<ZoomState>(entity) else {
        trace!("zoom: {:?} has no zoom control", entity);
        return false;
    };
    if !state.step_zoom(zoom_in, step, min_zoom) {
        trace!("zoom: {:?} already at its limit", entity);
        return false;
    }
    debug!("zoom: {:?} target -> {}", entity, state.target());
    activate(world, entity);
    request_sync(world, entity);
    true
}

/// Send `entity`'s target back to identity.
pub fn reset_zoom(world: &mut World, entity: Entity) -> bool {
    let min_zoom = world.resource::<ZoomParams>().min_zoom();
    let Some(mut state) = world.get_mut::<ZoomState>(entity) else {
        trace!("reset_zoom: {:?} has no zoom control", entity);
        return false;
    };
    if !state.reset(min_zoom) {
        return false;
    }
    debug!("reset_zoom: {:?} target -> {}", entity, state.target());
    activate(world, entity);
    request_sync(world, entity);
    true
}

/// Change `entity`'s cap (authoritative side; e.g. a role granting a wider
/// view). The target is re-clamped under the new cap.
pub fn set_max_zoom(world: &mut World, entity: Entity, max_zoom: Vec2) -> bool {
    let min_zoom = world.resource::<ZoomParams>().min_zoom();
    let Some(mut state) = world.get_mut::<ZoomState>(entity) else {
        return false;
    };
    if !state.set_max_zoom(max_zoom, min_zoom) {
        return false;
    }
    let moving = state.needs_interpolation();
    debug!(
        "set_max_zoom: {:?} max -> {}, target {}",
        entity,
        state.max_zoom(),
        state.target()
    );
    if moving {
        activate(world, entity);
    }
    request_sync(world, entity);
    true
}

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// Type alias for a handler stored in the [`InputCommandTable`].
pub type ZoomHandlerFn = Box<dyn Fn(&mut World, Entity) -> InputOutcome + Send + Sync>;

/// Maps each [`ZoomAction`] to the closure that handles it.
#[derive(Resource, Default)]
pub struct InputCommandTable {
    handlers: Vec<(ZoomAction, ZoomHandlerFn)>,
}

impl InputCommandTable {
    /// Bind `action`, replacing any earlier handler for it.
    pub fn bind(
        &mut self,
        action: ZoomAction,
        handler: impl Fn(&mut World, Entity) -> InputOutcome + Send + Sync + 'static,
    ) {
        if self.unbind(action) {
            warn!(
                "InputCommandTable: rebinding '{}', previous handler dropped",
                action.name()
            );
        }
        self.handlers.push((action, Box::new(handler)));
    }

    /// Remove `action`'s handler. Returns whether one was bound.
    pub fn unbind(&mut self, action: ZoomAction) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(a, _)| *a != action);
        self.handlers.len() != before
    }

    pub fn is_bound(&self, action: ZoomAction) -> bool {
        self.handlers.iter().any(|(a, _)| *a == action)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Run the handler bound to `input.action`, if any.
    pub fn dispatch(&self, world: &mut World, input: ZoomInput) -> Option<InputOutcome> {
        let (_, handler) = self.handlers.iter().find(|(a, _)| *a == input.action)?;
        Some(handler(world, input.entity))
    }
}

/// Startup: bind the three built-in zoom actions.
pub fn register_zoom_commands(mut table: ResMut<InputCommandTable>) {
    table.bind(ZoomAction::ZoomIn, |world, entity| {
        zoom(world, entity, true);
        InputOutcome::Passthrough
    });
    table.bind(ZoomAction::ZoomOut, |world, entity| {
        zoom(world, entity, false);
        InputOutcome::Passthrough
    });
    table.bind(ZoomAction::ResetZoom, |world, entity| {
        reset_zoom(world, entity);
        InputOutcome::Passthrough
    });
}

/// Drop every binding once the app is shutting down.
pub fn clear_zoom_commands_on_exit(
    mut exits: EventReader<AppExit>,
    mut table: ResMut<InputCommandTable>,
) {
    if exits.read().next().is_some() && !table.is_empty() {
        debug!("Clearing {} zoom command bindings", table.len());
        table.clear();
    }
}

/// Feed this tick's `ZoomInput` events through the command table.
pub fn dispatch_zoom_inputs(world: &mut World, mut cursor: Local<EventCursor<ZoomInput>>) {
    let inputs: Vec<ZoomInput> = {
        let events = world.resource::<Events<ZoomInput>>();
        cursor.read(events).copied().collect()
    };
    if inputs.is_empty() {
        return;
    }
    world.resource_scope(|world, table: Mut<InputCommandTable>| {
        for input in inputs {
            if !can_adjust(world, input.entity) {
                trace!(
                    "Skipping {} for {:?}: no zoom control",
                    input.action.name(),
                    input.entity
                );
                continue;
            }
            match table.dispatch(world, input) {
                None => trace!("No handler bound for {}", input.action.name()),
                Some(InputOutcome::Consumed) => debug!(
                    "{} for {:?} claimed exclusively by its handler",
                    input.action.name(),
                    input.entity
                ),
                Some(InputOutcome::Passthrough) => {}
            }
        }
    });
}

pub struct InputRouterPlugin;

impl Plugin for InputRouterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputCommandTable>()
            .add_event::<ZoomInput>()
            .add_systems(Startup, register_zoom_commands)
            .add_systems(FixedUpdate, dispatch_zoom_inputs.in_set(ZoomSet::Input))
            .add_systems(Last, clear_zoom_commands_on_exit);
    }
}

#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::activation::is_active;
    use crate::eye::Eye;
    use crate::state_sync::ZoomSyncPending;

    fn world_with_viewer(target: Vec2, max: Vec2) -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(ZoomParams::default());
        let min = world.resource::<ZoomParams>().min_zoom();
        let e = world
            .spawn((Eye::new(target), ZoomState::attached(target, max, min)))
            .id();
        (world, e)
    }

    #[test]
    fn test_can_adjust_requires_zoom_state() {
        let (mut world, e) = world_with_viewer(Vec2::ONE, Vec2::splat(5.0));
        let bare = world.spawn(Eye::default()).id();
        assert!(can_adjust(&world, e));
        assert!(!can_adjust(&world, bare));
    }

    #[test]
    fn test_zoom_without_capability_is_silent() {
        let mut world = World::new();
        world.insert_resource(ZoomParams::default());
        let bare = world.spawn(Eye::default()).id();
        assert!(!zoom(&mut world, bare, true));
        assert!(!reset_zoom(&mut world, bare));
        assert!(!is_active(&world, bare));
        assert!(world.get::<ZoomSyncPending>(bare).is_none());
    }

    #[test]
    fn test_zoom_in_scenario_activates_and_requests_sync() {
        let (mut world, e) = world_with_viewer(Vec2::ONE, Vec2::splat(5.0));
        assert!(zoom(&mut world, e, true));
        let state = world.get::<ZoomState>(e).unwrap();
        assert!((state.target() - Vec2::splat(1.0 / 1.2)).length() < 1e-5);
        assert!(is_active(&world, e));
        assert!(world.get::<ZoomSyncPending>(e).is_some());
    }

    #[test]
    fn test_zoom_at_cap_stays_idle() {
        let (mut world, e) = world_with_viewer(Vec2::splat(5.0), Vec2::splat(5.0));
        assert!(!zoom(&mut world, e, false));
        assert!(!is_active(&world, e));
        assert!(world.get::<ZoomSyncPending>(e).is_none());
    }

    #[test]
    fn test_reset_at_identity_stays_idle() {
        let (mut world, e) = world_with_viewer(Vec2::ONE, Vec2::splat(5.0));
        assert!(!reset_zoom(&mut world, e));
        assert!(!is_active(&world, e));
    }

    #[test]
    fn test_set_max_zoom_requests_sync_even_without_motion() {
        let (mut world, e) = world_with_viewer(Vec2::ONE, Vec2::splat(5.0));
        assert!(set_max_zoom(&mut world, e, Vec2::splat(3.0)));
        assert!(world.get::<ZoomSyncPending>(e).is_some());
        assert!(!is_active(&world, e), "target did not move");
    }

    #[test]
    fn test_builtin_handlers_pass_through() {
        let (mut world, e) = world_with_viewer(Vec2::ONE, Vec2::splat(5.0));
        world.init_resource::<InputCommandTable>();
        world.run_system_once(register_zoom_commands).unwrap();

        world.resource_scope(|world, table: Mut<InputCommandTable>| {
            assert_eq!(table.len(), ZoomAction::ALL.len());
            for &action in ZoomAction::ALL {
                let outcome = table.dispatch(world, ZoomInput { entity: e, action });
                assert_eq!(outcome, Some(InputOutcome::Passthrough), "{}", action.name());
            }
        });
    }

    #[test]
    fn test_rebinding_replaces_handler() {
        let mut table = InputCommandTable::default();
        table.bind(ZoomAction::ZoomIn, |_, _| InputOutcome::Passthrough);
        table.bind(ZoomAction::ZoomIn, |_, _| InputOutcome::Consumed);
        assert_eq!(table.len(), 1);

        let mut world = World::new();
        let e = world.spawn_empty().id();
        let outcome = table.dispatch(
            &mut world,
            ZoomInput {
                entity: e,
                action: ZoomAction::ZoomIn,
            },
        );
        assert_eq!(outcome, Some(InputOutcome::Consumed));
        assert_eq!(
            table.dispatch(
                &mut world,
                ZoomInput {
                    entity: e,
                    action: ZoomAction::ResetZoom,
                },
            ),
            None
        );
    }
}
