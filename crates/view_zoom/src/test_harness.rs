//! # TestViewers: headless harness for zoom controller tests
//!
//! Wraps a `bevy::app::App` with `MinimalPlugins` + `ViewZoomPlugin` and
//! exposes a small fluent API: spawn viewers, press zoom actions, deliver
//! snapshots, tick the fixed schedule and inspect the result.

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use crate::activation::ZoomActive;
use crate::config::ZoomParams;
use crate::eye::Eye;
use crate::input_router::{ZoomAction, ZoomInput};
use crate::state_sync::{
    InboundZoomSnapshot, OutboundZoomSnapshot, ReplicationRole, ZoomSnapshot,
};
use crate::zoom_state::ZoomState;
use crate::ViewZoomPlugin;

/// A headless App running the zoom controller, ticked by hand.
pub struct TestViewers {
    app: App,
    outbound: EventCursor<OutboundZoomSnapshot>,
}

impl TestViewers {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An authoritative instance with default parameters.
    pub fn new() -> Self {
        Self::with_role(ReplicationRole::Authoritative)
    }

    /// An observer instance (consumes snapshots, emits none).
    pub fn observer() -> Self {
        Self::with_role(ReplicationRole::Observer)
    }

    pub fn with_role(role: ReplicationRole) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(role);
        app.add_plugins(ViewZoomPlugin);
        // Run one update so Startup systems (command table) execute.
        app.update();
        Self {
            app,
            outbound: EventCursor::default(),
        }
    }

    /// Replace the zoom parameters (builder style).
    pub fn with_params(mut self, params: ZoomParams) -> Self {
        self.app.insert_resource(params);
        self
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Spawn a viewer whose eye currently shows `view_zoom`, give it zoom
    /// control capped at `max_zoom`, and tick once so attachment completes.
    pub fn spawn_viewer(&mut self, view_zoom: Vec2, max_zoom: Vec2) -> Entity {
        let entity = self
            .app
            .world_mut()
            .spawn((Eye::new(view_zoom), ZoomState::new(max_zoom)))
            .id();
        self.tick(1);
        entity
    }

    /// Spawn an entity with a view but no zoom control.
    pub fn spawn_bare_eye(&mut self) -> Entity {
        self.app.world_mut().spawn(Eye::default()).id()
    }

    // -----------------------------------------------------------------------
    // Stimuli
    // -----------------------------------------------------------------------

    /// Queue a press-edge action for `entity` (handled on the next tick).
    pub fn press(&mut self, entity: Entity, action: ZoomAction) {
        self.app
            .world_mut()
            .send_event(ZoomInput { entity, action });
    }

    /// Queue a snapshot as if it had just arrived from the authority.
    pub fn deliver(&mut self, entity: Entity, snapshot: ZoomSnapshot) {
        self.app
            .world_mut()
            .send_event(InboundZoomSnapshot { entity, snapshot });
    }

    /// Run `n` fixed ticks.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Tick until no viewer is active, returning the number of ticks taken.
    /// Panics if that takes longer than `max_ticks`.
    pub fn tick_until_idle(&mut self, max_ticks: u32) -> u32 {
        for ticks in 0..max_ticks {
            if self.active_count() == 0 {
                return ticks;
            }
            self.tick(1);
        }
        panic!("viewers still active after {max_ticks} ticks");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self, entity: Entity) -> ZoomState {
        *self
            .app
            .world()
            .get::<ZoomState>(entity)
            .expect("entity has no ZoomState")
    }

    pub fn eye_zoom(&self, entity: Entity) -> Vec2 {
        self.app
            .world()
            .get::<Eye>(entity)
            .expect("entity has no Eye")
            .zoom
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        self.app.world().get::<ZoomActive>(entity).is_some()
    }

    pub fn active_count(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut active = world.query_filtered::<(), With<ZoomActive>>();
        active.iter(world).count()
    }

    /// Outbound snapshots emitted since the last call.
    pub fn drain_outbound(&mut self) -> Vec<OutboundZoomSnapshot> {
        let events = self.app.world().resource::<Events<OutboundZoomSnapshot>>();
        self.outbound.read(events).copied().collect()
    }

    pub fn params(&self) -> &ZoomParams {
        self.app.world().resource::<ZoomParams>()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}

impl Default for TestViewers {
    fn default() -> Self {
        Self::new()
    }
}
