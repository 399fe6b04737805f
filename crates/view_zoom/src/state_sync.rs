//! Replication of zoom state from the authoritative instance to observers.
//!
//! Only `(target, max_zoom)` travels. Each side interpolates `current` on its
//! own, so a snapshot moves the destination but never teleports the view.
//!
//! The transport is the host's business: this module turns pending changes
//! into [`OutboundZoomSnapshot`] events and consumes [`InboundZoomSnapshot`]
//! events, nothing more.

use bevy::prelude::*;
use bitcode::{Decode, Encode};

use crate::activation::ActivationTracker;
use crate::config::ZoomParams;
use crate::zoom_error::ZoomError;
use crate::zoom_state::{clamp_zoom, ZoomState};
use crate::ZoomSet;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Authoritative `(target, max_zoom)` at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomSnapshot {
    pub target: Vec2,
    pub max_zoom: Vec2,
}

/// What [`ZoomSnapshot::apply_to`] had to do to make a snapshot fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Accepted,
    /// The snapshot broke `min_zoom <= target <= max_zoom` and was clamped.
    Clamped,
}

#[derive(Encode, Decode, Clone, Copy, PartialEq, Debug)]
struct WireSnapshot {
    target: [f32; 2],
    max_zoom: [f32; 2],
}

impl ZoomSnapshot {
    /// Serialize the replicated half of a state.
    pub fn of(state: &ZoomState) -> Self {
        Self {
            target: state.target,
            max_zoom: state.max_zoom,
        }
    }

    /// Overwrite `target` and `max_zoom`, leaving `current` alone.
    ///
    /// Last writer wins. The cap is raised to at least `min_zoom` and the
    /// target clamped under it, so a buggy or hostile peer cannot push the
    /// view outside its bounds or invert them. Non-finite components fall to
    /// the nearest bound: a cap of `+inf` or NaN keeps the local cap, `-inf`
    /// lands on `min_zoom`, and the target is then clamped into the result.
    pub fn apply_to(&self, state: &mut ZoomState, min_zoom: Vec2) -> ApplyOutcome {
        let max_zoom = Vec2::new(
            sanitize_cap(self.max_zoom.x, state.max_zoom.x, min_zoom.x),
            sanitize_cap(self.max_zoom.y, state.max_zoom.y, min_zoom.y),
        );
        let target = clamp_zoom(self.target, min_zoom, max_zoom);
        state.max_zoom = max_zoom;
        state.target = target;
        if max_zoom == self.max_zoom && target == self.target {
            ApplyOutcome::Accepted
        } else {
            ApplyOutcome::Clamped
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(&WireSnapshot {
            target: self.target.to_array(),
            max_zoom: self.max_zoom.to_array(),
        })
    }

    /// Decode wire bytes, rejecting NaN and infinities outright.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ZoomError> {
        let wire: WireSnapshot = bitcode::decode(bytes)?;
        let snapshot = Self {
            target: Vec2::from_array(wire.target),
            max_zoom: Vec2::from_array(wire.max_zoom),
        };
        if !snapshot.target.is_finite() {
            return Err(ZoomError::NonFinite { field: "target" });
        }
        if !snapshot.max_zoom.is_finite() {
            return Err(ZoomError::NonFinite { field: "max_zoom" });
        }
        Ok(snapshot)
    }
}

/// One component of an inbound cap, forced finite and `>= min`.
fn sanitize_cap(remote: f32, local: f32, min: f32) -> f32 {
    if remote.is_finite() {
        remote.max(min)
    } else if remote == f32::NEG_INFINITY || !local.is_finite() {
        min
    } else {
        local.max(min)
    }
}

// ---------------------------------------------------------------------------
// Host-facing events and resources
// ---------------------------------------------------------------------------

/// Which side of the replication link this instance is.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicationRole {
    /// Owns the canonical state; produces snapshots.
    #[default]
    Authoritative,
    /// Mirrors a remote authority; consumes snapshots.
    Observer,
}

/// Marker: `target` or `max_zoom` changed since the last snapshot went out.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ZoomSyncPending;

/// A snapshot ready for the transport to send to observers of `entity`.
#[derive(Event, Debug, Clone, Copy)]
pub struct OutboundZoomSnapshot {
    pub entity: Entity,
    pub snapshot: ZoomSnapshot,
}

/// A snapshot received from the authority, already mapped to a local entity.
#[derive(Event, Debug, Clone, Copy)]
pub struct InboundZoomSnapshot {
    pub entity: Entity,
    pub snapshot: ZoomSnapshot,
}

/// Ask for `entity`'s state to be replicated at the end of this tick.
pub fn request_sync(world: &mut World, entity: Entity) {
    if let Ok(mut e) = world.get_entity_mut(entity) {
        e.insert(ZoomSyncPending);
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Apply inbound snapshots on an observer.
///
/// `current` is untouched; the viewer is activated so the next interpolation
/// steps carry it toward the new target.
pub fn apply_inbound_snapshots(
    role: Res<ReplicationRole>,
    params: Res<ZoomParams>,
    mut inbound: EventReader<InboundZoomSnapshot>,
    mut states: Query<&mut ZoomState>,
    mut tracker: ActivationTracker,
) {
    for msg in inbound.read() {
        if *role == ReplicationRole::Authoritative {
            warn!(
                "Ignoring zoom snapshot for {:?}: this instance is authoritative",
                msg.entity
            );
            continue;
        }
        let Ok(mut state) = states.get_mut(msg.entity) else {
            warn!(
                "Zoom snapshot for {:?} dropped: entity has no zoom control",
                msg.entity
            );
            continue;
        };
        if msg.snapshot.apply_to(&mut state, params.min_zoom()) == ApplyOutcome::Clamped {
            warn!(
                "Zoom snapshot for {:?} out of bounds (target {}, max {}); clamped to target {}, max {}",
                msg.entity,
                msg.snapshot.target,
                msg.snapshot.max_zoom,
                state.target,
                state.max_zoom
            );
        }
        if state.needs_interpolation() {
            tracker.add(msg.entity);
        }
    }
}

/// Turn pending sync requests into outbound snapshots.
///
/// At most one snapshot per entity per tick, carrying the latest values. On
/// an observer the requests are simply cleared.
pub fn emit_outbound_snapshots(
    mut commands: Commands,
    role: Res<ReplicationRole>,
    pending: Query<(Entity, &ZoomState), With<ZoomSyncPending>>,
    mut outbound: EventWriter<OutboundZoomSnapshot>,
) {
    for (entity, state) in &pending {
        if *role == ReplicationRole::Authoritative {
            let snapshot = ZoomSnapshot::of(state);
            debug!(
                "Zoom snapshot out for {:?}: target {}, max {}",
                entity, snapshot.target, snapshot.max_zoom
            );
            outbound.send(OutboundZoomSnapshot { entity, snapshot });
        }
        commands.entity(entity).remove::<ZoomSyncPending>();
    }
}

pub struct StateSyncPlugin;

impl Plugin for StateSyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReplicationRole>()
            .add_event::<OutboundZoomSnapshot>()
            .add_event::<InboundZoomSnapshot>()
            .add_systems(
                FixedUpdate,
                (apply_inbound_snapshots, emit_outbound_snapshots)
                    .chain()
                    .in_set(ZoomSet::Replication),
            );
    }
}
