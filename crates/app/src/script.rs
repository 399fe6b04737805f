//! Scripted input timeline for the headless demo.

use bevy::prelude::*;

use view_zoom::input_router::set_max_zoom;
use view_zoom::{ZoomAction, ZoomInput};

/// One thing that happens to the authority's viewer on a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Press(ZoomAction),
    SetMaxZoom(Vec2),
    /// Push an undecodable snapshot through the link.
    CorruptPacket,
}

/// Ordered `(tick, cue)` pairs.
pub fn default_timeline() -> Vec<(u32, Cue)> {
    vec![
        (4, Cue::Press(ZoomAction::ZoomOut)),
        (5, Cue::Press(ZoomAction::ZoomOut)),
        (6, Cue::Press(ZoomAction::ZoomOut)),
        (40, Cue::Press(ZoomAction::ZoomIn)),
        (64, Cue::SetMaxZoom(Vec2::splat(1.25))),
        (96, Cue::CorruptPacket),
        (128, Cue::Press(ZoomAction::ResetZoom)),
        (160, Cue::Press(ZoomAction::ZoomIn)),
        (161, Cue::Press(ZoomAction::ZoomIn)),
        (200, Cue::Press(ZoomAction::ResetZoom)),
    ]
}

/// Apply a cue to `entity`. Returns true for [`Cue::CorruptPacket`], which
/// the caller injects on the link instead.
pub fn apply(world: &mut World, entity: Entity, cue: Cue) -> bool {
    match cue {
        Cue::Press(action) => {
            world.send_event(ZoomInput { entity, action });
            false
        }
        Cue::SetMaxZoom(max_zoom) => {
            if !set_max_zoom(world, entity, max_zoom) {
                debug!("set_max_zoom({}) left {:?} unchanged", max_zoom, entity);
            }
            false
        }
        Cue::CorruptPacket => true,
    }
}
