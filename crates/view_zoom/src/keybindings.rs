//! Keyboard bindings for the zoom actions.
//!
//! `read_zoom_keys` is the input-dispatch boundary: it turns the *press edge*
//! of a bound key into one [`ZoomInput`] per local viewer. Holding a key does
//! not repeat and releasing it does nothing.

use bevy::input::InputSystem;
use bevy::prelude::*;

use crate::eye::LocalViewer;
use crate::input_router::{ZoomAction, ZoomInput};

/// A single key binding: a key code plus optional modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyBinding {
    /// Create a simple binding with no modifiers.
    pub const fn simple(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    /// Create a binding that requires Ctrl.
    pub const fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    /// True on the frame the key goes down with exactly the bound modifiers held.
    pub fn just_pressed(self, keys: &ButtonInput<KeyCode>) -> bool {
        if !keys.just_pressed(self.key) {
            return false;
        }
        let ctrl_held = keys.pressed(KeyCode::ControlLeft) || keys.pressed(KeyCode::ControlRight);
        let shift_held = keys.pressed(KeyCode::ShiftLeft) || keys.pressed(KeyCode::ShiftRight);
        ctrl_held == self.ctrl && shift_held == self.shift
    }

    /// Human-readable label (e.g. "Ctrl+NumpadAdd").
    pub fn display_label(self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(format!("{:?}", self.key));
        parts.join("+")
    }
}

/// Rebindable keys for the three zoom actions.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ZoomKeyBindings {
    pub zoom_in: KeyBinding,
    pub zoom_out: KeyBinding,
    pub reset_zoom: KeyBinding,
}

impl Default for ZoomKeyBindings {
    fn default() -> Self {
        Self {
            zoom_in: KeyBinding::simple(KeyCode::NumpadAdd),
            zoom_out: KeyBinding::simple(KeyCode::NumpadSubtract),
            reset_zoom: KeyBinding::simple(KeyCode::NumpadMultiply),
        }
    }
}

impl ZoomKeyBindings {
    pub fn get(&self, action: ZoomAction) -> KeyBinding {
        match action {
            ZoomAction::ZoomIn => self.zoom_in,
            ZoomAction::ZoomOut => self.zoom_out,
            ZoomAction::ResetZoom => self.reset_zoom,
        }
    }

    pub fn set(&mut self, action: ZoomAction, binding: KeyBinding) {
        match action {
            ZoomAction::ZoomIn => self.zoom_in = binding,
            ZoomAction::ZoomOut => self.zoom_out = binding,
            ZoomAction::ResetZoom => self.reset_zoom = binding,
        }
    }

    /// Actions sharing a binding with `action` (for conflict warnings).
    pub fn conflicts(&self, action: ZoomAction) -> Vec<ZoomAction> {
        let binding = self.get(action);
        ZoomAction::ALL
            .iter()
            .copied()
            .filter(|&other| other != action && self.get(other) == binding)
            .collect()
    }

    /// One line per pair of actions sharing a key, e.g.
    /// "ZoomIn and ResetZoom are both bound to NumpadAdd".
    pub fn conflict_report(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, &action) in ZoomAction::ALL.iter().enumerate() {
            for other in self.conflicts(action) {
                // Each pair once.
                if ZoomAction::ALL[..i].contains(&other) {
                    continue;
                }
                lines.push(format!(
                    "{:?} and {:?} are both bound to {}",
                    action,
                    other,
                    self.get(action).display_label()
                ));
            }
        }
        lines
    }
}

/// System: warn whenever the bindings change into a state where one key
/// would fire several actions.
pub fn warn_zoom_key_conflicts(bindings: Res<ZoomKeyBindings>) {
    for line in bindings.conflict_report() {
        warn!("zoom keybindings: {}", line);
    }
}

/// System: emit a `ZoomInput` for each local viewer on every bound press edge.
pub fn read_zoom_keys(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<ZoomKeyBindings>,
    viewers: Query<Entity, With<LocalViewer>>,
    mut inputs: EventWriter<ZoomInput>,
) {
    for &action in ZoomAction::ALL {
        if !bindings.get(action).just_pressed(&keys) {
            continue;
        }
        for entity in &viewers {
            inputs.send(ZoomInput { entity, action });
        }
    }
}

pub struct KeyBindingsPlugin;

impl Plugin for KeyBindingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoomKeyBindings>().add_systems(
            PreUpdate,
            (
                warn_zoom_key_conflicts.run_if(resource_changed::<ZoomKeyBindings>),
                read_zoom_keys
                    .after(InputSystem)
                    .run_if(resource_exists::<ButtonInput<KeyCode>>),
            )
                .chain(),
        );
    }
}
