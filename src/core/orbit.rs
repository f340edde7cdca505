//! Orbit interaction state machine.
//!
//! Translates pointer and wheel input into the yaw/pitch/distance scalars
//! the camera consumes. Dragging moves target angles which the per-frame
//! tick eases toward; an idle sphere keeps a slow automatic spin. A gesture
//! that ever entered `Dragging` suppresses the click on release.

use glam::Vec2;

/// Radians of yaw/pitch per pixel of pointer drag.
pub const DRAG_SENSITIVITY: f32 = 0.005;
/// Automatic yaw added to the target each idle frame.
pub const AUTO_SPIN: f32 = 0.0025;
/// Per-frame easing factor toward the target angles.
pub const EASING: f32 = 0.05;
/// Distance change per wheel unit (scroll up zooms in).
pub const ZOOM_SENSITIVITY: f32 = 0.01;
pub const MIN_DISTANCE: f32 = 7.0;
pub const MAX_DISTANCE: f32 = 30.0;
pub const DEFAULT_DISTANCE: f32 = 14.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    /// Pointer is down but has not moved yet; release here is a click.
    Pressed { last: Vec2 },
    /// Pointer moved while down; release here is never a click.
    Dragging { last: Vec2 },
}

/// Owned interaction state for the sphere view.
pub struct OrbitController {
    gesture: Gesture,
    yaw: f32,
    pitch: f32,
    target_yaw: f32,
    target_pitch: f32,
    distance: f32,
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            yaw: 0.0,
            pitch: 0.0,
            target_yaw: 0.0,
            target_pitch: 0.0,
            distance: DEFAULT_DISTANCE,
        }
    }

    /// Begin a gesture. A second pointer-down while one is active re-latches
    /// onto the newest pointer (only the most recent press is tracked).
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.gesture = Gesture::Pressed { last: pos };
    }

    /// Apply pointer movement. Ignored while no button is down.
    pub fn pointer_move(&mut self, pos: Vec2) {
        let last = match self.gesture {
            Gesture::Idle => return,
            Gesture::Pressed { last } | Gesture::Dragging { last } => last,
        };
        let delta = pos - last;
        if delta == Vec2::ZERO {
            return;
        }
        self.target_yaw += delta.x * DRAG_SENSITIVITY;
        self.target_pitch += delta.y * DRAG_SENSITIVITY;
        self.gesture = Gesture::Dragging { last: pos };
    }

    /// End the gesture. Returns true when the release counts as a click
    /// (no drag ever happened for this gesture). An orphan release with no
    /// matching press is a no-op and never a click.
    pub fn pointer_up(&mut self) -> bool {
        let click = matches!(self.gesture, Gesture::Pressed { .. });
        if self.gesture != Gesture::Idle {
            self.gesture = Gesture::Idle;
        }
        click
    }

    /// Wheel zoom; independent of yaw/pitch, clamped to the distance range.
    pub fn wheel(&mut self, delta: f32) {
        self.distance = (self.distance - delta * ZOOM_SENSITIVITY)
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advance one animation frame: idle auto-spin plus inertial easing.
    pub fn tick(&mut self) {
        if matches!(self.gesture, Gesture::Idle) {
            self.target_yaw += AUTO_SPIN;
        }
        self.yaw += (self.target_yaw - self.yaw) * EASING;
        self.pitch += (self.target_pitch - self.pitch) * EASING;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}
