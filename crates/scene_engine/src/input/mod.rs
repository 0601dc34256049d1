//! Input state and the first-person viewer
//!
//! Window plumbing lives outside the engine; it feeds key presses and raw
//! mouse deltas in here. Once per frame the key table is reduced to a
//! [`MovementIntent`] and mouse motion turns the [`Viewer`].

use std::collections::HashSet;

use bitflags::bitflags;

use crate::core::config::ViewerConfig;
use crate::foundation::math::{utils, Vec3};

/// Keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// A key
    A,
    /// S key
    S,
    /// D key
    D,
    /// E key
    E,
    /// Space key
    Space,
    /// Escape key
    Escape,
}

impl KeyCode {
    /// Map a typed character to a key, case-insensitively
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Self::W),
            'a' => Some(Self::A),
            's' => Some(Self::S),
            'd' => Some(Self::D),
            'e' => Some(Self::E),
            ' ' => Some(Self::Space),
            '\u{1b}' => Some(Self::Escape),
            _ => None,
        }
    }
}

bitflags! {
    /// What the player wants to do this frame
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MovementIntent: u8 {
        /// Walk along the look direction
        const FORWARD  = 0b0000_0001;
        /// Walk away from the look direction
        const BACK     = 0b0000_0010;
        /// Strafe left
        const LEFT     = 0b0000_0100;
        /// Strafe right
        const RIGHT    = 0b0000_1000;
        /// Jump
        const JUMP     = 0b0001_0000;
    }
}

impl MovementIntent {
    /// Walk axes: `(forward, strafe)`, each in -1..=1
    pub fn walk_axes(self) -> (f32, f32) {
        let mut forward = 0.0;
        let mut strafe = 0.0;
        if self.contains(Self::FORWARD) {
            forward += 1.0;
        }
        if self.contains(Self::BACK) {
            forward -= 1.0;
        }
        if self.contains(Self::LEFT) {
            strafe -= 1.0;
        }
        if self.contains(Self::RIGHT) {
            strafe += 1.0;
        }
        (forward, strafe)
    }
}

/// Boolean key-state table plus accumulated mouse motion
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    mouse_delta: (f32, f32),
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release
    pub fn handle_key_input(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    /// Accumulate raw mouse motion in pixels
    pub fn handle_mouse_move(&mut self, dx: f32, dy: f32) {
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// True while `key` is held
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Movement intent from the current key table
    pub fn movement_intent(&self) -> MovementIntent {
        let mut intent = MovementIntent::empty();
        intent.set(MovementIntent::FORWARD, self.is_pressed(KeyCode::W));
        intent.set(MovementIntent::BACK, self.is_pressed(KeyCode::S));
        intent.set(MovementIntent::LEFT, self.is_pressed(KeyCode::A));
        intent.set(MovementIntent::RIGHT, self.is_pressed(KeyCode::D));
        intent.set(MovementIntent::JUMP, self.is_pressed(KeyCode::Space));
        intent
    }

    /// Mouse motion since the last call
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }
}

/// First-person viewer: eye position and look angles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    /// Eye position in world space
    pub position: Vec3,
    /// Heading in degrees; -90 looks down -Z
    pub yaw: f32,
    /// Elevation in degrees
    pub pitch: f32,
    /// Degrees per pixel of mouse motion
    pub sensitivity: f32,
}

impl Viewer {
    /// Pitch is clamped to this many degrees either side of the horizon
    pub const PITCH_LIMIT: f32 = 89.0;

    /// Viewer placed as configured
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            position: Vec3::from(config.position),
            yaw: config.yaw,
            pitch: config.pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            sensitivity: config.mouse_sensitivity,
        }
    }

    /// Turn by a mouse delta; moving the mouse up looks up
    pub fn apply_mouse_delta(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Unit look direction
    pub fn look_direction(&self) -> Vec3 {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        Vec3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin())
    }

    /// Point one unit ahead of the eye, for building a view matrix
    pub fn target(&self) -> Vec3 {
        self.position + self.look_direction()
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}
