//! Physics module for collision detection and response
//!
//! Point-versus-oriented-box tests against registered collision volumes and
//! the first-person movement policy built on them.

pub mod collision;
pub mod movement;

pub use collision::{overlaps, PhysicsRegistry, PlayerShape};
pub use movement::{MovementOutcome, PlayerController};
