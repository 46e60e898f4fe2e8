//! Concrete effect kinds.

pub mod move_effect;
pub mod rotate;

pub use move_effect::MoveEffect;
pub use rotate::{MultiPointRotateEffect, NEW_POINT_SIGNAL};
