//! animates-timeline-core: tick timelines that fold effects into media frames

use serde_json::Value;

pub mod config;
pub mod effect;
pub mod effects;
pub mod envelope;
pub mod error;
pub mod finite;
pub mod frame;
pub mod ids;
pub mod media_object;
pub mod multi_point;
pub mod path_strategy;
pub mod timeline;

/// Discrete timeline unit.
pub type Tick = i64;

/// `endTick` sentinel for effects without an upper bound.
pub const OPEN_ENDED: Tick = -1;

/// Read a tick from a JSON number; whole floats within `i64` range are
/// accepted.
pub fn as_tick(value: &Value) -> Option<Tick> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= Tick::MIN as f64 && *f < Tick::MAX as f64)
            .map(|f| f as Tick)
    })
}

pub use config::TimelineConfig;
pub use effect::{Effect, EffectBase, UpdateOutcome};
pub use effects::{MoveEffect, MultiPointRotateEffect, NEW_POINT_SIGNAL};
pub use envelope::{effect_from_envelope, effect_to_envelope, Envelope};
pub use error::TimelineError;
pub use finite::{FiniteBounds, FiniteEffect};
pub use frame::MediaFrame;
pub use ids::Guid;
pub use media_object::{MediaObject, SharedMediaObject};
pub use path_strategy::{PathStrategy, Position, StraightPath};
pub use timeline::{MediaTimeline, UpdateReport};
