//! Error types for effects, media objects and envelopes.

use animates_property_core::PropertyError;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum TimelineError {
    /// Option tree rejected a read or write
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Bound edit would break `startTick < endTick`
    #[error("Invalid bounds: start {start_tick}, end {end_tick}")]
    InvalidBounds { start_tick: i64, end_tick: i64 },

    /// Envelope names a type with no loader
    #[error("Unknown effect type: {type_name}")]
    UnknownEffectType { type_name: String },

    /// Envelope has the wrong type or is missing a field
    #[error("Invalid envelope for {expected}: {reason}")]
    InvalidEnvelope { expected: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
