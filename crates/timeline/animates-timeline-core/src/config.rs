//! Timeline configuration.

use serde::{Deserialize, Serialize};

use crate::Tick;

/// Tunables shared by effect constructors and the timeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    /// Span used when bounds are supplied out of order, as the reference
    /// duration of open-ended paths, and as the placement fallback for
    /// open-ended conflicting effects.
    pub default_span: Tick,
    /// Start tick of an effect created without one.
    pub default_start_tick: Tick,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_span: 100,
            default_start_tick: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: TimelineConfig = serde_json::from_str(r#"{"defaultSpan": 30}"#).unwrap();
        assert_eq!(cfg.default_span, 30);
        assert_eq!(cfg.default_start_tick, 0);
    }
}
