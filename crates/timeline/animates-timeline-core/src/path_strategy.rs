//! Interchangeable position paths used by `MoveEffect`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Tick, OPEN_ENDED};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

pub trait PathStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Position at `tick` for an effect spanning `start_tick..=end_tick`.
    /// `end_tick` may be the open-ended sentinel, in which case the strategy
    /// extrapolates.
    fn position_for(&self, start_tick: Tick, end_tick: Tick, tick: Tick) -> Position;
}

/// Straight line from `start` to `end`.
///
/// Open-ended effects keep moving along the same line, covering the full
/// `start -> end` distance every `reference_span` ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightPath {
    pub start: Position,
    pub end: Position,
    pub reference_span: Tick,
}

impl StraightPath {
    pub const NAME: &'static str = "Straight";
}

impl PathStrategy for StraightPath {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn position_for(&self, start_tick: Tick, end_tick: Tick, tick: Tick) -> Position {
        let span = if end_tick == OPEN_ENDED {
            self.reference_span
        } else {
            end_tick - start_tick
        };
        if span <= 0 {
            return self.end;
        }
        let t = (tick - start_tick) as f64 / span as f64;
        self.start.lerp(self.end, t)
    }
}

/// Path kinds accepted by the `path.kind` option.
pub const PATH_KINDS: &[&str] = &[StraightPath::NAME];

/// Build the strategy named `kind`, or `None` for an unknown kind.
pub fn strategy_for(
    kind: &str,
    start: Position,
    end: Position,
    reference_span: Tick,
) -> Option<Box<dyn PathStrategy>> {
    match kind {
        StraightPath::NAME => Some(Box::new(StraightPath {
            start,
            end,
            reference_span,
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    #[test]
    fn straight_path_interpolates_within_bounds() {
        let path = StraightPath {
            start: Position::new(0.0, 0.0),
            end: Position::new(100.0, 50.0),
            reference_span: 100,
        };
        let mid = path.position_for(10, 20, 15);
        approx(mid.x, 50.0, 1e-9);
        approx(mid.y, 25.0, 1e-9);
        assert_eq!(path.position_for(10, 20, 10), path.start);
        assert_eq!(path.position_for(10, 20, 20), path.end);
    }

    #[test]
    fn open_ended_path_extrapolates() {
        let path = StraightPath {
            start: Position::new(0.0, 0.0),
            end: Position::new(10.0, 0.0),
            reference_span: 10,
        };
        approx(path.position_for(0, OPEN_ENDED, 25).x, 25.0, 1e-9);
    }

    #[test]
    fn unknown_kind_has_no_strategy() {
        assert!(strategy_for("Bezier", Position::default(), Position::default(), 100).is_none());
        assert!(strategy_for("Straight", Position::default(), Position::default(), 100).is_some());
    }
}
