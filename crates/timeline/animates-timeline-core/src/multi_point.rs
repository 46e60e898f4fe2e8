//! Tick-stamped control points stored in an effect's `points` dictionary.
//!
//! Each entry is `{tick, ...payload}`; the payload fields come from the
//! effect's point schema.

use animates_property_core::{
    CompositeProperty, CompositePropertyBuilder, DictionaryPropertyBuilder, PropertyBuilder,
};
use serde_json::{Map, Value};

use crate::effect::EffectBase;
use crate::error::Result;
use crate::{as_tick, Tick};

pub const POINTS: &str = "points";
const POINT_TICK: &str = "tick";

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub guid: String,
    pub tick: Tick,
    pub data: Map<String, Value>,
}

impl Point {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }
}

/// The two points around a tick. `start` is the last point at or before the
/// tick, `end` its successor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    pub start: Option<&'a Point>,
    pub end: Option<&'a Point>,
}

/// Dictionary declaration for `points`, with `tick` prepended to the payload.
pub fn points_dictionary(payload: CompositePropertyBuilder) -> DictionaryPropertyBuilder {
    let schema = CompositePropertyBuilder::new("point")
        .property(PropertyBuilder::new(POINT_TICK).type_name("integer").value(0))
        .extend(payload);
    DictionaryPropertyBuilder::new(POINTS).schema(schema)
}

/// All points ordered ascending by tick; equal ticks keep insertion order.
pub fn points(options: &CompositeProperty) -> Vec<Point> {
    let Some(dict) = options
        .get(POINTS)
        .ok()
        .and_then(|node| node.as_dictionary())
    else {
        return Vec::new();
    };
    let mut out: Vec<Point> = dict
        .values()
        .into_iter()
        .map(|(guid, entry)| {
            let mut data = match entry.values_to_json() {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            let tick = data.remove(POINT_TICK).as_ref().and_then(as_tick).unwrap_or(0);
            Point {
                guid: guid.to_string(),
                tick,
                data,
            }
        })
        .collect();
    out.sort_by_key(|p| p.tick);
    out
}

/// Insert (or replace) point `guid` at `tick` with payload `data`.
pub fn add_point(
    base: &mut EffectBase,
    guid: &str,
    tick: Tick,
    data: Map<String, Value>,
) -> Result<()> {
    let mut entry = data;
    entry.insert(POINT_TICK.to_string(), Value::from(tick));
    base.set_option(&format!("{POINTS}.{guid}"), Value::Object(entry))
}

/// Point whose tick equals `tick`, if any.
pub fn point_at(points: &[Point], tick: Tick) -> Option<&Point> {
    points.iter().find(|p| p.tick == tick)
}

/// Bracketing pair for `tick` over points sorted by tick.
pub fn segment_for(points: &[Point], tick: Tick) -> Segment<'_> {
    let idx = points.partition_point(|p| p.tick <= tick);
    if idx == 0 {
        return Segment {
            start: None,
            end: points.first(),
        };
    }
    Segment {
        start: points.get(idx - 1),
        end: points.get(idx),
    }
}
