use animates_property_core::{
    one_of, CompositePropertyBuilder, PropertyBag, PropertyBuilder, TypeRegistry,
};
use log::{debug, warn};
use serde_json::{json, Map, Value};

use crate::config::TimelineConfig;
use crate::effect::{Effect, EffectBase, UpdateOutcome};
use crate::error::Result;
use crate::ids::Guid;
use crate::multi_point::{self, Point, POINTS};
use crate::Tick;

const ANGLE: &str = "angle";
const MOTION: &str = "motion";
const CLOCKWISE: &str = "clockwise";
const COUNTER_CLOCKWISE: &str = "counter-clockwise";

/// Edit key a caller uses to ask a specific rotate effect to add a point, and
/// the key under which this effect reports points it created on its own.
/// The value is `{"guid": <point id>, "target": <effect guid>}`.
pub const NEW_POINT_SIGNAL: &str = "MultiPointRotateEffect.newPoint";

/// Rotates `angle` through a list of tick-stamped points.
#[derive(Debug, Clone)]
pub struct MultiPointRotateEffect {
    base: EffectBase,
}

impl MultiPointRotateEffect {
    pub const KIND: &'static str = "MultiPointRotateEffect";

    pub fn new(options: &Value, registry: &TypeRegistry, config: &TimelineConfig) -> Result<Self> {
        Self::with_guid(Guid::new(), options, registry, config)
    }

    pub fn with_guid(
        guid: Guid,
        options: &Value,
        registry: &TypeRegistry,
        config: &TimelineConfig,
    ) -> Result<Self> {
        let payload = CompositePropertyBuilder::new("point")
            .property(PropertyBuilder::new(ANGLE).type_name("float").value(0.0))
            .property(
                PropertyBuilder::new(MOTION)
                    .type_name("string")
                    .value(CLOCKWISE)
                    .constraint(one_of(&[CLOCKWISE, COUNTER_CLOCKWISE])),
            );
        let schema = CompositePropertyBuilder::new("options")
            .dictionary(multi_point::points_dictionary(payload));
        Ok(Self {
            base: EffectBase::new(guid, schema, options, registry, config)?,
        })
    }

    /// Points ordered ascending by tick.
    pub fn points(&self) -> Vec<Point> {
        multi_point::points(self.options())
    }

    pub fn add_point(&mut self, guid: &str, tick: Tick, angle: f64, motion: &str) -> Result<()> {
        let mut data = Map::new();
        data.insert(ANGLE.to_string(), Value::from(angle));
        data.insert(MOTION.to_string(), Value::from(motion));
        multi_point::add_point(&mut self.base, guid, tick, data)
    }

    fn try_add_point(&mut self, guid: &str, tick: Tick, angle: Option<f64>, motion: Option<&str>) {
        let res = self.add_point(guid, tick, angle.unwrap_or(0.0), motion.unwrap_or(CLOCKWISE));
        if let Err(err) = res {
            warn!("rotate effect {}: rejected point {guid}: {err}", self.guid());
        }
    }

    /// Point id from a new-point signal addressed to this effect.
    fn signalled_point(&self, edits: &Map<String, Value>) -> Option<String> {
        let signal = edits.get(NEW_POINT_SIGNAL)?;
        let target = signal.get("target").and_then(Value::as_str)?;
        if target != self.guid().as_str() {
            return None;
        }
        signal.get("guid").and_then(Value::as_str).map(str::to_string)
    }

    // Slope applied to the absolute tick, not to the offset from `start`.
    fn angle_for(tick: Tick, start: &Point, end: &Point) -> f64 {
        let a0 = start.get_f64(ANGLE).unwrap_or(0.0);
        let a1 = end.get_f64(ANGLE).unwrap_or(0.0);
        let m = (a1 - a0) / (end.tick - start.tick) as f64;
        a0 + m * tick as f64
    }

    fn edit_fields(edits: &Map<String, Value>) -> (Option<f64>, Option<&str>) {
        (
            edits.get(ANGLE).and_then(Value::as_f64),
            edits.get(MOTION).and_then(Value::as_str),
        )
    }

    fn all_consumed() -> UpdateOutcome {
        UpdateOutcome::consumed([ANGLE, MOTION])
    }
}

impl Effect for MultiPointRotateEffect {
    fn base(&self) -> &EffectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EffectBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn affected_properties(&self) -> Vec<String> {
        vec![ANGLE.to_string(), MOTION.to_string()]
    }

    fn properties_at(&self, tick: Tick, frame: &mut PropertyBag) {
        let points = self.points();
        let segment = multi_point::segment_for(&points, tick);
        let angle = match (segment.start, segment.end) {
            (Some(start), None) => start.get_f64(ANGLE),
            (Some(start), Some(end)) => Some(Self::angle_for(tick, start, end)),
            (None, _) => None,
        };
        if let Some(angle) = angle {
            if let Err(err) = frame.set(ANGLE, Value::from(angle)) {
                warn!("rotate effect {}: cannot write angle: {err}", self.guid());
            }
        }
    }

    fn update_properties(&mut self, tick: Tick, edits: &Map<String, Value>) -> UpdateOutcome {
        if !edits.contains_key(ANGLE) && !edits.contains_key(MOTION) {
            return UpdateOutcome::default();
        }
        let (angle, motion) = Self::edit_fields(edits);
        if (edits.contains_key(ANGLE) && angle.is_none())
            || (edits.contains_key(MOTION) && motion.is_none())
        {
            debug!(
                "rotate effect {}: dropping mistyped angle/motion edit at {tick}: {:?} {:?}",
                self.guid(),
                edits.get(ANGLE),
                edits.get(MOTION)
            );
        }

        // Caller already allocated a point id for this effect.
        if let Some(point_guid) = self.signalled_point(edits) {
            self.try_add_point(&point_guid, tick, angle, motion);
            return Self::all_consumed();
        }

        let existing = multi_point::point_at(&self.points(), tick).map(|p| p.guid.clone());
        if let Some(point_guid) = existing {
            debug!("rotate effect {}: updating point {point_guid} at {tick}", self.guid());
            let mut fields = Vec::new();
            if let Some(a) = angle {
                fields.push((ANGLE, Value::from(a)));
            }
            if let Some(m) = motion {
                fields.push((MOTION, Value::from(m)));
            }
            for (field, value) in fields {
                let name = format!("{POINTS}.{point_guid}.{field}");
                if let Err(err) = self.set_option(&name, value) {
                    warn!("rotate effect {}: rejected {name}: {err}", self.guid());
                }
            }
            return Self::all_consumed();
        }

        let point_guid = Guid::new().to_string();
        self.try_add_point(&point_guid, tick, angle, motion);
        let mut outcome = Self::all_consumed();
        outcome.new_properties.insert(
            NEW_POINT_SIGNAL.to_string(),
            json!({ "guid": point_guid, "target": self.guid().as_str() }),
        );
        outcome
    }
}
