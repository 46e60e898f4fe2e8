use animates_property_core::{CompositePropertyBuilder, PropertyBag, PropertyBuilder, TypeRegistry};
use log::warn;
use serde_json::{Map, Value};

use crate::config::TimelineConfig;
use crate::effect::{Effect, EffectBase, UpdateOutcome};
use crate::error::Result;
use crate::ids::Guid;
use crate::path_strategy::{strategy_for, PathStrategy, Position, StraightPath, PATH_KINDS};
use crate::Tick;

const POSITION_X: &str = "position.x";
const POSITION_Y: &str = "position.y";

/// Moves `position` along a path between two endpoints.
///
/// Options: `path.kind`, `path.startPosition.{x,y}`, `path.endPosition.{x,y}`.
/// Editing `position.x`/`position.y` at exactly the start or end tick moves
/// the matching endpoint.
#[derive(Debug, Clone)]
pub struct MoveEffect {
    base: EffectBase,
    reference_span: Tick,
}

fn endpoint(name: &str) -> CompositePropertyBuilder {
    CompositePropertyBuilder::new(name)
        .property(PropertyBuilder::new("x").type_name("float").value(0.0))
        .property(PropertyBuilder::new("y").type_name("float").value(0.0))
}

impl MoveEffect {
    pub const KIND: &'static str = "MoveEffect";

    pub fn new(options: &Value, registry: &TypeRegistry, config: &TimelineConfig) -> Result<Self> {
        Self::with_guid(Guid::new(), options, registry, config)
    }

    pub fn with_guid(
        guid: Guid,
        options: &Value,
        registry: &TypeRegistry,
        config: &TimelineConfig,
    ) -> Result<Self> {
        let schema = CompositePropertyBuilder::new("options").composite(
            CompositePropertyBuilder::new("path")
                .property(
                    PropertyBuilder::new("kind")
                        .type_name("string")
                        .value(StraightPath::NAME)
                        .strict_values(PATH_KINDS.iter().copied()),
                )
                .composite(endpoint("startPosition"))
                .composite(endpoint("endPosition")),
        );
        Ok(Self {
            base: EffectBase::new(guid, schema, options, registry, config)?,
            reference_span: config.default_span,
        })
    }

    fn position_option(&self, name: &str) -> Position {
        let read = |axis: &str| {
            self.option(&format!("path.{name}.{axis}"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        Position::new(read("x"), read("y"))
    }

    pub fn start_position(&self) -> Position {
        self.position_option("startPosition")
    }

    pub fn end_position(&self) -> Position {
        self.position_option("endPosition")
    }

    pub fn path(&self) -> Option<Box<dyn PathStrategy>> {
        let kind = self
            .option("path.kind")
            .and_then(Value::as_str)
            .unwrap_or(StraightPath::NAME);
        strategy_for(
            kind,
            self.start_position(),
            self.end_position(),
            self.reference_span,
        )
    }

    fn set_endpoint(&mut self, endpoint: &str, axis: &str, value: &Value) -> bool {
        let name = format!("path.{endpoint}.{axis}");
        match self.set_option(&name, value.clone()) {
            Ok(()) => true,
            Err(err) => {
                warn!("move effect {}: rejected {name}: {err}", self.guid());
                false
            }
        }
    }
}

impl Effect for MoveEffect {
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
        vec!["position".to_string()]
    }

    fn properties_at(&self, tick: Tick, frame: &mut PropertyBag) {
        if tick < self.start_tick() {
            return;
        }
        let Some(path) = self.path() else {
            return;
        };
        let pos = path.position_for(self.start_tick(), self.end_tick(), self.clamp_tick(tick));
        for (name, v) in [(POSITION_X, pos.x), (POSITION_Y, pos.y)] {
            if let Err(err) = frame.set(name, Value::from(v)) {
                warn!("move effect {}: cannot write {name}: {err}", self.guid());
            }
        }
    }

    fn update_properties(&mut self, tick: Tick, edits: &Map<String, Value>) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        if !self.is_active_at(tick) {
            return outcome;
        }
        let endpoint = if tick == self.start_tick() {
            "startPosition"
        } else if tick == self.end_tick() {
            "endPosition"
        } else {
            return outcome;
        };
        for (name, axis) in [(POSITION_X, "x"), (POSITION_Y, "y")] {
            if let Some(value) = edits.get(name) {
                if self.set_endpoint(endpoint, axis, value) {
                    outcome.updated_properties.push(name.to_string());
                }
            }
        }
        outcome
    }
}
