//! Start/end tick bounds shared by every effect, plus the plain
//! [`FiniteEffect`].

use animates_property_core::{
    constraint, CompositePropertyBuilder, PropertyBag, PropertyBuilder, TypeRegistry,
};
use serde_json::{Map, Value};

use crate::config::TimelineConfig;
use crate::effect::{Effect, EffectBase, UpdateOutcome};
use crate::error::{Result, TimelineError};
use crate::ids::Guid;
use crate::{as_tick, Tick, OPEN_ENDED};

pub const START_TICK: &str = "startTick";
pub const END_TICK: &str = "endTick";

/// Inclusive tick range; `end_tick == OPEN_ENDED` means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiniteBounds {
    pub start_tick: Tick,
    pub end_tick: Tick,
}

impl FiniteBounds {
    /// Build bounds, rewriting an out-of-order end to `start + default_span`
    /// (saturating at `Tick::MAX`).
    pub fn new(start_tick: Tick, end_tick: Tick, default_span: Tick) -> Self {
        let end_tick = if end_tick != OPEN_ENDED && end_tick <= start_tick {
            start_tick.saturating_add(default_span)
        } else {
            end_tick
        };
        Self {
            start_tick,
            end_tick,
        }
    }

    /// Read `startTick`/`endTick` from a raw options object, falling back to
    /// the configured defaults.
    pub fn from_options(options: &Value, config: &TimelineConfig) -> Self {
        let start = options
            .get(START_TICK)
            .and_then(as_tick)
            .unwrap_or(config.default_start_tick);
        let end = options
            .get(END_TICK)
            .and_then(as_tick)
            .unwrap_or(config.default_start_tick.saturating_add(config.default_span));
        Self::new(start, end, config.default_span)
    }

    pub fn is_infinite(&self) -> bool {
        self.end_tick == OPEN_ENDED
    }

    /// Inclusive at both ends.
    pub fn contains(&self, tick: Tick) -> bool {
        self.start_tick <= tick && (self.is_infinite() || tick <= self.end_tick)
    }

    /// `min(tick, end)` for bounded ranges, `tick` otherwise.
    pub fn clamp(&self, tick: Tick) -> Tick {
        if self.is_infinite() {
            tick
        } else {
            tick.min(self.end_tick)
        }
    }

    /// Bounds after setting `name` to `value`, if the result is still valid.
    /// Names other than the two bounds leave them untouched.
    pub fn with_edit(&self, name: &str, value: &Value) -> Result<FiniteBounds> {
        let mut next = *self;
        match name {
            START_TICK => next.start_tick = as_tick(value).unwrap_or(Tick::MIN),
            END_TICK => next.end_tick = as_tick(value).unwrap_or(Tick::MIN),
            _ => return Ok(next),
        }
        let valid = next.start_tick >= 0
            && (next.is_infinite() || next.start_tick < next.end_tick);
        if valid {
            Ok(next)
        } else {
            Err(TimelineError::InvalidBounds {
                start_tick: next.start_tick,
                end_tick: next.end_tick,
            })
        }
    }

    /// Prefix `schema` with the two bound leaves, defaulted to these bounds.
    pub fn declare(&self, schema: CompositePropertyBuilder) -> CompositePropertyBuilder {
        CompositePropertyBuilder::new("options")
            .property(
                PropertyBuilder::new(START_TICK)
                    .type_name("integer")
                    .value(self.start_tick)
                    .constraint(constraint(|v| as_tick(v).map(|t| t >= 0).unwrap_or(false))),
            )
            .property(
                PropertyBuilder::new(END_TICK)
                    .type_name("integer")
                    .value(self.end_tick)
                    .constraint(constraint(|v| {
                        as_tick(v)
                            .map(|t| t == OPEN_ENDED || t > 0)
                            .unwrap_or(false)
                    })),
            )
            .extend(schema)
    }
}

/// Effect with bounds and nothing else: it affects no properties and leaves
/// frames untouched.
#[derive(Debug, Clone)]
pub struct FiniteEffect {
    base: EffectBase,
}

impl FiniteEffect {
    pub const KIND: &'static str = "FiniteEffect";

    pub fn new(options: &Value, registry: &TypeRegistry, config: &TimelineConfig) -> Result<Self> {
        Self::with_guid(Guid::new(), options, registry, config)
    }

    pub fn with_guid(
        guid: Guid,
        options: &Value,
        registry: &TypeRegistry,
        config: &TimelineConfig,
    ) -> Result<Self> {
        let base = EffectBase::new(
            guid,
            CompositePropertyBuilder::new("options"),
            options,
            registry,
            config,
        )?;
        Ok(Self { base })
    }
}

impl Effect for FiniteEffect {
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
        Vec::new()
    }

    fn properties_at(&self, _tick: Tick, _frame: &mut PropertyBag) {}

    fn update_properties(&mut self, _tick: Tick, _edits: &Map<String, Value>) -> UpdateOutcome {
        UpdateOutcome::default()
    }
}
