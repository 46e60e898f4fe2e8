//! The effect capability contract.
//!
//! An effect owns a typed options tree (always carrying `startTick` and
//! `endTick`) through an [`EffectBase`], and implements [`Effect`] for its
//! forward transform (`properties_at`) and its reverse transform
//! (`update_properties`). Bounds, identity and conflict checks are provided.

use std::fmt;

use animates_property_core::{
    names_overlap, CompositeProperty, CompositePropertyBuilder, PropertyBag, TypeRegistry,
};
use log::debug;
use serde_json::{Map, Value};

use crate::config::TimelineConfig;
use crate::error::Result;
use crate::finite::{FiniteBounds, END_TICK, START_TICK};
use crate::ids::Guid;
use crate::{as_tick, Tick, OPEN_ENDED};

/// Result of offering an edit to an effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOutcome {
    /// Edited names this effect absorbed.
    pub updated_properties: Vec<String>,
    /// Extra values the caller should carry forward (e.g. a new-point signal).
    pub new_properties: Map<String, Value>,
}

impl UpdateOutcome {
    pub fn consumed<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            updated_properties: names.into_iter().map(Into::into).collect(),
            new_properties: Map::new(),
        }
    }
}

/// Identity plus the options tree every effect carries.
#[derive(Debug, Clone)]
pub struct EffectBase {
    guid: Guid,
    options: CompositeProperty,
}

impl EffectBase {
    /// Build the options tree from `schema` (bounds are prepended) and apply
    /// the caller's raw `options` object on top of the defaults.
    pub fn new(
        guid: Guid,
        schema: CompositePropertyBuilder,
        options: &Value,
        registry: &TypeRegistry,
        config: &TimelineConfig,
    ) -> Result<Self> {
        let bounds = FiniteBounds::from_options(options, config);
        let mut tree = bounds.declare(schema).create(registry)?;
        if let Some(obj) = options.as_object() {
            let rest: Map<String, Value> = obj
                .iter()
                .filter(|(k, _)| k.as_str() != START_TICK && k.as_str() != END_TICK)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            tree.values_from_json(&Value::Object(rest))?;
        }
        Ok(Self {
            guid,
            options: tree,
        })
    }

    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    pub fn options(&self) -> &CompositeProperty {
        &self.options
    }

    pub fn bounds(&self) -> FiniteBounds {
        let start = self
            .options
            .value(START_TICK)
            .ok()
            .and_then(as_tick)
            .unwrap_or(0);
        let end = self
            .options
            .value(END_TICK)
            .ok()
            .and_then(as_tick)
            .unwrap_or(OPEN_ENDED);
        FiniteBounds {
            start_tick: start,
            end_tick: end,
        }
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.value(name).ok()
    }

    /// Typed write into the options tree. Bound edits must keep
    /// `0 <= startTick < endTick` (or an open end).
    pub fn set_option(&mut self, name: &str, value: Value) -> Result<()> {
        self.bounds().with_edit(name, &value)?;
        self.options.set_value(name, value)?;
        Ok(())
    }
}

pub trait Effect: fmt::Debug {
    fn base(&self) -> &EffectBase;
    fn base_mut(&mut self) -> &mut EffectBase;

    /// Envelope type name.
    fn kind(&self) -> &'static str;

    /// Property names this effect can write.
    fn affected_properties(&self) -> Vec<String>;

    /// Apply this effect at `tick` to a frame snapshot. Must not touch
    /// anything but `frame`.
    fn properties_at(&self, tick: Tick, frame: &mut PropertyBag);

    /// Absorb whichever edited names this effect accounts for at `tick`.
    fn update_properties(&mut self, tick: Tick, edits: &Map<String, Value>) -> UpdateOutcome;

    fn guid(&self) -> &Guid {
        self.base().guid()
    }

    fn options(&self) -> &CompositeProperty {
        self.base().options()
    }

    fn option(&self, name: &str) -> Option<&Value> {
        self.base().option(name)
    }

    fn set_option(&mut self, name: &str, value: Value) -> Result<()> {
        self.base_mut().set_option(name, value)
    }

    fn start_tick(&self) -> Tick {
        self.base().bounds().start_tick
    }

    fn end_tick(&self) -> Tick {
        self.base().bounds().end_tick
    }

    fn is_infinite(&self) -> bool {
        self.end_tick() == OPEN_ENDED
    }

    /// `startTick <= tick` and (open-ended or `tick <= endTick`).
    fn is_active_at(&self, tick: Tick) -> bool {
        self.base().bounds().contains(tick)
    }

    /// Tick handed to `properties_at` when resolving a frame at `tick`.
    fn clamp_tick(&self, tick: Tick) -> Tick {
        self.base().bounds().clamp(tick)
    }

    /// Whether any affected property overlaps `names`. Non-strict matching
    /// also treats dotted prefixes as overlapping.
    fn has_conflict_with_list_of_properties(&self, names: &[&str], strict: bool) -> bool {
        let affected = self.affected_properties();
        let hit = affected
            .iter()
            .any(|a| names.iter().any(|n| names_overlap(a, n, strict)));
        if hit {
            debug!("effect {} claims one of {:?}", self.guid(), names);
        }
        hit
    }

    fn has_conflict_with_properties(&self, other: &dyn Effect) -> bool {
        let theirs = other.affected_properties();
        let names: Vec<&str> = theirs.iter().map(String::as_str).collect();
        self.has_conflict_with_list_of_properties(&names, false)
    }
}
