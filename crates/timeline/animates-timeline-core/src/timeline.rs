//! Effect resolution for one media object.
//!
//! `media_frame_for(tick)` copies the object's base properties and folds in
//! every effect that has started by `tick`, ordered by ascending `endTick`
//! with open-ended effects last. Effects that already ended contribute their
//! final state (their tick is clamped to `endTick`). Effects with equal keys
//! keep registration order. The effect with the longer window therefore has
//! the final say on a shared property, whatever order effects were added in.
//!
//! `update_effects_that_match(tick, edits)` runs the other way: each active
//! effect that claims one of the still-pending names may absorb part of the
//! edit, and whatever nobody absorbed is returned to the caller.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::config::TimelineConfig;
use crate::effect::Effect;
use crate::frame::MediaFrame;
use crate::ids::Guid;
use crate::media_object::SharedMediaObject;
use crate::Tick;

/// Outcome of distributing an edit across a timeline's effects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Edited names no effect absorbed, in edit order.
    pub pending_properties: Vec<String>,
    /// Extra values reported by the effects that absorbed something.
    pub new_properties: Map<String, Value>,
}

/// Effects keyed by guid, resolved against one shared media object.
#[derive(Debug, Default)]
pub struct MediaTimeline {
    media_object: Option<SharedMediaObject>,
    effects: IndexMap<Guid, Box<dyn Effect>>,
    config: TimelineConfig,
}

impl MediaTimeline {
    pub fn new(media_object: Option<SharedMediaObject>) -> Self {
        Self::with_config(media_object, TimelineConfig::default())
    }

    pub fn with_config(media_object: Option<SharedMediaObject>, config: TimelineConfig) -> Self {
        Self {
            media_object,
            effects: IndexMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn media_object(&self) -> Option<&SharedMediaObject> {
        self.media_object.as_ref()
    }

    pub fn set_media_object(&mut self, media_object: Option<SharedMediaObject>) {
        self.media_object = media_object;
    }

    pub fn media_object_id(&self) -> Option<Guid> {
        self.media_object.as_ref().map(|o| o.borrow().guid().clone())
    }

    /// The object's `name` property.
    pub fn media_object_name(&self) -> Option<Value> {
        self.media_object
            .as_ref()
            .and_then(|o| o.borrow().property("name").cloned())
    }

    /// Index an effect by guid. Effects without identity are dropped; a guid
    /// already present is replaced in place.
    pub fn add_effect(&mut self, effect: Box<dyn Effect>) {
        if effect.guid().is_empty() {
            warn!("ignoring effect without guid: {effect:?}");
            return;
        }
        self.effects.insert(effect.guid().clone(), effect);
    }

    /// Remove and return the effect with `guid`; unknown or empty guids are a
    /// no-op.
    pub fn remove_effect(&mut self, guid: &str) -> Option<Box<dyn Effect>> {
        if guid.is_empty() {
            return None;
        }
        self.effects.shift_remove(&Guid::from(guid))
    }

    /// All effects in registration order.
    pub fn effects(&self) -> impl Iterator<Item = &dyn Effect> + '_ {
        self.effects.values().map(|e| e.as_ref() as &dyn Effect)
    }

    pub fn effect(&self, guid: &str) -> Option<&dyn Effect> {
        self.effects
            .get(&Guid::from(guid))
            .map(|e| e.as_ref() as &dyn Effect)
    }

    pub fn effect_mut(&mut self, guid: &str) -> Option<&mut (dyn Effect + 'static)> {
        self.effects.get_mut(&Guid::from(guid)).map(|e| e.as_mut())
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects with `startTick <= tick` and (open-ended or `tick <= endTick`),
    /// in registration order.
    pub fn effects_for_tick(&self, tick: Tick) -> Vec<&dyn Effect> {
        self.effects().filter(|e| e.is_active_at(tick)).collect()
    }

    /// Active effects that also claim one of `names`.
    pub fn effects_for_tick_that_match(
        &self,
        tick: Tick,
        names: &[&str],
        strict: bool,
    ) -> Vec<&dyn Effect> {
        self.effects()
            .filter(|e| e.is_active_at(tick))
            .filter(|e| e.has_conflict_with_list_of_properties(names, strict))
            .collect()
    }

    /// Earliest tick at which `candidate` can start without overlapping an
    /// existing effect on a shared property: the largest conflicting
    /// `endTick`, or 0. An open-ended conflicting effect counts as ending
    /// `fallback_span` ticks after its start.
    pub fn start_tick_for(&self, candidate: &dyn Effect, fallback_span: Tick) -> Tick {
        self.effects()
            .filter(|e| e.guid() != candidate.guid())
            .filter(|e| e.has_conflict_with_properties(candidate))
            .map(|e| {
                if e.is_infinite() {
                    e.start_tick().saturating_add(fallback_span)
                } else {
                    e.end_tick()
                }
            })
            .max()
            .unwrap_or(0)
    }

    /// Resolve the object's properties at `tick`.
    pub fn media_frame_for(&self, tick: Tick) -> MediaFrame {
        let mut properties = self
            .media_object
            .as_ref()
            .map(|o| o.borrow().properties())
            .unwrap_or_default();

        let mut active: Vec<&dyn Effect> = self
            .effects()
            .filter(|e| e.start_tick() <= tick)
            .collect();
        active.sort_by_key(|e| (e.is_infinite(), e.end_tick()));
        for effect in active {
            let effect_tick = effect.clamp_tick(tick);
            debug!(
                "frame {tick}: applying {} {} at {effect_tick}",
                effect.kind(),
                effect.guid()
            );
            effect.properties_at(effect_tick, &mut properties);
        }
        MediaFrame::new(tick, properties)
    }

    /// Offer `edits` to every active effect claiming a still-pending name.
    /// Names consumed by one effect are not offered to later ones.
    pub fn update_effects_that_match(
        &mut self,
        tick: Tick,
        edits: &Map<String, Value>,
    ) -> UpdateReport {
        let mut report = UpdateReport {
            pending_properties: edits.keys().cloned().collect(),
            new_properties: Map::new(),
        };
        for effect in self.effects.values_mut() {
            if report.pending_properties.is_empty() {
                break;
            }
            if !effect.is_active_at(tick) {
                continue;
            }
            let pending: Vec<&str> = report
                .pending_properties
                .iter()
                .map(String::as_str)
                .collect();
            if !effect.has_conflict_with_list_of_properties(&pending, false) {
                continue;
            }
            let outcome = effect.update_properties(tick, edits);
            debug!(
                "tick {tick}: {} {} consumed {:?}",
                effect.kind(),
                effect.guid(),
                outcome.updated_properties
            );
            report
                .pending_properties
                .retain(|name| !outcome.updated_properties.contains(name));
            report.new_properties.extend(outcome.new_properties);
        }
        report
    }
}
