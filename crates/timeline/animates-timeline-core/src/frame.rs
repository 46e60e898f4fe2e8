//! Resolved property snapshot for one tick.

use animates_property_core::PropertyBag;
use serde::Serialize;
use serde_json::Value;

use crate::Tick;

/// Read-only result of folding every applicable effect into a media object's
/// base properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFrame {
    tick: Tick,
    properties: PropertyBag,
}

impl MediaFrame {
    pub(crate) fn new(tick: Tick, properties: PropertyBag) -> Self {
        Self { tick, properties }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn property(&self, path: &str) -> Option<&Value> {
        self.properties.get(path)
    }

    pub fn into_properties(self) -> PropertyBag {
        self.properties
    }
}
