//! The object whose properties a timeline animates.

use std::cell::RefCell;
use std::rc::Rc;

use animates_property_core::PropertyBag;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::ids::Guid;

/// Timelines hold the media object by shared reference; they never own it.
pub type SharedMediaObject = Rc<RefCell<MediaObject>>;

/// Identity plus untyped, auto-creating base properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaObject {
    guid: Guid,
    #[serde(default)]
    properties: PropertyBag,
}

impl MediaObject {
    /// Fresh object with a random guid and the given base properties.
    pub fn new(properties: Value) -> Self {
        Self {
            guid: Guid::new(),
            properties: PropertyBag::from_value(properties),
        }
    }

    pub fn with_guid(guid: Guid, properties: Value) -> Self {
        Self {
            guid,
            properties: PropertyBag::from_value(properties),
        }
    }

    pub fn into_shared(self) -> SharedMediaObject {
        Rc::new(RefCell::new(self))
    }

    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Deep copy of the base properties.
    pub fn properties(&self) -> PropertyBag {
        self.properties.clone()
    }

    pub fn property(&self, path: &str) -> Option<&Value> {
        self.properties.get(path)
    }

    pub fn set_property(&mut self, path: &str, value: Value) -> Result<()> {
        self.properties.set(path, value)?;
        Ok(())
    }

    /// Apply `{dotted.path: value}` edits, e.g. the pending remainder of a
    /// timeline update. Stops at the first rejected path.
    pub fn set_properties(&mut self, edits: &Map<String, Value>) -> Result<()> {
        for (path, value) in edits {
            self.set_property(path, value.clone())?;
        }
        Ok(())
    }
}
