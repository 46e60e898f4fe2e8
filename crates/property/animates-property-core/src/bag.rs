//! Untyped, auto-creating property containers.
//!
//! Raw media-object state and resolved frame snapshots are plain nested JSON
//! objects. Setting a path that does not exist creates every intermediate
//! container on demand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PropertyError, Result};
use crate::path::PropertyPath;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag {
    root: Map<String, Value>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an object value; anything else yields an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Value at a dotted path. Missing, empty or malformed paths yield `None`,
    /// as does walking through a non-object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parsed = PropertyPath::parse(path).ok()?;
        let mut segments = parsed.segments();
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Numeric value at `path`, if it is a number.
    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Set a value, creating intermediate objects as needed.
    ///
    /// Fails when an intermediate segment already holds a non-object value.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let parsed = PropertyPath::parse(path)?;
        let segments: Vec<&str> = parsed.segments().collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Err(PropertyError::not_found(path)),
        };

        let mut current = &mut self.root;
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match slot {
                Value::Object(map) => map,
                _ => {
                    return Err(PropertyError::NotComposite {
                        name: segment.to_string(),
                        path: path.to_string(),
                    })
                }
            };
        }
        current.insert(last.to_string(), value);
        Ok(())
    }

    /// Remove the value at `path`, returning it.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        let parsed = PropertyPath::parse(path).ok()?;
        let segments: Vec<&str> = parsed.segments().collect();
        let (last, parents) = segments.split_last()?;
        let mut current = &mut self.root;
        for segment in parents {
            current = current.get_mut(*segment)?.as_object_mut()?;
        }
        current.remove(*last)
    }

    /// Dotted names of every non-object value, depth first.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<(String, &Value)> = self
            .root
            .iter()
            .rev()
            .map(|(k, v)| (k.clone(), v))
            .collect();
        while let Some((name, value)) = stack.pop() {
            match value {
                Value::Object(map) if !map.is_empty() => {
                    for (k, v) in map.iter().rev() {
                        stack.push((format!("{name}.{k}"), v));
                    }
                }
                _ => out.push(name),
            }
        }
        out
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(root: Map<String, Value>) -> Self {
        Self { root }
    }
}
