//! Typed property trees.
//!
//! A tree is made of [`PropertyNode`]s: typed leaves, ordered composites and
//! schema-backed dictionaries. Paths are dot-separated and resolved
//! iteratively, one segment per level. Every non-terminal segment must name a
//! composite or a dictionary (whose entries are composites).

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

use crate::error::{PropertyError, Result};
use crate::path::PropertyPath;
use crate::types::{Constraint, PropertyType};

/// A single named, typed value slot.
#[derive(Clone)]
pub struct Property {
    name: String,
    ty: Arc<PropertyType>,
    value: Value,
    constraints: Vec<Constraint>,
    strict_values: Option<Vec<Value>>,
}

/// Ordered, name-unique children.
#[derive(Debug, Clone)]
pub struct CompositeProperty {
    name: String,
    children: IndexMap<String, PropertyNode>,
}

/// Composite whose entries are clones of one schema template, keyed by
/// caller-supplied identifiers.
///
/// Entries can only be created through [`DictionaryProperty::set_value`] and
/// [`DictionaryProperty::values_from_json`]; [`DictionaryProperty::add`]
/// always fails.
#[derive(Debug, Clone)]
pub struct DictionaryProperty {
    name: String,
    schema: Option<CompositeProperty>,
    entries: IndexMap<String, PropertyNode>,
}

#[derive(Debug, Clone)]
pub enum PropertyNode {
    Leaf(Property),
    Composite(CompositeProperty),
    Dictionary(DictionaryProperty),
}

impl Property {
    /// Create a leaf holding `Null`. Use [`Property::set_value`] (or a builder)
    /// to give it a validated value.
    pub fn new(name: impl Into<String>, ty: Arc<PropertyType>) -> Self {
        Self {
            name: name.into(),
            ty,
            value: Value::Null,
            constraints: Vec::new(),
            strict_values: None,
        }
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_strict_values(mut self, values: Vec<Value>) -> Self {
        self.strict_values = Some(values);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether `value` would be accepted. `Null` (unset) is always accepted.
    pub fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        if !self.ty.is_valid(value) {
            return false;
        }
        if !self.constraints.iter().all(|c| c(value)) {
            return false;
        }
        match &self.strict_values {
            Some(allowed) => allowed.contains(value),
            None => true,
        }
    }

    /// Parse `value` through the leaf's type, validate it and store it.
    pub fn set_value(&mut self, value: Value) -> Result<()> {
        let parsed = self.ty.parse(&value);
        if !self.accepts(&parsed) {
            return Err(PropertyError::InvalidValue {
                name: self.name.clone(),
                type_name: self.ty.name().to_string(),
                value,
            });
        }
        self.value = parsed;
        Ok(())
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("type", &self.ty.name())
            .field("value", &self.value)
            .field("constraints", &self.constraints.len())
            .field("strict_values", &self.strict_values)
            .finish()
    }
}

impl PropertyNode {
    pub fn name(&self) -> &str {
        match self {
            PropertyNode::Leaf(p) => p.name(),
            PropertyNode::Composite(c) => c.name(),
            PropertyNode::Dictionary(d) => d.name(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Property> {
        match self {
            PropertyNode::Leaf(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeProperty> {
        match self {
            PropertyNode::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeProperty> {
        match self {
            PropertyNode::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&DictionaryProperty> {
        match self {
            PropertyNode::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dictionary_mut(&mut self) -> Option<&mut DictionaryProperty> {
        match self {
            PropertyNode::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    fn child(&self, name: &str) -> Option<&PropertyNode> {
        match self {
            PropertyNode::Leaf(_) => None,
            PropertyNode::Composite(c) => c.children.get(name),
            PropertyNode::Dictionary(d) => d.entries.get(name),
        }
    }

    /// Resolve `path` relative to this node.
    pub fn get(&self, path: &str) -> Result<&PropertyNode> {
        match self {
            PropertyNode::Leaf(p) => Err(PropertyError::NotComposite {
                name: p.name.clone(),
                path: path.to_string(),
            }),
            PropertyNode::Composite(c) => c.get(path),
            PropertyNode::Dictionary(d) => d.get(path),
        }
    }

    /// Resolve `path` and set a value there. Composite and dictionary targets
    /// are populated from an object value.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        match self {
            PropertyNode::Leaf(p) => Err(PropertyError::NotComposite {
                name: p.name.clone(),
                path: path.to_string(),
            }),
            PropertyNode::Composite(c) => c.set_value(path, value),
            PropertyNode::Dictionary(d) => d.set_value(path, value),
        }
    }

    /// Replace this node's content with `value`.
    pub fn assign(&mut self, value: Value) -> Result<()> {
        match self {
            PropertyNode::Leaf(p) => p.set_value(value),
            PropertyNode::Composite(c) => c.values_from_json(&value),
            PropertyNode::Dictionary(d) => d.values_from_json(&value),
        }
    }

    /// Plain nested value mirroring this node's shape.
    pub fn values_to_json(&self) -> Value {
        match self {
            PropertyNode::Leaf(p) => p.value.clone(),
            PropertyNode::Composite(c) => c.values_to_json(),
            PropertyNode::Dictionary(d) => d.values_to_json(),
        }
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a Value)>) {
        let full = if prefix.is_empty() {
            self.name().to_string()
        } else {
            format!("{prefix}.{}", self.name())
        };
        match self {
            PropertyNode::Leaf(p) => out.push((full, &p.value)),
            PropertyNode::Composite(c) => {
                for child in c.children.values() {
                    child.collect_leaves(&full, out);
                }
            }
            PropertyNode::Dictionary(d) => {
                for (key, entry) in &d.entries {
                    let entry_prefix = format!("{full}.{key}");
                    if let PropertyNode::Composite(c) = entry {
                        for child in c.children.values() {
                            child.collect_leaves(&entry_prefix, out);
                        }
                    }
                }
            }
        }
    }
}

/// Walk the remaining segments of `path` starting at `node`.
fn walk<'a, 'p>(
    mut node: &'a PropertyNode,
    segments: impl Iterator<Item = &'p str>,
    path: &PropertyPath,
) -> Result<&'a PropertyNode> {
    for segment in segments {
        node = match node {
            PropertyNode::Leaf(p) => {
                return Err(PropertyError::NotComposite {
                    name: p.name.clone(),
                    path: path.to_string(),
                })
            }
            other => other
                .child(segment)
                .ok_or_else(|| PropertyError::not_found(path))?,
        };
    }
    Ok(node)
}

fn leaf_value<'a>(node: &'a PropertyNode, path: &str) -> Result<&'a Value> {
    node.as_leaf()
        .map(Property::value)
        .ok_or_else(|| PropertyError::NotFound {
            path: path.to_string(),
        })
}

impl CompositeProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Insert a child. Names must be unique at one level.
    pub fn add(&mut self, node: PropertyNode) -> Result<()> {
        if self.children.contains_key(node.name()) {
            return Err(PropertyError::DuplicateName {
                name: self.name.clone(),
                child: node.name().to_string(),
            });
        }
        self.children.insert(node.name().to_string(), node);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyNode> {
        self.children.shift_remove(name)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = &PropertyNode> {
        self.children.values()
    }

    pub fn get(&self, path: &str) -> Result<&PropertyNode> {
        let parsed = PropertyPath::parse(path)?;
        let mut segments = parsed.segments();
        let first = segments.next().unwrap_or_default();
        let node = self
            .children
            .get(first)
            .ok_or_else(|| PropertyError::not_found(&parsed))?;
        walk(node, segments, &parsed)
    }

    /// Leaf value at `path`.
    pub fn value(&self, path: &str) -> Result<&Value> {
        leaf_value(self.get(path)?, path)
    }

    /// Set the value at `path`. A dictionary met along the way receives the
    /// rest of the path, so unknown single keys below it create entries.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        let parsed = PropertyPath::parse(path)?;
        let segments: Vec<&str> = parsed.segments().collect();
        let mut node = self
            .children
            .get_mut(segments[0])
            .ok_or_else(|| PropertyError::not_found(&parsed))?;
        for (i, segment) in segments.iter().enumerate().skip(1) {
            node = match node {
                PropertyNode::Dictionary(dict) => {
                    return dict.set_value(&segments[i..].join("."), value);
                }
                PropertyNode::Composite(c) => c
                    .children
                    .get_mut(*segment)
                    .ok_or_else(|| PropertyError::not_found(&parsed))?,
                PropertyNode::Leaf(p) => {
                    return Err(PropertyError::NotComposite {
                        name: p.name.clone(),
                        path: parsed.to_string(),
                    })
                }
            };
        }
        node.assign(value)
    }

    /// Top-level child names in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    /// Full dotted names of every leaf, in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.leaves().into_iter().map(|(name, _)| name).collect()
    }

    /// Leaf values keyed by their full dotted names.
    pub fn values(&self) -> IndexMap<String, Value> {
        self.leaves()
            .into_iter()
            .map(|(name, value)| (name, value.clone()))
            .collect()
    }

    fn leaves(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        for child in self.children.values() {
            child.collect_leaves("", &mut out);
        }
        out
    }

    pub fn values_to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .children
            .iter()
            .map(|(name, child)| (name.clone(), child.values_to_json()))
            .collect();
        Value::Object(map)
    }

    /// Populate children from a nested object. Keys without a matching child
    /// are skipped. Either every value is applied or, on error, none is.
    pub fn values_from_json(&mut self, json: &Value) -> Result<()> {
        let Some(obj) = json.as_object() else {
            return Err(PropertyError::InvalidValue {
                name: self.name.clone(),
                type_name: "object".to_string(),
                value: json.clone(),
            });
        };
        let mut next = self.children.clone();
        for (key, value) in obj {
            match next.get_mut(key) {
                Some(child) => child.assign(value.clone())?,
                None => debug!("{}: ignoring unknown key '{}'", self.name, key),
            }
        }
        self.children = next;
        Ok(())
    }
}

impl DictionaryProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            entries: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&CompositeProperty> {
        self.schema.as_ref()
    }

    /// Attach the template every entry is cloned from.
    pub fn set_schema(&mut self, mut schema: CompositeProperty) {
        schema.rename("schema");
        self.schema = Some(schema);
    }

    /// Raw child insertion is disabled on dictionary instances.
    pub fn add(&mut self, node: PropertyNode) -> Result<()> {
        Err(PropertyError::DictionaryInsert {
            name: self.name.clone(),
            child: node.name().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyNode> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, path: &str) -> Result<&PropertyNode> {
        let parsed = PropertyPath::parse(path)?;
        let mut segments = parsed.segments();
        let first = segments.next().unwrap_or_default();
        let node = self
            .entries
            .get(first)
            .ok_or_else(|| PropertyError::not_found(&parsed))?;
        walk(node, segments, &parsed)
    }

    /// Entry for `key`, if present.
    pub fn entry(&self, key: &str) -> Option<&CompositeProperty> {
        self.entries.get(key).and_then(PropertyNode::as_composite)
    }

    pub fn value(&self, path: &str) -> Result<&Value> {
        leaf_value(self.get(path)?, path)
    }

    fn instantiate(&self, key: &str, value: &Value) -> Result<PropertyNode> {
        let mut entry = self
            .schema
            .clone()
            .ok_or_else(|| PropertyError::MissingSchema {
                name: self.name.clone(),
            })?;
        entry.rename(key);
        entry.values_from_json(value)?;
        Ok(PropertyNode::Composite(entry))
    }

    /// Set an entry or a value inside one.
    ///
    /// - single key, `Null` value: the entry is removed
    /// - single key, existing entry: updated in place
    /// - single key, no entry: a schema clone is populated and inserted
    /// - dotted path: delegated to the existing entry
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        if self.schema.is_none() {
            return Err(PropertyError::MissingSchema {
                name: self.name.clone(),
            });
        }
        let parsed = PropertyPath::parse(path)?;
        match parsed.rest() {
            None => {
                let key = parsed.first();
                if value.is_null() {
                    self.entries.shift_remove(key);
                    return Ok(());
                }
                if let Some(entry) = self.entries.get_mut(key) {
                    return entry.assign(value);
                }
                let entry = self.instantiate(key, &value)?;
                self.entries.insert(key.to_string(), entry);
                Ok(())
            }
            Some(rest) => {
                let entry = self
                    .entries
                    .get_mut(parsed.first())
                    .ok_or_else(|| PropertyError::not_found(&parsed))?;
                entry.set_value(&rest.to_string(), value)
            }
        }
    }

    /// Replace entries from `{key: {...}}`; every key gets a fresh schema clone.
    /// Nothing is inserted unless every entry builds.
    pub fn values_from_json(&mut self, json: &Value) -> Result<()> {
        let Some(obj) = json.as_object() else {
            return Err(PropertyError::InvalidValue {
                name: self.name.clone(),
                type_name: "object".to_string(),
                value: json.clone(),
            });
        };
        let built = obj
            .iter()
            .map(|(key, value)| self.instantiate(key, value).map(|entry| (key.clone(), entry)))
            .collect::<Result<Vec<_>>>()?;
        self.entries.extend(built);
        Ok(())
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Entries keyed by identifier, for querying leaves relative to each key.
    pub fn values(&self) -> IndexMap<&str, &CompositeProperty> {
        self.entries
            .iter()
            .filter_map(|(key, node)| node.as_composite().map(|c| (key.as_str(), c)))
            .collect()
    }

    /// Full dotted leaf names across all entries (e.g. `id1.position.x`).
    pub fn names(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (key, entry) in &self.entries {
            if let PropertyNode::Composite(c) = entry {
                for child in c.children.values() {
                    child.collect_leaves(key, &mut out);
                }
            }
        }
        out.into_iter().map(|(name, _)| name).collect()
    }

    pub fn values_to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.values_to_json()))
            .collect();
        Value::Object(map)
    }
}
