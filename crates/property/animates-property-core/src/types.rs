//! Named value types with constraint predicates and parent inheritance.
//!
//! A [`TypeRegistry`] is populated once (builtins plus any custom types) and
//! then handed by reference to builders and effect constructors. Validation
//! walks the parent chain first, then the type's own constraints, and returns
//! `false` on the first failure. It never errors on a bad value.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde_json::Value;

use crate::error::{PropertyError, Result};

/// A predicate over a leaf value.
pub type Constraint = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Converts loosely typed input (e.g. numeric strings) into the canonical form.
pub type Parser = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Wrap a closure as a [`Constraint`].
pub fn constraint<F>(f: F) -> Constraint
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Constraint accepting only the listed string values.
pub fn one_of(allowed: &[&str]) -> Constraint {
    let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
    Arc::new(move |v| {
        v.as_str()
            .map(|s| allowed.iter().any(|a| a == s))
            .unwrap_or(false)
    })
}

#[derive(Clone)]
pub struct PropertyType {
    name: String,
    parent: Option<Arc<PropertyType>>,
    constraints: Vec<Constraint>,
    parser: Option<Parser>,
}

impl PropertyType {
    pub fn new(name: impl Into<String>, constraints: Vec<Constraint>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            constraints,
            parser: None,
        }
    }

    pub fn with_parent(mut self, parent: Arc<PropertyType>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&PropertyType> {
        self.parent.as_deref()
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        if let Some(parent) = &self.parent {
            if !parent.is_valid(value) {
                return false;
            }
        }
        self.constraints.iter().all(|c| c(value))
    }

    /// Apply the nearest parser along the parent chain; identity if none.
    pub fn parse(&self, value: &Value) -> Value {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(parser) = &ty.parser {
                return parser(value);
            }
            current = ty.parent();
        }
        value.clone()
    }
}

impl fmt::Debug for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name().to_string()))
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

/// Registry of named property types.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<PropertyType>>,
}

impl TypeRegistry {
    /// An empty registry. Most callers want [`TypeRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the builtin types:
    /// `any`, `boolean`, `number`, `float`, `integer`, `string`, `text`,
    /// `imageFile` and `object`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_types();
        registry
    }

    fn register_builtin_types(&mut self) {
        self.insert(PropertyType::new("any", vec![]));
        self.insert(
            PropertyType::new("boolean", vec![constraint(Value::is_boolean)])
                .with_parser(Arc::new(parse_boolean)),
        );
        self.insert(
            PropertyType::new("number", vec![constraint(Value::is_number)])
                .with_parser(Arc::new(parse_float)),
        );
        self.insert(PropertyType::new("string", vec![constraint(Value::is_string)]));
        self.insert(PropertyType::new("object", vec![constraint(Value::is_object)]));

        // Parents are known to exist at this point.
        let number = self.types["number"].clone();
        let string = self.types["string"].clone();
        self.insert(PropertyType::new("float", vec![]).with_parent(number.clone()));
        self.insert(
            PropertyType::new(
                "integer",
                vec![constraint(|v| {
                    v.is_i64() || v.is_u64() || v.as_f64().map(is_whole_i64).unwrap_or(false)
                })],
            )
            .with_parent(number)
            .with_parser(Arc::new(parse_integer)),
        );
        self.insert(PropertyType::new("text", vec![]).with_parent(string.clone()));
        self.insert(PropertyType::new("imageFile", vec![]).with_parent(string));
    }

    fn insert(&mut self, ty: PropertyType) {
        self.types.insert(ty.name().to_string(), Arc::new(ty));
    }

    /// Register (or replace) a type. The parent, when given, must already exist.
    pub fn register(
        &mut self,
        name: &str,
        constraints: Vec<Constraint>,
        parent: Option<&str>,
    ) -> Result<()> {
        let mut ty = PropertyType::new(name, constraints);
        if let Some(parent) = parent {
            ty = ty.with_parent(self.lookup(parent)?.clone());
        }
        self.insert(ty);
        Ok(())
    }

    /// Register a fully assembled type, e.g. one carrying a custom parser.
    pub fn register_type(&mut self, ty: PropertyType) {
        self.insert(ty);
    }

    fn lookup(&self, name: &str) -> Result<&Arc<PropertyType>> {
        self.types.get(name).ok_or_else(|| PropertyError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn get(&self, name: &str) -> Result<Arc<PropertyType>> {
        self.lookup(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_valid(&self, name: &str, value: &Value) -> Result<bool> {
        Ok(self.lookup(name)?.is_valid(value))
    }

    pub fn parse(&self, name: &str, value: &Value) -> Result<Value> {
        Ok(self.lookup(name)?.parse(value))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

fn parse_float(value: &Value) -> Value {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        _ => value.clone(),
    }
}

/// Whole and representable as `i64` without saturating.
fn is_whole_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn parse_integer(value: &Value) -> Value {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| value.clone()),
        Value::Number(n) if !n.is_i64() && !n.is_u64() => match n.as_f64() {
            Some(f) if is_whole_i64(f) => Value::from(f as i64),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

fn parse_boolean(value: &Value) -> Value {
    match value.as_str() {
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        _ => value.clone(),
    }
}
