//! Schema builders.
//!
//! Builders are plain configuration values: each `.property(..)`,
//! `.composite(..)` or `.dictionary(..)` call appends a field spec, and
//! `create` consumes the builder to produce one validated tree. Producing a
//! second tree from the same schema means cloning the builder (or the tree).

use serde_json::Value;

use crate::error::{PropertyError, Result};
use crate::property::{CompositeProperty, DictionaryProperty, Property, PropertyNode};
use crate::types::{Constraint, TypeRegistry};

/// Declares one typed leaf.
#[derive(Clone)]
pub struct PropertyBuilder {
    name: String,
    type_name: String,
    value: Value,
    constraints: Vec<Constraint>,
    strict_values: Option<Vec<Value>>,
}

impl PropertyBuilder {
    /// A leaf of type `any` with no default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: "any".to_string(),
            value: Value::Null,
            constraints: Vec::new(),
            strict_values: None,
        }
    }

    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Default value; validated at `create`.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Restrict the leaf to an explicit set of values.
    pub fn strict_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.strict_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create(self, registry: &TypeRegistry) -> Result<Property> {
        let ty = registry.get(&self.type_name)?;
        let mut property = Property::new(self.name, ty);
        for c in self.constraints {
            property = property.with_constraint(c);
        }
        if let Some(values) = self.strict_values {
            property = property.with_strict_values(values);
        }
        property.set_value(self.value)?;
        Ok(property)
    }
}

#[derive(Clone)]
enum FieldSpec {
    Leaf(PropertyBuilder),
    Composite(CompositePropertyBuilder),
    Dictionary(DictionaryPropertyBuilder),
}

impl FieldSpec {
    fn name(&self) -> &str {
        match self {
            FieldSpec::Leaf(b) => &b.name,
            FieldSpec::Composite(b) => &b.name,
            FieldSpec::Dictionary(b) => &b.name,
        }
    }

    fn create(self, registry: &TypeRegistry) -> Result<PropertyNode> {
        Ok(match self {
            FieldSpec::Leaf(b) => PropertyNode::Leaf(b.create(registry)?),
            FieldSpec::Composite(b) => PropertyNode::Composite(b.create(registry)?),
            FieldSpec::Dictionary(b) => PropertyNode::Dictionary(b.create(registry)?),
        })
    }
}

/// Declares an ordered group of fields.
#[derive(Clone)]
pub struct CompositePropertyBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl CompositePropertyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.fields.push(FieldSpec::Leaf(property));
        self
    }

    pub fn composite(mut self, composite: CompositePropertyBuilder) -> Self {
        self.fields.push(FieldSpec::Composite(composite));
        self
    }

    pub fn dictionary(mut self, dictionary: DictionaryPropertyBuilder) -> Self {
        self.fields.push(FieldSpec::Dictionary(dictionary));
        self
    }

    /// Append every field declared by `other`, keeping its order.
    pub fn extend(mut self, other: CompositePropertyBuilder) -> Self {
        self.fields.extend(other.fields);
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldSpec::name).collect()
    }

    pub fn create(self, registry: &TypeRegistry) -> Result<CompositeProperty> {
        let mut composite = CompositeProperty::new(self.name);
        for field in self.fields {
            composite.add(field.create(registry)?)?;
        }
        Ok(composite)
    }
}

/// Declares a dictionary: a schema template plus optional initial entries.
#[derive(Clone)]
pub struct DictionaryPropertyBuilder {
    name: String,
    schema: Option<CompositePropertyBuilder>,
    values: Value,
}

impl DictionaryPropertyBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            values: Value::Null,
        }
    }

    /// Template cloned for every entry. It is built at `create` and never
    /// becomes a live entry itself.
    pub fn schema(mut self, schema: CompositePropertyBuilder) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Initial entries as `{key: {...}}`.
    pub fn values(mut self, values: Value) -> Self {
        self.values = values;
        self
    }

    pub fn create(self, registry: &TypeRegistry) -> Result<DictionaryProperty> {
        let mut dictionary = DictionaryProperty::new(self.name);
        if let Some(schema) = self.schema {
            dictionary.set_schema(schema.create(registry)?);
        }
        match self.values {
            Value::Null => {}
            Value::Object(entries) => {
                for (key, value) in entries {
                    dictionary.set_value(&key, value)?;
                }
            }
            other => {
                return Err(PropertyError::InvalidValue {
                    name: dictionary.name().to_string(),
                    type_name: "object".to_string(),
                    value: other,
                })
            }
        }
        Ok(dictionary)
    }
}
