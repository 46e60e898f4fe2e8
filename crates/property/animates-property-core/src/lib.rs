//! animates-property-core: typed, path-addressable property trees

pub mod bag;
pub mod builder;
pub mod error;
pub mod path;
pub mod property;
pub mod types;

pub use bag::PropertyBag;
pub use builder::{CompositePropertyBuilder, DictionaryPropertyBuilder, PropertyBuilder};
pub use error::PropertyError;
pub use path::{names_overlap, PropertyPath};
pub use property::{CompositeProperty, DictionaryProperty, Property, PropertyNode};
pub use types::{constraint, one_of, Constraint, PropertyType, TypeRegistry};
