//! Column descriptions: attribute definitions, their constructors and dialect type mapping.

pub mod data_types;
pub mod definition;
pub mod type_mapping;

pub use definition::{AttributeDefinition, AttributeOptions, TypeTag};
pub use type_mapping::{map_type, MappedType};
