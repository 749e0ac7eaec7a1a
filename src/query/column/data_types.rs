//! Constructors for every logical column type.
//!
//! ```
//! use sommy::data_types;
//!
//! let id = data_types::integer().primary_key().auto_increment();
//! let name = data_types::string(100).not_null();
//! let price = data_types::decimal(12, 2);
//! assert_eq!(name.length(), Some(100));
//! assert!(id.is_primary_key());
//! assert_eq!(price.scale(), Some(2));
//! ```

use super::definition::{AttributeDefinition, TypeTag};

pub fn integer() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Integer)
}

/// Alias of [`integer`].
pub fn int() -> AttributeDefinition {
    integer()
}

pub fn bigint() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::BigInt)
}

pub fn smallint() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::SmallInt)
}

/// `VARCHAR(length)`.
pub fn string(length: u32) -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Varchar).with_fixed_length(length)
}

/// `VARCHAR` with the default length (255) unless an option sets one.
pub fn varchar() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Varchar)
}

pub fn text() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Text)
}

pub fn boolean() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Boolean)
}

pub fn date() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Date)
}

pub fn datetime() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::DateTime)
}

pub fn time() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Time)
}

pub fn timestamp() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Timestamp)
}

pub fn float() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Float)
}

/// `DECIMAL(precision, scale)`.
pub fn decimal(precision: u32, scale: u32) -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Decimal).with_precision_scale(precision, scale)
}

pub fn json() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Json)
}

pub fn uuid() -> AttributeDefinition {
    AttributeDefinition::new(TypeTag::Uuid)
}

/// Constructor by type tag, for schemas described as data.
pub fn of(tag: TypeTag) -> AttributeDefinition {
    AttributeDefinition::new(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::column::definition::AttributeOptions;

    #[test]
    fn test_constructors_set_type() {
        assert_eq!(integer().type_tag(), TypeTag::Integer);
        assert_eq!(int().type_tag(), TypeTag::Integer);
        assert_eq!(string(10).type_tag(), TypeTag::Varchar);
        assert_eq!(json().type_tag(), TypeTag::Json);
        assert_eq!(of(TypeTag::Time).type_tag(), TypeTag::Time);
    }

    #[test]
    fn test_decimal_precision_scale() {
        let def = decimal(8, 3);
        assert_eq!(def.precision(), Some(8));
        assert_eq!(def.scale(), Some(3));
    }

    #[test]
    fn test_decimal_options_override_precision() {
        let def = decimal(8, 3).with_options(AttributeOptions {
            scale: Some(4),
            ..Default::default()
        });
        assert_eq!(def.precision(), Some(8));
        assert_eq!(def.scale(), Some(4));
    }

    #[test]
    fn test_string_length_wins_over_options() {
        let def = string(150).with_options(AttributeOptions {
            length: Some(1),
            unique: Some(true),
            ..Default::default()
        });
        assert_eq!(def.length(), Some(150));
        assert!(def.is_unique());
    }
}
