//! Attribute definitions: the normalized description of one column.
//!
//! An `AttributeDefinition` is produced by the constructors in
//! [`data_types`](super::data_types) and never changes afterwards; the builder
//! methods below consume `self` and hand back a new definition.

use crate::error::OrmError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeTag {
    Integer,
    BigInt,
    SmallInt,
    Varchar,
    Text,
    Boolean,
    Date,
    DateTime,
    Time,
    Timestamp,
    Float,
    Decimal,
    Json,
    Uuid,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Integer => "INTEGER",
            TypeTag::BigInt => "BIGINT",
            TypeTag::SmallInt => "SMALLINT",
            TypeTag::Varchar => "VARCHAR",
            TypeTag::Text => "TEXT",
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Date => "DATE",
            TypeTag::DateTime => "DATETIME",
            TypeTag::Time => "TIME",
            TypeTag::Timestamp => "TIMESTAMP",
            TypeTag::Float => "FLOAT",
            TypeTag::Decimal => "DECIMAL",
            TypeTag::Json => "JSON",
            TypeTag::Uuid => "UUID",
        }
    }

    /// Integer family: the types that can carry auto-increment and inline keys.
    pub fn is_integer(&self) -> bool {
        matches!(self, TypeTag::Integer | TypeTag::BigInt | TypeTag::SmallInt)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.trim().to_uppercase().as_str() {
            "INTEGER" | "INT" => TypeTag::Integer,
            "BIGINT" => TypeTag::BigInt,
            "SMALLINT" => TypeTag::SmallInt,
            "VARCHAR" | "STRING" => TypeTag::Varchar,
            "TEXT" => TypeTag::Text,
            "BOOLEAN" | "BOOL" => TypeTag::Boolean,
            "DATE" => TypeTag::Date,
            "DATETIME" => TypeTag::DateTime,
            "TIME" => TypeTag::Time,
            "TIMESTAMP" => TypeTag::Timestamp,
            "FLOAT" => TypeTag::Float,
            "DECIMAL" => TypeTag::Decimal,
            "JSON" => TypeTag::Json,
            "UUID" => TypeTag::Uuid,
            other => {
                return Err(OrmError::Configuration(format!("unknown column type `{other}`")))
            }
        };
        Ok(tag)
    }
}

/// Optional attribute settings merged into a typed definition.
///
/// Every field left as `None` keeps the constructor's value. Deserializes from the
/// camelCase option names (`allowNull`, `primaryKey`, `autoIncrement`, ...).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeOptions {
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub allow_null: Option<bool>,
    pub unique: Option<bool>,
    pub primary_key: Option<bool>,
    pub auto_increment: Option<bool>,
    #[serde(skip)]
    pub default: Option<Value>,
}

/// Normalized description of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    type_tag: TypeTag,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
    allow_null: bool,
    unique: bool,
    primary_key: bool,
    auto_increment: bool,
    default: Option<Value>,
    /// Set when `length` came from the typed constructor argument.
    length_fixed: bool,
}

impl AttributeDefinition {
    pub fn new(type_tag: TypeTag) -> Self {
        Self {
            type_tag,
            length: None,
            precision: None,
            scale: None,
            allow_null: true,
            unique: false,
            primary_key: false,
            auto_increment: false,
            default: None,
            length_fixed: false,
        }
    }

    pub(crate) fn with_fixed_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self.length_fixed = true;
        self
    }

    pub(crate) fn with_precision_scale(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Merge an options record. Options win for every field they set, except the
    /// type and a length that was given to the typed constructor.
    #[must_use]
    pub fn with_options(mut self, options: AttributeOptions) -> Self {
        if let Some(length) = options.length {
            if !self.length_fixed {
                self.length = Some(length);
            }
        }
        if let Some(precision) = options.precision {
            self.precision = Some(precision);
        }
        if let Some(scale) = options.scale {
            self.scale = Some(scale);
        }
        if let Some(allow_null) = options.allow_null {
            self.allow_null = allow_null;
        }
        if let Some(unique) = options.unique {
            self.unique = unique;
        }
        if let Some(primary_key) = options.primary_key {
            self.primary_key = primary_key;
        }
        if let Some(auto_increment) = options.auto_increment {
            self.auto_increment = auto_increment;
        }
        if let Some(default) = options.default {
            self.default = Some(default);
        }
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn length(&self) -> Option<u32> {
        self.length
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub fn scale(&self) -> Option<u32> {
        self.scale
    }

    pub fn allows_null(&self) -> bool {
        self.allow_null
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_aliases() {
        assert_eq!("int".parse::<TypeTag>().unwrap(), TypeTag::Integer);
        assert_eq!("String".parse::<TypeTag>().unwrap(), TypeTag::Varchar);
        assert!("money".parse::<TypeTag>().is_err());
    }

    #[test]
    fn test_defaults() {
        let def = AttributeDefinition::new(TypeTag::Text);
        assert!(def.allows_null());
        assert!(!def.is_unique());
        assert!(!def.is_primary_key());
        assert!(!def.is_auto_increment());
        assert!(def.default().is_none());
    }

    #[test]
    fn test_options_do_not_override_typed_length() {
        let def = AttributeDefinition::new(TypeTag::Varchar)
            .with_fixed_length(100)
            .with_options(AttributeOptions {
                length: Some(20),
                allow_null: Some(false),
                ..Default::default()
            });
        assert_eq!(def.length(), Some(100));
        assert!(!def.allows_null());
    }

    #[test]
    fn test_options_set_length_when_not_typed() {
        let def = AttributeDefinition::new(TypeTag::Varchar).with_options(AttributeOptions {
            length: Some(20),
            ..Default::default()
        });
        assert_eq!(def.length(), Some(20));
    }

    #[test]
    fn test_options_deserialize_from_camel_case() {
        let options: AttributeOptions =
            serde_json::from_str(r#"{"allowNull": false, "primaryKey": true, "autoIncrement": true}"#)
                .unwrap();
        let def = AttributeDefinition::new(TypeTag::Integer).with_options(options);
        assert!(def.is_primary_key());
        assert!(def.is_auto_increment());
        assert!(!def.allows_null());
    }
}
