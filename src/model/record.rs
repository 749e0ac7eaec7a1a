//! `Record`: one row of a declared entity.

use super::EntityConfig;
use crate::error::{OrmError, Result};
use crate::query::Predicate;
use crate::value::{Fields, TryGetable, Value};
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A mutable row bound to its entity's [`EntityConfig`].
///
/// A record without a primary-key value is new: [`Record::save`] inserts it and
/// stores the generated key. Once the key is set, `save` issues an update keyed
/// on it. [`Record::delete`] leaves the in-memory fields untouched.
#[derive(Debug, Clone)]
pub struct Record {
    config: Arc<EntityConfig>,
    fields: Fields,
}

impl Record {
    pub fn new(config: Arc<EntityConfig>) -> Self {
        Self::from_fields(config, Fields::new())
    }

    pub(crate) fn from_fields(config: Arc<EntityConfig>, fields: Fields) -> Self {
        Self { config, fields }
    }

    pub fn config(&self) -> &Arc<EntityConfig> {
        &self.config
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Value of `column`; unknown or unset columns read as `None`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Value of `column` read as `T`. An unset column reads as null, so
    /// `Option<T>` maps it to `None`.
    ///
    /// # Errors
    ///
    /// [`OrmError::Extraction`](crate::OrmError::Extraction) when the value
    /// cannot be represented as `T`.
    pub fn get_as<T: TryGetable>(&self, column: &str) -> Result<T> {
        let value = self.fields.get(column).unwrap_or(&Value::Null);
        T::try_get(value).map_err(|source| OrmError::Extraction {
            column: column.to_string(),
            source,
        })
    }

    /// Set `column`, which must be declared by the entity's schema.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<()> {
        self.config.check_column(column)?;
        self.fields.set(column, value);
        Ok(())
    }

    /// The primary-key value, if present and not null.
    pub fn primary_key_value(&self) -> Option<&Value> {
        self.fields
            .get(self.config.primary_key())
            .filter(|value| !value.is_null())
    }

    pub fn is_new(&self) -> bool {
        self.primary_key_value().is_none()
    }

    /// Update when the record has a key, insert otherwise.
    ///
    /// Returns `true` when an update touched at least one row or an insert
    /// produced a key. A caller-assigned key therefore means "update"; use
    /// [`Record::insert`] to insert a row with a pre-assigned key.
    pub fn save(&mut self) -> Result<bool> {
        let values = self.declared_fields(false);
        match self.primary_key_value().cloned() {
            Some(key) => {
                let predicate = Predicate::new().eq(self.config.primary_key(), key);
                let affected = self.config.update(&values, &predicate)?;
                Ok(affected > 0)
            }
            None => self.insert_values(values),
        }
    }

    /// Always insert, keeping a caller-assigned key if one is set.
    pub fn insert(&mut self) -> Result<bool> {
        let values = self.declared_fields(!self.is_new());
        self.insert_values(values)
    }

    /// Delete the row this record was loaded from or saved as.
    ///
    /// Returns 0 without touching the database when the record has no key.
    pub fn delete(&self) -> Result<u64> {
        match self.primary_key_value() {
            Some(key) => {
                let predicate = Predicate::new().eq(self.config.primary_key(), key.clone());
                self.config.destroy(&predicate)
            }
            None => Ok(0),
        }
    }

    /// Fields the schema declares, in record order. Extra columns a fetched row
    /// carried stay readable through [`get`](Self::get) but are never written.
    fn declared_fields(&self, keep_key: bool) -> Fields {
        let pk = self.config.primary_key();
        self.fields.filtered(|column| {
            self.config.schema().contains(column) && (keep_key || column != pk)
        })
    }

    fn insert_values(&mut self, values: Fields) -> Result<bool> {
        let pk = self.config.primary_key().to_string();
        let declared = self.config.attribute(&pk).cloned();
        let supplied = values.get(&pk).is_some();

        let key = self.config.query_interface().insert_returning(
            self.config.table_name(),
            &values,
            declared.as_ref().map(|_| pk.as_str()),
        )?;

        match (key, declared) {
            (Some(key), Some(attr)) => {
                let value = if attr.type_tag().is_integer() {
                    key.parse::<i64>().map(Value::Int).unwrap_or(Value::Text(key))
                } else {
                    Value::Text(key)
                };
                if !supplied {
                    self.fields.set(pk, value);
                }
                Ok(true)
            }
            (Some(_), None) => Ok(true),
            (None, _) => Ok(supplied && !values.is_empty()),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}
