//! `Fields`: an insertion-ordered column → value map.
//!
//! Rows fetched from the database, values handed to `insert`/`update` and the
//! state of a record all use this type, so column order is always the order the
//! caller (or the result set) supplied.

use super::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Insert or replace; a replaced column keeps its original position.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Copy of `self` keeping only the columns accepted by `keep`.
    #[must_use]
    pub fn filtered<F>(&self, mut keep: F) -> Fields
    where
        F: FnMut(&str) -> bool,
    {
        self.entries
            .iter()
            .filter(|(name, _)| keep(name))
            .cloned()
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (column, value) in iter {
            fields.set(column, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, value) in &self.entries {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_insertion_order() {
        let mut fields = Fields::new().with("b", 1).with("a", 2);
        fields.set("b", 3);
        let columns: Vec<_> = fields.columns().collect();
        assert_eq!(columns, vec!["b", "a"]);
        assert_eq!(fields.get("b"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_remove_and_missing() {
        let mut fields = Fields::new().with("id", 7).with("name", "x");
        assert_eq!(fields.remove("id"), Some(Value::Int(7)));
        assert_eq!(fields.remove("id"), None);
        assert!(fields.get("nope").is_none());
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let fields = Fields::new().with("name", "Clinton").with("age", None::<i32>);
        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"name":"Clinton","age":null}"#);
    }
}
