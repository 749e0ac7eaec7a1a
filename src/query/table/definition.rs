//! Schema descriptor: the ordered column set of one entity plus its resolved key.

use crate::query::column::AttributeDefinition;

/// Column name used when nothing is flagged as primary key and no override is given.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Ordered column → attribute mapping with a resolved primary-key column name.
///
/// The key resolves, in order, to the configured override, the first attribute
/// flagged `primary_key`, or [`DEFAULT_PRIMARY_KEY`].
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    columns: Vec<(String, AttributeDefinition)>,
    primary_key_override: Option<String>,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaDescriptor {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            primary_key_override: None,
        }
    }

    /// Append a column (or replace the definition of an existing one in place).
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, attr: AttributeDefinition) -> Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = attr,
            None => self.columns.push((name, attr)),
        }
        self
    }

    /// Override primary-key detection.
    #[must_use]
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key_override = Some(column.into());
        self
    }

    /// Resolved primary-key column name.
    pub fn primary_key(&self) -> &str {
        if let Some(ref column) = self.primary_key_override {
            return column;
        }
        self.columns
            .iter()
            .find(|(_, attr)| attr.is_primary_key())
            .map(|(name, _)| name.as_str())
            .unwrap_or(DEFAULT_PRIMARY_KEY)
    }

    /// Every column flagged `primary_key`, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, attr)| attr.is_primary_key())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The resolved key when it names a declared column.
    pub fn primary_key_attribute(&self) -> Option<&AttributeDefinition> {
        self.get(self.primary_key())
    }

    pub fn get(&self, column: &str) -> Option<&AttributeDefinition> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, attr)| attr)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeDefinition)> {
        self.columns.iter().map(|(name, attr)| (name.as_str(), attr))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeDefinition)> for SchemaDescriptor {
    fn from_iter<I: IntoIterator<Item = (K, AttributeDefinition)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SchemaDescriptor::new(), |schema, (name, attr)| schema.column(name, attr))
    }
}
