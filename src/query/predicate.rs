//! Predicates: column → condition filters compiled into parameterized `WHERE` clauses.

use crate::dialect::Dialect;
use crate::query::statement::ParamNames;
use crate::value::{Fields, Value};

/// What a single predicate entry matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `col = :p`
    Eq(Value),
    /// `col IS NULL`, no parameter
    IsNull,
    /// `col IN (:p_0, ...)`; an empty list never matches (`1=0`)
    In(Vec<Value>),
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        if value.is_null() {
            Condition::IsNull
        } else {
            Condition::Eq(value)
        }
    }
}

impl From<Vec<Value>> for Condition {
    fn from(values: Vec<Value>) -> Self {
        Condition::In(values)
    }
}

/// Ordered column → [`Condition`] map. Entries are AND-joined in insertion order;
/// setting a column twice replaces its condition in place.
///
/// ```
/// use sommy::query::Predicate;
///
/// let predicate = Predicate::new()
///     .eq("email", "clinton@example.com")
///     .is_null("deleted_at")
///     .any_of("role", ["admin", "owner"]);
/// assert_eq!(predicate.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<(String, Condition)>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value`. A null value becomes `IS NULL`.
    #[must_use]
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Condition::from(value.into()))
    }

    #[must_use]
    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.with(column, Condition::IsNull)
    }

    /// Add `column IN (...)`.
    #[must_use]
    pub fn any_of<I, V>(self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with(column, Condition::In(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, condition: Condition) -> Self {
        self.set(column, condition);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, condition: Condition) {
        let column = column.into();
        match self.clauses.iter_mut().find(|(existing, _)| *existing == column) {
            Some((_, slot)) => *slot = condition,
            None => self.clauses.push((column, condition)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Condition> {
        self.clauses
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, condition)| condition)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.clauses.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.clauses.iter().map(|(name, condition)| (name.as_str(), condition))
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Predicate::new(), |predicate, (column, value)| predicate.eq(column, value))
    }
}

/// Every field becomes an equality (or `IS NULL`) condition.
impl From<Fields> for Predicate {
    fn from(fields: Fields) -> Self {
        fields.into_iter().collect()
    }
}

/// Compile `predicate` into the body of a `WHERE` clause (without the keyword).
///
/// Scalar parameters are named `<column>_<n>` and list items `<column>_<n>_<i>`,
/// where `<column>` is the sanitized column name and `<n>` the number of
/// parameters already bound to the statement. `names` guarantees uniqueness even
/// when two columns sanitize to the same string. Returns `None` for an empty predicate.
pub fn build_where(
    dialect: Dialect,
    predicate: &Predicate,
    names: &mut ParamNames,
    params: &mut Vec<(String, Value)>,
) -> Option<String> {
    if predicate.is_empty() {
        return None;
    }

    let mut clauses = Vec::with_capacity(predicate.len());
    for (column, condition) in predicate.iter() {
        let quoted = dialect.quote_ident(column);
        let base = format!("{}_{}", ParamNames::sanitize(column), params.len());
        match condition {
            Condition::IsNull => clauses.push(format!("{quoted} IS NULL")),
            Condition::In(values) if values.is_empty() => clauses.push("1=0".to_string()),
            Condition::In(values) => {
                let mut placeholders = Vec::with_capacity(values.len());
                for (i, value) in values.iter().enumerate() {
                    let name = names.reserve(format!("{base}_{i}"));
                    placeholders.push(format!(":{name}"));
                    params.push((name, value.clone()));
                }
                clauses.push(format!("{quoted} IN ({})", placeholders.join(", ")));
            }
            Condition::Eq(value) => {
                let name = names.reserve(base);
                clauses.push(format!("{quoted} = :{name}"));
                params.push((name, value.clone()));
            }
        }
    }
    Some(clauses.join(" AND "))
}
