//! `EntityConfig`: the immutable binding of one declared entity to its table.

use super::Record;
use crate::connection::ConnectionManager;
use crate::error::{OrmError, Result};
use crate::query::{AttributeDefinition, Predicate, QueryInterface, SchemaDescriptor, SelectOptions};
use crate::value::{Fields, Value};
use std::sync::Arc;

/// Table name, schema and resolved primary key of one declared entity.
///
/// Built once (usually through [`crate::Sommy::define`]) and shared by every
/// [`Record`] of the entity through an `Arc`.
///
/// # Examples
///
/// ```no_run
/// use sommy::data_types::{integer, string};
/// use sommy::{ConnectionConfig, Fields, Predicate, SchemaDescriptor, SelectOptions, Sommy};
///
/// # fn main() -> sommy::Result<()> {
/// let sommy = Sommy::connect(&ConnectionConfig::sqlite_memory())?;
/// let schema = SchemaDescriptor::new()
///     .column("id", integer().primary_key().auto_increment())
///     .column("name", string(100));
/// let users = sommy.define("User", schema, Default::default());
/// users.sync()?;
///
/// users.create(Fields::new().with("name", "Clinton"))?;
/// let found = users.find_one(&Predicate::new().eq("name", "Clinton"), &SelectOptions::new())?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EntityConfig {
    conn: Arc<ConnectionManager>,
    name: String,
    table: String,
    schema: SchemaDescriptor,
    primary_key: String,
}

impl EntityConfig {
    /// Bind `schema` to `table`. `primary_key` overrides detection from the schema.
    pub fn configure(
        conn: Arc<ConnectionManager>,
        name: impl Into<String>,
        table: impl Into<String>,
        schema: SchemaDescriptor,
        primary_key: Option<String>,
    ) -> Arc<Self> {
        let schema = match primary_key {
            Some(column) => schema.with_primary_key(column),
            None => schema,
        };
        let primary_key = schema.primary_key().to_string();
        Arc::new(Self {
            conn,
            name: name.into(),
            table: table.into(),
            schema,
            primary_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.conn
    }

    pub fn query_interface(&self) -> QueryInterface<'_> {
        self.conn.query_interface()
    }

    /// Create the table if it does not exist yet.
    pub fn sync(&self) -> Result<()> {
        self.query_interface().create_table(&self.table, &self.schema, true)
    }

    /// Drop the table if it exists.
    pub fn drop_table(&self) -> Result<()> {
        self.query_interface().drop_table(&self.table, true)
    }

    /// An empty, unsaved record.
    pub fn new_record(self: &Arc<Self>) -> Record {
        Record::new(Arc::clone(self))
    }

    /// A record holding `values`, not yet saved.
    ///
    /// # Errors
    ///
    /// [`OrmError::UnknownColumn`] if `values` names a column the schema lacks.
    pub fn build(self: &Arc<Self>, values: Fields) -> Result<Record> {
        self.check_columns(values.columns())?;
        Ok(Record::from_fields(Arc::clone(self), values))
    }

    /// Insert `values` as a new row and return it as a saved record.
    ///
    /// Returns `Ok(None)` without touching the database when `values` is empty.
    pub fn create(self: &Arc<Self>, values: Fields) -> Result<Option<Record>> {
        if values.is_empty() {
            log::debug!("create on `{}` with no values; nothing inserted", self.table);
            return Ok(None);
        }
        let mut record = self.build(values)?;
        Ok(record.save()?.then_some(record))
    }

    pub fn find_all(self: &Arc<Self>, predicate: &Predicate, options: &SelectOptions) -> Result<Vec<Record>> {
        self.check_columns(predicate.columns())?;
        let rows = self.query_interface().select(&self.table, predicate, options)?;
        Ok(rows
            .into_iter()
            .map(|row| Record::from_fields(Arc::clone(self), row))
            .collect())
    }

    /// First match of `predicate`; the query is always limited to one row.
    pub fn find_one(self: &Arc<Self>, predicate: &Predicate, options: &SelectOptions) -> Result<Option<Record>> {
        let options = options.clone().limit(1);
        Ok(self.find_all(predicate, &options)?.into_iter().next())
    }

    pub fn find_by_pk(self: &Arc<Self>, key: impl Into<Value>) -> Result<Option<Record>> {
        let predicate = Predicate::new().eq(self.primary_key.clone(), key);
        self.find_one(&predicate, &SelectOptions::new())
    }

    /// Update every row matching `predicate`; returns the affected row count.
    pub fn update(&self, values: &Fields, predicate: &Predicate) -> Result<u64> {
        self.check_columns(values.columns())?;
        self.check_columns(predicate.columns())?;
        self.query_interface().update(&self.table, values, predicate)
    }

    /// Delete every row matching `predicate`; returns the affected row count.
    pub fn destroy(&self, predicate: &Predicate) -> Result<u64> {
        self.check_columns(predicate.columns())?;
        self.query_interface().delete(&self.table, predicate)
    }

    pub(crate) fn attribute(&self, column: &str) -> Option<&AttributeDefinition> {
        self.schema.get(column)
    }

    pub(crate) fn check_column(&self, column: &str) -> Result<()> {
        if self.attribute(column).is_some() {
            Ok(())
        } else {
            Err(OrmError::UnknownColumn {
                table: self.table.clone(),
                column: column.to_string(),
            })
        }
    }

    fn check_columns<'c>(&self, mut columns: impl Iterator<Item = &'c str>) -> Result<()> {
        columns.try_for_each(|column| self.check_column(column))
    }
}
