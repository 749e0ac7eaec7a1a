//! Builder operations executed against a connection.

use crate::dialect::{Dialect, DialectContext};
use crate::error::Result;
use crate::executor::Executor;
use crate::query::builder::SqlBuilder;
use crate::query::column::AttributeDefinition;
use crate::query::predicate::Predicate;
use crate::query::select::SelectOptions;
use crate::query::table::SchemaDescriptor;
use crate::value::Fields;

/// Schema and CRUD operations over one executor.
///
/// Every method builds its statement with [`SqlBuilder`] and runs it on the
/// borrowed executor; driver failures come back as
/// [`OrmError::Execution`](crate::OrmError::Execution), statement-construction
/// problems as [`OrmError::Build`](crate::OrmError::Build).
#[derive(Clone, Copy)]
pub struct QueryInterface<'a> {
    executor: &'a dyn Executor,
}

impl<'a> QueryInterface<'a> {
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }

    pub fn dialect(&self) -> Dialect {
        self.executor.dialect()
    }

    pub fn builder(&self) -> SqlBuilder<'a, dyn Executor + 'a> {
        SqlBuilder::new(self.executor)
    }

    pub fn create_table(&self, table: &str, schema: &SchemaDescriptor, if_not_exists: bool) -> Result<()> {
        let statement = self.builder().create_table(table, schema, if_not_exists)?;
        self.executor.execute(&statement)?;
        log::info!("Created table {table} ({} columns)", schema.len());
        Ok(())
    }

    pub fn drop_table(&self, table: &str, if_exists: bool) -> Result<()> {
        let statement = self.builder().drop_table(table, if_exists)?;
        self.executor.execute(&statement)?;
        log::info!("Dropped table {table}");
        Ok(())
    }

    pub fn add_column(&self, table: &str, column: &str, attr: &AttributeDefinition) -> Result<()> {
        let statement = self.builder().add_column(table, column, attr)?;
        self.executor.execute(&statement)?;
        log::info!("Added column {column} to {table}");
        Ok(())
    }

    pub fn remove_column(&self, table: &str, column: &str) -> Result<()> {
        let statement = self.builder().remove_column(table, column)?;
        self.executor.execute(&statement)?;
        log::info!("Removed column {column} from {table}");
        Ok(())
    }

    /// Rows matching `predicate`, shaped by `options`.
    pub fn select(&self, table: &str, predicate: &Predicate, options: &SelectOptions) -> Result<Vec<Fields>> {
        let statement = self.builder().select(table, predicate, options)?;
        self.executor.query_all(&statement)
    }

    /// Insert `values` and return the generated key as text.
    ///
    /// Returns `Ok(None)` without touching the database when `values` is empty,
    /// and when the driver reports no generated key.
    pub fn insert(&self, table: &str, values: &Fields) -> Result<Option<String>> {
        self.insert_returning(table, values, None)
    }

    /// [`insert`](Self::insert) that knows the key column. PostgreSQL then reads
    /// the key back with `RETURNING` instead of `LASTVAL()`, which also works for
    /// keys without a sequence.
    pub fn insert_returning(&self, table: &str, values: &Fields, key: Option<&str>) -> Result<Option<String>> {
        let builder = self.builder();
        let (statement, returning) = match key {
            Some(key) if self.dialect() == Dialect::Pgsql => {
                (builder.insert_returning(table, values, key)?, true)
            }
            _ => (builder.insert(table, values)?, false),
        };
        let Some(statement) = statement else {
            log::debug!("Skipping insert into {table}: no values");
            return Ok(None);
        };

        if returning {
            let rows = self.executor.query_all(&statement)?;
            return Ok(rows
                .first()
                .and_then(|row| row.iter().next().map(|(_, value)| value.clone()))
                .filter(|value| !value.is_null())
                .map(|value| value.to_string()));
        }

        self.executor.execute(&statement)?;
        self.executor.last_insert_id()
    }

    /// Update rows matching `predicate`; `0` without executing when `values` is empty.
    pub fn update(&self, table: &str, values: &Fields, predicate: &Predicate) -> Result<u64> {
        match self.builder().update(table, values, predicate)? {
            Some(statement) => self.executor.execute(&statement),
            None => {
                log::debug!("Skipping update of {table}: no values");
                Ok(0)
            }
        }
    }

    pub fn delete(&self, table: &str, predicate: &Predicate) -> Result<u64> {
        let statement = self.builder().delete(table, predicate)?;
        self.executor.execute(&statement)
    }
}
