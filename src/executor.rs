//! `Executor`: the connection-provider contract.
//!
//! Every backend in [`crate::drivers`] implements this trait over exactly one
//! live handle. [`ConnectionManager`](crate::connection::ConnectionManager)
//! wraps a boxed executor and adds logging, tracing and metrics; the query layer
//! only ever talks to `&dyn Executor`.

use crate::dialect::DialectContext;
use crate::error::Result;
use crate::query::Statement;
use crate::value::Fields;
use std::any::Any;

/// Trait for executing built statements against one database handle.
///
/// Implementations bind the named parameters of a [`Statement`] in whatever
/// form their driver accepts and convert result rows into ordered [`Fields`].
///
/// # Examples
///
/// ```no_run
/// use sommy::{ConnectionConfig, ConnectionManager, Executor, Statement};
///
/// # fn main() -> sommy::Result<()> {
/// let config = ConnectionConfig::sqlite_memory();
/// let conn = ConnectionManager::connect(&config)?;
///
/// conn.execute(&Statement::new("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)"))?;
/// let rows = conn.query_all(&Statement::new("SELECT * FROM t"))?;
/// assert!(rows.is_empty());
/// # Ok(())
/// # }
/// ```
pub trait Executor: DialectContext + Send + Sync {
    /// Execute a statement and return the number of rows affected
    /// (`0` for DDL).
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`](crate::OrmError::Execution) with the
    /// driver's error as its source if the statement fails.
    fn execute(&self, statement: &Statement) -> Result<u64>;

    /// Execute a query and return every row, columns in result order.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Execution`](crate::OrmError::Execution) if the
    /// query fails or a column cannot be converted.
    fn query_all(&self, statement: &Statement) -> Result<Vec<Fields>>;

    /// Key generated by the last insert on this handle, as text.
    ///
    /// `None` when the driver has nothing to report (no insert yet, or a table
    /// without a generated key).
    fn last_insert_id(&self) -> Result<Option<String>>;

    fn begin(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn rollback(&self) -> Result<()>;

    /// Round-trip a trivial statement to prove the handle is alive.
    fn ping(&self) -> Result<()>;

    /// Downcast hook for reaching the concrete backend (and its native handle).
    fn as_any(&self) -> &dyn Any;
}
