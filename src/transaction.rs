//! Transactions: plain `BEGIN` / `COMMIT` / `ROLLBACK` passthrough.
//!
//! There is no nesting and no savepoint support; a [`Transaction`] guard rolls
//! back when dropped without being committed.

use crate::connection::ConnectionManager;
use crate::error::{OrmError, Result};
use crate::executor::Executor;
use crate::query::QueryInterface;

/// An open transaction on one connection.
///
/// # Examples
///
/// ```no_run
/// use sommy::{ConnectionConfig, ConnectionManager, Fields};
/// use sommy::transaction::Transaction;
///
/// # fn main() -> sommy::Result<()> {
/// let conn = ConnectionManager::connect(&ConnectionConfig::sqlite_memory())?;
/// let tx = Transaction::begin(&conn)?;
/// tx.query_interface()
///     .insert("users", &Fields::new().with("name", "Alice"))?;
/// tx.commit()?;
/// # Ok(())
/// # }
/// ```
pub struct Transaction<'a> {
    conn: &'a ConnectionManager,
    closed: bool,
}

impl<'a> Transaction<'a> {
    pub fn begin(conn: &'a ConnectionManager) -> Result<Self> {
        conn.begin()?;
        Ok(Self { conn, closed: false })
    }

    pub fn connection(&self) -> &'a ConnectionManager {
        self.conn
    }

    pub fn query_interface(&self) -> QueryInterface<'a> {
        self.conn.query_interface()
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if `COMMIT` fails; the guard then no longer
    /// rolls back on drop.
    pub fn commit(mut self) -> Result<()> {
        self.finish(|conn| conn.commit())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.finish(|conn| conn.rollback())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn finish(&mut self, f: impl FnOnce(&ConnectionManager) -> Result<()>) -> Result<()> {
        if self.closed {
            return Err(OrmError::Transaction(
                "transaction has already been committed or rolled back".to_string(),
            ));
        }
        self.closed = true;
        f(self.conn)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("Transaction dropped without commit or rollback; rolling back");
            if let Err(e) = self.conn.rollback() {
                log::error!("Rollback of dropped transaction failed: {e}");
            }
        }
    }
}

/// Run `f` in a transaction: commit on `Ok`, roll back on `Err`.
pub fn run<T, F>(conn: &ConnectionManager, f: F) -> Result<T>
where
    F: FnOnce(&ConnectionManager) -> Result<T>,
{
    let tx = Transaction::begin(conn)?;
    match f(conn) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                log::error!("Rollback after failed transaction body failed: {rollback_err}");
            }
            Err(e)
        }
    }
}
