//! Connection management.
//!
//! [`ConnectionManager`] owns exactly one provider (see [`crate::drivers`]) and is
//! itself an [`Executor`]: every call is logged, wrapped in a tracing span and
//! timed into the metrics registry before being forwarded to the provider.

pub mod config;

pub use config::ConnectionConfig;

use crate::dialect::{Dialect, DialectContext};
use crate::error::{OrmError, Result};
use crate::executor::Executor;
use crate::query::{QueryInterface, Statement};
use crate::value::Fields;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// One live database handle plus its dialect.
///
/// Not a pool: concurrent callers are serialized on the provider's handle.
///
/// # Examples
///
/// ```no_run
/// use sommy::{ConnectionConfig, ConnectionManager};
///
/// # fn main() -> sommy::Result<()> {
/// let config = ConnectionConfig::load()?;
/// let conn = ConnectionManager::connect(&config)?;
/// conn.transaction(|conn| {
///     conn.query_interface().delete("sessions", &Default::default())?;
///     Ok(())
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionManager {
    inner: Box<dyn Executor>,
    in_transaction: AtomicBool,
}

impl ConnectionManager {
    /// Open the provider selected by `config.dialect`.
    ///
    /// # Errors
    ///
    /// [`OrmError::Configuration`] for an unsupported or disabled dialect,
    /// [`OrmError::Connection`] when the driver cannot connect.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::connect_span(&config.dialect).entered();

        let start = Instant::now();
        let inner = crate::drivers::open(config)?;
        let elapsed = start.elapsed();
        #[cfg(feature = "metrics")]
        METRICS.record_connect(elapsed);
        log::info!("Connected to {} in {:?}", inner.dialect(), elapsed);

        Ok(Self::new(inner))
    }

    /// Wrap an already opened provider.
    pub fn new(inner: Box<dyn Executor>) -> Self {
        Self {
            inner,
            in_transaction: AtomicBool::new(false),
        }
    }

    pub fn query_interface(&self) -> QueryInterface<'_> {
        QueryInterface::new(self)
    }

    /// The concrete provider, e.g. `conn.backend::<SqliteBackend>()` to reach its
    /// native handle.
    pub fn backend<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::SeqCst)
    }

    /// Run `f` inside `BEGIN` / `COMMIT`, rolling back when it returns an error.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ConnectionManager) -> Result<T>,
    {
        crate::transaction::run(self, f)
    }

    fn instrument<T>(&self, statement: &Statement, f: impl FnOnce() -> Result<T>) -> Result<T> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(&statement.sql).entered();
        log::debug!("{} [{} params]", statement.sql, statement.params.len());

        let start = Instant::now();
        let result = f();
        #[cfg(feature = "metrics")]
        {
            METRICS.record_query(start.elapsed());
            if result.is_err() {
                METRICS.record_query_error();
            }
        }
        if let Err(ref e) = result {
            log::debug!("Statement failed after {:?}: {e}", start.elapsed());
        }
        result
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("dialect", &self.inner.dialect())
            .field("in_transaction", &self.in_transaction())
            .finish_non_exhaustive()
    }
}

impl DialectContext for ConnectionManager {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    fn quote_literal(&self, value: &str) -> String {
        self.inner.quote_literal(value)
    }
}

impl Executor for ConnectionManager {
    fn execute(&self, statement: &Statement) -> Result<u64> {
        self.instrument(statement, || self.inner.execute(statement))
    }

    fn query_all(&self, statement: &Statement) -> Result<Vec<Fields>> {
        self.instrument(statement, || self.inner.query_all(statement))
    }

    fn last_insert_id(&self) -> Result<Option<String>> {
        self.inner.last_insert_id()
    }

    fn begin(&self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::begin_transaction_span().entered();
        if self.in_transaction() {
            log::warn!("BEGIN issued while a transaction is already open");
        }
        self.inner.begin()?;
        self.in_transaction.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::commit_transaction_span().entered();
        if !self.in_transaction() {
            return Err(OrmError::Transaction("commit without an open transaction".to_string()));
        }
        // Cleared even when COMMIT fails, as for rollback.
        let result = self.inner.commit();
        self.in_transaction.store(false, Ordering::SeqCst);
        result
    }

    fn rollback(&self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::rollback_transaction_span().entered();
        if !self.in_transaction() {
            return Err(OrmError::Transaction("rollback without an open transaction".to_string()));
        }
        let result = self.inner.rollback();
        self.in_transaction.store(false, Ordering::SeqCst);
        result
    }

    fn ping(&self) -> Result<()> {
        self.inner.ping()
    }

    fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }
}
