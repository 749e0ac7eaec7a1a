//! SQLite provider over `rusqlite`. Named parameters are bound natively.

use crate::connection::ConnectionConfig;
use crate::dialect::{Dialect, DialectContext};
use crate::error::{OrmError, Result};
use crate::executor::Executor;
use crate::query::Statement;
use crate::value::{Fields, Value};
use rusqlite::types::{Value as SqliteValue, ValueRef};
use rusqlite::{Connection, ToSql};
use std::any::Any;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open the file named by the configuration, or an in-memory database.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        match config.sqlite_path() {
            Some(path) => {
                let conn = Connection::open(path).map_err(|e| {
                    OrmError::connection(format!("failed to open sqlite database {path}"), e)
                })?;
                log::info!("Opened sqlite database {path}");
                Ok(Self::from_connection(conn))
            }
            None => Self::open_in_memory(),
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| OrmError::connection("failed to open in-memory sqlite database", e))?;
        log::info!("Opened in-memory sqlite database");
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Run `f` against the native handle.
    pub fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> R) -> Result<R> {
        Ok(f(&*self.lock()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| OrmError::Poisoned)
    }

    fn batch(&self, sql: &str) -> Result<()> {
        self.lock()?
            .execute_batch(sql)
            .map_err(|e| OrmError::execution(sql, e))
    }
}

fn to_sqlite(value: &Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Bool(b) => SqliteValue::Integer(i64::from(*b)),
        Value::Int(i) => SqliteValue::Integer(*i),
        Value::Float(f) => SqliteValue::Real(*f),
        Value::Bytes(b) => SqliteValue::Blob(b.clone()),
        Value::Text(s) => SqliteValue::Text(s.clone()),
        other => SqliteValue::Text(other.to_string()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

/// `(":name", value)` pairs for rusqlite's named binding.
fn named_params(statement: &Statement) -> Vec<(String, SqliteValue)> {
    statement
        .params
        .iter()
        .map(|(name, value)| (format!(":{name}"), to_sqlite(value)))
        .collect()
}

impl DialectContext for SqliteBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }
}

impl Executor for SqliteBackend {
    fn execute(&self, statement: &Statement) -> Result<u64> {
        let owned = named_params(statement);
        let params: Vec<(&str, &dyn ToSql)> = owned
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();
        let conn = self.lock()?;
        let affected = conn
            .execute(&statement.sql, params.as_slice())
            .map_err(|e| OrmError::execution(&statement.sql, e))?;
        Ok(affected as u64)
    }

    fn query_all(&self, statement: &Statement) -> Result<Vec<Fields>> {
        let owned = named_params(statement);
        let params: Vec<(&str, &dyn ToSql)> = owned
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();
        let conn = self.lock()?;
        let fail = |e: rusqlite::Error| OrmError::execution(&statement.sql, e);

        let mut prepared = conn.prepare(&statement.sql).map_err(fail)?;
        let columns: Vec<String> = prepared
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = prepared.query(params.as_slice()).map_err(fail)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(fail)? {
            let mut fields = Fields::new();
            for (i, column) in columns.iter().enumerate() {
                fields.set(column.clone(), from_sqlite(row.get_ref(i).map_err(fail)?));
            }
            out.push(fields);
        }
        Ok(out)
    }

    fn last_insert_id(&self) -> Result<Option<String>> {
        let id = self.lock()?.last_insert_rowid();
        Ok((id != 0).then(|| id.to_string()))
    }

    fn begin(&self) -> Result<()> {
        self.batch("BEGIN")
    }

    fn commit(&self) -> Result<()> {
        self.batch("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.batch("ROLLBACK")
    }

    fn ping(&self) -> Result<()> {
        self.lock()?
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|e| OrmError::execution("SELECT 1", e))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
