//! MySQL / MariaDB provider over `mysql_async`.
//!
//! The async connection is driven by a private current-thread tokio runtime so
//! every call blocks like the other providers. Named placeholders are rewritten
//! to `?` and bound positionally.

use crate::connection::ConnectionConfig;
use crate::dialect::{Dialect, DialectContext};
use crate::error::{OrmError, Result};
use crate::executor::Executor;
use crate::query::{PlaceholderStyle, Statement};
use crate::value::{Fields, Value};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use mysql_async::consts::ColumnType;
use mysql_async::prelude::Queryable;
use mysql_async::{Column, Conn, OptsBuilder, Params, Row};
use std::any::Any;
use std::sync::{Mutex, MutexGuard};
use tokio::runtime::{Builder, Runtime};

const DEFAULT_PORT: u16 = 3306;
/// `binary` collation id: byte strings rather than text.
const BINARY_CHARSET: u16 = 63;

pub struct MysqlBackend {
    dialect: Dialect,
    runtime: Runtime,
    conn: Mutex<Conn>,
}

impl MysqlBackend {
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let dialect = config.dialect()?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OrmError::connection("failed to start mysql runtime", e))?;

        let host = config.host.clone().unwrap_or_else(|| "localhost".to_string());
        let port = config.port.unwrap_or(DEFAULT_PORT);
        let mut opts = OptsBuilder::default()
            .ip_or_hostname(host.clone())
            .tcp_port(port)
            .db_name(config.database.clone())
            .user(config.username.clone())
            .pass(config.password.clone());
        if let Some(charset) = config.charset() {
            opts = opts.init(vec![format!("SET NAMES {charset}")]);
        }

        let conn = runtime
            .block_on(Conn::new(opts))
            .map_err(|e| OrmError::connection(format!("failed to connect to {dialect} at {host}:{port}"), e))?;
        log::info!(
            "Connected to {dialect} database {} at {host}:{port}",
            config.database.as_deref().unwrap_or("(default)")
        );

        Ok(Self {
            dialect,
            runtime,
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` against the native connection and the runtime that drives it.
    pub fn with_connection<R>(&self, f: impl FnOnce(&mut Conn, &Runtime) -> R) -> Result<R> {
        let mut conn = self.lock()?;
        Ok(f(&mut conn, &self.runtime))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Conn>> {
        self.conn.lock().map_err(|_| OrmError::Poisoned)
    }

    fn text(&self, sql: &str) -> Result<()> {
        let mut conn = self.lock()?;
        self.runtime
            .block_on(conn.query_drop(sql))
            .map_err(|e| OrmError::execution(sql, e))
    }
}

fn to_mysql(value: &Value) -> mysql_async::Value {
    use mysql_async::Value as My;
    match value {
        Value::Null => My::NULL,
        Value::Bool(b) => My::Int(i64::from(*b)),
        Value::Int(i) => My::Int(*i),
        Value::Float(f) => My::Double(*f),
        Value::Bytes(b) => My::Bytes(b.clone()),
        Value::Date(d) => My::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0),
        Value::Time(t) => My::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1_000,
        ),
        Value::DateTime(dt) => My::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
        other => My::Bytes(other.to_string().into_bytes()),
    }
}

fn from_mysql(value: &mysql_async::Value, column: &Column) -> Value {
    use mysql_async::Value as My;
    match value {
        My::NULL => Value::Null,
        My::Int(i) => Value::Int(*i),
        My::UInt(u) => i64::try_from(*u)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(u.to_string())),
        My::Float(f) => Value::Float(f64::from(*f)),
        My::Double(d) => Value::Float(*d),
        My::Date(y, m, d, h, i, s, us) => {
            let date = NaiveDate::from_ymd_opt(i32::from(*y), u32::from(*m), u32::from(*d));
            let value = match column.column_type() {
                ColumnType::MYSQL_TYPE_DATE => date.map(Value::Date),
                _ => date
                    .and_then(|date| {
                        date.and_hms_micro_opt(u32::from(*h), u32::from(*i), u32::from(*s), *us)
                    })
                    .map(Value::DateTime),
            };
            // Zero dates (`0000-00-00`) have no chrono representation.
            value.unwrap_or(Value::Null)
        }
        My::Time(negative, days, h, m, s, us) => {
            if !negative && *days == 0 {
                NaiveTime::from_hms_micro_opt(u32::from(*h), u32::from(*m), u32::from(*s), *us)
                    .map(Value::Time)
                    .unwrap_or(Value::Null)
            } else {
                let hours = u64::from(*days) * 24 + u64::from(*h);
                let sign = if *negative { "-" } else { "" };
                Value::Text(format!("{sign}{hours:02}:{m:02}:{s:02}"))
            }
        }
        My::Bytes(bytes) => match column.column_type() {
            ColumnType::MYSQL_TYPE_NEWDECIMAL | ColumnType::MYSQL_TYPE_DECIMAL => {
                let text = String::from_utf8_lossy(bytes);
                text.parse()
                    .map(Value::Decimal)
                    .unwrap_or_else(|_| Value::Text(text.into_owned()))
            }
            ColumnType::MYSQL_TYPE_JSON => serde_json::from_slice(bytes)
                .map(Value::Json)
                .unwrap_or_else(|_| Value::Text(String::from_utf8_lossy(bytes).into_owned())),
            _ if column.character_set() == BINARY_CHARSET => Value::Bytes(bytes.clone()),
            _ => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

fn positional(statement: &Statement) -> Result<(String, Params)> {
    let (sql, values) = statement.positional(PlaceholderStyle::Question)?;
    let params = if values.is_empty() {
        Params::Empty
    } else {
        Params::Positional(values.into_iter().map(to_mysql).collect())
    };
    Ok((sql, params))
}

impl DialectContext for MysqlBackend {
    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Executor for MysqlBackend {
    fn execute(&self, statement: &Statement) -> Result<u64> {
        let (sql, params) = positional(statement)?;
        let mut conn = self.lock()?;
        self.runtime
            .block_on(conn.exec_drop(sql.as_str(), params))
            .map_err(|e| OrmError::execution(sql.as_str(), e))?;
        Ok(conn.affected_rows())
    }

    fn query_all(&self, statement: &Statement) -> Result<Vec<Fields>> {
        let (sql, params) = positional(statement)?;
        let mut conn = self.lock()?;
        let rows: Vec<Row> = self
            .runtime
            .block_on(conn.exec(sql.as_str(), params))
            .map_err(|e| OrmError::execution(sql.as_str(), e))?;

        Ok(rows
            .iter()
            .map(|row| {
                let mut fields = Fields::new();
                for (idx, column) in row.columns_ref().iter().enumerate() {
                    let value = row
                        .as_ref(idx)
                        .map(|value| from_mysql(value, column))
                        .unwrap_or(Value::Null);
                    fields.set(column.name_str().into_owned(), value);
                }
                fields
            })
            .collect())
    }

    fn last_insert_id(&self) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .last_insert_id()
            .filter(|id| *id != 0)
            .map(|id| id.to_string()))
    }

    fn begin(&self) -> Result<()> {
        self.text("START TRANSACTION")
    }

    fn commit(&self) -> Result<()> {
        self.text("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.text("ROLLBACK")
    }

    fn ping(&self) -> Result<()> {
        let mut conn = self.lock()?;
        self.runtime
            .block_on(conn.ping())
            .map_err(|e| OrmError::execution("PING", e))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
