//! PostgreSQL provider over `may_postgres`.
//!
//! Named placeholders are rewritten to `$n`. Values are bound through [`PgValue`],
//! which converts each [`Value`] to the type the server inferred for its
//! placeholder, so an `Int` can land in `INT2`, `INT4`, `INT8` or `NUMERIC`.

use crate::connection::ConnectionConfig;
use crate::dialect::{Dialect, DialectContext};
use crate::error::{DriverError, OrmError, Result};
use crate::executor::Executor;
use crate::query::{PlaceholderStyle, Statement};
use crate::value::{Fields, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use may_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use may_postgres::{Client, Row};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub struct PostgresBackend {
    client: Mutex<Client>,
    in_transaction: AtomicBool,
}

/// Guards the `LASTVAL()` lookup inside an open transaction.
const LASTVAL_SAVEPOINT: &str = "sommy_lastval";

impl PostgresBackend {
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let conninfo = config.postgres_connection_string();
        let client = may_postgres::connect(&conninfo).map_err(|e| {
            OrmError::connection(
                format!(
                    "failed to connect to postgres at {}",
                    config.host.as_deref().unwrap_or("localhost")
                ),
                e,
            )
        })?;
        log::info!(
            "Connected to postgres database {}",
            config.database.as_deref().unwrap_or("(default)")
        );
        Ok(Self::from_client(client))
    }

    pub fn from_client(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
            in_transaction: AtomicBool::new(false),
        }
    }

    pub fn with_connection<R>(&self, f: impl FnOnce(&Client) -> R) -> Result<R> {
        Ok(f(&self.lock()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Client>> {
        self.client.lock().map_err(|_| OrmError::Poisoned)
    }

    fn simple(&self, sql: &str) -> Result<()> {
        run(&self.lock()?, sql)
    }
}

fn run(client: &Client, sql: &str) -> Result<()> {
    client
        .execute(sql, &[])
        .map(|_| ())
        .map_err(|e| OrmError::execution(sql, e))
}

/// A [`Value`] bound to a PostgreSQL placeholder.
#[derive(Debug)]
pub struct PgValue<'a>(pub &'a Value);

fn mismatch(value: &Value, ty: &Type) -> DriverError {
    format!("cannot bind {} value to parameter of type {ty}", value.type_name()).into()
}

fn is_text(ty: &Type) -> bool {
    matches!(*ty, Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN)
}

impl ToSql for PgValue<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, DriverError> {
        let value = self.0;
        match value {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => PgValue(&Value::Int(i64::from(*b))).to_sql(ty, out),
            },
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::OID => u32::try_from(*i)?.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                Type::BOOL => (*i != 0).to_sql(ty, out),
                ref t if is_text(t) => i.to_string().to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::from_f64(*f)
                    .ok_or_else(|| mismatch(value, ty))?
                    .to_sql(ty, out),
                ref t if is_text(t) => f.to_string().to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Value::Decimal(d) => match *ty {
                Type::NUMERIC => d.to_sql(ty, out),
                Type::FLOAT8 => d.to_f64().ok_or_else(|| mismatch(value, ty))?.to_sql(ty, out),
                Type::FLOAT4 => d.to_f32().ok_or_else(|| mismatch(value, ty))?.to_sql(ty, out),
                ref t if is_text(t) => d.to_string().to_sql(ty, out),
                _ => Err(mismatch(value, ty)),
            },
            Value::Text(s) => match *ty {
                Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => {
                    PgValue(&Value::Int(s.trim().parse()?)).to_sql(ty, out)
                }
                Type::FLOAT4 | Type::FLOAT8 => PgValue(&Value::Float(s.trim().parse()?)).to_sql(ty, out),
                Type::NUMERIC => s.trim().parse::<Decimal>()?.to_sql(ty, out),
                Type::BOOL => matches!(s.trim(), "1" | "t" | "true" | "TRUE").to_sql(ty, out),
                Type::UUID => Uuid::parse_str(s.trim())?.to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
                Type::DATE => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?.to_sql(ty, out),
                Type::TIME => s.trim().parse::<NaiveTime>()?.to_sql(ty, out),
                Type::TIMESTAMP => s.trim().parse::<NaiveDateTime>()?.to_sql(ty, out),
                Type::TIMESTAMPTZ => s.trim().parse::<DateTime<Utc>>()?.to_sql(ty, out),
                _ => s.to_sql(ty, out),
            },
            Value::Bytes(b) => b.to_sql(ty, out),
            Value::Date(d) => d.to_sql(ty, out),
            Value::Time(t) => t.to_sql(ty, out),
            Value::DateTime(dt) => match *ty {
                Type::TIMESTAMPTZ => Utc.from_utc_datetime(dt).to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            Value::Json(j) => match *ty {
                ref t if is_text(t) => j.to_string().to_sql(ty, out),
                _ => j.to_sql(ty, out),
            },
            Value::Uuid(u) => match *ty {
                ref t if is_text(t) => u.hyphenated().to_string().to_sql(ty, out),
                _ => u.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn column_value(row: &Row, idx: usize, ty: &Type) -> std::result::Result<Value, may_postgres::Error> {
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Bool),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
        Type::OID => row.try_get::<_, Option<u32>>(idx)?.map(Value::from),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(Value::from),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
        Type::NUMERIC => row.try_get::<_, Option<Decimal>>(idx)?.map(Value::Decimal),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(Value::Bytes),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx)?.map(Value::Date),
        Type::TIME => row.try_get::<_, Option<NaiveTime>>(idx)?.map(Value::Time),
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(idx)?.map(Value::DateTime),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|dt| Value::DateTime(dt.naive_utc())),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<serde_json::Value>>(idx)?.map(Value::Json),
        Type::UUID => row.try_get::<_, Option<Uuid>>(idx)?.map(Value::Uuid),
        _ => row.try_get::<_, Option<String>>(idx)?.map(Value::Text),
    };
    Ok(value.unwrap_or(Value::Null))
}

fn row_fields(row: &Row) -> std::result::Result<Fields, may_postgres::Error> {
    let mut fields = Fields::new();
    for (idx, column) in row.columns().iter().enumerate() {
        fields.set(column.name(), column_value(row, idx, column.type_())?);
    }
    Ok(fields)
}

impl DialectContext for PostgresBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Pgsql
    }
}

impl Executor for PostgresBackend {
    fn execute(&self, statement: &Statement) -> Result<u64> {
        let (sql, values) = statement.positional(PlaceholderStyle::Numbered)?;
        let bound: Vec<PgValue<'_>> = values.into_iter().map(PgValue).collect();
        let params: Vec<&dyn ToSql> = bound.iter().map(|v| v as &dyn ToSql).collect();
        self.lock()?
            .execute(sql.as_str(), &params)
            .map_err(|e| OrmError::execution(sql, e))
    }

    fn query_all(&self, statement: &Statement) -> Result<Vec<Fields>> {
        let (sql, values) = statement.positional(PlaceholderStyle::Numbered)?;
        let bound: Vec<PgValue<'_>> = values.into_iter().map(PgValue).collect();
        let params: Vec<&dyn ToSql> = bound.iter().map(|v| v as &dyn ToSql).collect();
        let rows = self
            .lock()?
            .query(sql.as_str(), &params)
            .map_err(|e| OrmError::execution(sql.as_str(), e))?;
        rows.iter()
            .map(|row| row_fields(row).map_err(|e| OrmError::execution(sql.as_str(), e)))
            .collect()
    }

    /// `LASTVAL()` of the session. Fails inside the server when no sequence was
    /// used yet; that is reported as `None`.
    ///
    /// Inside a transaction the lookup runs under a savepoint, so its failure
    /// does not abort the caller's transaction.
    fn last_insert_id(&self) -> Result<Option<String>> {
        let client = self.lock()?;
        let guarded = self.in_transaction.load(Ordering::SeqCst);
        if guarded {
            run(&client, &format!("SAVEPOINT {LASTVAL_SAVEPOINT}"))?;
        }

        let id = match client.query("SELECT LASTVAL()", &[]) {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.try_get::<_, Option<i64>>(0).ok().flatten())
                .map(|id| id.to_string()),
            Err(e) => {
                log::debug!("LASTVAL() unavailable: {e}");
                if guarded {
                    run(&client, &format!("ROLLBACK TO SAVEPOINT {LASTVAL_SAVEPOINT}"))?;
                }
                None
            }
        };

        if guarded {
            run(&client, &format!("RELEASE SAVEPOINT {LASTVAL_SAVEPOINT}"))?;
        }
        Ok(id)
    }

    fn begin(&self) -> Result<()> {
        self.simple("BEGIN")?;
        self.in_transaction.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let result = self.simple("COMMIT");
        self.in_transaction.store(false, Ordering::SeqCst);
        result
    }

    fn rollback(&self) -> Result<()> {
        let result = self.simple("ROLLBACK");
        self.in_transaction.store(false, Ordering::SeqCst);
        result
    }

    fn ping(&self) -> Result<()> {
        self.lock()?
            .query("SELECT 1", &[])
            .map(|_| ())
            .map_err(|e| OrmError::execution("SELECT 1", e))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
