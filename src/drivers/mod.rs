//! Concrete connection providers, one per backend feature.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::connection::ConnectionConfig;
use crate::dialect::Dialect;
use crate::error::{OrmError, Result};
use crate::executor::Executor;

/// Open the provider for `config.dialect`.
///
/// An unsupported dialect, or one whose backend feature was not compiled in, is a
/// configuration error.
pub fn open(config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    match config.dialect()? {
        Dialect::Sqlite => open_sqlite(config),
        Dialect::Pgsql => open_postgres(config),
        Dialect::Mysql | Dialect::Mariadb => open_mysql(config),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    Ok(Box::new(sqlite::SqliteBackend::open(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    Err(disabled(Dialect::Sqlite, "sqlite"))
}

#[cfg(feature = "postgres")]
fn open_postgres(config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    Ok(Box::new(postgres::PostgresBackend::open(config)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    Err(disabled(Dialect::Pgsql, "postgres"))
}

#[cfg(feature = "mysql")]
fn open_mysql(config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    Ok(Box::new(mysql::MysqlBackend::open(config)?))
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(config: &ConnectionConfig) -> Result<Box<dyn Executor>> {
    Err(disabled(config.dialect()?, "mysql"))
}

#[cfg(not(all(feature = "sqlite", feature = "postgres", feature = "mysql")))]
fn disabled(dialect: Dialect, feature: &str) -> OrmError {
    OrmError::Configuration(format!(
        "dialect `{dialect}` requires the `{feature}` feature of sommy"
    ))
}
