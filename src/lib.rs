//! # Sommy
//!
//! Lightweight multi-dialect ORM for MySQL/MariaDB, PostgreSQL and SQLite.
//!
//! - **Type catalog** ([`data_types`]): typed attribute constructors and per-dialect DDL mapping
//! - **SQL builder** ([`SqlBuilder`]): DDL and parameterized DML with dialect quoting
//! - **Connection** ([`ConnectionManager`]): one live handle behind the [`Executor`] trait
//! - **Entities** ([`Sommy::define`], [`EntityConfig`], [`Record`]): CRUD over a declared schema
//!
//! ```no_run
//! use sommy::data_types::{integer, string};
//! use sommy::{ConnectionConfig, Fields, Predicate, SchemaDescriptor, SelectOptions, Sommy};
//!
//! # fn main() -> sommy::Result<()> {
//! let sommy = Sommy::connect(&ConnectionConfig::sqlite_memory())?;
//! let users = sommy.define(
//!     "User",
//!     SchemaDescriptor::new()
//!         .column("id", integer().primary_key().auto_increment())
//!         .column("name", string(100))
//!         .column("email", string(150)),
//!     Default::default(),
//! );
//! users.sync()?;
//! users.create(Fields::new().with("name", "Clinton").with("email", "clinton@example.com"))?;
//!
//! let found = users.find_all(&Predicate::new().eq("email", "clinton@example.com"), &SelectOptions::new())?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod executor;
pub mod manager;
pub mod metrics;
pub mod model;
pub mod query;
pub mod transaction;
pub mod value;

pub use connection::{ConnectionConfig, ConnectionManager};
pub use dialect::{Dialect, DialectContext};
pub use error::{OrmError, Result};
pub use executor::Executor;
pub use manager::{DefineOptions, Sommy};
pub use model::{EntityConfig, Record};
pub use query::column::data_types;
pub use query::{
    AttributeDefinition, AttributeOptions, Condition, Predicate, QueryInterface, SchemaDescriptor, SelectOptions,
    SqlBuilder, Statement, TypeTag,
};
pub use transaction::Transaction;
pub use value::{Fields, TryGetable, Value};
