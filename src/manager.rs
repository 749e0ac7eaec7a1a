//! `Sommy`: the top-level handle an application holds.
//!
//! It owns the connection and hands out entity bindings and the query interface.

use crate::connection::{ConnectionConfig, ConnectionManager};
use crate::dialect::DialectContext;
use crate::error::Result;
use crate::executor::Executor;
use crate::model::EntityConfig;
use crate::query::{QueryInterface, SchemaDescriptor};
use std::sync::Arc;

/// Options recognized by [`Sommy::define`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineOptions {
    /// Table name; defaults to the lowercased entity name.
    pub table_name: Option<String>,
    /// Primary-key column; defaults to the first column flagged primary, else `id`.
    pub primary_key: Option<String>,
}

impl DefineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    #[must_use]
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }
}

/// # Examples
///
/// ```no_run
/// use sommy::data_types::{integer, string};
/// use sommy::{ConnectionConfig, SchemaDescriptor, Sommy};
/// use sommy::manager::DefineOptions;
///
/// # fn main() -> sommy::Result<()> {
/// let sommy = Sommy::connect(&ConnectionConfig::load()?)?;
/// sommy.authenticate()?;
///
/// let posts = sommy.define(
///     "Post",
///     SchemaDescriptor::new()
///         .column("id", integer().primary_key().auto_increment())
///         .column("title", string(200)),
///     DefineOptions::new().table_name("blog_posts"),
/// );
/// assert_eq!(posts.table_name(), "blog_posts");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Sommy {
    conn: Arc<ConnectionManager>,
}

impl Sommy {
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::with_connection(ConnectionManager::connect(config)?))
    }

    pub fn with_connection(conn: ConnectionManager) -> Self {
        Self { conn: Arc::new(conn) }
    }

    /// Check that the connection is alive.
    pub fn authenticate(&self) -> Result<()> {
        self.conn.ping()?;
        log::info!("Connection to {} authenticated", self.conn.dialect());
        Ok(())
    }

    /// Declare an entity over `schema`.
    pub fn define(&self, name: &str, schema: SchemaDescriptor, options: DefineOptions) -> Arc<EntityConfig> {
        let table = options.table_name.unwrap_or_else(|| name.to_lowercase());
        log::debug!("Defined entity {name} on table `{table}`");
        EntityConfig::configure(Arc::clone(&self.conn), name, table, schema, options.primary_key)
    }

    pub fn query_interface(&self) -> QueryInterface<'_> {
        self.conn.query_interface()
    }

    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.conn
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::query::column::data_types::{integer, string};

    #[test]
    fn test_define_defaults_to_lowercased_name() {
        let sommy = Sommy::connect(&ConnectionConfig::sqlite_memory()).unwrap();
        sommy.authenticate().unwrap();
        let schema = SchemaDescriptor::new()
            .column("uid", integer().primary_key())
            .column("name", string(50));

        let users = sommy.define("User", schema.clone(), DefineOptions::new());
        assert_eq!(users.name(), "User");
        assert_eq!(users.table_name(), "user");
        assert_eq!(users.primary_key(), "uid");

        let people = sommy.define("User", schema, DefineOptions::new().table_name("people").primary_key("name"));
        assert_eq!(people.table_name(), "people");
        assert_eq!(people.primary_key(), "name");
    }
}
