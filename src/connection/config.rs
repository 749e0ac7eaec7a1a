use crate::dialect::Dialect;
use crate::error::{OrmError, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "config/config.toml";
const ENV_PREFIX: &str = "SOMMY";
const DEFAULT_MYSQL_CHARSET: &str = "utf8mb4";

/// Connection settings.
///
/// `dialect` stays a string until a provider is opened, so an unsupported value
/// surfaces as [`OrmError::Configuration`] at construction time.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub dialect: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default, alias = "dbname")]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub charset: Option<String>,
    /// SQLite file; falls back to `database`, then to an in-memory database.
    #[serde(default)]
    pub path: Option<String>,
}

impl ConnectionConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect: dialect.name().to_string(),
            ..Self::default()
        }
    }

    pub fn sqlite_memory() -> Self {
        Self::new(Dialect::Sqlite)
    }

    pub fn sqlite_file(path: impl Into<String>) -> Self {
        Self::new(Dialect::Sqlite).with_path(path)
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Parsed dialect; unsupported names are a configuration error.
    pub fn dialect(&self) -> Result<Dialect> {
        self.dialect.parse()
    }

    /// Explicit charset, else `utf8mb4` for MySQL/MariaDB.
    pub fn charset(&self) -> Option<&str> {
        match self.charset.as_deref() {
            Some(charset) => Some(charset),
            None if self.dialect().is_ok_and(|d| d.is_mysql_family()) => Some(DEFAULT_MYSQL_CHARSET),
            None => None,
        }
    }

    /// SQLite database file, or `None` for an in-memory database.
    pub fn sqlite_path(&self) -> Option<&str> {
        self.path
            .as_deref()
            .or(self.database.as_deref())
            .map(str::trim)
            .filter(|path| !path.is_empty() && *path != ":memory:")
    }

    /// Key/value connection string understood by the PostgreSQL driver.
    pub fn postgres_connection_string(&self) -> String {
        let mut parts = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                parts.push(format!("{key}={}", quote_conninfo(&value)));
            }
        };
        push("host", Some(self.host.clone().unwrap_or_else(|| "localhost".to_string())));
        push("port", self.port.map(|p| p.to_string()));
        push("user", self.username.clone());
        push("password", self.password.clone());
        push("dbname", self.database.clone());
        parts.join(" ")
    }

    /// Load the `database` section from `config/config.toml`, overlaid by
    /// `SOMMY__DATABASE__*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// [`load`](Self::load) with an explicit file. A file that exists but cannot
    /// be read or parsed is skipped with a warning and only the environment is used.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = match builder.build() {
            Ok(settings) => settings,
            Err(err) => {
                if path.exists() {
                    log::warn!(
                        "Failed to load config file {}, falling back to env: {err}",
                        path.display()
                    );
                }
                Config::builder()
                    .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
                    .build()
                    .map_err(|env_err| {
                        OrmError::Configuration(format!(
                            "failed to load configuration from file ({err}) and env ({env_err})"
                        ))
                    })?
            }
        };

        settings.get::<ConnectionConfig>("database").map_err(|e| {
            OrmError::Configuration(format!(
                "database configuration could not be loaded from file or environment: {e}"
            ))
        })
    }
}

fn quote_conninfo(value: &str) -> String {
    if !value.is_empty() && !value.contains([' ', '\'', '\\']) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
