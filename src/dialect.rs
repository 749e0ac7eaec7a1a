//! SQL dialects and the per-dialect quoting rules.

use crate::error::OrmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target database product. Fixed when a connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Mysql,
    Mariadb,
    Pgsql,
    Sqlite,
}

impl Dialect {
    /// Canonical configuration name.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Mariadb => "mariadb",
            Dialect::Pgsql => "pgsql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// MySQL and MariaDB share syntax for everything the builder emits.
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, Dialect::Mysql | Dialect::Mariadb)
    }

    /// Quote a single identifier, doubling any embedded delimiter.
    pub fn quote_ident(&self, name: &str) -> String {
        match self {
            Dialect::Mysql | Dialect::Mariadb => format!("`{}`", name.replace('`', "``")),
            Dialect::Pgsql | Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Quote a possibly qualified identifier (`schema.table`, `table.column`) part by part.
    /// A trailing `*` part is left bare so `t.*` renders as `"t".*`.
    pub fn quote_path(&self, path: &str) -> String {
        path.split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    self.quote_ident(part)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render `value` as a string literal.
    ///
    /// MySQL/MariaDB escape with backslashes (the server default without
    /// `NO_BACKSLASH_ESCAPES`). PostgreSQL (standard conforming strings) and SQLite
    /// only double the single quote.
    pub fn quote_literal(&self, value: &str) -> String {
        match self {
            Dialect::Mysql | Dialect::Mariadb => {
                let mut out = String::with_capacity(value.len() + 2);
                out.push('\'');
                for ch in value.chars() {
                    match ch {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\u{1a}' => out.push_str("\\Z"),
                        other => out.push(other),
                    }
                }
                out.push('\'');
                out
            }
            Dialect::Pgsql | Dialect::Sqlite => format!("'{}'", value.replace('\'', "''")),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "mariadb" => Ok(Dialect::Mariadb),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Pgsql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(OrmError::Configuration(format!(
                "unsupported dialect `{other}` (expected mysql, mariadb, pgsql or sqlite)"
            ))),
        }
    }
}

/// What the SQL builder needs from a connection: its dialect and its literal quoting.
///
/// [`Dialect`] implements this with its built-in escaping so statements can be built
/// without a live connection.
pub trait DialectContext {
    fn dialect(&self) -> Dialect;

    fn quote_literal(&self, value: &str) -> String {
        self.dialect().quote_literal(value)
    }
}

impl DialectContext for Dialect {
    fn dialect(&self) -> Dialect {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dialects() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::Mysql);
        assert_eq!("MariaDB".parse::<Dialect>().unwrap(), Dialect::Mariadb);
        assert_eq!("pgsql".parse::<Dialect>().unwrap(), Dialect::Pgsql);
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Pgsql);
        assert_eq!(" sqlite ".parse::<Dialect>().unwrap(), Dialect::Sqlite);
    }

    #[test]
    fn test_unsupported_dialect_is_configuration_error() {
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, OrmError::Configuration(_)));
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_quote_reserved_word() {
        assert_eq!(Dialect::Mysql.quote_ident("order"), "`order`");
        assert_eq!(Dialect::Mariadb.quote_ident("order"), "`order`");
        assert_eq!(Dialect::Pgsql.quote_ident("order"), "\"order\"");
        assert_eq!(Dialect::Sqlite.quote_ident("order"), "\"order\"");
    }

    #[test]
    fn test_quote_doubles_delimiters() {
        assert_eq!(Dialect::Mysql.quote_ident("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Sqlite.quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_path() {
        assert_eq!(Dialect::Pgsql.quote_path("users.name"), "\"users\".\"name\"");
        assert_eq!(Dialect::Mysql.quote_path("users.*"), "`users`.*");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(Dialect::Sqlite.quote_literal("it's"), "'it''s'");
        assert_eq!(Dialect::Pgsql.quote_literal("a\\b"), "'a\\b'");
        assert_eq!(Dialect::Mysql.quote_literal("it's\\"), "'it\\'s\\\\'");
    }
}
