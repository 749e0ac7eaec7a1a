//! Dialect type mapping: logical [`TypeTag`] → column type fragment.
//!
//! Integer-family columns may also carry the dialect's inline primary key and
//! auto-increment syntax, so the mapping reports whether it emitted `PRIMARY KEY`.
//!
//! | TypeTag | mysql/mariadb | pgsql | sqlite |
//! |---|---|---|---|
//! | INTEGER | `INT [AUTO_INCREMENT] [PRIMARY KEY]` | `SERIAL PRIMARY KEY` if auto-increment, else `INTEGER` | `INTEGER PRIMARY KEY [AUTOINCREMENT]` if primary, else `INTEGER` |
//! | BIGINT | `BIGINT ...` | `BIGSERIAL PRIMARY KEY` if auto-increment, else `INTEGER` | as INTEGER |
//! | SMALLINT | `SMALLINT ...` | `INTEGER` | as INTEGER |
//! | BOOLEAN | `TINYINT(1)` | `BOOLEAN` | `TINYINT(1)` |
//! | VARCHAR | `VARCHAR(n)` (n = 255) | same | same |
//! | DATETIME | `DATETIME` | `TIMESTAMP` | `DATETIME` |
//! | JSON | `JSON` | `JSON` | `TEXT` |
//! | UUID | `CHAR(36)` | `UUID` | `CHAR(36)` |

use super::definition::{AttributeDefinition, TypeTag};
use crate::dialect::Dialect;

pub const DEFAULT_VARCHAR_LENGTH: u32 = 255;
pub const DEFAULT_DECIMAL_PRECISION: u32 = 10;
pub const DEFAULT_DECIMAL_SCALE: u32 = 2;

/// Result of mapping one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub sql: String,
    /// `PRIMARY KEY` was emitted inline.
    pub inline_primary_key: bool,
}

impl MappedType {
    fn plain(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            inline_primary_key: false,
        }
    }

    fn keyed(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            inline_primary_key: true,
        }
    }
}

/// Map `attr` to its type fragment for `dialect`.
///
/// `inline_key_allowed` is false when the table has a composite key (or the column
/// is being added with `ALTER TABLE`); the key then never renders inline.
pub fn map_type(dialect: Dialect, attr: &AttributeDefinition, inline_key_allowed: bool) -> MappedType {
    let tag = attr.type_tag();
    let sql = match tag {
        TypeTag::Integer | TypeTag::BigInt | TypeTag::SmallInt => {
            return map_integer(dialect, tag, attr, inline_key_allowed)
        }
        TypeTag::Boolean => match dialect {
            Dialect::Pgsql => "BOOLEAN".to_string(),
            _ => "TINYINT(1)".to_string(),
        },
        TypeTag::Varchar => format!(
            "VARCHAR({})",
            attr.length().unwrap_or(DEFAULT_VARCHAR_LENGTH)
        ),
        TypeTag::Text => "TEXT".to_string(),
        TypeTag::Date => "DATE".to_string(),
        TypeTag::DateTime => match dialect {
            Dialect::Pgsql => "TIMESTAMP".to_string(),
            _ => "DATETIME".to_string(),
        },
        TypeTag::Timestamp => "TIMESTAMP".to_string(),
        TypeTag::Time => "TIME".to_string(),
        TypeTag::Float => "FLOAT".to_string(),
        TypeTag::Decimal => format!(
            "DECIMAL({},{})",
            attr.precision().unwrap_or(DEFAULT_DECIMAL_PRECISION),
            attr.scale().unwrap_or(DEFAULT_DECIMAL_SCALE)
        ),
        TypeTag::Json => match dialect {
            Dialect::Sqlite => "TEXT".to_string(),
            _ => "JSON".to_string(),
        },
        TypeTag::Uuid => match dialect {
            Dialect::Pgsql => "UUID".to_string(),
            _ => "CHAR(36)".to_string(),
        },
    };
    MappedType::plain(sql)
}

fn map_integer(
    dialect: Dialect,
    tag: TypeTag,
    attr: &AttributeDefinition,
    inline_key_allowed: bool,
) -> MappedType {
    let primary = attr.is_primary_key() && inline_key_allowed;
    let auto_increment = attr.is_auto_increment();

    match dialect {
        Dialect::Mysql | Dialect::Mariadb => {
            let mut sql = match tag {
                TypeTag::BigInt => "BIGINT",
                TypeTag::SmallInt => "SMALLINT",
                _ => "INT",
            }
            .to_string();
            if auto_increment {
                sql.push_str(" AUTO_INCREMENT");
            }
            if primary {
                sql.push_str(" PRIMARY KEY");
                MappedType::keyed(sql)
            } else {
                MappedType::plain(sql)
            }
        }
        Dialect::Pgsql => match tag {
            TypeTag::Integer if auto_increment && primary => MappedType::keyed("SERIAL PRIMARY KEY"),
            TypeTag::BigInt if auto_increment && primary => MappedType::keyed("BIGSERIAL PRIMARY KEY"),
            TypeTag::Integer if auto_increment => MappedType::plain("SERIAL"),
            TypeTag::BigInt if auto_increment => MappedType::plain("BIGSERIAL"),
            _ => MappedType::plain("INTEGER"),
        },
        Dialect::Sqlite => {
            if primary {
                if auto_increment {
                    MappedType::keyed("INTEGER PRIMARY KEY AUTOINCREMENT")
                } else {
                    MappedType::keyed("INTEGER PRIMARY KEY")
                }
            } else {
                MappedType::plain("INTEGER")
            }
        }
    }
}
