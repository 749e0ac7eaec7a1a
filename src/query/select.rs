//! Select options: column list, ordering and pagination for `SELECT` statements.
//!
//! Column specs come in four forms, rendered per dialect:
//!
//! | spec | rendered (pgsql) |
//! |---|---|
//! | `*` | `*` |
//! | `users.*` | `"users".*` |
//! | `count(id) AS total` | `count(id) AS "total"` |
//! | `users.email` / `email` | `"users"."email"` / `"email"` |
//!
//! Anything containing a parenthesis or a space is a raw expression and passes
//! through unquoted.

use crate::dialect::Dialect;
use crate::error::{OrmError, Result};
use regex::Regex;

/// Sort direction. Anything other than a case-insensitive `desc` sorts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// `ORDER BY` contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// Passed through verbatim.
    Raw(String),
    /// Quoted column / direction pairs, in order.
    Columns(Vec<(String, Direction)>),
}

/// Options for `select`, `find_all` and `find_one`.
///
/// ```
/// use sommy::query::SelectOptions;
///
/// let options = SelectOptions::new()
///     .columns(["id", "name"])
///     .order_by("name", "desc")
///     .limit(10)
///     .offset(20);
/// assert_eq!(options.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectOptions {
    /// Empty means `*`.
    pub columns: Vec<String>,
    pub order: Option<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append `column` to the ordering. Replaces a raw ordering.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: &str) -> Self {
        let entry = (column.into(), Direction::parse(direction));
        match self.order {
            Some(Order::Columns(ref mut columns)) => columns.push(entry),
            _ => self.order = Some(Order::Columns(vec![entry])),
        }
        self
    }

    #[must_use]
    pub fn order_raw(mut self, order: impl Into<String>) -> Self {
        self.order = Some(Order::Raw(order.into()));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

fn is_raw_expression(spec: &str) -> bool {
    spec.contains('(') || spec.contains(' ')
}

/// `expr AS alias`, case-insensitive.
fn alias_pattern() -> Result<Regex> {
    Regex::new(r"(?i)^(.+?)\s+AS\s+([A-Za-z0-9_]+)$")
        .map_err(|e| OrmError::Build(format!("Invalid regex: {}", e)))
}

/// Render one column spec.
pub fn render_column(dialect: Dialect, spec: &str) -> Result<String> {
    render_with(dialect, spec, &alias_pattern()?)
}

fn render_with(dialect: Dialect, spec: &str, aliased: &Regex) -> Result<String> {
    let spec = spec.trim();
    if spec == "*" {
        return Ok(spec.to_string());
    }

    if let Some(caps) = aliased.captures(spec) {
        let expr = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let alias = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let expr = if is_raw_expression(expr) || expr == "*" {
            expr.to_string()
        } else {
            dialect.quote_path(expr)
        };
        return Ok(format!("{expr} AS {}", dialect.quote_ident(alias)));
    }

    if is_raw_expression(spec) {
        Ok(spec.to_string())
    } else {
        Ok(dialect.quote_path(spec))
    }
}

/// Render the select list; no columns selects `*`.
pub fn render_columns(dialect: Dialect, columns: &[String]) -> Result<String> {
    if columns.is_empty() {
        return Ok("*".to_string());
    }
    let aliased = alias_pattern()?;
    let rendered = columns
        .iter()
        .map(|spec| render_with(dialect, spec, &aliased))
        .collect::<Result<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

/// ` ORDER BY ...`, or nothing.
pub fn render_order(dialect: Dialect, order: Option<&Order>) -> String {
    match order {
        Some(Order::Raw(raw)) if !raw.trim().is_empty() => format!(" ORDER BY {}", raw.trim()),
        Some(Order::Columns(columns)) if !columns.is_empty() => {
            let parts: Vec<String> = columns
                .iter()
                .map(|(column, direction)| format!("{} {}", dialect.quote_path(column), direction.as_sql()))
                .collect();
            format!(" ORDER BY {}", parts.join(", "))
        }
        _ => String::new(),
    }
}

/// ` LIMIT n OFFSET m`. MySQL and SQLite cannot take `OFFSET` alone, so a
/// missing limit becomes the dialect's "no limit" value.
pub fn render_limit(dialect: Dialect, limit: Option<u64>, offset: Option<u64>) -> String {
    let mut sql = String::new();
    match (limit, offset) {
        (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, Some(_)) => match dialect {
            Dialect::Sqlite => sql.push_str(" LIMIT -1"),
            Dialect::Mysql | Dialect::Mariadb => sql.push_str(&format!(" LIMIT {}", u64::MAX)),
            Dialect::Pgsql => {}
        },
        (None, None) => {}
    }
    if let Some(offset) = offset {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    sql
}
