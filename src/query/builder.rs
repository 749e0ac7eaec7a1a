//! Dialect-aware SQL builder.
//!
//! `SqlBuilder` is stateless: every method turns a table name plus a schema,
//! predicate or value set into a [`Statement`]. It borrows a [`DialectContext`]
//! (usually the live connection) for the dialect and its literal escaping, and
//! never executes anything itself; see [`QueryInterface`](super::QueryInterface).

use crate::dialect::{Dialect, DialectContext};
use crate::error::{OrmError, Result};
use crate::query::column::{map_type, AttributeDefinition};
use crate::query::predicate::{build_where, Predicate};
use crate::query::select::{render_columns, render_limit, render_order, SelectOptions};
use crate::query::statement::{ParamNames, Statement};
use crate::query::table::SchemaDescriptor;
use crate::value::{Fields, Value};

pub struct SqlBuilder<'a, C: DialectContext + ?Sized> {
    ctx: &'a C,
}

impl<'a, C: DialectContext + ?Sized> SqlBuilder<'a, C> {
    pub fn new(ctx: &'a C) -> Self {
        Self { ctx }
    }

    pub fn dialect(&self) -> Dialect {
        self.ctx.dialect()
    }

    fn table(&self, table: &str) -> Result<String> {
        if table.trim().is_empty() {
            return Err(OrmError::Build("table name must not be empty".to_string()));
        }
        Ok(self.dialect().quote_path(table))
    }

    /// `CREATE TABLE [IF NOT EXISTS] t (...)`.
    ///
    /// With exactly one primary-key column the dialect's inline key syntax is used
    /// when the type supports it; otherwise every flagged column is listed in a
    /// trailing `PRIMARY KEY (...)` clause in declaration order.
    pub fn create_table(
        &self,
        table: &str,
        schema: &SchemaDescriptor,
        if_not_exists: bool,
    ) -> Result<Statement> {
        let quoted = self.table(table)?;
        if schema.is_empty() {
            return Err(OrmError::Build(format!("table `{table}` has no columns")));
        }

        let key_columns = schema.primary_key_columns();
        let inline_key_allowed = key_columns.len() == 1;
        let mut clauses = Vec::with_capacity(schema.len() + 1);
        let mut inline_key_used = false;
        for (name, attr) in schema.iter() {
            let (clause, inline) = self.column_clause(name, attr, inline_key_allowed);
            inline_key_used |= inline;
            clauses.push(clause);
        }
        if !key_columns.is_empty() && !inline_key_used {
            let keys: Vec<String> = key_columns
                .iter()
                .map(|column| self.dialect().quote_ident(column))
                .collect();
            clauses.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }

        let exists = if if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(Statement::new(format!(
            "CREATE TABLE {exists}{quoted} ({})",
            clauses.join(", ")
        )))
    }

    /// `DROP TABLE [IF EXISTS] t`.
    pub fn drop_table(&self, table: &str, if_exists: bool) -> Result<Statement> {
        let quoted = self.table(table)?;
        let exists = if if_exists { "IF EXISTS " } else { "" };
        Ok(Statement::new(format!("DROP TABLE {exists}{quoted}")))
    }

    /// `ALTER TABLE t ADD COLUMN <clause>`. The key is never declared inline here.
    pub fn add_column(&self, table: &str, column: &str, attr: &AttributeDefinition) -> Result<Statement> {
        let quoted = self.table(table)?;
        if column.trim().is_empty() {
            return Err(OrmError::Build("column name must not be empty".to_string()));
        }
        let (clause, _) = self.column_clause(column, attr, false);
        Ok(Statement::new(format!("ALTER TABLE {quoted} ADD COLUMN {clause}")))
    }

    /// `ALTER TABLE t DROP COLUMN c`.
    pub fn remove_column(&self, table: &str, column: &str) -> Result<Statement> {
        let quoted = self.table(table)?;
        if column.trim().is_empty() {
            return Err(OrmError::Build("column name must not be empty".to_string()));
        }
        Ok(Statement::new(format!(
            "ALTER TABLE {quoted} DROP COLUMN {}",
            self.dialect().quote_ident(column)
        )))
    }

    pub fn select(&self, table: &str, predicate: &Predicate, options: &SelectOptions) -> Result<Statement> {
        let dialect = self.dialect();
        let quoted = self.table(table)?;
        let columns = render_columns(dialect, &options.columns)?;

        let mut names = ParamNames::new();
        let mut params = Vec::new();
        let mut sql = format!("SELECT {columns} FROM {quoted}");
        if let Some(clause) = build_where(dialect, predicate, &mut names, &mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        sql.push_str(&render_order(dialect, options.order.as_ref()));
        sql.push_str(&render_limit(dialect, options.limit, options.offset));
        Ok(Statement { sql, params })
    }

    /// `INSERT INTO t (...) VALUES (:col, ...)`, or `None` when there is nothing to insert.
    pub fn insert(&self, table: &str, values: &Fields) -> Result<Option<Statement>> {
        let quoted = self.table(table)?;
        if values.is_empty() {
            return Ok(None);
        }

        let dialect = self.dialect();
        let mut names = ParamNames::new();
        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len());
        for (column, value) in values.iter() {
            let name = names.reserve(ParamNames::sanitize(column));
            columns.push(dialect.quote_ident(column));
            placeholders.push(format!(":{name}"));
            params.push((name, value.clone()));
        }

        Ok(Some(Statement {
            sql: format!(
                "INSERT INTO {quoted} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            ),
            params,
        }))
    }

    /// Like [`insert`](Self::insert), with `RETURNING key` appended on PostgreSQL.
    pub fn insert_returning(&self, table: &str, values: &Fields, key: &str) -> Result<Option<Statement>> {
        let statement = self.insert(table, values)?;
        Ok(statement.map(|mut statement| {
            if self.dialect() == Dialect::Pgsql {
                statement.sql.push_str(" RETURNING ");
                statement.sql.push_str(&self.dialect().quote_ident(key));
            }
            statement
        }))
    }

    /// `UPDATE t SET col = :col, ... [WHERE ...]`, or `None` when `values` is empty.
    pub fn update(&self, table: &str, values: &Fields, predicate: &Predicate) -> Result<Option<Statement>> {
        let quoted = self.table(table)?;
        if values.is_empty() {
            return Ok(None);
        }

        let dialect = self.dialect();
        let mut names = ParamNames::new();
        let mut params = Vec::with_capacity(values.len() + predicate.len());
        let mut assignments = Vec::with_capacity(values.len());
        for (column, value) in values.iter() {
            let name = names.reserve(ParamNames::sanitize(column));
            assignments.push(format!("{} = :{name}", dialect.quote_ident(column)));
            params.push((name, value.clone()));
        }

        let mut sql = format!("UPDATE {quoted} SET {}", assignments.join(", "));
        if let Some(clause) = build_where(dialect, predicate, &mut names, &mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        Ok(Some(Statement { sql, params }))
    }

    /// `DELETE FROM t [WHERE ...]`.
    pub fn delete(&self, table: &str, predicate: &Predicate) -> Result<Statement> {
        let quoted = self.table(table)?;
        let mut names = ParamNames::new();
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {quoted}");
        if let Some(clause) = build_where(self.dialect(), predicate, &mut names, &mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        Ok(Statement { sql, params })
    }

    /// One column clause: `name TYPE [NOT NULL] [UNIQUE] [DEFAULT x]`.
    ///
    /// The flag reports whether the type fragment carried `PRIMARY KEY`.
    pub fn column_clause(&self, name: &str, attr: &AttributeDefinition, inline_key_allowed: bool) -> (String, bool) {
        let dialect = self.dialect();
        let mapped = map_type(dialect, attr, inline_key_allowed);
        let mut clause = format!("{} {}", dialect.quote_ident(name), mapped.sql);
        if !attr.allows_null() && !attr.is_primary_key() {
            clause.push_str(" NOT NULL");
        }
        if attr.is_unique() {
            clause.push_str(" UNIQUE");
        }
        if let Some(default) = attr.default() {
            if !attr.is_auto_increment() {
                clause.push_str(" DEFAULT ");
                clause.push_str(&self.literal(default));
            }
        }
        (clause, mapped.inline_primary_key)
    }

    /// Render `value` as an SQL literal for `DEFAULT` clauses.
    pub fn literal(&self, value: &Value) -> String {
        let dialect = self.dialect();
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => match dialect {
                Dialect::Pgsql => if *b { "TRUE" } else { "FALSE" }.to_string(),
                _ => if *b { "1" } else { "0" }.to_string(),
            },
            Value::Int(_) | Value::Float(_) | Value::Decimal(_) => value.to_string(),
            Value::Bytes(_) => match dialect {
                Dialect::Pgsql => self.ctx.quote_literal(&format!("\\x{value}")),
                _ => format!("X'{value}'"),
            },
            Value::Json(json) => self.ctx.quote_literal(&json.to_string()),
            Value::Text(_)
            | Value::Date(_)
            | Value::Time(_)
            | Value::DateTime(_)
            | Value::Uuid(_) => self.ctx.quote_literal(&value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::column::data_types;

    fn user_schema() -> SchemaDescriptor {
        SchemaDescriptor::new()
            .column("id", data_types::integer().primary_key().auto_increment())
            .column("name", data_types::string(100))
            .column("email", data_types::string(150))
    }

    #[test]
    fn test_create_table_inline_key() {
        let b = SqlBuilder::new(&Dialect::Sqlite);
        let stmt = b.create_table("users", &user_schema(), true).unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS \"users\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" VARCHAR(100), \"email\" VARCHAR(150))"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_create_table_mysql_and_pgsql() {
        let mysql = SqlBuilder::new(&Dialect::Mysql)
            .create_table("users", &user_schema(), false)
            .unwrap();
        assert_eq!(
            mysql.sql,
            "CREATE TABLE `users` (`id` INT AUTO_INCREMENT PRIMARY KEY, `name` VARCHAR(100), `email` VARCHAR(150))"
        );
        let pg = SqlBuilder::new(&Dialect::Pgsql)
            .create_table("users", &user_schema(), false)
            .unwrap();
        assert!(pg.sql.contains("\"id\" SERIAL PRIMARY KEY"));
        assert!(!pg.sql.contains("PRIMARY KEY (\"id\")"));
    }

    #[test]
    fn test_create_table_table_level_key() {
        let schema = SchemaDescriptor::new()
            .column("code", data_types::string(8).primary_key())
            .column("label", data_types::text().not_null());
        let stmt = SqlBuilder::new(&Dialect::Pgsql)
            .create_table("codes", &schema, false)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE \"codes\" (\"code\" VARCHAR(8), \"label\" TEXT NOT NULL, PRIMARY KEY (\"code\"))"
        );
    }

    #[test]
    fn test_create_table_composite_key() {
        let schema = SchemaDescriptor::new()
            .column("a", data_types::integer().primary_key())
            .column("b", data_types::integer().primary_key());
        let stmt = SqlBuilder::new(&Dialect::Sqlite)
            .create_table("pairs", &schema, false)
            .unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE \"pairs\" (\"a\" INTEGER, \"b\" INTEGER, PRIMARY KEY (\"a\", \"b\"))"
        );
    }

    #[test]
    fn test_column_clause_modifiers() {
        let b = SqlBuilder::new(&Dialect::Mysql);
        let attr = data_types::string(20).not_null().unique().default_value("it's");
        let (clause, inline) = b.column_clause("nick", &attr, true);
        assert_eq!(clause, "`nick` VARCHAR(20) NOT NULL UNIQUE DEFAULT 'it\\'s'");
        assert!(!inline);

        let flag = data_types::boolean().default_value(true);
        assert_eq!(b.column_clause("on", &flag, true).0, "`on` TINYINT(1) DEFAULT 1");
        let pg = SqlBuilder::new(&Dialect::Pgsql);
        assert_eq!(pg.column_clause("on", &flag, true).0, "\"on\" BOOLEAN DEFAULT TRUE");
    }

    #[test]
    fn test_auto_increment_skips_default() {
        let attr = data_types::integer().auto_increment().default_value(5);
        let (clause, _) = SqlBuilder::new(&Dialect::Sqlite).column_clause("n", &attr, true);
        assert_eq!(clause, "\"n\" INTEGER");
    }

    #[test]
    fn test_empty_table_name_and_schema() {
        let b = SqlBuilder::new(&Dialect::Sqlite);
        assert!(b.drop_table("  ", true).unwrap_err().is_build());
        assert!(b
            .create_table("t", &SchemaDescriptor::new(), false)
            .unwrap_err()
            .is_build());
    }

    #[test]
    fn test_drop_table() {
        let b = SqlBuilder::new(&Dialect::Mysql);
        assert_eq!(b.drop_table("users", true).unwrap().sql, "DROP TABLE IF EXISTS `users`");
        assert_eq!(b.drop_table("users", false).unwrap().sql, "DROP TABLE `users`");
    }

    #[test]
    fn test_alter_table() {
        let b = SqlBuilder::new(&Dialect::Pgsql);
        let add = b
            .add_column("users", "age", &data_types::integer().not_null().default_value(0))
            .unwrap();
        assert_eq!(
            add.sql,
            "ALTER TABLE \"users\" ADD COLUMN \"age\" INTEGER NOT NULL DEFAULT 0"
        );
        let remove = b.remove_column("users", "age").unwrap();
        assert_eq!(remove.sql, "ALTER TABLE \"users\" DROP COLUMN \"age\"");
    }

    #[test]
    fn test_select_full() {
        let b = SqlBuilder::new(&Dialect::Sqlite);
        let predicate = Predicate::new().eq("email", "x@y.z").any_of("id", [1, 2]);
        let options = SelectOptions::new()
            .columns(["id", "name"])
            .order_by("name", "desc")
            .limit(10)
            .offset(5);
        let stmt = b.select("users", &predicate, &options).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"id\", \"name\" FROM \"users\" WHERE \"email\" = :email_0 AND \"id\" IN (:id_1_0, :id_1_1) ORDER BY \"name\" DESC LIMIT 10 OFFSET 5"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_insert() {
        let b = SqlBuilder::new(&Dialect::Mysql);
        let values = Fields::new().with("name", "Clinton").with("order", 3);
        let stmt = b.insert("users", &values).unwrap().unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `users` (`name`, `order`) VALUES (:name, :order)"
        );
        assert_eq!(stmt.param("order"), Some(&Value::Int(3)));
        assert!(b.insert("users", &Fields::new()).unwrap().is_none());
    }

    #[test]
    fn test_insert_returning_only_on_pgsql() {
        let values = Fields::new().with("name", "x");
        let pg = SqlBuilder::new(&Dialect::Pgsql)
            .insert_returning("users", &values, "id")
            .unwrap()
            .unwrap();
        assert!(pg.sql.ends_with(" RETURNING \"id\""));
        let lite = SqlBuilder::new(&Dialect::Sqlite)
            .insert_returning("users", &values, "id")
            .unwrap()
            .unwrap();
        assert!(!lite.sql.contains("RETURNING"));
    }

    #[test]
    fn test_update_shares_parameter_names() {
        let b = SqlBuilder::new(&Dialect::Pgsql);
        let values = Fields::new().with("name", "n").with("id_1", 7);
        let predicate = Predicate::new().eq("id", 1);
        let stmt = b.update("users", &values, &predicate).unwrap().unwrap();
        // `id` at count 2 wants `id_2`; free, but a colliding name would be suffixed.
        assert_eq!(
            stmt.sql,
            "UPDATE \"users\" SET \"name\" = :name, \"id_1\" = :id_1 WHERE \"id\" = :id_2"
        );
        assert!(b.update("users", &Fields::new(), &predicate).unwrap().is_none());
    }

    #[test]
    fn test_set_and_where_quote_columns_alike() {
        let b = SqlBuilder::new(&Dialect::Pgsql);
        let values = Fields::new().with("a.b", 1);
        let stmt = b.update("t", &values, &Predicate::new().eq("a.b", 2)).unwrap().unwrap();
        assert_eq!(stmt.sql, "UPDATE \"t\" SET \"a.b\" = :a_b WHERE \"a.b\" = :a_b_1");
    }

    #[test]
    fn test_delete() {
        let b = SqlBuilder::new(&Dialect::Sqlite);
        let stmt = b.delete("users", &Predicate::new().is_null("email")).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM \"users\" WHERE \"email\" IS NULL");
        assert!(stmt.params.is_empty());
        assert_eq!(b.delete("users", &Predicate::new()).unwrap().sql, "DELETE FROM \"users\"");
    }

    #[test]
    fn test_literals() {
        let lite = SqlBuilder::new(&Dialect::Sqlite);
        assert_eq!(lite.literal(&Value::Null), "NULL");
        assert_eq!(lite.literal(&Value::Int(-4)), "-4");
        assert_eq!(lite.literal(&Value::Float(1.5)), "1.5");
        assert_eq!(lite.literal(&Value::from("O'Neil")), "'O''Neil'");
        assert_eq!(lite.literal(&Value::Bytes(vec![0xab, 0x01])), "X'ab01'");
        let pg = SqlBuilder::new(&Dialect::Pgsql);
        assert_eq!(pg.literal(&Value::Bytes(vec![0xab])), "'\\xab'");
    }
}
