//! Shared helpers for the integration tests.

#![allow(dead_code)]

use sommy::{Dialect, DialectContext, Executor, Fields, Statement};
use std::any::Any;
use std::sync::Mutex;

/// An `Executor` that records every statement instead of running it.
///
/// Queries return the canned `rows`, executes report `affected` rows and the
/// last insert id is always `last_id`.
pub struct RecordingExecutor {
    dialect: Dialect,
    pub statements: Mutex<Vec<Statement>>,
    pub rows: Vec<Fields>,
    pub affected: u64,
    pub last_id: Option<String>,
}

impl RecordingExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: Mutex::new(Vec::new()),
            rows: Vec::new(),
            affected: 1,
            last_id: Some("1".to_string()),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Fields>) -> Self {
        self.rows = rows;
        self
    }

    pub fn recorded(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    pub fn sql(&self) -> Vec<String> {
        self.recorded().into_iter().map(|s| s.sql).collect()
    }

    fn record(&self, statement: &Statement) {
        self.statements.lock().unwrap().push(statement.clone());
    }
}

impl DialectContext for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, statement: &Statement) -> sommy::Result<u64> {
        self.record(statement);
        Ok(self.affected)
    }

    fn query_all(&self, statement: &Statement) -> sommy::Result<Vec<Fields>> {
        self.record(statement);
        Ok(self.rows.clone())
    }

    fn last_insert_id(&self) -> sommy::Result<Option<String>> {
        Ok(self.last_id.clone())
    }

    fn begin(&self) -> sommy::Result<()> {
        self.record(&Statement::new("BEGIN"));
        Ok(())
    }

    fn commit(&self) -> sommy::Result<()> {
        self.record(&Statement::new("COMMIT"));
        Ok(())
    }

    fn rollback(&self) -> sommy::Result<()> {
        self.record(&Statement::new("ROLLBACK"));
        Ok(())
    }

    fn ping(&self) -> sommy::Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
