//! Embedded SQL store.
//!
//! A deliberately small execution interface: modules hand over SQL text
//! and positional parameters, and get dynamically typed rows back. The
//! default implementation is rusqlite with the bundled SQLite; the trait
//! exists so a networked backend can be substituted without touching the
//! modules.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::Connection;
use tracing::debug;

use crate::error::SqlError;

/// A dynamically-typed SQL parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// A row returned from a query — column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column by name.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column by name.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// SQL execution interface backed by an embedded database.
pub trait SqlStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return the affected
    /// row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError>;
}

/// SqlStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SqlError> {
        let conn = Connection::open(path).map_err(|e| SqlError::Connection(e.to_string()))?;
        debug!(path = %path.display(), "sqlite database opened");
        Self::configure(conn)
    }

    /// Create an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SqlError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SqlError::Connection(e.to_string()))?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self, SqlError> {
        // WAL for concurrent readers; the busy timeout bounds lock waits
        // instead of failing writes immediately.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;
             PRAGMA foreign_keys=ON;",
        )
        .map_err(|e| SqlError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SqlStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Query(e.to_string()))?;

        let mut stmt = conn.prepare(sql).map_err(|e| SqlError::Query(e.to_string()))?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut result = Vec::new();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(|e| SqlError::Query(e.to_string()))?;

        while let Some(row) = rows.next().map_err(|e| SqlError::Query(e.to_string()))? {
            let mut columns = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let value = match row.get_ref(i).map_err(|e| SqlError::Query(e.to_string()))? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Integer(v),
                    ValueRef::Real(v) => Value::Real(v),
                    ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
                    ValueRef::Blob(v) => Value::Blob(v.to_vec()),
                };
                columns.push((name.clone(), value));
            }
            result.push(Row { columns });
        }
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SqlError::Execution(e.to_string()))?;

        let affected = conn
            .execute(sql, rusqlite::params_from_iter(params.iter()))
            .map_err(|e| SqlError::Execution(e.to_string()))?;
        Ok(affected as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let s = SqliteStore::open_in_memory().unwrap();
        s.exec(
            "CREATE TABLE t (id TEXT PRIMARY KEY, n INTEGER, note TEXT)",
            &[],
        )
        .unwrap();
        s
    }

    #[test]
    fn exec_and_query_roundtrip() {
        let s = store();
        let affected = s
            .exec(
                "INSERT INTO t (id, n, note) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text("a".into()),
                    Value::Integer(7),
                    Value::Text("hello".into()),
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = s
            .query("SELECT * FROM t WHERE id = ?1", &[Value::Text("a".into())])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_int("n"), Some(7));
        assert_eq!(rows[0].get_text("note"), Some("hello"));
        assert_eq!(rows[0].get("missing"), None);
    }

    #[test]
    fn null_round_trips() {
        let s = store();
        s.exec(
            "INSERT INTO t (id, n, note) VALUES (?1, ?2, ?3)",
            &[Value::Text("b".into()), Value::Null, Value::Null],
        )
        .unwrap();
        let rows = s.query("SELECT n FROM t", &[]).unwrap();
        assert_eq!(rows[0].get("n"), Some(&Value::Null));
        assert_eq!(rows[0].get_int("n"), None);
    }

    #[test]
    fn unique_violation_surfaces_in_exec_error() {
        let s = store();
        s.exec(
            "CREATE UNIQUE INDEX u ON t(n) WHERE note != 'x'",
            &[],
        )
        .unwrap();
        s.exec(
            "INSERT INTO t (id, n, note) VALUES ('a', 1, 'y')",
            &[],
        )
        .unwrap();
        let err = s
            .exec("INSERT INTO t (id, n, note) VALUES ('b', 1, 'y')", &[])
            .unwrap_err();
        assert!(err.to_string().contains("UNIQUE constraint"));
        // A row outside the partial index predicate is still allowed.
        s.exec(
            "INSERT INTO t (id, n, note) VALUES ('c', 1, 'x')",
            &[],
        )
        .unwrap();
    }
}
