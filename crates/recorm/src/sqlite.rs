//! Embedded SQLite connection using `rusqlite`.
//!
//! SQLite accepts backtick-quoted identifiers, positional `?` placeholders and
//! `LIMIT offset, count`, so builder output runs unchanged.

use crate::config::DatabaseConfig;
use crate::connection::Connection;
use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::{TIMESTAMP_FORMAT, Value};
use rusqlite::types::ValueRef;
use std::path::Path;

/// A [`Connection`] over one `rusqlite` handle.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let conn = rusqlite::Connection::open(path).map_err(|e| {
            OrmError::connection(format!("SQLite open {} failed: {e}", path.display()))
        })?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> OrmResult<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| OrmError::connection(format!("SQLite open failed: {e}")))?;
        Ok(Self { conn })
    }

    /// Open the database named by a profile; an empty name or `:memory:`
    /// opens an in-memory database.
    pub fn from_config(config: &DatabaseConfig) -> OrmResult<Self> {
        match config.database.trim() {
            "" | ":memory:" => Self::open_in_memory(),
            path => Self::open(path),
        }
    }

    /// Run a batch of `;`-separated statements without parameters.
    pub fn execute_batch(&self, sql: &str) -> OrmResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| OrmError::query(e.to_string(), sql, &[]))
    }

    fn prepare(&self, sql: &str, params: &[Value]) -> OrmResult<rusqlite::Statement<'_>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| OrmError::query(e.to_string(), sql, params))?;
        bind_params(&mut stmt, params).map_err(|e| OrmError::query(e.to_string(), sql, params))?;
        Ok(stmt)
    }
}

/// Binds values to a `rusqlite` statement by position.
fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> rusqlite::Result<()> {
    for (i, param) in params.iter().enumerate() {
        let idx = i + 1;
        match param {
            Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
            Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
            Value::Int(v) => stmt.raw_bind_parameter(idx, v),
            Value::Float(v) => stmt.raw_bind_parameter(idx, v),
            Value::Text(s) => stmt.raw_bind_parameter(idx, s.as_str()),
            Value::Bytes(b) => stmt.raw_bind_parameter(idx, b.as_slice()),
            Value::Json(j) => stmt.raw_bind_parameter(idx, j.to_string()),
            Value::Timestamp(t) => {
                stmt.raw_bind_parameter(idx, t.format(TIMESTAMP_FORMAT).to_string())
            }
        }?;
    }
    Ok(())
}

fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> rusqlite::Result<Row> {
    let mut row = Row::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        let value = match sqlite_row.get_ref(i)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Int(v),
            ValueRef::Real(v) => Value::Float(v),
            ValueRef::Text(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
            ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        };
        row.insert(name.as_str(), value);
    }
    Ok(row)
}

impl Connection for SqliteConnection {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let mut stmt = self.prepare(sql, params)?;
        let column_names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut raw_rows = stmt.raw_query();
        let mut rows = Vec::new();
        loop {
            match raw_rows.next() {
                Ok(Some(row)) => rows.push(
                    convert_row(row, &column_names)
                        .map_err(|e| OrmError::query(e.to_string(), sql, params))?,
                ),
                Ok(None) => break,
                Err(e) => return Err(OrmError::query(e.to_string(), sql, params)),
            }
        }
        Ok(rows)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let mut stmt = self.prepare(sql, params)?;
        let affected = stmt
            .raw_execute()
            .map_err(|e| OrmError::query(e.to_string(), sql, params))?;
        Ok(affected as u64)
    }

    fn last_insert_id(&self) -> OrmResult<Value> {
        Ok(Value::Int(self.conn.last_insert_rowid()))
    }

    fn driver_name(&self) -> &'static str {
        "sqlite"
    }
}
