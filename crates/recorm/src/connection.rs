//! Connection trait for prepared-statement execution.

use crate::error::OrmResult;
use crate::row::Row;
use crate::value::Value;

/// The execution interface every driver adapter implements.
///
/// SQL text uses backtick identifiers and positional `?` placeholders; the
/// values slice is aligned 1:1 with the placeholders. Implementations report
/// connection failures as [`crate::OrmError::Connection`] and statement
/// failures as [`crate::OrmError::Query`].
pub trait Connection {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;

    /// The identifier generated by the most recent INSERT on this connection.
    fn last_insert_id(&self) -> OrmResult<Value>;

    /// Execute a query and return the first row, if any.
    ///
    /// The default implementation runs [`Connection::query`] and keeps the
    /// first row.
    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Short driver name used in logs.
    fn driver_name(&self) -> &'static str {
        "unknown"
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&self) -> OrmResult<Value> {
        (**self).last_insert_id()
    }

    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        (**self).query_opt(sql, params)
    }

    fn driver_name(&self) -> &'static str {
        (**self).driver_name()
    }
}
