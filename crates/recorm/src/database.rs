//! Database handle: a connection, an in-progress statement and its results.

use crate::builder::QueryBuilder;
use crate::connection::Connection;
use crate::error::{OrmError, OrmResult};
use crate::monitor::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use crate::row::Row;
use crate::value::Value;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

/// A connection plus the statement being built for it.
///
/// Statements are assembled on the owned [`QueryBuilder`] (through
/// [`Database::query_mut`] or the `select`/`insert`/`update`/`delete`
/// shortcuts), run with [`Database::execute`], and their rows read back with
/// [`Database::fetch`]. Store failures from `execute` become `false`; the
/// cause stays available through [`Database::last_error`].
///
/// # Example
/// ```ignore
/// let mut db = Database::new(SqliteConnection::open_in_memory()?);
/// db.select(&["id", "name"]).from("users").and_where(("id", "=", 1));
/// let row = db.get_one();
/// ```
pub struct Database {
    conn: Box<dyn Connection>,
    query: QueryBuilder,
    results: VecDeque<Row>,
    affected_rows: u64,
    last_query: Option<String>,
    last_error: Option<OrmError>,
    hooks: Vec<Rc<dyn QueryHook>>,
}

impl Database {
    pub fn new<C: Connection + 'static>(conn: C) -> Self {
        Self::from_boxed(Box::new(conn))
    }

    pub fn from_boxed(conn: Box<dyn Connection>) -> Self {
        Self {
            conn,
            query: QueryBuilder::new(),
            results: VecDeque::new(),
            affected_rows: 0,
            last_query: None,
            last_error: None,
            hooks: Vec::new(),
        }
    }

    /// Add a statement hook.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Rc::new(hook));
        self
    }

    /// Add a hook the caller keeps a handle to.
    pub fn with_shared_hook(mut self, hook: Rc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn add_hook(&mut self, hook: Rc<dyn QueryHook>) {
        self.hooks.push(hook);
    }

    pub fn connection(&self) -> &dyn Connection {
        self.conn.as_ref()
    }

    // ==================== Statement building ====================

    /// The in-progress statement.
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }

    /// Replace the in-progress statement with a prebuilt one.
    pub fn set_query(&mut self, query: QueryBuilder) -> &mut QueryBuilder {
        self.query = query;
        &mut self.query
    }

    pub fn select<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut QueryBuilder {
        self.query.select(columns)
    }

    pub fn select_all(&mut self, reset: bool) -> &mut QueryBuilder {
        self.query.select_all(reset)
    }

    pub fn insert(&mut self, table: &str, fields: Row, function_fields: &[(&str, &str)]) -> &mut QueryBuilder {
        self.query.insert(table, fields, function_fields)
    }

    pub fn update(&mut self, table: &str, fields: Row) -> &mut QueryBuilder {
        self.query.update(table, fields)
    }

    pub fn delete(&mut self, table: &str) -> &mut QueryBuilder {
        self.query.delete(table)
    }

    // ==================== Execution ====================

    /// Run the in-progress statement and reset the builder.
    ///
    /// SELECT results are buffered for [`Database::fetch`]. Store failures
    /// return `false`, are logged, and are kept as [`Database::last_error`].
    pub fn execute(&mut self) -> bool {
        let (sql, values) = self.query.build();
        self.query.reset();
        let outcome = self.dispatch(&sql, &values);
        self.settle(outcome)
    }

    /// Run raw SQL with bound values, propagating errors.
    ///
    /// Statements that produce rows buffer them for [`Database::fetch`].
    pub fn run(&mut self, sql: &str, values: Vec<Value>) -> OrmResult<()> {
        self.dispatch(sql.trim(), &values)
    }

    fn settle(&mut self, outcome: OrmResult<()>) -> bool {
        match outcome {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    target: "recorm.db",
                    error = %err,
                    sql = err.sql().unwrap_or_default(),
                    "statement failed"
                );
                self.last_error = Some(err);
                false
            }
        }
    }

    fn dispatch(&mut self, sql: &str, values: &[Value]) -> OrmResult<()> {
        self.results.clear();
        self.affected_rows = 0;
        self.last_query = Some(sql.to_string());
        self.last_error = None;

        let ctx = QueryContext::new(sql, values.len()).with_driver(self.conn.driver_name());
        for hook in &self.hooks {
            if let HookAction::Abort(reason) = hook.before_query(&ctx) {
                return Err(OrmError::Aborted(reason));
            }
        }

        let start = Instant::now();
        let (outcome, result) = if ctx.query_type.returns_rows() {
            match self.conn.query(sql, values) {
                Ok(rows) => {
                    let n = rows.len();
                    self.results.extend(rows);
                    (Ok(()), QueryResult::Rows(n))
                }
                Err(e) => {
                    let r = QueryResult::error(e.to_string());
                    (Err(e), r)
                }
            }
        } else {
            match self.conn.execute(sql, values) {
                Ok(n) => {
                    self.affected_rows = n;
                    (Ok(()), QueryResult::Affected(n))
                }
                Err(e) => {
                    let r = QueryResult::error(e.to_string());
                    (Err(e), r)
                }
            }
        };
        let elapsed = start.elapsed();
        for hook in &self.hooks {
            hook.after_query(&ctx, elapsed, &result);
        }
        outcome
    }

    /// Next buffered row of the last SELECT.
    pub fn fetch(&mut self) -> Option<Row> {
        self.results.pop_front()
    }

    /// Run the in-progress statement and return its first row; SELECTs are
    /// capped at `LIMIT 1`, keeping any offset already set.
    pub fn get_one(&mut self) -> Option<Row> {
        if self.query.is_select() {
            self.query.limit_one();
        }
        if !self.execute() {
            return None;
        }
        self.fetch()
    }

    /// Run the in-progress statement and return every row.
    pub fn get_all(&mut self) -> Vec<Row> {
        if !self.execute() {
            return Vec::new();
        }
        self.results.drain(..).collect()
    }

    /// Identifier generated by the last INSERT.
    pub fn insert_id(&self) -> OrmResult<Value> {
        self.conn.last_insert_id()
    }

    /// Rows affected by the last write statement.
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    /// SQL text of the last statement sent to the connection.
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// The error behind the last `false` outcome, if any.
    pub fn last_error(&self) -> Option<&OrmError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<OrmError> {
        self.last_error.take()
    }

    // ==================== Transactions ====================

    pub fn begin(&mut self) -> bool {
        let outcome = self.dispatch("BEGIN", &[]);
        self.settle(outcome)
    }

    pub fn commit(&mut self) -> bool {
        let outcome = self.dispatch("COMMIT", &[]);
        self.settle(outcome)
    }

    pub fn rollback(&mut self) -> bool {
        let outcome = self.dispatch("ROLLBACK", &[]);
        self.settle(outcome)
    }

    /// Query type of the last statement, if any.
    pub fn last_query_type(&self) -> Option<QueryType> {
        self.last_query.as_deref().map(QueryType::from_sql)
    }
}
