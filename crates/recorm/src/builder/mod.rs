//! Fluent SQL statement builder.
//!
//! [`QueryBuilder`] accumulates SQL fragments and bound values for one
//! statement at a time and emits a `(sql, values)` pair with backtick-quoted
//! identifiers and positional `?` placeholders.
//!
//! ## Design
//!
//! - Statement-defining calls (`select`, `select_all`, `insert`, `update`,
//!   `delete`, `raw`) reset prior state.
//! - Clause calls (`from`, joins, `and_where`, `group_by`, `having`,
//!   `order_by`, `limit`) accumulate in any order.
//! - Bound values are kept per clause and concatenated in SQL order, so the
//!   Nth `?` always matches the Nth value.
//!
//! ```ignore
//! use recorm::QueryBuilder;
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(&["id", "name"]).from("users").and_where(("age", ">", 18)).limit(10, None);
//! assert_eq!(qb.get_sql(), "SELECT `id`, `name` FROM `users` WHERE `age` > ? LIMIT 10");
//! ```

mod select;
mod statement;
pub mod where_builder;

pub use where_builder::WhereBuilder;

use crate::value::Value;
use std::cell::OnceCell;
use std::fmt;

/// The statement a builder is currently producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Raw,
}

/// JOIN flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: String,
    /// ` ON ...` or ` USING(...)`, already rendered.
    constraint: String,
}

/// Fluent builder for SELECT / INSERT / UPDATE / DELETE statements.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    kind: Option<StatementKind>,
    /// Statement text for non-SELECT forms (everything before WHERE).
    statement: String,
    /// Values bound inside `statement` (SET / VALUES / raw).
    statement_values: Vec<Value>,
    table: Option<String>,
    columns: Vec<String>,
    joins: Vec<Join>,
    where_: WhereBuilder,
    group_by: Option<String>,
    having: Option<String>,
    having_values: Vec<Value>,
    order_by: Vec<String>,
    /// `(count, offset)`.
    limit: Option<(u64, Option<u64>)>,
    /// Rendered SQL, filled by `get_sql` and dropped on any mutation.
    compiled: OnceCell<String>,
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return every field to its initial empty state.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// Drop the cached SQL; called by every mutating method.
    fn touch(&mut self) {
        self.compiled = OnceCell::new();
    }

    /// The current statement kind (`None` until a statement call).
    pub fn kind(&self) -> Option<StatementKind> {
        self.kind
    }

    /// Whether the builder renders the SELECT form.
    pub fn is_select(&self) -> bool {
        matches!(self.kind, None | Some(StatementKind::Select))
    }

    /// The formatted target table, if set.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The accumulated WHERE clause, including the leading ` WHERE `.
    pub fn get_where(&self) -> &str {
        self.where_.clause()
    }

    /// Assemble the SQL text from the accumulated fragments.
    ///
    /// SELECT form: `SELECT cols FROM table joins where group having order limit`.
    /// Other forms: `statement where`.
    pub fn get_query(&self) -> String {
        if !self.is_select() {
            let mut sql = String::with_capacity(self.statement.len() + self.where_.clause().len());
            sql.push_str(&self.statement);
            sql.push_str(self.where_.clause());
            return sql;
        }

        let mut sql = String::from("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        if let Some(table) = &self.table {
            sql.push_str(table);
        }
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.as_str());
            sql.push(' ');
            sql.push_str(&join.table);
            sql.push_str(&join.constraint);
        }
        sql.push_str(self.where_.clause());
        if let Some(group) = &self.group_by {
            sql.push_str(group);
        }
        if let Some(having) = &self.having {
            sql.push_str(having);
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        match self.limit {
            Some((count, Some(offset))) => sql.push_str(&format!(" LIMIT {offset}, {count}")),
            Some((count, None)) => sql.push_str(&format!(" LIMIT {count}")),
            None => {}
        }
        sql
    }

    /// Cached [`QueryBuilder::get_query`]; valid until the next mutation or reset.
    pub fn get_sql(&self) -> &str {
        self.compiled.get_or_init(|| self.get_query())
    }

    /// Bound values in placeholder order.
    pub fn get_bind_values(&self) -> Vec<Value> {
        let mut values = Vec::with_capacity(
            self.statement_values.len() + self.where_.values().len() + self.having_values.len(),
        );
        values.extend(self.statement_values.iter().cloned());
        values.extend(self.where_.values().iter().cloned());
        if self.is_select() && self.having.is_some() {
            values.extend(self.having_values.iter().cloned());
        }
        values
    }

    /// The emitted `(sql, values)` pair.
    pub fn build(&self) -> (String, Vec<Value>) {
        (self.get_sql().to_string(), self.get_bind_values())
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get_sql())
    }
}

#[cfg(test)]
mod tests;
