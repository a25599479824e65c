use super::{QueryBuilder, StatementKind};
use crate::condition::{Condition, Logic};
use crate::ident::{Ident, quote};
use crate::row::Row;
use crate::value::Value;

impl QueryBuilder {
    // ==================== Write statements ====================

    /// Start an INSERT.
    ///
    /// Plain `fields` become `?` placeholders bound in field order.
    /// `function_fields` are `(column, expression)` pairs embedded raw after
    /// the plain fields, each wrapped in parentheses; they never bind values.
    ///
    /// ```ignore
    /// qb.insert("users", row! { "name" => "a" }, &[("created", "CURDATE()")]);
    /// // INSERT INTO `users` (`name`, `created`) VALUES (?, (CURDATE()))
    /// ```
    pub fn insert(&mut self, table: &str, fields: Row, function_fields: &[(&str, &str)]) -> &mut Self {
        self.reset();
        self.kind = Some(StatementKind::Insert);

        let mut columns = Vec::with_capacity(fields.len() + function_fields.len());
        let mut placeholders = Vec::with_capacity(columns.capacity());
        for (column, value) in fields {
            columns.push(quote(&column));
            placeholders.push("?".to_string());
            self.statement_values.push(value);
        }
        for (column, expr) in function_fields {
            columns.push(quote(column));
            placeholders.push(format!("({expr})"));
        }

        self.table = Some(quote(table));
        self.statement = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table),
            columns.join(", "),
            placeholders.join(", ")
        );
        self
    }

    /// Start an `UPDATE table SET ...`; add conditions with the where family.
    pub fn update(&mut self, table: &str, fields: Row) -> &mut Self {
        self.update_with(table, fields, None, None)
    }

    /// Start an UPDATE with an optional condition and raw join clause.
    ///
    /// The join text sits between the table and `SET`; without one the
    /// statement reads `` UPDATE `t`  SET ... `` (two spaces).
    pub fn update_with(
        &mut self,
        table: &str,
        fields: Row,
        condition: Option<Condition>,
        join: Option<&str>,
    ) -> &mut Self {
        self.reset();
        self.kind = Some(StatementKind::Update);

        let mut set = String::new();
        for (i, (column, value)) in fields.into_iter().enumerate() {
            if i > 0 {
                set.push_str(", ");
            }
            Ident::parse(&column).write_sql(&mut set);
            set.push_str(" = ?");
            self.statement_values.push(value);
        }

        self.table = Some(quote(table));
        self.statement = format!(
            "UPDATE {} {} SET {}",
            quote(table),
            join.map(str::trim).unwrap_or_default(),
            set
        );
        if let Some(condition) = condition {
            self.where_.push(Logic::And, &condition);
        }
        self
    }

    /// Start a `DELETE FROM table`; add conditions with the where family.
    pub fn delete(&mut self, table: &str) -> &mut Self {
        self.delete_with(table, None)
    }

    /// Start a DELETE with an optional condition.
    pub fn delete_with(&mut self, table: &str, condition: Option<Condition>) -> &mut Self {
        self.reset();
        self.kind = Some(StatementKind::Delete);
        self.table = Some(quote(table));
        self.statement = format!("DELETE FROM {}", quote(table));
        if let Some(condition) = condition {
            self.where_.push(Logic::And, &condition);
        }
        self
    }

    /// Replace the statement with verbatim SQL and its values.
    pub fn raw(&mut self, sql: &str, values: Vec<Value>) -> &mut Self {
        self.reset();
        self.kind = Some(StatementKind::Raw);
        self.statement = sql.to_string();
        self.statement_values = values;
        self
    }

    // ==================== Conditions ====================

    /// Add a condition joined with `AND`.
    pub fn and_where(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.add_where(Logic::And, condition)
    }

    /// Add a condition joined with `OR`.
    pub fn or_where(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.add_where(Logic::Or, condition)
    }

    /// Add a condition joined with `glue`.
    pub fn add_where(&mut self, glue: Logic, condition: impl Into<Condition>) -> &mut Self {
        self.touch();
        self.where_.push(glue, &condition.into());
        self
    }

    /// Add `(c1 <inner> c2 ...)` joined to the clause with `outer`.
    pub fn where_group(&mut self, outer: Logic, inner: Logic, conditions: Vec<Condition>) -> &mut Self {
        self.touch();
        self.where_.push_group(outer, inner, &conditions);
        self
    }

    /// Parenthesize the existing WHERE clause so later conditions apply to
    /// all of it.
    pub(crate) fn wrap_where(&mut self) -> &mut Self {
        self.touch();
        self.where_.wrap();
        self
    }

    /// `AND (c1 <inner> c2 ...)`
    pub fn and_where_group(&mut self, inner: Logic, conditions: Vec<Condition>) -> &mut Self {
        self.where_group(Logic::And, inner, conditions)
    }

    /// `OR (c1 <inner> c2 ...)`
    pub fn or_where_group(&mut self, inner: Logic, conditions: Vec<Condition>) -> &mut Self {
        self.where_group(Logic::Or, inner, conditions)
    }
}
