//! WHERE clause accumulator shared by every statement kind.

use crate::condition::{Condition, Logic};
use crate::value::Value;

/// Accumulated WHERE text and the values bound inside it.
///
/// The first condition seeds ` WHERE `; later ones are joined with
/// ` AND ` / ` OR ` depending on the call.
#[derive(Debug, Clone, Default)]
pub struct WhereBuilder {
    clause: String,
    values: Vec<Value>,
}

impl WhereBuilder {
    /// Check if any conditions have been added.
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// The clause text, including the leading ` WHERE `.
    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    fn open(&mut self, glue: Logic) {
        if self.clause.is_empty() {
            self.clause.push_str(" WHERE ");
        } else {
            self.clause.push(' ');
            self.clause.push_str(glue.as_str());
            self.clause.push(' ');
        }
    }

    /// Append a condition, joined to any existing one with `glue`.
    ///
    /// Compound conditions (mappings and lists) join their own parts with
    /// the same glue.
    pub fn push(&mut self, glue: Logic, condition: &Condition) {
        self.open(glue);
        condition.write(glue, &mut self.clause, &mut self.values);
    }

    /// Append `(c1 <inner> c2 ...)` joined to the existing clause with `outer`.
    pub fn push_group(&mut self, outer: Logic, inner: Logic, conditions: &[Condition]) {
        if conditions.is_empty() {
            return;
        }
        self.open(outer);
        self.clause.push('(');
        for (i, c) in conditions.iter().enumerate() {
            if i > 0 {
                self.clause.push(' ');
                self.clause.push_str(inner.as_str());
                self.clause.push(' ');
            }
            c.write(inner, &mut self.clause, &mut self.values);
        }
        self.clause.push(')');
    }

    /// Parenthesize the accumulated clause: ` WHERE x` becomes ` WHERE (x)`.
    ///
    /// Conditions appended afterwards bind against the whole group.
    pub(crate) fn wrap(&mut self) {
        if let Some(body) = self.clause.strip_prefix(" WHERE ") {
            self.clause = format!(" WHERE ({body})");
        }
    }
}
