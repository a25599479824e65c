use super::{Join, JoinKind, QueryBuilder, StatementKind};
use crate::condition::{Condition, Logic};
use crate::ident::{Ident, quote, quote_list};
use crate::value::Value;

impl QueryBuilder {
    // ==================== Columns ====================

    /// Start a SELECT over `columns`; an empty list selects `*`.
    pub fn select<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
        self.reset();
        self.kind = Some(StatementKind::Select);
        self.columns = columns
            .iter()
            .map(|c| quote(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Start a `SELECT *`.
    ///
    /// With `reset = false` the existing table, joins and conditions are kept,
    /// which lets a prebuilt query be turned into a full-row select.
    pub fn select_all(&mut self, reset: bool) -> &mut Self {
        if reset {
            self.reset();
        }
        self.touch();
        self.kind = Some(StatementKind::Select);
        self.columns.clear();
        self
    }

    /// Append `column AS alias` pairs to the column list.
    pub fn select_as(&mut self, pairs: &[(&str, &str)]) -> &mut Self {
        self.touch();
        self.kind.get_or_insert(StatementKind::Select);
        for (column, alias) in pairs {
            self.columns
                .push(Ident::parse(column).with_alias(*alias).to_sql());
        }
        self
    }

    /// Append an unquoted column expression such as `COUNT(*) AS total`.
    pub fn select_raw(&mut self, expr: &str) -> &mut Self {
        self.touch();
        self.kind.get_or_insert(StatementKind::Select);
        self.columns.push(expr.trim().to_string());
        self
    }

    /// Set the target table; `"users u"` renders as `` `users` AS u ``.
    pub fn from(&mut self, table: &str) -> &mut Self {
        self.touch();
        self.table = Some(quote(table));
        self
    }

    // ==================== Joins ====================

    fn join(&mut self, kind: JoinKind, table: &str, on: Option<&str>) -> &mut Self {
        self.touch();
        let constraint = match on {
            Some(cond) if !cond.trim().is_empty() => format!(" ON {}", cond.trim()),
            _ => String::new(),
        };
        self.joins.push(Join {
            kind,
            table: quote(table),
            constraint,
        });
        self
    }

    /// Append `INNER JOIN table [ON cond]`.
    pub fn inner_join(&mut self, table: &str, on: Option<&str>) -> &mut Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Append `LEFT JOIN table [ON cond]`.
    pub fn left_join(&mut self, table: &str, on: Option<&str>) -> &mut Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Append `RIGHT JOIN table [ON cond]`.
    pub fn right_join(&mut self, table: &str, on: Option<&str>) -> &mut Self {
        self.join(JoinKind::Right, table, on)
    }

    /// Append `CROSS JOIN table [ON cond]`.
    pub fn cross_join(&mut self, table: &str, on: Option<&str>) -> &mut Self {
        self.join(JoinKind::Cross, table, on)
    }

    /// Attach a raw `ON condition` to the most recent join.
    pub fn on(&mut self, condition: &str) -> &mut Self {
        self.touch();
        if let Some(join) = self.joins.last_mut() {
            join.constraint.push_str(" ON ");
            join.constraint.push_str(condition.trim());
        }
        self
    }

    /// Attach `USING(`field`)` to the most recent join.
    pub fn using(&mut self, field: &str) -> &mut Self {
        self.touch();
        if let Some(join) = self.joins.last_mut() {
            join.constraint.push_str(" USING(");
            join.constraint.push_str(&quote(field));
            join.constraint.push(')');
        }
        self
    }

    // ==================== Grouping / ordering ====================

    /// Set `GROUP BY (`a`, `b`)`.
    pub fn group_by<S: AsRef<str>>(&mut self, fields: &[S]) -> &mut Self {
        self.touch();
        self.group_by = Some(format!(" GROUP BY ({})", quote_list(fields)));
        self
    }

    /// Set `HAVING condition`, binding `values` to its placeholders.
    pub fn having(&mut self, condition: &str, values: Vec<Value>) -> &mut Self {
        self.touch();
        self.having = Some(format!(" HAVING {}", condition.trim()));
        self.having_values = values;
        self
    }

    /// Set `HAVING` from a structured condition.
    pub fn having_condition(&mut self, condition: impl Into<Condition>) -> &mut Self {
        let (sql, values) = condition.into().build(Logic::And);
        self.having(&sql, values)
    }

    /// Append `field ASC|DESC` to the ORDER BY list.
    ///
    /// The direction is case-insensitive. An empty field or a direction other
    /// than ASC/DESC leaves the builder unchanged.
    pub fn order_by(&mut self, field: &str, direction: &str) -> &mut Self {
        let field = field.trim();
        let direction = direction.trim().to_ascii_uppercase();
        if field.is_empty() || !matches!(direction.as_str(), "ASC" | "DESC") {
            tracing::debug!(
                target: "recorm.builder",
                field,
                direction = direction.as_str(),
                "ignoring order_by with empty field or invalid direction"
            );
            return self;
        }
        self.touch();
        self.order_by.push(format!("{field} {direction}"));
        self
    }

    /// Set `LIMIT count` or `LIMIT offset, count`.
    pub fn limit(&mut self, count: u64, offset: Option<u64>) -> &mut Self {
        self.touch();
        self.limit = Some((count, offset));
        self
    }

    /// Cap the row count at one, keeping any offset already set.
    pub(crate) fn limit_one(&mut self) -> &mut Self {
        let (count, offset) = self.limit.unwrap_or((1, None));
        self.limit(count.min(1), offset)
    }
}
