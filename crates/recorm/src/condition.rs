//! WHERE condition primitives.
//!
//! A [`Condition`] normalizes the supported call shapes into a SQL fragment
//! plus the values bound to its `?` placeholders:
//!
//! | shape | example | fragment |
//! |---|---|---|
//! | raw text | `"id != 1"` | `id != 1` |
//! | text + value | `("id != ?", 1)` | `id != ?` |
//! | field, operator, value | `("id", "!=", 1)` | `` `id` != ? `` |
//! | equality mapping | `row! { "a" => 1, "b" => 2 }` | `` `a` = ? AND `b` = ? `` |
//! | tuple list | `vec![c1, c2]` | `c1 AND c2` |
//!
//! Every constructor appends exactly one value per placeholder it emits.
//!
//! # Example
//! ```ignore
//! use recorm::{Condition, Logic, Op};
//!
//! let c = Condition::new("age", Op::Gte(18));
//! assert_eq!(c.build(Logic::And).0, "`age` >= ?");
//! ```

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::row::Row;
use crate::value::Value;

/// Boolean glue between conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }

    /// Parse `"AND"` / `"OR"` (case-insensitive).
    pub fn parse(s: &str) -> OrmResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Logic::And),
            "OR" => Ok(Logic::Or),
            other => Err(OrmError::invalid_argument(format!(
                "expected AND or OR, got `{other}`"
            ))),
        }
    }
}

/// Comparison operator for [`Condition::new`].
///
/// # Example
/// ```ignore
/// use recorm::Op;
///
/// Op::Eq(1);
/// Op::Like("%ann%");
/// Op::<i64>::IsNull;
/// Op::In(vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub enum Op<T> {
    Eq(T),
    Ne(T),
    Gt(T),
    Gte(T),
    Lt(T),
    Lte(T),
    Like(T),
    NotLike(T),
    IsNull,
    IsNotNull,
    In(Vec<T>),
    NotIn(Vec<T>),
}

#[derive(Debug, Clone, PartialEq)]
enum ConditionInner {
    /// Raw SQL text with the values for any `?` it contains.
    Raw { sql: String, values: Vec<Value> },
    /// `` `field` op ? ``
    Compare {
        field: Ident,
        op: String,
        value: Value,
    },
    /// `` `field` IS NULL `` and friends.
    Unary { field: Ident, op: &'static str },
    /// `` `f1` = ? <glue> `f2` = ? ``
    Equals(Vec<(Ident, Value)>),
    /// `` `field` IN (?, ...) ``; an empty list renders as a constant.
    In {
        field: Ident,
        values: Vec<Value>,
        negated: bool,
    },
    /// Conditions joined with the rendering glue.
    List(Vec<Condition>),
}

/// A WHERE/HAVING condition plus its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(ConditionInner);

impl Condition {
    /// Structured comparison over a quoted field.
    pub fn new<T: Into<Value>>(field: &str, op: Op<T>) -> Self {
        let field = Ident::parse(field);
        let (op, value) = match op {
            Op::Eq(v) => ("=", v),
            Op::Ne(v) => ("!=", v),
            Op::Gt(v) => (">", v),
            Op::Gte(v) => (">=", v),
            Op::Lt(v) => ("<", v),
            Op::Lte(v) => ("<=", v),
            Op::Like(v) => ("LIKE", v),
            Op::NotLike(v) => ("NOT LIKE", v),
            Op::IsNull => return Condition(ConditionInner::Unary { field, op: "IS NULL" }),
            Op::IsNotNull => {
                return Condition(ConditionInner::Unary {
                    field,
                    op: "IS NOT NULL",
                });
            }
            Op::In(vals) => return Self::in_values(field, vals, false),
            Op::NotIn(vals) => return Self::in_values(field, vals, true),
        };
        Condition(ConditionInner::Compare {
            field,
            op: op.to_string(),
            value: value.into(),
        })
    }

    fn in_values<T: Into<Value>>(field: Ident, vals: Vec<T>, negated: bool) -> Self {
        Condition(ConditionInner::In {
            field,
            values: vals.into_iter().map(Into::into).collect(),
            negated,
        })
    }

    /// Raw SQL text, no values.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition(ConditionInner::Raw {
            sql: sql.into(),
            values: Vec::new(),
        })
    }

    /// Raw SQL text carrying one `?` and its value.
    pub fn bound(sql: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition(ConditionInner::Raw {
            sql: sql.into(),
            values: vec![value.into()],
        })
    }

    /// Raw SQL text with any number of `?` placeholders.
    pub fn raw_with(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Condition(ConditionInner::Raw {
            sql: sql.into(),
            values,
        })
    }

    /// `` `field` op ? `` with an arbitrary operator text.
    pub fn compare(field: &str, op: &str, value: impl Into<Value>) -> Self {
        Condition(ConditionInner::Compare {
            field: Ident::parse(field),
            op: op.trim().to_string(),
            value: value.into(),
        })
    }

    /// Equality conjunction over every column of `row`.
    pub fn equals(row: Row) -> Self {
        Condition(ConditionInner::Equals(
            row.into_iter().map(|(k, v)| (Ident::parse(&k), v)).collect(),
        ))
    }

    /// `` `field` = ? ``
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::compare(field, "=", value)
    }

    /// `` `field` IN (?, ...) ``
    pub fn in_list<T: Into<Value>>(field: &str, values: Vec<T>) -> Self {
        Self::in_values(Ident::parse(field), values, false)
    }

    /// A list of conditions joined by the rendering glue.
    pub fn list(conditions: Vec<Condition>) -> Self {
        Condition(ConditionInner::List(conditions))
    }

    /// Build a condition from positional arguments (1, 2 or 3 values).
    ///
    /// - `[text]` → raw text
    /// - `[text, value]` → raw text with one bound value
    /// - `[field, operator, value]` → `` `field` operator ? ``
    ///
    /// Any other count, or a non-text value where text is required, fails
    /// with [`OrmError::InvalidArgument`].
    pub fn from_args(args: Vec<Value>) -> OrmResult<Self> {
        let count = args.len();
        let mut args = args.into_iter();
        match (args.next(), args.next(), args.next(), count) {
            (Some(Value::Text(sql)), None, None, 1) => Ok(Self::raw(sql)),
            (Some(Value::Text(sql)), Some(value), None, 2) => Ok(Self::bound(sql, value)),
            (Some(Value::Text(field)), Some(Value::Text(op)), Some(value), 3) => {
                Ok(Self::compare(&field, &op, value))
            }
            (_, _, _, 1..=3) => Err(OrmError::invalid_argument(
                "condition field and operator must be text",
            )),
            _ => Err(OrmError::invalid_argument(format!(
                "condition expects 1 to 3 arguments, got {count}"
            ))),
        }
    }

    /// Build a condition list from positional tuples; each tuple follows
    /// [`Condition::from_args`].
    pub fn from_tuples(tuples: Vec<Vec<Value>>) -> OrmResult<Self> {
        if tuples.is_empty() {
            return Err(OrmError::invalid_argument("empty condition list"));
        }
        tuples
            .into_iter()
            .map(Self::from_args)
            .collect::<OrmResult<Vec<_>>>()
            .map(Self::list)
    }

    /// Whether rendering produces more than one glued term.
    fn is_compound(&self) -> bool {
        match &self.0 {
            ConditionInner::Equals(pairs) => pairs.len() > 1,
            ConditionInner::List(items) => match items.as_slice() {
                [only] => only.is_compound(),
                items => items.len() > 1,
            },
            _ => false,
        }
    }

    /// Number of values this condition binds.
    pub fn value_count(&self) -> usize {
        match &self.0 {
            ConditionInner::Raw { values, .. } => values.len(),
            ConditionInner::Compare { .. } => 1,
            ConditionInner::Unary { .. } => 0,
            ConditionInner::Equals(pairs) => pairs.len(),
            ConditionInner::In { values, .. } => values.len(),
            ConditionInner::List(items) => items.iter().map(Condition::value_count).sum(),
        }
    }

    /// Render the fragment, joining compound parts with `glue`.
    pub fn build(&self, glue: Logic) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut values = Vec::with_capacity(self.value_count());
        self.write(glue, &mut sql, &mut values);
        (sql, values)
    }

    pub(crate) fn write(&self, glue: Logic, sql: &mut String, values: &mut Vec<Value>) {
        match &self.0 {
            ConditionInner::Raw { sql: text, values: vals } => {
                sql.push_str(text);
                values.extend(vals.iter().cloned());
            }
            ConditionInner::Compare { field, op, value } => {
                field.write_sql(sql);
                sql.push(' ');
                sql.push_str(op);
                sql.push_str(" ?");
                values.push(value.clone());
            }
            ConditionInner::Unary { field, op } => {
                field.write_sql(sql);
                sql.push(' ');
                sql.push_str(op);
            }
            ConditionInner::Equals(pairs) => {
                for (i, (field, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        push_glue(sql, glue);
                    }
                    field.write_sql(sql);
                    sql.push_str(" = ?");
                    values.push(value.clone());
                }
            }
            ConditionInner::In {
                field,
                values: vals,
                negated,
            } => {
                if vals.is_empty() {
                    sql.push_str(if *negated { "1=1" } else { "1=0" });
                    return;
                }
                field.write_sql(sql);
                sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for i in 0..vals.len() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    sql.push('?');
                }
                sql.push(')');
                values.extend(vals.iter().cloned());
            }
            ConditionInner::List(items) => {
                let nested = items.len() > 1;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        push_glue(sql, glue);
                    }
                    if nested && item.is_compound() {
                        sql.push('(');
                        item.write(glue, sql, values);
                        sql.push(')');
                    } else {
                        item.write(glue, sql, values);
                    }
                }
            }
        }
    }
}

fn push_glue(sql: &mut String, glue: Logic) {
    sql.push(' ');
    sql.push_str(glue.as_str());
    sql.push(' ');
}

// ==================== Call-shape conversions ====================

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::raw(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::raw(sql)
    }
}

impl<S: Into<String>, V: Into<Value>> From<(S, V)> for Condition {
    fn from((sql, value): (S, V)) -> Self {
        Condition::bound(sql, value)
    }
}

impl<V: Into<Value>> From<(&str, &str, V)> for Condition {
    fn from((field, op, value): (&str, &str, V)) -> Self {
        Condition::compare(field, op, value)
    }
}

impl From<Row> for Condition {
    fn from(row: Row) -> Self {
        Condition::equals(row)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Condition {
    fn from(pairs: [(K, V); N]) -> Self {
        Condition::equals(Row::from(pairs))
    }
}

impl From<Vec<Condition>> for Condition {
    fn from(items: Vec<Condition>) -> Self {
        Condition::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row;

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn raw_text() {
        let (sql, values) = Condition::from("id != 1").build(Logic::And);
        assert_eq!(sql, "id != 1");
        assert!(values.is_empty());
    }

    #[test]
    fn text_and_value() {
        let (sql, values) = Condition::from(("id != ?", 1)).build(Logic::And);
        assert_eq!(sql, "id != ?");
        assert_eq!(values, vec![Value::Int(1)]);
    }

    #[test]
    fn field_operator_value() {
        let (sql, values) = Condition::from(("users.id", "!=", 1)).build(Logic::And);
        assert_eq!(sql, "`users`.`id` != ?");
        assert_eq!(values, vec![Value::Int(1)]);
    }

    #[test]
    fn equality_mapping_uses_glue() {
        let c = Condition::from(row! { "id" => 1, "name" => "a" });
        assert_eq!(c.build(Logic::And).0, "`id` = ? AND `name` = ?");
        assert_eq!(c.build(Logic::Or).0, "`id` = ? OR `name` = ?");
    }

    #[test]
    fn tuple_list_parenthesizes_compound_children() {
        let c = Condition::list(vec![
            Condition::from(row! { "a" => 1, "b" => 2 }),
            Condition::eq("c", 3),
        ]);
        let (sql, values) = c.build(Logic::Or);
        assert_eq!(sql, "(`a` = ? OR `b` = ?) OR `c` = ?");
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn op_variants() {
        assert_eq!(Condition::new("age", Op::Gte(18)).build(Logic::And).0, "`age` >= ?");
        assert_eq!(
            Condition::new::<i64>("deleted_at", Op::IsNull).build(Logic::And),
            ("`deleted_at` IS NULL".to_string(), vec![])
        );
        assert_eq!(
            Condition::new("id", Op::NotIn(vec![1, 2])).build(Logic::And).0,
            "`id` NOT IN (?, ?)"
        );
    }

    #[test]
    fn in_list_and_empty_in() {
        let (sql, values) = Condition::in_list("user_id", vec![1, 2, 3]).build(Logic::And);
        assert_eq!(sql, "`user_id` IN (?, ?, ?)");
        assert_eq!(values.len(), 3);

        let (sql, values) = Condition::in_list::<i64>("user_id", vec![]).build(Logic::And);
        assert_eq!(sql, "1=0");
        assert!(values.is_empty());
    }

    #[test]
    fn from_args_arity() {
        assert!(Condition::from_args(vec!["id = 1".into()]).is_ok());
        assert!(Condition::from_args(vec!["id = ?".into(), 1.into()]).is_ok());
        assert!(Condition::from_args(vec!["id".into(), "=".into(), 1.into()]).is_ok());

        let err = Condition::from_args(vec!["id".into(), "=".into(), 1.into(), 2.into()])
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(Condition::from_args(vec![]).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn from_args_rejects_non_text_field() {
        let err = Condition::from_args(vec![1.into(), "=".into(), 1.into()]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn from_tuples_joins_and_validates() {
        let c = Condition::from_tuples(vec![
            vec!["a = 1".into()],
            vec!["b = ?".into(), 2.into()],
            vec!["c".into(), ">".into(), 3.into()],
        ])
        .unwrap();
        let (sql, values) = c.build(Logic::And);
        assert_eq!(sql, "a = 1 AND b = ? AND `c` > ?");
        assert_eq!(values, vec![Value::Int(2), Value::Int(3)]);

        let err = Condition::from_tuples(vec![vec![
            "a".into(),
            "=".into(),
            1.into(),
            2.into(),
        ]])
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn placeholder_count_matches_values_for_every_shape() {
        let shapes: Vec<Condition> = vec![
            "x = 1".into(),
            ("x = ?", 1).into(),
            ("x", "<", 2).into(),
            row! { "a" => 1, "b" => 2, "c" => 3 }.into(),
            Condition::in_list("k", vec![1, 2]),
            Condition::from_tuples(vec![
                vec!["p = ?".into(), 1.into()],
                vec!["q".into(), "=".into(), 2.into()],
            ])
            .unwrap(),
        ];
        for c in shapes {
            for glue in [Logic::And, Logic::Or] {
                let (sql, values) = c.build(glue);
                assert_eq!(placeholders(&sql), values.len(), "{sql}");
                assert_eq!(c.value_count(), values.len());
            }
        }
    }

    #[test]
    fn logic_parse() {
        assert_eq!(Logic::parse(" or ").unwrap(), Logic::Or);
        assert!(Logic::parse("XOR").unwrap_err().is_invalid_argument());
    }
}
