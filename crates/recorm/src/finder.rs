//! Record finders and batched eager loading.
//!
//! Eager loading runs exactly one extra query per relation name, however
//! many owners were loaded: the distinct owner key values are collected,
//! the related rows are fetched with `` `foreign_key` IN (?, ...) ``, and
//! the results are distributed back by matching keys.

use crate::builder::QueryBuilder;
use crate::condition::Condition;
use crate::database::Database;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::relation::Related;
use crate::schema::{RelationKind, Schema};
use crate::value::Value;
use std::rc::Rc;

/// A query over one entity, plus the relations to eager-load with it.
#[derive(Debug, Clone)]
pub struct Finder {
    schema: Rc<Schema>,
    query: QueryBuilder,
    with: Vec<String>,
}

impl Finder {
    pub fn new(schema: impl Into<Rc<Schema>>) -> Self {
        Self::with_query(schema, QueryBuilder::new())
    }

    /// A finder over a prebuilt query; the schema's default eager-load
    /// names apply.
    pub fn with_query(schema: impl Into<Rc<Schema>>, query: QueryBuilder) -> Self {
        let schema = schema.into();
        let with = schema.with.clone();
        Self {
            schema,
            query,
            with,
        }
    }

    /// Eager-load these relations with every result.
    pub fn with<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        for name in names {
            let name = name.as_ref();
            if !self.with.iter().any(|w| w == name) {
                self.with.push(name.to_string());
            }
        }
        self
    }

    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.query.and_where(condition);
        self
    }

    pub fn or_filter(mut self, condition: impl Into<Condition>) -> Self {
        self.query.or_where(condition);
        self
    }

    pub fn order_by(mut self, field: &str, direction: &str) -> Self {
        self.query.order_by(field, direction);
        self
    }

    pub fn limit(mut self, count: u64, offset: Option<u64>) -> Self {
        self.query.limit(count, offset);
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn with_names(&self) -> &[String] {
        &self.with
    }

    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryBuilder {
        &mut self.query
    }

    /// The SELECT sent to the database: every column of the entity table.
    ///
    /// A query that already names a table (with an alias or joins) keeps it.
    pub fn statement(&self) -> QueryBuilder {
        let mut query = self.query.clone();
        query.select_all(false);
        if query.table().is_none() {
            query.from(&self.schema.table);
        }
        query
    }

    fn check_with(&self) -> OrmResult<()> {
        match self.with.iter().find(|n| self.schema.find_relation(n).is_none()) {
            Some(name) => Err(OrmError::unknown_operation(name, &self.schema.table)),
            None => Ok(()),
        }
    }

    /// The first matching record, or `None`.
    pub fn one(&self, db: &mut Database) -> OrmResult<Option<Record>> {
        self.check_with()?;
        db.set_query(self.statement());
        let Some(row) = db.get_one() else {
            return Ok(None);
        };
        let mut record = Record::load_from_row(self.schema.clone(), row);
        record.set_loaded(true);
        eager_load(db, &self.schema, std::slice::from_mut(&mut record), &self.with)?;
        Ok(Some(record))
    }

    /// Every matching record.
    pub fn all(&self, db: &mut Database) -> OrmResult<Vec<Record>> {
        self.check_with()?;
        db.set_query(self.statement());
        let mut records: Vec<Record> = db
            .get_all()
            .into_iter()
            .map(|row| {
                let mut record = Record::load_from_row(self.schema.clone(), row);
                record.set_loaded(true);
                record
            })
            .collect();
        eager_load(db, &self.schema, &mut records, &self.with)?;
        Ok(records)
    }
}

/// Key equality across driver representations (`1` vs `"1"`).
fn same_key(a: &Value, b: &Value) -> bool {
    a == b || a.to_string() == b.to_string()
}

/// Resolve `names` for every record with one query per relation.
pub fn eager_load(
    db: &mut Database,
    schema: &Schema,
    records: &mut [Record],
    names: &[String],
) -> OrmResult<()> {
    if records.is_empty() {
        return Ok(());
    }

    for name in names {
        let def = schema
            .find_relation(name)
            .ok_or_else(|| OrmError::unknown_operation(name, &schema.table))?;

        let mut keys: Vec<Value> = Vec::new();
        for record in records.iter() {
            if let Some(key) = record.get(&def.owner_key) {
                if !key.is_empty() && !keys.iter().any(|k| same_key(k, key)) {
                    keys.push(key.clone());
                }
            }
        }

        let related = if keys.is_empty() {
            Vec::new()
        } else {
            def.finder()
                .filter(Condition::in_list(&def.foreign_key, keys))
                .all(db)?
        };
        tracing::debug!(
            target: "recorm.eager",
            table = %schema.table,
            relation = %name,
            owners = records.len(),
            related = related.len(),
            "eager loaded relation"
        );

        for record in records.iter_mut() {
            let owner = record.get(&def.owner_key).cloned().unwrap_or_default();
            let mut matches = related.iter().filter(|r| {
                !owner.is_empty()
                    && r.get(&def.foreign_key).is_some_and(|fk| same_key(fk, &owner))
            });
            let resolved = match def.kind {
                RelationKind::HasOne => Related::One(matches.next().cloned().map(Box::new)),
                RelationKind::HasMany => Related::Many(matches.cloned().collect()),
            };
            record.set_related(name, resolved)?;
        }
    }
    Ok(())
}
