//! HasOne / HasMany relation resolution.

use crate::condition::Condition;
use crate::database::Database;
use crate::error::OrmResult;
use crate::record::Record;
use crate::schema::{RelationDef, RelationKind};
use crate::value::Value;
use serde::{Serialize, Serializer};

/// The resolved side of a relation.
#[derive(Debug, Clone)]
pub enum Related {
    One(Option<Box<Record>>),
    Many(Vec<Record>),
}

impl Related {
    pub(crate) fn empty(kind: RelationKind) -> Self {
        match kind {
            RelationKind::HasOne => Related::One(None),
            RelationKind::HasMany => Related::Many(Vec::new()),
        }
    }

    pub fn as_one(&self) -> Option<&Record> {
        match self {
            Related::One(record) => record.as_deref(),
            Related::Many(records) => records.first(),
        }
    }

    pub fn as_many(&self) -> &[Record] {
        match self {
            Related::One(Some(record)) => std::slice::from_ref(&**record),
            Related::One(None) => &[],
            Related::Many(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        self.as_many().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_many().is_empty()
    }
}

impl Serialize for Related {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Related::One(record) => record.serialize(serializer),
            Related::Many(records) => records.serialize(serializer),
        }
    }
}

/// A relation bound to one owner key value, with its cached result.
#[derive(Debug, Clone)]
pub struct Relation {
    def: RelationDef,
    owner_value: Value,
    cached: Option<Related>,
}

impl Relation {
    pub fn new(def: RelationDef, owner_value: Value) -> Self {
        Self {
            def,
            owner_value,
            cached: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &RelationDef {
        &self.def
    }

    pub fn owner_value(&self) -> &Value {
        &self.owner_value
    }

    /// Rebind to a new owner key value; a changed value drops the cache.
    pub(crate) fn set_owner(&mut self, value: Value) {
        if self.owner_value != value {
            self.owner_value = value;
            self.cached = None;
        }
    }

    /// Query the related records: `` `foreign_key` = ? `` on the base query.
    ///
    /// An owner without a key value resolves to nothing without a query.
    pub fn handle(&self, db: &mut Database) -> OrmResult<Related> {
        if self.owner_value.is_empty() {
            return Ok(Related::empty(self.def.kind));
        }
        let finder = self
            .def
            .finder()
            .filter(Condition::eq(&self.def.foreign_key, self.owner_value.clone()));
        Ok(match self.def.kind {
            RelationKind::HasOne => Related::One(finder.one(db)?.map(Box::new)),
            RelationKind::HasMany => Related::Many(finder.all(db)?),
        })
    }

    /// The cached result, querying when unset or when `force_reload`.
    pub fn resolve(&mut self, db: &mut Database, force_reload: bool) -> OrmResult<&Related> {
        let related = match self.cached.take() {
            Some(cached) if !force_reload => cached,
            _ => self.handle(db)?,
        };
        Ok(self.cached.insert(related))
    }

    /// Forget the cached result.
    pub fn reload(&mut self) {
        self.cached = None;
    }

    pub fn cached(&self) -> Option<&Related> {
        self.cached.as_ref()
    }

    pub(crate) fn set_cached(&mut self, related: Related) {
        self.cached = Some(related);
    }
}
