//! Entity declarations: table, key, fields, relations and policies.
//!
//! Each entity type describes itself once through [`Entity::schema`]; the
//! default methods on [`Entity`] are the finders and bulk statements.
//!
//! # Example
//! ```ignore
//! struct User;
//!
//! impl Entity for User {
//!     fn schema() -> Schema {
//!         Schema::new("users")
//!             .fields(&["id", "name", "email"])
//!             .has_many("posts", Post::schema, "user_id", "id")
//!     }
//! }
//!
//! let user = User::find(&mut db, 1)?;
//! let admins = User::select().filter(("role", "=", "admin")).with(&["posts"]).all(&mut db)?;
//! ```

use crate::builder::QueryBuilder;
use crate::condition::Condition;
use crate::database::Database;
use crate::error::OrmResult;
use crate::events::{Event, EventHandler, EventHandlers};
use crate::finder::Finder;
use crate::record::Record;
use crate::row::Row;
use crate::value::Value;
use std::rc::Rc;

/// Produces the schema of a related entity.
pub type SchemaFn = fn() -> Schema;

/// What `delete()` does to a persisted record.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DeletePolicy {
    /// Remove the row.
    #[default]
    Hard,
    /// Apply these fields with an UPDATE instead of removing the row.
    Soft(Row),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    HasOne,
    HasMany,
}

/// A declared association to another entity.
///
/// `foreign_key` is the column on the related table; `owner_key` is the
/// column on the owning record whose value it must equal.
#[derive(Debug, Clone)]
pub struct RelationDef {
    pub(crate) name: String,
    pub(crate) kind: RelationKind,
    pub(crate) related: SchemaFn,
    pub(crate) foreign_key: String,
    pub(crate) owner_key: String,
    pub(crate) query: Option<QueryBuilder>,
    pub(crate) with: Vec<String>,
}

impl RelationDef {
    pub fn has_one(name: &str, related: SchemaFn, foreign_key: &str, owner_key: &str) -> Self {
        Self::new(RelationKind::HasOne, name, related, foreign_key, owner_key)
    }

    pub fn has_many(name: &str, related: SchemaFn, foreign_key: &str, owner_key: &str) -> Self {
        Self::new(RelationKind::HasMany, name, related, foreign_key, owner_key)
    }

    fn new(kind: RelationKind, name: &str, related: SchemaFn, foreign_key: &str, owner_key: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            related,
            foreign_key: foreign_key.to_string(),
            owner_key: owner_key.to_string(),
            query: None,
            with: Vec::new(),
        }
    }

    /// Base query the relation condition is added to (ordering, filters).
    pub fn query(mut self, query: QueryBuilder) -> Self {
        self.query = Some(query);
        self
    }

    /// Relations of the related entity to eager-load alongside.
    pub fn with<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.with.extend(names.iter().map(|n| n.as_ref().to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    pub fn owner_key(&self) -> &str {
        &self.owner_key
    }

    /// A finder over the related entity with the base query and nested
    /// eager-load names applied.
    ///
    /// The base WHERE clause is grouped so the key condition added by the
    /// caller constrains every branch of it.
    pub(crate) fn finder(&self) -> Finder {
        let mut query = self.query.clone().unwrap_or_default();
        query.wrap_where();
        Finder::with_query((self.related)(), query).with(&self.with)
    }
}

/// How an entity maps to its table.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) table: String,
    pub(crate) unique_key: String,
    pub(crate) fields: Vec<String>,
    pub(crate) skip_insert: Vec<String>,
    pub(crate) skip_update: Option<Vec<String>>,
    pub(crate) delete_policy: DeletePolicy,
    pub(crate) relations: Vec<RelationDef>,
    pub(crate) with: Vec<String>,
    pub(crate) handlers: EventHandlers,
    pub(crate) trigger_events: bool,
}

impl Schema {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            unique_key: "id".to_string(),
            fields: Vec::new(),
            skip_insert: Vec::new(),
            skip_update: None,
            delete_policy: DeletePolicy::Hard,
            relations: Vec::new(),
            with: Vec::new(),
            handlers: EventHandlers::default(),
            trigger_events: false,
        }
    }

    pub fn unique_key(mut self, key: &str) -> Self {
        self.unique_key = key.to_string();
        self
    }

    /// Declare the persisted fields. Without a declaration every assigned
    /// attribute is persisted.
    pub fn fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    pub fn skip_insert_on<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.skip_insert = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Fields never sent by an UPDATE; defaults to the unique key.
    pub fn skip_update_on<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.skip_update = Some(fields.iter().map(|f| f.as_ref().to_string()).collect());
        self
    }

    pub fn delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Shorthand for `DeletePolicy::Soft(fields)`.
    pub fn soft_delete(self, fields: Row) -> Self {
        self.delete_policy(DeletePolicy::Soft(fields))
    }

    pub fn relation(mut self, def: RelationDef) -> Self {
        self.relations.retain(|r| r.name != def.name);
        self.relations.push(def);
        self
    }

    pub fn has_one(self, name: &str, related: SchemaFn, foreign_key: &str, owner_key: &str) -> Self {
        self.relation(RelationDef::has_one(name, related, foreign_key, owner_key))
    }

    pub fn has_many(self, name: &str, related: SchemaFn, foreign_key: &str, owner_key: &str) -> Self {
        self.relation(RelationDef::has_many(name, related, foreign_key, owner_key))
    }

    /// Relations eager-loaded by every finder of this entity.
    pub fn with<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.with.extend(names.iter().map(|n| n.as_ref().to_string()));
        self
    }

    /// Default handler for new records of this entity.
    pub fn on(mut self, event: Event, handler: EventHandler) -> Self {
        self.handlers.set(event, handler);
        self
    }

    /// Whether new records fire their event handlers.
    pub fn trigger_events(mut self, enabled: bool) -> Self {
        self.trigger_events = enabled;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key(&self) -> &str {
        &self.unique_key
    }

    pub fn declared_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn policy(&self) -> &DeletePolicy {
        &self.delete_policy
    }

    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }

    pub fn find_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub(crate) fn skips_insert(&self, field: &str) -> bool {
        self.skip_insert.iter().any(|f| f == field)
    }

    pub(crate) fn skips_update(&self, field: &str) -> bool {
        match &self.skip_update {
            Some(fields) => fields.iter().any(|f| f == field),
            None => field == self.unique_key,
        }
    }
}

/// A type with a table mapping; the default methods are its finders.
pub trait Entity {
    fn schema() -> Schema;

    /// A new transient record.
    fn create() -> Record {
        Record::new(Self::schema())
    }

    /// Hydrate a record from a result row.
    fn load(row: Row) -> Record {
        Record::load_from_row(Rc::new(Self::schema()), row)
    }

    /// A finder selecting every column of the table.
    fn select() -> Finder {
        Finder::new(Self::schema())
    }

    /// A finder over a prebuilt query.
    fn select_with(query: QueryBuilder) -> Finder {
        Finder::with_query(Self::schema(), query)
    }

    /// The record whose unique key equals `id`.
    fn find(db: &mut Database, id: impl Into<Value>) -> OrmResult<Option<Record>> {
        let schema = Self::schema();
        let key = schema.unique_key.clone();
        Finder::new(schema).filter(Condition::eq(&key, id)).one(db)
    }

    /// The first record matched by a prebuilt query.
    fn find_by(db: &mut Database, query: QueryBuilder) -> OrmResult<Option<Record>> {
        Self::select_with(query).one(db)
    }

    /// Every record matched by `query`, or the whole table.
    fn find_all(db: &mut Database, query: Option<QueryBuilder>) -> OrmResult<Vec<Record>> {
        Self::select_with(query.unwrap_or_default()).all(db)
    }

    fn all(db: &mut Database) -> OrmResult<Vec<Record>> {
        Self::find_all(db, None)
    }

    /// `UPDATE table [join] SET ... [WHERE ...]` over many rows.
    fn update_all(db: &mut Database, fields: Row, condition: Option<Condition>, join: Option<&str>) -> bool {
        let table = Self::schema().table;
        db.query_mut().update_with(&table, fields, condition, join);
        db.execute()
    }

    /// `DELETE FROM table [WHERE ...]` over many rows.
    fn delete_all(db: &mut Database, condition: Option<Condition>) -> bool {
        let table = Self::schema().table;
        db.query_mut().delete_with(&table, condition);
        db.execute()
    }
}
