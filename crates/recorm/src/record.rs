//! Active records: attributes, dirty tracking and persistence.

use crate::condition::Condition;
use crate::database::Database;
use crate::error::{OrmError, OrmResult};
use crate::events::{Event, EventHandler, EventHandlers};
use crate::relation::{Related, Relation};
use crate::row::{FromRow, Row, RowExt};
use crate::schema::{DeletePolicy, Schema};
use crate::value::{FromValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::rc::Rc;

/// One entity instance: a persisted row or a transient, unsaved one.
///
/// `original` is the snapshot of what the store holds; it changes only after
/// a successful load, save or soft delete. Store failures during `save` and
/// `delete` come back as `Ok(false)` with the cause on
/// [`Database::last_error`].
#[derive(Debug, Clone)]
pub struct Record {
    schema: Rc<Schema>,
    attributes: Row,
    original: Row,
    relations: Vec<Relation>,
    loaded: bool,
    trigger_events: bool,
    handlers: EventHandlers,
}

impl Record {
    /// A transient record.
    pub fn new(schema: impl Into<Rc<Schema>>) -> Self {
        let schema = schema.into();
        Self {
            attributes: Row::new(),
            original: Row::new(),
            relations: Vec::new(),
            loaded: false,
            trigger_events: schema.trigger_events,
            handlers: schema.handlers.clone(),
            schema,
        }
    }

    /// Hydrate a record: assign every column, snapshot, fire `after_load`.
    pub fn load_from_row(schema: impl Into<Rc<Schema>>, row: Row) -> Self {
        let mut record = Self::new(schema);
        record.trigger_event(Event::BeforeLoad);
        record.attributes = row;
        record.original = record.to_row();
        record.trigger_event(Event::AfterLoad);
        record
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.schema.table
    }

    // ==================== Attributes ====================

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Typed attribute access; a missing attribute reads as NULL.
    pub fn get_as<T: FromValue>(&self, field: &str) -> OrmResult<T> {
        self.attributes.try_get_column(field)
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.attributes.insert(field, value);
        self
    }

    pub fn set_values(&mut self, values: Row) -> &mut Self {
        self.attributes.merge(&values);
        self
    }

    pub fn attributes(&self) -> &Row {
        &self.attributes
    }

    /// The persisted field map: declared fields (missing ones as NULL), or
    /// every attribute when the schema declares none.
    pub fn to_row(&self) -> Row {
        if self.schema.fields.is_empty() {
            return self.attributes.clone();
        }
        self.schema
            .fields
            .iter()
            .map(|f| (f.as_str(), self.attributes.get(f).cloned().unwrap_or_default()))
            .collect()
    }

    pub fn values(&self) -> Row {
        self.to_row()
    }

    /// Snapshot of the last loaded or saved state.
    pub fn original(&self) -> &Row {
        &self.original
    }

    /// Map the attributes onto a typed struct.
    pub fn to_entity<T: FromRow>(&self) -> OrmResult<T> {
        T::from_row(&self.attributes)
    }

    /// The unique key column and its current value.
    pub fn unique_id(&self) -> (&str, Value) {
        let key = self.schema.unique_key.as_str();
        (key, self.attributes.get(key).cloned().unwrap_or_default())
    }

    /// The key value of the stored row: the snapshot's when it has one,
    /// else the current attribute.
    fn stored_id(&self) -> Value {
        let key = self.schema.unique_key.as_str();
        match self.original.get(key) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => self.unique_id().1,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Fields whose value differs from the snapshot.
    pub fn dirty_fields(&self) -> Row {
        self.to_row()
            .into_iter()
            .filter(|(field, value)| self.original.get(field) != Some(value))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_fields().is_empty()
    }

    /// Drop the fields the schema never sends in an UPDATE.
    pub fn filter_update_fields(&self, fields: Row) -> Row {
        fields
            .into_iter()
            .filter(|(field, _)| !self.schema.skips_update(field))
            .collect()
    }

    // ==================== Events ====================

    pub fn set_trigger_events(&mut self, enabled: bool) {
        self.trigger_events = enabled;
    }

    pub fn is_trigger_events(&self) -> bool {
        self.trigger_events
    }

    /// Register the handler for `event`, replacing any earlier one.
    pub fn on(&mut self, event: Event, handler: EventHandler) -> &mut Self {
        self.handlers.set(event, handler);
        self
    }

    pub fn event_handler(&self, event: Event) -> Option<&EventHandler> {
        self.handlers.get(event)
    }

    /// Run the handler for `event` if events are enabled on this record.
    pub fn trigger_event(&mut self, event: Event) {
        if !self.trigger_events {
            return;
        }
        let Some(handler) = self.handlers.get(event).cloned() else {
            return;
        };
        tracing::trace!(target: "recorm.record", table = %self.schema.table, event = %event, "event");
        handler.dispatch(self);
    }

    // ==================== Persistence ====================

    /// Insert or dirty-update the record.
    pub fn save(&mut self, db: &mut Database) -> OrmResult<bool> {
        self.save_with(db, true)
    }

    /// Insert when the unique key is empty; otherwise update the changed
    /// fields (`dirty_update`) or every field.
    ///
    /// Updates and deletes target the row the record was loaded or saved
    /// as, even if the key attribute has since been changed.
    ///
    /// The payload is computed after the `before_*` handlers run, so they
    /// may adjust attributes.
    pub fn save_with(&mut self, db: &mut Database, dirty_update: bool) -> OrmResult<bool> {
        let (key, value) = self.unique_id();
        let key = key.to_string();
        if value.is_empty() {
            return self.insert(db, &key);
        }
        if dirty_update && !self.is_dirty() {
            return Ok(true);
        }
        self.update(db, &key, dirty_update)
    }

    fn insert(&mut self, db: &mut Database, key: &str) -> OrmResult<bool> {
        self.trigger_event(Event::BeforeSave);
        self.trigger_event(Event::BeforeInsert);

        let fields: Row = self
            .to_row()
            .into_iter()
            .filter(|(field, value)| {
                !self.schema.skips_insert(field) && !(field == key && value.is_empty())
            })
            .collect();
        db.query_mut().insert(&self.schema.table, fields, &[]);
        if !db.execute() {
            return Ok(false);
        }

        let id = db.insert_id()?;
        self.attributes.insert(key, id);
        self.original = self.to_row();
        self.trigger_event(Event::AfterInsert);
        self.trigger_event(Event::AfterSave);
        Ok(true)
    }

    fn update(&mut self, db: &mut Database, key: &str, dirty_update: bool) -> OrmResult<bool> {
        self.trigger_event(Event::BeforeSave);
        self.trigger_event(Event::BeforeUpdate);

        let value = self.stored_id();
        let fields = if dirty_update {
            self.dirty_fields()
        } else {
            self.to_row()
        };
        let fields = self.filter_update_fields(fields);
        if !fields.is_empty() {
            db.query_mut()
                .update(&self.schema.table, fields)
                .and_where(Condition::eq(key, value));
            if !db.execute() {
                return Ok(false);
            }
        }

        self.original = self.to_row();
        self.trigger_event(Event::AfterUpdate);
        self.trigger_event(Event::AfterSave);
        Ok(true)
    }

    /// Remove the record, or apply the soft-delete fields.
    ///
    /// Requires a non-empty unique key. The in-memory record stays usable
    /// but no longer mirrors a row after a hard delete.
    pub fn delete(&mut self, db: &mut Database) -> OrmResult<bool> {
        if self.unique_id().1.is_empty() {
            return Ok(false);
        }
        let key = self.schema.unique_key.clone();
        let value = self.stored_id();
        let table = self.schema.table.clone();

        self.trigger_event(Event::BeforeDelete);
        match self.schema.delete_policy.clone() {
            DeletePolicy::Soft(fields) => {
                db.query_mut()
                    .update(&table, fields.clone())
                    .and_where(Condition::eq(&key, value));
                if !db.execute() {
                    return Ok(false);
                }
                self.attributes.merge(&fields);
                self.original.merge(&fields);
            }
            DeletePolicy::Hard => {
                db.query_mut()
                    .delete_with(&table, Some(Condition::eq(&key, value)));
                if !db.execute() {
                    return Ok(false);
                }
            }
        }
        self.trigger_event(Event::AfterDelete);
        Ok(true)
    }

    /// A freshly loaded copy of this record's row.
    pub fn reload(&self, db: &mut Database) -> OrmResult<Option<Record>> {
        let (key, value) = self.unique_id();
        crate::finder::Finder::new(self.schema.clone())
            .filter(Condition::eq(key, value))
            .one(db)
    }

    // ==================== Relations ====================

    /// A fresh descriptor for a declared relation, bound to this record.
    pub fn relation(&self, name: &str) -> OrmResult<Relation> {
        let def = self
            .schema
            .find_relation(name)
            .ok_or_else(|| OrmError::unknown_operation(name, &self.schema.table))?;
        let owner = self.attributes.get(&def.owner_key).cloned().unwrap_or_default();
        Ok(Relation::new(def.clone(), owner))
    }

    fn relation_mut(&mut self, name: &str) -> OrmResult<&mut Relation> {
        let idx = match self.relations.iter().position(|r| r.name() == name) {
            Some(idx) => idx,
            None => {
                let relation = self.relation(name)?;
                self.relations.push(relation);
                self.relations.len() - 1
            }
        };
        let owner = self.attributes.get(self.relations[idx].def().owner_key()).cloned();
        let relation = &mut self.relations[idx];
        relation.set_owner(owner.unwrap_or_default());
        Ok(relation)
    }

    /// Resolve a relation, caching the result on the record.
    pub fn related(&mut self, db: &mut Database, name: &str) -> OrmResult<&Related> {
        self.relation_mut(name)?.resolve(db, false)
    }

    /// Re-query a relation, replacing the cached result.
    pub fn reload_related(&mut self, db: &mut Database, name: &str) -> OrmResult<&Related> {
        self.relation_mut(name)?.resolve(db, true)
    }

    /// The cached result of a relation, if resolved.
    pub fn get_related(&self, name: &str) -> Option<&Related> {
        self.relations
            .iter()
            .find(|r| r.name() == name)
            .and_then(Relation::cached)
    }

    /// Attach a result to a declared relation without querying.
    pub fn set_related(&mut self, name: &str, related: Related) -> OrmResult<()> {
        self.relation_mut(name)?.set_cached(related);
        Ok(())
    }

    pub fn is_relation(&self, name: &str) -> bool {
        self.get_related(name).is_some()
    }
}

/// Attributes, then every resolved relation under its name.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let resolved: Vec<(&str, &Related)> = self
            .relations
            .iter()
            .filter_map(|r| r.cached().map(|c| (r.name(), c)))
            .collect();
        let mut map = serializer.serialize_map(Some(self.attributes.len() + resolved.len()))?;
        for (field, value) in self.attributes.iter() {
            map.serialize_entry(field, value)?;
        }
        for (name, related) in resolved {
            map.serialize_entry(name, related)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordEvent;
    use crate::row;
    use std::cell::RefCell;

    fn users() -> Schema {
        Schema::new("users").fields(&["id", "name"])
    }

    #[test]
    fn load_snapshots_declared_fields() {
        let record = Record::load_from_row(users(), row! { "id" => 1, "name" => "A", "extra" => 9 });
        assert_eq!(record.original(), &row! { "id" => 1, "name" => "A" });
        assert_eq!(record.get("extra"), Some(&Value::Int(9)));
        assert!(!record.is_dirty());
    }

    #[test]
    fn mutation_marks_dirty_without_touching_snapshot() {
        let mut record = Record::load_from_row(users(), row! { "id" => 1, "name" => "A" });
        record.set("name", "B");
        assert_eq!(record.dirty_fields(), row! { "name" => "B" });
        assert_eq!(record.original().get("name"), Some(&Value::from("A")));
    }

    #[test]
    fn undeclared_fields_persist_every_attribute() {
        let mut record = Record::new(Schema::new("notes"));
        record.set("title", "x").set("body", "y");
        assert_eq!(record.to_row(), row! { "title" => "x", "body" => "y" });
    }

    #[test]
    fn update_filter_drops_unique_key_by_default() {
        let record = Record::new(users());
        let filtered = record.filter_update_fields(row! { "id" => 1, "name" => "A" });
        assert_eq!(filtered, row! { "name" => "A" });

        let record = Record::new(users().skip_update_on(&["name"]));
        let filtered = record.filter_update_fields(row! { "id" => 1, "name" => "A" });
        assert_eq!(filtered, row! { "id" => 1 });
    }

    struct Upcase;

    impl RecordEvent for Upcase {
        fn handle(&self, record: &mut Record) {
            let name = record.get_as::<String>("name").unwrap_or_default();
            record.set("name", name.to_uppercase());
        }
    }

    #[test]
    fn events_fire_only_when_enabled() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let schema = users().on(
            Event::AfterLoad,
            EventHandler::closure(move |r: &mut Record| {
                log.borrow_mut().push(r.get_as::<i64>("id").unwrap_or_default());
            }),
        );

        Record::load_from_row(schema.clone(), row! { "id" => 1 });
        assert!(seen.borrow().is_empty());

        Record::load_from_row(schema.trigger_events(true), row! { "id" => 2 });
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn later_handler_replaces_earlier() {
        let mut record = Record::new(users());
        record.set_trigger_events(true);
        record.set("name", "ann");
        record.on(Event::BeforeSave, EventHandler::closure(|r: &mut Record| {
            r.set("name", "first");
        }));
        record.on(Event::BeforeSave, EventHandler::object(Upcase));
        record.trigger_event(Event::BeforeSave);
        assert_eq!(record.get("name"), Some(&Value::from("ANN")));
    }

    #[test]
    fn unknown_relation_is_unknown_operation() {
        let record = Record::new(users());
        let err = record.relation("posts").unwrap_err();
        assert!(matches!(err, OrmError::UnknownOperation { ref name, ref target } if name == "posts" && target == "users"));
    }

    #[test]
    fn serializes_attributes_in_order() {
        let record = Record::load_from_row(users(), row! { "id" => 1, "name" => "A" });
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"A"}"#);
    }
}
