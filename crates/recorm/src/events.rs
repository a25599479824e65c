//! Record lifecycle events.

use crate::record::Record;
use std::fmt;
use std::rc::Rc;

/// A point in the record lifecycle where a handler may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    BeforeSave,
    AfterSave,
    BeforeDelete,
    AfterDelete,
    BeforeInsert,
    AfterInsert,
    BeforeUpdate,
    AfterUpdate,
    BeforeLoad,
    AfterLoad,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BeforeSave => "before_save",
            Event::AfterSave => "after_save",
            Event::BeforeDelete => "before_delete",
            Event::AfterDelete => "after_delete",
            Event::BeforeInsert => "before_insert",
            Event::AfterInsert => "after_insert",
            Event::BeforeUpdate => "before_update",
            Event::AfterUpdate => "after_update",
            Event::BeforeLoad => "before_load",
            Event::AfterLoad => "after_load",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handler object for record events.
///
/// # Example
/// ```ignore
/// struct Stamp;
///
/// impl RecordEvent for Stamp {
///     fn handle(&self, record: &mut Record) {
///         record.set("updated", "now");
///     }
/// }
///
/// record.on(Event::BeforeSave, EventHandler::object(Stamp));
/// ```
pub trait RecordEvent {
    fn handle(&self, record: &mut Record);
}

/// The handler registered for one event.
#[derive(Clone, Default)]
pub enum EventHandler {
    #[default]
    None,
    Closure(Rc<dyn Fn(&mut Record)>),
    Object(Rc<dyn RecordEvent>),
}

impl EventHandler {
    pub fn closure<F: Fn(&mut Record) + 'static>(f: F) -> Self {
        EventHandler::Closure(Rc::new(f))
    }

    pub fn object<H: RecordEvent + 'static>(handler: H) -> Self {
        EventHandler::Object(Rc::new(handler))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EventHandler::None)
    }

    pub(crate) fn dispatch(&self, record: &mut Record) {
        match self {
            EventHandler::None => {}
            EventHandler::Closure(f) => f(record),
            EventHandler::Object(h) => h.handle(record),
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventHandler::None => f.write_str("None"),
            EventHandler::Closure(_) => f.write_str("Closure(..)"),
            EventHandler::Object(_) => f.write_str("Object(..)"),
        }
    }
}

/// At most one handler per event; a later registration replaces the earlier.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventHandlers {
    entries: Vec<(Event, EventHandler)>,
}

impl EventHandlers {
    pub(crate) fn set(&mut self, event: Event, handler: EventHandler) {
        match self.entries.iter_mut().find(|(e, _)| *e == event) {
            Some(slot) => slot.1 = handler,
            None => self.entries.push((event, handler)),
        }
    }

    pub(crate) fn get(&self, event: Event) -> Option<&EventHandler> {
        self.entries
            .iter()
            .find(|(e, _)| *e == event)
            .map(|(_, h)| h)
    }
}
