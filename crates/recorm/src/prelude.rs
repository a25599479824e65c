//! Convenient imports for typical `recorm` usage.
//!
//! ```ignore
//! use recorm::prelude::*;
//! ```

pub use crate::{
    Condition, Connection, Database, DeletePolicy, Entity, Event, EventHandler, Finder, FromRow,
    Logic, Op, OrmError, OrmResult, QueryBuilder, Record, RecordEvent, Related, Row, RowExt,
    Schema, Value, row,
};

#[cfg(feature = "sqlite")]
pub use crate::SqliteConnection;
