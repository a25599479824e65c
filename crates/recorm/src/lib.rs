//! # recorm
//!
//! A fluent SQL query builder with a thin Active-Record layer on top.
//!
//! ## Features
//!
//! - **Parameterized SQL**: backtick-quoted identifiers and positional `?`
//!   placeholders, with bound values kept aligned to the placeholders
//! - **Condition grammar**: raw text, `(text, value)`, `(field, op, value)`,
//!   equality mappings, tuple lists and parenthesized groups
//! - **Active records**: dirty-tracked saves, soft or hard deletes, lifecycle
//!   events
//! - **Relations**: HasOne / HasMany with cached resolution and batched eager
//!   loading (one query per relation)
//! - **Query hooks**: observe or veto every statement; `tracing` logging built in
//! - **Profiles**: named database configurations loaded from TOML
//!
//! ## Query builder
//!
//! ```ignore
//! use recorm::{QueryBuilder, row};
//!
//! let mut q = QueryBuilder::new();
//! q.select(&["id", "age value", "users.name"])
//!     .from("users")
//!     .and_where(("age", ">=", 18))
//!     .order_by("name", "asc")
//!     .limit(10, None);
//! let (sql, values) = q.build();
//!
//! q.update("users", row! { "users.name" => "John", "value" => 10 })
//!     .and_where("id = 1");
//! // UPDATE `users`  SET `users`.`name` = ?, `value` = ? WHERE id = 1
//! ```
//!
//! ## Records
//!
//! ```ignore
//! use recorm::prelude::*;
//!
//! struct User;
//!
//! impl Entity for User {
//!     fn schema() -> Schema {
//!         Schema::new("users").has_many("posts", Post::schema, "user_id", "id")
//!     }
//! }
//!
//! let mut db = Database::new(SqliteConnection::open("app.db")?);
//! if let Some(mut user) = User::find(&mut db, 1)? {
//!     user.set("name", "Ann");
//!     user.save(&mut db)?;
//! }
//! let users = User::select().with(&["posts"]).all(&mut db)?;
//! ```

pub mod builder;
pub mod condition;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod events;
pub mod factory;
pub mod finder;
pub mod ident;
pub mod monitor;
pub mod prelude;
pub mod record;
pub mod relation;
pub mod row;
pub mod schema;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use builder::{JoinKind, QueryBuilder, StatementKind};
pub use condition::{Condition, Logic, Op};
pub use config::{DatabaseConfig, DatabaseProfiles};
pub use connection::Connection;
pub use database::Database;
pub use error::{OrmError, OrmResult};
pub use events::{Event, EventHandler, RecordEvent};
pub use factory::{DatabaseFactory, DriverFn};
pub use finder::{Finder, eager_load};
pub use ident::{Ident, quote, quote_list};
pub use monitor::{
    CompositeHook, HookAction, QueryContext, QueryHook, QueryResult, QueryStats, QueryType,
    StatsHook, TracingSqlHook,
};
pub use record::Record;
pub use relation::{Related, Relation};
pub use row::{FromRow, Row, RowExt};
pub use schema::{DeletePolicy, Entity, RelationDef, RelationKind, Schema, SchemaFn};
pub use value::{FromValue, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
