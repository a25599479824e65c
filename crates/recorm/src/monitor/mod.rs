//! Statement hooks around SQL execution.
//!
//! Every statement a [`crate::Database`] sends to its connection passes
//! through the registered [`QueryHook`]s: `before_query` may abort it, and
//! `after_query` observes the outcome and elapsed time.
//!
//! # Example
//!
//! ```rust,ignore
//! use recorm::monitor::{StatsHook, TracingSqlHook};
//! use std::rc::Rc;
//!
//! let stats = Rc::new(StatsHook::new());
//! let mut db = Database::new(conn)
//!     .with_hook(TracingSqlHook::new())
//!     .with_shared_hook(stats.clone());
//! // ...
//! println!("{} statements", stats.stats().total_queries);
//! ```

mod monitors;
mod tracing_hook;
mod types;


pub use monitors::{CompositeHook, QueryStats, StatsHook};
pub use tracing_hook::TracingSqlHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
