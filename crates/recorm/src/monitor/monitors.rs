use super::types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// A hook that runs several hooks in order.
///
/// The first `Abort` wins; later hooks are not consulted.
#[derive(Default, Clone)]
pub struct CompositeHook {
    hooks: Vec<Rc<dyn QueryHook>>,
}

impl CompositeHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook to the chain.
    pub fn add<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Rc::new(hook));
        self
    }

    /// Add a shared hook to the chain.
    pub fn add_shared(mut self, hook: Rc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        for hook in &self.hooks {
            if let HookAction::Abort(reason) = hook.before_query(ctx) {
                return HookAction::Abort(reason);
            }
        }
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, result);
        }
    }
}

/// Collected statement statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Total number of statements that reached the connection.
    pub total_queries: u64,
    /// Number of failed statements.
    pub failed_queries: u64,
    pub select_count: u64,
    pub insert_count: u64,
    pub update_count: u64,
    pub delete_count: u64,
    /// Total execution time.
    pub total_duration: Duration,
}

/// A hook that counts statements by type.
///
/// Share it with [`std::rc::Rc`] to read the counters while the database
/// holds a clone.
#[derive(Debug, Default)]
pub struct StatsHook {
    total_queries: Cell<u64>,
    failed_queries: Cell<u64>,
    select_count: Cell<u64>,
    insert_count: Cell<u64>,
    update_count: Cell<u64>,
    delete_count: Cell<u64>,
    total_duration: Cell<Duration>,
}

impl StatsHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.get(),
            failed_queries: self.failed_queries.get(),
            select_count: self.select_count.get(),
            insert_count: self.insert_count.get(),
            update_count: self.update_count.get(),
            delete_count: self.delete_count.get(),
            total_duration: self.total_duration.get(),
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        self.total_queries.set(0);
        self.failed_queries.set(0);
        self.select_count.set(0);
        self.insert_count.set(0);
        self.update_count.set(0);
        self.delete_count.set(0);
        self.total_duration.set(Duration::ZERO);
    }
}

fn bump(counter: &Cell<u64>) {
    counter.set(counter.get() + 1);
}

impl QueryHook for StatsHook {
    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        bump(&self.total_queries);
        if result.is_error() {
            bump(&self.failed_queries);
        }
        match ctx.query_type {
            QueryType::Select => bump(&self.select_count),
            QueryType::Insert => bump(&self.insert_count),
            QueryType::Update => bump(&self.update_count),
            QueryType::Delete => bump(&self.delete_count),
            QueryType::Other => {}
        }
        self.total_duration.set(self.total_duration.get() + duration);
    }
}
