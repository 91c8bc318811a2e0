//! Handler registry and batch execution.
//!
//! Operations run one after another in request order. The first handler
//! failure aborts the batch: results already collected are dropped and only
//! the failure message is returned. Operations whose key has no registered
//! handler are skipped and counted.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use edgex_transit::{Keyword, Symbol, Value};
use tracing::{debug, warn};

use super::args::Args;
use super::errors::HandlerError;
use super::handler::{MutationHandler, QueryHandler};
use super::request::{BatchRequest, Operation, Query};
use super::response::{BatchOutcome, ContainerKind, ResponseContainer};

/// Tracing target for dispatch operations.
const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Immutable table of handlers built once at startup.
#[derive(Default)]
pub struct Registry {
    queries: HashMap<Keyword, Arc<dyn QueryHandler>>,
    mutations: HashMap<Symbol, Arc<dyn MutationHandler>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for a query key, replacing any previous one.
    pub fn register_query(&mut self, key: Keyword, handler: Arc<dyn QueryHandler>) {
        self.queries.insert(key, handler);
    }

    /// Registers the handler for a mutation symbol, replacing any previous
    /// one.
    pub fn register_mutation(&mut self, name: Symbol, handler: Arc<dyn MutationHandler>) {
        self.mutations.insert(name, handler);
    }

    /// Handler for a query key.
    #[must_use]
    pub fn query(&self, key: &Keyword) -> Option<&Arc<dyn QueryHandler>> {
        self.queries.get(key)
    }

    /// Handler for a mutation symbol.
    #[must_use]
    pub fn mutation(&self, name: &Symbol) -> Option<&Arc<dyn MutationHandler>> {
        self.mutations.get(name)
    }

    /// Number of registered query handlers.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// Number of registered mutation handlers.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.len()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("queries", &self.queries.len())
            .field("mutations", &self.mutations.len())
            .finish()
    }
}

/// Executes batches against a shared [`Registry`].
#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    unhandled: AtomicU64,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            unhandled: AtomicU64::new(0),
        }
    }

    /// Shared handler table.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of operations skipped so far because no handler was
    /// registered for their key.
    #[must_use]
    pub fn unhandled_operations(&self) -> u64 {
        self.unhandled.load(Ordering::Relaxed)
    }

    /// Runs every operation of `batch` in order.
    pub async fn execute(&self, batch: BatchRequest) -> BatchOutcome {
        let mut container: Option<ResponseContainer> = None;

        for operation in batch.into_operations() {
            let target = container.get_or_insert_with(|| {
                let kind = operation.container_kind();
                debug!(target: DISPATCH_TARGET, ?kind, "allocated response container");
                ResponseContainer::new(kind)
            });
            let label = operation.label();

            match self.run(operation).await {
                Ok(Some((key, value))) => target.insert(key, value),
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        operation = %label,
                        error = %error,
                        "operation failed; discarding batch results"
                    );
                    return BatchOutcome::Failed {
                        message: error.to_string(),
                    };
                }
            }
        }

        BatchOutcome::Done(container.unwrap_or_else(|| ResponseContainer::new(ContainerKind::Root)))
    }

    async fn run(&self, operation: Operation) -> Result<Option<(Value, Value)>, HandlerError> {
        match operation {
            Operation::RootQuery(query) => {
                self.run_query(&Query::Root(query), &Args::default()).await
            }
            Operation::EntityQuery(query) => {
                self.run_query(&Query::Entity(query), &Args::default()).await
            }
            Operation::QueryWithArgs { query, args } => self.run_query(&query, &args).await,
            Operation::Mutation(mutation) => {
                let Some(handler) = self.registry.mutation(&mutation.name) else {
                    self.skip(&mutation.name.to_string());
                    return Ok(None);
                };
                debug!(target: DISPATCH_TARGET, mutation = %mutation.name, "running mutation");
                let value = handler.mutate(&mutation.args).await?;
                Ok(Some((Value::Symbol(mutation.name), value)))
            }
        }
    }

    async fn run_query(
        &self,
        query: &Query,
        args: &Args,
    ) -> Result<Option<(Value, Value)>, HandlerError> {
        let Some(handler) = self.registry.query(query.key()) else {
            self.skip(&query.key().to_string());
            return Ok(None);
        };
        debug!(target: DISPATCH_TARGET, query = %query.key(), "running query");
        let value = handler.query(query.params(), args).await?;
        Ok(Some((query.response_key(), value)))
    }

    fn skip(&self, key: &str) {
        let total = self.unhandled.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
            target: DISPATCH_TARGET,
            key,
            total,
            "no handler registered; operation skipped"
        );
    }
}
