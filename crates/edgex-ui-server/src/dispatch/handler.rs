//! Handler traits implemented by query and mutation endpoints.

use async_trait::async_trait;
use edgex_transit::Value;

use super::args::Args;
use super::errors::HandlerError;

/// Serves a query key.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    /// Produces the value stored under the query's key.
    ///
    /// `params` holds the requested sub-properties; `args` is empty unless
    /// the client sent a parameterised query.
    async fn query(&self, params: &[Value], args: &Args) -> Result<Value, HandlerError>;
}

/// Serves a mutation symbol.
#[async_trait]
pub trait MutationHandler: Send + Sync {
    /// Performs the write and returns the value stored under the symbol.
    async fn mutate(&self, args: &Args) -> Result<Value, HandlerError>;
}
