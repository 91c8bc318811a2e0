//! Batch dispatch for the `/api` endpoint.
//!
//! A request body is decoded into a [`BatchRequest`], each [`Operation`] is
//! routed to the [`QueryHandler`] or [`MutationHandler`] registered for its
//! key, and the results are collected into one [`ResponseContainer`].

mod args;
mod errors;
mod handler;
mod request;
mod response;
mod router;

pub use args::Args;
pub use errors::{DispatchError, HandlerError};
pub use handler::{MutationHandler, QueryHandler};
pub use request::{BatchRequest, EntityQuery, Mutation, Operation, Query, RootQuery};
pub use response::{
    BatchOutcome, ContainerKind, ResponseContainer, TEMPIDS_KEY, error_container, tempid_result,
};
pub use router::{Dispatcher, Registry};
