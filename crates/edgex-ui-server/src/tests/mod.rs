//! Behavioural suites for the gateway bootstrap and the batch API.

mod api_behaviour;
mod behaviour;
mod support;
