//! Test harness utilities for the gateway behavioural suites.

mod api_world;
mod config_loader;
mod reporter;
mod world;

pub use api_world::{ApiWorld, api_world};
pub use reporter::HealthEvent;
pub use world::{TestWorld, world};
