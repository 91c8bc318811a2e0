//! HTTP gateway between the EdgeX management UI and the EdgeX services.
//!
//! The browser client batches its reads and writes as Transit-encoded
//! Fulcro operations and posts them to `/api`. The gateway decodes each
//! batch, runs every operation against the EdgeX REST services and answers
//! with one Transit map of results. A failing operation fails the whole
//! batch with `502 Bad Gateway`.
//!
//! Startup follows a fixed sequence: load configuration, install the
//! tracing subscriber, build the downstream client and register every
//! handler. Each stage reports to a [`HealthReporter`] so failures surface
//! as structured events before the process exits.

mod bootstrap;
mod credentials;
pub mod dispatch;
mod endpoints;
mod fetch;
pub mod handlers;
mod health;
mod process;
mod telemetry;
mod transport;
mod uploads;
pub mod upstream;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Gateway, StaticConfigLoader, SystemConfigLoader, bootstrap,
    bootstrap_with,
};
pub use credentials::{CredentialError, CredentialStore};
pub use endpoints::{EndpointTable, Endpoints};
pub use fetch::{PagedFetch, TimeRange};
pub use health::{HealthReporter, Lifecycle, StructuredHealthReporter};
pub use process::{LaunchError, run_gateway, run_gateway_with};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{GatewayState, TRANSIT_CONTENT_TYPE, TransportError};
pub use uploads::UploadStore;

#[cfg(test)]
mod tests;
