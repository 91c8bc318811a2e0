//! Lifecycle events of the gateway process.

use std::net::SocketAddr;
use std::sync::Arc;

use edgex_ui_config::Config;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Milestones between process start and shutdown.
#[derive(Debug, Clone, Copy)]
pub enum Lifecycle<'a> {
    /// Configuration is about to be loaded.
    Starting,
    /// Every collaborator was built.
    Ready(&'a Config),
    /// A bootstrap stage failed; the process will exit.
    Failed(&'a BootstrapError),
    /// The listener is bound.
    Listening(SocketAddr),
    /// A termination signal arrived.
    Stopping,
}

impl Lifecycle<'_> {
    /// Stable event name used in structured logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Starting => "bootstrap_starting",
            Self::Ready(_) => "bootstrap_succeeded",
            Self::Failed(_) => "bootstrap_failed",
            Self::Listening(_) => "listening",
            Self::Stopping => "shutting_down",
        }
    }
}

/// Receives lifecycle events.
pub trait HealthReporter: Send + Sync {
    /// Called once per milestone, in order.
    fn record(&self, event: Lifecycle<'_>);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn record(&self, event: Lifecycle<'_>) {
        (**self).record(event);
    }
}

/// Writes lifecycle events to the `health` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn record(&self, event: Lifecycle<'_>) {
        let name = event.name();
        match event {
            Lifecycle::Starting => {
                tracing::info!(target: HEALTH_TARGET, event = name, "loading configuration");
            }
            Lifecycle::Ready(config) => tracing::info!(
                target: HEALTH_TARGET,
                event = name,
                listen = %config.listen_address(),
                upload_dir = %config.upload_dir,
                assets_dir = %config.assets_dir,
                page_size = config.page_size,
                max_rounds = config.max_rounds,
                "gateway ready"
            ),
            Lifecycle::Failed(error) => {
                tracing::error!(target: HEALTH_TARGET, event = name, %error, "gateway failed to start");
            }
            Lifecycle::Listening(address) => {
                tracing::info!(target: HEALTH_TARGET, event = name, %address, "serving HTTP");
            }
            Lifecycle::Stopping => {
                tracing::info!(target: HEALTH_TARGET, event = name, "draining connections");
            }
        }
    }
}
