//! Process supervision: listener binding and graceful shutdown.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::bootstrap::{BootstrapError, ConfigLoader, bootstrap};
use crate::health::{HealthReporter, Lifecycle};
use crate::{StructuredHealthReporter, SystemConfigLoader};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors surfaced while launching or running the gateway.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the gateway failed.
    #[error("gateway bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// The listen address could not be bound.
    #[error("failed to bind '{address}': {source}")]
    Bind {
        /// Configured `host:port`.
        address: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The server stopped with an error.
    #[error("server error: {source}")]
    Serve {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

/// Runs the gateway with the system configuration until a shutdown signal
/// arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] if bootstrap, binding or serving fails.
pub async fn run_gateway() -> Result<(), LaunchError> {
    run_gateway_with(&SystemConfigLoader, Arc::new(StructuredHealthReporter::new())).await
}

/// Runs the gateway with explicit collaborators.
///
/// # Errors
///
/// See [`run_gateway`].
pub async fn run_gateway_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<(), LaunchError> {
    let gateway = bootstrap(loader, Arc::clone(&reporter))?;
    let address = gateway.config().listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| LaunchError::Bind {
            address: address.clone(),
            source,
        })?;
    let local = listener.local_addr().map_err(|source| LaunchError::Bind {
        address: address.clone(),
        source,
    })?;
    reporter.record(Lifecycle::Listening(local));

    let shutdown_reporter = Arc::clone(&reporter);
    axum::serve(listener, gateway.router())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown_reporter.record(Lifecycle::Stopping);
        })
        .await
        .map_err(|source| LaunchError::Serve { source })?;

    info!(target: PROCESS_TARGET, "gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(target: PROCESS_TARGET, %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(target: PROCESS_TARGET, %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
}
