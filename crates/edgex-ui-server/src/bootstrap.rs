//! Gateway bootstrap orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use ortho_config::OrthoError;
use thiserror::Error;

use edgex_ui_config::Config;

use crate::credentials::CredentialStore;
use crate::dispatch::Dispatcher;
use crate::endpoints::{EndpointTable, Endpoints};
use crate::fetch::PagedFetch;
use crate::handlers::{Services, registry};
use crate::health::{HealthReporter, Lifecycle};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{self, GatewayState};
use crate::upstream::{Downstream, ReqwestUpstream, Upstream, UpstreamError};
use crate::uploads::UploadStore;

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the gateway configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a configuration resolved elsewhere.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The HTTP client for downstream services could not be built.
    #[error("failed to prepare downstream client: {source}")]
    Upstream {
        /// Underlying client error.
        #[source]
        source: UpstreamError,
    },
    /// The upload directory could not be created.
    #[error("failed to prepare upload directory '{path}': {source}")]
    UploadDirectory {
        /// Configured directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Gateway {
    config: Config,
    state: GatewayState,
    telemetry: TelemetryHandle,
}

impl Gateway {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared request state.
    #[must_use]
    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// HTTP router serving the API and the client assets.
    #[must_use]
    pub fn router(&self) -> Router {
        transport::router(self.state.clone(), self.config.assets_dir.as_std_path())
    }
}

/// Bootstraps the gateway with the production HTTP client.
///
/// # Errors
///
/// See [`bootstrap_with`].
pub fn bootstrap(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Gateway, BootstrapError> {
    bootstrap_with(loader, reporter, |_| {
        ReqwestUpstream::new().map(|client| Arc::new(client) as Arc<dyn Upstream>)
    })
}

/// Bootstraps the gateway using the supplied collaborators.
///
/// `connect` builds the transport used for every downstream call.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first stage that fails; the reporter
/// has already been told about it.
pub fn bootstrap_with<F>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    connect: F,
) -> Result<Gateway, BootstrapError>
where
    F: FnOnce(&Config) -> Result<Arc<dyn Upstream>, UpstreamError>,
{
    reporter.record(Lifecycle::Starting);
    let fail = |error: BootstrapError| {
        reporter.record(Lifecycle::Failed(&error));
        error
    };

    let config = loader
        .load()
        .map_err(|source| fail(BootstrapError::Configuration { source }))?;

    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;

    let upstream = connect(&config).map_err(|source| fail(BootstrapError::Upstream { source }))?;

    let upload_dir = config.upload_dir.clone().into_std_path_buf();
    std::fs::create_dir_all(&upload_dir).map_err(|source| {
        fail(BootstrapError::UploadDirectory {
            path: upload_dir.clone(),
            source,
        })
    })?;

    let credentials = CredentialStore::new(
        config
            .credentials_path
            .clone()
            .map(camino::Utf8PathBuf::into_std_path_buf),
    );
    let services = Arc::new(Services {
        downstream: Downstream::new(upstream),
        endpoints: Arc::new(Endpoints::new(EndpointTable::from_config(&config))),
        credentials: Arc::new(credentials),
        fetch: PagedFetch::new(config.page_size, config.max_rounds),
        upload_dir: upload_dir.clone(),
    });
    let state = GatewayState {
        dispatcher: Arc::new(Dispatcher::new(Arc::new(registry(&services)))),
        uploads: Arc::new(UploadStore::new(upload_dir)),
    };

    reporter.record(Lifecycle::Ready(&config));
    Ok(Gateway {
        config,
        state,
        telemetry,
    })
}
