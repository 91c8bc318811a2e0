//! Shared configuration for the EdgeX UI gateway.
//!
//! Settings are resolved by `ortho_config`: built-in defaults, then a TOML
//! file named by `--config-path` or `EDGEX_UI_CONFIG_PATH`, then
//! `EDGEX_UI_*` environment variables and finally command-line flags. The
//! legacy `DATA_FILE` variable still names the credential file when no
//! layer sets `credentials_path`.

mod clients;
mod defaults;
mod logging;
mod services;

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use clients::{ClientTable, ClientTableParseError};
pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_ROUNDS, DEFAULT_PAGE_SIZE, DEFAULT_PORT,
    default_assets_dir, default_host, default_log_filter, default_log_filter_string,
    default_log_format, default_upload_dir,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use services::{ClientInfo, ServiceName};

/// Environment variable older deployments use for the credential file.
pub const LEGACY_CREDENTIALS_ENV: &str = "DATA_FILE";

/// Fully resolved gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "EDGEX_UI")]
pub struct Config {
    /// Interface the listener binds.
    #[ortho_config(default = default_host())]
    pub host: String,
    /// TCP port the listener binds.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// Downstream services keyed by lowercase service name.
    #[ortho_config(default = ClientTable::default())]
    pub clients: ClientTable,
    /// `tracing_subscriber::EnvFilter` directive string.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the tracing subscriber.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// File holding the bcrypt hash of the shared password.
    pub credentials_path: Option<Utf8PathBuf>,
    /// Directory receiving uploaded files.
    #[ortho_config(default = default_upload_dir())]
    pub upload_dir: Utf8PathBuf,
    /// Directory holding the single-page client.
    #[ortho_config(default = default_assets_dir())]
    pub assets_dir: Utf8PathBuf,
    /// Records requested per downstream page.
    #[ortho_config(default = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
    /// Maximum pages fetched for one time range.
    #[ortho_config(default = DEFAULT_MAX_ROUNDS)]
    pub max_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            clients: ClientTable::default(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            credentials_path: None,
            upload_dir: default_upload_dir(),
            assets_dir: default_assets_dir(),
            page_size: DEFAULT_PAGE_SIZE,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the [`OrthoError`] raised while parsing flags, reading the
    /// configuration file or merging the environment.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from explicit arguments and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let config = <Self as OrthoConfig>::load_from_iter(args)?;
        Ok(config.with_legacy_credentials(std::env::var_os(LEGACY_CREDENTIALS_ENV)))
    }

    fn with_legacy_credentials(mut self, data_file: Option<OsString>) -> Self {
        if self.credentials_path.is_none() {
            self.credentials_path = data_file
                .filter(|value| !value.is_empty())
                .and_then(|value| Utf8PathBuf::from_path_buf(value.into()).ok());
        }
        self
    }

    /// Connection details for `service`, falling back to stock settings.
    ///
    /// A table that omits the port keeps the service's stock port.
    #[must_use]
    pub fn client(&self, service: ServiceName) -> ClientInfo {
        let mut info = self
            .clients
            .get(service)
            .cloned()
            .unwrap_or_else(|| ClientInfo::for_service(service));
        if info.port == 0 {
            info.port = service.default_port();
        }
        info
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// `host:port` string the listener binds to.
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
