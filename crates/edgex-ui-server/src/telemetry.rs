//! Tracing subscriber set-up.
//!
//! Events go to stderr as flattened JSON objects or compact lines, stamped
//! with RFC 3339 UTC times. Colour is used only when stderr is a terminal.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use edgex_ui_config::{Config, LogFormat};

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    #[must_use]
    pub fn format(self) -> LogFormat {
        self.format
    }
}

/// Subscriber installation failures.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },
    /// A global subscriber was already set by someone else.
    #[error("tracing subscriber already installed: {0}")]
    Install(#[from] TryInitError),
}

/// Installs the global subscriber the first time it is called.
///
/// Subsequent calls report the format chosen by the first one; several
/// gateways bootstrapped in one test binary share the subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] for an unparsable filter or when another
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let format = INSTALLED.get_or_try_init(|| install(config))?;
    Ok(TelemetryHandle { format: *format })
}

fn install(config: &Config) -> Result<LogFormat, TelemetryError> {
    let directive = config.log_filter();
    let filter = EnvFilter::try_new(directive).map_err(|error| TelemetryError::InvalidFilter {
        filter: directive.to_owned(),
        message: error.to_string(),
    })?;

    let format = config.log_format();
    tracing_subscriber::registry()
        .with(output_layer(format))
        .with(filter)
        .try_init()?;
    Ok(format)
}

fn output_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339())
        .with_target(true);
    match format {
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
