//! Built-in values used when no layer supplies a setting.

use camino::Utf8PathBuf;

/// Port the gateway listens on.
pub const DEFAULT_PORT: u16 = 4000;

/// Interface the gateway binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Number of records requested per downstream page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Upper bound on pages fetched for a single time range.
pub const DEFAULT_MAX_ROUNDS: usize = 100;

/// Default log filter expression used by the binary.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned form of [`default_log_filter`] for configuration defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Interface the listener binds when none is configured.
#[must_use]
pub fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Directory that receives `tmp-{n}` upload files.
#[must_use]
pub fn default_upload_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}

/// Directory holding the built single-page client.
#[must_use]
pub fn default_assets_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("./assets")
}
