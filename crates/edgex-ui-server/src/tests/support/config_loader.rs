//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use edgex_ui_config::Config;
use ortho_config::OrthoError;
use tempfile::TempDir;

use crate::bootstrap::ConfigLoader;

/// Loader that places the upload and asset directories under a temporary
/// directory.
pub struct TestConfigLoader {
    root: TempDir,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create temporary directory");
        Self { root }
    }

    fn dir(&self, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(self.root.path().join(name))
            .expect("temporary directory was not valid UTF-8")
    }

    /// Configuration handed out by [`ConfigLoader::load`].
    #[must_use]
    pub fn config(&self) -> Config {
        Config {
            upload_dir: self.dir("uploads"),
            assets_dir: self.dir("assets"),
            ..Config::default()
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config())
    }
}

/// Loader that intentionally fails by passing an invalid port.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("edgex-ui-server"),
            OsString::from("--port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}
