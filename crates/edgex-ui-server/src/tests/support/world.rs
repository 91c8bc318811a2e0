//! BDD world for bootstrap scenarios: loader, reporter and outcome.

use std::cell::RefCell;
use std::sync::Arc;

use crate::bootstrap::{BootstrapError, ConfigLoader, Gateway, bootstrap_with};
use crate::upstream::testing::FakeUpstream;
use crate::upstream::{Upstream, UpstreamError};

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across bootstrap steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    client_fails: bool,
    gateway: Option<Gateway>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Starts from a loader backed by temporary directories.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            client_fails: false,
            gateway: None,
            bootstrap_error: None,
        }
    }

    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
        self.reset_results();
    }

    /// Makes building the downstream client fail.
    pub fn fail_client(&mut self) {
        self.client_fails = true;
        self.reset_results();
    }

    /// Bootstraps at most once per scenario.
    pub fn bootstrap(&mut self) {
        if self.gateway.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        let client_fails = self.client_fails;
        let result = bootstrap_with(&*self.loader, self.reporter.clone(), |_| {
            if client_fails {
                Err(UpstreamError::Client("intentional test failure".to_owned()))
            } else {
                Ok(Arc::new(FakeUpstream::new()) as Arc<dyn Upstream>)
            }
        });
        match result {
            Ok(gateway) => self.gateway = Some(gateway),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    #[must_use]
    pub fn gateway(&self) -> Option<&Gateway> {
        self.gateway.as_ref()
    }

    fn reset_results(&mut self) {
        self.gateway = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture constructor used by the bootstrap scenarios.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
