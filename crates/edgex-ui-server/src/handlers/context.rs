//! Collaborators shared by every handler.

use std::path::PathBuf;
use std::sync::Arc;

use edgex_ui_config::ServiceName;
use serde_json::Value as Json;

use crate::credentials::CredentialStore;
use crate::endpoints::Endpoints;
use crate::fetch::PagedFetch;
use crate::upstream::{Downstream, Target};

use super::reshape::Records;
use crate::dispatch::HandlerError;

/// Downstream access, endpoint table and local stores.
#[derive(Debug)]
pub struct Services {
    /// HTTP access to EdgeX.
    pub downstream: Downstream,
    /// Editable service addresses.
    pub endpoints: Arc<Endpoints>,
    /// Shared password gate.
    pub credentials: Arc<CredentialStore>,
    /// Pagination limits for time-ranged lists.
    pub fetch: PagedFetch,
    /// Directory holding `tmp-{n}` uploads.
    pub upload_dir: PathBuf,
}

impl Services {
    /// Destination for `path` on `service` in the current endpoint table.
    #[must_use]
    pub fn target(&self, service: ServiceName, path: &str) -> Target {
        self.endpoints.snapshot().target(service, path)
    }

    /// Absolute URL handed out by EdgeX itself, for example a command URL,
    /// with the timeout of the owning service.
    #[must_use]
    pub fn absolute(&self, service: ServiceName, url: &str) -> Target {
        let timeout = self.target(service, "").timeout;
        Target {
            url: url.to_owned(),
            timeout,
        }
    }

    /// `GET` of a JSON document.
    pub(crate) async fn get_json(
        &self,
        service: ServiceName,
        path: &str,
    ) -> Result<Json, HandlerError> {
        Ok(self.downstream.get_json(self.target(service, path)).await?)
    }

    /// `GET` of a JSON array of records.
    pub(crate) async fn get_records(
        &self,
        service: ServiceName,
        path: &str,
    ) -> Result<Records, HandlerError> {
        let target = self.target(service, path);
        let url = target.url.clone();
        let json = self.downstream.get_json(target).await?;
        Ok(Records::from_json(json, &url)?)
    }
}
