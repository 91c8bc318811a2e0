//! Runtime-editable table of downstream service addresses.
//!
//! Readers take an `Arc` snapshot and build URLs from it without holding a
//! lock. Updates build a fresh table and swap it in, so a batch that has
//! already taken its snapshot keeps a consistent view.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use edgex_transit::{Map, Value};
use edgex_ui_config::{Config, ServiceName};

use crate::upstream::Target;

/// API prefix shared by every EdgeX v1 service.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    address: String,
    timeout: Option<Duration>,
}

/// Immutable snapshot of service addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    endpoints: BTreeMap<ServiceName, Endpoint>,
}

impl EndpointTable {
    /// Builds the table from the configured client settings.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let endpoints = ServiceName::all()
            .map(|service| {
                let client = config.client(service);
                let endpoint = Endpoint {
                    address: client.address(),
                    timeout: client.timeout(),
                };
                (service, endpoint)
            })
            .collect();
        Self { endpoints }
    }

    /// `host:port` of `service`.
    #[must_use]
    pub fn address(&self, service: ServiceName) -> Option<&str> {
        self.endpoints
            .get(&service)
            .map(|endpoint| endpoint.address.as_str())
    }

    /// Destination for `path` on `service`.
    ///
    /// `path` is relative to the API prefix, without a leading slash.
    #[must_use]
    pub fn target(&self, service: ServiceName, path: &str) -> Target {
        let (address, timeout) = self.endpoints.get(&service).map_or_else(
            || {
                let fallback = edgex_ui_config::ClientInfo::for_service(service);
                (fallback.address(), fallback.timeout())
            },
            |endpoint| (endpoint.address.clone(), endpoint.timeout),
        );
        Target {
            url: format!("http://{address}{API_PREFIX}/{path}"),
            timeout,
        }
    }

    /// Returns a copy with `service` pointed at `address`; the timeout is
    /// kept.
    #[must_use]
    pub fn with_address(&self, service: ServiceName, address: impl Into<String>) -> Self {
        let mut next = self.clone();
        let timeout = next
            .endpoints
            .get(&service)
            .and_then(|endpoint| endpoint.timeout);
        next.endpoints.insert(
            service,
            Endpoint {
                address: address.into(),
                timeout,
            },
        );
        next
    }

    /// Map from endpoint keyword (`:metadata`, …) to address, as shown to
    /// the client.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map = self
            .endpoints
            .iter()
            .map(|(service, endpoint)| {
                (
                    Value::keyword(service.endpoint_key()),
                    Value::string(endpoint.address.as_str()),
                )
            })
            .collect();
        Value::Map(map)
    }
}

/// Shared holder of the current [`EndpointTable`].
#[derive(Debug)]
pub struct Endpoints {
    current: RwLock<Arc<EndpointTable>>,
}

impl Endpoints {
    /// Starts from `table`.
    #[must_use]
    pub fn new(table: EndpointTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Current table.
    #[must_use]
    pub fn snapshot(&self) -> Arc<EndpointTable> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Atomically replaces the table.
    pub fn replace(&self, table: EndpointTable) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(table);
    }
}
