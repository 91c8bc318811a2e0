//! Downstream EdgeX microservices and how to reach them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// EdgeX microservice the gateway talks to.
///
/// `Display` yields the configuration table name (`Metadata`), while
/// [`ServiceName::endpoint_key`] yields the key used by the client's
/// endpoint settings screen (`metadata`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum ServiceName {
    /// Core data: readings and value descriptors.
    Data,
    /// Core metadata: devices, profiles, addressables and schedules.
    Metadata,
    /// Core command.
    Command,
    /// Support logging.
    Logging,
    /// Export client registrations.
    Export,
    /// Support notifications.
    Notifications,
    /// Support scheduler.
    Scheduler,
}

impl ServiceName {
    /// Every service, in declaration order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Key used by the client when reading or saving endpoints.
    #[must_use]
    pub fn endpoint_key(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Metadata => "metadata",
            Self::Command => "command",
            Self::Logging => "logging",
            Self::Export => "export",
            Self::Notifications => "notifications",
            Self::Scheduler => "scheduler",
        }
    }

    /// Port the service listens on in a stock EdgeX deployment.
    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Data => 48080,
            Self::Metadata => 48081,
            Self::Command => 48082,
            Self::Logging => 48061,
            Self::Export => 48071,
            Self::Notifications => 48060,
            Self::Scheduler => 48085,
        }
    }
}

/// Connection details for one downstream service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientInfo {
    /// Host name or address.
    pub host: String,
    /// TCP port; zero selects the service's stock port.
    pub port: u16,
    /// URL scheme; informational, requests always use `http`.
    pub protocol: String,
    /// Per-request timeout in milliseconds; zero disables it.
    #[serde(skip_serializing_if = "is_zero")]
    pub timeout: u64,
}

impl ClientInfo {
    /// Stock settings for `service` on the local host.
    #[must_use]
    pub fn for_service(service: ServiceName) -> Self {
        Self {
            port: service.default_port(),
            ..Self::default()
        }
    }

    /// `host:port` pair used to build downstream URLs.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request timeout, if one is configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_millis(self.timeout))
    }
}

fn is_zero(millis: &u64) -> bool {
    *millis == 0
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 0,
            protocol: "http".to_owned(),
            timeout: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Metadata", ServiceName::Metadata)]
    #[case("notifications", ServiceName::Notifications)]
    fn parses_table_names(#[case] text: &str, #[case] expected: ServiceName) {
        assert_eq!(text.parse::<ServiceName>().ok(), Some(expected));
    }

    #[rstest]
    fn every_service_has_a_distinct_endpoint_key() {
        let mut keys: Vec<_> = ServiceName::all().map(ServiceName::endpoint_key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 7);
    }

    #[rstest]
    #[case(0, None)]
    #[case(2500, Some(Duration::from_millis(2500)))]
    fn zero_timeout_is_disabled(#[case] millis: u64, #[case] expected: Option<Duration>) {
        let info = ClientInfo {
            timeout: millis,
            ..ClientInfo::for_service(ServiceName::Data)
        };
        assert_eq!(info.timeout(), expected);
    }
}
