//! Table of downstream service addresses.
//!
//! The table is written as `[clients.<service>]` sections in the
//! configuration file. The `EDGEX_UI_CLIENTS` variable and the `--clients`
//! flag take a comma separated list of `service=[protocol://]host[:port]`
//! directives instead, for example
//! `metadata=edgex-core-metadata:48081,data=http://edgex-core-data`.

use std::collections::BTreeMap;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::{ClientInfo, ServiceName};

/// Connection details keyed by lowercase service name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    try_from = "ClientTableRepr",
    into = "BTreeMap<String, ClientInfo>"
)]
pub struct ClientTable(BTreeMap<String, ClientInfo>);

impl ClientTable {
    /// Details configured for `service`, if any.
    #[must_use]
    pub fn get(&self, service: ServiceName) -> Option<&ClientInfo> {
        self.0.get(service.endpoint_key())
    }

    /// Sets the details for `service`.
    pub fn insert(&mut self, service: ServiceName, info: ClientInfo) {
        self.0.insert(service.endpoint_key().to_owned(), info);
    }

    /// Returns `true` when no service is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ClientTable> for BTreeMap<String, ClientInfo> {
    fn from(table: ClientTable) -> Self {
        table.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClientTableRepr {
    Table(BTreeMap<String, ClientInfo>),
    Directives(String),
}

impl TryFrom<ClientTableRepr> for ClientTable {
    type Error = ClientTableParseError;

    fn try_from(repr: ClientTableRepr) -> Result<Self, Self::Error> {
        match repr {
            ClientTableRepr::Table(entries) => Ok(Self(
                entries
                    .into_iter()
                    .map(|(name, info)| (name.to_ascii_lowercase(), info))
                    .collect(),
            )),
            ClientTableRepr::Directives(text) => text.parse(),
        }
    }
}

/// Errors raised while parsing client directives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientTableParseError {
    /// A directive lacked the `service=` prefix.
    #[error("client directive '{0}' must look like service=host:port")]
    MissingService(String),
    /// The service name is not an EdgeX service the gateway knows.
    #[error("unknown EdgeX service '{0}'")]
    UnknownService(String),
    /// The host part was empty.
    #[error("client directive '{0}' has no host")]
    MissingHost(String),
    /// The port was not a valid TCP port.
    #[error("client directive '{directive}' has an invalid port: {source}")]
    InvalidPort {
        /// Directive as written.
        directive: String,
        /// Integer parse failure.
        #[source]
        source: ParseIntError,
    },
}

impl FromStr for ClientTable {
    type Err = ClientTableParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut table = Self::default();
        for directive in text.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            let (service, info) = parse_directive(directive)?;
            table.insert(service, info);
        }
        Ok(table)
    }
}

fn parse_directive(directive: &str) -> Result<(ServiceName, ClientInfo), ClientTableParseError> {
    let (name, address) = directive
        .split_once('=')
        .ok_or_else(|| ClientTableParseError::MissingService(directive.to_owned()))?;
    let service: ServiceName = name
        .trim()
        .parse()
        .map_err(|_| ClientTableParseError::UnknownService(name.trim().to_owned()))?;

    let mut info = ClientInfo::for_service(service);
    let address = match address.split_once("://") {
        Some((protocol, rest)) => {
            protocol.clone_into(&mut info.protocol);
            rest
        }
        None => address,
    };
    let host = match address.rsplit_once(':') {
        Some((host, port)) => {
            info.port = port
                .parse()
                .map_err(|source| ClientTableParseError::InvalidPort {
                    directive: directive.to_owned(),
                    source,
                })?;
            host
        }
        None => address,
    };
    if host.is_empty() {
        return Err(ClientTableParseError::MissingHost(directive.to_owned()));
    }
    host.clone_into(&mut info.host);
    Ok((service, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("metadata=edgex-core-metadata:48081", "edgex-core-metadata", 48081, "http")]
    #[case("Data=https://edgex-core-data", "edgex-core-data", 48080, "https")]
    fn directives_name_a_service(
        #[case] text: &str,
        #[case] host: &str,
        #[case] port: u16,
        #[case] protocol: &str,
    ) {
        let table: ClientTable = text.parse().unwrap_or_default();
        let service = text
            .split_once('=')
            .and_then(|(name, _)| name.parse::<ServiceName>().ok());
        let info = service.and_then(|service| table.get(service));
        assert_eq!(info.map(|i| i.host.as_str()), Some(host));
        assert_eq!(info.map(|i| i.port), Some(port));
        assert_eq!(info.map(|i| i.protocol.as_str()), Some(protocol));
    }

    #[rstest]
    fn several_directives_share_one_value() {
        let table: ClientTable = "metadata=meta:1, command=cmd:2".parse().unwrap_or_default();
        assert_eq!(
            table.get(ServiceName::Command).map(ClientInfo::address),
            Some("cmd:2".to_owned())
        );
        assert!(table.get(ServiceName::Data).is_none());
    }

    #[rstest]
    #[case("metadata")]
    #[case("billing=host:1")]
    #[case("data=:48080")]
    #[case("data=host:port")]
    fn malformed_directives_are_rejected(#[case] text: &str) {
        assert!(text.parse::<ClientTable>().is_err());
    }

    #[rstest]
    fn table_keys_are_lowercased() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Metadata".to_owned(),
            ClientInfo::for_service(ServiceName::Metadata),
        );
        let table = ClientTable::try_from(ClientTableRepr::Table(entries)).unwrap_or_default();
        assert!(table.get(ServiceName::Metadata).is_some());
    }
}
