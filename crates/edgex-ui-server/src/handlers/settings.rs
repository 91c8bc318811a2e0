//! Endpoint settings screen.

use edgex_transit::Value;
use edgex_ui_config::ServiceName;
use tracing::info;

use crate::dispatch::{Args, HandlerError};

use super::HANDLERS_TARGET;
use super::context::Services;

/// Current `{:metadata "host:port" …}` table.
pub(super) fn endpoints(services: &Services) -> Value {
    services.endpoints.snapshot().to_value()
}

/// Replaces the addresses present in the arguments; services left out keep
/// their current address.
pub(super) fn save_endpoints(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let mut table = (*services.endpoints.snapshot()).clone();
    for service in ServiceName::all() {
        let address = args.string(service.endpoint_key())?;
        if !address.is_empty() {
            table = table.with_address(service, address);
        }
    }
    services.endpoints.replace(table);
    info!(target: HANDLERS_TARGET, "endpoint table replaced");
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;

    use crate::handlers::tests::{args, services_with};
    use crate::upstream::testing::FakeUpstream;

    #[rstest]
    fn saving_keeps_unlisted_services() {
        let services = services_with(Arc::new(FakeUpstream::new()));

        let saved = save_endpoints(
            &services,
            &args(vec![("data", Value::string("edgex-core-data:48080"))]),
        );
        assert_eq!(saved.ok(), Some(Value::Null));

        let table = endpoints(&services);
        let table = table.as_map();
        assert_eq!(
            table.and_then(|t| t.get_keyword("data")),
            Some(&Value::string("edgex-core-data:48080"))
        );
        assert_eq!(
            table.and_then(|t| t.get_keyword("metadata")),
            Some(&Value::string("localhost:48081"))
        );
    }
}
