//! Shared helpers and registry tests for the handler set.

use std::path::PathBuf;
use std::sync::Arc;

use edgex_transit::{Map, TaggedValue, Value};
use edgex_ui_config::Config;
use rstest::rstest;
use uuid::Uuid;

use crate::credentials::CredentialStore;
use crate::dispatch::{Args, BatchOutcome, BatchRequest, Dispatcher};
use crate::endpoints::{EndpointTable, Endpoints};
use crate::fetch::PagedFetch;
use crate::upstream::testing::FakeUpstream;
use crate::upstream::{Downstream, Method};

use super::{MutationOp, QueryOp, Services, registry};

/// Services talking to `fake` with the default endpoint table.
pub(crate) fn services_with(fake: Arc<FakeUpstream>) -> Services {
    Services {
        downstream: Downstream::new(fake),
        endpoints: Arc::new(Endpoints::new(EndpointTable::from_config(&Config::default()))),
        credentials: Arc::new(CredentialStore::new(None)),
        fetch: PagedFetch::default(),
        upload_dir: PathBuf::from("."),
    }
}

pub(crate) fn args(entries: Vec<(&str, Value)>) -> Args {
    let map: Map = entries
        .into_iter()
        .map(|(name, value)| (Value::keyword(name), value))
        .collect();
    Args::new(map)
}

pub(crate) fn tempid() -> TaggedValue {
    TaggedValue::new("fulcro/tempid", Value::Uuid(Uuid::new_v4()))
}

#[rstest]
fn every_operation_is_registered() {
    let services = Arc::new(services_with(Arc::new(FakeUpstream::new())));
    let registry = registry(&services);

    assert_eq!(registry.query_count(), 22);
    assert_eq!(registry.mutation_count(), 22);
    assert!(registry.query(&QueryOp::Readings.key()).is_some());
    assert_eq!(
        MutationOp::AddScheduleEvent.symbol().as_str(),
        "org.edgexfoundry.ui.manager.api.mutations/add-schedule-event"
    );
}

#[rstest]
#[tokio::test]
async fn devices_and_profiles_share_one_response() {
    let fake = Arc::new(FakeUpstream::new());
    fake.respond_json(
        Method::Get,
        "http://localhost:48081/api/v1/device",
        &serde_json::json!([{"id": "d1", "name": "thermo", "adminState": "UNLOCKED"}]),
    );
    fake.respond_json(
        Method::Get,
        "http://localhost:48081/api/v1/deviceprofile",
        &serde_json::json!([{"id": "p1", "name": "thermo-profile"}]),
    );
    let services = Arc::new(services_with(Arc::clone(&fake)));
    let dispatcher = Dispatcher::new(Arc::new(registry(&services)));
    let batch = BatchRequest::parse(br#"["~:q/edgex-devices","~:q/edgex-profiles"]"#)
        .expect("valid batch");

    let BatchOutcome::Done(container) = dispatcher.execute(batch).await else {
        panic!("batch failed");
    };

    let devices = container.get(&Value::keyword("q/edgex-devices"));
    let first = devices
        .and_then(Value::as_seq)
        .and_then(<[Value]>::first)
        .and_then(Value::as_map);
    assert_eq!(first.and_then(|d| d.get_keyword("id")), Some(&Value::keyword("d1")));
    assert_eq!(
        first.and_then(|d| d.get_keyword("adminState")),
        Some(&Value::keyword("UNLOCKED"))
    );
    let profiles = container.get(&Value::keyword("q/edgex-profiles"));
    assert_eq!(profiles.and_then(Value::as_seq).map(<[Value]>::len), Some(1));
    assert_eq!(fake.calls().len(), 2);
}
