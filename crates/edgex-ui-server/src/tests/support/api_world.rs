//! BDD world for batch scenarios: a bootstrapped gateway over scripted
//! EdgeX services.

use std::cell::RefCell;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use edgex_transit::{Map, TaggedValue, Value};
use tokio::runtime::Runtime;
use tower::ServiceExt;

use crate::TRANSIT_CONTENT_TYPE;
use crate::bootstrap::{Gateway, StaticConfigLoader, bootstrap_with};
use crate::handlers::MutationOp;
use crate::handlers::tests::tempid;
use crate::upstream::Upstream;
use crate::upstream::testing::FakeUpstream;

use super::config_loader::TestConfigLoader;
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across batch steps.
pub struct ApiWorld {
    pub upstream: Arc<FakeUpstream>,
    pub placeholder: TaggedValue,
    runtime: Runtime,
    loader: TestConfigLoader,
    gateway: Option<Gateway>,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ApiWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            upstream: Arc::new(FakeUpstream::new()),
            placeholder: tempid(),
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("scenario runtime"),
            loader: TestConfigLoader::new(),
            gateway: None,
            status: None,
            body: Vec::new(),
        }
    }

    /// Bootstraps a gateway whose downstream calls reach the scripted
    /// services.
    pub fn start(&mut self) {
        let loader = StaticConfigLoader::new(self.loader.config());
        let upstream = Arc::clone(&self.upstream);
        let gateway = bootstrap_with(
            &loader,
            Arc::new(RecordingHealthReporter::default()),
            move |_| Ok(upstream as Arc<dyn Upstream>),
        )
        .expect("bootstrap gateway");
        self.gateway = Some(gateway);
    }

    /// Request body for a named batch.
    pub fn batch(&self, name: &str) -> Result<Vec<u8>, String> {
        let body = match name {
            "devices and profiles" => br#"["~:q/edgex-devices","~:q/edgex-profiles"]"#.to_vec(),
            "unknown and endpoint" => br#"["~:q/edgex-unknown","~:endpoint"]"#.to_vec(),
            "malformed" => br#"{"not":"a batch""#.to_vec(),
            "add schedule" => self.add_schedule_batch()?,
            other => return Err(format!("unknown batch '{other}'")),
        };
        Ok(body)
    }

    fn add_schedule_batch(&self) -> Result<Vec<u8>, String> {
        let mut args = Map::new();
        args.insert(Value::keyword("tempid"), Value::Tagged(self.placeholder.clone()));
        args.insert(Value::keyword("name"), Value::string("nightly"));
        args.insert(Value::keyword("start"), Value::Int(0));
        args.insert(Value::keyword("end"), Value::Int(0));
        args.insert(Value::keyword("frequency"), Value::string("P1D"));
        let mutation = Value::List(vec![
            Value::Symbol(MutationOp::AddSchedule.symbol()),
            Value::Map(args),
        ]);
        edgex_transit::encode(&Value::Vector(vec![mutation])).map_err(|error| error.to_string())
    }

    /// Posts `body` to `/api` and records the response.
    pub fn post(&mut self, body: Vec<u8>) {
        let app = self.gateway.as_ref().expect("gateway started").router();
        let request = Request::post("/api")
            .header(header::CONTENT_TYPE, TRANSIT_CONTENT_TYPE)
            .body(Body::from(body))
            .expect("request");
        let (status, body) = self.runtime.block_on(async move {
            let response = app.oneshot(request).await.expect("infallible router");
            let status = response.status();
            let body = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("read body");
            (status, body.to_vec())
        });
        self.status = Some(status);
        self.body = body;
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Decoded response map.
    pub fn response(&self) -> Result<Map, String> {
        match edgex_transit::decode(&self.body).map_err(|error| error.to_string())? {
            Value::Map(map) => Ok(map),
            other => Err(format!("response is a {}", other.kind())),
        }
    }

    /// Operations skipped for lack of a handler.
    #[must_use]
    pub fn unhandled(&self) -> u64 {
        self.gateway
            .as_ref()
            .map_or(0, |gateway| gateway.state().dispatcher.unhandled_operations())
    }
}

impl Default for ApiWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture constructor used by the batch scenarios.
#[must_use]
pub fn api_world() -> RefCell<ApiWorld> {
    RefCell::new(ApiWorld::new())
}
