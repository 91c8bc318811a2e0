//! Device readings over a time range.
//!
//! Core data only lists readings for all devices, so pages are filtered to
//! the requested device after they arrive. Readings whose value descriptor
//! declares `floatEncoding: "Base64"` carry a little-endian `f32` encoded
//! in Base64; those values are decoded into numbers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use edgex_transit::{Map, Value};
use edgex_ui_config::ServiceName;
use serde_json::Value as Json;
use tracing::debug;

use crate::dispatch::{Args, HandlerError};
use crate::fetch::{PageSource, PageWindow, TimeRange};
use crate::upstream::UpstreamError;

use super::HANDLERS_TARGET;
use super::context::Services;
use super::reshape::{Records, keyword_at};

const BASE64_ENCODING: &str = "Base64";

/// `q/edgex-readings`: readings of device `:name` within `[:from, :to]`.
pub(super) async fn query(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let source = ReadingSource::new(services, args.string("name")?);
    let range = TimeRange::new(args.int("from")?, args.int("to")?);
    let fetched = services.fetch.collect(&source, range).await?;
    Ok(Value::Vector(fetched.items.into_iter().map(Value::Map).collect()))
}

/// Core-data reading pages filtered to one device.
pub(crate) struct ReadingSource<'a> {
    services: &'a Services,
    device: String,
    base64: Mutex<HashMap<String, bool>>,
}

impl<'a> ReadingSource<'a> {
    pub(crate) fn new(services: &'a Services, device: String) -> Self {
        Self {
            services,
            device,
            base64: Mutex::new(HashMap::new()),
        }
    }

    /// Whether readings named `name` are Base64 floats. Lookup failures
    /// count as "no"; results are remembered for the rest of the fetch.
    async fn is_base64(&self, name: &str) -> bool {
        if let Some(known) = self.cached(name) {
            return known;
        }
        let path = format!("valuedescriptor/name/{name}");
        let encoded = match self.services.get_json(ServiceName::Data, &path).await {
            Ok(descriptor) => {
                descriptor.get("floatEncoding").and_then(Json::as_str) == Some(BASE64_ENCODING)
            }
            Err(error) => {
                debug!(
                    target: HANDLERS_TARGET,
                    descriptor = name,
                    error = %error,
                    "value descriptor lookup failed; keeping raw value"
                );
                false
            }
        };
        if let Ok(mut cache) = self.base64.lock() {
            cache.insert(name.to_owned(), encoded);
        }
        encoded
    }

    fn cached(&self, name: &str) -> Option<bool> {
        self.base64
            .lock()
            .ok()
            .and_then(|cache| cache.get(name).copied())
    }
}

#[async_trait]
impl PageSource for ReadingSource<'_> {
    type Record = Map;

    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Map>, UpstreamError> {
        let path = format!("reading/{}/{}/{}", window.from, window.to, window.limit);
        let target = self.services.target(ServiceName::Data, &path);
        let url = target.url.clone();
        let json = self.services.downstream.get_json(target).await?;
        Ok(Records::from_json(json, &url)?.typed("reading").into_inner())
    }

    async fn admit(&self, page: Vec<Map>) -> Result<Vec<Map>, UpstreamError> {
        let mut admitted = Vec::new();
        for mut reading in page {
            if reading.get_keyword("device").and_then(Value::as_str) != Some(self.device.as_str()) {
                continue;
            }
            let name = reading
                .get_keyword("name")
                .and_then(Value::as_str)
                .map(str::to_owned);
            if let Some(name) = name {
                if self.is_base64(&name).await {
                    decode_value(&mut reading);
                }
            }
            keyword_at(&mut reading, &["id"]);
            admitted.push(reading);
        }
        Ok(admitted)
    }
}

/// Replaces a Base64 `:value` with the `f32` it encodes; values that do not
/// decode are left unchanged.
fn decode_value(reading: &mut Map) {
    let Some(value) = reading.get_keyword_mut("value") else {
        return;
    };
    let Some(number) = value.as_str().and_then(decode_f32) else {
        return;
    };
    *value = Value::Float(f64::from(number));
}

pub(crate) fn decode_f32(encoded: &str) -> Option<f32> {
    let bytes = STANDARD.decode(encoded).ok()?;
    let bits: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(f32::from_le_bytes(bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;
    use serde_json::json;

    use crate::handlers::tests::{services_with};
    use crate::upstream::Method;
    use crate::upstream::testing::FakeUpstream;

    #[rstest]
    #[case("AAAgQQ==", Some(10.0))]
    #[case("AACAvw==", Some(-1.0))]
    #[case("AAA=", None)]
    #[case("not base64", None)]
    fn decodes_little_endian_floats(#[case] encoded: &str, #[case] expected: Option<f32>) {
        assert_eq!(decode_f32(encoded), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn filters_by_device_and_decodes_base64_values() {
        let fake = Arc::new(FakeUpstream::new());
        fake.respond_json(
            Method::Get,
            "http://localhost:48080/api/v1/reading/0/99/100",
            &json!([
                {"id": "r1", "created": 10, "device": "thermo", "name": "celsius", "value": "AAAgQQ=="},
                {"id": "r2", "created": 11, "device": "pump", "name": "rpm", "value": "1200"},
                {"id": "r3", "created": 12, "device": "thermo", "name": "label", "value": "kitchen"}
            ]),
        );
        fake.respond_json(
            Method::Get,
            "http://localhost:48080/api/v1/valuedescriptor/name/celsius",
            &json!({"name": "celsius", "floatEncoding": "Base64"}),
        );
        let services = services_with(Arc::clone(&fake));
        let args: Map = [
            (Value::keyword("name"), Value::string("thermo")),
            (Value::keyword("from"), Value::Int(0)),
            (Value::keyword("to"), Value::Int(99)),
        ]
        .into_iter()
        .collect();

        let readings = query(&services, &Args::new(args)).await.ok();
        let readings = readings.as_ref().and_then(Value::as_seq).unwrap_or_default();

        assert_eq!(readings.len(), 2);
        let first = readings.first().and_then(Value::as_map);
        assert_eq!(first.and_then(|r| r.get_keyword("value")), Some(&Value::Float(10.0)));
        assert_eq!(first.and_then(|r| r.get_keyword("id")), Some(&Value::keyword("r1")));
        assert_eq!(
            first.and_then(|r| r.get_keyword("type")),
            Some(&Value::keyword("reading"))
        );
        let second = readings.get(1).and_then(Value::as_map);
        assert_eq!(
            second.and_then(|r| r.get_keyword("value")),
            Some(&Value::string("kitchen"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn descriptor_lookups_are_cached_per_fetch() {
        let fake = Arc::new(FakeUpstream::new());
        fake.respond_json(
            Method::Get,
            "http://localhost:48080/api/v1/reading/0/99/100",
            &json!([
                {"id": "r1", "created": 10, "device": "thermo", "name": "celsius", "value": "1"},
                {"id": "r2", "created": 11, "device": "thermo", "name": "celsius", "value": "2"}
            ]),
        );
        let services = services_with(Arc::clone(&fake));
        let source = ReadingSource::new(&services, "thermo".to_owned());

        let fetched = services.fetch.collect(&source, TimeRange::new(0, 99)).await;

        assert_eq!(fetched.map(|f| f.items.len()).ok(), Some(2));
        let lookups = fake
            .calls()
            .into_iter()
            .filter(|(_, url)| url.contains("valuedescriptor"))
            .count();
        assert_eq!(lookups, 1);
    }
}
