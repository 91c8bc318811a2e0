//! Support-logging entries over a time range.
//!
//! Log entries have no id, so each entry gets `"{created}-{n}"` where `n`
//! counts entries sharing a timestamp within the page. The overlap between
//! consecutive pages therefore produces the same ids and is deduplicated.

use async_trait::async_trait;
use edgex_transit::{Map, Value};
use edgex_ui_config::ServiceName;

use crate::dispatch::{Args, HandlerError};
use crate::fetch::{PageSource, PageWindow, PagedRecord, TimeRange};
use crate::upstream::UpstreamError;

use super::context::Services;
use super::reshape::{Records, content};

/// `show-logs`: entries logged within `[:start, :end]`.
pub(super) async fn show_logs(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let range = TimeRange::new(args.int("start")?, args.int("end")?);
    let source = LogSource { services };
    let fetched = services.fetch.collect(&source, range).await?;
    let items = fetched.items.into_iter().map(Value::Map).collect();
    Ok(Value::Map(content(Value::Vector(items))))
}

struct LogSource<'a> {
    services: &'a Services,
}

#[async_trait]
impl PageSource for LogSource<'_> {
    type Record = Map;

    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Map>, UpstreamError> {
        let path = format!("logs/{}/{}/{}", window.from, window.to, window.limit);
        let target = self.services.target(ServiceName::Logging, &path);
        let url = target.url.clone();
        let json = self.services.downstream.get_json(target).await?;
        Ok(Records::from_json(json, &url)?.typed("log-entry").into_inner())
    }

    async fn admit(&self, mut page: Vec<Map>) -> Result<Vec<Map>, UpstreamError> {
        assign_ids(&mut page);
        Ok(page)
    }
}

fn assign_ids(page: &mut [Map]) {
    let mut last = None;
    let mut seq = 0_u32;
    for entry in page {
        let created = entry.created();
        if created != last {
            seq = 0;
        }
        let stamp = created.unwrap_or_default();
        entry.insert(Value::keyword("id"), Value::keyword(format!("{stamp}-{seq}")));
        seq += 1;
        last = created;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;
    use serde_json::json;

    use crate::fetch::PagedFetch;
    use crate::handlers::tests::{args, services_with};
    use crate::upstream::Method;
    use crate::upstream::testing::FakeUpstream;

    fn entry(created: i64) -> Map {
        [(Value::keyword("created"), Value::Int(created))]
            .into_iter()
            .collect()
    }

    #[rstest]
    fn ids_count_within_each_timestamp() {
        let mut page = vec![entry(5), entry(5), entry(7), entry(5)];
        assign_ids(&mut page);
        let ids: Vec<_> = page
            .iter()
            .filter_map(|e| e.get_keyword("id").and_then(Value::as_keyword))
            .map(|id| id.as_str().to_owned())
            .collect();
        assert_eq!(ids, vec!["5-0", "5-1", "7-0", "5-0"]);
    }

    #[rstest]
    #[tokio::test]
    async fn overlapping_pages_yield_each_entry_once() {
        let fake = Arc::new(FakeUpstream::new());
        fake.respond_json(
            Method::Get,
            "http://localhost:48061/api/v1/logs/0/100/2",
            &json!([{"created": 10, "message": "a"}, {"created": 20, "message": "b"}]),
        );
        fake.respond_json(
            Method::Get,
            "http://localhost:48061/api/v1/logs/20/100/2",
            &json!([{"created": 20, "message": "b"}]),
        );
        let mut services = services_with(Arc::clone(&fake));
        services.fetch = PagedFetch::new(2, 100);

        let page = show_logs(
            &services,
            &args(vec![("start", Value::Int(0)), ("end", Value::Int(100))]),
        ).await
        .ok();
        let count = page
            .as_ref()
            .and_then(Value::as_map)
            .and_then(|page| page.get_keyword("content"))
            .and_then(Value::as_seq)
            .map(<[Value]>::len);

        assert_eq!(count, Some(2));
        assert_eq!(fake.calls().len(), 2);
    }
}
