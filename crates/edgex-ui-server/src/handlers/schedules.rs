//! Schedule and schedule-event mutations.

use edgex_transit::Value;
use edgex_ui_config::ServiceName;
use serde::Serialize;

use crate::dispatch::{Args, HandlerError, tempid_result};

use super::context::Services;

#[derive(Debug, Serialize)]
struct Schedule {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    start: String,
    end: String,
    frequency: String,
    #[serde(rename = "run-once")]
    run_once: bool,
}

#[derive(Debug, Serialize)]
struct Named {
    name: String,
}

#[derive(Debug, Serialize)]
struct ScheduleEvent {
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    addressable: Named,
    parameters: String,
    schedule: String,
    service: String,
}

/// Creates a schedule; `:start` and `:end` may be timestamps or `0`.
pub(super) async fn add_schedule(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let tempid = args.tempid("tempid")?;
    let schedule = Schedule {
        name: args.string("name")?,
        start: args.text("start")?,
        end: args.text("end")?,
        frequency: args.string("frequency")?,
        run_once: args.bool("run-once")?,
    };
    let target = services.target(ServiceName::Metadata, "schedule");
    let id = services.downstream.post_json(target, &schedule).await?;
    Ok(tempid_result(tempid, Value::keyword(id)))
}

pub(super) async fn delete_schedule(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    delete_by_id(services, args, "schedule").await
}

pub(super) async fn add_schedule_event(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let tempid = args.tempid("tempid")?;
    let event = ScheduleEvent {
        name: args.string("name")?,
        addressable: Named {
            name: args.string("addressable-name")?,
        },
        parameters: args.string("parameters")?,
        schedule: args.string("schedule-name")?,
        service: args.string("service-name")?,
    };
    let target = services.target(ServiceName::Metadata, "scheduleevent");
    let id = services.downstream.post_json(target, &event).await?;
    Ok(tempid_result(tempid, Value::keyword(id)))
}

pub(super) async fn delete_schedule_event(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    delete_by_id(services, args, "scheduleevent").await
}

async fn delete_by_id(
    services: &Services,
    args: &Args,
    collection: &str,
) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let path = format!("{collection}/id/{}", id.as_str());
    services
        .downstream
        .delete(services.target(ServiceName::Metadata, &path))
        .await?;
    Ok(Value::Keyword(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rstest::rstest;
    use serde_json::json;

    use crate::handlers::tests::{args, services_with, tempid};
    use crate::upstream::testing::FakeUpstream;
    use crate::upstream::{Method, RequestBody};

    #[rstest]
    #[tokio::test]
    async fn add_schedule_sends_numeric_bounds_as_text() {
        let fake = Arc::new(FakeUpstream::new());
        fake.respond(Method::Post, "http://localhost:48081/api/v1/schedule", 200, "s-1");
        let services = services_with(Arc::clone(&fake));
        let placeholder = tempid();
        let request = args(vec![
            ("tempid", Value::Tagged(placeholder.clone())),
            ("name", Value::string("nightly")),
            ("start", Value::Int(0)),
            ("end", Value::Int(0)),
            ("frequency", Value::string("PT24H")),
            ("run-once", Value::Bool(false)),
        ]);

        let result = add_schedule(&services, &request).await.ok();

        assert_eq!(result, Some(tempid_result(placeholder, Value::keyword("s-1"))));
        assert_eq!(
            fake.requests().first().map(|r| r.body.clone()),
            Some(RequestBody::Json(json!({
                "name": "nightly",
                "start": "0",
                "end": "0",
                "frequency": "PT24H",
                "run-once": false
            })))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn failed_create_is_an_error() {
        let fake = Arc::new(FakeUpstream::new());
        fake.respond(Method::Post, "http://localhost:48081/api/v1/scheduleevent", 409, "duplicate");
        let services = services_with(fake);
        let request = args(vec![
            ("tempid", Value::Tagged(tempid())),
            ("name", Value::string("poll")),
        ]);

        let error = add_schedule_event(&services, &request).await
            .err()
            .map(|error| error.to_string());
        assert_eq!(
            error.as_deref(),
            Some("POST http://localhost:48081/api/v1/scheduleevent returned 409: duplicate")
        );
    }
}
