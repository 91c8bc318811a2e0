//! Behavioural tests for `POST /api` batches.

use std::cell::RefCell;

use edgex_transit::Value;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::dispatch::TEMPIDS_KEY;
use crate::handlers::MutationOp;
use crate::upstream::Method;

use super::support::{self, ApiWorld};

type StepResult = Result<(), String>;

const DEVICES_URL: &str = "http://localhost:48081/api/v1/device";
const PROFILES_URL: &str = "http://localhost:48081/api/v1/deviceprofile";
const SCHEDULES_URL: &str = "http://localhost:48081/api/v1/schedule";

#[fixture]
fn api_world() -> RefCell<ApiWorld> {
    support::api_world()
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

#[given("a gateway over scripted EdgeX services")]
fn given_gateway(api_world: &RefCell<ApiWorld>) {
    api_world.borrow_mut().start();
}

#[given("metadata lists one device and one profile")]
fn given_metadata_listing(api_world: &RefCell<ApiWorld>) {
    let world = api_world.borrow();
    world.upstream.respond_json(
        Method::Get,
        DEVICES_URL,
        &serde_json::json!([{"id": "d1", "name": "thermostat", "adminState": "UNLOCKED"}]),
    );
    world.upstream.respond_json(
        Method::Get,
        PROFILES_URL,
        &serde_json::json!([{"id": "p1", "name": "thermostat-profile"}]),
    );
}

#[given("the profile listing fails")]
fn given_profiles_fail(api_world: &RefCell<ApiWorld>) {
    api_world
        .borrow()
        .upstream
        .respond(Method::Get, PROFILES_URL, 500, "profile store unavailable");
}

#[given("metadata assigns id {id} to new schedules")]
fn given_schedule_id(api_world: &RefCell<ApiWorld>, id: String) {
    api_world
        .borrow()
        .upstream
        .respond(Method::Post, SCHEDULES_URL, 200, strip_quotes(&id).to_owned());
}

#[when("the client posts the {name} batch")]
fn when_client_posts(api_world: &RefCell<ApiWorld>, name: String) -> StepResult {
    let body = api_world.borrow().batch(strip_quotes(&name))?;
    api_world.borrow_mut().post(body);
    Ok(())
}

#[then("the response status is {status}")]
fn then_status(api_world: &RefCell<ApiWorld>, status: u16) {
    let actual = api_world.borrow().status().map(|code| code.as_u16());
    assert_eq!(actual, Some(status));
}

#[then("the response holds {count} records under {key}")]
fn then_record_count(api_world: &RefCell<ApiWorld>, count: usize, key: String) -> StepResult {
    let response = api_world.borrow().response()?;
    let records = response
        .get(&Value::keyword(strip_quotes(&key)))
        .and_then(Value::as_seq)
        .ok_or_else(|| format!("no record list under {key}"))?;
    assert_eq!(records.len(), count);
    Ok(())
}

#[then("the response holds an entry {key}")]
fn then_has_entry(api_world: &RefCell<ApiWorld>, key: String) -> StepResult {
    let response = api_world.borrow().response()?;
    assert!(response.get(&Value::keyword(strip_quotes(&key))).is_some());
    Ok(())
}

#[then("the response has no entry {key}")]
fn then_has_no_entry(api_world: &RefCell<ApiWorld>, key: String) -> StepResult {
    let response = api_world.borrow().response()?;
    assert!(response.get(&Value::keyword(strip_quotes(&key))).is_none());
    Ok(())
}

#[then("the response carries an error message")]
fn then_error_message(api_world: &RefCell<ApiWorld>) -> StepResult {
    let response = api_world.borrow().response()?;
    let message = response
        .get(&Value::string("message"))
        .and_then(Value::as_str)
        .ok_or("response has no message")?;
    assert!(!message.is_empty());
    assert_eq!(response.len(), 1, "error response carried extra entries");
    Ok(())
}

#[then("the placeholder maps to {id}")]
fn then_placeholder_maps(api_world: &RefCell<ApiWorld>, id: String) -> StepResult {
    let world = api_world.borrow();
    let response = world.response()?;
    let remap = response
        .get(&Value::Symbol(MutationOp::AddSchedule.symbol()))
        .and_then(Value::as_map)
        .and_then(|result| result.get_keyword(TEMPIDS_KEY))
        .and_then(Value::as_map)
        .ok_or("response has no tempid remapping")?;
    assert_eq!(
        remap.get(&Value::Tagged(world.placeholder.clone())),
        Some(&Value::keyword(strip_quotes(&id)))
    );
    Ok(())
}

#[then("{count} operation was skipped")]
fn then_skipped(api_world: &RefCell<ApiWorld>, count: u64) {
    assert_eq!(api_world.borrow().unhandled(), count);
}

#[scenario(
    path = "tests/features/batch_api.feature",
    name = "Devices and profiles are read in one batch"
)]
fn devices_and_profiles(api_world: RefCell<ApiWorld>) {
    drop(api_world);
}

#[scenario(
    path = "tests/features/batch_api.feature",
    name = "A created schedule replaces the client placeholder"
)]
fn created_schedule(api_world: RefCell<ApiWorld>) {
    drop(api_world);
}

#[scenario(
    path = "tests/features/batch_api.feature",
    name = "A failing operation discards the whole batch"
)]
fn failing_operation(api_world: RefCell<ApiWorld>) {
    drop(api_world);
}

#[scenario(
    path = "tests/features/batch_api.feature",
    name = "A malformed body is rejected"
)]
fn malformed_body(api_world: RefCell<ApiWorld>) {
    drop(api_world);
}

#[scenario(
    path = "tests/features/batch_api.feature",
    name = "Operations without a handler are skipped"
)]
fn unhandled_operations(api_world: RefCell<ApiWorld>) {
    drop(api_world);
}
