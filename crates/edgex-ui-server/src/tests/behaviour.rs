//! Bootstrap scenarios: configuration, downstream client and upload
//! directory preparation.

use std::cell::RefCell;

use edgex_ui_config::DEFAULT_PORT;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{self, HealthEvent, TestWorld};

#[fixture]
fn world() -> RefCell<TestWorld> {
    support::world()
}

#[given("a healthy configuration loader")]
fn given_healthy_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_successful_loader();
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_failing_loader();
}

#[given("a downstream client that cannot be built")]
fn given_failing_client(world: &RefCell<TestWorld>) {
    world.borrow_mut().fail_client();
}

#[when("the gateway bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    if let Some(error) = world.bootstrap_error() {
        panic!("gateway did not start: {error}");
    }
    let gateway = world.gateway().expect("gateway missing");
    assert_eq!(gateway.config().port, DEFAULT_PORT);
    assert_eq!(gateway.telemetry().format(), gateway.config().log_format());
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(world.gateway().is_none());
    assert!(world.bootstrap_error().is_some());
}

#[then("the upload directory exists")]
fn then_upload_directory_exists(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let gateway = world.gateway().expect("gateway missing");
    assert!(gateway.config().upload_dir.is_dir());
    assert_eq!(
        gateway.state().uploads.dir(),
        gateway.config().upload_dir.as_std_path()
    );
}

#[then("the reporter recorded bootstrap start")]
fn then_reporter_start(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::Starting));
}

#[then("the reporter recorded bootstrap success")]
fn then_reporter_success(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    assert!(
        matches!(events.last(), Some(HealthEvent::Ready { .. })),
        "last event was {:?}",
        events.last()
    );
}

#[then("the reporter recorded bootstrap failure")]
fn then_reporter_failure(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let failure = world.reporter.failure().expect("no failure reported");
    let error = world.bootstrap_error().expect("no bootstrap error");
    assert_eq!(failure, error.to_string());
    assert!(
        !world
            .reporter
            .events()
            .iter()
            .any(|event| matches!(event, HealthEvent::Ready { .. })),
        "failed bootstrap also reported readiness"
    );
}

#[scenario(
    path = "tests/features/gateway_bootstrap.feature",
    name = "Bootstrap succeeds with a healthy configuration"
)]
fn bootstrap_succeeds(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/gateway_bootstrap.feature",
    name = "Bootstrap fails when configuration cannot be loaded"
)]
fn bootstrap_fails_on_configuration(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/gateway_bootstrap.feature",
    name = "Bootstrap fails when the downstream client cannot be built"
)]
fn bootstrap_fails_on_client(world: RefCell<TestWorld>) {
    drop(world);
}
