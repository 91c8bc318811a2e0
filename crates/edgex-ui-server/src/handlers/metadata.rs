//! Read-only views over core-metadata collections.

use edgex_transit::{Map, Value};
use edgex_ui_config::ServiceName;

use crate::dispatch::{Args, HandlerError};

use super::commands;
use super::context::Services;
use super::reshape::{Records, content};

pub(super) async fn devices(services: &Services) -> Result<Records, HandlerError> {
    Ok(services
        .get_records(ServiceName::Metadata, "device")
        .await?
        .typed("device")
        .remove(&["profile", "deviceResources"])
        .remove(&["profile", "resources"])
        .remove(&["profile", "commands"])
        .keyword(&["id"])
        .keyword(&["adminState"])
        .keyword(&["operatingState"])
        .keyword(&["service", "adminState"])
        .keyword(&["service", "operatingState"])
        .keyword(&["profile", "id"]))
}

pub(super) async fn device_services(services: &Services) -> Result<Records, HandlerError> {
    Ok(services
        .get_records(ServiceName::Metadata, "deviceservice")
        .await?
        .typed("device-service")
        .keyword(&["id"])
        .keyword(&["adminState"])
        .keyword(&["operatingState"])
        .keyword(&["addressable", "id"]))
}

pub(super) async fn schedule_events(services: &Services) -> Result<Records, HandlerError> {
    Ok(services
        .get_records(ServiceName::Metadata, "scheduleevent")
        .await?
        .typed("schedule-event")
        .keyword(&["id"])
        .keyword(&["addressable", "id"]))
}

pub(super) async fn addressables(services: &Services) -> Result<Records, HandlerError> {
    Ok(services
        .get_records(ServiceName::Metadata, "addressable")
        .await?
        .typed("addressable")
        .keyword(&["id"]))
}

pub(super) async fn profiles(services: &Services) -> Result<Records, HandlerError> {
    Ok(services
        .get_records(ServiceName::Metadata, "deviceprofile")
        .await?
        .typed("device-profile")
        .keyword(&["id"]))
}

pub(super) async fn schedules(services: &Services) -> Result<Records, HandlerError> {
    Ok(services
        .get_records(ServiceName::Metadata, "schedule")
        .await?
        .typed("schedule")
        .keyword(&["id"])
        .default_int(&["start", "end"]))
}

/// `[{:yaml text}]` for the profile named by `:id`.
pub(super) async fn profile_yaml(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let target = services.target(
        ServiceName::Metadata,
        &format!("deviceprofile/yaml/{}", id.as_str()),
    );
    let yaml = services.downstream.get_text(target).await?;
    let mut entry = Map::new();
    entry.insert(Value::keyword("yaml"), Value::String(yaml));
    Ok(Value::Vector(vec![Value::Map(entry)]))
}

pub(super) async fn show_schedules(services: &Services) -> Result<Value, HandlerError> {
    let mut page = content(schedules(services).await?.into_value());
    page.insert(
        Value::keyword("events"),
        schedule_events(services).await?.into_value(),
    );
    Ok(Value::Map(page))
}

pub(super) async fn show_profiles(services: &Services) -> Result<Value, HandlerError> {
    Ok(Value::Map(content(profiles(services).await?.into_value())))
}

pub(super) async fn show_addressables(services: &Services) -> Result<Value, HandlerError> {
    Ok(Value::Map(content(addressables(services).await?.into_value())))
}

/// Devices with everything the device screen needs to edit them.
pub(super) async fn show_devices(services: &Services) -> Result<Value, HandlerError> {
    let mut page = content(devices(services).await?.into_value());
    page.insert(
        Value::keyword("services"),
        device_services(services).await?.into_value(),
    );
    page.insert(
        Value::keyword("schedules"),
        schedules(services).await?.into_value(),
    );
    page.insert(
        Value::keyword("addressables"),
        addressables(services).await?.into_value(),
    );
    page.insert(
        Value::keyword("profiles"),
        profiles(services).await?.into_value(),
    );
    Ok(Value::Map(page))
}

pub(super) async fn show_commands(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let rows = commands::rows(services, &id).await?;
    let mut page = Map::new();
    page.insert(Value::keyword("source-device"), Value::Keyword(id));
    page.insert(Value::keyword("commands"), rows);
    Ok(Value::Map(page))
}

pub(super) async fn reading_page(services: &Services) -> Result<Value, HandlerError> {
    let mut page = Map::new();
    page.insert(
        Value::keyword("devices"),
        devices(services).await?.into_value(),
    );
    Ok(Value::Map(page))
}

/// Export registrations held by the export client.
pub(super) async fn show_exports(services: &Services) -> Result<Value, HandlerError> {
    let exports = services
        .get_records(ServiceName::Export, "registration")
        .await?
        .typed("export")
        .keyword(&["id"])
        .keyword(&["destination"])
        .keyword(&["format"])
        .keyword(&["compression"])
        .keyword(&["encryption", "encryptionAlgorithm"]);
    Ok(Value::Map(content(exports.into_value())))
}
