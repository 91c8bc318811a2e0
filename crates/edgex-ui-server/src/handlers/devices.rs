//! Device mutations.

use edgex_transit::Value;
use edgex_ui_config::ServiceName;
use serde::Serialize;
use serde_json::Value as Json;

use crate::dispatch::{Args, HandlerError};

use super::addressables::Addressable;
use super::context::Services;
use super::reshape::to_json;

#[derive(Debug, Serialize)]
struct Named {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Device {
    name: String,
    description: String,
    labels: Vec<String>,
    profile: Named,
    service: Named,
    addressable: Named,
    admin_state: &'static str,
    operating_state: &'static str,
    protocols: Json,
}

/// Locks or unlocks a device through core-command.
pub(super) async fn update_lock_mode(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let mode = args.keyword("mode")?;
    let path = format!("device/{}/adminstate/{}", id.as_str(), mode.as_str());
    services
        .downstream
        .put(services.target(ServiceName::Command, &path))
        .await?;
    Ok(Value::Keyword(id))
}

/// Creates the device's addressable (`{name}-addr`), then the device.
pub(super) async fn add(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let name = args.string("name")?;
    let addressable_name = format!("{name}-addr");
    let addressable = Addressable {
        name: addressable_name.clone(),
        ..Addressable::from_args(args)?
    };
    let protocols = args.map("protocols")?.map_or_else(
        || Json::Object(serde_json::Map::new()),
        |protocols| to_json(&Value::Map(protocols.clone())),
    );
    let device = Device {
        name,
        description: args.string("description")?,
        labels: args.string_seq("labels")?,
        profile: Named {
            name: args.string("profile-name")?,
        },
        service: Named {
            name: args.string("service-name")?,
        },
        addressable: Named {
            name: addressable_name,
        },
        admin_state: "UNLOCKED",
        operating_state: "ENABLED",
        protocols,
    };

    services
        .downstream
        .post_json(services.target(ServiceName::Metadata, "addressable"), &addressable)
        .await?;
    services
        .downstream
        .post_json(services.target(ServiceName::Metadata, "device"), &device)
        .await?;
    Ok(Value::Null)
}

/// Deletes a device and then the addressable it references.
pub(super) async fn delete(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let device = services
        .get_json(ServiceName::Metadata, &format!("device/{}", id.as_str()))
        .await?;
    let addressable = device
        .pointer("/addressable/id")
        .and_then(Json::as_str)
        .map(str::to_owned);

    services
        .downstream
        .delete(services.target(ServiceName::Metadata, &format!("device/id/{}", id.as_str())))
        .await?;
    if let Some(addressable) = addressable {
        services
            .downstream
            .delete(services.target(
                ServiceName::Metadata,
                &format!("addressable/id/{addressable}"),
            ))
            .await?;
    }
    Ok(Value::Keyword(id))
}

/// Issues a `PUT` command to the URL EdgeX advertised for it.
///
/// `:values` holds `[name _ value]` triples; the body maps each name to
/// its value.
pub(super) async fn issue_set_command(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let url = args.string("url")?;
    let mut body = serde_json::Map::new();
    for entry in args.seq("values")? {
        match entry.as_seq() {
            Some([Value::String(name), _, value, ..]) => {
                body.insert(name.clone(), to_json(value));
            }
            _ => {
                return Err(HandlerError::invalid_argument(
                    "values",
                    "expected [name _ value] entries",
                ));
            }
        }
    }
    services
        .downstream
        .put_json(services.absolute(ServiceName::Command, &url), &Json::Object(body))
        .await?;
    Ok(Value::Null)
}
