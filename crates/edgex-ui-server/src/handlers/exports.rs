//! Export-client registrations.

use edgex_transit::Value;
use edgex_ui_config::ServiceName;
use serde::Serialize;

use crate::dispatch::{Args, HandlerError, tempid_result};

use super::addressables::Addressable;
use super::context::Services;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Encryption {
    encryption_algorithm: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    encryption_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    initializing_vector: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Filter {
    device_identifiers: Vec<String>,
    value_descriptor_identifiers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Registration {
    #[serde(skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    addressable: Addressable,
    format: String,
    destination: String,
    compression: String,
    encryption: Encryption,
    filter: Filter,
    enable: bool,
}

impl Registration {
    /// Registration body; the addressable is always named `{name}-addr`.
    fn from_args(id: String, name: String, args: &Args) -> Result<Self, HandlerError> {
        let addressable = Addressable {
            name: format!("{}-addr", args.string("name")?),
            ..Addressable::from_args(args)?
        };
        Ok(Self {
            id,
            name,
            addressable,
            format: args.text("format")?,
            destination: args.text("destination")?,
            compression: args.text("compression")?,
            encryption: Encryption {
                encryption_algorithm: args.text("encryptionAlgorithm")?,
                encryption_key: args.string("encryptionKey")?,
                initializing_vector: args.string("initializingVector")?,
            },
            filter: Filter {
                device_identifiers: args.string_seq("device-filter")?,
                value_descriptor_identifiers: args.string_seq("reading-filter")?,
            },
            enable: args.bool("enable")?,
        })
    }
}

pub(super) async fn add(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let tempid = args.tempid("tempid")?;
    let registration = Registration::from_args(String::new(), args.string("name")?, args)?;
    let target = services.target(ServiceName::Export, "registration");
    let id = services.downstream.post_json(target, &registration).await?;
    Ok(tempid_result(tempid, Value::keyword(id)))
}

/// Updates a registration; the name is fixed once created and not resent.
pub(super) async fn edit(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let registration = Registration::from_args(id.as_str().to_owned(), String::new(), args)?;
    let target = services.target(ServiceName::Export, "registration");
    services.downstream.put_json(target, &registration).await?;
    Ok(Value::Keyword(id))
}

pub(super) async fn delete(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let path = format!("registration/id/{}", id.as_str());
    services
        .downstream
        .delete(services.target(ServiceName::Export, &path))
        .await?;
    Ok(Value::Keyword(id))
}
