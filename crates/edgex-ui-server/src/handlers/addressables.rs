//! Addressable mutations and the addressable body shared with devices and
//! exports.

use edgex_transit::Value;
use edgex_ui_config::ServiceName;
use serde::Serialize;

use crate::dispatch::{Args, HandlerError, tempid_result};

use super::context::Services;

/// Network location as core-metadata stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub(super) struct Addressable {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) name: String,
    pub(super) address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) protocol: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub(super) port: i64,
    pub(super) path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) publisher: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) topic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) user: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) cert: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub(super) key: String,
}

fn is_zero(port: &i64) -> bool {
    *port == 0
}

impl Addressable {
    /// Connection fields taken from the mutation arguments; the HTTP method
    /// arrives as a keyword and is sent upper-cased.
    pub(super) fn from_args(args: &Args) -> Result<Self, HandlerError> {
        Ok(Self {
            address: args.string("address")?,
            protocol: args.string("protocol")?,
            port: args.int("port")?,
            path: args.string("path")?,
            method: args.text("method")?.to_uppercase(),
            publisher: args.string("publisher")?,
            topic: args.string("topic")?,
            user: args.string("user")?,
            password: args.string("password")?,
            cert: args.string("cert")?,
            key: args.string("key")?,
            ..Self::default()
        })
    }
}

pub(super) async fn add(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let tempid = args.tempid("tempid")?;
    let addressable = Addressable {
        name: args.string("name")?,
        ..Addressable::from_args(args)?
    };
    let target = services.target(ServiceName::Metadata, "addressable");
    let id = services.downstream.post_json(target, &addressable).await?;
    Ok(tempid_result(tempid, Value::keyword(id)))
}

pub(super) async fn edit(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let addressable = Addressable {
        id: id.as_str().to_owned(),
        ..Addressable::from_args(args)?
    };
    let target = services.target(ServiceName::Metadata, "addressable");
    services.downstream.put_json(target, &addressable).await?;
    Ok(Value::Keyword(id))
}

pub(super) async fn delete(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let target = services.target(
        ServiceName::Metadata,
        &format!("addressable/id/{}", id.as_str()),
    );
    services.downstream.delete(target).await?;
    Ok(Value::Keyword(id))
}
