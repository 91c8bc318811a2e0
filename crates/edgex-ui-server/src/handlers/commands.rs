//! Device command rows for the command screen.
//!
//! Each command of a device becomes one row per value its `GET` returns.
//! Commands without a readable `GET` get a single `N/A` row so they can
//! still be issued. Rows carry `:value [name value]`, their `:pos` within
//! the command and the command's `:size`.

use edgex_transit::{Keyword, Map, Value};
use edgex_ui_config::ServiceName;
use serde_json::Value as Json;

use crate::dispatch::{Args, HandlerError};
use crate::upstream::UpstreamError;

use super::context::Services;
use super::reshape::{Records, keywordize};

const PLACEHOLDER: &str = "N/A";

/// `q/edgex-commands`.
pub(super) async fn query(services: &Services, args: &Args) -> Result<Value, HandlerError> {
    rows(services, &args.keyword("id")?).await
}

/// Expanded command rows for device `id`.
pub(super) async fn rows(services: &Services, id: &Keyword) -> Result<Value, HandlerError> {
    let target = services.target(ServiceName::Command, &format!("device/{}", id.as_str()));
    let url = target.url.clone();
    let device = services.downstream.get_json(target).await?;
    let commands = match keywordize(device) {
        Value::Map(mut device) => match device.remove(&Value::keyword("commands")) {
            Some(Value::Vector(commands)) => commands,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(UpstreamError::decode(
                    url,
                    format!("expected a command list, found {}", other.kind()),
                )
                .into());
            }
        },
        other => {
            return Err(
                UpstreamError::decode(url, format!("expected a device, found {}", other.kind()))
                    .into(),
            );
        }
    };

    let commands = Records::from_maps(commands.into_iter().filter_map(into_map).collect())
        .typed("command")
        .keyword(&["id"])
        .into_inner();

    let mut rows = Vec::new();
    for mut command in commands {
        let values = match command.remove(&Value::keyword("get")) {
            Some(Value::Map(get)) if has_responses(&get) => read_values(services, &get).await?,
            _ => vec![(command_name(&command), PLACEHOLDER.to_owned())],
        };
        let size = i64::try_from(values.len()).unwrap_or(i64::MAX);
        for (pos, (name, value)) in (0_i64..).zip(values) {
            let mut row = command.clone();
            row.insert(
                Value::keyword("value"),
                Value::Vector(vec![Value::String(name), Value::String(value)]),
            );
            row.insert(Value::keyword("pos"), Value::Int(pos));
            row.insert(Value::keyword("size"), Value::Int(size));
            rows.push(Value::Map(row));
        }
    }
    Ok(Value::Vector(rows))
}

fn into_map(value: Value) -> Option<Map> {
    match value {
        Value::Map(map) => Some(map),
        _ => None,
    }
}

fn has_responses(get: &Map) -> bool {
    !matches!(get.get_keyword("responses"), None | Some(Value::Null))
}

fn command_name(command: &Map) -> String {
    command
        .get_keyword("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

/// Issues the command's `GET` and returns `(name, value)` pairs.
async fn read_values(services: &Services, get: &Map) -> Result<Vec<(String, String)>, HandlerError> {
    let Some(url) = get.get_keyword("url").and_then(Value::as_str) else {
        return Err(HandlerError::invalid_argument(
            "get",
            "command has responses but no url",
        ));
    };
    let target = services.absolute(ServiceName::Command, url);
    let response = services.downstream.get_json(target).await?;
    let readings = response
        .get("readings")
        .and_then(Json::as_array)
        .cloned()
        .unwrap_or_default();
    Ok(readings
        .iter()
        .map(|reading| {
            let name = reading
                .get("name")
                .and_then(Json::as_str)
                .unwrap_or_default()
                .to_owned();
            let value = match reading.get("value") {
                Some(Json::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            (name, value)
        })
        .collect())
}
