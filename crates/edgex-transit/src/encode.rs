//! Transit-JSON writer.
//!
//! Output uses the compact form without cache references: maps with scalar
//! keys become `["^ ", k, v, …]`, maps with any composite key become
//! `["~#cmap", [k, v, …]]`, and a scalar at the top level is quoted.

use serde_json::Value as Json;

use crate::error::TransitError;
use crate::value::{Map, TaggedValue, Value};

/// Largest integer a JavaScript reader can hold without losing precision.
const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Encodes a value as Transit-JSON bytes.
///
/// # Errors
///
/// Returns [`TransitError`] if JSON serialisation fails.
pub fn encode(value: &Value) -> Result<Vec<u8>, TransitError> {
    Ok(serde_json::to_vec(&to_json(value))?)
}

/// Encodes a value as a Transit-JSON string.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_to_string(value: &Value) -> Result<String, TransitError> {
    Ok(serde_json::to_string(&to_json(value))?)
}

/// Converts a value into the JSON tree that represents it on the wire.
#[must_use]
pub fn to_json(value: &Value) -> Json {
    if is_scalar(value) {
        Json::Array(vec![Json::String("~#'".to_owned()), element(value)])
    } else {
        element(value)
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(
        value,
        Value::Vector(_) | Value::List(_) | Value::Set(_) | Value::Map(_) | Value::Tagged(_)
    ) || value.as_tagged().is_some_and(TaggedValue::is_scalar_extension)
}

fn element(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(flag) => Json::Bool(*flag),
        Value::Int(number) if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(number) => {
            Json::from(*number)
        }
        Value::Float(number) if number.is_finite() => Json::from(*number),
        Value::Vector(items) => Json::Array(items.iter().map(element).collect()),
        Value::List(items) => tagged_json("list", Json::Array(items.iter().map(element).collect())),
        Value::Set(items) => tagged_json("set", Json::Array(items.iter().map(element).collect())),
        Value::Map(map) => map_json(map),
        Value::Tagged(tagged) if !tagged.is_scalar_extension() => {
            tagged_json(tagged.tag(), element(tagged.rep()))
        }
        scalar => Json::String(scalar_string(scalar)),
    }
}

fn tagged_json(tag: &str, rep: Json) -> Json {
    Json::Array(vec![Json::String(format!("~#{tag}")), rep])
}

fn map_json(map: &Map) -> Json {
    if map.has_composite_keys() {
        let mut flat = Vec::with_capacity(map.len() * 2);
        for (key, value) in map.iter() {
            flat.push(element(key));
            flat.push(element(value));
        }
        return tagged_json("cmap", Json::Array(flat));
    }
    let mut flat = Vec::with_capacity(map.len() * 2 + 1);
    flat.push(Json::String("^ ".to_owned()));
    for (key, value) in map.iter() {
        flat.push(Json::String(scalar_string(key)));
        flat.push(element(value));
    }
    Json::Array(flat)
}

/// String form of a scalar, as used for map keys and escaped values.
fn scalar_string(value: &Value) -> String {
    match value {
        Value::Null => "~_".to_owned(),
        Value::Bool(true) => "~?t".to_owned(),
        Value::Bool(false) => "~?f".to_owned(),
        Value::Int(number) => format!("~i{number}"),
        Value::Float(number) if number.is_nan() => "~zNaN".to_owned(),
        Value::Float(number) if number.is_infinite() && *number > 0.0 => "~zINF".to_owned(),
        Value::Float(number) if number.is_infinite() => "~z-INF".to_owned(),
        Value::Float(number) => format!("~d{number}"),
        Value::String(text) => escape(text),
        Value::Keyword(keyword) => format!("~:{}", keyword.as_str()),
        Value::Symbol(symbol) => format!("~${}", symbol.as_str()),
        Value::Uuid(uuid) => format!("~u{uuid}"),
        Value::Instant(millis) => format!("~m{millis}"),
        Value::Tagged(tagged) => match tagged.rep() {
            Value::String(body) => format!("~{}{body}", tagged.tag()),
            _ => String::new(),
        },
        Value::Vector(_) | Value::List(_) | Value::Set(_) | Value::Map(_) => String::new(),
    }
}

fn escape(text: &str) -> String {
    if text.starts_with(['~', '^', '`']) {
        format!("~{text}")
    } else {
        text.to_owned()
    }
}
