//! Conversion of EdgeX JSON documents into the client's data model.
//!
//! Object keys become keywords, and each record is tagged with a `:type`
//! keyword. Selected string fields (ids, states, enum-like settings) are
//! turned into keywords so the client can use them as idents.

use edgex_transit::{Map, Value};
use serde_json::Value as Json;

use crate::upstream::UpstreamError;

/// JSON document with object keys turned into keywords.
pub(crate) fn keywordize(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(flag) => Value::Bool(flag),
        Json::Number(number) => number
            .as_i64()
            .map(Value::Int)
            .or_else(|| number.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        Json::String(text) => Value::String(text),
        Json::Array(items) => Value::Vector(items.into_iter().map(keywordize).collect()),
        Json::Object(object) => Value::Map(
            object
                .into_iter()
                .map(|(key, value)| (Value::keyword(key), keywordize(value)))
                .collect(),
        ),
    }
}

/// Plain JSON rendering of a client value, used for request bodies built
/// from arguments. Keywords and symbols render as their names.
pub(crate) fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(flag) => Json::Bool(*flag),
        Value::Int(number) => Json::from(*number),
        Value::Float(number) => serde_json::Number::from_f64(*number).map_or(Json::Null, Json::Number),
        Value::String(text) => Json::String(text.clone()),
        Value::Keyword(keyword) => Json::String(keyword.as_str().to_owned()),
        Value::Symbol(symbol) => Json::String(symbol.as_str().to_owned()),
        Value::Uuid(uuid) => Json::String(uuid.to_string()),
        Value::Instant(millis) => Json::from(*millis),
        Value::Vector(items) | Value::List(items) | Value::Set(items) => {
            Json::Array(items.iter().map(to_json).collect())
        }
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(key, value)| (key_text(key), to_json(value)))
                .collect(),
        ),
        Value::Tagged(tagged) => to_json(tagged.rep()),
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        Value::Keyword(keyword) => keyword.as_str().to_owned(),
        Value::Symbol(symbol) => symbol.as_str().to_owned(),
        other => to_json(other).to_string(),
    }
}

/// `{:content value}` plus further entries.
pub(crate) fn content(value: Value) -> Map {
    let mut map = Map::new();
    map.insert(Value::keyword("content"), value);
    map
}

/// List of records returned by an EdgeX collection endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Records(Vec<Map>);

impl Records {
    /// Reads a JSON array of objects; `null` is an empty list.
    pub(crate) fn from_json(json: Json, url: &str) -> Result<Self, UpstreamError> {
        match keywordize(json) {
            Value::Null => Ok(Self::default()),
            Value::Vector(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Map(map) => Ok(map),
                    other => Err(UpstreamError::decode(
                        url,
                        format!("expected an object, found {}", other.kind()),
                    )),
                })
                .collect::<Result<_, _>>()
                .map(Self),
            other => Err(UpstreamError::decode(
                url,
                format!("expected an array, found {}", other.kind()),
            )),
        }
    }

    pub(crate) fn from_maps(maps: Vec<Map>) -> Self {
        Self(maps)
    }

    /// Sets `:type` on every record.
    #[must_use]
    pub(crate) fn typed(mut self, kind: &str) -> Self {
        for record in &mut self.0 {
            record.insert(Value::keyword("type"), Value::keyword(kind));
        }
        self
    }

    /// Turns the string at `path` into a keyword where present.
    #[must_use]
    pub(crate) fn keyword(mut self, path: &[&str]) -> Self {
        for record in &mut self.0 {
            keyword_at(record, path);
        }
        self
    }

    /// Removes the entry at `path` where present.
    #[must_use]
    pub(crate) fn remove(mut self, path: &[&str]) -> Self {
        for record in &mut self.0 {
            remove_at(record, path);
        }
        self
    }

    /// Fills absent or `nil` top-level `keys` with zero.
    #[must_use]
    pub(crate) fn default_int(mut self, keys: &[&str]) -> Self {
        for record in &mut self.0 {
            for key in keys {
                if matches!(record.get_keyword(key), None | Some(Value::Null)) {
                    record.insert(Value::keyword(*key), Value::Int(0));
                }
            }
        }
        self
    }

    pub(crate) fn into_inner(self) -> Vec<Map> {
        self.0
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Vector(self.0.into_iter().map(Value::Map).collect())
    }
}

/// Turns the string at `path` inside `map` into a keyword.
pub(crate) fn keyword_at(map: &mut Map, path: &[&str]) {
    let Some((head, rest)) = path.split_first() else {
        return;
    };
    let Some(entry) = map.get_keyword_mut(head) else {
        return;
    };
    if rest.is_empty() {
        if let Value::String(text) = entry {
            *entry = Value::keyword(std::mem::take(text));
        }
    } else if let Value::Map(inner) = entry {
        keyword_at(inner, rest);
    }
}

fn remove_at(map: &mut Map, path: &[&str]) {
    match path {
        [] => {}
        [last] => {
            map.remove(&Value::keyword(*last));
        }
        [head, rest @ ..] => {
            if let Some(Value::Map(inner)) = map.get_keyword_mut(head) {
                remove_at(inner, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn devices() -> Records {
        Records::from_json(
            json!([{
                "id": "d1",
                "adminState": "UNLOCKED",
                "profile": {"id": "p1", "commands": [], "name": "thermo"},
            }]),
            "http://metadata/api/v1/device",
        )
        .unwrap_or_default()
    }

    #[rstest]
    fn nested_paths_are_keywordized_and_removed() {
        let records = devices()
            .typed("device")
            .keyword(&["id"])
            .keyword(&["profile", "id"])
            .remove(&["profile", "commands"])
            .into_inner();
        let device = records.first().cloned().unwrap_or_default();

        assert_eq!(device.get_keyword("type"), Some(&Value::keyword("device")));
        assert_eq!(device.get_keyword("id"), Some(&Value::keyword("d1")));
        assert_eq!(
            device.get_keyword("adminState"),
            Some(&Value::string("UNLOCKED"))
        );
        let profile = device.get_keyword("profile").and_then(Value::as_map);
        assert_eq!(
            profile.and_then(|p| p.get_keyword("id")),
            Some(&Value::keyword("p1"))
        );
        assert!(profile.is_some_and(|p| p.get_keyword("commands").is_none()));
    }

    #[rstest]
    fn null_collections_read_as_empty() {
        let records = Records::from_json(Json::Null, "http://x").ok();
        assert_eq!(records.map(Records::into_value), Some(Value::Vector(Vec::new())));
    }

    #[rstest]
    fn non_arrays_are_decode_errors() {
        let result = Records::from_json(json!({"id": 1}), "http://x");
        assert!(matches!(result, Err(UpstreamError::Decode { .. })));
    }

    #[rstest]
    fn missing_defaults_are_zero() {
        let records = Records::from_json(json!([{"start": "20180101T000000"}]), "http://x")
            .unwrap_or_default()
            .default_int(&["start", "end"])
            .into_inner();
        let schedule = records.first().cloned().unwrap_or_default();
        assert_eq!(
            schedule.get_keyword("start"),
            Some(&Value::string("20180101T000000"))
        );
        assert_eq!(schedule.get_keyword("end"), Some(&Value::Int(0)));
    }

    #[rstest]
    fn keywords_render_as_plain_json_strings() {
        let map: Map = [(Value::keyword("mode"), Value::keyword("LOCKED"))]
            .into_iter()
            .collect();
        assert_eq!(to_json(&Value::Map(map)), json!({"mode": "LOCKED"}));
    }
}
