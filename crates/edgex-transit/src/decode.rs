//! Transit-JSON reader.
//!
//! Accepts both the compact form produced by browser clients
//! (`["^ ", k, v]`, `["~#tag", rep]`, cache references) and the verbose form
//! (JSON objects, `{"~#tag": rep}`).

use serde_json::Value as Json;
use uuid::Uuid;

use crate::cache::{self, MAP_AS_ARRAY, ReadCache};
use crate::error::TransitError;
use crate::value::{Keyword, Map, Symbol, TaggedValue, Value};

/// Decodes one Transit document from raw bytes.
///
/// # Errors
///
/// Returns [`TransitError`] when the payload is not JSON or does not follow
/// Transit encoding rules.
pub fn decode(bytes: &[u8]) -> Result<Value, TransitError> {
    let json: Json = serde_json::from_slice(bytes)?;
    Decoder::new().value(&json, false)
}

/// Decodes one Transit document from a string.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_str(text: &str) -> Result<Value, TransitError> {
    decode(text.as_bytes())
}

/// Result of reading a string: either a value or a tag awaiting its
/// representation.
#[derive(Debug, Clone)]
enum Parsed {
    Value(Value),
    Tag(String),
}

struct Decoder {
    cache: ReadCache<Parsed>,
}

impl Decoder {
    fn new() -> Self {
        Self {
            cache: ReadCache::new(),
        }
    }

    fn value(&mut self, node: &Json, as_map_key: bool) -> Result<Value, TransitError> {
        match self.node(node, as_map_key)? {
            Parsed::Value(value) => Ok(value),
            Parsed::Tag(tag) => Err(TransitError::MisplacedTag { tag }),
        }
    }

    fn node(&mut self, node: &Json, as_map_key: bool) -> Result<Parsed, TransitError> {
        let value = match node {
            Json::Null => Value::Null,
            Json::Bool(flag) => Value::Bool(*flag),
            Json::Number(number) => number_value(number),
            Json::String(raw) => return self.string(raw, as_map_key),
            Json::Array(items) => self.array(items)?,
            Json::Object(entries) => self.object(entries)?,
        };
        Ok(Parsed::Value(value))
    }

    fn string(&mut self, raw: &str, as_map_key: bool) -> Result<Parsed, TransitError> {
        if cache::is_cacheable(raw, as_map_key) {
            let parsed = parse_string(raw)?;
            self.cache.write(parsed.clone());
            Ok(parsed)
        } else if cache::is_cache_code(raw) {
            self.cache.read(raw)
        } else {
            parse_string(raw)
        }
    }

    fn array(&mut self, items: &[Json]) -> Result<Value, TransitError> {
        let Some((first, rest)) = items.split_first() else {
            return Ok(Value::Vector(Vec::new()));
        };
        if first.as_str() == Some(MAP_AS_ARRAY) {
            return self.map_as_array(rest);
        }
        match self.node(first, false)? {
            Parsed::Tag(tag) => match rest {
                [rep] => {
                    let rep = self.value(rep, false)?;
                    build_tagged(tag, rep)
                }
                _ => Err(TransitError::MisplacedTag { tag }),
            },
            Parsed::Value(head) => {
                let mut values = Vec::with_capacity(items.len());
                values.push(head);
                for item in rest {
                    values.push(self.value(item, false)?);
                }
                Ok(Value::Vector(values))
            }
        }
    }

    fn map_as_array(&mut self, entries: &[Json]) -> Result<Value, TransitError> {
        if entries.len() % 2 != 0 {
            return Err(TransitError::OddMapEntries { len: entries.len() });
        }
        let mut map = Map::new();
        for pair in entries.chunks_exact(2) {
            if let [key, value] = pair {
                let key = self.value(key, true)?;
                let value = self.value(value, false)?;
                map.insert(key, value);
            }
        }
        Ok(Value::Map(map))
    }

    fn object(&mut self, entries: &serde_json::Map<String, Json>) -> Result<Value, TransitError> {
        let mut map = Map::new();
        let single = entries.len() == 1;
        for (raw_key, raw_value) in entries {
            match self.string(raw_key, true)? {
                Parsed::Tag(tag) if single => {
                    let rep = self.value(raw_value, false)?;
                    return build_tagged(tag, rep);
                }
                Parsed::Tag(tag) => return Err(TransitError::MisplacedTag { tag }),
                Parsed::Value(key) => {
                    let value = self.value(raw_value, false)?;
                    map.insert(key, value);
                }
            }
        }
        Ok(Value::Map(map))
    }
}

fn number_value(number: &serde_json::Number) -> Value {
    number.as_i64().map_or_else(
        || match number.as_f64() {
            Some(float) if number.is_f64() => Value::Float(float),
            _ => Value::Tagged(TaggedValue::new("n", Value::String(number.to_string()))),
        },
        Value::Int,
    )
}

fn parse_string(raw: &str) -> Result<Parsed, TransitError> {
    let Some(escaped) = raw.strip_prefix('~') else {
        return Ok(Parsed::Value(Value::String(raw.to_owned())));
    };
    let mut chars = escaped.chars();
    let Some(marker) = chars.next() else {
        return Err(TransitError::invalid_escape(raw, "missing escape marker"));
    };
    let body = chars.as_str();
    let value = match marker {
        '~' | '^' | '`' => Value::String(escaped.to_owned()),
        '#' => return Ok(Parsed::Tag(body.to_owned())),
        ':' => Value::Keyword(Keyword::new(body)),
        '$' => Value::Symbol(Symbol::new(body)),
        '_' => Value::Null,
        '?' => match body {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            _ => return Err(TransitError::invalid_escape(raw, "expected 't' or 'f'")),
        },
        'i' => parse_integer(raw, body)?,
        'n' => Value::Tagged(TaggedValue::new("n", Value::String(body.to_owned()))),
        'd' => body
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|error| TransitError::invalid_escape(raw, error.to_string()))?,
        'z' => match body {
            "NaN" => Value::Float(f64::NAN),
            "INF" => Value::Float(f64::INFINITY),
            "-INF" => Value::Float(f64::NEG_INFINITY),
            _ => return Err(TransitError::invalid_escape(raw, "unknown special float")),
        },
        'u' => Uuid::parse_str(body)
            .map(Value::Uuid)
            .map_err(|error| TransitError::invalid_escape(raw, error.to_string()))?,
        'm' => body
            .parse::<i64>()
            .map(Value::Instant)
            .map_err(|error| TransitError::invalid_escape(raw, error.to_string()))?,
        other => Value::Tagged(TaggedValue::new(
            other.to_string(),
            Value::String(body.to_owned()),
        )),
    };
    Ok(Parsed::Value(value))
}

fn parse_integer(raw: &str, body: &str) -> Result<Value, TransitError> {
    if let Ok(number) = body.parse::<i64>() {
        return Ok(Value::Int(number));
    }
    let digits = body.strip_prefix('-').unwrap_or(body);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(Value::Tagged(TaggedValue::new(
            "n",
            Value::String(body.to_owned()),
        )))
    } else {
        Err(TransitError::invalid_escape(raw, "not an integer"))
    }
}

fn build_tagged(tag: String, rep: Value) -> Result<Value, TransitError> {
    match tag.as_str() {
        "'" => Ok(rep),
        "list" => into_items(&tag, rep).map(Value::List),
        "set" => into_items(&tag, rep).map(Value::Set),
        "cmap" => {
            let items = into_items(&tag, rep)?;
            if items.len() % 2 != 0 {
                return Err(TransitError::OddMapEntries { len: items.len() });
            }
            let mut map = Map::new();
            let mut items = items.into_iter();
            while let (Some(key), Some(value)) = (items.next(), items.next()) {
                map.insert(key, value);
            }
            Ok(Value::Map(map))
        }
        _ => Ok(Value::Tagged(TaggedValue::new(tag, rep))),
    }
}

fn into_items(tag: &str, rep: Value) -> Result<Vec<Value>, TransitError> {
    match rep {
        Value::Vector(items) => Ok(items),
        _ => Err(TransitError::InvalidTagRep {
            tag: tag.to_owned(),
            expected: "an array representation",
        }),
    }
}
