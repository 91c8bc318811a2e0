//! Typed access to operation arguments.

use edgex_transit::{Keyword, Map, TaggedValue, Value};

use super::errors::HandlerError;

/// Argument map attached to a mutation or parameterised query.
///
/// Accessors take the argument name without the leading colon. Optional
/// strings and sequences default to empty when absent; everything else is
/// required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    entries: Map,
}

impl Args {
    /// Wraps a decoded argument map.
    #[must_use]
    pub fn new(entries: Map) -> Self {
        Self { entries }
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map {
        &self.entries
    }

    /// Raw argument lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get_keyword(name)
    }

    /// String argument; absent or `nil` yields an empty string.
    ///
    /// # Errors
    ///
    /// Fails when the value is present but not a string.
    pub fn string(&self, name: &str) -> Result<String, HandlerError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(other) => Err(wrong_type(name, "string", other)),
        }
    }

    /// Text rendering of a string, number or keyword argument.
    ///
    /// # Errors
    ///
    /// Fails for composite values.
    pub fn text(&self, name: &str) -> Result<String, HandlerError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Int(number)) => Ok(number.to_string()),
            Some(Value::Float(number)) => Ok(number.to_string()),
            Some(Value::Keyword(keyword)) => Ok(keyword.as_str().to_owned()),
            Some(other) => Err(wrong_type(name, "string or number", other)),
        }
    }

    /// Keyword argument; a string is accepted and converted.
    ///
    /// # Errors
    ///
    /// Fails when the value is absent or of another type.
    pub fn keyword(&self, name: &str) -> Result<Keyword, HandlerError> {
        match self.get(name) {
            Some(Value::Keyword(keyword)) => Ok(keyword.clone()),
            Some(Value::String(text)) => Ok(Keyword::new(text.as_str())),
            Some(other) => Err(wrong_type(name, "keyword", other)),
            None => Err(missing(name)),
        }
    }

    /// Integer argument.
    ///
    /// # Errors
    ///
    /// Fails when the value is absent or not an integer.
    pub fn int(&self, name: &str) -> Result<i64, HandlerError> {
        match self.get(name) {
            Some(Value::Int(number)) => Ok(*number),
            Some(other) => Err(wrong_type(name, "integer", other)),
            None => Err(missing(name)),
        }
    }

    /// Boolean argument; absent yields `false`.
    ///
    /// # Errors
    ///
    /// Fails when the value is present but not a boolean.
    pub fn bool(&self, name: &str) -> Result<bool, HandlerError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(other) => Err(wrong_type(name, "boolean", other)),
        }
    }

    /// Client tempid placeholder.
    ///
    /// # Errors
    ///
    /// Fails when the value is absent or not a tagged value.
    pub fn tempid(&self, name: &str) -> Result<TaggedValue, HandlerError> {
        match self.get(name) {
            Some(Value::Tagged(tagged)) => Ok(tagged.clone()),
            Some(other) => Err(wrong_type(name, "tempid", other)),
            None => Err(missing(name)),
        }
    }

    /// Sequence of strings; absent yields an empty list.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a sequence of strings.
    pub fn string_seq(&self, name: &str) -> Result<Vec<String>, HandlerError> {
        self.seq(name)?
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(text.clone()),
                Value::Keyword(keyword) => Ok(keyword.as_str().to_owned()),
                other => Err(wrong_type(name, "sequence of strings", other)),
            })
            .collect()
    }

    /// Sequence argument; absent yields an empty slice.
    ///
    /// # Errors
    ///
    /// Fails when the value is present but not a vector, list or set.
    pub fn seq(&self, name: &str) -> Result<&[Value], HandlerError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Vector(items) | Value::List(items) | Value::Set(items)) => Ok(items),
            Some(other) => Err(wrong_type(name, "sequence", other)),
        }
    }

    /// Map argument; absent yields `None`.
    ///
    /// # Errors
    ///
    /// Fails when the value is present but not a map.
    pub fn map(&self, name: &str) -> Result<Option<&Map>, HandlerError> {
        match self.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Map(map)) => Ok(Some(map)),
            Some(other) => Err(wrong_type(name, "map", other)),
        }
    }
}

impl From<Map> for Args {
    fn from(entries: Map) -> Self {
        Self::new(entries)
    }
}

fn missing(name: &str) -> HandlerError {
    HandlerError::invalid_argument(name, "required argument is missing")
}

fn wrong_type(name: &str, expected: &str, found: &Value) -> HandlerError {
    HandlerError::invalid_argument(name, format!("expected {expected}, found {}", found.kind()))
}
