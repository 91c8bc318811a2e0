//! In-memory representation of decoded Transit data.
//!
//! Transit carries more types than JSON: keywords, symbols, tagged values and
//! maps whose keys are arbitrary values. [`Value`] models that closed set so
//! the rest of the gateway can pattern-match on it directly.

use std::fmt;

use uuid::Uuid;

/// Interned-style identifier such as `:q/edgex-devices`.
///
/// The stored name excludes the leading colon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(String);

impl Keyword {
    /// Builds a keyword from its name, with or without a namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Full name including any namespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace portion, if the name contains one.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        split_namespace(&self.0).0
    }

    /// Name portion after the namespace separator.
    #[must_use]
    pub fn name(&self) -> &str {
        split_namespace(&self.0).1
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl From<&str> for Keyword {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Symbol such as a fully-qualified mutation name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Builds a symbol from its full name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Full name including any namespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace portion, if the name contains one.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        split_namespace(&self.0).0
    }

    /// Name portion after the namespace separator.
    #[must_use]
    pub fn name(&self) -> &str {
        split_namespace(&self.0).1
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

fn split_namespace(full: &str) -> (Option<&str>, &str) {
    match full.split_once('/') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            (Some(namespace), name)
        }
        _ => (None, full),
    }
}

/// Value carrying an extension tag the codec does not interpret.
///
/// Client temporary ids arrive as `fulcro/tempid` tagged uuids and must be
/// echoed back unchanged, so the tag and representation are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    tag: String,
    rep: Box<Value>,
}

impl TaggedValue {
    /// Creates a tagged value.
    #[must_use]
    pub fn new(tag: impl Into<String>, rep: Value) -> Self {
        Self {
            tag: tag.into(),
            rep: Box::new(rep),
        }
    }

    /// Tag name without the `~#` prefix.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Wrapped representation.
    #[must_use]
    pub fn rep(&self) -> &Value {
        &self.rep
    }

    /// Whether the value is written as a `~x…` scalar string.
    pub(crate) fn is_scalar_extension(&self) -> bool {
        self.tag.chars().count() == 1 && matches!(*self.rep, Value::String(_))
    }
}

/// Decoded Transit value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null` / `~_`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float, including the `~z` specials.
    Float(f64),
    /// Plain string.
    String(String),
    /// Keyword (`~:`).
    Keyword(Keyword),
    /// Symbol (`~$`).
    Symbol(Symbol),
    /// UUID (`~u`).
    Uuid(Uuid),
    /// Point in time as milliseconds since the epoch (`~m`).
    Instant(i64),
    /// JSON array.
    Vector(Vec<Value>),
    /// `~#list`.
    List(Vec<Value>),
    /// `~#set`.
    Set(Vec<Value>),
    /// Map with arbitrary keys.
    Map(Map),
    /// Any other tag.
    Tagged(TaggedValue),
}

impl Value {
    /// Shorthand for [`Value::Keyword`].
    #[must_use]
    pub fn keyword(name: impl Into<String>) -> Self {
        Self::Keyword(Keyword::new(name))
    }

    /// Shorthand for [`Value::Symbol`].
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// Shorthand for [`Value::String`].
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    /// Human-readable type name used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Keyword(_) => "keyword",
            Self::Symbol(_) => "symbol",
            Self::Uuid(_) => "uuid",
            Self::Instant(_) => "instant",
            Self::Vector(_) => "vector",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Tagged(_) => "tagged value",
        }
    }

    /// Whether this value cannot be written as a JSON object key.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        match self {
            Self::Vector(_) | Self::List(_) | Self::Set(_) | Self::Map(_) => true,
            Self::Tagged(tagged) => !tagged.is_scalar_extension(),
            _ => false,
        }
    }

    /// Returns the string payload of a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the keyword payload.
    #[must_use]
    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Self::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// Returns the symbol payload.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Returns the integer payload.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Returns the map payload.
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the elements of a vector or list.
    #[must_use]
    pub fn as_seq(&self) -> Option<&[Self]> {
        match self {
            Self::Vector(items) | Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the tagged payload.
    #[must_use]
    pub fn as_tagged(&self) -> Option<&TaggedValue> {
        match self {
            Self::Tagged(tagged) => Some(tagged),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Int(number)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Float(number)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<Keyword> for Value {
    fn from(keyword: Keyword) -> Self {
        Self::Keyword(keyword)
    }
}

impl From<Symbol> for Value {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<TaggedValue> for Value {
    fn from(tagged: TaggedValue) -> Self {
        Self::Tagged(tagged)
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::Vector(items)
    }
}

/// Insertion-ordered map with arbitrary keys.
///
/// Keys are compared structurally. Equality between maps ignores entry order.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: Vec<(Value, Value)>,
}

impl Map {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or replaces an entry, returning the previous value.
    ///
    /// Replacing keeps the original position of the key.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Looks up a value by key for mutation.
    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Looks up a value stored under the keyword `name`.
    #[must_use]
    pub fn get_keyword(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key.as_keyword().is_some_and(|kw| kw.as_str() == name))
            .map(|(_, value)| value)
    }

    /// Mutable variant of [`Map::get_keyword`].
    pub fn get_keyword_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key.as_keyword().is_some_and(|kw| kw.as_str() == name))
            .map(|(_, value)| value)
    }

    /// Removes an entry, returning its value.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let position = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(position).1)
    }

    /// Whether any key must be written with the composite-map encoding.
    #[must_use]
    pub fn has_composite_keys(&self) -> bool {
        self.entries.iter().any(|(key, _)| key.is_composite())
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = std::vec::IntoIter<(Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
