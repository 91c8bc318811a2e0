//! Response containers and batch outcomes.

use edgex_transit::{Map, TaggedValue, TransitError, Value};

/// Reserved key under which tempid remappings are returned.
pub const TEMPIDS_KEY: &str = "fulcro.client.primitives/tempids";

/// Shape of the container allocated for a batch.
///
/// The kind is fixed by the first operation. Later operations of a different
/// kind still insert under their own key; the encoder switches to the
/// composite-map form whenever an ident key is present, so no key is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Keyword keys.
    Root,
    /// Ident keys.
    Entity,
    /// Symbol keys.
    Mutation,
}

/// Results of one batch keyed by keyword, ident or symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContainer {
    kind: ContainerKind,
    entries: Map,
}

impl ResponseContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            entries: Map::new(),
        }
    }

    /// Kind chosen when the container was allocated.
    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Stores one operation result.
    pub fn insert(&mut self, key: Value, value: Value) {
        self.entries.insert(key, value);
    }

    /// Looks up a stored result.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of stored results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no result was stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the container into the value written on the wire.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Map(self.entries)
    }
}

/// Final state of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every operation succeeded or was skipped.
    Done(ResponseContainer),
    /// An operation failed; partial results were discarded.
    Failed {
        /// Display string of the first failure.
        message: String,
    },
}

impl BatchOutcome {
    /// Value written on the wire for this outcome.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Done(container) => container.into_value(),
            Self::Failed { message } => error_container(message),
        }
    }

    /// Encodes the outcome as Transit bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransitError`] if serialisation fails.
    pub fn encode(self) -> Result<Vec<u8>, TransitError> {
        edgex_transit::encode(&self.into_value())
    }
}

/// Single-entry map carrying a failure message under the string key
/// `"message"`.
#[must_use]
pub fn error_container(message: impl Into<String>) -> Value {
    let mut map = Map::new();
    map.insert(Value::string("message"), Value::String(message.into()));
    Value::Map(map)
}

/// Wraps a server-assigned id so the client can replace its placeholder.
///
/// Produces `{:fulcro.client.primitives/tempids {placeholder id}}`.
#[must_use]
pub fn tempid_result(placeholder: TaggedValue, id: Value) -> Value {
    let mut remap = Map::new();
    remap.insert(Value::Tagged(placeholder), id);
    let mut map = Map::new();
    map.insert(Value::keyword(TEMPIDS_KEY), Value::Map(remap));
    Value::Map(map)
}
