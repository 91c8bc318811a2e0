//! Decoding of request batches into operations.
//!
//! The client sends a Transit vector whose entries take one of these shapes:
//!
//! | Wire shape | Operation |
//! |------------|-----------|
//! | `{:key [params]}` | [`Operation::RootQuery`] per entry |
//! | `{[:key id] [params]}` | [`Operation::EntityQuery`] per entry |
//! | `(({:key [params]}) {args})` | [`Operation::QueryWithArgs`] per entry |
//! | `(symbol {args})` | [`Operation::Mutation`] |
//!
//! A bare keyword is read as a root query without parameters.

use edgex_transit::{Keyword, Map, Symbol, Value};

use super::args::Args;
use super::errors::DispatchError;
use super::response::ContainerKind;

/// Query against a top-level key.
#[derive(Debug, Clone, PartialEq)]
pub struct RootQuery {
    /// Handler key.
    pub key: Keyword,
    /// Requested sub-properties; handlers may ignore them.
    pub params: Vec<Value>,
}

/// Query against a specific entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityQuery {
    /// Full `[key id]` ident, echoed back as the response key.
    pub ident: Value,
    /// First element of the ident; selects the handler.
    pub key: Keyword,
    /// Requested sub-properties.
    pub params: Vec<Value>,
}

/// Query wrapped by [`Operation::QueryWithArgs`].
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Root query.
    Root(RootQuery),
    /// Entity query.
    Entity(EntityQuery),
}

impl Query {
    /// Handler key.
    #[must_use]
    pub fn key(&self) -> &Keyword {
        match self {
            Self::Root(query) => &query.key,
            Self::Entity(query) => &query.key,
        }
    }

    /// Requested sub-properties.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        match self {
            Self::Root(query) => &query.params,
            Self::Entity(query) => &query.params,
        }
    }

    /// Key under which the result is stored.
    #[must_use]
    pub fn response_key(&self) -> Value {
        match self {
            Self::Root(query) => Value::Keyword(query.key.clone()),
            Self::Entity(query) => query.ident.clone(),
        }
    }

    fn container_kind(&self) -> ContainerKind {
        match self {
            Self::Root(_) => ContainerKind::Root,
            Self::Entity(_) => ContainerKind::Entity,
        }
    }

    fn to_entry(&self) -> (Value, Value) {
        (self.response_key(), Value::Vector(self.params().to_vec()))
    }
}

/// Named server-side write.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Fully qualified mutation symbol.
    pub name: Symbol,
    /// Mutation arguments.
    pub args: Args,
}

/// One unit of work in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Query against a top-level key.
    RootQuery(RootQuery),
    /// Query against a specific entity.
    EntityQuery(EntityQuery),
    /// Query carrying an argument map.
    QueryWithArgs {
        /// Wrapped query.
        query: Query,
        /// Arguments.
        args: Args,
    },
    /// Named write.
    Mutation(Mutation),
}

impl Operation {
    /// Container kind this operation produces when it is first in a batch.
    #[must_use]
    pub fn container_kind(&self) -> ContainerKind {
        match self {
            Self::RootQuery(_) => ContainerKind::Root,
            Self::EntityQuery(_) => ContainerKind::Entity,
            Self::QueryWithArgs { query, .. } => query.container_kind(),
            Self::Mutation(_) => ContainerKind::Mutation,
        }
    }

    /// Human-readable name of the handler key for logging.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::RootQuery(query) => query.key.to_string(),
            Self::EntityQuery(query) => query.key.to_string(),
            Self::QueryWithArgs { query, .. } => query.key().to_string(),
            Self::Mutation(mutation) => mutation.name.to_string(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::RootQuery(query) => single_entry(Query::Root(query.clone()).to_entry()),
            Self::EntityQuery(query) => single_entry(Query::Entity(query.clone()).to_entry()),
            Self::QueryWithArgs { query, args } => Value::List(vec![
                single_entry(query.to_entry()),
                Value::Map(args.as_map().clone()),
            ]),
            Self::Mutation(mutation) => Value::List(vec![
                Value::Symbol(mutation.name.clone()),
                Value::Map(mutation.args.as_map().clone()),
            ]),
        }
    }
}

fn single_entry((key, value): (Value, Value)) -> Value {
    let mut map = Map::new();
    map.insert(key, value);
    Value::Map(map)
}

/// Ordered operations decoded from one request body.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    operations: Vec<Operation>,
}

impl BatchRequest {
    /// Builds a batch from already-decoded operations.
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    /// Decodes a request body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the body is not Transit, is not a
    /// non-empty vector, or contains an entry of unknown shape.
    pub fn parse(body: &[u8]) -> Result<Self, DispatchError> {
        let value = edgex_transit::decode(body)?;
        Self::from_value(value)
    }

    /// Interprets an already-decoded Transit value.
    ///
    /// # Errors
    ///
    /// See [`BatchRequest::parse`].
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        let entries = match value {
            Value::Vector(entries) | Value::List(entries) => entries,
            other => return Err(DispatchError::NotABatch { found: other.kind() }),
        };
        if entries.is_empty() {
            return Err(DispatchError::EmptyBatch);
        }

        let mut operations = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            decode_entry(index, entry, &mut operations)?;
        }
        Ok(Self { operations })
    }

    /// Re-encodes the batch in the wire shape the client uses.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Vector(self.operations.iter().map(Operation::to_value).collect())
    }

    /// Decoded operations in request order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Consumes the batch, yielding its operations.
    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

fn decode_entry(
    index: usize,
    entry: Value,
    operations: &mut Vec<Operation>,
) -> Result<(), DispatchError> {
    match entry {
        Value::Map(map) => {
            for query in decode_queries(index, map)? {
                operations.push(match query {
                    Query::Root(query) => Operation::RootQuery(query),
                    Query::Entity(query) => Operation::EntityQuery(query),
                });
            }
            Ok(())
        }
        Value::Keyword(key) => {
            operations.push(Operation::RootQuery(RootQuery {
                key,
                params: Vec::new(),
            }));
            Ok(())
        }
        Value::List(parts) => decode_list(index, parts, operations),
        other => Err(DispatchError::unsupported(
            index,
            format!("expected a map, keyword or list, found {}", other.kind()),
        )),
    }
}

fn decode_list(
    index: usize,
    parts: Vec<Value>,
    operations: &mut Vec<Operation>,
) -> Result<(), DispatchError> {
    let mut parts = parts.into_iter();
    let (Some(head), Some(args), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DispatchError::unsupported(
            index,
            "expected a two-element list of head and arguments",
        ));
    };
    let args = match args {
        Value::Map(map) => Args::new(map),
        Value::Null => Args::default(),
        other => {
            return Err(DispatchError::unsupported(
                index,
                format!("arguments must be a map, found {}", other.kind()),
            ));
        }
    };

    match head {
        Value::Symbol(name) => operations.push(Operation::Mutation(Mutation { name, args })),
        Value::Map(map) => {
            for query in decode_queries(index, map)? {
                operations.push(Operation::QueryWithArgs {
                    query,
                    args: args.clone(),
                });
            }
        }
        Value::Keyword(key) => operations.push(Operation::QueryWithArgs {
            query: Query::Root(RootQuery {
                key,
                params: Vec::new(),
            }),
            args,
        }),
        other => {
            return Err(DispatchError::unsupported(
                index,
                format!(
                    "list head must be a symbol, map or keyword, found {}",
                    other.kind()
                ),
            ));
        }
    }
    Ok(())
}

fn decode_queries(index: usize, map: Map) -> Result<Vec<Query>, DispatchError> {
    if map.is_empty() {
        return Err(DispatchError::unsupported(index, "query map is empty"));
    }
    map.into_iter()
        .map(|(key, value)| {
            let params = decode_params(index, value)?;
            match key {
                Value::Keyword(key) => Ok(Query::Root(RootQuery { key, params })),
                Value::Vector(ident) => {
                    let [Value::Keyword(handler), _] = ident.as_slice() else {
                        return Err(DispatchError::unsupported(
                            index,
                            "entity ident must be a [keyword id] pair",
                        ));
                    };
                    Ok(Query::Entity(EntityQuery {
                        key: handler.clone(),
                        ident: Value::Vector(ident),
                        params,
                    }))
                }
                other => Err(DispatchError::unsupported(
                    index,
                    format!("query key must be a keyword or ident, found {}", other.kind()),
                )),
            }
        })
        .collect()
}

fn decode_params(index: usize, value: Value) -> Result<Vec<Value>, DispatchError> {
    match value {
        Value::Vector(params) | Value::List(params) => Ok(params),
        Value::Null => Ok(Vec::new()),
        other => Err(DispatchError::unsupported(
            index,
            format!("query parameters must be a vector, found {}", other.kind()),
        )),
    }
}
