//! Transit-JSON codec for the EdgeX UI gateway.
//!
//! The browser client talks Transit, a JSON encoding that preserves
//! keywords, symbols, tagged extension values and maps with composite keys.
//! This crate provides the [`Value`] model together with a reader that
//! understands both the compact and verbose encodings (including `^N` cache
//! references) and a writer that emits the compact encoding.

mod cache;
mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_str};
pub use encode::{encode, encode_to_string, to_json};
pub use error::TransitError;
pub use value::{Keyword, Map, Symbol, TaggedValue, Value};
