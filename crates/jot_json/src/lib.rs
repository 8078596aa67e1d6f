//! Streaming token-level JSON reader/writer, plus an in-memory tree model.
//!
//! [`JsonReader`] is a pull cursor over a `&str` source; [`JsonWriter`] is a
//! push cursor into a [`core::fmt::Write`] sink. Both enforce JSON grammar
//! through a stack of [`Scope`]s and support a strict (default) and a
//! lenient grammar mode.
//!
//! [`JsonValue`] is the tree model: buildable by replaying reader tokens,
//! replayable into any writer, and buildable through the [`TreeWriter`]
//! façade.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod read;
mod scope;
mod value;
mod write;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::JsonError;
pub use read::{JsonReader, JsonToken};
pub use scope::Scope;
pub use value::{JsonNumber, JsonObject, JsonValue, TreeWriter};
pub use write::JsonWriter;
