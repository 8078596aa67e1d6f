#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use jot_bind as bind;
pub use jot_json as json;

pub use jot_bind::derive::Bind;
pub use jot_bind::{Jot, JotBuilder, JotError};
pub use jot_json::{JsonReader, JsonValue, JsonWriter};
