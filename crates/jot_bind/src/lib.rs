//! Type descriptors, adapter resolution, and the derive-driven object
//! binder.
//!
//! The pipeline: a type implements [`Described`] (its [`TypeDescriptor`])
//! and [`Bind`] (how to build its codec). An [`AdapterRegistry`] resolves
//! descriptors to shared [`Adapt`] codecs through an ordered factory chain
//! with a recursion-safe cache. [`Jot`] and [`JotBuilder`] are the
//! user-facing entry points.
//!
//! Most types never implement any of this by hand: `#[derive(Bind)]`
//! generates the impls from the declared fields.
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate self as jot_bind;

pub use jot_json as json;

#[cfg(feature = "auto_register")]
pub use inventory;

// -----------------------------------------------------------------------------
// Modules

mod adapter;
mod bind;
mod construct;
mod descriptor;
mod engine;
mod error;
mod factory;
mod impls;
#[cfg(feature = "auto_register")]
mod plugin;
mod policy;
mod registry;
mod typeid_map;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use adapter::{erased_bind, Adapt, ErasedAdapter, FutureAdapter};
pub use bind::{bind_enum, bind_struct, FieldSpec, ReadFieldFn, VariantSpec, WriteFieldFn};
pub use descriptor::{Described, DescriptorCell, GenericDescriptorCell, Kind, TypeDescriptor};
pub use engine::{Jot, JotBuilder};
pub use error::{BindError, ConstructError, JotError, ResolveError};
pub use factory::AdapterFactory;
#[cfg(feature = "auto_register")]
pub use plugin::BindPlugin;
pub use policy::{Direction, ExclusionStrategy, FieldView, NamingPolicy, NullPolicy};
pub use registry::{AdapterRegistry, Bind};

/// Derives [`Described`] and [`Bind`] from a type's declared fields.
pub mod derive {
    pub use jot_bind_derive::Bind;
}
