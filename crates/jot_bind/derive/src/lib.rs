//! Derive support for `jot_bind`. See [`Bind`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod expand;

/// Derives `Described` and `Bind` for a named-field struct, a unit struct,
/// or a fieldless enum.
///
/// Structs serialize as objects with one member per field, in declaration
/// order; fieldless enums serialize as their variant-name string.
/// `PhantomData` fields are ignored.
///
/// ## Container attributes
///
/// - `#[jot(default)]`: use the type's `Default` impl to construct the
///   instance a read fills in. Without it (or a constructor registered on
///   the builder), deserialization fails.
/// - `#[jot(auto_register)]`: submit the type so
///   `JotBuilder::build_registered` resolves its adapter up front. Requires
///   the `auto_register` feature; ignored for generic types.
///
/// ## Field attributes
///
/// - `#[jot(rename = "name")]`: serialized name, overriding the engine's
///   naming policy.
/// - `#[jot(skip)]`, `#[jot(skip_serializing)]`, `#[jot(skip_deserializing)]`:
///   exclude the field from both or one direction.
/// - `#[jot(since = 1.0)]`, `#[jot(until = 2.0)]`: version interval the
///   field takes part in, against the engine's configured version.
///
/// ## Variant attributes
///
/// - `#[jot(rename = "name")]`: serialized variant name.
///
/// ```rust, ignore
/// #[derive(Bind, Default)]
/// #[jot(default)]
/// struct Account {
///     #[jot(rename = "id")]
///     account_id: u64,
///     #[jot(since = 2.0)]
///     email: Option<String>,
///     #[jot(skip)]
///     session: u64,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(jot))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
