use crate::adapter::ErasedAdapter;
use crate::descriptor::{Kind, TypeDescriptor};
use crate::error::JotError;
use crate::registry::AdapterRegistry;

// -----------------------------------------------------------------------------
// AdapterFactory

/// One link of the registry's resolution chain.
///
/// Factories are consulted in registration order; the first one that does
/// not decline owns the type. User factories can be slotted before or after
/// the built-in chain.
pub trait AdapterFactory: Send + Sync {
    /// `None` declines the descriptor; `Some` claims it, successfully or
    /// not.
    fn create(
        &self,
        registry: &AdapterRegistry,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Result<ErasedAdapter, JotError>>;
}

// -----------------------------------------------------------------------------
// Built-In chain

/// Claims exact leaf types: scalars, strings, and the tree model.
pub(crate) struct ExactFactory;

impl AdapterFactory for ExactFactory {
    fn create(
        &self,
        registry: &AdapterRegistry,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Result<ErasedAdapter, JotError>> {
        matches!(descriptor.kind(), Kind::Scalar | Kind::String | Kind::Tree)
            .then(|| descriptor.bind_erased(registry))
    }
}

/// Claims structural containers, composing over their argument types.
pub(crate) struct StructuralFactory;

impl AdapterFactory for StructuralFactory {
    fn create(
        &self,
        registry: &AdapterRegistry,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Result<ErasedAdapter, JotError>> {
        matches!(descriptor.kind(), Kind::Option | Kind::List | Kind::Array | Kind::Map)
            .then(|| descriptor.bind_erased(registry))
    }
}

/// Claims derive-bound structs and enums.
pub(crate) struct ReflectiveFactory;

impl AdapterFactory for ReflectiveFactory {
    fn create(
        &self,
        registry: &AdapterRegistry,
        descriptor: &'static TypeDescriptor,
    ) -> Option<Result<ErasedAdapter, JotError>> {
        matches!(descriptor.kind(), Kind::Struct | Kind::Enum)
            .then(|| descriptor.bind_erased(registry))
    }
}
