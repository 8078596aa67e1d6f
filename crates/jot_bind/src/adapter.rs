use core::any::Any;
use std::sync::{Arc, OnceLock};

use jot_json::{JsonReader, JsonWriter};

use crate::descriptor::TypeDescriptor;
use crate::error::{JotError, ResolveError};
use crate::registry::{AdapterRegistry, Bind};

// -----------------------------------------------------------------------------
// Adapt

/// Bidirectional codec between `T` and JSON tokens.
///
/// Adapters are stateless per call, shared as `Arc<dyn Adapt<T>>`, and must
/// be reentrant: a registry hands out one instance per type for the life of
/// the engine.
pub trait Adapt<T>: Send + Sync + 'static {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<T, JotError>;

    fn write(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<(), JotError>;
}

/// Builds `T`'s adapter and erases it, so a [`TypeDescriptor`] can carry
/// the entry point as a plain fn pointer.
pub fn erased_bind<T: Bind>(registry: &AdapterRegistry) -> Result<ErasedAdapter, JotError> {
    T::bind(registry).map(ErasedAdapter::new)
}

// -----------------------------------------------------------------------------
// ErasedAdapter

/// Type-erased shared adapter, the registry's cache currency.
#[derive(Clone)]
pub struct ErasedAdapter {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedAdapter {
    pub fn new<T: 'static>(adapter: Arc<dyn Adapt<T>>) -> Self {
        Self { inner: Arc::new(adapter) }
    }

    /// Recovers the typed adapter; `None` when `T` is not the erased type.
    pub fn downcast<T: 'static>(&self) -> Option<Arc<dyn Adapt<T>>> {
        self.inner.downcast_ref::<Arc<dyn Adapt<T>>>().cloned()
    }
}

impl core::fmt::Debug for ErasedAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ErasedAdapter(..)")
    }
}

// -----------------------------------------------------------------------------
// FutureAdapter

/// Recursion placeholder installed in the cache before resolution runs.
///
/// A recursive resolution of the same type observes this placeholder
/// instead of recursing; once the real adapter exists the slot is filled
/// and every call delegates to it.
pub struct FutureAdapter<T> {
    descriptor: &'static TypeDescriptor,
    slot: OnceLock<Arc<dyn Adapt<T>>>,
}

impl<T> FutureAdapter<T> {
    pub(crate) fn new(descriptor: &'static TypeDescriptor) -> Self {
        Self { descriptor, slot: OnceLock::new() }
    }

    /// Fills the slot; returns `false` if it was already filled.
    pub(crate) fn fill(&self, adapter: Arc<dyn Adapt<T>>) -> bool {
        self.slot.set(adapter).is_ok()
    }

    fn delegate(&self) -> Result<&Arc<dyn Adapt<T>>, JotError> {
        self.slot.get().ok_or_else(|| {
            ResolveError::PlaceholderUnfilled { path: self.descriptor.path() }.into()
        })
    }
}

impl<T: 'static> Adapt<T> for FutureAdapter<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<T, JotError> {
        self.delegate()?.read(reader)
    }

    fn write(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<(), JotError> {
        self.delegate()?.write(writer, value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Described;

    #[test]
    fn erased_adapter_round_trips_through_downcast() {
        struct Unit;
        impl Adapt<u8> for Unit {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<u8, JotError> {
                Ok(reader.next_i64()? as u8)
            }
            fn write(&self, writer: &mut JsonWriter<'_>, value: &u8) -> Result<(), JotError> {
                writer.i64_value(i64::from(*value))?;
                Ok(())
            }
        }
        let typed: Arc<dyn Adapt<u8>> = Arc::new(Unit);
        let erased = ErasedAdapter::new(typed.clone());
        let back = erased.downcast::<u8>().unwrap();
        assert!(Arc::ptr_eq(&typed, &back));
        assert!(erased.downcast::<u16>().is_none());
    }

    #[test]
    fn unfilled_placeholder_reports_resolution_in_progress() {
        let future = FutureAdapter::<u8>::new(<u8 as Described>::descriptor());
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out);
        let err = future.write(&mut writer, &1).unwrap_err();
        assert!(matches!(
            err,
            JotError::Resolve(ResolveError::PlaceholderUnfilled { .. }),
        ));
    }
}
