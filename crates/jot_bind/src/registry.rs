use core::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::adapter::{Adapt, ErasedAdapter, FutureAdapter};
use crate::construct::ConstructorMap;
use crate::descriptor::{Described, TypeDescriptor};
use crate::error::{JotError, ResolveError};
use crate::factory::AdapterFactory;
use crate::policy::{ExclusionStrategy, NamingPolicy, NullPolicy};
use crate::typeid_map::{new_typeid_map, TypeIdMap};

// -----------------------------------------------------------------------------
// Bind

/// Types that can build their own adapter against a registry.
///
/// `#[derive(Bind)]` generates this (and [`Described`]) from the declared
/// fields; the built-in scalar and container impls are hand-written.
pub trait Bind: Described + Sized + Send + Sync + 'static {
    fn bind(registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError>;
}

// -----------------------------------------------------------------------------
// BindConfig

/// Bind-time configuration shared by every adapter the registry builds.
pub(crate) struct BindConfig {
    pub(crate) naming: NamingPolicy,
    pub(crate) serialize_exclusions: Vec<Arc<dyn ExclusionStrategy>>,
    pub(crate) deserialize_exclusions: Vec<Arc<dyn ExclusionStrategy>>,
    pub(crate) version: Option<f64>,
    pub(crate) null_policy: NullPolicy,
    pub(crate) constructors: ConstructorMap,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            naming: NamingPolicy::default(),
            serialize_exclusions: Vec::new(),
            deserialize_exclusions: Vec::new(),
            version: None,
            null_policy: NullPolicy::default(),
            constructors: ConstructorMap::new(),
        }
    }
}

// -----------------------------------------------------------------------------
// AdapterRegistry

/// Resolves type descriptors to adapters through an ordered factory chain,
/// memoizing the result per type.
///
/// Resolution is recursion-safe: a [`FutureAdapter`] placeholder is
/// installed before the chain runs, so a self-referential type resolving
/// its own members observes the placeholder instead of recursing. The
/// cache sits behind a re-entrant lock; other threads block until an
/// in-flight resolution completes and only ever observe finished adapters.
pub struct AdapterRegistry {
    factories: Vec<Arc<dyn AdapterFactory>>,
    cache: ReentrantMutex<RefCell<TypeIdMap<ErasedAdapter>>>,
    config: BindConfig,
}

impl AdapterRegistry {
    pub(crate) fn new(factories: Vec<Arc<dyn AdapterFactory>>, config: BindConfig) -> Self {
        Self {
            factories,
            cache: ReentrantMutex::new(RefCell::new(new_typeid_map())),
            config,
        }
    }

    pub(crate) fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Resolves the adapter for `T`, building and caching it on first use.
    ///
    /// Exactly one adapter instance per type is ever installed; repeated
    /// calls return handles to the same instance.
    pub fn resolve<T: Bind>(&self) -> Result<Arc<dyn Adapt<T>>, JotError> {
        let descriptor = T::descriptor();
        let guard = self.cache.lock();
        if let Some(hit) = guard.borrow().get(&descriptor.id()) {
            return hit
                .downcast::<T>()
                .ok_or_else(|| ResolveError::AdapterTypeMismatch { path: descriptor.path() }.into());
        }

        let future = Arc::new(FutureAdapter::<T>::new(descriptor));
        let placeholder: Arc<dyn Adapt<T>> = future.clone();
        guard
            .borrow_mut()
            .insert(descriptor.id(), ErasedAdapter::new(placeholder));

        // May re-enter `resolve` on this thread for member types, including
        // `T` itself, which then sees the placeholder.
        match self.run_chain(descriptor) {
            Ok(erased) => {
                let Some(adapter) = erased.downcast::<T>() else {
                    guard.borrow_mut().remove(&descriptor.id());
                    return Err(
                        ResolveError::AdapterTypeMismatch { path: descriptor.path() }.into(),
                    );
                };
                future.fill(adapter.clone());
                guard
                    .borrow_mut()
                    .insert(descriptor.id(), ErasedAdapter::new(adapter.clone()));
                Ok(adapter)
            },
            Err(e) => {
                guard.borrow_mut().remove(&descriptor.id());
                Err(e)
            },
        }
    }

    fn run_chain(&self, descriptor: &'static TypeDescriptor) -> Result<ErasedAdapter, JotError> {
        for factory in &self.factories {
            if let Some(result) = factory.create(self, descriptor) {
                return result;
            }
        }
        Err(ResolveError::NoFactory { path: descriptor.path() }.into())
    }
}

impl core::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("factories", &self.factories.len())
            .finish()
    }
}
