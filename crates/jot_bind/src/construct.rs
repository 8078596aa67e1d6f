use core::any::{Any, TypeId};
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{ConstructError, JotError};
use crate::typeid_map::{new_typeid_map, TypeIdMap};

// -----------------------------------------------------------------------------
// ConstructorMap

/// Manually registered constructors, keyed by [`TypeId`].
pub(crate) struct ConstructorMap {
    map: TypeIdMap<Arc<dyn Any + Send + Sync>>,
}

impl Default for ConstructorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructorMap {
    pub(crate) fn new() -> Self {
        Self { map: new_typeid_map() }
    }

    pub(crate) fn insert<T: 'static>(&mut self, f: impl Fn() -> T + Send + Sync + 'static) {
        let f: Arc<dyn Fn() -> T + Send + Sync> = Arc::new(f);
        self.map.insert(TypeId::of::<T>(), Arc::new(f));
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<Arc<dyn Fn() -> T + Send + Sync>> {
        self.map
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Arc<dyn Fn() -> T + Send + Sync>>()
            .cloned()
    }
}

// -----------------------------------------------------------------------------
// Constructor

/// How the binder produces the instance a read fills in.
///
/// Consulted in order: a registered constructor is the most specific, then
/// the `#[jot(default)]`-declared `Default`. With neither, reading fails
/// with a [`ConstructError`] naming the type.
pub(crate) enum Constructor<T> {
    Manual(Arc<dyn Fn() -> T + Send + Sync>),
    Declared(fn() -> T),
    Missing,
}

impl<T> Constructor<T> {
    pub(crate) fn construct(&self, descriptor: &'static TypeDescriptor) -> Result<T, JotError> {
        match self {
            Self::Manual(f) => Ok(f()),
            Self::Declared(f) => Ok(f()),
            Self::Missing => {
                Err(ConstructError::NoConstructor { path: descriptor.path() }.into())
            },
        }
    }
}

impl<T> core::fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Manual(_) => "Manual(..)",
            Self::Declared(_) => "Declared(..)",
            Self::Missing => "Missing",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Described;

    #[test]
    fn registered_constructor_is_recovered_typed() {
        let mut map = ConstructorMap::new();
        map.insert(|| 7_i64);
        assert_eq!(map.get::<i64>().unwrap()(), 7);
        assert!(map.get::<u64>().is_none());
    }

    #[test]
    fn missing_constructor_names_the_type() {
        let missing = Constructor::<i64>::Missing;
        let err = missing.construct(<i64 as Described>::descriptor()).unwrap_err();
        assert!(matches!(
            err,
            JotError::Construct(ConstructError::NoConstructor { path: "i64" }),
        ));
    }
}
