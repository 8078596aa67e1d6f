use core::any::TypeId;
use core::hash::{BuildHasher, Hasher};
use std::collections::HashMap;

/// [`TypeId`]-keyed map that skips re-hashing the already-hashed key.
pub(crate) type TypeIdMap<V> = HashMap<TypeId, V, NoOpTypeIdHash>;

pub(crate) const fn new_typeid_map<V>() -> TypeIdMap<V> {
    HashMap::with_hasher(NoOpTypeIdHash)
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NoOpTypeIdHash;

impl BuildHasher for NoOpTypeIdHash {
    type Hasher = NoOpTypeIdHasher;

    fn build_hasher(&self) -> Self::Hasher {
        NoOpTypeIdHasher(0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct NoOpTypeIdHasher(u64);

impl Hasher for NoOpTypeIdHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        // TypeId feeds its internal hash through here on some toolchains
        for &b in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }

    fn write_u128(&mut self, n: u128) {
        self.0 = n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_finds_by_type_id() {
        let mut map = new_typeid_map::<&str>();
        map.insert(TypeId::of::<u8>(), "u8");
        map.insert(TypeId::of::<String>(), "string");
        assert_eq!(map.get(&TypeId::of::<u8>()), Some(&"u8"));
        assert_eq!(map.get(&TypeId::of::<String>()), Some(&"string"));
        assert_eq!(map.get(&TypeId::of::<u16>()), None);
    }
}
