use core::any::TypeId;
use core::hash::{Hash, Hasher};
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::adapter::ErasedAdapter;
use crate::error::JotError;
use crate::registry::AdapterRegistry;
use crate::typeid_map::{new_typeid_map, TypeIdMap};

// -----------------------------------------------------------------------------
// Kind

/// Structural category of a described type.
///
/// Factories dispatch on the kind; the binder additionally uses
/// [`Kind::Option`] to know which members can represent JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Numbers, booleans, `char`.
    Scalar,
    String,
    Option,
    /// Growable sequences (`Vec`).
    List,
    /// Fixed-length sequences (`[T; N]`).
    Array,
    /// String-keyed maps.
    Map,
    Struct,
    Enum,
    /// The [`JsonValue`](jot_json::JsonValue) tree itself.
    Tree,
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// Runtime identity of a possibly-generic type.
///
/// Equality and hashing delegate to the [`TypeId`]: equivalent generic
/// instantiations share one `TypeId` across call sites, so structural
/// equality and identity coincide. The argument descriptors are carried for
/// diagnostics and factory dispatch, not for comparison.
pub struct TypeDescriptor {
    id: TypeId,
    path: &'static str,
    name: &'static str,
    kind: Kind,
    args: Vec<&'static TypeDescriptor>,
    binder: fn(&AdapterRegistry) -> Result<ErasedAdapter, JotError>,
}

impl TypeDescriptor {
    /// Describes `T`. The `binder` is the erased entry point the built-in
    /// factories invoke to build `T`'s adapter, normally
    /// [`erased_bind::<T>`](crate::erased_bind).
    pub fn new<T: 'static>(
        kind: Kind,
        args: Vec<&'static TypeDescriptor>,
        binder: fn(&AdapterRegistry) -> Result<ErasedAdapter, JotError>,
    ) -> Self {
        let path = core::any::type_name::<T>();
        Self { id: TypeId::of::<T>(), path, name: short_name(path), kind, args, binder }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full path of the type, generic arguments included.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Short name: the last path segment, generic arguments included.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Descriptors of the resolved generic arguments, in declaration order.
    pub fn args(&self) -> &[&'static TypeDescriptor] {
        &self.args
    }

    /// Builds this type's adapter through its own `Bind` impl.
    pub fn bind_erased(&self, registry: &AdapterRegistry) -> Result<ErasedAdapter, JotError> {
        (self.binder)(registry)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Trims a `type_name` to its final segment, keeping generic arguments.
fn short_name(path: &'static str) -> &'static str {
    let head = path.split('<').next().unwrap_or(path);
    match head.rfind("::") {
        Some(idx) => &path[idx + 2..],
        None => path,
    }
}

// -----------------------------------------------------------------------------
// Described

/// Types with a canonical, lazily-built [`TypeDescriptor`].
pub trait Described: 'static {
    fn descriptor() -> &'static TypeDescriptor;
}

// -----------------------------------------------------------------------------
// Cells

/// Lazily initialized descriptor storage for a non-generic type.
///
/// ```ignore
/// static CELL: DescriptorCell = DescriptorCell::new();
/// CELL.get_or_init(|| TypeDescriptor::new::<Self>(..))
/// ```
pub struct DescriptorCell(OnceLock<TypeDescriptor>);

impl DescriptorCell {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    pub fn get_or_init(&self, f: impl FnOnce() -> TypeDescriptor) -> &TypeDescriptor {
        self.0.get_or_init(f)
    }
}

impl Default for DescriptorCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor storage for a generic type: one leaked descriptor per
/// monomorphization, keyed by `TypeId`.
pub struct GenericDescriptorCell(RwLock<TypeIdMap<&'static TypeDescriptor>>);

impl GenericDescriptorCell {
    pub const fn new() -> Self {
        Self(RwLock::new(new_typeid_map()))
    }

    pub fn get_or_insert<T: 'static>(
        &self,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> &'static TypeDescriptor {
        let id = TypeId::of::<T>();
        if let Some(descriptor) = self.0.read().get(&id) {
            return descriptor;
        }
        let mut map = self.0.write();
        map.entry(id).or_insert_with(|| Box::leak(Box::new(f())))
    }
}

impl Default for GenericDescriptorCell {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests
