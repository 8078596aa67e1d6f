use crate::error::JotError;
use crate::registry::{AdapterRegistry, Bind};

// -----------------------------------------------------------------------------
// BindPlugin

/// A startup registration contributed by `#[jot(auto_register)]`.
///
/// Collected through `inventory`;
/// [`JotBuilder::build_registered`](crate::JotBuilder::build_registered)
/// resolves every submitted type up front, so bind-time errors surface when
/// the engine is built instead of on first use.
pub struct BindPlugin {
    warm: fn(&AdapterRegistry) -> Result<(), JotError>,
}

impl BindPlugin {
    pub const fn new<T: Bind>() -> Self {
        Self { warm: warm::<T> }
    }

    pub(crate) fn apply(&self, registry: &AdapterRegistry) -> Result<(), JotError> {
        (self.warm)(registry)
    }
}

fn warm<T: Bind>(registry: &AdapterRegistry) -> Result<(), JotError> {
    registry.resolve::<T>().map(|_| ())
}

inventory::collect!(BindPlugin);

// -----------------------------------------------------------------------------
// Tests
