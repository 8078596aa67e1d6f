use std::sync::Arc;

use jot_json::{JsonReader, JsonValue, JsonWriter};

use crate::adapter::{erased_bind, Adapt};
use crate::descriptor::{Described, DescriptorCell, Kind, TypeDescriptor};
use crate::error::JotError;
use crate::registry::{AdapterRegistry, Bind};

impl Described for JsonValue {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: DescriptorCell = DescriptorCell::new();
        CELL.get_or_init(|| {
            TypeDescriptor::new::<JsonValue>(Kind::Tree, Vec::new(), erased_bind::<JsonValue>)
        })
    }
}

impl Bind for JsonValue {
    fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter;
        impl Adapt<JsonValue> for Adapter {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<JsonValue, JotError> {
                Ok(JsonValue::read(reader)?)
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &JsonValue) -> Result<(), JotError> {
                value.write(writer)?;
                Ok(())
            }
        }
        Ok(Arc::new(Adapter))
    }
}
