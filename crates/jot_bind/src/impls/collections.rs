use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use jot_json::{JsonReader, JsonToken, JsonWriter};

use crate::adapter::{erased_bind, Adapt};
use crate::descriptor::{Described, GenericDescriptorCell, Kind, TypeDescriptor};
use crate::error::JotError;
use crate::registry::{AdapterRegistry, Bind};

// -----------------------------------------------------------------------------
// Option

impl<T: Bind> Described for Option<T> {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::new::<Self>(Kind::Option, vec![T::descriptor()], erased_bind::<Self>)
        })
    }
}

impl<T: Bind> Bind for Option<T> {
    fn bind(registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        Ok(Arc::new(OptionAdapter { inner: registry.resolve::<T>()? }))
    }
}

struct OptionAdapter<T> {
    inner: Arc<dyn Adapt<T>>,
}

impl<T: Send + Sync + 'static> Adapt<Option<T>> for OptionAdapter<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<Option<T>, JotError> {
        if reader.peek()? == JsonToken::Null {
            reader.next_null()?;
            return Ok(None);
        }
        self.inner.read(reader).map(Some)
    }

    fn write(&self, writer: &mut JsonWriter<'_>, value: &Option<T>) -> Result<(), JotError> {
        match value {
            Some(inner) => self.inner.write(writer, inner),
            None => {
                writer.null_value()?;
                Ok(())
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Vec

impl<T: Bind> Described for Vec<T> {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::new::<Self>(Kind::List, vec![T::descriptor()], erased_bind::<Self>)
        })
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn bind(registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        Ok(Arc::new(VecAdapter { inner: registry.resolve::<T>()? }))
    }
}

struct VecAdapter<T> {
    inner: Arc<dyn Adapt<T>>,
}

impl<T: Send + Sync + 'static> Adapt<Vec<T>> for VecAdapter<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<Vec<T>, JotError> {
        reader.begin_array()?;
        let mut items = Vec::new();
        while reader.has_next()? {
            items.push(self.inner.read(reader)?);
        }
        reader.end_array()?;
        Ok(items)
    }

    fn write(&self, writer: &mut JsonWriter<'_>, value: &Vec<T>) -> Result<(), JotError> {
        writer.begin_array()?;
        for item in value {
            self.inner.write(writer, item)?;
        }
        writer.end_array()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Fixed-Length arrays

impl<T: Bind, const N: usize> Described for [T; N] {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::new::<Self>(Kind::Array, vec![T::descriptor()], erased_bind::<Self>)
        })
    }
}

impl<T: Bind, const N: usize> Bind for [T; N] {
    fn bind(registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        Ok(Arc::new(ArrayAdapter { inner: registry.resolve::<T>()? }))
    }
}

struct ArrayAdapter<T> {
    inner: Arc<dyn Adapt<T>>,
}

impl<T: Bind, const N: usize> Adapt<[T; N]> for ArrayAdapter<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<[T; N], JotError> {
        reader.begin_array()?;
        let mut items = Vec::with_capacity(N);
        while reader.has_next()? {
            items.push(self.inner.read(reader)?);
        }
        reader.end_array()?;
        <[T; N]>::try_from(items).map_err(|items: Vec<T>| JotError::Invalid {
            path: <[T; N] as Described>::descriptor().path(),
            detail: format!("expected {N} elements, got {}", items.len()),
        })
    }

    fn write(&self, writer: &mut JsonWriter<'_>, value: &[T; N]) -> Result<(), JotError> {
        writer.begin_array()?;
        for item in value {
            self.inner.write(writer, item)?;
        }
        writer.end_array()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// String-Keyed maps

macro_rules! impl_bind_string_map {
    ($map:ident) => {
        impl<V: Bind> Described for $map<String, V> {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::new::<Self>(
                        Kind::Map,
                        vec![<String as Described>::descriptor(), V::descriptor()],
                        erased_bind::<Self>,
                    )
                })
            }
        }

        impl<V: Bind> Bind for $map<String, V> {
            fn bind(registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
                struct Adapter<V> {
                    inner: Arc<dyn Adapt<V>>,
                }

                impl<V: Send + Sync + 'static> Adapt<$map<String, V>> for Adapter<V> {
                    fn read(
                        &self,
                        reader: &mut JsonReader<'_>,
                    ) -> Result<$map<String, V>, JotError> {
                        reader.begin_object()?;
                        let mut map = $map::new();
                        while reader.has_next()? {
                            let key = reader.next_name()?;
                            // duplicate keys: last write wins
                            map.insert(key, self.inner.read(reader)?);
                        }
                        reader.end_object()?;
                        Ok(map)
                    }

                    fn write(
                        &self,
                        writer: &mut JsonWriter<'_>,
                        value: &$map<String, V>,
                    ) -> Result<(), JotError> {
                        writer.begin_object()?;
                        for (key, item) in value {
                            writer.name(key)?;
                            self.inner.write(writer, item)?;
                        }
                        writer.end_object()?;
                        Ok(())
                    }
                }

                Ok(Arc::new(Adapter { inner: registry.resolve::<V>()? }))
            }
        }
    };
}

impl_bind_string_map!(HashMap);
impl_bind_string_map!(BTreeMap);

// -----------------------------------------------------------------------------
// Box

impl<T: Bind> Described for Box<T> {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            // a box is transparent: it keeps the payload's kind
            TypeDescriptor::new::<Self>(
                T::descriptor().kind(),
                vec![T::descriptor()],
                erased_bind::<Self>,
            )
        })
    }
}

impl<T: Bind> Bind for Box<T> {
    fn bind(registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter<T> {
            inner: Arc<dyn Adapt<T>>,
        }

        impl<T: Send + Sync + 'static> Adapt<Box<T>> for Adapter<T> {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<Box<T>, JotError> {
                self.inner.read(reader).map(Box::new)
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &Box<T>) -> Result<(), JotError> {
                self.inner.write(writer, value)
            }
        }

        Ok(Arc::new(Adapter { inner: registry.resolve::<T>()? }))
    }
}
