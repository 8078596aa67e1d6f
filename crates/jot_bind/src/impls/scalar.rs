use std::sync::Arc;

use jot_json::{JsonError, JsonReader, JsonWriter};

use crate::adapter::{erased_bind, Adapt};
use crate::descriptor::{Described, DescriptorCell, Kind, TypeDescriptor};
use crate::error::JotError;
use crate::registry::{AdapterRegistry, Bind};

macro_rules! impl_described_leaf {
    ($t:ty, $kind:expr) => {
        impl Described for $t {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: DescriptorCell = DescriptorCell::new();
                CELL.get_or_init(|| {
                    TypeDescriptor::new::<$t>($kind, Vec::new(), erased_bind::<$t>)
                })
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Integers

macro_rules! impl_bind_signed {
    ($($t:ty),+ $(,)?) => {$(
        impl_described_leaf!($t, Kind::Scalar);

        impl Bind for $t {
            fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
                struct Adapter;
                impl Adapt<$t> for Adapter {
                    fn read(&self, reader: &mut JsonReader<'_>) -> Result<$t, JotError> {
                        let wide = reader.next_i64()?;
                        <$t>::try_from(wide).map_err(|_| {
                            JotError::Json(JsonError::NumberRange {
                                text: wide.to_string(),
                                target: stringify!($t),
                            })
                        })
                    }

                    fn write(
                        &self,
                        writer: &mut JsonWriter<'_>,
                        value: &$t,
                    ) -> Result<(), JotError> {
                        writer.i64_value(*value as i64)?;
                        Ok(())
                    }
                }
                Ok(Arc::new(Adapter))
            }
        }
    )+};
}

macro_rules! impl_bind_unsigned {
    ($($t:ty),+ $(,)?) => {$(
        impl_described_leaf!($t, Kind::Scalar);

        impl Bind for $t {
            fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
                struct Adapter;
                impl Adapt<$t> for Adapter {
                    fn read(&self, reader: &mut JsonReader<'_>) -> Result<$t, JotError> {
                        let wide = reader.next_u64()?;
                        <$t>::try_from(wide).map_err(|_| {
                            JotError::Json(JsonError::NumberRange {
                                text: wide.to_string(),
                                target: stringify!($t),
                            })
                        })
                    }

                    fn write(
                        &self,
                        writer: &mut JsonWriter<'_>,
                        value: &$t,
                    ) -> Result<(), JotError> {
                        writer.u64_value(*value as u64)?;
                        Ok(())
                    }
                }
                Ok(Arc::new(Adapter))
            }
        }
    )+};
}

impl_bind_signed!(i8, i16, i32, i64, isize);
impl_bind_unsigned!(u8, u16, u32, u64, usize);

// -----------------------------------------------------------------------------
// Floats

impl_described_leaf!(f64, Kind::Scalar);

impl Bind for f64 {
    fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter;
        impl Adapt<f64> for Adapter {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<f64, JotError> {
                Ok(reader.next_f64()?)
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &f64) -> Result<(), JotError> {
                writer.f64_value(*value)?;
                Ok(())
            }
        }
        Ok(Arc::new(Adapter))
    }
}

impl_described_leaf!(f32, Kind::Scalar);

impl Bind for f32 {
    fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter;
        impl Adapt<f32> for Adapter {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<f32, JotError> {
                let wide = reader.next_f64()?;
                let narrow = wide as f32;
                if wide.is_finite() && narrow.is_infinite() {
                    return Err(JotError::Json(JsonError::NumberRange {
                        text: wide.to_string(),
                        target: "f32",
                    }));
                }
                Ok(narrow)
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &f32) -> Result<(), JotError> {
                writer.f64_value(f64::from(*value))?;
                Ok(())
            }
        }
        Ok(Arc::new(Adapter))
    }
}

// -----------------------------------------------------------------------------
// Bool / char / String

impl_described_leaf!(bool, Kind::Scalar);

impl Bind for bool {
    fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter;
        impl Adapt<bool> for Adapter {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<bool, JotError> {
                Ok(reader.next_bool()?)
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &bool) -> Result<(), JotError> {
                writer.bool_value(*value)?;
                Ok(())
            }
        }
        Ok(Arc::new(Adapter))
    }
}

impl_described_leaf!(char, Kind::Scalar);

impl Bind for char {
    fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter;
        impl Adapt<char> for Adapter {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<char, JotError> {
                let text = reader.next_string()?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(JotError::Invalid {
                        path: "char",
                        detail: format!("expected a one-character string, got {text:?}"),
                    }),
                }
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &char) -> Result<(), JotError> {
                let mut buf = [0_u8; 4];
                writer.string_value(value.encode_utf8(&mut buf))?;
                Ok(())
            }
        }
        Ok(Arc::new(Adapter))
    }
}

impl_described_leaf!(String, Kind::String);

impl Bind for String {
    fn bind(_registry: &AdapterRegistry) -> Result<Arc<dyn Adapt<Self>>, JotError> {
        struct Adapter;
        impl Adapt<String> for Adapter {
            fn read(&self, reader: &mut JsonReader<'_>) -> Result<String, JotError> {
                Ok(reader.next_string()?)
            }

            fn write(&self, writer: &mut JsonWriter<'_>, value: &String) -> Result<(), JotError> {
                writer.string_value(value)?;
                Ok(())
            }
        }
        Ok(Arc::new(Adapter))
    }
}
