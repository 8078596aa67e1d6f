use std::collections::HashMap;
use std::sync::Arc;

use jot_json::{JsonReader, JsonToken, JsonWriter};

use crate::adapter::Adapt;
use crate::construct::Constructor;
use crate::descriptor::{Kind, TypeDescriptor};
use crate::error::{BindError, JotError};
use crate::policy::{FieldView, NullPolicy};
use crate::registry::AdapterRegistry;

// -----------------------------------------------------------------------------
// FieldSpec

/// Writes one member of `T` into an object whose name is already deferred.
pub type WriteFieldFn<T> =
    Box<dyn Fn(&mut JsonWriter<'_>, &T) -> Result<(), JotError> + Send + Sync>;

/// Reads one member's value into a partially-filled `T`.
pub type ReadFieldFn<T> =
    Box<dyn Fn(&mut JsonReader<'_>, &mut T) -> Result<(), JotError> + Send + Sync>;

/// One row of a derive-generated binding table.
///
/// The bind hooks resolve the member's adapter through the registry and
/// capture it in a closure that can reach the (possibly private) field;
/// they run once per type, at bind time.
pub struct FieldSpec<T> {
    pub declared_name: &'static str,
    /// Explicit `#[jot(rename = "..")]`; wins over the naming policy.
    pub rename: Option<&'static str>,
    pub skip_serialize: bool,
    pub skip_deserialize: bool,
    /// Version interval: present from `since` (inclusive)..`until`
    /// (exclusive).
    pub since: Option<f64>,
    pub until: Option<f64>,
    pub descriptor: fn() -> &'static TypeDescriptor,
    pub bind_write: fn(&AdapterRegistry) -> Result<WriteFieldFn<T>, JotError>,
    pub bind_read: fn(&AdapterRegistry) -> Result<ReadFieldFn<T>, JotError>,
}

/// Whether the configured version excludes a member carrying this interval.
fn version_excludes(version: Option<f64>, since: Option<f64>, until: Option<f64>) -> bool {
    let Some(version) = version else {
        return false;
    };
    if let Some(since) = since {
        if version < since {
            return true;
        }
    }
    if let Some(until) = until {
        if version >= until {
            return true;
        }
    }
    false
}

// -----------------------------------------------------------------------------
// bind_struct

struct BoundWrite<T> {
    name: String,
    write: WriteFieldFn<T>,
}

struct BoundRead<T> {
    read: ReadFieldFn<T>,
    /// Whether the member's own type can represent JSON null.
    nullable: bool,
}

/// `Option` members hold null as `None`; tree members hold it as their
/// null variant. Boxes are transparent and already carry the payload kind.
fn kind_is_nullable(kind: Kind) -> bool {
    matches!(kind, Kind::Option | Kind::Tree)
}

/// Turns a binding table into a struct codec, applying the registry's
/// naming policy, exclusion strategies, and version interval.
///
/// Fails immediately when two retained members collide on a serialized
/// name. Member adapters resolve through the registry here, so recursive
/// types terminate via the registry's placeholder.
pub fn bind_struct<T: Send + Sync + 'static>(
    registry: &AdapterRegistry,
    descriptor: &'static TypeDescriptor,
    fields: Vec<FieldSpec<T>>,
    default_constructor: Option<fn() -> T>,
) -> Result<Arc<dyn Adapt<T>>, JotError> {
    let config = registry.config();
    let type_skipped_ser =
        config.serialize_exclusions.iter().any(|s| s.skip_type(descriptor));
    let type_skipped_de =
        config.deserialize_exclusions.iter().any(|s| s.skip_type(descriptor));

    let mut write_fields: Vec<BoundWrite<T>> = Vec::new();
    let mut read_fields: HashMap<String, BoundRead<T>> = HashMap::new();
    let mut seen: Vec<String> = Vec::new();

    for field in fields {
        let serialized = match field.rename {
            Some(rename) => rename.to_string(),
            None => config.naming.apply(field.declared_name),
        };
        let versioned_out = version_excludes(config.version, field.since, field.until);
        let field_descriptor = (field.descriptor)();
        let view = FieldView {
            declared_name: field.declared_name,
            serialized_name: &serialized,
            owner: descriptor,
            ty: field_descriptor,
        };

        let in_serialize = !type_skipped_ser
            && !field.skip_serialize
            && !versioned_out
            && !config.serialize_exclusions.iter().any(|s| s.skip_field(&view));
        let in_deserialize = !type_skipped_de
            && !field.skip_deserialize
            && !versioned_out
            && !config.deserialize_exclusions.iter().any(|s| s.skip_field(&view));
        if !in_serialize && !in_deserialize {
            continue;
        }

        if seen.contains(&serialized) {
            return Err(BindError::DuplicateName {
                path: descriptor.path(),
                name: serialized,
            }
            .into());
        }
        seen.push(serialized.clone());

        if in_serialize {
            write_fields.push(BoundWrite {
                name: serialized.clone(),
                write: (field.bind_write)(registry)?,
            });
        }
        if in_deserialize {
            read_fields.insert(
                serialized,
                BoundRead {
                    read: (field.bind_read)(registry)?,
                    nullable: kind_is_nullable(field_descriptor.kind()),
                },
            );
        }
    }

    let constructor = match config.constructors.get::<T>() {
        Some(manual) => Constructor::Manual(manual),
        None => match default_constructor {
            Some(declared) => Constructor::Declared(declared),
            None => Constructor::Missing,
        },
    };

    Ok(Arc::new(StructAdapter {
        descriptor,
        write_fields,
        read_fields,
        constructor,
        null_policy: config.null_policy,
    }))
}

// -----------------------------------------------------------------------------
// StructAdapter

struct StructAdapter<T> {
    descriptor: &'static TypeDescriptor,
    write_fields: Vec<BoundWrite<T>>,
    read_fields: HashMap<String, BoundRead<T>>,
    constructor: Constructor<T>,
    null_policy: NullPolicy,
}

impl<T: Send + Sync + 'static> Adapt<T> for StructAdapter<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<T, JotError> {
        let mut value = self.constructor.construct(self.descriptor)?;
        reader.begin_object()?;
        while reader.has_next()? {
            let name = reader.next_name()?;
            match self.read_fields.get(&name) {
                Some(bound) => {
                    if !bound.nullable && reader.peek()? == JsonToken::Null {
                        match self.null_policy {
                            NullPolicy::Reject => {
                                return Err(JotError::NullValue {
                                    path: self.descriptor.path(),
                                    member: name,
                                });
                            },
                            NullPolicy::DefaultValue => {
                                reader.next_null()?;
                                continue;
                            },
                        }
                    }
                    (bound.read)(reader, &mut value)?;
                },
                // unknown members are skipped, subtrees included
                None => reader.skip_value()?,
            }
        }
        reader.end_object()?;
        Ok(value)
    }

    fn write(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<(), JotError> {
        writer.begin_object()?;
        for field in &self.write_fields {
            writer.name(&field.name)?;
            (field.write)(writer, value)?;
        }
        writer.end_object()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// bind_enum

/// One row of a derive-generated fieldless-enum table.
pub struct VariantSpec<T> {
    pub declared_name: &'static str,
    pub rename: Option<&'static str>,
    pub make: fn() -> T,
    pub is: fn(&T) -> bool,
}

/// Binds a fieldless enum as its variant-name string.
pub fn bind_enum<T: Send + Sync + 'static>(
    _registry: &AdapterRegistry,
    descriptor: &'static TypeDescriptor,
    variants: Vec<VariantSpec<T>>,
) -> Result<Arc<dyn Adapt<T>>, JotError> {
    let mut seen: Vec<&str> = Vec::new();
    for variant in &variants {
        let name = variant.rename.unwrap_or(variant.declared_name);
        if seen.contains(&name) {
            return Err(BindError::DuplicateName {
                path: descriptor.path(),
                name: name.to_string(),
            }
            .into());
        }
        seen.push(name);
    }
    Ok(Arc::new(EnumAdapter { descriptor, variants }))
}

struct EnumAdapter<T> {
    descriptor: &'static TypeDescriptor,
    variants: Vec<VariantSpec<T>>,
}

impl<T> EnumAdapter<T> {
    fn serialized_name(variant: &VariantSpec<T>) -> &'static str {
        variant.rename.unwrap_or(variant.declared_name)
    }
}

impl<T: Send + Sync + 'static> Adapt<T> for EnumAdapter<T> {
    fn read(&self, reader: &mut JsonReader<'_>) -> Result<T, JotError> {
        let name = reader.next_string()?;
        for variant in &self.variants {
            if Self::serialized_name(variant) == name {
                return Ok((variant.make)());
            }
        }
        Err(BindError::UnknownVariant { path: self.descriptor.path(), name }.into())
    }

    fn write(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<(), JotError> {
        for variant in &self.variants {
            if (variant.is)(value) {
                writer.string_value(Self::serialized_name(variant))?;
                return Ok(());
            }
        }
        Err(BindError::UnknownVariant {
            path: self.descriptor.path(),
            name: "<unmatched variant>".to_string(),
        }
        .into())
    }
}
