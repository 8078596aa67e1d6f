use syn::spanned::Spanned;
use syn::{Attribute, LitFloat, LitStr};

pub(crate) static JOT_ATTRIBUTE_NAME: &str = "jot";

// -----------------------------------------------------------------------------
// Container attributes

/// `#[jot(..)]` flags on the type itself.
#[derive(Default)]
pub(crate) struct ContainerAttrs {
    /// `#[jot(default)]`: the type's `Default` impl constructs the instance
    /// a read fills in.
    pub(crate) default: bool,
    /// `#[jot(auto_register)]`: submit the type for
    /// `JotBuilder::build_registered`.
    pub(crate) auto_register: Option<proc_macro2::Span>,
}

impl ContainerAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(JOT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    out.default = true;
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    out.auto_register = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("expected `default` or `auto_register`"))
                }
            })?;
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Field attributes

/// `#[jot(..)]` flags on a named field.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) rename: Option<String>,
    pub(crate) skip_serialize: bool,
    pub(crate) skip_deserialize: bool,
    pub(crate) since: Option<f64>,
    pub(crate) until: Option<f64>,
}

impl FieldAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(JOT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip_serialize = true;
                    out.skip_deserialize = true;
                    Ok(())
                } else if meta.path.is_ident("skip_serializing") {
                    out.skip_serialize = true;
                    Ok(())
                } else if meta.path.is_ident("skip_deserializing") {
                    out.skip_deserialize = true;
                    Ok(())
                } else if meta.path.is_ident("since") {
                    let lit: LitFloat = meta.value()?.parse()?;
                    out.since = Some(lit.base10_parse()?);
                    Ok(())
                } else if meta.path.is_ident("until") {
                    let lit: LitFloat = meta.value()?.parse()?;
                    out.until = Some(lit.base10_parse()?);
                    Ok(())
                } else {
                    Err(meta.error(
                        "expected `rename`, `skip`, `skip_serializing`, \
                         `skip_deserializing`, `since`, or `until`",
                    ))
                }
            })?;
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Variant attributes

/// `#[jot(..)]` flags on an enum variant.
#[derive(Default)]
pub(crate) struct VariantAttrs {
    pub(crate) rename: Option<String>,
}

impl VariantAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(JOT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `rename`"))
                }
            })?;
        }
        Ok(out)
    }
}
