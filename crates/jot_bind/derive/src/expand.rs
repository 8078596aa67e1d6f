use proc_macro2::TokenStream;
use quote::quote;
#[cfg(feature = "auto_register")]
use quote::quote_spanned;
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Type, WherePredicate, parse_quote};

use crate::attrs::{ContainerAttrs, FieldAttrs, VariantAttrs};

// -----------------------------------------------------------------------------
// Entry

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "`Bind` types must be `'static` and cannot borrow",
        ));
    }

    let container = ContainerAttrs::parse(&input.attrs)?;
    let body = match &input.data {
        Data::Struct(data) => expand_struct(input, &container, &data.fields)?,
        Data::Enum(data) => expand_enum(input, &data.variants)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(input, "`Bind` cannot be derived for unions"));
        },
    };

    let submit = auto_register_submit(input, &container);

    // The generated impls live inside an unnamed const so their imports and
    // helper items never leak into the caller's scope.
    Ok(quote! {
        const _: () = {
            #body
            #submit
        };
    })
}

// -----------------------------------------------------------------------------
// Structs

fn expand_struct(
    input: &DeriveInput,
    container: &ContainerAttrs,
    fields: &Fields,
) -> syn::Result<TokenStream> {
    let named = match fields {
        Fields::Named(named) => Some(&named.named),
        Fields::Unit => None,
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                fields,
                "`Bind` supports named-field and unit structs, not tuple structs",
            ));
        },
    };

    let ident = &input.ident;
    let mut rows = Vec::new();
    for field in named.into_iter().flatten() {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        if is_phantom_data(ty) {
            continue;
        }

        let declared_name = field_ident.to_string();
        let rename = option_tokens(attrs.rename.as_deref(), |name| quote!(#name));
        let skip_serialize = attrs.skip_serialize;
        let skip_deserialize = attrs.skip_deserialize;
        let since = option_tokens(attrs.since, |v| quote!(#v));
        let until = option_tokens(attrs.until, |v| quote!(#v));

        rows.push(quote! {
            jot_bind::FieldSpec {
                declared_name: #declared_name,
                rename: #rename,
                skip_serialize: #skip_serialize,
                skip_deserialize: #skip_deserialize,
                since: #since,
                until: #until,
                descriptor: <#ty as jot_bind::Described>::descriptor,
                bind_write: |registry| {
                    let adapter = registry.resolve::<#ty>()?;
                    ::core::result::Result::<
                        jot_bind::WriteFieldFn<Self>,
                        jot_bind::JotError,
                    >::Ok(::std::boxed::Box::new(
                        move |writer: &mut jot_bind::json::JsonWriter<'_>, value: &Self| {
                            adapter.write(writer, &value.#field_ident)
                        },
                    ))
                },
                bind_read: |registry| {
                    let adapter = registry.resolve::<#ty>()?;
                    ::core::result::Result::<
                        jot_bind::ReadFieldFn<Self>,
                        jot_bind::JotError,
                    >::Ok(::std::boxed::Box::new(
                        move |reader: &mut jot_bind::json::JsonReader<'_>, value: &mut Self| {
                            value.#field_ident = adapter.read(reader)?;
                            ::core::result::Result::Ok(())
                        },
                    ))
                },
            }
        });
    }

    let constructor = if container.default {
        quote!(::core::option::Option::Some(
            <Self as ::core::default::Default>::default as fn() -> Self
        ))
    } else {
        quote!(::core::option::Option::None)
    };

    let described = impl_described(input, quote!(jot_bind::Kind::Struct));
    let mut generics = bound_generics(&input.generics);
    if container.default {
        let (_, ty_generics, _) = input.generics.split_for_impl();
        let predicate: WherePredicate =
            parse_quote!(#ident #ty_generics: ::core::default::Default);
        generics.make_where_clause().predicates.push(predicate);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #described

        impl #impl_generics jot_bind::Bind for #ident #ty_generics #where_clause {
            fn bind(
                registry: &jot_bind::AdapterRegistry,
            ) -> ::core::result::Result<
                ::std::sync::Arc<dyn jot_bind::Adapt<Self>>,
                jot_bind::JotError,
            > {
                jot_bind::bind_struct(
                    registry,
                    <Self as jot_bind::Described>::descriptor(),
                    ::std::vec![#(#rows),*],
                    #constructor,
                )
            }
        }
    })
}

// -----------------------------------------------------------------------------
// Enums

fn expand_enum(
    input: &DeriveInput,
    variants: &Punctuated<syn::Variant, syn::Token![,]>,
) -> syn::Result<TokenStream> {
    let mut rows = Vec::new();
    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "`Bind` enums serialize as variant-name strings; variants cannot carry data",
            ));
        }
        let attrs = VariantAttrs::parse(&variant.attrs)?;
        let vident = &variant.ident;
        let declared_name = vident.to_string();
        let rename = option_tokens(attrs.rename.as_deref(), |name| quote!(#name));

        rows.push(quote! {
            jot_bind::VariantSpec {
                declared_name: #declared_name,
                rename: #rename,
                make: || Self::#vident,
                is: |value| ::core::matches!(*value, Self::#vident),
            }
        });
    }

    let ident = &input.ident;
    let described = impl_described(input, quote!(jot_bind::Kind::Enum));
    let generics = bound_generics(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #described

        impl #impl_generics jot_bind::Bind for #ident #ty_generics #where_clause {
            fn bind(
                registry: &jot_bind::AdapterRegistry,
            ) -> ::core::result::Result<
                ::std::sync::Arc<dyn jot_bind::Adapt<Self>>,
                jot_bind::JotError,
            > {
                jot_bind::bind_enum(
                    registry,
                    <Self as jot_bind::Described>::descriptor(),
                    ::std::vec![#(#rows),*],
                )
            }
        }
    })
}

// -----------------------------------------------------------------------------
// Described

/// The descriptor impl. Non-generic types get a single lazily filled cell;
/// generic types get one leaked descriptor per monomorphization.
fn impl_described(input: &DeriveInput, kind: TokenStream) -> TokenStream {
    let ident = &input.ident;
    let args: Vec<TokenStream> = input
        .generics
        .type_params()
        .map(|param| {
            let ident = &param.ident;
            quote!(<#ident as jot_bind::Described>::descriptor())
        })
        .collect();

    let build = quote! {
        jot_bind::TypeDescriptor::new::<Self>(
            #kind,
            ::std::vec![#(#args),*],
            jot_bind::erased_bind::<Self>,
        )
    };

    let cell = if is_generic(&input.generics) {
        quote! {
            static CELL: jot_bind::GenericDescriptorCell = jot_bind::GenericDescriptorCell::new();
            CELL.get_or_insert::<Self>(|| #build)
        }
    } else {
        quote! {
            static CELL: jot_bind::DescriptorCell = jot_bind::DescriptorCell::new();
            CELL.get_or_init(|| #build)
        }
    };

    let generics = bound_generics(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        impl #impl_generics jot_bind::Described for #ident #ty_generics #where_clause {
            fn descriptor() -> &'static jot_bind::TypeDescriptor {
                #cell
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Auto-Registration

#[cfg(feature = "auto_register")]
fn auto_register_submit(input: &DeriveInput, container: &ContainerAttrs) -> TokenStream {
    let Some(span) = container.auto_register else {
        return TokenStream::new();
    };
    // Generic types have no single instantiation to submit.
    if is_generic(&input.generics) {
        return TokenStream::new();
    }
    let ident = &input.ident;
    quote_spanned! { span =>
        jot_bind::inventory::submit! {
            jot_bind::BindPlugin::new::<#ident>()
        }
    }
}

#[cfg(not(feature = "auto_register"))]
fn auto_register_submit(_input: &DeriveInput, container: &ContainerAttrs) -> TokenStream {
    // The attribute still parses without the feature; it just emits nothing.
    let _ = container.auto_register;
    TokenStream::new()
}

// -----------------------------------------------------------------------------
// Helpers

fn is_generic(generics: &Generics) -> bool {
    generics.type_params().next().is_some() || generics.const_params().next().is_some()
}

/// Copies the declared generics and bounds every type parameter by
/// `jot_bind::Bind`, so member resolution can recurse into them.
fn bound_generics(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<Ident> =
        generics.type_params().map(|param| param.ident.clone()).collect();
    for ident in params {
        let predicate: WherePredicate = parse_quote!(#ident: jot_bind::Bind);
        generics.make_where_clause().predicates.push(predicate);
    }
    generics
}

fn is_phantom_data(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "PhantomData")
}

fn option_tokens<T>(value: Option<T>, f: impl FnOnce(T) -> TokenStream) -> TokenStream {
    match value {
        Some(value) => {
            let inner = f(value);
            quote!(::core::option::Option::Some(#inner))
        },
        None => quote!(::core::option::Option::None),
    }
}
