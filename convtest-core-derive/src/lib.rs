//! Derive macros for convtest-core metadata types.
//!
//! This crate provides the `#[derive(Shape)]` macro, which implements
//! `convtest_core::model::TypeMetadata` for a struct so it can be
//! registered on a workspace as a type without source.
//!
//! # Example
//!
//! ```
//! use convtest_core::model::TypeMetadata;
//! use convtest_core_derive::Shape;
//!
//! #[allow(dead_code)]
//! #[derive(Shape)]
//! #[shape(name = "Contracts.Invoice")]
//! struct Invoice {
//!     #[shape(rename = "Number")]
//!     number: String,
//!
//!     #[shape(rename = "Lines")]
//!     lines: Vec<String>,
//!
//!     #[shape(skip)]
//!     checksum: u64,
//! }
//!
//! let names: Vec<String> = Invoice::members().into_iter().map(|m| m.name).collect();
//! assert_eq!(Invoice::type_name(), "Contracts.Invoice");
//! assert_eq!(names, vec!["Number", "Lines"]);
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields, GenericArgument, LitStr, PathArguments, Type};

/// Derive macro for implementing the `TypeMetadata` trait.
///
/// # Attributes
///
/// ## Struct-level
///
/// - `#[shape(name = "...")]` - Qualified type name. Defaults to the struct name.
///
/// ## Field-level
///
/// - `#[shape(rename = "...")]` - Member name reported instead of the field name.
/// - `#[shape(skip)]` - Leave the field out of the member list.
///
/// A field is collection-shaped when its type is a generic path other than
/// `Option<T>`/`Box<T>` (which take the shape of `T`). Arrays and slices
/// carry no type-argument list and stay scalar.
#[proc_macro_derive(Shape, attributes(shape))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_shape_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_shape_impl(input: DeriveInput) -> Result<TokenStream2, Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let type_name = parse_type_attrs(&input)?.name.unwrap_or_else(|| name.to_string());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new(
                    name.span(),
                    "Shape can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                name.span(),
                "Shape can only be derived for structs",
            ))
        }
    };

    let mut members = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        let member_name = attrs.rename.unwrap_or_else(|| ident.to_string());
        let collection = is_collection_type(&field.ty);
        members.push(quote! {
            ::convtest_core::model::ForeignMember::new(#member_name, #collection)
        });
    }

    Ok(quote! {
        impl #impl_generics ::convtest_core::model::TypeMetadata for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn members() -> Vec<::convtest_core::model::ForeignMember> {
                vec![
                    #(#members),*
                ]
            }
        }
    })
}

#[derive(Default)]
struct TypeAttrs {
    name: Option<String>,
}

/// Parse #[shape(...)] on the struct.
fn parse_type_attrs(input: &DeriveInput) -> Result<TypeAttrs, Error> {
    let mut result = TypeAttrs::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("shape") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(meta.error("shape name cannot be blank"));
                }
                result.name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unknown shape attribute, expected 'name'"))
            }
        })?;
    }

    Ok(result)
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

/// Parse #[shape(...)] on a field.
fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs, Error> {
    let mut result = FieldAttrs::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("shape") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown field attribute, expected 'rename' or 'skip'"))
            }
        })?;
    }

    Ok(result)
}

fn is_collection_type(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_collection_type(&reference.elem),
        Type::Paren(paren) => is_collection_type(&paren.elem),
        Type::Group(group) => is_collection_type(&group.elem),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return false;
            };
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return false;
            };
            if segment.ident == "Option" || segment.ident == "Box" {
                return match args.args.first() {
                    Some(GenericArgument::Type(inner)) => is_collection_type(inner),
                    _ => false,
                };
            }
            args.args
                .iter()
                .any(|arg| matches!(arg, GenericArgument::Type(_)))
        }
        _ => false,
    }
}
