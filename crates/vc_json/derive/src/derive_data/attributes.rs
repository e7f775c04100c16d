//! Parsing of `#[contract(...)]` attributes.

use proc_macro2::Span;
use syn::ext::IdentExt;
use syn::parse::ParseStream;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Ident, LitStr, Path, Token};

use crate::CONTRACT_ATTRIBUTE_NAME;

fn contract_attributes(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(CONTRACT_ATTRIBUTE_NAME))
}

// -----------------------------------------------------------------------------
// Type attributes

/// `constructor = func(a, b)`.
pub(crate) struct ConstructorDecl {
    pub func: Ident,
    pub params: Vec<Ident>,
}

impl ConstructorDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let func: Ident = input.parse()?;
        let content;
        syn::parenthesized!(content in input);
        let params = content.parse_terminated(Ident::parse_any, Token![,])?;

        Ok(Self {
            func,
            params: params.into_iter().collect(),
        })
    }
}

#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub default: Option<Span>,
    pub auto_register: Option<Span>,
    pub name: Option<LitStr>,
    pub constructors: Vec<ConstructorDecl>,
}

impl TypeAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in contract_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    out.default = Some(meta.path.span());
                } else if meta.path.is_ident("auto_register") {
                    out.auto_register = Some(meta.path.span());
                } else if meta.path.is_ident("name") {
                    if out.name.is_some() {
                        return Err(meta.error("duplicate `name`"));
                    }
                    out.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("constructor") {
                    out.constructors.push(ConstructorDecl::parse(meta.value()?)?);
                } else {
                    return Err(meta.error(
                        "expected `default`, `auto_register`, `name` or `constructor`",
                    ));
                }
                Ok(())
            })?;
        }

        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Field attributes

#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub ignore: bool,
    pub required: bool,
    pub readonly: bool,
    pub order: Option<Expr>,
    pub binder: Option<Path>,
    pub adapter: Option<Path>,
}

impl FieldAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in contract_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("ignore") {
                    out.ignore = true;
                } else if meta.path.is_ident("required") {
                    out.required = true;
                } else if meta.path.is_ident("readonly") {
                    out.readonly = true;
                } else if meta.path.is_ident("order") {
                    out.order = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("binder") {
                    out.binder = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("adapter") {
                    out.adapter = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error(
                        "expected `rename`, `ignore`, `required`, `readonly`, `order`, `binder` or `adapter`",
                    ));
                }
                Ok(())
            })?;
        }

        if let (Some(binder), Some(_)) = (&out.binder, &out.adapter) {
            return Err(syn::Error::new_spanned(
                binder,
                "a member cannot have both a binder and an adapter",
            ));
        }

        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Variant attributes

#[derive(Default)]
pub(crate) struct VariantAttributes {
    pub rename: Option<LitStr>,
}

impl VariantAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();

        for attr in contract_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `rename`"))
                }
            })?;
        }

        Ok(out)
    }
}
