//! The validated shape of a `#[derive(Contract)]` input.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Generics, Ident, LitStr, Type, WhereClause};

use crate::utils::pascal_case;

// -----------------------------------------------------------------------------
// Modules

mod attributes;

use attributes::{FieldAttributes, TypeAttributes, VariantAttributes};

// -----------------------------------------------------------------------------
// ContractInput

pub(crate) struct ContractField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    /// Declared member name.
    pub name: String,
    pub attrs: FieldAttributes,
}

pub(crate) struct ContractVariant<'a> {
    pub ident: &'a Ident,
    /// Name the variant is read from.
    pub name: String,
}

pub(crate) enum ContractKind<'a> {
    Struct(Vec<ContractField<'a>>),
    Enum(Vec<ContractVariant<'a>>),
}

pub(crate) struct ContractInput<'a> {
    ident: &'a Ident,
    generics: &'a Generics,
    attrs: TypeAttributes,
    kind: ContractKind<'a>,
    vc_json: syn::Path,
}

impl<'a> ContractInput<'a> {
    pub(crate) fn from_ast(ast: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse(&ast.attrs)?;

        if let Some(lifetime) = ast.generics.lifetimes().next() {
            return Err(syn::Error::new_spanned(
                lifetime,
                "`Contract` types cannot borrow, remove the lifetime parameter",
            ));
        }

        let kind = match &ast.data {
            Data::Struct(data) => {
                let Fields::Named(fields) = &data.fields else {
                    return Err(syn::Error::new_spanned(
                        &ast.ident,
                        "`Contract` structs need named fields",
                    ));
                };

                let fields = fields
                    .named
                    .iter()
                    .map(|field| {
                        let ident = field.ident.as_ref().ok_or_else(|| {
                            syn::Error::new_spanned(field, "expected a named field")
                        })?;
                        Ok(ContractField {
                            ident,
                            ty: &field.ty,
                            name: pascal_case(&ident.to_string()),
                            attrs: FieldAttributes::parse(&field.attrs)?,
                        })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;

                ContractKind::Struct(fields)
            }
            Data::Enum(data) => {
                if !ast.generics.params.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &ast.generics,
                        "`Contract` enums cannot be generic",
                    ));
                }
                if let Some(span) = attrs.default.or(attrs.auto_register) {
                    return Err(syn::Error::new(
                        span,
                        "only `Contract` structs take `default` and `auto_register`",
                    ));
                }
                if let Some(decl) = attrs.constructors.first() {
                    return Err(syn::Error::new_spanned(
                        &decl.func,
                        "`Contract` enums have no constructors",
                    ));
                }

                if data.variants.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &ast.ident,
                        "`Contract` enums need at least one variant",
                    ));
                }

                let variants = data
                    .variants
                    .iter()
                    .map(|variant| {
                        if !matches!(variant.fields, Fields::Unit) {
                            return Err(syn::Error::new_spanned(
                                variant,
                                "`Contract` enums support unit variants only",
                            ));
                        }
                        let attrs = VariantAttributes::parse(&variant.attrs)?;
                        Ok(ContractVariant {
                            ident: &variant.ident,
                            name: attrs
                                .rename
                                .map(|lit| lit.value())
                                .unwrap_or_else(|| variant.ident.to_string()),
                        })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;

                ContractKind::Enum(variants)
            }
            Data::Union(data) => {
                return Err(syn::Error::new_spanned(
                    data.union_token,
                    "`Contract` cannot be derived for unions",
                ));
            }
        };

        Ok(Self {
            ident: &ast.ident,
            generics: &ast.generics,
            attrs,
            kind,
            vc_json: crate::path::vc_json(),
        })
    }

    #[inline]
    pub(crate) fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub(crate) fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub(crate) fn kind(&self) -> &ContractKind<'a> {
        &self.kind
    }

    #[inline]
    pub(crate) fn vc_json_path(&self) -> &syn::Path {
        &self.vc_json
    }

    #[inline]
    pub(crate) fn impl_with_generic(&self) -> bool {
        !self.generics.params.is_empty()
    }

    /// Discriminator name, `name = "..."` or the identifier.
    pub(crate) fn discriminator(&self) -> LitStr {
        match &self.attrs.name {
            Some(name) => name.clone(),
            None => LitStr::new(&self.ident.to_string(), self.ident.span()),
        }
    }

    /// Generics for the impl blocks, with `T: Decode` on every type
    /// parameter, plus `Self: Default` when the type declares `default`.
    pub(crate) fn split_generics(&self) -> (TokenStream, TokenStream, WhereClause) {
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let mut where_clause = where_clause.cloned().unwrap_or_else(|| WhereClause {
            where_token: Default::default(),
            predicates: Default::default(),
        });

        let decode_ = crate::path::decode_(&self.vc_json);
        for param in self.generics.type_params() {
            let ident = &param.ident;
            where_clause.predicates.push(syn::parse_quote!(#ident: #decode_));
        }

        if self.attrs.default.is_some() && self.impl_with_generic() {
            let ident = self.ident;
            where_clause
                .predicates
                .push(syn::parse_quote!(#ident #ty_generics: ::core::default::Default));
        }

        (quote!(#impl_generics), quote!(#ty_generics), where_clause)
    }
}
