use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ContractInput, ContractVariant};

/// Generate `Data` and `Decode` for an enum of unit variants.
///
/// Variants are written as their discriminant. The variant with
/// discriminant `0`, if any, is the default and the value of a missing
/// constructor parameter.
pub(crate) fn impl_enum(input: &ContractInput, variants: &[ContractVariant]) -> TokenStream {
    let vc_json = input.vc_json_path();
    let data_ = crate::path::data_(vc_json);
    let data_ref_ = crate::path::data_ref_(vc_json);
    let decode_ = crate::path::decode_(vc_json);
    let node_ = crate::path::node_(vc_json);
    let decoder_ = crate::path::decoder_(vc_json);
    let result_ = crate::path::result_(vc_json);
    let exports_ = crate::path::macro_exports_(vc_json);

    let ident = input.ident();
    let idents: Vec<_> = variants.iter().map(|v| v.ident).collect();
    let names = variants.iter().map(|v| v.name.as_str());
    let indices = 0..variants.len();

    quote! {
        impl #ident {
            #[inline]
            fn __discriminant(&self) -> i64 {
                match self {
                    #(Self::#idents => Self::#idents as i64,)*
                }
            }
        }

        impl #data_ for #ident {
            #[inline]
            fn data_ref(&self) -> #data_ref_<'_> {
                #data_ref_::Int(self.__discriminant())
            }

            #[inline]
            fn is_default_value(&self) -> bool {
                self.__discriminant() == 0
            }
        }

        impl #decode_ for #ident {
            fn decode(node: &#node_, de: &mut #decoder_<'_>) -> #result_<Self> {
                let target = ::core::any::type_name::<Self>();
                let variants: &[(&str, i64)] = &[#((#names, Self::#idents as i64)),*];

                match #exports_::unit_variant(node, de, variants, target)? {
                    #(#indices => ::core::result::Result::Ok(Self::#idents),)*
                    _ => ::core::result::Result::Err(de.conversion_error(target, "unknown variant")),
                }
            }

            fn absent() -> ::core::option::Option<Self> {
                #(
                    if Self::#idents as i64 == 0 {
                        return ::core::option::Option::Some(Self::#idents);
                    }
                )*
                ::core::option::Option::None
            }
        }
    }
}
