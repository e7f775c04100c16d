use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ContractInput, ContractKind};

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod enum_kind;
mod struct_kind;

// -----------------------------------------------------------------------------
// Entry

pub(crate) fn impl_contract(input: &ContractInput) -> TokenStream {
    let tokens = match input.kind() {
        ContractKind::Struct(fields) => {
            let body = struct_kind::impl_struct(input, fields);
            let register = auto_register::get_auto_register_impl(input);
            quote! {
                #body
                #register
            }
        }
        ContractKind::Enum(variants) => enum_kind::impl_enum(input, variants),
    };

    quote! {
        const _: () = {
            #tokens
        };
    }
}
