use crate::derive_data::ContractInput;

/// Generate the `inventory` submission for `#[contract(auto_register)]`.
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(input: &ContractInput) -> proc_macro2::TokenStream {
    let Some(span) = input.attrs().auto_register else {
        return crate::utils::empty();
    };

    // Generic types have no single instantiation to register.
    if input.impl_with_generic() {
        return crate::utils::empty();
    }

    let vc_json = input.vc_json_path();
    let exports_ = crate::path::macro_exports_(vc_json);
    let registration_ = crate::path::registration_(vc_json);
    let ident = input.ident();

    quote::quote_spanned! { span =>
        #exports_::inventory::submit! {
            #registration_::of::<#ident>()
        }
    }
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &ContractInput) -> proc_macro2::TokenStream {
    crate::utils::empty()
}
