//! Paths into `vc_json` used by the generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path to the `vc_json` crate, as seen from the crate being
/// compiled.
///
/// 1. For crates that depend on `vc_json` (possibly renamed), its name.
/// 2. For crates that depend on `vc_codec`, `::vc_codec::json`.
/// 3. Otherwise `::vc_json`, which `vc_json` itself aliases.
///
/// This reads the caller's manifest, call it once per expansion.
pub(crate) fn vc_json() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_json"))
}

#[inline(always)]
pub(crate) fn macro_exports_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::__macro_exports }
}

#[inline(always)]
pub(crate) fn data_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::data::Data }
}

#[inline(always)]
pub(crate) fn data_ref_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::data::DataRef }
}

#[inline(always)]
pub(crate) fn object_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::data::Object }
}

#[inline(always)]
pub(crate) fn decode_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::data::Decode }
}

#[inline(always)]
pub(crate) fn contract_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::data::Contract }
}

#[inline(always)]
pub(crate) fn node_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::data::Node }
}

#[inline(always)]
pub(crate) fn decoder_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::de::Decoder }
}

#[inline(always)]
pub(crate) fn result_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::Result }
}

#[inline(always)]
pub(crate) fn info_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::info }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn registration_(vc_json: &syn::Path) -> TokenStream {
    quote! { #vc_json::registry::Registration }
}
