//! See [`Contract`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CONTRACT_ATTRIBUTE_NAME: &str = "contract";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;
mod utils;

// -----------------------------------------------------------------------------
// Macros

/// # Contract Derivation
///
/// For structs with named fields, `#[derive(Contract)]` implements `Data`,
/// `Object`, `Decode` and `Contract`. Every field becomes a member whose
/// declared name is the field name in PascalCase (`employee_no` is
/// `EmployeeNo`); the codec's naming convention is applied on top of it.
///
/// For enums with unit variants only, it implements `Data` and `Decode`.
/// Variants are written as their discriminant and read from a discriminant
/// or a variant name.
///
/// ## Type attributes
///
/// - `default`: the type implements `Default`, which is used as the
///   no-argument constructor.
/// - `name = "..."`: discriminator name under `"$type"`, the type
///   identifier by default.
/// - `constructor = func(field, ...)`: declares `Self::func` as a
///   constructor taking the named fields, in order. Repeatable. The codec
///   uses the constructor with the most parameters whose fields are all
///   `readonly`.
/// - `auto_register`: submits the type for automatic discriminator
///   registration. No effect on generic types, or without the
///   `auto_register` feature.
///
/// ```rust, ignore
/// #[derive(Contract)]
/// #[contract(name = "Badge", constructor = new(code))]
/// struct Badge {
///     #[contract(readonly)]
///     code: u32,
///     label: String,
/// }
/// ```
///
/// ## Field attributes
///
/// - `rename = "..."`: JSON name, used verbatim whatever the convention.
/// - `ignore`: never read or written.
/// - `required`: reading fails when the key is missing.
/// - `order = n`: writing position, lower first. Unordered members act as
///   `-1` and keep their declaration order.
/// - `readonly`: no setter, the value is only taken through constructors.
/// - `binder = B`: resolves the member with `B: Binder + Default` after
///   its siblings. The field must be a `Value`.
/// - `adapter = A`: reads and writes the field with `A: ValueAdapter<T>`.
///
/// ```rust, ignore
/// #[derive(Contract, Default)]
/// #[contract(default)]
/// struct Employee {
///     #[contract(required, order = 0)]
///     employee_no: String,
///     #[contract(rename = "Sex")]
///     gender: Gender,
///     #[contract(ignore)]
///     cached_age: u32,
/// }
/// ```
///
/// ## Enum variants
///
/// `#[contract(rename = "...")]` on a variant changes the name it is read
/// from.
#[proc_macro_derive(Contract, attributes(contract))]
pub fn derive_contract(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::ContractInput::from_ast(&ast) {
        Ok(input) => impls::impl_contract(&input).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
