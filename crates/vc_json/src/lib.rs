#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro emits `::vc_json::...` paths, which must also resolve
// inside this crate (unit tests) and its doctests.
extern crate self as vc_json;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod error;
mod naming;
mod settings;

pub mod binder;
pub mod contract;
pub mod data;
pub mod de;
pub mod info;
pub mod registry;
pub mod ser;
pub mod temporal;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use codec::JsonCodec;
pub use data::{Contract, Data, Decode};
pub use error::{Error, Result};
pub use naming::NamingConvention;
pub use settings::{ReferenceLoop, Settings};
pub use value::{Number, OpenMap, Value};
pub use vc_json_derive as derive;

#[cfg(test)]
mod tests;
