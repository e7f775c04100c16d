//! Capability traits through which the codec sees values.
//!
//! - [`Data`]: object-safe read access, every encodable value implements it.
//! - [`Decode`]: construction from a parsed JSON node.
//! - [`Contract`]: types with a declarative member table, usually derived.
//! - [`Object`]: the dynamic side of [`Contract`], reachable from `&dyn Data`.
//!
//! `#[derive(Contract)]` implements all four for structs with named fields.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::de::Decoder;
use crate::error::Result;
use crate::info::TypeInfo;
use crate::temporal::Temporal;

// -----------------------------------------------------------------------------
// Modules

mod impls;

// -----------------------------------------------------------------------------
// Node

/// Parsed JSON node handed to [`Decode::decode`].
pub type Node = serde_json::Value;

// -----------------------------------------------------------------------------
// DataRef

/// Borrowed view of a value's JSON shape.
pub enum DataRef<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a str),
    Temporal(Temporal),
    Seq(Box<dyn Iterator<Item = &'a dyn Data> + 'a>),
    Map(Box<dyn Iterator<Item = (&'a str, &'a dyn Data)> + 'a>),
    /// A contract object, written member by member.
    Object(&'a dyn Object),
    /// A polymorphic root. Written like its target, with a `"$type"`
    /// discriminator in front when the codec runs with `typed` enabled.
    Typed(&'a dyn Data),
}

impl fmt::Debug for DataRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Temporal(v) => f.debug_tuple("Temporal").field(v).finish(),
            Self::Seq(_) => f.write_str("Seq(..)"),
            Self::Map(_) => f.write_str("Map(..)"),
            Self::Object(v) => write!(f, "Object({})", v.type_path()),
            Self::Typed(v) => write!(f, "Typed({})", v.type_path()),
        }
    }
}

// -----------------------------------------------------------------------------
// Data

/// Read access to a value's JSON shape.
pub trait Data: Any + Send + Sync {
    fn data_ref(&self) -> DataRef<'_>;

    /// Whether the value equals its type's default, for `suppress_defaults`.
    #[inline]
    fn is_default_value(&self) -> bool {
        false
    }

    #[inline]
    fn type_path(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl dyn Data {
    #[inline]
    pub fn is<T: Data>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Data>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Data>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }

    /// Takes ownership of the concrete value, or hands the box back.
    pub fn downcast<T: Data>(self: Box<Self>) -> Result<Box<T>, Box<Self>> {
        if self.is::<T>() {
            let any: Box<dyn Any> = self;
            any.downcast::<T>().map_err(|_| unreachable!("type checked above"))
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("dyn Data").field(&self.type_path()).finish()
    }
}

// -----------------------------------------------------------------------------
// Object

/// A value with a member table, see [`Contract`].
pub trait Object: Data {
    fn object_info(&self) -> &'static TypeInfo;
}

// -----------------------------------------------------------------------------
// Decode

/// Construction from a parsed JSON node.
pub trait Decode: Data + Sized {
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self>;

    /// Value used for a constructor parameter whose key is missing from the
    /// input. `None` makes the missing key a materialization error.
    #[inline]
    fn absent() -> Option<Self> {
        None
    }
}

// -----------------------------------------------------------------------------
// Contract

/// A type whose JSON shape is described by a static [`TypeInfo`].
///
/// ```
/// use vc_json::{Contract, derive::Contract};
///
/// #[derive(Contract, Default)]
/// #[contract(default)]
/// struct Project {
///     project_id: u32,
///     #[contract(ignore)]
///     cached: bool,
/// }
///
/// let info = <Project as Contract>::type_info();
/// assert_eq!(info.members().len(), 2);
/// assert_eq!(info.member("ProjectId").unwrap().type_path(), "u32");
/// ```
pub trait Contract: Decode {
    fn type_info() -> &'static TypeInfo;
}
