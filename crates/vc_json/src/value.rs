//! Open values for members without a static contract.
//!
//! A [`Value`] mirrors a JSON node, with one extra branch: [`Value::Typed`]
//! holds a materialized contract object. Open members decode into plain
//! ordered maps and sequences unless a `"$type"` discriminator selects a
//! registered contract, or a binder backfills the member with a typed value.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use indexmap::IndexMap;

use crate::data::{Data, DataRef, Decode, Node};
use crate::de::Decoder;
use crate::error::Result;

/// String-keyed map that keeps insertion order.
pub type OpenMap = IndexMap<String, Value>;

// -----------------------------------------------------------------------------
// Number

/// A JSON number, kept in the representation it was read with.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Float(_) => None,
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            Self::Int(v) => u64::try_from(v).ok(),
            Self::UInt(v) => Some(v),
            Self::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::UInt(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    fn from_node(number: &serde_json::Number) -> Self {
        if let Some(v) = number.as_i64() {
            Self::Int(v)
        } else if let Some(v) = number.as_u64() {
            Self::UInt(v)
        } else {
            Self::Float(number.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Float(a), b) | (b, Self::Float(a)) => a == b.as_f64(),
            (a, b) => match (a.as_i64(), b.as_i64()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => a.as_u64() == b.as_u64(),
                _ => false,
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Value

/// An untyped JSON value.
///
/// Equality is structural. [`Value::Typed`] never compares equal, including
/// to itself, because contract objects carry no equality of their own.
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(OpenMap),
    /// A materialized contract object.
    Typed(Box<dyn Data>),
}

impl Value {
    /// Converts a parsed node without consulting any contract.
    pub fn from_node(node: &Node) -> Self {
        match node {
            Node::Null => Self::Null,
            Node::Bool(v) => Self::Bool(*v),
            Node::Number(n) => Self::Number(Number::from_node(n)),
            Node::String(s) => Self::String(s.clone()),
            Node::Array(items) => Self::Array(items.iter().map(Self::from_node).collect()),
            Node::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_node(v)))
                    .collect(),
            ),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&OpenMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` in an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Returns the typed payload if it is a `T`.
    pub fn downcast_ref<T: Data>(&self) -> Option<&T> {
        match self {
            Self::Typed(data) => (**data).downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Human readable kind, used in adapter conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Typed(_) => "typed value",
        }
    }
}

impl Default for Value {
    #[inline]
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Object(map) => f.debug_tuple("Object").field(map).finish(),
            Self::Typed(data) => write!(f, "Typed({})", data.type_path()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $expr:expr;)*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from($v: $ty) -> Self {
                    $expr
                }
            }
        )*
    };
}

impl_from! {
    bool => |v| Value::Bool(v);
    i32 => |v| Value::Number(Number::Int(i64::from(v)));
    i64 => |v| Value::Number(Number::Int(v));
    u32 => |v| Value::Number(Number::UInt(u64::from(v)));
    u64 => |v| Value::Number(Number::UInt(v));
    f64 => |v| Value::Number(Number::Float(v));
    String => |v| Value::String(v);
    &str => |v| Value::String(String::from(v));
    Vec<Value> => |v| Value::Array(v);
    OpenMap => |v| Value::Object(v);
}

// -----------------------------------------------------------------------------
// Data

impl Data for Value {
    fn data_ref(&self) -> DataRef<'_> {
        match self {
            Self::Null => DataRef::Null,
            Self::Bool(v) => DataRef::Bool(*v),
            Self::Number(Number::Int(v)) => DataRef::Int(*v),
            Self::Number(Number::UInt(v)) => DataRef::UInt(*v),
            Self::Number(Number::Float(v)) => DataRef::Float(*v),
            Self::String(s) => DataRef::Str(s),
            Self::Array(items) => DataRef::Seq(Box::new(items.iter().map(|v| v as &dyn Data))),
            Self::Object(map) => DataRef::Map(Box::new(
                map.iter().map(|(k, v)| (k.as_str(), v as &dyn Data)),
            )),
            Self::Typed(data) => DataRef::Typed(&**data),
        }
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        self.is_null()
    }
}

impl Decode for Value {
    #[inline]
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        de.decode_open(node)
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(Self::Null)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Number, Value};
    use serde_json::json;

    #[test]
    fn from_node_keeps_order() {
        let node = json!({ "b": 1, "a": [true, null], "c": { "x": "y" } });
        let value = Value::from_node(&node);

        let map = value.as_object().unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
        assert_eq!(value.get("b").and_then(Value::as_i64), Some(1));
        assert_eq!(value.get("a").and_then(Value::as_array).map(<[_]>::len), Some(2));
        assert_eq!(value.get("c").and_then(|c| c.get("x")).and_then(Value::as_str), Some("y"));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(Number::Int(3), Number::UInt(3));
        assert_eq!(Number::Float(3.0), Number::Int(3));
        assert_ne!(Number::Int(-1), Number::UInt(u64::MAX));
    }

    #[test]
    fn typed_values_never_equal() {
        let a = Value::Typed(Box::new(1_i32));
        let b = Value::Typed(Box::new(1_i32));
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<i32>(), Some(&1));
        assert_eq!(format!("{a:?}"), "Typed(i32)");
    }
}
