//! Reading parsed JSON into values.
//!
//! The text is parsed up front into [`Node`]s; a [`Decoder`] then walks them
//! with the target types' [`Decode`] implementations. It carries the call's
//! settings, the current JSON path for error reporting and the depth guard.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::binder::AbstractTarget;
use crate::codec::JsonCodec;
use crate::contract::TypeContract;
use crate::data::{Contract, Data, Decode, Node};
use crate::error::{Error, Result};
use crate::info::{ErasedValue, Type, TypeInfo};
use crate::settings::Settings;
use crate::temporal::{DateTimeCodec, Temporal, TemporalKind};
use crate::value::{OpenMap, Value};

// -----------------------------------------------------------------------------
// Modules

mod materializer;

/// Member name carrying a discriminator.
pub const TYPE_KEY: &str = "$type";

// -----------------------------------------------------------------------------
// JsonPath

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location inside the input, rendered as `$.Member[0].Inner`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPath(Vec<Segment>);

impl JsonPath {
    #[inline]
    pub(crate) fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<Segment> for JsonPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// -----------------------------------------------------------------------------
// Decoder

fn node_kind(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Bool(_) => "bool",
        Node::Number(_) => "number",
        Node::String(_) => "string",
        Node::Array(_) => "array",
        Node::Object(_) => "object",
    }
}

/// State of one deserialization call.
pub struct Decoder<'a> {
    codec: &'a JsonCodec,
    settings: &'a Settings,
    dates: &'a DateTimeCodec,
    path: JsonPath,
    depth: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(codec: &'a JsonCodec, settings: &'a Settings, dates: &'a DateTimeCodec) -> Self {
        Self {
            codec,
            settings,
            dates,
            path: JsonPath::default(),
            depth: 0,
        }
    }

    #[inline]
    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Location of the node being decoded.
    #[inline]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    pub fn conversion_error(&self, target: &'static str, reason: impl Into<String>) -> Error {
        Error::Conversion {
            path: self.path.to_string(),
            target,
            reason: reason.into(),
        }
    }

    /// Conversion error for a node of the wrong kind.
    pub fn unexpected(&self, node: &Node, target: &'static str) -> Error {
        self.conversion_error(target, format!("unexpected {}", node_kind(node)))
    }

    pub(crate) fn materialization_error(
        &self,
        type_path: &'static str,
        reason: impl Into<String>,
    ) -> Error {
        Error::Materialization {
            type_path,
            path: self.path.to_string(),
            reason: reason.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Scalars

    /// Reads an integer from a number or a numeric string.
    pub fn read_i64(&self, node: &Node, target: &'static str) -> Result<i64> {
        match node {
            Node::Number(number) => {
                if let Some(v) = number.as_i64() {
                    return Ok(v);
                }
                if number.is_u64() {
                    return Err(self.conversion_error(target, "value out of range"));
                }
                match number.as_f64() {
                    Some(v) if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                        Ok(v as i64)
                    }
                    _ => Err(self.conversion_error(target, format!("{number} is not an integer"))),
                }
            }
            Node::String(text) => text
                .trim()
                .parse()
                .map_err(|_| self.conversion_error(target, format!("`{text}` is not an integer"))),
            _ => Err(self.unexpected(node, target)),
        }
    }

    /// Reads a non-negative integer from a number or a numeric string.
    pub fn read_u64(&self, node: &Node, target: &'static str) -> Result<u64> {
        match node {
            Node::Number(number) => {
                if let Some(v) = number.as_u64() {
                    return Ok(v);
                }
                if number.is_i64() {
                    return Err(self.conversion_error(target, "value out of range"));
                }
                match number.as_f64() {
                    Some(v) if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 => Ok(v as u64),
                    _ => Err(self.conversion_error(target, format!("{number} is not an unsigned integer"))),
                }
            }
            Node::String(text) => text.trim().parse().map_err(|_| {
                self.conversion_error(target, format!("`{text}` is not an unsigned integer"))
            }),
            _ => Err(self.unexpected(node, target)),
        }
    }

    pub fn read_f64(&self, node: &Node, target: &'static str) -> Result<f64> {
        match node {
            Node::Number(number) => number
                .as_f64()
                .ok_or_else(|| self.conversion_error(target, "value out of range")),
            Node::String(text) => text
                .trim()
                .parse()
                .map_err(|_| self.conversion_error(target, format!("`{text}` is not a number"))),
            _ => Err(self.unexpected(node, target)),
        }
    }

    /// Reads `true`/`false`, `0`/`1`, or their string forms.
    pub fn read_bool(&self, node: &Node) -> Result<bool> {
        match node {
            Node::Bool(v) => Ok(*v),
            Node::Number(number) => match number.as_u64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.conversion_error("bool", format!("{number} is not 0 or 1"))),
            },
            Node::String(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(self.conversion_error("bool", format!("`{text}` is not a boolean")))
                }
            }
            _ => Err(self.unexpected(node, "bool")),
        }
    }

    /// Reads a string. Numbers and booleans are accepted in their text form.
    pub fn read_string(&self, node: &Node) -> Result<String> {
        match node {
            Node::String(text) => Ok(text.clone()),
            Node::Number(number) => Ok(number.to_string()),
            Node::Bool(v) => Ok(v.to_string()),
            _ => Err(self.unexpected(node, "alloc::string::String")),
        }
    }

    pub fn decode_temporal(&self, node: &Node, kind: TemporalKind) -> Result<Temporal> {
        self.dates.decode(node, kind).map_err(|e| {
            let target = match kind {
                TemporalKind::Naive => "time::PrimitiveDateTime",
                TemporalKind::Offset => "time::OffsetDateTime",
            };
            self.conversion_error(target, e.to_string())
        })
    }

    // -------------------------------------------------------------------------
    // Nesting

    /// Runs `f` one level deeper, at `segment`.
    pub(crate) fn scoped<R>(
        &mut self,
        segment: Segment,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        if self.settings.exceeds_depth(self.depth + 1) {
            return Err(Error::DepthExceeded(self.settings.max_depth));
        }

        self.depth += 1;

        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        self.depth -= 1;
        result
    }

    pub fn decode_element<T: Decode>(&mut self, index: usize, node: &Node) -> Result<T> {
        self.scoped(Segment::Index(index), |de| T::decode(node, de))
    }

    pub fn decode_entry<T: Decode>(&mut self, key: &str, node: &Node) -> Result<T> {
        self.scoped(Segment::Key(String::from(key)), |de| T::decode(node, de))
    }

    // -------------------------------------------------------------------------
    // Open values

    /// Decodes a node without a static target.
    ///
    /// With `typed` enabled, an object whose first member is a registered
    /// `"$type"` discriminator is materialized as that type.
    pub fn decode_open(&mut self, node: &Node) -> Result<Value> {
        match node {
            Node::Object(entries) => {
                if let Some(ty) = self.discriminated_type(node) {
                    return self.decode_as(node, ty).map(Value::Typed);
                }

                let mut map = OpenMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let value = self.scoped(Segment::Key(key.clone()), |de| de.decode_open(value))?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Object(map))
            }
            Node::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.scoped(Segment::Index(index), |de| de.decode_open(item)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => Ok(Value::from_node(node)),
        }
    }

    fn discriminated_type(&self, node: &Node) -> Option<Type> {
        if !self.settings.typed {
            return None;
        }

        let Node::Object(entries) = node else {
            return None;
        };

        match entries.iter().next() {
            Some((key, Node::String(name))) if key == TYPE_KEY => {
                let ty = self.codec.registry().get(name);
                if ty.is_none() {
                    log::debug!("`{TYPE_KEY}` names unregistered type `{name}` at {}", self.path);
                }
                ty
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Contracts

    pub(crate) fn contract_of(&self, info: &'static TypeInfo) -> Result<Arc<TypeContract>> {
        self.codec
            .contracts()
            .resolve(info, self.settings.naming_convention)
    }

    /// Builds a contract type from an object node.
    pub fn materialize<T: Contract>(&mut self, node: &Node) -> Result<T> {
        let info = T::type_info();
        let instance = self.materialize_erased(info, node)?;
        instance
            .downcast::<T>()
            .map(|instance| *instance)
            .map_err(|_| self.materialization_error(info.type_path(), "constructor returned another type"))
    }

    pub(crate) fn materialize_erased(
        &mut self,
        info: &'static TypeInfo,
        node: &Node,
    ) -> Result<ErasedValue> {
        materializer::materialize(self, info, node)
    }

    /// Decodes `node` as the runtime type `ty`.
    #[inline]
    pub fn decode_as(&mut self, node: &Node, ty: Type) -> Result<Box<dyn Data>> {
        ty.decode(node, self)
    }

    pub(crate) fn build_abstract(
        &mut self,
        target: &AbstractTarget,
        node: &Node,
    ) -> Result<Box<dyn Data>> {
        let codec = self.codec;
        match codec.instance_builder() {
            Some(builder) => builder.build(target, node, self),
            None => Err(self.materialization_error(
                target.type_path(),
                "abstract member without an instance builder",
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Decoder, JsonPath, Segment};
    use crate::temporal::DateTimeCodec;
    use crate::{Error, JsonCodec, Settings};
    use serde_json::json;

    fn with_decoder<R>(settings: Settings, f: impl FnOnce(&mut Decoder<'_>) -> R) -> R {
        let codec = JsonCodec::new();
        let dates = DateTimeCodec::from_settings(&settings).unwrap();
        let mut de = Decoder::new(&codec, &settings, &dates);
        f(&mut de)
    }

    #[test]
    fn path_display() {
        let path: JsonPath = [
            Segment::Key("Principal".into()),
            Segment::Key("Projects".into()),
            Segment::Index(1),
        ]
        .into_iter()
        .collect();
        assert_eq!(path.to_string(), "$.Principal.Projects[1]");
        assert_eq!(JsonPath::default().to_string(), "$");
    }

    #[test]
    fn lenient_scalars() {
        with_decoder(Settings::default(), |de| {
            assert_eq!(de.read_i64(&json!("42"), "i64").unwrap(), 42);
            assert_eq!(de.read_i64(&json!(7.0), "i64").unwrap(), 7);
            assert!(de.read_i64(&json!(7.5), "i64").is_err());
            assert!(de.read_u64(&json!(-1), "u64").is_err());
            assert!(de.read_bool(&json!("TRUE")).unwrap());
            assert!(!de.read_bool(&json!(0)).unwrap());
            assert_eq!(de.read_string(&json!(12)).unwrap(), "12");
            assert!(de.read_string(&json!(null)).is_err());
        });
    }

    #[test]
    fn errors_carry_path() {
        with_decoder(Settings::default(), |de| {
            let err = de
                .decode_entry::<Vec<u8>>("Scores", &json!([1, 2, 300]))
                .unwrap_err();
            match err {
                Error::Conversion { path, target, .. } => {
                    assert_eq!(path, "$.Scores[2]");
                    assert_eq!(target, "u8");
                }
                other => panic!("unexpected error {other:?}"),
            }
        });
    }

    #[test]
    fn depth_limit() {
        let node = json!({ "a": { "b": { "c": 1 } } });

        with_decoder(Settings::default().with_max_depth(2), |de| {
            assert!(matches!(de.decode_open(&node), Err(Error::DepthExceeded(2))));
        });
        with_decoder(Settings::default().with_max_depth(3), |de| {
            assert!(de.decode_open(&node).is_ok());
        });
    }

    #[test]
    fn open_arrays_hold_maps() {
        with_decoder(Settings::default(), |de| {
            let value = de.decode_open(&json!([{ "ProjectId": 1 }, { "ProjectId": 3 }])).unwrap();
            let items = value.as_array().unwrap();
            assert_eq!(items.len(), 2);
            assert_eq!(items[1].get("ProjectId").and_then(|v| v.as_i64()), Some(3));
        });
    }
}
