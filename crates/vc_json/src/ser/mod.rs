//! Writing values as JSON.
//!
//! [`SerializeDriver`] adapts any [`Data`] to [`serde::Serialize`], so the
//! output goes through `serde_json`'s writer. Contract objects are written as
//! maps following their resolved contract.
//!
//! Failures that are not serde's own (contract errors, date/time formatting,
//! adapter rejections) are stashed in the [`Encoder`] and surfaced with their
//! original kind once the writer gives up.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::cell::RefCell;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::codec::JsonCodec;
use crate::data::{Data, DataRef, Object};
use crate::de::{JsonPath, Segment, TYPE_KEY};
use crate::error::Error;
use crate::settings::{ReferenceLoop, Settings};
use crate::temporal::DateTimeCodec;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Encoder

/// State of one serialization call.
pub struct Encoder<'a> {
    codec: &'a JsonCodec,
    settings: &'a Settings,
    dates: &'a DateTimeCodec,
    error: RefCell<Option<Error>>,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(codec: &'a JsonCodec, settings: &'a Settings, dates: &'a DateTimeCodec) -> Self {
        Self {
            codec,
            settings,
            dates,
            error: RefCell::new(None),
        }
    }

    #[inline]
    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Driver for the root value.
    pub(crate) fn root<'s>(&'s self, value: &'s dyn Data) -> SerializeDriver<'s> {
        SerializeDriver {
            value,
            encoder: self,
            parent: None,
            segment: None,
            depth: 0,
        }
    }

    /// Keeps the first failure and converts it for serde.
    fn fail<E: serde::ser::Error>(&self, error: Error) -> E {
        let message = error.to_string();
        let mut slot = self.error.borrow_mut();
        if slot.is_none() {
            *slot = Some(error);
        }
        E::custom(message)
    }

    pub(crate) fn take_error(&self) -> Option<Error> {
        self.error.borrow_mut().take()
    }
}

// -----------------------------------------------------------------------------
// SerializeDriver

/// Where a driver sits in its parent.
#[derive(Clone, Copy)]
enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

/// [`Serialize`] adapter for a [`Data`] value.
///
/// Drivers form a chain through `parent`, used for error paths and for
/// reference loop detection.
pub struct SerializeDriver<'a> {
    value: &'a dyn Data,
    encoder: &'a Encoder<'a>,
    parent: Option<&'a SerializeDriver<'a>>,
    segment: Option<Step<'a>>,
    depth: usize,
}

impl<'a> SerializeDriver<'a> {
    fn child<'s>(&'s self, value: &'s dyn Data, step: Step<'s>) -> SerializeDriver<'s> {
        SerializeDriver {
            value,
            encoder: self.encoder,
            parent: Some(self),
            segment: Some(step),
            depth: self.depth + 1,
        }
    }

    fn path(&self, last: Option<Step<'_>>) -> JsonPath {
        let mut steps = Vec::new();
        steps.extend(last);

        let mut cursor = Some(self);
        while let Some(driver) = cursor {
            steps.extend(driver.segment);
            cursor = driver.parent;
        }

        steps
            .into_iter()
            .rev()
            .map(|step| match step {
                Step::Key(key) => Segment::Key(String::from(key)),
                Step::Index(index) => Segment::Index(index),
            })
            .collect()
    }

    /// Whether `value` is this driver's value or one of its containers.
    fn is_ancestor(&self, value: &dyn Data) -> bool {
        let identity = identity_of(value);

        let mut cursor = Some(self);
        while let Some(driver) = cursor {
            if identity_of(driver.value) == identity {
                return true;
            }
            cursor = driver.parent;
        }
        false
    }

    fn serialize_object<S: Serializer>(
        &self,
        object: &dyn Object,
        typed: bool,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let encoder = self.encoder;
        let settings = encoder.settings;
        let info = object.object_info();

        let contract = encoder
            .codec
            .contracts()
            .resolve(info, settings.naming_convention)
            .map_err(|e| encoder.fail::<S::Error>(e))?;

        let instance: &dyn Any = object;
        let mut map = serializer.serialize_map(None)?;

        if typed {
            map.serialize_entry(TYPE_KEY, info.name())?;
        }

        for member in contract.members() {
            if member.is_ignored() {
                continue;
            }

            let Some(value) = member.info().get(instance) else {
                return Err(encoder.fail(Error::Unsupported(alloc::format!(
                    "member `{}` cannot be read from `{}`",
                    member.info().name(),
                    info.type_path(),
                ))));
            };

            if settings.suppress_nulls && matches!(value.data_ref(), DataRef::Null) {
                log::trace!("suppressed null member `{}`", member.name());
                continue;
            }

            if settings.suppress_defaults && value.is_default_value() {
                log::trace!("suppressed default member `{}`", member.name());
                continue;
            }

            if settings.reference_loop == ReferenceLoop::Ignore && self.is_ancestor(value) {
                log::debug!("skipped self-referencing member `{}`", member.name());
                continue;
            }

            let step = Step::Key(member.name());
            match member.info().write_adapted(value) {
                Some(adapted) => {
                    let adapted: Value = adapted.map_err(|e| {
                        encoder.fail::<S::Error>(Error::Conversion {
                            path: self.path(Some(step)).to_string(),
                            target: member.info().type_path(),
                            reason: e.to_string(),
                        })
                    })?;
                    map.serialize_entry(member.name(), &self.child(&adapted, step))?;
                }
                None => map.serialize_entry(member.name(), &self.child(value, step))?,
            }
        }

        map.end()
    }

    fn with_value<'s>(&'s self, value: &'s dyn Data) -> SerializeDriver<'s> {
        SerializeDriver {
            value,
            encoder: self.encoder,
            parent: self.parent,
            segment: self.segment,
            depth: self.depth,
        }
    }
}

fn identity_of(value: &dyn Data) -> (*const (), TypeId) {
    let any: &dyn Any = value;
    (value as *const dyn Data as *const (), any.type_id())
}

impl Serialize for SerializeDriver<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoder = self.encoder;
        let settings = encoder.settings;

        if settings.exceeds_depth(self.depth) {
            return Err(encoder.fail(Error::DepthExceeded(settings.max_depth)));
        }

        match self.value.data_ref() {
            DataRef::Null => serializer.serialize_unit(),
            DataRef::Bool(v) => serializer.serialize_bool(v),
            DataRef::Int(v) => serializer.serialize_i64(v),
            DataRef::UInt(v) => serializer.serialize_u64(v),
            DataRef::Float(v) => serializer.serialize_f64(v),
            DataRef::Str(v) => serializer.serialize_str(v),
            DataRef::Temporal(temporal) => encoder
                .dates
                .encode(temporal)
                .map_err(|e| encoder.fail::<S::Error>(e))?
                .serialize(serializer),
            DataRef::Seq(items) => {
                let mut seq = serializer.serialize_seq(None)?;
                for (index, item) in items.enumerate() {
                    seq.serialize_element(&self.child(item, Step::Index(index)))?;
                }
                seq.end()
            }
            DataRef::Map(entries) => {
                let mut map = serializer.serialize_map(None)?;
                for (key, item) in entries {
                    map.serialize_entry(key, &self.child(item, Step::Key(key)))?;
                }
                map.end()
            }
            DataRef::Object(object) => self.serialize_object(object, false, serializer),
            DataRef::Typed(inner) => match inner.data_ref() {
                DataRef::Object(object) => self.serialize_object(object, settings.typed, serializer),
                _ => self.with_value(inner).serialize(serializer),
            },
        }
    }
}

/// Maps a writer failure back to the codec error that caused it.
pub(crate) fn surface_error(encoder: &Encoder<'_>, error: serde_json::Error) -> Error {
    match encoder.take_error() {
        Some(error) => error,
        None if error.is_io() => Error::Io(error.into()),
        None => Error::Syntax(error),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::binder::{AdapterError, ValueAdapter};
    use crate::{Error, JsonCodec, ReferenceLoop, Settings, Value, derive::Contract};

    #[derive(Contract, Default)]
    #[contract(default)]
    struct Node {
        label: String,
        #[contract(order = -5)]
        weight: Option<u32>,
        children: Vec<Node>,
    }

    #[test]
    fn members_follow_contract_order() {
        let codec = JsonCodec::new();
        let node = Node {
            label: "root".into(),
            weight: Some(3),
            children: vec![Node::default()],
        };

        let text = codec.to_string(&node).unwrap();
        assert_eq!(
            text,
            r#"{"Weight":3,"Label":"root","Children":[{"Weight":null,"Label":"","Children":[]}]}"#,
        );
    }

    #[test]
    fn suppression() {
        let codec = JsonCodec::new();
        let node = Node {
            label: String::new(),
            weight: None,
            children: vec![],
        };

        let settings = Settings::default().with_suppress_nulls(true);
        assert_eq!(
            codec.to_string_with(&node, &settings).unwrap(),
            r#"{"Label":"","Children":[]}"#,
        );

        let settings = Settings::default().with_suppress_defaults(true);
        assert_eq!(codec.to_string_with(&node, &settings).unwrap(), "{}");
    }

    #[test]
    fn depth_limit_surfaces_its_own_error() {
        let codec = JsonCodec::new();
        let mut node = Node::default();
        for _ in 0..4 {
            node = Node {
                children: vec![node],
                ..Node::default()
            };
        }

        let settings = Settings::default().with_max_depth(3);
        let err = codec.to_string_with(&node, &settings).unwrap_err();
        assert!(matches!(err, Error::DepthExceeded(3)));

        let settings = Settings::default()
            .with_max_depth(20)
            .with_reference_loop(ReferenceLoop::Ignore);
        assert!(codec.to_string_with(&node, &settings).is_ok());
    }

    #[derive(Default)]
    struct Hex;

    impl ValueAdapter<u32> for Hex {
        fn read(&self, raw: Value) -> Result<u32, AdapterError> {
            let text = raw.as_str().ok_or("expected a hex string")?;
            Ok(u32::from_str_radix(text.trim_start_matches("0x"), 16)?)
        }

        fn write(&self, value: &u32) -> Result<Value, AdapterError> {
            if *value == u32::MAX {
                return Err("reserved color".into());
            }
            Ok(Value::from(alloc::format!("0x{value:06x}")))
        }
    }

    #[derive(Contract, Default, Debug, PartialEq)]
    #[contract(default)]
    struct Swatch {
        #[contract(adapter = Hex)]
        color: u32,
    }

    #[test]
    fn adapters_write_and_read() {
        let codec = JsonCodec::new();

        let text = codec.to_string(&Swatch { color: 0xff8800 }).unwrap();
        assert_eq!(text, r#"{"Color":"0xff8800"}"#);
        assert_eq!(codec.from_str::<Swatch>(&text).unwrap(), Some(Swatch { color: 0xff8800 }));

        match codec.to_string(&Swatch { color: u32::MAX }).unwrap_err() {
            Error::Conversion { path, .. } => assert_eq!(path, "$.Color"),
            other => panic!("unexpected error {other:?}"),
        }

        match codec.from_str::<Swatch>(r#"{"Color":12}"#).unwrap_err() {
            Error::Conversion { path, reason, .. } => {
                assert_eq!(path, "$.Color");
                assert!(reason.starts_with("number rejected"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn open_values_are_written_in_order() {
        let codec = JsonCodec::new();
        let value: Value = codec
            .from_str(r#"{"b":[1,"x",null],"a":{"c":true}}"#)
            .unwrap()
            .unwrap();

        assert_eq!(codec.to_string(&value).unwrap(), r#"{"b":[1,"x",null],"a":{"c":true}}"#);
    }
}
