//! Date/time encoding.
//!
//! Two target kinds exist: offset-naive values ([`PrimitiveDateTime`], read
//! as local wall-clock time) and offset-aware values ([`OffsetDateTime`]).
//!
//! Reading, in order:
//! 1. `null` gives the minimum value, `0001-01-01T00:00:00`. Nullable members
//!    (`Option<_>`) read `None` before this codec is reached.
//! 2. A number is milliseconds since `1970-01-01T00:00:00Z`. Offset-aware
//!    targets stay in UTC, naive targets are shifted to local time.
//! 3. A string is parsed with the configured format, then as ISO 8601.
//!
//! Writing produces either text in the configured format or, with
//! `unix_timestamp`, milliseconds. Offset-aware values count from the UTC
//! epoch, naive values from the epoch expressed in local time.

use alloc::format;
use alloc::string::{String, ToString};
use std::sync::Once;

use thiserror::Error;
use time::format_description::{Component, OwnedFormatItem};
use time::format_description::well_known::Iso8601;
use time::macros::datetime;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::data::{Data, DataRef, Node};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Minimum offset-naive value, also read from `null`.
pub const MIN_NAIVE: PrimitiveDateTime = datetime!(0001-01-01 0:00);

/// Minimum offset-aware value, also read from `null`.
pub const MIN_OFFSET: OffsetDateTime = datetime!(0001-01-01 0:00 UTC);

// -----------------------------------------------------------------------------
// Temporal

/// A date/time value of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Naive(PrimitiveDateTime),
    Offset(OffsetDateTime),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Naive,
    Offset,
}

impl Temporal {
    #[inline]
    pub fn minimum(kind: TemporalKind) -> Self {
        match kind {
            TemporalKind::Naive => Self::Naive(MIN_NAIVE),
            TemporalKind::Offset => Self::Offset(MIN_OFFSET),
        }
    }
}

/// Reasons a node cannot be read as a date/time.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TemporalError {
    #[error("`{0}` matches neither the configured format nor ISO 8601")]
    Unparsable(String),
    #[error("{0} ms since the Unix epoch is out of range")]
    OutOfRange(i128),
    #[error("expected a date/time string or number, found {0}")]
    UnexpectedNode(&'static str),
}

// -----------------------------------------------------------------------------
// Local offset

/// Local UTC offset at `at`, or UTC when the platform cannot tell.
fn local_offset_at(at: OffsetDateTime) -> UtcOffset {
    static WARN: Once = Once::new();

    UtcOffset::local_offset_at(at).unwrap_or_else(|_| {
        WARN.call_once(|| {
            log::warn!("local UTC offset is indeterminate, using UTC for naive date/time values");
        });
        UtcOffset::UTC
    })
}

fn into_local(value: OffsetDateTime) -> Option<PrimitiveDateTime> {
    value
        .checked_to_offset(local_offset_at(value))
        .map(|local| PrimitiveDateTime::new(local.date(), local.time()))
}

fn assume_local(value: PrimitiveDateTime) -> OffsetDateTime {
    value.assume_offset(local_offset_at(value.assume_utc()))
}

/// Whether `item` writes a UTC offset.
fn carries_offset(item: &OwnedFormatItem) -> bool {
    match item {
        OwnedFormatItem::Component(component) => matches!(component, Component::OffsetHour(_)),
        OwnedFormatItem::Compound(items) | OwnedFormatItem::First(items) => {
            items.iter().any(carries_offset)
        }
        OwnedFormatItem::Optional(item) => carries_offset(item),
        _ => false,
    }
}

// -----------------------------------------------------------------------------
// DateTimeCodec

/// Reads and writes [`Temporal`] values for one set of [`Settings`].
///
/// ```
/// use vc_json::{Settings, temporal::{DateTimeCodec, Temporal, TemporalKind}};
/// use time::macros::datetime;
///
/// let codec = DateTimeCodec::from_settings(&Settings::default()).unwrap();
///
/// let value = Temporal::Naive(datetime!(2024-03-01 8:30));
/// let node = codec.encode(value).unwrap();
/// assert_eq!(node, "2024-03-01T08:30:00");
///
/// assert_eq!(codec.decode(&node, TemporalKind::Naive).unwrap(), value);
/// ```
#[derive(Debug)]
pub struct DateTimeCodec {
    format: OwnedFormatItem,
    writes_offset: bool,
    unix_timestamp: bool,
}

impl DateTimeCodec {
    /// Compiles `settings.date_time_format`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let format = time::format_description::parse_owned::<2>(&settings.date_time_format)
            .map_err(|e| {
                Error::Unsupported(format!(
                    "invalid date/time format `{}`: {e}",
                    settings.date_time_format
                ))
            })?;

        Ok(Self {
            writes_offset: carries_offset(&format),
            format,
            unix_timestamp: settings.unix_timestamp,
        })
    }

    pub fn decode(&self, node: &Node, kind: TemporalKind) -> Result<Temporal, TemporalError> {
        match node {
            Node::Null => Ok(Temporal::minimum(kind)),
            Node::Number(number) => {
                let millis = match number.as_i64() {
                    Some(ms) => i128::from(ms),
                    None => number.as_f64().map(|ms| ms.round() as i128).unwrap_or(i128::MAX),
                };
                Self::from_unix_millis(millis, kind)
            }
            Node::String(text) => self.parse(text.trim(), kind),
            Node::Bool(_) => Err(TemporalError::UnexpectedNode("bool")),
            Node::Array(_) => Err(TemporalError::UnexpectedNode("array")),
            Node::Object(_) => Err(TemporalError::UnexpectedNode("object")),
        }
    }

    /// Like [`decode`](Self::decode), but `null` reads as `None`.
    pub fn decode_nullable(
        &self,
        node: &Node,
        kind: TemporalKind,
    ) -> Result<Option<Temporal>, TemporalError> {
        match node {
            Node::Null => Ok(None),
            _ => self.decode(node, kind).map(Some),
        }
    }

    fn from_unix_millis(millis: i128, kind: TemporalKind) -> Result<Temporal, TemporalError> {
        let utc = millis
            .checked_mul(1_000_000)
            .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(nanos).ok())
            .ok_or(TemporalError::OutOfRange(millis))?;

        match kind {
            TemporalKind::Offset => Ok(Temporal::Offset(utc)),
            TemporalKind::Naive => into_local(utc)
                .map(Temporal::Naive)
                .ok_or(TemporalError::OutOfRange(millis)),
        }
    }

    fn parse(&self, text: &str, kind: TemporalKind) -> Result<Temporal, TemporalError> {
        if kind == TemporalKind::Offset
            && let Ok(value) = OffsetDateTime::parse(text, &self.format)
        {
            return Ok(Temporal::Offset(value));
        }

        if let Ok(value) = PrimitiveDateTime::parse(text, &self.format) {
            return Ok(Self::naive_as(value, kind));
        }

        if let Ok(value) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
            return match kind {
                TemporalKind::Offset => Ok(Temporal::Offset(value)),
                TemporalKind::Naive => into_local(value)
                    .map(Temporal::Naive)
                    .ok_or_else(|| TemporalError::Unparsable(text.to_string())),
            };
        }

        if let Ok(value) = PrimitiveDateTime::parse(text, &Iso8601::DEFAULT) {
            return Ok(Self::naive_as(value, kind));
        }

        if let Ok(date) = Date::parse(text, &Iso8601::DEFAULT) {
            return Ok(Self::naive_as(date.midnight(), kind));
        }

        Err(TemporalError::Unparsable(text.to_string()))
    }

    fn naive_as(value: PrimitiveDateTime, kind: TemporalKind) -> Temporal {
        match kind {
            TemporalKind::Naive => Temporal::Naive(value),
            TemporalKind::Offset => Temporal::Offset(assume_local(value)),
        }
    }

    /// Writes `value` as text or as Unix milliseconds.
    pub fn encode(&self, value: Temporal) -> Result<Node> {
        if self.unix_timestamp {
            let millis = match value {
                Temporal::Offset(v) => (v - OffsetDateTime::UNIX_EPOCH).whole_milliseconds(),
                Temporal::Naive(v) => (v - Self::local_epoch()).whole_milliseconds(),
            };
            let millis = i64::try_from(millis).map_err(|_| {
                Error::Unsupported(format!("{millis} ms does not fit a JSON integer"))
            })?;
            return Ok(Node::from(millis));
        }

        // Text without an offset is read back as local time.
        let text = match value {
            Temporal::Naive(v) => v.format(&self.format),
            Temporal::Offset(v) if self.writes_offset => v.format(&self.format),
            Temporal::Offset(v) => v
                .checked_to_offset(local_offset_at(v))
                .unwrap_or(v)
                .format(&self.format),
        }
        .map_err(|e| Error::Unsupported(format!("cannot format {value:?}: {e}")))?;

        Ok(Node::String(text))
    }

    /// Writes a value reached as `&dyn Data`, which must be temporal.
    pub fn encode_data(&self, value: &dyn Data) -> Result<Node> {
        match value.data_ref() {
            DataRef::Temporal(temporal) => self.encode(temporal),
            _ => Err(Error::Unsupported(format!(
                "`{}` is not a date/time value",
                value.type_path()
            ))),
        }
    }

    /// The Unix epoch as local wall-clock time.
    fn local_epoch() -> PrimitiveDateTime {
        let epoch = OffsetDateTime::UNIX_EPOCH;
        into_local(epoch).unwrap_or(PrimitiveDateTime::new(epoch.date(), epoch.time()))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DateTimeCodec, MIN_NAIVE, MIN_OFFSET, Temporal, TemporalKind};
    use crate::{Error, Settings};
    use serde_json::json;
    use time::macros::datetime;

    fn codec(settings: Settings) -> DateTimeCodec {
        DateTimeCodec::from_settings(&settings).unwrap()
    }

    #[test]
    fn offset_unix_round_trip() {
        let dates = codec(Settings::default().with_unix_timestamp(true));
        let value = Temporal::Offset(datetime!(2024-03-01 8:30:15.123 UTC));

        let node = dates.encode(value).unwrap();
        assert_eq!(node, json!(1_709_281_815_123_i64));
        assert_eq!(dates.decode(&node, TemporalKind::Offset).unwrap(), value);
    }

    #[test]
    fn naive_unix_round_trip() {
        let dates = codec(Settings::default().with_unix_timestamp(true));
        let value = Temporal::Naive(datetime!(1999-12-31 23:59:59.250));

        let node = dates.encode(value).unwrap();
        assert!(node.is_i64());
        assert_eq!(dates.decode(&node, TemporalKind::Naive).unwrap(), value);
    }

    #[test]
    fn text_round_trip_to_seconds() {
        let dates = codec(Settings::default());
        let value = Temporal::Naive(datetime!(2020-02-29 23:05:09.999));

        let node = dates.encode(value).unwrap();
        assert_eq!(node, "2020-02-29T23:05:09");
        assert_eq!(
            dates.decode(&node, TemporalKind::Naive).unwrap(),
            Temporal::Naive(datetime!(2020-02-29 23:05:09)),
        );
    }

    #[test]
    fn offset_text_round_trip_keeps_instant() {
        let value = datetime!(2024-03-01 8:30 +2);

        let dates = codec(Settings::default());
        let node = dates.encode(Temporal::Offset(value)).unwrap();
        let Temporal::Offset(back) = dates.decode(&node, TemporalKind::Offset).unwrap() else {
            panic!("expected an offset value from {node}");
        };
        assert_eq!(back, value, "{node}");

        let dates = codec(Settings::default().with_date_time_format(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]",
        ));
        let node = dates.encode(Temporal::Offset(value)).unwrap();
        assert_eq!(node, "2024-03-01T08:30:00+02:00");
        assert_eq!(
            dates.decode(&node, TemporalKind::Offset).unwrap(),
            Temporal::Offset(value),
        );
    }

    #[test]
    fn custom_format() {
        let dates = codec(Settings::default().with_date_time_format("[day]/[month]/[year] [hour]:[minute]"));

        let node = dates.encode(Temporal::Naive(datetime!(2023-07-04 12:00))).unwrap();
        assert_eq!(node, "04/07/2023 12:00");
        assert_eq!(
            dates.decode(&node, TemporalKind::Naive).unwrap(),
            Temporal::Naive(datetime!(2023-07-04 12:00)),
        );
    }

    #[test]
    fn iso_fallback() {
        let dates = codec(Settings::default());

        let value = dates.decode(&json!("2024-03-01T08:30:00Z"), TemporalKind::Offset).unwrap();
        assert_eq!(value, Temporal::Offset(datetime!(2024-03-01 8:30 UTC)));

        let value = dates.decode(&json!("2024-03-01T08:30:00+02:00"), TemporalKind::Offset).unwrap();
        assert_eq!(value, Temporal::Offset(datetime!(2024-03-01 8:30 +2)));

        let value = dates.decode(&json!("2024-03-01"), TemporalKind::Naive).unwrap();
        assert_eq!(value, Temporal::Naive(datetime!(2024-03-01 0:00)));

        assert!(dates.decode(&json!("yesterday"), TemporalKind::Naive).is_err());
        assert!(dates.decode(&json!(true), TemporalKind::Naive).is_err());
    }

    // `null` on a non-nullable date is read as the minimum value instead of
    // failing. Nullable members never get here.
    #[test]
    fn null_reads_minimum_value() {
        let dates = codec(Settings::default());
        assert_eq!(
            dates.decode(&json!(null), TemporalKind::Naive).unwrap(),
            Temporal::Naive(MIN_NAIVE),
        );
        assert_eq!(
            dates.decode(&json!(null), TemporalKind::Offset).unwrap(),
            Temporal::Offset(MIN_OFFSET),
        );
        assert_eq!(dates.decode_nullable(&json!(null), TemporalKind::Naive).unwrap(), None);
    }

    #[test]
    fn encode_rejects_non_temporal() {
        let dates = codec(Settings::default());
        assert!(matches!(dates.encode_data(&5_i32), Err(Error::Unsupported(_))));
        assert!(dates.encode_data(&datetime!(2024-01-01 0:00)).is_ok());
    }

    #[test]
    fn invalid_format_is_unsupported() {
        let result = DateTimeCodec::from_settings(&Settings::default().with_date_time_format("[nope]"));
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }
}
