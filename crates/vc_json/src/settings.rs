use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::naming::NamingConvention;

/// Default text layout for date/time values, `2024-03-01T08:30:00`.
pub const DEFAULT_DATE_TIME_FORMAT: &str = "[year]-[month]-[day]T[hour]:[minute]:[second]";

/// What to do when a value is reached again through its own members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceLoop {
    /// Keep writing. Acyclic graphs that share values are written in full.
    #[default]
    Serialize,
    /// Skip a member whose value is one of its own containers.
    Ignore,
}

/// Per-call options for reading and writing.
///
/// Settings are plain data, they can be loaded from a configuration file:
///
/// ```
/// use vc_json::{NamingConvention, Settings};
///
/// let settings: Settings = serde_json::from_str(
///     r#"{ "namingConvention": "camel", "unixTimestamp": true }"#,
/// ).unwrap();
///
/// assert_eq!(settings.naming_convention, NamingConvention::Camel);
/// assert!(settings.unix_timestamp);
/// assert!(!settings.indented);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub naming_convention: NamingConvention,
    /// Pretty-print the output.
    pub indented: bool,
    /// Write `"$type"` discriminators for polymorphic members and honor
    /// them when reading open members.
    pub typed: bool,
    /// Omit members whose value is null.
    pub suppress_nulls: bool,
    /// Omit members whose value equals the type's default.
    pub suppress_defaults: bool,
    /// Maximum nesting depth, `0` is unbounded.
    pub max_depth: usize,
    /// `time` format description used for date/time text.
    pub date_time_format: String,
    /// Write date/time values as milliseconds since the Unix epoch.
    pub unix_timestamp: bool,
    pub reference_loop: ReferenceLoop,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            naming_convention: NamingConvention::None,
            indented: false,
            typed: false,
            suppress_nulls: false,
            suppress_defaults: false,
            max_depth: 0,
            date_time_format: String::from(DEFAULT_DATE_TIME_FORMAT),
            unix_timestamp: false,
            reference_loop: ReferenceLoop::Serialize,
        }
    }
}

impl Settings {
    #[inline]
    pub fn with_naming_convention(mut self, convention: NamingConvention) -> Self {
        self.naming_convention = convention;
        self
    }

    #[inline]
    pub fn with_indented(mut self, indented: bool) -> Self {
        self.indented = indented;
        self
    }

    #[inline]
    pub fn with_typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    #[inline]
    pub fn with_suppress_nulls(mut self, suppress: bool) -> Self {
        self.suppress_nulls = suppress;
        self
    }

    #[inline]
    pub fn with_suppress_defaults(mut self, suppress: bool) -> Self {
        self.suppress_defaults = suppress;
        self
    }

    #[inline]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[inline]
    pub fn with_date_time_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = format.into();
        self
    }

    #[inline]
    pub fn with_unix_timestamp(mut self, unix: bool) -> Self {
        self.unix_timestamp = unix;
        self
    }

    #[inline]
    pub fn with_reference_loop(mut self, handling: ReferenceLoop) -> Self {
        self.reference_loop = handling;
        self
    }

    /// Returns `true` if `depth` is past the configured limit.
    #[inline]
    pub(crate) fn exceeds_depth(&self, depth: usize) -> bool {
        self.max_depth != 0 && depth > self.max_depth
    }
}
