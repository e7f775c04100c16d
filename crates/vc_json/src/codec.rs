use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::io;

use crate::binder::InstanceBuilder;
use crate::contract::{ContractCache, TypeContract};
use crate::data::{Contract, Data, DataRef, Decode, Node};
use crate::de::Decoder;
use crate::error::{Error, Result};
use crate::info::Type;
use crate::registry::TypeRegistry;
use crate::ser::{Encoder, surface_error};
use crate::settings::Settings;
use crate::temporal::DateTimeCodec;

/// Entry point for reading and writing JSON.
///
/// A codec owns the contract cache, the discriminator registry and a default
/// [`Settings`] used by the methods without a `_with` suffix. Changing the
/// defaults through [`settings_mut`](Self::settings_mut) affects later calls
/// only. The codec holds no per-call state, one instance can serve many
/// threads.
///
/// ```
/// use vc_json::{JsonCodec, NamingConvention, derive::Contract};
///
/// #[derive(Contract, Default, Debug, PartialEq)]
/// #[contract(default)]
/// struct Creator {
///     user_id: u32,
///     name: String,
/// }
///
/// let mut codec = JsonCodec::new();
/// codec.settings_mut().naming_convention = NamingConvention::Camel;
///
/// let popeye = Creator { user_id: 100, name: "Popeye".into() };
/// let text = codec.to_string(&popeye).unwrap();
/// assert_eq!(text, r#"{"userId":100,"name":"Popeye"}"#);
///
/// assert_eq!(codec.from_str::<Creator>(&text).unwrap(), Some(popeye));
/// assert_eq!(codec.from_str::<Creator>("  ").unwrap(), None);
/// ```
pub struct JsonCodec {
    settings: Settings,
    contracts: ContractCache,
    registry: TypeRegistry,
    builder: Option<Box<dyn InstanceBuilder>>,
}

impl Default for JsonCodec {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl JsonCodec {
    #[inline]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let registry = TypeRegistry::new();
        registry.auto_register();

        Self {
            settings,
            contracts: ContractCache::new(),
            registry,
            builder: None,
        }
    }

    /// Installs the builder used for [`Abstract`](crate::binder::Abstract) members.
    pub fn with_instance_builder(mut self, builder: impl InstanceBuilder) -> Self {
        self.builder = Some(Box::new(builder));
        self
    }

    /// Makes `T` available to `"$type"` discriminators.
    #[inline]
    pub fn register<T: Contract>(&self) {
        self.registry.register::<T>();
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Resolved contract of `T` under the default naming convention.
    pub fn contract<T: Contract>(&self) -> Result<Arc<TypeContract>> {
        self.contracts
            .resolve(T::type_info(), self.settings.naming_convention)
    }

    #[inline]
    pub(crate) fn contracts(&self) -> &ContractCache {
        &self.contracts
    }

    #[inline]
    pub(crate) fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub(crate) fn instance_builder(&self) -> Option<&dyn InstanceBuilder> {
        self.builder.as_deref()
    }

    // -------------------------------------------------------------------------
    // Writing

    /// Writes `value` with the default settings. A null value gives `""`.
    #[inline]
    pub fn to_string(&self, value: &dyn Data) -> Result<String> {
        self.to_string_with(value, &self.settings)
    }

    pub fn to_string_with(&self, value: &dyn Data, settings: &Settings) -> Result<String> {
        let mut buffer = Vec::with_capacity(128);
        self.to_writer_with(&mut buffer, value, settings)?;
        String::from_utf8(buffer).map_err(|e| Error::Unsupported(e.to_string()))
    }

    /// Writes `value` with the default settings. A null value writes nothing.
    #[inline]
    pub fn to_writer<W: io::Write>(&self, writer: W, value: &dyn Data) -> Result<()> {
        self.to_writer_with(writer, value, &self.settings)
    }

    pub fn to_writer_with<W: io::Write>(
        &self,
        writer: W,
        value: &dyn Data,
        settings: &Settings,
    ) -> Result<()> {
        if matches!(value.data_ref(), DataRef::Null) {
            return Ok(());
        }

        let dates = DateTimeCodec::from_settings(settings)?;
        let encoder = Encoder::new(self, settings, &dates);
        let driver = encoder.root(value);

        let written = if settings.indented {
            serde_json::to_writer_pretty(writer, &driver)
        } else {
            serde_json::to_writer(writer, &driver)
        };

        written.map_err(|e| surface_error(&encoder, e))
    }

    // -------------------------------------------------------------------------
    // Reading

    /// Reads a `T` with the default settings.
    ///
    /// Empty or whitespace-only text, and the literal `null`, give `None`.
    #[inline]
    pub fn from_str<T: Decode>(&self, text: &str) -> Result<Option<T>> {
        self.from_str_with(text, &self.settings)
    }

    pub fn from_str_with<T: Decode>(&self, text: &str, settings: &Settings) -> Result<Option<T>> {
        self.read(text, settings, |node, de| T::decode(node, de))
    }

    /// Reads a value of the runtime type `ty`.
    pub fn from_str_typed(&self, text: &str, ty: Type) -> Result<Option<Box<dyn Data>>> {
        self.read(text, &self.settings, |node, de| de.decode_as(node, ty))
    }

    #[inline]
    pub fn from_reader<T: Decode, R: io::Read>(&self, reader: R) -> Result<Option<T>> {
        self.from_reader_with(reader, &self.settings)
    }

    pub fn from_reader_with<T: Decode, R: io::Read>(
        &self,
        reader: R,
        settings: &Settings,
    ) -> Result<Option<T>> {
        let text = io::read_to_string(reader)?;
        self.from_str_with(&text, settings)
    }

    fn read<T>(
        &self,
        text: &str,
        settings: &Settings,
        decode: impl FnOnce(&Node, &mut Decoder<'_>) -> Result<T>,
    ) -> Result<Option<T>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let node = parse(text)?;
        if node.is_null() {
            return Ok(None);
        }

        let dates = DateTimeCodec::from_settings(settings)?;
        let mut de = Decoder::new(self, settings, &dates);
        decode(&node, &mut de).map(Some)
    }
}

/// Parses strict JSON, then relaxed JSON5 when the `json5` feature is on.
fn parse(text: &str) -> Result<Node> {
    match serde_json::from_str::<Node>(text) {
        Ok(node) => Ok(node),
        #[cfg(feature = "json5")]
        Err(strict) => match json5::from_str::<Node>(text) {
            Ok(node) => {
                log::debug!("input is not strict JSON ({strict}), read as JSON5");
                Ok(node)
            }
            Err(_) => Err(Error::Syntax(strict)),
        },
        #[cfg(not(feature = "json5"))]
        Err(strict) => Err(Error::Syntax(strict)),
    }
}
