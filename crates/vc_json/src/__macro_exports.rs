//! Items used by `#[derive(Contract)]` expansions. Not public API.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::data::Node;
use crate::de::Decoder;
use crate::error::{Error, Result};
use crate::info::ErasedValue;

#[cfg(feature = "auto_register")]
pub use inventory;

#[inline]
pub fn downcast_ref<T: Any>(instance: &dyn Any) -> Option<&T> {
    instance.downcast_ref::<T>()
}

pub fn downcast_mut<T: Any>(instance: &mut dyn Any) -> Result<&mut T> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(|| Error::contract(type_name::<T>(), "instance of another type"))
}

pub fn take<T: Any>(value: ErasedValue) -> Result<T> {
    value
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| Error::contract(type_name::<T>(), "value of another type"))
}

/// Typed access to constructor arguments.
pub struct Args {
    values: alloc::vec::IntoIter<ErasedValue>,
    owner: &'static str,
}

impl Args {
    pub fn new(values: Vec<ErasedValue>, arity: usize, owner: &'static str) -> Result<Self> {
        if values.len() != arity {
            return Err(Error::contract(
                owner,
                format!("constructor takes {arity} arguments, got {}", values.len()),
            ));
        }

        Ok(Self {
            values: values.into_iter(),
            owner,
        })
    }

    pub fn next<T: Any>(&mut self) -> Result<T> {
        match self.values.next() {
            Some(value) => take::<T>(value),
            None => Err(Error::contract(self.owner, "constructor arguments exhausted")),
        }
    }
}

/// Boxes a constructed instance.
#[inline]
pub fn erase<T: Any + Send>(value: T) -> ErasedValue {
    Box::new(value)
}

/// Reads a unit enum variant from its discriminant or its name.
///
/// Returns the index into `variants`.
pub fn unit_variant(
    node: &Node,
    de: &Decoder<'_>,
    variants: &[(&str, i64)],
    target: &'static str,
) -> Result<usize> {
    let found = match node {
        Node::Number(_) => {
            let discriminant = de.read_i64(node, target)?;
            variants.iter().position(|&(_, d)| d == discriminant)
        }
        Node::String(text) => {
            let text = text.trim();
            match text.parse::<i64>() {
                Ok(discriminant) => variants.iter().position(|&(_, d)| d == discriminant),
                Err(_) => variants
                    .iter()
                    .position(|(name, _)| *name == text)
                    .or_else(|| {
                        variants
                            .iter()
                            .position(|(name, _)| name.eq_ignore_ascii_case(text))
                    }),
            }
        }
        _ => return Err(de.unexpected(node, target)),
    };

    found.ok_or_else(|| de.conversion_error(target, format!("no variant matches {node}")))
}

#[cfg(test)]
mod tests {
    use super::{Args, erase, unit_variant};
    use crate::temporal::DateTimeCodec;
    use crate::{Error, JsonCodec, Settings};
    use crate::de::Decoder;
    use serde_json::json;

    #[test]
    fn args_check_arity_and_types() {
        assert!(matches!(
            Args::new(vec![erase(1_u32)], 2, "Badge"),
            Err(Error::Contract { .. })
        ));

        let mut args = Args::new(vec![erase(1_u32), erase(String::from("x"))], 2, "Badge").unwrap();
        assert_eq!(args.next::<u32>().unwrap(), 1);
        assert!(args.next::<u32>().is_err());
        assert!(args.next::<u32>().is_err());
    }

    #[test]
    fn variants_by_number_or_name() {
        let codec = JsonCodec::new();
        let settings = Settings::default();
        let dates = DateTimeCodec::from_settings(&settings).unwrap();
        let de = Decoder::new(&codec, &settings, &dates);
        let variants = [("Male", 0), ("Female", 1)];

        assert_eq!(unit_variant(&json!(1), &de, &variants, "Gender").unwrap(), 1);
        assert_eq!(unit_variant(&json!("0"), &de, &variants, "Gender").unwrap(), 0);
        assert_eq!(unit_variant(&json!("female"), &de, &variants, "Gender").unwrap(), 1);
        assert!(unit_variant(&json!(5), &de, &variants, "Gender").is_err());
        assert!(unit_variant(&json!(true), &de, &variants, "Gender").is_err());
    }
}
