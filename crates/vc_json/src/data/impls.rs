use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use std::collections::HashMap;

use indexmap::IndexMap;
use time::{OffsetDateTime, PrimitiveDateTime};

use super::{Data, DataRef, Decode, Node};
use crate::de::Decoder;
use crate::error::Result;
use crate::temporal::{MIN_NAIVE, MIN_OFFSET, Temporal, TemporalKind};

// -----------------------------------------------------------------------------
// Numbers

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(
            impl Data for $ty {
                #[inline]
                fn data_ref(&self) -> DataRef<'_> {
                    DataRef::Int(*self as i64)
                }

                #[inline]
                fn is_default_value(&self) -> bool {
                    *self == 0
                }
            }

            impl Decode for $ty {
                fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
                    let value = de.read_i64(node, stringify!($ty))?;
                    <$ty>::try_from(value)
                        .map_err(|_| de.conversion_error(stringify!($ty), "value out of range"))
                }

                #[inline]
                fn absent() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Data for $ty {
                #[inline]
                fn data_ref(&self) -> DataRef<'_> {
                    DataRef::UInt(*self as u64)
                }

                #[inline]
                fn is_default_value(&self) -> bool {
                    *self == 0
                }
            }

            impl Decode for $ty {
                fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
                    let value = de.read_u64(node, stringify!($ty))?;
                    <$ty>::try_from(value)
                        .map_err(|_| de.conversion_error(stringify!($ty), "value out of range"))
                }

                #[inline]
                fn absent() -> Option<Self> {
                    Some(0)
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl Data for $ty {
                #[inline]
                fn data_ref(&self) -> DataRef<'_> {
                    DataRef::Float(f64::from(*self))
                }

                #[inline]
                fn is_default_value(&self) -> bool {
                    *self == 0.0
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
                    Ok(de.read_f64(node, stringify!($ty))? as $ty)
                }

                #[inline]
                fn absent() -> Option<Self> {
                    Some(0.0)
                }
            }
        )*
    };
}

impl_float!(f32, f64);

// -----------------------------------------------------------------------------
// bool & String

impl Data for bool {
    #[inline]
    fn data_ref(&self) -> DataRef<'_> {
        DataRef::Bool(*self)
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        !*self
    }
}

impl Decode for bool {
    #[inline]
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        de.read_bool(node)
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(false)
    }
}

impl Data for String {
    #[inline]
    fn data_ref(&self) -> DataRef<'_> {
        DataRef::Str(self)
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        self.is_empty()
    }
}

impl Decode for String {
    #[inline]
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        de.read_string(node)
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(String::new())
    }
}

// -----------------------------------------------------------------------------
// Wrappers

impl<T: Data> Data for Option<T> {
    fn data_ref(&self) -> DataRef<'_> {
        match self {
            Some(value) => value.data_ref(),
            None => DataRef::Null,
        }
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        match node {
            Node::Null => Ok(None),
            _ => T::decode(node, de).map(Some),
        }
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(None)
    }
}

impl<T: Data + ?Sized> Data for Box<T> {
    #[inline]
    fn data_ref(&self) -> DataRef<'_> {
        (**self).data_ref()
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        (**self).is_default_value()
    }

    #[inline]
    fn type_path(&self) -> &'static str {
        (**self).type_path()
    }
}

impl<T: Decode> Decode for Box<T> {
    #[inline]
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        T::decode(node, de).map(Box::new)
    }

    #[inline]
    fn absent() -> Option<Self> {
        T::absent().map(Box::new)
    }
}

// -----------------------------------------------------------------------------
// Sequences

impl<T: Data> Data for Vec<T> {
    fn data_ref(&self) -> DataRef<'_> {
        DataRef::Seq(Box::new(self.iter().map(|v| v as &dyn Data)))
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        let Node::Array(items) = node else {
            return Err(de.unexpected(node, core::any::type_name::<Self>()));
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| de.decode_element(index, item))
            .collect()
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(Vec::new())
    }
}

// -----------------------------------------------------------------------------
// Maps

macro_rules! impl_map {
    ($map:ident < T $(, $hasher:ident)? > $(where $($bound:tt)*)?) => {
        impl<T: Data $(, $hasher)?> Data for $map<String, T $(, $hasher)?>
        $(where $($bound)*)?
        {
            fn data_ref(&self) -> DataRef<'_> {
                DataRef::Map(Box::new(self.iter().map(|(k, v)| (k.as_str(), v as &dyn Data))))
            }

            #[inline]
            fn is_default_value(&self) -> bool {
                self.is_empty()
            }
        }

        impl<T: Decode $(, $hasher)?> Decode for $map<String, T $(, $hasher)?>
        $(where $($bound)*)?
        {
            fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
                let Node::Object(entries) = node else {
                    return Err(de.unexpected(node, core::any::type_name::<Self>()));
                };

                let mut map = Self::default();
                for (key, value) in entries {
                    let value = de.decode_entry(key, value)?;
                    map.insert(key.clone(), value);
                }
                Ok(map)
            }

            #[inline]
            fn absent() -> Option<Self> {
                Some(Self::default())
            }
        }
    };
}

impl_map!(IndexMap<T, S> where S: BuildHasher + Default + Send + Sync + 'static);
impl_map!(HashMap<T, S> where S: BuildHasher + Default + Send + Sync + 'static);
impl_map!(BTreeMap<T>);

// -----------------------------------------------------------------------------
// Date/time

impl Data for PrimitiveDateTime {
    #[inline]
    fn data_ref(&self) -> DataRef<'_> {
        DataRef::Temporal(Temporal::Naive(*self))
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        *self == MIN_NAIVE
    }
}

impl Decode for PrimitiveDateTime {
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        match de.decode_temporal(node, TemporalKind::Naive)? {
            Temporal::Naive(value) => Ok(value),
            Temporal::Offset(value) => Ok(PrimitiveDateTime::new(value.date(), value.time())),
        }
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(MIN_NAIVE)
    }
}

impl Data for OffsetDateTime {
    #[inline]
    fn data_ref(&self) -> DataRef<'_> {
        DataRef::Temporal(Temporal::Offset(*self))
    }

    #[inline]
    fn is_default_value(&self) -> bool {
        *self == MIN_OFFSET
    }
}

impl Decode for OffsetDateTime {
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        match de.decode_temporal(node, TemporalKind::Offset)? {
            Temporal::Offset(value) => Ok(value),
            Temporal::Naive(value) => Ok(value.assume_utc()),
        }
    }

    #[inline]
    fn absent() -> Option<Self> {
        Some(MIN_OFFSET)
    }
}
