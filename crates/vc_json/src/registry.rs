//! Discriminator names of contract types.
//!
//! With `typed` enabled, open members read an object starting with
//! `"$type": "Name"` as the contract registered under `Name`. Types are
//! registered explicitly through [`JsonCodec::register`], or at link time
//! with `#[contract(auto_register)]` (`auto_register` feature).
//!
//! [`JsonCodec::register`]: crate::JsonCodec::register

use alloc::string::String;
use std::sync::{PoisonError, RwLock};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::data::Contract;
use crate::info::Type;

// -----------------------------------------------------------------------------
// Registration

/// A type submitted for automatic registration.
pub struct Registration {
    name: fn() -> &'static str,
    ty: fn() -> Type,
}

impl Registration {
    pub const fn of<T: Contract>() -> Self {
        fn name<T: Contract>() -> &'static str {
            T::type_info().name()
        }

        Self {
            name: name::<T>,
            ty: Type::of::<T>,
        }
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(Registration);

// -----------------------------------------------------------------------------
// TypeRegistry

/// Name to type lookup for `"$type"` discriminators.
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Type, FixedState>>,
}

impl TypeRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }

    /// Registers `T` under its discriminator name. A later registration of
    /// the same name replaces the earlier one.
    pub fn register<T: Contract>(&self) {
        self.insert(T::type_info().name(), Type::of::<T>());
    }

    fn insert(&self, name: &str, ty: Type) {
        let previous = self
            .types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(String::from(name), ty);

        if let Some(previous) = previous
            && previous != ty
        {
            log::warn!(
                "discriminator `{name}` moved from `{}` to `{}`",
                previous.type_path(),
                ty.type_path(),
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<Type> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Registers every type submitted with `#[contract(auto_register)]`.
    ///
    /// Returns `false` when the `auto_register` feature is disabled.
    pub fn auto_register(&self) -> bool {
        #[cfg(feature = "auto_register")]
        for registration in inventory::iter::<Registration> {
            self.insert((registration.name)(), (registration.ty)());
        }

        cfg!(feature = "auto_register")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeRegistry;
    use crate::derive::Contract;
    use crate::info::Type;

    #[derive(Contract, Default)]
    #[contract(default, name = "Pin")]
    struct MapPin {
        x: i32,
    }

    #[derive(Contract, Default)]
    #[contract(default, auto_register)]
    struct Marker {
        id: u32,
    }

    #[test]
    fn register_by_name() {
        let registry = TypeRegistry::new();
        assert!(registry.get("Pin").is_none());

        registry.register::<MapPin>();
        assert_eq!(registry.get("Pin"), Some(Type::of::<MapPin>()));
        assert!(!registry.contains("MapPin"));
        assert_eq!(registry.len(), 1);
        assert_eq!(MapPin::default().x, 0);
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn auto_registered_types() {
        let registry = TypeRegistry::new();
        assert!(registry.auto_register());
        assert_eq!(registry.get("Marker"), Some(Type::of::<Marker>()));
        assert_eq!(Marker::default().id, 0);
    }
}
