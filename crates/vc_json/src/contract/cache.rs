use alloc::sync::Arc;
use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use super::TypeContract;
use crate::error::Result;
use crate::info::TypeInfo;
use crate::naming::NamingConvention;

/// Memoized contracts, keyed by type and naming convention.
///
/// Entries are never invalidated. Two threads resolving the same type at once
/// both build it, the last insert wins and both results are equivalent.
pub struct ContractCache {
    contracts: RwLock<HashMap<(TypeId, NamingConvention), Arc<TypeContract>, FixedState>>,
}

impl ContractCache {
    #[inline]
    pub const fn new() -> Self {
        Self {
            contracts: RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }

    /// Returns the contract of `info`, resolving it on first use.
    pub fn resolve(
        &self,
        info: &'static TypeInfo,
        naming: NamingConvention,
    ) -> Result<Arc<TypeContract>> {
        let key = (info.type_id(), naming);

        let cached = self
            .contracts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        if let Some(contract) = cached {
            return Ok(contract);
        }

        // Resolved outside the lock, failures are not cached.
        let contract = Arc::new(TypeContract::resolve(info, naming)?);

        self.contracts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&contract));

        Ok(contract)
    }

    pub fn len(&self) -> usize {
        self.contracts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn contains(&self, type_id: TypeId, naming: NamingConvention) -> bool {
        self.contracts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(type_id, naming))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ContractCache;
    use crate::{Contract, NamingConvention, derive::Contract};
    use alloc::sync::Arc;
    use core::any::TypeId;

    #[derive(Contract, Default)]
    #[contract(default)]
    struct Sample {
        sample_id: u32,
    }

    #[test]
    fn resolves_once_per_convention() {
        let cache = ContractCache::new();
        let info = Sample::type_info();

        let a = cache.resolve(info, NamingConvention::Camel).unwrap();
        let b = cache.resolve(info, NamingConvention::Camel).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.resolve(info, NamingConvention::None).unwrap();
        assert_eq!(c.members()[0].name(), "SampleId");
        assert_eq!(a.members()[0].name(), "sampleId");
        assert!(cache.contains(TypeId::of::<Sample>(), NamingConvention::None));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_resolution() {
        let cache = ContractCache::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let contract = cache
                        .resolve(Sample::type_info(), NamingConvention::Pascal)
                        .unwrap();
                    assert_eq!(contract.members().len(), 1);
                });
            }
        });

        assert_eq!(cache.len(), 1);
    }
}
