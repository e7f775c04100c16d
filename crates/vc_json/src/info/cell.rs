//! Static storage for [`TypeInfo`].
//!
//! Non-generic contracts keep their table in a [`TypeInfoCell`], a plain
//! [`OnceLock`]. A `static` inside a generic function is shared by every
//! instantiation, so generic contracts use [`GenericTypeInfoCell`], which
//! keys the tables by [`TypeId`].

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use super::TypeInfo;

/// Storage for the [`TypeInfo`] of a non-generic type.
///
/// ```
/// use vc_json::info::{TypeInfo, TypeInfoCell};
///
/// fn type_info() -> &'static TypeInfo {
///     static CELL: TypeInfoCell = TypeInfoCell::new();
///     CELL.get_or_init(|| TypeInfo::new::<u8>("Byte"))
/// }
///
/// assert!(core::ptr::eq(type_info(), type_info()));
/// ```
pub struct TypeInfoCell(OnceLock<TypeInfo>);

impl TypeInfoCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        self.0.get_or_init(f)
    }
}

/// Storage for the [`TypeInfo`] of every instantiation of a generic type.
///
/// Entries are leaked, they live as long as the process.
pub struct GenericTypeInfoCell(RwLock<HashMap<TypeId, &'static TypeInfo, FixedState>>);

impl GenericTypeInfoCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))))
    }

    /// Returns the table of `G`, building it with `f` on first use.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        let found = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied();

        match found {
            Some(info) => info,
            None => {
                // Built outside the lock, `f` may resolve other generic tables.
                let info = f();
                let mut map = self.0.write().unwrap_or_else(PoisonError::into_inner);
                *map
                    .entry(type_id)
                    .or_insert_with(|| &*Box::leak(Box::new(info)))
            }
        }
    }
}
