//! Late resolution of member types.
//!
//! A [`Binder`] is attached to one open member (`Value`) of a contract with
//! `#[contract(binder = MyBinder)]`. Such members are deferred: they are
//! resolved after every other member has been assigned, so the binder can
//! read sibling values from the partially built container.
//!
//! ```
//! use vc_json::{JsonCodec, Value, derive::Contract};
//! use vc_json::binder::MemberBinder;
//! use vc_json::info::Type;
//!
//! #[derive(Contract, Default)]
//! #[contract(default)]
//! struct Circle { radius: f64 }
//!
//! #[derive(Contract, Default)]
//! #[contract(default)]
//! struct Square { side: f64 }
//!
//! #[derive(Default)]
//! struct ShapeBinder;
//!
//! impl MemberBinder for ShapeBinder {
//!     type Container = Drawing;
//!
//!     fn member_type(&self, _member: &str, drawing: &Drawing) -> Option<Type> {
//!         match drawing.kind.as_str() {
//!             "circle" => Some(Type::of::<Circle>()),
//!             "square" => Some(Type::of::<Square>()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! #[derive(Contract, Default)]
//! #[contract(default)]
//! struct Drawing {
//!     #[contract(binder = ShapeBinder)]
//!     shape: Value,
//!     kind: String,
//! }
//!
//! let drawing: Drawing = JsonCodec::new()
//!     .from_str(r#"{"Shape":{"Radius":2.5},"Kind":"circle"}"#)
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(drawing.shape.downcast_ref::<Circle>().unwrap().radius, 2.5);
//! ```

use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;

use crate::data::{Data, DataRef, Decode, Node};
use crate::de::Decoder;
use crate::error::Result;
use crate::info::Type;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Binder

/// Resolves the concrete type of a deferred member.
pub trait Binder: Send + Sync + 'static {
    /// Type to decode `member` as, given the container built so far.
    ///
    /// `None` hands the raw value to [`coerce`](Self::coerce).
    fn resolve_type(&self, member: &str, container: &dyn Any) -> Option<Type>;

    /// Replacement for a member no type was resolved for. `raw` is the open
    /// form of the input. `Ok(None)` leaves the member at its default.
    fn coerce(&self, member: &str, container: &dyn Any, raw: Value) -> Result<Option<Value>> {
        let _ = (member, container, raw);
        Ok(None)
    }
}

/// A [`Binder`] bound to one container type.
///
/// Implementing this instead of [`Binder`] saves the downcast. A container
/// of another type resolves nothing.
pub trait MemberBinder: Default + Send + Sync + 'static {
    type Container: Any;

    fn member_type(&self, member: &str, container: &Self::Container) -> Option<Type>;

    fn coerce_value(
        &self,
        member: &str,
        container: &Self::Container,
        raw: Value,
    ) -> Result<Option<Value>> {
        let _ = (member, container, raw);
        Ok(None)
    }
}

impl<B: MemberBinder> Binder for B {
    fn resolve_type(&self, member: &str, container: &dyn Any) -> Option<Type> {
        container
            .downcast_ref::<B::Container>()
            .and_then(|container| self.member_type(member, container))
    }

    fn coerce(&self, member: &str, container: &dyn Any, raw: Value) -> Result<Option<Value>> {
        match container.downcast_ref::<B::Container>() {
            Some(container) => self.coerce_value(member, container, raw),
            None => Ok(None),
        }
    }
}

// -----------------------------------------------------------------------------
// ValueAdapter

/// Error returned by a [`ValueAdapter`], reported as a conversion error.
pub type AdapterError = Box<dyn core::error::Error + Send + Sync>;

/// Custom representation of one member, `#[contract(adapter = MyAdapter)]`.
pub trait ValueAdapter<T>: Default + Send + Sync + 'static {
    fn read(&self, raw: Value) -> Result<T, AdapterError>;

    fn write(&self, value: &T) -> Result<Value, AdapterError>;
}

// -----------------------------------------------------------------------------
// Abstract members

/// Identity of the abstraction an [`Abstract`] member stands for.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AbstractTarget {
    type_id: TypeId,
    type_path: &'static str,
}

impl AbstractTarget {
    #[inline]
    pub fn of<K: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<K>(),
            type_path: type_name::<K>(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn is<K: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<K>()
    }
}

impl fmt::Debug for AbstractTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AbstractTarget").field(&self.type_path).finish()
    }
}

/// Builds instances for [`Abstract`] members.
///
/// Installed with [`JsonCodec::with_instance_builder`](crate::JsonCodec::with_instance_builder).
pub trait InstanceBuilder: Send + Sync + 'static {
    fn build(
        &self,
        target: &AbstractTarget,
        node: &Node,
        de: &mut Decoder<'_>,
    ) -> Result<Box<dyn Data>>;
}

/// A member typed by an abstraction `K`, usually a trait object type.
///
/// The concrete instance is produced by the codec's [`InstanceBuilder`].
pub struct Abstract<K: ?Sized + 'static> {
    inner: Box<dyn Data>,
    _marker: PhantomData<fn() -> Box<K>>,
}

impl<K: ?Sized + 'static> Abstract<K> {
    #[inline]
    pub fn new(inner: impl Data) -> Self {
        Self::from_box(Box::new(inner))
    }

    #[inline]
    pub fn from_box(inner: Box<dyn Data>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn get(&self) -> &dyn Data {
        &*self.inner
    }

    #[inline]
    pub fn downcast_ref<T: Data>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    #[inline]
    pub fn into_inner(self) -> Box<dyn Data> {
        self.inner
    }
}

impl<K: ?Sized + 'static> fmt::Debug for Abstract<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Abstract").field(&self.inner.type_path()).finish()
    }
}

impl<K: ?Sized + 'static> Data for Abstract<K> {
    #[inline]
    fn data_ref(&self) -> DataRef<'_> {
        DataRef::Typed(&*self.inner)
    }
}

impl<K: ?Sized + 'static> Decode for Abstract<K> {
    fn decode(node: &Node, de: &mut Decoder<'_>) -> Result<Self> {
        de.build_abstract(&AbstractTarget::of::<K>(), node)
            .map(Self::from_box)
    }
}
