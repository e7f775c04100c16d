//! Declarative member tables.
//!
//! A [`TypeInfo`] lists what a type exposes to the codec: its members with
//! their accessors and declared overrides, the constructors that may build
//! it, and an optional no-argument constructor. Tables are usually generated
//! by `#[derive(Contract)]` and stored in a [`TypeInfoCell`].
//!
//! The table is raw declaration. Naming conventions, ordering and the choice
//! of constructor are applied later, when the codec resolves it into a
//! [`TypeContract`](crate::contract::TypeContract).

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::binder::{AdapterError, Binder, ValueAdapter};
use crate::data::{Data, Decode, Node};
use crate::de::Decoder;
use crate::error::Result;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Modules

mod cell;

pub use cell::{GenericTypeInfoCell, TypeInfoCell};

// -----------------------------------------------------------------------------
// Function types

/// A value moved in or out of an instance without static typing.
pub type ErasedValue = Box<dyn Any + Send>;

pub type DecodeFn = fn(&Node, &mut Decoder<'_>) -> Result<ErasedValue>;
pub type AbsentFn = fn() -> Option<ErasedValue>;
pub type GetFn = for<'a> fn(&'a dyn Any) -> Option<&'a dyn Data>;
pub type SetFn = fn(&mut dyn Any, ErasedValue) -> Result<()>;
pub type WriteFn = fn(&dyn Data) -> Result<Value, AdapterError>;
pub type InvokeFn = fn(Vec<ErasedValue>) -> Result<ErasedValue>;

fn decode_erased<T: Decode>(node: &Node, de: &mut Decoder<'_>) -> Result<ErasedValue> {
    T::decode(node, de).map(|v| Box::new(v) as ErasedValue)
}

fn absent_erased<T: Decode>() -> Option<ErasedValue> {
    T::absent().map(|v| Box::new(v) as ErasedValue)
}

fn decode_adapted<T: Data, A: ValueAdapter<T>>(
    node: &Node,
    de: &mut Decoder<'_>,
) -> Result<ErasedValue> {
    let raw = Value::from_node(node);
    let kind = raw.kind();
    A::default()
        .read(raw)
        .map(|v| Box::new(v) as ErasedValue)
        .map_err(|e| de.conversion_error(type_name::<T>(), alloc::format!("{kind} rejected: {e}")))
}

fn write_adapted<T: Data, A: ValueAdapter<T>>(value: &dyn Data) -> Result<Value, AdapterError> {
    match value.downcast_ref::<T>() {
        Some(value) => A::default().write(value),
        None => Err(alloc::format!("adapter expects `{}`", type_name::<T>()).into()),
    }
}

// -----------------------------------------------------------------------------
// Type

/// A runtime type handle, returned by binders.
#[derive(Clone, Copy)]
pub struct Type {
    type_id: TypeId,
    type_path: &'static str,
    decode: fn(&Node, &mut Decoder<'_>) -> Result<Box<dyn Data>>,
}

impl Type {
    pub fn of<T: Decode>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: type_name::<T>(),
            decode: |node, de| T::decode(node, de).map(|v| Box::new(v) as Box<dyn Data>),
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
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[inline]
    pub(crate) fn decode(&self, node: &Node, de: &mut Decoder<'_>) -> Result<Box<dyn Data>> {
        (self.decode)(node, de)
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.type_path).finish()
    }
}

// -----------------------------------------------------------------------------
// MemberAttributes

/// Declared overrides of one member.
#[derive(Clone, Copy, Default)]
pub struct MemberAttributes {
    rename: Option<&'static str>,
    ignored: bool,
    required: bool,
    order: Option<i32>,
    binder: Option<fn() -> Box<dyn Binder>>,
}

impl MemberAttributes {
    #[inline]
    pub const fn new() -> Self {
        Self {
            rename: None,
            ignored: false,
            required: false,
            order: None,
            binder: None,
        }
    }

    /// JSON name used verbatim, whatever the naming convention.
    #[inline]
    pub const fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    #[inline]
    pub const fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    #[inline]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[inline]
    pub const fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Defers the member and resolves it with a fresh `B`.
    #[inline]
    pub fn binder<B: Binder + Default>(mut self) -> Self {
        fn make<B: Binder + Default>() -> Box<dyn Binder> {
            Box::new(B::default())
        }

        self.binder = Some(make::<B>);
        self
    }

    #[inline]
    pub fn renamed(&self) -> Option<&'static str> {
        self.rename
    }

    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[inline]
    pub fn declared_order(&self) -> Option<i32> {
        self.order
    }

    #[inline]
    pub fn has_binder(&self) -> bool {
        self.binder.is_some()
    }

    #[inline]
    pub(crate) fn make_binder(&self) -> Option<Box<dyn Binder>> {
        self.binder.map(|make| make())
    }
}

impl fmt::Debug for MemberAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberAttributes")
            .field("rename", &self.rename)
            .field("ignored", &self.ignored)
            .field("required", &self.required)
            .field("order", &self.order)
            .field("binder", &self.has_binder())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

/// One member of a contract: how to read it, write it and decode it.
pub struct MemberInfo {
    name: &'static str,
    type_id: TypeId,
    type_path: &'static str,
    attributes: MemberAttributes,
    get: GetFn,
    set: Option<SetFn>,
    decode: DecodeFn,
    absent: AbsentFn,
    write: Option<WriteFn>,
}

impl MemberInfo {
    /// A read-only member of type `T` named `name`.
    pub fn new<T: Decode>(name: &'static str, get: GetFn) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_path: type_name::<T>(),
            attributes: MemberAttributes::new(),
            get,
            set: None,
            decode: decode_erased::<T>,
            absent: absent_erased::<T>,
            write: None,
        }
    }

    /// Makes the member assignable after construction.
    #[inline]
    pub fn with_setter(mut self, set: SetFn) -> Self {
        self.set = Some(set);
        self
    }

    #[inline]
    pub fn with_attributes(mut self, attributes: MemberAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// A read-only member of type `T` read and written through `A`.
    ///
    /// Adapted members have no value when absent from the input.
    pub fn adapted<T: Data, A: ValueAdapter<T>>(name: &'static str, get: GetFn) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_path: type_name::<T>(),
            attributes: MemberAttributes::new(),
            get,
            set: None,
            decode: decode_adapted::<T, A>,
            absent: || None,
            write: Some(write_adapted::<T, A>),
        }
    }

    /// Declared name, before any naming convention.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
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
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[inline]
    pub fn attributes(&self) -> &MemberAttributes {
        &self.attributes
    }

    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.set.is_none()
    }

    #[inline]
    pub fn has_adapter(&self) -> bool {
        self.write.is_some()
    }

    #[inline]
    pub fn get<'a>(&self, instance: &'a dyn Any) -> Option<&'a dyn Data> {
        (self.get)(instance)
    }

    /// Assigns `value`. Fails on read-only members and on type mismatch.
    pub fn set(&self, instance: &mut dyn Any, value: ErasedValue) -> Result<()> {
        match self.set {
            Some(set) => set(instance, value),
            None => Err(crate::Error::Unsupported(alloc::format!(
                "member `{}` is read-only",
                self.name
            ))),
        }
    }

    #[inline]
    pub(crate) fn decode(&self, node: &Node, de: &mut Decoder<'_>) -> Result<ErasedValue> {
        (self.decode)(node, de)
    }

    #[inline]
    pub(crate) fn absent(&self) -> Option<ErasedValue> {
        (self.absent)()
    }

    #[inline]
    pub(crate) fn write_adapted(&self, value: &dyn Data) -> Option<Result<Value, AdapterError>> {
        self.write.map(|write| write(value))
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("type_path", &self.type_path)
            .field("attributes", &self.attributes)
            .field("readonly", &self.is_readonly())
            .field("adapter", &self.has_adapter())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ConstructorInfo

/// A constructor taking the members named by `params`, in order.
pub struct ConstructorInfo {
    params: &'static [&'static str],
    invoke: InvokeFn,
}

impl ConstructorInfo {
    #[inline]
    pub const fn new(params: &'static [&'static str], invoke: InvokeFn) -> Self {
        Self { params, invoke }
    }

    #[inline]
    pub fn params(&self) -> &'static [&'static str] {
        self.params
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub(crate) fn invoke(&self, args: Vec<ErasedValue>) -> Result<ErasedValue> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstructorInfo").field(&self.params).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// The member table of a contract type.
pub struct TypeInfo {
    type_id: TypeId,
    type_path: &'static str,
    name: &'static str,
    members: Vec<MemberInfo>,
    constructors: Vec<ConstructorInfo>,
    default: Option<fn() -> ErasedValue>,
}

impl TypeInfo {
    /// An empty table for `T`, discriminated as `name` under `"$type"`.
    pub fn new<T: Any>(name: &'static str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: type_name::<T>(),
            name,
            members: Vec::new(),
            constructors: Vec::new(),
            default: None,
        }
    }

    #[inline]
    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    #[inline]
    pub fn with_constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Sets the no-argument constructor.
    #[inline]
    pub fn with_default(mut self, default: fn() -> ErasedValue) -> Self {
        self.default = Some(default);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Discriminator name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Looks a member up by declared name.
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }

    #[inline]
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    #[inline]
    pub(crate) fn construct_default(&self) -> Option<ErasedValue> {
        self.default.map(|make| make())
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_path", &self.type_path)
            .field("name", &self.name)
            .field("members", &self.members)
            .field("constructors", &self.constructors)
            .field("default", &self.has_default())
            .finish()
    }
}
