//! Resolution of member tables into JSON contracts.
//!
//! A [`TypeContract`] is a [`TypeInfo`] seen through one naming convention:
//! members carry their final JSON name, are ordered for writing, and the
//! constructor to use when reading is chosen once.
//!
//! Ordering puts immediate members first, by declared `order` then by
//! declaration. Members with a binder always come last, the materializer
//! resolves them after their siblings.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::binder::Binder;
use crate::error::{Error, Result};
use crate::info::{ConstructorInfo, MemberInfo, TypeInfo};
use crate::naming::NamingConvention;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Modules

mod cache;

pub use cache::ContractCache;

// -----------------------------------------------------------------------------
// MemberDescriptor

/// How a member gets its value when reading.
pub enum Resolution {
    /// Decoded with its declared type, before construction.
    Immediate,
    /// Resolved through a binder once the container exists.
    Deferred(Box<dyn Binder>),
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => f.write_str("Immediate"),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// A member with its resolved JSON name and flags.
#[derive(Debug)]
pub struct MemberDescriptor {
    name: String,
    info: &'static MemberInfo,
    resolution: Resolution,
}

impl MemberDescriptor {
    /// JSON name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn info(&self) -> &'static MemberInfo {
        self.info
    }

    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.info.attributes().is_ignored()
    }

    /// Required and not ignored.
    #[inline]
    pub fn is_required(&self) -> bool {
        let attributes = self.info.attributes();
        attributes.is_required() && !attributes.is_ignored()
    }

    #[inline]
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        matches!(self.resolution, Resolution::Deferred(_))
    }

    fn sort_key(&self) -> (bool, i32) {
        let order = self.info.attributes().declared_order().unwrap_or(-1);
        (self.is_deferred(), order)
    }
}

// -----------------------------------------------------------------------------
// ConstructorPlan

/// The constructor chosen for a contract, with the member feeding each
/// parameter.
#[derive(Debug)]
pub struct ConstructorPlan {
    constructor: &'static ConstructorInfo,
    members: Vec<usize>,
}

impl ConstructorPlan {
    #[inline]
    pub fn constructor(&self) -> &'static ConstructorInfo {
        self.constructor
    }

    /// Positions in [`TypeContract::members`], in parameter order.
    #[inline]
    pub fn members(&self) -> &[usize] {
        &self.members
    }
}

// -----------------------------------------------------------------------------
// TypeContract

/// The JSON shape of one type under one naming convention.
#[derive(Debug)]
pub struct TypeContract {
    info: &'static TypeInfo,
    members: Vec<MemberDescriptor>,
    plan: Option<ConstructorPlan>,
}

impl TypeContract {
    /// Resolves `info`.
    ///
    /// # Errors
    ///
    /// [`Error::Contract`] when two members share a JSON name, when a binder
    /// is declared on a member that is not an assignable `Value`, or when a
    /// constructor parameter names no member.
    pub fn resolve(info: &'static TypeInfo, naming: NamingConvention) -> Result<Self> {
        let type_path = info.type_path();
        let mut members = Vec::with_capacity(info.members().len());

        for member in info.members() {
            let attributes = member.attributes();

            let name = match attributes.renamed() {
                Some(name) => String::from(name),
                None => naming.apply(member.name()).into_owned(),
            };

            let resolution = match attributes.make_binder() {
                Some(binder) => {
                    if !member.is::<Value>() {
                        return Err(Error::contract(
                            type_path,
                            format!(
                                "member `{}` has a binder but is declared as `{}`, expected an open `Value`",
                                member.name(),
                                member.type_path(),
                            ),
                        ));
                    }
                    if member.is_readonly() {
                        return Err(Error::contract(
                            type_path,
                            format!("member `{}` has a binder but is read-only", member.name()),
                        ));
                    }
                    Resolution::Deferred(binder)
                }
                None => Resolution::Immediate,
            };

            members.push(MemberDescriptor {
                name,
                info: member,
                resolution,
            });
        }

        for (i, member) in members.iter().enumerate() {
            if member.is_ignored() {
                continue;
            }
            let duplicate = members[i + 1..]
                .iter()
                .any(|other| !other.is_ignored() && other.name == member.name);
            if duplicate {
                return Err(Error::contract(
                    type_path,
                    format!("more than one member is named `{}`", member.name),
                ));
            }
        }

        members.sort_by_key(MemberDescriptor::sort_key);

        let plan = Self::select_constructor(info, &members)?;

        log::debug!(
            "resolved contract of `{type_path}` ({naming:?}): {} members, {}",
            members.len(),
            match &plan {
                Some(plan) => format!("constructor with {} parameters", plan.constructor.arity()),
                None if info.has_default() => String::from("default constructor"),
                None => String::from("no usable constructor"),
            },
        );

        Ok(Self {
            info,
            members,
            plan,
        })
    }

    fn select_constructor(
        info: &'static TypeInfo,
        members: &[MemberDescriptor],
    ) -> Result<Option<ConstructorPlan>> {
        let mut candidates: Vec<&'static ConstructorInfo> = info.constructors().iter().collect();
        candidates.sort_by_key(|c| core::cmp::Reverse(c.arity()));

        let mut selected = None;

        for constructor in candidates {
            let mut positions = Vec::with_capacity(constructor.arity());
            let mut usable = true;

            for param in constructor.params() {
                let Some(position) = members
                    .iter()
                    .position(|m| m.info.name().eq_ignore_ascii_case(param))
                else {
                    return Err(Error::contract(
                        info.type_path(),
                        format!("constructor parameter `{param}` matches no member"),
                    ));
                };

                if positions.contains(&position) {
                    return Err(Error::contract(
                        info.type_path(),
                        format!("constructor parameter `{param}` is listed twice"),
                    ));
                }

                let member = &members[position];
                usable &= !member.is_ignored() && !member.is_deferred() && member.info.is_readonly();
                positions.push(position);
            }

            if usable && selected.is_none() {
                selected = Some(ConstructorPlan {
                    constructor,
                    members: positions,
                });
            }
        }

        Ok(selected)
    }

    #[inline]
    pub fn info(&self) -> &'static TypeInfo {
        self.info
    }

    /// Members in writing order.
    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    #[inline]
    pub fn plan(&self) -> Option<&ConstructorPlan> {
        self.plan.as_ref()
    }

    /// Position of the member a JSON key refers to.
    ///
    /// Exact names win over case-insensitive matches. Ignored members are
    /// never found.
    pub fn position(&self, key: &str) -> Option<usize> {
        let visible = || {
            self.members
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.is_ignored())
        };

        visible()
            .find(|(_, m)| m.name == key)
            .or_else(|| visible().find(|(_, m)| m.name.eq_ignore_ascii_case(key)))
            .map(|(position, _)| position)
    }

    pub fn member(&self, key: &str) -> Option<&MemberDescriptor> {
        self.position(key).map(|position| &self.members[position])
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeContract;
    use crate::binder::MemberBinder;
    use crate::info::Type;
    use crate::{Contract, Error, NamingConvention, Value, derive::Contract};

    #[derive(Contract, Default)]
    #[contract(default)]
    struct Ticket {
        #[contract(order = 2)]
        ticket_id: u32,
        #[contract(rename = "TITLE")]
        title: String,
        #[contract(binder = PayloadBinder)]
        payload: Value,
        #[contract(ignore, required)]
        cache: Vec<u8>,
        opened_by: String,
    }

    #[derive(Default)]
    struct PayloadBinder;

    impl MemberBinder for PayloadBinder {
        type Container = Ticket;

        fn member_type(&self, _: &str, _: &Ticket) -> Option<Type> {
            None
        }
    }

    #[test]
    fn names_and_order() {
        let contract =
            TypeContract::resolve(Ticket::type_info(), NamingConvention::Camel).unwrap();

        let names: Vec<_> = contract.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["TITLE", "cache", "openedBy", "ticketId", "payload"]);
        assert!(contract.members().last().unwrap().is_deferred());
        assert!(contract.plan().is_none());
    }

    #[test]
    fn lookup_prefers_exact_match() {
        let contract = TypeContract::resolve(Ticket::type_info(), NamingConvention::None).unwrap();

        assert_eq!(contract.member("TicketId").unwrap().name(), "TicketId");
        assert_eq!(contract.member("ticketid").unwrap().name(), "TicketId");
        assert_eq!(contract.member("title").unwrap().name(), "TITLE");
        assert!(contract.member("Cache").is_none());
        assert!(contract.member("Missing").is_none());
    }

    #[test]
    fn ignore_wins_over_required() {
        let contract = TypeContract::resolve(Ticket::type_info(), NamingConvention::None).unwrap();
        let cache = contract.members().iter().find(|m| m.name() == "Cache").unwrap();
        assert!(cache.is_ignored());
        assert!(!cache.is_required());
    }

    #[derive(Contract, Default)]
    #[contract(default)]
    struct Clash {
        user_name: String,
        #[contract(rename = "UserName")]
        alias: String,
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let result = TypeContract::resolve(Clash::type_info(), NamingConvention::None);
        assert!(matches!(result, Err(Error::Contract { .. })));

        // Renames bypass the convention, so camel case separates them.
        assert!(TypeContract::resolve(Clash::type_info(), NamingConvention::Camel).is_ok());
    }

    #[derive(Contract, Default)]
    #[contract(default)]
    struct ClosedBinder {
        #[contract(binder = PayloadBinder)]
        payload: String,
    }

    #[test]
    fn binder_requires_open_member() {
        let result = TypeContract::resolve(ClosedBinder::type_info(), NamingConvention::None);
        assert!(matches!(result, Err(Error::Contract { .. })));
    }

    #[derive(Contract)]
    #[contract(constructor = new(code), constructor = with_label(code, label))]
    struct Badge {
        #[contract(readonly)]
        code: u32,
        #[contract(readonly)]
        label: String,
    }

    impl Badge {
        fn new(code: u32) -> Self {
            Self::with_label(code, String::new())
        }

        fn with_label(code: u32, label: String) -> Self {
            Self { code, label }
        }
    }

    #[test]
    fn widest_constructor_is_planned() {
        let contract = TypeContract::resolve(Badge::type_info(), NamingConvention::Camel).unwrap();
        let plan = contract.plan().unwrap();

        assert_eq!(plan.constructor().params(), ["Code", "Label"]);
        let fed: Vec<_> = plan.members().iter().map(|&p| contract.members()[p].name()).collect();
        assert_eq!(fed, ["code", "label"]);
        let badge = Badge::new(1);
        assert_eq!((badge.code, badge.label.as_str()), (1, ""));
    }

    #[derive(Contract, Default)]
    #[contract(default, constructor = new(code))]
    struct Writable {
        code: u32,
    }

    impl Writable {
        fn new(code: u32) -> Self {
            Self { code }
        }
    }

    #[test]
    fn writable_parameters_fall_back_to_default() {
        let contract = TypeContract::resolve(Writable::type_info(), NamingConvention::None).unwrap();
        assert!(contract.plan().is_none());
        assert_eq!(Writable::new(4).code, 4);
    }
}
