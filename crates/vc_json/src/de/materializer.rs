//! Building contract instances from object nodes.
//!
//! 1. Input keys are matched to member descriptors, required members checked.
//! 2. Immediate members are decoded.
//! 3. The instance is built through the planned constructor, or the default
//!    constructor, then writable members are assigned.
//! 4. Deferred members are resolved by their binders against the instance.
//!
//! Nothing is returned unless every step succeeds.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;

use super::{Decoder, Segment, TYPE_KEY};
use crate::contract::Resolution;
use crate::data::Node;
use crate::error::Result;
use crate::info::{ErasedValue, TypeInfo};
use crate::value::Value;

pub(super) fn materialize(
    de: &mut Decoder<'_>,
    info: &'static TypeInfo,
    node: &Node,
) -> Result<ErasedValue> {
    let type_path = info.type_path();

    let Node::Object(entries) = node else {
        return Err(de.unexpected(node, type_path));
    };

    let contract = de.contract_of(info)?;
    let members = contract.members();

    let mut raw: Vec<Option<&Node>> = alloc::vec![None; members.len()];
    for (key, value) in entries {
        match contract.position(key) {
            Some(position) => raw[position] = Some(value),
            None if key == TYPE_KEY => {}
            None => log::trace!("`{type_path}` has no member for `{key}` at {}", de.path()),
        }
    }

    for (member, value) in members.iter().zip(&raw) {
        if member.is_required() && value.is_none() {
            return Err(de.materialization_error(
                type_path,
                format!("required member `{}` is missing", member.name()),
            ));
        }
    }

    // Immediate members.
    let mut values: Vec<Option<ErasedValue>> = Vec::with_capacity(members.len());
    for (member, value) in members.iter().zip(&raw) {
        let decoded = match (member.resolution(), value) {
            (Resolution::Immediate, Some(node)) => Some(de.scoped(
                Segment::Key(member.name().into()),
                |de| member.info().decode(node, de),
            )?),
            _ => None,
        };
        values.push(decoded);
    }

    // Construction.
    let mut instance = match contract.plan() {
        Some(plan) => {
            let mut args = Vec::with_capacity(plan.members().len());
            for &position in plan.members() {
                let member = &members[position];
                let arg = match values[position].take() {
                    Some(arg) => arg,
                    None => member.info().absent().ok_or_else(|| {
                        de.materialization_error(
                            type_path,
                            format!("no value for constructor parameter `{}`", member.name()),
                        )
                    })?,
                };
                args.push(arg);
            }
            plan.constructor().invoke(args)?
        }
        None => info.construct_default().ok_or_else(|| {
            de.materialization_error(
                type_path,
                "no constructor matches the members and no default is declared",
            )
        })?,
    };

    for (member, value) in members.iter().zip(values) {
        let Some(value) = value else {
            continue;
        };

        if member.info().is_readonly() {
            if member.is_required() {
                return Err(de.materialization_error(
                    type_path,
                    format!("required member `{}` is read-only and no constructor takes it", member.name()),
                ));
            }
            log::debug!("`{type_path}` drops read-only member `{}`", member.name());
            continue;
        }

        member.info().set(&mut *instance, value)?;
    }

    // Deferred members, now that siblings are in place.
    for (member, value) in members.iter().zip(&raw) {
        let Resolution::Deferred(binder) = member.resolution() else {
            continue;
        };
        let Some(node) = value.filter(|node| !node.is_null()) else {
            continue;
        };

        let declared = member.info().name();
        let resolved = de.scoped(Segment::Key(member.name().into()), |de| {
            match binder.resolve_type(declared, &*instance) {
                Some(ty) => de.decode_as(node, ty).map(|typed| Some(Value::Typed(typed))),
                None => {
                    let raw = de.decode_open(node)?;
                    binder.coerce(declared, &*instance, raw)
                }
            }
        })?;

        match resolved {
            Some(value) => member.info().set(&mut *instance, Box::new(value))?,
            None => log::trace!("`{type_path}` keeps the default of `{declared}`"),
        }
    }

    Ok(instance)
}
