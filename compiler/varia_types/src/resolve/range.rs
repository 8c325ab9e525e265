//! Effective produced/consumed types of a type argument.
//!
//! Every argument in a slot admits a range of actual types: the types it
//! may *consume* (lower end) up to the types it may *produce* (upper end).
//!
//! | argument    | consumes  | produces      |
//! |-------------|-----------|---------------|
//! | `T`         | `T`       | `T`           |
//! | `out T`     | `Nothing` | `T`           |
//! | `in T`      | `T`       | upper bound   |
//! | `*`         | `Nothing` | upper bound   |
//!
//! The `*` row is the star-projection rule: `*` reads as `out Bound` and as
//! `in Nothing` at the same time.
//!
//! Declaration-site variance then hides one end: an `out` parameter only
//! ever produces, so its consumed end is pinned to `Nothing`; an `in`
//! parameter only consumes, so its produced end is pinned to `Any?`. A use
//! `C<x>` is a subtype of `C<y>` in that slot iff `x`'s range sits inside
//! `y`'s range.

use crate::{TypeArg, TypeRef, Variance};

static TOP: TypeRef = TypeRef::Top;
static BOTTOM: TypeRef = TypeRef::Bottom;

/// The admissible range of one argument under a declared variance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct SlotRange<'t> {
    /// Lower end: what the slot is guaranteed to accept.
    pub consumes: &'t TypeRef,
    /// Upper end: what the slot may hand out.
    pub produces: &'t TypeRef,
}

/// The most specific type `arg` is guaranteed to produce.
///
/// `bound` is the upper bound of the parameter `arg` was written for.
pub fn effective_produced<'t>(arg: &'t TypeArg, bound: &'t TypeRef) -> &'t TypeRef {
    match arg {
        TypeArg::Concrete(ty) | TypeArg::Out(ty) => ty,
        TypeArg::In(_) | TypeArg::Star => bound,
    }
}

/// The most general type `arg` is guaranteed to consume.
pub fn effective_consumed(arg: &TypeArg) -> &TypeRef {
    match arg {
        TypeArg::Concrete(ty) | TypeArg::In(ty) => ty,
        TypeArg::Out(_) | TypeArg::Star => &BOTTOM,
    }
}

/// Range of `arg` in a slot declared with `variance`.
pub(crate) fn slot_range<'t>(
    arg: &'t TypeArg,
    variance: Variance,
    bound: &'t TypeRef,
) -> SlotRange<'t> {
    let consumes = if variance.is_covariant() {
        &BOTTOM
    } else {
        effective_consumed(arg)
    };
    let produces = if variance.is_contravariant() {
        &TOP
    } else {
        effective_produced(arg, bound)
    };
    SlotRange { consumes, produces }
}
