//! Variance-aware subtype resolution.
//!
//! [`VarianceResolver`] answers `is A a subtype of B` for two
//! [`TypeRef`]s, using the declaration-site variance held
//! by a [`ClassRegistry`] and a host [`NominalOracle`] for everything that is
//! not a generic class use.
//!
//! # Rules
//!
//! - `Nothing` is below everything, `Any?` above everything.
//! - `Nominal` vs `Nominal` goes to the oracle.
//! - `C<..>` vs `Nominal(n)` holds when some class in `C`'s superclass chain
//!   is `n` or an oracle subtype of `n`. `Nominal` vs `C<..>` never holds.
//! - `C<..>` vs `D<..>` needs `D` in `C`'s superclass chain, then compares
//!   slot by slot under `D`'s parameters: each argument is read as the
//!   range of types it consumes and produces, and `x`'s range must sit
//!   inside `y`'s.
//!
//! No state survives a call; a resolver is a pair of borrows and can be
//! shared freely across threads when the oracle can.

mod mismatch;
mod range;

pub use mismatch::{MismatchDisplay, RangeEnd, SubtypeMismatch};
pub use range::{effective_consumed, effective_produced};

use varia_ir::Name;
use varia_stack::ensure_sufficient_stack;

use crate::registry::{ClassRegistry, TypeParam};
use crate::{NominalOracle, ParameterizedType, TypeArg, TypeRef};

use range::slot_range;

/// Subtype checker over a frozen class registry.
pub struct VarianceResolver<'a, O: ?Sized> {
    registry: &'a ClassRegistry,
    oracle: &'a O,
}

impl<'a, O: NominalOracle + ?Sized> VarianceResolver<'a, O> {
    /// Create a resolver reading `registry` and asking `oracle` about
    /// non-generic types.
    pub fn new(registry: &'a ClassRegistry, oracle: &'a O) -> Self {
        Self { registry, oracle }
    }

    /// Whether `sub` may be used where `sup` is expected.
    ///
    /// Total: malformed inputs (unknown classes, wrong argument counts)
    /// answer `false` rather than panicking.
    pub fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        self.check_subtype(sub, sup).is_ok()
    }

    /// Like [`is_subtype`](Self::is_subtype), explaining a negative answer.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn check_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> Result<(), SubtypeMismatch> {
        self.subtype(sub, sup)
    }

    /// Mutual subtyping.
    pub fn is_equivalent(&self, a: &TypeRef, b: &TypeRef) -> bool {
        self.subtype(a, b).is_ok() && self.subtype(b, a).is_ok()
    }

    /// Whether every class use in `ty` is registered, has the right number
    /// of arguments, and every argument type respects its parameter's upper
    /// bound.
    ///
    /// Construction only checks arity; this is the semantic half.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn is_well_formed(&self, ty: &TypeRef) -> bool {
        self.well_formed(ty)
    }

    fn well_formed(&self, ty: &TypeRef) -> bool {
        ensure_sufficient_stack(|| {
            let Some(p) = ty.as_parameterized() else {
                return true;
            };
            let Some(decl) = self.registry.lookup(p.class()) else {
                return false;
            };
            if decl.arity() != p.args().len() {
                return false;
            }

            p.args().iter().zip(&decl.params).all(|(arg, param)| match arg.ty() {
                Some(arg_ty) => {
                    self.well_formed(arg_ty) && self.subtype(arg_ty, &param.upper_bound).is_ok()
                }
                None => true,
            })
        })
    }

    fn subtype(&self, sub: &TypeRef, sup: &TypeRef) -> Result<(), SubtypeMismatch> {
        ensure_sufficient_stack(|| {
            if sub == sup {
                return Ok(());
            }

            match (sub, sup) {
                (_, TypeRef::Top) | (TypeRef::Bottom, _) => Ok(()),
                (TypeRef::Nominal(a), TypeRef::Nominal(b)) => {
                    if self.oracle.is_nominal_subtype(*a, *b) {
                        Ok(())
                    } else {
                        Err(not_subtype(sub, sup))
                    }
                }
                (TypeRef::Parameterized(p), TypeRef::Nominal(base)) => {
                    let base = *base;
                    let inherits = self
                        .registry
                        .ancestors(p.class())
                        .any(|name| name == base || self.oracle.is_nominal_subtype(name, base));
                    if inherits {
                        Ok(())
                    } else {
                        Err(SubtypeMismatch::UnrelatedClasses {
                            sub: p.class(),
                            sup: base,
                        })
                    }
                }
                (TypeRef::Parameterized(a), TypeRef::Parameterized(b)) => self.parameterized(a, b),
                _ => Err(not_subtype(sub, sup)),
            }
        })
    }

    /// `sub<..>` against `sup<..>`, compared under `sup`'s parameters.
    fn parameterized(
        &self,
        sub: &ParameterizedType,
        sup: &ParameterizedType,
    ) -> Result<(), SubtypeMismatch> {
        let sub_decl = self
            .registry
            .lookup(sub.class())
            .ok_or(SubtypeMismatch::UnknownClass { class: sub.class() })?;
        let sup_decl = self
            .registry
            .lookup(sup.class())
            .ok_or(SubtypeMismatch::UnknownClass { class: sup.class() })?;

        if sub.class() != sup.class()
            && !self.registry.ancestors(sub.class()).any(|n| n == sup.class())
        {
            return Err(SubtypeMismatch::UnrelatedClasses {
                sub: sub.class(),
                sup: sup.class(),
            });
        }

        for (p, decl) in [(sub, sub_decl), (sup, sup_decl)] {
            if p.args().len() != decl.arity() {
                return Err(SubtypeMismatch::ArityMismatch {
                    class: p.class(),
                    expected: decl.arity(),
                    found: p.args().len(),
                });
            }
        }

        // Ancestors share arity with their subclasses (checked at registration).
        let slots = sub
            .args()
            .iter()
            .zip(sup.args())
            .zip(sub_decl.params.iter().zip(&sup_decl.params));
        for (index, ((x, y), (sub_param, sup_param))) in slots.enumerate() {
            self.slot(sup.class(), index, x, y, sub_param, sup_param)?;
        }

        Ok(())
    }

    /// One argument slot: `x`'s range must sit inside `y`'s range.
    fn slot(
        &self,
        class: Name,
        index: usize,
        x: &TypeArg,
        y: &TypeArg,
        sub_param: &TypeParam,
        sup_param: &TypeParam,
    ) -> Result<(), SubtypeMismatch> {
        if y.is_star() {
            return Ok(());
        }

        let variance = sup_param.variance;
        let have = slot_range(x, variance, &sub_param.upper_bound);
        let want = slot_range(y, variance, &sup_param.upper_bound);

        let result = self
            .subtype(have.produces, want.produces)
            .map_err(|because| (RangeEnd::Produces, because))
            .and_then(|()| {
                self.subtype(want.consumes, have.consumes)
                    .map_err(|because| (RangeEnd::Consumes, because))
            });

        result.map_err(|(end, because)| {
            tracing::trace!(class = ?class, index, %variance, ?end, "slot mismatch");
            SubtypeMismatch::Slot {
                class,
                index,
                variance,
                end,
                because: Box::new(because),
            }
        })
    }
}

fn not_subtype(sub: &TypeRef, sup: &TypeRef) -> SubtypeMismatch {
    SubtypeMismatch::NotSubtype {
        sub: sub.clone(),
        sup: sup.clone(),
    }
}
