//! Nominal subtyping for non-generic types.
//!
//! The resolver never decides `Int <: Number` itself; it asks a
//! [`NominalOracle`] supplied by the host type system. [`NominalLattice`] is
//! a small explicit-edge implementation for hosts without one of their own.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use varia_ir::Name;

/// Ground truth for non-generic type relationships.
///
/// Implementations must behave as a partial order: reflexive, transitive
/// and antisymmetric. The resolver's own guarantees (reflexivity and
/// transitivity of `is_subtype`) only hold if the oracle's do.
pub trait NominalOracle {
    /// Whether `sub` is a subtype of `sup`.
    fn is_nominal_subtype(&self, sub: Name, sup: Name) -> bool;
}

impl<F> NominalOracle for F
where
    F: Fn(Name, Name) -> bool,
{
    fn is_nominal_subtype(&self, sub: Name, sup: Name) -> bool {
        self(sub, sup)
    }
}

/// Nominal lattice built from declared direct-supertype edges.
///
/// `is_nominal_subtype` is the reflexive-transitive closure of the edges,
/// computed per query by a depth-first walk.
#[derive(Clone, Debug, Default)]
pub struct NominalLattice {
    supertypes: FxHashMap<Name, SmallVec<[Name; 2]>>,
}

impl NominalLattice {
    /// Create an empty lattice (only reflexive relationships).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `sub <: sup`.
    pub fn declare(&mut self, sub: Name, sup: Name) {
        let entry = self.supertypes.entry(sub).or_default();
        if !entry.contains(&sup) {
            entry.push(sup);
        }
    }

    /// Builder form of [`declare`](Self::declare).
    #[must_use]
    pub fn with(mut self, sub: Name, sup: Name) -> Self {
        self.declare(sub, sup);
        self
    }

    /// Direct supertypes declared for `name`.
    pub fn direct_supertypes(&self, name: Name) -> &[Name] {
        self.supertypes
            .get(&name)
            .map(SmallVec::as_slice)
            .unwrap_or(&[])
    }
}

impl NominalOracle for NominalLattice {
    fn is_nominal_subtype(&self, sub: Name, sup: Name) -> bool {
        if sub == sup {
            return true;
        }

        let mut seen = FxHashSet::default();
        let mut stack: SmallVec<[Name; 8]> = SmallVec::new();
        stack.push(sub);

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            for &parent in self.direct_supertypes(current) {
                if parent == sup {
                    return true;
                }
                stack.push(parent);
            }
        }

        false
    }
}
