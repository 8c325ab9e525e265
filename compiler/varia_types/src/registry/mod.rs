//! Registry of generic class declarations.
//!
//! The `ClassRegistry` is built once during setup (`register` takes
//! `&mut self`) and then frozen into a [`SharedRegistry`] that any number of
//! resolvers can read concurrently without locking.
//!
//! # Design
//!
//! - Append-only: declarations are never replaced or removed
//! - `FxHashMap` name index into a `Vec` kept in registration order
//! - All structural checks (duplicates, bounds, inheritance) happen here so
//!   that resolution never sees an ill-formed hierarchy

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use varia_ir::Name;

use crate::{TypeArg, TypeRef, Variance, VarianceResolver};

/// A type parameter of a generic class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeParam {
    /// Parameter name, unique within its class.
    pub name: Name,

    /// Declaration-site variance.
    pub variance: Variance,

    /// Upper bound (`T : Number`); `Any?` when not written.
    pub upper_bound: TypeRef,
}

/// A generic class declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDecl {
    /// The class name.
    pub name: Name,

    /// Type parameters; slot `i` of every use maps to `params[i]`.
    pub params: Vec<TypeParam>,

    /// Direct superclass.
    ///
    /// If it names a registered class the two classes are compared slot by
    /// slot; any other name is a nominal base left to the oracle.
    pub superclass: Option<Name>,
}

/// Why a class cannot extend its generic superclass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuperclassConflict {
    /// Parameter counts differ.
    Arity { expected: usize, found: usize },

    /// A variant parameter sits in a slot with different variance.
    Variance {
        index: usize,
        declared: Variance,
        inherited: Variance,
    },

    /// A parameter's upper bound is not within the bound of the slot it
    /// fills.
    Bound {
        index: usize,
        declared: TypeRef,
        inherited: TypeRef,
    },
}

impl fmt::Display for SuperclassConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuperclassConflict::Arity { expected, found } => write!(
                f,
                "superclass declares {expected} type parameters, subclass declares {found}"
            ),
            SuperclassConflict::Variance {
                index,
                declared,
                inherited,
            } => write!(
                f,
                "type parameter {index} is declared {declared} but the superclass slot is {inherited}"
            ),
            SuperclassConflict::Bound { index, .. } => write!(
                f,
                "upper bound of type parameter {index} is wider than the superclass slot allows"
            ),
        }
    }
}

/// Error registering a class.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeclError {
    /// A class with this name is already registered.
    #[error("class {class:?} is already registered")]
    DuplicateClass { class: Name },

    /// An upper bound references a class this registry does not know, or
    /// uses a registered class without its type arguments.
    #[error("upper bound of {param:?} in {class:?} references {referenced:?}, which is not a fully applied registered class")]
    InvalidBound {
        class: Name,
        param: Name,
        referenced: Name,
    },

    /// Registering the class would close an inheritance cycle.
    #[error("class {class:?} cannot inherit from {superclass:?}: inheritance cycle")]
    CyclicInheritance { class: Name, superclass: Name },

    /// A class and its registered superclass disagree on parameters.
    #[error("class {class:?} cannot extend {superclass:?}: {conflict}")]
    SuperclassMismatch {
        class: Name,
        superclass: Name,
        conflict: SuperclassConflict,
    },

    /// Two parameters of one class share a name.
    #[error("type parameter {param:?} is declared twice in {class:?}")]
    DuplicateParam { class: Name, param: Name },
}

impl TypeParam {
    /// Create a parameter bounded by `Any?`.
    pub fn new(name: Name, variance: Variance) -> Self {
        Self {
            name,
            variance,
            upper_bound: TypeRef::Top,
        }
    }

    /// Set the upper bound.
    #[must_use]
    pub fn with_bound(mut self, upper_bound: TypeRef) -> Self {
        self.upper_bound = upper_bound;
        self
    }
}

impl ClassDecl {
    /// Create a class declaration without a superclass.
    pub fn new(name: Name, params: Vec<TypeParam>) -> Self {
        Self {
            name,
            params,
            superclass: None,
        }
    }

    /// Set the direct superclass.
    #[must_use]
    pub fn with_superclass(mut self, superclass: Name) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Number of type parameters.
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameter declared for slot `index`.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&TypeParam> {
        self.params.get(index)
    }
}

/// Append-only table of generic class declarations.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    /// Declarations in registration order.
    classes: Vec<ClassDecl>,

    /// Name -> position in `classes`.
    by_name: FxHashMap<Name, usize>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class declaration.
    ///
    /// Checks run in order: duplicate class, duplicate parameter, upper
    /// bounds, then inheritance (cycles and superclass compatibility in both
    /// directions).
    pub fn register(&mut self, decl: ClassDecl) -> Result<(), DeclError> {
        if self.by_name.contains_key(&decl.name) {
            return Err(DeclError::DuplicateClass { class: decl.name });
        }

        for (i, param) in decl.params.iter().enumerate() {
            if decl.params[..i].iter().any(|p| p.name == param.name) {
                return Err(DeclError::DuplicateParam {
                    class: decl.name,
                    param: param.name,
                });
            }
        }

        for param in &decl.params {
            if let Some(referenced) = self.first_unknown_class(&param.upper_bound) {
                return Err(DeclError::InvalidBound {
                    class: decl.name,
                    param: param.name,
                    referenced,
                });
            }
        }

        self.check_inheritance(&decl)?;

        tracing::debug!(
            class = ?decl.name,
            arity = decl.arity(),
            superclass = ?decl.superclass,
            "registered class"
        );

        self.by_name.insert(decl.name, self.classes.len());
        self.classes.push(decl);
        Ok(())
    }

    /// Inheritance checks against classes already in the table.
    ///
    /// A superclass name may be registered after the classes that extend it
    /// (until then it is a nominal base), so both directions are checked.
    fn check_inheritance(&self, decl: &ClassDecl) -> Result<(), DeclError> {
        if let Some(superclass) = decl.superclass {
            if superclass == decl.name || self.ancestors(superclass).any(|n| n == decl.name) {
                return Err(DeclError::CyclicInheritance {
                    class: decl.name,
                    superclass,
                });
            }

            if let Some(sup) = self.lookup(superclass) {
                self.check_extends(decl, sup).map_err(|conflict| DeclError::SuperclassMismatch {
                    class: decl.name,
                    superclass,
                    conflict,
                })?;
            }
        }

        for sub in self
            .classes
            .iter()
            .filter(|c| c.superclass == Some(decl.name))
        {
            self.check_extends(sub, decl).map_err(|conflict| DeclError::SuperclassMismatch {
                class: sub.name,
                superclass: decl.name,
                conflict,
            })?;
        }

        Ok(())
    }

    /// Parameter-wise compatibility of `sub` with a registered superclass.
    ///
    /// Each bound must sit within the inherited one so that a `sub` argument
    /// respecting `sub`'s bounds also respects every ancestor's.
    fn check_extends(&self, sub: &ClassDecl, sup: &ClassDecl) -> Result<(), SuperclassConflict> {
        if sub.arity() != sup.arity() {
            return Err(SuperclassConflict::Arity {
                expected: sup.arity(),
                found: sub.arity(),
            });
        }

        for (index, (declared, inherited)) in sub.params.iter().zip(&sup.params).enumerate() {
            if !declared.variance.can_extend(inherited.variance) {
                return Err(SuperclassConflict::Variance {
                    index,
                    declared: declared.variance,
                    inherited: inherited.variance,
                });
            }
            if !self.bound_within(&declared.upper_bound, &inherited.upper_bound) {
                return Err(SuperclassConflict::Bound {
                    index,
                    declared: declared.upper_bound.clone(),
                    inherited: inherited.upper_bound.clone(),
                });
            }
        }

        Ok(())
    }

    /// Whether `bound <: inherited` holds for every host lattice.
    ///
    /// No oracle is available at registration, so nominal names only relate
    /// to themselves: `T : Int` cannot narrow `T : Number` here.
    fn bound_within(&self, bound: &TypeRef, inherited: &TypeRef) -> bool {
        if inherited.is_top() || bound.is_bottom() || bound == inherited {
            return true;
        }
        let same_name = |sub: Name, sup: Name| sub == sup;
        VarianceResolver::new(self, &same_name).is_subtype(bound, inherited)
    }

    /// First class referenced by `ty` that is not usable in a bound.
    fn first_unknown_class(&self, ty: &TypeRef) -> Option<Name> {
        match ty {
            TypeRef::Top | TypeRef::Bottom => None,
            // A registered generic class needs its arguments.
            TypeRef::Nominal(name) => self.by_name.contains_key(name).then_some(*name),
            TypeRef::Parameterized(p) => match self.lookup(p.class()) {
                Some(decl) if decl.arity() == p.args().len() => p
                    .args()
                    .iter()
                    .filter_map(TypeArg::ty)
                    .find_map(|arg| self.first_unknown_class(arg)),
                _ => Some(p.class()),
            },
        }
    }

    // === Lookup ===

    /// Look up a class by name.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<&ClassDecl> {
        self.by_name.get(&name).map(|&i| &self.classes[i])
    }

    /// Check if a class is registered.
    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Walk `name` and its superclass chain.
    ///
    /// Yields `name` first, then each superclass. The chain ends after the
    /// first name that is not a registered class (a nominal base, or `name`
    /// itself when unregistered).
    pub fn ancestors(&self, name: Name) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: Some(name),
        }
    }

    /// Iterate over classes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.iter()
    }

    /// Number of registered classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// End the build phase.
    pub fn freeze(self) -> SharedRegistry {
        tracing::debug!(classes = self.len(), "registry frozen");
        SharedRegistry(Arc::new(self))
    }
}

/// Iterator over a class and its superclasses, see [`ClassRegistry::ancestors`].
pub struct Ancestors<'r> {
    registry: &'r ClassRegistry,
    next: Option<Name>,
}

impl Iterator for Ancestors<'_> {
    type Item = Name;

    fn next(&mut self) -> Option<Name> {
        let current = self.next?;
        self.next = self
            .registry
            .lookup(current)
            .and_then(|decl| decl.superclass);
        Some(current)
    }
}

/// Frozen registry, cheap to clone and safe to share across threads.
#[derive(Clone, Debug)]
pub struct SharedRegistry(Arc<ClassRegistry>);

impl std::ops::Deref for SharedRegistry {
    type Target = ClassRegistry;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
