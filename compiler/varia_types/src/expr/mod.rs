//! Type expressions: concrete uses of registered generic classes.
//!
//! A [`TypeRef`] is what a host checker hands the resolver for each side of
//! an assignability question. Generic uses are [`ParameterizedType`]s, which
//! can only be built through [`make_parameterized`] so that every value
//! carries exactly one argument per declared type parameter.
//!
//! # Design
//!
//! - Construction checks arity only. Whether a concrete argument respects
//!   its parameter's upper bound is a semantic question answered by
//!   [`VarianceResolver::is_well_formed`](crate::VarianceResolver::is_well_formed).
//! - Values own their children (`Vec<TypeArg>`, `TypeRef` inside each
//!   argument); there is no sharing and no cycles.

mod format;

pub use format::{TypeArgDisplay, TypeDisplay};

use std::fmt;

use varia_ir::Name;

use crate::registry::ClassRegistry;
use crate::Variance;

/// A type as seen by the resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeRef {
    /// `Any?`, the supertype of every type and the default upper bound.
    Top,

    /// `Nothing`, the subtype of every type.
    Bottom,

    /// A non-generic nominal type such as `Int` or `String`.
    ///
    /// Relationships between nominal types come from the host's
    /// [`NominalOracle`](crate::NominalOracle).
    Nominal(Name),

    /// A use of a registered generic class, e.g. `Source<out Number>`.
    Parameterized(ParameterizedType),
}

/// A generic class applied to one argument per type parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ParameterizedType {
    class: Name,
    args: Vec<TypeArg>,
}

/// The argument occupying one parameter slot of a [`ParameterizedType`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeArg {
    /// An exact type: `Array<Int>`.
    Concrete(TypeRef),

    /// Use-site producer projection: `Array<out Int>`.
    Out(TypeRef),

    /// Use-site consumer projection: `Array<in Int>`.
    In(TypeRef),

    /// Star-projection: `Array<*>`.
    Star,
}

/// Where a type expression appears, which decides whether star and
/// use-site projections are legal in its top-level arguments.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExprContext {
    /// Declarations, parameters, variables, bounds. Everything is legal.
    #[default]
    TypeUse,

    /// A constructor call such as `Box<Int>(1)`; the arguments must be
    /// concrete because an instance needs a real type.
    Instantiation,
}

impl fmt::Display for ExprContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprContext::TypeUse => f.write_str("type use"),
            ExprContext::Instantiation => f.write_str("instantiation"),
        }
    }
}

/// Error building a type expression.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// The class is not in the registry.
    #[error("unknown generic class {class:?}")]
    UnknownClass { class: Name },

    /// Argument count differs from the declared parameter count.
    #[error("wrong number of type arguments for {class:?}: expected {expected}, found {found}")]
    ArityMismatch {
        class: Name,
        expected: usize,
        found: usize,
    },

    /// `*` used where the context needs a real type.
    #[error("star-projection is not allowed in {context} position (argument {index} of {class:?})")]
    StarNotAllowedHere {
        class: Name,
        index: usize,
        context: ExprContext,
    },

    /// `out T` / `in T` used where the context needs a real type.
    #[error("projection is not allowed in {context} position (argument {index} of {class:?})")]
    ProjectionNotAllowedHere {
        class: Name,
        index: usize,
        context: ExprContext,
    },
}

/// Build `class<args>` for use in an ordinary type position.
pub fn make_parameterized(
    registry: &ClassRegistry,
    class: Name,
    args: Vec<TypeArg>,
) -> Result<ParameterizedType, ExprError> {
    make_parameterized_in(registry, class, args, ExprContext::TypeUse)
}

/// Build `class<args>` for the given context.
pub fn make_parameterized_in(
    registry: &ClassRegistry,
    class: Name,
    args: Vec<TypeArg>,
    context: ExprContext,
) -> Result<ParameterizedType, ExprError> {
    let decl = registry
        .lookup(class)
        .ok_or(ExprError::UnknownClass { class })?;

    if args.len() != decl.arity() {
        return Err(ExprError::ArityMismatch {
            class,
            expected: decl.arity(),
            found: args.len(),
        });
    }

    if context == ExprContext::Instantiation {
        for (index, arg) in args.iter().enumerate() {
            match arg {
                TypeArg::Concrete(_) => {}
                TypeArg::Star => {
                    return Err(ExprError::StarNotAllowedHere {
                        class,
                        index,
                        context,
                    })
                }
                TypeArg::Out(_) | TypeArg::In(_) => {
                    return Err(ExprError::ProjectionNotAllowedHere {
                        class,
                        index,
                        context,
                    })
                }
            }
        }
    }

    Ok(ParameterizedType { class, args })
}

impl ParameterizedType {
    /// The generic class being applied.
    #[inline]
    pub fn class(&self) -> Name {
        self.class
    }

    /// Arguments in parameter order.
    #[inline]
    pub fn args(&self) -> &[TypeArg] {
        &self.args
    }
}

impl TypeRef {
    /// Create a nominal type.
    #[inline]
    pub fn nominal(name: Name) -> Self {
        TypeRef::Nominal(name)
    }

    /// Get the parameterized form, if any.
    #[inline]
    pub fn as_parameterized(&self) -> Option<&ParameterizedType> {
        match self {
            TypeRef::Parameterized(p) => Some(p),
            _ => None,
        }
    }

    /// Head name: the class of a parameterized type or the nominal name.
    pub fn head(&self) -> Option<Name> {
        match self {
            TypeRef::Nominal(name) => Some(*name),
            TypeRef::Parameterized(p) => Some(p.class),
            TypeRef::Top | TypeRef::Bottom => None,
        }
    }

    /// Check if this is `Any?`.
    #[inline]
    pub fn is_top(&self) -> bool {
        matches!(self, Self::Top)
    }

    /// Check if this is `Nothing`.
    #[inline]
    pub fn is_bottom(&self) -> bool {
        matches!(self, Self::Bottom)
    }
}

impl From<ParameterizedType> for TypeRef {
    fn from(p: ParameterizedType) -> Self {
        TypeRef::Parameterized(p)
    }
}

impl TypeArg {
    /// The contained type, `None` for `*`.
    pub fn ty(&self) -> Option<&TypeRef> {
        match self {
            TypeArg::Concrete(ty) | TypeArg::Out(ty) | TypeArg::In(ty) => Some(ty),
            TypeArg::Star => None,
        }
    }

    /// Use-site projection carried by this argument.
    ///
    /// `Concrete` reports `Invariant`, `*` reports `None`.
    pub fn projection(&self) -> Option<Variance> {
        match self {
            TypeArg::Concrete(_) => Some(Variance::Invariant),
            TypeArg::Out(_) => Some(Variance::Out),
            TypeArg::In(_) => Some(Variance::In),
            TypeArg::Star => None,
        }
    }

    /// Check if this is `*`.
    #[inline]
    pub fn is_star(&self) -> bool {
        matches!(self, Self::Star)
    }
}
