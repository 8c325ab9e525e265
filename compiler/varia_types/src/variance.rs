//! Declaration-site variance of a type parameter.

use std::fmt;

/// Variance annotation on a type parameter (`out T`, `in T`, or plain `T`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Variance {
    /// `out T`: the class only produces `T`; `C<Sub>` is a `C<Super>`.
    Out,

    /// `in T`: the class only consumes `T`; `C<Super>` is a `C<Sub>`.
    In,

    /// Plain `T`: no substitution in either direction.
    #[default]
    Invariant,
}

impl Variance {
    /// Whether a parameter with this variance may be passed straight through
    /// to a superclass slot declared with `inherited` variance.
    ///
    /// `class Sub<out T> : Base<T>` needs `Base`'s slot to be `out` as well;
    /// an invariant parameter fits any slot.
    #[inline]
    pub fn can_extend(self, inherited: Variance) -> bool {
        match self {
            Variance::Invariant => true,
            Variance::Out | Variance::In => self == inherited,
        }
    }

    /// Check if this is `out`.
    #[inline]
    pub fn is_covariant(self) -> bool {
        matches!(self, Self::Out)
    }

    /// Check if this is `in`.
    #[inline]
    pub fn is_contravariant(self) -> bool {
        matches!(self, Self::In)
    }

    /// Source keyword, empty for invariant.
    pub fn keyword(self) -> &'static str {
        match self {
            Variance::Out => "out",
            Variance::In => "in",
            Variance::Invariant => "",
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Invariant => f.write_str("invariant"),
            other => f.write_str(other.keyword()),
        }
    }
}
