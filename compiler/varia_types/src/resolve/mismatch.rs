//! Structured reasons for a failed subtype check.

use std::fmt;

use varia_ir::{Name, StringLookup};

use crate::{TypeRef, Variance};

/// Why `sub` is not a subtype of `sup`.
///
/// Slot failures nest: `Box<Source<Int>>` vs `Box<Source<String>>` reports
/// the outer slot, *because* of the inner slot, *because* `Int` is not
/// `String`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubtypeMismatch {
    /// The lattice does not relate the two types.
    NotSubtype { sub: TypeRef, sup: TypeRef },

    /// `sup`'s class is not in `sub`'s superclass chain.
    UnrelatedClasses { sub: Name, sup: Name },

    /// A type expression names a class the registry does not hold.
    UnknownClass { class: Name },

    /// Argument counts disagree with the declaration being compared under.
    ArityMismatch {
        class: Name,
        expected: usize,
        found: usize,
    },

    /// One argument slot is incompatible.
    Slot {
        /// Class whose parameters the slot was compared under.
        class: Name,
        /// Zero-based slot index.
        index: usize,
        /// Declared variance of the slot.
        variance: Variance,
        /// Which end of the argument range failed.
        end: RangeEnd,
        /// The failed comparison of the range ends.
        because: Box<SubtypeMismatch>,
    },
}

/// End of an argument's produced/consumed range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RangeEnd {
    /// The produced type was too wide.
    Produces,
    /// The consumed type was too narrow.
    Consumes,
}

impl SubtypeMismatch {
    /// The innermost failure in a chain of slot failures.
    pub fn root_cause(&self) -> &SubtypeMismatch {
        let mut current = self;
        while let SubtypeMismatch::Slot { because, .. } = current {
            current = &**because;
        }
        current
    }

    /// Render with names resolved through `names`.
    pub fn display<'a>(&'a self, names: &'a dyn StringLookup) -> MismatchDisplay<'a> {
        MismatchDisplay {
            mismatch: self,
            names,
        }
    }
}

/// Displays a [`SubtypeMismatch`] as an indented "because" chain.
pub struct MismatchDisplay<'a> {
    mismatch: &'a SubtypeMismatch,
    names: &'a dyn StringLookup,
}

impl MismatchDisplay<'_> {
    fn write(
        &self,
        f: &mut fmt::Formatter<'_>,
        mismatch: &SubtypeMismatch,
        depth: usize,
    ) -> fmt::Result {
        if depth > 0 {
            writeln!(f)?;
            for _ in 0..depth {
                f.write_str("  ")?;
            }
            f.write_str("because ")?;
        }

        let names = self.names;
        match mismatch {
            SubtypeMismatch::NotSubtype { sub, sup } => write!(
                f,
                "`{}` is not a subtype of `{}`",
                sub.display(names),
                sup.display(names)
            ),
            SubtypeMismatch::UnrelatedClasses { sub, sup } => write!(
                f,
                "`{}` does not inherit from `{}`",
                names.lookup(*sub),
                names.lookup(*sup)
            ),
            SubtypeMismatch::UnknownClass { class } => {
                write!(f, "`{}` is not a registered class", names.lookup(*class))
            }
            SubtypeMismatch::ArityMismatch {
                class,
                expected,
                found,
            } => write!(
                f,
                "`{}` expects {expected} type arguments, found {found}",
                names.lookup(*class)
            ),
            SubtypeMismatch::Slot {
                class,
                index,
                variance,
                end,
                because,
            } => {
                let end = match end {
                    RangeEnd::Produces => "produces a wider type",
                    RangeEnd::Consumes => "consumes a narrower type",
                };
                write!(
                    f,
                    "type argument {index} of `{}` ({variance}) {end} than expected",
                    names.lookup(*class)
                )?;
                self.write(f, because, depth + 1)
            }
        }
    }
}

impl fmt::Display for MismatchDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, self.mismatch, 0)
    }
}
