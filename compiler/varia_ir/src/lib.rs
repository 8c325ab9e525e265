//! Varia IR - identifiers shared across the resolver crates.
//!
//! Class names, type parameter names and nominal type names are all interned
//! into [`Name`] handles so that declarations and type expressions compare in
//! O(1) and stay `Copy`. Only display code needs the interner to turn a
//! `Name` back into text.

/// Compile-time assertion on the size of a type.
///
/// Used to prevent accidental size regressions in types that are copied
/// through every resolution step.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;

static_assert_size!(Name, 4);
