//! Variance and subtyping for generic classes.
//!
//! Three layers, each depending only on the ones before it:
//!
//! - **Registry** ([`ClassRegistry`]): generic class declarations with their
//!   declaration-site variance, upper bounds and superclass. Built once, then
//!   frozen into a [`SharedRegistry`].
//! - **Expressions** ([`TypeRef`], [`TypeArg`]): concrete uses such as
//!   `Array<out Number>` or `Function<*, String>`, checked for arity when
//!   built through [`make_parameterized`].
//! - **Resolver** ([`VarianceResolver`]): decides `is_subtype(a, b)` from
//!   declaration-site variance, use-site projections and star-projections.
//!   Non-generic relationships (`Int <: Number`) come from a host
//!   [`NominalOracle`]; [`NominalLattice`] is a ready-made one.
//!
//! ```text
//! let mut registry = ClassRegistry::new();
//! registry.register(ClassDecl::new(source, vec![TypeParam::new(t, Variance::Out)]))?;
//! let registry = registry.freeze();
//!
//! let lattice = NominalLattice::new().with(string, any);
//! let resolver = VarianceResolver::new(&registry, &lattice);
//! assert!(resolver.is_subtype(&source_of_string, &source_of_any));
//! ```

mod expr;
mod oracle;
mod registry;
mod resolve;
mod variance;

use std::sync::Once;

pub use expr::{
    make_parameterized, make_parameterized_in, ExprContext, ExprError, ParameterizedType,
    TypeArg, TypeArgDisplay, TypeDisplay, TypeRef,
};
pub use oracle::{NominalLattice, NominalOracle};
pub use registry::{
    Ancestors, ClassDecl, ClassRegistry, DeclError, SharedRegistry, SuperclassConflict,
    TypeParam,
};
pub use resolve::{
    effective_consumed, effective_produced, MismatchDisplay, RangeEnd, SubtypeMismatch,
    VarianceResolver,
};
pub use variance::Variance;

varia_ir::static_assert_size!(Variance, 1);

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for resolver debugging.
///
/// Set `RUST_LOG=varia_types=debug` to see registrations, or
/// `RUST_LOG=varia_types=trace` to follow every subtype check and slot
/// mismatch. Does nothing when `RUST_LOG` is unset; safe to call more than
/// once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
