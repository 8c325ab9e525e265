//! Property-based tests for the subtype relation.
//!
//! Random type expressions are generated over a fixed hierarchy (covariant,
//! contravariant, invariant and two-parameter classes, classes bounded by
//! `Number`, plus small inheritance chains) and checked for the laws every
//! caller relies on:
//! reflexivity, transitivity, `Nothing`/`Any?` as bounds, star absorption,
//! and variance-directed monotonicity.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use varia_ir::StringInterner;
use varia_types::{
    make_parameterized, ClassDecl, ClassRegistry, NominalLattice, TypeArg, TypeParam, TypeRef,
    Variance, VarianceResolver,
};

// -- Universe --

/// A type parameter: variance and optional nominal upper bound.
type Param = (Variance, Option<&'static str>);

const OUT: Param = (Variance::Out, None);
const IN: Param = (Variance::In, None);
const INV: Param = (Variance::Invariant, None);

/// Generic classes: name, parameters, superclass.
const CLASSES: &[(&str, &[Param], Option<&str>)] = &[
    ("Source", &[OUT], None),
    ("Sink", &[IN], None),
    ("Cell", &[INV], None),
    ("Pair", &[IN, OUT], None),
    ("Collection", &[OUT], Some("Iterable")),
    ("List", &[OUT], Some("Collection")),
    ("MutableList", &[INV], Some("List")),
    ("Measure", &[(Variance::Invariant, Some("Number"))], None),
    ("Gauge", &[(Variance::Invariant, Some("Number"))], Some("Measure")),
    ("Reading", &[(Variance::Out, Some("Number"))], Some("Source")),
    ("Window", &[(Variance::In, Some("Number")), OUT], Some("Pair")),
];

/// Nominal types and their direct supertypes.
const NOMINALS: &[(&str, &[&str])] = &[
    ("Int", &["Number"]),
    ("Double", &["Number"]),
    ("Number", &["Any"]),
    ("String", &["Any"]),
    ("Iterable", &["Any"]),
    ("Any", &[]),
];

struct Universe {
    interner: StringInterner,
    registry: ClassRegistry,
    lattice: NominalLattice,
}

impl Universe {
    fn new() -> Self {
        let interner = StringInterner::new();

        let mut registry = ClassRegistry::new();
        for &(name, params, superclass) in CLASSES {
            let params = params
                .iter()
                .enumerate()
                .map(|(i, &(variance, bound))| {
                    let param = TypeParam::new(interner.intern(&format!("T{i}")), variance);
                    match bound {
                        Some(bound) => param.with_bound(TypeRef::nominal(interner.intern(bound))),
                        None => param,
                    }
                })
                .collect();
            let mut decl = ClassDecl::new(interner.intern(name), params);
            if let Some(superclass) = superclass {
                decl = decl.with_superclass(interner.intern(superclass));
            }
            registry.register(decl).expect("universe classes are valid");
        }

        let mut lattice = NominalLattice::new();
        for &(name, supertypes) in NOMINALS {
            for sup in supertypes {
                lattice.declare(interner.intern(name), interner.intern(sup));
            }
        }

        Self {
            interner,
            registry,
            lattice,
        }
    }

    fn resolver(&self) -> VarianceResolver<'_, NominalLattice> {
        VarianceResolver::new(&self.registry, &self.lattice)
    }

    fn build(&self, shape: &Shape) -> TypeRef {
        match shape {
            Shape::Top => TypeRef::Top,
            Shape::Bottom => TypeRef::Bottom,
            Shape::Nominal(i) => TypeRef::nominal(self.interner.intern(NOMINALS[*i].0)),
            Shape::Apply(class, args) => {
                let args = args.iter().map(|arg| self.build_arg(arg)).collect();
                make_parameterized(&self.registry, self.interner.intern(CLASSES[*class].0), args)
                    .expect("generated arity matches the declaration")
                    .into()
            }
        }
    }

    fn build_arg(&self, arg: &ArgShape) -> TypeArg {
        match arg {
            ArgShape::Concrete(shape) => TypeArg::Concrete(self.build(shape)),
            ArgShape::Out(shape) => TypeArg::Out(self.build(shape)),
            ArgShape::In(shape) => TypeArg::In(self.build(shape)),
            ArgShape::Star => TypeArg::Star,
        }
    }

    fn apply(&self, class: &str, arg: TypeArg) -> TypeRef {
        make_parameterized(&self.registry, self.interner.intern(class), vec![arg])
            .expect("single-parameter class")
            .into()
    }
}

// -- Strategies --

/// Registry-independent description of a type expression.
#[derive(Clone, Debug)]
enum Shape {
    Top,
    Bottom,
    Nominal(usize),
    Apply(usize, Vec<ArgShape>),
}

#[derive(Clone, Debug)]
enum ArgShape {
    Concrete(Shape),
    Out(Shape),
    In(Shape),
    Star,
}

fn arg_strategy(inner: BoxedStrategy<Shape>) -> impl Strategy<Value = ArgShape> {
    prop_oneof![
        3 => inner.clone().prop_map(ArgShape::Concrete),
        1 => inner.clone().prop_map(ArgShape::Out),
        1 => inner.prop_map(ArgShape::In),
        1 => Just(ArgShape::Star),
    ]
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        6 => (0..NOMINALS.len()).prop_map(Shape::Nominal),
        1 => Just(Shape::Top),
        1 => Just(Shape::Bottom),
    ];
    leaf.prop_recursive(3, 24, 2, |inner| {
        (0..CLASSES.len()).prop_flat_map(move |class| {
            let arity = CLASSES[class].1.len();
            prop::collection::vec(arg_strategy(inner.clone()), arity)
                .prop_map(move |args| Shape::Apply(class, args))
        })
    })
}

/// Uses of the `Number`-bounded classes and their superclasses, with
/// arguments drawn mostly from inside the bound.
fn bounded_strategy() -> impl Strategy<Value = Shape> {
    const HEADS: &[&str] = &["Measure", "Gauge", "Reading", "Source", "Window", "Pair"];
    let index = |name: &str| CLASSES.iter().position(|c| c.0 == name).unwrap();
    let heads: Vec<usize> = HEADS.iter().map(|name| index(name)).collect();
    let numeric = prop_oneof![
        3 => prop::sample::select(vec!["Int", "Double", "Number"])
            .prop_map(|name| Shape::Nominal(NOMINALS.iter().position(|n| n.0 == name).unwrap())),
        1 => Just(Shape::Bottom),
        1 => Just(Shape::Top),
    ];
    let arg = prop_oneof![
        2 => numeric.clone().prop_map(ArgShape::Concrete),
        1 => numeric.clone().prop_map(ArgShape::Out),
        1 => numeric.prop_map(ArgShape::In),
        1 => Just(ArgShape::Star),
    ];
    prop::sample::select(heads).prop_flat_map(move |class| {
        let arity = CLASSES[class].1.len();
        prop::collection::vec(arg.clone(), arity).prop_map(move |args| Shape::Apply(class, args))
    })
}

/// A class use with at least one argument, plus a slot index to star out.
fn applied_strategy() -> impl Strategy<Value = (Shape, usize)> {
    shape_strategy()
        .prop_filter("needs a class use", |shape| matches!(shape, Shape::Apply(..)))
        .prop_flat_map(|shape| {
            let arity = match &shape {
                Shape::Apply(_, args) => args.len(),
                _ => 1,
            };
            (Just(shape), 0..arity)
        })
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Every type is a subtype of itself and equivalent to itself.
    #[test]
    fn prop_reflexive(shape in shape_strategy()) {
        let universe = Universe::new();
        let r = universe.resolver();
        let ty = universe.build(&shape);

        prop_assert!(r.is_subtype(&ty, &ty));
        prop_assert!(r.is_equivalent(&ty, &universe.build(&shape)));
    }

    /// `Nothing` is below and `Any?` above every type.
    #[test]
    fn prop_bottom_and_top_bound_everything(shape in shape_strategy()) {
        let universe = Universe::new();
        let r = universe.resolver();
        let ty = universe.build(&shape);

        prop_assert!(r.is_subtype(&TypeRef::Bottom, &ty));
        prop_assert!(r.is_subtype(&ty, &TypeRef::Top));
    }

    /// `a <: b` and `b <: c` imply `a <: c` for well-formed types.
    #[test]
    fn prop_transitive(
        a in shape_strategy(),
        b in shape_strategy(),
        c in shape_strategy(),
    ) {
        let universe = Universe::new();
        let r = universe.resolver();
        let (a, b, c) = (universe.build(&a), universe.build(&b), universe.build(&c));
        let well_formed = [&a, &b, &c].into_iter().all(|ty| r.is_well_formed(ty));

        if well_formed && r.is_subtype(&a, &b) && r.is_subtype(&b, &c) {
            prop_assert!(r.is_subtype(&a, &c));
        }
    }

    /// Transitivity through a covariant wrapper, where chains are common.
    #[test]
    fn prop_transitive_through_projections(
        a in shape_strategy(),
        b in shape_strategy(),
        c in shape_strategy(),
    ) {
        let universe = Universe::new();
        let r = universe.resolver();
        let wrap = |shape: &Shape| universe.apply("Cell", TypeArg::Out(universe.build(shape)));
        let (a, b, c) = (
            universe.apply("Cell", TypeArg::Concrete(universe.build(&a))),
            wrap(&b),
            wrap(&c),
        );

        let well_formed = [&a, &b, &c].into_iter().all(|ty| r.is_well_formed(ty));
        if well_formed && r.is_subtype(&a, &b) && r.is_subtype(&b, &c) {
            prop_assert!(r.is_subtype(&a, &c));
        }
    }

    /// Transitivity across bounded subclasses, where `*` reads as the bound.
    #[test]
    fn prop_transitive_through_bounded_slots(
        a in bounded_strategy(),
        b in bounded_strategy(),
        c in bounded_strategy(),
    ) {
        let universe = Universe::new();
        let r = universe.resolver();
        let (a, b, c) = (universe.build(&a), universe.build(&b), universe.build(&c));
        let well_formed = [&a, &b, &c].into_iter().all(|ty| r.is_well_formed(ty));

        if well_formed && r.is_subtype(&a, &b) && r.is_subtype(&b, &c) {
            prop_assert!(r.is_subtype(&a, &c));
        }
    }

    /// Replacing any argument with `*` gives a supertype.
    #[test]
    fn prop_star_absorbs((shape, index) in applied_strategy()) {
        let universe = Universe::new();
        let r = universe.resolver();

        let mut starred = shape.clone();
        if let Shape::Apply(_, args) = &mut starred {
            args[index] = ArgShape::Star;
        }

        prop_assert!(r.is_subtype(&universe.build(&shape), &universe.build(&starred)));
    }

    /// Covariant classes preserve, contravariant classes reverse, invariant
    /// classes demand equivalence.
    #[test]
    fn prop_variance_directs_slots(a in shape_strategy(), b in shape_strategy()) {
        let universe = Universe::new();
        let r = universe.resolver();
        let (a, b) = (universe.build(&a), universe.build(&b));
        let wrap = |class: &str, ty: &TypeRef| universe.apply(class, TypeArg::Concrete(ty.clone()));

        let sub = r.is_subtype(&a, &b);
        prop_assert_eq!(r.is_subtype(&wrap("Source", &a), &wrap("Source", &b)), sub);
        prop_assert_eq!(r.is_subtype(&wrap("Sink", &b), &wrap("Sink", &a)), sub);
        prop_assert_eq!(
            r.is_subtype(&wrap("Cell", &a), &wrap("Cell", &b)),
            r.is_equivalent(&a, &b)
        );
    }

    /// `check_subtype` agrees with `is_subtype` and always explains a "no".
    #[test]
    fn prop_check_agrees(a in shape_strategy(), b in shape_strategy()) {
        let universe = Universe::new();
        let r = universe.resolver();
        let (a, b) = (universe.build(&a), universe.build(&b));

        match r.check_subtype(&a, &b) {
            Ok(()) => prop_assert!(r.is_subtype(&a, &b)),
            Err(mismatch) => {
                prop_assert!(!r.is_subtype(&a, &b));
                prop_assert!(!mismatch.display(&universe.interner).to_string().is_empty());
            }
        }
    }
}
