//! Source-style rendering of type expressions for logs and mismatch messages.

use std::fmt;

use varia_ir::StringLookup;

use super::{TypeArg, TypeRef};

/// Displays a [`TypeRef`] as `Foo<out Int, *>`.
pub struct TypeDisplay<'a> {
    ty: &'a TypeRef,
    names: &'a dyn StringLookup,
}

/// Displays a single [`TypeArg`] as `out Int`, `in Int`, `Int` or `*`.
pub struct TypeArgDisplay<'a> {
    arg: &'a TypeArg,
    names: &'a dyn StringLookup,
}

impl TypeRef {
    /// Render with names resolved through `names`.
    pub fn display<'a>(&'a self, names: &'a dyn StringLookup) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, names }
    }
}

impl TypeArg {
    /// Render with names resolved through `names`.
    pub fn display<'a>(&'a self, names: &'a dyn StringLookup) -> TypeArgDisplay<'a> {
        TypeArgDisplay { arg: self, names }
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            TypeRef::Top => f.write_str("Any?"),
            TypeRef::Bottom => f.write_str("Nothing"),
            TypeRef::Nominal(name) => f.write_str(self.names.lookup(*name)),
            TypeRef::Parameterized(p) => {
                f.write_str(self.names.lookup(p.class()))?;
                f.write_str("<")?;
                for (i, arg) in p.args().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg.display(self.names))?;
                }
                f.write_str(">")
            }
        }
    }
}

impl fmt::Display for TypeArgDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arg {
            TypeArg::Concrete(ty) => write!(f, "{}", ty.display(self.names)),
            TypeArg::Out(ty) => write!(f, "out {}", ty.display(self.names)),
            TypeArg::In(ty) => write!(f, "in {}", ty.display(self.names)),
            TypeArg::Star => f.write_str("*"),
        }
    }
}
