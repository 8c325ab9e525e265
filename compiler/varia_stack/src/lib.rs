//! Stack growth guard for recursive type walks.
//!
//! Subtype resolution recurses once per nested type argument
//! (`Box<Box<Box<...>>>`) and once per superclass hop. Type expressions
//! built by a host checker can nest arbitrarily deep, so every recursive
//! step in the resolver goes through [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: plain call, the runtime owns the stack.

/// Remaining stack below which a new segment is allocated (64KB).
const RED_ZONE: usize = 64 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn walk(&self, ty: &TypeRef) -> bool {
///     ensure_sufficient_stack(|| match ty {
///         TypeRef::Parameterized(p) => p.args().iter().all(|arg| self.walk_arg(arg)),
///         _ => true,
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version: call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
