//! Boolean combinators: the iterative fixed-point conjunction and
//! disjunction simplifiers.

pub mod and;
pub mod or;

pub use and::{and, and_append};
pub use or::{or, or_append};

/// Upper bound on fixed-point iterations. The rules strictly reduce the
/// term list on every change, so this is a backstop against rule-table
/// bugs, not an expected path.
pub(crate) const MAX_FIXPOINT_ITERATIONS: usize = 64;

/// Outcome of analysing one term against the already-kept list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Drop the term; it is redundant.
    Skip,
    /// Overwrite the last kept term with the current one.
    Replace,
    /// The whole combination collapses to `false`.
    False,
    /// The whole combination collapses to `true`.
    True,
    /// Keep the term unchanged.
    Add,
}
