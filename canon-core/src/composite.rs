//! Structural carriers: arrays, combined values, property wrappers and
//! inlined method results.
//!
//! These variants participate in ordering, substitution and property
//! lookup but perform no logical simplification of their own. The one
//! invariant enforced here is that a property wrapper with nothing to add
//! never exists: construction collapses it to the bare value.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::context::EvalContext;
use crate::expr::{Applicability, Expr, MethodId, Overrides, Terms};
use crate::property::{get_property, PropertyKind, PropertyValue};

/// An array literal carrier.
#[must_use]
pub fn array(elements: Vec<Expr>) -> Expr {
    let terms: Terms = elements.into_iter().map(Arc::new).collect::<SmallVec<_>>();
    Expr::Array(terms)
}

/// The type-unifying carrier of alternative values; a single alternative is
/// the value itself.
#[must_use]
pub fn combined(elements: Vec<Expr>) -> Expr {
    if elements.len() == 1 {
        return elements.into_iter().next().expect("length checked");
    }
    let terms: Terms = elements.into_iter().map(Arc::new).collect::<SmallVec<_>>();
    Expr::Combined(terms)
}

/// Wrap `inner` with property overrides.
///
/// Only overrides that exceed what `inner` already reports are stored; if
/// none survive, the bare value is returned.
///
/// # Panics
/// If `inner` is a negation — negations stay outside wrappers.
pub fn property_wrapper(
    ctx: &dyn EvalContext,
    inner: Expr,
    overrides: &[(PropertyKind, PropertyValue)],
) -> Expr {
    assert!(
        !matches!(inner, Expr::Negated(_)),
        "internal error: negation must stay outside property wrappers"
    );
    let mut kept: Overrides = overrides
        .iter()
        .filter(|(kind, value)| *value > get_property(ctx, &inner, *kind))
        .copied()
        .collect();
    if kept.is_empty() {
        return inner;
    }
    kept.sort_unstable();
    kept.dedup_by_key(|(kind, _)| *kind);
    Expr::PropertyWrapper {
        inner: Arc::new(inner),
        overrides: kept,
    }
}

/// The result of inlining a method body. Delay in the body absorbs the
/// whole carrier.
#[must_use]
pub fn inline_result(method: MethodId, inner: Expr, applicability: Applicability) -> Expr {
    if inner.is_unknown() {
        return inner;
    }
    Expr::InlineResult {
        method,
        inner: Arc::new(inner),
        applicability,
    }
}
