//! The `expr >= 0` / `expr > 0` primitive.
//!
//! Comparisons are built only through [`greater`] and [`less`], which push
//! everything into the canonical `x - b >= 0` / `b - x >= 0` shape. For
//! discrete operands a strict bound is shifted by one so that stored
//! comparisons over integer domains are always non-strict; only floating
//! bounds keep a strict flag. [`extract`] recovers the `(x, b, direction)`
//! triple the interval rules in the boolean combinators work on.
//!
//! Bound arithmetic runs in f64 exactly as the original analysis ran it in
//! `double`: the ±1 shifts at the extremes of the 32-bit range widen into
//! wider constants (`int_or_double` re-materializes them as 64-bit), they do
//! not wrap.

use crate::arith::negation::negate;
use crate::arith::sum::sum;
use crate::context::EvalContext;
use crate::expr::Expr;
use std::sync::Arc;

/// Normalized decomposition of a comparison:
/// `less_than == false` reads `x >= b`, `less_than == true` reads `x <= b`.
#[derive(Debug, Clone, PartialEq)]
pub struct XB {
    /// The non-constant side.
    pub x: Expr,
    /// The bound.
    pub b: f64,
    /// Direction: true when the comparison bounds `x` from above.
    pub less_than: bool,
}

/// Decompose the inner expression of a [`Expr::GreaterThanZero`] node.
#[must_use]
pub fn extract(inner: &Expr) -> XB {
    extract_inner(inner)
}

pub(crate) fn extract_inner(inner: &Expr) -> XB {
    if let Expr::Sum(..) = inner {
        if let Some(d) = numeric_part(inner) {
            let v = non_numeric_part(inner);
            return match v {
                Expr::Negated(x) => XB {
                    x: (*x).clone(),
                    b: d,
                    less_than: true,
                },
                other => XB {
                    x: other,
                    b: -d,
                    less_than: false,
                },
            };
        }
    }
    match inner {
        Expr::Negated(x) => XB {
            x: (**x).clone(),
            b: 0.0,
            less_than: true,
        },
        other => XB {
            x: other.clone(),
            b: 0.0,
            less_than: false,
        },
    }
}

/// The numeric constant buried in the leftmost position of a canonical sum.
fn numeric_part(e: &Expr) -> Option<f64> {
    match e {
        Expr::Sum(l, _) => l.as_numeric().or_else(|| numeric_part(l)),
        _ => None,
    }
}

/// The canonical sum with its leftmost numeric constant removed. Only called
/// when [`numeric_part`] returned a value; the term list stays sorted, so a
/// raw rebuild preserves canonical shape.
fn non_numeric_part(e: &Expr) -> Expr {
    match e {
        Expr::Sum(l, r) => {
            if l.as_numeric().is_some() {
                (**r).clone()
            } else {
                Expr::Sum(Arc::new(non_numeric_part(l)), Arc::clone(r))
            }
        }
        _ => unreachable!("non_numeric_part on a non-sum"),
    }
}

/// Build `l >= r` (`allow_equals`) or `l > r`.
pub fn greater(ctx: &dyn EvalContext, l: Expr, r: Expr, allow_equals: bool) -> Expr {
    if l.is_unknown() || r.is_unknown() {
        return Expr::DELAYED;
    }
    if l == r {
        return Expr::Bool(allow_equals);
    }
    if let (Some(a), Some(b)) = (l.as_numeric(), r.as_numeric()) {
        return Expr::Bool(if allow_equals { a >= b } else { a > b });
    }

    let discrete_l = l.prim_type(ctx).is_some_and(|t| t.is_discrete());
    let discrete_r = r.prim_type(ctx).is_some_and(|t| t.is_discrete());

    let (inner, ae) = if let (Some(a), false, true) = (l.as_numeric(), allow_equals, discrete_l) {
        // 3 > x  ==  2 >= x
        let shifted = Expr::int_or_double(a - 1.0);
        let negated_r = negate(ctx, r);
        (sum(ctx, shifted, negated_r), true)
    } else if let (Some(b), false, true) = (r.as_numeric(), allow_equals, discrete_r) {
        // x > 3  ==  x >= 4
        let shifted = Expr::int_or_double(-(b + 1.0));
        (sum(ctx, l, shifted), true)
    } else {
        let negated_r = negate(ctx, r);
        (sum(ctx, l, negated_r), allow_equals)
    };
    finish(inner, ae)
}

/// Build `l <= r` (`allow_equals`) or `l < r`.
pub fn less(ctx: &dyn EvalContext, l: Expr, r: Expr, allow_equals: bool) -> Expr {
    if l.is_unknown() || r.is_unknown() {
        return Expr::DELAYED;
    }
    if l == r {
        return Expr::Bool(allow_equals);
    }
    if let (Some(a), Some(b)) = (l.as_numeric(), r.as_numeric()) {
        return Expr::Bool(if allow_equals { a <= b } else { a < b });
    }

    let discrete_l = l.prim_type(ctx).is_some_and(|t| t.is_discrete());
    let discrete_r = r.prim_type(ctx).is_some_and(|t| t.is_discrete());

    let (inner, ae) = if let (Some(a), false, true) = (l.as_numeric(), allow_equals, discrete_l) {
        // 3 < x  ==  x >= 4
        let shifted = Expr::int_or_double(-(a + 1.0));
        (sum(ctx, shifted, r), true)
    } else if let (Some(b), false, true) = (r.as_numeric(), allow_equals, discrete_r) {
        // x < 3  ==  x <= 2
        let shifted = Expr::int_or_double(b - 1.0);
        let negated_l = negate(ctx, l);
        (sum(ctx, negated_l, shifted), true)
    } else {
        let negated_l = negate(ctx, l);
        (sum(ctx, negated_l, r), allow_equals)
    };
    finish(inner, ae)
}

/// Constant-fold a fully numeric inner expression, otherwise wrap.
fn finish(inner: Expr, allow_equals: bool) -> Expr {
    if let Some(v) = inner.as_numeric() {
        return Expr::Bool(if allow_equals { v >= 0.0 } else { v > 0.0 });
    }
    if inner.is_unknown() {
        return Expr::DELAYED;
    }
    Expr::GreaterThanZero {
        inner: Arc::new(inner),
        allow_equals,
    }
}

/// Negate a comparison.
///
/// `NOT (x >= 0) == x < 0`; over a discrete domain the strictness flip is
/// absorbed into the bound (`NOT (x >= 3) == x <= 2`), preserving the
/// always-non-strict invariant for integer domains. Floating comparisons
/// keep their bound and toggle the strictness flag instead.
pub fn negate_gt0(ctx: &dyn EvalContext, inner: &Expr, allow_equals: bool) -> Expr {
    let discrete = inner.prim_type(ctx).is_some_and(|t| t.is_discrete());
    if discrete {
        if let Expr::Sum(l, r) = inner {
            if let Some(d) = l.as_numeric() {
                // NOT (-3 + x >= 0) == x < 3 == 2 + -x >= 0
                let shifted = Expr::int_or_double(-(d + 1.0));
                let negated_rest = negate(ctx, (**r).clone());
                return greater(
                    ctx,
                    sum(ctx, shifted, negated_rest),
                    Expr::Int(0),
                    true,
                );
            }
        }
        // re-derive through the factory so a residual strict bound is
        // normalized away (the constant folds against the shift)
        let negated = negate(ctx, inner.clone());
        return greater(ctx, negated, Expr::Int(0), !allow_equals);
    }
    let negated = negate(ctx, inner.clone());
    finish(negated, !allow_equals)
}
