//! Disjunction — the De Morgan dual of the conjunction simplifier.
//!
//! Same shape: flatten, sort, pairwise-reduce to a fixed point, with the
//! roles of `true` and `false` swapped and the equality/range rules
//! mirrored (incompatible disequalities make the disjunction `true`, range
//! clauses merge to the looser bound, opposite directions that cover the
//! whole integer line fold to `true`). A conjunction clause inside a
//! disjunction is distributed over the other clauses, keeping the overall
//! form a conjunction of disjunctions.

use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::boolean::and::and;
use crate::boolean::{Action, MAX_FIXPOINT_ITERATIONS};
use crate::cmp::gt0::extract;
use crate::context::EvalContext;
use crate::expr::{Expr, Terms};

/// Disjunction of `values`.
///
/// # Panics
/// If any operand is not boolean-typed.
pub fn or(ctx: &dyn EvalContext, values: &[Expr]) -> Expr {
    or_append(ctx, &Expr::EMPTY, values)
}

/// Append `values` to an existing disjunction and re-normalize.
pub fn or_append(ctx: &dyn EvalContext, base: &Expr, values: &[Expr]) -> Expr {
    for v in values {
        assert!(
            v.is_boolean_typed(ctx),
            "internal error: non-boolean operand in disjunction: {v}"
        );
    }

    let base_empty = *base == Expr::EMPTY || base.is_false();
    if base_empty && values.len() == 1 {
        if matches!(values[0], Expr::Or(_) | Expr::And(_)) {
            return values[0].clone();
        }
    }

    let mut concat: Vec<Expr> = Vec::with_capacity(values.len() + 2);
    if !base_empty {
        flatten_into(&mut concat, base);
    }
    for v in values {
        flatten_into(&mut concat, v);
    }

    concat.retain(|v| *v != Expr::EMPTY);
    if concat.is_empty() {
        return Expr::EMPTY;
    }

    // a hard true wins even over a delayed operand
    if concat.iter().any(Expr::is_true) {
        return Expr::TRUE;
    }
    if concat.iter().any(Expr::is_unknown) {
        debug!("disjunction contains an unresolved operand, returning delayed");
        return Expr::DELAYED;
    }

    // the first embedded conjunction is pulled out and distributed once the
    // plain clauses have settled
    let mut first_and: Option<Terms> = None;

    let mut changes = true;
    let mut iterations = 0usize;
    while changes {
        changes = false;
        iterations += 1;
        if iterations > MAX_FIXPOINT_ITERATIONS {
            warn!("disjunction did not reach a fixed point, keeping current form");
            break;
        }

        concat.sort();

        if concat.iter().any(Expr::is_true) {
            debug!("returning true in disjunction, found true term");
            return Expr::TRUE;
        }
        concat.retain(|v| !matches!(v, Expr::Bool(_))); // false can go

        let mut new_concat: Vec<Expr> = Vec::with_capacity(concat.len());
        let mut prev: Option<Expr> = None;
        for value in &concat {
            let action = analyse(ctx, &mut new_concat, prev.as_ref(), value, &mut first_and);
            match action {
                Action::True => return Expr::TRUE,
                Action::False => return Expr::FALSE,
                Action::Add => new_concat.push(value.clone()),
                Action::Replace => {
                    *new_concat.last_mut().expect("replace without kept term") = value.clone();
                    changes = true;
                }
                Action::Skip => changes = true,
            }
            prev = Some(value.clone());
        }
        concat = new_concat;
    }

    if let Some(and_terms) = first_and {
        // a || (b && c)  -->  (a || b) && (a || c)
        let components: Vec<Expr> = and_terms
            .iter()
            .map(|t| {
                let mut args: Vec<Expr> = concat.clone();
                args.push((**t).clone());
                or(ctx, &args)
            })
            .collect();
        debug!("distributing conjunction over {} disjuncts", components.len());
        return and(ctx, &components);
    }

    match concat.len() {
        0 => Expr::FALSE,
        1 => concat.into_iter().next().expect("length checked"),
        _ => {
            let terms: Terms = concat.into_iter().map(Arc::new).collect::<SmallVec<_>>();
            Expr::Or(terms)
        }
    }
}

fn flatten_into(out: &mut Vec<Expr>, e: &Expr) {
    if let Expr::Or(terms) = e {
        for t in terms {
            flatten_into(out, t);
        }
    } else {
        out.push(e.clone());
    }
}

fn analyse(
    ctx: &dyn EvalContext,
    new_concat: &mut Vec<Expr>,
    prev: Option<&Expr>,
    value: &Expr,
    first_and: &mut Option<Terms>,
) -> Action {
    // A || A
    if prev == Some(value) {
        return Action::Skip;
    }

    // A || !A: adjacency guaranteed by the sort
    if let (Some(p), Some(inner)) = (prev, value.as_negated()) {
        if inner == p {
            debug!("returning true in disjunction, found direct opposite");
            return Action::True;
        }
    }

    // range pair over the same subject: union instead of intersection
    if let (
        Some(Expr::GreaterThanZero {
            inner: i1,
            allow_equals: ae1,
        }),
        Expr::GreaterThanZero { inner: i2, .. },
    ) = (prev, value)
    {
        let xb1 = extract(i1);
        let xb2 = extract(i2);
        if xb1.x == xb2.x {
            // x <= a || x >= a+1 covers the whole discrete line
            if xb1.less_than != xb2.less_than
                && covers_line(xb1.less_than, xb1.b, xb2.b)
            {
                return Action::True;
            }
            if xb1.less_than && xb2.less_than {
                // x <= b1 || x <= b2  -->  the looser (larger) bound
                if xb1.b < xb2.b {
                    return Action::Replace;
                }
                if xb1.b > xb2.b {
                    return Action::Skip;
                }
                return if *ae1 { Action::Skip } else { Action::Replace };
            }
            if !xb1.less_than && !xb2.less_than {
                // x >= b1 || x >= b2  -->  the looser (smaller) bound
                if xb1.b > xb2.b {
                    return Action::Replace;
                }
                if xb1.b < xb2.b {
                    return Action::Skip;
                }
                return if *ae1 { Action::Skip } else { Action::Replace };
            }
        }
    }

    // mirrored equality rules (all lhs constants, same subject)
    if let Some(p) = prev {
        let p_neg_eq = p.as_negated().and_then(Expr::as_equals);
        let v_neg_eq = value.as_negated().and_then(Expr::as_equals);

        // (c1 != x) || (c2 != x)  -->  true
        if let (Some((l1, r1)), Some((l2, r2))) = (p_neg_eq, v_neg_eq) {
            if r1 == r2 && l1 != l2 && l1.is_constant() && l2.is_constant() {
                return Action::True;
            }
        }
        // (c1 != x) || (c2 == x)  -->  (c1 != x)
        if let (Some((l1, r1)), Some((l2, r2))) = (p_neg_eq, value.as_equals()) {
            if r1 == r2 && l1 != l2 && l1.is_constant() && l2.is_constant() {
                return Action::Skip;
            }
        }
        // (c1 == x) || (c2 != x)  -->  (c2 != x)
        if let (Some((l1, r1)), Some((l2, r2))) = (p.as_equals(), v_neg_eq) {
            if r1 == r2 && l1 != l2 && l1.is_constant() && l2.is_constant() {
                return Action::Replace;
            }
        }
        // equality or disequality against a range over the same subject
        if let Expr::GreaterThanZero {
            inner,
            allow_equals,
        } = value
        {
            let xb = extract(inner);
            let satisfied = |y: f64| {
                if xb.less_than {
                    if *allow_equals { y <= xb.b } else { y < xb.b }
                } else if *allow_equals {
                    y >= xb.b
                } else {
                    y > xb.b
                }
            };
            // (y == x) || range: subsumed when y is inside the range
            if let Some((l1, r1)) = p.as_equals() {
                if let Some(y) = l1.as_numeric() {
                    if *r1 == xb.x && satisfied(y) && !new_concat.is_empty() {
                        return Action::Replace;
                    }
                }
            }
            // (y != x) || range: everything when y is inside, else the
            // disequality alone
            if let Some((l1, r1)) = p_neg_eq {
                if let Some(y) = l1.as_numeric() {
                    if *r1 == xb.x {
                        return if satisfied(y) { Action::True } else { Action::Skip };
                    }
                }
            }
        }
    }

    if let Expr::And(and_terms) = value {
        if and_terms.len() == 1 {
            new_concat.push((*and_terms[0]).clone());
            return Action::Skip;
        }
        if first_and.is_none() {
            *first_and = Some(and_terms.clone());
            return Action::Skip;
        }
        return Action::Add;
    }

    Action::Add
}

/// `x <= b0 || x >= b1` (either orientation) covers the whole line when the
/// bounds are adjacent integers; floating bounds must coincide exactly.
fn covers_line(first_is_less_than: bool, b0: f64, b1: f64) -> bool {
    let both_integral = b0.fract() == 0.0 && b1.fract() == 0.0;
    if both_integral {
        if first_is_less_than {
            // x <= b0 || x >= b1
            b1 - 1.0 <= b0
        } else {
            // x >= b0 || x <= b1
            b0 - 1.0 <= b1
        }
    } else {
        b0 == b1
    }
}
