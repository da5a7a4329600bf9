//! Conjunction, kept in a CNF-like canonical form.
//!
//! `and`/`and_append` flatten nested conjunctions, sort the terms by the
//! canonical order and run pairwise reduction rules to a fixed point. The
//! sort guarantees that a term and its negation are adjacent, that equality
//! clauses precede range clauses over the same variable, and that two range
//! clauses over the same variable are adjacent — the rule table relies on
//! this adjacency throughout.

use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::arith::negation::negate;
use crate::arith::sum::sum;
use crate::boolean::or::or;
use crate::boolean::{Action, MAX_FIXPOINT_ITERATIONS};
use crate::cmp::equals::equals;
use crate::cmp::gt0::extract;
use crate::context::EvalContext;
use crate::expr::{Expr, Terms};

/// Conjunction of `values`.
///
/// # Panics
/// If any operand is not boolean-typed; that is a caller bug, not a data
/// condition.
pub fn and(ctx: &dyn EvalContext, values: &[Expr]) -> Expr {
    and_append(ctx, &Expr::EMPTY, values)
}

/// Append `values` to an existing conjunction (or to the no-constraint
/// placeholder) and re-normalize.
pub fn and_append(ctx: &dyn EvalContext, base: &Expr, values: &[Expr]) -> Expr {
    for v in values {
        assert!(
            v.is_boolean_typed(ctx),
            "internal error: non-boolean operand in conjunction: {v}"
        );
    }

    let base_empty = *base == Expr::EMPTY || base.is_true();
    if base_empty && values.len() == 1 {
        if let Expr::And(_) = &values[0] {
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

    // EMPTY placeholders come in from state and preconditions
    concat.retain(|v| *v != Expr::EMPTY);
    if concat.is_empty() {
        return Expr::EMPTY;
    }

    // a hard false wins even over a delayed operand
    if concat.iter().any(Expr::is_false) {
        return Expr::FALSE;
    }
    if concat.iter().any(Expr::is_unknown) {
        debug!("conjunction contains an unresolved operand, returning delayed");
        return Expr::DELAYED;
    }

    let mut changes = true;
    let mut iterations = 0usize;
    while changes {
        changes = false;
        iterations += 1;
        if iterations > MAX_FIXPOINT_ITERATIONS {
            warn!("conjunction did not reach a fixed point, keeping current form");
            break;
        }

        concat.sort();

        if concat.iter().any(Expr::is_false) {
            debug!("returning false in conjunction, found false term");
            return Expr::FALSE;
        }
        concat.retain(|v| !matches!(v, Expr::Bool(_))); // true can go

        let mut new_concat: Vec<Expr> = Vec::with_capacity(concat.len());
        let mut prev: Option<Expr> = None;
        for value in &concat {
            let action = analyse(ctx, &mut new_concat, prev.as_ref(), value);
            match action {
                Action::False => return Expr::FALSE,
                Action::True => return Expr::TRUE,
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

    match concat.len() {
        0 => Expr::TRUE,
        1 => concat.into_iter().next().expect("length checked"),
        _ => {
            let terms: Terms = concat.into_iter().map(Arc::new).collect::<SmallVec<_>>();
            Expr::And(terms)
        }
    }
}

fn flatten_into(out: &mut Vec<Expr>, e: &Expr) {
    if let Expr::And(terms) = e {
        for t in terms {
            flatten_into(out, t);
        }
    } else {
        out.push(e.clone());
    }
}

#[allow(clippy::too_many_lines)]
fn analyse(
    ctx: &dyn EvalContext,
    new_concat: &mut Vec<Expr>,
    prev: Option<&Expr>,
    value: &Expr,
) -> Action {
    // A && A
    if prev == Some(value) {
        return Action::Skip;
    }

    // A && !A: adjacency guaranteed by the sort
    if let (Some(p), Some(inner)) = (prev, value.as_negated()) {
        if inner == p {
            debug!("returning false in conjunction, found direct opposite");
            return Action::False;
        }
    }

    // A && (A ? t : f)  -->  A && t
    if let Expr::Conditional {
        condition,
        if_true,
        if_false,
    } = value
    {
        if let Some(p) = prev {
            if &**condition == p {
                new_concat.push((**if_true).clone());
                return Action::Skip;
            }
            if **condition == negate(ctx, p.clone()) {
                new_concat.push((**if_false).clone());
                return Action::Skip;
            }
        }
    }
    // (A ? t : f) && !A  -->  f && !A
    if let Some(Expr::Conditional {
        condition,
        if_false,
        ..
    }) = prev
    {
        if !new_concat.is_empty() && **condition == negate(ctx, value.clone()) {
            *new_concat.last_mut().expect("checked non-empty") = (**if_false).clone();
            return Action::Add;
        }
    }

    if let Expr::Or(or_terms) = value {
        // A && (!A || ...): drop every disjunct whose negation is already a
        // kept clause; emptying the disjunction is the distributed form of
        // A && !A
        let mut remaining: Vec<Expr> = or_terms.iter().map(|t| (**t).clone()).collect();
        let before = remaining.len();
        remaining.retain(|d| {
            let negated = negate(ctx, d.clone());
            !new_concat.iter().any(|kept| *kept == negated)
        });
        if remaining.len() < before {
            if remaining.is_empty() {
                debug!("returning false in conjunction, disjunction emptied out");
                return Action::False;
            }
            let shrunk = or(ctx, &remaining);
            new_concat.push(shrunk);
            return Action::Skip;
        }

        // A && (A || x)  -->  A
        if or_terms
            .iter()
            .any(|d| new_concat.iter().any(|kept| kept == &**d))
        {
            return Action::Skip;
        }

        // (A || B) && (A || !B)  -->  A
        if let Some(Expr::Or(prev_terms)) = prev {
            let mut shared: Vec<Expr> = Vec::new();
            let mut all_matched = true;
            for d in or_terms {
                if prev_terms.contains(d) {
                    shared.push((**d).clone());
                } else {
                    let negated = negate(ctx, (**d).clone());
                    if !prev_terms.iter().any(|p| **p == negated) {
                        all_matched = false;
                        break;
                    }
                }
            }
            if all_matched && !shared.is_empty() && !new_concat.is_empty() {
                let factored = or(ctx, &shared);
                *new_concat.last_mut().expect("checked non-empty") = factored;
                return Action::Skip;
            }
        }

        // single-clause disjunction unwraps
        if or_terms.len() == 1 {
            new_concat.push((*or_terms[0]).clone());
            return Action::Skip;
        }
        return Action::Add;
    }

    // !(c1 == x) && (c2 == x)  -->  (c2 == x)
    if let Some(p) = prev {
        if let Some(p_inner) = p.as_negated() {
            if let (Some((l1, r1)), Some((l2, r2))) = (p_inner.as_equals(), value.as_equals()) {
                if r1 == r2 && l1 != l2 && l1.is_constant() && l2.is_constant() {
                    new_concat.pop();
                    return Action::Add;
                }
            }
        }
    }

    if let Some(p) = prev {
        if let Some((l1, r1)) = p.as_equals() {
            // (c1 == x) && (c2 == x)  -->  false
            if let Some((l2, r2)) = value.as_equals() {
                if r1 == r2 && l1 != l2 && l1.is_constant() && l2.is_constant() {
                    return Action::False;
                }
            }
            // (c1 == x) && !(c2 == x)  -->  (c1 == x)
            if let Some(v_inner) = value.as_negated() {
                if let Some((l2, r2)) = v_inner.as_equals() {
                    if r1 == r2 && l1 != l2 && l1.is_constant() && l2.is_constant() {
                        return Action::Skip;
                    }
                }
            }
            // (y == x) && (x . b): the known value either satisfies the
            // range (drop the range) or contradicts it. Ranges always sort
            // after equalities over the same variable.
            if let Expr::GreaterThanZero {
                inner,
                allow_equals,
            } = value
            {
                if let Some(y) = l1.as_numeric() {
                    let xb = extract(inner);
                    if *r1 == xb.x {
                        let satisfied = if xb.less_than {
                            if *allow_equals { y <= xb.b } else { y < xb.b }
                        } else if *allow_equals {
                            y >= xb.b
                        } else {
                            y > xb.b
                        };
                        return if satisfied { Action::Skip } else { Action::False };
                    }
                }
            }
            return Action::Add;
        }
    }

    // !(y == x) && (x >= b): when the excluded value lies outside the range
    // the disequality is redundant; when it sits exactly on an inclusive
    // bound, fold both into a range tightened by one.
    if let Expr::GreaterThanZero {
        inner,
        allow_equals,
    } = value
    {
        if let Some(p) = prev {
            if let Some(p_inner) = p.as_negated() {
                if let Some((l1, r1)) = p_inner.as_equals() {
                    if let Some(y) = l1.as_numeric() {
                        let xb = extract(inner);
                        if *r1 == xb.x {
                            if (*allow_equals && y < xb.b) || (!*allow_equals && y <= xb.b) {
                                return Action::Replace;
                            }
                            if y == xb.b && *allow_equals && !new_concat.is_empty() {
                                new_concat.pop();
                                let discrete = inner
                                    .prim_type(ctx)
                                    .is_some_and(|t| t.is_discrete());
                                let tightened = if discrete {
                                    let shifted = sum(ctx, (**inner).clone(), Expr::Int(-1));
                                    Expr::GreaterThanZero {
                                        inner: Arc::new(shifted),
                                        allow_equals: true,
                                    }
                                } else {
                                    Expr::GreaterThanZero {
                                        inner: Arc::clone(inner),
                                        allow_equals: false,
                                    }
                                };
                                new_concat.push(tightened);
                                return Action::Skip;
                            }
                        }
                    }
                }
            }
        }
    }

    // two ranges: single-axis interval intersection
    if let (
        Some(Expr::GreaterThanZero {
            inner: i1,
            allow_equals: ae1,
        }),
        Expr::GreaterThanZero {
            inner: i2,
            allow_equals: ae2,
        },
    ) = (prev, value)
    {
        let xb1 = extract(i1);
        let xb2 = extract(i2);
        let reverse = if xb1.x == xb2.x {
            Some(false)
        } else if xb1.x == negate(ctx, xb2.x.clone()) {
            Some(true)
        } else {
            None
        };
        if let Some(rev) = reverse {
            let b1 = xb1.b;
            let b2 = if rev { -xb2.b } else { xb2.b };
            let lt1 = xb1.less_than;
            let lt2 = rev != xb2.less_than;

            if lt1 && lt2 {
                // x <= b1 && x <= b2: keep the smaller bound
                if b1 > b2 {
                    return Action::Replace;
                }
                if b1 < b2 {
                    return Action::Skip;
                }
                return if *ae1 { Action::Replace } else { Action::Skip };
            }
            if !lt1 && !lt2 {
                // x >= b1 && x >= b2: keep the larger bound
                if b1 > b2 {
                    return Action::Skip;
                }
                if b1 < b2 {
                    return Action::Replace;
                }
                return if *ae1 { Action::Replace } else { Action::Skip };
            }

            // opposite directions: empty, interval, or pinched to a point
            if b1 > b2 {
                return if !lt1 { Action::False } else { Action::Add };
            }
            if b1 < b2 {
                return if !lt1 { Action::Add } else { Action::False };
            }
            if *ae1 && *ae2 {
                let pinched = equals(ctx, Expr::int_or_double(b1), xb1.x.clone());
                match new_concat.last_mut() {
                    Some(last) => *last = pinched,
                    None => new_concat.push(pinched),
                }
                return Action::Skip;
            }
            return Action::False;
        }
    }

    Action::Add
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticContext;
    use crate::expr::VarId;
    use crate::types::PrimType;

    fn bool_ctx() -> (StaticContext, Vec<Expr>) {
        let mut ctx = StaticContext::new();
        let vars = (0..4)
            .map(|i| ctx.declare(VarId(i), PrimType::Bool))
            .collect();
        (ctx, vars)
    }

    #[test]
    fn duplicates_collapse() {
        let (ctx, v) = bool_ctx();
        assert_eq!(and(&ctx, &[v[0].clone(), v[0].clone()]), v[0]);
    }

    #[test]
    fn contradiction_is_false() {
        let (ctx, v) = bool_ctx();
        let not_a = negate(&ctx, v[0].clone());
        assert_eq!(and(&ctx, &[v[0].clone(), not_a.clone()]), Expr::FALSE);
        assert_eq!(and(&ctx, &[not_a, v[0].clone()]), Expr::FALSE);
    }

    #[test]
    fn true_terms_drop_out() {
        let (ctx, v) = bool_ctx();
        assert_eq!(and(&ctx, &[Expr::TRUE, Expr::TRUE]), Expr::TRUE);
        assert_eq!(and(&ctx, &[Expr::TRUE, v[0].clone()]), v[0]);
        assert_eq!(and(&ctx, &[Expr::FALSE, v[0].clone()]), Expr::FALSE);
    }

    #[test]
    fn false_wins_over_delayed() {
        let (ctx, v) = bool_ctx();
        assert_eq!(
            and(&ctx, &[v[0].clone(), Expr::DELAYED, Expr::FALSE]),
            Expr::FALSE
        );
        assert_eq!(
            and(&ctx, &[v[0].clone(), Expr::DELAYED]),
            Expr::DELAYED
        );
    }

    #[test]
    fn empty_placeholder_is_dropped() {
        let (ctx, v) = bool_ctx();
        assert_eq!(and(&ctx, &[Expr::EMPTY, v[0].clone()]), v[0]);
        assert_eq!(and(&ctx, &[Expr::EMPTY]), Expr::EMPTY);
    }

    #[test]
    fn absorption_with_disjunction() {
        let (ctx, v) = bool_ctx();
        let (a, b) = (v[0].clone(), v[1].clone());
        // A && (A || B) --> A
        let a_or_b = or(&ctx, &[a.clone(), b.clone()]);
        assert_eq!(and(&ctx, &[a.clone(), a_or_b]), a);
        // A && (!A || B) --> A && B
        let not_a_or_b = or(&ctx, &[negate(&ctx, a.clone()), b.clone()]);
        let result = and(&ctx, &[a.clone(), not_a_or_b]);
        assert_eq!(result, and(&ctx, &[a, b]));
    }

    #[test]
    fn distributed_contradiction() {
        let (ctx, v) = bool_ctx();
        let (a, b, c, d) = (v[0].clone(), v[1].clone(), v[2].clone(), v[3].clone());
        // D && A && !B && (!A || B) && C --> false
        let clause = or(&ctx, &[negate(&ctx, a.clone()), b.clone()]);
        let result = and(&ctx, &[d, a, negate(&ctx, b), clause, c]);
        assert_eq!(result, Expr::FALSE);
    }

    #[test]
    fn or_factoring() {
        let (ctx, v) = bool_ctx();
        let (a, b) = (v[0].clone(), v[1].clone());
        let a_or_b = or(&ctx, &[a.clone(), b.clone()]);
        let a_or_not_b = or(&ctx, &[a.clone(), negate(&ctx, b)]);
        assert_eq!(and(&ctx, &[a_or_b, a_or_not_b]), a);
    }

    #[test]
    fn conditional_resolution_inside_conjunction() {
        let mut ctx = StaticContext::new();
        let a = ctx.declare(VarId(0), PrimType::Bool);
        let t = ctx.declare(VarId(1), PrimType::Bool);
        let f = ctx.declare(VarId(2), PrimType::Bool);
        let cond = Expr::Conditional {
            condition: Arc::new(a.clone()),
            if_true: Arc::new(t.clone()),
            if_false: Arc::new(f.clone()),
        };
        // A && (A ? t : f) --> A && t
        assert_eq!(
            and(&ctx, &[a.clone(), cond.clone()]),
            and(&ctx, &[a.clone(), t])
        );
        // !A && (A ? t : f) --> !A && f
        let not_a = negate(&ctx, a);
        assert_eq!(
            and(&ctx, &[not_a.clone(), cond]),
            and(&ctx, &[not_a, f])
        );
    }

    #[test]
    fn idempotent_append() {
        let (ctx, v) = bool_ctx();
        let e = and(&ctx, &[v[0].clone(), v[1].clone()]);
        assert_eq!(and(&ctx, &[e.clone()]), e);
        assert_eq!(and_append(&ctx, &e, &[]), e);
    }

    #[test]
    #[should_panic(expected = "non-boolean operand")]
    fn non_boolean_operand_is_a_contract_violation() {
        let mut ctx = StaticContext::new();
        let i = ctx.declare(VarId(0), PrimType::Int);
        let _ = and(&ctx, &[i]);
    }
}
