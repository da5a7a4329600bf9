//! Canonical equality.
//!
//! `equals` is symmetric by construction: numeric operands are pushed
//! through the same expand/merge pass as sums, cancelling common terms and
//! leaving the (possibly negated) constant on the left — `equals(x, 4)` and
//! `equals(4, x)` both canonicalize to `4==x`, and `equals(x+1, y+1)`
//! cancels to an equality between the variables. Non-numeric operands are
//! ordered by the canonical comparator. Equality against a ternary
//! rewrites into a guarded conjunction when one branch is provably
//! (not) equal.

use std::sync::Arc;

use crate::arith::negation::negate;
use crate::arith::sum::{expand_terms, expand_terms_negated, make_products, sum};
use crate::boolean;
use crate::context::EvalContext;
use crate::expr::Expr;
use crate::property::is_not_null;

/// Smart constructor for `l == r`.
pub fn equals(ctx: &dyn EvalContext, l: Expr, r: Expr) -> Expr {
    if l.is_unknown() || r.is_unknown() {
        return Expr::DELAYED;
    }
    if l == r {
        return Expr::TRUE;
    }

    // null folds against guaranteed-not-null and against other constants
    if l == Expr::Null {
        if (r.is_constant() && r != Expr::Null) || is_not_null(ctx, &r) {
            return Expr::FALSE;
        }
    } else if r == Expr::Null && ((l.is_constant() && l != Expr::Null) || is_not_null(ctx, &l)) {
        return Expr::FALSE;
    }

    if l.is_constant() && r.is_constant() && l != Expr::Null && r != Expr::Null {
        return fold_constants(&l, &r);
    }

    if matches!(l, Expr::Conditional { .. }) {
        if let Some(rewritten) = rewrite_equals_conditional(ctx, &r, &l) {
            return rewritten;
        }
    }
    if matches!(r, Expr::Conditional { .. }) {
        if let Some(rewritten) = rewrite_equals_conditional(ctx, &l, &r) {
            return rewritten;
        }
    }

    let numeric = l.prim_type(ctx).is_some_and(|t| t.is_numeric())
        && r.prim_type(ctx).is_some_and(|t| t.is_numeric());
    if numeric {
        return numeric_equals(ctx, &l, &r);
    }

    // object/string equality: canonical operand order only
    if l <= r {
        Expr::Equals(Arc::new(l), Arc::new(r))
    } else {
        Expr::Equals(Arc::new(r), Arc::new(l))
    }
}

fn fold_constants(l: &Expr, r: &Expr) -> Expr {
    if let (Some(a), Some(b)) = (l.as_numeric(), r.as_numeric()) {
        return Expr::Bool(a == b);
    }
    match (l, r) {
        (Expr::Bool(a), Expr::Bool(b)) => Expr::Bool(a == b),
        (Expr::Str(a), Expr::Str(b)) => Expr::Bool(a == b),
        (Expr::ClassLiteral(a), Expr::ClassLiteral(b)) => Expr::Bool(a == b),
        // constants of different kinds are never equal
        _ => Expr::FALSE,
    }
}

/// Cancel common terms of `l == r` and rebuild with the constant on the
/// left.
fn numeric_equals(ctx: &dyn EvalContext, l: &Expr, r: &Expr) -> Expr {
    let mut terms = Vec::new();
    expand_terms(&mut terms, l);
    expand_terms_negated(ctx, &mut terms, r);
    terms.sort();
    let merged = make_products(ctx, terms);

    match merged.len() {
        0 => Expr::TRUE,
        1 => {
            let only = merged.into_iter().next().expect("length checked");
            if only.as_numeric().is_some() {
                return Expr::FALSE;
            }
            let zero = Expr::Int(0);
            match only {
                Expr::Negated(x) => Expr::Equals(Arc::new(zero), x),
                // 0 == 3*x  -->  0 == x
                Expr::Product(c, x) if c.as_numeric().is_some() => {
                    Expr::Equals(Arc::new(zero), x)
                }
                other => Expr::Equals(Arc::new(zero), Arc::new(other)),
            }
        }
        _ => {
            let first = merged[0].clone();
            let (new_left, new_right) = if let Some(d) = first.as_numeric() {
                let second_negated = matches!(merged[1], Expr::Negated(_));
                if d < 0.0 && second_negated {
                    // -4 + -x == 0  -->  -4 == x ... keep d, negate the rest
                    (first, wrap_rest(ctx, &merged, true))
                } else if d > 0.0 && !second_negated {
                    // 4 + x == 0  -->  -4 == x
                    (Expr::int_or_double(-d), wrap_rest(ctx, &merged, false))
                } else if d < 0.0 {
                    // -4 + x == 0  -->  4 == x
                    (Expr::int_or_double(-d), wrap_rest(ctx, &merged, false))
                } else {
                    (first, wrap_rest(ctx, &merged, true))
                }
            } else if let Expr::Negated(x) = &first {
                ((**x).clone(), wrap_rest(ctx, &merged, false))
            } else {
                (first, wrap_rest(ctx, &merged, true))
            };
            Expr::Equals(Arc::new(new_left), Arc::new(new_right))
        }
    }
}

/// Fold `merged[1..]` into a sum, negating each term when asked.
fn wrap_rest(ctx: &dyn EvalContext, merged: &[Expr], negate_terms: bool) -> Expr {
    let mut acc: Option<Expr> = None;
    for term in &merged[1..] {
        let t = if negate_terms {
            negate(ctx, term.clone())
        } else {
            term.clone()
        };
        acc = Some(match acc {
            None => t,
            Some(prev) => sum(ctx, prev, t),
        });
    }
    acc.expect("wrap_rest needs at least two merged terms")
}

/// `c == (cond ? a : b)` rewrites. Returns `None` when neither branch gives
/// a guarantee.
pub(crate) fn rewrite_equals_conditional(
    ctx: &dyn EvalContext,
    c: &Expr,
    conditional: &Expr,
) -> Option<Expr> {
    let Expr::Conditional {
        condition,
        if_true,
        if_false,
    } = conditional
    else {
        return None;
    };

    if let Expr::Conditional {
        condition: c2,
        if_true: t2,
        if_false: f2,
    } = c
    {
        // (cond ? a1 : b1) == (cond ? a2 : b2)  -->  a1==a2 && b1==b2
        if c2 == condition {
            let eq_true = equals(ctx, (**if_true).clone(), (**t2).clone());
            let eq_false = equals(ctx, (**if_false).clone(), (**f2).clone());
            return Some(boolean::and(ctx, &[eq_true, eq_false]));
        }
        return None;
    }

    let if_true_never_equal = if *c == Expr::Null {
        is_not_null(ctx, if_true)
    } else {
        equals(ctx, (**if_true).clone(), c.clone()).is_false()
    };
    if if_true_never_equal {
        let not_condition = negate(ctx, (**condition).clone());
        let eq_false = equals(ctx, (**if_false).clone(), c.clone());
        return Some(boolean::and(ctx, &[not_condition, eq_false]));
    }

    let if_false_never_equal = if *c == Expr::Null {
        is_not_null(ctx, if_false)
    } else {
        equals(ctx, (**if_false).clone(), c.clone()).is_false()
    };
    if if_false_never_equal {
        let eq_true = equals(ctx, (**if_true).clone(), c.clone());
        return Some(boolean::and(ctx, &[(**condition).clone(), eq_true]));
    }
    None
}

/// The dual used when negating `c == (cond ? a : b)`. Returns `None` when
/// neither branch is guaranteed equal.
pub(crate) fn negated_equals_conditional(
    ctx: &dyn EvalContext,
    l: &Expr,
    r: &Expr,
) -> Option<Expr> {
    if matches!(r, Expr::Conditional { .. }) {
        negative_rewrite(ctx, l, r)
    } else if matches!(l, Expr::Conditional { .. }) {
        negative_rewrite(ctx, r, l)
    } else {
        None
    }
}

fn negative_rewrite(ctx: &dyn EvalContext, c: &Expr, conditional: &Expr) -> Option<Expr> {
    let Expr::Conditional {
        condition,
        if_true,
        if_false,
    } = conditional
    else {
        return None;
    };

    if let Expr::Conditional {
        condition: c2,
        if_true: t2,
        if_false: f2,
    } = c
    {
        // (cond ? a1 : b1) != (cond ? a2 : b2)  -->  a1!=a2 || b1!=b2
        if c2 == condition {
            let ne_true = negate(ctx, equals(ctx, (**if_true).clone(), (**t2).clone()));
            let ne_false = negate(ctx, equals(ctx, (**if_false).clone(), (**f2).clone()));
            return Some(boolean::or(ctx, &[ne_true, ne_false]));
        }
        return None;
    }

    let if_true_equal = if *c == Expr::Null {
        **if_true == Expr::Null
    } else {
        equals(ctx, (**if_true).clone(), c.clone()).is_true()
    };
    if if_true_equal {
        let not_condition = negate(ctx, (**condition).clone());
        let ne_false = negate(ctx, equals(ctx, (**if_false).clone(), c.clone()));
        return Some(boolean::and(ctx, &[not_condition, ne_false]));
    }

    let if_false_equal = if *c == Expr::Null {
        **if_false == Expr::Null
    } else {
        equals(ctx, (**if_false).clone(), c.clone()).is_true()
    };
    if if_false_equal {
        let ne_true = negate(ctx, equals(ctx, (**if_true).clone(), c.clone()));
        return Some(boolean::and(ctx, &[(**condition).clone(), ne_true]));
    }
    None
}
