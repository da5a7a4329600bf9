//! Sum construction.
//!
//! `sum` maintains the "sum of products" canonical shape: nested sums are
//! flattened, terms are sorted by the canonical order (numeric constant
//! first), equal bases merge their factors (`x + 3*x` becomes `4*x`,
//! `x + -x` cancels), adjacent numeric constants fold, zero terms drop, and
//! the result is rebuilt left-nested. The inequality machinery relies on
//! this shape to decompose `b - x` / `x - b`.

use std::sync::Arc;

use crate::arith::negation::negate;
use crate::arith::product::product;
use crate::context::EvalContext;
use crate::expr::Expr;

/// Smart constructor for `l + r`.
pub fn sum(ctx: &dyn EvalContext, l: Expr, r: Expr) -> Expr {
    if l.is_unknown() || r.is_unknown() {
        return Expr::DELAYED;
    }
    if l == r {
        return product(ctx, Expr::Int(2), l);
    }
    if l.as_numeric() == Some(0.0) {
        return r;
    }
    if r.as_numeric() == Some(0.0) {
        return l;
    }
    if let (Some(a), Some(b)) = (l.as_numeric(), r.as_numeric()) {
        return Expr::int_or_double(a + b);
    }
    if let Some(x) = l.as_negated() {
        if *x == r {
            return Expr::Int(0);
        }
    }
    if let Some(x) = r.as_negated() {
        if *x == l {
            return Expr::Int(0);
        }
    }

    let mut terms = Vec::new();
    expand_terms(&mut terms, &l);
    expand_terms(&mut terms, &r);
    terms.sort();
    let merged = make_products(ctx, terms);
    rebuild(merged)
}

/// Flatten nested sums into a term list.
pub(crate) fn expand_terms(out: &mut Vec<Expr>, e: &Expr) {
    if let Expr::Sum(l, r) = e {
        expand_terms(out, l);
        expand_terms(out, r);
    } else {
        out.push(e.clone());
    }
}

/// Flatten nested sums, negating every leaf term.
pub(crate) fn expand_terms_negated(ctx: &dyn EvalContext, out: &mut Vec<Expr>, e: &Expr) {
    if let Expr::Sum(l, r) = e {
        expand_terms_negated(ctx, out, l);
        expand_terms_negated(ctx, out, r);
    } else {
        out.push(negate(ctx, e.clone()));
    }
}

/// One merge pass over sorted terms: adjacent numeric constants fold, terms
/// with an equal base combine their factors, zeros drop.
pub(crate) fn make_products(ctx: &dyn EvalContext, terms: Vec<Expr>) -> Vec<Expr> {
    let mut result: Vec<Expr> = Vec::with_capacity(terms.len());
    for e in terms {
        let Some(latest) = result.last() else {
            result.push(e);
            continue;
        };
        if let (Some(a), Some(b)) = (latest.as_numeric(), e.as_numeric()) {
            *result.last_mut().expect("non-empty") = Expr::int_or_double(a + b);
            continue;
        }
        let (f1, base1) = factor_of(latest);
        let (f2, base2) = factor_of(&e);
        if base1 == base2 {
            let base = base1.clone();
            let replacement = if f1 + f2 == 0.0 {
                Expr::Int(0)
            } else {
                product(ctx, Expr::int_or_double(f1 + f2), base)
            };
            *result.last_mut().expect("non-empty") = replacement;
        } else {
            result.push(e);
        }
    }
    result.sort();
    result.retain(|e| e.as_numeric() != Some(0.0));
    result
}

/// Decompose a term into `(factor, base)`: `-x` is `(-1, x)`, `3*x` is
/// `(3, x)`, anything else is `(1, term)`.
fn factor_of(term: &Expr) -> (f64, &Expr) {
    match term {
        Expr::Negated(inner) => {
            let (f, base) = factor_of(inner);
            (-f, base)
        }
        Expr::Product(l, r) => match l.as_numeric() {
            Some(n) => (n, r),
            None => (1.0, term),
        },
        _ => (1.0, term),
    }
}

/// Left-nested rebuild of a merged, sorted term list.
pub(crate) fn rebuild(terms: Vec<Expr>) -> Expr {
    let mut iter = terms.into_iter();
    let Some(first) = iter.next() else {
        return Expr::Int(0);
    };
    iter.fold(first, |acc, t| Expr::Sum(Arc::new(acc), Arc::new(t)))
}
