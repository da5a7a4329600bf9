//! Canonical negation.
//!
//! One entry point serves both arithmetic and logical negation, mirroring
//! how the node set treats `Negated` as a wrapper: numeric constants negate
//! in place, sums push the negation into their terms, De Morgan rewrites
//! And/Or, comparisons flip through their own negation logic, and anything
//! else gets the wrapper. Double negation always cancels.

use std::sync::Arc;

use crate::arith::product::product;
use crate::arith::sum::sum;
use crate::boolean;
use crate::cmp::equals::negated_equals_conditional;
use crate::cmp::gt0;
use crate::context::EvalContext;
use crate::expr::Expr;

/// Negate an expression, keeping the result canonical.
pub fn negate(ctx: &dyn EvalContext, e: Expr) -> Expr {
    match e {
        Expr::Bool(b) => Expr::Bool(!b),
        Expr::Byte(v) => Expr::Int(-i32::from(v)),
        Expr::Short(v) => Expr::Int(-i32::from(v)),
        Expr::Int(v) => match v.checked_neg() {
            Some(n) => Expr::Int(n),
            None => Expr::Long(-i64::from(v)),
        },
        Expr::Long(v) => match v.checked_neg() {
            Some(n) => Expr::Long(n),
            None => Expr::double(-(v as f64)),
        },
        Expr::Double(d) => Expr::double(-d.0),
        Expr::Negated(inner) => (*inner).clone(),
        Expr::Sum(l, r) => {
            let nl = negate(ctx, (*l).clone());
            let nr = negate(ctx, (*r).clone());
            sum(ctx, nl, nr)
        }
        Expr::Product(l, r) if l.as_numeric().is_some() => {
            let nl = negate(ctx, (*l).clone());
            product(ctx, nl, (*r).clone())
        }
        Expr::GreaterThanZero {
            inner,
            allow_equals,
        } => gt0::negate_gt0(ctx, &inner, allow_equals),
        Expr::And(terms) => {
            let negated: Vec<Expr> = terms
                .iter()
                .map(|t| negate(ctx, (**t).clone()))
                .collect();
            boolean::or(ctx, &negated)
        }
        Expr::Or(terms) => {
            let negated: Vec<Expr> = terms
                .iter()
                .map(|t| negate(ctx, (**t).clone()))
                .collect();
            boolean::and(ctx, &negated)
        }
        Expr::Equals(l, r) => {
            if let Some(rewritten) = negated_equals_conditional(ctx, &l, &r) {
                rewritten
            } else {
                Expr::Negated(Arc::new(Expr::Equals(l, r)))
            }
        }
        Expr::Unknown(kind) => Expr::Unknown(kind),
        other => Expr::Negated(Arc::new(other)),
    }
}
