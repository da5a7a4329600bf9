//! Product construction: constant folding, identity and zero absorption,
//! and association of constant factors so a product carries at most one
//! numeric constant, always on the left.

use std::sync::Arc;

use crate::context::EvalContext;
use crate::expr::Expr;

/// Smart constructor for `l * r`.
pub fn product(ctx: &dyn EvalContext, l: Expr, r: Expr) -> Expr {
    if l.is_unknown() || r.is_unknown() {
        return Expr::DELAYED;
    }
    if let (Some(a), Some(b)) = (l.as_numeric(), r.as_numeric()) {
        return Expr::int_or_double(a * b);
    }
    if l.as_numeric() == Some(0.0) || r.as_numeric() == Some(0.0) {
        return Expr::Int(0);
    }
    if l.as_numeric() == Some(1.0) {
        return r;
    }
    if r.as_numeric() == Some(1.0) {
        return l;
    }
    // (c1) * (c2 * x)  -->  (c1*c2) * x
    if let Some(c1) = l.as_numeric() {
        if let Expr::Product(rl, rr) = &r {
            if let Some(c2) = rl.as_numeric() {
                return product(ctx, Expr::int_or_double(c1 * c2), (**rr).clone());
            }
        }
        return Expr::Product(Arc::new(l), Arc::new(r));
    }
    if let Some(c2) = r.as_numeric() {
        if let Expr::Product(ll, lr) = &l {
            if let Some(c1) = ll.as_numeric() {
                return product(ctx, Expr::int_or_double(c1 * c2), (**lr).clone());
            }
        }
        return Expr::Product(Arc::new(r), Arc::new(l));
    }
    if l <= r {
        Expr::Product(Arc::new(l), Arc::new(r))
    } else {
        Expr::Product(Arc::new(r), Arc::new(l))
    }
}
