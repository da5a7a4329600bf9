//! Division. A constant-zero divisor is a reportable condition, not a
//! crash: the diagnostic goes to the context and the dividend is returned as
//! the fallback value.

use std::sync::Arc;

use crate::context::EvalContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expr::Expr;

/// Smart constructor for `l / r`.
pub fn divide(ctx: &dyn EvalContext, l: Expr, r: Expr) -> Expr {
    if l.is_unknown() || r.is_unknown() {
        return Expr::DELAYED;
    }
    if r.as_numeric() == Some(0.0) {
        ctx.report(Diagnostic::new(
            DiagnosticKind::DivisionByZero,
            ctx.location(),
        ));
        return l;
    }
    if l.as_numeric() == Some(0.0) {
        return Expr::Int(0);
    }
    if r.as_numeric() == Some(1.0) {
        return l;
    }
    if let (Some(a), Some(b)) = (l.as_numeric(), r.as_numeric()) {
        let discrete = l
            .prim_type(ctx)
            .zip(r.prim_type(ctx))
            .is_some_and(|(tl, tr)| tl.is_discrete() && tr.is_discrete());
        if discrete {
            return Expr::int_or_double(((a as i64) / (b as i64)) as f64);
        }
        return Expr::int_or_double(a / b);
    }
    Expr::Divide(Arc::new(l), Arc::new(r))
}
