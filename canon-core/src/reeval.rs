//! Re-evaluation: substitution under a variable→expression map.
//!
//! Every composite node is re-threaded through its smart constructor, so
//! the result is canonical whatever the map did to the leaves. Diagnostics
//! raised while re-simplifying (a division that became constant-zero, a
//! guard that became constant) are collected and returned as side effects
//! instead of going straight to the caller's sink.

use rustc_hash::FxHashMap;

use crate::arith::{divide, negate, product, sum};
use crate::boolean::{and, or};
use crate::cmp::equals::equals;
use crate::cmp::gt0::greater;
use crate::composite::{array, combined, inline_result, property_wrapper};
use crate::conditional::conditional_resolved;
use crate::context::{EvalContext, RecordingContext};
use crate::diagnostics::Diagnostic;
use crate::expr::Expr;

/// Substitution map. Keys may be any expression, not just variables; the
/// whole-node match is tried before descending.
pub type TranslationMap = FxHashMap<Expr, Expr>;

/// Result of a re-evaluation: the canonical value plus the side effects
/// produced while re-simplifying.
#[derive(Debug)]
pub struct ReEvalResult {
    /// The re-simplified expression.
    pub value: Expr,
    /// Diagnostics raised during re-simplification.
    pub diagnostics: Vec<Diagnostic>,
}

/// Substitute and re-simplify.
pub fn re_evaluate(
    ctx: &dyn EvalContext,
    expr: &Expr,
    translation: &TranslationMap,
) -> ReEvalResult {
    let recording = RecordingContext::new(ctx);
    let value = re_eval(&recording, expr, translation);
    ReEvalResult {
        value,
        diagnostics: recording.take(),
    }
}

fn re_eval(ctx: &dyn EvalContext, expr: &Expr, translation: &TranslationMap) -> Expr {
    if let Some(replacement) = translation.get(expr) {
        return replacement.clone();
    }
    match expr {
        Expr::Sum(l, r) => {
            let rl = re_eval(ctx, l, translation);
            let rr = re_eval(ctx, r, translation);
            sum(ctx, rl, rr)
        }
        Expr::Product(l, r) => {
            let rl = re_eval(ctx, l, translation);
            let rr = re_eval(ctx, r, translation);
            product(ctx, rl, rr)
        }
        Expr::Divide(l, r) => {
            let rl = re_eval(ctx, l, translation);
            let rr = re_eval(ctx, r, translation);
            divide(ctx, rl, rr)
        }
        Expr::Equals(l, r) => {
            let rl = re_eval(ctx, l, translation);
            let rr = re_eval(ctx, r, translation);
            equals(ctx, rl, rr)
        }
        Expr::GreaterThanZero {
            inner,
            allow_equals,
        } => {
            let ri = re_eval(ctx, inner, translation);
            greater(ctx, ri, Expr::Int(0), *allow_equals)
        }
        Expr::Negated(inner) => {
            let ri = re_eval(ctx, inner, translation);
            negate(ctx, ri)
        }
        Expr::And(terms) => {
            let re_terms: Vec<Expr> = terms
                .iter()
                .map(|t| re_eval(ctx, t, translation))
                .collect();
            and(ctx, &re_terms)
        }
        Expr::Or(terms) => {
            let re_terms: Vec<Expr> = terms
                .iter()
                .map(|t| re_eval(ctx, t, translation))
                .collect();
            or(ctx, &re_terms)
        }
        Expr::Conditional {
            condition,
            if_true,
            if_false,
        } => {
            let rc = re_eval(ctx, condition, translation);
            let rt = re_eval(ctx, if_true, translation);
            let rf = re_eval(ctx, if_false, translation);
            conditional_resolved(ctx, rc, rt, rf)
        }
        Expr::Array(terms) => {
            let re_terms: Vec<Expr> = terms
                .iter()
                .map(|t| re_eval(ctx, t, translation))
                .collect();
            array(re_terms)
        }
        Expr::Combined(terms) => {
            let re_terms: Vec<Expr> = terms
                .iter()
                .map(|t| re_eval(ctx, t, translation))
                .collect();
            combined(re_terms)
        }
        Expr::PropertyWrapper { inner, overrides } => {
            let ri = re_eval(ctx, inner, translation);
            property_wrapper(ctx, ri, overrides)
        }
        Expr::InlineResult {
            method,
            inner,
            applicability,
        } => {
            let ri = re_eval(ctx, inner, translation);
            inline_result(*method, ri, *applicability)
        }
        leaf => leaf.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmp::gt0::less;
    use crate::context::StaticContext;
    use crate::diagnostics::DiagnosticKind;
    use crate::expr::VarId;
    use crate::types::PrimType;

    fn translation(pairs: &[(Expr, Expr)]) -> TranslationMap {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn substitution_folds_constants() {
        let mut ctx = StaticContext::new();
        let i = ctx.declare(VarId(0), PrimType::Int);
        let ge3 = greater(&ctx, i.clone(), Expr::Int(3), true);
        let result = re_evaluate(&ctx, &ge3, &translation(&[(i, Expr::Int(5))]));
        assert_eq!(result.value, Expr::TRUE);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn substitution_keeps_canonical_form() {
        let mut ctx = StaticContext::new();
        let i = ctx.declare(VarId(0), PrimType::Int);
        let j = ctx.declare(VarId(1), PrimType::Int);
        let k = ctx.declare(VarId(2), PrimType::Int);
        let conj = and(
            &ctx,
            &[
                greater(&ctx, i.clone(), Expr::Int(3), true),
                less(&ctx, j.clone(), Expr::Int(0), true),
            ],
        );
        // i := k, j := k merges the clauses over the single variable
        let result = re_evaluate(
            &ctx,
            &conj,
            &translation(&[(i, k.clone()), (j, k.clone())]),
        );
        // k >= 3 && k <= 0 is a contradiction
        assert_eq!(result.value, Expr::FALSE);
    }

    #[test]
    fn identity_substitution_is_a_fixed_point() {
        let mut ctx = StaticContext::new();
        let i = ctx.declare(VarId(0), PrimType::Int);
        let e = and(
            &ctx,
            &[
                greater(&ctx, i.clone(), Expr::Int(3), true),
                negate(&ctx, equals(&ctx, Expr::Int(7), i)),
            ],
        );
        let result = re_evaluate(&ctx, &e, &TranslationMap::default());
        assert_eq!(result.value, e);
    }

    #[test]
    fn diagnostics_are_returned_not_leaked() {
        let mut ctx = StaticContext::new();
        let i = ctx.declare(VarId(0), PrimType::Int);
        let j = ctx.declare(VarId(1), PrimType::Int);
        let division = Expr::Divide(i.clone().into(), j.clone().into());
        let result = re_evaluate(&ctx, &division, &translation(&[(j, Expr::Int(0))]));
        assert_eq!(result.value, i);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::DivisionByZero);
        assert!(ctx.sink.is_empty());
    }
}
