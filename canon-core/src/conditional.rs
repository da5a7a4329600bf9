//! Ternary expressions.
//!
//! Construction is a resolution pipeline, not a constructor: the ambient
//! path condition is conjoined first, constant guards resolve immediately
//! (and are reported — one branch of the source conditional is dead),
//! negated guards swap branches so the stored condition is never a
//! top-level negation, nested conditionals over the same guard collapse,
//! and boolean-constant branches reduce to conjunctions/disjunctions. Only
//! what survives all of that becomes a [`Expr::Conditional`] node.

use std::sync::Arc;
use tracing::debug;

use crate::arith::negation::negate;
use crate::boolean::{and, or};
use crate::context::EvalContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expr::Expr;
use crate::property::{get_property, PropertyKind, PropertyValue};

/// Resolve `condition ? if_true : if_false` under the ambient state.
pub fn conditional(ctx: &dyn EvalContext, condition: Expr, if_true: Expr, if_false: Expr) -> Expr {
    let effective = check_state(ctx, condition);
    conditional_resolved(ctx, effective, if_true, if_false)
}

/// Conjoin the ambient state with the raw condition: a conjunction that
/// folds to a constant decides the guard; a conjunction equal to the raw
/// condition collapses the guard to `true`.
fn check_state(ctx: &dyn EvalContext, condition: Expr) -> Expr {
    let state = ctx.current_state();
    if state == Expr::EMPTY {
        return condition;
    }
    let conjoined = and(ctx, &[state, condition.clone()]);
    if conjoined == condition {
        return Expr::TRUE;
    }
    if matches!(conjoined, Expr::Bool(_)) {
        return conjoined;
    }
    condition
}

/// Resolve a conditional whose guard is already in its final form.
#[allow(clippy::too_many_lines)]
pub fn conditional_resolved(
    ctx: &dyn EvalContext,
    condition: Expr,
    if_true: Expr,
    if_false: Expr,
) -> Expr {
    if let Expr::Bool(b) = condition {
        ctx.report(Diagnostic::new(
            DiagnosticKind::InlineConditionEvaluatesToConstant,
            ctx.location(),
        ));
        debug!("conditional guard is the constant {b}");
        return if b { if_true } else { if_false };
    }
    if condition.is_unknown() {
        return Expr::DELAYED;
    }

    // !x ? a : b  -->  x ? b : a
    if let Expr::Negated(inner) = condition {
        return conditional_resolved(ctx, (*inner).clone(), if_false, if_true);
    }

    // x ? a : a
    if if_true == if_false {
        return if_true;
    }
    // a ? a : !a
    if condition == if_true && condition == negate(ctx, if_false.clone()) {
        return Expr::TRUE;
    }
    // boolean-constant branches reduce to plain connectives
    if let Expr::Bool(b) = if_true {
        return if b {
            or(ctx, &[condition, if_false])
        } else {
            let not_condition = negate(ctx, condition);
            and(ctx, &[not_condition, if_false])
        };
    }
    if let Expr::Bool(b) = if_false {
        return if b {
            let not_condition = negate(ctx, condition);
            or(ctx, &[not_condition, if_true])
        } else {
            and(ctx, &[condition, if_true])
        };
    }

    // nested conditional in the true branch
    if let Expr::Conditional {
        condition: c2,
        if_true: t2,
        if_false: f2,
    } = &if_true
    {
        // x ? (x ? a : b) : c  -->  x ? a : c
        if **c2 == condition {
            return conditional_resolved(ctx, condition, (**t2).clone(), if_false);
        }
        // x ? (!x ? a : b) : c  -->  x ? b : c
        if **c2 == negate(ctx, condition.clone()) {
            return conditional_resolved(ctx, condition, (**f2).clone(), if_false);
        }
        // x ? (y ? a : b) : b  -->  (x && y) ? a : b
        if if_false == **f2 {
            let both = and(ctx, &[condition, (**c2).clone()]);
            return conditional_resolved(ctx, both, (**t2).clone(), if_false);
        }
        // x ? (y ? a : b) : a  -->  (x && !y) ? b : a
        if if_false == **t2 {
            let not_c2 = negate(ctx, (**c2).clone());
            let both = and(ctx, &[condition, not_c2]);
            return conditional_resolved(ctx, both, (**f2).clone(), if_false);
        }
    }
    // nested conditional in the false branch
    if let Expr::Conditional {
        condition: c2,
        if_true: t2,
        if_false: f2,
    } = &if_false
    {
        // x ? a : (x ? b : c)  -->  x ? a : c
        if **c2 == condition {
            return conditional_resolved(ctx, condition, if_true, (**f2).clone());
        }
        // x ? a : (!x ? b : c)  -->  x ? a : b
        if **c2 == negate(ctx, condition.clone()) {
            return conditional_resolved(ctx, condition, if_true, (**t2).clone());
        }
        // x ? a : (y ? a : b)  -->  (x || y) ? a : b
        if if_true == **t2 {
            let either = or(ctx, &[condition, (**c2).clone()]);
            return conditional_resolved(ctx, either, if_true, (**f2).clone());
        }
        // x ? a : (y ? b : a)  -->  (x || !y) ? a : b
        if if_true == **f2 {
            let not_c2 = negate(ctx, (**c2).clone());
            let either = or(ctx, &[condition, not_c2]);
            return conditional_resolved(ctx, either, if_true, (**t2).clone());
        }
    }

    // the guard (or its negation) absorbed out of connective branches
    let not_condition = negate(ctx, condition.clone());
    if let Expr::Or(terms) = &if_true {
        // x ? x||y : z  -->  x || z
        if terms.iter().any(|t| **t == condition) {
            return or(ctx, &[condition, if_false]);
        }
        // x ? !x||y : z  -->  x ? y : z
        if terms.iter().any(|t| **t == not_condition) {
            let remaining: Vec<Expr> = terms
                .iter()
                .filter(|t| ***t != not_condition)
                .map(|t| (**t).clone())
                .collect();
            let shrunk = or(ctx, &remaining);
            return conditional_resolved(ctx, condition, shrunk, if_false);
        }
    }
    if let Expr::Or(terms) = &if_false {
        // x ? y : x||z  -->  x ? y : z
        if terms.iter().any(|t| **t == condition) {
            let remaining: Vec<Expr> = terms
                .iter()
                .filter(|t| ***t != condition)
                .map(|t| (**t).clone())
                .collect();
            let shrunk = or(ctx, &remaining);
            return conditional_resolved(ctx, condition, if_true, shrunk);
        }
        // x ? y : !x||z  -->  !x || y
        if terms.iter().any(|t| **t == not_condition) {
            return or(ctx, &[not_condition, if_true]);
        }
    }
    if let Expr::And(terms) = &if_true {
        // x ? x&&y : z  -->  x ? y : z
        if terms.iter().any(|t| **t == condition) {
            let remaining: Vec<Expr> = terms
                .iter()
                .filter(|t| ***t != condition)
                .map(|t| (**t).clone())
                .collect();
            let shrunk = and(ctx, &remaining);
            return conditional_resolved(ctx, condition, shrunk, if_false);
        }
        // x ? !x&&y : z  -->  !x && z
        if terms.iter().any(|t| **t == not_condition) {
            return and(ctx, &[not_condition, if_false]);
        }
    }
    if let Expr::And(terms) = &if_false {
        // x ? y : x&&z  -->  x && y
        if terms.iter().any(|t| **t == condition) {
            return and(ctx, &[condition, if_true]);
        }
        // x ? y : !x&&z  -->  x ? y : z
        if terms.iter().any(|t| **t == not_condition) {
            let remaining: Vec<Expr> = terms
                .iter()
                .filter(|t| ***t != not_condition)
                .map(|t| (**t).clone())
                .collect();
            let shrunk = and(ctx, &remaining);
            return conditional_resolved(ctx, condition, if_true, shrunk);
        }
    }

    Expr::Conditional {
        condition: Arc::new(condition),
        if_true: Arc::new(if_true),
        if_false: Arc::new(if_false),
    }
}

/// Property lookup on a conditional: the null-check patterns
/// `null == x ? a : x` and `!(null == x) ? x : a` refine the branch known
/// to be non-null; everything else combines the branches.
pub(crate) fn conditional_property(
    ctx: &dyn EvalContext,
    expr: &Expr,
    kind: PropertyKind,
) -> PropertyValue {
    let Expr::Conditional {
        condition,
        if_true,
        if_false,
    } = expr
    else {
        return PropertyValue::UNKNOWN;
    };

    if kind == PropertyKind::NOT_NULL {
        let (core, negated) = match &**condition {
            Expr::Negated(inner) => (&**inner, true),
            other => (other, false),
        };
        if let Expr::Equals(l, r) = core {
            if **l == Expr::Null {
                if **if_true == **r {
                    // null == a ? a : x  /  null != a ? a : x
                    return if negated {
                        get_property(ctx, if_false, kind)
                    } else {
                        PropertyValue::NULLABLE
                    };
                }
                if **if_false == **r {
                    // null == a ? x : a  /  null != a ? x : a
                    return if negated {
                        PropertyValue::NULLABLE
                    } else {
                        get_property(ctx, if_true, kind)
                    };
                }
            }
        }
    }

    get_property(ctx, if_true, kind).min_known(get_property(ctx, if_false, kind))
}
