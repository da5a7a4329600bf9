//! Clause filtering.
//!
//! The outer analysis frequently needs to split a path condition into the
//! clauses it understands (null checks on a variable, bounds on a field)
//! and "the rest". The filter walks a canonical expression, collects the
//! clauses a matcher recognizes, and rebuilds the remainder with the same
//! combinator, so the rest stays canonical.
//!
//! Modes control how deep the walk goes: [`FilterMode::Accept`] splits
//! conjunctions (the normal state after an escape), [`FilterMode::Reject`]
//! splits disjunctions (the condition for escaping), [`FilterMode::All`]
//! splits both. A negation is transparent: the clause and the rest are
//! negated back on the way out.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::arith::negation::negate;
use crate::boolean::{and, or};
use crate::context::EvalContext;
use crate::expr::{Expr, VarId};

/// How connectives are split during filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Split both conjunctions and disjunctions.
    All,
    /// Split conjunctions only.
    Accept,
    /// Split disjunctions only.
    Reject,
}

/// The outcome of a filter pass: recognized clauses keyed by the matcher,
/// and the remaining expression ([`Expr::EMPTY`] when everything was
/// accepted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult<K: Eq + Hash> {
    /// The clauses the matcher picked up.
    pub accepted: FxHashMap<K, Expr>,
    /// Whatever was not recognized, re-normalized.
    pub rest: Expr,
}

/// A clause matcher: returns the key and the clause when it recognizes the
/// expression.
pub type FilterMatcher<'a, K> = &'a dyn Fn(&Expr) -> Option<(K, Expr)>;

/// Split `expr` according to `mode` and `matcher`.
pub fn filter<K: Eq + Hash>(
    ctx: &dyn EvalContext,
    expr: &Expr,
    mode: FilterMode,
    matcher: FilterMatcher<'_, K>,
) -> FilterResult<K> {
    filter_internal(ctx, expr, mode, matcher).unwrap_or_else(|| FilterResult {
        accepted: FxHashMap::default(),
        rest: expr.clone(),
    })
}

fn filter_internal<K: Eq + Hash>(
    ctx: &dyn EvalContext,
    expr: &Expr,
    mode: FilterMode,
    matcher: FilterMatcher<'_, K>,
) -> Option<FilterResult<K>> {
    match expr {
        Expr::Negated(inner) => {
            let result = filter_internal(ctx, inner, mode, matcher)?;
            let accepted = result
                .accepted
                .into_iter()
                .map(|(k, clause)| (k, negate(ctx, clause)))
                .collect();
            let rest = if result.rest == Expr::EMPTY {
                Expr::EMPTY
            } else {
                negate(ctx, result.rest)
            };
            Some(FilterResult { accepted, rest })
        }
        Expr::And(terms) if mode != FilterMode::Reject => {
            Some(split(ctx, terms, mode, matcher, true))
        }
        Expr::Or(terms) if mode != FilterMode::Accept => {
            Some(split(ctx, terms, mode, matcher, false))
        }
        other => matcher(other).map(|(key, clause)| {
            let mut accepted = FxHashMap::default();
            accepted.insert(key, clause);
            FilterResult {
                accepted,
                rest: Expr::EMPTY,
            }
        }),
    }
}

fn split<K: Eq + Hash>(
    ctx: &dyn EvalContext,
    terms: &[std::sync::Arc<Expr>],
    mode: FilterMode,
    matcher: FilterMatcher<'_, K>,
    conjunction: bool,
) -> FilterResult<K> {
    let mut accepted: FxHashMap<K, Expr> = FxHashMap::default();
    let mut rests: Vec<Expr> = Vec::new();
    for term in terms {
        match filter_internal(ctx, term, mode, matcher) {
            Some(sub) => {
                for (k, clause) in sub.accepted {
                    accepted.entry(k).or_insert(clause);
                }
                if sub.rest != Expr::EMPTY {
                    rests.push(sub.rest);
                }
            }
            None => rests.push((**term).clone()),
        }
    }
    let rest = match rests.len() {
        0 => Expr::EMPTY,
        1 => rests.into_iter().next().expect("length checked"),
        _ => {
            if conjunction {
                and(ctx, &rests)
            } else {
                or(ctx, &rests)
            }
        }
    };
    FilterResult { accepted, rest }
}

/// Matcher for individual null-check clauses: `null == v` for a plain
/// variable `v`. Negated checks are handled by the filter's negation
/// transparency.
pub fn null_clause(expr: &Expr) -> Option<(VarId, Expr)> {
    if let Expr::Equals(l, r) = expr {
        if **l == Expr::Null {
            if let Expr::Variable(v) = &**r {
                return Some((*v, expr.clone()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::{and, or};
    use crate::cmp::equals::equals;
    use crate::context::StaticContext;
    use crate::types::PrimType;

    fn setup() -> (StaticContext, Expr, Expr, Expr) {
        let mut ctx = StaticContext::new();
        let a = ctx.declare(VarId(0), PrimType::Object);
        let b = ctx.declare(VarId(1), PrimType::Object);
        let c = ctx.declare(VarId(2), PrimType::Bool);
        (ctx, a, b, c)
    }

    #[test]
    fn single_null_clause_is_accepted() {
        let (ctx, a, _, _) = setup();
        let is_null = equals(&ctx, a, Expr::Null);
        let result = filter(&ctx, &is_null, FilterMode::Accept, &null_clause);
        assert_eq!(result.accepted.len(), 1);
        assert_eq!(result.accepted.get(&VarId(0)), Some(&is_null));
        assert_eq!(result.rest, Expr::EMPTY);
    }

    #[test]
    fn negated_null_clause_round_trips() {
        let (ctx, a, _, _) = setup();
        let not_null = negate(&ctx, equals(&ctx, Expr::Null, a));
        let result = filter(&ctx, &not_null, FilterMode::Reject, &null_clause);
        assert_eq!(result.accepted.get(&VarId(0)), Some(&not_null));
        assert_eq!(result.rest, Expr::EMPTY);
    }

    #[test]
    fn conjunction_splits_into_clause_and_rest() {
        let (ctx, a, _, c) = setup();
        let is_null = equals(&ctx, Expr::Null, a);
        let conj = and(&ctx, &[is_null.clone(), c.clone()]);
        let result = filter(&ctx, &conj, FilterMode::Accept, &null_clause);
        assert_eq!(result.accepted.get(&VarId(0)), Some(&is_null));
        assert_eq!(result.rest, c);
    }

    #[test]
    fn disjunction_collects_both_polarities() {
        let (ctx, a, b, _) = setup();
        let a_null = equals(&ctx, Expr::Null, a);
        let b_not_null = negate(&ctx, equals(&ctx, Expr::Null, b));
        let disj = or(&ctx, &[a_null.clone(), b_not_null.clone()]);
        let result = filter(&ctx, &disj, FilterMode::Reject, &null_clause);
        assert_eq!(result.accepted.len(), 2);
        assert_eq!(result.accepted.get(&VarId(0)), Some(&a_null));
        assert_eq!(result.accepted.get(&VarId(1)), Some(&b_not_null));
        assert_eq!(result.rest, Expr::EMPTY);
    }

    #[test]
    fn accept_mode_does_not_split_disjunctions() {
        let (ctx, a, _, c) = setup();
        let a_null = equals(&ctx, Expr::Null, a);
        let disj = or(&ctx, &[a_null, c]);
        let result = filter(&ctx, &disj, FilterMode::Accept, &null_clause);
        assert!(result.accepted.is_empty());
        assert_eq!(result.rest, disj);
    }

    #[test]
    fn unmatched_expression_is_all_rest() {
        let (ctx, _, _, c) = setup();
        let result = filter(&ctx, &c, FilterMode::All, &null_clause);
        assert!(result.accepted.is_empty());
        assert_eq!(result.rest, c);
    }
}
