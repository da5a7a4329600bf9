//! The canonical total order over expressions.
//!
//! Every simplification pass sorts by this order; it also serves as the
//! structural-equality proxy for deduplication. The order must be strict and
//! total — a transitivity violation silently corrupts the And/Or fixed-point
//! loop, so the property suite checks it over generated trees.
//!
//! Wrapper variants ([`Expr::Negated`], [`Expr::PropertyWrapper`]) are
//! stripped before ranking, so a term and its negation always sort next to
//! each other; the adjacency-based contradiction rules depend on this.

use std::cmp::Ordering;

use crate::expr::Expr;

/// Fixed order class per variant. Constants sort first, sentinels last;
/// `Equals` ranks just before `GreaterThanZero` so equality clauses precede
/// range clauses in a sorted conjunction.
fn rank(core: &Expr) -> u8 {
    match core {
        Expr::Bool(_) => 1,
        Expr::Byte(_) => 2,
        Expr::Short(_) => 3,
        Expr::Int(_) => 4,
        Expr::Long(_) => 5,
        Expr::Double(_) => 6,
        Expr::Str(_) => 7,
        Expr::ClassLiteral(_) => 8,
        Expr::Null => 9,
        Expr::Variable(_) => 15,
        Expr::Combined(_) => 20,
        Expr::Array(_) => 21,
        Expr::Conditional { .. } => 22,
        Expr::Sum(..) => 23,
        Expr::Divide(..) => 24,
        Expr::Product(..) => 25,
        // one band: comparison clauses group by subject, equalities first
        Expr::Equals(..) | Expr::GreaterThanZero { .. } => 26,
        Expr::And(_) => 28,
        Expr::Or(_) => 29,
        Expr::InlineResult { .. } => 30,
        Expr::TypeRef(_) => 31,
        Expr::Unknown(_) => 32,
        // wrappers are stripped before ranking
        Expr::Negated(_) | Expr::PropertyWrapper { .. } => unreachable!("rank of wrapper"),
    }
}

/// Strip wrapper variants down to the core expression.
fn strip(mut e: &Expr) -> &Expr {
    loop {
        match e {
            Expr::Negated(inner) => e = inner,
            Expr::PropertyWrapper { inner, .. } => e = inner,
            _ => return e,
        }
    }
}

/// The canonical comparison.
#[must_use]
pub fn compare(a: &Expr, b: &Expr) -> Ordering {
    let ca = strip(a);
    let cb = strip(b);
    let by_core = rank(ca)
        .cmp(&rank(cb))
        .then_with(|| internal_compare(ca, cb));
    if by_core != Ordering::Equal {
        return by_core;
    }
    compare_spines(a, b)
}

/// Structural equality under the canonical order.
#[must_use]
pub fn expr_equals(a: &Expr, b: &Expr) -> bool {
    a == b
}

/// Same-rank structural comparison; recurses through [`compare`] so nested
/// wrappers order consistently.
fn internal_compare(a: &Expr, b: &Expr) -> Ordering {
    match (a, b) {
        (Expr::Bool(x), Expr::Bool(y)) => x.cmp(y),
        (Expr::Byte(x), Expr::Byte(y)) => x.cmp(y),
        (Expr::Short(x), Expr::Short(y)) => x.cmp(y),
        (Expr::Int(x), Expr::Int(y)) => x.cmp(y),
        (Expr::Long(x), Expr::Long(y)) => x.cmp(y),
        (Expr::Double(x), Expr::Double(y)) => x.cmp(y),
        (Expr::Str(x), Expr::Str(y)) => x.cmp(y),
        (Expr::Null, Expr::Null) => Ordering::Equal,
        (Expr::ClassLiteral(x), Expr::ClassLiteral(y)) => x.cmp(y),
        (Expr::Variable(x), Expr::Variable(y)) => x.cmp(y),
        (Expr::Sum(l1, r1), Expr::Sum(l2, r2))
        | (Expr::Product(l1, r1), Expr::Product(l2, r2))
        | (Expr::Divide(l1, r1), Expr::Divide(l2, r2)) => {
            compare(l1, l2).then_with(|| compare(r1, r2))
        }
        // comparison clauses: group by subject so that all clauses over the
        // same variable are adjacent, equalities before ranges; the pairwise
        // And/Or rules depend on exactly this adjacency
        (
            Expr::Equals(..) | Expr::GreaterThanZero { .. },
            Expr::Equals(..) | Expr::GreaterThanZero { .. },
        ) => {
            let sa = comparison_subject(a);
            let sb = comparison_subject(b);
            compare(sa, sb)
                .then_with(|| comparison_kind(a).cmp(&comparison_kind(b)))
                .then_with(|| match (a, b) {
                    (Expr::Equals(l1, r1), Expr::Equals(l2, r2)) => {
                        compare(l1, l2).then_with(|| compare(r1, r2))
                    }
                    (
                        Expr::GreaterThanZero {
                            inner: i1,
                            allow_equals: ae1,
                        },
                        Expr::GreaterThanZero {
                            inner: i2,
                            allow_equals: ae2,
                        },
                    ) => compare(i1, i2).then_with(|| ae1.cmp(ae2)),
                    _ => Ordering::Equal,
                })
        }
        (Expr::And(t1), Expr::And(t2))
        | (Expr::Or(t1), Expr::Or(t2))
        | (Expr::Array(t1), Expr::Array(t2))
        | (Expr::Combined(t1), Expr::Combined(t2)) => compare_lists(t1, t2),
        (
            Expr::Conditional {
                condition: c1,
                if_true: t1,
                if_false: f1,
            },
            Expr::Conditional {
                condition: c2,
                if_true: t2,
                if_false: f2,
            },
        ) => compare(c1, c2)
            .then_with(|| compare(t1, t2))
            .then_with(|| compare(f1, f2)),
        (
            Expr::InlineResult {
                method: m1,
                inner: i1,
                applicability: a1,
            },
            Expr::InlineResult {
                method: m2,
                inner: i2,
                applicability: a2,
            },
        ) => m1.cmp(m2).then_with(|| compare(i1, i2)).then_with(|| a1.cmp(a2)),
        (Expr::TypeRef(x), Expr::TypeRef(y)) => x.cmp(y),
        (Expr::Unknown(x), Expr::Unknown(y)) => x.cmp(y),
        _ => unreachable!("internal_compare across order classes"),
    }
}

/// The expression a comparison clause constrains: the right-hand side of a
/// constant equality, the extracted `x` of a range clause.
fn comparison_subject(e: &Expr) -> &Expr {
    match e {
        Expr::Equals(l, r) => {
            if l.is_constant() {
                r
            } else {
                l
            }
        }
        Expr::GreaterThanZero { inner, .. } => subject_of_inner(inner),
        _ => e,
    }
}

/// Mirror of the `extract` decomposition, reduced to the subject: skip the
/// leading numeric constant of a canonical sum, strip a negation.
fn subject_of_inner(inner: &Expr) -> &Expr {
    let unshifted = match inner {
        Expr::Sum(l, r) if l.as_numeric().is_some() => r,
        other => other,
    };
    match unshifted {
        Expr::Negated(x) => x,
        other => other,
    }
}

fn comparison_kind(e: &Expr) -> u8 {
    match e {
        Expr::Equals(..) => 0,
        _ => 1,
    }
}

fn compare_lists(a: &[std::sync::Arc<Expr>], b: &[std::sync::Arc<Expr>]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let c = compare(x, y);
        if c != Ordering::Equal {
            return c;
        }
    }
    a.len().cmp(&b.len())
}

/// Tie-break equal cores by their wrapper spine: bare before wrapped,
/// `Negated` before `PropertyWrapper`, then recurse; equal spines finally
/// compare property overrides so the order stays antisymmetric.
fn compare_spines(a: &Expr, b: &Expr) -> Ordering {
    match (a, b) {
        (Expr::Negated(x), Expr::Negated(y)) => compare_spines(x, y),
        (
            Expr::PropertyWrapper {
                inner: x,
                overrides: px,
            },
            Expr::PropertyWrapper {
                inner: y,
                overrides: py,
            },
        ) => compare_spines(x, y).then_with(|| px.as_slice().cmp(py.as_slice())),
        (Expr::Negated(_), Expr::PropertyWrapper { .. }) => Ordering::Less,
        (Expr::PropertyWrapper { .. }, Expr::Negated(_)) => Ordering::Greater,
        (Expr::Negated(_) | Expr::PropertyWrapper { .. }, _) => Ordering::Greater,
        (_, Expr::Negated(_) | Expr::PropertyWrapper { .. }) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}
