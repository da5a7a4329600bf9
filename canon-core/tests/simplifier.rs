//! Scenario tests for the boolean simplifier: idempotence, absorption,
//! CNF shape, and the interplay of conjunctions with negated clauses.

mod common;

use canon_core::arith::{negate, product, sum};
use canon_core::boolean::{and, and_append, or, or_append};
use canon_core::cmp::equals;
use canon_core::expr::Expr;

use common::fixture;

#[test]
fn negation_basics() {
    let f = fixture();
    let ctx = &f.ctx;
    let not_a = negate(ctx, f.a.clone());
    assert_eq!(not_a.to_string(), "!(v0)");
    assert_eq!(not_a, negate(ctx, f.a.clone()));
    assert_eq!(negate(ctx, not_a.clone()), f.a);

    // A && A, !A && !A
    assert_eq!(and(ctx, &[f.a.clone(), f.a.clone()]), f.a);
    assert_eq!(and(ctx, &[not_a.clone(), not_a.clone()]), not_a);
    // A && !A, !A && A
    assert_eq!(and(ctx, &[f.a.clone(), not_a.clone()]), Expr::FALSE);
    assert_eq!(and(ctx, &[not_a.clone(), f.a.clone()]), Expr::FALSE);

    // F || T
    assert_eq!(or(ctx, &[Expr::FALSE, Expr::TRUE]), Expr::TRUE);
    // A || A, !A || !A
    assert_eq!(or(ctx, &[f.a.clone(), f.a.clone()]), f.a);
    assert_eq!(or(ctx, &[not_a.clone(), not_a.clone()]), not_a);
    // A || !A, !A || A
    assert_eq!(or(ctx, &[f.a.clone(), not_a.clone()]), Expr::TRUE);
    assert_eq!(or(ctx, &[not_a, f.a.clone()]), Expr::TRUE);
}

#[test]
fn and_of_trues() {
    let f = fixture();
    assert_eq!(and(&f.ctx, &[Expr::TRUE, Expr::TRUE]), Expr::TRUE);
}

#[test]
fn more_complicated_and() {
    let f = fixture();
    let ctx = &f.ctx;
    // A && (A || B) --> A
    let a_and_a_or_b = and(ctx, &[f.a.clone(), or(ctx, &[f.a.clone(), f.b.clone()])]);
    assert_eq!(a_and_a_or_b, f.a);

    // A && (!A || B) --> A && B
    let a_and_not_a_or_b = and(
        ctx,
        &[
            f.a.clone(),
            or(ctx, &[negate(ctx, f.a.clone()), f.b.clone()]),
        ],
    );
    assert_eq!(a_and_not_a_or_b.to_string(), "v0&&v1");

    // D && A && !B && (!A || B) && C --> false
    let collapsed = and(
        ctx,
        &[
            f.d.clone(),
            f.a.clone(),
            negate(ctx, f.b.clone()),
            or(ctx, &[negate(ctx, f.a.clone()), f.b.clone()]),
            f.c.clone(),
        ],
    );
    assert_eq!(collapsed, Expr::FALSE);
}

#[test]
fn expand_and_in_or() {
    let f = fixture();
    let ctx = &f.ctx;
    // A || (B && C) --> (A || B) && (A || C)
    let v = or(
        ctx,
        &[f.a.clone(), and(ctx, &[f.b.clone(), f.c.clone()])],
    );
    assert_eq!(v.to_string(), "(v0||v1)&&(v0||v2)");
}

#[test]
fn cnf_is_insertion_order_independent() {
    let f = fixture();
    let ctx = &f.ctx;
    let (a, b, c, d) = (f.a.clone(), f.b.clone(), f.c.clone(), f.d.clone());
    let expected = "(v0||v2)&&(v0||v3)&&(v1||v2)&&(v1||v3)";

    let o1 = or(
        ctx,
        &[and(ctx, &[a.clone(), b.clone()]), and(ctx, &[c.clone(), d.clone()])],
    );
    assert_eq!(o1.to_string(), expected);
    let o2 = or(
        ctx,
        &[and(ctx, &[b.clone(), a.clone()]), and(ctx, &[d.clone(), c.clone()])],
    );
    assert_eq!(o2.to_string(), expected);
    let o3 = or(
        ctx,
        &[and(ctx, &[d, c]), and(ctx, &[b, a])],
    );
    assert_eq!(o3.to_string(), expected);
}

#[test]
fn cnf_with_negations() {
    let f = fixture();
    let ctx = &f.ctx;
    let not_b = negate(ctx, f.b.clone());
    let not_c = negate(ctx, f.c.clone());
    let expected = "(v0||!(v2))&&(v0||v3)&&(!(v1)||!(v2))&&(!(v1)||v3)";

    let o1 = or(
        ctx,
        &[
            and(ctx, &[f.a.clone(), not_b.clone()]),
            and(ctx, &[not_c.clone(), f.d.clone()]),
        ],
    );
    assert_eq!(o1.to_string(), expected);
    let o2 = or(
        ctx,
        &[
            and(ctx, &[not_b, f.a.clone()]),
            and(ctx, &[f.d.clone(), not_c]),
        ],
    );
    assert_eq!(o2.to_string(), expected);
}

#[test]
fn switch_statement_shape() {
    let f = fixture();
    let ctx = &f.ctx;
    // !A && !B && (A || B) --> false
    let v = and(
        ctx,
        &[
            negate(ctx, f.a.clone()),
            negate(ctx, f.b.clone()),
            or(ctx, &[f.a.clone(), f.b.clone()]),
        ],
    );
    assert_eq!(v, Expr::FALSE);

    // same shape over string equalities
    let c_is_x = equals(ctx, Expr::str("x"), f.o.clone());
    let c_is_x_again = equals(ctx, Expr::str("x"), f.o.clone());
    assert_eq!(c_is_x, c_is_x_again);
    let c_is_y = equals(ctx, Expr::str("y"), f.o.clone());
    let v2 = and(
        ctx,
        &[
            negate(ctx, c_is_x.clone()),
            negate(ctx, c_is_y.clone()),
            or(ctx, &[c_is_x, c_is_y]),
        ],
    );
    assert_eq!(v2, Expr::FALSE);
}

#[test]
fn sum_of_products_shape() {
    let f = fixture();
    let ctx = &f.ctx;
    let aa = sum(ctx, f.i.clone(), f.i.clone());
    assert_eq!(aa.to_string(), "2*v10");
    assert_eq!(sum(ctx, f.i.clone(), Expr::Int(0)), f.i);
    assert_eq!(product(ctx, f.i.clone(), Expr::Int(0)), Expr::Int(0));

    let a3a = sum(
        ctx,
        f.i.clone(),
        product(ctx, Expr::Int(3), f.i.clone()),
    );
    assert_eq!(a3a.to_string(), "4*v10");
}

#[test]
fn append_to_existing_conjunction() {
    let f = fixture();
    let ctx = &f.ctx;
    let base = and(ctx, &[f.a.clone(), f.b.clone()]);
    // appending an already-present term changes nothing
    assert_eq!(and_append(ctx, &base, &[f.a.clone()]), base);
    // appending the negation of a term collapses everything
    assert_eq!(
        and_append(ctx, &base, &[negate(ctx, f.b.clone())]),
        Expr::FALSE
    );
    // appending to "no constraint" is just the term
    assert_eq!(and_append(ctx, &Expr::EMPTY, &[f.a.clone()]), f.a);
    assert_eq!(or_append(ctx, &Expr::EMPTY, &[f.a.clone()]), f.a);
}

#[test]
fn nested_conjunctions_flatten() {
    let f = fixture();
    let ctx = &f.ctx;
    let inner = and(ctx, &[f.a.clone(), f.b.clone()]);
    let outer = and(ctx, &[inner, f.c.clone()]);
    assert_eq!(outer.to_string(), "v0&&v1&&v2");
    let inner_or = or(ctx, &[f.a.clone(), f.b.clone()]);
    let outer_or = or(ctx, &[inner_or, f.c.clone()]);
    assert_eq!(outer_or.to_string(), "v0||v1||v2");
}
