//! Shared fixture for the integration suites: a static context with a few
//! boolean variables, integer variables and object variables, mirroring
//! the way every scenario in the suite starts.

use canon_core::context::StaticContext;
use canon_core::expr::{Expr, VarId};
use canon_core::property::{PropertyKind, PropertyValue};
use canon_core::types::PrimType;

/// The common variable set.
#[allow(dead_code)]
pub struct Fixture {
    /// The context all smart constructors run against.
    pub ctx: StaticContext,
    /// Boolean variables.
    pub a: Expr,
    pub b: Expr,
    pub c: Expr,
    pub d: Expr,
    /// Integer variables.
    pub i: Expr,
    pub j: Expr,
    /// Object variables; `p` is known not-null.
    pub o: Expr,
    pub p: Expr,
}

pub fn fixture() -> Fixture {
    let mut ctx = StaticContext::new();
    let a = ctx.declare(VarId(0), PrimType::Bool);
    let b = ctx.declare(VarId(1), PrimType::Bool);
    let c = ctx.declare(VarId(2), PrimType::Bool);
    let d = ctx.declare(VarId(3), PrimType::Bool);
    let i = ctx.declare(VarId(10), PrimType::Int);
    let j = ctx.declare(VarId(11), PrimType::Int);
    let o = ctx.declare(VarId(20), PrimType::Object);
    let p = ctx.declare(VarId(21), PrimType::Object);
    ctx.set_property(VarId(21), PropertyKind::NOT_NULL, PropertyValue::NOT_NULL);
    Fixture {
        ctx,
        a,
        b,
        c,
        d,
        i,
        j,
        o,
        p,
    }
}
