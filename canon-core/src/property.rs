//! Opaque value properties.
//!
//! The outer analysis attaches numeric properties (nullability, immutability
//! levels, ...) to values. The core never interprets them beyond ordering;
//! the single exception is the not-null ladder, which the conditional's
//! pattern matching refines (`null == x ? a : x` knows the else-branch is
//! not null).

use serde::{Deserialize, Serialize};

use crate::conditional;
use crate::context::EvalContext;
use crate::expr::Expr;

/// Identifies a property dimension. The numeric space belongs to the outer
/// analysis; only [`PropertyKind::NOT_NULL`] carries meaning inside the core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PropertyKind(pub u16);

impl PropertyKind {
    /// The nullability dimension.
    pub const NOT_NULL: PropertyKind = PropertyKind(0);
}

/// A property level. Higher is stronger; combining values across branches
/// or array elements takes the minimum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PropertyValue(pub i32);

impl PropertyValue {
    /// Nothing is known about the property.
    pub const UNKNOWN: PropertyValue = PropertyValue(-1);
    /// Weakest level on the not-null ladder: the value may be null.
    pub const NULLABLE: PropertyValue = PropertyValue(0);
    /// The value is known not to be null.
    pub const NOT_NULL: PropertyValue = PropertyValue(1);

    /// Minimum of two levels, ignoring unknowns.
    #[must_use]
    pub fn min_known(self, other: PropertyValue) -> PropertyValue {
        if self == PropertyValue::UNKNOWN {
            return other;
        }
        if other == PropertyValue::UNKNOWN {
            return self;
        }
        self.min(other)
    }
}

/// Property lookup over the expression tree.
///
/// Composite nodes dispatch structurally; leaves that the core cannot judge
/// (variables, type references) are delegated to the context.
pub fn get_property(ctx: &dyn EvalContext, expr: &Expr, kind: PropertyKind) -> PropertyValue {
    match expr {
        Expr::PropertyWrapper { inner, overrides } => {
            if let Some((_, v)) = overrides.iter().find(|(k, _)| *k == kind) {
                *v
            } else {
                get_property(ctx, inner, kind)
            }
        }
        Expr::Conditional { .. } => conditional::conditional_property(ctx, expr, kind),
        Expr::Combined(elements) => elements
            .iter()
            .map(|e| get_property(ctx, e, kind))
            .fold(PropertyValue::UNKNOWN, PropertyValue::min_known),
        Expr::Array(_) if kind == PropertyKind::NOT_NULL => PropertyValue::NOT_NULL,
        Expr::Array(elements) => elements
            .iter()
            .map(|e| get_property(ctx, e, kind))
            .fold(PropertyValue::UNKNOWN, PropertyValue::min_known),
        Expr::InlineResult { inner, .. } => get_property(ctx, inner, kind),
        Expr::Negated(inner) => get_property(ctx, inner, kind),
        Expr::Variable(var) => ctx.variable_property(*var, kind),
        Expr::Null if kind == PropertyKind::NOT_NULL => PropertyValue::NULLABLE,
        // every other constant and every primitive-valued operator node
        _ if kind == PropertyKind::NOT_NULL && expr.is_primitive_valued() => {
            PropertyValue::NOT_NULL
        }
        _ => PropertyValue::UNKNOWN,
    }
}

/// Whether the context guarantees the expression is not null.
pub fn is_not_null(ctx: &dyn EvalContext, expr: &Expr) -> bool {
    get_property(ctx, expr, PropertyKind::NOT_NULL) >= PropertyValue::NOT_NULL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticContext;
    use crate::expr::VarId;

    #[test]
    fn constants_are_not_null() {
        let ctx = StaticContext::new();
        assert!(is_not_null(&ctx, &Expr::Int(3)));
        assert!(is_not_null(&ctx, &Expr::Bool(true)));
        assert!(!is_not_null(&ctx, &Expr::Null));
    }

    #[test]
    fn variables_delegate_to_context() {
        let mut ctx = StaticContext::new();
        let v = VarId(1);
        assert!(!is_not_null(&ctx, &Expr::Variable(v)));
        ctx.set_property(v, PropertyKind::NOT_NULL, PropertyValue::NOT_NULL);
        assert!(is_not_null(&ctx, &Expr::Variable(v)));
    }

    #[test]
    fn min_known_ignores_unknown() {
        assert_eq!(
            PropertyValue::UNKNOWN.min_known(PropertyValue::NOT_NULL),
            PropertyValue::NOT_NULL
        );
        assert_eq!(
            PropertyValue::NULLABLE.min_known(PropertyValue::NOT_NULL),
            PropertyValue::NULLABLE
        );
    }
}
