//! Primitive type lattice.
//!
//! The simplifier only needs a handful of type facts: whether an expression
//! is boolean (the boolean combinators assert this), whether a numeric type
//! is discrete (strict inequalities over discrete domains are normalized to
//! non-strict ones by shifting the bound), and how two numeric types widen
//! when combined in a sum or product.

use serde::{Deserialize, Serialize};

/// The primitive types the simplifier distinguishes.
///
/// Anything that is not a primitive (references, arrays of objects, ...)
/// is `Object`; the core never inspects object types beyond null checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrimType {
    /// `bool`
    Bool,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 64-bit float
    Double,
    /// String literal type
    Str,
    /// Any non-primitive type
    Object,
}

impl PrimType {
    /// Integer-family types: strict bounds over these shift by one instead
    /// of carrying a strictness flag.
    #[must_use]
    pub const fn is_discrete(self) -> bool {
        matches!(
            self,
            PrimType::Byte | PrimType::Short | PrimType::Int | PrimType::Long
        )
    }

    /// Numeric types (discrete or floating).
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_discrete() || matches!(self, PrimType::Double)
    }

    /// The widest of two numeric types; any double operand widens the
    /// result to double. Non-numeric operands yield the other side, so a
    /// partially typed tree still resolves to something usable.
    #[must_use]
    pub fn widest(self, other: PrimType) -> PrimType {
        if !self.is_numeric() {
            return other;
        }
        if !other.is_numeric() {
            return self;
        }
        if self == PrimType::Double || other == PrimType::Double {
            return PrimType::Double;
        }
        // discrete ranks grow with the enum order
        self.max(other)
    }
}
