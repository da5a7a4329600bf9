//! The expression tree.
//!
//! Every value the simplifier manipulates is one variant of the closed
//! [`Expr`] sum type. Nodes are immutable; children are shared through
//! [`Arc`] so simplification passes can rebuild term lists cheaply. All
//! composite variants are constructed through smart constructors (`sum`,
//! `product`, `and`, `or`, `greater`, ...) that establish the canonical-form
//! invariants; building variants directly is reserved for constants and for
//! trees already known to be canonical (tests, re-evaluation internals).

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::context::EvalContext;
use crate::types::PrimType;

/// Opaque handle into the outer analysis' variable namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub u32);

/// Opaque handle to a method, carried by inlined method results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(pub u32);

/// Opaque handle to a type, carried by class literals and type references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

/// A double constant with total-order equality and hashing.
///
/// `total_cmp` semantics: `-0.0 < 0.0`, NaNs compare by bit pattern. This is
/// what makes the expression enum `Eq`/`Hash`/sortable.
#[derive(Debug, Clone, Copy)]
pub struct Dbl(pub f64);

impl PartialEq for Dbl {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Dbl {}

impl PartialOrd for Dbl {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dbl {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Dbl {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// The sentinels standing in for values the analysis has not produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnknownKind {
    /// No value at all (e.g. an expression the analysis cannot model).
    NoValue,
    /// The identity placeholder for "no constraint yet"; dropped by the
    /// boolean combinators.
    Empty,
    /// The surrounding iterative analysis has not yet computed this input;
    /// absorbed and propagated, never an error.
    Delayed,
    /// A method body that does not return a value.
    NoReturn,
}

/// Where an inlined method result may be substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Applicability {
    /// Safe to substitute anywhere.
    Everywhere,
    /// Only within the defining type.
    Type,
    /// Only within the defining method.
    Method,
    /// Not safe to substitute; kept for property queries only.
    None,
}

/// Inline term list; most And/Or/Array nodes stay small.
pub type Terms = SmallVec<[Arc<Expr>; 4]>;

/// Sorted property overrides of a [`Expr::PropertyWrapper`].
pub type Overrides = SmallVec<[(crate::property::PropertyKind, crate::property::PropertyValue); 2]>;

/// The universal expression sum type. See the module documentation for the
/// construction discipline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Boolean constant.
    Bool(bool),
    /// 8-bit integer constant.
    Byte(i8),
    /// 16-bit integer constant.
    Short(i16),
    /// 32-bit integer constant.
    Int(i32),
    /// 64-bit integer constant.
    Long(i64),
    /// Double constant.
    Double(Dbl),
    /// String literal.
    Str(Arc<str>),
    /// The null constant.
    Null,
    /// A class literal (`T.class`).
    ClassLiteral(TypeId),
    /// Reference to an externally managed variable.
    Variable(VarId),
    /// `lhs + rhs`, kept in sum-of-products shape with terms sorted by the
    /// canonical order (numeric constant first, left-nested).
    Sum(Arc<Expr>, Arc<Expr>),
    /// `lhs * rhs` with any numeric constant on the left.
    Product(Arc<Expr>, Arc<Expr>),
    /// `lhs / rhs`; division by a constant zero is reported and folds to the
    /// dividend.
    Divide(Arc<Expr>, Arc<Expr>),
    /// `lhs == rhs`, operands in canonical order (constant left).
    Equals(Arc<Expr>, Arc<Expr>),
    /// `inner >= 0` when `allow_equals`, else `inner > 0`. Discrete strict
    /// bounds are normalized away at construction.
    GreaterThanZero {
        /// The compared expression, shaped `x - b` or `b - x`.
        inner: Arc<Expr>,
        /// Non-strict comparison flag.
        allow_equals: bool,
    },
    /// Conjunction; terms flattened, sorted, reduced.
    And(Terms),
    /// Disjunction; terms flattened, sorted, reduced.
    Or(Terms),
    /// Logical or arithmetic negation wrapper. Never wraps another
    /// `Negated`.
    Negated(Arc<Expr>),
    /// Ternary `condition ? if_true : if_false`; the condition is never a
    /// constant or a top-level negation in canonical form.
    Conditional {
        /// The guard.
        condition: Arc<Expr>,
        /// Value when the guard holds.
        if_true: Arc<Expr>,
        /// Value when the guard fails.
        if_false: Arc<Expr>,
    },
    /// An array literal carrier.
    Array(Terms),
    /// Type-unifying carrier of alternative values.
    Combined(Terms),
    /// A value plus the property overrides that exceed what the wrapped
    /// value reports on its own; collapses to the bare value when empty.
    PropertyWrapper {
        /// The wrapped value.
        inner: Arc<Expr>,
        /// Sorted `(kind, value)` pairs.
        overrides: Overrides,
    },
    /// The result of inlining a method body.
    InlineResult {
        /// The inlined method.
        method: MethodId,
        /// Its simplified body.
        inner: Arc<Expr>,
        /// Where substitution is allowed.
        applicability: Applicability,
    },
    /// Reference to a type (used by the outer analysis for casts etc.).
    TypeRef(TypeId),
    /// Sentinel values; see [`UnknownKind`].
    Unknown(UnknownKind),
}

impl Expr {
    /// The `true` constant.
    pub const TRUE: Expr = Expr::Bool(true);
    /// The `false` constant.
    pub const FALSE: Expr = Expr::Bool(false);
    /// The "no constraint yet" placeholder.
    pub const EMPTY: Expr = Expr::Unknown(UnknownKind::Empty);
    /// The "not yet computed" sentinel.
    pub const DELAYED: Expr = Expr::Unknown(UnknownKind::Delayed);

    /// Double constant helper.
    #[must_use]
    pub fn double(value: f64) -> Expr {
        Expr::Double(Dbl(value))
    }

    /// String constant helper.
    #[must_use]
    pub fn str(value: &str) -> Expr {
        Expr::Str(Arc::from(value))
    }

    /// A numeric constant for `value`: `Int` when it fits, `Long` for wider
    /// integral values, `Double` otherwise.
    #[must_use]
    pub fn int_or_double(value: f64) -> Expr {
        if value.fract() == 0.0 && value.abs() < 9.0e18 {
            if value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
                Expr::Int(value as i32)
            } else {
                Expr::Long(value as i64)
            }
        } else {
            Expr::double(value)
        }
    }

    /// Constant nodes (leaves with a fixed value).
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Expr::Bool(_)
                | Expr::Byte(_)
                | Expr::Short(_)
                | Expr::Int(_)
                | Expr::Long(_)
                | Expr::Double(_)
                | Expr::Str(_)
                | Expr::Null
                | Expr::ClassLiteral(_)
        )
    }

    /// The numeric value of a numeric constant.
    #[must_use]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Expr::Byte(v) => Some(f64::from(*v)),
            Expr::Short(v) => Some(f64::from(*v)),
            Expr::Int(v) => Some(f64::from(*v)),
            Expr::Long(v) => Some(*v as f64),
            Expr::Double(d) => Some(d.0),
            _ => None,
        }
    }

    /// True for the literal `true`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Bool(true))
    }

    /// True for the literal `false`.
    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(self, Expr::Bool(false))
    }

    /// True for any [`Expr::Unknown`] sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Expr::Unknown(_))
    }

    /// True for the delay sentinel.
    #[must_use]
    pub fn is_delayed(&self) -> bool {
        matches!(self, Expr::Unknown(UnknownKind::Delayed))
    }

    /// The inner expression of a negation.
    #[must_use]
    pub fn as_negated(&self) -> Option<&Expr> {
        match self {
            Expr::Negated(inner) => Some(inner),
            _ => None,
        }
    }

    /// The operands of an equality.
    #[must_use]
    pub fn as_equals(&self) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::Equals(l, r) => Some((l, r)),
            _ => None,
        }
    }

    /// Whether the node denotes a primitive (non-reference) value; used by
    /// the intrinsic not-null rule.
    #[must_use]
    pub fn is_primitive_valued(&self) -> bool {
        matches!(
            self,
            Expr::Bool(_)
                | Expr::Byte(_)
                | Expr::Short(_)
                | Expr::Int(_)
                | Expr::Long(_)
                | Expr::Double(_)
                | Expr::Str(_)
                | Expr::ClassLiteral(_)
                | Expr::Sum(..)
                | Expr::Product(..)
                | Expr::Divide(..)
                | Expr::Equals(..)
                | Expr::GreaterThanZero { .. }
                | Expr::And(_)
                | Expr::Or(_)
                | Expr::Negated(_)
        )
    }

    /// Resolve the primitive type of the expression, consulting the context
    /// for variable types. `None` for unknowns.
    #[must_use]
    pub fn prim_type(&self, ctx: &dyn EvalContext) -> Option<PrimType> {
        match self {
            Expr::Bool(_) => Some(PrimType::Bool),
            Expr::Byte(_) => Some(PrimType::Byte),
            Expr::Short(_) => Some(PrimType::Short),
            Expr::Int(_) => Some(PrimType::Int),
            Expr::Long(_) => Some(PrimType::Long),
            Expr::Double(_) => Some(PrimType::Double),
            Expr::Str(_) => Some(PrimType::Str),
            Expr::Null | Expr::ClassLiteral(_) | Expr::TypeRef(_) => Some(PrimType::Object),
            Expr::Variable(v) => Some(ctx.variable_type(*v)),
            Expr::Sum(l, r) | Expr::Product(l, r) | Expr::Divide(l, r) => {
                match (l.prim_type(ctx), r.prim_type(ctx)) {
                    (Some(a), Some(b)) => Some(a.widest(b)),
                    (one, other) => one.or(other),
                }
            }
            Expr::Equals(..) | Expr::GreaterThanZero { .. } | Expr::And(_) | Expr::Or(_) => {
                Some(PrimType::Bool)
            }
            Expr::Negated(inner) => inner.prim_type(ctx),
            Expr::Conditional {
                if_true, if_false, ..
            } => match (if_true.prim_type(ctx), if_false.prim_type(ctx)) {
                (Some(a), Some(b)) if a == b => Some(a),
                (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => Some(a.widest(b)),
                (None, _) | (_, None) => None,
                _ => Some(PrimType::Object),
            },
            Expr::Array(_) => Some(PrimType::Object),
            Expr::Combined(elements) => elements
                .first()
                .and_then(|e| e.prim_type(ctx))
                .map(|first| {
                    elements
                        .iter()
                        .skip(1)
                        .filter_map(|e| e.prim_type(ctx))
                        .fold(first, |acc, t| if acc == t { acc } else { acc.widest(t) })
                }),
            Expr::PropertyWrapper { inner, .. } | Expr::InlineResult { inner, .. } => {
                inner.prim_type(ctx)
            }
            Expr::Unknown(_) => None,
        }
    }

    /// Whether the expression may legally appear in a boolean combinator.
    /// Unknown sentinels and expressions whose type is still undetermined
    /// (they carry a delayed part) pass; everything else must resolve to a
    /// boolean type.
    #[must_use]
    pub fn is_boolean_typed(&self, ctx: &dyn EvalContext) -> bool {
        !matches!(self.prim_type(ctx), Some(t) if t != PrimType::Bool)
    }

    /// Free variables of the expression.
    #[must_use]
    pub fn variables(&self) -> FxHashSet<VarId> {
        let mut out = FxHashSet::default();
        self.visit(&mut |e| {
            if let Expr::Variable(v) = e {
                out.insert(*v);
            }
            true
        });
        out
    }

    /// Pre-order visit; the callback returns `false` to prune a subtree.
    pub fn visit(&self, f: &mut dyn FnMut(&Expr) -> bool) {
        if !f(self) {
            return;
        }
        match self {
            Expr::Sum(l, r)
            | Expr::Product(l, r)
            | Expr::Divide(l, r)
            | Expr::Equals(l, r) => {
                l.visit(f);
                r.visit(f);
            }
            Expr::GreaterThanZero { inner, .. }
            | Expr::Negated(inner)
            | Expr::PropertyWrapper { inner, .. }
            | Expr::InlineResult { inner, .. } => inner.visit(f),
            Expr::And(terms) | Expr::Or(terms) | Expr::Array(terms) | Expr::Combined(terms) => {
                for t in terms {
                    t.visit(f);
                }
            }
            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                condition.visit(f);
                if_true.visit(f);
                if_false.visit(f);
            }
            _ => {}
        }
    }
}

fn fmt_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.fract() == 0.0 && value.abs() < 1.0e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{value}")
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    if matches!(
        e,
        Expr::Sum(..) | Expr::And(_) | Expr::Or(_) | Expr::Conditional { .. }
    ) {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

impl fmt::Display for Expr {
    /// The minimal canonical rendering used for debugging and test
    /// assertions. Comparisons are rewritten from the internal `x - b >= 0`
    /// shape back to `x>=b` / `x<=b`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Byte(v) => write!(f, "{v}"),
            Expr::Short(v) => write!(f, "{v}"),
            Expr::Int(v) => write!(f, "{v}"),
            Expr::Long(v) => write!(f, "{v}"),
            Expr::Double(d) => fmt_number(f, d.0),
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::Null => write!(f, "null"),
            Expr::ClassLiteral(t) => write!(f, "class#{}", t.0),
            Expr::Variable(v) => write!(f, "v{}", v.0),
            Expr::Sum(l, r) => {
                write!(f, "{l}")?;
                match &**r {
                    Expr::Negated(x) => {
                        write!(f, "-")?;
                        fmt_operand(f, x)
                    }
                    other => {
                        if other.as_numeric().is_some_and(|n| n < 0.0) {
                            write!(f, "{other}")
                        } else {
                            write!(f, "+{other}")
                        }
                    }
                }
            }
            Expr::Product(l, r) => {
                fmt_operand(f, l)?;
                write!(f, "*")?;
                fmt_operand(f, r)
            }
            Expr::Divide(l, r) => {
                fmt_operand(f, l)?;
                write!(f, "/")?;
                fmt_operand(f, r)
            }
            Expr::Equals(l, r) => write!(f, "{l}=={r}"),
            Expr::GreaterThanZero { inner, allow_equals } => {
                let xb = crate::cmp::gt0::extract_inner(inner);
                let op = match (xb.less_than, *allow_equals) {
                    (false, true) => ">=",
                    (false, false) => ">",
                    (true, true) => "<=",
                    (true, false) => "<",
                };
                fmt_operand(f, &xb.x)?;
                write!(f, "{op}")?;
                fmt_number(f, xb.b)
            }
            Expr::And(terms) => {
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&&")?;
                    }
                    fmt_operand(f, t)?;
                }
                Ok(())
            }
            Expr::Or(terms) => {
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, "||")?;
                    }
                    fmt_operand(f, t)?;
                }
                Ok(())
            }
            Expr::Negated(inner) => match &**inner {
                Expr::Equals(l, r) => write!(f, "{l}!={r}"),
                other => write!(f, "!({other})"),
            },
            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                fmt_operand(f, condition)?;
                write!(f, "?")?;
                fmt_operand(f, if_true)?;
                write!(f, ":")?;
                fmt_operand(f, if_false)
            }
            Expr::Array(terms) => {
                write!(f, "[")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, "]")
            }
            Expr::Combined(terms) => {
                write!(f, "<")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ">")
            }
            Expr::PropertyWrapper { inner, .. } => write!(f, "{inner}"),
            Expr::InlineResult { method, inner, .. } => {
                write!(f, "inline#{}({inner})", method.0)
            }
            Expr::TypeRef(t) => write!(f, "type#{}", t.0),
            Expr::Unknown(kind) => match kind {
                UnknownKind::NoValue => write!(f, "<no value>"),
                UnknownKind::Empty => write!(f, "<empty>"),
                UnknownKind::Delayed => write!(f, "<delayed>"),
                UnknownKind::NoReturn => write!(f, "<no return>"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_or_double_picks_narrowest() {
        assert_eq!(Expr::int_or_double(3.0), Expr::Int(3));
        assert_eq!(Expr::int_or_double(-4.0), Expr::Int(-4));
        assert_eq!(Expr::int_or_double(3.5), Expr::double(3.5));
        assert_eq!(
            Expr::int_or_double(f64::from(i32::MAX) + 1.0),
            Expr::Long(i64::from(i32::MAX) + 1)
        );
    }

    #[test]
    fn numeric_accessor() {
        assert_eq!(Expr::Int(7).as_numeric(), Some(7.0));
        assert_eq!(Expr::Byte(-1).as_numeric(), Some(-1.0));
        assert_eq!(Expr::str("x").as_numeric(), None);
    }

    #[test]
    fn variables_are_collected() {
        let x = Expr::Variable(VarId(1));
        let y = Expr::Variable(VarId(2));
        let sum = Expr::Sum(Arc::new(x), Arc::new(Expr::Negated(Arc::new(y))));
        let vars = sum.variables();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains(&VarId(1)) && vars.contains(&VarId(2)));
    }

    #[test]
    fn dbl_total_order() {
        assert_eq!(Dbl(1.5), Dbl(1.5));
        assert_ne!(Dbl(0.0), Dbl(-0.0));
        assert!(Dbl(-0.0) < Dbl(0.0));
    }
}
