//! canon-core — canonical symbolic expression simplifier.
//!
//! The simplification core of a static-analysis engine: expression trees
//! built from logical connectives, equality, numeric comparisons, sums,
//! products and ternaries are normalized into a canonical minimal form.
//! Tautologies and contradictions fold to constants, redundant terms
//! cancel, overlapping numeric ranges merge, and the strict total order
//! over all variants makes two semantically equivalent expressions compare
//! as structurally equal.
//!
//! The simplifier is pure: nodes are immutable, every operation builds a
//! new tree, and repeated simplification reaches a fixed point. The
//! surrounding analysis supplies variable types, the ambient path
//! condition, property lookups and a diagnostic sink through the
//! [`context::EvalContext`] capability, passed explicitly into every smart
//! constructor.
//!
//! # Building expressions
//!
//! ```
//! use canon_core::boolean::and;
//! use canon_core::cmp::gt0::greater;
//! use canon_core::context::StaticContext;
//! use canon_core::expr::{Expr, VarId};
//! use canon_core::types::PrimType;
//!
//! let mut ctx = StaticContext::new();
//! let x = ctx.declare(VarId(0), PrimType::Int);
//!
//! // x >= 3 && x >= 5 merges to the tighter bound
//! let ge3 = greater(&ctx, x.clone(), Expr::Int(3), true);
//! let ge5 = greater(&ctx, x, Expr::Int(5), true);
//! let conjunction = and(&ctx, &[ge3, ge5.clone()]);
//! assert_eq!(conjunction, ge5);
//! ```
//!
//! # Contradiction detection
//!
//! ```
//! use canon_core::arith::negate;
//! use canon_core::boolean::{and, or};
//! use canon_core::context::StaticContext;
//! use canon_core::expr::{Expr, VarId};
//! use canon_core::types::PrimType;
//!
//! let mut ctx = StaticContext::new();
//! let a = ctx.declare(VarId(0), PrimType::Bool);
//! let not_a = negate(&ctx, a.clone());
//!
//! assert_eq!(and(&ctx, &[a.clone(), not_a.clone()]), Expr::FALSE);
//! assert_eq!(or(&ctx, &[a, not_a]), Expr::TRUE);
//! ```

#![warn(missing_docs)]

pub mod arith;
pub mod boolean;
pub mod cmp;
pub mod composite;
pub mod conditional;
pub mod context;
pub mod diagnostics;
pub mod expr;
pub mod filter;
pub mod ordering;
pub mod property;
pub mod reeval;
pub mod types;

pub use context::{EvalContext, StaticContext};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Location, Severity};
pub use expr::{Applicability, Expr, MethodId, TypeId, UnknownKind, VarId};
pub use ordering::{compare, expr_equals};
pub use reeval::{re_evaluate, ReEvalResult, TranslationMap};
pub use types::PrimType;
