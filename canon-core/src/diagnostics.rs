//! Analysis diagnostics.
//!
//! The simplifier never aborts on a data condition: division by zero, a
//! conditional whose guard folds to a constant, and similar findings are
//! reported through the evaluation context as [`Diagnostic`] values while
//! simplification continues with a fallback expression. Contract violations
//! (a non-boolean operand handed to a boolean combinator) are panics, not
//! diagnostics; they indicate a caller bug.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use thiserror::Error;

/// Severity of a reported condition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// Informational finding.
    Info,
    /// Suspicious but recoverable condition.
    Warning,
    /// Definite problem in the analysed code.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The reportable conditions the core can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A ternary's condition simplified to a boolean constant; one branch is
    /// dead.
    #[error("inline conditional evaluates to constant")]
    InlineConditionEvaluatesToConstant,
    /// Division with a constant-zero divisor; the dividend is used as the
    /// fallback value.
    #[error("division by zero")]
    DivisionByZero,
    /// A sub-expression of a condition simplified to a boolean constant.
    #[error("part of condition evaluates to constant")]
    ConditionPartEvaluatesToConstant,
}

impl DiagnosticKind {
    /// The default severity this kind is reported with.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::DivisionByZero => Severity::Error,
            DiagnosticKind::InlineConditionEvaluatesToConstant
            | DiagnosticKind::ConditionPartEvaluatesToConstant => Severity::Warning,
        }
    }
}

/// Opaque source location handle, assigned by the outer analysis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Location(pub u32);

impl Location {
    /// Location used when the outer analysis supplies none.
    pub const UNKNOWN: Location = Location(u32::MAX);
}

/// A single reported finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity, defaulted from the kind.
    pub severity: Severity,
    /// What was found.
    pub kind: DiagnosticKind,
    /// Where it was found.
    pub location: Location,
}

impl Diagnostic {
    /// Build a diagnostic with the kind's default severity.
    #[must_use]
    pub fn new(kind: DiagnosticKind, location: Location) -> Self {
        Diagnostic {
            severity: kind.severity(),
            kind,
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.kind)
    }
}

/// Accumulating sink for diagnostics.
///
/// Context implementations that want to collect reports can embed one of
/// these; interior mutability keeps the reporting call `&self` so the
/// context can be threaded immutably through every smart constructor.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    collected: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.collected.borrow_mut().push(diagnostic);
    }

    /// Number of diagnostics recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collected.borrow().len()
    }

    /// True if nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collected.borrow().is_empty()
    }

    /// Drain all recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.collected.borrow_mut())
    }

    /// Snapshot of the recorded diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.collected.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_severity_defaults() {
        assert_eq!(
            DiagnosticKind::DivisionByZero.severity(),
            Severity::Error
        );
        assert_eq!(
            DiagnosticKind::InlineConditionEvaluatesToConstant.severity(),
            Severity::Warning
        );
    }

    #[test]
    fn sink_collects_and_drains() {
        let sink = DiagnosticSink::new();
        assert!(sink.is_empty());
        sink.push(Diagnostic::new(
            DiagnosticKind::DivisionByZero,
            Location(7),
        ));
        assert_eq!(sink.len(), 1);
        let drained = sink.take();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].location, Location(7));
        assert!(sink.is_empty());
    }
}
