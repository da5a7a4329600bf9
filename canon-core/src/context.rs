//! The evaluation context capability.
//!
//! Every smart constructor takes the context as an explicit parameter; the
//! core holds no global state. The outer analysis implements [`EvalContext`]
//! to supply variable types, the ambient path condition, property lookups
//! and a diagnostic sink. [`StaticContext`] is a self-contained
//! implementation for tests and examples.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

use crate::diagnostics::{Diagnostic, DiagnosticSink, Location};
use crate::expr::{Expr, VarId};
use crate::property::{PropertyKind, PropertyValue};
use crate::types::PrimType;

/// Capabilities the simplifier needs from the surrounding analysis.
pub trait EvalContext {
    /// The declared type of a variable. `PrimType::Object` for anything the
    /// analysis does not type as a primitive.
    fn variable_type(&self, var: VarId) -> PrimType;

    /// The ambient path condition; [`Expr::EMPTY`] when there is none.
    fn current_state(&self) -> Expr {
        Expr::EMPTY
    }

    /// The location diagnostics are attributed to.
    fn location(&self) -> Location {
        Location::UNKNOWN
    }

    /// Sink for reportable analysis conditions. Implementations typically
    /// accumulate into a [`DiagnosticSink`].
    fn report(&self, diagnostic: Diagnostic);

    /// Property lookup for a variable; [`PropertyValue::UNKNOWN`] when the
    /// analysis has nothing.
    fn variable_property(&self, var: VarId, property: PropertyKind) -> PropertyValue;
}

/// A context with statically configured variable types and properties.
///
/// Used by the test suites and usable by callers that run the simplifier
/// outside a full analysis.
#[derive(Debug)]
pub struct StaticContext {
    types: FxHashMap<VarId, PrimType>,
    properties: FxHashMap<(VarId, PropertyKind), PropertyValue>,
    state: RefCell<Expr>,
    location: Location,
    /// Collected diagnostics.
    pub sink: DiagnosticSink,
}

impl Default for StaticContext {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticContext {
    /// Empty context: all variables are `Object`, no state, no properties.
    #[must_use]
    pub fn new() -> Self {
        StaticContext {
            types: FxHashMap::default(),
            properties: FxHashMap::default(),
            state: RefCell::new(Expr::EMPTY),
            location: Location::UNKNOWN,
            sink: DiagnosticSink::new(),
        }
    }

    /// Declare a variable's type and return its expression.
    pub fn declare(&mut self, var: VarId, ty: PrimType) -> Expr {
        self.types.insert(var, ty);
        Expr::Variable(var)
    }

    /// Set a property for a variable.
    pub fn set_property(&mut self, var: VarId, kind: PropertyKind, value: PropertyValue) {
        self.properties.insert((var, kind), value);
    }

    /// Replace the ambient state.
    pub fn set_state(&self, state: Expr) {
        *self.state.borrow_mut() = state;
    }
}

impl EvalContext for StaticContext {
    fn variable_type(&self, var: VarId) -> PrimType {
        self.types.get(&var).copied().unwrap_or(PrimType::Object)
    }

    fn current_state(&self) -> Expr {
        self.state.borrow().clone()
    }

    fn location(&self) -> Location {
        self.location
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.sink.push(diagnostic);
    }

    fn variable_property(&self, var: VarId, property: PropertyKind) -> PropertyValue {
        self.properties
            .get(&(var, property))
            .copied()
            .unwrap_or(PropertyValue::UNKNOWN)
    }
}

/// Tees diagnostics into a local buffer while delegating every query to the
/// wrapped context. Re-evaluation uses this to hand the caller the side
/// effects produced while re-simplifying, without double-reporting into the
/// outer sink.
pub struct RecordingContext<'a> {
    inner: &'a dyn EvalContext,
    recorded: DiagnosticSink,
}

impl<'a> RecordingContext<'a> {
    /// Wrap a context.
    #[must_use]
    pub fn new(inner: &'a dyn EvalContext) -> Self {
        RecordingContext {
            inner,
            recorded: DiagnosticSink::new(),
        }
    }

    /// Drain everything reported through this wrapper.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.recorded.take()
    }
}

impl EvalContext for RecordingContext<'_> {
    fn variable_type(&self, var: VarId) -> PrimType {
        self.inner.variable_type(var)
    }

    fn current_state(&self) -> Expr {
        self.inner.current_state()
    }

    fn location(&self) -> Location {
        self.inner.location()
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.recorded.push(diagnostic);
    }

    fn variable_property(&self, var: VarId, property: PropertyKind) -> PropertyValue {
        self.inner.variable_property(var, property)
    }
}
