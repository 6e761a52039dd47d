//! An interpreter for a small LISP-like arithmetic language:
//! `(MULT 2 (ADD x 1))` evaluated against per-call variable bindings and an
//! extensible table of numeric operators.

mod bindings;
mod builtin;
mod eval;
mod expression;
mod format;
mod node;
pub mod parser;
mod registry;

pub use bindings::{substitute, Bindings, IntoBindings};
pub use builtin::Builtin;
pub use eval::{evaluate, Eval, Value};
pub use expression::Expression;
pub use format::{format, format_compact};
pub use node::{parse_number, Node, MAX_DEPTH};
pub use parser::{parse, Error, Syntax};
pub use registry::{Arity, Domain, Operator, OperatorFn, Registry};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Full {
    #[error(transparent)]
    Syntax(#[from] Error<Syntax>),
    #[error(transparent)]
    Eval(#[from] Eval),
}

/// Owns an operator registry and evaluates source text against it.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    registry: Registry,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Interpreter { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, arity: Arity, func: F) -> Option<Operator>
    where
        F: Fn(&[f64]) -> Result<f64, Domain> + Send + Sync + 'static,
    {
        self.registry.register(name, arity, func)
    }

    pub fn evaluate(&self, expression: &Expression, bindings: &Bindings) -> Result<Value, Eval> {
        expression.evaluate(bindings, &self.registry)
    }

    pub fn interpret(&self, source: &str, bindings: &Bindings) -> Result<Value, Full> {
        let tree = parse(source)?;
        Ok(evaluate(&tree, bindings, &self.registry)?)
    }
}

/// Parses and evaluates `source` with the built-in operators.
pub fn interpret(source: &str, bindings: &Bindings) -> Result<Value, Full> {
    Interpreter::new().interpret(source, bindings)
}
