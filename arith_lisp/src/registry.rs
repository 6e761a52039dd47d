use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::Arc,
};

use itertools::Itertools;

use crate::{builtin::Builtin, eval::Eval};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Failure reported by an operator function; the registry attaches the
/// operator name and arguments when turning it into an [`Eval`] error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Domain {
    #[error("division by zero")]
    DivisionByZero,
    #[error("argument out of domain")]
    OutOfDomain,
}

pub type OperatorFn = dyn Fn(&[f64]) -> Result<f64, Domain> + Send + Sync;

#[derive(Clone)]
pub struct Operator {
    name: String,
    arity: Arity,
    func: Arc<OperatorFn>,
}

impl Debug for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl Operator {
    pub fn new<F>(name: impl Into<String>, arity: Arity, func: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, Domain> + Send + Sync + 'static,
    {
        Operator {
            name: name.into(),
            arity,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn apply(&self, args: &[f64]) -> Result<f64, Eval> {
        if !self.arity.accepts(args.len()) {
            return Err(Eval::Arity {
                operator: self.name.clone(),
                expected: self.arity,
                got: args.len(),
            });
        }
        match (self.func)(args) {
            Ok(value) if value.is_nan() => Err(Eval::Domain {
                operator: self.name.clone(),
                args: args.to_vec(),
            }),
            Ok(value) if value.is_finite() || args.iter().any(|a| !a.is_finite()) => Ok(value),
            Err(Domain::DivisionByZero) => Err(Eval::DivisionByZero {
                operator: self.name.clone(),
                args: args.to_vec(),
            }),
            Ok(_) | Err(Domain::OutOfDomain) => Err(Eval::Domain {
                operator: self.name.clone(),
                args: args.to_vec(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Registry {
    operators: HashMap<String, Operator>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        for builtin in Builtin::all() {
            registry.register(builtin.as_str(), builtin.arity(), builtin.get_func());
        }
        registry
    }
}

impl Registry {
    pub fn empty() -> Self {
        Registry {
            operators: HashMap::new(),
        }
    }

    /// Inserts `func` under `name`, returning the operator it replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, arity: Arity, func: F) -> Option<Operator>
    where
        F: Fn(&[f64]) -> Result<f64, Domain> + Send + Sync + 'static,
    {
        let operator = Operator::new(name, arity, func);
        let name = operator.name.clone();
        let replaced = self.operators.insert(name.clone(), operator);
        tracing::debug!(
            operator = %name,
            %arity,
            replaced = replaced.is_some(),
            "registered operator"
        );
        replaced
    }

    pub fn lookup(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    pub fn is_operator(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(String::as_str).sorted()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
