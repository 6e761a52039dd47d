use std::{fmt::Display, iter};

use crate::{
    bindings::Bindings,
    format::format,
    node::{parse_number, Node, MAX_DEPTH},
    registry::{Arity, Registry},
};

/// Result of evaluating a tree: either a number, or a structure whose head was
/// not a registered operator and is returned as data.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Residual(Node),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Residual(_) => None,
        }
    }

    pub fn as_residual(&self) -> Option<&Node> {
        match self {
            Value::Number(_) => None,
            Value::Residual(node) => Some(node),
        }
    }

    pub fn is_residual(&self) -> bool {
        matches!(self, Value::Residual(_))
    }

    pub fn into_node(self) -> Node {
        match self {
            Value::Number(n) => Node::number(n),
            Value::Residual(node) => node,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Residual(node) => write!(f, "{}", format(node)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Eval {
    #[error("unresolved variable `{0}`")]
    UnresolvedVariable(String),
    #[error("`{operator}` expects a number, got `{arg}`")]
    NotANumber { operator: String, arg: String },
    #[error("`{operator}` expects {expected} argument(s), got {got}")]
    Arity {
        operator: String,
        expected: Arity,
        got: usize,
    },
    #[error("division by zero in `{operator}` with arguments {args:?}")]
    DivisionByZero { operator: String, args: Vec<f64> },
    #[error("`{operator}` is undefined for arguments {args:?}")]
    Domain { operator: String, args: Vec<f64> },
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

fn resolve_atom(text: &str, bindings: &Bindings) -> Value {
    match parse_number(text).or_else(|| bindings.get(text).copied()) {
        Some(n) => Value::Number(n),
        None => Value::Residual(Node::atom(text)),
    }
}

fn reduce(
    node: &Node,
    bindings: &Bindings,
    registry: &Registry,
    depth: usize,
) -> Result<Value, Eval> {
    match node {
        Node::Atom(text) => Ok(resolve_atom(text, bindings)),
        Node::List(elements) => reduce_list(elements, bindings, registry, depth + 1),
    }
}

fn numeric(operator: &str, arg: Value) -> Result<f64, Eval> {
    match arg {
        Value::Number(n) => Ok(n),
        Value::Residual(Node::Atom(name)) => Err(Eval::UnresolvedVariable(name)),
        Value::Residual(list) => Err(Eval::NotANumber {
            operator: operator.to_owned(),
            arg: list.to_string(),
        }),
    }
}

fn reduce_list(
    elements: &[Node],
    bindings: &Bindings,
    registry: &Registry,
    depth: usize,
) -> Result<Value, Eval> {
    if depth > MAX_DEPTH {
        return Err(Eval::TooDeep(MAX_DEPTH));
    }
    let Some((head, rest)) = elements.split_first() else {
        return Ok(Value::Residual(Node::List(Vec::new())));
    };
    // The head is only reduced when it is itself a list; a symbol in head
    // position names an operator and is never looked up in `bindings`.
    let head = match head {
        Node::List(inner) => reduce_list(inner, bindings, registry, depth + 1)?.into_node(),
        atom => atom.clone(),
    };
    let args = rest
        .iter()
        .map(|arg| reduce(arg, bindings, registry, depth))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(operator) = head.as_symbol().and_then(|name| registry.lookup(name)) {
        let numbers = args
            .into_iter()
            .map(|arg| numeric(operator.name(), arg))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::trace!(operator = operator.name(), args = ?numbers, "applying operator");
        return operator.apply(&numbers).map(Value::Number);
    }

    tracing::trace!(head = %head, "unknown operator, keeping list as data");
    // Number literals keep their source spelling in the residual.
    let elements = rest.iter().zip(args).map(|(original, value)| match value {
        Value::Number(_) if original.as_number().is_some() => original.clone(),
        value => value.into_node(),
    });
    Ok(Value::Residual(Node::List(
        iter::once(head).chain(elements).collect(),
    )))
}

/// Reduces `node` children-first. The tree is not modified; lists whose head
/// is not a registered operator come back as [`Value::Residual`].
pub fn evaluate(node: &Node, bindings: &Bindings, registry: &Registry) -> Result<Value, Eval> {
    #[cfg(feature = "tracy")]
    profiling::scope!("evaluate");
    reduce(node, bindings, registry, 0)
}
