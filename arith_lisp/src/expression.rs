use std::{cell::OnceCell, fmt::Display};

use crate::{
    bindings::{substitute, Bindings},
    eval::{evaluate, Eval, Value},
    format::format,
    node::Node,
    parser::{parse, Error, Syntax},
    registry::Registry,
};

/// A parsed expression template that can be evaluated repeatedly with
/// different bindings.
#[derive(Clone, Debug)]
pub struct Expression {
    source: String,
    tree: Node,
    display: OnceCell<String>,
}

impl Expression {
    pub fn new(source: impl Into<String>) -> Result<Self, Error<Syntax>> {
        let source = source.into();
        let tree = parse(&source)?;
        Ok(Expression {
            source,
            tree,
            display: OnceCell::new(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn evaluate(&self, bindings: &Bindings, registry: &Registry) -> Result<Value, Eval> {
        evaluate(&self.tree, bindings, registry)
    }

    /// The source text with every bound variable written out as its value.
    pub fn substituted(&self, bindings: &Bindings) -> String {
        substitute(&self.source, bindings)
    }

    /// Symbols that are not operators in `registry`, i.e. what must be bound
    /// before the expression reduces to a number.
    pub fn free_variables(&self, registry: &Registry) -> Vec<&str> {
        self.tree
            .symbols()
            .into_iter()
            .filter(|symbol| !registry.is_operator(symbol))
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }
}

impl From<Node> for Expression {
    fn from(tree: Node) -> Self {
        Expression {
            source: tree.to_string(),
            tree,
            display: OnceCell::new(),
        }
    }
}

impl TryFrom<&str> for Expression {
    type Error = Error<Syntax>;

    fn try_from(source: &str) -> Result<Self, Self::Error> {
        Expression::new(source)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display.get_or_init(|| format(&self.tree)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::IntoBindings;

    #[test]
    fn template_evaluation() {
        let registry = Registry::default();
        let expr = Expression::new("(ADD (MULT a x) b)").unwrap();
        for x in -10..=10 {
            let x = x as f64 / 10.0;
            let bindings = [("a", 3.0), ("b", -1.0), ("x", x)].bind();
            assert_eq!(
                expr.evaluate(&bindings, &registry),
                Ok(Value::Number(3.0 * x - 1.0))
            );
        }
        assert_eq!(expr.free_variables(&registry), vec!["a", "x", "b"]);
        assert_eq!(expr.depth(), 2);
    }

    #[test]
    fn repeated_evaluation_is_independent() {
        let registry = Registry::default();
        let expr = Expression::try_from("(SUB x 1)").unwrap();
        let tree = expr.tree().clone();
        assert_eq!(expr.evaluate(&("x", 5.0).bind(), &registry), Ok(Value::Number(4.0)));
        assert_eq!(expr.evaluate(&("x", 1.0).bind(), &registry), Ok(Value::Number(0.0)));
        assert_eq!(expr.tree(), &tree);
        assert_eq!(expr.source(), "(SUB x 1)");
    }

    #[test]
    fn display_is_cached_canonical_form() {
        let expr = Expression::new("(MULT  2 (ADD 1 2))").unwrap();
        assert_eq!(expr.to_string(), "'( MULT 2 ( ADD 1 2 ) )");
        assert_eq!(expr.to_string(), expr.to_string());
        assert_eq!(expr.display.get().map(String::as_str), Some("'( MULT 2 ( ADD 1 2 ) )"));
    }

    #[test]
    fn from_parsed_tree() {
        let tree = parse("(ADD 1 2)").unwrap();
        let expr = Expression::from(tree.clone());
        assert_eq!(expr.tree(), &tree);
        assert_eq!(expr.source(), "(ADD 1 2)");
        assert_eq!(
            expr.evaluate(&Bindings::new(), &Registry::default()),
            Ok(Value::Number(3.0))
        );
    }

    #[test]
    fn substituted_source() {
        let expr = Expression::new("(ADD x y)").unwrap();
        assert_eq!(expr.substituted(&[("x", 2.0), ("y", 3.0)].bind()), "(ADD 2 3)");
    }
}
