use std::fmt::Display;

use itertools::Itertools;

use crate::node::Node;

fn spaced(node: &Node) -> String {
    match node {
        Node::Atom(text) => text.clone(),
        Node::List(elements) => format!("( {} )", elements.iter().map(spaced).join(" ")),
    }
}

fn collapse_spaces(text: &str) -> String {
    text.split(' ').filter(|part| !part.is_empty()).join(" ")
}

/// Canonical display form: `'( ADD 1 ( MULT 2 3 ) )`. The outermost list is
/// quoted to mark it as unevaluated data.
pub fn format(node: &Node) -> String {
    #[cfg(feature = "tracy")]
    profiling::scope!("format");
    match node {
        Node::Atom(text) => text.clone(),
        Node::List(_) => collapse_spaces(&format!("'{}", spaced(node))),
    }
}

/// Conventional form without padding or quote: `(ADD 1 (MULT 2 3))`.
pub fn format_compact(node: &Node) -> String {
    node.to_string()
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Atom(text) => write!(f, "{text}"),
            Node::List(elements) => write!(f, "({})", elements.iter().join(" ")),
        }
    }
}
