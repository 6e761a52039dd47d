use std::str::FromStr;

use itertools::Itertools;

use crate::parser::{self, Error, Syntax};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Node {
    Atom(String),
    List(Vec<Node>),
}

/// Deepest list nesting accepted by the parser and the evaluator.
pub const MAX_DEPTH: usize = 128;

fn literal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(text);
    let mut chars = unsigned.chars();
    let numeric = match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().map(|c| c.is_ascii_digit()).unwrap_or(false),
        _ => false,
    };
    if numeric {
        text.parse().ok()
    } else {
        None
    }
}

/// Parses `text` as a number literal: an optional sign followed by a digit or
/// a `.` and a digit. `inf` and `NaN` are symbols, not numbers, and literals
/// that overflow `f64` are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    literal(text).filter(|n| n.is_finite())
}

/// Whether `text` is spelled as a number but does not fit in an `f64`.
pub fn out_of_range(text: &str) -> bool {
    literal(text).map_or(false, |n| !n.is_finite())
}

impl Node {
    pub fn atom(text: impl Into<String>) -> Node {
        Node::Atom(text.into())
    }

    pub fn list(elements: impl IntoIterator<Item = Node>) -> Node {
        Node::List(elements.into_iter().collect())
    }

    pub fn number(value: f64) -> Node {
        Node::Atom(value.to_string())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Node::Atom(text) => parse_number(text),
            Node::List(_) => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Node::Atom(text) if parse_number(text).is_none() => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(elements) => Some(elements),
            Node::Atom(_) => None,
        }
    }

    pub fn head(&self) -> Option<&Node> {
        self.as_list().and_then(|elements| elements.first())
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Atom(_) => 0,
            Node::List(elements) => 1 + elements.iter().map(Node::depth).max().unwrap_or(0),
        }
    }

    fn collect_symbols<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Atom(_) => out.extend(self.as_symbol()),
            Node::List(elements) => elements.iter().for_each(|e| e.collect_symbols(out)),
        }
    }

    /// Every symbol in the tree, in order of first occurrence.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols = Vec::new();
        self.collect_symbols(&mut symbols);
        symbols.into_iter().unique().collect()
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::number(value)
    }
}

impl FromStr for Node {
    type Err = Error<Syntax>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}
