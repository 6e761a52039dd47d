use std::{
    fmt::{Debug, Display},
    iter::Peekable,
    ops::{Deref, RangeInclusive},
    str::CharIndices,
};

use crate::node::{out_of_range, Node, MAX_DEPTH};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind<'a> {
    Open,
    Close,
    Quote,
    Word(&'a str),
}

#[derive(Debug)]
pub struct Token<'a> {
    kind: TokenKind<'a>,
    span: RangeInclusive<usize>,
}

impl<'a> Token<'a> {
    pub fn span(&self) -> RangeInclusive<usize> {
        self.span.clone()
    }
}

impl<'a> Deref for Token<'a> {
    type Target = TokenKind<'a>;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Syntax {
    #[error("empty expression")]
    Empty,
    #[error("expected `{0}`")]
    ExpectedChar(char),
    #[error("unmatched `)`")]
    UnmatchedClose,
    #[error("unexpected input after the expression")]
    TrailingInput,
    #[error("quote must be followed by `(`")]
    DanglingQuote,
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("number literal `{0}` is out of range")]
    NumberOutOfRange(String),
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// An error of kind `T` located at a byte span of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error<T> {
    pub err: T,
    pub span: RangeInclusive<usize>,
}

impl<T> Error<T> {
    pub fn new(err: T, span: RangeInclusive<usize>) -> Self {
        Error { err, span }
    }
}

impl<T: Display> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..={}",
            self.err,
            self.span.start(),
            self.span.end()
        )
    }
}

impl<T: Debug + Display> std::error::Error for Error<T> {}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '_' | '-' | '+' | '.' | '*' | '/' | '<' | '>' | '=' | '!' | '?' | '%' | '^' | '&'
        )
}

pub struct TextParser<'a> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    tokens: Vec<Token<'a>>,
}

impl<'a> TextParser<'a> {
    pub fn new(source: &'a str) -> Self {
        TextParser {
            source,
            iter: source.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    fn token(&mut self, kind: TokenKind<'a>, span: RangeInclusive<usize>) {
        self.tokens.push(Token { kind, span });
    }

    /// Consumes the rest of a word starting at `start` and returns its end (exclusive).
    fn word(&mut self, start: usize, first: char) -> usize {
        let mut end = start + first.len_utf8();
        while let Some(&(pos, c)) = self.iter.peek() {
            if !is_word_char(c) {
                break;
            }
            end = pos + c.len_utf8();
            self.iter.next();
        }
        end
    }

    pub fn parse(mut self) -> Result<Vec<Token<'a>>, Error<Syntax>> {
        while let Some((start, current)) = self.iter.next() {
            match current {
                c if c.is_whitespace() => {}
                '(' => self.token(TokenKind::Open, start..=start),
                ')' => self.token(TokenKind::Close, start..=start),
                '\'' => self.token(TokenKind::Quote, start..=start),
                c if is_word_char(c) => {
                    let source = self.source;
                    let end = self.word(start, c);
                    self.token(TokenKind::Word(&source[start..end]), start..=end - 1);
                }
                c => {
                    return Err(Error::new(
                        Syntax::UnexpectedChar(c),
                        start..=start + c.len_utf8() - 1,
                    ))
                }
            }
        }
        Ok(self.tokens)
    }
}

#[derive(Debug)]
pub struct TokenParser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    depth: usize,
}

impl<'t, 'a> TokenParser<'t, 'a> {
    pub fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn current(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token<'a>> {
        let token = self.current();
        self.pos += 1;
        token
    }

    fn end_span(&self) -> RangeInclusive<usize> {
        self.tokens
            .last()
            .map(|t| *t.span.end()..=*t.span.end())
            .unwrap_or(0..=0)
    }

    fn parse_list(&mut self, open: RangeInclusive<usize>) -> Result<Node, Error<Syntax>> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::new(Syntax::TooDeep(MAX_DEPTH), open));
        }
        let mut elements = Vec::new();
        loop {
            match self.current().map(|t| t.kind) {
                Some(TokenKind::Close) => {
                    self.pos += 1;
                    self.depth -= 1;
                    return Ok(Node::List(elements));
                }
                Some(_) => elements.push(self.parse_node()?),
                None => return Err(Error::new(Syntax::ExpectedChar(')'), open)),
            }
        }
    }

    pub fn parse_node(&mut self) -> Result<Node, Error<Syntax>> {
        let token = self
            .advance()
            .ok_or_else(|| Error::new(Syntax::Empty, self.end_span()))?;
        match token.kind {
            TokenKind::Word(word) if out_of_range(word) => Err(Error::new(
                Syntax::NumberOutOfRange(word.to_owned()),
                token.span(),
            )),
            TokenKind::Word(word) => Ok(Node::atom(word)),
            TokenKind::Open => self.parse_list(token.span()),
            TokenKind::Close => Err(Error::new(Syntax::UnmatchedClose, token.span())),
            TokenKind::Quote => match self.current() {
                Some(next) if next.kind == TokenKind::Open => {
                    self.pos += 1;
                    self.parse_list(next.span())
                }
                _ => Err(Error::new(Syntax::DanglingQuote, token.span())),
            },
        }
    }

    /// Parses exactly one top-level form, rejecting anything after it.
    pub fn parse(&mut self) -> Result<Node, Error<Syntax>> {
        let node = self.parse_node()?;
        match self.current() {
            None => Ok(node),
            Some(extra) if extra.kind == TokenKind::Close => {
                Err(Error::new(Syntax::UnmatchedClose, extra.span()))
            }
            Some(extra) => Err(Error::new(
                Syntax::TrailingInput,
                *extra.span.start()..=*self.end_span().end(),
            )),
        }
    }
}

pub fn parse(source: &str) -> Result<Node, Error<Syntax>> {
    #[cfg(feature = "tracy")]
    profiling::scope!("parse");
    let tokens = TextParser::new(source).parse()?;
    if tokens.is_empty() {
        return Err(Error::new(Syntax::Empty, 0..=source.len().saturating_sub(1)));
    }
    TokenParser::new(&tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(text: &str) -> Node {
        Node::atom(text)
    }

    #[test]
    fn tokens() {
        let tokens = TextParser::new("'(ADD -1 x_2)").parse().unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| **t).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Quote,
                TokenKind::Open,
                TokenKind::Word("ADD"),
                TokenKind::Word("-1"),
                TokenKind::Word("x_2"),
                TokenKind::Close,
            ]
        );
        assert_eq!(tokens[2].span(), 2..=4);
        assert_eq!(tokens[4].span(), 9..=11);
    }

    #[test]
    fn nested_lists() {
        assert_eq!(
            parse("(MULT 2 (ADD 1 2))").unwrap(),
            Node::List(vec![
                atom("MULT"),
                atom("2"),
                Node::List(vec![atom("ADD"), atom("1"), atom("2")]),
            ])
        );
        assert_eq!(parse("  ( )  ").unwrap(), Node::List(vec![]));
        assert_eq!(parse("42").unwrap(), atom("42"));
        assert_eq!(
            parse("'( SQRT ( SQUARE -3 ) )").unwrap(),
            parse("(SQRT (SQUARE -3))").unwrap()
        );
    }

    #[test]
    fn syntax_errors() {
        let err = |s: &str| parse(s).unwrap_err();
        assert_eq!(err(""), Error::new(Syntax::Empty, 0..=0));
        assert_eq!(err("   ").err, Syntax::Empty);
        assert_eq!(err("(ADD 1 (MULT 2 3)"), Error::new(Syntax::ExpectedChar(')'), 0..=0));
        assert_eq!(err("(ADD 1 2))"), Error::new(Syntax::UnmatchedClose, 9..=9));
        assert_eq!(err(")"), Error::new(Syntax::UnmatchedClose, 0..=0));
        assert_eq!(err("(ADD 1) (ADD 2)"), Error::new(Syntax::TrailingInput, 8..=14));
        assert_eq!(err("'ADD"), Error::new(Syntax::DanglingQuote, 0..=0));
        assert_eq!(err("(ADD 1 #)"), Error::new(Syntax::UnexpectedChar('#'), 7..=7));
    }

    fn nested(depth: usize) -> String {
        format!("{}1{}", "(ADD ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn nesting_limit() {
        let deepest = parse(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(deepest.depth(), MAX_DEPTH);
        let offset = MAX_DEPTH * "(ADD ".len();
        assert_eq!(
            parse(&nested(MAX_DEPTH + 1)).unwrap_err(),
            Error::new(Syntax::TooDeep(MAX_DEPTH), offset..=offset)
        );
        assert_eq!(parse(&nested(10_000)).unwrap_err().err, Syntax::TooDeep(MAX_DEPTH));
    }

    #[test]
    fn overflowing_literals() {
        assert_eq!(
            parse("(SUB 1e400 1)").unwrap_err(),
            Error::new(Syntax::NumberOutOfRange("1e400".to_owned()), 5..=9)
        );
        assert_eq!(
            parse("-1e400").unwrap_err().err,
            Syntax::NumberOutOfRange("-1e400".to_owned())
        );
        assert_eq!(parse("(ADD 1e300 x1e400)").unwrap().depth(), 1);
    }

    #[test]
    fn error_display() {
        let err = parse("(ADD 1").unwrap_err();
        assert_eq!(err.to_string(), "expected `)` at 0..=0");
    }
}
