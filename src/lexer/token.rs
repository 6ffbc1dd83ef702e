use crate::diagnostics::Position;

/// The payload of a `NUMBER` token: integers and decimals stay distinct
/// tokens so the evaluator can preserve integer-vs-float semantics (spec
/// §4.5 — "Integer vs. floating-point is preserved").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLit {
    Int(i64),
    Float(f64),
}

/// A single lexed token kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(NumberLit),
    Str(String),

    // keyword tokens (spec §3)
    True,
    False,
    Return,
    Break,
    Continue,
    IfTrue,
    IfFalse,
    WhileTrue,
    Clone,

    // punctuation
    Assign,
    LParen,
    RParen,

    /// Arithmetic/comparison operator selectors (`+ - * / % < <= == >= >`).
    /// Spec §3 only lists `=`, `(`, `)` as punctuation, but §4.2 requires
    /// these symbols to be dispatchable as message selectors; they need a
    /// token kind of their own so the parser can recognize them the same
    /// way it recognizes an `IDENT` selector.
    Op(String),

    // structural
    Newline,
    Indent,
    Dedent,
    Eof,
}

/// A single lexed token, carrying the `(line, column)` it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// The selector text if this token can stand as a message selector: an
    /// identifier, an operator, or one of the selector-shaped keywords
    /// (`clone`, `ifTrue`, `ifFalse`, `whileTrue`). `true`/`false` are
    /// literals and `return`/`break`/`continue` are statement-leading
    /// keywords; neither can appear as a selector.
    pub fn selector_text(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name.as_str()),
            TokenKind::Op(symbol) => Some(symbol.as_str()),
            TokenKind::Clone => Some("clone"),
            TokenKind::IfTrue => Some("ifTrue"),
            TokenKind::IfFalse => Some("ifFalse"),
            TokenKind::WhileTrue => Some("whileTrue"),
            _ => None,
        }
    }
}
