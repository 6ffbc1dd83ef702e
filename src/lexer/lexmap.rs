use std::collections::HashMap;

use super::token::{Token, TokenKind};
use crate::diagnostics::Position;

/// A fixed-string terminal: keywords and punctuation/operator symbols that
/// are recognized by exact text rather than by character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    True,
    False,
    Return,
    Break,
    Continue,
    IfTrue,
    IfFalse,
    WhileTrue,
    Clone,
    Assign,
    LParen,
    RParen,
    Plus,
    Minus,
    Times,
    Divide,
    Percent,
    Lt,
    Le,
    EqEq,
    Ge,
    Gt,
}

impl Terminal {
    pub fn to_token(self, position: Position) -> Token {
        let kind = match self {
            Terminal::True => TokenKind::True,
            Terminal::False => TokenKind::False,
            Terminal::Return => TokenKind::Return,
            Terminal::Break => TokenKind::Break,
            Terminal::Continue => TokenKind::Continue,
            Terminal::IfTrue => TokenKind::IfTrue,
            Terminal::IfFalse => TokenKind::IfFalse,
            Terminal::WhileTrue => TokenKind::WhileTrue,
            Terminal::Clone => TokenKind::Clone,
            Terminal::Assign => TokenKind::Assign,
            Terminal::LParen => TokenKind::LParen,
            Terminal::RParen => TokenKind::RParen,
            Terminal::Plus => TokenKind::Op("+".into()),
            Terminal::Minus => TokenKind::Op("-".into()),
            Terminal::Times => TokenKind::Op("*".into()),
            Terminal::Divide => TokenKind::Op("/".into()),
            Terminal::Percent => TokenKind::Op("%".into()),
            Terminal::Lt => TokenKind::Op("<".into()),
            Terminal::Le => TokenKind::Op("<=".into()),
            Terminal::EqEq => TokenKind::Op("==".into()),
            Terminal::Ge => TokenKind::Op(">=".into()),
            Terminal::Gt => TokenKind::Op(">".into()),
        };
        Token::new(kind, position)
    }
}

/// Table of fixed-string terminals, keyed by their exact source text.
/// `can_match` answers "is `key` a prefix of some registered terminal?" so
/// the lexer can keep reading one character at a time until no longer
/// extending a known terminal (longest-match).
#[derive(Debug, Clone, Default)]
pub struct LexMap {
    map: HashMap<&'static str, Terminal>,
}

impl LexMap {
    pub fn insert(&mut self, key: &'static str, value: Terminal) {
        self.map.insert(key, value);
    }

    pub fn can_match(&self, key: &str) -> bool {
        self.map.keys().any(|candidate| candidate.starts_with(key))
    }

    pub fn get(&self, key: &str) -> Option<Terminal> {
        self.map.get(key).copied()
    }
}
