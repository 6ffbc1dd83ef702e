//! Shared source positions and the closed error taxonomy of the interpreter.
//!
//! Every phase (lexer, parser, evaluator) raises its own error type; this
//! module ties them together into one `MyLangError` so a host can `?` its
//! way from source text to a finished run, and renders diagnostics to a
//! secondary sink the way a real CLI would.

use std::fmt::{self, Display};

/// A `(line, column)` pair, both 1-based, as produced by the lexer.
pub type Position = (usize, usize);

/// Errors raised while tokenizing source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl LexError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "lex error at {line}:{col}: {}", self.message)
    }
}

impl std::error::Error for LexError {}

/// Errors raised while building the AST from a token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        write!(f, "parse error at {line}:{col}: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// The closed taxonomy of runtime errors (spec §7).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    DoesNotUnderstand {
        selector: String,
        proto_chain: Vec<String>,
    },
    ArityMismatch {
        selector: String,
        expected: usize,
        found: usize,
    },
    TypeError(String),
    DivisionByZero,
    ControlFlowOutOfContext(String),
    RuntimeError(String),
}

/// A runtime error together with the source location that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub position: Position,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub fn does_not_understand(selector: impl Into<String>, proto_chain: Vec<String>, position: Position) -> Self {
        Self::new(
            RuntimeErrorKind::DoesNotUnderstand {
                selector: selector.into(),
                proto_chain,
            },
            position,
        )
    }

    pub fn arity_mismatch(selector: impl Into<String>, expected: usize, found: usize, position: Position) -> Self {
        Self::new(
            RuntimeErrorKind::ArityMismatch {
                selector: selector.into(),
                expected,
                found,
            },
            position,
        )
    }

    pub fn type_error(message: impl Into<String>, position: Position) -> Self {
        Self::new(RuntimeErrorKind::TypeError(message.into()), position)
    }

    pub fn division_by_zero(position: Position) -> Self {
        Self::new(RuntimeErrorKind::DivisionByZero, position)
    }

    pub fn control_flow_out_of_context(what: impl Into<String>, position: Position) -> Self {
        Self::new(RuntimeErrorKind::ControlFlowOutOfContext(what.into()), position)
    }

    pub fn other(message: impl Into<String>, position: Position) -> Self {
        Self::new(RuntimeErrorKind::RuntimeError(message.into()), position)
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position;
        match &self.kind {
            RuntimeErrorKind::DoesNotUnderstand { selector, proto_chain } => write!(
                f,
                "{line}:{col}: does not understand '{selector}' (prototype chain: {})",
                proto_chain.join(" -> ")
            ),
            RuntimeErrorKind::ArityMismatch {
                selector,
                expected,
                found,
            } => write!(
                f,
                "{line}:{col}: '{selector}' expects {expected} argument(s), found {found}"
            ),
            RuntimeErrorKind::TypeError(message) => write!(f, "{line}:{col}: type error: {message}"),
            RuntimeErrorKind::DivisionByZero => write!(f, "{line}:{col}: division by zero"),
            RuntimeErrorKind::ControlFlowOutOfContext(what) => {
                write!(f, "{line}:{col}: '{what}' used outside of its enclosing context")
            }
            RuntimeErrorKind::RuntimeError(message) => write!(f, "{line}:{col}: {message}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Top-level error aggregator so a host can `?` across every phase.
#[derive(Debug, Clone, PartialEq)]
pub enum MyLangError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl Display for MyLangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MyLangError::Lex(err) => write!(f, "{err}"),
            MyLangError::Parse(err) => write!(f, "{err}"),
            MyLangError::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MyLangError {}

impl From<LexError> for MyLangError {
    fn from(err: LexError) -> Self {
        MyLangError::Lex(err)
    }
}

impl From<ParseError> for MyLangError {
    fn from(err: ParseError) -> Self {
        MyLangError::Parse(err)
    }
}

impl From<RuntimeError> for MyLangError {
    fn from(err: RuntimeError) -> Self {
        MyLangError::Runtime(err)
    }
}
