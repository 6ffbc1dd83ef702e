use std::fmt;

/// A short-lived payload produced by arithmetic/comparison (spec §3). Raws
/// are never stored directly in a slot; whenever one reaches a message
/// receiver position the evaluator autoboxes it first (spec §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for Raw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raw::Int(n) => write!(f, "{n}"),
            Raw::Float(n) => write!(f, "{n}"),
            Raw::Bool(b) => write!(f, "{b}"),
            Raw::Str(s) => write!(f, "{s}"),
        }
    }
}
