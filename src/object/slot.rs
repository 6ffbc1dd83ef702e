use super::{Method, Value};

/// What a named slot on an object holds: a plain value, or a method (spec
/// §3 GLOSSARY "Slot").
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Value(Value),
    Method(Method),
}

impl Slot {
    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Slot::Method(m) => Some(m),
            Slot::Value(_) => None,
        }
    }
}
