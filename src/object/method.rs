use crate::ast::Block;

/// A method defined in MyLang source: formal parameter names plus a body
/// block. Methods are not closures (spec §4.3) — free identifiers inside
/// `body` resolve against the root environment and the method's own
/// activation frame only, never against the defining context's locals.
#[derive(Debug, Clone, PartialEq)]
pub struct UserMethod {
    pub params: Vec<String>,
    pub body: Block,
}

impl UserMethod {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// The fixed set of built-in methods installed on the root prototypes
/// during bootstrap (spec §4.5, §6). Kept as a plain selector tag rather
/// than a function pointer so `src/object` stays free of a dependency on
/// the evaluator; `src/eval`/`src/builtins` match on this tag to run the
/// actual behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeSelector {
    ObjectClone,
    ObjectPrint,
    /// Identity equality, installed on `Object` itself so any receiver
    /// without a more specific `==` (i.e. anything but Number/String)
    /// still understands it (spec §4.5 "Equality on non-Number receivers
    /// defaults to identity of the object").
    ObjectEq,
    NumberAdd,
    NumberSub,
    NumberMul,
    NumberDiv,
    NumberMod,
    NumberLt,
    NumberLe,
    NumberEq,
    NumberGe,
    NumberGt,
    BooleanNot,
    BooleanIfTrue,
    BooleanIfFalse,
    BooleanWhileTrue,
    StringConcat,
    StringEq,
    StringLength,
}

impl NativeSelector {
    /// Declared arity, consulted by the parser's shadow table exactly like
    /// a user method's (spec §4.2 step 2).
    pub fn arity(self) -> usize {
        match self {
            NativeSelector::ObjectClone => 0,
            NativeSelector::ObjectPrint => 0,
            NativeSelector::ObjectEq => 1,
            NativeSelector::NumberAdd => 1,
            NativeSelector::NumberSub => 1,
            NativeSelector::NumberMul => 1,
            NativeSelector::NumberDiv => 1,
            NativeSelector::NumberMod => 1,
            NativeSelector::NumberLt => 1,
            NativeSelector::NumberLe => 1,
            NativeSelector::NumberEq => 1,
            NativeSelector::NumberGe => 1,
            NativeSelector::NumberGt => 1,
            NativeSelector::BooleanNot => 0,
            NativeSelector::BooleanIfTrue => 0,
            NativeSelector::BooleanIfFalse => 0,
            NativeSelector::BooleanWhileTrue => 0,
            NativeSelector::StringConcat => 1,
            NativeSelector::StringEq => 1,
            NativeSelector::StringLength => 0,
        }
    }
}

/// A method value stored in a slot: either user-defined or a native
/// built-in (spec §4.3 "Method values").
#[derive(Debug, Clone, PartialEq)]
pub enum Method {
    User(UserMethod),
    Native(NativeSelector),
}

impl Method {
    pub fn arity(&self) -> usize {
        match self {
            Method::User(m) => m.arity(),
            Method::Native(selector) => selector.arity(),
        }
    }
}
