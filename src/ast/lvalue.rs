use super::Expr;

/// The target of an assignment statement (spec §3, "`LValue` is either a
/// bare identifier ... or a *slot path*").
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    /// `name = value` — binds or rebinds a variable in the current frame.
    Identifier(String),
    /// `receiver slot = value` — writes the named slot on the value of
    /// `receiver`, never touching `receiver`'s prototype.
    SlotPath { receiver: Expr, slot: String },
}
