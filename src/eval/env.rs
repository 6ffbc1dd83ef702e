use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

/// The root environment (spec §4.4 "The root environment carries the
/// built-in prototype bindings"). Shared by every activation frame via a
/// single `Rc`, since the interpreter owns exactly one of these for its
/// whole lifetime (spec §9 "Global state").
#[derive(Clone, Default)]
pub struct Globals(Rc<RefCell<HashMap<String, Value>>>);

impl Globals {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(HashMap::new())))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(name.into(), value);
    }
}

/// An evaluation environment (spec §4.4 "Environment frames"). There is no
/// call stack of locals: a method activation sees only its own
/// parameters/locally-introduced names plus the shared root bindings,
/// never a caller's locals. Blocks passed to `ifTrue`/`ifFalse`/
/// `whileTrue` execute directly inside the environment of their enclosing
/// statement sequence — they are not activations of their own, which is
/// what lets `return` inside a block escape to the method (spec §4.4
/// "Control-flow unwinds").
pub enum Env {
    /// The top-level program runs directly against the root environment;
    /// `name = value` at this level is itself a root binding.
    TopLevel(Globals),
    /// A method activation: `self`, parameter/local bindings, and a
    /// fallback to the shared root environment for anything not found
    /// locally.
    Activation {
        globals: Globals,
        locals: HashMap<String, Value>,
        self_value: Value,
    },
}

impl Env {
    pub fn top_level(globals: Globals) -> Self {
        Env::TopLevel(globals)
    }

    pub fn activation(globals: Globals, self_value: Value, locals: HashMap<String, Value>) -> Self {
        Env::Activation {
            globals,
            locals,
            self_value,
        }
    }

    pub fn globals(&self) -> &Globals {
        match self {
            Env::TopLevel(globals) => globals,
            Env::Activation { globals, .. } => globals,
        }
    }

    pub fn self_value(&self) -> Option<Value> {
        match self {
            Env::TopLevel(_) => None,
            Env::Activation { self_value, .. } => Some(self_value.clone()),
        }
    }

    /// Resolves a bare identifier: `self`, then the current frame's own
    /// bindings, then the root environment.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self {
            Env::TopLevel(globals) => globals.get(name),
            Env::Activation {
                globals,
                locals,
                self_value,
            } => {
                if name == "self" {
                    return Some(self_value.clone());
                }
                locals.get(name).cloned().or_else(|| globals.get(name))
            }
        }
    }

    /// Binds or rebinds `name` in the current frame (spec §3 `LValue`
    /// "Identifier" case): at top level this is a root binding; inside a
    /// method activation it is always local, even if a root binding of
    /// the same name exists.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        match self {
            Env::TopLevel(globals) => globals.set(name, value),
            Env::Activation { locals, .. } => {
                locals.insert(name.into(), value);
            }
        }
    }
}
