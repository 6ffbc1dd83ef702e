use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{Method, Slot, Value};

#[derive(Default)]
struct ObjectData {
    proto: Option<Object>,
    slots: IndexMap<String, Slot>,
    name: Option<String>,
}

/// A heap entity: `proto` plus an ordered slot map (spec §3 "Runtime
/// values" / Object). `Object` itself is a single `Rc<RefCell<..>>`
/// handle, so a Rust-level `.clone()` is a cheap pointer bump shared by
/// every binding to the same object; the language-level `clone` message
/// is `spawn_clone`, which allocates a genuinely fresh, empty-slot
/// `ObjectData` (spec §4.3 "Cloning").
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new(proto: Option<Object>) -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            proto,
            slots: IndexMap::new(),
            name: None,
        })))
    }

    /// A root prototype with a stable display name, used only for the five
    /// built-in bindings installed at bootstrap (spec §3 "Built-in
    /// roots").
    pub fn named_root(name: impl Into<String>, proto: Option<Object>) -> Self {
        let obj = Self::new(proto);
        obj.0.borrow_mut().name = Some(name.into());
        obj
    }

    /// `clone`: an empty-slot object whose proto is `self`. No
    /// copy-on-write; prior slots remain visible only via the prototype
    /// chain (spec §4.3).
    pub fn spawn_clone(&self) -> Self {
        Self::new(Some(self.clone()))
    }

    pub fn proto(&self) -> Option<Object> {
        self.0.borrow().proto.clone()
    }

    /// Walks `proto` links, returning the first slot hit (spec §4.3
    /// `get_slot`).
    pub fn get_slot(&self, name: &str) -> Option<Slot> {
        if let Some(slot) = self.0.borrow().slots.get(name) {
            return Some(slot.clone());
        }
        self.proto().and_then(|p| p.get_slot(name))
    }

    /// Slot lookup restricted to `self`, bypassing the prototype chain.
    /// The evaluator uses this to distinguish an own-slot field read from
    /// a method hit further up the chain (spec §4.4 step 4 vs. step 5).
    pub fn own_slot(&self, name: &str) -> Option<Slot> {
        self.0.borrow().slots.get(name).cloned()
    }

    /// Always writes to `self`, never to a prototype (spec §4.3
    /// `set_slot`).
    pub fn set_slot(&self, name: impl Into<String>, value: Value) {
        self.0.borrow_mut().slots.insert(name.into(), Slot::Value(value));
    }

    pub fn set_method_slot(&self, name: impl Into<String>, method: Method) {
        self.0.borrow_mut().slots.insert(name.into(), Slot::Method(method));
    }

    /// A shallow, human-readable prototype chain for `DoesNotUnderstand`
    /// diagnostics (spec §6 "shallow prototype-chain description").
    /// Anonymous (non-root) objects report as `<object>`.
    pub fn proto_chain_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut current = Some(self.clone());
        while let Some(obj) = current {
            let data = obj.0.borrow();
            names.push(data.name.clone().unwrap_or_else(|| "<object>".to_string()));
            current = data.proto.clone();
        }
        names
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Object")
            .field("ptr", &Rc::as_ptr(&self.0))
            .field("name", &data.name)
            .field("slots", &data.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}
