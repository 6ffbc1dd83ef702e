//! Bootstrap of the four built-in root prototypes and the pure (block-free)
//! native methods installed on them (spec §3 "Built-in roots", §4.5, §6).
//!
//! `ifTrue`/`ifFalse`/`whileTrue` and `print` need access to the
//! evaluator's environment and output sink, so they are handled directly in
//! `src/eval`; everything else funnels through [`compute`] here.

use crate::diagnostics::{Position, RuntimeError};
use crate::object::{Method, NativeSelector, Object, Raw, Value};
use crate::eval::Flow;

/// The four built-in prototypes, held by the interpreter for the lifetime
/// of the run (spec §9 "Global state" — one instance, never shared).
#[derive(Clone)]
pub struct Roots {
    pub object: Object,
    pub number: Object,
    pub boolean: Object,
    pub string: Object,
}

impl Roots {
    pub fn bootstrap() -> Self {
        let object = Object::named_root("Object", None);
        object.set_method_slot("clone", Method::Native(NativeSelector::ObjectClone));
        object.set_method_slot("print", Method::Native(NativeSelector::ObjectPrint));
        object.set_method_slot("==", Method::Native(NativeSelector::ObjectEq));

        let number = Object::named_root("Number", Some(object.clone()));
        for (selector, tag) in [
            ("+", NativeSelector::NumberAdd),
            ("-", NativeSelector::NumberSub),
            ("*", NativeSelector::NumberMul),
            ("/", NativeSelector::NumberDiv),
            ("%", NativeSelector::NumberMod),
            ("<", NativeSelector::NumberLt),
            ("<=", NativeSelector::NumberLe),
            ("==", NativeSelector::NumberEq),
            (">=", NativeSelector::NumberGe),
            (">", NativeSelector::NumberGt),
        ] {
            number.set_method_slot(selector, Method::Native(tag));
        }

        let boolean = Object::named_root("Boolean", Some(object.clone()));
        boolean.set_method_slot("not", Method::Native(NativeSelector::BooleanNot));
        boolean.set_method_slot("ifTrue", Method::Native(NativeSelector::BooleanIfTrue));
        boolean.set_method_slot("ifFalse", Method::Native(NativeSelector::BooleanIfFalse));
        boolean.set_method_slot("whileTrue", Method::Native(NativeSelector::BooleanWhileTrue));

        let string = Object::named_root("String", Some(object.clone()));
        string.set_method_slot("+", Method::Native(NativeSelector::StringConcat));
        string.set_method_slot("==", Method::Native(NativeSelector::StringEq));
        string.set_method_slot("length", Method::Native(NativeSelector::StringLength));

        Roots {
            object,
            number,
            boolean,
            string,
        }
    }

    /// Autoboxes a raw payload into a fresh clone of its matching
    /// prototype, `value` (and, for strings, `length`) set (spec §4.4
    /// "Autobox on receiver"). Objects pass through unchanged.
    pub fn autobox(&self, value: Value) -> Value {
        let raw = match value {
            Value::Object(_) => return value,
            Value::Raw(raw) => raw,
        };
        let boxed = match &raw {
            Raw::Int(_) | Raw::Float(_) => self.number.spawn_clone(),
            Raw::Bool(_) => self.boolean.spawn_clone(),
            Raw::Str(s) => {
                let obj = self.string.spawn_clone();
                obj.set_slot("length", Value::int(s.chars().count() as i64));
                obj
            }
        };
        boxed.set_slot("value", Value::Raw(raw));
        Value::Object(boxed)
    }

    /// The textual form written by `print` (spec §6): a Number/Boolean/
    /// String instance renders its `value` slot; a raw renders directly;
    /// anything else falls back to its nearest named prototype.
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Raw(raw) => raw.to_string(),
            Value::Object(obj) => match obj.own_slot("value") {
                Some(crate::object::Slot::Value(Value::Raw(raw))) => raw.to_string(),
                _ => obj
                    .proto_chain_names()
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "Object".to_string()),
            },
        }
    }
}

#[derive(Clone, Copy)]
enum NumKind {
    Int(i64),
    Float(f64),
}

impl NumKind {
    fn as_float(self) -> f64 {
        match self {
            NumKind::Int(n) => n as f64,
            NumKind::Float(n) => n,
        }
    }
}

fn unbox_number(value: &Value, selector: &str, position: Position) -> Result<NumKind, RuntimeError> {
    let raw = match value {
        Value::Raw(Raw::Int(n)) => return Ok(NumKind::Int(*n)),
        Value::Raw(Raw::Float(n)) => return Ok(NumKind::Float(*n)),
        Value::Object(obj) => obj.own_slot("value"),
        _ => None,
    };
    match raw {
        Some(crate::object::Slot::Value(Value::Raw(Raw::Int(n)))) => Ok(NumKind::Int(n)),
        Some(crate::object::Slot::Value(Value::Raw(Raw::Float(n)))) => Ok(NumKind::Float(n)),
        _ => Err(RuntimeError::type_error(
            format!("'{selector}' requires a Number, found a value with no numeric '.value'"),
            position,
        )),
    }
}

fn unbox_string(value: &Value, selector: &str, position: Position) -> Result<String, RuntimeError> {
    let slot = match value {
        Value::Raw(Raw::Str(s)) => return Ok(s.clone()),
        Value::Object(obj) => obj.own_slot("value"),
        _ => None,
    };
    match slot {
        Some(crate::object::Slot::Value(Value::Raw(Raw::Str(s)))) => Ok(s),
        _ => Err(RuntimeError::type_error(
            format!("'{selector}' requires a String, found a value with no string '.value'"),
            position,
        )),
    }
}

fn numeric_binop(tag: NativeSelector, lhs: NumKind, rhs: NumKind, position: Position) -> Result<Value, RuntimeError> {
    use NativeSelector::*;
    let promote_float = matches!((lhs, rhs), (NumKind::Float(_), _) | (_, NumKind::Float(_)));
    match tag {
        NumberAdd | NumberSub | NumberMul | NumberDiv | NumberMod => {
            if matches!(tag, NumberDiv | NumberMod) {
                let zero = match rhs {
                    NumKind::Int(n) => n == 0,
                    NumKind::Float(n) => n == 0.0,
                };
                if zero {
                    return Err(RuntimeError::division_by_zero(position));
                }
            }
            if promote_float {
                let (a, b) = (lhs.as_float(), rhs.as_float());
                let result = match tag {
                    NumberAdd => a + b,
                    NumberSub => a - b,
                    NumberMul => a * b,
                    NumberDiv => a / b,
                    NumberMod => a % b,
                    _ => unreachable!(),
                };
                Ok(Value::float(result))
            } else {
                let (NumKind::Int(a), NumKind::Int(b)) = (lhs, rhs) else {
                    unreachable!("promote_float is false only when both operands are Int")
                };
                let result = match tag {
                    NumberAdd => a + b,
                    NumberSub => a - b,
                    NumberMul => a * b,
                    NumberDiv => a / b,
                    NumberMod => a % b,
                    _ => unreachable!(),
                };
                Ok(Value::int(result))
            }
        }
        NumberLt | NumberLe | NumberEq | NumberGe | NumberGt => {
            let result = if promote_float {
                let (a, b) = (lhs.as_float(), rhs.as_float());
                match tag {
                    NumberLt => a < b,
                    NumberLe => a <= b,
                    NumberEq => a == b,
                    NumberGe => a >= b,
                    NumberGt => a > b,
                    _ => unreachable!(),
                }
            } else {
                let (NumKind::Int(a), NumKind::Int(b)) = (lhs, rhs) else {
                    unreachable!("promote_float is false only when both operands are Int")
                };
                match tag {
                    NumberLt => a < b,
                    NumberLe => a <= b,
                    NumberEq => a == b,
                    NumberGe => a >= b,
                    NumberGt => a > b,
                    _ => unreachable!(),
                }
            };
            Ok(Value::bool(result))
        }
        other => unreachable!("{other:?} is not a numeric binary operator"),
    }
}

/// Runs every native method that needs no access to the evaluator's
/// environment or output sink: arithmetic/comparison, string ops,
/// `Boolean not`, identity `==`, and `clone`.
pub fn compute(
    tag: NativeSelector,
    receiver: &Value,
    args: &[Value],
    selector: &str,
    position: Position,
) -> Result<Flow, RuntimeError> {
    use NativeSelector::*;
    match tag {
        ObjectClone => {
            let Value::Object(obj) = receiver else {
                return Err(RuntimeError::type_error("'clone' requires an object receiver", position));
            };
            Ok(Flow::Value(Value::Object(obj.spawn_clone())))
        }
        ObjectEq => {
            let eq = match (receiver, &args[0]) {
                (Value::Object(a), Value::Object(b)) => a == b,
                _ => false,
            };
            Ok(Flow::Value(Value::bool(eq)))
        }
        NumberAdd | NumberSub | NumberMul | NumberDiv | NumberMod | NumberLt | NumberLe | NumberEq | NumberGe | NumberGt => {
            let lhs = unbox_number(receiver, selector, position)?;
            let rhs = unbox_number(&args[0], selector, position)?;
            Ok(Flow::Value(numeric_binop(tag, lhs, rhs, position)?))
        }
        BooleanNot => {
            let value = match receiver {
                Value::Object(obj) => match obj.own_slot("value") {
                    Some(crate::object::Slot::Value(Value::Raw(Raw::Bool(b)))) => b,
                    _ => return Err(RuntimeError::type_error("'not' requires a Boolean", position)),
                },
                Value::Raw(Raw::Bool(b)) => *b,
                _ => return Err(RuntimeError::type_error("'not' requires a Boolean", position)),
            };
            Ok(Flow::Value(Value::bool(!value)))
        }
        StringConcat => {
            let lhs = unbox_string(receiver, selector, position)?;
            let rhs = unbox_string(&args[0], selector, position)?;
            Ok(Flow::Value(Value::str(lhs + &rhs)))
        }
        StringEq => {
            let lhs = unbox_string(receiver, selector, position)?;
            let rhs = unbox_string(&args[0], selector, position)?;
            Ok(Flow::Value(Value::bool(lhs == rhs)))
        }
        StringLength => {
            let s = unbox_string(receiver, selector, position)?;
            Ok(Flow::Value(Value::int(s.chars().count() as i64)))
        }
        ObjectPrint | BooleanIfTrue | BooleanIfFalse | BooleanWhileTrue => {
            unreachable!("{tag:?} is handled in src/eval, never dispatched through builtins::compute")
        }
    }
}
