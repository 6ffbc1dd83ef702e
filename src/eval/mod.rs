//! The tree-walking evaluator (spec §4.4): message dispatch, activation
//! frames, autoboxing on receiver, and the three control-flow unwind
//! signals (spec §9 "Non-local return via unwinding").

mod env;
mod flow;

pub use env::{Env, Globals};
pub use flow::Flow;
use flow::eval_value;

use std::collections::HashMap;
use std::io::Write;

use crate::ast::{Assignment, Block, Expr, LValue, Literal, Message, MethodDef, Program, Stmt};
use crate::builtins::{self, Roots};
use crate::diagnostics::{Position, RuntimeError};
use crate::lexer::NumberLit;
use crate::object::{Method, NativeSelector, Object, Raw, Slot, UserMethod, Value};

/// Owns the bootstrap prototypes and the program's single root environment
/// for the lifetime of one run (spec §9 "Global state" — distinct
/// interpreter instances never share a root environment).
pub struct Interpreter<W: Write> {
    roots: Roots,
    globals: Globals,
    out: W,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        let roots = Roots::bootstrap();
        let globals = Globals::new();
        globals.set("Object", Value::Object(roots.object.clone()));
        globals.set("Number", Value::Object(roots.number.clone()));
        globals.set("Boolean", Value::Object(roots.boolean.clone()));
        globals.set("String", Value::Object(roots.string.clone()));
        log::debug!("bootstrap complete: Object/Number/Boolean/String installed");

        Self { roots, globals, out }
    }

    /// Runs every top-level statement of `program` in order against a fresh
    /// top-level environment (spec §6 "Files are evaluated from top to
    /// bottom as a single program against a fresh root environment").
    pub fn run(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let mut env = Env::top_level(self.globals.clone());
        let mut last = self.empty();

        for stmt in &program.stmts {
            match self.eval_stmt(stmt, &mut env)? {
                Flow::Value(value) => last = value,
                Flow::Return(_) => return Err(RuntimeError::control_flow_out_of_context("return", stmt.position())),
                Flow::Break => return Err(RuntimeError::control_flow_out_of_context("break", stmt.position())),
                Flow::Continue => return Err(RuntimeError::control_flow_out_of_context("continue", stmt.position())),
            }
        }

        Ok(last)
    }

    /// The canonical empty/no-value result: a fresh, slotless `Object`
    /// clone (spec §4.4 "result is the canonical empty/Object value").
    fn empty(&self) -> Value {
        Value::Object(self.roots.object.spawn_clone())
    }

    fn autobox(&self, value: Value) -> Value {
        self.roots.autobox(value)
    }

    /// Autoboxes `value` if needed and unwraps the resulting `Object`; every
    /// message receiver and every slot-assignment target goes through this
    /// (spec §4.4 "Autobox on receiver").
    fn as_object(&self, value: Value) -> Object {
        match self.autobox(value) {
            Value::Object(obj) => obj,
            Value::Raw(_) => unreachable!("Roots::autobox always produces an Object"),
        }
    }

    fn unbox_bool(&self, value: &Value, position: Position) -> Result<bool, RuntimeError> {
        match value {
            Value::Raw(Raw::Bool(b)) => Ok(*b),
            Value::Object(obj) => match obj.own_slot("value") {
                Some(Slot::Value(Value::Raw(Raw::Bool(b)))) => Ok(b),
                _ => Err(RuntimeError::type_error("expected a Boolean", position)),
            },
            _ => Err(RuntimeError::type_error("expected a Boolean", position)),
        }
    }

    // -- statements ----------------------------------------------------------

    fn eval_stmt(&mut self, stmt: &Stmt, env: &mut Env) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => self.eval_expr(expr, env),
            Stmt::Assignment(assignment) => self.eval_assignment(assignment, env),
            Stmt::MethodDef(method_def) => self.eval_method_def(method_def, env),
            Stmt::Return(expr, _) => {
                let flow = self.eval_expr(expr, env)?;
                let value = eval_value!(flow);
                Ok(Flow::Return(value))
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
        }
    }

    fn eval_assignment(&mut self, assignment: &Assignment, env: &mut Env) -> Result<Flow, RuntimeError> {
        match &assignment.target {
            LValue::Identifier(name) => {
                let flow = self.eval_expr(&assignment.value, env)?;
                let value = eval_value!(flow);
                env.assign(name.clone(), value.clone());
                Ok(Flow::Value(value))
            }
            LValue::SlotPath { receiver, slot } => {
                let receiver_flow = self.eval_expr(receiver, env)?;
                let receiver_value = eval_value!(receiver_flow);
                let obj = self.as_object(receiver_value);

                // A bare identifier bound to a raw payload (`i = 1`) names
                // no persistent object until this point; autoboxing above
                // minted a fresh clone just now. Rebind the identifier to
                // that clone so the slot write below is visible the next
                // time the variable is read, instead of mutating a clone
                // nobody keeps a handle to.
                if let Expr::Identifier(name, _) = receiver {
                    env.assign(name.clone(), Value::Object(obj.clone()));
                }

                let value_flow = self.eval_expr(&assignment.value, env)?;
                let value = eval_value!(value_flow);

                obj.set_slot(slot.clone(), value.clone());
                Ok(Flow::Value(value))
            }
        }
    }

    fn eval_method_def(&mut self, method_def: &MethodDef, env: &mut Env) -> Result<Flow, RuntimeError> {
        let receiver_flow = self.eval_expr(&method_def.receiver, env)?;
        let receiver_value = eval_value!(receiver_flow);
        let obj = self.as_object(receiver_value);

        log::debug!("installing method '{}' (arity {}) on {:?}", method_def.name, method_def.params.len(), obj.proto_chain_names());

        obj.set_method_slot(
            method_def.name.clone(),
            Method::User(UserMethod {
                params: method_def.params.clone(),
                body: method_def.body.clone(),
            }),
        );

        Ok(Flow::Value(self.empty()))
    }

    // -- expressions ---------------------------------------------------------

    fn eval_expr(&mut self, expr: &Expr, env: &mut Env) -> Result<Flow, RuntimeError> {
        match expr {
            Expr::Literal(literal, _) => Ok(Flow::Value(eval_literal(literal))),
            Expr::Identifier(name, position) => match env.get(name) {
                Some(value) => Ok(Flow::Value(value)),
                None => Err(RuntimeError::other(format!("undefined identifier '{name}'"), *position)),
            },
            Expr::Paren(inner) => self.eval_expr(inner, env),
            Expr::Message(message) => self.eval_message(message, env),
        }
    }

    fn eval_block(&mut self, block: &Block, env: &mut Env) -> Result<Flow, RuntimeError> {
        let mut last = Flow::Value(self.empty());
        for stmt in &block.stmts {
            last = self.eval_stmt(stmt, env)?;
            if !matches!(last, Flow::Value(_)) {
                return Ok(last);
            }
        }
        Ok(last)
    }

    /// Evaluates a single message send (spec §4.4 "Evaluating a Message
    /// node"): evaluate the receiver, autobox it, look up the selector,
    /// then dispatch on what kind of slot it names.
    fn eval_message(&mut self, message: &Message, env: &mut Env) -> Result<Flow, RuntimeError> {
        let position = message.position;

        let receiver_flow = self.eval_expr(&message.receiver, env)?;
        let receiver_value = eval_value!(receiver_flow);
        let boxed_receiver = self.autobox(receiver_value);
        let receiver_obj = match &boxed_receiver {
            Value::Object(obj) => obj.clone(),
            Value::Raw(_) => unreachable!("Roots::autobox always produces an Object"),
        };

        log::trace!("dispatch '{}' on {:?}", message.selector, receiver_obj.proto_chain_names());

        let Some(slot) = receiver_obj.get_slot(&message.selector) else {
            return Err(RuntimeError::does_not_understand(
                message.selector.clone(),
                receiver_obj.proto_chain_names(),
                position,
            ));
        };

        match slot {
            // A non-method slot sent with no args/block is a field read
            // (spec §4.4 step 4); sending it arguments or a block has no
            // meaning, since plain data slots are not callable.
            Slot::Value(value) => {
                if message.args.is_empty() && message.block.is_none() {
                    Ok(Flow::Value(value))
                } else {
                    Err(RuntimeError::arity_mismatch(message.selector.clone(), 0, message.args.len(), position))
                }
            }
            Slot::Method(Method::Native(NativeSelector::ObjectPrint)) => self.eval_print(message, &boxed_receiver, position),
            Slot::Method(Method::Native(NativeSelector::BooleanIfTrue)) => self.eval_if_true(message, &boxed_receiver, env, position),
            Slot::Method(Method::Native(NativeSelector::BooleanIfFalse)) => self.eval_if_false(message, &boxed_receiver, env, position),
            Slot::Method(Method::Native(NativeSelector::BooleanWhileTrue)) => self.eval_while_true(message, env, position),
            Slot::Method(method) => {
                if message.args.len() != method.arity() {
                    return Err(RuntimeError::arity_mismatch(
                        message.selector.clone(),
                        method.arity(),
                        message.args.len(),
                        position,
                    ));
                }

                let mut args = Vec::with_capacity(message.args.len());
                for arg_expr in &message.args {
                    let flow = self.eval_expr(arg_expr, env)?;
                    args.push(eval_value!(flow));
                }

                match method {
                    Method::Native(tag) => Ok(builtins::compute(tag, &boxed_receiver, &args, &message.selector, position)?),
                    Method::User(user_method) => self.call_user_method(&user_method, boxed_receiver, &args, position),
                }
            }
        }
    }

    /// Runs a user-defined method body in a fresh activation frame (spec
    /// §4.4 step 5): `self` bound to the receiver, parameters bound to the
    /// evaluated arguments, no visibility into the caller's locals (spec
    /// §4.3 "methods are not closures"). `ReturnSignal` is caught here —
    /// the nearest enclosing method activation — and becomes the method's
    /// result; `Break`/`Continue` escaping this far mean there was no
    /// enclosing loop to catch them, which is a runtime error.
    fn call_user_method(&mut self, method: &UserMethod, receiver: Value, args: &[Value], position: Position) -> Result<Flow, RuntimeError> {
        let locals: HashMap<String, Value> = method.params.iter().cloned().zip(args.iter().cloned()).collect();
        let mut activation = Env::activation(self.globals.clone(), receiver, locals);

        match self.eval_block(&method.body, &mut activation)? {
            Flow::Value(value) | Flow::Return(value) => Ok(Flow::Value(value)),
            Flow::Break => Err(RuntimeError::control_flow_out_of_context("break", position)),
            Flow::Continue => Err(RuntimeError::control_flow_out_of_context("continue", position)),
        }
    }

    fn eval_print(&mut self, message: &Message, receiver: &Value, position: Position) -> Result<Flow, RuntimeError> {
        if !message.args.is_empty() {
            return Err(RuntimeError::arity_mismatch("print", 0, message.args.len(), position));
        }
        let text = self.roots.render(receiver);
        writeln!(self.out, "{text}").map_err(|err| RuntimeError::other(format!("failed to write output: {err}"), position))?;
        Ok(Flow::Value(receiver.clone()))
    }

    /// `cond ifTrue { body }` (optionally paired with a folded `ifFalse`,
    /// see the parser's Open Question 2 resolution): runs `block` if
    /// `cond.value` is true, `else_block` otherwise, or the empty value if
    /// the relevant block is absent (spec §4.4 "Built-in block-accepting
    /// methods").
    fn eval_if_true(&mut self, message: &Message, receiver: &Value, env: &mut Env, position: Position) -> Result<Flow, RuntimeError> {
        if !message.args.is_empty() {
            return Err(RuntimeError::arity_mismatch("ifTrue", 0, message.args.len(), position));
        }
        let cond = self.unbox_bool(receiver, position)?;
        match (cond, &message.block, &message.else_block) {
            (true, Some(block), _) => self.eval_block(block, env),
            (false, _, Some(else_block)) => self.eval_block(else_block, env),
            _ => Ok(Flow::Value(self.empty())),
        }
    }

    /// Standalone `cond ifFalse { body }`: runs `block` only if `cond.value`
    /// is false.
    fn eval_if_false(&mut self, message: &Message, receiver: &Value, env: &mut Env, position: Position) -> Result<Flow, RuntimeError> {
        if !message.args.is_empty() {
            return Err(RuntimeError::arity_mismatch("ifFalse", 0, message.args.len(), position));
        }
        let cond = self.unbox_bool(receiver, position)?;
        match (cond, &message.block) {
            (false, Some(block)) => self.eval_block(block, env),
            _ => Ok(Flow::Value(self.empty())),
        }
    }

    /// `cond whileTrue { body }`: re-evaluates the *unevaluated receiver
    /// expression* every iteration rather than the already-evaluated
    /// condition value, since the whole point of the loop is to see a fresh
    /// result each time (spec §4.4 "the receiver here is a freshly
    /// evaluated condition expression"). `break`/`continue` are caught
    /// here, the nearest enclosing loop; `return` propagates through to
    /// the enclosing method activation.
    fn eval_while_true(&mut self, message: &Message, env: &mut Env, position: Position) -> Result<Flow, RuntimeError> {
        if !message.args.is_empty() {
            return Err(RuntimeError::arity_mismatch("whileTrue", 0, message.args.len(), position));
        }
        let Some(body) = &message.block else {
            return Err(RuntimeError::other("'whileTrue' requires a block argument", position));
        };

        loop {
            let cond_flow = self.eval_expr(&message.receiver, env)?;
            let cond_value = eval_value!(cond_flow);
            let boxed_cond = self.autobox(cond_value);
            if !self.unbox_bool(&boxed_cond, position)? {
                break;
            }

            match self.eval_block(body, env)? {
                Flow::Value(_) => {}
                Flow::Break => break,
                Flow::Continue => continue,
                Flow::Return(value) => return Ok(Flow::Return(value)),
            }
        }

        Ok(Flow::Value(self.empty()))
    }
}

fn eval_literal(literal: &Literal) -> Value {
    match literal {
        Literal::Number(NumberLit::Int(n)) => Value::int(*n),
        Literal::Number(NumberLit::Float(n)) => Value::float(*n),
        Literal::Bool(b) => Value::bool(*b),
        Literal::Str(s) => Value::str(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn run(source: &str) -> Result<String, RuntimeError> {
        let tokens = lex(source).expect("lex failed");
        let program = parse(tokens).expect("parse failed");
        let mut buffer = Vec::new();
        {
            let mut interpreter = Interpreter::new(&mut buffer);
            interpreter.run(&program)?;
        }
        Ok(String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_factorial_recursion() {
        let source = "Number fact =\n    self value < 2 ifTrue\n        return self\n    return (self value - 1) fact value * self value\n5 fact print\n";
        assert_eq!(run(source).unwrap(), "120\n");
    }

    #[test]
    fn test_non_local_return_from_while_loop() {
        let source = concat!(
            "Number firstDivBy7 =\n",
            "    i = 1\n",
            "    i value <= self value whileTrue\n",
            "        i value % 7 == 0 ifTrue\n",
            "            return i\n",
            "        i value = i value + 1\n",
            "    return 0\n",
            "20 firstDivBy7 print\n",
        );
        assert_eq!(run(source).unwrap(), "7\n");
    }

    #[test]
    fn test_break_from_loop() {
        let source = concat!(
            "i = 1\n",
            "true whileTrue\n",
            "    i value > 10 ifTrue\n",
            "        break\n",
            "    i value = i value + 1\n",
            "\"Found:\" print\n",
            "i print\n",
        );
        assert_eq!(run(source).unwrap(), "Found:\n11\n");
    }

    #[test]
    fn test_continue_skips_evens() {
        let source = concat!(
            "i = 0\n",
            "i value < 10 whileTrue\n",
            "    i value = i value + 1\n",
            "    i value % 2 == 0 ifTrue\n",
            "        continue\n",
            "    i print\n",
        );
        assert_eq!(run(source).unwrap(), "1\n3\n5\n7\n9\n");
    }

    #[test]
    fn test_if_true_if_false_pairing() {
        let source = "true ifTrue\n    \"yes\" print\nifFalse\n    \"no\" print\n";
        assert_eq!(run(source).unwrap(), "yes\n");

        let source = "false ifTrue\n    \"yes\" print\nifFalse\n    \"no\" print\n";
        assert_eq!(run(source).unwrap(), "no\n");
    }

    #[test]
    fn test_does_not_understand() {
        let err = run("x = Object clone\nx foo\n").unwrap_err();
        assert!(matches!(
            err.kind,
            crate::diagnostics::RuntimeErrorKind::DoesNotUnderstand { .. }
        ));
    }

    #[test]
    fn test_break_at_top_level_is_control_flow_error() {
        let err = run("break\n").unwrap_err();
        assert!(matches!(err.kind, crate::diagnostics::RuntimeErrorKind::ControlFlowOutOfContext(_)));
    }

    #[test]
    fn test_division_by_zero() {
        let err = run("1 / 0 print\n").unwrap_err();
        assert!(matches!(err.kind, crate::diagnostics::RuntimeErrorKind::DivisionByZero));
    }

    #[test]
    fn test_clone_is_identity_distinct_and_slotless() {
        let source = "a = Object clone\na foo = 1\nb = a clone\nb foo\n";
        // `b` sees `foo` only through its prototype chain (`a`), never as
        // its own slot — cloning a clone still resolves up the chain.
        assert_eq!(run(&format!("{source}b print\n")).unwrap(), "1\n");
    }

    #[test]
    fn test_slot_assignment_does_not_mutate_prototype() {
        let source = "a = Object clone\na foo = 1\nb = a clone\nb foo = 2\na foo print\nb foo print\n";
        assert_eq!(run(source).unwrap(), "1\n2\n");
    }

    #[test]
    fn test_string_concat_and_length() {
        let source = "(\"foo\" + \"bar\") print\n\"hello\" length print\n";
        assert_eq!(run(source).unwrap(), "foobar\n5\n");
    }

    #[test]
    fn test_float_promotion() {
        let source = "(1 + 2.5) print\n(4 / 2) print\n";
        assert_eq!(run(source).unwrap(), "3.5\n2\n");
    }
}
