//! The arity-directed recursive-descent parser (spec §4.2).
//!
//! The defining mechanic: a message selector's declared arity determines how
//! many following primary expressions the parser consumes as its arguments.
//! Arity is looked up in a *shadow table* that the parser itself populates as
//! soon as it parses a method definition, so a method becomes callable with
//! its full arity from the very next statement onward (spec §4.2 step 2-3,
//! §9 "Arity-directed parsing"). Forward references to not-yet-declared
//! multi-argument methods fall back to zero arguments (step 3) and are
//! resolved dynamically by the evaluator instead.

use std::collections::HashMap;

use crate::ast::{Assignment, Block, Expr, LValue, Literal, Message, MethodDef, Program, Stmt};
use crate::diagnostics::{ParseError, Position};
use crate::lexer::{Token, TokenKind, Tokens};

pub type ParseResult<T> = Result<T, ParseError>;

/// Selectors whose arity is known from bootstrap, before any user code runs
/// (spec §6's prelude). Kept as a flat `name -> arity` map rather than keyed
/// by receiver type: no two built-ins share a selector name with different
/// arities, so a single shadow table is sufficient to implement "the static
/// prototype view" (spec §4.2 step 1) without threading per-receiver-type
/// tracking through the parser.
fn builtin_shadow() -> HashMap<String, usize> {
    let mut m = HashMap::new();
    for (name, arity) in [
        ("clone", 0),
        ("print", 0),
        ("==", 1),
        ("+", 1),
        ("-", 1),
        ("*", 1),
        ("/", 1),
        ("%", 1),
        ("<", 1),
        ("<=", 1),
        (">=", 1),
        (">", 1),
        ("not", 0),
        ("ifTrue", 0),
        ("ifFalse", 0),
        ("whileTrue", 0),
        ("length", 0),
    ] {
        m.insert(name.to_string(), arity);
    }
    m
}

pub struct Parser {
    tokens: Tokens<Token>,
    /// The shadow table of declared method arities (spec §4.2/§9).
    shadow: HashMap<String, usize>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: Tokens::new(tokens),
            shadow: builtin_shadow(),
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_eof() {
            stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(Program::new(stmts))
    }

    // -- token-stream helpers --------------------------------------------

    fn peek(&mut self) -> Option<Token> {
        self.tokens.peek()
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.tokens.peek().map(|t| t.kind)
    }

    fn peek_at_kind(&mut self, offset: usize) -> Option<TokenKind> {
        self.tokens.peek_at(offset).map(|t| t.kind)
    }

    fn at_eof(&mut self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Eof) | None)
    }

    fn advance(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn current_position(&mut self) -> Position {
        self.peek().map(|t| t.position).unwrap_or((0, 0))
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ParseError::new(
                format!("expected {kind:?}, found {:?}", token.kind),
                token.position,
            )),
            None => Err(ParseError::new(format!("expected {kind:?}, found end of input"), (0, 0))),
        }
    }

    fn expect_newline(&mut self) -> ParseResult<()> {
        match self.peek_kind() {
            Some(TokenKind::Newline) => {
                self.advance();
                Ok(())
            }
            Some(TokenKind::Eof) | None => Ok(()),
            Some(other) => Err(ParseError::new(
                format!("expected end of statement, found {other:?}"),
                self.current_position(),
            )),
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), Some(TokenKind::Newline)) {
            self.advance();
        }
    }

    // -- statements --------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let Some(token) = self.peek() else {
            return Err(ParseError::new("unexpected end of input", (0, 0)));
        };

        match token.kind {
            TokenKind::Return => {
                self.advance();
                let expr = self.parse_expr_chain()?;
                self.expect_newline()?;
                Ok(Stmt::Return(expr, token.position))
            }
            TokenKind::Break => {
                self.advance();
                self.expect_newline()?;
                Ok(Stmt::Break(token.position))
            }
            TokenKind::Continue => {
                self.advance();
                self.expect_newline()?;
                Ok(Stmt::Continue(token.position))
            }
            _ => self.parse_assignment_or_expr_stmt(),
        }
    }

    fn parse_block_stmts(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !matches!(self.peek_kind(), Some(TokenKind::Dedent) | Some(TokenKind::Eof) | None) {
            stmts.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(stmts)
    }

    /// Dispatches on lookahead past the LHS expression to tell a method
    /// definition from a slot/variable assignment from a bare expression
    /// statement (spec §4.2 "Top level").
    fn parse_assignment_or_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let lhs = self.parse_expr_chain()?;
        let lhs_position = lhs.position();

        if !matches!(self.peek_kind(), Some(TokenKind::Assign)) {
            self.expect_newline()?;
            return Ok(Stmt::Expression(lhs));
        }
        self.advance(); // '='

        if matches!(self.peek_kind(), Some(TokenKind::Return)) {
            let (receiver, name, params) = extract_def_target(lhs)?;
            self.shadow.insert(name.clone(), params.len());
            let return_position = self.current_position();
            self.advance(); // 'return'
            let expr = self.parse_expr_chain()?;
            self.expect_newline()?;
            let body = Block::new(vec![Stmt::Return(expr, return_position)]);
            return Ok(Stmt::MethodDef(MethodDef {
                receiver,
                name,
                params,
                body,
                position: lhs_position,
            }));
        }

        if matches!(self.peek_kind(), Some(TokenKind::Newline)) && matches!(self.peek_at_kind(1), Some(TokenKind::Indent)) {
            let (receiver, name, params) = extract_def_target(lhs)?;
            self.shadow.insert(name.clone(), params.len());
            self.advance(); // Newline
            self.advance(); // Indent
            let stmts = self.parse_block_stmts()?;
            self.expect(TokenKind::Dedent)?;
            let body = Block::new(stmts);
            return Ok(Stmt::MethodDef(MethodDef {
                receiver,
                name,
                params,
                body,
                position: lhs_position,
            }));
        }

        let target = to_lvalue(lhs)?;
        let value = self.parse_expr_chain()?;
        self.expect_newline()?;
        Ok(Stmt::Assignment(Assignment {
            target,
            value,
            position: lhs_position,
        }))
    }

    // -- expressions ---------------------------------------------------------

    /// Builds a message chain left-to-right: a primary receiver, then zero
    /// or more `selector arg...` messages, each selector's arity read from
    /// the shadow table (spec §4.2 "Expressions: arity-directed message
    /// parsing").
    fn parse_expr_chain(&mut self) -> ParseResult<Expr> {
        let mut receiver = self.parse_primary()?;

        while let Some(token) = self.peek() {
            let Some(selector) = token.selector_text().map(str::to_string) else {
                break;
            };
            let position = token.position;
            self.advance();

            let arity = self.shadow.get(&selector).copied().unwrap_or(0);
            let mut args = Vec::with_capacity(arity);
            for _ in 0..arity {
                args.push(self.parse_primary()?);
            }

            let block = self.try_parse_block_argument()?;
            let mut message = Message {
                receiver: Box::new(receiver),
                selector: selector.clone(),
                args,
                block,
                else_block: None,
                position,
            };

            // `cond ifTrue { .. } ifFalse { .. }` folds into one Message
            // node against the original receiver: the parser recognizes
            // `ifFalse` immediately following a completed `ifTrue` message
            // and attaches its block as `else_block` rather than starting
            // a new chain link.
            if selector == "ifTrue" && matches!(self.peek_kind(), Some(TokenKind::IfFalse)) {
                self.advance();
                message.else_block = self.try_parse_block_argument()?;
            }

            receiver = Expr::Message(message);
        }

        Ok(receiver)
    }

    fn try_parse_block_argument(&mut self) -> ParseResult<Option<Block>> {
        if matches!(self.peek_kind(), Some(TokenKind::Newline)) && matches!(self.peek_at_kind(1), Some(TokenKind::Indent)) {
            self.advance(); // Newline
            self.advance(); // Indent
            let stmts = self.parse_block_stmts()?;
            self.expect(TokenKind::Dedent)?;
            Ok(Some(Block::new(stmts)))
        } else {
            Ok(None)
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.advance() else {
            return Err(ParseError::new("expected an expression, found end of input", (0, 0)));
        };

        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Literal::Number(n), token.position)),
            TokenKind::Str(s) => Ok(Expr::Literal(Literal::Str(s), token.position)),
            TokenKind::True => Ok(Expr::Literal(Literal::Bool(true), token.position)),
            TokenKind::False => Ok(Expr::Literal(Literal::Bool(false), token.position)),
            TokenKind::Ident(name) => Ok(Expr::Identifier(name, token.position)),
            TokenKind::LParen => {
                let inner = self.parse_expr_chain()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            other => Err(ParseError::new(format!("expected an expression, found {other:?}"), token.position)),
        }
    }
}

/// Interprets a fully-parsed LHS message chain as a method definition target
/// once `=` has been found to be followed by `return ...` or an indented
/// block (spec §4.2 "Method definitions"). Two shapes occur in practice:
///
/// - The final selector was *unresolved* at parse time (arity fell back to
///   0, spec §4.2 step 3) — this is the common case for a method's own
///   name, and for any declared parameter after it, since each subsequent
///   bare identifier is itself parsed as a fresh zero-arg message against
///   the growing receiver. Peeling these off front-to-back recovers `name`
///   followed by the declared parameter names, in declaration order.
/// - The final selector was *already known* (e.g. redefining an operator
///   like `Number < other`) and so already consumed its formal parameters
///   as message arguments; those argument expressions must themselves be
///   plain identifiers.
fn extract_def_target(expr: Expr) -> ParseResult<(Expr, String, Vec<String>)> {
    match expr {
        Expr::Message(Message {
            receiver,
            selector,
            args,
            block: None,
            else_block: None,
            ..
        }) if args.is_empty() => {
            let mut chain = vec![selector];
            let mut cur = *receiver;
            loop {
                match cur {
                    Expr::Message(Message {
                        receiver: inner_receiver,
                        selector: inner_selector,
                        args: inner_args,
                        block: None,
                        else_block: None,
                        ..
                    }) if inner_args.is_empty() => {
                        chain.push(inner_selector);
                        cur = *inner_receiver;
                    }
                    base => {
                        chain.reverse();
                        let name = chain.remove(0);
                        return Ok((base, name, chain));
                    }
                }
            }
        }
        Expr::Message(Message {
            receiver,
            selector,
            args,
            block: None,
            else_block: None,
            ..
        }) => {
            let mut params = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Expr::Identifier(name, _) => params.push(name),
                    other => {
                        return Err(ParseError::new(
                            "method definition parameters must be plain identifiers",
                            other.position(),
                        ))
                    }
                }
            }
            Ok((*receiver, selector, params))
        }
        other => Err(ParseError::new("malformed method definition target", other.position())),
    }
}

/// Interprets a fully-parsed LHS expression as an assignment target once
/// `=` turned out to be followed by a plain expression rather than a method
/// body (spec §9, Open Question 1): a bare identifier binds/rebinds a
/// variable; a single zero-arg message is a slot path on its receiver.
fn to_lvalue(expr: Expr) -> ParseResult<LValue> {
    match expr {
        Expr::Identifier(name, _) => Ok(LValue::Identifier(name)),
        Expr::Message(Message {
            receiver,
            selector,
            args,
            block: None,
            else_block: None,
            ..
        }) if args.is_empty() => Ok(LValue::SlotPath {
            receiver: *receiver,
            slot: selector,
        }),
        other => Err(ParseError::new("invalid assignment target", other.position())),
    }
}

pub fn parse(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> Program {
        parse(lex(source).expect("lex failed")).expect("parse failed")
    }

    #[test]
    fn test_parse_variable_assignment() {
        let program = parse_source("x = 5\n");
        assert_eq!(program.stmts.len(), 1);
        match &program.stmts[0] {
            Stmt::Assignment(Assignment { target, value, .. }) => {
                assert_eq!(*target, LValue::Identifier("x".into()));
                assert_eq!(*value, Expr::Literal(Literal::Number(crate::lexer::NumberLit::Int(5)), (1, 5)));
            }
            other => panic!("expected assignment, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_slot_path_assignment() {
        let program = parse_source("i value = i value + 1\n");
        match &program.stmts[0] {
            Stmt::Assignment(Assignment { target, .. }) => match target {
                LValue::SlotPath { receiver, slot } => {
                    assert_eq!(*receiver, Expr::Identifier("i".into(), (1, 1)));
                    assert_eq!(slot, "value");
                }
                other => panic!("expected slot path, found {other:?}"),
            },
            other => panic!("expected assignment, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_zero_arity_method_def() {
        let program = parse_source("Number fact =\n    return self\n");
        match &program.stmts[0] {
            Stmt::MethodDef(MethodDef { receiver, name, params, body, .. }) => {
                assert_eq!(*receiver, Expr::Identifier("Number".into(), (1, 1)));
                assert_eq!(name, "fact");
                assert!(params.is_empty());
                assert_eq!(body.stmts.len(), 1);
            }
            other => panic!("expected method def, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_single_param_operator_method_def() {
        let program = parse_source("Number < other = return self\n");
        match &program.stmts[0] {
            Stmt::MethodDef(MethodDef { receiver, name, params, .. }) => {
                assert_eq!(*receiver, Expr::Identifier("Number".into(), (1, 1)));
                assert_eq!(name, "<");
                assert_eq!(params, &vec!["other".to_string()]);
            }
            other => panic!("expected method def, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_message_chain_arity_forward_fallback() {
        // `fact` is unresolved at this point, so it parses with 0 args.
        let program = parse_source("5 fact\n");
        match &program.stmts[0] {
            Stmt::Expression(Expr::Message(Message { selector, args, .. })) => {
                assert_eq!(selector, "fact");
                assert!(args.is_empty());
            }
            other => panic!("expected expression statement, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_known_arity_operator_consumes_one_arg() {
        let program = parse_source("Number < other = return self\n5 < 6\n");
        match &program.stmts[1] {
            Stmt::Expression(Expr::Message(Message { selector, args, .. })) => {
                assert_eq!(selector, "<");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected expression statement, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_if_true_if_false_pairing() {
        let source = "true ifTrue\n    1 print\nifFalse\n    2 print\n";
        let program = parse_source(source);
        match &program.stmts[0] {
            Stmt::Expression(Expr::Message(Message { selector, block, else_block, .. })) => {
                assert_eq!(selector, "ifTrue");
                assert!(block.is_some());
                assert!(else_block.is_some());
            }
            other => panic!("expected expression statement, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_standalone_if_false() {
        let program = parse_source("false ifFalse\n    1 print\n");
        match &program.stmts[0] {
            Stmt::Expression(Expr::Message(Message { selector, block, else_block, .. })) => {
                assert_eq!(selector, "ifFalse");
                assert!(block.is_some());
                assert!(else_block.is_none());
            }
            other => panic!("expected expression statement, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_paren_regroups() {
        let program = parse_source("(1 + 2) print\n");
        match &program.stmts[0] {
            Stmt::Expression(Expr::Message(Message { receiver, selector, .. })) => {
                assert_eq!(selector, "print");
                assert!(matches!(**receiver, Expr::Paren(_)));
            }
            other => panic!("expected expression statement, found {other:?}"),
        }
    }

    #[test]
    fn test_parse_return_break_continue_statements() {
        let program = parse_source("Number f =\n    return 1\n");
        let body = match &program.stmts[0] {
            Stmt::MethodDef(m) => &m.body,
            other => panic!("expected method def, found {other:?}"),
        };
        assert!(matches!(body.stmts[0], Stmt::Return(_, _)));

        let program = parse_source("break\ncontinue\n");
        assert!(matches!(program.stmts[0], Stmt::Break(_)));
        assert!(matches!(program.stmts[1], Stmt::Continue(_)));
    }

    #[test]
    fn test_parse_malformed_method_def_params_rejected() {
        let err = parse(lex("Number foo 1 =\n    return self\n").unwrap());
        assert!(err.is_err());
    }
}
