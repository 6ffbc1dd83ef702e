mod lexmap;
mod token;
mod tokens;

pub use lexmap::*;
pub use token::*;
pub use tokens::*;

use once_cell::sync::Lazy;
use std::iter::Peekable;
use std::vec::IntoIter;

use crate::diagnostics::{LexError, Position};

#[macro_export]
macro_rules! terminal {
    ($map:ident, $name:ident, $value:expr) => {
        $map.insert($value, Terminal::$name);
    };
}

static LEX_MAP: Lazy<LexMap> = Lazy::new(|| {
    let mut m = LexMap::default();

    terminal!(m, True, "true");
    terminal!(m, False, "false");
    terminal!(m, Return, "return");
    terminal!(m, Break, "break");
    terminal!(m, Continue, "continue");
    terminal!(m, IfTrue, "ifTrue");
    terminal!(m, IfFalse, "ifFalse");
    terminal!(m, WhileTrue, "whileTrue");
    terminal!(m, Clone, "clone");

    terminal!(m, LParen, "(");
    terminal!(m, RParen, ")");

    terminal!(m, Plus, "+");
    terminal!(m, Minus, "-");
    terminal!(m, Times, "*");
    terminal!(m, Divide, "/");
    terminal!(m, Percent, "%");

    // Longest-match group: "=" alone is Assign, "==" is the Op selector.
    terminal!(m, Assign, "=");
    terminal!(m, EqEq, "==");
    terminal!(m, Lt, "<");
    terminal!(m, Le, "<=");
    terminal!(m, Gt, ">");
    terminal!(m, Ge, ">=");

    m
});

pub type LexResult<T> = Result<T, LexError>;

/// Tokenizes MyLang source, synthesizing `Newline`/`Indent`/`Dedent` from
/// whitespace (spec §4.1). Owns a normalized (LF-only) copy of the source
/// as a `Vec<char>` so the cursor carries no borrowed lifetime.
#[derive(Debug, Clone)]
pub struct Lexer {
    tokens: Vec<Token>,
    iterator: Peekable<IntoIter<char>>,
    line: usize,
    col: usize,
    /// Indentation widths currently open, always starting at `[0]`.
    indent_stack: Vec<usize>,
    /// Whether the previously emitted token can stand as a receiver, which
    /// disambiguates a leading `-` before a digit as a negative literal
    /// instead of the `-` operator selector.
    prev_token_is_value: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.replace("\r\n", "\n").chars().collect();

        Self {
            tokens: vec![],
            iterator: chars.into_iter().peekable(),
            line: 1,
            col: 1,
            indent_stack: vec![0],
            prev_token_is_value: false,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.iterator.peek().copied()
    }

    fn peek_at(&mut self, offset: usize) -> Option<char> {
        self.iterator.clone().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.iterator.next();
        match next {
            Some('\n') => {
                self.line += 1;
                self.col = 1;
            }
            Some(_) => self.col += 1,
            None => {}
        }
        next
    }

    fn position(&self) -> Position {
        (self.line, self.col)
    }

    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        self.measure_indent()?;

        loop {
            self.skip_inline_whitespace();

            let Some(next) = self.peek() else {
                self.finish();
                break;
            };

            match next {
                '\n' => {
                    self.advance();
                    self.push(TokenKind::Newline);
                    self.measure_indent()?;
                }
                '#' => self.skip_comment(),
                '"' => self.lex_string()?,
                'a'..='z' | 'A'..='Z' | '_' => self.lex_alphanumeric(),
                '0'..='9' => self.lex_numeric()?,
                '-' if !self.prev_token_is_value && matches!(self.peek_at(1), Some('0'..='9')) => {
                    self.lex_numeric()?
                }
                _ => self.lex_special()?,
            }
        }

        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind) {
        self.prev_token_is_value = matches!(
            kind,
            TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::Str(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::RParen
        );
        self.tokens.push(Token::new(kind, self.position()));
    }

    /// Skip spaces/tabs that are not part of leading indentation. Tabs are
    /// only forbidden in leading whitespace; mid-line tabs are harmless
    /// formatting.
    fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
    }

    fn skip_comment(&mut self) {
        debug_assert_eq!(self.peek(), Some('#'));
        while !matches!(self.peek(), Some('\n') | None) {
            self.advance();
        }
    }

    /// Measure the leading whitespace of each upcoming logical line,
    /// skipping blank/comment-only lines (spec §4.1), until a line with
    /// real content is found or the input ends. Emits `Indent`/`Dedent`
    /// for that line only.
    fn measure_indent(&mut self) -> LexResult<()> {
        loop {
            let start = self.position();
            let mut width = 0usize;

            loop {
                match self.peek() {
                    Some(' ') => {
                        self.advance();
                        width += 1;
                    }
                    Some('\t') => {
                        return Err(LexError::new(
                            "tabs are not allowed in leading whitespace",
                            self.position(),
                        ));
                    }
                    _ => break,
                }
            }

            match self.peek() {
                None => return Ok(()),
                Some('\n') => {
                    self.advance();
                    self.push(TokenKind::Newline);
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    if matches!(self.peek(), Some('\n')) {
                        self.advance();
                        self.push(TokenKind::Newline);
                    }
                    continue;
                }
                _ => {
                    self.apply_indent(width, start)?;
                    return Ok(());
                }
            }
        }
    }

    fn apply_indent(&mut self, width: usize, position: Position) -> LexResult<()> {
        let top = *self.indent_stack.last().expect("indent stack never empty");

        if width > top {
            self.indent_stack.push(width);
            self.tokens.push(Token::new(TokenKind::Indent, position));
            log::trace!("indent -> {width} at {}:{}", position.0, position.1);
        } else if width < top {
            while *self.indent_stack.last().expect("indent stack never empty") > width {
                self.indent_stack.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, position));
                log::trace!("dedent at {}:{}", position.0, position.1);
            }
            if *self.indent_stack.last().expect("indent stack never empty") != width {
                return Err(LexError::new(
                    format!("inconsistent indentation: {width} spaces matches no enclosing block"),
                    position,
                ));
            }
        }

        Ok(())
    }

    fn finish(&mut self) {
        let needs_trailing_newline = !matches!(
            self.tokens.last().map(|t| &t.kind),
            Some(TokenKind::Newline) | Some(TokenKind::Indent) | Some(TokenKind::Dedent) | None
        );
        if needs_trailing_newline {
            self.tokens.push(Token::new(TokenKind::Newline, self.position()));
        }

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, self.position()));
        }

        self.tokens.push(Token::new(TokenKind::Eof, self.position()));
    }

    fn lex_alphanumeric(&mut self) {
        let position = self.position();
        let mut read = String::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                read.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match LEX_MAP.get(read.as_str()) {
            Some(terminal) => terminal.to_token(position).kind,
            None => TokenKind::Ident(read),
        };
        self.push(kind);
    }

    fn lex_numeric(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut read = String::new();

        if self.peek() == Some('-') {
            read.push('-');
            self.advance();
        }

        while matches!(self.peek(), Some('0'..='9')) {
            read.push(self.advance().expect("checked by matches!"));
        }

        let mut is_float = false;
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some('0'..='9')) {
            is_float = true;
            read.push(self.advance().expect("checked above"));
            while matches!(self.peek(), Some('0'..='9')) {
                read.push(self.advance().expect("checked by matches!"));
            }
        }

        let number = if is_float {
            read.parse::<f64>()
                .map(NumberLit::Float)
                .map_err(|_| LexError::new(format!("failed to lex number '{read}'"), position))?
        } else {
            read.parse::<i64>()
                .map(NumberLit::Int)
                .map_err(|_| LexError::new(format!("failed to lex number '{read}'"), position))?
        };

        self.tokens.push(Token::new(TokenKind::Number(number), position));
        self.prev_token_is_value = true;
        Ok(())
    }

    fn lex_string(&mut self) -> LexResult<()> {
        let position = self.position();
        debug_assert_eq!(self.peek(), Some('"'));
        self.advance();

        let mut read = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\n') | None => {
                    return Err(LexError::new("unterminated string literal", position));
                }
                Some(c) => {
                    read.push(c);
                    self.advance();
                }
            }
        }

        self.push(TokenKind::Str(read));
        Ok(())
    }

    fn lex_special(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut read = String::new();

        loop {
            let Some(next) = self.peek() else {
                break;
            };
            read.push(next);
            self.advance();

            let can_read_next = self
                .peek()
                .map(|item| {
                    let mut candidate = read.clone();
                    candidate.push(item);
                    LEX_MAP.can_match(candidate.as_str())
                })
                .unwrap_or(false);

            if can_read_next {
                continue;
            }

            break;
        }

        let Some(terminal) = LEX_MAP.get(read.as_str()) else {
            return Err(LexError::new(format!("failed to lex '{read}'"), position));
        };

        let token = terminal.to_token(position);
        self.push(token.kind);
        Ok(())
    }
}

pub fn lex(source: &str) -> LexResult<Vec<Token>> {
    Lexer::new(source).lex()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_ident() {
        assert_eq!(
            kinds("letter"),
            vec![TokenKind::Ident("letter".into()), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_integer() {
        assert_eq!(
            kinds("1337"),
            vec![
                TokenKind::Number(NumberLit::Int(1337)),
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_float() {
        assert_eq!(
            kinds("13.5"),
            vec![
                TokenKind::Number(NumberLit::Float(13.5)),
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_negative_literal_at_expression_start() {
        assert_eq!(
            kinds("-1 print"),
            vec![
                TokenKind::Number(NumberLit::Int(-1)),
                TokenKind::Ident("print".into()),
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_minus_is_operator_after_value() {
        assert_eq!(
            kinds("5 - 1"),
            vec![
                TokenKind::Number(NumberLit::Int(5)),
                TokenKind::Op("-".into()),
                TokenKind::Number(NumberLit::Int(1)),
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_lex_string() {
        assert_eq!(
            kinds(r#""hello world""#),
            vec![TokenKind::Str("hello world".into()), TokenKind::Newline, TokenKind::Eof]
        );
    }

    #[test]
    fn test_lex_keywords_not_idents() {
        assert_eq!(
            kinds("true false clone ifTrue ifFalse whileTrue return break continue"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::Clone,
                TokenKind::IfTrue,
                TokenKind::IfFalse,
                TokenKind::WhileTrue,
                TokenKind::Return,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_operators_longest_match() {
        assert_eq!(
            kinds("a <= b == c >= d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Op("<=".into()),
                TokenKind::Ident("b".into()),
                TokenKind::Op("==".into()),
                TokenKind::Ident("c".into()),
                TokenKind::Op(">=".into()),
                TokenKind::Ident("d".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_indentation() {
        let source = "a\n    b\n    c\nd\n";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Ident("b".into()),
                TokenKind::Newline,
                TokenKind::Ident("c".into()),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Ident("d".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_blank_and_comment_lines_emit_no_indent() {
        let source = "a\n\n    # just a comment\nb\n";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Ident("b".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_inconsistent_indentation_is_error() {
        let source = "a\n    b\n  c\n";
        assert!(lex(source).is_err());
    }

    #[test]
    fn test_lex_tab_in_indentation_is_error() {
        let source = "a\n\tb\n";
        assert!(lex(source).is_err());
    }

    #[test]
    fn test_lex_dedent_at_eof() {
        let source = "a\n    b";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Ident("b".into()),
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Eof,
            ]
        );
    }
}
