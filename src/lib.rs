//! MyLang: a small, prototype-based, indentation-sensitive object language
//! whose execution model is "everything is a message send to an object".
//!
//! This crate is the interpreter core: an indentation-tracking [`lexer`],
//! an arity-directed [`parser`], the prototype [`object`] model with
//! autoboxed primitives, and a tree-walking [`eval`]uator. [`builtins`]
//! bootstraps the four root prototypes (`Object`/`Number`/`Boolean`/
//! `String`) and the native methods installed on them.

pub mod ast;
pub mod builtins;
pub mod diagnostics;
pub mod eval;
pub mod lexer;
pub mod object;
pub mod parser;

pub use diagnostics::MyLangError;
pub use object::Value;

/// Lexes, parses, and evaluates `source` as a single program against a
/// fresh interpreter instance, writing anything the program `print`s to
/// `out` (spec §6: "Files are evaluated from top to bottom as a single
/// program against a fresh root environment").
pub fn run_source<W: std::io::Write>(source: &str, out: W) -> Result<Value, MyLangError> {
    let tokens = lexer::lex(source)?;
    let program = parser::parse(tokens)?;
    let mut interpreter = eval::Interpreter::new(out);
    Ok(interpreter.run(&program)?)
}

/// Convenience entry point for tests and the shell: runs `source` and
/// returns everything it printed, buffered into one string.
pub fn run_and_capture(source: &str) -> Result<String, MyLangError> {
    let mut buffer = Vec::new();
    run_source(source, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_and_capture_fizzbuzz() {
        let source = concat!(
            "Number fizzbuzz =\n",
            "    self value % 15 == 0 ifTrue\n",
            "        \"FizzBuzz\" print\n",
            "        return self\n",
            "    self value % 3 == 0 ifTrue\n",
            "        \"Fizz\" print\n",
            "        return self\n",
            "    self value % 5 == 0 ifTrue\n",
            "        \"Buzz\" print\n",
            "        return self\n",
            "    self print\n",
            "    return self\n",
            "i = 1\n",
            "i value <= 15 whileTrue\n",
            "    i fizzbuzz\n",
            "    i value = i value + 1\n",
        );
        let expected = "1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz\n";
        assert_eq!(run_and_capture(source).unwrap(), expected);
    }

    #[test]
    fn test_run_source_propagates_lex_error() {
        let err = run_and_capture("x = \"unterminated\n");
        assert!(matches!(err, Err(MyLangError::Lex(_))));
    }

    #[test]
    fn test_run_source_propagates_runtime_error() {
        let err = run_and_capture("x = Object clone\nx foo\n");
        assert!(matches!(err, Err(MyLangError::Runtime(_))));
    }
}
