//! # MyLang
//!
//! This binary runs a single MyLang source file: lex, parse, and evaluate it
//! top to bottom, printing anything the program `print`s to stdout.

extern crate mylang;

mod cli;

use cli::*;

use std::{error::Error, fs, io};

use log::{error, info};
use mylang::{eval::Interpreter, lexer, parser};

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let path = fs::canonicalize(&args.file)?;
    let source = fs::read_to_string(&path)?;

    info!("running {}", path.display());

    let tokens = match lexer::lex(&source) {
        Ok(tokens) => tokens,
        Err(err) => {
            error!("{err}");
            std::process::exit(-1);
        }
    };

    if args.dump_tokens {
        info!("Tokens:\n{:#?}", tokens);
    }

    let program = match parser::parse(tokens) {
        Ok(program) => program,
        Err(err) => {
            error!("{err}");
            std::process::exit(-1);
        }
    };

    if args.dump_ast {
        info!("Parsed AST:\n{:#?}", program);
    }

    let mut interpreter = Interpreter::new(io::stdout());

    if let Err(err) = interpreter.run(&program) {
        error!("{err}");
        std::process::exit(-1);
    }

    Ok(())
}
