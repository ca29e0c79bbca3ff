//! Shared helpers for the integration tests.

use pell::ast::Program;
use pell::codegen::{self, CodegenOptions};
use pell::optimize;
use pell::parser::Parser;
use pell::scanner::Scanner;
use pell::typecheck;

/// Runs scan + parse + check, returning the annotated program.
pub fn frontend(source: &str) -> Program {
    let tokens = Scanner::new(source).scan();
    let mut program = Parser::new(tokens)
        .parse()
        .unwrap_or_else(|errors| panic!("parse failed for {:?}: {:?}", source, errors));
    typecheck::check_program(&mut program, true)
        .unwrap_or_else(|errors| panic!("check failed for {:?}: {:?}", source, errors));
    program
}

/// Runs the whole pipeline to C at the given optimization level.
pub fn compile_to_c(source: &str, level: u8) -> String {
    let mut program = frontend(source);
    optimize::optimize_tree(&mut program, level);
    codegen::generate(
        &program,
        source,
        CodegenOptions {
            verbose: false,
            include_runtime: true,
        },
    )
    .expect("code generation failed")
}
