//! The Pell programming language compiler library.
//!
//! Pell is a small Pascal-like imperative language compiled, in one batch,
//! to portable C. This library provides the whole pipeline between source
//! text and emitted C; the `pell` binary wraps it with a command line and
//! an invocation of the host C compiler.
//!
//! # Pipeline
//!
//! ```text
//! text -> scanner -> parser -> typecheck -> optimize -> codegen -> C
//! ```
//!
//! Each stage consumes the previous stage's product: the scanner yields
//! tokens (never failing; errors ride along as error tokens), the parser
//! builds the AST and accumulates syntax errors across `;` resync points,
//! the type checker resolves names and annotates every expression with
//! its type, the optimizer folds/propagates/eliminates at the requested
//! level, and the code generator lowers the tree to a single C
//! translation unit built on computed gotos and a simulated stack.
//! A failure in one phase is terminal: later phases assume a valid tree.
//!
//! # Modules
//!
//! - [`token`] - token kinds and source spans
//! - [`scanner`] - lexical analysis
//! - [`ast`] - syntax tree definitions and traversal helpers
//! - [`parser`] - recursive descent + Pratt parsing
//! - [`typecheck`] - scope resolution and type validation
//! - [`optimize`] - constant folding, propagation, dead-code elimination
//! - [`codegen`] - C code generation
//! - [`runtime`] - the runtime I/O procedure table
//!
//! # Example
//!
//! ```
//! use pell::codegen::{self, CodegenOptions};
//! use pell::parser::Parser;
//! use pell::scanner::Scanner;
//! use pell::{optimize, typecheck};
//!
//! let source = "program p is int a; begin a := 1 + 2; end program";
//!
//! let tokens = Scanner::new(source).scan();
//! let mut program = Parser::new(tokens).parse().expect("syntax");
//! typecheck::check_program(&mut program, true).expect("types");
//! optimize::optimize_tree(&mut program, 2);
//! let c = codegen::generate(&program, source, CodegenOptions::default())
//!     .expect("codegen");
//!
//! assert!(c.contains("int main() {"));
//! ```

pub mod ast;
pub mod codegen;
pub mod optimize;
pub mod parser;
pub mod runtime;
pub mod scanner;
pub mod token;
pub mod typecheck;
