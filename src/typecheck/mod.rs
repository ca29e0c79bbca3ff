//! Type checking for the Pell programming language.
//!
//! This module provides the [`Checker`], which validates a parsed program
//! and annotates its expressions with their types.
//!
//! # Responsibilities
//!
//! - **Name resolution**: every identifier reference resolves to a
//!   declaration; redefinitions and undefined names are reported
//! - **Typing**: every expression in an evaluated context gets a
//!   [`Type`](crate::ast::Type) annotation
//! - **Rule enforcement**: unification of operand types, writable
//!   assignment targets, procedure-call arity and argument shapes,
//!   `in`/`out` parameter access rules, array rules, `global` placement
//!
//! # Error behavior
//!
//! The checker reports every error it finds and keeps going; one broken
//! expression doesn't hide the rest of the program's problems. If any
//! error was recorded the check fails as a whole and the driver stops
//! before the optimizer and code generator, which both assume a valid
//! tree.
//!
//! # Scoping
//!
//! One global scope plus a stack of local scopes. A procedure's scope
//! holds its own name (so it can recurse), its parameters, and its local
//! declarations; lookups see that scope and the globals only. `global`
//! declarations are legal at program top level and nowhere else.
//! Shadowing a global with a local is permitted.
//!
//! # Module Structure
//!
//! - [`error`](self) - the [`TypeError`] type
//! - `symbol` - symbol table
//! - `expr` - expression typing and unification
//! - `stmt` - statement, declaration, and call checking
//! - `tests` - unit tests (test-only)

mod error;
mod expr;
mod stmt;
mod symbol;

#[cfg(test)]
mod tests;

pub use error::TypeError;

use crate::ast::{Decl, Program};
use symbol::SymbolTable;

/// The type checker.
///
/// Create one with [`Checker::new`] and run [`Checker::check`], or use the
/// [`check_program`] convenience wrapper.
pub struct Checker {
    symbols: SymbolTable,
    errors: Vec<TypeError>,
    /// Whether the runtime I/O procedures are predeclared.
    runtime: bool,
}

impl Checker {
    /// Creates a new checker.
    ///
    /// `runtime` controls whether the runtime I/O procedures
    /// (`getInteger`, `putString`, …) are visible as predeclared callees;
    /// the driver turns this off under `--no-runtime`.
    pub fn new(runtime: bool) -> Self {
        Checker {
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            runtime,
        }
    }

    /// Checks a program, annotating expression types in place.
    ///
    /// Returns all recorded errors. Running the checker twice over the
    /// same tree produces the same annotations; typing is deterministic
    /// and scope state is rebuilt from scratch each run.
    pub fn check(mut self, program: &mut Program) -> Result<(), Vec<TypeError>> {
        // Top-level declarations are all visible from the program body and
        // from each other before any body is checked.
        for decl in &mut program.decls {
            self.define_decl(decl, true);
        }

        for decl in &mut program.decls {
            if let Decl::Proc(proc) = decl {
                self.check_proc(proc);
            }
        }

        for stmt in &mut program.body {
            self.check_stmt(stmt);
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Records one error.
    pub(super) fn report(&mut self, error: TypeError) {
        self.errors.push(error);
    }
}

/// Checks a program with a fresh [`Checker`].
///
/// Returns `Ok(())` when the tree is valid; later phases must not run on
/// an invalid tree.
pub fn check_program(program: &mut Program, runtime: bool) -> Result<(), Vec<TypeError>> {
    Checker::new(runtime).check(program)
}
