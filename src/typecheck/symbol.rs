//! Symbol table for the type checker.
//!
//! Scopes are keyed by identifier text alone. The table holds one global
//! scope plus a stack of local scopes; lookup consults the innermost local
//! scope and then the globals, which is the language's visibility rule:
//! a procedure body sees its own names and the globals, nothing in
//! between.

use std::collections::HashMap;

use crate::ast::{Direction, ProcDecl, Type, VarDecl};

/// A procedure parameter signature: type and direction.
#[derive(Debug, Clone, Copy)]
pub(super) struct ParamSig {
    pub ty: Type,
    pub direction: Direction,
    pub is_array: bool,
}

/// What a name resolves to.
#[derive(Debug, Clone)]
pub(super) enum Symbol {
    /// A declared variable.
    Var {
        ty: Type,
        is_array: bool,
    },
    /// A procedure parameter.
    Param {
        ty: Type,
        is_array: bool,
        direction: Direction,
    },
    /// A procedure.
    Proc {
        params: Vec<ParamSig>,
    },
}

impl Symbol {
    /// Builds a variable symbol from its declaration.
    pub(super) fn var(decl: &VarDecl) -> Symbol {
        Symbol::Var {
            ty: decl.ty,
            is_array: decl.is_array(),
        }
    }

    /// Builds a parameter symbol from its declaration and direction.
    pub(super) fn param(decl: &VarDecl, direction: Direction) -> Symbol {
        Symbol::Param {
            ty: decl.ty,
            is_array: decl.is_array(),
            direction,
        }
    }

    /// Builds a procedure symbol from its declaration.
    pub(super) fn proc(decl: &ProcDecl) -> Symbol {
        Symbol::Proc {
            params: decl
                .params
                .iter()
                .map(|p| ParamSig {
                    ty: p.var_decl.ty,
                    direction: p.direction,
                    is_array: p.var_decl.is_array(),
                })
                .collect(),
        }
    }
}

/// One global scope plus a stack of local scopes.
pub(super) struct SymbolTable {
    global: HashMap<String, Symbol>,
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    pub(super) fn new() -> Self {
        SymbolTable {
            global: HashMap::new(),
            scopes: vec![HashMap::new()],
        }
    }

    pub(super) fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub(super) fn leave_scope(&mut self) {
        self.scopes.pop();
    }

    /// Defines `name` in the innermost scope, or the global scope when
    /// `is_global` is set.
    ///
    /// Returns `false` if the name was already defined in that scope; the
    /// first definition is kept so later references still resolve.
    pub(super) fn define(&mut self, name: &str, symbol: Symbol, is_global: bool) -> bool {
        let scope = if is_global {
            &mut self.global
        } else {
            self.scopes.last_mut().expect("scope stack is never empty")
        };

        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), symbol);
        true
    }

    /// Resolves `name` in the innermost local scope, then the program's
    /// top-level scope, then the globals.
    ///
    /// Intermediate scopes are deliberately skipped: a nested procedure
    /// sees its own names, the program's top-level declarations, and the
    /// globals, and never the locals of an enclosing procedure, which the
    /// generated code could not address.
    pub(super) fn lookup(&self, name: &str) -> Option<&Symbol> {
        let innermost = self.scopes.last().expect("scope stack is never empty");
        innermost
            .get(name)
            .or_else(|| {
                if self.scopes.len() > 1 {
                    self.scopes[0].get(name)
                } else {
                    None
                }
            })
            .or_else(|| self.global.get(name))
    }
}
