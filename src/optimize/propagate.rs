//! Constant propagation.
//!
//! Extends constant folding with knowledge of variables: assignments of
//! literals outside any branch or loop are recorded, and later reads of
//! those names substitute the recorded literal, which in turn feeds more
//! folding. Anything that could change a variable on a path the pass
//! cannot see (a branch, a loop, an `out` argument) invalidates what is
//! known about it.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::ast::visit;
use crate::ast::{Decl, Direction, Expr, ExprKind, ProcDecl, Program, Stmt, StmtKind};
use crate::runtime;

use super::fold::fold_expr;

/// A recorded literal value.
#[derive(Debug, Clone)]
enum Lit {
    Num(String),
    Str(String),
}

impl Lit {
    fn of(expr: &Expr) -> Option<Lit> {
        match &expr.kind {
            ExprKind::Num(lexeme) => Some(Lit::Num(lexeme.clone())),
            ExprKind::Str(lexeme) => Some(Lit::Str(lexeme.clone())),
            _ => None,
        }
    }

    fn to_expr(&self, like: &Expr) -> Expr {
        let kind = match self {
            Lit::Num(lexeme) => ExprKind::Num(lexeme.clone()),
            Lit::Str(lexeme) => ExprKind::Str(lexeme.clone()),
        };
        let mut expr = Expr::new(kind, like.span);
        expr.ty = like.ty;
        expr
    }
}

/// What a name is bound to during propagation.
#[derive(Debug, Clone)]
enum Binding {
    /// A variable with its last known constant value, or `None` when the
    /// value is unknown.
    Value(Option<Lit>),
    /// A procedure; the directions drive `out`-argument invalidation.
    Proc(Vec<Direction>),
}

/// The constant propagation pass.
pub struct ConstantPropagator {
    /// Whether this walk changed the tree.
    pub modified: bool,
    global: HashMap<String, Binding>,
    scopes: Vec<HashMap<String, Binding>>,
    /// Depth of enclosing branches/loops; positive means assignments
    /// invalidate instead of recording.
    no_propagation: usize,
    /// Whether uninitialized reads should warn. Armed for the first
    /// fixed-point round only, and disarmed after the first report so the
    /// warning appears once per compilation.
    warn_uninitialized: bool,
}

impl ConstantPropagator {
    /// Creates a new propagator.
    ///
    /// `warn_uninitialized` arms the once-per-compilation warning about
    /// reads of never-assigned variables.
    pub fn new(warn_uninitialized: bool) -> Self {
        ConstantPropagator {
            modified: false,
            global: HashMap::new(),
            scopes: vec![HashMap::new()],
            no_propagation: 0,
            warn_uninitialized,
        }
    }

    /// Propagates and folds constants through the program, in place.
    pub fn walk(&mut self, program: &mut Program) {
        // Procedures become visible first so calls resolve their
        // parameter directions.
        for decl in &program.decls {
            if let Decl::Proc(proc) = decl {
                self.define(
                    &proc.name,
                    Binding::Proc(param_directions(proc)),
                    proc.is_global,
                );
            }
        }

        // Procedure bodies are visited before the program body, so no
        // top-level constant can leak into a procedure that might run
        // under different values.
        for decl in &mut program.decls {
            if let Decl::Proc(proc) = decl {
                self.visit_proc(proc);
            }
        }

        for stmt in &mut program.body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_proc(&mut self, proc: &mut ProcDecl) {
        self.scopes.push(HashMap::new());

        let directions = param_directions(proc);
        self.define(&proc.name, Binding::Proc(directions), false);
        for param in &proc.params {
            // Parameters have caller-supplied values: present but unknown.
            self.define(&param.var_decl.name, Binding::Value(None), false);
        }
        for decl in &proc.decls {
            if let Decl::Proc(nested) = decl {
                self.define(&nested.name, Binding::Proc(param_directions(nested)), false);
            }
            // Local variables start undefined; a read before the first
            // assignment is what the uninitialized warning catches.
        }

        for decl in &mut proc.decls {
            if let Decl::Proc(nested) = decl {
                self.visit_proc(nested);
            }
        }
        for stmt in &mut proc.body {
            self.visit_stmt(stmt);
        }

        self.scopes.pop();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Assign { target, value } => {
                self.propagate_expr(value);
                if let ExprKind::Subscript { index, .. } = &mut target.kind {
                    self.propagate_expr(index);
                }

                // Array elements are never tracked; a scalar target is
                // recorded when the pass can still see every path here,
                // invalidated otherwise.
                if let Some(id) = target.as_name() {
                    let id = id.to_string();
                    let known = if self.no_propagation == 0 {
                        Lit::of(value)
                    } else {
                        None
                    };
                    self.set(&id, known);
                }
            }

            StmtKind::If { test, body, orelse } => {
                self.propagate_expr(test);
                self.no_propagation += 1;
                for stmt in body.iter_mut().chain(orelse.iter_mut()) {
                    self.visit_stmt(stmt);
                }
                self.no_propagation -= 1;
            }

            StmtKind::For { init, test, body } => {
                // Anything the body assigns must be forgotten before the
                // test and body are visited: the first iteration's reads
                // already see values from later iterations.
                for name in assigned_names(body) {
                    self.set(&name, None);
                }

                self.no_propagation += 1;
                self.visit_stmt(init);
                self.propagate_expr(test);
                for stmt in body {
                    self.visit_stmt(stmt);
                }
                self.no_propagation -= 1;
            }

            StmtKind::Call { name, args } => {
                let directions = self.call_directions(name, args.len());
                for (arg, direction) in args.iter_mut().zip(directions) {
                    match direction {
                        Direction::Out => {
                            // The callee writes through this argument.
                            if let Some(id) = arg.as_name() {
                                let id = id.to_string();
                                self.set(&id, None);
                            }
                        }
                        Direction::In => self.propagate_expr(arg),
                    }
                }
            }

            StmtKind::Return => {}
        }
    }

    /// Substitutes known names and folds, post-order.
    ///
    /// Substitution feeds folding: once a name becomes a literal, the
    /// operation above it may fold on the same walk.
    fn propagate_expr(&mut self, expr: &mut Expr) {
        let mut modified = false;

        visit::walk_expr_mut(expr, &mut |node| {
            if let ExprKind::Name(id) = &node.kind {
                let id = id.clone();
                if let Some(lit) = self.get_const(&id, node.span) {
                    let replacement = lit.to_expr(node);
                    *node = replacement;
                    modified = true;
                }
            } else if fold_expr(node) {
                modified = true;
            }
        });

        self.modified |= modified;
    }

    /// Returns the recorded literal for a name, warning on reads of names
    /// no scope knows anything about.
    fn get_const(&mut self, id: &str, span: crate::token::Span) -> Option<Lit> {
        match self.lookup(id) {
            Some(Binding::Value(known)) => known.clone(),
            Some(Binding::Proc(_)) => None,
            None => {
                if self.warn_uninitialized {
                    warn!(
                        "line {}: uninitialized variable '{}' referenced",
                        span.line, id
                    );
                    self.warn_uninitialized = false;
                }
                None
            }
        }
    }

    fn lookup(&self, id: &str) -> Option<&Binding> {
        let innermost = self.scopes.last().expect("scope stack is never empty");
        innermost
            .get(id)
            .or_else(|| {
                if self.scopes.len() > 1 {
                    self.scopes[0].get(id)
                } else {
                    None
                }
            })
            .or_else(|| self.global.get(id))
    }

    fn define(&mut self, id: &str, binding: Binding, is_global: bool) {
        let scope = if is_global {
            &mut self.global
        } else {
            self.scopes.last_mut().expect("scope stack is never empty")
        };
        scope.insert(id.to_string(), binding);
    }

    /// Records or invalidates a variable in the innermost scope.
    fn set(&mut self, id: &str, known: Option<Lit>) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(id.to_string(), Binding::Value(known));
    }

    /// Resolves the parameter directions of a callee.
    ///
    /// Unknown callees (which a valid tree only produces for runtime
    /// procedures) conservatively treat every argument as `out`.
    fn call_directions(&self, name: &str, arity: usize) -> Vec<Direction> {
        if let Some(Binding::Proc(directions)) = self.lookup(name) {
            return directions.clone();
        }
        if let Some(proc) = runtime::lookup(name) {
            return vec![proc.direction];
        }
        vec![Direction::Out; arity]
    }
}

fn param_directions(proc: &ProcDecl) -> Vec<Direction> {
    proc.params.iter().map(|p| p.direction).collect()
}

/// Collects every name assigned anywhere in a statement list: assignment
/// targets (including array bases) and `out`-style call arguments.
fn assigned_names(stmts: &[Stmt]) -> HashSet<String> {
    let mut names = HashSet::new();
    collect_assigned(stmts, &mut names);
    names
}

fn collect_assigned(stmts: &[Stmt], names: &mut HashSet<String>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Assign { target, .. } => match &target.kind {
                ExprKind::Name(id) => {
                    names.insert(id.clone());
                }
                ExprKind::Subscript { name, .. } => {
                    names.insert(name.clone());
                }
                _ => {}
            },
            StmtKind::If { body, orelse, .. } => {
                collect_assigned(body, names);
                collect_assigned(orelse, names);
            }
            StmtKind::For { init, body, .. } => {
                collect_assigned(std::slice::from_ref(&**init), names);
                collect_assigned(body, names);
            }
            StmtKind::Call { args, .. } => {
                // Without chasing signatures, any name argument may be an
                // out parameter; forget them all.
                for arg in args {
                    if let ExprKind::Name(id) = &arg.kind {
                        names.insert(id.clone());
                    }
                }
            }
            StmtKind::Return => {}
        }
    }
}
