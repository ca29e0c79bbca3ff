//! Dead-code elimination.
//!
//! Walks each body in reverse program order, which approximates def-use
//! chains without building them: when an assignment is reached, the walk
//! has already seen every later read of its target, so "is this store
//! live?" is a lookup. Expressions in this language have no side effects,
//! so dead stores, branches with constant tests, loops that never run,
//! unreachable statements after a `return`, unreferenced variables, and
//! uncalled procedures can all be dropped.

use std::collections::{HashMap, HashSet};

use crate::ast::{Decl, Direction, Expr, ExprKind, ProcDecl, Program, Stmt, StmtKind};
use crate::runtime;

/// Liveness of a variable at the current point of the reverse walk.
///
/// Ordered by how strongly the state keeps things alive: a `Referenced`
/// name keeps stores above it, an `Assigned` name keeps its declaration
/// but lets earlier stores die, and an `Unknown` name keeps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum UseState {
    Unknown,
    Assigned,
    Referenced,
}

/// What a declared name is bound to during elimination.
#[derive(Debug, Clone)]
enum Binding {
    Var(UseState),
    /// A procedure, with its parameter directions and whether any
    /// surviving statement calls it.
    Proc {
        directions: Vec<Direction>,
        referenced: bool,
    },
}

/// The result of visiting one statement during the reverse walk.
enum Edit {
    Keep(Stmt),
    Drop,
    Splice(Vec<Stmt>),
}

/// The scope state: the global map plus the scope stack.
type Snapshot = (HashMap<String, Binding>, Vec<HashMap<String, Binding>>);

/// The dead-code elimination pass.
pub struct DeadCodeEliminator {
    /// Whether this walk changed the tree.
    pub modified: bool,
    global: HashMap<String, Binding>,
    scopes: Vec<HashMap<String, Binding>>,
}

impl DeadCodeEliminator {
    /// Creates a new eliminator.
    pub fn new() -> Self {
        DeadCodeEliminator {
            modified: false,
            global: HashMap::new(),
            scopes: vec![HashMap::new()],
        }
    }

    /// Removes dead code from the program, in place.
    pub fn walk(&mut self, program: &mut Program) {
        for decl in &program.decls {
            self.define_decl(decl, decl.is_global());
        }

        self.walk_body(&mut program.body);

        // Visit surviving procedures callers-first: a procedure may only
        // call itself or earlier declarations, so reverse declaration
        // order sees every caller before its callees.
        self.visit_surviving_procs(&mut program.decls);
        self.filter_decls(&mut program.decls);
    }

    // ----- scope bookkeeping -----

    fn define_decl(&mut self, decl: &Decl, is_global: bool) {
        let binding = match decl {
            Decl::Var(_) => Binding::Var(UseState::Unknown),
            Decl::Proc(proc) => Binding::Proc {
                directions: proc.params.iter().map(|p| p.direction).collect(),
                referenced: false,
            },
        };
        let scope = if is_global {
            &mut self.global
        } else {
            self.scopes.last_mut().expect("scope stack is never empty")
        };
        scope.insert(decl.name().to_string(), binding);
    }

    /// Finds the binding for a name: innermost scope, top-level scope,
    /// then globals, mirroring the checker's visibility rule.
    fn binding_mut(&mut self, id: &str) -> Option<&mut Binding> {
        let last = self.scopes.len() - 1;
        if self.scopes[last].contains_key(id) {
            return self.scopes[last].get_mut(id);
        }
        if last > 0 && self.scopes[0].contains_key(id) {
            return self.scopes[0].get_mut(id);
        }
        self.global.get_mut(id)
    }

    fn var_state(&mut self, id: &str) -> UseState {
        match self.binding_mut(id) {
            Some(Binding::Var(state)) => *state,
            // Unknown bindings are kept alive conservatively; only names
            // this pass defined itself are ever removed.
            _ => UseState::Referenced,
        }
    }

    fn set_var_state(&mut self, id: &str, state: UseState) {
        if let Some(Binding::Var(slot)) = self.binding_mut(id) {
            *slot = state;
        }
    }

    fn mark_read(&mut self, id: &str) {
        self.set_var_state(id, UseState::Referenced);
    }

    fn mark_proc_referenced(&mut self, id: &str) {
        if let Some(Binding::Proc { referenced, .. }) = self.binding_mut(id) {
            *referenced = true;
        }
    }

    fn proc_referenced(&mut self, id: &str) -> bool {
        match self.binding_mut(id) {
            Some(Binding::Proc { referenced, .. }) => *referenced,
            _ => false,
        }
    }

    fn call_directions(&mut self, name: &str, arity: usize) -> Vec<Direction> {
        if let Some(Binding::Proc { directions, .. }) = self.binding_mut(name) {
            return directions.clone();
        }
        if let Some(proc) = runtime::lookup(name) {
            return vec![proc.direction];
        }
        // Unknown callee: treating arguments as reads keeps their values
        // alive, which is the safe direction for liveness.
        vec![Direction::In; arity]
    }

    /// Marks every name read by an expression.
    fn mark_expr_reads(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Name(id) => self.mark_read(id),
            ExprKind::Subscript { name, index, .. } => {
                self.mark_read(name);
                self.mark_expr_reads(index);
            }
            ExprKind::BinaryOp { left, right, .. } => {
                self.mark_expr_reads(left);
                self.mark_expr_reads(right);
            }
            ExprKind::UnaryOp { operand, .. } => self.mark_expr_reads(operand),
            ExprKind::Num(_) | ExprKind::Str(_) => {}
        }
    }

    fn snapshot(&self) -> Snapshot {
        (self.global.clone(), self.scopes.clone())
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.global = snapshot.0;
        self.scopes = snapshot.1;
    }

    /// Merges the scope state of another control-flow path into the
    /// current one: a name is as alive as the liveliest path leaves it.
    fn merge(&mut self, other: Snapshot) {
        merge_scope(&mut self.global, &other.0);
        for (scope, other_scope) in self.scopes.iter_mut().zip(other.1.iter()) {
            merge_scope(scope, other_scope);
        }
    }

    // ----- procedures -----

    fn visit_surviving_procs(&mut self, decls: &mut [Decl]) {
        for decl in decls.iter_mut().rev() {
            if let Decl::Proc(proc) = decl
                && self.proc_referenced(&proc.name)
            {
                self.visit_proc(proc);
            }
        }
    }

    /// Drops declarations nothing refers to.
    fn filter_decls(&mut self, decls: &mut Vec<Decl>) {
        let before = decls.len();
        let mut keep = Vec::with_capacity(before);
        for decl in std::mem::take(decls) {
            let kept = match &decl {
                Decl::Var(var) => self.var_state(&var.name) != UseState::Unknown,
                Decl::Proc(proc) => self.proc_referenced(&proc.name),
            };
            if kept {
                keep.push(decl);
            }
        }
        if keep.len() != before {
            self.modified = true;
        }
        *decls = keep;
    }

    fn visit_proc(&mut self, proc: &mut ProcDecl) {
        self.scopes.push(HashMap::new());

        // The procedure's own name lives in its own scope, so recursion
        // marks this inner binding, and a dead procedure that only calls
        // itself is still removed by the enclosing scope's filter.
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(
                proc.name.clone(),
                Binding::Proc {
                    directions: proc.params.iter().map(|p| p.direction).collect(),
                    referenced: false,
                },
            );

        // Parameters are the procedure's interface; their stores are
        // always live (the caller observes out parameters) and they are
        // not removable declarations.
        for param in &proc.params {
            self.scopes
                .last_mut()
                .expect("scope stack is never empty")
                .insert(
                    param.var_decl.name.clone(),
                    Binding::Var(UseState::Referenced),
                );
        }

        for decl in &proc.decls {
            self.define_decl(decl, false);
        }

        // A top-level return makes the rest of the body unreachable; cut
        // it before the reverse walk would traverse it.
        if let Some(position) = proc
            .body
            .iter()
            .position(|stmt| matches!(stmt.kind, StmtKind::Return))
            && position + 1 < proc.body.len()
        {
            proc.body.truncate(position + 1);
            self.modified = true;
        }

        self.walk_body(&mut proc.body);
        self.visit_surviving_procs(&mut proc.decls);
        self.filter_decls(&mut proc.decls);

        self.scopes.pop();
    }

    // ----- statements -----

    /// Walks one statement list in reverse, rebuilding it from the edits.
    fn walk_body(&mut self, stmts: &mut Vec<Stmt>) {
        let old = std::mem::take(stmts);
        let mut rebuilt: Vec<Stmt> = Vec::new();

        for stmt in old.into_iter().rev() {
            match self.visit_stmt(stmt) {
                Edit::Keep(stmt) => rebuilt.push(stmt),
                Edit::Drop => self.modified = true,
                Edit::Splice(list) => {
                    self.modified = true;
                    rebuilt.extend(list.into_iter().rev());
                }
            }
        }

        rebuilt.reverse();
        *stmts = rebuilt;
    }

    fn visit_stmt(&mut self, stmt: Stmt) -> Edit {
        let span = stmt.span;
        match stmt.kind {
            StmtKind::Assign { target, value } => self.visit_assign(target, value, span),

            StmtKind::Call { name, args } => {
                self.mark_proc_referenced(&name);
                let directions = self.call_directions(&name, args.len());
                for (arg, direction) in args.iter().zip(directions) {
                    match (&arg.kind, direction) {
                        (ExprKind::Name(id), Direction::In) => {
                            let id = id.clone();
                            self.mark_read(&id);
                        }
                        (ExprKind::Name(id), Direction::Out) => {
                            // The call overwrites it; the value above is
                            // dead, but the declaration is in use.
                            let id = id.clone();
                            self.set_var_state(&id, UseState::Assigned);
                        }
                        _ => self.mark_expr_reads(arg),
                    }
                }
                Edit::Keep(Stmt::new(StmtKind::Call { name, args }, span))
            }

            StmtKind::If {
                test,
                mut body,
                mut orelse,
            } => {
                // A constant test picks its branch at compile time.
                if test.as_num() == Some("1") {
                    self.walk_body(&mut body);
                    return Edit::Splice(body);
                }
                if test.as_num() == Some("0") {
                    self.walk_body(&mut orelse);
                    return Edit::Splice(orelse);
                }

                // Walk the two arms from the same starting state and keep
                // a name alive if either path (or the fall-through) needs
                // it.
                let before = self.snapshot();
                self.walk_body(&mut body);
                let after_then = self.snapshot();
                self.restore(before);
                self.walk_body(&mut orelse);
                self.merge(after_then);

                if body.is_empty() && orelse.is_empty() {
                    return Edit::Drop;
                }

                self.mark_expr_reads(&test);
                Edit::Keep(Stmt::new(StmtKind::If { test, body, orelse }, span))
            }

            StmtKind::For {
                init,
                test,
                mut body,
            } => {
                if test.as_num() == Some("0") {
                    // Never runs; the header assignment is as dead as the
                    // body, since expressions cannot have side effects.
                    return Edit::Drop;
                }

                // Loop-carried liveness: every name the loop reads is
                // live at the bottom of the body too.
                for name in loop_read_names(&init, &test, &body) {
                    self.mark_read(&name);
                }

                self.walk_body(&mut body);
                self.mark_expr_reads(&test);

                // The header assignment always runs and always stays; it
                // kills the target's earlier value and reads its own.
                if let StmtKind::Assign { target, value } = &init.kind {
                    if let Some(id) = target.as_name() {
                        let id = id.to_string();
                        self.set_var_state(&id, UseState::Assigned);
                    }
                    self.mark_expr_reads(value);
                }

                Edit::Keep(Stmt::new(StmtKind::For { init, test, body }, span))
            }

            StmtKind::Return => Edit::Keep(Stmt::new(StmtKind::Return, span)),
        }
    }

    fn visit_assign(&mut self, target: Expr, value: Expr, span: crate::token::Span) -> Edit {
        let (base, is_subscript) = match &target.kind {
            ExprKind::Name(id) => (id.clone(), false),
            ExprKind::Subscript { name, .. } => (name.clone(), true),
            _ => (String::new(), false),
        };

        if self.var_state(&base) != UseState::Referenced {
            // Nothing below reads the target; the store is dead.
            return Edit::Drop;
        }

        if !is_subscript {
            // This store satisfies the later reads, so the value held
            // above it is dead. An element store keeps the whole array
            // live instead.
            self.set_var_state(&base, UseState::Assigned);
        }

        self.mark_expr_reads(&value);
        if let ExprKind::Subscript { index, .. } = &target.kind {
            self.mark_expr_reads(index);
        }

        Edit::Keep(Stmt::new(StmtKind::Assign { target, value }, span))
    }
}

impl Default for DeadCodeEliminator {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_scope(into: &mut HashMap<String, Binding>, other: &HashMap<String, Binding>) {
    for (name, binding) in other {
        match (into.get_mut(name), binding) {
            (Some(Binding::Var(state)), Binding::Var(other_state)) => {
                *state = (*state).max(*other_state);
            }
            (Some(Binding::Proc { referenced, .. }), Binding::Proc { referenced: other_referenced, .. }) => {
                *referenced |= *other_referenced;
            }
            (Some(_), _) => {}
            (None, _) => {
                into.insert(name.clone(), binding.clone());
            }
        }
    }
}

/// Collects every name read by a loop: in its header assignment's value,
/// its test, and anywhere in its body.
fn loop_read_names(init: &Stmt, test: &Expr, body: &[Stmt]) -> HashSet<String> {
    let mut names = HashSet::new();
    if let StmtKind::Assign { value, .. } = &init.kind {
        collect_expr_reads(value, &mut names);
    }
    collect_expr_reads(test, &mut names);
    collect_stmt_reads(body, &mut names);
    names
}

fn collect_stmt_reads(stmts: &[Stmt], names: &mut HashSet<String>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                if let ExprKind::Subscript { index, .. } = &target.kind {
                    collect_expr_reads(index, names);
                }
                collect_expr_reads(value, names);
            }
            StmtKind::If { test, body, orelse } => {
                collect_expr_reads(test, names);
                collect_stmt_reads(body, names);
                collect_stmt_reads(orelse, names);
            }
            StmtKind::For { init, test, body } => {
                collect_stmt_reads(std::slice::from_ref(&**init), names);
                collect_expr_reads(test, names);
                collect_stmt_reads(body, names);
            }
            StmtKind::Call { args, .. } => {
                for arg in args {
                    collect_expr_reads(arg, names);
                }
            }
            StmtKind::Return => {}
        }
    }
}

fn collect_expr_reads(expr: &Expr, names: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::Name(id) => {
            names.insert(id.clone());
        }
        ExprKind::Subscript { name, index, .. } => {
            names.insert(name.clone());
            collect_expr_reads(index, names);
        }
        ExprKind::BinaryOp { left, right, .. } => {
            collect_expr_reads(left, names);
            collect_expr_reads(right, names);
        }
        ExprKind::UnaryOp { operand, .. } => collect_expr_reads(operand, names),
        ExprKind::Num(_) | ExprKind::Str(_) => {}
    }
}
