//! Statement and declaration checking.

use super::Checker;
use super::error::TypeError;
use super::symbol::{ParamSig, Symbol};
use crate::ast::{Decl, Direction, Expr, ExprKind, ProcDecl, Stmt, StmtKind, Type};
use crate::runtime;
use crate::token::Span;

impl Checker {
    /// Defines one declaration in the current (or global) scope.
    ///
    /// Arrays get their declared length validated here, but the name is
    /// recorded either way so later references don't produce spurious
    /// undefined-identifier errors.
    pub(super) fn define_decl(&mut self, decl: &mut Decl, allow_global: bool) {
        if decl.is_global() && !allow_global {
            self.report(TypeError::global_at_inner_scope(decl.name_span()));
        }

        let (name, name_span, symbol) = match decl {
            Decl::Var(var) => {
                if let Some(length) = &mut var.array_length {
                    let length_ty = Self::literal_type(length);
                    length.ty = Some(length_ty);
                    if length_ty != Type::Int {
                        self.report(TypeError::array_size_not_int(length_ty, length.span));
                    }
                }
                (var.name.clone(), var.name_span, Symbol::var(var))
            }
            Decl::Proc(proc) => (proc.name.clone(), proc.name_span, Symbol::proc(proc)),
        };

        let is_global = decl.is_global();
        if !self.symbols.define(&name, symbol, is_global) {
            self.report(TypeError::redefinition(&name, name_span));
        }
    }

    /// Returns the type of a literal expression without consulting scope.
    ///
    /// Array lengths are `Num` literals by construction, so their type
    /// falls out of the lexeme alone.
    fn literal_type(expr: &Expr) -> Type {
        match expr.as_num() {
            Some("true") | Some("false") => Type::Bool,
            Some(lexeme) if lexeme.contains('.') => Type::Float,
            Some(_) => Type::Int,
            None => Type::Str,
        }
    }

    /// Checks a procedure declaration.
    ///
    /// The procedure's own name enters its scope first, which is what
    /// permits recursion; parameters and local declarations follow, and
    /// nested procedures are checked in place.
    pub(super) fn check_proc(&mut self, proc: &mut ProcDecl) {
        self.symbols.enter_scope();

        if !self
            .symbols
            .define(&proc.name, Symbol::proc(proc), false)
        {
            self.report(TypeError::redefinition(&proc.name, proc.name_span));
        }

        for param in &proc.params {
            let symbol = Symbol::param(&param.var_decl, param.direction);
            if !self.symbols.define(&param.var_decl.name, symbol, false) {
                self.report(TypeError::redefinition(
                    &param.var_decl.name,
                    param.var_decl.name_span,
                ));
            }
        }

        for decl in &mut proc.decls {
            self.define_decl(decl, false);
        }
        for decl in &mut proc.decls {
            if let Decl::Proc(nested) = decl {
                self.check_proc(nested);
            }
        }

        for stmt in &mut proc.body {
            self.check_stmt(stmt);
        }

        self.symbols.leave_scope();
    }

    /// Checks one statement.
    pub(super) fn check_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Assign { target, value } => self.check_assign(target, value),
            StmtKind::If { test, body, orelse } => {
                self.get_type(test);
                for stmt in body.iter_mut().chain(orelse.iter_mut()) {
                    self.check_stmt(stmt);
                }
            }
            StmtKind::For { init, test, body } => {
                self.check_stmt(init);
                self.get_type(test);
                for stmt in body {
                    self.check_stmt(stmt);
                }
            }
            StmtKind::Call { name, args } => {
                let name = name.clone();
                self.check_call(&name, args, stmt.span);
            }
            StmtKind::Return => {}
        }
    }

    /// Checks an assignment.
    ///
    /// The target must name writable storage: not an `in` parameter, not a
    /// procedure. The value's type must unify with the target's, and the
    /// target is annotated with its declared type.
    fn check_assign(&mut self, target: &mut Expr, value: &mut Expr) {
        let target_ty = self.assign_target_type(target);
        target.ty = target_ty;
        let value_ty = self.get_type(value);

        if let (Some(target_ty), Some(value_ty)) = (target_ty, value_ty)
            && Self::unify_types(target_ty, value_ty).is_none()
        {
            self.report(TypeError::incompatible_types(
                target_ty,
                value_ty,
                target.span.join(value.span),
            ));
        }
    }

    /// Resolves the storage type of an assignment target.
    fn assign_target_type(&mut self, target: &mut Expr) -> Option<Type> {
        let span = target.span;
        match &mut target.kind {
            ExprKind::Name(id) => {
                let id = id.clone();
                match self.symbols.lookup(&id) {
                    None => {
                        self.report(TypeError::undefined_identifier(&id, span));
                        None
                    }
                    Some(Symbol::Proc { .. }) => {
                        self.report(TypeError::procedure_in_value_context(&id, span));
                        None
                    }
                    Some(Symbol::Param { ty, direction, .. }) => {
                        let ty = *ty;
                        if *direction == Direction::In {
                            self.report(TypeError::assign_to_in_param(span));
                        }
                        Some(ty)
                    }
                    Some(Symbol::Var { ty, .. }) => Some(*ty),
                }
            }
            // Subscript targets follow the read rules: the base must be an
            // array and the index an int.
            ExprKind::Subscript { name, index, .. } => {
                let name = name.clone();
                let element = self.subscript_element_type(&name, span);
                let index_ty = self.get_type(index);
                if element.is_some() && index_ty.is_some_and(|ty| ty != Type::Int) {
                    self.report(TypeError::index_not_int(span));
                }
                element
            }
            _ => {
                // The parser only builds Name and Subscript targets.
                self.report(TypeError::new("Assignment target is not storage", span));
                None
            }
        }
    }

    /// Checks a procedure call.
    fn check_call(&mut self, name: &str, args: &mut [Expr], span: Span) {
        let Some(params) = self.callee_params(name, span) else {
            // Still type the arguments so their own errors surface.
            for arg in args {
                self.get_type(arg);
            }
            return;
        };

        if args.len() != params.len() {
            self.report(TypeError::arity_mismatch(
                name,
                params.len(),
                args.len(),
                span,
            ));
        }

        for (arg, param) in args.iter_mut().zip(params.iter()) {
            if param.direction == Direction::Out && !self.check_out_arg(arg) {
                continue;
            }

            let Some(arg_ty) = self.get_type(arg) else {
                continue;
            };
            if Self::unify_types(arg_ty, param.ty).is_none() {
                self.report(TypeError::arg_type_mismatch(arg_ty, param.ty, arg.span));
            }
        }
    }

    /// Resolves the callee's parameter signatures.
    ///
    /// When the runtime library is linked, its procedures are visible as
    /// predeclared callees.
    fn callee_params(&mut self, name: &str, span: Span) -> Option<Vec<ParamSig>> {
        match self.symbols.lookup(name) {
            Some(Symbol::Proc { params }) => Some(params.clone()),
            Some(_) => {
                self.report(TypeError::not_a_procedure(name, span));
                None
            }
            None => {
                if self.runtime
                    && let Some(proc) = runtime::lookup(name)
                {
                    return Some(vec![ParamSig {
                        ty: proc.ty,
                        direction: proc.direction,
                        is_array: false,
                    }]);
                }
                self.report(TypeError::undefined_identifier(name, span));
                None
            }
        }
    }

    /// Validates the shape of an argument bound to an `out` parameter.
    ///
    /// The argument must be a plain name. Forwarding an `out` parameter is
    /// allowed (it is already an address) and skips the unification below,
    /// which is why this returns whether the caller should continue with
    /// the normal type check.
    fn check_out_arg(&mut self, arg: &mut Expr) -> bool {
        let Some(id) = arg.as_name() else {
            self.report(TypeError::out_arg_not_identifier(arg.span));
            return false;
        };
        let id = id.to_string();

        match self.symbols.lookup(&id) {
            None => {
                self.report(TypeError::undefined_identifier(&id, arg.span));
                false
            }
            Some(Symbol::Proc { .. }) => {
                self.report(TypeError::procedure_in_value_context(&id, arg.span));
                false
            }
            Some(Symbol::Param {
                direction: Direction::Out,
                ty,
                ..
            }) => {
                // A forwarded out parameter: pass its address straight
                // through, no value read, no unification.
                arg.ty = Some(*ty);
                false
            }
            Some(Symbol::Param {
                direction: Direction::In,
                ..
            }) => {
                self.report(TypeError::in_param_as_out_arg(&id, arg.span));
                false
            }
            Some(Symbol::Var { .. }) => true,
        }
    }
}
