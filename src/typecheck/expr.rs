//! Expression typing and unification.

use super::Checker;
use super::error::TypeError;
use super::symbol::Symbol;
use crate::ast::{Direction, Expr, ExprKind, Type, UnOp};
use crate::token::Span;

impl Checker {
    /// Computes and attaches the type of an expression.
    ///
    /// Returns `None` if the expression is ill-typed; the error has
    /// already been recorded, and callers skip dependent checks instead of
    /// piling on secondary reports.
    pub(super) fn get_type(&mut self, expr: &mut Expr) -> Option<Type> {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Num(lexeme) => {
                if lexeme == "true" || lexeme == "false" {
                    Some(Type::Bool)
                } else if lexeme.contains('.') {
                    Some(Type::Float)
                } else {
                    Some(Type::Int)
                }
            }

            ExprKind::Str(_) => Some(Type::Str),

            ExprKind::Name(id) => {
                let id = id.clone();
                self.name_type(&id, span)
            }

            ExprKind::Subscript { name, index, .. } => {
                let name = name.clone();
                let element = self.subscript_element_type(&name, span);
                let index_ty = self.get_type(index);
                if element.is_some() && index_ty.is_some_and(|ty| ty != Type::Int) {
                    self.report(TypeError::index_not_int(span));
                }
                element
            }

            ExprKind::UnaryOp { op, operand } => {
                let op = *op;
                match self.get_type(operand) {
                    Some(Type::Float) if op == UnOp::Not => {
                        self.report(TypeError::not_on_float(span));
                        None
                    }
                    other => other,
                }
            }

            ExprKind::BinaryOp { op, left, right } => {
                let op = *op;
                match self.unify_exprs(left, right) {
                    None => None,
                    Some(ty) => {
                        if op.is_logical() && !matches!(ty, Type::Int | Type::Bool) {
                            self.report(TypeError::bitwise_on_type(ty, span));
                            None
                        } else if !op.is_logical()
                            && !matches!(ty, Type::Int | Type::Float | Type::Bool)
                        {
                            self.report(TypeError::operator_on_non_numbers(op, span));
                            None
                        } else {
                            Some(ty)
                        }
                    }
                }
            }
        };

        expr.ty = ty;
        ty
    }

    /// Resolves the type of a name read.
    ///
    /// Procedures have no value, and `out` parameters are write-only in
    /// their own procedure; both are errors in a value context.
    fn name_type(&mut self, id: &str, span: Span) -> Option<Type> {
        match self.symbols.lookup(id) {
            None => {
                self.report(TypeError::undefined_identifier(id, span));
                None
            }
            Some(Symbol::Proc { .. }) => {
                self.report(TypeError::procedure_in_value_context(id, span));
                None
            }
            Some(Symbol::Param { ty, direction, .. }) => {
                let ty = *ty;
                if *direction == Direction::Out {
                    self.report(TypeError::read_from_out_param(span));
                    None
                } else {
                    Some(ty)
                }
            }
            Some(Symbol::Var { ty, .. }) => Some(*ty),
        }
    }

    /// Resolves the element type of a subscripted name.
    ///
    /// The declaration must be an array (a parameter's inner declaration
    /// counts); arrays passed as parameters are subscriptable in either
    /// direction.
    pub(super) fn subscript_element_type(&mut self, name: &str, span: Span) -> Option<Type> {
        match self.symbols.lookup(name) {
            None => {
                self.report(TypeError::undefined_identifier(name, span));
                None
            }
            Some(Symbol::Var { ty, is_array }) | Some(Symbol::Param { ty, is_array, .. }) => {
                let (ty, is_array) = (*ty, *is_array);
                if is_array {
                    Some(ty)
                } else {
                    self.report(TypeError::not_an_array(span));
                    None
                }
            }
            Some(Symbol::Proc { .. }) => {
                self.report(TypeError::not_an_array(span));
                None
            }
        }
    }

    /// Types both operands and unifies the results.
    ///
    /// On a unification failure the reported span covers both operands, so
    /// the diagnostic underlines the whole offending expression.
    pub(super) fn unify_exprs(&mut self, left: &mut Expr, right: &mut Expr) -> Option<Type> {
        let left_ty = self.get_type(left);
        let right_ty = self.get_type(right);

        // A `None` means that operand's error is already reported; don't
        // add a second report about the unification it prevented.
        let (left_ty, right_ty) = (left_ty?, right_ty?);

        match Self::unify_types(left_ty, right_ty) {
            Some(ty) => Some(ty),
            None => {
                self.report(TypeError::incompatible_types(
                    left_ty,
                    right_ty,
                    left.span.join(right.span),
                ));
                None
            }
        }
    }

    /// Unifies two types.
    ///
    /// `T` with `T` is `T`; `int` widens to `float`; `int` and `bool`
    /// unify to `bool`. Anything else does not unify.
    pub(super) fn unify_types(a: Type, b: Type) -> Option<Type> {
        if a == b {
            return Some(a);
        }
        match (a, b) {
            (Type::Int, Type::Float) | (Type::Float, Type::Int) => Some(Type::Float),
            (Type::Int, Type::Bool) | (Type::Bool, Type::Int) => Some(Type::Bool),
            _ => None,
        }
    }
}
