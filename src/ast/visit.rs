//! Traversal helpers for the Pell AST.
//!
//! The optimizer passes share two traversal shapes: a post-order mutable
//! walk over a single expression tree, and a deep walk that applies an
//! expression callback throughout a statement list. Passes that need scope
//! tracking (constant propagation, dead-code elimination) drive these
//! helpers from their own statement recursion instead of using the deep
//! walk directly.

use super::decl::Decl;
use super::expr::{Expr, ExprKind};
use super::program::Program;
use super::stmt::{Stmt, StmtKind};

/// Walks an expression tree in post-order, calling `f` on every node.
///
/// Children are visited before their parent, so a callback that rewrites
/// `*expr` in place (e.g. folding an operation whose operands are now
/// literals) sees already-rewritten children.
pub fn walk_expr_mut<F: FnMut(&mut Expr)>(expr: &mut Expr, f: &mut F) {
    match &mut expr.kind {
        ExprKind::BinaryOp { left, right, .. } => {
            walk_expr_mut(left, f);
            walk_expr_mut(right, f);
        }
        ExprKind::UnaryOp { operand, .. } => {
            walk_expr_mut(operand, f);
        }
        ExprKind::Subscript { index, .. } => {
            walk_expr_mut(index, f);
        }
        ExprKind::Num(_) | ExprKind::Str(_) | ExprKind::Name(_) => {}
    }
    f(expr);
}

/// Applies `f` to every expression root directly owned by one statement,
/// without entering nested statement lists.
///
/// For `Assign` this is the target and the value; for `If` and `For` the
/// test; for `Call` each argument. `Return` owns no expressions, and a
/// `For` header assignment is a statement, not an expression root.
pub fn stmt_exprs_mut<F: FnMut(&mut Expr)>(stmt: &mut Stmt, f: &mut F) {
    match &mut stmt.kind {
        StmtKind::Assign { target, value } => {
            f(target);
            f(value);
        }
        StmtKind::If { test, .. } => f(test),
        StmtKind::For { test, .. } => f(test),
        StmtKind::Call { args, .. } => {
            for arg in args {
                f(arg);
            }
        }
        StmtKind::Return => {}
    }
}

/// Applies `f` to every expression root in a statement list, recursing
/// into `If` branches, `For` headers, and `For` bodies.
pub fn walk_stmts_mut<F: FnMut(&mut Expr)>(stmts: &mut [Stmt], f: &mut F) {
    for stmt in stmts {
        stmt_exprs_mut(stmt, f);
        match &mut stmt.kind {
            StmtKind::If { body, orelse, .. } => {
                walk_stmts_mut(body, f);
                walk_stmts_mut(orelse, f);
            }
            StmtKind::For { init, body, .. } => {
                stmt_exprs_mut(init, f);
                walk_stmts_mut(body, f);
            }
            _ => {}
        }
    }
}

/// Applies `f` to every expression root in a program: the program body and
/// every procedure body, at any nesting depth.
///
/// Array lengths in declarations are not visited; they are literals by
/// construction and are never evaluated at run time.
pub fn walk_program_mut<F: FnMut(&mut Expr)>(program: &mut Program, f: &mut F) {
    walk_decls_mut(&mut program.decls, f);
    walk_stmts_mut(&mut program.body, f);
}

fn walk_decls_mut<F: FnMut(&mut Expr)>(decls: &mut [Decl], f: &mut F) {
    for decl in decls {
        if let Decl::Proc(proc) = decl {
            walk_decls_mut(&mut proc.decls, f);
            walk_stmts_mut(&mut proc.body, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::token::Span;

    fn span() -> Span {
        Span::new(0, 0, 1)
    }

    fn add(left: Expr, right: Expr) -> Expr {
        Expr::new(
            ExprKind::BinaryOp {
                op: BinOp::Add,
                left: Box::new(left),
                right: Box::new(right),
            },
            span(),
        )
    }

    #[test]
    fn test_walk_expr_mut_is_post_order() {
        let mut expr = add(Expr::num("1", span()), add(Expr::num("2", span()), Expr::num("3", span())));
        let mut order = Vec::new();
        walk_expr_mut(&mut expr, &mut |e| {
            order.push(match &e.kind {
                ExprKind::Num(n) => n.clone(),
                ExprKind::BinaryOp { .. } => "+".to_string(),
                _ => "?".to_string(),
            });
        });
        assert_eq!(order, vec!["1", "2", "3", "+", "+"]);
    }

    #[test]
    fn test_walk_expr_mut_allows_replacement() {
        let mut expr = add(Expr::num("1", span()), Expr::num("2", span()));
        walk_expr_mut(&mut expr, &mut |e| {
            if let ExprKind::BinaryOp { left, right, .. } = &e.kind
                && let (Some("1"), Some("2")) = (left.as_num(), right.as_num())
            {
                *e = Expr::num("3", e.span);
            }
        });
        assert_eq!(expr, Expr::num("3", span()));
    }

    #[test]
    fn test_walk_stmts_mut_reaches_nested_bodies() {
        let mut stmts = vec![Stmt::new(
            StmtKind::If {
                test: Expr::name("c", span()),
                body: vec![Stmt::new(
                    StmtKind::Assign {
                        target: Expr::name("a", span()),
                        value: Expr::num("1", span()),
                    },
                    span(),
                )],
                orelse: vec![],
            },
            span(),
        )];
        let mut count = 0;
        walk_stmts_mut(&mut stmts, &mut |_| count += 1);
        // The if test, plus the nested assignment's target and value.
        assert_eq!(count, 3);
    }
}
