//! Unit tests for AST construction and equality semantics.

use super::*;
use crate::token::Span;

fn span() -> Span {
    Span::new(0, 0, 1)
}

fn other_span() -> Span {
    Span::new(9, 12, 4)
}

#[test]
fn test_expr_constructors() {
    let num = Expr::num("42", span());
    assert!(matches!(&num.kind, ExprKind::Num(n) if n == "42"));
    assert!(num.ty.is_none());

    let name = Expr::name("x", span());
    assert!(matches!(&name.kind, ExprKind::Name(id) if id == "x"));
}

#[test]
fn test_subscript_structure() {
    let subscript = Expr::new(
        ExprKind::Subscript {
            name: "a".to_string(),
            name_span: span(),
            index: Box::new(Expr::num("3", span())),
        },
        span(),
    );
    let ExprKind::Subscript { name, index, .. } = &subscript.kind else {
        panic!("expected subscript")
    };
    assert_eq!(name, "a");
    assert_eq!(index.as_num(), Some("3"));
}

#[test]
fn test_equality_is_structural() {
    let a = Expr::new(
        ExprKind::BinaryOp {
            op: BinOp::Mul,
            left: Box::new(Expr::num("2", span())),
            right: Box::new(Expr::name("x", span())),
        },
        span(),
    );
    let b = Expr::new(
        ExprKind::BinaryOp {
            op: BinOp::Mul,
            left: Box::new(Expr::num("2", other_span())),
            right: Box::new(Expr::name("x", other_span())),
        },
        other_span(),
    );
    assert_eq!(a, b);

    let c = Expr::new(
        ExprKind::BinaryOp {
            op: BinOp::Div,
            left: Box::new(Expr::num("2", span())),
            right: Box::new(Expr::name("x", span())),
        },
        span(),
    );
    assert_ne!(a, c);
}

#[test]
fn test_type_annotation_does_not_affect_equality() {
    let mut annotated = Expr::num("1", span());
    annotated.ty = Some(Type::Int);
    assert_eq!(annotated, Expr::num("1", span()));
}

#[test]
fn test_stmt_equality_recurses() {
    let make = |value: &str| {
        Stmt::new(
            StmtKind::Assign {
                target: Expr::name("x", span()),
                value: Expr::num(value, span()),
            },
            span(),
        )
    };
    assert_eq!(make("1"), make("1"));
    assert_ne!(make("1"), make("2"));
}

#[test]
fn test_param_carries_direction() {
    let param = Param {
        var_decl: VarDecl {
            is_global: false,
            ty: Type::Int,
            name: "x".to_string(),
            name_span: span(),
            array_length: None,
        },
        direction: Direction::Out,
    };
    assert_eq!(param.direction, Direction::Out);
    assert!(!param.var_decl.is_array());
}

#[test]
fn test_program_clone_is_deep() {
    let program = Program {
        name: "p".to_string(),
        name_span: span(),
        decls: vec![Decl::Var(VarDecl {
            is_global: true,
            ty: Type::Float,
            name: "g".to_string(),
            name_span: span(),
            array_length: Some(Expr::num("8", span())),
        })],
        body: vec![Stmt::new(StmtKind::Return, span())],
    };
    let clone = program.clone();
    assert_eq!(program, clone);
}
