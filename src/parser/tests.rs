//! Unit tests for the parser.

use super::*;
use crate::ast::{BinOp, Decl, Direction, Expr, ExprKind, StmtKind, Type, UnOp};
use crate::token::Span;

/// Helper that parses a full program.
fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    parse_source(input)
}

/// Helper that parses a program expected to be valid.
fn parse_ok(input: &str) -> Program {
    parse(input).unwrap_or_else(|errors| panic!("Parse failed for {:?}: {:?}", input, errors))
}

/// Helper that parses an expression by wrapping it in an assignment.
fn parse_expr(input: &str) -> Expr {
    let program = parse_ok(&format!("program t is begin x := {}; end program", input));
    match program.body.into_iter().next().unwrap().kind {
        StmtKind::Assign { value, .. } => value,
        other => panic!("Expected assignment, got {:?}", other),
    }
}

/// Helper that parses a program expected to fail, returning its errors.
fn parse_errors(input: &str) -> Vec<ParseError> {
    match parse(input) {
        Ok(program) => panic!(
            "Expected parsing to fail for {:?}, but it produced {:?}",
            input, program
        ),
        Err(errors) => errors,
    }
}

fn span() -> Span {
    Span::new(0, 0, 1)
}

fn num(lexeme: &str) -> Expr {
    Expr::num(lexeme, span())
}

fn name(id: &str) -> Expr {
    Expr::name(id, span())
}

fn binop(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::new(
        ExprKind::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span(),
    )
}

fn unop(op: UnOp, operand: Expr) -> Expr {
    Expr::new(
        ExprKind::UnaryOp {
            op,
            operand: Box::new(operand),
        },
        span(),
    )
}

// ===================
// Program structure
// ===================

#[test]
fn test_minimal_program() {
    let program = parse_ok("program p is begin end program");
    assert_eq!(program.name, "p");
    assert!(program.decls.is_empty());
    assert!(program.body.is_empty());
}

#[test]
fn test_trailing_semicolon_accepted() {
    parse_ok("program p is begin end program;");
}

#[test]
fn test_trailing_tokens_rejected() {
    parse_errors("program p is begin end program extra");
}

#[test]
fn test_var_decls() {
    let program = parse_ok("program p is int a; global float b; string s[8]; begin end program");
    assert_eq!(program.decls.len(), 3);

    let Decl::Var(a) = &program.decls[0] else {
        panic!("expected var decl")
    };
    assert_eq!(a.name, "a");
    assert_eq!(a.ty, Type::Int);
    assert!(!a.is_global);
    assert!(!a.is_array());

    let Decl::Var(b) = &program.decls[1] else {
        panic!("expected var decl")
    };
    assert!(b.is_global);
    assert_eq!(b.ty, Type::Float);

    let Decl::Var(s) = &program.decls[2] else {
        panic!("expected var decl")
    };
    assert_eq!(s.ty, Type::Str);
    assert_eq!(s.array_length, Some(num("8")));
}

#[test]
fn test_proc_decl() {
    let program = parse_ok(
        "program p is
         procedure f(int x in, int y out)
             int local;
         begin
             y := x;
         end procedure;
         begin end program",
    );
    let Decl::Proc(f) = &program.decls[0] else {
        panic!("expected proc decl")
    };
    assert_eq!(f.name, "f");
    assert_eq!(f.params.len(), 2);
    assert_eq!(f.params[0].direction, Direction::In);
    assert_eq!(f.params[1].direction, Direction::Out);
    assert_eq!(f.decls.len(), 1);
    assert_eq!(f.body.len(), 1);
}

#[test]
fn test_array_length_must_be_number() {
    parse_errors("program p is int a[n]; begin end program");
}

// ===================
// Statements
// ===================

#[test]
fn test_assignment() {
    let program = parse_ok("program p is begin x := 1; end program");
    let StmtKind::Assign { target, value } = &program.body[0].kind else {
        panic!("expected assignment")
    };
    assert_eq!(target, &name("x"));
    assert_eq!(value, &num("1"));
}

#[test]
fn test_subscript_assignment() {
    let program = parse_ok("program p is begin a[2] := 1; end program");
    let StmtKind::Assign { target, .. } = &program.body[0].kind else {
        panic!("expected assignment")
    };
    assert!(matches!(
        &target.kind,
        ExprKind::Subscript { name, .. } if name == "a"
    ));
}

#[test]
fn test_call_statement() {
    let program = parse_ok("program p is begin f(1, x); end program");
    let StmtKind::Call { name, args } = &program.body[0].kind else {
        panic!("expected call")
    };
    assert_eq!(name, "f");
    assert_eq!(args.len(), 2);
}

#[test]
fn test_call_no_args() {
    let program = parse_ok("program p is begin f(); end program");
    let StmtKind::Call { args, .. } = &program.body[0].kind else {
        panic!("expected call")
    };
    assert!(args.is_empty());
}

#[test]
fn test_return_statement() {
    let program = parse_ok("program p is begin return; end program");
    assert_eq!(program.body[0].kind, StmtKind::Return);
}

#[test]
fn test_if_statement() {
    let program = parse_ok("program p is begin if (x) then a := 1; else a := 2; end if; end program");
    let StmtKind::If { test, body, orelse } = &program.body[0].kind else {
        panic!("expected if")
    };
    assert_eq!(test, &name("x"));
    assert_eq!(body.len(), 1);
    assert_eq!(orelse.len(), 1);
}

#[test]
fn test_if_without_else() {
    let program = parse_ok("program p is begin if (x) then a := 1; end if; end program");
    let StmtKind::If { orelse, .. } = &program.body[0].kind else {
        panic!("expected if")
    };
    assert!(orelse.is_empty());
}

#[test]
fn test_if_requires_nonempty_then() {
    parse_errors("program p is begin if (x) then end if; end program");
}

#[test]
fn test_else_requires_statement() {
    parse_errors("program p is begin if (x) then a := 1; else end if; end program");
}

#[test]
fn test_for_statement() {
    let program =
        parse_ok("program p is begin for (i := 0; i < 10) a := a + i; end for; end program");
    let StmtKind::For { init, test, body } = &program.body[0].kind else {
        panic!("expected for")
    };
    assert!(matches!(init.kind, StmtKind::Assign { .. }));
    assert!(matches!(
        &test.kind,
        ExprKind::BinaryOp { op: BinOp::Lt, .. }
    ));
    assert_eq!(body.len(), 1);
}

#[test]
fn test_for_requires_test() {
    parse_errors("program p is begin for (i := 0) end for; end program");
}

// ===================
// Expressions
// ===================

#[test]
fn test_precedence_mul_over_add() {
    // 1 + 2 * 3 parses as 1 + (2 * 3)
    assert_eq!(
        parse_expr("1 + 2 * 3"),
        binop(BinOp::Add, num("1"), binop(BinOp::Mul, num("2"), num("3")))
    );
}

#[test]
fn test_grouping_overrides_precedence() {
    // 2 * (1 + 3)
    assert_eq!(
        parse_expr("2 * (1 + 3)"),
        binop(BinOp::Mul, num("2"), binop(BinOp::Add, num("1"), num("3")))
    );
}

#[test]
fn test_grouping_is_transparent() {
    for input in ["1 + 2", "a and b or c", "x[1] * 2", "-y"] {
        let bare = parse_expr(input);
        let grouped = parse_expr(&format!("({})", input));
        assert_eq!(bare, grouped, "({}) should parse like {}", input, input);
    }
}

#[test]
fn test_unary_minus_binds_tightest() {
    // -a * b parses as (-a) * b
    assert_eq!(
        parse_expr("-a * b"),
        binop(BinOp::Mul, unop(UnOp::Neg, name("a")), name("b"))
    );
}

#[test]
fn test_comparison_binds_tighter_than_add() {
    // 1 + 2 < 3 parses as 1 + (2 < 3)
    assert_eq!(
        parse_expr("1 + 2 < 3"),
        binop(BinOp::Add, num("1"), binop(BinOp::Lt, num("2"), num("3")))
    );
}

#[test]
fn test_not_is_level_with_and() {
    // not a and b parses as (not a) and b
    assert_eq!(
        parse_expr("not a and b"),
        binop(BinOp::And, unop(UnOp::Not, name("a")), name("b"))
    );
}

#[test]
fn test_left_associativity() {
    // a - b - c parses as (a - b) - c
    assert_eq!(
        parse_expr("a - b - c"),
        binop(BinOp::Sub, binop(BinOp::Sub, name("a"), name("b")), name("c"))
    );
}

#[test]
fn test_boolean_literals() {
    assert_eq!(parse_expr("true"), num("true"));
    assert_eq!(parse_expr("false"), num("false"));
}

#[test]
fn test_string_literal_keeps_quotes() {
    assert_eq!(
        parse_expr("\"hi\""),
        Expr::new(ExprKind::Str("\"hi\"".to_string()), span())
    );
}

#[test]
fn test_subscript_expression() {
    let expr = parse_expr("a[i + 1]");
    let ExprKind::Subscript { name: id, index, .. } = &expr.kind else {
        panic!("expected subscript")
    };
    assert_eq!(id, "a");
    assert_eq!(**index, binop(BinOp::Add, name("i"), num("1")));
}

#[test]
fn test_call_in_expression_is_error() {
    parse_errors("program p is begin x := f(1); end program");
}

// ===================
// Error recovery
// ===================

#[test]
fn test_resync_reports_multiple_errors() {
    let errors = parse_errors(
        "program p is
         begin
             x := ;
             y := 1;
             z := * 2;
         end program",
    );
    assert_eq!(errors.len(), 2, "got {:?}", errors);
}

#[test]
fn test_good_statement_survives_between_errors() {
    // Even though the parse fails, resync lets the parser see and validate
    // the later statements rather than giving up at the first error.
    let errors = parse_errors(
        "program p is
         begin
             x := ;
             y := 1;
         end program",
    );
    assert_eq!(errors.len(), 1, "got {:?}", errors);
}

#[test]
fn test_scan_error_becomes_parse_error() {
    let errors = parse_errors("program p is begin x := 1 # 2; end program");
    assert!(
        errors.iter().any(|e| e.message.contains("'#'")),
        "got {:?}",
        errors
    );
}

#[test]
fn test_error_spans_point_at_offender() {
    let errors = parse_errors("program p is begin x := ; end program");
    assert_eq!(errors[0].span.line, 1);
    assert_eq!(errors[0].span.start, 24);
}

// ===================
// Round trip
// ===================

#[test]
fn test_reparse_yields_equal_ast() {
    let src = "program p is
         int a;
         procedure f(int x out)
         begin
             x := 1;
         end procedure;
     begin
         f(a);
         if (a == 1) then a := 2; end if;
     end program";
    assert_eq!(parse_ok(src), parse_ok(src));
}
