//! Unit tests for the type checker.

use super::*;
use crate::ast::{StmtKind, Type};
use crate::parser::parse_source;

/// Helper that parses and checks a program, returning the outcome.
fn check(src: &str) -> Result<Program, Vec<TypeError>> {
    let mut program = parse_source(src).expect("test source must parse");
    check_program(&mut program, true)?;
    Ok(program)
}

/// Helper for programs that must be valid.
fn check_ok(src: &str) -> Program {
    check(src).unwrap_or_else(|errors| panic!("Check failed for {:?}: {:?}", src, errors))
}

/// Helper for programs that must be invalid; returns the errors.
fn check_errors(src: &str) -> Vec<TypeError> {
    match check(src) {
        Ok(_) => panic!("Expected check to fail for {:?}", src),
        Err(errors) => errors,
    }
}

/// Asserts that some reported message contains `needle`.
fn assert_error_contains(errors: &[TypeError], needle: &str) {
    assert!(
        errors.iter().any(|e| e.message.contains(needle)),
        "expected an error containing {:?}, got {:?}",
        needle,
        errors
    );
}

/// Returns the type annotation of the value in the first body assignment.
fn first_assign_value_type(program: &Program) -> Option<Type> {
    program.body.iter().find_map(|stmt| match &stmt.kind {
        StmtKind::Assign { value, .. } => Some(value.ty),
        _ => None,
    })?
}

// ===================
// Basics
// ===================

#[test]
fn test_minimal_program_is_valid() {
    check_ok("program p is begin end program");
}

#[test]
fn test_undefined_identifier() {
    let errors = check_errors("program p is begin x := 1; end program");
    assert_error_contains(&errors, "Undefined identifier 'x'");
}

#[test]
fn test_redefinition_in_same_scope() {
    let errors = check_errors("program p is int a; float a; begin end program");
    assert_error_contains(&errors, "already defined");
}

#[test]
fn test_local_may_shadow_global() {
    check_ok(
        "program p is
         global int x;
         procedure f()
             float x;
         begin
             x := 1.0;
         end procedure;
         begin x := 1; end program",
    );
}

#[test]
fn test_global_only_at_top_level() {
    let errors = check_errors(
        "program p is
         procedure f()
             global int a;
         begin
             a := 1;
         end procedure;
         begin end program",
    );
    assert_error_contains(&errors, "top level scope");
}

#[test]
fn test_all_errors_reported() {
    let errors = check_errors(
        "program p is
         string s;
         begin
             x := 1;
             s := 2;
         end program",
    );
    assert_eq!(errors.len(), 2, "got {:?}", errors);
}

// ===================
// Expression typing
// ===================

#[test]
fn test_literal_types() {
    let program = check_ok("program p is int a; begin a := 1; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Int));

    let program = check_ok("program p is float a; begin a := 1.5; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Float));

    let program = check_ok("program p is bool a; begin a := true; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Bool));

    let program = check_ok("program p is string a; begin a := \"s\"; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Str));
}

#[test]
fn test_int_widens_to_float() {
    let program = check_ok("program p is float a; begin a := 1 + 2.5; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Float));
}

#[test]
fn test_int_unifies_with_bool() {
    let program = check_ok("program p is bool a; begin a := true and 1; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Bool));
}

#[test]
fn test_comparison_types_as_unified_operand_type() {
    let program = check_ok("program p is int a; begin a := 1 < 2; end program");
    assert_eq!(first_assign_value_type(&program), Some(Type::Int));
}

#[test]
fn test_string_int_mismatch() {
    // program p is string s; begin s := 1; end program  =>  invalid
    let errors = check_errors("program p is string s; begin s := 1; end program");
    assert_error_contains(&errors, "Incompatible types 'string' and 'int'");
}

#[test]
fn test_mismatch_span_covers_both_operands() {
    let errors = check_errors("program p is int a; begin a := a + \"s\"; end program");
    let error = errors
        .iter()
        .find(|e| e.message.contains("Incompatible"))
        .expect("expected a unification error");
    let span = error.span.expect("unification errors carry spans");
    // `a + "s"` starts at the second `a` and runs through the literal.
    assert_eq!(span.start, 31);
    assert_eq!(span.end, 37);
}

#[test]
fn test_not_on_float_rejected() {
    let errors = check_errors("program p is float a; begin a := not 1.5; end program");
    assert_error_contains(&errors, "not valid on floats");
}

#[test]
fn test_logical_op_on_float_rejected() {
    let errors = check_errors("program p is float a; begin a := 1.5 and 2.5; end program");
    assert_error_contains(&errors, "Bitwise operators only valid on integers");
}

#[test]
fn test_string_arithmetic_rejected() {
    let errors = check_errors("program p is string s; begin s := \"a\" + \"b\"; end program");
    assert_error_contains(&errors, "only valid on numbers");
}

// ===================
// Arrays
// ===================

#[test]
fn test_array_subscript() {
    let program = check_ok("program p is int a[4]; begin a[0] := 1; end program");
    let StmtKind::Assign { target, .. } = &program.body[0].kind else {
        panic!("expected assignment")
    };
    assert_eq!(target.ty, Some(Type::Int));
}

#[test]
fn test_subscript_of_scalar_rejected() {
    let errors = check_errors("program p is int a; begin a[0] := 1; end program");
    assert_error_contains(&errors, "not an array");
}

#[test]
fn test_non_int_index_rejected() {
    let errors = check_errors("program p is int a[4]; begin a[1.5] := 1; end program");
    assert_error_contains(&errors, "Array index is not an integer");
}

#[test]
fn test_non_int_array_size_rejected() {
    let errors = check_errors("program p is int a[2.5]; begin a[0] := 1; end program");
    assert_error_contains(&errors, "Size of array has non-integer type 'float'");
}

#[test]
fn test_array_param_subscriptable() {
    check_ok(
        "program p is
         procedure f(int a[4] in, int x out)
         begin
             x := a[0];
         end procedure;
         begin end program",
    );
}

// ===================
// Parameters
// ===================

#[test]
fn test_read_from_out_param_rejected() {
    let errors = check_errors(
        "program p is
         procedure f(int x out, int y out)
         begin
             y := x;
         end procedure;
         begin end program",
    );
    assert_error_contains(&errors, "Cannot read from out parameter");
}

#[test]
fn test_assign_to_in_param_rejected() {
    let errors = check_errors(
        "program p is
         procedure f(int x in)
         begin
             x := 1;
         end procedure;
         begin end program",
    );
    assert_error_contains(&errors, "Cannot assign to input parameter");
}

#[test]
fn test_out_param_writable() {
    check_ok(
        "program p is
         procedure f(int x out)
         begin
             x := 1;
         end procedure;
         begin end program",
    );
}

// ===================
// Calls
// ===================

#[test]
fn test_recursion_allowed() {
    check_ok(
        "program p is
         procedure f(int x in)
         begin
             f(x);
         end procedure;
         begin end program",
    );
}

#[test]
fn test_arity_mismatch() {
    let errors = check_errors(
        "program p is
         int a;
         procedure f(int x in)
         begin
         end procedure;
         begin
             f(a, a);
         end program",
    );
    assert_error_contains(&errors, "takes exactly 1 arguments (2 given)");
}

#[test]
fn test_call_non_procedure_rejected() {
    let errors = check_errors("program p is int a; begin a(1); end program");
    assert_error_contains(&errors, "is not a procedure");
}

#[test]
fn test_out_arg_must_be_identifier() {
    let errors = check_errors(
        "program p is
         procedure f(int x out)
         begin
             x := 1;
         end procedure;
         begin
             f(1 + 2);
         end program",
    );
    assert_error_contains(&errors, "must be an identifier");
}

#[test]
fn test_out_param_forwarding() {
    // An out parameter may be forwarded to another out parameter: it is
    // already an address, so it is passed through by value.
    check_ok(
        "program p is
         int a;
         procedure g(int y out)
         begin
             y := 1;
         end procedure;
         procedure f(int x out)
         begin
             g(x);
         end procedure;
         begin
             f(a);
         end program",
    );
}

#[test]
fn test_in_param_cannot_feed_out_param() {
    let errors = check_errors(
        "program p is
         procedure g(int y out)
         begin
             y := 1;
         end procedure;
         procedure f(int x in)
         begin
             g(x);
         end procedure;
         begin end program",
    );
    assert_error_contains(&errors, "Cannot pass input parameter");
}

#[test]
fn test_arg_type_mismatch() {
    let errors = check_errors(
        "program p is
         string s;
         procedure f(int x in)
         begin
         end procedure;
         begin
             f(s);
         end program",
    );
    assert_error_contains(&errors, "does not match parameter type 'int'");
}

#[test]
fn test_runtime_procs_visible_when_enabled() {
    check_ok("program p is int a; begin getInteger(a); putInteger(a); end program");
}

#[test]
fn test_runtime_procs_hidden_when_disabled() {
    let mut program =
        parse_source("program p is int a; begin getInteger(a); end program").unwrap();
    let errors = check_program(&mut program, false).unwrap_err();
    assert_error_contains(&errors, "Undefined identifier 'getInteger'");
}

// ===================
// Idempotence
// ===================

#[test]
fn test_checking_twice_gives_same_annotations() {
    let src = "program p is
         int a;
         float f;
         procedure g(int x out)
         begin
             x := 2;
         end procedure;
         begin
             a := 1 + 2 * 3;
             f := a + 0.5;
             g(a);
             if (a == 1) then a := 2; end if;
         end program";

    let mut once = parse_source(src).unwrap();
    check_program(&mut once, true).unwrap();

    let mut twice = once.clone();
    check_program(&mut twice, true).unwrap();

    // Debug output includes every annotation, so identical output means
    // identical annotations.
    assert_eq!(format!("{:?}", once), format!("{:?}", twice));
}
