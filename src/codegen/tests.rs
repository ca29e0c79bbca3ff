//! Unit tests for the code generator.

use super::*;
use crate::parser::parse_source;
use crate::typecheck::check_program;

/// Compiles source to C with the runtime included.
fn compile(src: &str) -> String {
    compile_with(src, CodegenOptions {
        verbose: false,
        include_runtime: true,
    })
}

fn compile_with(src: &str, options: CodegenOptions) -> String {
    let mut program = parse_source(src).expect("test source must parse");
    check_program(&mut program, options.include_runtime).expect("test source must check");
    generate(&program, src, options).expect("generation must succeed")
}

/// Collects every label defined at column zero.
fn defined_labels(c: &str) -> Vec<&str> {
    c.lines()
        .filter(|line| !line.starts_with(' ') && line.ends_with(':'))
        .map(|line| line.trim_end_matches(':'))
        .collect()
}

/// Collects every label referenced by a plain `goto` or a `&&` address.
fn referenced_labels(c: &str) -> Vec<&str> {
    let mut labels = Vec::new();
    for line in c.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("goto ")
            && !rest.starts_with('*')
        {
            labels.push(rest.trim_end_matches(';'));
        }
        if let Some(position) = line.find("&&") {
            let rest = &line[position + 2..];
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            labels.push(&rest[..end]);
        }
    }
    labels
}

/// The declared size of `R[]`.
fn declared_register_count(c: &str) -> usize {
    let line = c
        .lines()
        .find(|line| line.starts_with("int R[") && line.ends_with("];"))
        .expect("generated C declares R[]");
    line.trim_start_matches("int R[")
        .trim_end_matches("];")
        .parse()
        .expect("R[] size is a number")
}

/// The largest register index mentioned anywhere.
fn peak_register_index(c: &str) -> usize {
    let mut peak = 0;
    let mut rest = c;
    while let Some(position) = rest.find("R[") {
        rest = &rest[position + 2..];
        let end = rest.find(']').expect("unterminated R[ index");
        if let Ok(index) = rest[..end].parse::<usize>() {
            peak = peak.max(index);
        }
        rest = &rest[end..];
    }
    peak
}

// ===================
// Structure
// ===================

#[test]
fn test_minimal_program() {
    let c = compile_with(
        "program p is begin end program",
        CodegenOptions {
            verbose: false,
            include_runtime: false,
        },
    );
    assert!(c.contains("int main() {"));
    assert!(c.contains("goto p;"));
    assert!(defined_labels(&c).contains(&"p"));
    assert!(c.contains("return 0;"));
    // No storage, no SP bump.
    assert!(!c.contains("SP = SP +"));
}

#[test]
fn test_prelude_declarations() {
    let c = compile("program p is begin end program");
    assert!(c.contains("#include \"string.h\""));
    assert!(c.contains("#define true 1"));
    assert!(c.contains("#define false 0"));
    assert!(c.contains("#define MM_SIZE 32768"));
    assert!(c.contains("int MM[MM_SIZE];"));
    assert!(c.contains("int SP = 0;"));
    assert!(c.contains("int FP = 0;"));
    assert!(c.contains("int HP = MM_SIZE - 1;"));
    assert!(c.contains("float FLOAT_REG_1;"));
    assert!(c.contains("float FLOAT_REG_2;"));
}

#[test]
fn test_every_goto_target_is_defined() {
    let c = compile(
        "program p is
         int a;
         int i;
         procedure f(int x out)
         begin
             x := 1;
             return;
         end procedure;
         begin
             f(a);
             if (a == 1) then
                 putInteger(a);
             else
                 a := 2;
             end if;
             for (i := 0; i < a)
                 i := i + 1;
             end for;
         end program",
    );
    let defined = defined_labels(&c);
    for label in referenced_labels(&c) {
        assert!(
            defined.contains(&label),
            "goto target {:?} is not defined; labels: {:?}",
            label,
            defined
        );
    }
}

#[test]
fn test_register_declaration_covers_peak() {
    let c = compile(
        "program p is
         int a;
         int b;
         begin
             a := 1;
             b := a + a * a + (a + a) * a;
         end program",
    );
    let declared = declared_register_count(&c);
    let peak = peak_register_index(&c);
    assert!(
        declared > peak,
        "R[{}] declared but index {} used",
        declared,
        peak
    );
}

#[test]
fn test_minimal_program_still_declares_r() {
    // The epilogue convention uses R[0]; the array always exists.
    let c = compile("program p is begin end program");
    assert_eq!(declared_register_count(&c), 1);
}

// ===================
// Storage and assignment
// ===================

#[test]
fn test_top_level_storage_is_absolute() {
    let c = compile(
        "program p is
         int a;
         int b;
         begin
             a := 1;
             b := 2;
         end program",
    );
    // Two variables: slots 1 and 2, claimed before the body runs.
    assert!(c.contains("SP = SP + 2;"));
    assert!(c.contains("R[0] = MM[1];"));
    assert!(c.contains("R[1] = MM[2];"));
}

#[test]
fn test_arrays_claim_their_length() {
    let c = compile(
        "program p is
         int a[10];
         int b;
         begin
             b := a[3];
         end program",
    );
    // a occupies slots 1..=10, so b is slot 11.
    assert!(c.contains("SP = SP + 11;"), "got:\n{}", c);
    assert!(c.contains("R[0] = 1;"), "array base address: {}", c);
    assert!(c.contains("R[0] = R[0] + 3;"));
}

#[test]
fn test_float_literal_assignment_uses_scratch() {
    let c = compile("program p is float f; begin f := 1.5; end program");
    assert!(c.contains("FLOAT_REG_1 = 1.5;"));
    assert!(c.contains("memcpy(&R[0], &FLOAT_REG_1, sizeof(float));"));
}

#[test]
fn test_float_arithmetic_round_trips_bit_patterns() {
    let c = compile(
        "program p is
         float a;
         float b;
         begin
             a := 1.5;
             b := a + 2.5;
         end program",
    );
    assert!(c.contains("memcpy(&FLOAT_REG_1, &R["));
    assert!(c.contains("FLOAT_REG_1 = FLOAT_REG_1 + FLOAT_REG_2;"));
}

#[test]
fn test_string_literal_casts_to_int() {
    let c = compile("program p is string s; begin s := \"hi\"; end program");
    assert!(c.contains("(int) \"hi\""));
}

#[test]
fn test_subscript_store_goes_through_address_register() {
    let c = compile("program p is int a[4]; begin a[2] := 7; end program");
    assert!(c.contains("R[0] = 1;"), "base: {}", c);
    assert!(c.contains("R[0] = R[0] + 2;"));
    assert!(c.contains("MM[R[0]] = 7;"));
}

// ===================
// Operators
// ===================

#[test]
fn test_boolean_operator_validated() {
    let c = compile(
        "program p is
         bool a;
         bool b;
         begin
             a := true;
             b := a and true;
         end program",
    );
    assert!(c.contains("validateBooleanOp(R[0], '&', true,"), "got:\n{}", c);
}

#[test]
fn test_not_on_bool_is_logical() {
    let c = compile(
        "program p is
         bool a;
         bool b;
         begin
             a := true;
             b := not a;
         end program",
    );
    assert!(c.contains("= !R["), "got:\n{}", c);
}

#[test]
fn test_not_on_int_is_bitwise() {
    let c = compile(
        "program p is
         int a;
         int b;
         begin
             a := 1;
             b := not a;
         end program",
    );
    assert!(c.contains("= ~R["), "got:\n{}", c);
}

// ===================
// Control flow
// ===================

#[test]
fn test_if_shape() {
    let c = compile(
        "program p is
         int a;
         begin
             a := 1;
             if (a == 1) then
                 a := 2;
             else
                 a := 3;
             end if;
         end program",
    );
    assert!(c.contains("if (!R[") && c.contains(") goto __else_0;"), "got:\n{}", c);
    assert!(c.contains("goto __endif_0;"));
    assert!(defined_labels(&c).contains(&"__else_0"));
    assert!(defined_labels(&c).contains(&"__endif_0"));
}

#[test]
fn test_if_without_else_jumps_to_end() {
    let c = compile(
        "program p is
         int a;
         begin
             a := 1;
             if (a == 1) then
                 a := 2;
             end if;
         end program",
    );
    assert!(c.contains(") goto __endif_0;"), "got:\n{}", c);
    assert!(!c.contains("__else"));
}

#[test]
fn test_for_emits_back_edge() {
    let c = compile(
        "program p is
         int i;
         begin
             for (i := 0; i < 3)
                 i := i + 1;
             end for;
         end program",
    );
    assert!(c.contains("goto __for_0;"), "back edge: {}", c);
    assert!(c.contains(") goto __endfor_0;"));
    let back_edge = c.find("goto __for_0;").unwrap();
    let end_label = c.find("\n__endfor_0:").unwrap();
    assert!(back_edge < end_label, "back edge precedes the end label");
}

// ===================
// Procedures and calls
// ===================

#[test]
fn test_procedure_prologue_and_epilogue() {
    let c = compile(
        "program p is
         int a;
         procedure f(int x in, int y out)
         begin
             y := x;
         end procedure;
         begin
             f(1, a);
         end program",
    );
    // Two params, no locals.
    assert!(c.contains("FP = SP + 4;"), "got:\n{}", c);
    assert!(c.contains("SP = SP + 4;"));
    assert!(c.contains("SP = FP - 4;"));
    assert!(c.contains("R[0] = MM[FP];"));
    assert!(c.contains("FP = MM[FP - 1];"));
    assert!(c.contains("goto *(void *)R[0];"));
}

#[test]
fn test_call_pushes_args_fp_and_return_address() {
    let c = compile(
        "program p is
         int a;
         procedure f(int x in, int y out)
         begin
             y := x;
         end procedure;
         begin
             f(7, a);
         end program",
    );
    // Arg 2 (out a, absolute slot 1) pushed first at SP+1; arg 1 at SP+2.
    assert!(c.contains("MM[SP + 1] = 1;"), "got:\n{}", c);
    assert!(c.contains("MM[SP + 2] = 7;"));
    assert!(c.contains("MM[SP + 3] = FP;"));
    assert!(c.contains("MM[SP + 4] = (int)&&return_from_f_0;"));
    assert!(c.contains("goto f;"));
    assert!(defined_labels(&c).contains(&"return_from_f_0"));
}

#[test]
fn test_in_param_read_out_param_write() {
    let c = compile(
        "program p is
         int a;
         procedure f(int x in, int y out)
         begin
             y := x;
         end procedure;
         begin
             f(7, a);
         end program",
    );
    // x is param 1 (value at FP - 2), y is param 2 (address at FP - 3).
    assert!(c.contains("= MM[FP - 2];"), "read x: {}", c);
    assert!(c.contains("MM[MM[FP - 3]] ="), "write y: {}", c);
}

#[test]
fn test_out_parameter_forwarding_passes_slot_value() {
    let c = compile(
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
    // Caller: a's absolute address. Forward: x's slot already holds an
    // address, so it is pushed as a value.
    assert!(c.contains("MM[SP + 1] = 1;"), "address of a: {}", c);
    assert!(c.contains("MM[SP + 1] = MM[FP - 2];"), "forwarded x: {}", c);
}

#[test]
fn test_global_procedure_label_mangled() {
    let c = compile(
        "program p is
         global procedure f(int x in)
         begin
             putInteger(x);
         end procedure;
         begin
             f(1);
         end program",
    );
    assert!(defined_labels(&c).contains(&"__global_f"));
    assert!(c.contains("goto __global_f;"));
}

#[test]
fn test_return_jumps_to_epilogue() {
    let c = compile(
        "program p is
         procedure f(int x in)
         begin
             return;
         end procedure;
         begin
             f(1);
         end program",
    );
    assert!(c.contains("goto __end_f_0;"), "got:\n{}", c);
    assert!(defined_labels(&c).contains(&"__end_f_0"));
}

#[test]
fn test_runtime_bodies_emitted_when_enabled() {
    let c = compile("program p is int a; begin getInteger(a); end program");
    let labels = defined_labels(&c);
    for name in [
        "getBool",
        "getInteger",
        "getFloat",
        "getString",
        "putBool",
        "putInteger",
        "putFloat",
        "putString",
    ] {
        assert!(labels.contains(&name), "missing runtime label {}", name);
    }
    assert!(c.contains("extern int getInteger();"));
    assert!(c.contains("MM[MM[FP - 2]] = getInteger();"));
}

#[test]
fn test_runtime_omitted_when_disabled() {
    let mut program = parse_source("program p is begin end program").unwrap();
    check_program(&mut program, false).unwrap();
    let c = generate(
        &program,
        "program p is begin end program",
        CodegenOptions {
            verbose: false,
            include_runtime: false,
        },
    )
    .unwrap();
    assert!(!c.contains("extern int getInteger();"));
    assert!(!defined_labels(&c).contains(&"putString"));
}

// ===================
// Spill discipline
// ===================

#[test]
fn test_cached_registers_spilled_before_call() {
    let c = compile(
        "program p is
         int a;
         int b;
         begin
             a := 5;
             b := a;
             putInteger(b);
         end program",
    );
    // Before the call, both cached registers go back to memory.
    assert!(c.contains("MM[1] = R["), "spill a: {}", c);
    assert!(c.contains("MM[2] = R["), "spill b: {}", c);
}

#[test]
fn test_out_param_spilled_at_procedure_exit() {
    let c = compile(
        "program p is
         int a;
         procedure f(int x out)
         begin
             x := 9;
         end procedure;
         begin
             f(a);
         end program",
    );
    // The cached out-param register is written back through its address
    // slot before the epilogue.
    assert!(c.contains("MM[MM[FP - 2]] = R["), "got:\n{}", c);
}

// ===================
// Verbose mode
// ===================

#[test]
fn test_verbose_emits_source_comments() {
    let src = "program p is int a; begin a := 1 + 2; end program";
    let c = compile_with(src, CodegenOptions {
        verbose: true,
        include_runtime: true,
    });
    assert!(c.contains("/* a := 1 + 2 */"), "got:\n{}", c);
    assert!(c.contains("/* a */"));
}

#[test]
fn test_non_verbose_has_no_comments() {
    let c = compile("program p is int a; begin a := 1 + 2; end program");
    assert!(!c.contains("/*"));
}
