//! C code generation for the Pell compiler.
//!
//! This module lowers a checked (and optionally optimized) AST to one C
//! translation unit. The generated program is a single `main` function
//! whose control flow runs on labels and computed gotos: every procedure
//! is a label, every call pushes a return-label address, and every return
//! is a `goto *` through it. Keeping everything inside one function makes
//! the hand-rolled stack the single source of truth; there are no C
//! function boundaries to disagree with it.
//!
//! # Machine model
//!
//! - `MM[MM_SIZE]`: main memory (32 768 `int` slots)
//! - `R[n]`: virtual registers, `n` fixed after generation from the
//!   observed peak demand
//! - `SP`, `FP`: stack and frame pointers into `MM` (the stack grows up)
//! - `HP`: heap pointer, starting at `MM_SIZE - 1` and growing down
//! - `FLOAT_REG_1`, `FLOAT_REG_2`: float scratch slots; `R[]` is
//!   integer-typed, so float arithmetic round-trips bit patterns through
//!   these with `memcpy`
//!
//! # Calling convention
//!
//! Stdcall-like, callee-unwound. The caller pushes arguments
//! right-to-left into `MM[SP+1] … MM[SP+N]` (`in` by value, `out` by
//! address), the saved `FP` into `MM[SP+N+1]`, and the return-label
//! address into `MM[SP+N+2]`, then jumps to the callee's label. The
//! callee prologue sets `FP = SP + N + 2` (so `FP` addresses the return
//! slot) and bumps `SP` past its locals; parameter *k* sits at
//! `FP - (k+1)`. The epilogue restores `SP = FP - (N+2)`, reloads the
//! caller's `FP`, and computed-gotos through `R[0]`.
//!
//! # Register discipline
//!
//! Loads of named storage are cached per name so repeated reads reuse the
//! register. At every control-flow boundary (conditional branches, the
//! ends of `if` arms, the `for` back-edge, calls, `return`, and the end
//! of each body) the cache is spilled back to memory and dropped, so
//! memory is current on every path no matter which way execution went.
//!
//! # Module Structure
//!
//! - [`error`](self) - the [`CodegenError`] type
//! - `registers` - the register pool
//! - `location` - name addressing
//! - `expr` - expression lowering
//! - `stmt` - statement lowering
//! - `builtins` - runtime procedure bodies
//! - `tests` - unit tests (test-only)

mod builtins;
mod error;
mod expr;
mod location;
mod registers;
mod stmt;

#[cfg(test)]
mod tests;

pub use error::CodegenError;

use std::collections::{BTreeMap, HashMap};

use crate::ast::{Decl, Program, ProcDecl, Direction, VarDecl};
use crate::runtime;
use crate::token::Span;
use location::Location;
use registers::{Register, RegisterPool};

/// Size of the simulated main memory, in `int` slots.
const MM_SIZE: usize = 32_768;

/// How one parameter is passed.
///
/// `out` parameters and arrays travel by reference (the caller pushes an
/// address); scalar `in` parameters travel by value.
#[derive(Debug, Clone, Copy)]
pub(super) struct ParamMode {
    pub(super) direction: Direction,
    pub(super) by_reference: bool,
}

impl ParamMode {
    fn of(param: &crate::ast::Param) -> ParamMode {
        ParamMode {
            direction: param.direction,
            by_reference: param.direction == Direction::Out || param.var_decl.is_array(),
        }
    }
}

/// Options controlling code generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodegenOptions {
    /// Annotate the output with source-line comments.
    pub verbose: bool,
    /// Emit the runtime I/O procedure bodies and `extern` prototypes.
    pub include_runtime: bool,
}

/// Generates the C translation unit for a checked program.
///
/// `source` is the original source text; it is only consulted for the
/// comments `verbose` asks for.
///
/// # Errors
///
/// Returns a [`CodegenError`] on register exhaustion or when the tree
/// breaks an invariant the type checker establishes.
pub fn generate(
    program: &Program,
    source: &str,
    options: CodegenOptions,
) -> Result<String, CodegenError> {
    let mut generator = CodeGenerator::new(source, options);
    generator.emit_program(program)?;
    Ok(generator.output)
}

/// The C code generator.
pub(super) struct CodeGenerator<'a> {
    /// Source lines, for verbose comments.
    source_lines: Vec<&'a str>,
    options: CodegenOptions,
    /// The translation unit being built.
    output: String,
    registers: RegisterPool,
    /// Registers currently holding named storage, by name. Ordered so
    /// spills emit deterministically.
    cache: BTreeMap<String, Register>,
    /// Absolute `MM` offsets of every top-level variable.
    globals: HashMap<String, usize>,
    /// Mangled labels of `global` procedures.
    global_labels: HashMap<String, String>,
    /// Parameter passing modes by procedure name, for call sites.
    signatures: HashMap<String, Vec<ParamMode>>,
    /// Frame layouts of the procedures currently being generated.
    frames: Vec<HashMap<String, Location>>,
    /// Per-title counters for unique labels.
    label_counts: HashMap<String, usize>,
    /// Where `return` jumps in the procedure being generated; `None` in
    /// the program body.
    epilogue_label: Option<String>,
}

impl<'a> CodeGenerator<'a> {
    fn new(source: &'a str, options: CodegenOptions) -> Self {
        CodeGenerator {
            source_lines: source.lines().collect(),
            options,
            output: String::new(),
            registers: RegisterPool::new(),
            cache: BTreeMap::new(),
            globals: HashMap::new(),
            global_labels: HashMap::new(),
            signatures: HashMap::new(),
            frames: Vec::new(),
            label_counts: HashMap::new(),
            epilogue_label: None,
        }
    }

    // ----- emission helpers -----

    /// Emits one indented line.
    pub(super) fn write(&mut self, line: &str) {
        self.output.push_str("    ");
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Emits one line at column zero.
    pub(super) fn write_raw(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    /// Emits a label definition, preceded by a blank line.
    pub(super) fn write_label(&mut self, label: &str) {
        self.output.push('\n');
        self.output.push_str(label);
        self.output.push_str(":\n");
    }

    /// Returns a fresh label `title_<n>`.
    pub(super) fn create_label(&mut self, title: &str) -> String {
        let count = self.label_counts.entry(title.to_string()).or_insert(0);
        let label = format!("{}_{}", title, count);
        *count += 1;
        label
    }

    /// Returns the source text under a span, for verbose comments.
    pub(super) fn source_slice(&self, span: Span) -> Option<String> {
        let line = self.source_lines.get(span.line.checked_sub(1)?)?;
        let chars: Vec<char> = line.chars().collect();
        if span.start >= chars.len() {
            return None;
        }
        let end = span.end.min(chars.len() - 1);
        Some(chars[span.start..=end].iter().collect())
    }

    /// Emits a `/* source */` comment when verbose output is on.
    pub(super) fn comment_span(&mut self, span: Span) {
        if !self.options.verbose {
            return;
        }
        if let Some(text) = self.source_slice(span) {
            self.write(&format!("/* {} */", text));
        }
    }

    // ----- name resolution -----

    /// Resolves a name to its storage location.
    pub(super) fn resolve(&self, name: &str, span: Span) -> Result<Location, CodegenError> {
        if let Some(frame) = self.frames.last()
            && let Some(location) = frame.get(name)
        {
            return Ok(*location);
        }
        if let Some(offset) = self.globals.get(name) {
            return Ok(Location::Global(*offset));
        }
        Err(CodegenError::malformed(
            format!("name '{}' has no storage", name),
            span,
        ))
    }

    /// Returns the register caching a name, loading it on first use.
    pub(super) fn get_register(&mut self, name: &str, span: Span) -> Result<Register, CodegenError> {
        if let Some(register) = self.cache.get(name) {
            return Ok(*register);
        }

        let location = self.resolve(name, span)?;
        let register = self.registers.acquire()?;
        if self.options.verbose {
            self.write(&format!("{} = {}; /* {} */", register, location.value(), name));
        } else {
            self.write(&format!("{} = {};", register, location.value()));
        }
        self.cache.insert(name.to_string(), register);
        Ok(register)
    }

    /// Spills every cached register back to memory and empties the cache.
    ///
    /// Called at every control-flow boundary so memory is current on all
    /// paths; the freed registers go back to the pool.
    pub(super) fn spill_and_clear(&mut self) -> Result<(), CodegenError> {
        let cached: Vec<(String, Register)> = self
            .cache
            .iter()
            .map(|(name, register)| (name.clone(), *register))
            .collect();
        self.cache.clear();

        for (name, register) in cached {
            // Spans are irrelevant here; every cached name resolved once
            // already.
            let location = self.resolve(&name, Span::new(0, 0, 1))?;
            if self.options.verbose {
                self.write(&format!(
                    "{} = {}; /* store {} */",
                    location.value(),
                    register,
                    name
                ));
            } else {
                self.write(&format!("{} = {};", location.value(), register));
            }
            self.registers.release(register);
        }
        Ok(())
    }

    /// Empties the cache without writing anything back.
    ///
    /// Used after calls: the callee may have changed memory, so cached
    /// values are stale, but they were spilled before the call and must
    /// not be written again.
    pub(super) fn drop_cache(&mut self) {
        let registers: Vec<Register> = self.cache.values().copied().collect();
        self.cache.clear();
        for register in registers {
            self.registers.release(register);
        }
    }

    /// Looks up the parameter passing modes of a callee.
    pub(super) fn call_params(&self, name: &str, span: Span) -> Result<Vec<ParamMode>, CodegenError> {
        if let Some(params) = self.signatures.get(name) {
            return Ok(params.clone());
        }
        if let Some(proc) = runtime::lookup(name) {
            return Ok(vec![ParamMode {
                direction: proc.direction,
                by_reference: proc.direction == Direction::Out,
            }]);
        }
        Err(CodegenError::malformed(
            format!("call to unknown procedure '{}'", name),
            span,
        ))
    }

    /// Returns the label a call to `name` jumps to.
    pub(super) fn call_label(&self, name: &str) -> String {
        self.global_labels
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    // ----- program and procedures -----

    fn emit_program(&mut self, program: &Program) -> Result<(), CodegenError> {
        self.write_raw("#include \"string.h\"");
        self.write_raw("#define true 1");
        self.write_raw("#define false 0");
        self.write_raw(&format!("#define MM_SIZE {}", MM_SIZE));
        self.write_raw("");
        self.write_raw("extern int R[];");
        self.write_raw("int MM[MM_SIZE];");
        self.write_raw("float FLOAT_REG_1;");
        self.write_raw("float FLOAT_REG_2;");
        self.write_raw("int SP = 0;");
        self.write_raw("int FP = 0;");
        self.write_raw("int HP = MM_SIZE - 1;");
        self.write_raw("extern void validateBooleanOp();");
        if self.options.include_runtime {
            self.write_runtime_prototypes();
        }
        self.write_raw("");
        self.write_raw("int main() {");
        self.write(&format!("goto {};", program.name));

        if self.options.include_runtime {
            self.emit_runtime_builtins();
        }

        // Every procedure signature and mangled label is visible before
        // any call site is lowered; C labels are function-scoped, so a
        // jump to a later-emitted label is fine.
        self.register_signatures(&program.decls);

        // Lay out top-level storage and emit every procedure; procedure
        // code comes before the program label, all inside main.
        let slots = self.layout_program_decls(&program.decls)?;

        self.write_label(&program.name);
        if slots > 0 {
            self.write(&format!("SP = SP + {};", slots));
        }

        for stmt in &program.body {
            self.gen_stmt(stmt)?;
        }

        // The program body is the end of execution; no unwind needed.
        self.write("return 0;");
        self.write_raw("}");
        self.write_raw("");
        self.write_raw(&format!("int R[{}];", self.registers.max_size().max(1)));
        Ok(())
    }

    /// Records the signature (and mangled label, for `global` procedures)
    /// of every procedure in a declaration subtree.
    fn register_signatures(&mut self, decls: &[Decl]) {
        for decl in decls {
            if let Decl::Proc(proc) = decl {
                self.signatures.insert(
                    proc.name.clone(),
                    proc.params.iter().map(ParamMode::of).collect(),
                );
                if proc.is_global {
                    self.global_labels
                        .insert(proc.name.clone(), format!("__global_{}", proc.name));
                }
                self.register_signatures(&proc.decls);
            }
        }
    }

    /// Assigns absolute offsets to the top-level variables and generates
    /// every top-level procedure. Returns the number of slots the program
    /// body claims.
    ///
    /// The program starts with `FP == SP == 0`, so its frame offsets are
    /// static memory locations; every top-level variable is addressed
    /// absolutely, `global` or not.
    fn layout_program_decls(&mut self, decls: &[Decl]) -> Result<usize, CodegenError> {
        let mut offset = 1usize;
        for decl in decls {
            match decl {
                Decl::Var(var) => {
                    self.globals.insert(var.name.clone(), offset);
                    offset += Self::var_slots(var)?;
                }
                Decl::Proc(proc) => self.gen_proc(proc)?,
            }
        }
        Ok(offset - 1)
    }

    /// The number of `MM` slots a variable occupies.
    fn var_slots(var: &VarDecl) -> Result<usize, CodegenError> {
        match &var.array_length {
            None => Ok(1),
            Some(length) => {
                let lexeme = length.as_num().ok_or_else(|| {
                    CodegenError::malformed("array length is not a literal", length.span)
                })?;
                lexeme.parse().map_err(|_| {
                    CodegenError::malformed("array length is not an integer", length.span)
                })
            }
        }
    }

    /// Generates one procedure: nested procedures, label, prologue, body,
    /// epilogue.
    fn gen_proc(&mut self, proc: &ProcDecl) -> Result<(), CodegenError> {
        self.signatures.insert(
            proc.name.clone(),
            proc.params.iter().map(ParamMode::of).collect(),
        );

        let mut frame: HashMap<String, Location> = HashMap::new();
        let mut locals = 0usize;

        // Parameter k (1-based, declaration order) sits at FP - (k + 1).
        for (index, param) in proc.params.iter().enumerate() {
            let offset = index + 2;
            let location = if ParamMode::of(param).by_reference {
                Location::ParamRef(offset)
            } else {
                Location::Param(offset)
            };
            frame.insert(param.var_decl.name.clone(), location);
        }

        // Locals start just above the return-address slot at FP.
        let mut nested: Vec<&ProcDecl> = Vec::new();
        for decl in &proc.decls {
            match decl {
                Decl::Var(var) => {
                    frame.insert(var.name.clone(), Location::Local(locals + 1));
                    locals += Self::var_slots(var)?;
                }
                Decl::Proc(inner) => nested.push(inner),
            }
        }

        // Nested procedures are emitted first so this procedure's label
        // opens its own straight-line block.
        for inner in nested {
            self.gen_proc(inner)?;
        }

        let label = if proc.is_global {
            let label = format!("__global_{}", proc.name);
            self.global_labels.insert(proc.name.clone(), label.clone());
            label
        } else {
            proc.name.clone()
        };

        self.frames.push(frame);
        let saved_epilogue = self.epilogue_label.take();
        let epilogue = self.create_label(&format!("__end_{}", label));
        self.epilogue_label = Some(epilogue.clone());

        let param_count = proc.params.len();
        self.write_label(&label);
        self.write(&format!("FP = SP + {};", param_count + 2));
        self.write(&format!("SP = SP + {};", param_count + 2 + locals));

        for stmt in &proc.body {
            self.gen_stmt(stmt)?;
        }

        // Bring memory current on the fall-through path; `return`
        // statements did the same before jumping here, so the epilogue
        // itself is cache-independent.
        self.spill_and_clear()?;
        self.write_label(&epilogue);
        self.write(&format!("SP = FP - {};", param_count + 2));
        self.write("R[0] = MM[FP];");
        self.write("FP = MM[FP - 1];");
        self.write("goto *(void *)R[0];");

        self.epilogue_label = saved_epilogue;
        self.frames.pop();
        self.registers.clear();
        Ok(())
    }
}
