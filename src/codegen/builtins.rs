//! Runtime procedure bodies.
//!
//! When the runtime is linked, the generator emits a hand-written label
//! body for each procedure in the runtime table. Each follows the normal
//! calling convention (one parameter at `MM[FP - 2]`, no locals) and
//! bridges to the C function of the same name supplied by `runtime.c`.

use super::CodeGenerator;
use crate::ast::{Direction, Type};
use crate::runtime::RUNTIME_PROCS;

impl CodeGenerator<'_> {
    /// Emits `extern` prototypes for the runtime's C functions.
    pub(super) fn write_runtime_prototypes(&mut self) {
        self.write_raw("extern int getBool();");
        self.write_raw("extern int getInteger();");
        self.write_raw("extern float getFloat();");
        self.write_raw("extern char *getString();");
        self.write_raw("extern void putBool(int);");
        self.write_raw("extern void putInteger(int);");
        self.write_raw("extern void putFloat(float);");
        self.write_raw("extern void putString(char *);");
    }

    /// Emits the label body of every runtime procedure.
    pub(super) fn emit_runtime_builtins(&mut self) {
        for proc in RUNTIME_PROCS {
            self.write_label(proc.name);
            // One parameter, no locals: frame is the two link slots plus
            // the argument.
            self.write("FP = SP + 3;");
            self.write("SP = SP + 3;");

            match (proc.direction, proc.ty) {
                (Direction::Out, Type::Bool) | (Direction::Out, Type::Int) => {
                    self.write(&format!("MM[MM[FP - 2]] = {}();", proc.name));
                }
                (Direction::Out, Type::Float) => {
                    self.write(&format!("FLOAT_REG_1 = {}();", proc.name));
                    self.write("memcpy(&MM[MM[FP - 2]], &FLOAT_REG_1, sizeof(float));");
                }
                (Direction::Out, Type::Str) => {
                    self.write(&format!("MM[MM[FP - 2]] = (int) {}();", proc.name));
                }
                (Direction::In, Type::Bool) | (Direction::In, Type::Int) => {
                    self.write(&format!("{}(MM[FP - 2]);", proc.name));
                }
                (Direction::In, Type::Float) => {
                    self.write("memcpy(&FLOAT_REG_1, &MM[FP - 2], sizeof(float));");
                    self.write(&format!("{}(FLOAT_REG_1);", proc.name));
                }
                (Direction::In, Type::Str) => {
                    self.write(&format!("{}((char *) MM[FP - 2]);", proc.name));
                }
            }

            self.write("SP = FP - 3;");
            self.write("R[0] = MM[FP];");
            self.write("FP = MM[FP - 1];");
            self.write("goto *(void *)R[0];");
        }
    }
}
