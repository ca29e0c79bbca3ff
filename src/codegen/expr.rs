//! Expression lowering.
//!
//! Expressions are lowered by pure post-order evaluation: operands are
//! produced first, their temporaries are released, and the operation
//! claims a fresh register for its result. Literals never touch a
//! register; they ride along as immediates and appear directly in the
//! emitted operations.

use std::fmt;

use super::CodeGenerator;
use super::error::CodegenError;
use super::registers::Register;
use crate::ast::{Expr, ExprKind, Type, UnOp};

/// A value an emitted C operation can use in operand position.
pub(super) enum Operand {
    /// A virtual register.
    Reg(Register),
    /// An immediate: a numeric literal or a cast string literal.
    Imm(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(register) => write!(f, "{}", register),
            Operand::Imm(text) => write!(f, "{}", text),
        }
    }
}

/// Whether lowering this node claims a temporary register for its result.
///
/// Names are cached (and freed at spill points), literals are immediates;
/// only operations and subscript loads produce a register the consumer
/// must release.
pub(super) fn is_temp(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::BinaryOp { .. } | ExprKind::UnaryOp { .. } | ExprKind::Subscript { .. }
    )
}

/// Whether an expression is a float literal, which needs the bit-pattern
/// dance when stored into integer-typed storage.
pub(super) fn is_float_literal(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Num(lexeme) if lexeme.contains('.'))
}

impl CodeGenerator<'_> {
    /// Lowers an expression, returning the operand holding its value.
    ///
    /// The caller owns the result: if [`is_temp`] holds for the
    /// expression, the caller must release the returned register once the
    /// value has been consumed.
    pub(super) fn gen_expr(&mut self, expr: &Expr) -> Result<Operand, CodegenError> {
        match &expr.kind {
            ExprKind::Num(lexeme) => Ok(Operand::Imm(lexeme.clone())),

            // Pointers travel in int slots; the runtime casts them back.
            ExprKind::Str(lexeme) => Ok(Operand::Imm(format!("(int) {}", lexeme))),

            ExprKind::Name(id) => Ok(Operand::Reg(self.get_register(id, expr.span)?)),

            ExprKind::Subscript { name, index, .. } => {
                let address = self.gen_subscript_address(name, index, expr)?;
                let value = self.registers.acquire()?;
                self.write(&format!("{} = MM[{}];", value, address));
                self.registers.release(address);
                Ok(Operand::Reg(value))
            }

            ExprKind::UnaryOp { op, operand } => {
                let value = self.gen_expr(operand)?;
                if let (true, Operand::Reg(register)) = (is_temp(operand), &value) {
                    self.registers.release(*register);
                }
                let out = self.registers.acquire()?;

                match op {
                    UnOp::Neg => self.write(&format!("{} = -{};", out, value)),
                    UnOp::Not => {
                        // C negation depends on the data type: logical on
                        // booleans, bitwise on ints.
                        if expr.ty == Some(Type::Bool) {
                            self.write(&format!(
                                "validateBooleanOp(0, '!', {}, {});",
                                value, expr.span.line
                            ));
                            self.write(&format!("{} = !{};", out, value));
                        } else {
                            self.write(&format!("{} = ~{};", out, value));
                        }
                    }
                }
                Ok(Operand::Reg(out))
            }

            ExprKind::BinaryOp { op, left, right } => {
                let left_value = self.gen_expr(left)?;
                let right_value = self.gen_expr(right)?;

                if let (true, Operand::Reg(register)) = (is_temp(right), &right_value) {
                    self.registers.release(*register);
                }
                if let (true, Operand::Reg(register)) = (is_temp(left), &left_value) {
                    self.registers.release(*register);
                }
                let out = self.registers.acquire()?;

                let ty = expr.ty.ok_or_else(|| {
                    CodegenError::malformed("operation has no type annotation", expr.span)
                })?;

                if ty == Type::Float {
                    // R[] is integer-typed; float arithmetic round-trips
                    // operand bit patterns through the scratch slots.
                    self.load_float_scratch("FLOAT_REG_1", left, &left_value);
                    self.load_float_scratch("FLOAT_REG_2", right, &right_value);
                    self.write(&format!(
                        "FLOAT_REG_1 = FLOAT_REG_1 {} FLOAT_REG_2;",
                        op.c_symbol()
                    ));
                    self.write(&format!("memcpy(&{}, &FLOAT_REG_1, sizeof(float));", out));
                } else {
                    if ty == Type::Bool {
                        self.write(&format!(
                            "validateBooleanOp({}, '{}', {}, {});",
                            left_value,
                            op.c_symbol(),
                            right_value,
                            expr.span.line
                        ));
                    }
                    self.write(&format!(
                        "{} = {} {} {};",
                        out,
                        left_value,
                        op.c_symbol(),
                        right_value
                    ));
                }
                Ok(Operand::Reg(out))
            }
        }
    }

    /// Loads one float operand into a scratch slot.
    ///
    /// Literals assign directly (the C compiler converts); registers hold
    /// bit patterns and go through `memcpy`.
    fn load_float_scratch(&mut self, scratch: &str, operand_expr: &Expr, value: &Operand) {
        if matches!(operand_expr.kind, ExprKind::Num(_)) {
            self.write(&format!("{} = {};", scratch, value));
        } else {
            self.write(&format!("memcpy(&{}, &{}, sizeof(float));", scratch, value));
        }
    }

    /// Computes the address of `name[index]` into a fresh register.
    ///
    /// The caller owns the returned register: a load frees it right after
    /// reading, a store frees it after writing through it.
    pub(super) fn gen_subscript_address(
        &mut self,
        name: &str,
        index: &Expr,
        whole: &Expr,
    ) -> Result<Register, CodegenError> {
        let base = self.resolve(name, whole.span)?.address();
        let index_value = self.gen_expr(index)?;
        let address = self.registers.acquire()?;

        if self.options.verbose {
            let text = self.source_slice(whole.span);
            match text {
                Some(text) => self.write(&format!("{} = {}; /* {} */", address, base, text)),
                None => self.write(&format!("{} = {};", address, base)),
            }
        } else {
            self.write(&format!("{} = {};", address, base));
        }

        // Adding a literal zero would be noise.
        let zero_index = matches!(&index_value, Operand::Imm(text) if text == "0");
        if !zero_index {
            self.write(&format!("{} = {} + {};", address, address, index_value));
        }

        if let (true, Operand::Reg(register)) = (is_temp(index), &index_value) {
            self.registers.release(*register);
        }
        Ok(address)
    }
}
