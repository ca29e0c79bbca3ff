//! Statement lowering.

use super::CodeGenerator;
use super::error::CodegenError;
use super::expr::{Operand, is_float_literal, is_temp};
use crate::ast::{Direction, Expr, ExprKind, Stmt, StmtKind};

impl CodeGenerator<'_> {
    /// Lowers one statement.
    pub(super) fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                self.comment_span(stmt.span);
                self.gen_assign(target, value)
            }
            StmtKind::If { test, body, orelse } => self.gen_if(test, body, orelse),
            StmtKind::For { init, test, body } => self.gen_for(init, test, body),
            StmtKind::Call { name, args } => {
                self.comment_span(stmt.span);
                self.gen_call(name, args, stmt)
            }
            StmtKind::Return => self.gen_return(),
        }
    }

    /// Lowers `target := value`.
    ///
    /// Scalar targets move the value into the target's cached register;
    /// the spill discipline writes it back to memory at the next
    /// control-flow boundary. Subscript targets store through a computed
    /// address immediately. Float literals can't be assigned into the
    /// integer world directly; their bit pattern goes through a scratch
    /// slot.
    fn gen_assign(&mut self, target: &Expr, value: &Expr) -> Result<(), CodegenError> {
        let value_operand = self.gen_expr(value)?;

        match &target.kind {
            ExprKind::Name(id) => {
                let target_register = self.get_register(id, target.span)?;
                if is_float_literal(value) {
                    self.write(&format!("FLOAT_REG_1 = {};", value_operand));
                    self.write(&format!(
                        "memcpy(&{}, &FLOAT_REG_1, sizeof(float));",
                        target_register
                    ));
                } else {
                    self.write(&format!("{} = {};", target_register, value_operand));
                }
            }
            ExprKind::Subscript { name, index, .. } => {
                let address = self.gen_subscript_address(name, index, target)?;
                if is_float_literal(value) {
                    self.write(&format!("FLOAT_REG_1 = {};", value_operand));
                    self.write(&format!(
                        "memcpy(&MM[{}], &FLOAT_REG_1, sizeof(float));",
                        address
                    ));
                } else {
                    self.write(&format!("MM[{}] = {};", address, value_operand));
                }
                self.registers.release(address);
            }
            _ => {
                return Err(CodegenError::malformed(
                    "assignment target is not storage",
                    target.span,
                ));
            }
        }

        if let (true, Operand::Reg(register)) = (is_temp(value), &value_operand) {
            self.registers.release(*register);
        }
        Ok(())
    }

    /// Lowers an `if` statement.
    ///
    /// ```text
    ///     if (!test) goto else_or_end;
    ///     ...then...
    ///     goto end;
    /// else:
    ///     ...else...
    /// end:
    /// ```
    fn gen_if(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> Result<(), CodegenError> {
        let test_operand = self.gen_expr(test)?;
        if let (true, Operand::Reg(register)) = (is_temp(test), &test_operand) {
            self.registers.release(*register);
        }
        // Memory must be current before control can go two ways; the
        // emitted stores don't disturb the test register.
        self.spill_and_clear()?;

        let end_label = self.create_label("__endif");
        let target_label = if orelse.is_empty() {
            end_label.clone()
        } else {
            self.create_label("__else")
        };

        self.write(&format!("if (!{}) goto {};", test_operand, target_label));

        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.spill_and_clear()?;

        if !orelse.is_empty() {
            self.write(&format!("goto {};", end_label));
            self.write_label(&target_label);
            for stmt in orelse {
                self.gen_stmt(stmt)?;
            }
            self.spill_and_clear()?;
        }

        self.write_label(&end_label);
        Ok(())
    }

    /// Lowers a `for` statement.
    ///
    /// The header assignment runs once; the test is re-evaluated from
    /// memory at the top of every iteration (the cache is dropped at the
    /// back-edge, so loop-carried variables reload).
    fn gen_for(&mut self, init: &Stmt, test: &Expr, body: &[Stmt]) -> Result<(), CodegenError> {
        self.gen_stmt(init)?;
        self.spill_and_clear()?;

        let start_label = self.create_label("__for");
        let end_label = self.create_label("__endfor");

        self.write_label(&start_label);
        let test_operand = self.gen_expr(test)?;
        if let (true, Operand::Reg(register)) = (is_temp(test), &test_operand) {
            self.registers.release(*register);
        }
        self.spill_and_clear()?;
        self.write(&format!("if (!{}) goto {};", test_operand, end_label));

        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.spill_and_clear()?;
        self.write(&format!("goto {};", start_label));

        self.write_label(&end_label);
        Ok(())
    }

    /// Lowers a procedure call.
    ///
    /// Arguments are pushed right-to-left: `in` arguments by value, `out`
    /// arguments as the address of the named storage (which, for a
    /// forwarded `out` parameter, is the address value already sitting in
    /// its frame slot). Then the saved FP and the return-label address go
    /// on top, and control jumps to the callee's label.
    fn gen_call(&mut self, name: &str, args: &[Expr], stmt: &Stmt) -> Result<(), CodegenError> {
        let params = self.call_params(name, stmt.span)?;
        let label = self.call_label(name);
        let return_label = self.create_label(&format!("return_from_{}", label));
        let arg_count = args.len();

        self.spill_and_clear()?;

        // Argument k (1-based) lands in MM[SP + 1 + (N - k)]: pushed
        // right-to-left with the stack growing up.
        for (index, (arg, param)) in args.iter().zip(params.iter()).enumerate().rev() {
            let position = 1 + (arg_count - (index + 1));

            // By-reference arguments are named storage; the checker
            // guarantees it for `out`, and array arguments have no other
            // spelling.
            if param.by_reference && let Some(id) = arg.as_name() {
                let address = self.resolve(id, arg.span)?.address();
                self.write(&format!("MM[SP + {}] = {};", position, address));
                continue;
            }
            if param.direction == Direction::Out {
                return Err(CodegenError::malformed(
                    "out argument is not a name",
                    arg.span,
                ));
            }

            let value = self.gen_expr(arg)?;
            if is_float_literal(arg) {
                self.write(&format!("FLOAT_REG_1 = {};", value));
                self.write(&format!(
                    "memcpy(&MM[SP + {}], &FLOAT_REG_1, sizeof(float));",
                    position
                ));
            } else {
                self.write(&format!("MM[SP + {}] = {};", position, value));
            }
            if let (true, Operand::Reg(register)) = (is_temp(arg), &value) {
                self.registers.release(*register);
            }
        }

        self.write(&format!("MM[SP + {}] = FP;", arg_count + 1));
        self.write(&format!(
            "MM[SP + {}] = (int)&&{};",
            arg_count + 2,
            return_label
        ));
        self.write(&format!("goto {};", label));
        self.write_label(&return_label);

        // The callee may have written through out parameters or globals;
        // anything cached during argument evaluation is stale now.
        self.drop_cache();
        Ok(())
    }

    /// Lowers a `return`.
    ///
    /// Inside a procedure this jumps to the epilogue; in the program body
    /// it ends the process.
    fn gen_return(&mut self) -> Result<(), CodegenError> {
        match self.epilogue_label.clone() {
            Some(epilogue) => {
                self.spill_and_clear()?;
                self.write(&format!("goto {};", epilogue));
            }
            None => self.write("return 0;"),
        }
        Ok(())
    }
}
