//! Constant folding.
//!
//! Folds any `BinaryOp` or `UnaryOp` whose operands are `Num` literals
//! into a single `Num`. Evaluation is explicit per operator and type:
//! 64-bit wrapping arithmetic with truncating division for ints, `f64`
//! arithmetic for floats and int/float mixes, bitwise `&`/`|` for
//! `and`/`or`, comparisons producing `1`/`0`, and `not` as logical
//! negation on booleans or 32-bit complement on ints. Division by zero and
//! results with no clean decimal spelling are left unfolded; they keep
//! their run-time meaning instead.

use crate::ast::visit;
use crate::ast::{BinOp, Expr, ExprKind, Program, Type, UnOp};

/// The constant folding pass.
///
/// Runs standalone at optimization level 1; the constant propagator builds
/// on the same evaluation to fold after substitution.
pub struct ConstantFolder {
    /// Whether this walk changed the tree.
    pub modified: bool,
}

impl ConstantFolder {
    /// Creates a new folder.
    pub fn new() -> Self {
        ConstantFolder { modified: false }
    }

    /// Folds every expression in the program, in place.
    pub fn walk(&mut self, program: &mut Program) {
        let mut modified = false;
        visit::walk_program_mut(program, &mut |root| {
            visit::walk_expr_mut(root, &mut |expr| {
                if fold_expr(expr) {
                    modified = true;
                }
            });
        });
        self.modified |= modified;
    }
}

impl Default for ConstantFolder {
    fn default() -> Self {
        Self::new()
    }
}

/// Folds one operation node if its operands are literals.
///
/// The replacement keeps the node's span and type annotation. Returns
/// whether a replacement happened. Callers run this post-order so partial
/// folds compose, e.g. `1 + 2 * 3` folds the product first and then the
/// sum.
pub(super) fn fold_expr(expr: &mut Expr) -> bool {
    let folded = match &expr.kind {
        ExprKind::BinaryOp { op, left, right } => {
            match (left.as_num(), right.as_num()) {
                (Some(l), Some(r)) => eval_binary(*op, l, r),
                _ => None,
            }
        }
        ExprKind::UnaryOp { op, operand } => match operand.as_num() {
            Some(lexeme) => {
                let bool_operand = operand.ty == Some(Type::Bool)
                    || lexeme == "true"
                    || lexeme == "false";
                eval_unary(*op, lexeme, bool_operand)
            }
            None => None,
        },
        _ => None,
    };

    match folded {
        Some(lexeme) => {
            let span = expr.span;
            let ty = expr.ty;
            *expr = Expr::num(lexeme, span);
            expr.ty = ty;
            true
        }
        None => false,
    }
}

/// A literal value: an integer or a float.
enum Value {
    Int(i64),
    Float(f64),
}

/// Parses a `Num` lexeme.
///
/// The boolean literals participate in folding as 1 and 0.
fn literal_value(lexeme: &str) -> Option<Value> {
    match lexeme {
        "true" => return Some(Value::Int(1)),
        "false" => return Some(Value::Int(0)),
        _ => {}
    }
    if lexeme.contains('.') {
        lexeme.parse().ok().map(Value::Float)
    } else {
        lexeme.parse().ok().map(Value::Int)
    }
}

/// Formats a folded float so it reads back as a float.
///
/// Returns `None` for values with no plain decimal spelling (infinities,
/// NaN, exponent notation); those operations stay unfolded.
fn format_float(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let lexeme = format!("{:?}", value);
    if lexeme.contains('e') || lexeme.contains('E') {
        return None;
    }
    Some(lexeme)
}

fn bool_lexeme(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

/// Evaluates a binary operation over two literal lexemes.
pub(super) fn eval_binary(op: BinOp, left: &str, right: &str) -> Option<String> {
    let (left, right) = (literal_value(left)?, literal_value(right)?);

    if let (Value::Int(l), Value::Int(r)) = (&left, &right) {
        let (l, r) = (*l, *r);
        let lexeme = match op {
            BinOp::Add => l.wrapping_add(r).to_string(),
            BinOp::Sub => l.wrapping_sub(r).to_string(),
            BinOp::Mul => l.wrapping_mul(r).to_string(),
            BinOp::Div => {
                if r == 0 {
                    return None;
                }
                l.wrapping_div(r).to_string()
            }
            BinOp::And => (l & r).to_string(),
            BinOp::Or => (l | r).to_string(),
            BinOp::Lt => bool_lexeme(l < r),
            BinOp::Lte => bool_lexeme(l <= r),
            BinOp::Gt => bool_lexeme(l > r),
            BinOp::Gte => bool_lexeme(l >= r),
            BinOp::Eq => bool_lexeme(l == r),
            BinOp::NotEq => bool_lexeme(l != r),
        };
        return Some(lexeme);
    }

    // At least one float: compute in f64. The checker has already ruled
    // out `and`/`or` here.
    let (l, r) = (left.as_f64(), right.as_f64());
    match op {
        BinOp::Add => format_float(l + r),
        BinOp::Sub => format_float(l - r),
        BinOp::Mul => format_float(l * r),
        BinOp::Div => {
            if r == 0.0 {
                return None;
            }
            format_float(l / r)
        }
        BinOp::And | BinOp::Or => None,
        BinOp::Lt => Some(bool_lexeme(l < r)),
        BinOp::Lte => Some(bool_lexeme(l <= r)),
        BinOp::Gt => Some(bool_lexeme(l > r)),
        BinOp::Gte => Some(bool_lexeme(l >= r)),
        BinOp::Eq => Some(bool_lexeme(l == r)),
        BinOp::NotEq => Some(bool_lexeme(l != r)),
    }
}

impl Value {
    fn as_f64(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::Float(v) => *v,
        }
    }
}

/// Evaluates a unary operation over a literal lexeme.
///
/// `not` is logical negation when the operand is boolean, and a 32-bit
/// bitwise complement on ints, matching what the generated C does with
/// `!` and `~` on the 32-bit machine word.
pub(super) fn eval_unary(op: UnOp, operand: &str, bool_operand: bool) -> Option<String> {
    match (op, literal_value(operand)?) {
        (UnOp::Neg, Value::Int(v)) => Some(v.wrapping_neg().to_string()),
        (UnOp::Neg, Value::Float(v)) => format_float(-v),
        (UnOp::Not, Value::Int(v)) => {
            if bool_operand {
                Some(bool_lexeme(v == 0))
            } else {
                Some((!(v as u32)).to_string())
            }
        }
        // The checker rejects `not` on floats.
        (UnOp::Not, Value::Float(_)) => None,
    }
}
