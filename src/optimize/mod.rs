//! AST optimization for the Pell compiler.
//!
//! Two optimization levels, selected by the driver:
//!
//! - **Level 1** runs [`ConstantFolder`] once: any operation over literal
//!   operands collapses to a literal.
//! - **Level 2** runs [`ConstantPropagator`] and [`DeadCodeEliminator`]
//!   back to back, up to three times, stopping early once neither pass
//!   changes the tree. Propagation turns variables with known constant
//!   values into literals (enabling more folding); elimination drops dead
//!   stores, constant branches, loops that never run, unreachable tails,
//!   unreferenced variables, and uncalled procedures.
//!
//! The optimizer assumes the tree is already validated and annotated by
//! the type checker; it has no failure mode of its own. Its only output
//! besides the rewritten tree is a once-per-compilation warning (through
//! [`log`]) when a variable is read before any assignment.
//!
//! # Module Structure
//!
//! - `fold` - constant folding
//! - `propagate` - constant propagation
//! - `eliminate` - dead-code elimination
//! - `tests` - unit tests (test-only)

mod eliminate;
mod fold;
mod propagate;


pub use eliminate::DeadCodeEliminator;
pub use fold::ConstantFolder;
pub use propagate::ConstantPropagator;

use crate::ast::Program;

/// The most rounds the level-2 pipeline runs before settling.
///
/// Each round is one propagate + eliminate pair; the combination reaches a
/// fixed point within three in practice, and the cap bounds the cost
/// either way.
const MAX_ROUNDS: usize = 3;

/// Optimizes a program in place at the given level.
///
/// Level 0 is the identity; unknown levels clamp to 2.
pub fn optimize_tree(program: &mut Program, level: u8) {
    match level {
        0 => {}
        1 => {
            ConstantFolder::new().walk(program);
        }
        _ => {
            for round in 0..MAX_ROUNDS {
                let mut propagator = ConstantPropagator::new(round == 0);
                propagator.walk(program);

                let mut eliminator = DeadCodeEliminator::new();
                eliminator.walk(program);

                if !propagator.modified && !eliminator.modified {
                    break;
                }
            }
        }
    }
}
