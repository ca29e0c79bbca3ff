//! Memory addressing for named storage.
//!
//! Three addressing forms reach everything a name can refer to:
//! absolute slots for top-level variables, frame-relative slots for
//! procedure locals and value parameters, and one level of indirection
//! for reference parameters, whose frame slot holds the address of the
//! caller's storage. `out` parameters and arrays are passed by
//! reference; scalar `in` parameters by value.

/// Where a name lives in `MM[]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Location {
    /// A top-level variable at an absolute offset.
    ///
    /// The program body runs with `FP == SP == 0`, so its frame offsets
    /// are absolute addresses, which is also what lets procedures address
    /// the globals directly.
    Global(usize),
    /// A procedure local at `FP + k`.
    Local(usize),
    /// A by-value parameter: the value sits in the frame slot at
    /// `FP - k`.
    Param(usize),
    /// A by-reference parameter: the frame slot at `FP - k` holds the
    /// address of the caller's storage.
    ParamRef(usize),
}

impl Location {
    /// The C expression for this location's address in `MM[]`.
    pub(super) fn address(&self) -> String {
        match self {
            Location::Global(offset) => offset.to_string(),
            Location::Local(offset) => format!("FP + {}", offset),
            Location::Param(offset) => format!("FP - {}", offset),
            Location::ParamRef(offset) => format!("MM[FP - {}]", offset),
        }
    }

    /// The C lvalue holding this location's value.
    pub(super) fn value(&self) -> String {
        format!("MM[{}]", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_addressing() {
        assert_eq!(Location::Global(5).address(), "5");
        assert_eq!(Location::Global(5).value(), "MM[5]");
    }

    #[test]
    fn test_local_addressing() {
        assert_eq!(Location::Local(2).address(), "FP + 2");
        assert_eq!(Location::Local(2).value(), "MM[FP + 2]");
    }

    #[test]
    fn test_value_param_holds_value() {
        assert_eq!(Location::Param(2).value(), "MM[FP - 2]");
    }

    #[test]
    fn test_reference_param_holds_address() {
        // One extra indirection: the slot holds an address.
        assert_eq!(Location::ParamRef(2).address(), "MM[FP - 2]");
        assert_eq!(Location::ParamRef(2).value(), "MM[MM[FP - 2]]");
    }
}
