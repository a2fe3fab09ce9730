//! Binary/unary operator codes and their pure evaluation rules
//! (spec.md §4.4).

use crate::error::{Result, RlvmError};

pub const OP_ADD: u8 = 0;
pub const OP_SUB: u8 = 1;
pub const OP_MUL: u8 = 2;
pub const OP_DIV: u8 = 3;
pub const OP_MOD: u8 = 4;
pub const OP_AND: u8 = 5;
pub const OP_OR: u8 = 6;
pub const OP_XOR: u8 = 7;
pub const OP_SHL: u8 = 8;
pub const OP_SHR: u8 = 9;

pub const OP_ADD_ASSIGN: u8 = 20;
pub const OP_SUB_ASSIGN: u8 = 21;
pub const OP_MUL_ASSIGN: u8 = 22;
pub const OP_DIV_ASSIGN: u8 = 23;
pub const OP_MOD_ASSIGN: u8 = 24;
pub const OP_AND_ASSIGN: u8 = 25;
pub const OP_OR_ASSIGN: u8 = 26;
pub const OP_XOR_ASSIGN: u8 = 27;
pub const OP_SHL_ASSIGN: u8 = 28;
pub const OP_SHR_ASSIGN: u8 = 29;

pub const OP_ASSIGN: u8 = 30;

pub const OP_EQ: u8 = 40;
pub const OP_NE: u8 = 41;
pub const OP_LE: u8 = 42;
pub const OP_LT: u8 = 43;
pub const OP_GE: u8 = 44;
pub const OP_GT: u8 = 45;

pub const OP_LOGICAL_AND: u8 = 60;
pub const OP_LOGICAL_OR: u8 = 61;

/// Arithmetic negation; the only unary op the bytecode defines. Any other
/// unary code is a no-op passthrough, matching the original engine.
pub const OP_NEG: u8 = 0x01;

/// `true` for the arithmetic/bitwise family (0-9).
pub const fn is_pure_arithmetic(op: u8) -> bool {
    matches!(op, OP_ADD..=OP_SHR)
}

/// `true` for the comparison family (40-45).
pub const fn is_comparison(op: u8) -> bool {
    matches!(op, OP_EQ..=OP_GT)
}

/// `true` for the logical family (60-61). The evaluator still computes
/// both sides eagerly; RealLive/Siglus bytecode has no short-circuiting.
pub const fn is_logical(op: u8) -> bool {
    matches!(op, OP_LOGICAL_AND | OP_LOGICAL_OR)
}

/// `true` for the compound-assignment family (20-29) or plain assign (30).
pub const fn is_assignment(op: u8) -> bool {
    matches!(op, OP_ADD_ASSIGN..=OP_ASSIGN)
}

/// The plain binary op underlying a compound assignment, e.g.
/// `OP_ADD_ASSIGN -> OP_ADD`. `OP_ASSIGN` has no underlying op.
pub const fn underlying_op(op: u8) -> Option<u8> {
    if op == OP_ASSIGN {
        return None;
    }
    if matches!(op, OP_ADD_ASSIGN..=OP_SHR_ASSIGN) {
        Some(op - (OP_ADD_ASSIGN - OP_ADD))
    } else {
        None
    }
}

/// Apply a pure (non-assigning) binary operator to two integers.
///
/// Division and modulo by zero return `lhs` unchanged rather than
/// erroring, per the op-code table's explicit carve-out.
pub fn apply_pure(op: u8, lhs: i32, rhs: i32) -> Result<i32> {
    Ok(match op {
        OP_ADD => lhs.wrapping_add(rhs),
        OP_SUB => lhs.wrapping_sub(rhs),
        OP_MUL => lhs.wrapping_mul(rhs),
        OP_DIV => {
            if rhs == 0 {
                lhs
            } else {
                lhs.wrapping_div(rhs)
            }
        }
        OP_MOD => {
            if rhs == 0 {
                lhs
            } else {
                lhs.wrapping_rem(rhs)
            }
        }
        OP_AND => lhs & rhs,
        OP_OR => lhs | rhs,
        OP_XOR => lhs ^ rhs,
        OP_SHL => lhs.wrapping_shl(rhs.rem_euclid(32) as u32),
        OP_SHR => lhs.wrapping_shr(rhs.rem_euclid(32) as u32),
        OP_EQ => (lhs == rhs) as i32,
        OP_NE => (lhs != rhs) as i32,
        OP_LE => (lhs <= rhs) as i32,
        OP_LT => (lhs < rhs) as i32,
        OP_GE => (lhs >= rhs) as i32,
        OP_GT => (lhs > rhs) as i32,
        OP_LOGICAL_AND => ((lhs != 0) && (rhs != 0)) as i32,
        OP_LOGICAL_OR => ((lhs != 0) || (rhs != 0)) as i32,
        _ => return Err(RlvmError::InvalidOperator(op as i32)),
    })
}

/// Apply a unary operator. Only `OP_NEG` has an effect; any other code
/// passes its operand through unchanged, matching the original engine's
/// `default: break;` fallthrough.
pub fn apply_unary(op: u8, value: i32) -> i32 {
    match op {
        OP_NEG => value.wrapping_neg(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_by_zero_returns_lhs() {
        assert_eq!(apply_pure(OP_DIV, 7, 0).unwrap(), 7);
        assert_eq!(apply_pure(OP_MOD, 9, 0).unwrap(), 9);
    }

    #[test]
    fn comparisons_return_bool_as_int() {
        assert_eq!(apply_pure(OP_LT, 1, 2).unwrap(), 1);
        assert_eq!(apply_pure(OP_LT, 2, 1).unwrap(), 0);
    }

    #[test]
    fn unknown_operator_errors() {
        assert!(matches!(apply_pure(99, 1, 1), Err(RlvmError::InvalidOperator(99))));
    }

    #[test]
    fn underlying_op_recovers_plain_arithmetic() {
        assert_eq!(underlying_op(OP_ADD_ASSIGN), Some(OP_ADD));
        assert_eq!(underlying_op(OP_SHR_ASSIGN), Some(OP_SHR));
        assert_eq!(underlying_op(OP_ASSIGN), None);
    }

    #[test]
    fn unrecognised_unary_passes_through() {
        assert_eq!(apply_unary(OP_NEG, 5), -5);
        assert_eq!(apply_unary(0x02, 5), 5);
    }
}
