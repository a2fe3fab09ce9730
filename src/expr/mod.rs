//! Expression trees: value/reference expressions with constant folding,
//! binary/unary operators, memory-ref assignment, and evaluation
//! (spec.md §3 "Expression tree", §4.4).

pub mod eval;
pub mod ops;

use crate::memory::{IntBank, StrBank};

/// Either an integer or string script value (spec.md §3 "Value kinds").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 32-bit integer.
    Int(i32),
    /// Byte string (UTF-8 preferred after decode).
    Str(String),
}

impl Value {
    /// View as an integer, if this is one.
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    /// View as a string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v.as_str()),
            Self::Int(_) => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A memory bank reference, tagged by which storage family it addresses.
/// Stands in for the spec's opaque `bank_code`: expressions are typed at
/// construction time, so there is never an ambiguous raw code to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankRef {
    /// Integer bank, addressed at full 32-bit width.
    Int(IntBank),
    /// String bank.
    Str(StrBank),
}

/// Tagged expression tree node (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Placeholder for "the value most recently pushed to the expression
    /// evaluator's implicit register" (used by some compact opcodes).
    StoreRegister,
    /// Integer literal.
    IntConstant(i32),
    /// String literal.
    StringConstant(Vec<u8>),
    /// `bank[index_expr]`, where the index is itself an expression.
    MemoryReference(BankRef, Box<Expr>),
    /// `bank[literal_index]`, a memory reference with a constant index.
    SimpleMemRef(BankRef, i32),
    /// `lhs <op> rhs`.
    Binary(u8, Box<Expr>, Box<Expr>),
    /// `<op> child`.
    Unary(u8, Box<Expr>),
    /// `bank[index] = value`, a memory reference being assigned a constant
    /// simple assignment (produced by constant-folding `Binary(30, ...)`).
    SimpleAssign(BankRef, i32, Box<Expr>),
    /// An ordered sequence, used for variadic arguments.
    Complex(Vec<Expr>),
    /// An opaque, dialect-specific tagged group (e.g. Siglus special forms).
    Special(i32, Vec<Expr>),
}

impl Expr {
    /// Build a binary expression, applying spec.md's constant-folding
    /// rules at construction time: `Binary(op, IntConstant, IntConstant)`
    /// folds to `IntConstant` for pure ops, and `Binary(30, SimpleMemRef,
    /// IntConstant)` folds to `SimpleAssign`.
    pub fn binary(op: u8, lhs: Expr, rhs: Expr) -> Expr {
        if let (Expr::IntConstant(a), Expr::IntConstant(b)) = (&lhs, &rhs) {
            if ops::is_pure_arithmetic(op) || ops::is_comparison(op) || ops::is_logical(op) {
                if let Ok(folded) = ops::apply_pure(op, *a, *b) {
                    return Expr::IntConstant(folded);
                }
            }
        }
        if op == ops::OP_ASSIGN {
            if let Expr::SimpleMemRef(bank, index) = lhs {
                return Expr::SimpleAssign(bank, index, Box::new(rhs));
            }
            return Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Build a unary expression (no constant folding specified beyond
    /// binary ops in spec.md, so this is a plain constructor).
    pub fn unary(op: u8, child: Expr) -> Expr {
        Expr::Unary(op, Box::new(child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_pure_arithmetic() {
        let e = Expr::binary(0, Expr::IntConstant(3), Expr::IntConstant(4));
        assert_eq!(e, Expr::IntConstant(7));
    }

    #[test]
    fn folds_simple_assign() {
        let lhs = Expr::SimpleMemRef(BankRef::Int(IntBank::A), 0);
        let e = Expr::binary(ops::OP_ASSIGN, lhs, Expr::IntConstant(5));
        assert!(matches!(e, Expr::SimpleAssign(BankRef::Int(IntBank::A), 0, _)));
    }

    #[test]
    fn leaves_non_constant_binary_alone() {
        let lhs = Expr::SimpleMemRef(BankRef::Int(IntBank::A), 0);
        let e = Expr::binary(0, lhs.clone(), Expr::IntConstant(4));
        assert_eq!(e, Expr::Binary(0, Box::new(lhs), Box::new(Expr::IntConstant(4))));
    }
}
