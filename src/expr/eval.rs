//! Expression evaluation, serialization, and reference-iteration helpers
//! (spec.md §4.4).

use crate::error::{Result, RlvmError};
use crate::expr::ops::{self, apply_pure, apply_unary};
use crate::expr::{BankRef, Expr, Value};
use crate::memory::{IntLoc, MemoryFacade, StrLoc};

/// Mutable evaluation state threaded through a single expression tree:
/// just the implicit "store register" that `Expr::StoreRegister` reads
/// and every evaluated node writes through.
#[derive(Debug, Default)]
pub struct EvalContext {
    store_register: i32,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn store_register(&self) -> i32 {
        self.store_register
    }
}

fn int_loc(bank: BankRef, index: i32) -> Result<IntLoc> {
    match bank {
        BankRef::Int(b) => IntLoc::new(b, index.max(0) as u64, 32),
        BankRef::Str(_) => Err(RlvmError::InvalidMemoryReference(
            "expected an integer bank reference".into(),
        )),
    }
}

fn str_loc(bank: BankRef, index: i32) -> Result<StrLoc> {
    match bank {
        BankRef::Str(b) => Ok(StrLoc { bank: b, index: index.max(0) as u64 }),
        BankRef::Int(_) => Err(RlvmError::InvalidMemoryReference(
            "expected a string bank reference".into(),
        )),
    }
}

fn require_int(value: Value) -> Result<i32> {
    value
        .as_int()
        .ok_or_else(|| RlvmError::InvalidMemoryReference("expected an integer value".into()))
}

/// Evaluate an expression tree against live memory, threading the
/// implicit store register through nested evaluation.
pub fn evaluate(expr: &Expr, mem: &mut MemoryFacade, ctx: &mut EvalContext) -> Result<Value> {
    let value = match expr {
        Expr::StoreRegister => Value::Int(ctx.store_register),
        Expr::IntConstant(v) => Value::Int(*v),
        Expr::StringConstant(bytes) => Value::Str(String::from_utf8_lossy(bytes).into_owned()),
        Expr::MemoryReference(bank, index_expr) => {
            let index = require_int(evaluate(index_expr, mem, ctx)?)?;
            read_reference(*bank, index, mem)?
        }
        Expr::SimpleMemRef(bank, index) => read_reference(*bank, *index, mem)?,
        Expr::Binary(op, lhs, rhs) => {
            if ops::is_assignment(*op) {
                evaluate_assignment(*op, lhs, rhs, mem, ctx)?
            } else {
                let a = require_int(evaluate(lhs, mem, ctx)?)?;
                let b = require_int(evaluate(rhs, mem, ctx)?)?;
                Value::Int(apply_pure(*op, a, b)?)
            }
        }
        Expr::Unary(op, child) => {
            let v = require_int(evaluate(child, mem, ctx)?)?;
            Value::Int(apply_unary(*op, v))
        }
        Expr::SimpleAssign(bank, index, rhs) => {
            let value = require_int(evaluate(rhs, mem, ctx)?)?;
            write_reference(*bank, *index, value, mem)?;
            Value::Int(value)
        }
        Expr::Complex(items) => {
            let mut last = Value::Int(0);
            for item in items {
                last = evaluate(item, mem, ctx)?;
            }
            last
        }
        Expr::Special(_, items) => {
            let mut last = Value::Int(0);
            for item in items {
                last = evaluate(item, mem, ctx)?;
            }
            last
        }
    };
    if let Value::Int(v) = &value {
        ctx.store_register = *v;
    }
    Ok(value)
}

fn read_reference(bank: BankRef, index: i32, mem: &MemoryFacade) -> Result<Value> {
    match bank {
        BankRef::Int(_) => Ok(Value::Int(mem.read_int(int_loc(bank, index)?)?)),
        BankRef::Str(_) => Ok(Value::Str(mem.read_str(str_loc(bank, index)?)?)),
    }
}

fn write_reference(bank: BankRef, index: i32, value: i32, mem: &mut MemoryFacade) -> Result<()> {
    mem.write_int(int_loc(bank, index)?, value)
}

fn evaluate_assignment(
    op: u8,
    lhs: &Expr,
    rhs: &Expr,
    mem: &mut MemoryFacade,
    ctx: &mut EvalContext,
) -> Result<Value> {
    let (bank, index) = match lhs {
        Expr::MemoryReference(bank, index_expr) => {
            (*bank, require_int(evaluate(index_expr, mem, ctx)?)?)
        }
        Expr::SimpleMemRef(bank, index) => (*bank, *index),
        _ => {
            return Err(RlvmError::InvalidMemoryReference(
                "assignment target must be a memory reference".into(),
            ))
        }
    };
    let rhs_value = require_int(evaluate(rhs, mem, ctx)?)?;
    let new_value = match ops::underlying_op(op) {
        None => rhs_value,
        Some(plain) => {
            let current = require_int(read_reference(bank, index, mem)?)?;
            apply_pure(plain, current, rhs_value)?
        }
    };
    write_reference(bank, index, new_value, mem)?;
    Ok(Value::Int(new_value))
}

/// Serialize an expression tree to its compact tagged wire form.
pub fn serialize(expr: &Expr) -> Vec<u8> {
    let mut out = Vec::new();
    serialize_into(expr, &mut out);
    out
}

fn serialize_bank(bank: BankRef, out: &mut Vec<u8>) {
    match bank {
        BankRef::Int(b) => {
            out.push(0);
            out.push(b as u8);
        }
        BankRef::Str(b) => {
            out.push(1);
            out.push(b as u8);
        }
    }
}

fn serialize_into(expr: &Expr, out: &mut Vec<u8>) {
    match expr {
        Expr::StoreRegister => out.push(0x00),
        Expr::IntConstant(v) => {
            out.push(0x01);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Expr::StringConstant(bytes) => {
            out.push(0x02);
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        Expr::MemoryReference(bank, index_expr) => {
            out.push(0x03);
            serialize_bank(*bank, out);
            serialize_into(index_expr, out);
        }
        Expr::SimpleMemRef(bank, index) => {
            out.push(0x04);
            serialize_bank(*bank, out);
            out.extend_from_slice(&index.to_le_bytes());
        }
        Expr::Binary(op, lhs, rhs) => {
            out.push(0x05);
            out.push(*op);
            serialize_into(lhs, out);
            serialize_into(rhs, out);
        }
        Expr::Unary(op, child) => {
            out.push(0x06);
            out.push(*op);
            serialize_into(child, out);
        }
        Expr::SimpleAssign(bank, index, rhs) => {
            out.push(0x07);
            serialize_bank(*bank, out);
            out.extend_from_slice(&index.to_le_bytes());
            serialize_into(rhs, out);
        }
        Expr::Complex(items) => {
            out.push(0x08);
            out.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                serialize_into(item, out);
            }
        }
        Expr::Special(tag, items) => {
            out.push(0x09);
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&(items.len() as u32).to_le_bytes());
            for item in items {
                serialize_into(item, out);
            }
        }
    }
}

/// Iterate the literal integer-bank references within a `Complex` group,
/// in order, as used by multi-cell `setarray`-style argument lists.
pub fn integer_reference_iterator(expr: &Expr) -> impl Iterator<Item = IntLoc> + '_ {
    flatten(expr).into_iter().filter_map(|e| match e {
        Expr::SimpleMemRef(BankRef::Int(b), index) => IntLoc::new(*b, (*index).max(0) as u64, 32).ok(),
        _ => None,
    })
}

/// Iterate the literal string-bank references within a `Complex` group.
pub fn string_reference_iterator(expr: &Expr) -> impl Iterator<Item = StrLoc> + '_ {
    flatten(expr).into_iter().filter_map(|e| match e {
        Expr::SimpleMemRef(BankRef::Str(b), index) => Some(StrLoc { bank: *b, index: (*index).max(0) as u64 }),
        _ => None,
    })
}

fn flatten(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::Complex(items) => items.iter().collect(),
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BankRef;
    use crate::memory::IntBank;

    #[test]
    fn constants_round_trip() {
        let mut mem = MemoryFacade::new();
        let mut ctx = EvalContext::new();
        assert_eq!(evaluate(&Expr::IntConstant(5), &mut mem, &mut ctx).unwrap(), Value::Int(5));
    }

    #[test]
    fn store_register_tracks_last_int() {
        let mut mem = MemoryFacade::new();
        let mut ctx = EvalContext::new();
        evaluate(&Expr::IntConstant(42), &mut mem, &mut ctx).unwrap();
        assert_eq!(ctx.store_register(), 42);
        assert_eq!(evaluate(&Expr::StoreRegister, &mut mem, &mut ctx).unwrap(), Value::Int(42));
    }

    #[test]
    fn simple_assign_writes_through() {
        let mut mem = MemoryFacade::new();
        let mut ctx = EvalContext::new();
        let expr = Expr::SimpleAssign(BankRef::Int(IntBank::A), 3, Box::new(Expr::IntConstant(9)));
        evaluate(&expr, &mut mem, &mut ctx).unwrap();
        assert_eq!(
            mem.read_int(IntLoc::new(IntBank::A, 3, 32).unwrap()).unwrap(),
            9
        );
    }

    #[test]
    fn compound_assign_reads_current_value() {
        let mut mem = MemoryFacade::new();
        let mut ctx = EvalContext::new();
        mem.write_int(IntLoc::new(IntBank::A, 0, 32).unwrap(), 10).unwrap();
        let lhs = Expr::SimpleMemRef(BankRef::Int(IntBank::A), 0);
        let expr = Expr::Binary(ops::OP_ADD_ASSIGN, Box::new(lhs), Box::new(Expr::IntConstant(5)));
        let result = evaluate(&expr, &mut mem, &mut ctx).unwrap();
        assert_eq!(result, Value::Int(15));
        assert_eq!(mem.read_int(IntLoc::new(IntBank::A, 0, 32).unwrap()).unwrap(), 15);
    }

    #[test]
    fn reference_iterators_filter_by_kind() {
        let group = Expr::Complex(vec![
            Expr::SimpleMemRef(BankRef::Int(IntBank::A), 0),
            Expr::SimpleMemRef(BankRef::Int(IntBank::A), 1),
            Expr::IntConstant(3),
        ]);
        let locs: Vec<_> = integer_reference_iterator(&group).collect();
        assert_eq!(locs.len(), 2);
    }

    #[test]
    fn serialize_is_deterministic() {
        let expr = Expr::Binary(ops::OP_ADD, Box::new(Expr::IntConstant(1)), Box::new(Expr::IntConstant(2)));
        assert_eq!(serialize(&expr), serialize(&expr));
    }
}
