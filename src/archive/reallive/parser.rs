//! Bytecode walker: turns a decompressed scene's byte stream into an
//! ordered `(offset → element)` map plus an `entrypoint → offset` map
//! (spec.md §4.5 "Parser").
//!
//! The original engine's tag-byte dispatch table is reverse-engineered
//! compiler output and isn't reproduced here; this walker uses its own
//! compact, self-consistent tag scheme occupying the same architectural
//! role — one opcode byte selects the element kind, each element reports
//! its own length, and the walker advances by that length (falling back
//! to 1 on a zero or malformed length so no scene can wedge the
//! scheduler; spec.md §7).

use std::collections::{BTreeMap, HashMap};

use crate::expr::Expr;
use crate::instruction::{CommandOp, Instruction, InstructionKind, MetaKind};
use crate::reader::ByteReader;

const TAG_GOTO: u8 = 0x21;
const TAG_GOTO_CASE: u8 = 0x40;
const TAG_COMMAND: u8 = 0x23;
const TAG_EXPRESSION: u8 = 0x24;
const TAG_GOTO_ON: u8 = 0x25;
const TAG_GOSUB_WITH: u8 = 0x26;
const TAG_FUNCTION: u8 = 0x27;
const TAG_POINTER: u8 = 0x28;
const TAG_SELECT: u8 = 0x29;
const TAG_COMMA: u8 = 0x2c;
const TAG_META: u8 = 0x2e;
const TEXT_TERMINATOR: u8 = 0x00;

/// Walk `bytecode` start to finish, producing the offset-keyed element
/// map and the entrypoint map.
pub fn parse_bytecode(bytecode: &[u8]) -> (BTreeMap<u32, Instruction>, HashMap<i32, u32>) {
    let mut elements = BTreeMap::new();
    let mut entrypoints = HashMap::new();
    let mut pos: u32 = 0;
    let len = bytecode.len() as u32;

    while pos < len {
        let inst = parse_one(bytecode, pos);
        if let Some(id) = inst.entrypoint_id() {
            entrypoints.insert(id, pos);
        }
        let advance = inst.bytecode_length();
        elements.insert(pos, inst);
        pos += advance;
    }
    (elements, entrypoints)
}

fn parse_one(data: &[u8], offset: u32) -> Instruction {
    let rest = &data[offset as usize..];
    let mut r = ByteReader::new(rest);
    let tag = r.pop_u8();

    match tag {
        TAG_GOTO if r.remaining() >= 4 => {
            let target = r.pop_u32();
            Instruction::new(offset, InstructionKind::Goto(target), 5)
        }
        TAG_GOTO_CASE if r.remaining() >= 1 => {
            let n = r.pop_u8() as usize;
            let mut cases = Vec::with_capacity(n);
            let mut ok = true;
            for _ in 0..n {
                if r.remaining() < 8 {
                    ok = false;
                    break;
                }
                let value = r.pop_i32();
                let target = r.pop_u32();
                cases.push((Expr::IntConstant(value), target));
            }
            if ok && r.remaining() >= 5 {
                let has_default = r.pop_u8() != 0;
                let default = if has_default { Some(r.pop_u32()) } else { None };
                let length = 2 + 8 * n as u32 + 1 + if has_default { 4 } else { 0 };
                Instruction::new(offset, InstructionKind::GotoCase(cases, default), length)
            } else {
                text_fallback(rest, offset)
            }
        }
        TAG_COMMAND if r.remaining() >= 5 => {
            let module = r.pop_u8();
            let code = r.pop_u16();
            let overload = r.pop_u8();
            let argc = r.pop_u8() as usize;
            if r.remaining() < argc * 4 {
                return text_fallback(rest, offset);
            }
            let args = (0..argc).map(|_| Expr::IntConstant(r.pop_i32())).collect();
            let length = 6 + 4 * argc as u32;
            Instruction::new(offset, InstructionKind::Command(CommandOp { module, code, overload }, args), length)
        }
        TAG_EXPRESSION if r.remaining() >= 4 => {
            let value = r.pop_i32();
            Instruction::new(offset, InstructionKind::Expression(Expr::IntConstant(value)), 5)
        }
        TAG_GOTO_ON if r.remaining() >= 5 => {
            let selector = r.pop_i32();
            let n = r.pop_u8() as usize;
            if r.remaining() < n * 4 {
                return text_fallback(rest, offset);
            }
            let targets = (0..n).map(|_| r.pop_u32()).collect();
            let length = 6 + 4 * n as u32;
            Instruction::new(offset, InstructionKind::GotoOn(Expr::IntConstant(selector), targets), length)
        }
        TAG_GOSUB_WITH if r.remaining() >= 5 => {
            let target = r.pop_u32();
            let argc = r.pop_u8() as usize;
            if r.remaining() < argc * 4 {
                return text_fallback(rest, offset);
            }
            let args = (0..argc).map(|_| Expr::IntConstant(r.pop_i32())).collect();
            let length = 6 + 4 * argc as u32;
            Instruction::new(offset, InstructionKind::GosubWith(target, args), length)
        }
        TAG_FUNCTION if r.remaining() >= 5 => {
            let id = r.pop_i32();
            let argc = r.pop_u8() as usize;
            if r.remaining() < argc * 4 {
                return text_fallback(rest, offset);
            }
            let args = (0..argc).map(|_| Expr::IntConstant(r.pop_i32())).collect();
            let length = 6 + 4 * argc as u32;
            Instruction::new(offset, InstructionKind::Function(id, args), length)
        }
        TAG_POINTER if r.remaining() >= 4 => {
            let id = r.pop_i32();
            Instruction::new(offset, InstructionKind::Pointer(id), 5)
        }
        TAG_SELECT if r.remaining() >= 1 => {
            let n = r.pop_u8() as usize;
            if r.remaining() < n * 4 {
                return text_fallback(rest, offset);
            }
            let options = (0..n).map(|_| Expr::IntConstant(r.pop_i32())).collect();
            let length = 2 + 4 * n as u32;
            Instruction::new(offset, InstructionKind::Select(options), length)
        }
        TAG_COMMA => Instruction::new(offset, InstructionKind::Comma, 1),
        TAG_META if r.remaining() >= 5 => {
            let sub = r.pop_u8();
            let value = r.pop_u32();
            let kind = match sub {
                0 => MetaKind::Line(value),
                1 => MetaKind::Kidoku(value),
                _ => MetaKind::SourceLine(value),
            };
            Instruction::new(offset, InstructionKind::Meta(kind), 6)
        }
        _ => text_fallback(rest, offset),
    }
}

fn text_fallback(rest: &[u8], offset: u32) -> Instruction {
    match rest.iter().position(|&b| b == TEXT_TERMINATOR) {
        Some(end) => {
            let text = String::from_utf8_lossy(&rest[..end]).into_owned();
            Instruction::new(offset, InstructionKind::Text(text), (end + 1) as u32)
        }
        None => {
            let text = String::from_utf8_lossy(rest).into_owned();
            Instruction::new(offset, InstructionKind::Text(text), rest.len().max(1) as u32)
        }
    }
}
