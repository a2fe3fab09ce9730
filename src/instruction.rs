//! Uniform instruction element shape after parsing (spec.md §3
//! "Instructions (after parse)").

use crate::expr::Expr;

/// `op<mod:cmd, ovl>` — a dispatchable command opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOp {
    pub module: u8,
    pub code: u16,
    pub overload: u8,
}

/// The payload of a `Meta` element: a line marker, a kidoku marker, or a
/// source-line marker (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    Line(u32),
    Kidoku(u32),
    SourceLine(u32),
}

/// The kind-specific payload of an instruction element.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    Text(String),
    Expression(Expr),
    Command(CommandOp, Vec<Expr>),
    Select(Vec<Expr>),
    Goto(u32),
    GotoCase(Vec<(Expr, u32)>, Option<u32>),
    GotoOn(Expr, Vec<u32>),
    GosubWith(u32, Vec<Expr>),
    Function(i32, Vec<Expr>),
    Pointer(i32),
    Meta(MetaKind),
    Comma,
}

/// A single parsed bytecode element, addressed by its byte offset within
/// a scene's bytecode blob.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub offset: u32,
    pub kind: InstructionKind,
    length: u32,
}

impl Instruction {
    pub fn new(offset: u32, kind: InstructionKind, length: u32) -> Self {
        Self { offset, kind, length }
    }

    /// Byte length of this element in the bytecode stream. A declared
    /// length of zero is coerced to one, so a malformed scene can never
    /// wedge the scheduler (spec.md §7).
    pub fn bytecode_length(&self) -> u32 {
        self.length.max(1)
    }

    /// The entrypoint id this element declares, if any (`Pointer` and
    /// `Function` elements feed the `entrypoint → offset` map).
    pub fn entrypoint_id(&self) -> Option<i32> {
        match &self.kind {
            InstructionKind::Pointer(id) | InstructionKind::Function(id, _) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_coerces_to_one() {
        let inst = Instruction::new(0, InstructionKind::Comma, 0);
        assert_eq!(inst.bytecode_length(), 1);
    }

    #[test]
    fn entrypoint_id_only_on_pointer_and_function() {
        assert_eq!(Instruction::new(0, InstructionKind::Pointer(7), 4).entrypoint_id(), Some(7));
        assert_eq!(
            Instruction::new(0, InstructionKind::Function(3, vec![]), 4).entrypoint_id(),
            Some(3)
        );
        assert_eq!(Instruction::new(0, InstructionKind::Comma, 1).entrypoint_id(), None);
    }
}
