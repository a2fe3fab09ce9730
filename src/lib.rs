#![allow(clippy::wrong_self_convention)]

pub mod archive;
pub mod clock;
pub mod consts;
pub mod effect;
pub mod error;
pub mod expr;
pub mod fileindex;
pub mod gameexe;
pub mod graphics;
pub mod instruction;
pub mod lzss;
pub mod memory;
pub mod paramstore;
pub mod reader;
pub mod scene;

pub mod prelude {
    pub use crate::archive::reallive::{self, Archive as RealLiveArchive, Header, ParsedScene, TitleKey, TitleKeyResolver, XorRange};
    pub use crate::archive::siglus::{self, Archive as SiglusArchive, PackHeader, XorKey};
    pub use crate::clock::{Clock, Stopwatch};
    pub use crate::effect::{Composer, Direction, DrawInstruction, Progress, Rect, Rotator, Size, Strategy};
    pub use crate::error::{Result, RlvmError};
    pub use crate::expr::eval::{evaluate, serialize, EvalContext};
    pub use crate::expr::{BankRef, Expr, Value};
    pub use crate::fileindex::{FileIndex, IndexedFile};
    pub use crate::gameexe::Gameexe;
    pub use crate::graphics::{GraphicsObject, Mutator, MutatorList, ParamValue, PropertyId};
    pub use crate::instruction::{CommandOp, Instruction, InstructionKind, MetaKind};
    pub use crate::memory::{GlobalMemory, IntLoc, LocalMemory, MemoryFacade, StackFrame, StrLoc};
    pub use crate::paramstore::{ParamKey, ParamStore};
    pub use crate::scene::Scene;
}
