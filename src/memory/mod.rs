//! Execution substrate: typed, persistent memory banks and the facade
//! built over them (spec.md §3, §4.2, §4.3).

pub mod bank;
pub mod facade;
pub mod kidoku;
pub mod location;

pub use bank::{Bank, BankSnapshot, Run};
pub use facade::{GlobalMemory, LocalMemory, MemoryFacade, StackFrame};
pub use kidoku::{KidokuBitset, KidokuMap};
pub use location::{IntBank, IntLoc, StrBank, StrLoc};
