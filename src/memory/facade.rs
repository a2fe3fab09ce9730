//! The typed view over memory banks: bit-width sub-addressing, kidoku
//! bitmap, and the global/local/stack partitioning (spec.md §4.3).

use crate::error::{Result, RlvmError};
use crate::memory::bank::Bank;
use crate::memory::kidoku::KidokuMap;
use crate::memory::location::{IntBank, IntLoc, StrBank, StrLoc};

/// Default size given to a freshly constructed bank. Scripts resize banks
/// as needed via [`MemoryFacade::resize_int`]/[`MemoryFacade::resize_str`].
const DEFAULT_BANK_SIZE: u64 = 2000;

/// Banks visible to every scenario: `G`, `Z` (integer), `M`, `global_name`
/// (string), plus the kidoku bitmap.
#[derive(Debug, Clone)]
pub struct GlobalMemory {
    pub(crate) g: Bank<i32>,
    pub(crate) z: Bank<i32>,
    pub(crate) m: Bank<String>,
    pub(crate) global_name: Bank<String>,
    pub(crate) kidoku: KidokuMap,
}

impl Default for GlobalMemory {
    fn default() -> Self {
        Self {
            g: Bank::new(DEFAULT_BANK_SIZE, 0),
            z: Bank::new(DEFAULT_BANK_SIZE, 0),
            m: Bank::new(DEFAULT_BANK_SIZE, String::new()),
            global_name: Bank::new(DEFAULT_BANK_SIZE, String::new()),
            kidoku: KidokuMap::new(),
        }
    }
}

/// Banks private to the current scenario: `A..F,X,H,I,J` (integer), `S`,
/// `local_name` (string).
#[derive(Debug, Clone)]
pub struct LocalMemory {
    pub(crate) a: Bank<i32>,
    pub(crate) b: Bank<i32>,
    pub(crate) c: Bank<i32>,
    pub(crate) d: Bank<i32>,
    pub(crate) e: Bank<i32>,
    pub(crate) f: Bank<i32>,
    pub(crate) x: Bank<i32>,
    pub(crate) h: Bank<i32>,
    pub(crate) i: Bank<i32>,
    pub(crate) j: Bank<i32>,
    pub(crate) s: Bank<String>,
    pub(crate) local_name: Bank<String>,
}

impl Default for LocalMemory {
    fn default() -> Self {
        Self {
            a: Bank::new(DEFAULT_BANK_SIZE, 0),
            b: Bank::new(DEFAULT_BANK_SIZE, 0),
            c: Bank::new(DEFAULT_BANK_SIZE, 0),
            d: Bank::new(DEFAULT_BANK_SIZE, 0),
            e: Bank::new(DEFAULT_BANK_SIZE, 0),
            f: Bank::new(DEFAULT_BANK_SIZE, 0),
            x: Bank::new(DEFAULT_BANK_SIZE, 0),
            h: Bank::new(DEFAULT_BANK_SIZE, 0),
            i: Bank::new(DEFAULT_BANK_SIZE, 0),
            j: Bank::new(DEFAULT_BANK_SIZE, 0),
            s: Bank::new(DEFAULT_BANK_SIZE, String::new()),
            local_name: Bank::new(DEFAULT_BANK_SIZE, String::new()),
        }
    }
}

/// One call-stack frame's private storage: `L` (integer), `K` (string).
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub(crate) l: Bank<i32>,
    pub(crate) k: Bank<String>,
}

impl Default for StackFrame {
    fn default() -> Self {
        Self {
            l: Bank::new(DEFAULT_BANK_SIZE, 0),
            k: Bank::new(DEFAULT_BANK_SIZE, String::new()),
        }
    }
}

/// The typed memory facade the machine drives instructions against.
#[derive(Debug, Clone, Default)]
pub struct MemoryFacade {
    global: GlobalMemory,
    local: LocalMemory,
    stack: Vec<StackFrame>,
}

impl MemoryFacade {
    /// Construct a facade with every bank at its default size.
    pub fn new() -> Self {
        Self::default()
    }

    fn int_bank(&self, bank: IntBank) -> Result<&Bank<i32>> {
        Ok(match bank {
            IntBank::A => &self.local.a,
            IntBank::B => &self.local.b,
            IntBank::C => &self.local.c,
            IntBank::D => &self.local.d,
            IntBank::E => &self.local.e,
            IntBank::F => &self.local.f,
            IntBank::X => &self.local.x,
            IntBank::H => &self.local.h,
            IntBank::I => &self.local.i,
            IntBank::J => &self.local.j,
            IntBank::G => &self.global.g,
            IntBank::Z => &self.global.z,
            IntBank::L => &self.stack.last().ok_or(RlvmError::StackEmpty)?.l,
        })
    }

    fn int_bank_mut(&mut self, bank: IntBank) -> Result<&mut Bank<i32>> {
        Ok(match bank {
            IntBank::A => &mut self.local.a,
            IntBank::B => &mut self.local.b,
            IntBank::C => &mut self.local.c,
            IntBank::D => &mut self.local.d,
            IntBank::E => &mut self.local.e,
            IntBank::F => &mut self.local.f,
            IntBank::X => &mut self.local.x,
            IntBank::H => &mut self.local.h,
            IntBank::I => &mut self.local.i,
            IntBank::J => &mut self.local.j,
            IntBank::G => &mut self.global.g,
            IntBank::Z => &mut self.global.z,
            IntBank::L => &mut self.stack.last_mut().ok_or(RlvmError::StackEmpty)?.l,
        })
    }

    fn str_bank(&self, bank: StrBank) -> Result<&Bank<String>> {
        Ok(match bank {
            StrBank::S => &self.local.s,
            StrBank::LocalName => &self.local.local_name,
            StrBank::M => &self.global.m,
            StrBank::GlobalName => &self.global.global_name,
            StrBank::K => &self.stack.last().ok_or(RlvmError::StackEmpty)?.k,
        })
    }

    fn str_bank_mut(&mut self, bank: StrBank) -> Result<&mut Bank<String>> {
        Ok(match bank {
            StrBank::S => &mut self.local.s,
            StrBank::LocalName => &mut self.local.local_name,
            StrBank::M => &mut self.global.m,
            StrBank::GlobalName => &mut self.global.global_name,
            StrBank::K => &mut self.stack.last_mut().ok_or(RlvmError::StackEmpty)?.k,
        })
    }

    /// Read an integer through a bit-width location.
    pub fn read_int(&self, loc: IntLoc) -> Result<i32> {
        let raw = self.int_bank(loc.bank)?.get(loc.cell())?;
        Ok(loc.extract(raw))
    }

    /// Write an integer through a bit-width location.
    pub fn write_int(&mut self, loc: IntLoc, value: i32) -> Result<()> {
        let cell = loc.cell();
        let bank = self.int_bank_mut(loc.bank)?;
        let raw = bank.get(cell)?;
        let updated = loc.insert(raw, value)?;
        bank.set(cell, updated)
    }

    /// Read a string cell.
    pub fn read_str(&self, loc: StrLoc) -> Result<String> {
        self.str_bank(loc.bank)?.get(loc.index)
    }

    /// Write a string cell.
    pub fn write_str(&mut self, loc: StrLoc, value: String) -> Result<()> {
        self.str_bank_mut(loc.bank)?.set(loc.index, value)
    }

    /// Range-fill an integer bank with whole-cell values (no bit-width
    /// sub-addressing applies to `fill`; spec.md §4.3).
    pub fn fill_int(&mut self, bank: IntBank, begin: u64, end: u64, value: i32) -> Result<()> {
        self.int_bank_mut(bank)?.fill(begin, end, value)
    }

    /// Range-fill a string bank.
    pub fn fill_str(&mut self, bank: StrBank, begin: u64, end: u64, value: String) -> Result<()> {
        self.str_bank_mut(bank)?.fill(begin, end, value)
    }

    /// Resize an integer bank.
    pub fn resize_int(&mut self, bank: IntBank, n: u64) -> Result<()> {
        self.int_bank_mut(bank)?.resize(n);
        Ok(())
    }

    /// Resize a string bank.
    pub fn resize_str(&mut self, bank: StrBank, n: u64) -> Result<()> {
        self.str_bank_mut(bank)?.resize(n);
        Ok(())
    }

    /// Push a fresh, empty call frame.
    pub fn push_frame(&mut self) {
        self.stack.push(StackFrame::default());
    }

    /// Pop the active call frame.
    pub fn pop_frame(&mut self) -> Result<()> {
        self.stack.pop().map(|_| ()).ok_or(RlvmError::StackEmpty)
    }

    /// `true` if `kidoku` has been marked read within `scene`.
    pub fn has_been_read(&self, scene: i32, kidoku: u32) -> bool {
        self.global.kidoku.has_been_read(scene, kidoku)
    }

    /// Mark `kidoku` as read within `scene`.
    pub fn record_kidoku(&mut self, scene: i32, kidoku: u32) {
        self.global.kidoku.record(scene, kidoku);
    }

    /// Independent structural copy of global memory (O(1), shared subtrees).
    pub fn global_memory(&self) -> GlobalMemory {
        self.global.clone()
    }

    /// Independent structural copy of local memory.
    pub fn local_memory(&self) -> LocalMemory {
        self.local.clone()
    }

    /// Independent structural copy of the whole call stack.
    pub fn stack_memory(&self) -> Vec<StackFrame> {
        self.stack.clone()
    }

    /// Swap global memory in from a previously taken snapshot.
    pub fn partial_reset_global(&mut self, snapshot: GlobalMemory) {
        self.global = snapshot;
    }

    /// Swap local memory in from a previously taken snapshot.
    pub fn partial_reset_local(&mut self, snapshot: LocalMemory) {
        self.local = snapshot;
    }

    /// Swap the call stack in from a previously taken snapshot.
    pub fn partial_reset_stack(&mut self, snapshot: Vec<StackFrame>) {
        self.stack = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fill_scenario() {
        let mut mem = MemoryFacade::new();
        mem.resize_int(IntBank::A, 6).unwrap();
        mem.fill_int(IntBank::A, 2, 5, 7).unwrap();
        let read = |mem: &MemoryFacade, i| mem.read_int(IntLoc::new(IntBank::A, i, 32).unwrap()).unwrap();
        assert_eq!(read(&mem, 3), 7);
        assert_eq!(read(&mem, 1), 0);
        assert_eq!(read(&mem, 5), 0);
    }

    #[test]
    fn stack_routes_to_top_frame() {
        let mut mem = MemoryFacade::new();
        assert!(matches!(
            mem.write_int(IntLoc::new(IntBank::L, 0, 32).unwrap(), 1),
            Err(RlvmError::StackEmpty)
        ));
        mem.push_frame();
        mem.write_int(IntLoc::new(IntBank::L, 0, 32).unwrap(), 42).unwrap();
        assert_eq!(mem.read_int(IntLoc::new(IntBank::L, 0, 32).unwrap()).unwrap(), 42);
        mem.pop_frame().unwrap();
        assert!(matches!(mem.pop_frame(), Err(RlvmError::StackEmpty)));
    }

    #[test]
    fn kidoku_scenario() {
        let mut mem = MemoryFacade::new();
        mem.record_kidoku(77, 12);
        assert!(mem.has_been_read(77, 12));
        assert!(!mem.has_been_read(77, 13));
    }

    #[test]
    fn partial_reset_restores_global_snapshot() {
        let mut mem = MemoryFacade::new();
        let snapshot = mem.global_memory();
        mem.write_int(IntLoc::new(IntBank::G, 0, 32).unwrap(), 9).unwrap();
        assert_eq!(mem.read_int(IntLoc::new(IntBank::G, 0, 32).unwrap()).unwrap(), 9);
        mem.partial_reset_global(snapshot);
        assert_eq!(mem.read_int(IntLoc::new(IntBank::G, 0, 32).unwrap()).unwrap(), 0);
    }
}
