//! Per-scenario "has been read" marker bitmap (spec.md §4.3).

use std::collections::HashMap;

/// A growable bitset, one per scenario, tracking which source lines have
/// been read. Grows on demand; writes are monotonic until explicitly reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KidokuBitset {
    words: Vec<u64>,
}

impl KidokuBitset {
    fn ensure(&mut self, bit: u32) {
        let word = (bit / 64) as usize;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
    }

    /// Mark `bit` as read.
    pub fn set(&mut self, bit: u32) {
        self.ensure(bit);
        self.words[(bit / 64) as usize] |= 1u64 << (bit % 64);
    }

    /// `true` if `bit` has been marked read.
    pub fn get(&self, bit: u32) -> bool {
        match self.words.get((bit / 64) as usize) {
            Some(w) => (w >> (bit % 64)) & 1 == 1,
            None => false,
        }
    }

    /// Number of bits this bitset currently spans (may undercount the
    /// logical range; reads past it are simply "not set").
    pub fn bit_count(&self) -> u32 {
        (self.words.len() as u32) * 64
    }

    /// Serialise to `(bit_count, words)`, matching the save form in
    /// spec.md §6.
    pub fn save(&self) -> (u32, Vec<u64>) {
        (self.bit_count(), self.words.clone())
    }

    /// Rebuild from a saved `(bit_count, words)` pair.
    pub fn load(bit_count: u32, words: Vec<u64>) -> Self {
        let mut out = Self { words };
        out.words.resize(((bit_count + 63) / 64) as usize, 0);
        out
    }
}

/// A `scene_id -> bitset` map of kidoku markers (spec.md §4.3).
#[derive(Debug, Clone, Default)]
pub struct KidokuMap {
    scenes: HashMap<i32, KidokuBitset>,
}

impl KidokuMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `kidoku` has been read within `scene`. Grows the
    /// scene's bitset on demand; never errors (spec.md §7).
    pub fn record(&mut self, scene: i32, kidoku: u32) {
        self.scenes.entry(scene).or_default().set(kidoku);
        tracing::trace!(scene, kidoku, "kidoku recorded");
    }

    /// `true` if `kidoku` has been read within `scene`.
    pub fn has_been_read(&self, scene: i32, kidoku: u32) -> bool {
        self.scenes.get(&scene).is_some_and(|b| b.get(kidoku))
    }

    /// Take an independent structural copy for save/restore hand-off.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Swap in a previously taken snapshot (spec.md `partial_reset`).
    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_read_scenario() {
        let mut map = KidokuMap::new();
        map.record(77, 12);
        assert!(map.has_been_read(77, 12));
        assert!(!map.has_been_read(77, 13));
    }

    #[test]
    fn monotonic_until_reset() {
        let mut map = KidokuMap::new();
        map.record(1, 0);
        let snapshot = map.snapshot();
        map.record(1, 1);
        assert!(map.has_been_read(1, 0) && map.has_been_read(1, 1));
        map.restore(snapshot);
        assert!(map.has_been_read(1, 0));
        assert!(!map.has_been_read(1, 1));
    }

    #[test]
    fn grows_on_demand() {
        let mut map = KidokuMap::new();
        map.record(0, 1000);
        assert!(map.has_been_read(0, 1000));
        assert!(!map.has_been_read(0, 999));
    }
}
