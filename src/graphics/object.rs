//! `GraphicsObject`: parameter store, optional object data, and active
//! mutators (spec.md §4.6).

use crate::graphics::mutator::{Mutator, MutatorList};
use crate::graphics::property::ParamValue;
use crate::paramstore::ParamStore;

/// Closed set of object data kinds (REDESIGN FLAGS: polymorphic abstract
/// bases become a tagged enum when the variant set is closed).
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    File { surface: String },
    Text { value: String },
    Anim { frame: i32, frame_count: i32, frame_ms: u32, last_tick: u32 },
    Parent { children: Vec<i32> },
}

impl ObjectData {
    /// Advance animation frames; a no-op for every other variant.
    fn advance(&mut self, now: u32) {
        if let ObjectData::Anim { frame, frame_count, frame_ms, last_tick } = self {
            if *frame_ms > 0 && now.saturating_sub(*last_tick) >= *frame_ms && *frame_count > 0 {
                *frame = (*frame + 1) % *frame_count;
                *last_tick = now;
            }
        }
    }
}

/// `{ parameters, data, mutators }` (spec.md §3 "Graphics object").
#[derive(Debug, Clone, Default)]
pub struct GraphicsObject {
    pub parameters: ParamStore<ParamValue>,
    pub data: Option<ObjectData>,
    mutators: MutatorList,
}

impl GraphicsObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `m` unless a matching `(repr, name)` mutator is already running.
    pub fn add_mutator(&mut self, m: Mutator) {
        self.mutators.add(m);
    }

    /// Forces all mutators matching `(repr, name)` to their end state.
    pub fn end_matching(&mut self, repr: i32, name: &str, speedup: i32) {
        self.mutators.end_matching(repr, name, speedup, &mut self.parameters);
    }

    pub fn mutator_count(&self) -> usize {
        self.mutators.len()
    }

    /// 1. advance object data; 2. tick every mutator, dropping the ones
    /// that finish.
    pub fn execute(&mut self, now: u32) {
        if let Some(data) = &mut self.data {
            data.advance(now);
        }
        self.mutators.tick_all(now, &mut self.parameters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::mutator::Interp;
    use crate::graphics::property::PropertyId;
    use crate::paramstore::ParamKey;

    #[test]
    fn execute_advances_animation_frame() {
        let mut obj = GraphicsObject::new();
        obj.data = Some(ObjectData::Anim { frame: 0, frame_count: 4, frame_ms: 100, last_tick: 0 });
        obj.execute(150);
        assert_eq!(obj.data, Some(ObjectData::Anim { frame: 1, frame_count: 4, frame_ms: 100, last_tick: 150 }));
    }

    #[test]
    fn execute_drops_finished_mutators() {
        let mut obj = GraphicsObject::new();
        obj.add_mutator(Mutator::one_int(0, "alpha", 0, 10, 0, Interp::Linear, PropertyId::Alpha, 0, 100));
        assert_eq!(obj.mutator_count(), 1);
        obj.execute(20);
        assert_eq!(obj.mutator_count(), 0);
        assert_eq!(
            obj.parameters.get(&ParamKey::simple(PropertyId::Alpha as i32)),
            Some(&ParamValue::Int(100))
        );
    }
}
