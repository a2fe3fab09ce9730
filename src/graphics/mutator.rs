//! Time-driven parameter interpolation (spec.md §4.6 "Mutator").

use crate::graphics::property::{ParamValue, PropertyId};
use crate::paramstore::{ParamKey, ParamStore};

/// Interpolation curve; `f(progress)` where `progress ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interp {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Interp {
    fn apply(self, t: f64) -> f64 {
        match self {
            Interp::Linear => t,
            Interp::EaseIn => t * t,
            Interp::EaseOut => t * (2.0 - t),
            Interp::EaseInOut => t * t * (3.0 - 2.0 * t),
        }
    }
}

fn interpolate(t0: u32, t: u32, t1: u32, a: i32, b: i32, mode: Interp) -> i32 {
    if t1 <= t0 {
        return b;
    }
    let frac = ((t - t0) as f64 / (t1 - t0) as f64).clamp(0.0, 1.0);
    let f = mode.apply(frac);
    (a as f64 + (b - a) as f64 * f).round() as i32
}

/// A single `(property, optional slot)` driven by a mutator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef {
    pub property: PropertyId,
    pub slot: Option<i32>,
}

impl ParamRef {
    pub const fn simple(property: PropertyId) -> Self {
        Self { property, slot: None }
    }

    pub const fn slotted(property: PropertyId, slot: i32) -> Self {
        Self { property, slot: Some(slot) }
    }

    fn key(&self) -> ParamKey {
        match self.slot {
            Some(s) => ParamKey::slotted(self.property as i32, s),
            None => ParamKey::simple(self.property as i32),
        }
    }
}

/// Which shape of mutator this is, for identity/debugging; drives the
/// same `targets`/`start`/`end` vectors uniformly regardless of shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutatorShape {
    OneInt,
    RepnoInt,
    TwoInt,
    Adjust,
    Display,
}

/// `{ repr, name, t0, duration_ms, delay_ms, mode, target }` (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct Mutator {
    pub repr: i32,
    pub name: String,
    pub t0: u32,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub mode: Interp,
    pub shape: MutatorShape,
    targets: Vec<ParamRef>,
    start: Vec<i32>,
    end: Vec<i32>,
}

impl Mutator {
    fn new(
        repr: i32,
        name: impl Into<String>,
        t0: u32,
        duration_ms: u32,
        delay_ms: u32,
        mode: Interp,
        shape: MutatorShape,
        targets: Vec<ParamRef>,
        start: Vec<i32>,
        end: Vec<i32>,
    ) -> Self {
        Self { repr, name: name.into(), t0, duration_ms, delay_ms, mode, shape, targets, start, end }
    }

    /// Drives a single integer property.
    #[allow(clippy::too_many_arguments)]
    pub fn one_int(
        repr: i32,
        name: impl Into<String>,
        t0: u32,
        duration_ms: u32,
        delay_ms: u32,
        mode: Interp,
        property: PropertyId,
        start: i32,
        end: i32,
    ) -> Self {
        Self::new(repr, name, t0, duration_ms, delay_ms, mode, MutatorShape::OneInt, vec![ParamRef::simple(property)], vec![start], vec![end])
    }

    /// Drives the `repr`-th slot of an array-valued property.
    #[allow(clippy::too_many_arguments)]
    pub fn repno_int(
        repr: i32,
        name: impl Into<String>,
        t0: u32,
        duration_ms: u32,
        delay_ms: u32,
        mode: Interp,
        property: PropertyId,
        start: i32,
        end: i32,
    ) -> Self {
        Self::new(
            repr,
            name,
            t0,
            duration_ms,
            delay_ms,
            mode,
            MutatorShape::RepnoInt,
            vec![ParamRef::slotted(property, repr)],
            vec![start],
            vec![end],
        )
    }

    /// Drives two properties under one timing envelope.
    #[allow(clippy::too_many_arguments)]
    pub fn two_int(
        repr: i32,
        name: impl Into<String>,
        t0: u32,
        duration_ms: u32,
        delay_ms: u32,
        mode: Interp,
        a: PropertyId,
        b: PropertyId,
        start: (i32, i32),
        end: (i32, i32),
    ) -> Self {
        Self::new(
            repr,
            name,
            t0,
            duration_ms,
            delay_ms,
            mode,
            MutatorShape::TwoInt,
            vec![ParamRef::simple(a), ParamRef::simple(b)],
            vec![start.0, start.1],
            vec![end.0, end.1],
        )
    }

    /// Drives the x/y adjustment pair at a given slot.
    #[allow(clippy::too_many_arguments)]
    pub fn adjust(
        repr: i32,
        name: impl Into<String>,
        t0: u32,
        duration_ms: u32,
        delay_ms: u32,
        mode: Interp,
        slot: i32,
        start: (i32, i32),
        end: (i32, i32),
    ) -> Self {
        Self::new(
            repr,
            name,
            t0,
            duration_ms,
            delay_ms,
            mode,
            MutatorShape::Adjust,
            vec![
                ParamRef::slotted(PropertyId::AdjustmentOffsetX, slot),
                ParamRef::slotted(PropertyId::AdjustmentOffsetY, slot),
            ],
            vec![start.0, start.1],
            vec![end.0, end.1],
        )
    }

    /// Composite appear/disappear envelope. `targets`/`start`/`end` are
    /// precomputed by the caller from the object's current state at
    /// creation time (spec.md: "pre-computing start/end ... at creation").
    #[allow(clippy::too_many_arguments)]
    pub fn display(
        repr: i32,
        name: impl Into<String>,
        t0: u32,
        duration_ms: u32,
        delay_ms: u32,
        mode: Interp,
        targets: Vec<ParamRef>,
        start: Vec<i32>,
        end: Vec<i32>,
    ) -> Self {
        Self::new(repr, name, t0, duration_ms, delay_ms, mode, MutatorShape::Display, targets, start, end)
    }

    /// Identity used by dedup/cancellation.
    pub fn identity(&self) -> (i32, &str) {
        (self.repr, &self.name)
    }

    fn matches(&self, repr: i32, name: &str) -> bool {
        self.repr == repr && self.name == name
    }

    fn write_values(&self, params: &mut ParamStore<ParamValue>, values: &[i32]) {
        for (target, value) in self.targets.iter().zip(values) {
            params.set(target.key(), ParamValue::Int(*value));
        }
    }

    /// Force the end values in, synchronously (used by `end_matching`).
    fn finish(&self, params: &mut ParamStore<ParamValue>) {
        self.write_values(params, &self.end);
    }

    /// `tick(now)`: returns `true` once the mutator has fully run and
    /// should be dropped (spec.md §4.6 "Mutator contract").
    pub fn tick(&self, now: u32, params: &mut ParamStore<ParamValue>) -> bool {
        let start_time = self.t0 + self.delay_ms;
        if now < start_time {
            return false;
        }
        let end_time = start_time + self.duration_ms;
        if now < end_time {
            let values: Vec<i32> = self
                .start
                .iter()
                .zip(&self.end)
                .map(|(a, b)| interpolate(start_time, now, end_time, *a, *b, self.mode))
                .collect();
            self.write_values(params, &values);
            return false;
        }
        self.finish(params);
        tracing::debug!(repr = self.repr, name = %self.name, now, "mutator finished");
        true
    }
}

/// Owner-side mutator list operations (spec.md §4.6 "Identity & cancellation").
#[derive(Debug, Clone, Default)]
pub struct MutatorList {
    active: Vec<Mutator>,
}

impl MutatorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `m` unless a mutator with the same `(repr, name)` is already
    /// running, in which case `m` is dropped.
    pub fn add(&mut self, m: Mutator) {
        if self.active.iter().any(|running| running.matches(m.repr, &m.name)) {
            tracing::trace!(repr = m.repr, name = %m.name, "mutator start dropped, already running");
            return;
        }
        tracing::debug!(repr = m.repr, name = %m.name, duration_ms = m.duration_ms, delay_ms = m.delay_ms, "mutator started");
        self.active.push(m);
    }

    /// Ticks every active mutator, dropping those that report finished.
    pub fn tick_all(&mut self, now: u32, params: &mut ParamStore<ParamValue>) {
        self.active.retain(|m| !m.tick(now, params));
    }

    /// `end_matching(repr, name, speedup)`.
    pub fn end_matching(&mut self, repr: i32, name: &str, speedup: i32, params: &mut ParamStore<ParamValue>) {
        if speedup == 1 {
            return;
        }
        if speedup != 0 {
            tracing::warn!(speedup, "unrecognised end_matching speedup, behaving like 1 (no-op)");
            return;
        }
        for m in &self.active {
            if m.matches(repr, name) {
                m.finish(params);
                tracing::debug!(repr, name, "mutator cancelled");
            }
        }
        self.active.retain(|m| !m.matches(repr, name));
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutator_bounds_respect_delay_and_duration() {
        let mut params = ParamStore::new();
        let m = Mutator::one_int(0, "alpha", 0, 10, 5, Interp::Linear, PropertyId::Alpha, 0, 100);
        assert!(!m.tick(3, &mut params));
        assert_eq!(params.get(&ParamKey::simple(PropertyId::Alpha as i32)), None);

        assert!(!m.tick(10, &mut params));
        let mid = params.get(&ParamKey::simple(PropertyId::Alpha as i32)).cloned().unwrap();
        assert_eq!(mid, ParamValue::Int(50));

        assert!(m.tick(16, &mut params));
        assert_eq!(params.get(&ParamKey::simple(PropertyId::Alpha as i32)), Some(&ParamValue::Int(100)));
    }

    #[test]
    fn dedup_keeps_the_first_mutator() {
        let mut params = ParamStore::new();
        let mut list = MutatorList::new();
        list.add(Mutator::one_int(0, "alpha", 0, 10, 0, Interp::Linear, PropertyId::Alpha, 0, 100));
        list.add(Mutator::one_int(0, "alpha", 0, 10, 0, Interp::Linear, PropertyId::Alpha, 0, 255));
        assert_eq!(list.len(), 1);
        list.tick_all(10, &mut params);
        assert_eq!(params.get(&ParamKey::simple(PropertyId::Alpha as i32)), Some(&ParamValue::Int(100)));
    }

    #[test]
    fn end_matching_speedup_zero_writes_end_and_removes() {
        let mut params = ParamStore::new();
        let mut list = MutatorList::new();
        list.add(Mutator::one_int(0, "alpha", 0, 1000, 0, Interp::Linear, PropertyId::Alpha, 0, 100));
        list.end_matching(0, "alpha", 0, &mut params);
        assert!(list.is_empty());
        assert_eq!(params.get(&ParamKey::simple(PropertyId::Alpha as i32)), Some(&ParamValue::Int(100)));
    }

    #[test]
    fn end_matching_speedup_one_is_a_no_op() {
        let mut params = ParamStore::new();
        let mut list = MutatorList::new();
        list.add(Mutator::one_int(0, "alpha", 0, 1000, 0, Interp::Linear, PropertyId::Alpha, 0, 100));
        list.end_matching(0, "alpha", 1, &mut params);
        assert_eq!(list.len(), 1);
        assert_eq!(params.get(&ParamKey::simple(PropertyId::Alpha as i32)), None);
    }

    #[test]
    fn ease_in_out_is_monotone_and_bounded() {
        let mut params = ParamStore::new();
        let m = Mutator::one_int(0, "x", 0, 100, 0, Interp::EaseInOut, PropertyId::PositionX, 0, 100);
        let mut last = 0;
        for t in (0..=100).step_by(10) {
            m.tick(t, &mut params);
            let v = params.get(&ParamKey::simple(PropertyId::PositionX as i32)).unwrap().as_int().unwrap();
            assert!(v >= last);
            assert!((0..=100).contains(&v));
            last = v;
        }
    }
}
