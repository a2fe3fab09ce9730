//! End-to-end scenarios exercising the public API of each module
//! together, independent of their own inline unit tests.

use std::cell::Cell;

use rlvm::clock::Clock;
use rlvm::effect::{strategy_pair_for_style, Composer, Direction, Progress, Rect, Size};
use rlvm::expr::{BankRef, Expr};
use rlvm::graphics::{Interp, Mutator, MutatorList, ParamValue, PropertyId};
use rlvm::memory::{IntBank, IntLoc, MemoryFacade};
use rlvm::paramstore::{ParamKey, ParamStore};
use rlvm::{clock::Stopwatch, expr::eval::evaluate, expr::eval::EvalContext};

struct FakeClock {
    now: Cell<u64>,
}

impl FakeClock {
    fn new(start: u64) -> Self {
        Self { now: Cell::new(start) }
    }

    fn set(&self, t: u64) {
        self.now.set(t);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[test]
fn scenario_setarray_writes_consecutive_cells_leaving_the_rest_untouched() {
    let mut mem = MemoryFacade::new();
    let mut ctx = EvalContext::new();
    for (i, v) in [1, 2, 3].into_iter().enumerate() {
        let expr = Expr::SimpleAssign(BankRef::Int(IntBank::A), i as i32, Box::new(Expr::IntConstant(v)));
        evaluate(&expr, &mut mem, &mut ctx).unwrap();
    }
    let read = |mem: &MemoryFacade, i| mem.read_int(IntLoc::new(IntBank::A, i, 32).unwrap()).unwrap();
    assert_eq!(read(&mem, 0), 1);
    assert_eq!(read(&mem, 1), 2);
    assert_eq!(read(&mem, 2), 3);
    assert_eq!(read(&mem, 3), 0);
}

#[test]
fn scenario_composer_slide_off() {
    let composer = Composer::new(Size::new(1920, 1080), Size::new(1920, 1080), Size::new(1920, 1080), Direction::LeftToRight);
    let (on, off) = strategy_pair_for_style(20).unwrap();
    let draw = composer.compose(on, off, Progress::Pixels(100));
    assert_eq!(draw.src_from, Rect::new(0, 0, 100, 1080));
    assert_eq!(draw.src_to, Rect::new(0, 0, 100, 1080));
    assert_eq!(draw.dst_from, Rect::new(0, 0, 1820, 1080));
    assert_eq!(draw.dst_to, Rect::new(100, 0, 1920, 1080));
}

#[test]
fn scenario_mutator_dedup_keeps_the_first_end_value() {
    let mut params = ParamStore::new();
    let mut mutators = MutatorList::new();
    mutators.add(Mutator::one_int(0, "alpha", 0, 10, 0, Interp::Linear, PropertyId::Alpha, 0, 100));
    mutators.add(Mutator::one_int(0, "alpha", 0, 10, 0, Interp::Linear, PropertyId::Alpha, 0, 255));
    mutators.tick_all(10, &mut params);
    assert_eq!(
        params.get(&ParamKey::simple(PropertyId::Alpha as i32)),
        Some(&ParamValue::Int(100))
    );
}

#[test]
fn scenario_stopwatch_run_pause_resume_read() {
    let clock = FakeClock::new(0);
    let mut sw = Stopwatch::new(&clock);
    sw.run(&clock).unwrap();
    clock.set(12);
    sw.pause(&clock).unwrap();
    clock.set(22);
    sw.run(&clock).unwrap();
    clock.set(32);
    assert_eq!(sw.reading_ms(&clock).unwrap(), 22);
}
