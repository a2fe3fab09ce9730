//! Graphics object, parameter property enum, and time-driven mutators
//! (spec.md §4.6).

pub mod mutator;
pub mod object;
pub mod property;

pub use mutator::{Interp, Mutator, MutatorList, MutatorShape, ParamRef};
pub use object::{GraphicsObject, ObjectData};
pub use property::{ButtonProperty, DigitProperty, DriftProperty, ParamValue, PropertyId, TextProperty};
