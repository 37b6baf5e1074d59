//! Motion module for stepper-ramp.
//!
//! Integer acceleration ramp computed one step at a time: the delay
//! recurrence, ramp phases, micro-step level selection and the fixed-point
//! scaling that keeps the recurrence precise.

pub mod micro;
mod phase;
pub mod precision;
pub mod recurrence;
mod stepper;

pub use phase::{Direction, MotionPhase};
pub use recurrence::{LEVELS, MAX_MICRO};
pub use stepper::{StepEvent, Stepper, POSITION_LIMIT};
