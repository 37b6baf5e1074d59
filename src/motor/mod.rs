//! Motor module for stepper-ramp.
//!
//! Drives a STEP/DIR stepper driver from a [`Stepper`](crate::motion::Stepper)
//! ramp, with type-state safety for the enable line.

mod builder;
mod driver;
mod microstep;
pub mod state;

pub use builder::StepperDriverBuilder;
pub use driver::{StepperDriver, ENABLE_NS, MODE_CHANGE_NS, STEP_PULSE_NS};
pub use microstep::{FullStepOnly, MicrostepPins, MicrostepSelect};
pub use state::{Disabled, DriverState, Enabled, StateName};
