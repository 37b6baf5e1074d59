//! # stepper-ramp
//!
//! Step-by-step acceleration ramp for stepper motors with embedded-hal 1.0 support.
//!
//! Call [`Stepper::step`] once per step and wait the returned number of
//! timer ticks: the motor accelerates, cruises at the target speed and brakes
//! onto the target position. Targets and speed may change between any two
//! calls.
//!
//! ## Features
//!
//! - **Integer recurrence**: one multiply and one division per step, no floats in the hot path
//! - **Dynamic micro-stepping**: slow motion is micro-stepped, fast motion full-stepped
//! - **Fixed-point scaling**: delays keep their high bits for precision
//! - **no_std compatible**: Core library works without standard library
//! - **embedded-hal 1.0**: Uses `OutputPin` for STEP/DIR/ENABLE, `DelayNs` for timing
//! - **Type-state safety**: Steps can only be driven with the driver enabled
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_ramp::{StepperDriverBuilder, MicrostepPins, SystemConfig};
//!
//! // Load configuration from TOML
//! let config: SystemConfig = stepper_ramp::load_config("axes.toml")?;
//!
//! // Create a driver with embedded-hal pins
//! let driver = StepperDriverBuilder::new()
//!     .from_config(&config, "x")?
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .enable_pin(enable_pin)
//!     .microstep(MicrostepPins::new(m0, m1, m2))
//!     .delay(delay)
//!     .build()?;
//!
//! let mut driver = driver.enable().map_err(|(_, e)| e)?;
//! driver.run_to(1500)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O, TOML parsing and the simulation harness
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
#[cfg(feature = "std")]
pub mod simulation;

// Re-exports for ergonomic API
pub use config::{validate_config, AxisConfig, LimitPolicy, StepLimits, SystemConfig};
pub use error::{Error, Result};
pub use motion::{Direction, MotionPhase, StepEvent, Stepper};
pub use motor::{
    state, FullStepOnly, MicrostepPins, MicrostepSelect, StepperDriver, StepperDriverBuilder,
};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Microsteps, StepsPerSec, StepsPerSecSquared, Ticks};
