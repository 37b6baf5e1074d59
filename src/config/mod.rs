//! Configuration module for stepper-ramp.
//!
//! Provides types for loading and validating axis configurations
//! from TOML files (with `std` feature) or pre-parsed data.

mod axis;
mod limits;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use axis::{AxisConfig, DEFAULT_TICK_HZ};
pub use limits::{LimitPolicy, StepLimits};
pub use system::{SystemConfig, MAX_AXES};
pub use validation::{validate_axis, validate_config};

pub(crate) use validation::{
    check_acceleration, check_limits, check_smooth_delay, check_target_speed, check_tick_rate,
};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Microsteps, StepsPerSec, StepsPerSecSquared, Ticks, UnitExt};
