//! Unit test harness for stepper-ramp.
//!
//! This module organizes configuration tests run through the public API.

mod config_parsing;
mod config_validation;
