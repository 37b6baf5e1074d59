//! Driver state type-state markers.
//!
//! Uses Rust's type system to enforce valid state transitions at compile time.

/// Driver output stage is off; the motor shaft is free.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

/// Driver output stage is powered and ready to step.
#[derive(Debug, Clone, Copy)]
pub struct Enabled;

/// Trait for driver states.
pub trait DriverState: private::Sealed {}

impl DriverState for Disabled {}
impl DriverState for Enabled {}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Disabled {}
    impl Sealed for super::Enabled {}
}

/// State name for display/debugging.
pub trait StateName {
    /// Get the state name as a static string.
    fn name() -> &'static str;
}

impl StateName for Disabled {
    fn name() -> &'static str {
        "Disabled"
    }
}

impl StateName for Enabled {
    fn name() -> &'static str {
        "Enabled"
    }
}
