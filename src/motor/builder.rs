//! Builder pattern for StepperDriver.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{AxisConfig, SystemConfig};
use crate::error::{ConfigError, Error, MotorError, Result};
use crate::motion::Stepper;

use super::driver::StepperDriver;
use super::microstep::MicrostepSelect;
use super::state::Disabled;

/// Builder for creating StepperDriver instances.
pub struct StepperDriverBuilder<STEP, DIR, EN, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    enable_pin: Option<EN>,
    microstep: Option<MS>,
    delay: Option<DELAY>,
    config: Option<AxisConfig>,
    name: Option<heapless::String<32>>,
}

impl<STEP, DIR, EN, MS, DELAY> Default for StepperDriverBuilder<STEP, DIR, EN, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<STEP, DIR, EN, MS, DELAY> StepperDriverBuilder<STEP, DIR, EN, MS, DELAY>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            enable_pin: None,
            microstep: None,
            delay: None,
            config: None,
            name: None,
        }
    }

    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the ENABLE pin.
    pub fn enable_pin(mut self, pin: EN) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set the micro-step mode selector.
    pub fn microstep(mut self, select: MS) -> Self {
        self.microstep = Some(select);
        self
    }

    /// Set the delay provider.
    pub fn delay(mut self, delay: DELAY) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the axis name, overriding the configured one.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Configure from an AxisConfig.
    pub fn axis_config(mut self, config: AxisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Configure from SystemConfig by axis name.
    pub fn from_config(self, config: &SystemConfig, axis: &str) -> Result<Self> {
        let axis_config = config.axis(axis).ok_or_else(|| {
            Error::Config(ConfigError::AxisNotFound(
                heapless::String::try_from(axis).unwrap_or_default(),
            ))
        })?;

        Ok(self.axis_config(axis_config.clone()))
    }

    /// Build the StepperDriver.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, the configuration is
    /// invalid, or the micro-step selector cannot reach the configured top level.
    pub fn build(self) -> Result<StepperDriver<STEP, DIR, EN, MS, DELAY, Disabled>> {
        let step_pin = self.step_pin.ok_or_else(|| missing("step_pin"))?;
        let dir_pin = self.dir_pin.ok_or_else(|| missing("dir_pin"))?;
        let enable_pin = self.enable_pin.ok_or_else(|| missing("enable_pin"))?;
        let microstep = self.microstep.ok_or_else(|| missing("microstep"))?;
        let delay = self.delay.ok_or_else(|| missing("delay"))?;
        let config = self.config.ok_or_else(|| missing("axis config"))?;

        let top_level = config.top_level();
        if microstep.max_level() < top_level {
            return Err(Error::Motor(MotorError::UnsupportedMicrostep(top_level)));
        }

        let stepper = Stepper::new(&config)?;

        let name = match self.name {
            Some(name) => name,
            None if !config.name.is_empty() => config.name.clone(),
            None => {
                let mut name = heapless::String::new();
                let _ = name.push_str("axis");
                name
            }
        };

        Ok(StepperDriver::new(
            step_pin,
            dir_pin,
            enable_pin,
            microstep,
            delay,
            stepper,
            name,
            config.invert_direction,
            config.enable_active_low,
        ))
    }
}

fn missing(field: &str) -> Error {
    let mut msg = heapless::String::new();
    let _ = msg.push_str(field);
    let _ = msg.push_str(" is required");
    Error::Config(ConfigError::ParseError(msg))
}
