//! Micro-step mode selection.

use embedded_hal::digital::OutputPin;

use crate::error::{MotorError, Result};
use crate::motion::MAX_MICRO;

/// Switches the driver between micro-step levels.
///
/// Level `m` means `2^m` micro-steps per full step.
pub trait MicrostepSelect {
    /// Highest level the driver supports.
    fn max_level(&self) -> u8;

    /// Put the driver in micro-step level `level`.
    fn select(&mut self, level: u8) -> Result<()>;
}

/// Driver hard-wired to full stepping.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullStepOnly;

impl MicrostepSelect for FullStepOnly {
    fn max_level(&self) -> u8 {
        0
    }

    fn select(&mut self, level: u8) -> Result<()> {
        if level != 0 {
            return Err(MotorError::UnsupportedMicrostep(level).into());
        }
        Ok(())
    }
}

/// Three mode pins carrying the level in binary, `M0` the lowest bit.
pub struct MicrostepPins<M0, M1, M2>
where
    M0: OutputPin,
    M1: OutputPin,
    M2: OutputPin,
{
    m0: M0,
    m1: M1,
    m2: M2,
}

impl<M0, M1, M2> MicrostepPins<M0, M1, M2>
where
    M0: OutputPin,
    M1: OutputPin,
    M2: OutputPin,
{
    /// Wrap the three mode pins.
    pub fn new(m0: M0, m1: M1, m2: M2) -> Self {
        Self { m0, m1, m2 }
    }

    /// Give the pins back.
    pub fn release(self) -> (M0, M1, M2) {
        (self.m0, self.m1, self.m2)
    }
}

fn write<P: OutputPin>(pin: &mut P, high: bool) -> Result<()> {
    if high {
        pin.set_high().map_err(|_| MotorError::PinError)?;
    } else {
        pin.set_low().map_err(|_| MotorError::PinError)?;
    }
    Ok(())
}

impl<M0, M1, M2> MicrostepSelect for MicrostepPins<M0, M1, M2>
where
    M0: OutputPin,
    M1: OutputPin,
    M2: OutputPin,
{
    fn max_level(&self) -> u8 {
        MAX_MICRO
    }

    fn select(&mut self, level: u8) -> Result<()> {
        if level > MAX_MICRO {
            return Err(MotorError::UnsupportedMicrostep(level).into());
        }
        write(&mut self.m0, level & 1 != 0)?;
        write(&mut self.m1, level & 2 != 0)?;
        write(&mut self.m2, level & 4 != 0)?;
        Ok(())
    }
}
