//! Stepper motor driver.
//!
//! Generic over embedded-hal 1.0 pin types with type-state safety. The
//! driver owns a [`Stepper`] and turns its step events into pin writes and
//! waits.

use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::units::{StepsPerSec, Ticks};
use crate::error::{Error, MotorError, Result};
use crate::motion::{Direction, StepEvent, Stepper};

use super::microstep::MicrostepSelect;
use super::state::{Disabled, DriverState, Enabled, StateName};

/// Minimum STEP pulse width.
pub const STEP_PULSE_NS: u32 = 1_000;

/// Time the driver needs after a direction or micro-step mode change.
pub const MODE_CHANGE_NS: u32 = 1_000;

/// Time the driver needs after being enabled or disabled.
pub const ENABLE_NS: u32 = 1_000;

/// Stepper motor driver with type-state safety.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `EN`: ENABLE pin type (must implement `OutputPin`)
/// - `MS`: Micro-step mode selector (must implement [`MicrostepSelect`])
/// - `DELAY`: Delay provider (must implement `DelayNs`)
/// - `STATE`: Type-state marker (defaults to `Disabled`)
pub struct StepperDriver<STEP, DIR, EN, MS, DELAY, STATE = Disabled>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
    STATE: DriverState,
{
    /// STEP pin (pulse to move one micro-step).
    step_pin: STEP,

    /// DIR pin (high = CW, low = CCW, or inverted).
    dir_pin: DIR,

    /// ENABLE pin.
    enable_pin: EN,

    /// Micro-step mode pins.
    microstep: MS,

    /// Delay provider for step timing.
    delay: DELAY,

    /// The acceleration ramp.
    stepper: Stepper,

    /// Axis name for logging/debugging.
    name: heapless::String<32>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Whether the driver is enabled by a low ENABLE pin.
    enable_active_low: bool,

    /// Direction currently on the DIR pin (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    /// Level currently on the mode pins.
    current_level: Option<u8>,

    /// Type-state marker.
    _state: PhantomData<STATE>,
}

impl<STEP, DIR, EN, MS, DELAY, STATE> StepperDriver<STEP, DIR, EN, MS, DELAY, STATE>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
    STATE: DriverState + StateName,
{
    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get the current position in full steps.
    #[inline]
    pub fn position(&self) -> i32 {
        self.stepper.position()
    }

    /// Get the acceleration ramp.
    #[inline]
    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    /// Get the acceleration ramp mutably, for target and speed changes.
    #[inline]
    pub fn stepper_mut(&mut self) -> &mut Stepper {
        &mut self.stepper
    }

    /// Set the target position in full steps. Returns the target actually set.
    pub fn set_target_position(&mut self, position: i32) -> Result<i32> {
        self.stepper.set_target_position(position)
    }

    /// Set the speed ceiling.
    pub fn set_target_speed(&mut self, speed: StepsPerSec) -> Result<()> {
        self.stepper.set_target_speed(speed)
    }

    /// Get the current state name.
    #[inline]
    pub fn state_name(&self) -> &'static str {
        STATE::name()
    }

    fn write_enable(&mut self, enabled: bool) -> Result<()> {
        let pin_high = enabled != self.enable_active_low;
        if pin_high {
            self.enable_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.enable_pin.set_low().map_err(|_| MotorError::PinError)?;
        }
        self.delay.delay_ns(ENABLE_NS);
        Ok(())
    }

    fn into_state<NEXT: DriverState>(self) -> StepperDriver<STEP, DIR, EN, MS, DELAY, NEXT> {
        StepperDriver {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            enable_pin: self.enable_pin,
            microstep: self.microstep,
            delay: self.delay,
            stepper: self.stepper,
            name: self.name,
            invert_direction: self.invert_direction,
            enable_active_low: self.enable_active_low,
            current_direction: self.current_direction,
            current_level: self.current_level,
            _state: PhantomData,
        }
    }
}

impl<STEP, DIR, EN, MS, DELAY> StepperDriver<STEP, DIR, EN, MS, DELAY, Disabled>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    /// Create a new driver in the Disabled state.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        step_pin: STEP,
        dir_pin: DIR,
        enable_pin: EN,
        microstep: MS,
        delay: DELAY,
        stepper: Stepper,
        name: heapless::String<32>,
        invert_direction: bool,
        enable_active_low: bool,
    ) -> Self {
        Self {
            step_pin,
            dir_pin,
            enable_pin,
            microstep,
            delay,
            stepper,
            name,
            invert_direction,
            enable_active_low,
            current_direction: None,
            current_level: None,
            _state: PhantomData,
        }
    }

    /// Redefine the current position (in full steps).
    pub fn calibrate_position(&mut self, position: i32) -> Result<()> {
        self.stepper.calibrate_position(position)
    }

    /// Power the driver and restart the ramp from rest.
    ///
    /// Mode and direction pins are written before the first step. On failure
    /// the driver is handed back still disabled.
    pub fn enable(
        mut self,
    ) -> core::result::Result<StepperDriver<STEP, DIR, EN, MS, DELAY, Enabled>, (Self, Error)> {
        if let Err(e) = self.write_enable(true) {
            return Err((self, e));
        }

        self.current_direction = None;
        self.current_level = None;
        self.stepper.reset_motion();

        #[cfg(feature = "defmt")]
        defmt::debug!("Driver enabled at {}", self.stepper.position());

        let mut enabled = self.into_state::<Enabled>();
        let level = enabled.stepper.micro_level();
        let direction = enabled.stepper.direction();
        let ready = enabled
            .set_level(level)
            .and_then(|_| enabled.set_direction(direction));

        match ready {
            Ok(()) => Ok(enabled),
            Err(e) => {
                // Power the stage back down before handing the driver back
                let _ = enabled.write_enable(false);
                Err((enabled.into_state(), e))
            }
        }
    }

    /// Give back the pins, delay provider and ramp.
    pub fn release(self) -> (STEP, DIR, EN, MS, DELAY, Stepper) {
        (
            self.step_pin,
            self.dir_pin,
            self.enable_pin,
            self.microstep,
            self.delay,
            self.stepper,
        )
    }
}

impl<STEP, DIR, EN, MS, DELAY> StepperDriver<STEP, DIR, EN, MS, DELAY, Enabled>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
{
    /// Run one ramp step: update mode and direction pins as needed, pulse
    /// STEP and wait the returned delay.
    ///
    /// Returns the ramp's event; [`StepEvent::Idle`] means at rest and
    /// nothing was done.
    ///
    /// # Errors
    ///
    /// Returns [`MotorError::PinError`] if a pin write fails. The ramp has
    /// already counted the step by then, so it is restarted from rest speed
    /// and its position may be one step ahead of the motor. Recalibrate with
    /// [`calibrate_position`](crate::Stepper::calibrate_position) before
    /// relying on it.
    pub fn step(&mut self) -> Result<StepEvent> {
        let event = self.stepper.advance();
        if let Err(e) = self.emit(event) {
            self.stepper.reset_motion();
            #[cfg(feature = "defmt")]
            defmt::error!("Pin write failed on {}, ramp reset", self.name.as_str());
            return Err(e);
        }
        Ok(event)
    }

    fn emit(&mut self, event: StepEvent) -> Result<()> {
        let level = self.stepper.micro_level();
        if self.current_level != Some(level) {
            self.set_level(level)?;
        }

        match event {
            StepEvent::Idle => {}
            StepEvent::Reversed { delay } => {
                let direction = self.stepper.direction();
                self.set_direction(direction)?;
                self.wait_ticks(delay, MODE_CHANGE_NS);
            }
            StepEvent::Stepped { delay } => {
                self.step_pin.set_high().map_err(|_| MotorError::PinError)?;
                self.delay.delay_ns(STEP_PULSE_NS);
                self.step_pin.set_low().map_err(|_| MotorError::PinError)?;
                self.wait_ticks(delay, STEP_PULSE_NS);
            }
        }

        Ok(())
    }

    /// Step until the ramp is at rest on its target.
    ///
    /// Returns the number of step pulses emitted.
    pub fn run_to_completion(&mut self) -> Result<u32> {
        let mut pulses = 0;
        loop {
            match self.step()? {
                StepEvent::Idle => return Ok(pulses),
                StepEvent::Stepped { .. } => pulses += 1,
                StepEvent::Reversed { .. } => {}
            }
        }
    }

    /// Move to a position in full steps and run to completion (blocking).
    pub fn run_to(&mut self, position: i32) -> Result<u32> {
        self.stepper.set_target_position(position)?;
        self.run_to_completion()
    }

    /// Cut power to the driver.
    ///
    /// The ramp should be at rest first; a moving motor loses track of its
    /// position. On failure the driver is handed back still enabled.
    pub fn disable(
        mut self,
    ) -> core::result::Result<StepperDriver<STEP, DIR, EN, MS, DELAY, Disabled>, (Self, Error)> {
        #[cfg(feature = "defmt")]
        if !self.stepper.is_stopped() {
            defmt::warn!("Disabling {} while moving", self.name.as_str());
        }

        if let Err(e) = self.write_enable(false) {
            return Err((self, e));
        }
        Ok(self.into_state())
    }

    // Wait a ramp delay, minus what the caller has already spent.
    fn wait_ticks(&mut self, ticks: u32, spent_ns: u32) {
        let mut ns = Ticks(ticks)
            .to_nanos(self.stepper.tick_hz())
            .saturating_sub(u64::from(spent_ns));
        while ns > 0 {
            let chunk = ns.min(u64::from(u32::MAX)) as u32;
            self.delay.delay_ns(chunk);
            ns -= u64::from(chunk);
        }
    }
}

impl<STEP, DIR, EN, MS, DELAY, STATE> StepperDriver<STEP, DIR, EN, MS, DELAY, STATE>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    MS: MicrostepSelect,
    DELAY: DelayNs,
    STATE: DriverState,
{
    fn set_level(&mut self, level: u8) -> Result<()> {
        self.microstep.select(level)?;
        self.current_level = Some(level);
        self.delay.delay_ns(MODE_CHANGE_NS);
        Ok(())
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Clockwise => !self.invert_direction,
            Direction::CounterClockwise => self.invert_direction,
        };

        if pin_high {
            self.dir_pin.set_high().map_err(|_| MotorError::PinError)?;
        } else {
            self.dir_pin.set_low().map_err(|_| MotorError::PinError)?;
        }

        self.current_direction = Some(direction);
        Ok(())
    }
}
