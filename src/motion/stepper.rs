//! The per-axis stepper: one call per step, one delay back.

use crate::config::{
    check_acceleration, check_limits, check_smooth_delay, check_target_speed, check_tick_rate,
    AxisConfig, StepLimits, StepsPerSec, StepsPerSecSquared, Ticks,
};
use crate::error::{Error, MotionError, Result};

use super::micro::{is_aligned, scale_budget, scale_position, target_level};
use super::phase::{Direction, MotionPhase};
use super::precision::{DelaySet, CEILING};
use super::recurrence::{accelerate, decelerate, MAX_MICRO};

/// Largest position, in full steps, that still fits at the finest micro-step level.
pub const POSITION_LIMIT: i32 = i32::MAX >> MAX_MICRO;

/// Outcome of one [`Stepper::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepEvent {
    /// At rest on the target. Nothing to do.
    Idle,
    /// Direction flipped without stepping; wait `delay` ticks before the next call.
    Reversed {
        /// Settling delay in ticks.
        delay: u32,
    },
    /// One micro-step taken; wait `delay` ticks before the next call.
    Stepped {
        /// Delay until the next step, in ticks.
        delay: u32,
    },
}

impl StepEvent {
    /// Ticks to wait after this event, 0 at rest.
    #[inline]
    pub fn delay(self) -> u32 {
        match self {
            StepEvent::Idle => 0,
            StepEvent::Reversed { delay } | StepEvent::Stepped { delay } => delay,
        }
    }

    /// Whether a step pulse is due for this event.
    #[inline]
    pub fn is_step(self) -> bool {
        matches!(self, StepEvent::Stepped { .. })
    }
}

/// Acceleration ramp for one axis.
///
/// The caller owns the cadence: call [`step`](Stepper::step) (or
/// [`advance`](Stepper::advance)), emit a step pulse, wait the returned number
/// of ticks, repeat. Targets may be changed between any two calls; the ramp
/// brakes, reverses and re-accelerates on its own and never overshoots the
/// target position.
///
/// # Example
///
/// ```rust
/// use stepper_ramp::{Stepper, StepsPerSec, StepsPerSecSquared, Ticks};
///
/// let mut stepper = Stepper::with_params(
///     StepsPerSecSquared(2.0e4),
///     StepsPerSec(1.0e4),
///     Ticks(700),
/// )?;
/// stepper.set_target_position(1500)?;
///
/// let mut elapsed = 0u64;
/// loop {
///     let delay = stepper.step();
///     if delay == 0 {
///         break;
///     }
///     elapsed += u64::from(delay);
/// }
/// assert_eq!(stepper.position(), 1500);
/// assert!(elapsed > 530_000 && elapsed < 570_000);
/// # Ok::<(), stepper_ramp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Stepper {
    /// Position in micro-steps of the current level.
    pos: i32,
    /// Target in micro-steps of the current level.
    target_pos: i32,
    direction: Direction,
    /// Steps since the ramp last left rest; equals the braking distance.
    accel_steps: u32,
    micro: u8,
    top_micro: u8,
    delays: DelaySet,
    phase: MotionPhase,
    tick_hz: u32,
    acceleration: StepsPerSecSquared,
    target_speed: StepsPerSec,
    limits: Option<StepLimits>,
    last_event: StepEvent,
}

impl Stepper {
    /// Create a stepper at rest at position 0 from an axis configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any parameter is out of range.
    pub fn new(config: &AxisConfig) -> Result<Self> {
        check_tick_rate(config.tick_hz)?;
        let top_micro = config.top_level();
        let base = check_acceleration(config.acceleration, config.tick_hz, top_micro)?;
        let target = check_target_speed(config.target_speed, config.tick_hz)?;
        let smooth = check_smooth_delay(config.smooth_delay)?;
        if let Some(ref limits) = config.limits {
            check_limits(limits)?;
        }

        Ok(Self {
            pos: 0,
            target_pos: 0,
            direction: Direction::Clockwise,
            accel_steps: 0,
            micro: 0,
            top_micro,
            delays: DelaySet::new(base, target, smooth, 0, top_micro),
            phase: MotionPhase::Accelerating,
            tick_hz: config.tick_hz,
            acceleration: config.acceleration,
            target_speed: config.target_speed,
            limits: config.limits,
            last_event: StepEvent::Idle,
        })
    }

    /// Create a stepper from the three motion parameters, with microsecond
    /// ticks and up to 1/32 micro-stepping.
    pub fn with_params(
        acceleration: StepsPerSecSquared,
        target_speed: StepsPerSec,
        smooth_delay: Ticks,
    ) -> Result<Self> {
        Self::new(&AxisConfig::new(acceleration, target_speed, smooth_delay))
    }

    // Setters

    /// Set the target position in full steps.
    ///
    /// Soft limits apply first (reject or clamp), then the representable
    /// range. Returns the target actually set.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::LimitExceeded`] if the position is rejected.
    /// The previous target stays in effect.
    pub fn set_target_position(&mut self, position: i32) -> Result<i32> {
        let position = self.bounded(position)?;
        self.target_pos = position << self.micro;
        self.resume();
        Ok(position)
    }

    /// Set the target relative to the current position, in full steps.
    pub fn set_target_relative(&mut self, delta: i32) -> Result<i32> {
        let position = self.position().checked_add(delta).ok_or_else(|| {
            let limit = if delta < 0 { -POSITION_LIMIT } else { POSITION_LIMIT };
            Error::Motion(MotionError::LimitExceeded {
                position: self.position(),
                limit,
            })
        })?;
        self.set_target_position(position)
    }

    /// Set the speed ceiling.
    ///
    /// Takes effect on the next step without touching position or the ramp
    /// count. A running stepper brakes toward a lower ceiling or accelerates
    /// toward a higher one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTargetSpeed`](crate::error::ConfigError::InvalidTargetSpeed)
    /// if the speed maps to no usable delay. The previous ceiling stays in effect.
    pub fn set_target_speed(&mut self, speed: StepsPerSec) -> Result<()> {
        let raw = match check_target_speed(speed, self.tick_hz) {
            Ok(raw) => raw,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Rejected target speed {}", speed.0);
                return Err(e);
            }
        };

        self.delays.replace_target(raw);
        self.target_speed = speed;
        self.resume();

        #[cfg(feature = "defmt")]
        defmt::debug!("Target speed {} steps/s, shift {}", speed.0, self.delays.shift());

        Ok(())
    }

    /// Change the acceleration. Only allowed at rest.
    ///
    /// # Errors
    ///
    /// Returns [`MotionError::NotStopped`] while moving, or a configuration
    /// error if the acceleration is out of range.
    pub fn set_acceleration(&mut self, acceleration: StepsPerSecSquared) -> Result<()> {
        if !self.is_stopped() {
            return Err(Error::Motion(MotionError::NotStopped));
        }
        let base = match check_acceleration(acceleration, self.tick_hz, self.top_micro) {
            Ok(base) => base,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Rejected acceleration {}", acceleration.0);
                return Err(e);
            }
        };

        self.delays.replace_base(base, self.micro);
        self.acceleration = acceleration;
        self.phase = MotionPhase::Accelerating;

        #[cfg(feature = "defmt")]
        defmt::debug!("Acceleration {} steps/s^2, shift {}", acceleration.0, self.delays.shift());

        Ok(())
    }

    /// Redefine the current position (in full steps). Only allowed at rest.
    ///
    /// The target moves along, so the stepper stays at rest.
    pub fn calibrate_position(&mut self, position: i32) -> Result<()> {
        if !self.is_stopped() {
            return Err(Error::Motion(MotionError::NotStopped));
        }
        let position = in_range(position)?;
        self.pos = position << self.micro;
        self.target_pos = self.pos;
        Ok(())
    }

    /// Restart the ramp from rest speed, keeping position and target.
    ///
    /// Used when the driver has been (re-)enabled and the motor is known to
    /// stand still.
    pub fn reset_motion(&mut self) {
        self.accel_steps = 0;
        self.delays.current = self.delays.base[usize::from(self.micro)];
        self.phase = MotionPhase::Accelerating;
        self.delays.rebalance();
        self.last_event = StepEvent::Idle;
    }

    // Stepping

    /// Compute the next step and return its delay in ticks, 0 at rest.
    #[inline]
    pub fn step(&mut self) -> u32 {
        self.advance().delay()
    }

    /// Compute the next step.
    ///
    /// Position is updated before returning, so a [`StepEvent::Stepped`]
    /// means the step pulse is due now and the next call after `delay` ticks.
    pub fn advance(&mut self) -> StepEvent {
        if is_aligned(self.pos, self.micro) {
            self.select_micro();
        }

        let distance = i64::from(self.target_pos) - i64::from(self.pos);

        if self.accel_steps <= 1 && is_aligned(self.pos, self.micro) {
            if distance == 0 {
                return self.settle();
            }
            let remaining = distance * i64::from(self.direction.sign());
            if remaining < 0 {
                return self.reverse();
            }
        }

        self.pos += self.direction.sign();

        let remaining = distance * i64::from(self.direction.sign());
        self.phase = self.phase.next(
            remaining,
            self.accel_steps,
            self.delays.current,
            self.delays.target,
        );

        let base = self.delays.base[usize::from(self.micro)];
        match self.phase {
            MotionPhase::Accelerating => {
                (self.delays.current, self.accel_steps) =
                    accelerate(self.delays.current, self.accel_steps, base);
            }
            MotionPhase::Decelerating => {
                (self.delays.current, self.accel_steps) =
                    decelerate(self.delays.current, self.accel_steps, base);
            }
            MotionPhase::TargetSpeed => {}
        }
        debug_assert!(self.delays.current < CEILING << 1, "delay escaped the ceiling");

        let effective = self.delays.current.max(self.delays.target);
        let delay = self.delays.ticks(effective, self.micro).max(1);
        self.last_event = StepEvent::Stepped { delay };
        self.last_event
    }

    fn settle(&mut self) -> StepEvent {
        self.accel_steps = 0;
        self.delays.current = self.delays.base[usize::from(self.micro)];
        self.phase = MotionPhase::Accelerating;
        self.delays.rebalance();

        #[cfg(feature = "defmt")]
        if self.last_event != StepEvent::Idle {
            defmt::debug!("At rest at {} (micro level {})", self.position(), self.micro);
        }

        self.last_event = StepEvent::Idle;
        self.last_event
    }

    fn reverse(&mut self) -> StepEvent {
        self.accel_steps = 0;
        self.direction = self.direction.reversed();
        self.phase = MotionPhase::Accelerating;

        #[cfg(feature = "defmt")]
        defmt::debug!("Reversing to {} at {}", self.direction, self.position());

        let delay = self.delays.ticks(self.delays.target, 0).max(1);
        self.last_event = StepEvent::Reversed { delay };
        self.last_event
    }

    fn select_micro(&mut self) {
        let effective = self.delays.current.max(self.delays.target);
        let level = target_level(effective, self.delays.smooth, self.micro, self.top_micro);
        if level == self.micro {
            return;
        }

        self.pos = scale_position(self.pos, self.micro, level);
        self.target_pos = scale_position(self.target_pos, self.micro, level);
        self.accel_steps = scale_budget(self.accel_steps, self.micro, level);

        #[cfg(feature = "defmt")]
        defmt::debug!("Micro level {} -> {}", self.micro, level);

        self.micro = level;
    }

    // Re-evaluate the phase after a target change while moving.
    fn resume(&mut self) {
        if !self.is_stopped() {
            self.phase = MotionPhase::resume(self.delays.current, self.delays.target);
        }
    }

    fn bounded(&self, position: i32) -> Result<i32> {
        let position = match self.limits {
            Some(limits) => limits.apply(position).ok_or_else(|| {
                #[cfg(feature = "defmt")]
                defmt::warn!("Target {} outside soft limits", position);
                Error::Motion(MotionError::LimitExceeded {
                    position,
                    limit: limits.nearest(position),
                })
            })?,
            None => position,
        };
        in_range(position)
    }

    // Observers

    /// True when on target with the ramp back at rest.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.pos == self.target_pos && self.accel_steps == 0
    }

    /// Position in full steps (rounded toward negative infinity mid-step).
    #[inline]
    pub fn position(&self) -> i32 {
        self.pos >> self.micro
    }

    /// Position in micro-steps of the current level.
    #[inline]
    pub fn raw_position(&self) -> i32 {
        self.pos
    }

    /// Target position in full steps.
    #[inline]
    pub fn target_position(&self) -> i32 {
        self.target_pos >> self.micro
    }

    /// Current micro-step level (`2^level` micro-steps per full step).
    #[inline]
    pub fn micro_level(&self) -> u8 {
        self.micro
    }

    /// Highest micro-step level this stepper may select.
    #[inline]
    pub fn max_micro_level(&self) -> u8 {
        self.top_micro
    }

    /// Direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current ramp phase.
    #[inline]
    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    /// Steps since the ramp left rest.
    #[inline]
    pub fn accel_steps(&self) -> u32 {
        self.accel_steps
    }

    /// Current fixed-point shift of the delay state.
    #[inline]
    pub fn shift(&self) -> u8 {
        self.delays.shift()
    }

    /// Last returned delay in ticks.
    #[inline]
    pub fn delay(&self) -> u32 {
        self.last_event.delay()
    }

    /// Last event returned by [`advance`](Stepper::advance).
    #[inline]
    pub fn last_event(&self) -> StepEvent {
        self.last_event
    }

    /// Minimum full-step delay in ticks (the speed ceiling).
    #[inline]
    pub fn target_delay(&self) -> u32 {
        self.delays.ticks(self.delays.target, 0)
    }

    /// Configured speed ceiling.
    #[inline]
    pub fn target_speed(&self) -> StepsPerSec {
        self.target_speed
    }

    /// Configured acceleration.
    #[inline]
    pub fn acceleration(&self) -> StepsPerSecSquared {
        self.acceleration
    }

    /// Timer ticks per second.
    #[inline]
    pub fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    /// Speed of the last step in full steps per second, 0 when not stepping.
    pub fn speed(&self) -> f32 {
        match self.last_event {
            StepEvent::Stepped { delay } => {
                self.tick_hz as f32 / (delay as f32 * (1u32 << self.micro) as f32)
            }
            _ => 0.0,
        }
    }
}

fn in_range(position: i32) -> Result<i32> {
    if position > POSITION_LIMIT {
        return Err(Error::Motion(MotionError::LimitExceeded {
            position,
            limit: POSITION_LIMIT,
        }));
    }
    if position < -POSITION_LIMIT {
        return Err(Error::Motion(MotionError::LimitExceeded {
            position,
            limit: -POSITION_LIMIT,
        }));
    }
    Ok(position)
}
