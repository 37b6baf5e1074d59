//! Direction and ramp phase.

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (positive step count).
    Clockwise,
    /// Counter-clockwise (negative step count).
    CounterClockwise,
}

impl Direction {
    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Phase of the speed ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Delay shrinking toward the target delay.
    #[default]
    Accelerating,
    /// Delay growing, either braking for the target or slowing to a new speed.
    Decelerating,
    /// Running at the target delay.
    TargetSpeed,
}

impl MotionPhase {
    /// Phase for the next step.
    ///
    /// `remaining` is the signed distance to the target along the direction
    /// of travel, measured before the step. Braking takes priority once the
    /// distance is within the ramp's step count; otherwise the ramp settles
    /// into [`TargetSpeed`](MotionPhase::TargetSpeed) as soon as it crosses
    /// the target delay.
    pub fn next(self, remaining: i64, accel_steps: u32, delay: u64, target: u64) -> Self {
        if remaining <= i64::from(accel_steps) {
            return MotionPhase::Decelerating;
        }
        match self {
            MotionPhase::Accelerating if delay < target => MotionPhase::TargetSpeed,
            MotionPhase::Decelerating if delay >= target => MotionPhase::TargetSpeed,
            phase => phase,
        }
    }

    /// Phase to resume with after the target delay or position changed mid-move.
    #[inline]
    pub fn resume(delay: u64, target: u64) -> Self {
        if target > delay {
            MotionPhase::Decelerating
        } else {
            MotionPhase::Accelerating
        }
    }
}
