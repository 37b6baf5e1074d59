//! Delay recurrence engine.
//!
//! Constant acceleration from rest puts step `n` at time `d0 · √n`, so the
//! delay of step `n` is `d0 · (√(n+1) − √n)`. A first-order Taylor expansion
//! turns that into a ratio between neighbouring delays:
//!
//! ```text
//! accelerate:  d(n+1) = d(n) · (4n − 1) / (4n + 1) = d(n) − 2·d(n) / (4n + 1)
//! decelerate:  d(n−1) = d(n) · (4n + 1) / (4n − 1) = d(n) + 2·d(n) / (4(n−1) − 1)
//! ```
//!
//! Both directions only need one multiply-by-two and one integer division,
//! and the decelerating sequence is the accelerating one played backwards,
//! which is what lets the step count double as a braking distance.

use libm::sqrtf;

/// Highest supported micro-step level (level `m` is `2^m` micro-steps per full step).
pub const MAX_MICRO: u8 = 5;

/// Number of micro-step levels, including full stepping.
pub const LEVELS: usize = MAX_MICRO as usize + 1;

/// Per-level base delays for a full-step base delay `d0`, in raw ticks.
///
/// Delays are kept full-step-equivalent: the delay of one micro-step at level
/// `m` is the stored value divided by `2^m`. The first micro-step from rest
/// covers `1/2^m` of a full step and so takes `d0 / √(2^m)`, which stored
/// full-step-equivalent is `d0 · √(2^m)`.
pub fn base_delays(d0: f32) -> [u32; LEVELS] {
    let mut delays = [0u32; LEVELS];
    for (level, delay) in delays.iter_mut().enumerate() {
        // Float to int casts saturate, out of range values are caught by validation
        *delay = (d0 * sqrtf((1u32 << level) as f32)) as u32;
    }
    delays
}

/// One accelerating step.
///
/// Returns the new `(delay, accel_steps)`. From rest (`accel_steps == 0`)
/// the delay is seeded with `base` instead of being reduced.
#[inline]
pub fn accelerate(delay: u64, accel_steps: u32, base: u64) -> (u64, u32) {
    if accel_steps == 0 {
        return (base, 1);
    }
    let delta = delay * 2 / (4 * u64::from(accel_steps) + 1);
    (delay - delta, accel_steps + 1)
}

/// One decelerating step.
///
/// Returns the new `(delay, accel_steps)`. At `accel_steps <= 1` the ramp is
/// back at rest speed: the delay collapses to `base` and the count to zero.
#[inline]
pub fn decelerate(delay: u64, accel_steps: u32, base: u64) -> (u64, u32) {
    if accel_steps <= 1 {
        return (base, 0);
    }
    let accel_steps = accel_steps - 1;
    (delay + grow(delay, accel_steps), accel_steps)
}

#[inline]
fn grow(delay: u64, accel_steps: u32) -> u64 {
    assert!(accel_steps >= 1, "deceleration below rest");
    delay * 2 / (4 * u64::from(accel_steps) - 1)
}
