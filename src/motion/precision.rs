//! Fixed-point precision manager.
//!
//! All delay-valued state is kept left-shifted by a common `shift` so the
//! largest of them sits just under [`CEILING`]. The recurrence divides by
//! `4n ± 1`; without the shift a delay of a few hundred ticks would lose most
//! of its resolution after a few thousand steps, and the ramp would stall
//! short of its target speed once `2 · delay < 4n + 1`. Values are held in
//! `u64` with the peak below `2^62`, which leaves room for `2 · delay` in the
//! recurrence and for the `4/3` growth of the first decelerating step.
//!
//! Raw tick values coming in from configuration stay `u32` and below
//! [`MAX_RAW_DELAY`].

use super::recurrence::LEVELS;

/// Exclusive upper bound for any shifted delay value.
pub const CEILING: u64 = 1 << 62;

/// Exclusive upper bound for any raw (unshifted) delay in ticks.
pub const MAX_RAW_DELAY: u32 = 1 << 30;

/// Largest shift such that `peak << shift` stays below [`CEILING`].
pub fn headroom(peak: u64) -> u8 {
    let mut peak = peak.max(1);
    let mut shift = 0;
    while peak << 1 < CEILING {
        peak <<= 1;
        shift += 1;
    }
    shift
}

/// Shift to move to from `current`, given the peak value at `current` shift.
pub fn shift_for(peak: u64, current: u8) -> u8 {
    let mut peak = peak.max(1);
    let mut shift = current;
    while peak >= CEILING && shift > 0 {
        peak >>= 1;
        shift -= 1;
    }
    shift + headroom(peak)
}

/// Rescale a value from one shift to another.
#[inline]
pub fn rescale(value: u64, from: u8, to: u8) -> u64 {
    if to >= from {
        value << (to - from)
    } else {
        value >> (from - to)
    }
}

/// Every delay-valued field of a stepper, sharing one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelaySet {
    /// Base delay per micro-step level, used when the ramp restarts from rest.
    pub base: [u64; LEVELS],
    /// Current delay, seed of the next recurrence step.
    pub current: u64,
    /// Minimum allowed delay (the speed ceiling).
    pub target: u64,
    /// Micro-stepping threshold.
    pub smooth: u64,
    shift: u8,
    top_level: u8,
}

impl DelaySet {
    /// Create from raw tick values and move to the best shift.
    ///
    /// `top_level` is the highest micro-step level in use; its base delay is
    /// the largest base delay that can become current.
    pub fn new(base: [u32; LEVELS], target: u32, smooth: u32, level: u8, top_level: u8) -> Self {
        let base = base.map(u64::from);
        let mut set = Self {
            base,
            current: base[usize::from(level)],
            target: u64::from(target),
            smooth: u64::from(smooth),
            shift: 0,
            top_level,
        };
        set.rebalance();
        set
    }

    /// Current shift.
    #[inline]
    pub fn shift(&self) -> u8 {
        self.shift
    }

    fn peak(&self) -> u64 {
        self.base[usize::from(self.top_level)]
            .max(self.current)
            .max(self.target)
            .max(self.smooth)
    }

    fn apply(&mut self, to: u8) {
        let from = self.shift;
        if from == to {
            return;
        }
        for base in self.base.iter_mut() {
            *base = rescale(*base, from, to);
        }
        self.current = rescale(self.current, from, to);
        self.target = rescale(self.target, from, to);
        self.smooth = rescale(self.smooth, from, to);
        self.shift = to;
    }

    /// Move every field to the largest shift that keeps the peak below the ceiling.
    pub fn rebalance(&mut self) {
        let to = shift_for(self.peak(), self.shift);
        self.apply(to);
    }

    /// Replace the target delay with a raw tick value, rescaling first so the
    /// new value fits.
    pub fn replace_target(&mut self, raw: u32) {
        let room = headroom(u64::from(raw));
        if self.shift > room {
            self.apply(room);
        }
        self.target = u64::from(raw) << self.shift;
        self.rebalance();
    }

    /// Replace the base delays with raw tick values and reseed the current
    /// delay from `level`. Only valid at rest.
    pub fn replace_base(&mut self, raw: [u32; LEVELS], level: u8) {
        self.apply(0);
        self.base = raw.map(u64::from);
        self.current = self.base[usize::from(level)];
        self.rebalance();
    }

    /// Convert a shifted full-step-equivalent delay to ticks per micro-step at `level`.
    ///
    /// Saturates at `u32::MAX`.
    #[inline]
    pub fn ticks(&self, value: u64, level: u8) -> u32 {
        u32::try_from(value >> level >> self.shift).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: u32) -> [u32; LEVELS] {
        [value; LEVELS]
    }

    #[test]
    fn test_headroom() {
        assert_eq!(headroom(1), 61);
        assert_eq!(headroom(CEILING - 1), 0);
        assert_eq!(headroom(CEILING >> 1), 0);
        assert_eq!(headroom((CEILING >> 1) - 1), 1);
    }

    #[test]
    fn test_shift_for_moves_down_when_over() {
        // Value at shift 4 is over the ceiling: come down until it fits
        let peak = CEILING * 3;
        let to = shift_for(peak, 4);
        assert_eq!(to, 2);
        assert!(peak >> (4 - to) < CEILING);
    }

    #[test]
    fn test_rescale_round_trip() {
        assert_eq!(rescale(700, 0, 10), 700 << 10);
        assert_eq!(rescale(700 << 10, 10, 0), 700);
        assert_eq!(rescale(5, 3, 3), 5);
    }

    #[test]
    fn test_new_uses_high_bits() {
        let set = DelaySet::new(flat(7071), 100, 700, 0, 5);
        let peak = set.base[5].max(set.target).max(set.smooth);
        assert!(peak < CEILING);
        assert!(peak >= CEILING >> 1);
        assert_eq!(set.current, set.base[0]);
        assert_eq!(set.ticks(set.target, 0), 100);
        assert_eq!(set.ticks(set.smooth, 0), 700);
    }

    #[test]
    fn test_replace_target_preserves_values() {
        let mut set = DelaySet::new(flat(7071), 100, 700, 0, 5);
        let before = set.shift();

        // A much slower target becomes the new peak
        set.replace_target(1_000_000);
        assert!(set.shift() < before);
        assert!(set.target < CEILING);
        assert_eq!(set.ticks(set.target, 0), 1_000_000);
        assert_eq!(set.ticks(set.smooth, 0), 700);
        assert_eq!(set.ticks(set.base[0], 0), 7071);

        // And back: everything shifts up again without loss of the raw values
        set.replace_target(100);
        assert_eq!(set.shift(), before);
        assert_eq!(set.ticks(set.target, 0), 100);
        assert_eq!(set.ticks(set.smooth, 0), 700);
    }

    #[test]
    fn test_replace_target_from_deep_shift() {
        // Tiny delays everywhere put the shift near the top of the range
        let mut set = DelaySet::new(flat(1), 1, 1, 0, 0);
        assert_eq!(set.shift(), 61);

        set.replace_target(1_000_000);
        assert!(set.target < CEILING);
        assert_eq!(set.ticks(set.target, 0), 1_000_000);
        assert_eq!(set.ticks(set.base[0], 0), 1);
    }

    #[test]
    fn test_replace_base() {
        let mut set = DelaySet::new(flat(7071), 100, 700, 0, 5);
        set.replace_base(flat(10_000), 2);
        assert_eq!(set.ticks(set.current, 0), 10_000);
        assert_eq!(set.ticks(set.base[3], 0), 10_000);
    }

    #[test]
    fn test_slow_target_keeps_resolution() {
        // Target a thousand times below the peak still has 40+ bits to work with
        let set = DelaySet::new(flat(100_000), 100, 700, 0, 5);
        assert!(set.target > 1 << 40);
        assert_eq!(set.ticks(set.target, 0), 100);
    }

    #[test]
    fn test_largest_raw_delay() {
        let set = DelaySet::new(flat(100), 100, MAX_RAW_DELAY - 1, 0, 0);
        assert!(set.smooth < CEILING);
        assert_eq!(set.ticks(set.smooth, 0), MAX_RAW_DELAY - 1);
        assert_eq!(set.ticks(set.target, 0), 100);
    }

    #[test]
    fn test_ticks_per_micro_step() {
        let set = DelaySet::new(flat(6400), 100, 700, 0, 0);
        assert_eq!(set.ticks(set.base[0], 3), 800);
    }
}
