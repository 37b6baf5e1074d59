//! Micro-step level manager.
//!
//! Positions are counted in micro-steps of the current level, so changing
//! level rescales position, target and the ramp's step count together.
//! Levels only change on full-step boundaries where the rescale is exact.

/// True if `pos` (in micro-steps of `level`) lies on a full step.
#[inline]
pub fn is_aligned(pos: i32, level: u8) -> bool {
    pos & ((1i32 << level) - 1) == 0
}

/// Level the stepper should run at for the effective delay `delay`.
///
/// A level is kept while one micro-step there takes between half the smooth
/// delay and the smooth delay. Slower than that steps finer, faster steps
/// coarser. Both `delay` and `smooth` are full-step-equivalent and share a shift.
pub fn target_level(delay: u64, smooth: u64, level: u8, top_level: u8) -> u8 {
    let mut level = level;
    while level < top_level && delay >> level > smooth {
        level += 1;
    }
    while level > 0 && delay >> level < smooth >> 1 {
        level -= 1;
    }
    level
}

/// Rescale a position between levels. Exact for aligned positions.
#[inline]
pub fn scale_position(pos: i32, from: u8, to: u8) -> i32 {
    if to >= from {
        pos << (to - from)
    } else {
        pos >> (from - to)
    }
}

/// Rescale the ramp's step count between levels.
///
/// While braking the stepper stops once the count is down to one, so the
/// remaining braking distance is `accel_steps - 1`. That distance is what
/// scales with the resolution; scaling the count itself would leave the ramp
/// a step short or long after every level change. The result is therefore one
/// off from plain doubling or halving: `10` becomes `19` one level up, not `20`.
#[inline]
pub fn scale_budget(accel_steps: u32, from: u8, to: u8) -> u32 {
    if accel_steps == 0 {
        return 0;
    }
    let remaining = accel_steps - 1;
    let remaining = if to >= from {
        remaining << (to - from)
    } else {
        remaining >> (from - to)
    };
    remaining + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert!(is_aligned(0, 5));
        assert!(is_aligned(64, 5));
        assert!(is_aligned(-32, 5));
        assert!(!is_aligned(-33, 5));
        assert!(!is_aligned(2, 2));
        assert!(is_aligned(7, 0));
    }

    #[test]
    fn test_target_level_hysteresis() {
        let smooth = 700;
        // 2000 per full step: 1000 at level 1 is still above, 500 at level 2 fits
        assert_eq!(target_level(2000, smooth, 0, 5), 2);
        // Inside the band nothing moves
        assert_eq!(target_level(2000, smooth, 2, 5), 2);
        // Much faster: back to full stepping
        assert_eq!(target_level(300, smooth, 2, 5), 0);
        // Capped at the top level
        assert_eq!(target_level(1_000_000, smooth, 0, 3), 3);
    }

    #[test]
    fn test_scale_position() {
        assert_eq!(scale_position(3, 0, 5), 96);
        assert_eq!(scale_position(96, 5, 0), 3);
        assert_eq!(scale_position(-64, 3, 1), -16);
    }

    #[test]
    fn test_scale_budget_keeps_braking_distance() {
        assert_eq!(scale_budget(0, 0, 3), 0);
        assert_eq!(scale_budget(1, 0, 3), 1);
        // 9 steps of braking left become 18 at the next level
        assert_eq!(scale_budget(10, 0, 1), 19);
        assert_eq!(scale_budget(19, 1, 0), 10);
        // Not plain doubling or halving
        assert_ne!(scale_budget(10, 0, 1), 20);
        assert_eq!(scale_budget(10, 1, 0), 5);
        assert_eq!(scale_budget(5, 0, 2), 17);
    }
}
