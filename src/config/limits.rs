//! Soft limit configuration and types.

use serde::Deserialize;

/// Policy for handling limit violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Reject targets that would exceed limits.
    #[default]
    Reject,
    /// Clamp target to nearest limit.
    Clamp,
}

/// Soft limits on the target position, in full steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepLimits {
    /// Minimum position in full steps.
    #[serde(rename = "min_steps")]
    pub min: i32,
    /// Maximum position in full steps.
    #[serde(rename = "max_steps")]
    pub max: i32,
    /// What to do when a limit is exceeded.
    #[serde(default)]
    pub policy: LimitPolicy,
}

impl StepLimits {
    /// Create new step limits.
    pub fn new(min: i32, max: i32, policy: LimitPolicy) -> Self {
        Self { min, max, policy }
    }

    /// Check if limits are valid (min < max).
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Check if a position is within limits.
    pub fn contains(&self, steps: i32) -> bool {
        steps >= self.min && steps <= self.max
    }

    /// The limit on the side `steps` lies beyond.
    pub fn nearest(&self, steps: i32) -> i32 {
        if steps < self.min {
            self.min
        } else {
            self.max
        }
    }

    /// Apply limit policy to a target position.
    ///
    /// Returns `Some(steps)` if valid or clamped, `None` if rejected.
    pub fn apply(&self, target: i32) -> Option<i32> {
        if self.contains(target) {
            Some(target)
        } else {
            match self.policy {
                LimitPolicy::Reject => None,
                LimitPolicy::Clamp => Some(self.nearest(target)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_limits_reject() {
        let limits = StepLimits::new(-1800, 1800, LimitPolicy::Reject);

        assert_eq!(limits.apply(0), Some(0));
        assert_eq!(limits.apply(1800), Some(1800));
        assert_eq!(limits.apply(-1800), Some(-1800));
        assert!(limits.apply(1801).is_none());
        assert!(limits.apply(-1801).is_none());
    }

    #[test]
    fn test_step_limits_clamp() {
        let limits = StepLimits::new(-1800, 1800, LimitPolicy::Clamp);

        assert_eq!(limits.apply(0), Some(0));
        assert_eq!(limits.apply(3600), Some(1800));
        assert_eq!(limits.apply(-3600), Some(-1800));
    }

    #[test]
    fn test_validity() {
        assert!(StepLimits::new(0, 1, LimitPolicy::Reject).is_valid());
        assert!(!StepLimits::new(5, 5, LimitPolicy::Clamp).is_valid());
    }
}
