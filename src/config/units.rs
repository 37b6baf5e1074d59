//! Unit types for physical quantities.
//!
//! Provides type-safe representations of speeds, accelerations, timer delays,
//! and micro-step resolution to prevent unit confusion at compile time.

use serde::Deserialize;

use crate::error::ConfigError;

/// Speed in full steps per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSec(pub f32);

impl StepsPerSec {
    /// Delay between two full steps at this speed, in timer ticks.
    ///
    /// Returns `None` for non-positive or non-finite speeds.
    #[inline]
    pub fn to_delay(self, tick_hz: u32) -> Option<f32> {
        if self.0.is_finite() && self.0 > 0.0 {
            Some(tick_hz as f32 / self.0)
        } else {
            None
        }
    }
}

/// Acceleration in full steps per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSecSquared(pub f32);

impl StepsPerSecSquared {
    /// Full-step delay of the first step from rest, in timer ticks: `tick_hz · √(1/a)`,
    /// evaluated as `tick_hz / √a`.
    ///
    /// Returns `None` for non-positive or non-finite accelerations.
    #[inline]
    pub fn to_base_delay(self, tick_hz: u32) -> Option<f32> {
        if self.0.is_finite() && self.0 > 0.0 {
            Some(tick_hz as f32 / libm::sqrtf(self.0))
        } else {
            None
        }
    }
}

/// Time interval in timer ticks (microseconds with the default tick rate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct Ticks(pub u32);

impl Ticks {
    /// Convert to nanoseconds for a timer running at `tick_hz`.
    #[inline]
    pub fn to_nanos(self, tick_hz: u32) -> u64 {
        u64::from(self.0) * 1_000_000_000 / u64::from(tick_hz.max(1))
    }
}

/// Micro-step divisor (1, 2, 4, 8, 16, 32).
///
/// Validated at construction to be a power of 2 within the valid range.
/// The divisor `2^m` corresponds to micro-step level `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Microsteps(u16);

impl Microsteps {
    /// Full step (no microstepping).
    pub const FULL: Self = Self(1);
    /// Half step.
    pub const HALF: Self = Self(2);
    /// Quarter step.
    pub const QUARTER: Self = Self(4);
    /// Eighth step.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth step.
    pub const SIXTEENTH: Self = Self(16);
    /// Thirty-second step (maximum resolution).
    pub const THIRTY_SECOND: Self = Self(32);

    /// Valid microstep values.
    const VALID_VALUES: [u16; 6] = [1, 2, 4, 8, 16, 32];

    /// Create a new Microsteps value with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMicrosteps` if the value is not a valid power of 2.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if Self::VALID_VALUES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Create from a micro-step level (divisor `2^level`).
    pub fn from_level(level: u8) -> Result<Self, ConfigError> {
        let value = 1u32.checked_shl(u32::from(level)).unwrap_or(0);
        Self::new(u16::try_from(value).unwrap_or(0))
    }

    /// Get the raw divisor value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Get the micro-step level (log2 of the divisor).
    #[inline]
    pub const fn level(self) -> u8 {
        self.0.trailing_zeros() as u8
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::THIRTY_SECOND
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to StepsPerSec.
    fn steps_per_sec(self) -> StepsPerSec;
    /// Convert to StepsPerSecSquared.
    fn steps_per_sec_squared(self) -> StepsPerSecSquared;
}

impl UnitExt for f32 {
    #[inline]
    fn steps_per_sec(self) -> StepsPerSec {
        StepsPerSec(self)
    }

    #[inline]
    fn steps_per_sec_squared(self) -> StepsPerSecSquared {
        StepsPerSecSquared(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsteps_valid_values() {
        for &v in &Microsteps::VALID_VALUES {
            assert!(Microsteps::new(v).is_ok());
        }
    }

    #[test]
    fn test_microsteps_invalid_values() {
        assert!(Microsteps::new(0).is_err());
        assert!(Microsteps::new(3).is_err());
        assert!(Microsteps::new(17).is_err());
        assert!(Microsteps::new(64).is_err());
    }

    #[test]
    fn test_microsteps_level() {
        assert_eq!(Microsteps::FULL.level(), 0);
        assert_eq!(Microsteps::EIGHTH.level(), 3);
        assert_eq!(Microsteps::THIRTY_SECOND.level(), 5);
        assert_eq!(Microsteps::from_level(4).unwrap(), Microsteps::SIXTEENTH);
        assert!(Microsteps::from_level(6).is_err());
    }

    #[test]
    fn test_base_delay() {
        // 1e6 * sqrt(1 / 1e4) = 10_000 us
        let d = StepsPerSecSquared(1.0e4).to_base_delay(1_000_000).unwrap();
        assert!((d - 10_000.0).abs() < 0.5);
        assert!(StepsPerSecSquared(0.0).to_base_delay(1_000_000).is_none());
        assert!(StepsPerSecSquared(f32::NAN).to_base_delay(1_000_000).is_none());
    }

    #[test]
    fn test_speed_to_delay() {
        let d = StepsPerSec(2000.0).to_delay(1_000_000).unwrap();
        assert!((d - 500.0).abs() < 0.01);
        assert!(StepsPerSec(-1.0).to_delay(1_000_000).is_none());
    }

    #[test]
    fn test_unit_ext() {
        assert_eq!(1500.0f32.steps_per_sec(), StepsPerSec(1500.0));
        assert_eq!(2.0e4f32.steps_per_sec_squared(), StepsPerSecSquared(2.0e4));
    }

    #[test]
    fn test_ticks_to_nanos() {
        assert_eq!(Ticks(250).to_nanos(1_000_000), 250_000);
        assert_eq!(Ticks(3).to_nanos(16_000_000), 187);
    }
}
