//! Configuration validation.
//!
//! Every delay the ramp works with must fit in [`MAX_RAW_DELAY`] ticks before
//! it is shifted into fixed point; the checks here return the raw tick values
//! so callers validate and convert in one place.

use crate::error::{ConfigError, Error, Result};
use crate::motion::precision::MAX_RAW_DELAY;
use crate::motion::recurrence::{base_delays, LEVELS};

use super::units::{StepsPerSec, StepsPerSecSquared, Ticks};
use super::{AxisConfig, StepLimits, SystemConfig};

/// Validate a system configuration.
///
/// Checks every axis with [`validate_axis`].
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (_name, axis) in config.axes.iter() {
        validate_axis(axis)?;
    }

    Ok(())
}

/// Validate one axis configuration.
///
/// Checks:
/// - Tick rate is non-zero
/// - Acceleration, target speed and smooth delay map to delays in range
/// - Soft limits are valid (min < max)
pub fn validate_axis(config: &AxisConfig) -> Result<()> {
    check_tick_rate(config.tick_hz)?;
    check_acceleration(config.acceleration, config.tick_hz, config.top_level())?;
    check_target_speed(config.target_speed, config.tick_hz)?;
    check_smooth_delay(config.smooth_delay)?;

    if let Some(ref limits) = config.limits {
        check_limits(limits)?;
    }

    Ok(())
}

pub(crate) fn check_limits(limits: &StepLimits) -> Result<()> {
    if !limits.is_valid() {
        return Err(Error::Config(ConfigError::InvalidSoftLimits {
            min: limits.min,
            max: limits.max,
        }));
    }
    Ok(())
}

pub(crate) fn check_tick_rate(tick_hz: u32) -> Result<()> {
    if tick_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidTickRate(tick_hz)));
    }
    Ok(())
}

/// Raw per-level base delays for `acceleration`.
///
/// The full-step base delay must be at least one tick and the base delay of
/// the top micro-step level must stay below [`MAX_RAW_DELAY`].
pub(crate) fn check_acceleration(
    acceleration: StepsPerSecSquared,
    tick_hz: u32,
    top_level: u8,
) -> Result<[u32; LEVELS]> {
    let invalid = || Error::Config(ConfigError::InvalidAcceleration(acceleration.0));

    let d0 = acceleration.to_base_delay(tick_hz).ok_or_else(invalid)?;
    if d0 < 1.0 {
        return Err(invalid());
    }

    let delays = base_delays(d0);
    if delays[usize::from(top_level)] >= MAX_RAW_DELAY {
        return Err(invalid());
    }

    Ok(delays)
}

/// Raw target delay for `speed`, at least one tick and below [`MAX_RAW_DELAY`].
pub(crate) fn check_target_speed(speed: StepsPerSec, tick_hz: u32) -> Result<u32> {
    let invalid = || Error::Config(ConfigError::InvalidTargetSpeed(speed.0));

    let delay = speed.to_delay(tick_hz).ok_or_else(invalid)?;
    if !(1.0..MAX_RAW_DELAY as f32).contains(&delay) {
        return Err(invalid());
    }

    Ok(delay as u32)
}

pub(crate) fn check_smooth_delay(smooth_delay: Ticks) -> Result<u32> {
    if smooth_delay.0 == 0 || smooth_delay.0 >= MAX_RAW_DELAY {
        return Err(Error::Config(ConfigError::InvalidSmoothDelay(smooth_delay.0)));
    }
    Ok(smooth_delay.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitPolicy;

    fn make_test_config() -> AxisConfig {
        AxisConfig::new(StepsPerSecSquared(2.0e4), StepsPerSec(1.0e4), Ticks(700))
    }

    #[test]
    fn test_valid_axis() {
        assert!(validate_axis(&make_test_config()).is_ok());
    }

    #[test]
    fn test_invalid_acceleration() {
        let mut config = make_test_config();
        config.acceleration = StepsPerSecSquared(-1.0);

        let result = validate_axis(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidAcceleration(_)))
        ));
    }

    #[test]
    fn test_acceleration_too_small_for_range() {
        // 1e6 / sqrt(1e-6) = 1e9 ticks, times sqrt(32) is past the raw delay limit
        let result = check_acceleration(StepsPerSecSquared(1.0e-6), 1_000_000, 5);
        assert!(result.is_err());

        // Without micro-stepping the full-step base delay still fits
        assert!(check_acceleration(StepsPerSecSquared(1.0e-6), 1_000_000, 0).is_ok());
    }

    #[test]
    fn test_invalid_target_speed() {
        assert!(check_target_speed(StepsPerSec(0.0), 1_000_000).is_err());
        assert!(check_target_speed(StepsPerSec(f32::INFINITY), 1_000_000).is_err());
        // Faster than one step per tick
        assert!(check_target_speed(StepsPerSec(2.0e6), 1_000_000).is_err());
        assert_eq!(check_target_speed(StepsPerSec(1.0e4), 1_000_000).unwrap(), 100);
    }

    #[test]
    fn test_invalid_smooth_delay() {
        let mut config = make_test_config();
        config.smooth_delay = Ticks(0);

        assert!(matches!(
            validate_axis(&config),
            Err(Error::Config(ConfigError::InvalidSmoothDelay(0)))
        ));
    }

    #[test]
    fn test_invalid_limits() {
        let config = make_test_config().with_limits(StepLimits::new(10, -10, LimitPolicy::Clamp));

        assert!(matches!(
            validate_axis(&config),
            Err(Error::Config(ConfigError::InvalidSoftLimits { min: 10, max: -10 }))
        ));
    }

    #[test]
    fn test_zero_tick_rate() {
        let config = make_test_config().with_tick_hz(0);
        assert!(matches!(
            validate_axis(&config),
            Err(Error::Config(ConfigError::InvalidTickRate(0)))
        ));
    }
}
