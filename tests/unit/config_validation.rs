//! Unit tests for configuration validation.

use stepper_ramp::config::{validate_axis, validate_config, AxisConfig, SystemConfig};
use stepper_ramp::config::units::{Microsteps, StepsPerSec, StepsPerSecSquared, Ticks};
use stepper_ramp::error::{ConfigError, Error};
use stepper_ramp::Stepper;

fn axis() -> AxisConfig {
    AxisConfig::new(StepsPerSecSquared(2.0e4), StepsPerSec(1.0e4), Ticks(700))
}

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a non-positive acceleration.
#[test]
fn test_invalid_acceleration() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = -5.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidAcceleration(_)))
    ));
}

/// Test validation fails for a speed faster than one step per tick.
#[test]
fn test_target_speed_beyond_tick_rate() {
    let mut config = axis();
    config.target_speed = StepsPerSec(2.0e6);
    assert!(matches!(
        validate_axis(&config),
        Err(Error::Config(ConfigError::InvalidTargetSpeed(_)))
    ));

    // A faster timer makes the same speed representable
    let config = config.with_tick_hz(16_000_000);
    assert!(validate_axis(&config).is_ok());
}

/// Test that a tiny acceleration only fits without deep micro-stepping.
#[test]
fn test_acceleration_range_depends_on_micro_level() {
    // 1e6 / sqrt(1e-6) = 1e9 ticks: below the ceiling at full step only
    let mut config = axis();
    config.acceleration = StepsPerSecSquared(1.0e-6);
    assert!(validate_axis(&config).is_err());

    let config = config.with_max_microsteps(Microsteps::FULL);
    assert!(validate_axis(&config).is_ok());
}

/// Test validation fails for invalid soft limits (min >= max).
#[test]
fn test_invalid_soft_limits() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700

[axes.x.limits]
min_steps = 90
max_steps = -90
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSoftLimits { min: 90, max: -90 }))
    ));
}

/// Test that the stepper refuses what validation refuses.
#[test]
fn test_stepper_rejects_invalid_axis() {
    let mut config = axis();
    config.smooth_delay = Ticks(0);

    assert!(validate_axis(&config).is_err());
    assert!(matches!(
        Stepper::new(&config),
        Err(Error::Config(ConfigError::InvalidSmoothDelay(0)))
    ));
}

/// Test that empty configuration is valid.
#[test]
fn test_empty_config_is_valid() {
    let config = SystemConfig::default();
    assert!(validate_config(&config).is_ok());

    let parsed: SystemConfig = toml::from_str("").expect("Failed to parse TOML");
    assert_eq!(parsed.axes.len(), 0);
}
