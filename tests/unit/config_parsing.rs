//! Unit tests for TOML configuration parsing.

use stepper_ramp::config::{load_config, parse_config, LimitPolicy, SystemConfig};
use stepper_ramp::config::units::Microsteps;
use stepper_ramp::error::{ConfigError, Error};
use stepper_ramp::Stepper;

/// Test parsing a valid axis configuration from TOML.
#[test]
fn test_parse_axis_config() {
    let toml_str = r#"
[axes.x]
name = "carriage"
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700
max_microsteps = 16
invert_direction = true
"#;

    let config: SystemConfig = toml::from_str(toml_str).expect("Failed to parse TOML");
    let axis = config.axis("x").expect("Axis not found");

    assert_eq!(axis.name.as_str(), "carriage");
    assert_eq!(axis.acceleration.0, 20000.0);
    assert_eq!(axis.target_speed.0, 10000.0);
    assert_eq!(axis.smooth_delay.0, 700);
    assert_eq!(axis.max_microsteps, Microsteps::SIXTEENTH);
    assert_eq!(axis.tick_hz, 1_000_000);
    assert!(axis.invert_direction);
    assert!(axis.enable_active_low);
    assert!(axis.limits.is_none());
}

/// Test parsing several axes keeps their order.
#[test]
fn test_parse_multiple_axes() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700

[axes.y]
acceleration_steps_per_sec2 = 2000.0
target_speed_steps_per_sec = 1000.0
smooth_delay_ticks = 300
tick_hz = 16000000
enable_active_low = false
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let names: Vec<&str> = config.axis_names().collect();
    assert_eq!(names, ["x", "y"]);

    let y = config.axis("y").expect("Axis not found");
    assert_eq!(y.tick_hz, 16_000_000);
    assert!(!y.enable_active_low);
    assert!(config.axis("z").is_none());
}

/// Test parsing an axis with soft limits.
#[test]
fn test_parse_axis_with_limits() {
    let toml_str = r#"
[axes.x]
name = "limited_axis"
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700

[axes.x.limits]
min_steps = -1800
max_steps = 1800
policy = "clamp"
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let axis = config.axis("x").expect("Axis not found");

    let limits = axis.limits.as_ref().expect("Limits not found");
    assert_eq!(limits.min, -1800);
    assert_eq!(limits.max, 1800);
    assert_eq!(limits.policy, LimitPolicy::Clamp);

    let mut stepper = Stepper::new(axis).expect("Failed to build stepper");
    assert_eq!(stepper.set_target_position(5000), Ok(1800));
}

/// Test that the limit policy defaults to reject.
#[test]
fn test_limit_policy_defaults_to_reject() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700

[axes.x.limits]
min_steps = 0
max_steps = 100
"#;

    let config = parse_config(toml_str).expect("Failed to parse config");
    let limits = config.axis("x").unwrap().limits.unwrap();
    assert_eq!(limits.policy, LimitPolicy::Reject);
}

/// Test that invalid microstep values are rejected during parsing.
#[test]
fn test_invalid_microsteps_rejected() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700
max_microsteps = 12
"#;

    let result: Result<SystemConfig, _> = toml::from_str(toml_str);
    assert!(result.is_err(), "Should reject non-power-of-2 microsteps");
}

/// Test that a missing required field is a parse error.
#[test]
fn test_missing_field_rejected() {
    let toml_str = r#"
[axes.x]
acceleration_steps_per_sec2 = 20000.0
smooth_delay_ticks = 700
"#;

    assert!(matches!(
        parse_config(toml_str),
        Err(Error::Config(ConfigError::ParseError(_)))
    ));
}

/// Test loading a configuration file from disk.
#[test]
fn test_load_config_file() {
    let path = std::env::temp_dir().join("stepper_ramp_load_config_test.toml");
    std::fs::write(
        &path,
        r#"
[axes.spindle]
acceleration_steps_per_sec2 = 500.0
target_speed_steps_per_sec = 200.0
smooth_delay_ticks = 3000
"#,
    )
    .expect("Failed to write config file");

    let config = load_config(&path).expect("Failed to load config");
    std::fs::remove_file(&path).ok();

    let axis = config.axis("spindle").expect("Axis not found");
    assert_eq!(axis.smooth_delay.0, 3000);
}
