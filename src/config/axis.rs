//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::StepLimits;
use super::units::{Microsteps, StepsPerSec, StepsPerSecSquared, Ticks};

/// Default timer tick rate: one tick per microsecond.
pub const DEFAULT_TICK_HZ: u32 = 1_000_000;

/// Complete configuration of one stepper axis.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    #[serde(default)]
    pub name: String<32>,

    /// Acceleration (and deceleration) in full steps per second squared.
    #[serde(rename = "acceleration_steps_per_sec2")]
    pub acceleration: StepsPerSecSquared,

    /// Initial target speed (speed ceiling) in full steps per second.
    #[serde(rename = "target_speed_steps_per_sec")]
    pub target_speed: StepsPerSec,

    /// Full-step delay the mechanism runs well at. Slower motion is micro-stepped
    /// so that per-step delays stay between this and half of it.
    #[serde(rename = "smooth_delay_ticks")]
    pub smooth_delay: Ticks,

    /// Timer ticks per second; every delay is expressed in these ticks.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Finest micro-step resolution the driver may be switched to.
    #[serde(default)]
    pub max_microsteps: Microsteps,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Driver is enabled by pulling the enable pin low.
    #[serde(default = "default_enable_active_low")]
    pub enable_active_low: bool,

    /// Optional soft limits on target positions.
    #[serde(default)]
    pub limits: Option<StepLimits>,
}

fn default_tick_hz() -> u32 {
    DEFAULT_TICK_HZ
}

fn default_enable_active_low() -> bool {
    true
}

impl AxisConfig {
    /// Create a configuration from the three motion parameters, with defaults
    /// for everything else (microsecond ticks, up to 1/32 micro-stepping).
    pub fn new(
        acceleration: StepsPerSecSquared,
        target_speed: StepsPerSec,
        smooth_delay: Ticks,
    ) -> Self {
        Self {
            name: String::new(),
            acceleration,
            target_speed,
            smooth_delay,
            tick_hz: DEFAULT_TICK_HZ,
            max_microsteps: Microsteps::default(),
            invert_direction: false,
            enable_active_low: true,
            limits: None,
        }
    }

    /// Set the timer tick rate.
    pub fn with_tick_hz(mut self, tick_hz: u32) -> Self {
        self.tick_hz = tick_hz;
        self
    }

    /// Set the finest micro-step resolution.
    pub fn with_max_microsteps(mut self, microsteps: Microsteps) -> Self {
        self.max_microsteps = microsteps;
        self
    }

    /// Set soft limits.
    pub fn with_limits(mut self, limits: StepLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Highest micro-step level the axis may use.
    #[inline]
    pub fn top_level(&self) -> u8 {
        self.max_microsteps.level()
    }
}
