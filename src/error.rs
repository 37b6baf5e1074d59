//! Error types for stepper-ramp library.
//!
//! Provides unified error handling across configuration, motor hardware, and motion control.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-ramp operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor hardware error
    Motor(MotorError),
    /// Motion command error
    Motion(MotionError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32)
    InvalidMicrosteps(u16),
    /// Axis name not found in configuration
    AxisNotFound(heapless::String<32>),
    /// Acceleration must be finite, > 0, and large enough for the delay range
    InvalidAcceleration(f32),
    /// Target speed must be finite, > 0, and representable as a delay of at least one tick
    InvalidTargetSpeed(f32),
    /// Smooth delay must be > 0 and within the delay range
    InvalidSmoothDelay(u32),
    /// Timer tick rate must be > 0
    InvalidTickRate(u32),
    /// Invalid soft limits (min must be < max)
    InvalidSoftLimits {
        /// Minimum limit value
        min: i32,
        /// Maximum limit value
        max: i32,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor hardware errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// Micro-step level cannot be selected on this driver
    UnsupportedMicrostep(u8),
}

/// Motion command errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Operation requires the stepper to be at rest
    NotStopped,
    /// Position exceeds soft limits or the representable range
    LimitExceeded {
        /// Requested position in full steps
        position: i32,
        /// Limit that was exceeded (min or max)
        limit: i32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32", v)
            }
            ConfigError::AxisNotFound(name) => write!(f, "Axis '{}' not found", name),
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "Invalid acceleration: {} steps/s². Must be > 0 and within delay range", v)
            }
            ConfigError::InvalidTargetSpeed(v) => {
                write!(f, "Invalid target speed: {} steps/s. Must be > 0 and at most one step per tick", v)
            }
            ConfigError::InvalidSmoothDelay(v) => {
                write!(f, "Invalid smooth delay: {} ticks. Must be > 0 and within delay range", v)
            }
            ConfigError::InvalidTickRate(v) => write!(f, "Invalid tick rate: {} Hz. Must be > 0", v),
            ConfigError::InvalidSoftLimits { min, max } => {
                write!(f, "Invalid soft limits: min ({}) must be < max ({})", min, max)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::UnsupportedMicrostep(level) => {
                write!(f, "Micro-step level {} not supported by driver", level)
            }
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::NotStopped => write!(f, "Stepper must be at rest"),
            MotionError::LimitExceeded { position, limit } => {
                write!(f, "Position {} exceeds limit {}", position, limit)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
