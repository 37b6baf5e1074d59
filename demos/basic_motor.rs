//! Basic motor control example.
//!
//! Builds a driver from a TOML axis description, enables it and runs a
//! couple of moves, printing what the ramp did.
//!
//! This example uses stand-in pins so it runs without real hardware.

use stepper_ramp::{
    config::units::StepsPerSec, MicrostepPins, StepEvent, StepperDriverBuilder, SystemConfig,
};

/// Mock delay provider for demonstration.
struct MockDelay {
    total_ns: u64,
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        // In real code, this would use a hardware timer
        self.total_ns += u64::from(ns);
    }
}

/// Mock output pin for demonstration.
struct MockPin {
    state: bool,
}

impl MockPin {
    fn new() -> Self {
        Self { state: false }
    }
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state = true;
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state = false;
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

fn main() {
    println!("=== Basic Motor Control Example ===\n");

    let toml_content = r#"
[axes.x]
name = "x_axis"
acceleration_steps_per_sec2 = 20000.0
target_speed_steps_per_sec = 10000.0
smooth_delay_ticks = 700
max_microsteps = 32

[axes.x.limits]
min_steps = -2000
max_steps = 2000
policy = "clamp"

[axes.z]
name = "z_axis"
acceleration_steps_per_sec2 = 2000.0
target_speed_steps_per_sec = 1000.0
smooth_delay_ticks = 300
max_microsteps = 8
invert_direction = true
"#;

    let config: SystemConfig =
        stepper_ramp::parse_config(toml_content).expect("Failed to parse config");
    println!("Loaded configuration with {} axis(es)", config.axes.len());
    for name in config.axis_names() {
        println!("  - {}", name);
    }

    stepper_ramp::validate_config(&config).expect("Configuration validation failed");
    println!("Configuration validated successfully!");

    // Build the x axis with all three mode pins wired
    let driver = StepperDriverBuilder::new()
        .from_config(&config, "x")
        .expect("Axis not found")
        .step_pin(MockPin::new())
        .dir_pin(MockPin::new())
        .enable_pin(MockPin::new())
        .microstep(MicrostepPins::new(MockPin::new(), MockPin::new(), MockPin::new()))
        .delay(MockDelay { total_ns: 0 })
        .build()
        .expect("Failed to build driver");

    println!("\nDriver created: {}", driver.name());
    println!("Initial position: {} steps", driver.position());
    println!("State: {}", driver.state_name());

    let mut driver = driver.enable().map_err(|(_, e)| e).expect("Failed to enable");
    println!("State: {}", driver.state_name());

    // A plain move
    println!("\n=== Move to 1500 ===");
    let pulses = driver.run_to(1500).expect("Move failed");
    println!("Pulses: {}", pulses);
    println!("Position: {} steps", driver.position());

    // Soft limits clamp the target
    println!("\n=== Move to 5000 (clamped) ===");
    let target = driver.set_target_position(5000).expect("Target rejected");
    println!("Target actually set: {}", target);
    driver.run_to_completion().expect("Move failed");
    println!("Position: {} steps", driver.position());

    // Retarget and slow down mid-run
    println!("\n=== Back to 0, slowing down halfway ===");
    driver.set_target_position(0).expect("Target rejected");
    let mut reversals = 0;
    loop {
        match driver.step().expect("Step failed") {
            StepEvent::Idle => break,
            StepEvent::Reversed { .. } => reversals += 1,
            StepEvent::Stepped { .. } => {}
        }
        if driver.position() == 1000 {
            driver
                .set_target_speed(StepsPerSec(2000.0))
                .expect("Speed rejected");
        }
    }
    println!("Reversals: {}", reversals);
    println!("Position: {} steps", driver.position());

    let driver = driver.disable().map_err(|(_, e)| e).expect("Failed to disable");
    let (_, _, _, _, delay, stepper) = driver.release();
    println!("\nMotor time: {:.3} s", delay.total_ns as f64 / 1e9);
    println!("Final micro-step level: {}", stepper.micro_level());

    println!("\n=== Example Complete ===");
}
