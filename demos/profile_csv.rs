//! Ramp profile as CSV.
//!
//! Simulates a 600-step move, reversing to -100 halfway and raising the
//! speed on the way back, and writes one row per step to stdout:
//!
//! ```text
//! cargo run --example profile_csv > profile.csv
//! ```

use std::io;

use stepper_ramp::config::units::{StepsPerSec, StepsPerSecSquared, Ticks};
use stepper_ramp::simulation::{Command, Simulation, Trigger};
use stepper_ramp::Stepper;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stepper = Stepper::with_params(
        StepsPerSecSquared(2000.0),
        StepsPerSec(1000.0),
        Ticks(300),
    )?;
    stepper.set_target_position(600)?;

    let trace = Simulation::new(stepper)
        .schedule(Trigger::AtPosition(300), Command::TargetPosition(-100))
        .schedule(Trigger::AtPosition(-50), Command::TargetSpeed(StepsPerSec(1500.0)))
        .run()?;

    trace.write_csv(io::stdout().lock())?;

    eprintln!(
        "{} steps in {:.3} s, completed: {}",
        trace.moves(),
        trace.total_secs(),
        trace.completed()
    );
    Ok(())
}
