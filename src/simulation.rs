//! Offline simulation of a ramp (std only).
//!
//! Runs a [`Stepper`] without hardware, firing target changes at chosen
//! steps or positions, and records every call as a [`Sample`]. Time is
//! simulated: the elapsed tick count is the sum of the returned delays.

use std::io::{self, Write};
use std::vec::Vec;

use crate::config::units::StepsPerSec;
use crate::error::Result;
use crate::motion::{MotionPhase, StepEvent, Stepper};

/// Default cap on simulated calls.
pub const DEFAULT_MAX_STEPS: u32 = 10_000_000;

/// When a scheduled command fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Before the call with this index (0 is the first call).
    AtStep(u32),
    /// Before the first call made at this full-step position.
    AtPosition(i32),
}

/// A target change applied during the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Set the target position in full steps.
    TargetPosition(i32),
    /// Set the speed ceiling.
    TargetSpeed(StepsPerSec),
}

/// One recorded call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Call index, from 0.
    pub index: u32,
    /// Ticks elapsed before this call.
    pub elapsed_ticks: u64,
    /// What the call did.
    pub event: StepEvent,
    /// Returned delay in ticks.
    pub delay: u32,
    /// Position in micro-steps after the call.
    pub raw_position: i32,
    /// Micro-step level after the call.
    pub micro_level: u8,
    /// Physical position in full steps, fractional while micro-stepping.
    pub position: f32,
    /// Speed of this step in full steps per second.
    pub speed: f32,
    /// Ramp phase after the call.
    pub phase: MotionPhase,
}

/// Ordered samples of a simulated run.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    samples: Vec<Sample>,
    tick_hz: u32,
    completed: bool,
}

impl Trace {
    /// All samples in call order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Total simulated time in ticks.
    pub fn total_ticks(&self) -> u64 {
        self.samples
            .last()
            .map(|s| s.elapsed_ticks + u64::from(s.delay))
            .unwrap_or(0)
    }

    /// Total simulated time in seconds.
    pub fn total_secs(&self) -> f64 {
        self.total_ticks() as f64 / f64::from(self.tick_hz.max(1))
    }

    /// Number of step pulses.
    pub fn moves(&self) -> usize {
        self.samples.iter().filter(|s| s.event.is_step()).count()
    }

    /// Delays of the step pulses, in order.
    pub fn step_delays(&self) -> Vec<u32> {
        self.samples
            .iter()
            .filter(|s| s.event.is_step())
            .map(|s| s.delay)
            .collect()
    }

    /// True if the run ended at rest rather than at the step cap.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Write the step samples as CSV: `time,pos,step,delay,micro,velocity`.
    ///
    /// `time` is in seconds at the end of the step, `step` counts pulses from 1.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "time,pos,step,delay,micro,velocity")?;
        let tick_hz = f64::from(self.tick_hz.max(1));
        let mut steps = 0u32;
        for sample in self.samples.iter().filter(|s| s.event.is_step()) {
            steps += 1;
            let time = (sample.elapsed_ticks + u64::from(sample.delay)) as f64 / tick_hz;
            writeln!(
                out,
                "{},{},{},{},{},{}",
                time, sample.position, steps, sample.delay, sample.micro_level, sample.speed
            )?;
        }
        Ok(())
    }
}

/// A ramp with a schedule of target changes.
#[derive(Debug, Clone)]
pub struct Simulation {
    stepper: Stepper,
    schedule: Vec<(Trigger, Command)>,
    max_steps: u32,
}

impl Simulation {
    /// Simulate `stepper` from its current state.
    pub fn new(stepper: Stepper) -> Self {
        Self {
            stepper,
            schedule: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Apply `command` when `trigger` is reached. Each entry fires once.
    pub fn schedule(mut self, trigger: Trigger, command: Command) -> Self {
        self.schedule.push((trigger, command));
        self
    }

    /// Stop after this many calls even if the ramp is still moving.
    pub fn max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// The simulated ramp.
    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    /// Run until the ramp rests with nothing left to fire, or the step cap.
    ///
    /// # Errors
    ///
    /// Returns the first error from a scheduled command.
    pub fn run(&mut self) -> Result<Trace> {
        let mut trace = Trace {
            samples: Vec::new(),
            tick_hz: self.stepper.tick_hz(),
            completed: false,
        };
        let mut pending = core::mem::take(&mut self.schedule);
        let mut elapsed = 0u64;

        for index in 0..self.max_steps {
            let mut i = 0;
            while i < pending.len() {
                if self.fires(pending[i].0, index) {
                    let (_, command) = pending.remove(i);
                    self.apply(command)?;
                } else {
                    i += 1;
                }
            }

            let event = self.stepper.advance();
            let delay = event.delay();
            trace.samples.push(Sample {
                index,
                elapsed_ticks: elapsed,
                event,
                delay,
                raw_position: self.stepper.raw_position(),
                micro_level: self.stepper.micro_level(),
                position: self.stepper.raw_position() as f32
                    / (1u32 << self.stepper.micro_level()) as f32,
                speed: self.stepper.speed(),
                phase: self.stepper.phase(),
            });
            elapsed += u64::from(delay);

            if event == StepEvent::Idle && !self.waiting(&pending, index) {
                trace.completed = true;
                break;
            }
        }

        Ok(trace)
    }

    fn fires(&self, trigger: Trigger, index: u32) -> bool {
        match trigger {
            Trigger::AtStep(step) => step == index,
            Trigger::AtPosition(position) => self.stepper.position() == position,
        }
    }

    // A resting ramp only moves again if a step trigger is still ahead.
    fn waiting(&self, pending: &[(Trigger, Command)], index: u32) -> bool {
        pending
            .iter()
            .any(|(trigger, _)| matches!(trigger, Trigger::AtStep(step) if *step > index))
    }

    fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::TargetPosition(position) => {
                self.stepper.set_target_position(position)?;
            }
            Command::TargetSpeed(speed) => self.stepper.set_target_speed(speed)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{StepsPerSecSquared, Ticks};

    fn stepper() -> Stepper {
        Stepper::with_params(StepsPerSecSquared(2.0e4), StepsPerSec(1.0e4), Ticks(1_000_000))
            .unwrap()
    }

    #[test]
    fn test_idle_run() {
        let trace = Simulation::new(stepper()).run().unwrap();
        assert!(trace.completed());
        assert_eq!(trace.samples().len(), 1);
        assert_eq!(trace.moves(), 0);
        assert_eq!(trace.total_ticks(), 0);
    }

    #[test]
    fn test_step_trigger_starts_move() {
        let trace = Simulation::new(stepper())
            .schedule(Trigger::AtStep(3), Command::TargetPosition(20))
            .run()
            .unwrap();

        assert!(trace.completed());
        assert_eq!(trace.moves(), 20);
        // Three idle calls before the trigger
        assert!(trace.samples()[..3].iter().all(|s| s.event == StepEvent::Idle));
        assert_eq!(trace.samples()[3].event, StepEvent::Stepped { delay: 7071 });
        assert_eq!(trace.step_delays().len(), 20);
        assert_eq!(trace.step_delays()[0], 7071);
    }

    #[test]
    fn test_position_trigger() {
        let mut s = stepper();
        s.set_target_position(1000).unwrap();
        let trace = Simulation::new(s)
            .schedule(Trigger::AtPosition(50), Command::TargetPosition(0))
            .run()
            .unwrap();

        // Braking from 50 steps of acceleration: 49 steps until the count is
        // down to one, where reversing is allowed
        let furthest = trace
            .samples()
            .iter()
            .map(|s| s.raw_position)
            .max()
            .unwrap();
        assert_eq!(furthest, 99);
        assert_eq!(trace.samples().last().unwrap().raw_position, 0);
    }

    #[test]
    fn test_step_cap() {
        let mut s = stepper();
        s.set_target_position(1000).unwrap();
        let trace = Simulation::new(s).max_steps(10).run().unwrap();
        assert!(!trace.completed());
        assert_eq!(trace.moves(), 10);
    }

    #[test]
    fn test_command_error_propagates() {
        let result = Simulation::new(stepper())
            .schedule(Trigger::AtStep(0), Command::TargetSpeed(StepsPerSec(-1.0)))
            .run();
        assert!(result.is_err());
    }

    #[test]
    fn test_csv() {
        let mut s = stepper();
        s.set_target_position(2).unwrap();
        let trace = Simulation::new(s).run().unwrap();

        let mut out = Vec::new();
        trace.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,pos,step,delay,micro,velocity");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0.007071,1,1,7071,0,"));
    }
}
