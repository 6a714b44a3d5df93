// Tunes a PI controller for the heater lab with every rule and compares the closed loops
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Usage: `cargo run --example closed_loop -- [RULE] [Kp=..] [Ti=..] [Td=..]`
//!
//! `RULE` restricts the run to one tuning rule; the `name=value` arguments override the tuned
//! gains the way the lab's parameter dialog does. An empty value restores the tuned gain.

use std::error::Error;

use control_lab::model::Fopdt;
use control_lab::params::ParameterSet;
use control_lab::pid::{PidConfig, PidController};
use control_lab::tuning::{ControlType, TuningRule};

const SAMPLE_TIME: f64 = 1.0;
const SETPOINT: f64 = 1.0;
const STEPS: usize = 200;

struct LoopSummary {
    overshoot: f64,
    integral_absolute_error: f64,
    final_error: f64,
}

fn run(config: PidConfig<f64>, process: &Fopdt<f64>) -> Result<LoopSummary, Box<dyn Error>> {
    let mut pid = PidController::new(config);
    let mut plant = process.discretize(SAMPLE_TIME)?;

    let mut measured = plant.output();
    let mut peak = measured;
    let mut integral_absolute_error = 0.0;
    for _ in 0..STEPS {
        let control = pid.calculate(SETPOINT, measured);
        measured = plant.step(control);
        peak = peak.max(measured);
        integral_absolute_error += (SETPOINT - measured).abs() * SAMPLE_TIME;
    }

    Ok(LoopSummary {
        overshoot: (peak - SETPOINT).max(0.0) / SETPOINT,
        integral_absolute_error,
        final_error: SETPOINT - measured,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1).peekable();
    let rules = match args.peek().filter(|arg| !arg.contains('=')) {
        Some(rule) => {
            let rule = rule.parse::<TuningRule>()?;
            args.next();
            vec![rule]
        }
        None => vec![
            TuningRule::ZieglerNichols,
            TuningRule::CohenCoon,
            TuningRule::Iae,
            TuningRule::Iaet,
        ],
    };
    let overrides: Vec<String> = args.collect();

    // Heater lab: 1 degC per % of heater power, 10 s lag, 2 s transport delay
    let process = Fopdt::new(1.0_f64, 10.0, 2.0)?;

    println!("{:<16} {:>8} {:>8} {:>8} {:>10} {:>8}", "rule", "Kp", "Ti", "Td", "overshoot", "IAE");
    for rule in rules {
        let gains = rule.tune_model(&process, SAMPLE_TIME, ControlType::Pi)?;

        let mut params = ParameterSet::from_gains(&gains);
        for assignment in &overrides {
            let (name, value) = assignment.split_once('=').unwrap_or((assignment.as_str(), ""));
            params.set_from_str(name, value)?;
        }
        let gains = params.to_gains()?;

        let summary = run(PidConfig::from_gains(gains, SAMPLE_TIME)?, &process)?;
        tracing::info!(rule = %rule, final_error = summary.final_error, "Closed loop finished");
        println!(
            "{:<16} {:>8.3} {:>8.3} {:>8.3} {:>9.1}% {:>8.3}",
            rule.to_string(),
            gains.kp,
            gains.ti,
            gains.td,
            100.0 * summary.overshoot,
            summary.integral_absolute_error
        );
    }
    Ok(())
}
