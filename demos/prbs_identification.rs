// Runs an open-loop identification experiment on a simulated heater and saves the data
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

//! Usage: `cargo run --example prbs_identification -- [step|prbs] [OUTPUT]`

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use control_lab::model::{suggest_sample_time, Fopdt};
use control_lab::record::{ExperimentRecord, DEFAULT_HEADER};
use control_lab::signal::{Excitation, PrbsConfigBuilder};

const AMBIENT: f64 = 25.0;
const DURATION: usize = 500;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let kind = args.next().unwrap_or_else(|| "prbs".into());
    let path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("prbs_experiment.txt"));

    // Heater power in %, switching between 45 % and 55 % around the operating point
    let excitation = match kind.as_str() {
        "step" => Excitation::lab_step(40.0, DURATION),
        "prbs" => Excitation::Prbs(
            PrbsConfigBuilder::default()
                .offset(50.0)
                .num_samples(DURATION)
                .build()?,
        ),
        other => return Err(format!("Unknown experiment `{other}`, expected step or prbs").into()),
    };
    let heater = excitation.generate()?;

    let process = Fopdt::new(0.6_f64, 150.0, 12.0)?;
    let range = suggest_sample_time(&process);
    tracing::info!(
        nominal = range.nominal,
        small = range.small,
        large = range.large,
        "Suggested sample time"
    );

    // One-second sampling as on the lab hardware; temperature is measured above ambient
    let mut plant = process.discretize(1.0)?;
    let mut record = ExperimentRecord::new();
    for (k, &power) in heater.iter().enumerate() {
        record.push(k as f64, power, AMBIENT + plant.output());
        plant.step(power);
    }

    record.write_csv(BufWriter::new(File::create(&path)?), DEFAULT_HEADER)?;
    let saved = ExperimentRecord::read_csv(BufReader::new(File::open(&path)?))?;
    tracing::info!(path = %path.display(), samples = saved.len(), "Saved experiment");

    let peak = saved.output().iter().copied().fold(f64::MIN, f64::max);
    println!(
        "{} experiment: {} samples, peak temperature {:.2} degC, written to {}",
        kind,
        saved.len(),
        peak,
        path.display()
    );
    Ok(())
}
