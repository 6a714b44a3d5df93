// Comma-separated experiment data files
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

//! Experiment files hold one header line followed by `time,input,output` rows.

use std::io::{BufRead, Write};
use std::vec::Vec;

/// Header written by the temperature-control lab.
pub const DEFAULT_HEADER: &str = "Time (sec), Heater 1 (%), Temperature 1 (degC)";

/// Errors raised while reading or writing an experiment file.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A field could not be parsed as a number.
    #[error("Invalid number on line {line}")]
    Parse {
        /// One-based line number in the file.
        line: usize,
    },

    /// A row does not have exactly three fields.
    #[error("Expected 3 columns on line {line}")]
    ColumnCount {
        /// One-based line number in the file.
        line: usize,
    },

    /// The time, input and output columns have different lengths.
    #[error("Columns must have the same length")]
    LengthMismatch,
}

/// Time, input and output samples of one experiment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExperimentRecord {
    time: Vec<f64>,
    input: Vec<f64>,
    output: Vec<f64>,
}

impl ExperimentRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from three equally long columns.
    pub fn from_columns(
        time: Vec<f64>,
        input: Vec<f64>,
        output: Vec<f64>,
    ) -> Result<Self, RecordError> {
        if time.len() != input.len() || time.len() != output.len() {
            return Err(RecordError::LengthMismatch);
        }
        Ok(Self {
            time,
            input,
            output,
        })
    }

    /// Appends one sample.
    pub fn push(&mut self, time: f64, input: f64, output: f64) {
        self.time.push(time);
        self.input.push(input);
        self.output.push(output);
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Returns `true` if no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Returns the time column.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Returns the input column.
    pub fn input(&self) -> &[f64] {
        &self.input
    }

    /// Returns the output column.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Iterates over `(time, input, output)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.time
            .iter()
            .zip(&self.input)
            .zip(&self.output)
            .map(|((&t, &u), &y)| (t, u, y))
    }

    /// Writes the header line and one row per sample.
    pub fn write_csv<W: Write>(&self, mut writer: W, header: &str) -> Result<(), RecordError> {
        writeln!(writer, "{header}")?;
        for (t, u, y) in self.rows() {
            writeln!(writer, "{t},{u},{y}")?;
        }
        writer.flush()?;
        tracing::debug!(samples = self.len(), "Wrote experiment record");
        Ok(())
    }

    /// Reads a file written by [`ExperimentRecord::write_csv`]. The first line is skipped as the
    /// header; blank lines are ignored.
    pub fn read_csv<R: BufRead>(reader: R) -> Result<Self, RecordError> {
        let mut record = Self::new();
        for (index, line) in reader.lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_number = index + 1;
            let fields = line
                .split(',')
                .map(|field| field.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| RecordError::Parse { line: line_number })?;
            match fields[..] {
                [t, u, y] => record.push(t, u, y),
                _ => return Err(RecordError::ColumnCount { line: line_number }),
            }
        }
        Ok(record)
    }
}
