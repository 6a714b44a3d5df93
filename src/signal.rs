// Excitation signals for open-loop identification experiments
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

//! A PRBS looks like this:
//!
//! ```text
//!                           ____  offset + amplitude        __________      ____
//!                          |    |                          |          |    |
//!          offset         -|----|--------                  |          |    |
//!                          |    |__________________________|          |____|
//!                          |                                                 |
//! initial_value ___________|                                                 |______
//!
//!          |-- start_time -->|                      |<- (frequency_divider + 1) per chip
//!          |------------------------------ num_samples ---------------------------->|
//! ```

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use num_traits::Float;

/// Shortest shift register accepted by the PRBS generator.
pub const MIN_REGISTER_LENGTH: usize = 2;

/// Longest shift register accepted by the PRBS generator.
pub const MAX_REGISTER_LENGTH: usize = 11;

/// Number of trailing samples forced back to the initial value.
pub const TAIL_HOLD_SAMPLES: usize = 4;

/// First feedback tap for register lengths with a dedicated entry; `k1 = length - 1` otherwise.
const FEEDBACK_TAPS: [(usize, usize); 5] = [(5, 3), (7, 4), (9, 5), (10, 7), (11, 9)];

/// A seven-stage register feeds back from four cells instead of two.
const SEVEN_STAGE_LENGTH: usize = 7;
const SEVEN_STAGE_TAPS: [usize; 4] = [1, 2, 4, 7];

/// Errors raised when a PRBS configuration is inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PrbsConfigError {
    /// The register length is outside `MIN_REGISTER_LENGTH..=MAX_REGISTER_LENGTH`.
    #[cfg_attr(feature = "std", error("Register length must be between 2 and 11"))]
    InvalidRegisterLength,

    /// `num_samples` does not exceed `start_time`, or is too short for the tail hold.
    #[cfg_attr(
        feature = "std",
        error("Number of samples must exceed the start time and be at least 4")
    )]
    InvalidSampleCount,

    /// The initial value, amplitude or offset is not finite.
    #[cfg_attr(feature = "std", error("Signal levels must be finite"))]
    InvalidLevel,
}

/// Returns the feedback taps `(k1, k2)` for a register of the given length.
pub fn feedback_taps(register_length: usize) -> (usize, usize) {
    let k1 = FEEDBACK_TAPS
        .iter()
        .find(|(length, _)| *length == register_length)
        .map_or(register_length.saturating_sub(1), |(_, k1)| *k1);
    (k1, register_length)
}

/// Parameters of a pseudo-random binary sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrbsConfig<F> {
    /// Level held before the sequence starts.
    pub initial_value: F,
    /// Half the peak-to-peak excursion around `offset`.
    pub amplitude: F,
    /// Level the sequence switches around.
    pub offset: F,
    /// Length of the shift register.
    pub register_length: usize,
    /// Each register shift is held for `frequency_divider + 1` samples.
    pub frequency_divider: usize,
    /// Total length of the generated sequence.
    pub num_samples: usize,
    /// Number of samples held at `initial_value` before the first chip.
    pub start_time: usize,
}

impl<F: Float + Debug> PrbsConfig<F> {
    /// Checks the configuration without generating anything.
    pub fn validate(&self) -> Result<(), PrbsConfigError> {
        if !(MIN_REGISTER_LENGTH..=MAX_REGISTER_LENGTH).contains(&self.register_length) {
            return Err(PrbsConfigError::InvalidRegisterLength);
        }
        if self.num_samples <= self.start_time || self.num_samples < TAIL_HOLD_SAMPLES {
            return Err(PrbsConfigError::InvalidSampleCount);
        }
        let levels = [self.initial_value, self.amplitude, self.offset];
        if !levels.iter().all(|level| level.is_finite()) {
            return Err(PrbsConfigError::InvalidLevel);
        }
        Ok(())
    }

    /// Returns the feedback taps `(k1, k2)` of the configured register.
    pub fn taps(&self) -> (usize, usize) {
        feedback_taps(self.register_length)
    }

    /// Generates the sequence.
    ///
    /// The output is fully determined by the configuration: the register is seeded with ones on
    /// every call.
    pub fn generate(&self) -> Result<Vec<F>, PrbsConfigError> {
        self.validate()?;

        let (k1, k2) = self.taps();
        let length = self.register_length;
        let num_samples = self.num_samples;

        // Covers the warm-up hold (through `start_time` itself) and the tail
        let mut sequence = vec![self.initial_value; num_samples];
        let mut register = [F::one(); MAX_REGISTER_LENGTH + 1];

        // A hold longer than the sequence fills the rest of it with the first chip
        let hold = self.frequency_divider.saturating_add(1);
        let mut index = self.start_time + 1;
        while index < num_samples {
            let chip = if length == SEVEN_STAGE_LENGTH {
                -SEVEN_STAGE_TAPS
                    .iter()
                    .fold(F::one(), |product, &tap| product * register[tap])
            } else {
                -(register[k1] * register[k2])
            };

            let level = chip * self.amplitude + self.offset;
            let end = num_samples.min(index.saturating_add(hold));
            sequence[index..end].fill(level);
            index = index.saturating_add(hold);

            register.copy_within(0..length, 1);
            register[0] = chip;
        }

        let tail = num_samples - TAIL_HOLD_SAMPLES;
        sequence[tail..].fill(self.initial_value);

        tracing::debug!(
            register_length = length,
            k1,
            k2,
            num_samples,
            "Generated PRBS"
        );
        Ok(sequence)
    }
}

/// Builder for [`PrbsConfig`], starting from the lab's usual identification settings.
#[derive(Copy, Clone, Debug)]
pub struct PrbsConfigBuilder<F> {
    config: PrbsConfig<F>,
}

impl<F: Float + Debug> Default for PrbsConfigBuilder<F> {
    fn default() -> Self {
        Self {
            config: PrbsConfig {
                initial_value: F::zero(),
                amplitude: crate::constant(5.0),
                offset: F::zero(),
                register_length: 10,
                frequency_divider: 3,
                num_samples: 500,
                start_time: 10,
            },
        }
    }
}

impl<F: Float + Debug> PrbsConfigBuilder<F> {
    /// Sets the level held before the sequence starts.
    pub fn initial_value(mut self, initial_value: F) -> Self {
        self.config.initial_value = initial_value;
        self
    }

    /// Sets the excursion around the offset.
    pub fn amplitude(mut self, amplitude: F) -> Self {
        self.config.amplitude = amplitude;
        self
    }

    /// Sets the level the sequence switches around.
    pub fn offset(mut self, offset: F) -> Self {
        self.config.offset = offset;
        self
    }

    /// Sets the shift register length.
    pub fn register_length(mut self, register_length: usize) -> Self {
        self.config.register_length = register_length;
        self
    }

    /// Sets the frequency divider.
    pub fn frequency_divider(mut self, frequency_divider: usize) -> Self {
        self.config.frequency_divider = frequency_divider;
        self
    }

    /// Sets the total number of samples.
    pub fn num_samples(mut self, num_samples: usize) -> Self {
        self.config.num_samples = num_samples;
        self
    }

    /// Sets the number of warm-up samples.
    pub fn start_time(mut self, start_time: usize) -> Self {
        self.config.start_time = start_time;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<PrbsConfig<F>, PrbsConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Generates a pseudo-random binary sequence for system identification.
///
/// # Arguments
/// - `initial_value`: Level held before the sequence starts.
/// - `amplitude`: The sequence takes the values `offset ± amplitude`.
/// - `offset`: Level the sequence switches around.
/// - `register_length`: Length of the shift register, between 2 and 11.
/// - `frequency_divider`: Each chip is held for `frequency_divider + 1` samples.
/// - `num_samples`: Length of the returned sequence.
/// - `start_time`: Number of samples held at `initial_value` before the first chip. The first chip
///   lands at index `start_time + 1`.
///
/// The last four samples are reset to `initial_value`.
pub fn create_prbs<F: Float + Debug>(
    initial_value: F,
    amplitude: F,
    offset: F,
    register_length: usize,
    frequency_divider: usize,
    num_samples: usize,
    start_time: usize,
) -> Result<Vec<F>, PrbsConfigError> {
    PrbsConfig {
        initial_value,
        amplitude,
        offset,
        register_length,
        frequency_divider,
        num_samples,
        start_time,
    }
    .generate()
}

/// Generates a step: `initial_value` before `step_time`, `step_value` from `step_time` on.
pub fn create_step<F: Float>(
    initial_value: F,
    step_value: F,
    step_time: usize,
    num_samples: usize,
) -> Vec<F> {
    let mut sequence = vec![initial_value; num_samples];
    if step_time < num_samples {
        sequence[step_time..].fill(step_value);
    }
    sequence
}

/// The input applied during an open-loop test.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Excitation<F> {
    /// A single step from `initial_value` to `step_value`.
    Step {
        /// Level before the step.
        initial_value: F,
        /// Level after the step.
        step_value: F,
        /// Index of the first sample at `step_value`.
        step_time: usize,
        /// Length of the signal.
        num_samples: usize,
    },
    /// A pseudo-random binary sequence.
    Prbs(PrbsConfig<F>),
}

impl<F: Float + Debug> Excitation<F> {
    /// A step of `step_value` after ten samples at zero, lasting `duration + 1` samples.
    pub fn lab_step(step_value: F, duration: usize) -> Self {
        Excitation::Step {
            initial_value: F::zero(),
            step_value,
            step_time: 10,
            num_samples: duration + 1,
        }
    }

    /// Generates the input sequence.
    pub fn generate(&self) -> Result<Vec<F>, PrbsConfigError> {
        match *self {
            Excitation::Step {
                initial_value,
                step_value,
                step_time,
                num_samples,
            } => Ok(create_step(initial_value, step_value, step_time, num_samples)),
            Excitation::Prbs(config) => config.generate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_taps() {
        assert_eq!(feedback_taps(5), (3, 5));
        assert_eq!(feedback_taps(7), (4, 7));
        assert_eq!(feedback_taps(9), (5, 9));
        assert_eq!(feedback_taps(10), (7, 10));
        assert_eq!(feedback_taps(11), (9, 11));

        // Lengths without an entry feed back from the two last cells
        assert_eq!(feedback_taps(2), (1, 2));
        assert_eq!(feedback_taps(6), (5, 6));
        assert_eq!(feedback_taps(8), (7, 8));
    }

    #[test]
    fn test_builder_defaults_are_valid() {
        let config = PrbsConfigBuilder::<f64>::default().build().unwrap();
        assert_eq!(config.register_length, 10);
        assert_eq!(config.frequency_divider, 3);
        assert_eq!(config.generate().unwrap().len(), 500);
    }

    #[test]
    fn test_lab_step() {
        let step = Excitation::lab_step(40.0, 20).generate().unwrap();
        assert_eq!(step.len(), 21);
        assert!(step[..10].iter().all(|&v| v == 0.0));
        assert!(step[10..].iter().all(|&v| v == 40.0));
    }
}
