// First-order-plus-dead-time process models
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

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use num_traits::Float;

use crate::constant;

/// Longest dead time, in samples, that [`Fopdt::discretize`] will hold in its delay line.
pub const MAX_DELAY_SAMPLES: usize = 1 << 20;

/// Errors raised when a process model parameter is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ModelError {
    /// The static gain is zero or not finite.
    #[cfg_attr(feature = "std", error("Process gain must be finite and non-zero"))]
    InvalidGain,

    /// The time constant is zero, negative or not finite.
    #[cfg_attr(feature = "std", error("Time constant must be finite and positive"))]
    InvalidTimeConstant,

    /// The dead time is negative or not finite, or spans more than [`MAX_DELAY_SAMPLES`] once
    /// discretized.
    #[cfg_attr(feature = "std", error("Dead time must be finite and non-negative"))]
    InvalidDeadTime,

    /// The sample period is zero, negative or not finite.
    #[cfg_attr(feature = "std", error("Sample time must be finite and positive"))]
    InvalidSampleTime,
}

/// A first-order-plus-dead-time process
///
/// ```text
///           K e^(-theta s)
/// G(s) = -----------------
///           tau s + 1
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fopdt<F> {
    gain: F,
    time_constant: F,
    dead_time: F,
}

impl<F: Float> Fopdt<F> {
    /// Creates a model from its static gain `K`, time constant `tau` and dead time `theta`.
    pub fn new(gain: F, time_constant: F, dead_time: F) -> Result<Self, ModelError> {
        if !gain.is_finite() || gain == F::zero() {
            return Err(ModelError::InvalidGain);
        }
        if !time_constant.is_finite() || time_constant <= F::zero() {
            return Err(ModelError::InvalidTimeConstant);
        }
        if !dead_time.is_finite() || dead_time < F::zero() {
            return Err(ModelError::InvalidDeadTime);
        }
        Ok(Self {
            gain,
            time_constant,
            dead_time,
        })
    }

    /// Returns the static gain `K`.
    pub fn gain(&self) -> F {
        self.gain
    }

    /// Returns the time constant `tau`.
    pub fn time_constant(&self) -> F {
        self.time_constant
    }

    /// Returns the dead time `theta`.
    pub fn dead_time(&self) -> F {
        self.dead_time
    }

    /// Zero-order-hold equivalent with sample period `ts`.
    ///
    /// The dead time is rounded to a whole number of samples `d`, giving
    /// `y[k+1] = a y[k] + b u[k-d]` with `a = exp(-ts/tau)` and `b = K (1 - a)`.
    ///
    /// Fails with [`ModelError::InvalidDeadTime`] if `d` exceeds [`MAX_DELAY_SAMPLES`].
    pub fn discretize(&self, ts: F) -> Result<DiscreteFopdt<F>, ModelError> {
        if !ts.is_finite() || ts <= F::zero() {
            return Err(ModelError::InvalidSampleTime);
        }
        let pole = (-ts / self.time_constant).exp();
        let delay = (self.dead_time / ts)
            .round()
            .to_usize()
            .filter(|&delay| delay <= MAX_DELAY_SAMPLES)
            .ok_or(ModelError::InvalidDeadTime)?;

        let mut delay_line = VecDeque::with_capacity(delay + 1);
        delay_line.extend(core::iter::repeat(F::zero()).take(delay));

        Ok(DiscreteFopdt {
            pole,
            input_gain: self.gain * (F::one() - pole),
            delay,
            delay_line,
            output: F::zero(),
        })
    }
}

/// Sampled FOPDT process, stepped once per sample period.
#[derive(Clone, Debug)]
pub struct DiscreteFopdt<F> {
    pole: F,
    input_gain: F,
    delay: usize,
    delay_line: VecDeque<F>,
    output: F,
}

impl<F: Float> DiscreteFopdt<F> {
    /// Returns the discrete pole `a`.
    pub fn pole(&self) -> F {
        self.pole
    }

    /// Returns the input gain `b`.
    pub fn input_gain(&self) -> F {
        self.input_gain
    }

    /// Returns the dead time in whole samples.
    pub fn delay_samples(&self) -> usize {
        self.delay
    }

    /// Returns the current output `y[k]`.
    pub fn output(&self) -> F {
        self.output
    }

    /// Holds `input` over one sample period and returns the output at the next sampling instant.
    pub fn step(&mut self, input: F) -> F {
        self.delay_line.push_back(input);
        let delayed = self.delay_line.pop_front().unwrap_or(input);
        self.output = self.pole * self.output + self.input_gain * delayed;
        self.output
    }

    /// Applies each input in turn and collects the outputs.
    pub fn simulate(&mut self, inputs: &[F]) -> Vec<F> {
        inputs.iter().map(|&input| self.step(input)).collect()
    }

    /// Returns the process to rest at `output`, clearing every input still in the delay line.
    pub fn reset(&mut self, output: F) {
        self.delay_line.iter_mut().for_each(|sample| *sample = F::zero());
        self.output = output;
    }
}

/// Range of reasonable sample periods for a process.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampleTimeRange<F> {
    /// Midpoint of the range.
    pub nominal: F,
    /// Sampling at twelve times the bandwidth.
    pub small: F,
    /// Sampling at eight times the bandwidth.
    pub large: F,
}

/// Suggests a sample period from the -3 dB bandwidth of the process.
///
/// The magnitude response is normalized by the static gain `|K|`, and the dead time does not
/// change it, so the bandwidth of a FOPDT process is `wc = 1/tau` whatever `K` is. Thresholding the
/// raw magnitude `|G(jw)|` at 0.707 instead, as the lab's sampling-time tool does, gives a different
/// `wc` whenever `|K| != 1`. The sampling frequency is chosen between `8 wc` and `12 wc`.
pub fn suggest_sample_time<F: Float>(model: &Fopdt<F>) -> SampleTimeRange<F> {
    let bandwidth = model.time_constant.recip();
    let two_pi = constant::<F>(core::f64::consts::TAU);
    let small = two_pi / (constant::<F>(12.0) * bandwidth);
    let large = two_pi / (constant::<F>(8.0) * bandwidth);
    SampleTimeRange {
        nominal: (small + large) / constant(2.0),
        small,
        large,
    }
}
