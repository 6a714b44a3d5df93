// Discrete PID controller in incremental (velocity) form
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

//! The controller evaluates the backward-difference PID law in incremental form once per sample
//! period `Ts`:
//!
//! ```text
//! q0 =  Kp * (1 + Ts/Ti + Td/Ts)
//! q1 = -Kp * (1 + 2*Td/Ts)
//! q2 =  Kp * Td/Ts
//!
//! u[k] = u[k-1] + q0*e[k] + q1*e[k-1] + q2*e[k-2]
//! ```
//!
//! so the only memory it needs is the previous output and the two previous errors. Integral action
//! is disabled by an infinite (or absent) `Ti`, derivative action by a zero (or absent) `Td`.

use core::fmt::Debug;

use num_traits::Float;

use crate::tuning::PidGains;

/// Errors raised when a PID configuration parameter is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// The proportional gain is zero or not finite.
    #[cfg_attr(feature = "std", error("Proportional gain must be finite and non-zero"))]
    InvalidProportionalGain,

    /// The integral time is zero, negative or NaN.
    #[cfg_attr(feature = "std", error("Integral time must be positive (or infinite to disable)"))]
    InvalidIntegralTime,

    /// The derivative time is negative or not finite.
    #[cfg_attr(feature = "std", error("Derivative time must be finite and non-negative"))]
    InvalidDerivativeTime,

    /// The sample time is zero, negative or not finite.
    #[cfg_attr(feature = "std", error("Sample time must be finite and positive"))]
    InvalidSampleTime,

    /// The output limits are NaN or not strictly ordered.
    #[cfg_attr(feature = "std", error("Output limits must satisfy min < max"))]
    InvalidOutputLimits,
}

/// Parameters of the discrete PID law in standard (ISA) form.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PidConfig<F> {
    /// Proportional gain.
    /// Defaults to 1.0.
    kp: F,

    /// Integral time. Stored as infinity when integral action is disabled.
    /// Defaults to infinity.
    ti: F,

    /// Derivative time. Stored as zero when derivative action is disabled.
    /// Defaults to 0.0.
    td: F,

    /// Sample period, in the same time unit as `ti` and `td`.
    /// Defaults to 1.0.
    ts: F,

    /// Minimum output value of the PID controller.
    /// Defaults to negative infinity, i.e. no limit.
    output_min: F,

    /// Maximum output value of the PID controller.
    /// Defaults to positive infinity, i.e. no limit.
    output_max: F,
}

impl<F: Float> Default for PidConfig<F> {
    fn default() -> Self {
        PidConfig {
            kp: F::one(),
            ti: F::infinity(),
            td: F::zero(),
            ts: F::one(),
            output_min: F::neg_infinity(),
            output_max: F::infinity(),
        }
    }
}

fn check_kp<F: Float>(kp: F) -> Result<F, PidConfigError> {
    if kp.is_finite() && kp != F::zero() {
        Ok(kp)
    } else {
        Err(PidConfigError::InvalidProportionalGain)
    }
}

fn check_ti<F: Float>(ti: Option<F>) -> Result<F, PidConfigError> {
    match ti {
        None => Ok(F::infinity()),
        Some(ti) if ti > F::zero() => Ok(ti),
        Some(_) => Err(PidConfigError::InvalidIntegralTime),
    }
}

fn check_td<F: Float>(td: Option<F>) -> Result<F, PidConfigError> {
    match td {
        None => Ok(F::zero()),
        Some(td) if td.is_finite() && td >= F::zero() => Ok(td),
        Some(_) => Err(PidConfigError::InvalidDerivativeTime),
    }
}

fn check_ts<F: Float>(ts: F) -> Result<F, PidConfigError> {
    if ts.is_finite() && ts > F::zero() {
        Ok(ts)
    } else {
        Err(PidConfigError::InvalidSampleTime)
    }
}

fn check_output_limits<F: Float>(output_min: F, output_max: F) -> Result<(F, F), PidConfigError> {
    if output_min.is_nan() || output_max.is_nan() || output_min >= output_max {
        return Err(PidConfigError::InvalidOutputLimits);
    }
    Ok((output_min, output_max))
}

impl<F: Float> PidConfig<F> {
    /// Creates a configuration from the standard-form parameters.
    ///
    /// # Arguments
    /// - `kp`: Proportional gain, finite and non-zero. Reverse-acting loops use a negative gain.
    /// - `ti`: Integral time. `None` or infinity disables integral action.
    /// - `td`: Derivative time. `None` or zero disables derivative action.
    /// - `ts`: Sample period.
    ///
    /// The output is unbounded; see [`PidConfig::set_output_limits`].
    pub fn new(kp: F, ti: Option<F>, td: Option<F>, ts: F) -> Result<Self, PidConfigError> {
        Ok(PidConfig {
            kp: check_kp(kp)?,
            ti: check_ti(ti)?,
            td: check_td(td)?,
            ts: check_ts(ts)?,
            ..Self::default()
        })
    }

    /// Creates a configuration from the result of a tuning rule.
    pub fn from_gains(gains: PidGains<F>, ts: F) -> Result<Self, PidConfigError> {
        Self::new(gains.kp, Some(gains.ti), Some(gains.td), ts)
    }

    /// Returns the proportional gain.
    pub fn kp(&self) -> F {
        self.kp
    }

    /// Returns the integral time, infinity if integral action is disabled.
    pub fn ti(&self) -> F {
        self.ti
    }

    /// Returns the derivative time, zero if derivative action is disabled.
    pub fn td(&self) -> F {
        self.td
    }

    /// Returns the sample period.
    pub fn ts(&self) -> F {
        self.ts
    }

    /// Returns the gains as a tuning result.
    pub fn gains(&self) -> PidGains<F> {
        PidGains {
            kp: self.kp,
            ti: self.ti,
            td: self.td,
        }
    }

    /// Returns the minimum output limit.
    pub fn output_min(&self) -> F {
        self.output_min
    }

    /// Returns the maximum output limit.
    pub fn output_max(&self) -> F {
        self.output_max
    }

    /// Whether the integral term contributes to the output.
    pub fn has_integral_action(&self) -> bool {
        self.ti.is_finite()
    }

    /// Whether the derivative term contributes to the output.
    pub fn has_derivative_action(&self) -> bool {
        self.td > F::zero()
    }

    /// Returns the coefficients `(q0, q1, q2)` of the incremental control law.
    pub fn coefficients(&self) -> (F, F, F) {
        let two = F::one() + F::one();
        // Ts/Ti vanishes for Ti = inf
        let integral = self.ts / self.ti;
        let derivative = self.td / self.ts;
        let q0 = self.kp * (F::one() + integral + derivative);
        let q1 = -self.kp * (F::one() + two * derivative);
        let q2 = self.kp * derivative;
        (q0, q1, q2)
    }

    /// Sets the proportional gain.
    ///
    /// # Returns
    /// - `Ok(())` if the gain was set successfully.
    /// - `Err(PidConfigError::InvalidProportionalGain)` if the gain is zero or not finite.
    pub fn set_kp(&mut self, kp: F) -> Result<(), PidConfigError> {
        self.kp = check_kp(kp)?;
        Ok(())
    }

    /// Sets the integral time. `None` disables integral action.
    pub fn set_ti(&mut self, ti: Option<F>) -> Result<(), PidConfigError> {
        self.ti = check_ti(ti)?;
        Ok(())
    }

    /// Sets the derivative time. `None` disables derivative action.
    pub fn set_td(&mut self, td: Option<F>) -> Result<(), PidConfigError> {
        self.td = check_td(td)?;
        Ok(())
    }

    /// Sets the sample period.
    ///
    /// `ti` and `td` are times, not per-sample gains, so they are left unchanged and the
    /// coefficients of the control law follow the new period.
    pub fn set_ts(&mut self, ts: F) -> Result<(), PidConfigError> {
        self.ts = check_ts(ts)?;
        Ok(())
    }

    /// Sets all three gains at once. Nothing changes unless all three are valid.
    pub fn set_gains(&mut self, gains: PidGains<F>) -> Result<(), PidConfigError> {
        let kp = check_kp(gains.kp)?;
        let ti = check_ti(Some(gains.ti))?;
        let td = check_td(Some(gains.td))?;
        self.kp = kp;
        self.ti = ti;
        self.td = td;
        Ok(())
    }

    /// Sets the minimum and maximum output limits for the PID controller.
    ///
    /// These limits may be set to infinity to disable clamping. Actuators with a physical range,
    /// such as a heater driven in percent, should set them so the stored output never leaves that
    /// range.
    ///
    /// # Returns
    /// - `Ok(())` if the limits were set successfully.
    /// - `Err(PidConfigError::InvalidOutputLimits)` if either limit is NaN or `min >= max`.
    pub fn set_output_limits(
        &mut self,
        output_min: F,
        output_max: F,
    ) -> Result<(), PidConfigError> {
        (self.output_min, self.output_max) = check_output_limits(output_min, output_max)?;
        Ok(())
    }
}

/// Fluent constructor for [`PidConfig`]; validation happens once in [`PidConfigBuilder::build`].
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<F> {
    kp: F,
    ti: Option<F>,
    td: Option<F>,
    ts: F,
    output_min: F,
    output_max: F,
}

impl<F: Float> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        let defaults = PidConfig::<F>::default();
        PidConfigBuilder {
            kp: defaults.kp,
            ti: None,
            td: None,
            ts: defaults.ts,
            output_min: defaults.output_min,
            output_max: defaults.output_max,
        }
    }
}

impl<F: Float> PidConfigBuilder<F> {
    /// Sets the proportional gain.
    pub fn kp(mut self, kp: F) -> Self {
        self.kp = kp;
        self
    }

    /// Sets the integral time.
    pub fn ti(mut self, ti: F) -> Self {
        self.ti = Some(ti);
        self
    }

    /// Sets the derivative time.
    pub fn td(mut self, td: F) -> Self {
        self.td = Some(td);
        self
    }

    /// Sets the sample period.
    pub fn ts(mut self, ts: F) -> Self {
        self.ts = ts;
        self
    }

    /// Sets the output limits.
    pub fn output_limits(mut self, output_min: F, output_max: F) -> Self {
        self.output_min = output_min;
        self.output_max = output_max;
        self
    }

    /// Validates every parameter and builds the configuration.
    pub fn build(self) -> Result<PidConfig<F>, PidConfigError> {
        let mut config = PidConfig::new(self.kp, self.ti, self.td, self.ts)?;
        config.set_output_limits(self.output_min, self.output_max)?;
        Ok(config)
    }
}

/// Recurrence memory of the incremental PID law: `u[k-1]`, `e[k-1]` and `e[k-2]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidContext<F> {
    last_output: F,
    last_error: F,
    second_last_error: F,
}

impl<F: Float> Default for PidContext<F> {
    fn default() -> Self {
        Self::new(F::zero())
    }
}

impl<F: Float> PidContext<F> {
    /// Creates a context whose previous output is `initial_output` and whose error history is
    /// zero.
    ///
    /// Starting from the actuator's current value lets a loop be closed without a bump.
    pub fn new(initial_output: F) -> Self {
        Self {
            last_output: initial_output,
            last_error: F::zero(),
            second_last_error: F::zero(),
        }
    }

    /// Returns `u[k-1]`, the last computed output.
    pub fn output(&self) -> F {
        self.last_output
    }

    /// Returns `e[k-1]`, the error seen by the last computation.
    pub fn last_error(&self) -> F {
        self.last_error
    }

    /// Returns `e[k-2]`.
    pub fn second_last_error(&self) -> F {
        self.second_last_error
    }

    /// Clears the error history and sets the previous output.
    pub fn reset(&mut self, output: F) {
        *self = Self::new(output);
    }
}

/// A functional implementation of the discrete PID controller.
///
/// The controller holds only its configuration; the recurrence memory lives in a [`PidContext`]
/// passed in and returned by every call to `compute`, which keeps `compute` pure.
#[derive(Copy, Clone, Debug)]
pub struct FuncPidController<F> {
    config: PidConfig<F>,
}

/// A stateful implementation of the discrete PID controller.
///
/// Owns its [`PidContext`] and must be called exactly once per sample period from a single
/// control loop. Loops running side by side each need their own instance.
#[derive(Copy, Clone, Debug)]
pub struct PidController<F> {
    ctx: PidContext<F>,
    controller: FuncPidController<F>,
}

impl<F: Float + Debug> FuncPidController<F> {
    /// Creates a controller from a validated configuration.
    pub fn new(config: PidConfig<F>) -> Self {
        FuncPidController { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the configuration for on-line retuning.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.config
    }

    /// Computes one step of the control law.
    ///
    /// # Arguments
    /// - `ctx`: Recurrence memory from the previous step.
    /// - `setpoint`: Target value.
    /// - `pv`: Measured process value, in the same units as `setpoint`.
    ///
    /// # Returns
    /// The control action `u[k]` and the updated context, in which `e[k-2] ← e[k-1]`,
    /// `e[k-1] ← e[k]` and `u[k-1] ← u[k]`.
    pub fn compute(&self, mut ctx: PidContext<F>, setpoint: F, pv: F) -> (F, PidContext<F>) {
        let error = setpoint - pv;
        let (q0, q1, q2) = self.config.coefficients();

        let increment = q0 * error + q1 * ctx.last_error + q2 * ctx.second_last_error;
        let unclamped = ctx.last_output + increment;

        // Clamping the stored output is what keeps the velocity form from winding up
        let output = num_traits::clamp(unclamped, self.config.output_min, self.config.output_max);
        if output != unclamped {
            tracing::debug!(requested = ?unclamped, output = ?output, "PID output saturated");
        }
        tracing::trace!(error = ?error, increment = ?increment, output = ?output, "PID step");

        ctx.second_last_error = ctx.last_error;
        ctx.last_error = error;
        ctx.last_output = output;
        (output, ctx)
    }
}

impl<F: Float + Debug> PidController<F> {
    /// Creates a controller with zero initial output and error history.
    pub fn new(config: PidConfig<F>) -> Self {
        Self::with_context(config, PidContext::default())
    }

    /// Creates a controller resuming from an existing context.
    pub fn with_context(config: PidConfig<F>, ctx: PidContext<F>) -> Self {
        Self {
            ctx,
            controller: FuncPidController::new(config),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PidConfig<F> {
        &self.controller.config
    }

    /// Returns the configuration for on-line retuning.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.controller.config
    }

    /// Returns the recurrence memory.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// Returns the last computed output.
    pub fn output(&self) -> F {
        self.ctx.output()
    }

    /// Computes the control action for this sample and updates the recurrence memory.
    pub fn calculate(&mut self, setpoint: F, pv: F) -> F {
        let (output, ctx) = self.controller.compute(self.ctx, setpoint, pv);
        self.ctx = ctx;
        output
    }

    /// Clears the error history and restarts from `output`.
    pub fn reset(&mut self, output: F) {
        self.ctx.reset(output);
    }
}
