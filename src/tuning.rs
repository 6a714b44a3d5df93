// Classical tuning rules for first-order-plus-dead-time processes
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

//! Every rule takes the process gain `K`, dead time `theta`, time constant `tau` and the sample
//! period `Ts`, and returns standard-form gains `(Kp, Ti, Td)`.
//!
//! Sampling with a zero-order hold adds on average half a period of delay, so all rules work on
//! the corrected dead time `theta + Ts/2`.

use core::fmt::{self, Debug, Display};
use core::str::FromStr;

use num_traits::Float;

use crate::constant;
use crate::model::Fopdt;

/// Errors raised by the tuning rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum TuningError {
    /// The control type is not one of `P`, `PI` or `PID`.
    #[cfg_attr(feature = "std", error("Control type must be one of P, PI or PID"))]
    InvalidControlType,

    /// The tuning rule name is not recognized.
    #[cfg_attr(
        feature = "std",
        error("Tuning rule must be one of Ziegler-Nichols, Cohen-Coon, IAE or IAET")
    )]
    UnknownTuningRule,

    /// The process gain is zero or not finite, the time constant is not positive, or the dead
    /// time is negative.
    #[cfg_attr(feature = "std", error("Invalid first-order-plus-dead-time process model"))]
    InvalidProcessModel,

    /// The sample period is zero, negative or not finite.
    #[cfg_attr(feature = "std", error("Sample time must be finite and positive"))]
    InvalidSampleTime,
}

/// The structure of the controller a rule is asked to tune.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlType {
    /// Proportional only.
    P,
    /// Proportional-integral.
    Pi,
    /// Proportional-integral-derivative.
    Pid,
}

impl FromStr for ControlType {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("P") {
            Ok(ControlType::P)
        } else if s.eq_ignore_ascii_case("PI") {
            Ok(ControlType::Pi)
        } else if s.eq_ignore_ascii_case("PID") {
            Ok(ControlType::Pid)
        } else {
            Err(TuningError::InvalidControlType)
        }
    }
}

impl Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlType::P => "P",
            ControlType::Pi => "PI",
            ControlType::Pid => "PID",
        })
    }
}

/// Standard-form controller gains.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PidGains<F> {
    /// Proportional gain.
    pub kp: F,
    /// Integral time; infinity for a P controller.
    pub ti: F,
    /// Derivative time; zero for P and PI controllers.
    pub td: F,
}

fn check_process<F: Float>(k: F, theta: F, tau: F, ts: F) -> Result<F, TuningError> {
    if !(k.is_finite() && k != F::zero()) || !(tau.is_finite() && tau > F::zero()) {
        return Err(TuningError::InvalidProcessModel);
    }
    if !(theta.is_finite() && theta >= F::zero()) {
        return Err(TuningError::InvalidProcessModel);
    }
    if !(ts.is_finite() && ts > F::zero()) {
        return Err(TuningError::InvalidSampleTime);
    }
    Ok(theta + ts / constant(2.0))
}

fn log_gains<F: Float + Debug>(
    rule: TuningRule,
    control_type: ControlType,
    theta_corrected: F,
    gains: &PidGains<F>,
) {
    tracing::debug!(
        rule = %rule,
        control_type = %control_type,
        theta_corrected = ?theta_corrected,
        kp = ?gains.kp,
        ti = ?gains.ti,
        td = ?gains.td,
        "Tuned controller"
    );
}

/// Ziegler-Nichols reaction-curve rule.
///
/// With `theta_c = theta + Ts/2`:
///
/// | type | Kp                       | Ti            | Td            |
/// |------|--------------------------|---------------|---------------|
/// | P    | `tau / (K theta_c)`      | infinity      | 0             |
/// | PI   | `0.9 tau / (K theta_c)`  | `theta_c/0.3` | 0             |
/// | PID  | `1.2 tau / (K theta_c)`  | `2 theta_c`   | `0.5 theta_c` |
pub fn tune_ziegler_nichols<F: Float + Debug>(
    k: F,
    theta: F,
    tau: F,
    ts: F,
    control_type: ControlType,
) -> Result<PidGains<F>, TuningError> {
    let theta_c = check_process(k, theta, tau, ts)?;
    let reaction = tau / (k * theta_c);

    let gains = match control_type {
        ControlType::P => PidGains {
            kp: reaction,
            ti: F::infinity(),
            td: F::zero(),
        },
        ControlType::Pi => PidGains {
            kp: constant::<F>(0.9) * reaction,
            ti: theta_c / constant(0.3),
            td: F::zero(),
        },
        ControlType::Pid => PidGains {
            kp: constant::<F>(1.2) * reaction,
            ti: constant::<F>(2.0) * theta_c,
            td: constant::<F>(0.5) * theta_c,
        },
    };
    log_gains(TuningRule::ZieglerNichols, control_type, theta_c, &gains);
    Ok(gains)
}

/// Cohen-Coon reaction-curve rule.
///
/// With `theta_c = theta + Ts/2` and `r = theta_c / tau`:
///
/// | type | Kp                                | Ti                              | Td                     |
/// |------|-----------------------------------|---------------------------------|------------------------|
/// | P    | `tau/(K theta_c) (1 + r/3)`       | infinity                        | 0                      |
/// | PI   | `tau/(K theta_c) (0.9 + r/12)`    | `theta_c (30 + 3r)/(9 + 20r)`   | 0                      |
/// | PID  | `tau/(K theta_c) (4/3 + r/4)`     | `theta_c (32 + 6r)/(13 + 8r)`   | `4 theta_c/(11 + 2r)`  |
pub fn tune_cohen_coon<F: Float + Debug>(
    k: F,
    theta: F,
    tau: F,
    ts: F,
    control_type: ControlType,
) -> Result<PidGains<F>, TuningError> {
    let theta_c = check_process(k, theta, tau, ts)?;
    let reaction = tau / (k * theta_c);
    let r = theta_c / tau;
    let c = constant::<F>;

    let gains = match control_type {
        ControlType::P => PidGains {
            kp: reaction * (F::one() + r / c(3.0)),
            ti: F::infinity(),
            td: F::zero(),
        },
        ControlType::Pi => PidGains {
            kp: reaction * (c(0.9) + r / c(12.0)),
            ti: theta_c * (c(30.0) + c(3.0) * r) / (c(9.0) + c(20.0) * r),
            td: F::zero(),
        },
        ControlType::Pid => PidGains {
            kp: reaction * (c(4.0) / c(3.0) + r / c(4.0)),
            ti: theta_c * (c(32.0) + c(6.0) * r) / (c(13.0) + c(8.0) * r),
            td: c(4.0) * theta_c / (c(11.0) + c(2.0) * r),
        },
    };
    log_gains(TuningRule::CohenCoon, control_type, theta_c, &gains);
    Ok(gains)
}

/// Coefficients of a minimum-error-integral correlation:
/// `Kp = (a/K) r^b`, `Ti = (tau/c) r^d`, `Td = e tau r^f` with `r = theta_c / tau`.
struct ErrorIntegralTable {
    p: [f64; 2],
    pi: [f64; 4],
    pid: [f64; 6],
}

/// López et al. load-disturbance correlations for the integral of the absolute error.
const IAE_TABLE: ErrorIntegralTable = ErrorIntegralTable {
    p: [0.902, -0.985],
    pi: [0.984, -0.986, 0.608, 0.707],
    pid: [1.435, -0.921, 0.878, 0.749, 0.482, 1.137],
};

/// López et al. load-disturbance correlations for the time-weighted absolute error.
const ITAE_TABLE: ErrorIntegralTable = ErrorIntegralTable {
    p: [0.490, -1.084],
    pi: [0.859, -0.977, 0.674, 0.680],
    pid: [1.357, -0.947, 0.842, 0.738, 0.381, 0.995],
};

impl ErrorIntegralTable {
    fn gains<F: Float>(&self, k: F, tau: F, theta_c: F, control_type: ControlType) -> PidGains<F> {
        let r = theta_c / tau;
        let kp = |a: f64, b: f64| constant::<F>(a) / k * r.powf(constant(b));
        let ti = |c: f64, d: f64| tau / constant(c) * r.powf(constant(d));

        match control_type {
            ControlType::P => PidGains {
                kp: kp(self.p[0], self.p[1]),
                ti: F::infinity(),
                td: F::zero(),
            },
            ControlType::Pi => {
                let [a, b, c, d] = self.pi;
                PidGains {
                    kp: kp(a, b),
                    ti: ti(c, d),
                    td: F::zero(),
                }
            }
            ControlType::Pid => {
                let [a, b, c, d, e, f] = self.pid;
                PidGains {
                    kp: kp(a, b),
                    ti: ti(c, d),
                    td: constant::<F>(e) * tau * r.powf(constant(f)),
                }
            }
        }
    }
}

/// Minimum integral-of-absolute-error rule (López et al. correlations).
pub fn tune_iae<F: Float + Debug>(
    k: F,
    theta: F,
    tau: F,
    ts: F,
    control_type: ControlType,
) -> Result<PidGains<F>, TuningError> {
    let theta_c = check_process(k, theta, tau, ts)?;
    let gains = IAE_TABLE.gains(k, tau, theta_c, control_type);
    log_gains(TuningRule::Iae, control_type, theta_c, &gains);
    Ok(gains)
}

/// Minimum integral-of-time-weighted-absolute-error rule (López et al. correlations).
pub fn tune_iaet<F: Float + Debug>(
    k: F,
    theta: F,
    tau: F,
    ts: F,
    control_type: ControlType,
) -> Result<PidGains<F>, TuningError> {
    let theta_c = check_process(k, theta, tau, ts)?;
    let gains = ITAE_TABLE.gains(k, tau, theta_c, control_type);
    log_gains(TuningRule::Iaet, control_type, theta_c, &gains);
    Ok(gains)
}

/// The tuning rules a user can pick from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TuningRule {
    /// See [`tune_ziegler_nichols`].
    ZieglerNichols,
    /// See [`tune_cohen_coon`].
    CohenCoon,
    /// See [`tune_iae`].
    Iae,
    /// See [`tune_iaet`].
    Iaet,
}

impl FromStr for TuningRule {
    type Err = TuningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let matches = |names: &[&str]| names.iter().any(|name| s.eq_ignore_ascii_case(name));
        if matches(&["Ziegler-Nichols", "ziegler_nichols", "zn"]) {
            Ok(TuningRule::ZieglerNichols)
        } else if matches(&["Cohen-Coon", "cohen_coon", "cc"]) {
            Ok(TuningRule::CohenCoon)
        } else if matches(&["IAE"]) {
            Ok(TuningRule::Iae)
        } else if matches(&["IAET", "ITAE"]) {
            Ok(TuningRule::Iaet)
        } else {
            Err(TuningError::UnknownTuningRule)
        }
    }
}

impl Display for TuningRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TuningRule::ZieglerNichols => "Ziegler-Nichols",
            TuningRule::CohenCoon => "Cohen-Coon",
            TuningRule::Iae => "IAE",
            TuningRule::Iaet => "IAET",
        })
    }
}

impl TuningRule {
    /// Applies this rule to a process described by `(K, theta, tau)` sampled every `ts`.
    pub fn tune<F: Float + Debug>(
        self,
        k: F,
        theta: F,
        tau: F,
        ts: F,
        control_type: ControlType,
    ) -> Result<PidGains<F>, TuningError> {
        match self {
            TuningRule::ZieglerNichols => tune_ziegler_nichols(k, theta, tau, ts, control_type),
            TuningRule::CohenCoon => tune_cohen_coon(k, theta, tau, ts, control_type),
            TuningRule::Iae => tune_iae(k, theta, tau, ts, control_type),
            TuningRule::Iaet => tune_iaet(k, theta, tau, ts, control_type),
        }
    }

    /// Applies this rule to a fitted process model.
    pub fn tune_model<F: Float + Debug>(
        self,
        model: &Fopdt<F>,
        ts: F,
        control_type: ControlType,
    ) -> Result<PidGains<F>, TuningError> {
        self.tune(
            model.gain(),
            model.dead_time(),
            model.time_constant(),
            ts,
            control_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_time_correction() {
        assert_eq!(check_process(1.0, 2.0, 10.0, 1.0), Ok(2.5));
        assert_eq!(check_process(1.0, 0.0, 10.0, 0.2), Ok(0.1));
    }

    #[test]
    fn test_rejects_invalid_process() {
        assert_eq!(
            check_process(0.0, 2.0, 10.0, 1.0),
            Err(TuningError::InvalidProcessModel)
        );
        assert_eq!(
            check_process(1.0, -1.0, 10.0, 1.0),
            Err(TuningError::InvalidProcessModel)
        );
        assert_eq!(
            check_process(1.0, 2.0, 0.0, 1.0),
            Err(TuningError::InvalidProcessModel)
        );
        assert_eq!(
            check_process(1.0, 2.0, 10.0, 0.0),
            Err(TuningError::InvalidSampleTime)
        );
    }
}
