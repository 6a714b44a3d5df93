#![warn(missing_docs)]

//! # Classical Control Lab
//!
//! This library provides the numerical core of a classical-control teaching lab built around a DC
//! motor and a temperature-control lab: excitation signals for open-loop identification,
//! first-order-plus-dead-time (FOPDT) process models, classical PID tuning rules, and a discrete
//! PID-family controller.
//!
//! ## Features
//!
//! - Excitation signals for identification experiments:
//!   - Pseudo-random binary sequences from a linear feedback shift register, with a warm-up hold,
//!     configurable chip width and a clamped tail.
//!   - Step signals.
//!
//! - FOPDT models with a zero-order-hold discretization that can be stepped one sample at a time,
//!   standing in for the plant in closed-loop experiments.
//!
//! - Tuning rules mapping `(K, theta, tau)` and the sample period to `(Kp, Ti, Td)`:
//!   - Ziegler-Nichols reaction curve
//!   - Cohen-Coon
//!   - IAE and ITAE minimum-error-integral rules
//!
//! - A discrete PID controller in incremental (velocity) form, available both as a pure function
//!   of an explicit context and as a stateful controller.
//!
//! ## Usage
//!
//! ### Tune and run a controller
//!
//! ```rust
//! use control_lab::model::Fopdt;
//! use control_lab::pid::{PidConfig, PidController};
//! use control_lab::tuning::{ControlType, TuningRule};
//!
//! let process = Fopdt::new(1.0_f64, 10.0, 2.0).expect("Invalid process model");
//! let ts = 1.0;
//!
//! let gains = TuningRule::ZieglerNichols
//!     .tune_model(&process, ts, ControlType::Pi)
//!     .expect("Tuning failed");
//! let config = PidConfig::from_gains(gains, ts).expect("Invalid PID config");
//! let mut pid = PidController::new(config);
//!
//! let mut plant = process.discretize(ts).expect("Invalid sample time");
//! let mut measured = plant.output();
//! for _ in 0..300 {
//!     let control = pid.calculate(1.0, measured);
//!     measured = plant.step(control);
//! }
//! assert!((measured - 1.0).abs() < 1e-6);
//! ```
//!
//! ### Generate a PRBS
//!
//! ```rust
//! use control_lab::signal::create_prbs;
//!
//! let prbs = create_prbs(0.0, 5.0, 50.0, 10, 3, 500, 10).expect("Invalid PRBS configuration");
//! assert_eq!(prbs.len(), 500);
//! assert!(prbs[..=10].iter().all(|&v| v == 0.0));
//! ```
//!
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use num_traits::Float;

/// The module containing the discrete PID controller.
pub mod pid;

/// The module containing the classical tuning rules for FOPDT processes.
pub mod tuning;

/// The module containing the excitation signal generators.
pub mod signal;

/// The module containing first-order-plus-dead-time process models.
pub mod model;

/// The module containing named, validated parameter sets.
pub mod params;

/// The module for reading and writing experiment data files.
#[cfg(feature = "std")]
pub mod record;

/// Converts an `f64` literal into the working float type.
#[inline]
pub(crate) fn constant<F: Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::nan)
}

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
