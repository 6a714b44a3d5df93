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

use fixtures::test_lab;

use control_lab::pid::{PidConfig, PidConfigBuilder, PidConfigError};

mod test_pid_config {

    use core::f64;

    use super::test_lab::make_controller;
    use super::*;

    const NEW_KP: f64 = 10.0;
    // Zero and non-finite kp are invalid
    const INVALID_KP_VALUES: &[f64; 4] = &[0.0, f64::INFINITY, f64::NEG_INFINITY, f64::NAN];

    #[test]
    fn test_defaults() {
        let config = PidConfig::<f64>::default();
        assert_eq!(config.kp(), 1.0);
        assert_eq!(config.ti(), f64::INFINITY);
        assert_eq!(config.td(), 0.0);
        assert_eq!(config.ts(), 1.0);
        assert_eq!(config.output_min(), -f64::INFINITY);
        assert_eq!(config.output_max(), f64::INFINITY);
        assert!(!config.has_integral_action());
        assert!(!config.has_derivative_action());
    }

    #[test]
    fn test_new_with_disabled_terms() {
        let config = PidConfig::new(2.0, None, None, 0.5).unwrap();
        assert_eq!(config.ti(), f64::INFINITY);
        assert_eq!(config.td(), 0.0);
        assert_eq!(config.ts(), 0.5);

        // An infinite integral time is the same as no integral action
        let config = PidConfig::new(2.0, Some(f64::INFINITY), Some(0.0), 1.0).unwrap();
        assert!(!config.has_integral_action());
        assert!(!config.has_derivative_action());
    }

    #[test]
    fn test_get_and_set_kp() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config.set_kp(NEW_KP).is_ok());
        assert_eq!(config.kp(), NEW_KP);

        for it in INVALID_KP_VALUES {
            assert_eq!(
                config.set_kp(*it),
                Err(PidConfigError::InvalidProportionalGain)
            );

            // Failing to set kp should not change the value
            assert_eq!(config.kp(), NEW_KP);
        }

        // Reverse-acting loops need a negative gain
        assert!(config.set_kp(-NEW_KP).is_ok());
        assert_eq!(config.kp(), -NEW_KP);
    }

    const NEW_TI: f64 = 8.0;
    const INVALID_TI_VALUES: &[f64; 3] = &[0.0, -1.0, f64::NAN];

    #[test]
    fn test_get_and_set_ti() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config.set_ti(Some(NEW_TI)).is_ok());
        assert_eq!(config.ti(), NEW_TI);
        assert!(config.has_integral_action());

        for it in INVALID_TI_VALUES {
            assert_eq!(
                config.set_ti(Some(*it)),
                Err(PidConfigError::InvalidIntegralTime)
            );
            assert_eq!(config.ti(), NEW_TI);
        }

        assert!(config.set_ti(None).is_ok());
        assert!(!config.has_integral_action());
    }

    const NEW_TD: f64 = 1.25;
    const INVALID_TD_VALUES: &[f64; 3] = &[-1.0, f64::INFINITY, f64::NAN];

    #[test]
    fn test_get_and_set_td() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config.set_td(Some(NEW_TD)).is_ok());
        assert_eq!(config.td(), NEW_TD);
        assert!(config.has_derivative_action());

        for it in INVALID_TD_VALUES {
            assert_eq!(
                config.set_td(Some(*it)),
                Err(PidConfigError::InvalidDerivativeTime)
            );
            assert_eq!(config.td(), NEW_TD);
        }

        // Zero td is valid
        assert!(config.set_td(Some(0.0)).is_ok());
        assert!(!config.has_derivative_action());
    }

    const NEW_TS: f64 = 0.1;
    const INVALID_TS_VALUES: &[f64; 4] = &[0.0, -1.0, f64::INFINITY, f64::NAN];

    #[test]
    fn test_get_and_set_ts() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();
        assert!(config.set_ti(Some(NEW_TI)).is_ok());
        assert!(config.set_td(Some(NEW_TD)).is_ok());

        assert!(config.set_ts(NEW_TS).is_ok());
        assert_eq!(config.ts(), NEW_TS);

        // Integral and derivative times are times, not per-sample gains
        assert_eq!(config.ti(), NEW_TI);
        assert_eq!(config.td(), NEW_TD);

        for it in INVALID_TS_VALUES {
            assert_eq!(config.set_ts(*it), Err(PidConfigError::InvalidSampleTime));
            assert_eq!(config.ts(), NEW_TS);
        }
    }

    const NEW_OUTPUT_MIN: f64 = 0.0;
    const NEW_OUTPUT_MAX: f64 = 100.0;
    const INVALID_OUTPUT_LIMITS: &[(f64, f64); 5] = &[
        (2.0, -2.0),
        (0.0, 0.0),
        (f64::NAN, 0.0),
        (0.0, f64::NAN),
        (f64::NAN, f64::NAN),
    ];

    #[test]
    fn test_get_and_set_output_limits() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        assert!(config
            .set_output_limits(NEW_OUTPUT_MIN, NEW_OUTPUT_MAX)
            .is_ok());
        assert_eq!(config.output_min(), NEW_OUTPUT_MIN);
        assert_eq!(config.output_max(), NEW_OUTPUT_MAX);

        for (lb, ub) in INVALID_OUTPUT_LIMITS {
            assert_eq!(
                config.set_output_limits(*lb, *ub),
                Err(PidConfigError::InvalidOutputLimits)
            );

            // Failing to set output limits should not change the value
            assert_eq!(config.output_min(), NEW_OUTPUT_MIN);
            assert_eq!(config.output_max(), NEW_OUTPUT_MAX);
        }
    }

    #[test]
    fn test_set_gains_is_all_or_nothing() {
        let (mut pid, _) = make_controller();
        let config = pid.config_mut();

        let tuned = control_lab::tuning::PidGains {
            kp: 4.8,
            ti: 5.0,
            td: 1.25,
        };
        assert!(config.set_gains(tuned).is_ok());
        assert_eq!(config.gains(), tuned);

        let bad_td = control_lab::tuning::PidGains { td: -1.0, ..tuned };
        assert_eq!(
            config.set_gains(bad_td),
            Err(PidConfigError::InvalidDerivativeTime)
        );
        assert_eq!(config.gains(), tuned);
    }

    #[test]
    fn test_build() {
        let built = PidConfigBuilder::default()
            .kp(NEW_KP)
            .ti(NEW_TI)
            .td(NEW_TD)
            .ts(NEW_TS)
            .output_limits(NEW_OUTPUT_MIN, NEW_OUTPUT_MAX)
            .build();
        assert!(built.is_ok());

        let mut expected = PidConfig::new(NEW_KP, Some(NEW_TI), Some(NEW_TD), NEW_TS).unwrap();
        assert!(expected
            .set_output_limits(NEW_OUTPUT_MIN, NEW_OUTPUT_MAX)
            .is_ok());
        assert_eq!(built.unwrap(), expected);

        for it in INVALID_KP_VALUES {
            assert_eq!(
                PidConfigBuilder::default().kp(*it).build().map(|_| ()),
                Err(PidConfigError::InvalidProportionalGain)
            );
        }
        for it in INVALID_TI_VALUES {
            assert_eq!(
                PidConfigBuilder::default().ti(*it).build().map(|_| ()),
                Err(PidConfigError::InvalidIntegralTime)
            );
        }
        for (lb, ub) in INVALID_OUTPUT_LIMITS {
            assert_eq!(
                PidConfigBuilder::default()
                    .output_limits(*lb, *ub)
                    .build()
                    .map(|_| ()),
                Err(PidConfigError::InvalidOutputLimits)
            );
        }
    }

    #[test]
    fn test_coefficients() {
        let config = PidConfig::new(2.0, Some(4.0), Some(0.5), 1.0).unwrap();
        let (q0, q1, q2) = config.coefficients();

        // q0 = Kp (1 + Ts/Ti + Td/Ts), q1 = -Kp (1 + 2 Td/Ts), q2 = Kp Td/Ts
        assert_eq!(q0, 3.5);
        assert_eq!(q1, -4.0);
        assert_eq!(q2, 1.0);

        // Without integral or derivative action only the proportional increment is left
        let p_only = PidConfig::new(2.0, None, None, 1.0).unwrap();
        assert_eq!(p_only.coefficients(), (2.0, -2.0, 0.0));
    }
}

mod test_pid_recurrence {
    use approx::assert_relative_eq;
    use control_lab::pid::{FuncPidController, PidContext, PidController};

    use super::test_lab::*;
    use super::*;

    mod p_control {
        use super::*;

        #[test]
        fn test_pure_proportional_control() {
            let (pid, ctx) = make_controller();

            let (output, ctx) = pid.compute(ctx, 1.0, 0.5);
            assert_eq!(output, 0.5); // Assuming kp = 1.0

            // A constant error produces no further increment
            let (output, _) = pid.compute(ctx, 1.0, 0.5);
            assert_eq!(output, 0.5);
        }
    }

    mod i_control {
        use super::*;

        #[test]
        fn test_memory_update_and_integral_accumulation() {
            let config = PidConfig::new(2.0, Some(4.0), None, 1.0).unwrap();
            let mut pid = PidController::new(config);

            let first = pid.calculate(1.0, 0.0);
            assert_eq!(first, 2.5);
            assert_eq!(pid.context().last_error(), 1.0);
            assert_eq!(pid.context().second_last_error(), 0.0);
            assert_eq!(pid.output(), first);

            // Same setpoint and measurement: one more step of integral action, Kp Ts/Ti e = 0.5
            let second = pid.calculate(1.0, 0.0);
            assert_ne!(second, first);
            assert_eq!(second, 3.0);
            assert_eq!(pid.context().last_error(), 1.0);
            assert_eq!(pid.context().second_last_error(), 1.0);
        }

        #[test]
        fn test_integral_accumulation() {
            let config = PidConfig::new(1.0, Some(2.0), None, 1.0).unwrap();
            let mut pid = PidController::new(config);

            let outputs: Vec<f64> = (0..10).map(|_| pid.calculate(1.0, 0.0)).collect();

            // Output should increase as integral accumulates
            assert!(outputs.windows(2).all(|w| w[1] > w[0]));
        }

        #[test]
        fn test_saturation_and_recovery() {
            const LIMIT: f64 = 2.0;
            let config = PidConfigBuilder::default()
                .kp(1.0)
                .ti(1.0)
                .output_limits(-LIMIT, LIMIT)
                .build()
                .unwrap();
            let mut pid = PidController::new(config);

            for _ in 0..10 {
                assert_eq!(pid.calculate(10.0, 0.0), LIMIT);
            }

            // Small setpoint change in the opposite direction
            let output = pid.calculate(-0.1, 0.0);
            // Output should immediately respond by decreasing
            assert!(output < LIMIT, "Expected reversal without windup");
        }
    }

    mod d_control {
        use super::*;

        #[test]
        fn test_derivative_kick_decays() {
            let config = PidConfig::new(1.0, None, Some(1.0), 1.0).unwrap();
            let mut pid = PidController::new(config);

            // Kp (e + Td/Ts (e[k] - e[k-1])) for a unit step in the error
            assert_eq!(pid.calculate(1.0, 0.0), 2.0);
            assert_eq!(pid.calculate(1.0, 0.0), 1.0);
            assert_eq!(pid.calculate(1.0, 0.0), 1.0);
        }
    }

    #[test]
    fn test_matches_positional_form() {
        let (kp, ti, td, ts) = (1.5, 3.0, 0.4, 0.2);
        let config = PidConfig::new(kp, Some(ti), Some(td), ts).unwrap();
        let mut pid = PidController::new(config);

        let errors = [1.0, 0.8, 0.5, -0.2, -0.4, 0.1, 0.0, 0.3];
        let mut sum = 0.0;
        let mut last_error = 0.0;
        for error in errors {
            sum += error;
            let positional = kp * (error + ts / ti * sum + td / ts * (error - last_error));
            last_error = error;

            let output = pid.calculate(error, 0.0);
            assert_relative_eq!(output, positional, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_result_queries() {
        let (pid, mut ctx) = make_controller();

        for (setpoint, pv) in [
            (1.5, 0.0),
            (1.0, 1.5),
            (-1.0, 0.2),
            (0.2, -1.0),
            (-2.2, -1.0),
            (-2.0, -2.3),
        ] {
            let expected: f64;
            let previous_error = ctx.last_error();
            (expected, ctx) = pid.compute(ctx, setpoint, pv);

            assert_eq!(ctx.output(), expected);
            assert_eq!(ctx.last_error(), setpoint - pv);
            assert_eq!(ctx.second_last_error(), previous_error);
        }
    }

    #[test]
    fn test_output_within_limits() {
        let mut pid = make_stateful_controller();
        assert!(pid.config_mut().set_ti(Some(0.5)).is_ok());
        assert!(pid.config_mut().set_output_limits(0.0, 100.0).is_ok());

        for pv in [0.0, 10.0, 200.0, -50.0, 1000.0] {
            let output = pid.calculate(100.0, pv);
            assert!(output >= pid.config().output_min());
            assert!(output <= pid.config().output_max());
        }
    }

    #[test]
    fn test_bumpless_start_and_reset() {
        const HEATER_POWER: f64 = 40.0;
        let config = PidConfig::new(2.0, Some(4.0), None, 1.0).unwrap();
        let mut pid = PidController::with_context(config, PidContext::new(HEATER_POWER));

        // No error, no change from the actuator's current value
        assert_eq!(pid.calculate(25.0, 25.0), HEATER_POWER);

        let _ = pid.calculate(30.0, 25.0);
        pid.reset(HEATER_POWER);
        assert_eq!(*pid.context(), PidContext::new(HEATER_POWER));
    }

    /// Ensures the stateful controller forwards to the functional controller exactly
    #[test]
    fn test_forwarding_to_stateful_pid_numerical_equivalence() {
        let config = PidConfig::new(4.8, Some(5.0), Some(1.25), SAMPLE_TIME).unwrap();
        let func_pid = FuncPidController::new(config);
        let mut ctx = PidContext::default();
        let mut stateful_pid = PidController::new(config);

        let mut expected: f64;
        for k in 0..200usize {
            let pv = (k as f64 * 0.1).sin();
            (expected, ctx) = func_pid.compute(ctx, 1.0, pv);
            let result = stateful_pid.calculate(1.0, pv);
            assert_eq!(result, expected);
        }
    }
}
