//! Cross-calculator properties checked through the public API.
//!
//! Unit tests inside each calculator module pin individual formulas; these
//! sweep small input grids and exercise the registry and sessions the way a
//! front end would.

use calc_core::calculators::bmi::{BmiCalculator, BmiInput};
use calc_core::calculators::body_fat::{BodyFatCalculator, BodyFatInput};
use calc_core::calculators::calories::{CaloriesCalculator, CaloriesInput};
use calc_core::calculators::conversion::{Unit, UNIT_NAMES, convert};
use calc_core::calculators::mortgage::{MortgageCalculator, MortgageInput, monthly_payment};
use calc_core::calculators::sequence::{SequenceCalculator, SequenceInput, SequenceMode};
use calc_core::calculators::statistics::{
    Dispersion, StandardDeviationCalculator, StandardDeviationInput,
};
use calc_core::calculators::tip::{TipCalculator, TipInput};
use calc_core::calculators::weather::{
    DewPointCalculator, DewPointInput, HeatIndexCalculator, HeatIndexInput, WindChillCalculator,
    WindChillInput,
};
use calc_core::{
    CalcError, Calculator, CalculatorRegistry, CalculatorSession, FieldValue, RawInput,
    UnitConvertible, UnitSystem,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn bmi_is_the_same_in_both_unit_systems() {
    for height in [50.0, 150.0, 165.5, 180.0, 201.0, 275.0] {
        for weight in [2.0, 45.0, 70.0, 92.3, 140.0, 635.0] {
            let metric = BmiInput {
                units: UnitSystem::Metric,
                height,
                weight,
            };
            let mut imperial = metric.clone();
            imperial.convert_units(UnitSystem::Imperial);

            let a = BmiCalculator::evaluate(&metric).unwrap().bmi;
            let b = BmiCalculator::evaluate(&imperial).unwrap().bmi;

            // 703 rounds 1 / (0.0254² × 2.20462), so the systems agree to ~1e-4
            assert!((a - b).abs() / a < 1e-3, "{height} cm / {weight} kg: {a} vs {b}");
        }
    }
}

/// Switches a valid session to imperial and back; both must still evaluate.
fn toggles_both_ways<C>(input: C::Input)
where
    C: Calculator,
    C::Input: UnitConvertible,
{
    let mut session = CalculatorSession::<C>::with_input(input);
    assert_eq!(session.error(), None, "{} starts valid", C::ID);

    let imperial = session.set_units(UnitSystem::Imperial).map(|_| ());
    assert_eq!(imperial, Ok(()), "{} to imperial", C::ID);
    let metric = session.set_units(UnitSystem::Metric).map(|_| ());
    assert_eq!(metric, Ok(()), "{} back to metric", C::ID);
}

#[test]
fn metric_range_limits_stay_valid_in_imperial() {
    for (height, weight) in [(50.0, 2.0), (275.0, 635.0)] {
        toggles_both_ways::<BmiCalculator>(BmiInput {
            units: UnitSystem::Metric,
            height,
            weight,
        });
    }
    for height in [50.0, 275.0] {
        toggles_both_ways::<BodyFatCalculator>(BodyFatInput {
            height,
            ..BodyFatInput::default()
        });
    }
    for weight in [20.0, 635.0] {
        toggles_both_ways::<CaloriesCalculator>(CaloriesInput {
            weight,
            ..CaloriesInput::default()
        });
    }
    for temperature in [-40.0, 65.0] {
        toggles_both_ways::<HeatIndexCalculator>(HeatIndexInput {
            units: UnitSystem::Metric,
            temperature,
            humidity: 50.0,
        });
    }
    for (temperature, wind_speed) in [(-60.0, 0.0), (50.0, 240.0)] {
        toggles_both_ways::<WindChillCalculator>(WindChillInput {
            units: UnitSystem::Metric,
            temperature,
            wind_speed,
        });
    }
    for temperature in [-60.0, 60.0] {
        toggles_both_ways::<DewPointCalculator>(DewPointInput {
            units: UnitSystem::Metric,
            temperature,
            humidity: 50.0,
        });
    }
}

#[test]
fn mortgage_totals_are_consistent() {
    for rate in [0.5, 3.0, 4.5, 7.25, 12.0] {
        for years in [10, 15, 30] {
            let input = MortgageInput {
                home_price: 450_000.0,
                down_payment: 90_000.0,
                annual_rate: rate,
                years,
            };

            let result = MortgageCalculator::evaluate(&input).unwrap();

            assert_eq!(
                result.total_payment,
                result.monthly_payment * Decimal::from(result.payments)
            );
            assert_eq!(result.total_interest, result.total_payment - result.principal);
        }
    }
}

#[test]
fn mortgage_payment_rises_with_rate() {
    let payments: Vec<f64> = (0..=20)
        .map(|step| monthly_payment(240_000.0, f64::from(step) * 0.5, 360))
        .collect();

    assert!(payments.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn mortgage_reference_payment() {
    let result = MortgageCalculator::evaluate(&MortgageInput::default()).unwrap();

    assert_eq!(result.principal, dec!(240000.00));
    assert_eq!(result.monthly_payment, dec!(1216.04));
}

#[test]
fn sample_deviation_exceeds_population() {
    let datasets: [&[f64]; 4] = [
        &[1.0, 2.0],
        &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0],
        &[-3.5, 0.0, 12.25],
        &[100.0, 100.0, 100.0, 101.0],
    ];

    for values in datasets {
        let deviation = |mode| {
            StandardDeviationCalculator::evaluate(&StandardDeviationInput {
                mode,
                values: values.to_vec(),
            })
            .unwrap()
            .std_dev
        };

        assert!(
            deviation(Dispersion::Sample) > deviation(Dispersion::Population),
            "{values:?}"
        );
    }
}

#[test]
fn sequence_reference_cases() {
    let solve = |mode, terms: &[f64]| {
        SequenceCalculator::evaluate(&SequenceInput {
            mode,
            terms: terms.to_vec(),
        })
    };

    let arithmetic = solve(SequenceMode::Arithmetic, &[2.0, 4.0, 6.0, 8.0]).unwrap();
    assert_eq!((arithmetic.next_term, arithmetic.common), (10.0, 2.0));

    let geometric = solve(SequenceMode::Geometric, &[2.0, 6.0, 18.0, 54.0]).unwrap();
    assert_eq!((geometric.next_term, geometric.common), (162.0, 3.0));

    assert_eq!(
        solve(SequenceMode::Arithmetic, &[1.0, 2.0, 4.0, 7.0]),
        Err(CalcError::NotASequence {
            kind: "an arithmetic"
        })
    );
}

#[test]
fn every_conversion_round_trips() {
    let units: Vec<Unit> = UNIT_NAMES.iter().map(|name| name.parse().unwrap()).collect();

    for from in &units {
        for to in from.siblings() {
            for value in [0.0, 0.001, 0.5, 1.0, 37.5, 1234.5678] {
                let there = convert(value, *from, to).unwrap();
                let back = convert(there, to, *from).unwrap();
                let error = if value == 0.0 {
                    back.abs()
                } else {
                    (back - value).abs() / value.abs()
                };

                assert!(error < 1e-6, "{value} {from} -> {to} -> {back}");
            }
        }
    }
}

#[test]
fn wind_chill_above_threshold_is_unchanged() {
    let input = WindChillInput {
        units: UnitSystem::Imperial,
        temperature: 60.0,
        wind_speed: 10.0,
    };

    let result = WindChillCalculator::evaluate(&input).unwrap();

    assert_eq!(result.wind_chill, 60.0);
    assert!(!result.adjusted);
}

#[test]
fn tip_end_to_end() {
    let mut session = CalculatorSession::<TipCalculator>::new();
    session
        .set_input(TipInput {
            bill: dec!(100),
            tip_percent: dec!(20),
            people: 4,
        })
        .unwrap();

    let result = session.result().unwrap();
    assert_eq!(result.tip, dec!(20.00));
    assert_eq!(result.total, dec!(120.00));
    assert_eq!(result.per_person, dec!(30.00));
    assert_eq!(result.tip_per_person, dec!(5.00));
}

#[test]
fn registry_results_never_hold_non_finite_numbers() {
    let registry = CalculatorRegistry::builtin();

    for calculator in registry.iter() {
        let evaluation = calculator.evaluate(&RawInput::new()).unwrap();
        for field in &evaluation.fields {
            if let FieldValue::Number(value) = field.value {
                assert!(value.is_finite(), "{}.{}", calculator.id(), field.label);
            }
        }
    }
}

#[test]
fn one_session_failing_leaves_another_untouched() {
    let mut broken = CalculatorSession::<MortgageCalculator>::new();
    let healthy = CalculatorSession::<MortgageCalculator>::new();

    let outcome = broken
        .update(|input| input.down_payment = input.home_price)
        .map(|_| ());

    assert!(matches!(outcome, Err(CalcError::Consistency(_))));
    assert!(broken.result().is_none());
    assert!(healthy.result().is_some());
}
