//! Army circumference-based body fat estimate.
//!
//! ```text
//! male:   86.010 × log10(waist − neck) − 70.041 × log10(height) + 36.76
//! female: 163.205 × log10(waist + hip − neck) − 97.684 × log10(height) − 78.387
//! ```
//!
//! Circumferences and height are taken in centimetres; imperial entries are
//! converted at 2.54 cm per inch before the formula is applied. The estimate
//! is compared with the maximum allowed for the person's age group.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_to;
use crate::units::{CM_PER_INCH, UnitConvertible, UnitSystem, cm_to_inches, inches_to_cm};
use crate::validation::{Bounds, FieldSpec, RawInput};

const AGE: Bounds = Bounds::new(17.0, 120.0);

struct Limits {
    height: Bounds,
    neck: Bounds,
    waist: Bounds,
    hip: Bounds,
}

const METRIC_LIMITS: Limits = Limits {
    height: Bounds::new(50.0, 275.0),
    neck: Bounds::new(20.0, 80.0),
    waist: Bounds::new(40.0, 200.0),
    hip: Bounds::new(40.0, 200.0),
};

const IMPERIAL_LIMITS: Limits = Limits {
    height: METRIC_LIMITS.height.divided_by(CM_PER_INCH),
    neck: METRIC_LIMITS.neck.divided_by(CM_PER_INCH),
    waist: METRIC_LIMITS.waist.divided_by(CM_PER_INCH),
    hip: METRIC_LIMITS.hip.divided_by(CM_PER_INCH),
};

choice_enum! {
    pub enum Sex ("sex") {
        Male => "male" | "m",
        Female => "female" | "f",
    }
}

static SCHEMA: [FieldSpec; 7] = [
    FieldSpec::choice("sex", "Sex", Sex::NAMES),
    FieldSpec::integer("age", "Age", 17, 120),
    FieldSpec::choice("units", "Units", UnitSystem::NAMES),
    FieldSpec::number("height", "Height (cm or in)", None, None),
    FieldSpec::number("neck", "Neck (cm or in)", None, None),
    FieldSpec::number("waist", "Waist (cm or in)", None, None),
    FieldSpec::number("hip", "Hip (cm or in, female only)", None, None),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFatInput {
    pub sex: Sex,
    pub age: u32,
    pub units: UnitSystem,
    pub height: f64,
    pub neck: f64,
    pub waist: f64,
    /// Only used for the female formula.
    pub hip: f64,
}

impl Default for BodyFatInput {
    fn default() -> Self {
        Self {
            sex: Sex::Male,
            age: 30,
            units: UnitSystem::Metric,
            height: 178.0,
            neck: 38.0,
            waist: 85.0,
            hip: 95.0,
        }
    }
}

impl UnitConvertible for BodyFatInput {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn convert_units(
        &mut self,
        to: UnitSystem,
    ) {
        let convert: fn(f64) -> f64 = match (self.units, to) {
            (UnitSystem::Metric, UnitSystem::Imperial) => cm_to_inches,
            (UnitSystem::Imperial, UnitSystem::Metric) => inches_to_cm,
            _ => return,
        };
        self.height = convert(self.height);
        self.neck = convert(self.neck);
        self.waist = convert(self.waist);
        self.hip = convert(self.hip);
        self.units = to;
    }
}

/// Maximum allowed body fat percentage for an age and sex.
///
/// ```
/// use calc_core::calculators::body_fat::{max_allowed, Sex};
///
/// assert_eq!(max_allowed(Sex::Male, 20), 20.0);
/// assert_eq!(max_allowed(Sex::Male, 21), 22.0);
/// assert_eq!(max_allowed(Sex::Female, 40), 36.0);
/// ```
pub fn max_allowed(
    sex: Sex,
    age: u32,
) -> f64 {
    let bracket = match age {
        0..=20 => 0.0,
        21..=27 => 2.0,
        28..=39 => 4.0,
        _ => 6.0,
    };
    match sex {
        Sex::Male => 20.0 + bracket,
        Sex::Female => 30.0 + bracket,
    }
}

fn age_group(age: u32) -> &'static str {
    match age {
        0..=20 => "17-20",
        21..=27 => "21-27",
        28..=39 => "28-39",
        _ => "40+",
    }
}

fn log10_of(
    what: &str,
    value: f64,
) -> Result<f64, CalcError> {
    if value <= 0.0 {
        return Err(CalcError::domain(format!(
            "{what} must be greater than zero for the body fat formula"
        )));
    }
    Ok(value.log10())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyFatResult {
    pub body_fat: f64,
    pub max_allowed: f64,
    pub within_standard: bool,
    pub age_group: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyFatCalculator;

impl Calculator for BodyFatCalculator {
    type Input = BodyFatInput;
    type Output = BodyFatResult;

    const ID: &'static str = "body_fat";
    const TITLE: &'static str = "Army Body Fat Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<BodyFatInput, CalcError> {
        let units = raw.choice_or("units", UnitSystem::Metric)?;
        let mut defaults = BodyFatInput::default();
        defaults.convert_units(units);
        let age = raw.integer_or("age", i64::from(defaults.age))?;
        AGE.check("age", age as f64)?;
        Ok(BodyFatInput {
            sex: raw.choice_or("sex", defaults.sex)?,
            age: age as u32,
            units,
            height: raw.number_or("height", round_to(defaults.height, 1))?,
            neck: raw.number_or("neck", round_to(defaults.neck, 1))?,
            waist: raw.number_or("waist", round_to(defaults.waist, 1))?,
            hip: raw.number_or("hip", round_to(defaults.hip, 1))?,
        })
    }

    fn validate(input: &BodyFatInput) -> Result<(), CalcError> {
        let limits = match input.units {
            UnitSystem::Metric => &METRIC_LIMITS,
            UnitSystem::Imperial => &IMPERIAL_LIMITS,
        };
        AGE.check("age", f64::from(input.age))?;
        limits.height.check("height", input.height)?;
        limits.neck.check("neck", input.neck)?;
        limits.waist.check("waist", input.waist)?;
        if input.sex == Sex::Female {
            limits.hip.check("hip", input.hip)?;
        }
        Ok(())
    }

    fn compute(input: &BodyFatInput) -> Result<BodyFatResult, CalcError> {
        let mut cm = input.clone();
        cm.convert_units(UnitSystem::Metric);

        let body_fat = match input.sex {
            Sex::Male => {
                86.010 * log10_of("waist minus neck", cm.waist - cm.neck)?
                    - 70.041 * log10_of("height", cm.height)?
                    + 36.76
            }
            Sex::Female => {
                163.205 * log10_of("waist plus hip minus neck", cm.waist + cm.hip - cm.neck)?
                    - 97.684 * log10_of("height", cm.height)?
                    - 78.387
            }
        };
        if body_fat < 0.0 {
            return Err(CalcError::domain(
                "these measurements give a negative body fat estimate",
            ));
        }

        let max_allowed = max_allowed(input.sex, input.age);
        Ok(BodyFatResult {
            body_fat,
            max_allowed,
            within_standard: body_fat <= max_allowed,
            age_group: age_group(input.age).to_string(),
        })
    }

    fn fields(output: &BodyFatResult) -> Vec<ResultField> {
        vec![
            ResultField::number("body_fat", output.body_fat).with_unit("%"),
            ResultField::number("max_allowed", output.max_allowed).with_unit("%"),
            ResultField::flag("within_standard", output.within_standard),
            ResultField::text("age_group", output.age_group.clone()),
        ]
    }

    fn chart(output: &BodyFatResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Bar, "Body fat vs. standard")
                .x_axis("", ["Body fat", "Maximum allowed"])
                .y_axis("%")
                .series(
                    "percent",
                    vec![round_to(output.body_fat, 1), output.max_allowed],
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn male_formula() {
        let input = BodyFatInput::default();
        let expected = 86.010 * 47f64.log10() - 70.041 * 178f64.log10() + 36.76;

        let result = BodyFatCalculator::evaluate(&input).unwrap();

        assert!((result.body_fat - expected).abs() < 1e-9);
        assert_eq!(result.max_allowed, 24.0);
        assert_eq!(result.age_group, "28-39");
    }

    #[test]
    fn female_formula_uses_hip() {
        let input = BodyFatInput {
            sex: Sex::Female,
            age: 25,
            height: 165.0,
            neck: 32.0,
            waist: 70.0,
            hip: 95.0,
            ..BodyFatInput::default()
        };
        let expected = 163.205 * 133f64.log10() - 97.684 * 165f64.log10() - 78.387;

        let result = BodyFatCalculator::evaluate(&input).unwrap();

        assert!((result.body_fat - expected).abs() < 1e-9);
        assert_eq!(result.max_allowed, 32.0);
    }

    #[test]
    fn age_brackets() {
        assert_eq!(max_allowed(Sex::Male, 17), 20.0);
        assert_eq!(max_allowed(Sex::Male, 27), 22.0);
        assert_eq!(max_allowed(Sex::Male, 28), 24.0);
        assert_eq!(max_allowed(Sex::Male, 39), 24.0);
        assert_eq!(max_allowed(Sex::Male, 40), 26.0);
        assert_eq!(max_allowed(Sex::Female, 17), 30.0);
        assert_eq!(max_allowed(Sex::Female, 21), 32.0);
        assert_eq!(max_allowed(Sex::Female, 39), 34.0);
        assert_eq!(max_allowed(Sex::Female, 80), 36.0);
    }

    #[test]
    fn imperial_input_is_converted_to_centimetres() {
        let metric = BodyFatInput::default();
        let mut imperial = metric.clone();
        imperial.convert_units(UnitSystem::Imperial);

        let a = BodyFatCalculator::evaluate(&metric).unwrap().body_fat;
        let b = BodyFatCalculator::evaluate(&imperial).unwrap().body_fat;

        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn neck_wider_than_waist_is_a_domain_error() {
        let input = BodyFatInput {
            neck: 60.0,
            waist: 55.0,
            ..BodyFatInput::default()
        };

        assert!(matches!(
            BodyFatCalculator::evaluate(&input),
            Err(CalcError::Domain(_))
        ));
    }

    #[test]
    fn rejects_age_under_seventeen() {
        let input = BodyFatInput {
            age: 16,
            ..BodyFatInput::default()
        };

        assert!(matches!(
            BodyFatCalculator::evaluate(&input),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    #[test]
    fn hip_is_ignored_for_men() {
        let input = BodyFatInput {
            hip: 0.0,
            ..BodyFatInput::default()
        };

        assert!(BodyFatCalculator::evaluate(&input).is_ok());
    }

    #[test]
    fn sex_parses_short_keys() {
        assert_eq!("F".parse::<Sex>(), Ok(Sex::Female));
        assert!("x".parse::<Sex>().is_err());
    }
}
