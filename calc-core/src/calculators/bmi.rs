//! Body mass index.
//!
//! Metric input is centimetres and kilograms, imperial input is inches and
//! pounds:
//!
//! ```text
//! metric:   bmi = kg / m²
//! imperial: bmi = 703 × lb / in²
//! ```
//!
//! The healthy weight range is the weight that would give a BMI of 18.5 to
//! 24.9 at the entered height, reported in the active unit system.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_to;
use crate::units::{
    CM_PER_INCH, KG_PER_POUND, UnitConvertible, UnitSystem, cm_to_inches, inches_to_cm,
    kg_to_pounds, pounds_to_kg,
};
use crate::validation::{Bounds, FieldSpec, RawInput};

const IMPERIAL_FACTOR: f64 = 703.0;

const HEIGHT_CM: Bounds = Bounds::new(50.0, 275.0);
const HEIGHT_IN: Bounds = HEIGHT_CM.divided_by(CM_PER_INCH);
const WEIGHT_KG: Bounds = Bounds::new(2.0, 635.0);
const WEIGHT_LB: Bounds = WEIGHT_KG.divided_by(KG_PER_POUND);

const HEALTHY_MIN: f64 = 18.5;
const HEALTHY_MAX: f64 = 24.9;

static SCHEMA: [FieldSpec; 3] = [
    FieldSpec::choice("units", "Units", UnitSystem::NAMES),
    FieldSpec::number("height", "Height (cm or in)", None, None),
    FieldSpec::number("weight", "Weight (kg or lb)", None, None),
];

choice_enum! {
    /// Weight category for an adult BMI.
    pub enum BmiCategory ("BMI category") {
        Underweight => "Underweight",
        Normal => "Normal weight",
        Overweight => "Overweight",
        Obese => "Obese",
    }
}

impl BmiCategory {
    /// Category for a BMI value. Boundaries belong to the upper category.
    ///
    /// ```
    /// use calc_core::calculators::bmi::BmiCategory;
    ///
    /// assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
    /// assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
    /// assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    /// ```
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiInput {
    pub units: UnitSystem,
    /// Centimetres (metric) or inches (imperial).
    pub height: f64,
    /// Kilograms (metric) or pounds (imperial).
    pub weight: f64,
}

impl Default for BmiInput {
    fn default() -> Self {
        Self {
            units: UnitSystem::Metric,
            height: 170.0,
            weight: 70.0,
        }
    }
}

impl UnitConvertible for BmiInput {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn convert_units(
        &mut self,
        to: UnitSystem,
    ) {
        match (self.units, to) {
            (UnitSystem::Metric, UnitSystem::Imperial) => {
                self.height = cm_to_inches(self.height);
                self.weight = kg_to_pounds(self.weight);
            }
            (UnitSystem::Imperial, UnitSystem::Metric) => {
                self.height = inches_to_cm(self.height);
                self.weight = pounds_to_kg(self.weight);
            }
            _ => {}
        }
        self.units = to;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: BmiCategory,
    pub units: UnitSystem,
    /// Lowest healthy weight at this height, in the input's weight unit.
    pub healthy_min: f64,
    pub healthy_max: f64,
}

/// BMI from a height and weight in the given unit system.
pub fn bmi(
    units: UnitSystem,
    height: f64,
    weight: f64,
) -> f64 {
    match units {
        UnitSystem::Metric => {
            let meters = height / 100.0;
            weight / (meters * meters)
        }
        UnitSystem::Imperial => IMPERIAL_FACTOR * weight / (height * height),
    }
}

/// Weight giving `target` BMI at `height`, in the unit system's weight unit.
fn weight_for(
    units: UnitSystem,
    height: f64,
    target: f64,
) -> f64 {
    match units {
        UnitSystem::Metric => {
            let meters = height / 100.0;
            target * meters * meters
        }
        UnitSystem::Imperial => target * height * height / IMPERIAL_FACTOR,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BmiCalculator;

impl Calculator for BmiCalculator {
    type Input = BmiInput;
    type Output = BmiResult;

    const ID: &'static str = "bmi";
    const TITLE: &'static str = "BMI Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<BmiInput, CalcError> {
        let units = raw.choice_or("units", UnitSystem::Metric)?;
        let mut defaults = BmiInput::default();
        defaults.convert_units(units);
        Ok(BmiInput {
            units,
            height: raw.number_or("height", round_to(defaults.height, 1))?,
            weight: raw.number_or("weight", round_to(defaults.weight, 1))?,
        })
    }

    fn validate(input: &BmiInput) -> Result<(), CalcError> {
        let (height, weight) = match input.units {
            UnitSystem::Metric => (HEIGHT_CM, WEIGHT_KG),
            UnitSystem::Imperial => (HEIGHT_IN, WEIGHT_LB),
        };
        height.check("height", input.height)?;
        weight.check("weight", input.weight)?;
        Ok(())
    }

    fn compute(input: &BmiInput) -> Result<BmiResult, CalcError> {
        let value = bmi(input.units, input.height, input.weight);

        Ok(BmiResult {
            bmi: value,
            category: BmiCategory::from_bmi(value),
            units: input.units,
            healthy_min: weight_for(input.units, input.height, HEALTHY_MIN),
            healthy_max: weight_for(input.units, input.height, HEALTHY_MAX),
        })
    }

    fn fields(output: &BmiResult) -> Vec<ResultField> {
        let weight_unit = match output.units {
            UnitSystem::Metric => "kg",
            UnitSystem::Imperial => "lb",
        };
        vec![
            ResultField::number("bmi", output.bmi).with_unit("kg/m²"),
            ResultField::text("category", output.category.as_str()),
            ResultField::number("healthy_min", output.healthy_min).with_unit(weight_unit),
            ResultField::number("healthy_max", output.healthy_max).with_unit(weight_unit),
        ]
    }

    fn chart(output: &BmiResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Gauge, "BMI")
                .x_axis("", [output.category.as_str()])
                .series("bmi", vec![round_to(output.bmi, 1)])
                .marker(BmiCategory::Underweight.as_str(), 0.0)
                .marker(BmiCategory::Normal.as_str(), 18.5)
                .marker(BmiCategory::Overweight.as_str(), 25.0)
                .marker(BmiCategory::Obese.as_str(), 30.0),
        )
    }
}
