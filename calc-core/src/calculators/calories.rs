//! Calories burned during an activity, from its MET value.
//!
//! ```text
//! calories = MET × weight (kg) × duration (h)
//! ```

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_to;
use crate::units::{KG_PER_POUND, UnitConvertible, UnitSystem, kg_to_pounds, pounds_to_kg};
use crate::validation::{Bounds, FieldSpec, RawInput};

const WEIGHT_KG: Bounds = Bounds::new(20.0, 635.0);
const WEIGHT_LB: Bounds = WEIGHT_KG.divided_by(KG_PER_POUND);
const DURATION: Bounds = Bounds::new(1.0, 1440.0);

choice_enum! {
    pub enum Activity ("activity") {
        Walking => "walking",
        Running => "running",
        Cycling => "cycling",
        Swimming => "swimming",
        Yoga => "yoga",
        Weightlifting => "weightlifting",
        Dancing => "dancing",
        Hiking => "hiking",
        Basketball => "basketball",
        Tennis => "tennis",
        Rowing => "rowing",
        JumpRope => "jump_rope" | "jump rope",
    }
}

impl Activity {
    /// Metabolic equivalent of task.
    pub fn met(&self) -> f64 {
        match self {
            Self::Walking => 3.5,
            Self::Running => 9.8,
            Self::Cycling => 7.5,
            Self::Swimming => 8.0,
            Self::Yoga => 2.5,
            Self::Weightlifting => 6.0,
            Self::Dancing => 5.5,
            Self::Hiking => 6.0,
            Self::Basketball => 6.5,
            Self::Tennis => 7.3,
            Self::Rowing => 7.0,
            Self::JumpRope => 12.3,
        }
    }
}

static SCHEMA: [FieldSpec; 4] = [
    FieldSpec::choice("activity", "Activity", Activity::NAMES),
    FieldSpec::choice("units", "Units", UnitSystem::NAMES),
    FieldSpec::number("weight", "Body weight (kg or lb)", None, None),
    FieldSpec::number("duration", "Duration", Some("min"), Some(DURATION)),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloriesInput {
    pub activity: Activity,
    pub units: UnitSystem,
    /// Kilograms (metric) or pounds (imperial).
    pub weight: f64,
    /// Minutes.
    pub duration: f64,
}

impl Default for CaloriesInput {
    fn default() -> Self {
        Self {
            activity: Activity::Walking,
            units: UnitSystem::Metric,
            weight: 70.0,
            duration: 30.0,
        }
    }
}

impl UnitConvertible for CaloriesInput {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn convert_units(
        &mut self,
        to: UnitSystem,
    ) {
        self.weight = match (self.units, to) {
            (UnitSystem::Metric, UnitSystem::Imperial) => kg_to_pounds(self.weight),
            (UnitSystem::Imperial, UnitSystem::Metric) => pounds_to_kg(self.weight),
            _ => self.weight,
        };
        self.units = to;
    }
}

/// Calories for `activity` at `weight_kg` over `minutes`.
pub fn calories_burned(
    activity: Activity,
    weight_kg: f64,
    minutes: f64,
) -> f64 {
    activity.met() * weight_kg * minutes / 60.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloriesResult {
    pub activity: Activity,
    pub met: f64,
    pub calories: f64,
    pub per_minute: f64,
    /// The same weight and duration for every activity.
    pub comparison: Vec<(Activity, f64)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CaloriesCalculator;

impl Calculator for CaloriesCalculator {
    type Input = CaloriesInput;
    type Output = CaloriesResult;

    const ID: &'static str = "calories";
    const TITLE: &'static str = "Calories Burned Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<CaloriesInput, CalcError> {
        let units = raw.choice_or("units", UnitSystem::Metric)?;
        let mut defaults = CaloriesInput::default();
        defaults.convert_units(units);
        Ok(CaloriesInput {
            activity: raw.choice_or("activity", defaults.activity)?,
            units,
            weight: raw.number_or("weight", round_to(defaults.weight, 1))?,
            duration: raw.number_or("duration", defaults.duration)?,
        })
    }

    fn validate(input: &CaloriesInput) -> Result<(), CalcError> {
        let weight = match input.units {
            UnitSystem::Metric => WEIGHT_KG,
            UnitSystem::Imperial => WEIGHT_LB,
        };
        weight.check("weight", input.weight)?;
        DURATION.check("duration", input.duration)?;
        Ok(())
    }

    fn compute(input: &CaloriesInput) -> Result<CaloriesResult, CalcError> {
        let weight_kg = match input.units {
            UnitSystem::Metric => input.weight,
            UnitSystem::Imperial => pounds_to_kg(input.weight),
        };
        let calories = calories_burned(input.activity, weight_kg, input.duration);
        let comparison = Activity::ALL
            .iter()
            .map(|a| (*a, calories_burned(*a, weight_kg, input.duration)))
            .collect();

        Ok(CaloriesResult {
            activity: input.activity,
            met: input.activity.met(),
            calories,
            per_minute: calories / input.duration,
            comparison,
        })
    }

    fn fields(output: &CaloriesResult) -> Vec<ResultField> {
        vec![
            ResultField::number("calories", output.calories).with_unit("kcal"),
            ResultField::number("per_minute", output.per_minute).with_unit("kcal/min"),
            ResultField::number("met", output.met),
        ]
    }

    fn chart(output: &CaloriesResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Bar, "Calories by activity")
                .x_axis("Activity", output.comparison.iter().map(|(a, _)| a.as_str()))
                .y_axis("kcal")
                .series(
                    "calories",
                    output.comparison.iter().map(|(_, c)| round_to(*c, 1)).collect(),
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn half_hour_walk() {
        let result = CaloriesCalculator::evaluate(&CaloriesInput::default()).unwrap();

        assert!((result.calories - 122.5).abs() < 1e-9);
        assert_eq!(result.met, 3.5);
    }

    #[test]
    fn imperial_weight_is_converted() {
        let metric = CaloriesInput {
            activity: Activity::Running,
            ..CaloriesInput::default()
        };
        let mut imperial = metric.clone();
        imperial.convert_units(UnitSystem::Imperial);

        let a = CaloriesCalculator::evaluate(&metric).unwrap().calories;
        let b = CaloriesCalculator::evaluate(&imperial).unwrap().calories;

        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn comparison_covers_every_activity() {
        let result = CaloriesCalculator::evaluate(&CaloriesInput::default()).unwrap();

        assert_eq!(result.comparison.len(), Activity::ALL.len());
        assert_eq!(
            result
                .comparison
                .iter()
                .find(|(a, _)| *a == result.activity)
                .map(|(_, c)| *c),
            Some(result.calories)
        );
    }

    #[test]
    fn jump_rope_burns_the_most() {
        let result = CaloriesCalculator::evaluate(&CaloriesInput::default()).unwrap();

        let top = result
            .comparison
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(a, _)| *a);

        assert_eq!(top, Some(Activity::JumpRope));
    }

    #[test]
    fn rejects_zero_duration() {
        let input = CaloriesInput {
            duration: 0.0,
            ..CaloriesInput::default()
        };

        assert!(matches!(
            CaloriesCalculator::evaluate(&input),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    #[test]
    fn activity_accepts_spaced_key() {
        assert_eq!("Jump Rope".parse::<Activity>(), Ok(Activity::JumpRope));
    }
}
