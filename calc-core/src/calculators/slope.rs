//! Slope of the line through two points.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::{format_compact, format_fixed, round_to};
use crate::validation::{Bounds, FieldSpec, RawInput};

static SCHEMA: [FieldSpec; 4] = [
    FieldSpec::number("x1", "x₁", None, Some(Bounds::UNBOUNDED)),
    FieldSpec::number("y1", "y₁", None, Some(Bounds::UNBOUNDED)),
    FieldSpec::number("x2", "x₂", None, Some(Bounds::UNBOUNDED)),
    FieldSpec::number("y2", "y₂", None, Some(Bounds::UNBOUNDED)),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeInput {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Default for SlopeInput {
    fn default() -> Self {
        Self {
            x1: 1.0,
            y1: 2.0,
            x2: 3.0,
            y2: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopeResult {
    pub rise: f64,
    pub run: f64,
    pub slope: f64,
    pub intercept: f64,
    /// Angle of inclination in degrees, in (-90, 90).
    pub angle: f64,
    pub distance: f64,
    /// Slope-intercept form, e.g. `y = 2x + 1`.
    pub equation: String,
    pub points: [(f64, f64); 2],
}

/// Slope-intercept text with coefficients rounded to four places.
///
/// ```
/// use calc_core::calculators::slope::equation;
///
/// assert_eq!(equation(2.0, 0.0), "y = 2x");
/// assert_eq!(equation(-0.5, 3.25), "y = -0.5x + 3.25");
/// assert_eq!(equation(0.0, -4.0), "y = -4");
/// ```
pub fn equation(
    slope: f64,
    intercept: f64,
) -> String {
    let m = format_compact(slope, 4);
    let b = round_to(intercept, 4);

    if round_to(slope, 4) == 0.0 {
        return format!("y = {}", format_compact(b, 4));
    }
    let term = match m.as_str() {
        "1" => "x".to_string(),
        "-1" => "-x".to_string(),
        _ => format!("{m}x"),
    };
    if b == 0.0 {
        format!("y = {term}")
    } else if b < 0.0 {
        format!("y = {term} - {}", format_compact(-b, 4))
    } else {
        format!("y = {term} + {}", format_compact(b, 4))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlopeCalculator;

impl Calculator for SlopeCalculator {
    type Input = SlopeInput;
    type Output = SlopeResult;

    const ID: &'static str = "slope";
    const TITLE: &'static str = "Slope Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<SlopeInput, CalcError> {
        let defaults = SlopeInput::default();
        Ok(SlopeInput {
            x1: raw.number_or("x1", defaults.x1)?,
            y1: raw.number_or("y1", defaults.y1)?,
            x2: raw.number_or("x2", defaults.x2)?,
            y2: raw.number_or("y2", defaults.y2)?,
        })
    }

    fn validate(input: &SlopeInput) -> Result<(), CalcError> {
        for (name, value) in [
            ("x1", input.x1),
            ("y1", input.y1),
            ("x2", input.x2),
            ("y2", input.y2),
        ] {
            Bounds::UNBOUNDED.check(name, value)?;
        }
        if input.x2 == input.x1 {
            return Err(CalcError::UndefinedSlope);
        }
        Ok(())
    }

    fn compute(input: &SlopeInput) -> Result<SlopeResult, CalcError> {
        let rise = input.y2 - input.y1;
        let run = input.x2 - input.x1;
        let slope = rise / run;
        let intercept = input.y1 - slope * input.x1;

        Ok(SlopeResult {
            rise,
            run,
            slope,
            intercept,
            angle: slope.atan().to_degrees(),
            distance: rise.hypot(run),
            equation: equation(slope, intercept),
            points: [(input.x1, input.y1), (input.x2, input.y2)],
        })
    }

    fn fields(output: &SlopeResult) -> Vec<ResultField> {
        vec![
            ResultField::number("slope", output.slope),
            ResultField::number("intercept", output.intercept),
            ResultField::number("angle", output.angle).with_unit("°"),
            ResultField::number("distance", output.distance),
            ResultField::number("rise", output.rise),
            ResultField::number("run", output.run),
            ResultField::text("equation", output.equation.clone()),
        ]
    }

    fn chart(output: &SlopeResult) -> Option<ChartSpec> {
        let [(x1, y1), (x2, y2)] = output.points;
        Some(
            ChartSpec::new(ChartKind::Line, "Line through both points")
                .x_axis("x", [format_fixed(x1, 2), format_fixed(x2, 2)])
                .y_axis("y")
                .series("y", vec![y1, y2]),
        )
    }
}
