//! Right triangle solver: legs `a`, `b` and hypotenuse `c`, given any two.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::validation::{FieldSpec, RawInput, require_positive};

static SCHEMA: [FieldSpec; 3] = [
    FieldSpec::number("a", "Leg a", None, None),
    FieldSpec::number("b", "Leg b", None, None),
    FieldSpec::number("c", "Hypotenuse c", None, None),
];

/// Exactly two sides must be known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleInput {
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
}

impl Default for TriangleInput {
    fn default() -> Self {
        Self {
            a: Some(3.0),
            b: Some(4.0),
            c: None,
        }
    }
}

impl TriangleInput {
    fn known(&self) -> usize {
        [self.a, self.b, self.c].iter().flatten().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleResult {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Which side was solved for.
    pub solved: String,
    /// Angle opposite `a`, degrees.
    pub alpha: f64,
    /// Angle opposite `b`, degrees.
    pub beta: f64,
    pub area: f64,
    pub perimeter: f64,
    /// Altitude from the right angle onto the hypotenuse.
    pub height: f64,
}

/// Solves the missing side. Fails when the hypotenuse is not the longest side.
fn solve(input: &TriangleInput) -> Result<(f64, f64, f64, &'static str), CalcError> {
    match (input.a, input.b, input.c) {
        (Some(a), Some(b), None) => Ok((a, b, a.hypot(b), "c")),
        (Some(a), None, Some(c)) => Ok((a, leg(c, a, "a")?, c, "b")),
        (None, Some(b), Some(c)) => Ok((leg(c, b, "b")?, b, c, "a")),
        _ => Err(CalcError::consistency(
            "enter exactly two of a, b and c",
        )),
    }
}

fn leg(
    hypotenuse: f64,
    other: f64,
    other_name: &str,
) -> Result<f64, CalcError> {
    if hypotenuse <= other {
        return Err(CalcError::consistency(format!(
            "hypotenuse c must be longer than leg {other_name}"
        )));
    }
    Ok((hypotenuse * hypotenuse - other * other).sqrt())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RightTriangleCalculator;

impl Calculator for RightTriangleCalculator {
    type Input = TriangleInput;
    type Output = TriangleResult;

    const ID: &'static str = "right_triangle";
    const TITLE: &'static str = "Right Triangle Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    /// Uses the default 3-4 triangle only when no side was entered at all.
    fn from_raw(raw: &RawInput) -> Result<TriangleInput, CalcError> {
        if !["a", "b", "c"].iter().any(|side| raw.contains(side)) {
            return Ok(TriangleInput::default());
        }
        Ok(TriangleInput {
            a: raw.optional_number("a")?,
            b: raw.optional_number("b")?,
            c: raw.optional_number("c")?,
        })
    }

    fn validate(input: &TriangleInput) -> Result<(), CalcError> {
        if input.known() != 2 {
            return Err(CalcError::consistency(format!(
                "enter exactly two of a, b and c, got {}",
                input.known()
            )));
        }
        for (name, side) in [("a", input.a), ("b", input.b), ("c", input.c)] {
            if let Some(value) = side {
                require_positive(name, value)?;
            }
        }
        solve(input).map(|_| ())
    }

    fn compute(input: &TriangleInput) -> Result<TriangleResult, CalcError> {
        let (a, b, c, solved) = solve(input)?;
        let alpha = (a / c).asin().to_degrees();

        Ok(TriangleResult {
            a,
            b,
            c,
            solved: solved.to_string(),
            alpha,
            beta: 90.0 - alpha,
            area: a * b / 2.0,
            perimeter: a + b + c,
            height: a * b / c,
        })
    }

    fn fields(output: &TriangleResult) -> Vec<ResultField> {
        vec![
            ResultField::number("a", output.a),
            ResultField::number("b", output.b),
            ResultField::number("c", output.c),
            ResultField::text("solved", output.solved.clone()),
            ResultField::number("alpha", output.alpha).with_unit("°"),
            ResultField::number("beta", output.beta).with_unit("°"),
            ResultField::number("area", output.area),
            ResultField::number("perimeter", output.perimeter),
            ResultField::number("height", output.height),
        ]
    }

    fn chart(output: &TriangleResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Bar, "Sides")
                .x_axis("Side", ["a", "b", "c"])
                .y_axis("Length")
                .series("length", vec![output.a, output.b, output.c]),
        )
    }
}
