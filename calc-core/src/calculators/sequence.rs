//! Arithmetic and geometric sequence solver.
//!
//! Given at least three terms, finds the common difference (arithmetic) or
//! ratio (geometric), the next term, an nth-term formula and the next five
//! terms. Consecutive differences or ratios may differ by at most
//! [`TOLERANCE`].

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::format_compact;
use crate::validation::{Bounds, FieldSpec, RawInput};

pub const TOLERANCE: f64 = 1e-4;

const MIN_TERMS: usize = 3;
const PROJECTED_TERMS: usize = 5;

choice_enum! {
    pub enum SequenceMode ("sequence mode") {
        Arithmetic => "arithmetic",
        Geometric => "geometric",
        /// Tries arithmetic first, then geometric.
        Auto => "auto",
    }
}

choice_enum! {
    pub enum SequenceKind ("sequence kind") {
        Arithmetic => "arithmetic",
        Geometric => "geometric",
    }
}

static SCHEMA: [FieldSpec; 2] = [
    FieldSpec::choice("mode", "Sequence type", SequenceMode::NAMES),
    FieldSpec::number_list("terms", "Terms"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceInput {
    pub mode: SequenceMode,
    pub terms: Vec<f64>,
}

impl Default for SequenceInput {
    fn default() -> Self {
        Self {
            mode: SequenceMode::Auto,
            terms: vec![2.0, 4.0, 6.0, 8.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResult {
    pub kind: SequenceKind,
    pub terms: Vec<f64>,
    /// Common difference or common ratio.
    pub common: f64,
    pub next_term: f64,
    pub sum: f64,
    pub formula: String,
    pub next_terms: Vec<f64>,
}

/// Common difference when every step matches within tolerance.
pub fn common_difference(terms: &[f64]) -> Option<f64> {
    let d = terms[1] - terms[0];
    terms
        .windows(2)
        .all(|w| ((w[1] - w[0]) - d).abs() <= TOLERANCE)
        .then_some(d)
}

/// Common ratio when every step matches within tolerance. Sequences with a
/// zero term have no ratio.
pub fn common_ratio(terms: &[f64]) -> Option<f64> {
    if terms.iter().any(|t| *t == 0.0) {
        return None;
    }
    let r = terms[1] / terms[0];
    terms
        .windows(2)
        .all(|w| (w[1] / w[0] - r).abs() <= TOLERANCE)
        .then_some(r)
}

fn not_a_sequence(mode: SequenceMode) -> CalcError {
    let kind = match mode {
        SequenceMode::Arithmetic => "an arithmetic",
        SequenceMode::Geometric => "a geometric",
        SequenceMode::Auto => "an arithmetic or geometric",
    };
    CalcError::NotASequence { kind }
}

fn formula(
    kind: SequenceKind,
    first: f64,
    common: f64,
) -> String {
    let a = format_compact(first, 4);
    let c = format_compact(common, 4);
    match kind {
        SequenceKind::Arithmetic => format!("a(n) = {a} + (n - 1) × {c}"),
        SequenceKind::Geometric => format!("a(n) = {a} × {c}^(n - 1)"),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceCalculator;

impl Calculator for SequenceCalculator {
    type Input = SequenceInput;
    type Output = SequenceResult;

    const ID: &'static str = "sequence";
    const TITLE: &'static str = "Sequence Solver";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<SequenceInput, CalcError> {
        let defaults = SequenceInput::default();
        Ok(SequenceInput {
            mode: raw.choice_or("mode", defaults.mode)?,
            terms: raw.numbers_or("terms", &defaults.terms)?,
        })
    }

    fn validate(input: &SequenceInput) -> Result<(), CalcError> {
        if input.terms.len() < MIN_TERMS {
            return Err(CalcError::consistency(format!(
                "enter at least {MIN_TERMS} terms, got {}",
                input.terms.len()
            )));
        }
        for term in &input.terms {
            Bounds::UNBOUNDED.check("terms", *term)?;
        }
        Ok(())
    }

    fn compute(input: &SequenceInput) -> Result<SequenceResult, CalcError> {
        let terms = &input.terms;
        let (kind, common) = match input.mode {
            SequenceMode::Arithmetic => common_difference(terms).map(|d| (SequenceKind::Arithmetic, d)),
            SequenceMode::Geometric => common_ratio(terms).map(|r| (SequenceKind::Geometric, r)),
            SequenceMode::Auto => common_difference(terms)
                .map(|d| (SequenceKind::Arithmetic, d))
                .or_else(|| common_ratio(terms).map(|r| (SequenceKind::Geometric, r))),
        }
        .ok_or_else(|| not_a_sequence(input.mode))?;

        let mut last = terms[terms.len() - 1];
        let next_terms: Vec<f64> = (0..PROJECTED_TERMS)
            .map(|_| {
                last = match kind {
                    SequenceKind::Arithmetic => last + common,
                    SequenceKind::Geometric => last * common,
                };
                last
            })
            .collect();

        Ok(SequenceResult {
            kind,
            terms: terms.clone(),
            common,
            next_term: next_terms[0],
            sum: terms.iter().sum(),
            formula: formula(kind, terms[0], common),
            next_terms,
        })
    }

    fn fields(output: &SequenceResult) -> Vec<ResultField> {
        let common_label = match output.kind {
            SequenceKind::Arithmetic => "common_difference",
            SequenceKind::Geometric => "common_ratio",
        };
        let upcoming = output
            .next_terms
            .iter()
            .map(|t| format_compact(*t, 4))
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            ResultField::text("kind", output.kind.as_str()),
            ResultField::number(common_label, output.common),
            ResultField::number("next_term", output.next_term),
            ResultField::number("sum", output.sum),
            ResultField::text("formula", output.formula.clone()),
            ResultField::text("next_terms", upcoming),
        ]
    }

    fn chart(output: &SequenceResult) -> Option<ChartSpec> {
        let given = output.terms.len();
        let all: Vec<f64> = output.terms.iter().chain(&output.next_terms).copied().collect();
        Some(
            ChartSpec::new(ChartKind::Line, "Sequence terms")
                .x_axis("n", (1..=all.len()).map(|n| n.to_string()))
                .y_axis("a(n)")
                .series("terms", all)
                .marker("projected from", given as f64 + 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sequence(
        mode: SequenceMode,
        terms: &[f64],
    ) -> SequenceInput {
        SequenceInput {
            mode,
            terms: terms.to_vec(),
        }
    }

    #[test]
    fn arithmetic_sequence() {
        let result =
            SequenceCalculator::evaluate(&sequence(SequenceMode::Arithmetic, &[2.0, 4.0, 6.0, 8.0]))
                .unwrap();

        assert_eq!(result.kind, SequenceKind::Arithmetic);
        assert_eq!(result.common, 2.0);
        assert_eq!(result.next_term, 10.0);
        assert_eq!(result.sum, 20.0);
        assert_eq!(result.next_terms, vec![10.0, 12.0, 14.0, 16.0, 18.0]);
        assert_eq!(result.formula, "a(n) = 2 + (n - 1) × 2");
    }

    #[test]
    fn geometric_sequence() {
        let result =
            SequenceCalculator::evaluate(&sequence(SequenceMode::Geometric, &[2.0, 6.0, 18.0, 54.0]))
                .unwrap();

        assert_eq!(result.common, 3.0);
        assert_eq!(result.next_term, 162.0);
        assert_eq!(result.formula, "a(n) = 2 × 3^(n - 1)");
    }

    #[test]
    fn irregular_terms_are_not_arithmetic() {
        assert_eq!(
            SequenceCalculator::evaluate(&sequence(SequenceMode::Arithmetic, &[1.0, 2.0, 4.0, 7.0])),
            Err(CalcError::NotASequence {
                kind: "an arithmetic"
            })
        );
    }

    #[test]
    fn zero_term_is_not_geometric() {
        assert_eq!(
            SequenceCalculator::evaluate(&sequence(SequenceMode::Geometric, &[0.0, 0.0, 0.0])),
            Err(CalcError::NotASequence { kind: "a geometric" })
        );
    }

    #[test]
    fn auto_falls_back_to_geometric() {
        let result =
            SequenceCalculator::evaluate(&sequence(SequenceMode::Auto, &[3.0, 6.0, 12.0])).unwrap();

        assert_eq!(result.kind, SequenceKind::Geometric);
        assert_eq!(result.next_term, 24.0);
    }

    #[test]
    fn auto_reports_both_kinds_when_neither_fits() {
        assert_eq!(
            SequenceCalculator::evaluate(&sequence(SequenceMode::Auto, &[1.0, 2.0, 4.0, 7.0])),
            Err(CalcError::NotASequence {
                kind: "an arithmetic or geometric"
            })
        );
    }

    #[test]
    fn small_rounding_noise_is_tolerated() {
        let result = SequenceCalculator::evaluate(&sequence(
            SequenceMode::Arithmetic,
            &[0.1, 0.2, 0.30004, 0.4],
        ));

        assert!(result.is_ok());
    }

    #[test]
    fn needs_three_terms() {
        assert!(matches!(
            SequenceCalculator::evaluate(&sequence(SequenceMode::Auto, &[1.0, 2.0])),
            Err(CalcError::Consistency(_))
        ));
    }

    #[test]
    fn chart_includes_projection() {
        let result = SequenceCalculator::evaluate(&SequenceInput::default()).unwrap();

        let chart = SequenceCalculator::chart(&result).unwrap();

        assert_eq!(chart.series[0].data.len(), 9);
        assert_eq!(chart.markers[0].value, 5.0);
    }
}
