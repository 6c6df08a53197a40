//! Golf handicap index from a list of rounds.
//!
//! Each round contributes a score differential:
//!
//! ```text
//! differential = (score − course rating) × 113 / slope rating
//! ```
//!
//! The index is 96 % of the mean of the lowest N differentials, where N is
//! 10 once twenty or more rounds are entered and `floor(0.4 × rounds)`
//! otherwise. Fewer than three rounds cannot produce an index.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_to;
use crate::validation::{Bounds, FieldSpec, RawInput, row_number};

/// Slope rating of a course of standard difficulty.
pub const STANDARD_SLOPE: f64 = 113.0;

const SCORE: Bounds = Bounds::new(18.0, 200.0);
const COURSE_RATING: Bounds = Bounds::new(50.0, 90.0);
const SLOPE_RATING: Bounds = Bounds::new(55.0, 155.0);

const MIN_ROUNDS: usize = 3;

const INDEX_FACTOR: f64 = 0.96;

static SCHEMA: [FieldSpec; 1] = [FieldSpec::rows(
    "rounds",
    "Rounds",
    &["score", "course_rating", "slope_rating"],
)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub score: f64,
    pub course_rating: f64,
    pub slope_rating: f64,
}

impl Round {
    pub fn new(
        score: f64,
        course_rating: f64,
        slope_rating: f64,
    ) -> Self {
        Self {
            score,
            course_rating,
            slope_rating,
        }
    }

    pub fn differential(&self) -> f64 {
        (self.score - self.course_rating) * STANDARD_SLOPE / self.slope_rating
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandicapInput {
    pub rounds: Vec<Round>,
}

impl Default for HandicapInput {
    fn default() -> Self {
        Self {
            rounds: vec![
                Round::new(88.0, 71.2, 128.0),
                Round::new(92.0, 72.0, 131.0),
                Round::new(85.0, 70.5, 125.0),
                Round::new(90.0, 71.8, 133.0),
                Round::new(87.0, 71.2, 128.0),
            ],
        }
    }
}

/// Number of lowest differentials that count for `rounds` entered rounds.
///
/// ```
/// use calc_core::calculators::golf::counted_rounds;
///
/// assert_eq!(counted_rounds(2), 0);
/// assert_eq!(counted_rounds(5), 2);
/// assert_eq!(counted_rounds(19), 7);
/// assert_eq!(counted_rounds(20), 10);
/// assert_eq!(counted_rounds(40), 10);
/// ```
pub fn counted_rounds(rounds: usize) -> usize {
    if rounds >= 20 { 10 } else { rounds * 2 / 5 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandicapResult {
    /// Differentials in the order the rounds were entered.
    pub differentials: Vec<f64>,
    pub rounds_used: usize,
    /// Mean of the counted differentials.
    pub average: f64,
    /// Handicap index, `0.96 × average`. Published to one decimal.
    pub index: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HandicapCalculator;

impl Calculator for HandicapCalculator {
    type Input = HandicapInput;
    type Output = HandicapResult;

    const ID: &'static str = "golf_handicap";
    const TITLE: &'static str = "Golf Handicap Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<HandicapInput, CalcError> {
        let Some(rows) = raw.rows("rounds")? else {
            return Ok(HandicapInput::default());
        };
        let rounds = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Round {
                    score: row_number("rounds", row, 0, i)?,
                    course_rating: row_number("rounds", row, 1, i)?,
                    slope_rating: row_number("rounds", row, 2, i)?,
                })
            })
            .collect::<Result<Vec<_>, CalcError>>()?;
        Ok(HandicapInput { rounds })
    }

    fn validate(input: &HandicapInput) -> Result<(), CalcError> {
        for (i, round) in input.rounds.iter().enumerate() {
            let n = i + 1;
            SCORE.check(&format!("score (round {n})"), round.score)?;
            COURSE_RATING.check(&format!("course rating (round {n})"), round.course_rating)?;
            SLOPE_RATING.check(&format!("slope rating (round {n})"), round.slope_rating)?;
        }
        if input.rounds.len() < MIN_ROUNDS {
            return Err(CalcError::consistency(format!(
                "at least {MIN_ROUNDS} rounds are needed for a handicap index, got {}",
                input.rounds.len()
            )));
        }
        Ok(())
    }

    fn compute(input: &HandicapInput) -> Result<HandicapResult, CalcError> {
        let differentials: Vec<f64> = input.rounds.iter().map(Round::differential).collect();

        let mut lowest = differentials.clone();
        lowest.sort_by(f64::total_cmp);
        let used = counted_rounds(lowest.len());
        let average = lowest[..used].iter().sum::<f64>() / used as f64;

        Ok(HandicapResult {
            differentials,
            rounds_used: used,
            average,
            index: average * INDEX_FACTOR,
        })
    }

    fn fields(output: &HandicapResult) -> Vec<ResultField> {
        vec![
            ResultField::number("handicap_index", output.index),
            ResultField::integer("rounds_entered", output.differentials.len() as i64),
            ResultField::integer("rounds_used", output.rounds_used as i64),
            ResultField::number("average_differential", output.average),
        ]
    }

    fn chart(output: &HandicapResult) -> Option<ChartSpec> {
        let rounds = (1..=output.differentials.len()).map(|n| format!("Round {n}"));
        Some(
            ChartSpec::new(ChartKind::Bar, "Score differentials")
                .x_axis("Round", rounds)
                .y_axis("Differential")
                .series(
                    "differential",
                    output.differentials.iter().map(|d| round_to(*d, 1)).collect(),
                )
                .marker("Handicap index", round_to(output.index, 1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn rounds(differentials: &[f64]) -> HandicapInput {
        // Course rating 70 and standard slope make the differential equal to
        // score - 70.
        HandicapInput {
            rounds: differentials
                .iter()
                .map(|d| Round::new(70.0 + d, 70.0, STANDARD_SLOPE))
                .collect(),
        }
    }

    #[test]
    fn differential_formula() {
        let round = Round::new(90.0, 72.0, 130.0);

        assert!((round.differential() - 18.0 * 113.0 / 130.0).abs() < 1e-12);
    }

    #[test]
    fn five_rounds_use_lowest_two() {
        let result = HandicapCalculator::evaluate(&rounds(&[20.0, 12.0, 15.0, 10.0, 18.0])).unwrap();

        assert_eq!(result.rounds_used, 2);
        assert_eq!(result.average, 11.0);
        assert!((result.index - 10.56).abs() < 1e-12, "{}", result.index);
    }

    #[test]
    fn twenty_rounds_use_lowest_ten() {
        let diffs: Vec<f64> = (1..=20).map(f64::from).collect();

        let result = HandicapCalculator::evaluate(&rounds(&diffs)).unwrap();

        assert_eq!(result.rounds_used, 10);
        assert_eq!(result.average, 5.5);
        assert!((result.index - 5.28).abs() < 1e-12, "{}", result.index);
    }

    #[test]
    fn index_is_kept_exact_and_rounded_only_for_display() {
        let result = HandicapCalculator::evaluate(&rounds(&[13.0, 14.0, 20.0, 21.0, 22.0])).unwrap();

        let shown = HandicapCalculator::fields(&result)
            .into_iter()
            .find(|f| f.label == "handicap_index")
            .map(|f| f.value.display(1));

        assert!((result.index - 12.96).abs() < 1e-12, "{}", result.index);
        assert_eq!(shown.as_deref(), Some("13.0"));
    }

    #[test]
    fn more_than_twenty_rounds_are_all_considered() {
        let mut diffs: Vec<f64> = (10..=30).map(f64::from).collect();
        diffs.push(0.0);

        let result = HandicapCalculator::evaluate(&rounds(&diffs)).unwrap();

        assert_eq!(result.differentials.len(), 22);
        // lowest ten: 0 and 10 through 18
        assert_eq!(result.average, 12.6);
    }

    #[test]
    fn fewer_than_three_rounds_is_rejected() {
        assert!(matches!(
            HandicapCalculator::evaluate(&rounds(&[10.0, 12.0])),
            Err(CalcError::Consistency(_))
        ));
    }

    #[test]
    fn slope_rating_outside_range_is_rejected() {
        let input = HandicapInput {
            rounds: vec![
                Round::new(90.0, 72.0, 130.0),
                Round::new(90.0, 72.0, 160.0),
                Round::new(90.0, 72.0, 130.0),
            ],
        };

        assert!(matches!(
            HandicapCalculator::evaluate(&input),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    #[test]
    fn from_raw_reads_rows() {
        let raw = RawInput::new().with("rounds", "90:72:130; 85:71.5:125;88:70:113");

        let input = HandicapCalculator::from_raw(&raw).unwrap();

        assert_eq!(input.rounds.len(), 3);
        assert_eq!(input.rounds[1], Round::new(85.0, 71.5, 125.0));
    }

    #[test]
    fn from_raw_reports_short_row() {
        let raw = RawInput::new().with("rounds", "90:72:130; 85:71.5");

        assert_eq!(
            HandicapCalculator::from_raw(&raw),
            Err(CalcError::Required {
                field: "rounds row 2".to_string()
            })
        );
    }

    #[test]
    fn chart_marks_index() {
        let result = HandicapCalculator::evaluate(&HandicapInput::default()).unwrap();

        let chart = HandicapCalculator::chart(&result).unwrap();

        assert_eq!(chart.series[0].data.len(), 5);
        assert_eq!(chart.markers[0].value, result.index);
    }
}
