//! Tip and bill-splitting calculator.
//!
//! All amounts are exact decimals. Each output is rounded half-up to cents
//! from the unrounded intermediate, so per-person figures are not built on
//! already-rounded totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_half_up;
use crate::validation::{Bounds, FieldSpec, RawInput};

const PEOPLE: Bounds = Bounds::new(1.0, 100.0);
const MAX_BILL: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

static SCHEMA: [FieldSpec; 3] = [
    FieldSpec::number("bill", "Bill amount", Some("$"), None),
    FieldSpec::number("tip_percent", "Tip percentage", Some("%"), Some(Bounds::PERCENT)),
    FieldSpec::integer("people", "Number of people", 1, 100),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipInput {
    pub bill: Decimal,
    pub tip_percent: Decimal,
    pub people: u32,
}

impl Default for TipInput {
    fn default() -> Self {
        Self {
            bill: Decimal::new(50, 0),
            tip_percent: Decimal::new(15, 0),
            people: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipResult {
    pub bill: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
    pub per_person: Decimal,
    pub tip_per_person: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TipCalculator;

impl Calculator for TipCalculator {
    type Input = TipInput;
    type Output = TipResult;

    const ID: &'static str = "tip";
    const TITLE: &'static str = "Tip Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<TipInput, CalcError> {
        let defaults = TipInput::default();
        let people = raw.integer_or("people", i64::from(defaults.people))?;
        PEOPLE.check("people", people as f64)?;
        Ok(TipInput {
            bill: raw.decimal_or("bill", defaults.bill)?,
            tip_percent: raw.decimal_or("tip_percent", defaults.tip_percent)?,
            people: people as u32,
        })
    }

    fn validate(input: &TipInput) -> Result<(), CalcError> {
        if input.bill < Decimal::ZERO {
            return Err(CalcError::domain(format!(
                "bill amount cannot be negative, got {}",
                input.bill
            )));
        }
        if input.bill > MAX_BILL {
            return Err(CalcError::domain("bill amount is too large"));
        }
        if input.tip_percent < Decimal::ZERO || input.tip_percent > Decimal::ONE_HUNDRED {
            return Err(CalcError::OutOfRange {
                field: "tip_percent".to_string(),
                value: input.tip_percent.try_into().unwrap_or(f64::NAN),
                min: 0.0,
                max: 100.0,
            });
        }
        PEOPLE.check("people", f64::from(input.people))?;
        Ok(())
    }

    fn compute(input: &TipInput) -> Result<TipResult, CalcError> {
        let people = Decimal::from(input.people);
        let tip = input.bill * input.tip_percent / Decimal::ONE_HUNDRED;
        let total = input.bill + tip;

        Ok(TipResult {
            bill: round_half_up(input.bill),
            tip: round_half_up(tip),
            total: round_half_up(total),
            per_person: round_half_up(total / people),
            tip_per_person: round_half_up(tip / people),
        })
    }

    fn fields(output: &TipResult) -> Vec<ResultField> {
        vec![
            ResultField::money("tip", output.tip),
            ResultField::money("total", output.total),
            ResultField::money("per_person", output.per_person),
            ResultField::money("tip_per_person", output.tip_per_person),
        ]
    }

    fn chart(output: &TipResult) -> Option<ChartSpec> {
        let bill: f64 = output.bill.try_into().ok()?;
        let tip: f64 = output.tip.try_into().ok()?;
        Some(
            ChartSpec::new(ChartKind::Pie, "Bill breakdown")
                .x_axis("", ["Bill", "Tip"])
                .series("amount", vec![bill, tip]),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn input(
        bill: Decimal,
        tip_percent: Decimal,
        people: u32,
    ) -> TipInput {
        TipInput {
            bill,
            tip_percent,
            people,
        }
    }

    #[test]
    fn splits_bill_between_four_people() {
        let result = TipCalculator::evaluate(&input(dec!(100), dec!(20), 4)).unwrap();

        assert_eq!(
            result,
            TipResult {
                bill: dec!(100.00),
                tip: dec!(20.00),
                total: dec!(120.00),
                per_person: dec!(30.00),
                tip_per_person: dec!(5.00),
            }
        );
    }

    #[test]
    fn per_person_is_rounded_from_unrounded_total() {
        let result = TipCalculator::evaluate(&input(dec!(10.00), dec!(15), 3)).unwrap();

        // total 11.50 / 3 = 3.8333...
        assert_eq!(result.total, dec!(11.50));
        assert_eq!(result.per_person, dec!(3.83));
        assert_eq!(result.tip_per_person, dec!(0.50));
    }

    #[test]
    fn zero_tip_leaves_total_unchanged() {
        let result = TipCalculator::evaluate(&input(dec!(42.10), dec!(0), 1)).unwrap();

        assert_eq!(result.tip, dec!(0.00));
        assert_eq!(result.total, dec!(42.10));
    }

    #[test]
    fn rejects_negative_bill() {
        assert!(matches!(
            TipCalculator::evaluate(&input(dec!(-1), dec!(15), 1)),
            Err(CalcError::Domain(_))
        ));
    }

    #[test]
    fn rejects_tip_above_one_hundred_percent() {
        assert!(matches!(
            TipCalculator::evaluate(&input(dec!(10), dec!(150), 1)),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_people() {
        assert!(matches!(
            TipCalculator::evaluate(&input(dec!(10), dec!(15), 0)),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    #[test]
    fn from_raw_reads_exact_decimals() {
        let raw = RawInput::new()
            .with("bill", "1,000.10")
            .with("tip_percent", "18")
            .with("people", "2");

        let parsed = TipCalculator::from_raw(&raw).unwrap();

        assert_eq!(parsed, input(dec!(1000.10), dec!(18), 2));
    }

    #[test]
    fn chart_splits_bill_and_tip() {
        let result = TipCalculator::evaluate(&input(dec!(100), dec!(20), 4)).unwrap();

        let chart = TipCalculator::chart(&result).unwrap();

        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.series[0].data, vec![100.0, 20.0]);
    }
}
