//! Mortgage / loan amortization.
//!
//! # Formula
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | P      | principal = home price − down payment |
//! | r      | monthly rate = annual rate ÷ 100 ÷ 12 |
//! | n      | number of payments = years × 12 |
//! | M      | monthly payment = P·r·(1+r)ⁿ / ((1+r)ⁿ − 1), or P / n when r = 0 |
//!
//! The displayed totals are derived from the cents-rounded monthly payment,
//! so `total_payment = monthly_payment × n` and
//! `total_interest = total_payment − P` hold exactly.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculator::Calculator;
//! use calc_core::calculators::mortgage::{MortgageCalculator, MortgageInput};
//!
//! let input = MortgageInput {
//!     home_price: 300_000.0,
//!     down_payment: 60_000.0,
//!     annual_rate: 4.5,
//!     years: 30,
//! };
//!
//! let result = MortgageCalculator::evaluate(&input).unwrap();
//!
//! assert_eq!(result.principal, dec!(240000.00));
//! assert_eq!(result.monthly_payment, dec!(1216.04));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::{money, round_to};
use crate::validation::{Bounds, FieldSpec, RawInput, require_non_negative};

const HOME_PRICE: Bounds = Bounds::new(1.0, 1_000_000_000.0);
const ANNUAL_RATE: Bounds = Bounds::new(0.0, 30.0);
const YEARS: Bounds = Bounds::new(1.0, 50.0);

static SCHEMA: [FieldSpec; 4] = [
    FieldSpec::number("home_price", "Home price", Some("$"), Some(HOME_PRICE)),
    FieldSpec::number("down_payment", "Down payment", Some("$"), None),
    FieldSpec::number("annual_rate", "Interest rate", Some("%"), Some(ANNUAL_RATE)),
    FieldSpec::integer("years", "Loan term", 1, 50),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: f64,
    pub down_payment: f64,
    /// Annual interest rate in percent.
    pub annual_rate: f64,
    pub years: u32,
}

impl Default for MortgageInput {
    fn default() -> Self {
        Self {
            home_price: 300_000.0,
            down_payment: 60_000.0,
            annual_rate: 4.5,
            years: 30,
        }
    }
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

/// Year-end position, used for the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub principal: Decimal,
    pub monthly_payment: Decimal,
    pub payments: u32,
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub schedule: Vec<AmortizationRow>,
    pub yearly: Vec<YearSummary>,
}

/// Monthly annuity payment for `principal` at `annual_rate` percent over
/// `months` payments.
///
/// ```
/// use calc_core::calculators::mortgage::monthly_payment;
///
/// let payment = monthly_payment(240_000.0, 4.5, 360);
/// assert!((payment - 1216.04).abs() < 0.005);
/// assert_eq!(monthly_payment(1200.0, 0.0, 12), 100.0);
/// ```
pub fn monthly_payment(
    principal: f64,
    annual_rate: f64,
    months: u32,
) -> f64 {
    let n = f64::from(months);
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Builds the month-by-month schedule for a fixed `payment`.
pub fn amortize(
    principal: f64,
    annual_rate: f64,
    months: u32,
    payment: f64,
) -> Vec<AmortizationRow> {
    let r = annual_rate / 100.0 / 12.0;
    let mut balance = principal;
    let mut rows = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let interest = balance * r;
        let mut principal_part = payment - interest;
        if month == months || principal_part > balance {
            principal_part = balance;
        }
        balance -= principal_part;
        rows.push(AmortizationRow {
            month,
            payment: interest + principal_part,
            interest,
            principal: principal_part,
            balance: balance.max(0.0),
        });
    }

    rows
}

fn yearly_summary(schedule: &[AmortizationRow]) -> Vec<YearSummary> {
    let mut summaries = Vec::with_capacity(schedule.len() / 12 + 1);
    let mut cumulative_interest = 0.0;
    let mut cumulative_principal = 0.0;

    for row in schedule {
        cumulative_interest += row.interest;
        cumulative_principal += row.principal;
        if row.month % 12 == 0 || row.month as usize == schedule.len() {
            summaries.push(YearSummary {
                year: row.month.div_ceil(12),
                balance: row.balance,
                cumulative_interest,
                cumulative_principal,
            });
        }
    }

    summaries
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MortgageCalculator;

impl Calculator for MortgageCalculator {
    type Input = MortgageInput;
    type Output = MortgageResult;

    const ID: &'static str = "mortgage";
    const TITLE: &'static str = "Mortgage Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<MortgageInput, CalcError> {
        let defaults = MortgageInput::default();
        let years = raw.integer_or("years", i64::from(defaults.years))?;
        YEARS.check("years", years as f64)?;
        Ok(MortgageInput {
            home_price: raw.number_or("home_price", defaults.home_price)?,
            down_payment: raw.number_or("down_payment", defaults.down_payment)?,
            annual_rate: raw.number_or("annual_rate", defaults.annual_rate)?,
            years: years as u32,
        })
    }

    fn validate(input: &MortgageInput) -> Result<(), CalcError> {
        HOME_PRICE.check("home_price", input.home_price)?;
        require_non_negative("down payment", input.down_payment)?;
        if input.down_payment >= input.home_price {
            return Err(CalcError::consistency(
                "down payment must be less than the home price",
            ));
        }
        ANNUAL_RATE.check("annual_rate", input.annual_rate)?;
        YEARS.check("years", f64::from(input.years))?;
        Ok(())
    }

    fn compute(input: &MortgageInput) -> Result<MortgageResult, CalcError> {
        let principal = input.home_price - input.down_payment;
        let payments = input.years * 12;

        let payment = monthly_payment(principal, input.annual_rate, payments);
        let monthly = money(payment, "monthly payment")?;
        let principal_amount = money(principal, "principal")?;
        let total_payment = monthly * Decimal::from(payments);

        let schedule = amortize(principal, input.annual_rate, payments, payment);
        let yearly = yearly_summary(&schedule);

        Ok(MortgageResult {
            principal: principal_amount,
            monthly_payment: monthly,
            payments,
            total_payment,
            total_interest: total_payment - principal_amount,
            schedule,
            yearly,
        })
    }

    fn fields(output: &MortgageResult) -> Vec<ResultField> {
        vec![
            ResultField::money("principal", output.principal),
            ResultField::money("monthly_payment", output.monthly_payment),
            ResultField::integer("payments", i64::from(output.payments)),
            ResultField::money("total_payment", output.total_payment),
            ResultField::money("total_interest", output.total_interest),
        ]
    }

    fn chart(output: &MortgageResult) -> Option<ChartSpec> {
        let years = output.yearly.iter().map(|y| y.year.to_string());
        Some(
            ChartSpec::new(ChartKind::Line, "Loan balance over time")
                .x_axis("Year", years)
                .y_axis("Amount ($)")
                .series(
                    "balance",
                    output.yearly.iter().map(|y| round_to(y.balance, 2)).collect(),
                )
                .series(
                    "cumulative_interest",
                    output
                        .yearly
                        .iter()
                        .map(|y| round_to(y.cumulative_interest, 2))
                        .collect(),
                ),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn loan(
        home_price: f64,
        down_payment: f64,
        annual_rate: f64,
        years: u32,
    ) -> MortgageInput {
        MortgageInput {
            home_price,
            down_payment,
            annual_rate,
            years,
        }
    }

    #[test]
    fn thirty_year_loan_at_four_and_a_half_percent() {
        let result = MortgageCalculator::evaluate(&loan(300_000.0, 60_000.0, 4.5, 30)).unwrap();

        assert_eq!(result.principal, dec!(240000.00));
        assert_eq!(result.payments, 360);
        assert_eq!(result.monthly_payment, dec!(1216.04));
    }

    #[test]
    fn totals_follow_from_monthly_payment() {
        let result = MortgageCalculator::evaluate(&loan(250_000.0, 25_000.0, 6.25, 15)).unwrap();

        assert_eq!(
            result.total_payment,
            result.monthly_payment * Decimal::from(result.payments)
        );
        assert_eq!(
            result.total_interest,
            result.total_payment - result.principal
        );
    }

    #[test]
    fn payment_increases_with_rate() {
        let mut previous = 0.0;
        for tenth in 1..=100 {
            let payment = monthly_payment(200_000.0, f64::from(tenth) / 10.0, 360);
            assert!(payment > previous, "not increasing at {tenth}");
            previous = payment;
        }
    }

    #[test]
    fn zero_rate_splits_principal_evenly() {
        let result = MortgageCalculator::evaluate(&loan(13_000.0, 1_000.0, 0.0, 1)).unwrap();

        assert_eq!(result.monthly_payment, dec!(1000.00));
        assert_eq!(result.total_interest, dec!(0.00));
    }

    #[test]
    fn schedule_pays_off_loan() {
        let result = MortgageCalculator::evaluate(&loan(300_000.0, 60_000.0, 4.5, 30)).unwrap();

        let last = result.schedule.last().unwrap();
        let principal_paid: f64 = result.schedule.iter().map(|r| r.principal).sum();

        assert_eq!(result.schedule.len(), 360);
        assert_eq!(last.balance, 0.0);
        assert!((principal_paid - 240_000.0).abs() < 1e-6);
        assert!(result.schedule[0].interest > result.schedule[359].interest);
    }

    #[test]
    fn first_month_interest_is_balance_times_monthly_rate() {
        let result = MortgageCalculator::evaluate(&loan(300_000.0, 60_000.0, 4.5, 30)).unwrap();

        assert!((result.schedule[0].interest - 900.0).abs() < 1e-9);
    }

    #[test]
    fn yearly_summary_has_one_entry_per_year() {
        let result = MortgageCalculator::evaluate(&loan(300_000.0, 60_000.0, 4.5, 30)).unwrap();

        assert_eq!(result.yearly.len(), 30);
        assert_eq!(result.yearly[29].year, 30);
        assert_eq!(result.yearly[29].balance, 0.0);
    }

    #[test]
    fn chart_uses_yearly_summary() {
        let result = MortgageCalculator::evaluate(&loan(300_000.0, 60_000.0, 4.5, 30)).unwrap();

        let chart = MortgageCalculator::chart(&result).unwrap();
        let balance = chart.find_series("balance").unwrap();

        assert_eq!(chart.x_axis.categories.len(), 30);
        assert_eq!(balance.data[0], round_to(result.yearly[0].balance, 2));
    }

    #[test]
    fn rejects_down_payment_covering_price() {
        assert!(matches!(
            MortgageCalculator::evaluate(&loan(100_000.0, 100_000.0, 5.0, 30)),
            Err(CalcError::Consistency(_))
        ));
    }

    #[test]
    fn rejects_negative_down_payment() {
        assert!(matches!(
            MortgageCalculator::evaluate(&loan(100_000.0, -5.0, 5.0, 30)),
            Err(CalcError::Domain(_))
        ));
    }

    #[test]
    fn rejects_zero_term() {
        assert!(matches!(
            MortgageCalculator::evaluate(&loan(100_000.0, 0.0, 5.0, 0)),
            Err(CalcError::OutOfRange { .. })
        ));
    }
}
