//! Calendar calculators: date arithmetic, pregnancy due date and cycle
//! prediction.
//!
//! These are the only calculators whose defaults depend on the clock. The
//! clock is read in the `Default` impls and nowhere else, so `compute` stays
//! a pure function of its input.

use chrono::{Datelike, Days, Duration, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::validation::{Bounds, FieldSpec, RawInput};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn offset(
    date: NaiveDate,
    days: i64,
) -> Result<NaiveDate, CalcError> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| CalcError::domain("the resulting date is out of range"))
}

// ============================================================================
// Date difference / add / subtract
// ============================================================================

const DAYS: Bounds = Bounds::new(0.0, 100_000.0);

choice_enum! {
    pub enum DateMode ("date mode") {
        Difference => "difference" | "diff",
        Add => "add",
        Subtract => "subtract" | "sub",
    }
}

static DATE_SCHEMA: [FieldSpec; 4] = [
    FieldSpec::choice("mode", "Mode", DateMode::NAMES),
    FieldSpec::date("start", "Start date"),
    FieldSpec::date("end", "End date (difference)"),
    FieldSpec::integer("days", "Days (add / subtract)", 0, 100_000),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateInput {
    pub mode: DateMode,
    pub start: NaiveDate,
    /// Read in [`DateMode::Difference`] only.
    pub end: NaiveDate,
    /// Read in [`DateMode::Add`] and [`DateMode::Subtract`] only.
    pub days: u32,
}

impl Default for DateInput {
    fn default() -> Self {
        let start = today();
        Self {
            mode: DateMode::Difference,
            start,
            end: start + Days::new(30),
            days: 30,
        }
    }
}

/// Whole years, months and days from `start` to `end` (`start <= end`).
///
/// Months are counted from the start day; a start day missing from the
/// target month lands on its last day.
///
/// ```
/// use chrono::NaiveDate;
/// use calc_core::calculators::dates::calendar_span;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
/// assert_eq!(calendar_span(start, end), Ok((1, 2, 5)));
/// ```
pub fn calendar_span(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(u32, u32, u32), CalcError> {
    if end < start {
        return Err(CalcError::domain(
            "negative duration: the end date is before the start date",
        ));
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    let months = months.max(0) as u32;
    let anchor = start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| CalcError::domain("the resulting date is out of range"))?;
    let days = (end - anchor).num_days().max(0) as u32;
    Ok((months / 12, months % 12, days))
}

/// Monday to Friday days in `[start, end)`.
fn weekdays_between(
    start: NaiveDate,
    end: NaiveDate,
) -> u32 {
    let span = (end - start).num_days().max(0) as usize;
    start
        .iter_days()
        .take(span)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateResult {
    pub mode: DateMode,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Absolute length of the interval in days.
    pub days: u32,
    pub weeks: u32,
    pub remaining_days: u32,
    pub years: u32,
    pub months: u32,
    pub month_days: u32,
    pub weekdays: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateCalculator;

impl Calculator for DateCalculator {
    type Input = DateInput;
    type Output = DateResult;

    const ID: &'static str = "date";
    const TITLE: &'static str = "Date Calculator";

    fn schema() -> &'static [FieldSpec] {
        &DATE_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<DateInput, CalcError> {
        let defaults = DateInput::default();
        let days = raw.integer_or("days", i64::from(defaults.days))?;
        DAYS.check("days", days as f64)?;
        Ok(DateInput {
            mode: raw.choice_or("mode", defaults.mode)?,
            start: raw.date_or("start", defaults.start)?,
            end: raw.date_or("end", defaults.end)?,
            days: days as u32,
        })
    }

    fn validate(input: &DateInput) -> Result<(), CalcError> {
        DAYS.check("days", f64::from(input.days))?;
        if input.mode == DateMode::Difference && input.end < input.start {
            return Err(CalcError::domain(
                "negative duration: the end date is before the start date",
            ));
        }
        Ok(())
    }

    fn compute(input: &DateInput) -> Result<DateResult, CalcError> {
        let end = match input.mode {
            DateMode::Difference => input.end,
            DateMode::Add => offset(input.start, i64::from(input.days))?,
            DateMode::Subtract => offset(input.start, -i64::from(input.days))?,
        };
        let (from, to) = if end < input.start {
            (end, input.start)
        } else {
            (input.start, end)
        };
        let days = (to - from).num_days() as u32;
        let (years, months, month_days) = calendar_span(from, to)?;

        Ok(DateResult {
            mode: input.mode,
            start: input.start,
            end,
            days,
            weeks: days / 7,
            remaining_days: days % 7,
            years,
            months,
            month_days,
            weekdays: weekdays_between(from, to),
        })
    }

    fn fields(output: &DateResult) -> Vec<ResultField> {
        vec![
            ResultField::date("start", output.start),
            ResultField::date("end", output.end),
            ResultField::text("weekday", output.end.format("%A").to_string()),
            ResultField::integer("days", i64::from(output.days)),
            ResultField::text(
                "weeks",
                format!("{} weeks {} days", output.weeks, output.remaining_days),
            ),
            ResultField::text(
                "calendar",
                format!(
                    "{} years {} months {} days",
                    output.years, output.months, output.month_days
                ),
            ),
            ResultField::integer("weekdays", i64::from(output.weekdays)),
        ]
    }

    fn chart(output: &DateResult) -> Option<ChartSpec> {
        let days = f64::from(output.days);
        Some(
            ChartSpec::new(ChartKind::Bar, "Duration")
                .x_axis("Unit", ["years", "months", "weeks", "days"])
                .y_axis("Amount")
                .series(
                    "duration",
                    vec![days / 365.2425, days / 30.436875, days / 7.0, days],
                ),
        )
    }
}

// ============================================================================
// Due date
// ============================================================================

/// Length of a pregnancy counted from the last menstrual period.
pub const GESTATION_DAYS: i64 = 280;

const STANDARD_CYCLE: i64 = 28;
const DUE_CYCLE: Bounds = Bounds::new(20.0, 45.0);
/// Gestational ages beyond this are treated as a mistyped date.
const MAX_GESTATION_DAYS: i64 = 44 * 7;

choice_enum! {
    pub enum Trimester ("trimester") {
        First => "first",
        Second => "second",
        Third => "third",
    }
}

impl Trimester {
    /// Weeks 0–13 are the first trimester, 14–27 the second.
    pub fn from_weeks(weeks: i64) -> Self {
        match weeks {
            ..14 => Self::First,
            14..28 => Self::Second,
            _ => Self::Third,
        }
    }
}

static DUE_SCHEMA: [FieldSpec; 3] = [
    FieldSpec::date("last_period", "First day of last period"),
    FieldSpec::integer("cycle_length", "Average cycle length", 20, 45),
    FieldSpec::date("as_of", "Reference date"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDateInput {
    pub last_period: NaiveDate,
    pub cycle_length: u32,
    pub as_of: NaiveDate,
}

impl Default for DueDateInput {
    fn default() -> Self {
        let as_of = today();
        Self {
            last_period: as_of - Days::new(56),
            cycle_length: 28,
            as_of,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueDateResult {
    pub due_date: NaiveDate,
    pub conception: NaiveDate,
    /// Days since the last period on `as_of`.
    pub gestation_days: i64,
    pub weeks: i64,
    pub days: i64,
    pub trimester: Trimester,
    /// Negative once the due date has passed.
    pub days_until_due: i64,
    /// Percent of the pregnancy elapsed.
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DueDateCalculator;

impl Calculator for DueDateCalculator {
    type Input = DueDateInput;
    type Output = DueDateResult;

    const ID: &'static str = "due_date";
    const TITLE: &'static str = "Pregnancy Due Date Calculator";

    fn schema() -> &'static [FieldSpec] {
        &DUE_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<DueDateInput, CalcError> {
        let defaults = DueDateInput::default();
        let cycle = raw.integer_or("cycle_length", i64::from(defaults.cycle_length))?;
        DUE_CYCLE.check("cycle_length", cycle as f64)?;
        Ok(DueDateInput {
            last_period: raw.date_or("last_period", defaults.last_period)?,
            cycle_length: cycle as u32,
            as_of: raw.date_or("as_of", defaults.as_of)?,
        })
    }

    fn validate(input: &DueDateInput) -> Result<(), CalcError> {
        DUE_CYCLE.check("cycle_length", f64::from(input.cycle_length))?;
        let elapsed = (input.as_of - input.last_period).num_days();
        if elapsed < 0 {
            return Err(CalcError::domain(
                "the last period cannot be after the reference date",
            ));
        }
        if elapsed > MAX_GESTATION_DAYS {
            return Err(CalcError::domain(
                "the last period is more than 44 weeks before the reference date",
            ));
        }
        Ok(())
    }

    fn compute(input: &DueDateInput) -> Result<DueDateResult, CalcError> {
        let adjustment = i64::from(input.cycle_length) - STANDARD_CYCLE;
        let due_date = offset(input.last_period, GESTATION_DAYS + adjustment)?;
        let conception = offset(input.last_period, 14 + adjustment)?;
        let gestation_days = (input.as_of - input.last_period).num_days();
        let term = (due_date - input.last_period).num_days();
        let weeks = gestation_days / 7;

        Ok(DueDateResult {
            due_date,
            conception,
            gestation_days,
            weeks,
            days: gestation_days % 7,
            trimester: Trimester::from_weeks(weeks),
            days_until_due: (due_date - input.as_of).num_days(),
            progress: gestation_days as f64 / term as f64 * 100.0,
        })
    }

    fn fields(output: &DueDateResult) -> Vec<ResultField> {
        vec![
            ResultField::date("due_date", output.due_date),
            ResultField::date("conception", output.conception),
            ResultField::text(
                "gestational_age",
                format!("{} weeks {} days", output.weeks, output.days),
            ),
            ResultField::text("trimester", output.trimester.to_string()),
            ResultField::integer("days_until_due", output.days_until_due),
            ResultField::number("progress", output.progress).with_unit("%"),
        ]
    }

    fn chart(output: &DueDateResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Gauge, "Pregnancy progress")
                .y_axis("%")
                .series("progress", vec![output.progress])
                .marker("second trimester", 14.0 / 40.0 * 100.0)
                .marker("third trimester", 28.0 / 40.0 * 100.0)
                .marker("due", 100.0),
        )
    }
}

// ============================================================================
// Period / ovulation
// ============================================================================

/// Number of upcoming cycles predicted.
pub const PREDICTED_CYCLES: usize = 6;
/// Ovulation is taken to fall this many days before the next period.
pub const LUTEAL_PHASE_DAYS: i64 = 14;

const PERIOD_CYCLE: Bounds = Bounds::new(21.0, 45.0);
const PERIOD_LENGTH: Bounds = Bounds::new(2.0, 10.0);

const PERIOD_LABELS: [&str; PREDICTED_CYCLES] = [
    "period_1", "period_2", "period_3", "period_4", "period_5", "period_6",
];
const OVULATION_LABELS: [&str; PREDICTED_CYCLES] = [
    "ovulation_1",
    "ovulation_2",
    "ovulation_3",
    "ovulation_4",
    "ovulation_5",
    "ovulation_6",
];

static PERIOD_SCHEMA: [FieldSpec; 3] = [
    FieldSpec::date("last_period", "First day of last period"),
    FieldSpec::integer("cycle_length", "Average cycle length", 21, 45),
    FieldSpec::integer("period_length", "Period length", 2, 10),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodInput {
    pub last_period: NaiveDate,
    pub cycle_length: u32,
    pub period_length: u32,
}

impl Default for PeriodInput {
    fn default() -> Self {
        Self {
            last_period: today() - Days::new(7),
            cycle_length: 28,
            period_length: 5,
        }
    }
}

/// One predicted cycle. The ovulation and fertile window precede `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ovulation: NaiveDate,
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub last_period: NaiveDate,
    pub cycles: Vec<PredictedCycle>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodCalculator;

impl Calculator for PeriodCalculator {
    type Input = PeriodInput;
    type Output = PeriodResult;

    const ID: &'static str = "period";
    const TITLE: &'static str = "Period & Ovulation Calculator";

    fn schema() -> &'static [FieldSpec] {
        &PERIOD_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<PeriodInput, CalcError> {
        let defaults = PeriodInput::default();
        let cycle = raw.integer_or("cycle_length", i64::from(defaults.cycle_length))?;
        PERIOD_CYCLE.check("cycle_length", cycle as f64)?;
        let length = raw.integer_or("period_length", i64::from(defaults.period_length))?;
        PERIOD_LENGTH.check("period_length", length as f64)?;
        Ok(PeriodInput {
            last_period: raw.date_or("last_period", defaults.last_period)?,
            cycle_length: cycle as u32,
            period_length: length as u32,
        })
    }

    fn validate(input: &PeriodInput) -> Result<(), CalcError> {
        PERIOD_CYCLE.check("cycle_length", f64::from(input.cycle_length))?;
        PERIOD_LENGTH.check("period_length", f64::from(input.period_length))?;
        Ok(())
    }

    fn compute(input: &PeriodInput) -> Result<PeriodResult, CalcError> {
        let cycle = i64::from(input.cycle_length);
        let cycles = (1..=PREDICTED_CYCLES as i64)
            .map(|n| {
                let start = offset(input.last_period, n * cycle)?;
                let ovulation = offset(start, -LUTEAL_PHASE_DAYS)?;
                Ok(PredictedCycle {
                    start,
                    end: offset(start, i64::from(input.period_length) - 1)?,
                    ovulation,
                    fertile_start: offset(ovulation, -5)?,
                    fertile_end: offset(ovulation, 1)?,
                })
            })
            .collect::<Result<Vec<_>, CalcError>>()?;

        Ok(PeriodResult {
            last_period: input.last_period,
            cycles,
        })
    }

    fn fields(output: &PeriodResult) -> Vec<ResultField> {
        let mut fields = Vec::with_capacity(2 + 2 * PREDICTED_CYCLES);
        if let Some(next) = output.cycles.first() {
            fields.push(ResultField::date("fertile_start", next.fertile_start));
            fields.push(ResultField::date("fertile_end", next.fertile_end));
        }
        for (i, cycle) in output.cycles.iter().enumerate() {
            fields.push(ResultField::date(PERIOD_LABELS[i], cycle.start));
            fields.push(ResultField::date(OVULATION_LABELS[i], cycle.ovulation));
        }
        fields
    }

    fn chart(output: &PeriodResult) -> Option<ChartSpec> {
        let days_after = |date: NaiveDate| (date - output.last_period).num_days() as f64;
        Some(
            ChartSpec::new(ChartKind::Bar, "Upcoming cycles")
                .x_axis(
                    "Cycle start",
                    output.cycles.iter().map(|c| c.start.format("%Y-%m-%d").to_string()),
                )
                .y_axis("Days after last period")
                .series(
                    "period",
                    output.cycles.iter().map(|c| days_after(c.start)).collect(),
                )
                .series(
                    "ovulation",
                    output.cycles.iter().map(|c| days_after(c.ovulation)).collect(),
                ),
        )
    }
}
