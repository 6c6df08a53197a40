//! Input schema and the text-to-typed-value validation layer.
//!
//! Forms hand over a [`RawInput`]: the text currently sitting in each field.
//! Calculators pull typed values out of it with the accessors below, which
//! follow one policy for every field:
//!
//! - a field that is absent keeps the calculator's default value,
//! - a field that is present but blank is [`CalcError::Required`],
//! - text that does not parse is [`CalcError::Parse`], never zero,
//! - numbers must be finite; range checks go through [`Bounds`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CalcError;

/// Inclusive numeric range accepted by a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(
        min: f64,
        max: f64,
    ) -> Self {
        Self { min, max }
    }

    /// Any finite number.
    pub const UNBOUNDED: Bounds = Bounds::new(f64::MIN, f64::MAX);

    /// Percentages from 0 to 100.
    pub const PERCENT: Bounds = Bounds::new(0.0, 100.0);

    /// The same interval in a unit `per` times larger, e.g. a centimetre
    /// range to inches with `per = CM_PER_INCH`.
    pub const fn divided_by(
        self,
        per: f64,
    ) -> Self {
        Self::new(self.min / per, self.max / per)
    }

    /// A Celsius interval in Fahrenheit.
    pub const fn celsius_to_fahrenheit(self) -> Self {
        Self::new(self.min * 9.0 / 5.0 + 32.0, self.max * 9.0 / 5.0 + 32.0)
    }

    /// Inclusive, with a relative slack of [`Bounds::SLACK`] so a value
    /// converted back from the other unit system still lands inside.
    pub fn contains(
        &self,
        value: f64,
    ) -> bool {
        let slack = Self::SLACK * self.min.abs().max(self.max.abs()).max(1.0);
        value >= self.min - slack && value <= self.max + slack
    }

    pub const SLACK: f64 = 1e-9;

    /// Rejects `value` when it is non-finite or outside the range.
    ///
    /// ```
    /// use calc_core::validation::Bounds;
    ///
    /// let humidity = Bounds::PERCENT;
    /// assert_eq!(humidity.check("humidity", 45.0), Ok(45.0));
    /// assert!(humidity.check("humidity", 101.0).is_err());
    /// ```
    pub fn check(
        &self,
        field: &str,
        value: f64,
    ) -> Result<f64, CalcError> {
        if !value.is_finite() || !self.contains(value) {
            return Err(CalcError::OutOfRange {
                field: field.to_string(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(value)
    }
}

/// Rejects zero and negative values.
pub fn require_positive(
    field: &str,
    value: f64,
) -> Result<f64, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::NonFiniteResult("input"));
    }
    if value <= 0.0 {
        return Err(CalcError::domain(format!(
            "{field} must be greater than zero, got {value}"
        )));
    }
    Ok(value)
}

/// Rejects negative values.
pub fn require_non_negative(
    field: &str,
    value: f64,
) -> Result<f64, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::NonFiniteResult("input"));
    }
    if value < 0.0 {
        return Err(CalcError::domain(format!(
            "{field} cannot be negative, got {value}"
        )));
    }
    Ok(value)
}

/// What kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Decimal number. `range` is `None` when the range depends on another
    /// field (usually the unit system) and is enforced during validation.
    Number {
        unit: Option<&'static str>,
        range: Option<Bounds>,
    },
    /// Whole number.
    Integer { min: i64, max: i64 },
    /// One of a fixed set of keys.
    Choice { options: &'static [&'static str] },
    /// Whitespace or comma separated keys from a fixed set.
    ChoiceList { options: &'static [&'static str] },
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// Whitespace or comma separated numbers.
    NumberList,
    /// `;` separated rows of `:` separated columns.
    Rows { columns: &'static [&'static str] },
}

/// Describes one input field of a calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn number(
        name: &'static str,
        label: &'static str,
        unit: Option<&'static str>,
        range: Option<Bounds>,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Number { unit, range },
        }
    }

    pub const fn integer(
        name: &'static str,
        label: &'static str,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Integer { min, max },
        }
    }

    pub const fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Choice { options },
        }
    }

    pub const fn choice_list(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::ChoiceList { options },
        }
    }

    pub const fn date(
        name: &'static str,
        label: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Date,
        }
    }

    pub const fn number_list(
        name: &'static str,
        label: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::NumberList,
        }
    }

    pub const fn rows(
        name: &'static str,
        label: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Rows { columns },
        }
    }
}

/// Normalizes numeric text: trims whitespace and removes commas used as
/// thousands separators.
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a required finite number.
///
/// ```
/// use calc_core::validation::parse_number;
///
/// assert_eq!(parse_number("loan", "1,250.50"), Ok(1250.5));
/// assert!(parse_number("loan", "abc").is_err());
/// assert!(parse_number("loan", "").is_err());
/// ```
pub fn parse_number(
    field: &str,
    text: &str,
) -> Result<f64, CalcError> {
    let normalized = normalize_number_input(text);
    if normalized.is_empty() {
        return Err(CalcError::Required {
            field: field.to_string(),
        });
    }
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => {
            tracing::debug!(field, input = %text, "rejected non-numeric input");
            Err(CalcError::Parse {
                field: field.to_string(),
                input: text.to_string(),
                expected: "number",
            })
        }
    }
}

/// Parses a required decimal amount, keeping the digits exactly as typed.
///
/// ```
/// use calc_core::validation::parse_decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_decimal("bill", "1,234.56"), Ok(dec!(1234.56)));
/// ```
pub fn parse_decimal(
    field: &str,
    text: &str,
) -> Result<Decimal, CalcError> {
    let normalized = normalize_number_input(text);
    if normalized.is_empty() {
        return Err(CalcError::Required {
            field: field.to_string(),
        });
    }
    normalized.parse::<Decimal>().map_err(|e| {
        tracing::debug!(field, input = %text, "invalid decimal: {}", e);
        CalcError::Parse {
            field: field.to_string(),
            input: text.to_string(),
            expected: "number",
        }
    })
}

fn parse_integer(
    field: &str,
    text: &str,
) -> Result<i64, CalcError> {
    let normalized = normalize_number_input(text);
    if normalized.is_empty() {
        return Err(CalcError::Required {
            field: field.to_string(),
        });
    }
    normalized.parse::<i64>().map_err(|_| CalcError::Parse {
        field: field.to_string(),
        input: text.to_string(),
        expected: "whole number",
    })
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(
    field: &str,
    text: &str,
) -> Result<NaiveDate, CalcError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CalcError::Required {
            field: field.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| CalcError::Parse {
        field: field.to_string(),
        input: text.to_string(),
        expected: "date (YYYY-MM-DD)",
    })
}

/// Parses whitespace or comma separated numbers. Commas are separators here,
/// not thousands separators.
pub fn parse_number_list(
    field: &str,
    text: &str,
) -> Result<Vec<f64>, CalcError> {
    let values = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| parse_number(field, token))
        .collect::<Result<Vec<_>, _>>()?;

    if values.is_empty() {
        return Err(CalcError::Required {
            field: field.to_string(),
        });
    }
    Ok(values)
}

/// Field name to field text, as read from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    fields: BTreeMap<String, String>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `name=value` assignments.
    ///
    /// # Errors
    ///
    /// Returns [`CalcError::Parse`] for an assignment without `=` or with an
    /// empty name.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, CalcError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut raw = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            match assignment.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    raw.set(name.trim(), value);
                }
                _ => {
                    return Err(CalcError::Parse {
                        field: "assignment".to_string(),
                        input: assignment.to_string(),
                        expected: "name=value pair",
                    });
                }
            }
        }
        Ok(raw)
    }

    pub fn with(
        mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number field, falling back to `default` when the field is absent.
    pub fn number_or(
        &self,
        name: &str,
        default: f64,
    ) -> Result<f64, CalcError> {
        match self.get(name) {
            Some(text) => parse_number(name, text),
            None => Ok(default),
        }
    }

    /// Optional number: absent or blank both mean `None`.
    pub fn optional_number(
        &self,
        name: &str,
    ) -> Result<Option<f64>, CalcError> {
        match self.get(name) {
            Some(text) if !text.trim().is_empty() => parse_number(name, text).map(Some),
            _ => Ok(None),
        }
    }

    /// Decimal field, falling back to `default` when absent.
    pub fn decimal_or(
        &self,
        name: &str,
        default: Decimal,
    ) -> Result<Decimal, CalcError> {
        match self.get(name) {
            Some(text) => parse_decimal(name, text),
            None => Ok(default),
        }
    }

    /// Whole-number field, falling back to `default` when absent.
    pub fn integer_or(
        &self,
        name: &str,
        default: i64,
    ) -> Result<i64, CalcError> {
        match self.get(name) {
            Some(text) => parse_integer(name, text),
            None => Ok(default),
        }
    }

    /// Categorical field, falling back to `default` when absent.
    pub fn choice_or<T>(
        &self,
        name: &str,
        default: T,
    ) -> Result<T, CalcError>
    where
        T: FromStr<Err = CalcError>,
    {
        match self.get(name) {
            Some(text) if text.trim().is_empty() => Err(CalcError::Required {
                field: name.to_string(),
            }),
            Some(text) => text.parse(),
            None => Ok(default),
        }
    }

    /// List of categorical keys, falling back to `default` when absent.
    pub fn choices_or<T>(
        &self,
        name: &str,
        default: &[T],
    ) -> Result<Vec<T>, CalcError>
    where
        T: FromStr<Err = CalcError> + Clone,
    {
        let Some(text) = self.get(name) else {
            return Ok(default.to_vec());
        };
        let values = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<T>, _>>()?;
        if values.is_empty() {
            return Err(CalcError::Required {
                field: name.to_string(),
            });
        }
        Ok(values)
    }

    /// Date field, falling back to `default` when absent.
    pub fn date_or(
        &self,
        name: &str,
        default: NaiveDate,
    ) -> Result<NaiveDate, CalcError> {
        match self.get(name) {
            Some(text) => parse_date(name, text),
            None => Ok(default),
        }
    }

    /// Number list field, falling back to `default` when absent.
    pub fn numbers_or(
        &self,
        name: &str,
        default: &[f64],
    ) -> Result<Vec<f64>, CalcError> {
        match self.get(name) {
            Some(text) => parse_number_list(name, text),
            None => Ok(default.to_vec()),
        }
    }

    /// Rows field split into trimmed cells. `None` when absent.
    pub fn rows(
        &self,
        name: &str,
    ) -> Result<Option<Vec<Vec<String>>>, CalcError> {
        let Some(text) = self.get(name) else {
            return Ok(None);
        };
        let rows: Vec<Vec<String>> = text
            .split(';')
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| row.split(':').map(|cell| cell.trim().to_string()).collect())
            .collect();
        if rows.is_empty() {
            return Err(CalcError::Required {
                field: name.to_string(),
            });
        }
        Ok(Some(rows))
    }
}

/// Reads cell `index` of a row as a number, naming the row in errors.
pub fn row_number(
    field: &str,
    row: &[String],
    index: usize,
    row_index: usize,
) -> Result<f64, CalcError> {
    let label = format!("{field} row {}", row_index + 1);
    let cell = row.get(index).ok_or_else(|| CalcError::Required {
        field: label.clone(),
    })?;
    parse_number(&label, cell)
}
