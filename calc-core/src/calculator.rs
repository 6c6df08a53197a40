//! The generic calculator contract.
//!
//! Every calculator is a type implementing [`Calculator`]: a static input
//! schema, a conversion from raw form text to a typed input, validation, a
//! pure compute step, a projection of the output into labelled result fields,
//! and an optional chart projection.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::chart::ChartSpec;
use crate::error::CalcError;
use crate::format::format_fixed;
use crate::validation::{FieldSpec, RawInput};

/// A single value in a result record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Money(Decimal),
    Integer(i64),
    Flag(bool),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Formats the value, showing plain numbers with `decimals` places.
    pub fn display(
        &self,
        decimals: usize,
    ) -> String {
        match self {
            FieldValue::Number(v) => format_fixed(*v, decimals),
            FieldValue::Money(v) => format!("{v:.2}"),
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Flag(v) => if *v { "yes" } else { "no" }.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.display(2))
    }
}

/// One labelled line of a result record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultField {
    pub label: &'static str,
    pub value: FieldValue,
    pub unit: Option<&'static str>,
}

impl ResultField {
    pub fn number(
        label: &'static str,
        value: f64,
    ) -> Self {
        Self {
            label,
            value: FieldValue::Number(value),
            unit: None,
        }
    }

    pub fn money(
        label: &'static str,
        value: Decimal,
    ) -> Self {
        Self {
            label,
            value: FieldValue::Money(value),
            unit: None,
        }
    }

    pub fn integer(
        label: &'static str,
        value: i64,
    ) -> Self {
        Self {
            label,
            value: FieldValue::Integer(value),
            unit: None,
        }
    }

    pub fn flag(
        label: &'static str,
        value: bool,
    ) -> Self {
        Self {
            label,
            value: FieldValue::Flag(value),
            unit: None,
        }
    }

    pub fn date(
        label: &'static str,
        value: NaiveDate,
    ) -> Self {
        Self {
            label,
            value: FieldValue::Date(value),
            unit: None,
        }
    }

    pub fn text(
        label: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            label,
            value: FieldValue::Text(value.into()),
            unit: None,
        }
    }

    pub fn with_unit(
        mut self,
        unit: &'static str,
    ) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// Looks up a field by label.
pub fn find_field<'a>(
    fields: &'a [ResultField],
    label: &str,
) -> Option<&'a ResultField> {
    fields.iter().find(|f| f.label == label)
}

/// A self-contained calculator.
///
/// Implementors provide the pure pieces; [`Calculator::evaluate`] ties them
/// together and guarantees that no NaN or infinity reaches the result.
pub trait Calculator {
    /// Typed form state. `Default` holds the values shown when the form loads.
    type Input: Clone + Default + fmt::Debug;

    type Output: Clone + fmt::Debug;

    /// Stable identifier, e.g. `"bmi"`.
    const ID: &'static str;

    /// Human readable title.
    const TITLE: &'static str;

    fn schema() -> &'static [FieldSpec];

    /// Builds a typed input from form text. Absent fields keep their
    /// defaults.
    fn from_raw(raw: &RawInput) -> Result<Self::Input, CalcError>;

    /// Range, domain and consistency checks.
    fn validate(input: &Self::Input) -> Result<(), CalcError>;

    /// The formula. Callers go through [`Calculator::evaluate`], so `input`
    /// has already passed [`Calculator::validate`].
    fn compute(input: &Self::Input) -> Result<Self::Output, CalcError>;

    /// Result record shown to the user.
    fn fields(output: &Self::Output) -> Vec<ResultField>;

    fn chart(_output: &Self::Output) -> Option<ChartSpec> {
        None
    }

    /// Validates then computes, rejecting non-finite results.
    fn evaluate(input: &Self::Input) -> Result<Self::Output, CalcError> {
        Self::validate(input)?;
        let output = Self::compute(input)?;
        if let Some(bad) = Self::fields(&output)
            .iter()
            .find(|f| matches!(f.value, FieldValue::Number(v) if !v.is_finite()))
        {
            tracing::warn!(calculator = Self::ID, field = bad.label, "non-finite result");
            return Err(CalcError::NonFiniteResult(bad.label));
        }
        Ok(output)
    }
}

/// Result fields and chart of one evaluation, detached from the calculator's
/// concrete types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub calculator: &'static str,
    pub fields: Vec<ResultField>,
    pub chart: Option<ChartSpec>,
}

impl Evaluation {
    pub fn field(
        &self,
        label: &str,
    ) -> Option<&ResultField> {
        find_field(&self.fields, label)
    }
}
