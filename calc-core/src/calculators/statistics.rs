//! Descriptive and inferential statistics calculators.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::{ensure_finite, round_to};
use crate::validation::{Bounds, FieldSpec, RawInput, require_positive};

// ─────────────────────────────────────────────────────────────────────────────
// Normal distribution
// ─────────────────────────────────────────────────────────────────────────────

const AS_P: f64 = 0.231_641_9;
const AS_D: f64 = 0.398_942_3;
const AS_B: [f64; 5] = [0.319_381_5, -0.356_563_8, 1.781_478, -1.821_256, 1.330_274];

/// Standard normal CDF, Abramowitz & Stegun 26.2.17 with seven-digit
/// coefficients (absolute error below 1e-6).
///
/// ```
/// use calc_core::calculators::statistics::normal_cdf;
///
/// assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
/// assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
/// ```
pub fn normal_cdf(z: f64) -> f64 {
    let t = 1.0 / (1.0 + AS_P * z.abs());
    let d = AS_D * (-z * z / 2.0).exp();
    let poly = t * (AS_B[0] + t * (AS_B[1] + t * (AS_B[2] + t * (AS_B[3] + t * AS_B[4]))));
    let upper_tail = d * poly;
    if z >= 0.0 { 1.0 - upper_tail } else { upper_tail }
}

// ─────────────────────────────────────────────────────────────────────────────
// Z-score
// ─────────────────────────────────────────────────────────────────────────────

static Z_SCORE_SCHEMA: [FieldSpec; 3] = [
    FieldSpec::number("value", "Value (x)", None, Some(Bounds::UNBOUNDED)),
    FieldSpec::number("mean", "Mean (μ)", None, Some(Bounds::UNBOUNDED)),
    FieldSpec::number("std_dev", "Standard deviation (σ)", None, None),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreInput {
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Default for ZScoreInput {
    fn default() -> Self {
        Self {
            value: 85.0,
            mean: 70.0,
            std_dev: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreResult {
    pub z: f64,
    /// Percentage of the distribution below `value`.
    pub percentile: f64,
    pub above: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreCalculator;

impl Calculator for ZScoreCalculator {
    type Input = ZScoreInput;
    type Output = ZScoreResult;

    const ID: &'static str = "z_score";
    const TITLE: &'static str = "Z-Score Calculator";

    fn schema() -> &'static [FieldSpec] {
        &Z_SCORE_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<ZScoreInput, CalcError> {
        let defaults = ZScoreInput::default();
        Ok(ZScoreInput {
            value: raw.number_or("value", defaults.value)?,
            mean: raw.number_or("mean", defaults.mean)?,
            std_dev: raw.number_or("std_dev", defaults.std_dev)?,
        })
    }

    fn validate(input: &ZScoreInput) -> Result<(), CalcError> {
        Bounds::UNBOUNDED.check("value", input.value)?;
        Bounds::UNBOUNDED.check("mean", input.mean)?;
        require_positive("standard deviation", input.std_dev)?;
        Ok(())
    }

    fn compute(input: &ZScoreInput) -> Result<ZScoreResult, CalcError> {
        let z = (input.value - input.mean) / input.std_dev;
        let percentile = normal_cdf(z) * 100.0;
        Ok(ZScoreResult {
            z,
            percentile,
            above: 100.0 - percentile,
        })
    }

    fn fields(output: &ZScoreResult) -> Vec<ResultField> {
        vec![
            ResultField::number("z_score", output.z),
            ResultField::number("percentile", output.percentile).with_unit("%"),
            ResultField::number("above", output.above).with_unit("%"),
        ]
    }

    fn chart(output: &ZScoreResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Gauge, "Percentile")
                .series("percentile", vec![round_to(output.percentile, 2)])
                .marker("-2σ", 2.28)
                .marker("-1σ", 15.87)
                .marker("mean", 50.0)
                .marker("+1σ", 84.13)
                .marker("+2σ", 97.72),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Percent error
// ─────────────────────────────────────────────────────────────────────────────

static PERCENT_ERROR_SCHEMA: [FieldSpec; 2] = [
    FieldSpec::number(
        "experimental",
        "Experimental value",
        None,
        Some(Bounds::UNBOUNDED),
    ),
    FieldSpec::number(
        "theoretical",
        "Theoretical value",
        None,
        Some(Bounds::UNBOUNDED),
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentErrorInput {
    pub experimental: f64,
    pub theoretical: f64,
}

impl Default for PercentErrorInput {
    fn default() -> Self {
        Self {
            experimental: 9.6,
            theoretical: 9.81,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentErrorResult {
    pub experimental: f64,
    pub theoretical: f64,
    pub absolute_error: f64,
    pub percent_error: f64,
    /// True when the experimental value is above the theoretical one.
    pub overestimate: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PercentErrorCalculator;

impl Calculator for PercentErrorCalculator {
    type Input = PercentErrorInput;
    type Output = PercentErrorResult;

    const ID: &'static str = "percent_error";
    const TITLE: &'static str = "Percent Error Calculator";

    fn schema() -> &'static [FieldSpec] {
        &PERCENT_ERROR_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<PercentErrorInput, CalcError> {
        let defaults = PercentErrorInput::default();
        Ok(PercentErrorInput {
            experimental: raw.number_or("experimental", defaults.experimental)?,
            theoretical: raw.number_or("theoretical", defaults.theoretical)?,
        })
    }

    fn validate(input: &PercentErrorInput) -> Result<(), CalcError> {
        Bounds::UNBOUNDED.check("experimental", input.experimental)?;
        Bounds::UNBOUNDED.check("theoretical", input.theoretical)?;
        if input.theoretical == 0.0 {
            return Err(CalcError::DivisionByZero("theoretical value"));
        }
        Ok(())
    }

    fn compute(input: &PercentErrorInput) -> Result<PercentErrorResult, CalcError> {
        let absolute_error = (input.experimental - input.theoretical).abs();
        Ok(PercentErrorResult {
            experimental: input.experimental,
            theoretical: input.theoretical,
            absolute_error,
            percent_error: absolute_error / input.theoretical.abs() * 100.0,
            overestimate: input.experimental > input.theoretical,
        })
    }

    fn fields(output: &PercentErrorResult) -> Vec<ResultField> {
        vec![
            ResultField::number("percent_error", output.percent_error).with_unit("%"),
            ResultField::number("absolute_error", output.absolute_error),
            ResultField::flag("overestimate", output.overestimate),
        ]
    }

    fn chart(output: &PercentErrorResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Bar, "Experimental vs. theoretical")
                .x_axis("", ["Experimental", "Theoretical"])
                .series("value", vec![output.experimental, output.theoretical]),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Standard deviation
// ─────────────────────────────────────────────────────────────────────────────

choice_enum! {
    /// Divisor used for the variance.
    pub enum Dispersion ("standard deviation mode") {
        /// Divide by n.
        Population => "population",
        /// Divide by n − 1.
        Sample => "sample",
    }
}

static STD_DEV_SCHEMA: [FieldSpec; 2] = [
    FieldSpec::choice("mode", "Mode", Dispersion::NAMES),
    FieldSpec::number_list("values", "Values"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDeviationInput {
    pub mode: Dispersion,
    pub values: Vec<f64>,
}

impl Default for StandardDeviationInput {
    fn default() -> Self {
        Self {
            mode: Dispersion::Population,
            values: vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDeviationResult {
    pub mode: Dispersion,
    pub values: Vec<f64>,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDeviationCalculator;

impl Calculator for StandardDeviationCalculator {
    type Input = StandardDeviationInput;
    type Output = StandardDeviationResult;

    const ID: &'static str = "standard_deviation";
    const TITLE: &'static str = "Standard Deviation Calculator";

    fn schema() -> &'static [FieldSpec] {
        &STD_DEV_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<StandardDeviationInput, CalcError> {
        let defaults = StandardDeviationInput::default();
        Ok(StandardDeviationInput {
            mode: raw.choice_or("mode", defaults.mode)?,
            values: raw.numbers_or("values", &defaults.values)?,
        })
    }

    fn validate(input: &StandardDeviationInput) -> Result<(), CalcError> {
        let needed = match input.mode {
            Dispersion::Population => 1,
            Dispersion::Sample => 2,
        };
        if input.values.len() < needed {
            return Err(CalcError::consistency(format!(
                "{} standard deviation needs at least {needed} value(s), got {}",
                input.mode,
                input.values.len()
            )));
        }
        for value in &input.values {
            Bounds::UNBOUNDED.check("values", *value)?;
        }
        Ok(())
    }

    fn compute(input: &StandardDeviationInput) -> Result<StandardDeviationResult, CalcError> {
        let count = input.values.len();
        let n = count as f64;
        let sum: f64 = input.values.iter().sum();
        let mean = sum / n;
        let squares: f64 = input.values.iter().map(|v| (v - mean).powi(2)).sum();
        let divisor = match input.mode {
            Dispersion::Population => n,
            Dispersion::Sample => n - 1.0,
        };
        let variance = squares / divisor;

        Ok(StandardDeviationResult {
            mode: input.mode,
            values: input.values.clone(),
            count,
            sum,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    fn fields(output: &StandardDeviationResult) -> Vec<ResultField> {
        vec![
            ResultField::text("mode", output.mode.as_str()),
            ResultField::integer("count", output.count as i64),
            ResultField::number("sum", output.sum),
            ResultField::number("mean", output.mean),
            ResultField::number("variance", output.variance),
            ResultField::number("std_dev", output.std_dev),
        ]
    }

    fn chart(output: &StandardDeviationResult) -> Option<ChartSpec> {
        let labels = (1..=output.count).map(|i| i.to_string());
        Some(
            ChartSpec::new(ChartKind::Bar, "Values and mean")
                .x_axis("Value #", labels)
                .series("value", output.values.clone())
                .series("mean", vec![output.mean; output.count]),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sample size
// ─────────────────────────────────────────────────────────────────────────────

choice_enum! {
    pub enum ConfidenceLevel ("confidence level") {
        Eighty => "80" | "80%",
        EightyFive => "85" | "85%",
        Ninety => "90" | "90%",
        NinetyFive => "95" | "95%",
        NinetyNine => "99" | "99%",
    }
}

impl ConfidenceLevel {
    /// Two-sided critical value of the standard normal distribution.
    pub fn z(&self) -> f64 {
        match self {
            Self::Eighty => 1.28,
            Self::EightyFive => 1.44,
            Self::Ninety => 1.645,
            Self::NinetyFive => 1.96,
            Self::NinetyNine => 2.576,
        }
    }
}

const MARGIN: Bounds = Bounds::new(0.0, 50.0);

static SAMPLE_SIZE_SCHEMA: [FieldSpec; 4] = [
    FieldSpec::choice("confidence", "Confidence level (%)", ConfidenceLevel::NAMES),
    FieldSpec::number("margin", "Margin of error", Some("%"), Some(MARGIN)),
    FieldSpec::number("proportion", "Expected proportion", Some("%"), Some(Bounds::PERCENT)),
    FieldSpec::number(
        "population",
        "Population size (optional)",
        None,
        Some(Bounds::new(1.0, 1e12)),
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeInput {
    pub confidence: ConfidenceLevel,
    /// Margin of error, percent.
    pub margin: f64,
    /// Expected proportion, percent.
    pub proportion: f64,
    /// Finite population size; `None` for an unbounded population.
    pub population: Option<u64>,
}

impl Default for SampleSizeInput {
    fn default() -> Self {
        Self {
            confidence: ConfidenceLevel::NinetyFive,
            margin: 5.0,
            proportion: 50.0,
            population: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeResult {
    pub z: f64,
    /// Required sample size, rounded up.
    pub sample_size: u64,
    /// Sample size before the finite population correction, rounded up.
    pub unbounded_sample_size: u64,
    /// Sample size for margins of 1 % to 10 %, for the chart.
    pub by_margin: Vec<(f64, u64)>,
}

fn required_sample(
    z: f64,
    margin: f64,
    proportion: f64,
    population: Option<u64>,
) -> Result<(f64, f64), CalcError> {
    let e = margin / 100.0;
    let p = proportion / 100.0;
    let n0 = z * z * p * (1.0 - p) / (e * e);
    let n = match population {
        // n0 = 0 against a population of 1 is 0 / 0
        Some(size) => n0 / (1.0 + (n0 - 1.0) / size as f64),
        None => n0,
    };
    Ok((n0, ensure_finite(n, "sample size")?))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSizeCalculator;

impl Calculator for SampleSizeCalculator {
    type Input = SampleSizeInput;
    type Output = SampleSizeResult;

    const ID: &'static str = "sample_size";
    const TITLE: &'static str = "Sample Size Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SAMPLE_SIZE_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<SampleSizeInput, CalcError> {
        let defaults = SampleSizeInput::default();
        let population = match raw.optional_number("population")? {
            Some(size) if size.fract() != 0.0 || size < 1.0 => {
                return Err(CalcError::Parse {
                    field: "population".to_string(),
                    input: raw.get("population").unwrap_or_default().to_string(),
                    expected: "whole number of at least 1",
                });
            }
            Some(size) => Some(size as u64),
            None => defaults.population,
        };
        Ok(SampleSizeInput {
            confidence: raw.choice_or("confidence", defaults.confidence)?,
            margin: raw.number_or("margin", defaults.margin)?,
            proportion: raw.number_or("proportion", defaults.proportion)?,
            population,
        })
    }

    fn validate(input: &SampleSizeInput) -> Result<(), CalcError> {
        MARGIN.check("margin", input.margin)?;
        require_positive("margin of error", input.margin)?;
        Bounds::PERCENT.check("proportion", input.proportion)?;
        if input.population == Some(0) {
            return Err(CalcError::domain("population size must be at least 1"));
        }
        Ok(())
    }

    fn compute(input: &SampleSizeInput) -> Result<SampleSizeResult, CalcError> {
        let z = input.confidence.z();
        let (n0, n) = required_sample(z, input.margin, input.proportion, input.population)?;

        let by_margin = (1..=10)
            .map(|m| {
                let margin = f64::from(m);
                required_sample(z, margin, input.proportion, input.population)
                    .map(|(_, n)| (margin, n.ceil() as u64))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SampleSizeResult {
            z,
            sample_size: n.ceil() as u64,
            unbounded_sample_size: n0.ceil() as u64,
            by_margin,
        })
    }

    fn fields(output: &SampleSizeResult) -> Vec<ResultField> {
        vec![
            ResultField::integer("sample_size", output.sample_size as i64),
            ResultField::integer("unbounded_sample_size", output.unbounded_sample_size as i64),
            ResultField::number("z", output.z),
        ]
    }

    fn chart(output: &SampleSizeResult) -> Option<ChartSpec> {
        let margins = output.by_margin.iter().map(|(m, _)| format!("{m}%"));
        Some(
            ChartSpec::new(ChartKind::Line, "Sample size by margin of error")
                .x_axis("Margin of error", margins)
                .y_axis("Sample size")
                .series(
                    "sample_size",
                    output.by_margin.iter().map(|(_, n)| *n as f64).collect(),
                ),
        )
    }
}
