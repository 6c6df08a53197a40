//! Resistor colour code decoder for 4, 5 and 6 band resistors.
//!
//! | Bands | Layout |
//! |-------|--------|
//! | 4     | digit, digit, multiplier, tolerance |
//! | 5     | digit, digit, digit, multiplier, tolerance |
//! | 6     | 5-band layout + temperature coefficient |

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::format_compact;
use crate::validation::{FieldSpec, RawInput};

choice_enum! {
    pub enum BandColor ("band color") {
        Black => "black",
        Brown => "brown",
        Red => "red",
        Orange => "orange",
        Yellow => "yellow",
        Green => "green",
        Blue => "blue",
        Violet => "violet" | "purple",
        Grey => "grey" | "gray",
        White => "white",
        Gold => "gold",
        Silver => "silver",
        /// No tolerance band painted.
        Blank => "none",
    }
}

impl BandColor {
    pub fn digit(&self) -> Option<u8> {
        match self {
            Self::Black => Some(0),
            Self::Brown => Some(1),
            Self::Red => Some(2),
            Self::Orange => Some(3),
            Self::Yellow => Some(4),
            Self::Green => Some(5),
            Self::Blue => Some(6),
            Self::Violet => Some(7),
            Self::Grey => Some(8),
            Self::White => Some(9),
            Self::Gold | Self::Silver | Self::Blank => None,
        }
    }

    pub fn multiplier(&self) -> Option<f64> {
        match self {
            Self::Gold => Some(0.1),
            Self::Silver => Some(0.01),
            other => other.digit().map(|d| 10f64.powi(i32::from(d))),
        }
    }

    /// Tolerance in percent.
    pub fn tolerance(&self) -> Option<f64> {
        match self {
            Self::Brown => Some(1.0),
            Self::Red => Some(2.0),
            Self::Green => Some(0.5),
            Self::Blue => Some(0.25),
            Self::Violet => Some(0.1),
            Self::Grey => Some(0.05),
            Self::Gold => Some(5.0),
            Self::Silver => Some(10.0),
            Self::Blank => Some(20.0),
            _ => None,
        }
    }

    /// Temperature coefficient in ppm/K.
    pub fn temperature_coefficient(&self) -> Option<u32> {
        match self {
            Self::Black => Some(250),
            Self::Brown => Some(100),
            Self::Red => Some(50),
            Self::Orange => Some(15),
            Self::Yellow => Some(25),
            Self::Green => Some(20),
            Self::Blue => Some(10),
            Self::Violet => Some(5),
            Self::Grey => Some(1),
            _ => None,
        }
    }
}

const DIGIT_BANDS: [&str; 3] = ["first digit", "second digit", "third digit"];

static SCHEMA: [FieldSpec; 1] = [FieldSpec::choice_list(
    "bands",
    "Band colors (4, 5 or 6)",
    BandColor::NAMES,
)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistorInput {
    pub bands: Vec<BandColor>,
}

impl Default for ResistorInput {
    fn default() -> Self {
        Self {
            bands: vec![
                BandColor::Brown,
                BandColor::Black,
                BandColor::Red,
                BandColor::Gold,
            ],
        }
    }
}

/// Reads a band through `lookup`, failing with [`CalcError::InvalidBand`].
fn band<T>(
    color: BandColor,
    band: &'static str,
    lookup: impl Fn(&BandColor) -> Option<T>,
) -> Result<T, CalcError> {
    lookup(&color).ok_or(CalcError::InvalidBand {
        color: color.as_str(),
        band,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResistorResult {
    /// Ohms.
    pub resistance: f64,
    /// Percent.
    pub tolerance: f64,
    pub min: f64,
    pub max: f64,
    /// ppm/K, six-band resistors only.
    pub temperature_coefficient: Option<u32>,
}

/// Formats ohms with an SI prefix, e.g. `4.7 kΩ`.
///
/// ```
/// use calc_core::calculators::resistor::format_ohms;
///
/// assert_eq!(format_ohms(1000.0), "1 kΩ");
/// assert_eq!(format_ohms(4.7), "4.7 Ω");
/// assert_eq!(format_ohms(2_200_000.0), "2.2 MΩ");
/// ```
pub fn format_ohms(ohms: f64) -> String {
    let (scaled, prefix) = if ohms >= 1e9 {
        (ohms / 1e9, "G")
    } else if ohms >= 1e6 {
        (ohms / 1e6, "M")
    } else if ohms >= 1e3 {
        (ohms / 1e3, "k")
    } else {
        (ohms, "")
    };
    format!("{} {prefix}Ω", format_compact(scaled, 3))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResistorCalculator;

impl Calculator for ResistorCalculator {
    type Input = ResistorInput;
    type Output = ResistorResult;

    const ID: &'static str = "resistor";
    const TITLE: &'static str = "Resistor Color Code Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<ResistorInput, CalcError> {
        Ok(ResistorInput {
            bands: raw.choices_or("bands", &ResistorInput::default().bands)?,
        })
    }

    fn validate(input: &ResistorInput) -> Result<(), CalcError> {
        if !(4..=6).contains(&input.bands.len()) {
            return Err(CalcError::consistency(format!(
                "a resistor has 4, 5 or 6 bands, got {}",
                input.bands.len()
            )));
        }
        // Decoding checks every band position.
        Self::compute(input).map(|_| ())
    }

    fn compute(input: &ResistorInput) -> Result<ResistorResult, CalcError> {
        let bands = &input.bands;
        let digit_count = if bands.len() == 4 { 2 } else { 3 };

        let mut significand = 0u32;
        for (i, color) in bands[..digit_count].iter().enumerate() {
            let digit = band(*color, DIGIT_BANDS[i], BandColor::digit)?;
            significand = significand * 10 + u32::from(digit);
        }
        let multiplier = band(bands[digit_count], "multiplier", BandColor::multiplier)?;
        let tolerance = band(bands[digit_count + 1], "tolerance", BandColor::tolerance)?;
        let temperature_coefficient = match bands.get(digit_count + 2) {
            Some(color) => Some(band(
                *color,
                "temperature coefficient",
                BandColor::temperature_coefficient,
            )?),
            None => None,
        };

        let resistance = f64::from(significand) * multiplier;
        let spread = resistance * tolerance / 100.0;
        Ok(ResistorResult {
            resistance,
            tolerance,
            min: resistance - spread,
            max: resistance + spread,
            temperature_coefficient,
        })
    }

    fn fields(output: &ResistorResult) -> Vec<ResultField> {
        let mut fields = vec![
            ResultField::number("resistance", output.resistance).with_unit("Ω"),
            ResultField::text(
                "display",
                format!(
                    "{} ±{}%",
                    format_ohms(output.resistance),
                    format_compact(output.tolerance, 2)
                ),
            ),
            ResultField::number("tolerance", output.tolerance).with_unit("%"),
            ResultField::number("min", output.min).with_unit("Ω"),
            ResultField::number("max", output.max).with_unit("Ω"),
        ];
        if let Some(tc) = output.temperature_coefficient {
            fields.push(
                ResultField::integer("temperature_coefficient", i64::from(tc)).with_unit("ppm/K"),
            );
        }
        fields
    }

    fn chart(output: &ResistorResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(ChartKind::Bar, "Resistance range")
                .x_axis("", ["Minimum", "Nominal", "Maximum"])
                .y_axis("Ω")
                .series("resistance", vec![output.min, output.resistance, output.max]),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn bands(colors: &str) -> ResistorInput {
        let raw = RawInput::new().with("bands", colors);
        ResistorCalculator::from_raw(&raw).unwrap()
    }

    #[test]
    fn four_band_one_kilohm() {
        let result = ResistorCalculator::evaluate(&ResistorInput::default()).unwrap();

        assert_eq!(result.resistance, 1000.0);
        assert_eq!(result.tolerance, 5.0);
        assert_eq!(result.min, 950.0);
        assert_eq!(result.max, 1050.0);
        assert_eq!(result.temperature_coefficient, None);
    }

    #[test]
    fn five_band_uses_three_digits() {
        let result =
            ResistorCalculator::evaluate(&bands("orange orange white black brown")).unwrap();

        assert_eq!(result.resistance, 339.0);
        assert_eq!(result.tolerance, 1.0);
    }

    #[test]
    fn six_band_reads_temperature_coefficient() {
        let result =
            ResistorCalculator::evaluate(&bands("brown black black red brown red")).unwrap();

        assert_eq!(result.resistance, 10_000.0);
        assert_eq!(result.temperature_coefficient, Some(50));
    }

    #[test]
    fn gold_multiplier_divides_by_ten() {
        let result = ResistorCalculator::evaluate(&bands("yellow violet gold gold")).unwrap();

        assert!((result.resistance - 4.7).abs() < 1e-12);
    }

    #[test]
    fn blank_tolerance_band_is_twenty_percent() {
        let result = ResistorCalculator::evaluate(&bands("red red brown none")).unwrap();

        assert_eq!(result.tolerance, 20.0);
    }

    #[test]
    fn gold_cannot_be_a_digit() {
        assert_eq!(
            ResistorCalculator::evaluate(&bands("gold black red gold")),
            Err(CalcError::InvalidBand {
                color: "gold",
                band: "first digit",
            })
        );
    }

    #[test]
    fn white_has_no_tolerance() {
        assert_eq!(
            ResistorCalculator::evaluate(&bands("brown black red white")),
            Err(CalcError::InvalidBand {
                color: "white",
                band: "tolerance",
            })
        );
    }

    #[test]
    fn white_has_no_temperature_coefficient() {
        assert!(matches!(
            ResistorCalculator::evaluate(&bands("brown black black red brown white")),
            Err(CalcError::InvalidBand {
                band: "temperature coefficient",
                ..
            })
        ));
    }

    #[test]
    fn three_bands_are_rejected() {
        assert!(matches!(
            ResistorCalculator::evaluate(&bands("brown black red")),
            Err(CalcError::Consistency(_))
        ));
    }

    #[test]
    fn gray_spelling_is_accepted() {
        assert_eq!(bands("gray red black gold").bands[0], BandColor::Grey);
    }

    #[test]
    fn display_uses_si_prefix() {
        let result = ResistorCalculator::evaluate(&ResistorInput::default()).unwrap();
        let fields = ResistorCalculator::fields(&result);

        assert_eq!(fields[1].value.display(2), "1 kΩ ±5%");
    }
}
