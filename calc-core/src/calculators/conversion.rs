//! Unit conversion for length, weight, temperature and volume.
//!
//! Every unit converts through its category's base unit (metre, kilogram,
//! kelvin, litre). Converting between categories is an error.
//!
//! ```
//! use calc_core::calculators::conversion::{convert, Unit};
//!
//! let km: Unit = "km".parse().unwrap();
//! let mi: Unit = "mi".parse().unwrap();
//!
//! let miles = convert(10.0, km, mi).unwrap();
//! assert!((miles - 6.213_711_922).abs() < 1e-9);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::format_compact;
use crate::validation::{Bounds, FieldSpec, RawInput};

choice_enum! {
    pub enum LengthUnit ("length unit") {
        Millimeter => "mm",
        Centimeter => "cm",
        Meter => "m",
        Kilometer => "km",
        Inch => "in",
        Foot => "ft",
        Yard => "yd",
        Mile => "mi",
    }
}

impl LengthUnit {
    /// Metres per unit.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Millimeter => 0.001,
            Self::Centimeter => 0.01,
            Self::Meter => 1.0,
            Self::Kilometer => 1000.0,
            Self::Inch => 0.0254,
            Self::Foot => 0.3048,
            Self::Yard => 0.9144,
            Self::Mile => 1609.344,
        }
    }
}

choice_enum! {
    pub enum WeightUnit ("weight unit") {
        Milligram => "mg",
        Gram => "g",
        Kilogram => "kg",
        Ounce => "oz",
        Pound => "lb",
        Stone => "st",
        Tonne => "t",
    }
}

impl WeightUnit {
    /// Kilograms per unit.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Milligram => 1e-6,
            Self::Gram => 0.001,
            Self::Kilogram => 1.0,
            Self::Ounce => 0.028_349_523_125,
            Self::Pound => 0.453_592_37,
            Self::Stone => 6.350_293_18,
            Self::Tonne => 1000.0,
        }
    }
}

choice_enum! {
    pub enum TemperatureUnit ("temperature unit") {
        Celsius => "c" | "celsius",
        Fahrenheit => "f" | "fahrenheit",
        Kelvin => "k" | "kelvin",
    }
}

impl TemperatureUnit {
    pub fn to_kelvin(
        &self,
        value: f64,
    ) -> f64 {
        match self {
            Self::Celsius => value + 273.15,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0 + 273.15,
            Self::Kelvin => value,
        }
    }

    pub fn from_kelvin(
        &self,
        kelvin: f64,
    ) -> f64 {
        match self {
            Self::Celsius => kelvin - 273.15,
            Self::Fahrenheit => (kelvin - 273.15) * 9.0 / 5.0 + 32.0,
            Self::Kelvin => kelvin,
        }
    }
}

choice_enum! {
    /// US customary volumes.
    pub enum VolumeUnit ("volume unit") {
        Milliliter => "ml",
        Liter => "l",
        Gallon => "gal",
        Quart => "qt",
        Pint => "pt",
        Cup => "cup",
        FluidOunce => "floz" | "fl oz",
        Tablespoon => "tbsp",
        Teaspoon => "tsp",
    }
}

impl VolumeUnit {
    /// Litres per unit.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Milliliter => 0.001,
            Self::Liter => 1.0,
            Self::Gallon => 3.785_411_784,
            Self::Quart => 0.946_352_946,
            Self::Pint => 0.473_176_473,
            Self::Cup => 0.236_588_236_5,
            Self::FluidOunce => 0.029_573_529_562_5,
            Self::Tablespoon => 0.014_786_764_781_25,
            Self::Teaspoon => 0.004_928_921_593_75,
        }
    }
}

/// Any supported unit, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Length(LengthUnit),
    Weight(WeightUnit),
    Temperature(TemperatureUnit),
    Volume(VolumeUnit),
}

impl Unit {
    pub fn category(&self) -> &'static str {
        match self {
            Unit::Length(_) => "length",
            Unit::Weight(_) => "weight",
            Unit::Temperature(_) => "temperature",
            Unit::Volume(_) => "volume",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Length(u) => u.as_str(),
            Unit::Weight(u) => u.as_str(),
            Unit::Temperature(u) => u.as_str(),
            Unit::Volume(u) => u.as_str(),
        }
    }

    /// Every unit in the same category, in table order.
    pub fn siblings(&self) -> Vec<Unit> {
        match self {
            Unit::Length(_) => LengthUnit::ALL.iter().copied().map(Unit::Length).collect(),
            Unit::Weight(_) => WeightUnit::ALL.iter().copied().map(Unit::Weight).collect(),
            Unit::Temperature(_) => TemperatureUnit::ALL
                .iter()
                .copied()
                .map(Unit::Temperature)
                .collect(),
            Unit::Volume(_) => VolumeUnit::ALL.iter().copied().map(Unit::Volume).collect(),
        }
    }

    fn to_base(
        self,
        value: f64,
    ) -> f64 {
        match self {
            Unit::Length(u) => value * u.factor(),
            Unit::Weight(u) => value * u.factor(),
            Unit::Temperature(u) => u.to_kelvin(value),
            Unit::Volume(u) => value * u.factor(),
        }
    }

    fn from_base(
        self,
        base: f64,
    ) -> f64 {
        match self {
            Unit::Length(u) => base / u.factor(),
            Unit::Weight(u) => base / u.factor(),
            Unit::Temperature(u) => u.from_kelvin(base),
            Unit::Volume(u) => base / u.factor(),
        }
    }
}

impl FromStr for Unit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Unit::Length)
            .or_else(|_| s.parse().map(Unit::Weight))
            .or_else(|_| s.parse().map(Unit::Temperature))
            .or_else(|_| s.parse().map(Unit::Volume))
            .map_err(|_| CalcError::unknown_key("unit", s.trim()))
    }
}

impl fmt::Display for Unit {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys accepted by the `from` and `to` fields.
pub const UNIT_NAMES: &[&str] = &[
    "mm", "cm", "m", "km", "in", "ft", "yd", "mi", // length
    "mg", "g", "kg", "oz", "lb", "st", "t", // weight
    "c", "f", "k", // temperature
    "ml", "l", "gal", "qt", "pt", "cup", "floz", "tbsp", "tsp", // volume
];

/// Converts `value` from one unit to another of the same category.
///
/// # Errors
///
/// [`CalcError::IncompatibleUnits`] when the categories differ.
pub fn convert(
    value: f64,
    from: Unit,
    to: Unit,
) -> Result<f64, CalcError> {
    if from.category() != to.category() {
        return Err(CalcError::IncompatibleUnits {
            from: from.as_str(),
            to: to.as_str(),
        });
    }
    Ok(to.from_base(from.to_base(value)))
}

static SCHEMA: [FieldSpec; 3] = [
    FieldSpec::number("value", "Value", None, Some(Bounds::UNBOUNDED)),
    FieldSpec::choice("from", "From", UNIT_NAMES),
    FieldSpec::choice("to", "To", UNIT_NAMES),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionInput {
    pub value: f64,
    pub from: Unit,
    pub to: Unit,
}

impl Default for ConversionInput {
    fn default() -> Self {
        Self {
            value: 10.0,
            from: Unit::Length(LengthUnit::Kilometer),
            to: Unit::Length(LengthUnit::Mile),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub value: f64,
    pub from: Unit,
    pub to: Unit,
    pub result: f64,
    /// The value expressed in every unit of its category.
    pub table: Vec<(Unit, f64)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnitConversionCalculator;

impl Calculator for UnitConversionCalculator {
    type Input = ConversionInput;
    type Output = ConversionResult;

    const ID: &'static str = "unit_conversion";
    const TITLE: &'static str = "Unit Converter";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<ConversionInput, CalcError> {
        let defaults = ConversionInput::default();
        Ok(ConversionInput {
            value: raw.number_or("value", defaults.value)?,
            from: raw.choice_or("from", defaults.from)?,
            to: raw.choice_or("to", defaults.to)?,
        })
    }

    fn validate(input: &ConversionInput) -> Result<(), CalcError> {
        Bounds::UNBOUNDED.check("value", input.value)?;
        if input.from.category() != input.to.category() {
            return Err(CalcError::IncompatibleUnits {
                from: input.from.as_str(),
                to: input.to.as_str(),
            });
        }
        match input.from {
            Unit::Temperature(unit) => {
                if unit.to_kelvin(input.value) < 0.0 {
                    return Err(CalcError::domain(format!(
                        "{} {unit} is below absolute zero",
                        input.value
                    )));
                }
            }
            _ if input.value < 0.0 => {
                return Err(CalcError::domain(format!(
                    "{} cannot be negative, got {}",
                    input.from.category(),
                    input.value
                )));
            }
            _ => {}
        }
        Ok(())
    }

    fn compute(input: &ConversionInput) -> Result<ConversionResult, CalcError> {
        let result = convert(input.value, input.from, input.to)?;
        let table = input
            .from
            .siblings()
            .into_iter()
            .map(|unit| Ok((unit, convert(input.value, input.from, unit)?)))
            .collect::<Result<Vec<_>, CalcError>>()?;

        Ok(ConversionResult {
            value: input.value,
            from: input.from,
            to: input.to,
            result,
            table,
        })
    }

    fn fields(output: &ConversionResult) -> Vec<ResultField> {
        vec![
            ResultField::number("result", output.result).with_unit(output.to.as_str()),
            ResultField::text(
                "summary",
                format!(
                    "{} {} = {} {}",
                    format_compact(output.value, 6),
                    output.from,
                    format_compact(output.result, 6),
                    output.to
                ),
            ),
        ]
    }

    fn chart(output: &ConversionResult) -> Option<ChartSpec> {
        Some(
            ChartSpec::new(
                ChartKind::Bar,
                format!("{} {} in other units", output.value, output.from),
            )
            .x_axis("Unit", output.table.iter().map(|(unit, _)| unit.as_str()))
            .series("value", output.table.iter().map(|(_, v)| *v).collect()),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn unit(key: &str) -> Unit {
        key.parse().unwrap()
    }

    #[test]
    fn unit_names_cover_every_category() {
        let mut expected: Vec<&str> = LengthUnit::NAMES
            .iter()
            .chain(WeightUnit::NAMES)
            .chain(TemperatureUnit::NAMES)
            .chain(VolumeUnit::NAMES)
            .copied()
            .collect();
        let mut names = UNIT_NAMES.to_vec();
        expected.sort_unstable();
        names.sort_unstable();

        assert_eq!(names, expected);
    }

    #[test]
    fn every_unit_key_parses_to_itself() {
        for key in UNIT_NAMES {
            assert_eq!(unit(key).as_str(), *key);
        }
    }

    #[test]
    fn feet_to_metres() {
        assert!((convert(10.0, unit("ft"), unit("m")).unwrap() - 3.048).abs() < 1e-12);
    }

    #[test]
    fn pounds_to_kilograms() {
        assert!((convert(1.0, unit("lb"), unit("kg")).unwrap() - 0.453_592_37).abs() < 1e-12);
    }

    #[test]
    fn boiling_point_in_fahrenheit() {
        assert!((convert(100.0, unit("c"), unit("f")).unwrap() - 212.0).abs() < 1e-9);
        assert!((convert(0.0, unit("k"), unit("c")).unwrap() + 273.15).abs() < 1e-9);
    }

    #[test]
    fn gallon_is_four_quarts() {
        assert!((convert(1.0, unit("gal"), unit("qt")).unwrap() - 4.0).abs() < 1e-9);
        assert!((convert(1.0, unit("tbsp"), unit("tsp")).unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn round_trip_within_relative_tolerance() {
        for key_a in UNIT_NAMES {
            let a = unit(key_a);
            for b in a.siblings() {
                let value = 37.5;
                let there = convert(value, a, b).unwrap();
                let back = convert(there, b, a).unwrap();
                assert!(
                    ((back - value) / value).abs() < 1e-6,
                    "{a} -> {b} -> {a}: {back}"
                );
            }
        }
    }

    #[test]
    fn different_categories_are_incompatible() {
        assert_eq!(
            convert(1.0, unit("kg"), unit("m")),
            Err(CalcError::IncompatibleUnits { from: "kg", to: "m" })
        );
    }

    #[test]
    fn below_absolute_zero_is_rejected() {
        let input = ConversionInput {
            value: -500.0,
            from: unit("f"),
            to: unit("c"),
        };

        assert!(matches!(
            UnitConversionCalculator::evaluate(&input),
            Err(CalcError::Domain(_))
        ));
    }

    #[test]
    fn negative_temperatures_above_absolute_zero_are_fine() {
        let input = ConversionInput {
            value: -40.0,
            from: unit("c"),
            to: unit("f"),
        };

        let result = UnitConversionCalculator::evaluate(&input).unwrap();

        assert!((result.result + 40.0).abs() < 1e-9);
    }

    #[test]
    fn negative_length_is_rejected() {
        let input = ConversionInput {
            value: -1.0,
            ..ConversionInput::default()
        };

        assert!(UnitConversionCalculator::evaluate(&input).is_err());
    }

    #[test]
    fn unknown_unit_key() {
        assert_eq!(
            "furlong".parse::<Unit>(),
            Err(CalcError::unknown_key("unit", "furlong"))
        );
    }

    #[test]
    fn table_lists_whole_category() {
        let result = UnitConversionCalculator::evaluate(&ConversionInput::default()).unwrap();

        assert_eq!(result.table.len(), LengthUnit::ALL.len());
        assert_eq!(result.table[3], (unit("km"), 10.0));
    }

    #[test]
    fn summary_text() {
        let result = UnitConversionCalculator::evaluate(&ConversionInput::default()).unwrap();
        let fields = UnitConversionCalculator::fields(&result);

        assert_eq!(
            fields[1].value.display(2),
            "10 km = 6.213712 mi"
        );
    }
}
