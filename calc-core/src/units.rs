//! Unit system toggle and the fixed conversion constants shared by the
//! calculators.

choice_enum! {
    /// Metric or imperial entry for a calculator form.
    pub enum UnitSystem ("unit system") {
        Metric => "metric" | "si",
        Imperial => "imperial" | "us",
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::Metric
    }
}

/// Centimetres per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Kilograms per pound.
pub const KG_PER_POUND: f64 = 0.453592;

/// Kilometres per mile.
pub const KM_PER_MILE: f64 = 1.609344;

pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

pub fn kg_to_pounds(kg: f64) -> f64 {
    kg / KG_PER_POUND
}

pub fn pounds_to_kg(pounds: f64) -> f64 {
    pounds * KG_PER_POUND
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / KM_PER_MILE
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph * KM_PER_MILE
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Inputs whose values depend on the active [`UnitSystem`].
///
/// Switching systems converts the values already entered instead of
/// resetting them to defaults.
pub trait UnitConvertible {
    fn units(&self) -> UnitSystem;

    /// Converts every unit-bearing value to `to` and records the new system.
    /// Converting to the current system is a no-op.
    fn convert_units(
        &mut self,
        to: UnitSystem,
    );
}
