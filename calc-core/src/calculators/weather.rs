//! Apparent temperature and humidity calculators.
//!
//! The heat index and wind chill regressions are defined in °F (and mph).
//! Metric input is converted before the regression and the result converted
//! back, so every output is in the unit system that was entered.
//!
//! Outside their fitted range both regressions return the entered
//! temperature unchanged and report `adjusted = false`.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_to;
use crate::units::{
    KM_PER_MILE, UnitConvertible, UnitSystem, celsius_to_fahrenheit, fahrenheit_to_celsius,
    kmh_to_mph, mph_to_kmh,
};
use crate::validation::{Bounds, FieldSpec, RawInput};

const HUMIDITY: Bounds = Bounds::PERCENT;

fn temperature_unit(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "°C",
        UnitSystem::Imperial => "°F",
    }
}

fn to_fahrenheit(
    units: UnitSystem,
    temperature: f64,
) -> f64 {
    match units {
        UnitSystem::Metric => celsius_to_fahrenheit(temperature),
        UnitSystem::Imperial => temperature,
    }
}

fn from_fahrenheit(
    units: UnitSystem,
    fahrenheit: f64,
) -> f64 {
    match units {
        UnitSystem::Metric => fahrenheit_to_celsius(fahrenheit),
        UnitSystem::Imperial => fahrenheit,
    }
}

fn convert_temperature(
    from: UnitSystem,
    to: UnitSystem,
    temperature: f64,
) -> f64 {
    from_fahrenheit(to, to_fahrenheit(from, temperature))
}

/// Bar chart comparing the entered temperature with a derived one.
fn comparison_chart(
    title: &str,
    units: UnitSystem,
    entered: f64,
    derived_label: &str,
    derived: f64,
) -> ChartSpec {
    ChartSpec::new(ChartKind::Bar, title)
        .x_axis("", ["Air temperature", derived_label])
        .y_axis(temperature_unit(units))
        .series(
            "temperature",
            vec![round_to(entered, 1), round_to(derived, 1)],
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Heat index
// ─────────────────────────────────────────────────────────────────────────────

/// Lowest air temperature (°F) the heat index regression applies to.
pub const HEAT_INDEX_MIN_F: f64 = 80.0;

const HEAT_TEMP_C: Bounds = Bounds::new(-40.0, 65.0);
const HEAT_TEMP_F: Bounds = HEAT_TEMP_C.celsius_to_fahrenheit();

static HEAT_INDEX_SCHEMA: [FieldSpec; 3] = [
    FieldSpec::choice("units", "Units", UnitSystem::NAMES),
    FieldSpec::number("temperature", "Air temperature (°C or °F)", None, None),
    FieldSpec::number("humidity", "Relative humidity", Some("%"), Some(HUMIDITY)),
];

choice_enum! {
    /// NWS heat index risk bands.
    pub enum HeatRisk ("heat risk") {
        Minimal => "No significant risk",
        Caution => "Caution",
        ExtremeCaution => "Extreme caution",
        Danger => "Danger",
        ExtremeDanger => "Extreme danger",
    }
}

impl HeatRisk {
    pub fn from_fahrenheit(heat_index: f64) -> Self {
        if heat_index < 80.0 {
            Self::Minimal
        } else if heat_index < 90.0 {
            Self::Caution
        } else if heat_index < 103.0 {
            Self::ExtremeCaution
        } else if heat_index < 125.0 {
            Self::Danger
        } else {
            Self::ExtremeDanger
        }
    }
}

/// Rothfusz regression, °F and percent relative humidity.
pub fn rothfusz(
    t: f64,
    rh: f64,
) -> f64 {
    -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIndexInput {
    pub units: UnitSystem,
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for HeatIndexInput {
    fn default() -> Self {
        Self {
            units: UnitSystem::Imperial,
            temperature: 90.0,
            humidity: 60.0,
        }
    }
}

impl UnitConvertible for HeatIndexInput {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn convert_units(
        &mut self,
        to: UnitSystem,
    ) {
        self.temperature = convert_temperature(self.units, to, self.temperature);
        self.units = to;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIndexResult {
    pub units: UnitSystem,
    pub temperature: f64,
    /// Apparent temperature in the entered unit.
    pub heat_index: f64,
    /// False when the temperature was below the regression's range.
    pub adjusted: bool,
    pub risk: HeatRisk,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeatIndexCalculator;

impl Calculator for HeatIndexCalculator {
    type Input = HeatIndexInput;
    type Output = HeatIndexResult;

    const ID: &'static str = "heat_index";
    const TITLE: &'static str = "Heat Index Calculator";

    fn schema() -> &'static [FieldSpec] {
        &HEAT_INDEX_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<HeatIndexInput, CalcError> {
        let units = raw.choice_or("units", UnitSystem::Imperial)?;
        let mut defaults = HeatIndexInput::default();
        defaults.convert_units(units);
        Ok(HeatIndexInput {
            units,
            temperature: raw.number_or("temperature", round_to(defaults.temperature, 1))?,
            humidity: raw.number_or("humidity", defaults.humidity)?,
        })
    }

    fn validate(input: &HeatIndexInput) -> Result<(), CalcError> {
        let range = match input.units {
            UnitSystem::Metric => HEAT_TEMP_C,
            UnitSystem::Imperial => HEAT_TEMP_F,
        };
        range.check("temperature", input.temperature)?;
        HUMIDITY.check("humidity", input.humidity)?;
        Ok(())
    }

    fn compute(input: &HeatIndexInput) -> Result<HeatIndexResult, CalcError> {
        let t = to_fahrenheit(input.units, input.temperature);

        let (heat_index_f, adjusted) = if t >= HEAT_INDEX_MIN_F {
            (rothfusz(t, input.humidity), true)
        } else {
            warn!(
                temperature_f = t,
                "below heat index range; returning air temperature"
            );
            (t, false)
        };

        Ok(HeatIndexResult {
            units: input.units,
            temperature: input.temperature,
            heat_index: if adjusted {
                from_fahrenheit(input.units, heat_index_f)
            } else {
                input.temperature
            },
            adjusted,
            risk: HeatRisk::from_fahrenheit(heat_index_f),
        })
    }

    fn fields(output: &HeatIndexResult) -> Vec<ResultField> {
        vec![
            ResultField::number("heat_index", output.heat_index)
                .with_unit(temperature_unit(output.units)),
            ResultField::flag("adjusted", output.adjusted),
            ResultField::text("risk", output.risk.as_str()),
        ]
    }

    fn chart(output: &HeatIndexResult) -> Option<ChartSpec> {
        Some(comparison_chart(
            "Air temperature vs. heat index",
            output.units,
            output.temperature,
            "Heat index",
            output.heat_index,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wind chill
// ─────────────────────────────────────────────────────────────────────────────

/// Highest air temperature (°F) the wind chill formula applies to.
pub const WIND_CHILL_MAX_F: f64 = 50.0;

/// Wind speed (mph) the formula requires to be exceeded.
pub const WIND_CHILL_MIN_MPH: f64 = 3.0;

const CHILL_TEMP_C: Bounds = Bounds::new(-60.0, 50.0);
const CHILL_TEMP_F: Bounds = CHILL_TEMP_C.celsius_to_fahrenheit();
const WIND_KMH: Bounds = Bounds::new(0.0, 240.0);
const WIND_MPH: Bounds = WIND_KMH.divided_by(KM_PER_MILE);

static WIND_CHILL_SCHEMA: [FieldSpec; 3] = [
    FieldSpec::choice("units", "Units", UnitSystem::NAMES),
    FieldSpec::number("temperature", "Air temperature (°C or °F)", None, None),
    FieldSpec::number("wind_speed", "Wind speed (km/h or mph)", None, None),
];

choice_enum! {
    pub enum FrostbiteRisk ("frostbite risk") {
        Low => "Low",
        Moderate => "Moderate (frostbite within 30 minutes)",
        High => "High (frostbite within 10 minutes)",
    }
}

impl FrostbiteRisk {
    pub fn from_fahrenheit(wind_chill: f64) -> Self {
        if wind_chill <= -35.0 {
            Self::High
        } else if wind_chill <= -18.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// NWS wind chill formula, °F and mph.
pub fn nws_wind_chill(
    t: f64,
    v: f64,
) -> f64 {
    let v16 = v.powf(0.16);
    35.74 + 0.6215 * t - 35.75 * v16 + 0.4275 * t * v16
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindChillInput {
    pub units: UnitSystem,
    pub temperature: f64,
    /// km/h (metric) or mph (imperial).
    pub wind_speed: f64,
}

impl Default for WindChillInput {
    fn default() -> Self {
        Self {
            units: UnitSystem::Imperial,
            temperature: 20.0,
            wind_speed: 15.0,
        }
    }
}

impl UnitConvertible for WindChillInput {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn convert_units(
        &mut self,
        to: UnitSystem,
    ) {
        self.temperature = convert_temperature(self.units, to, self.temperature);
        self.wind_speed = match (self.units, to) {
            (UnitSystem::Metric, UnitSystem::Imperial) => kmh_to_mph(self.wind_speed),
            (UnitSystem::Imperial, UnitSystem::Metric) => mph_to_kmh(self.wind_speed),
            _ => self.wind_speed,
        };
        self.units = to;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindChillResult {
    pub units: UnitSystem,
    pub temperature: f64,
    pub wind_chill: f64,
    pub adjusted: bool,
    pub risk: FrostbiteRisk,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindChillCalculator;

impl Calculator for WindChillCalculator {
    type Input = WindChillInput;
    type Output = WindChillResult;

    const ID: &'static str = "wind_chill";
    const TITLE: &'static str = "Wind Chill Calculator";

    fn schema() -> &'static [FieldSpec] {
        &WIND_CHILL_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<WindChillInput, CalcError> {
        let units = raw.choice_or("units", UnitSystem::Imperial)?;
        let mut defaults = WindChillInput::default();
        defaults.convert_units(units);
        Ok(WindChillInput {
            units,
            temperature: raw.number_or("temperature", round_to(defaults.temperature, 1))?,
            wind_speed: raw.number_or("wind_speed", round_to(defaults.wind_speed, 1))?,
        })
    }

    fn validate(input: &WindChillInput) -> Result<(), CalcError> {
        let (temperature, wind) = match input.units {
            UnitSystem::Metric => (CHILL_TEMP_C, WIND_KMH),
            UnitSystem::Imperial => (CHILL_TEMP_F, WIND_MPH),
        };
        temperature.check("temperature", input.temperature)?;
        wind.check("wind_speed", input.wind_speed)?;
        Ok(())
    }

    fn compute(input: &WindChillInput) -> Result<WindChillResult, CalcError> {
        let t = to_fahrenheit(input.units, input.temperature);
        let v = match input.units {
            UnitSystem::Metric => kmh_to_mph(input.wind_speed),
            UnitSystem::Imperial => input.wind_speed,
        };

        let adjusted = t <= WIND_CHILL_MAX_F && v > WIND_CHILL_MIN_MPH;
        let wind_chill_f = if adjusted {
            nws_wind_chill(t, v)
        } else {
            warn!(
                temperature_f = t,
                wind_mph = v,
                "outside wind chill range; returning air temperature"
            );
            t
        };

        Ok(WindChillResult {
            units: input.units,
            temperature: input.temperature,
            wind_chill: if adjusted {
                from_fahrenheit(input.units, wind_chill_f)
            } else {
                input.temperature
            },
            adjusted,
            risk: FrostbiteRisk::from_fahrenheit(wind_chill_f),
        })
    }

    fn fields(output: &WindChillResult) -> Vec<ResultField> {
        vec![
            ResultField::number("wind_chill", output.wind_chill)
                .with_unit(temperature_unit(output.units)),
            ResultField::flag("adjusted", output.adjusted),
            ResultField::text("frostbite_risk", output.risk.as_str()),
        ]
    }

    fn chart(output: &WindChillResult) -> Option<ChartSpec> {
        Some(comparison_chart(
            "Air temperature vs. wind chill",
            output.units,
            output.temperature,
            "Wind chill",
            output.wind_chill,
        ))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dew point
// ─────────────────────────────────────────────────────────────────────────────

const MAGNUS_A: f64 = 17.27;
const MAGNUS_B: f64 = 237.7;

const DEW_TEMP_C: Bounds = Bounds::new(-60.0, 60.0);
const DEW_TEMP_F: Bounds = DEW_TEMP_C.celsius_to_fahrenheit();

static DEW_POINT_SCHEMA: [FieldSpec; 3] = [
    FieldSpec::choice("units", "Units", UnitSystem::NAMES),
    FieldSpec::number("temperature", "Air temperature (°C or °F)", None, None),
    FieldSpec::number("humidity", "Relative humidity", Some("%"), Some(HUMIDITY)),
];

choice_enum! {
    pub enum Comfort ("comfort level") {
        Dry => "Dry",
        Comfortable => "Comfortable",
        SlightlyHumid => "Slightly humid",
        Humid => "Humid",
        VeryHumid => "Very humid",
        Oppressive => "Oppressive",
    }
}

impl Comfort {
    pub fn from_celsius(dew_point: f64) -> Self {
        if dew_point < 10.0 {
            Self::Dry
        } else if dew_point < 16.0 {
            Self::Comfortable
        } else if dew_point < 18.0 {
            Self::SlightlyHumid
        } else if dew_point < 21.0 {
            Self::Humid
        } else if dew_point < 24.0 {
            Self::VeryHumid
        } else {
            Self::Oppressive
        }
    }
}

/// Magnus approximation of the dew point, °C and percent relative humidity.
///
/// ```
/// use calc_core::calculators::weather::magnus_dew_point;
///
/// // saturated air: dew point equals air temperature
/// assert!((magnus_dew_point(20.0, 100.0) - 20.0).abs() < 1e-9);
/// ```
pub fn magnus_dew_point(
    t: f64,
    rh: f64,
) -> f64 {
    let gamma = (rh / 100.0).ln() + MAGNUS_A * t / (MAGNUS_B + t);
    MAGNUS_B * gamma / (MAGNUS_A - gamma)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DewPointInput {
    pub units: UnitSystem,
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for DewPointInput {
    fn default() -> Self {
        Self {
            units: UnitSystem::Metric,
            temperature: 25.0,
            humidity: 60.0,
        }
    }
}

impl UnitConvertible for DewPointInput {
    fn units(&self) -> UnitSystem {
        self.units
    }

    fn convert_units(
        &mut self,
        to: UnitSystem,
    ) {
        self.temperature = convert_temperature(self.units, to, self.temperature);
        self.units = to;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DewPointResult {
    pub units: UnitSystem,
    pub temperature: f64,
    pub dew_point: f64,
    pub comfort: Comfort,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DewPointCalculator;

impl Calculator for DewPointCalculator {
    type Input = DewPointInput;
    type Output = DewPointResult;

    const ID: &'static str = "dew_point";
    const TITLE: &'static str = "Dew Point Calculator";

    fn schema() -> &'static [FieldSpec] {
        &DEW_POINT_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<DewPointInput, CalcError> {
        let units = raw.choice_or("units", UnitSystem::Metric)?;
        let mut defaults = DewPointInput::default();
        defaults.convert_units(units);
        Ok(DewPointInput {
            units,
            temperature: raw.number_or("temperature", round_to(defaults.temperature, 1))?,
            humidity: raw.number_or("humidity", defaults.humidity)?,
        })
    }

    fn validate(input: &DewPointInput) -> Result<(), CalcError> {
        let range = match input.units {
            UnitSystem::Metric => DEW_TEMP_C,
            UnitSystem::Imperial => DEW_TEMP_F,
        };
        range.check("temperature", input.temperature)?;
        HUMIDITY.check("humidity", input.humidity)?;
        if input.humidity == 0.0 {
            return Err(CalcError::domain(
                "relative humidity must be greater than 0% to have a dew point",
            ));
        }
        Ok(())
    }

    fn compute(input: &DewPointInput) -> Result<DewPointResult, CalcError> {
        let celsius = match input.units {
            UnitSystem::Metric => input.temperature,
            UnitSystem::Imperial => fahrenheit_to_celsius(input.temperature),
        };
        let dew_point_c = magnus_dew_point(celsius, input.humidity);

        Ok(DewPointResult {
            units: input.units,
            temperature: input.temperature,
            dew_point: match input.units {
                UnitSystem::Metric => dew_point_c,
                UnitSystem::Imperial => celsius_to_fahrenheit(dew_point_c),
            },
            comfort: Comfort::from_celsius(dew_point_c),
        })
    }

    fn fields(output: &DewPointResult) -> Vec<ResultField> {
        vec![
            ResultField::number("dew_point", output.dew_point)
                .with_unit(temperature_unit(output.units)),
            ResultField::text("comfort", output.comfort.as_str()),
        ]
    }

    fn chart(output: &DewPointResult) -> Option<ChartSpec> {
        Some(comparison_chart(
            "Air temperature vs. dew point",
            output.units,
            output.temperature,
            "Dew point",
            output.dew_point,
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Routes `warn!` output to the test harness.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn heat(
        units: UnitSystem,
        temperature: f64,
        humidity: f64,
    ) -> HeatIndexInput {
        HeatIndexInput {
            units,
            temperature,
            humidity,
        }
    }

    fn chill(
        units: UnitSystem,
        temperature: f64,
        wind_speed: f64,
    ) -> WindChillInput {
        WindChillInput {
            units,
            temperature,
            wind_speed,
        }
    }

    // ── heat index ──────────────────────────────────────────────────────────

    #[test]
    fn heat_index_at_ninety_degrees_sixty_percent() {
        let result = HeatIndexCalculator::evaluate(&HeatIndexInput::default()).unwrap();

        assert!(result.adjusted);
        assert!((result.heat_index - 100.0).abs() < 1.0, "{}", result.heat_index);
        assert_eq!(result.risk, HeatRisk::ExtremeCaution);
    }

    #[test]
    fn heat_index_below_eighty_returns_input() {
        let _guard = init_test_tracing();
        let result = HeatIndexCalculator::evaluate(&heat(UnitSystem::Imperial, 75.0, 90.0)).unwrap();

        assert!(!result.adjusted);
        assert_eq!(result.heat_index, 75.0);
        assert_eq!(result.risk, HeatRisk::Minimal);
    }

    #[test]
    fn heat_index_metric_matches_imperial() {
        let imperial = heat(UnitSystem::Imperial, 95.0, 50.0);
        let mut metric = imperial.clone();
        metric.convert_units(UnitSystem::Metric);

        let f = HeatIndexCalculator::evaluate(&imperial).unwrap().heat_index;
        let c = HeatIndexCalculator::evaluate(&metric).unwrap().heat_index;

        assert!((celsius_to_fahrenheit(c) - f).abs() < 1e-9);
    }

    #[test]
    fn heat_index_rejects_humidity_above_hundred() {
        assert!(matches!(
            HeatIndexCalculator::evaluate(&heat(UnitSystem::Imperial, 90.0, 101.0)),
            Err(CalcError::OutOfRange { .. })
        ));
    }

    // ── wind chill ──────────────────────────────────────────────────────────

    #[test]
    fn wind_chill_matches_nws_table() {
        // NWS chart: 0 °F at 15 mph feels like -19 °F
        let result = WindChillCalculator::evaluate(&chill(UnitSystem::Imperial, 0.0, 15.0)).unwrap();

        assert!(result.adjusted);
        assert_eq!(round_to(result.wind_chill, 0), -19.0);
        assert_eq!(result.risk, FrostbiteRisk::Moderate);
    }

    #[test]
    fn wind_chill_above_fifty_degrees_returns_input() {
        let _guard = init_test_tracing();
        let result = WindChillCalculator::evaluate(&chill(UnitSystem::Imperial, 60.0, 10.0)).unwrap();

        assert!(!result.adjusted);
        assert_eq!(result.wind_chill, 60.0);
    }

    #[test]
    fn wind_chill_in_calm_air_returns_input() {
        let result = WindChillCalculator::evaluate(&chill(UnitSystem::Imperial, 20.0, 3.0)).unwrap();

        assert!(!result.adjusted);
        assert_eq!(result.wind_chill, 20.0);
    }

    #[test]
    fn wind_chill_metric_uses_kmh() {
        let imperial = chill(UnitSystem::Imperial, 10.0, 20.0);
        let mut metric = imperial.clone();
        metric.convert_units(UnitSystem::Metric);

        let f = WindChillCalculator::evaluate(&imperial).unwrap().wind_chill;
        let c = WindChillCalculator::evaluate(&metric).unwrap().wind_chill;

        assert!((celsius_to_fahrenheit(c) - f).abs() < 1e-9);
    }

    #[test]
    fn wind_chill_rejects_negative_wind() {
        assert!(WindChillCalculator::evaluate(&chill(UnitSystem::Imperial, 10.0, -1.0)).is_err());
    }

    // ── dew point ───────────────────────────────────────────────────────────

    #[test]
    fn dew_point_of_typical_summer_air() {
        let result = DewPointCalculator::evaluate(&DewPointInput::default()).unwrap();

        // 25 °C at 60 % is about 16.7 °C
        assert!((result.dew_point - 16.7).abs() < 0.1, "{}", result.dew_point);
        assert_eq!(result.comfort, Comfort::SlightlyHumid);
    }

    #[test]
    fn dew_point_never_exceeds_air_temperature() {
        for rh in [5.0, 25.0, 50.0, 75.0, 99.0] {
            let input = DewPointInput {
                humidity: rh,
                ..DewPointInput::default()
            };
            let result = DewPointCalculator::evaluate(&input).unwrap();
            assert!(result.dew_point < result.temperature);
        }
    }

    #[test]
    fn dew_point_zero_humidity_is_a_domain_error() {
        let input = DewPointInput {
            humidity: 0.0,
            ..DewPointInput::default()
        };

        assert!(matches!(
            DewPointCalculator::evaluate(&input),
            Err(CalcError::Domain(_))
        ));
    }

    #[test]
    fn dew_point_imperial_output_in_fahrenheit() {
        let mut input = DewPointInput::default();
        input.convert_units(UnitSystem::Imperial);

        let result = DewPointCalculator::evaluate(&input).unwrap();

        assert_eq!(input.temperature, 77.0);
        assert!((fahrenheit_to_celsius(result.dew_point) - 16.7).abs() < 0.1);
    }
}
