//! Molarity of a solution from solute mass and solution volume.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::error::CalcError;
use crate::validation::{Bounds, FieldSpec, RawInput, require_positive};

choice_enum! {
    /// Common solutes with tabulated molar masses.
    pub enum Solute ("solute") {
        SodiumChloride => "nacl",
        PotassiumChloride => "kcl",
        Glucose => "glucose",
        Sucrose => "sucrose",
        SodiumHydroxide => "naoh",
        HydrochloricAcid => "hcl",
        SulfuricAcid => "h2so4",
        CalciumChloride => "cacl2",
        /// Molar mass entered by hand.
        Custom => "custom",
    }
}

impl Solute {
    /// Molar mass in g/mol, `None` for [`Solute::Custom`].
    pub fn molar_mass(&self) -> Option<f64> {
        match self {
            Self::SodiumChloride => Some(58.44),
            Self::PotassiumChloride => Some(74.55),
            Self::Glucose => Some(180.16),
            Self::Sucrose => Some(342.30),
            Self::SodiumHydroxide => Some(40.00),
            Self::HydrochloricAcid => Some(36.46),
            Self::SulfuricAcid => Some(98.08),
            Self::CalciumChloride => Some(110.98),
            Self::Custom => None,
        }
    }
}

choice_enum! {
    pub enum VolumeUnit ("volume unit") {
        Milliliters => "ml",
        Liters => "l",
    }
}

static SCHEMA: [FieldSpec; 5] = [
    FieldSpec::choice("solute", "Solute", Solute::NAMES),
    FieldSpec::number(
        "molar_mass",
        "Molar mass (custom solute)",
        Some("g/mol"),
        None,
    ),
    FieldSpec::number("mass", "Mass of solute", Some("g"), None),
    FieldSpec::number("volume", "Volume of solution", None, None),
    FieldSpec::choice("volume_unit", "Volume unit", VolumeUnit::NAMES),
];

const MAX_MASS: Bounds = Bounds::new(0.0, 1_000_000.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolarityInput {
    pub solute: Solute,
    /// Only read when `solute` is [`Solute::Custom`].
    pub custom_molar_mass: Option<f64>,
    /// Grams.
    pub mass: f64,
    pub volume: f64,
    pub volume_unit: VolumeUnit,
}

impl Default for MolarityInput {
    fn default() -> Self {
        Self {
            solute: Solute::SodiumChloride,
            custom_molar_mass: None,
            mass: 5.844,
            volume: 100.0,
            volume_unit: VolumeUnit::Milliliters,
        }
    }
}

impl MolarityInput {
    fn molar_mass(&self) -> Result<f64, CalcError> {
        match (self.solute.molar_mass(), self.custom_molar_mass) {
            (Some(tabulated), _) => Ok(tabulated),
            (None, Some(custom)) => require_positive("molar mass", custom),
            (None, None) => Err(CalcError::Required {
                field: "molar_mass".to_string(),
            }),
        }
    }

    fn volume_liters(&self) -> f64 {
        match self.volume_unit {
            VolumeUnit::Milliliters => self.volume / 1000.0,
            VolumeUnit::Liters => self.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MolarityResult {
    pub molar_mass: f64,
    pub moles: f64,
    pub volume_liters: f64,
    /// mol/L
    pub molarity: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MolarityCalculator;

impl Calculator for MolarityCalculator {
    type Input = MolarityInput;
    type Output = MolarityResult;

    const ID: &'static str = "molarity";
    const TITLE: &'static str = "Molarity Calculator";

    fn schema() -> &'static [FieldSpec] {
        &SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<MolarityInput, CalcError> {
        let defaults = MolarityInput::default();
        Ok(MolarityInput {
            solute: raw.choice_or("solute", defaults.solute)?,
            custom_molar_mass: raw.optional_number("molar_mass")?,
            mass: raw.number_or("mass", defaults.mass)?,
            volume: raw.number_or("volume", defaults.volume)?,
            volume_unit: raw.choice_or("volume_unit", defaults.volume_unit)?,
        })
    }

    fn validate(input: &MolarityInput) -> Result<(), CalcError> {
        input.molar_mass()?;
        MAX_MASS.check("mass", input.mass)?;
        require_positive("volume", input.volume)?;
        Ok(())
    }

    fn compute(input: &MolarityInput) -> Result<MolarityResult, CalcError> {
        let molar_mass = input.molar_mass()?;
        let volume_liters = input.volume_liters();
        let moles = input.mass / molar_mass;

        Ok(MolarityResult {
            molar_mass,
            moles,
            volume_liters,
            molarity: moles / volume_liters,
        })
    }

    fn fields(output: &MolarityResult) -> Vec<ResultField> {
        vec![
            ResultField::number("molarity", output.molarity).with_unit("mol/L"),
            ResultField::number("millimolar", output.molarity * 1000.0).with_unit("mM"),
            ResultField::number("moles", output.moles).with_unit("mol"),
            ResultField::number("molar_mass", output.molar_mass).with_unit("g/mol"),
            ResultField::number("volume", output.volume_liters).with_unit("L"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn one_molar_sodium_chloride() {
        let result = MolarityCalculator::evaluate(&MolarityInput::default()).unwrap();

        assert!((result.molarity - 1.0).abs() < 1e-12);
        assert!((result.moles - 0.1).abs() < 1e-12);
    }

    #[test]
    fn litres_are_not_rescaled() {
        let input = MolarityInput {
            solute: Solute::Glucose,
            mass: 180.16,
            volume: 2.0,
            volume_unit: VolumeUnit::Liters,
            ..MolarityInput::default()
        };

        let result = MolarityCalculator::evaluate(&input).unwrap();

        assert!((result.molarity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn custom_solute_needs_molar_mass() {
        let input = MolarityInput {
            solute: Solute::Custom,
            custom_molar_mass: None,
            ..MolarityInput::default()
        };

        assert_eq!(
            MolarityCalculator::evaluate(&input),
            Err(CalcError::Required {
                field: "molar_mass".to_string()
            })
        );
    }

    #[test]
    fn custom_molar_mass_is_used() {
        let raw = RawInput::new()
            .with("solute", "custom")
            .with("molar_mass", "100")
            .with("mass", "10")
            .with("volume", "1")
            .with("volume_unit", "L");

        let input = MolarityCalculator::from_raw(&raw).unwrap();
        let result = MolarityCalculator::evaluate(&input).unwrap();

        assert_eq!(result.molar_mass, 100.0);
        assert!((result.molarity - 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_volume_is_rejected() {
        let input = MolarityInput {
            volume: 0.0,
            ..MolarityInput::default()
        };

        assert!(matches!(
            MolarityCalculator::evaluate(&input),
            Err(CalcError::Domain(_))
        ));
    }

    #[test]
    fn every_tabulated_solute_has_a_mass() {
        for solute in Solute::ALL {
            assert_eq!(solute.molar_mass().is_none(), *solute == Solute::Custom);
        }
    }

    #[test]
    fn unknown_solute_key() {
        assert_eq!(
            "unobtainium".parse::<Solute>(),
            Err(CalcError::unknown_key("solute", "unobtainium"))
        );
    }
}
