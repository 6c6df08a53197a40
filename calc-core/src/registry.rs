use std::collections::HashMap;
use std::marker::PhantomData;

use tracing::debug;

use crate::calculator::{Calculator, Evaluation};
use crate::calculators;
use crate::error::CalcError;
use crate::validation::{FieldSpec, RawInput};

/// Object-safe view of a [`Calculator`], used to pick calculators by id at
/// runtime.
pub trait DynCalculator: Send + Sync {
    fn id(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn schema(&self) -> &'static [FieldSpec];

    /// Parses, validates and computes in one step.
    fn evaluate(
        &self,
        raw: &RawInput,
    ) -> Result<Evaluation, CalcError>;
}

struct Handle<C>(PhantomData<fn() -> C>);

impl<C: Calculator> DynCalculator for Handle<C> {
    fn id(&self) -> &'static str {
        C::ID
    }

    fn title(&self) -> &'static str {
        C::TITLE
    }

    fn schema(&self) -> &'static [FieldSpec] {
        C::schema()
    }

    fn evaluate(
        &self,
        raw: &RawInput,
    ) -> Result<Evaluation, CalcError> {
        let input = C::from_raw(raw)?;
        let output = C::evaluate(&input)?;
        debug!(calculator = C::ID, "evaluated");
        Ok(Evaluation {
            calculator: C::ID,
            fields: C::fields(&output),
            chart: C::chart(&output),
        })
    }
}

/// Registry of calculators, keyed by [`Calculator::ID`].
///
/// Typical lifetime:
/// 1. Create with `CalculatorRegistry::builtin()` (or `new()` + `register`).
/// 2. Call `get` with the id the user asked for.
pub struct CalculatorRegistry {
    calculators: HashMap<&'static str, Box<dyn DynCalculator>>,
}

impl CalculatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            calculators: HashMap::new(),
        }
    }

    /// Every calculator shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<calculators::bmi::BmiCalculator>();
        registry.register::<calculators::body_fat::BodyFatCalculator>();
        registry.register::<calculators::calories::CaloriesCalculator>();
        registry.register::<calculators::conversion::UnitConversionCalculator>();
        registry.register::<calculators::dates::DateCalculator>();
        registry.register::<calculators::dates::DueDateCalculator>();
        registry.register::<calculators::dates::PeriodCalculator>();
        registry.register::<calculators::golf::HandicapCalculator>();
        registry.register::<calculators::grades::GpaCalculator>();
        registry.register::<calculators::grades::GradeCalculator>();
        registry.register::<calculators::molarity::MolarityCalculator>();
        registry.register::<calculators::mortgage::MortgageCalculator>();
        registry.register::<calculators::resistor::ResistorCalculator>();
        registry.register::<calculators::sequence::SequenceCalculator>();
        registry.register::<calculators::slope::SlopeCalculator>();
        registry.register::<calculators::statistics::PercentErrorCalculator>();
        registry.register::<calculators::statistics::SampleSizeCalculator>();
        registry.register::<calculators::statistics::StandardDeviationCalculator>();
        registry.register::<calculators::statistics::ZScoreCalculator>();
        registry.register::<calculators::tip::TipCalculator>();
        registry.register::<calculators::triangle::RightTriangleCalculator>();
        registry.register::<calculators::weather::DewPointCalculator>();
        registry.register::<calculators::weather::HeatIndexCalculator>();
        registry.register::<calculators::weather::WindChillCalculator>();
        registry
    }

    /// Register a calculator type.
    ///
    /// A calculator with the same id is silently replaced.
    pub fn register<C>(&mut self)
    where
        C: Calculator + 'static,
    {
        self.calculators
            .insert(C::ID, Box::new(Handle::<C>(PhantomData)));
    }

    /// Ids of every registered calculator, sorted alphabetically.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.calculators.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Registered calculators, sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &dyn DynCalculator> {
        self.ids()
            .into_iter()
            .filter_map(move |id| self.calculators.get(id).map(|c| c.as_ref()))
    }

    /// # Errors
    /// [`CalcError::UnknownKey`] when no calculator has this id.
    pub fn get(
        &self,
        id: &str,
    ) -> Result<&dyn DynCalculator, CalcError> {
        self.calculators
            .get(id)
            .map(|c| c.as_ref())
            .ok_or_else(|| CalcError::unknown_key("calculator", id))
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
