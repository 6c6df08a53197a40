//! Per-instance calculator state.
//!
//! A [`CalculatorSession`] owns one calculator's input record and its latest
//! result. Nothing is shared between sessions.

use tracing::{debug, warn};

use crate::calculator::{Calculator, Evaluation};
use crate::error::CalcError;
use crate::history::History;
use crate::units::{UnitConvertible, UnitSystem};
use crate::validation::RawInput;

/// A past evaluation kept in a session's history.
#[derive(Debug, Clone)]
pub struct Record<C: Calculator> {
    pub input: C::Input,
    pub output: C::Output,
}

/// Input and result state of a single calculator instance.
///
/// Every change to the input recomputes the result. A failed recomputation
/// clears the previous result so a stale value is never shown next to input
/// that no longer produces it.
#[derive(Debug)]
pub struct CalculatorSession<C: Calculator> {
    input: C::Input,
    result: Option<C::Output>,
    error: Option<CalcError>,
    history: Option<History<Record<C>>>,
}

impl<C: Calculator> CalculatorSession<C> {
    /// Starts a session from the calculator's default input and computes the
    /// initial result.
    pub fn new() -> Self {
        Self::with_input(C::Input::default())
    }

    pub fn with_input(input: C::Input) -> Self {
        let mut session = Self {
            input,
            result: None,
            error: None,
            history: None,
        };
        // The initial outcome is stored on the session.
        let _ = session.recompute();
        session
    }

    /// Keeps the last `capacity` successful evaluations.
    pub fn with_history(
        mut self,
        capacity: usize,
    ) -> Self {
        self.history = Some(History::with_capacity(capacity));
        self
    }

    pub fn input(&self) -> &C::Input {
        &self.input
    }

    pub fn result(&self) -> Option<&C::Output> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref()
    }

    pub fn history(&self) -> Option<&History<Record<C>>> {
        self.history.as_ref()
    }

    /// Replaces the whole input record and recomputes.
    pub fn set_input(
        &mut self,
        input: C::Input,
    ) -> Result<&C::Output, CalcError> {
        self.input = input;
        self.recompute()
    }

    /// Edits the input in place and recomputes.
    pub fn update<F>(
        &mut self,
        edit: F,
    ) -> Result<&C::Output, CalcError>
    where
        F: FnOnce(&mut C::Input),
    {
        edit(&mut self.input);
        self.recompute()
    }

    /// Replaces the input with one read from form text; absent fields take
    /// their defaults.
    ///
    /// A field that fails to parse leaves the typed input untouched but
    /// still clears the displayed result.
    pub fn apply_raw(
        &mut self,
        raw: &RawInput,
    ) -> Result<&C::Output, CalcError> {
        match C::from_raw(raw) {
            Ok(input) => self.set_input(input),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Restores the default input.
    pub fn reset(&mut self) -> Result<&C::Output, CalcError> {
        self.set_input(C::Input::default())
    }

    /// Runs the calculator on the current input.
    pub fn recompute(&mut self) -> Result<&C::Output, CalcError> {
        match C::evaluate(&self.input) {
            Ok(output) => {
                debug!(calculator = C::ID, "recomputed result");
                if let Some(history) = self.history.as_mut() {
                    history.push(Record {
                        input: self.input.clone(),
                        output: output.clone(),
                    });
                }
                self.error = None;
                Ok(&*self.result.insert(output))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Result fields and chart of the current result, if any.
    pub fn evaluation(&self) -> Option<Evaluation> {
        self.result.as_ref().map(|output| Evaluation {
            calculator: C::ID,
            fields: C::fields(output),
            chart: C::chart(output),
        })
    }

    fn fail(
        &mut self,
        err: CalcError,
    ) -> CalcError {
        warn!(calculator = C::ID, error = %err, "invalid input; result withheld");
        self.result = None;
        self.error = Some(err.clone());
        err
    }
}

impl<C> CalculatorSession<C>
where
    C: Calculator,
    C::Input: UnitConvertible,
{
    /// Switches unit systems, converting the values already entered.
    pub fn set_units(
        &mut self,
        to: UnitSystem,
    ) -> Result<&C::Output, CalcError> {
        self.input.convert_units(to);
        self.recompute()
    }
}

impl<C: Calculator> Default for CalculatorSession<C> {
    fn default() -> Self {
        Self::new()
    }
}
