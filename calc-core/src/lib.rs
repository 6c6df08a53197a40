//! Core of the calculator suite.
//!
//! Each calculator implements [`Calculator`]: a static input schema,
//! validation, a pure compute step, and a projection into result fields and
//! an optional chart. [`CalculatorSession`] holds one calculator's state and
//! [`CalculatorRegistry`] looks calculators up by id.

#[macro_use]
mod macros;

pub mod calculator;
pub mod calculators;
pub mod chart;
pub mod error;
pub mod format;
pub mod history;
pub mod registry;
pub mod session;
pub mod units;
pub mod validation;

pub use calculator::{Calculator, Evaluation, FieldValue, ResultField};
pub use chart::{ChartKind, ChartSpec};
pub use error::CalcError;
pub use history::History;
pub use registry::{CalculatorRegistry, DynCalculator};
pub use session::CalculatorSession;
pub use units::{UnitConvertible, UnitSystem};
pub use validation::{FieldKind, FieldSpec, RawInput};
