//! Every calculator in the suite, one module per subject area.
//!
//! Each module exposes its calculator types along with the pure formula
//! functions they are built on, so the formulas can be reused and tested
//! directly.

pub mod bmi;
pub mod body_fat;
pub mod calories;
pub mod conversion;
pub mod dates;
pub mod golf;
pub mod grades;
pub mod molarity;
pub mod mortgage;
pub mod resistor;
pub mod sequence;
pub mod slope;
pub mod statistics;
pub mod tip;
pub mod triangle;
pub mod weather;
