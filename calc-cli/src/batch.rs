//! CSV batch evaluation.
//!
//! ## CSV Format
//!
//! The header row names calculator input fields (see `calc schema <id>`).
//! Column order does not matter. An empty cell leaves the field at its
//! default. Each data row is evaluated on its own; a row that fails
//! validation is reported and the batch carries on.
//!
//! ```csv
//! bill,tip_percent,people
//! 100,20,4
//! 54.80,15,2
//! ```

use std::path::Path;

use anyhow::Context;
use calc_core::{CalcError, DynCalculator, Evaluation, RawInput};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that stop a batch before any row is evaluated, or while reading
/// the file.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The CSV is structurally invalid (unterminated quote, ragged row, ...).
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// A header names a field the calculator does not have.
    #[error("column '{column}' is not an input of {calculator}")]
    UnknownColumn {
        column: String,
        calculator: &'static str,
    },

    /// The file has a header but no data rows.
    #[error("the batch file has no rows")]
    Empty,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of one data row. `row` is 1-based (header = row 0).
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub row: usize,
    pub result: Result<Evaluation, CalcError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub calculator: &'static str,
    pub rows: Vec<RowOutcome>,
}

impl BatchReport {
    pub fn failures(&self) -> usize {
        self.rows.iter().filter(|r| r.result.is_err()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }
}

// ---------------------------------------------------------------------------
// Core runner
// ---------------------------------------------------------------------------

/// Evaluates every row of `input` (the full CSV text).
///
/// `base` holds values applied before each row's cells, e.g. a configured
/// unit system; cells in the row override it.
///
/// # Errors
///
/// * [`BatchError::Csv`] when the CSV is structurally invalid.
/// * [`BatchError::UnknownColumn`] when a header is not a schema field.
/// * [`BatchError::Empty`] when there are no data rows.
pub fn run_str(
    calculator: &dyn DynCalculator,
    input: &str,
    base: &RawInput,
) -> Result<BatchReport, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    if let Some(column) = headers
        .iter()
        .find(|h| !calculator.schema().iter().any(|f| f.name == *h))
    {
        return Err(BatchError::UnknownColumn {
            column: column.to_string(),
            calculator: calculator.id(),
        });
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = idx + 1;

        let mut raw = base.clone();
        for (name, cell) in headers.iter().zip(record.iter()) {
            if !cell.is_empty() {
                raw.set(name, cell);
            }
        }

        let result = calculator.evaluate(&raw);
        match &result {
            Ok(_) => debug!(calculator = calculator.id(), row, "batch row evaluated"),
            Err(error) => warn!(calculator = calculator.id(), row, %error, "batch row failed"),
        }
        rows.push(RowOutcome { row, result });
    }

    if rows.is_empty() {
        return Err(BatchError::Empty);
    }

    Ok(BatchReport {
        calculator: calculator.id(),
        rows,
    })
}

/// Reads a file from disk and delegates to [`run_str`].
pub fn run_file(
    calculator: &dyn DynCalculator,
    path: &Path,
    base: &RawInput,
) -> anyhow::Result<BatchReport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read batch file '{}'", path.display()))?;
    run_str(calculator, &contents, base)
        .with_context(|| format!("in batch file '{}'", path.display()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use calc_core::CalculatorRegistry;
    use pretty_assertions::assert_eq;

    use super::*;

    const TIP_CSV: &str = "\
bill,tip_percent,people
100,20,4
80,,2
";

    fn run(
        id: &str,
        csv: &str,
    ) -> Result<BatchReport, BatchError> {
        let registry = CalculatorRegistry::builtin();
        let calculator = registry.get(id).unwrap();
        run_str(calculator, csv, &RawInput::new())
    }

    #[test]
    fn evaluates_every_row() {
        let report = run("tip", TIP_CSV).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.failures(), 0);
        let first = report.rows[0].result.as_ref().unwrap();
        assert_eq!(
            first.field("total").map(|f| f.value.display(2)),
            Some("120.00".to_string())
        );
    }

    #[test]
    fn empty_cell_keeps_default() {
        let report = run("tip", TIP_CSV).unwrap();

        // default tip is 15%
        let second = report.rows[1].result.as_ref().unwrap();
        assert_eq!(
            second.field("tip").map(|f| f.value.display(2)),
            Some("12.00".to_string())
        );
    }

    #[test]
    fn failing_row_does_not_stop_batch() {
        let csv = "x1,y1,x2,y2\n1,2,1,5\n0,0,2,2\n";

        let report = run("slope", csv).unwrap();

        assert_eq!(report.rows[0].result, Err(CalcError::UndefinedSlope));
        assert!(report.rows[1].result.is_ok());
        assert!(report.has_failures());
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = run("tip", "bill,gratuity\n10,2\n").unwrap_err();

        assert!(matches!(
            err,
            BatchError::UnknownColumn { ref column, calculator: "tip" } if column == "gratuity"
        ));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(run("tip", "bill\n"), Err(BatchError::Empty)));
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        assert!(matches!(
            run("tip", "bill,people\n10\n"),
            Err(BatchError::Csv(_))
        ));
    }

    #[test]
    fn base_values_apply_to_each_row() {
        let registry = CalculatorRegistry::builtin();
        let base = RawInput::new().with("units", "imperial");

        let report =
            run_str(registry.get("bmi").unwrap(), "height,weight\n70,160\n", &base).unwrap();

        let bmi = report.rows[0].result.as_ref().unwrap().field("bmi").unwrap();
        assert_eq!(bmi.value.display(1), "23.0");
    }
}
