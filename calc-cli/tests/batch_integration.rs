//! Integration tests that run batches and config loading against on-disk
//! fixture files.

use std::path::{Path, PathBuf};

use calc_cli::batch;
use calc_cli::config::{Config, Settings};
use calc_core::{CalcError, CalculatorRegistry, RawInput, UnitSystem};
use pretty_assertions::assert_eq;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn mortgage_fixture_evaluates_each_row() {
    let registry = CalculatorRegistry::builtin();
    let calculator = registry.get("mortgage").unwrap();

    let report =
        batch::run_file(calculator, &fixture("mortgages.csv"), &RawInput::new()).unwrap();

    assert_eq!(report.rows.len(), 4);
    let first = report.rows[0].result.as_ref().unwrap();
    assert_eq!(
        first.field("monthly_payment").map(|f| f.value.display(2)),
        Some("1216.04".to_string())
    );
}

#[test]
fn mortgage_fixture_reports_the_bad_row() {
    let registry = CalculatorRegistry::builtin();
    let calculator = registry.get("mortgage").unwrap();

    let report =
        batch::run_file(calculator, &fixture("mortgages.csv"), &RawInput::new()).unwrap();

    assert_eq!(report.failures(), 1);
    assert_eq!(report.rows[2].row, 3);
    assert!(matches!(
        report.rows[2].result,
        Err(CalcError::Consistency(_))
    ));
    // blank rate cell falls back to the default rate
    assert!(report.rows[3].result.is_ok());
}

#[test]
fn missing_batch_file_is_an_error() {
    let registry = CalculatorRegistry::builtin();
    let calculator = registry.get("tip").unwrap();

    let result = batch::run_file(calculator, Path::new("/no/such/rows.csv"), &RawInput::new());

    assert!(result.is_err());
}

#[test]
fn config_fixture_loads() {
    let config = Config::load(Some(&fixture("calc.toml"))).unwrap();

    let settings = Settings::resolve(config, None, None).unwrap();

    assert_eq!(settings.log_level.as_deref(), Some("debug"));
    assert_eq!(settings.units, Some(UnitSystem::Imperial));
    assert_eq!(settings.decimals, 1);
    assert_eq!(settings.log_file, None);
}
