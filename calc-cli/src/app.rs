//! Command implementations, kept apart from argument parsing so they can be
//! driven from tests with an in-memory writer.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use calc_core::calculators::dates::{DateCalculator, DateMode};
use calc_core::history::DEFAULT_HISTORY_CAPACITY;
use calc_core::{CalculatorRegistry, CalculatorSession, DynCalculator, RawInput};
use tracing::{debug, info};

use crate::batch;
use crate::config::Settings;
use crate::render;

/// Fills in the configured unit system for calculators with a `units`
/// field, unless the input already names one.
pub fn with_configured_units(
    calculator: &dyn DynCalculator,
    mut raw: RawInput,
    settings: &Settings,
) -> RawInput {
    let has_units_field = calculator.schema().iter().any(|f| f.name == "units");
    if let Some(units) = settings.units.filter(|_| has_units_field) {
        if !raw.contains("units") {
            debug!(calculator = calculator.id(), %units, "applying configured units");
            raw.set("units", units.as_str());
        }
    }
    raw
}

pub fn list(
    registry: &CalculatorRegistry,
    out: &mut impl Write,
) -> Result<()> {
    render::render_list(registry, out)?;
    Ok(())
}

pub fn schema(
    registry: &CalculatorRegistry,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    let calculator = registry.get(id)?;
    render::render_schema(calculator, out)?;
    Ok(())
}

/// Evaluates one calculator from `name=value` assignments.
pub fn run(
    registry: &CalculatorRegistry,
    id: &str,
    assignments: &[String],
    chart: bool,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<()> {
    let calculator = registry.get(id)?;
    let raw = with_configured_units(
        calculator,
        RawInput::from_assignments(assignments)?,
        settings,
    );

    let evaluation = calculator
        .evaluate(&raw)
        .with_context(|| format!("{} could not be computed", calculator.title()))?;
    info!(calculator = id, "evaluated");

    render::render_evaluation(&evaluation, settings.decimals, out)?;
    if chart {
        match &evaluation.chart {
            Some(spec) => {
                writeln!(out)?;
                write!(out, "{}", render::render_chart(spec)?)?;
            }
            None => writeln!(out, "\n(no chart for {id})")?,
        }
    }
    Ok(())
}

/// Runs a CSV batch. Returns `false` when any row failed.
pub fn batch(
    registry: &CalculatorRegistry,
    id: &str,
    file: &Path,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<bool> {
    let calculator = registry.get(id)?;
    let base = with_configured_units(calculator, RawInput::new(), settings);
    let report = batch::run_file(calculator, file, &base)?;

    for outcome in &report.rows {
        writeln!(out, "row {}:", outcome.row)?;
        match &outcome.result {
            Ok(evaluation) => render::render_evaluation(evaluation, settings.decimals, out)?,
            Err(error) => writeln!(out, "error: {error}")?,
        }
    }
    writeln!(
        out,
        "{} rows, {} failed",
        report.rows.len(),
        report.failures()
    )?;
    info!(
        calculator = id,
        rows = report.rows.len(),
        failed = report.failures(),
        "batch finished"
    );
    Ok(!report.has_failures())
}

/// Runs each group of whitespace separated `name=value` assignments through
/// one date calculator session, then prints the session's history, newest
/// first. Returns `false` when any calculation failed.
pub fn dates(
    calculations: &[String],
    settings: &Settings,
    out: &mut impl Write,
) -> Result<bool> {
    let mut session =
        CalculatorSession::<DateCalculator>::new().with_history(DEFAULT_HISTORY_CAPACITY);
    let mut all_ok = true;

    for (i, calculation) in calculations.iter().enumerate() {
        let raw = RawInput::from_assignments(calculation.split_whitespace())?;
        writeln!(out, "calculation {}:", i + 1)?;
        match session.apply_raw(&raw).map(|_| ()) {
            Ok(()) => {
                if let Some(evaluation) = session.evaluation() {
                    render::render_evaluation(&evaluation, settings.decimals, out)?;
                }
            }
            Err(error) => {
                all_ok = false;
                writeln!(out, "error: {error}")?;
            }
        }
    }

    if let Some(history) = session.history() {
        writeln!(out, "\nhistory ({} of {}):", history.len(), history.capacity())?;
        for record in history.iter() {
            let (input, output) = (&record.input, &record.output);
            let operation = match input.mode {
                DateMode::Difference => "to".to_string(),
                DateMode::Add => format!("+ {} days =", input.days),
                DateMode::Subtract => format!("- {} days =", input.days),
            };
            writeln!(
                out,
                "  {} {operation} {}  ({} days)",
                input.start, output.end, output.days
            )?;
        }
    }
    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use calc_core::UnitSystem;
    use pretty_assertions::assert_eq;

    use super::*;

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn imperial() -> Settings {
        Settings {
            units: Some(UnitSystem::Imperial),
            ..Settings::default()
        }
    }

    #[test]
    fn configured_units_only_touch_unit_aware_calculators() {
        let registry = CalculatorRegistry::builtin();

        let bmi = with_configured_units(registry.get("bmi").unwrap(), RawInput::new(), &imperial());
        let tip = with_configured_units(registry.get("tip").unwrap(), RawInput::new(), &imperial());

        assert_eq!(bmi.get("units"), Some("imperial"));
        assert_eq!(tip.get("units"), None);
    }

    #[test]
    fn explicit_units_win_over_config() {
        let registry = CalculatorRegistry::builtin();
        let raw = RawInput::new().with("units", "metric");

        let raw = with_configured_units(registry.get("bmi").unwrap(), raw, &imperial());

        assert_eq!(raw.get("units"), Some("metric"));
    }

    #[test]
    fn run_prints_fields_and_chart() {
        let registry = CalculatorRegistry::builtin();
        let args = vec!["x1=0".to_string(), "y1=1".to_string()];

        let text = output(|out| run(&registry, "slope", &args, true, &Settings::default(), out));

        assert!(text.contains("slope"), "{text}");
        assert!(text.contains("kind = \"line\""), "{text}");
    }

    #[test]
    fn run_reports_calculator_errors() {
        let registry = CalculatorRegistry::builtin();
        let args = vec!["x1=2".to_string(), "x2=2".to_string()];

        let err = run(
            &registry,
            "slope",
            &args,
            false,
            &Settings::default(),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("undefined slope"));
    }

    #[test]
    fn dates_prints_history_newest_first() {
        let calculations = vec![
            "start=2024-01-01 end=2024-01-31".to_string(),
            "mode=add start=2024-01-01 days=10".to_string(),
        ];
        let mut out = Vec::new();

        let ok = dates(&calculations, &Settings::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let history: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("history"))
            .skip(1)
            .collect();
        assert!(ok);
        assert_eq!(
            history,
            vec![
                "  2024-01-01 + 10 days = 2024-01-11  (10 days)",
                "  2024-01-01 to 2024-01-31  (30 days)",
            ]
        );
    }

    #[test]
    fn dates_reports_failures_and_continues() {
        let calculations = vec![
            "start=2024-02-01 end=2024-01-01".to_string(),
            "start=2024-01-01 end=2024-01-02".to_string(),
        ];
        let mut out = Vec::new();

        let ok = dates(&calculations, &Settings::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!ok);
        assert!(text.contains("negative duration"), "{text}");
        assert!(text.contains("history (1 of 10)"), "{text}");
    }
}
