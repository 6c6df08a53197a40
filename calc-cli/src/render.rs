//! Plain-text rendering of registry listings, schemas and results.

use std::io::{self, Write};

use anyhow::{Context, Result};
use calc_core::{CalculatorRegistry, ChartSpec, DynCalculator, Evaluation, FieldKind};

/// One line per calculator: id, then title.
pub fn render_list(
    registry: &CalculatorRegistry,
    out: &mut impl Write,
) -> io::Result<()> {
    for calculator in registry.iter() {
        writeln!(out, "{:<20} {}", calculator.id(), calculator.title())?;
    }
    Ok(())
}

/// Short description of what a field accepts.
pub fn describe_kind(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Number { unit, range } => {
            let mut text = "number".to_string();
            if let Some(range) = range.as_ref().filter(|r| r.min > f64::MIN && r.max < f64::MAX) {
                text.push_str(&format!(" {}..={}", range.min, range.max));
            }
            if let Some(unit) = unit {
                text.push_str(&format!(" [{unit}]"));
            }
            text
        }
        FieldKind::Integer { min, max } => format!("integer {min}..={max}"),
        FieldKind::Choice { options } => format!("one of {}", options.join("|")),
        FieldKind::ChoiceList { options } => format!("list of {}", options.join("|")),
        FieldKind::Date => "date YYYY-MM-DD".to_string(),
        FieldKind::NumberList => "list of numbers".to_string(),
        FieldKind::Rows { columns } => format!("rows {}; ...", columns.join(":")),
    }
}

pub fn render_schema(
    calculator: &dyn DynCalculator,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{} ({})", calculator.title(), calculator.id())?;
    for field in calculator.schema() {
        writeln!(
            out,
            "  {:<16} {:<36} {}",
            field.name,
            describe_kind(&field.kind),
            field.label
        )?;
    }
    Ok(())
}

/// Result fields as aligned `label  value unit` lines.
pub fn render_evaluation(
    evaluation: &Evaluation,
    decimals: usize,
    out: &mut impl Write,
) -> io::Result<()> {
    let width = evaluation
        .fields
        .iter()
        .map(|f| f.label.len())
        .max()
        .unwrap_or(0);
    for field in &evaluation.fields {
        let value = field.value.display(decimals);
        match field.unit {
            Some(unit) => writeln!(out, "{:<width$}  {value} {unit}", field.label)?,
            None => writeln!(out, "{:<width$}  {value}", field.label)?,
        }
    }
    Ok(())
}

/// Serializes a chart spec as TOML.
pub fn render_chart(chart: &ChartSpec) -> Result<String> {
    toml::to_string_pretty(chart).context("cannot serialize chart")
}

#[cfg(test)]
mod tests {
    use calc_core::RawInput;
    use pretty_assertions::assert_eq;

    use super::*;

    fn evaluate(
        id: &str,
        raw: &RawInput,
    ) -> Evaluation {
        CalculatorRegistry::builtin()
            .get(id)
            .and_then(|c| c.evaluate(raw))
            .unwrap()
    }

    #[test]
    fn evaluation_lines_are_aligned() {
        let raw = RawInput::new()
            .with("bill", "100")
            .with("tip_percent", "20")
            .with("people", "4");
        let mut out = Vec::new();

        render_evaluation(&evaluate("tip", &raw), 2, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("per_person      30.00"), "{text}");
    }

    #[test]
    fn list_is_sorted_by_id() {
        let mut out = Vec::new();

        render_list(&CalculatorRegistry::builtin(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let ids: Vec<&str> = text.lines().filter_map(|l| l.split_whitespace().next()).collect();
        assert_eq!(ids.len(), 24);
        assert_eq!(ids.first(), Some(&"bmi"));
    }

    #[test]
    fn unbounded_number_has_no_range() {
        let kind = FieldKind::Number {
            unit: Some("kg"),
            range: None,
        };

        assert_eq!(describe_kind(&kind), "number [kg]");
    }

    #[test]
    fn chart_renders_as_toml() {
        let chart = evaluate("tip", &RawInput::new()).chart.unwrap();

        let text = render_chart(&chart).unwrap();

        assert!(text.contains("kind = \"pie\""), "{text}");
        assert!(text.contains("[[series]]"), "{text}");
    }
}
