//! Error type shared by every calculator.
//!
//! The `Display` text of each variant is the message shown next to the form,
//! so it is written for the person entering values rather than for a
//! developer.

use thiserror::Error;

/// Errors produced while validating input or computing a result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalcError {
    /// A required field was left empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Text in a numeric, date, or choice field could not be parsed.
    #[error("{field} must be a valid {expected}, got '{input}'")]
    Parse {
        field: String,
        input: String,
        expected: &'static str,
    },

    /// A numeric field is outside its accepted range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A divisor would have been zero.
    #[error("cannot divide by zero: {0}")]
    DivisionByZero(&'static str),

    /// The two points share an x coordinate.
    #[error("undefined slope: the run (x2 - x1) is zero")]
    UndefinedSlope,

    /// A value is outside the domain of the formula.
    #[error("{0}")]
    Domain(String),

    /// Several fields are individually valid but contradict each other.
    #[error("{0}")]
    Consistency(String),

    /// Weighted components do not add up to 100%.
    #[error("weights must add up to 100%, got {total}%")]
    WeightsDoNotSum { total: f64 },

    /// The terms do not follow the requested pattern.
    #[error("the numbers do not form {kind} sequence")]
    NotASequence { kind: &'static str },

    /// A conversion was requested between unrelated quantities.
    #[error("cannot convert {from} to {to}")]
    IncompatibleUnits { from: &'static str, to: &'static str },

    /// A resistor color is not allowed in the given band position.
    #[error("{color} is not a valid color for the {band} band")]
    InvalidBand {
        color: &'static str,
        band: &'static str,
    },

    /// A categorical key is not present in the lookup table.
    #[error("unknown {kind} '{key}'")]
    UnknownKey { kind: &'static str, key: String },

    /// The computation produced NaN or infinity.
    #[error("{0} could not be computed for these inputs")]
    NonFiniteResult(&'static str),
}

impl CalcError {
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }

    pub fn unknown_key(
        kind: &'static str,
        key: impl Into<String>,
    ) -> Self {
        Self::UnknownKey {
            kind,
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn out_of_range_message_names_field_and_bounds() {
        let err = CalcError::OutOfRange {
            field: "humidity".to_string(),
            value: 120.0,
            min: 0.0,
            max: 100.0,
        };

        assert_eq!(
            err.to_string(),
            "humidity must be between 0 and 100, got 120"
        );
    }

    #[test]
    fn not_a_sequence_message_reads_naturally() {
        let err = CalcError::NotASequence { kind: "an arithmetic" };

        assert_eq!(
            err.to_string(),
            "the numbers do not form an arithmetic sequence"
        );
    }

    #[test]
    fn unknown_key_message_includes_key() {
        let err = CalcError::unknown_key("solute", "unobtainium");

        assert_eq!(err.to_string(), "unknown solute 'unobtainium'");
    }
}
