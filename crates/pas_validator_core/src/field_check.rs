use pas_model::{DateLayout, FieldEncoding, PasValue};

use crate::catalog::{code_set, range_for, Bounds};
use crate::invariants::{
    date_gate, date_gated_require, ordered_pair, require_either_of, require_ordered, required_pair,
};
use crate::record::PasRecord;
use crate::spec_table::FieldSpec;
use crate::validation_context::sample_date_cutoff;
use crate::violation::Violation;

/// How absence of a field is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Follow the rule flags of the specification row.
    Declared,
    Mandatory,
    /// Absent is fine and skips every other check.
    IfPresent,
}

/// Numeric constraints applied without consulting the rule flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measure {
    pub required: bool,
    pub nonzero: bool,
    pub nonnegative: bool,
    pub range: Bounds,
}

impl Measure {
    pub const fn within(range: Bounds) -> Self {
        Self {
            required: false,
            nonzero: false,
            nonnegative: false,
            range,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn nonzero(mut self) -> Self {
        self.nonzero = true;
        self
    }

    pub const fn nonnegative(mut self) -> Self {
        self.nonnegative = true;
        self
    }
}

/// Validates one field: mnemonic-keyed invariants, the null policy, then the
/// checks implied by the field's encoding.
pub fn validate_field(
    field: &FieldSpec,
    record: &PasRecord,
    requirement: Requirement,
) -> Result<(), Violation> {
    let mnemonic = field.mnemonic.as_str();
    if requirement == Requirement::IfPresent && !record.is_present(mnemonic) {
        return Ok(());
    }

    if let Some((first, second)) = required_pair(mnemonic) {
        require_either_of(first, second, record)?;
    }
    if let Some((low, high)) = ordered_pair(mnemonic) {
        require_ordered(low, high, record)?;
    }
    if let Some(date_field) = date_gate(mnemonic) {
        date_gated_require(mnemonic, date_field, sample_date_cutoff(), record)?;
    }

    let Some(value) = record.get(mnemonic) else {
        let required = match requirement {
            Requirement::Declared => !field.flags.optional,
            Requirement::Mandatory => true,
            Requirement::IfPresent => false,
        };
        return if required {
            Err(Violation::required(mnemonic))
        } else {
            Ok(())
        };
    };

    check_value(field, value)
}

/// Encoding checks for a present value.
pub fn check_value(field: &FieldSpec, value: &PasValue) -> Result<(), Violation> {
    let mnemonic = field.mnemonic.as_str();
    match field.encoding {
        FieldEncoding::Text { max_len } => {
            let text = value.as_text();
            let actual = text.chars().count();
            if actual > max_len {
                return Err(Violation::TextTooLong {
                    mnemonic: mnemonic.into(),
                    max_len,
                    actual,
                });
            }
            if let Some(codes) = code_set(mnemonic) {
                if !codes.contains_text(&text) {
                    return Err(not_a_code(mnemonic, value, &codes.describe()));
                }
            }
            Ok(())
        }
        FieldEncoding::Date(layout) => check_date(mnemonic, value, layout),
        FieldEncoding::Numeric { .. } => {
            let number = numeric(mnemonic, value)?;
            if !field.flags.zero_allowed && number == 0.0 {
                return Err(Violation::ZeroNotAllowed {
                    mnemonic: mnemonic.into(),
                });
            }
            if !field.flags.negative_allowed && number < 0.0 {
                return Err(Violation::NegativeNotAllowed {
                    mnemonic: mnemonic.into(),
                    value: number,
                });
            }
            if let Some(codes) = code_set(mnemonic) {
                if !number.is_finite() || !codes.contains_integer(number.trunc() as i64) {
                    return Err(not_a_code(mnemonic, value, &codes.describe()));
                }
            }
            if let Some(range) = range_for(mnemonic) {
                check_range(mnemonic, number, range)?;
            }
            Ok(())
        }
    }
}

/// Applies a [`Measure`] to `mnemonic` in place of the declared checks.
pub fn check_measured(mnemonic: &str, record: &PasRecord, measure: &Measure) -> Result<(), Violation> {
    let Some(value) = record.get(mnemonic) else {
        return if measure.required {
            Err(Violation::required(mnemonic))
        } else {
            Ok(())
        };
    };
    let number = numeric(mnemonic, value)?;
    if measure.nonzero && number == 0.0 {
        return Err(Violation::ZeroNotAllowed {
            mnemonic: mnemonic.into(),
        });
    }
    if measure.nonnegative && number < 0.0 {
        return Err(Violation::NegativeNotAllowed {
            mnemonic: mnemonic.into(),
            value: number,
        });
    }
    check_range(mnemonic, number, measure.range)
}

/// The field is mandatory and must equal `expected`.
pub fn check_exact(mnemonic: &str, record: &PasRecord, expected: f64) -> Result<(), Violation> {
    let value = record
        .get(mnemonic)
        .ok_or_else(|| Violation::required(mnemonic))?;
    let number = numeric(mnemonic, value)?;
    if number == expected {
        return Ok(());
    }
    Err(Violation::ExactValueMismatch {
        mnemonic: mnemonic.into(),
        expected,
        actual: value.to_string(),
    })
}

pub fn check_absent(mnemonic: &str, record: &PasRecord) -> Result<(), Violation> {
    if record.is_present(mnemonic) {
        return Err(Violation::forbidden(mnemonic));
    }
    Ok(())
}

fn check_date(mnemonic: &str, value: &PasValue, layout: DateLayout) -> Result<(), Violation> {
    let text = value.as_text();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let digits = |token: &str, len: usize| token.len() == len && token.bytes().all(|b| b.is_ascii_digit());
    let well_formed = tokens.len() == layout.token_count()
        && digits(tokens[0], 4)
        && digits(tokens[1], 2)
        && digits(tokens[2], 2);
    if well_formed {
        return Ok(());
    }
    Err(Violation::MalformedDate {
        mnemonic: mnemonic.into(),
        layout: layout.as_str(),
        value: text.to_string(),
    })
}

fn check_range(mnemonic: &str, number: f64, range: Bounds) -> Result<(), Violation> {
    if range.contains(number) {
        return Ok(());
    }
    Err(Violation::OutOfRange {
        mnemonic: mnemonic.into(),
        value: number,
        min: range.min,
        max: range.max,
    })
}

fn numeric(mnemonic: &str, value: &PasValue) -> Result<f64, Violation> {
    value
        .as_number()
        .filter(|number| !number.is_nan())
        .ok_or_else(|| Violation::NotNumeric {
            mnemonic: mnemonic.into(),
            value: value.to_string(),
        })
}

fn not_a_code(mnemonic: &str, value: &PasValue, allowed: &str) -> Violation {
    Violation::NotACode {
        mnemonic: mnemonic.into(),
        value: value.to_string(),
        allowed: allowed.to_string(),
    }
}
