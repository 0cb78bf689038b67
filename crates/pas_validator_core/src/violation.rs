use compact_str::CompactString;

/// The first rule a record breaks. Validation stops as soon as one is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("{mnemonic} must not be null")]
    RequiredFieldAbsent { mnemonic: CompactString },
    #[error("{mnemonic} must be null")]
    ForbiddenFieldPresent { mnemonic: CompactString },
    #[error("{mnemonic} size is greater than {max_len} ({actual} characters)")]
    TextTooLong {
        mnemonic: CompactString,
        max_len: usize,
        actual: usize,
    },
    #[error("{mnemonic} must be any of: {allowed} (found {value})")]
    NotACode {
        mnemonic: CompactString,
        value: String,
        allowed: String,
    },
    #[error("{mnemonic} must be in [{layout}] format (found {value})")]
    MalformedDate {
        mnemonic: CompactString,
        layout: &'static str,
        value: String,
    },
    #[error("{mnemonic} must be numeric (found {value})")]
    NotNumeric {
        mnemonic: CompactString,
        value: String,
    },
    #[error("{mnemonic} must not be 0")]
    ZeroNotAllowed { mnemonic: CompactString },
    #[error("{mnemonic} must not be negative (found {value})")]
    NegativeNotAllowed { mnemonic: CompactString, value: f64 },
    #[error("{mnemonic} must be in valid range ({min}, {max}) (found {value})")]
    OutOfRange {
        mnemonic: CompactString,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{first} and {second} must not both be null")]
    RequiredPairAbsent {
        first: CompactString,
        second: CompactString,
    },
    #[error("{low} must be less than {high} ({low_value} >= {high_value})")]
    OrderedPairViolated {
        low: CompactString,
        high: CompactString,
        low_value: f64,
        high_value: f64,
    },
    #[error("{mnemonic} must be {expected} (found {actual})")]
    ExactValueMismatch {
        mnemonic: CompactString,
        expected: f64,
        actual: String,
    },
}

impl Violation {
    pub fn code(&self) -> &'static str {
        match self {
            Violation::RequiredFieldAbsent { .. } => "required_field_absent",
            Violation::ForbiddenFieldPresent { .. } => "forbidden_field_present",
            Violation::TextTooLong { .. } => "text_too_long",
            Violation::NotACode { .. } => "value_not_a_legal_code",
            Violation::MalformedDate { .. } => "malformed_date",
            Violation::NotNumeric { .. } => "value_not_numeric",
            Violation::ZeroNotAllowed { .. } => "zero_not_allowed",
            Violation::NegativeNotAllowed { .. } => "negative_not_allowed",
            Violation::OutOfRange { .. } => "value_out_of_range",
            Violation::RequiredPairAbsent { .. } => "required_pair_both_absent",
            Violation::OrderedPairViolated { .. } => "ordered_pair_violated",
            Violation::ExactValueMismatch { .. } => "exact_value_mismatch",
        }
    }

    /// The field the diagnostic is attributed to.
    pub fn mnemonic(&self) -> &str {
        match self {
            Violation::RequiredFieldAbsent { mnemonic }
            | Violation::ForbiddenFieldPresent { mnemonic }
            | Violation::TextTooLong { mnemonic, .. }
            | Violation::NotACode { mnemonic, .. }
            | Violation::MalformedDate { mnemonic, .. }
            | Violation::NotNumeric { mnemonic, .. }
            | Violation::ZeroNotAllowed { mnemonic }
            | Violation::NegativeNotAllowed { mnemonic, .. }
            | Violation::OutOfRange { mnemonic, .. }
            | Violation::ExactValueMismatch { mnemonic, .. } => mnemonic,
            Violation::RequiredPairAbsent { first, .. } => first,
            Violation::OrderedPairViolated { low, .. } => low,
        }
    }

    pub(crate) fn required(mnemonic: &str) -> Self {
        Violation::RequiredFieldAbsent {
            mnemonic: mnemonic.into(),
        }
    }

    pub(crate) fn forbidden(mnemonic: &str) -> Self {
        Violation::ForbiddenFieldPresent {
            mnemonic: mnemonic.into(),
        }
    }
}
