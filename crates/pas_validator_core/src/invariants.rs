//! Cross-field rules keyed by mnemonic rather than by section.

use chrono::NaiveDate;
use pas_model::{DateLayout, PasDate};

use crate::record::PasRecord;
use crate::violation::Violation;

/// Fields where at least one of the two must be reported.
pub const REQUIRED_PAIRS: &[(&str, &str)] = &[("TSUL.FRAC", "TSUL.GM/KG")];

/// Fields where the first value must be strictly less than the second.
pub const ORDERED_PAIRS: &[(&str, &str)] = &[("TTOPL.M", "TBASL.M")];

/// Fields that become mandatory for samples taken after the cutoff date,
/// paired with the date field they are gated on.
pub const DATE_GATED_FIELDS: &[(&str, &str)] = &[
    ("FS-SPRES.KPAA", "FS-SDAT.DAY"),
    ("FS-STEMP.DEGC", "FS-SDAT.DAY"),
    ("SS-SPRES.KPAA", "SS-SDAT.DAY"),
    ("SS-STEMP.DEGC", "SS-SDAT.DAY"),
    ("CL-SPRES.KPAA", "CL-SDAT.DAY"),
    ("CL-STEMP.DEGC", "CL-SDAT.DAY"),
];

pub fn required_pair(mnemonic: &str) -> Option<(&'static str, &'static str)> {
    REQUIRED_PAIRS
        .iter()
        .copied()
        .find(|(first, second)| *first == mnemonic || *second == mnemonic)
}

pub fn ordered_pair(mnemonic: &str) -> Option<(&'static str, &'static str)> {
    ORDERED_PAIRS
        .iter()
        .copied()
        .find(|(low, high)| *low == mnemonic || *high == mnemonic)
}

pub fn date_gate(mnemonic: &str) -> Option<&'static str> {
    DATE_GATED_FIELDS
        .iter()
        .find(|(field, _)| *field == mnemonic)
        .map(|(_, date_field)| *date_field)
}

pub fn require_either_of(first: &str, second: &str, record: &PasRecord) -> Result<(), Violation> {
    if record.is_present(first) || record.is_present(second) {
        return Ok(());
    }
    Err(Violation::RequiredPairAbsent {
        first: first.into(),
        second: second.into(),
    })
}

/// Both fields are required; `low` must be strictly below `high`.
pub fn require_ordered(low: &str, high: &str, record: &PasRecord) -> Result<(), Violation> {
    let low_value = numeric_value(low, record)?;
    let high_value = numeric_value(high, record)?;
    if low_value < high_value {
        return Ok(());
    }
    Err(Violation::OrderedPairViolated {
        low: low.into(),
        high: high.into(),
        low_value,
        high_value,
    })
}

fn numeric_value(mnemonic: &str, record: &PasRecord) -> Result<f64, Violation> {
    let value = record
        .get(mnemonic)
        .ok_or_else(|| Violation::required(mnemonic))?;
    value.as_number().ok_or_else(|| Violation::NotNumeric {
        mnemonic: mnemonic.into(),
        value: value.to_string(),
    })
}

/// `mnemonic` is mandatory when `date_field` holds a date after `cutoff`.
/// An absent date adds no requirement.
pub fn date_gated_require(
    mnemonic: &str,
    date_field: &str,
    cutoff: NaiveDate,
    record: &PasRecord,
) -> Result<(), Violation> {
    let Some(raw) = record.get(date_field) else {
        return Ok(());
    };
    let text = raw.as_text();
    let date = PasDate::parse(&text).map_err(|_| Violation::MalformedDate {
        mnemonic: date_field.into(),
        layout: DateLayout::Day.as_str(),
        value: text.to_string(),
    })?;
    if date.naive() > cutoff && !record.is_present(mnemonic) {
        return Err(Violation::required(mnemonic));
    }
    Ok(())
}

/// `mnemonic` must be null unless `gate` equals `gate_value`, in which case it
/// is mandatory. Returns whether the gate is open.
pub fn code_gated_location(
    mnemonic: &str,
    gate: &str,
    gate_value: &str,
    record: &PasRecord,
) -> Result<bool, Violation> {
    let open = record.code(gate).as_deref() == Some(gate_value);
    match (open, record.is_present(mnemonic)) {
        (true, true) => Ok(true),
        (true, false) => Err(Violation::required(mnemonic)),
        (false, true) => Err(Violation::forbidden(mnemonic)),
        (false, false) => Ok(false),
    }
}
