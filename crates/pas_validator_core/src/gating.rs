//! Declarative section and field gating.
//!
//! A [`Plan`] maps each specification row to the policy it is validated under.
//! Fields in a section with a [`SectionRule`] follow that rule; every other
//! field is looked up in the plan's [`FieldRule`] table and falls back to the
//! declared rule flags.

use crate::field_check::{
    check_absent, check_exact, check_measured, validate_field, Measure, Requirement,
};
use crate::invariants::code_gated_location;
use crate::record::PasRecord;
use crate::spec_table::FieldSpec;
use crate::violation::Violation;

/// A predicate over sibling values, compared in their string-normalized form.
/// An absent field equals nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Never,
    Equals(&'static str, &'static str),
    NotEquals(&'static str, &'static str),
    Absent(&'static str),
    OneOf(&'static str, &'static [&'static str]),
    NotOneOf(&'static str, &'static [&'static str]),
    All(&'static [Condition]),
}

impl Condition {
    pub fn holds(&self, record: &PasRecord) -> bool {
        match self {
            Condition::Never => false,
            Condition::Equals(mnemonic, value) => record.code(mnemonic).as_deref() == Some(*value),
            Condition::NotEquals(mnemonic, value) => {
                !Condition::Equals(*mnemonic, *value).holds(record)
            }
            Condition::Absent(mnemonic) => !record.is_present(mnemonic),
            Condition::OneOf(mnemonic, values) => record
                .code(mnemonic)
                .is_some_and(|code| values.iter().any(|value| *value == &*code)),
            Condition::NotOneOf(mnemonic, values) => {
                !Condition::OneOf(*mnemonic, *values).holds(record)
            }
            Condition::All(conditions) => conditions.iter().all(|condition| condition.holds(record)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Generic validation under the row's own rule flags.
    Declared,
    Mandatory,
    IfPresent,
    Choose {
        when: Condition,
        then: &'static Policy,
        otherwise: &'static Policy,
    },
    /// Presence, zero, sign and range only; the declared checks are skipped.
    Measured(Measure),
    /// Mandatory and exactly zero.
    ExactlyZero,
    /// Mandatory when `gate` equals `value`, otherwise forbidden.
    Located {
        gate: &'static str,
        value: &'static str,
    },
}

impl Policy {
    pub fn apply(&self, field: &FieldSpec, record: &PasRecord) -> Result<(), Violation> {
        let mnemonic = field.mnemonic.as_str();
        match self {
            Policy::Declared => validate_field(field, record, Requirement::Declared),
            Policy::Mandatory => validate_field(field, record, Requirement::Mandatory),
            Policy::IfPresent => validate_field(field, record, Requirement::IfPresent),
            Policy::Choose {
                when,
                then,
                otherwise,
            } => {
                if when.holds(record) {
                    then.apply(field, record)
                } else {
                    otherwise.apply(field, record)
                }
            }
            Policy::Measured(measure) => check_measured(mnemonic, record, measure),
            Policy::ExactlyZero => check_exact(mnemonic, record, 0.0),
            Policy::Located { gate, value } => {
                if code_gated_location(mnemonic, gate, value, record)? {
                    validate_field(field, record, Requirement::Declared)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub mnemonic: &'static str,
    pub forbid_when: Condition,
    pub policy: Policy,
}

impl FieldRule {
    pub const fn new(mnemonic: &'static str, policy: Policy) -> Self {
        Self {
            mnemonic,
            forbid_when: Condition::Never,
            policy,
        }
    }

    pub const fn forbidden_when(mut self, condition: Condition) -> Self {
        self.forbid_when = condition;
        self
    }

    fn apply(&self, field: &FieldSpec, record: &PasRecord) -> Result<(), Violation> {
        if self.forbid_when.holds(record) {
            return check_absent(&field.mnemonic, record);
        }
        self.policy.apply(field, record)
    }
}

/// Every field of `section` is forbidden while `forbid_when` holds; otherwise
/// it follows its entry in `exceptions` or the section's `open` policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionRule {
    pub section: &'static str,
    pub forbid_when: Condition,
    pub open: Policy,
    pub exceptions: &'static [FieldRule],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub sections: &'static [SectionRule],
    pub fields: &'static [FieldRule],
}

impl Plan {
    pub fn section(&self, label: &str) -> Option<&SectionRule> {
        self.sections.iter().find(|rule| rule.section == label)
    }

    pub fn field_rule(&self, mnemonic: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.mnemonic == mnemonic)
    }

    pub fn apply(&self, field: &FieldSpec, record: &PasRecord) -> Result<(), Violation> {
        let mnemonic = field.mnemonic.as_str();
        if let Some(section) = field.section.as_deref().and_then(|label| self.section(label)) {
            if section.forbid_when.holds(record) {
                return check_absent(mnemonic, record);
            }
            return match section.exceptions.iter().find(|rule| rule.mnemonic == mnemonic) {
                Some(rule) => rule.apply(field, record),
                None => section.open.apply(field, record),
            };
        }
        match self.field_rule(mnemonic) {
            Some(rule) => rule.apply(field, record),
            None => Policy::Declared.apply(field, record),
        }
    }
}
