use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec_table::SpecError;
use crate::violation::Violation;

pub const NOTICE_CODE_SPEC_LOAD_ERROR: &str = "specification_load_failed";
pub const NOTICE_CODE_RECORD_LOAD_ERROR: &str = "record_file_load_failed";
pub const NOTICE_CODE_UNKNOWN_RECORD_KIND: &str = "unknown_record_kind";
pub const NOTICE_CODE_EMPTY_INPUT: &str = "empty_file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationNotice {
    pub code: String,
    pub severity: NoticeSeverity,
    pub message: String,
    pub file: Option<String>,
    pub row: Option<u64>,
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_order: Vec<String>,
}

impl ValidationNotice {
    pub fn new(
        code: impl Into<String>,
        severity: NoticeSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            file: None,
            row: None,
            field: None,
            context: BTreeMap::new(),
            field_order: Vec::new(),
        }
    }

    pub fn from_violation(violation: &Violation) -> Self {
        let mut notice =
            ValidationNotice::new(violation.code(), NoticeSeverity::Error, violation.to_string());
        notice.field = Some(violation.mnemonic().to_string());
        notice.insert_context_field("fieldName", violation.mnemonic());
        match violation {
            Violation::TextTooLong {
                max_len, actual, ..
            } => {
                notice.insert_context_field("maxLength", max_len);
                notice.insert_context_field("actualLength", actual);
            }
            Violation::NotACode { value, allowed, .. } => {
                notice.insert_context_field("fieldValue", value);
                notice.insert_context_field("allowedValues", allowed);
            }
            Violation::MalformedDate { layout, value, .. } => {
                notice.insert_context_field("fieldValue", value);
                notice.insert_context_field("expectedFormat", layout);
            }
            Violation::NotNumeric { value, .. } => {
                notice.insert_context_field("fieldValue", value);
            }
            Violation::NegativeNotAllowed { value, .. } => {
                notice.insert_context_field("fieldValue", value);
            }
            Violation::OutOfRange {
                value, min, max, ..
            } => {
                notice.insert_context_field("fieldValue", value);
                notice.insert_context_field("rangeMin", bound_label(*min));
                notice.insert_context_field("rangeMax", bound_label(*max));
            }
            Violation::RequiredPairAbsent { second, .. } => {
                notice.insert_context_field("otherFieldName", second.as_str());
            }
            Violation::OrderedPairViolated {
                high,
                low_value,
                high_value,
                ..
            } => {
                notice.insert_context_field("otherFieldName", high.as_str());
                notice.insert_context_field("fieldValue", low_value);
                notice.insert_context_field("otherFieldValue", high_value);
            }
            Violation::ExactValueMismatch {
                expected, actual, ..
            } => {
                notice.insert_context_field("expectedValue", expected);
                notice.insert_context_field("fieldValue", actual);
            }
            Violation::RequiredFieldAbsent { .. }
            | Violation::ForbiddenFieldPresent { .. }
            | Violation::ZeroNotAllowed { .. } => {}
        }
        notice
    }

    pub fn from_spec_error(error: &SpecError) -> Self {
        let code = match error {
            SpecError::UnknownRecordKind(_) | SpecError::RecordKindNotInTable(_) => {
                NOTICE_CODE_UNKNOWN_RECORD_KIND
            }
            SpecError::Record { .. } | SpecError::RecordIo { .. } | SpecError::RecordCsv { .. } => {
                NOTICE_CODE_RECORD_LOAD_ERROR
            }
            _ => NOTICE_CODE_SPEC_LOAD_ERROR,
        };
        let mut notice = ValidationNotice::new(code, NoticeSeverity::Error, error.to_string());
        notice.insert_context_field("message", error.to_string());
        notice
    }

    pub fn empty_input(file: impl Into<String>) -> Self {
        let file = file.into();
        let mut notice = ValidationNotice::new(
            NOTICE_CODE_EMPTY_INPUT,
            NoticeSeverity::Warning,
            "record file has no data rows",
        );
        notice.file = Some(file.clone());
        notice.insert_context_field("filename", file);
        notice
    }

    pub fn insert_context_field<V: Serialize>(&mut self, name: impl Into<String>, value: V) {
        let key = name.into();
        let serialized = serde_json::to_value(value).unwrap_or_else(|_| Value::Null);
        if !self.field_order.iter().any(|item| item == &key) {
            self.field_order.push(key.clone());
        }
        self.context.insert(key, serialized);
    }

    pub fn set_location(&mut self, file: impl Into<String>, field: impl Into<String>, row: u64) {
        let file = file.into();
        let field = field.into();
        self.insert_context_field("filename", file.as_str());
        self.insert_context_field("csvRowNumber", row);
        self.file = Some(file);
        self.field = Some(field);
        self.row = Some(row);
    }

    pub fn with_location(
        mut self,
        file: impl Into<String>,
        field: impl Into<String>,
        row: u64,
    ) -> Self {
        self.set_location(file, field, row);
        self
    }
}

fn bound_label(bound: f64) -> String {
    bound.to_string()
}

#[derive(Debug, Default)]
pub struct NoticeContainer {
    notices: Vec<ValidationNotice>,
}

impl NoticeContainer {
    pub fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, notice: ValidationNotice) {
        self.notices.push(notice);
    }

    pub fn push_spec_error(&mut self, error: &SpecError) {
        self.notices.push(ValidationNotice::from_spec_error(error));
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationNotice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.notices
            .iter()
            .any(|notice| notice.severity == NoticeSeverity::Error)
    }

    pub fn merge(&mut self, other: NoticeContainer) {
        self.notices.extend(other.notices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_notice_carries_field_and_context() {
        let violation = Violation::OutOfRange {
            mnemonic: "TROOM.DEGC".into(),
            value: 45.0,
            min: 0.0,
            max: 45.0,
        };
        let notice = ValidationNotice::from_violation(&violation).with_location("oan.tsv", "TROOM.DEGC", 2);

        assert_eq!(notice.code, "value_out_of_range");
        assert_eq!(notice.severity, NoticeSeverity::Error);
        assert_eq!(notice.field.as_deref(), Some("TROOM.DEGC"));
        assert_eq!(notice.row, Some(2));
        assert_eq!(notice.context["rangeMax"], Value::from("45"));
        assert_eq!(
            notice.field_order,
            vec![
                "fieldName",
                "fieldValue",
                "rangeMin",
                "rangeMax",
                "filename",
                "csvRowNumber"
            ]
        );
    }

    #[test]
    fn spec_errors_map_to_load_codes() {
        let notice = ValidationNotice::from_spec_error(&SpecError::RecordKindNotInTable(
            pas_model::RecordKind::Water,
        ));
        assert_eq!(notice.code, NOTICE_CODE_UNKNOWN_RECORD_KIND);
    }

    #[test]
    fn container_reports_errors() {
        let mut notices = NoticeContainer::new();
        notices.push(ValidationNotice::empty_input("gan.tsv"));
        assert!(!notices.has_errors());
        notices.push(ValidationNotice::from_violation(&Violation::required("HYDLP.")));
        assert!(notices.has_errors());
        assert_eq!(notices.len(), 2);
    }
}
