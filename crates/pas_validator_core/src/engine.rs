use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use chrono::NaiveDate;
use pas_model::RecordKind;
use tracing::warn;

use crate::progress::ProgressHandler;
use crate::record::{PasRecord, RecordReader};
use crate::spec_table::{SpecError, SpecTable, SpecView};
use crate::validator::{outcomes_to_notices, panic_payload_message, RecordOutcome, RecordValidator};
use crate::{NoticeContainer, NoticeSeverity, ValidationNotice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub delimiter: u8,
    /// Overrides the sample date cutoff for this run.
    pub sample_date_cutoff: Option<NaiveDate>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            sample_date_cutoff: None,
        }
    }
}

pub struct ValidationOutcome {
    pub kind: Option<RecordKind>,
    pub records: Vec<RecordOutcome>,
    pub notices: NoticeContainer,
}

impl ValidationOutcome {
    fn failed_to_load(notices: NoticeContainer) -> Self {
        Self {
            kind: None,
            records: Vec::new(),
            notices,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|outcome| outcome.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.len() - self.passed_count()
    }
}

pub fn validate_files(
    spec_path: &Path,
    data_path: &Path,
    kind_code: &str,
    options: &ValidationOptions,
) -> ValidationOutcome {
    validate_files_with_progress(spec_path, data_path, kind_code, options, None)
}

/// Loads the specification table and the record file, then validates every
/// record. Load problems are reported as notices rather than returned.
pub fn validate_files_with_progress(
    spec_path: &Path,
    data_path: &Path,
    kind_code: &str,
    options: &ValidationOptions,
    progress: Option<&dyn ProgressHandler>,
) -> ValidationOutcome {
    let _cutoff_guard = options
        .sample_date_cutoff
        .map(|date| crate::set_sample_date_cutoff(Some(date)));
    let mut notices = NoticeContainer::new();
    let file_label = data_path.display().to_string();

    let load_result = catch_unwind(AssertUnwindSafe(|| {
        load_inputs(spec_path, data_path, kind_code, options)
    }));

    let (view, records) = match load_result {
        Ok(Ok(loaded)) => loaded,
        Ok(Err(err)) => {
            warn!("failed to load inputs: {}", err);
            notices.push_spec_error(&err);
            return ValidationOutcome::failed_to_load(notices);
        }
        Err(panic) => {
            notices.push(runtime_exception_in_loader_error_notice(
                file_label,
                panic_payload_message(&*panic),
            ));
            return ValidationOutcome::failed_to_load(notices);
        }
    };

    if records.is_empty() {
        warn!("{} has no data rows", file_label);
        notices.push(ValidationNotice::empty_input(file_label.as_str()));
    }

    let mut validator = RecordValidator::new(&view);
    if let Some(progress) = progress {
        validator = validator.with_progress(progress);
    }
    let outcomes = validator.validate_all(&records);
    notices.merge(outcomes_to_notices(&outcomes, &file_label));

    ValidationOutcome {
        kind: Some(view.kind()),
        records: outcomes,
        notices,
    }
}

fn load_inputs(
    spec_path: &Path,
    data_path: &Path,
    kind_code: &str,
    options: &ValidationOptions,
) -> Result<(SpecView, Vec<PasRecord>), SpecError> {
    let view = SpecTable::from_path(spec_path)?.subset_by_code(kind_code)?;
    let records = RecordReader::new()
        .with_delimiter(options.delimiter)
        .read_path(data_path, &view)?;
    Ok((view, records))
}

fn runtime_exception_in_loader_error_notice(file: String, message: String) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "runtime_exception_in_loader_error",
        NoticeSeverity::Error,
        "runtime exception while loading records",
    );
    notice.insert_context_field("exception", "panic");
    notice.insert_context_field("filename", file);
    notice.insert_context_field("message", message);
    notice
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SPEC: &str = "\
MNEMONIC NAME,FIELD SIZE,BUSINESS RULES AND EDITS,FIELD,ANALYSIS
SPNT.,NUMB 2,Mandatory,,WAN
DSTLOC.,CHAR 1,\"Mandatory, if SPNT = 50\",,WAN
";

    fn temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), nanos))
    }

    #[test]
    fn unknown_kind_becomes_notice() {
        let dir = temp_dir("pas_unknown_kind");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("spec.csv"), SPEC).expect("write spec");
        fs::write(dir.join("data.tsv"), "SPNT.\n20\n").expect("write data");

        let outcome = validate_files(
            &dir.join("spec.csv"),
            &dir.join("data.tsv"),
            "DST",
            &ValidationOptions::default(),
        );

        assert!(outcome.kind.is_none());
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices.iter().next().unwrap().code, "unknown_record_kind");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_spec_file_becomes_notice() {
        let dir = temp_dir("pas_missing_spec");
        let outcome = validate_files(
            &dir.join("absent.csv"),
            &dir.join("data.tsv"),
            "WAN",
            &ValidationOptions::default(),
        );
        assert_eq!(
            outcome.notices.iter().next().unwrap().code,
            "specification_load_failed"
        );
    }

    #[test]
    fn missing_record_file_becomes_record_notice() {
        let dir = temp_dir("pas_missing_data");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("spec.csv"), SPEC).expect("write spec");

        let outcome = validate_files(
            &dir.join("spec.csv"),
            &dir.join("absent.tsv"),
            "WAN",
            &ValidationOptions::default(),
        );

        assert!(outcome.records.is_empty());
        assert_eq!(
            outcome.notices.iter().next().unwrap().code,
            "record_file_load_failed"
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn validates_each_row() {
        let dir = temp_dir("pas_rows");
        fs::create_dir_all(&dir).expect("create dir");
        fs::write(dir.join("spec.csv"), SPEC).expect("write spec");
        fs::write(dir.join("data.tsv"), "SPNT.\tDSTLOC.\n20\t\n50\tB\n20\tM\n").expect("write data");

        let outcome = validate_files(
            &dir.join("spec.csv"),
            &dir.join("data.tsv"),
            "WAN",
            &ValidationOptions::default(),
        );

        assert_eq!(outcome.kind, Some(RecordKind::Water));
        assert_eq!(outcome.passed_count(), 2);
        assert_eq!(outcome.failed_count(), 1);
        let notice = outcome.notices.iter().next().unwrap();
        assert_eq!(notice.code, "forbidden_field_present");
        assert_eq!(notice.row, Some(4));

        fs::remove_dir_all(&dir).ok();
    }
}
