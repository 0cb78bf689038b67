#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info};

use crate::dispatch::validate_record;
use crate::progress::ProgressHandler;
use crate::record::PasRecord;
use crate::spec_table::SpecView;
use crate::violation::Violation;
use crate::{NoticeContainer, NoticeSeverity, ValidationNotice};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    Passed,
    Failed(Violation),
    /// Validation panicked; carries the panic message.
    Crashed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub row: u64,
    pub status: RecordStatus,
}

impl RecordOutcome {
    pub fn passed(&self) -> bool {
        self.status == RecordStatus::Passed
    }

    pub fn to_notice(&self, file: &str) -> Option<ValidationNotice> {
        match &self.status {
            RecordStatus::Passed => None,
            RecordStatus::Failed(violation) => Some(
                ValidationNotice::from_violation(violation).with_location(
                    file,
                    violation.mnemonic(),
                    self.row,
                ),
            ),
            RecordStatus::Crashed(message) => {
                Some(runtime_exception_in_validator_error_notice(file, self.row, message))
            }
        }
    }
}

/// Validates records of one kind against a specification view.
pub struct RecordValidator<'a> {
    view: &'a SpecView,
    progress: Option<&'a dyn ProgressHandler>,
}

impl<'a> RecordValidator<'a> {
    pub fn new(view: &'a SpecView) -> Self {
        Self {
            view,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressHandler) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Validates each record independently; outcomes keep the input order.
    pub fn validate_all(&self, records: &[PasRecord]) -> Vec<RecordOutcome> {
        if let Some(progress) = self.progress {
            progress.set_total_records(records.len());
        }

        #[cfg(feature = "parallel")]
        let outcomes: Vec<RecordOutcome> = {
            // Capture thread-local context before parallel execution
            let captured_cutoff = crate::sample_date_cutoff();
            records
                .par_iter()
                .map(|record| {
                    let _cutoff_guard = crate::set_sample_date_cutoff(Some(captured_cutoff));
                    self.run_one(record)
                })
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<RecordOutcome> =
            records.iter().map(|record| self.run_one(record)).collect();

        let failed = outcomes.iter().filter(|outcome| !outcome.passed()).count();
        info!(
            "validated {} {} records: {} passed, {} failed",
            outcomes.len(),
            self.view.kind(),
            outcomes.len() - failed,
            failed
        );
        outcomes
    }

    fn run_one(&self, record: &PasRecord) -> RecordOutcome {
        if let Some(progress) = self.progress {
            progress.on_start_record(record.row());
        }

        let result = catch_unwind(AssertUnwindSafe(|| validate_record(self.view, record)));
        let status = match result {
            Ok(Ok(())) => RecordStatus::Passed,
            Ok(Err(violation)) => {
                debug!("row {}: {}", record.row(), violation);
                RecordStatus::Failed(violation)
            }
            Err(panic) => RecordStatus::Crashed(panic_payload_message(&*panic)),
        };

        if let Some(progress) = self.progress {
            progress.on_finish_record(record.row(), status == RecordStatus::Passed);
            progress.increment_record_progress();
        }
        RecordOutcome {
            row: record.row(),
            status,
        }
    }
}

pub fn outcomes_to_notices(outcomes: &[RecordOutcome], file: &str) -> NoticeContainer {
    let mut notices = NoticeContainer::new();
    for notice in outcomes.iter().filter_map(|outcome| outcome.to_notice(file)) {
        notices.push(notice);
    }
    notices
}

fn runtime_exception_in_validator_error_notice(
    file: &str,
    row: u64,
    message: &str,
) -> ValidationNotice {
    let mut notice = ValidationNotice::new(
        "runtime_exception_in_validator_error",
        NoticeSeverity::Error,
        "runtime exception while validating record",
    );
    notice.insert_context_field("exception", "panic");
    notice.insert_context_field("message", message);
    notice.file = Some(file.to_string());
    notice.row = Some(row);
    notice.insert_context_field("filename", file);
    notice.insert_context_field("csvRowNumber", row);
    notice
}

pub(crate) fn panic_payload_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec_table::FieldSpec;
    use chrono::NaiveDate;
    use pas_model::{FieldEncoding, RecordKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn view() -> SpecView {
        SpecView::new(
            RecordKind::Gas,
            vec![
                FieldSpec::new("FS-SDAT.DAY", None, FieldEncoding::parse("YYYY MM DD").unwrap(), "mandatory", "GAN"),
                FieldSpec::new("FS-SPRES.KPAA", None, FieldEncoding::parse("NUMB 8,2").unwrap(), "optional", "GAN"),
            ],
        )
    }

    fn records() -> Vec<PasRecord> {
        (0..64)
            .map(|index| {
                let date = if index % 2 == 0 { "2003 01 01" } else { "2008 01 01" };
                PasRecord::from_pairs(index + 2, [("FS-SDAT.DAY", date)])
            })
            .collect()
    }

    #[derive(Default)]
    struct CountingHandler {
        started: AtomicUsize,
        finished: AtomicUsize,
        total: AtomicUsize,
    }

    impl ProgressHandler for CountingHandler {
        fn on_start_record(&self, _row: u64) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_finish_record(&self, _row: u64, _passed: bool) {}
        fn set_total_records(&self, count: usize) {
            self.total.store(count, Ordering::SeqCst);
        }
        fn increment_record_progress(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn outcomes_keep_input_order() {
        let view = view();
        let outcomes = RecordValidator::new(&view)
            .with_progress(&crate::NoOpProgressHandler)
            .validate_all(&records());
        assert_eq!(outcomes.len(), 64);
        for (index, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.row, index as u64 + 2);
            assert_eq!(outcome.passed(), index % 2 == 0);
        }
    }

    #[test]
    fn cutoff_reaches_worker_threads() {
        let view = view();
        let _guard = crate::set_sample_date_cutoff(NaiveDate::from_ymd_opt(2010, 1, 1));
        let outcomes = RecordValidator::new(&view).validate_all(&records());
        assert!(outcomes.iter().all(RecordOutcome::passed));
    }

    #[test]
    fn reports_progress_per_record() {
        let view = view();
        let handler = CountingHandler::default();
        RecordValidator::new(&view)
            .with_progress(&handler)
            .validate_all(&records());
        assert_eq!(handler.total.load(Ordering::SeqCst), 64);
        assert_eq!(handler.started.load(Ordering::SeqCst), 64);
        assert_eq!(handler.finished.load(Ordering::SeqCst), 64);
    }

    #[test]
    fn failures_become_located_notices() {
        let view = view();
        let outcomes = RecordValidator::new(&view).validate_all(&records());
        let notices = outcomes_to_notices(&outcomes, "gan.tsv");
        assert_eq!(notices.len(), 32);
        let first = notices.iter().next().unwrap();
        assert_eq!(first.code, "required_field_absent");
        assert_eq!(first.row, Some(3));
        assert_eq!(first.field.as_deref(), Some("FS-SPRES.KPAA"));
    }
}
