/// Trait for handling progress events while validating a batch of records
pub trait ProgressHandler: Send + Sync {
    /// Called when a record starts validating
    fn on_start_record(&self, row: u64);

    /// Called when a record has been validated
    fn on_finish_record(&self, row: u64, passed: bool);

    /// Set total number of records to validate
    fn set_total_records(&self, count: usize);

    /// Increment validation progress
    fn increment_record_progress(&self);
}

/// A no-op progress handler
pub struct NoOpProgressHandler;

impl ProgressHandler for NoOpProgressHandler {
    fn on_start_record(&self, _row: u64) {}
    fn on_finish_record(&self, _row: u64, _passed: bool) {}
    fn set_total_records(&self, _count: usize) {}
    fn increment_record_progress(&self) {}
}
