use std::cell::Cell;

use chrono::NaiveDate;

/// Samples dated after this day must report separator pressure and temperature.
pub const DEFAULT_SAMPLE_DATE_CUTOFF: (i32, u32, u32) = (2004, 9, 30);

thread_local! {
    static SAMPLE_DATE_CUTOFF: Cell<Option<NaiveDate>> = const { Cell::new(None) };
}

pub struct SampleDateCutoffGuard {
    previous: Option<NaiveDate>,
}

impl Drop for SampleDateCutoffGuard {
    fn drop(&mut self) {
        SAMPLE_DATE_CUTOFF.with(|cell| cell.set(self.previous));
    }
}

pub fn set_sample_date_cutoff(date: Option<NaiveDate>) -> SampleDateCutoffGuard {
    let previous = SAMPLE_DATE_CUTOFF.with(|cell| {
        let previous = cell.get();
        cell.set(date);
        previous
    });
    SampleDateCutoffGuard { previous }
}

pub fn sample_date_cutoff() -> NaiveDate {
    SAMPLE_DATE_CUTOFF.with(|cell| cell.get().unwrap_or_else(default_sample_date_cutoff))
}

pub fn default_sample_date_cutoff() -> NaiveDate {
    let (year, month, day) = DEFAULT_SAMPLE_DATE_CUTOFF;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
