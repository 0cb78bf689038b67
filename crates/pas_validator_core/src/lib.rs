pub mod catalog;
pub mod dispatch;
pub mod engine;
pub mod field_check;
pub mod gating;
pub mod invariants;
pub mod notice;
pub mod progress;
pub mod record;
pub mod spec_table;
pub mod validation_context;
pub mod validator;
pub mod violation;

pub use catalog::{code_set, range_for, Bounds, CodeSet};
pub use dispatch::{plan_for, validate_record, GAS_PLAN, OIL_WATER_PLAN};
pub use engine::{validate_files, validate_files_with_progress, ValidationOptions, ValidationOutcome};
pub use field_check::{validate_field, Measure, Requirement};
pub use gating::{Condition, FieldRule, Plan, Policy, SectionRule};
pub use notice::{NoticeContainer, NoticeSeverity, ValidationNotice};
pub use progress::{NoOpProgressHandler, ProgressHandler};
pub use record::{PasRecord, RecordReader};
pub use spec_table::{FieldSpec, RuleFlags, SpecError, SpecTable, SpecView};
pub use validation_context::{
    default_sample_date_cutoff, sample_date_cutoff, set_sample_date_cutoff, SampleDateCutoffGuard,
};
pub use validator::{outcomes_to_notices, RecordOutcome, RecordStatus, RecordValidator};
pub use violation::Violation;

pub use pas_model::{FieldEncoding, PasValue, RecordKind};
