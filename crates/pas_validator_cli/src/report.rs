//! JSON validation report: a run summary followed by notices grouped by code.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{Local, NaiveDate, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Value};

use pas_validator_core::{
    NoticeSeverity, RecordKind, ValidationNotice, ValidationOutcome,
};

/// Sample notices kept per code.
const NOTICE_ROW_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub validator_version: String,
    pub spec_file: String,
    pub input_file: String,
    pub record_kind: Option<String>,
    pub sample_date_cutoff: Option<String>,
    pub validated_at: String,
    pub validation_time_seconds: f64,
    pub threads: usize,
    pub records: RecordCounts,
    pub counts: NoticeCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl NoticeCounts {
    fn add(&mut self, severity: NoticeSeverity) {
        match severity {
            NoticeSeverity::Error => self.errors += 1,
            NoticeSeverity::Warning => self.warnings += 1,
            NoticeSeverity::Info => self.infos += 1,
        }
    }
}

impl ReportSummary {
    pub fn new(spec_file: &Path, input_file: &Path) -> Self {
        Self {
            validator_version: env!("CARGO_PKG_VERSION").to_string(),
            spec_file: spec_file.display().to_string(),
            input_file: input_file.display().to_string(),
            record_kind: None,
            sample_date_cutoff: None,
            validated_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            validation_time_seconds: 0.0,
            threads: 1,
            records: RecordCounts::default(),
            counts: NoticeCounts::default(),
        }
    }

    pub fn with_record_kind(mut self, kind: Option<RecordKind>) -> Self {
        self.record_kind = kind.map(|kind| kind.code().to_string());
        self
    }

    pub fn with_sample_date_cutoff(mut self, cutoff: NaiveDate) -> Self {
        self.sample_date_cutoff = Some(cutoff.format("%Y-%m-%d").to_string());
        self
    }

    pub fn with_validation_time_seconds(mut self, seconds: f64) -> Self {
        self.validation_time_seconds = seconds;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeReport {
    pub code: String,
    pub severity: NoticeSeverity,
    pub total_notices: usize,
    pub sample_notices: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub summary: ReportSummary,
    pub notices: Vec<NoticeReport>,
}

impl ValidationReport {
    /// Fills the summary counts from `outcome` and groups its notices by code
    /// in order of first appearance.
    pub fn from_outcome(outcome: &ValidationOutcome, mut summary: ReportSummary) -> Self {
        summary.records = RecordCounts {
            total: outcome.records.len(),
            passed: outcome.passed_count(),
            failed: outcome.failed_count(),
        };

        let mut counts = NoticeCounts::default();
        let mut groups: Vec<NoticeReport> = Vec::new();
        for notice in outcome.notices.iter() {
            counts.add(notice.severity);
            let index = match groups.iter().position(|group| group.code == notice.code) {
                Some(index) => index,
                None => {
                    groups.push(NoticeReport {
                        code: notice.code.clone(),
                        severity: notice.severity,
                        total_notices: 0,
                        sample_notices: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            group.total_notices += 1;
            if group.sample_notices.len() < NOTICE_ROW_LIMIT {
                group.sample_notices.push(sample_notice(notice));
            }
        }
        summary.counts = counts;

        Self {
            summary,
            notices: groups,
        }
    }

    pub fn to_json(&self, pretty: bool) -> anyhow::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("serialize validation report")
    }

    pub fn write_json_with_format(&self, path: &Path, pretty: bool) -> anyhow::Result<()> {
        let json = self.to_json(pretty)?;
        fs::write(path, json)
            .with_context(|| format!("write validation report to {}", path.display()))
    }
}

fn sample_notice(notice: &ValidationNotice) -> Value {
    let mut sample = Map::new();
    sample.insert("message".to_string(), Value::String(notice.message.clone()));
    for (key, value) in &notice.context {
        sample.insert(key.clone(), value.clone());
    }
    Value::Object(sample)
}
