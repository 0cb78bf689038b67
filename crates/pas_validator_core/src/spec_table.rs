use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use csv::{ReaderBuilder, Trim};
use pas_model::{FieldEncoding, PasParseError, RecordKind};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, info};

/// Rule text phrases that make a field nullable.
pub const NULL_ALLOWED_PHRASES: &[&str] = &[
    "optional",
    "mandatory, if",
    "then",
    "can be blank",
    "can be null",
    "can be zero or null",
];

/// Rule text phrases that allow a numeric field to be exactly zero.
pub const ZERO_ALLOWED_PHRASES: &[&str] = &[
    "> = 0",
    ">= 0",
    "can = zero",
    "can be zero",
    "can  be zero",
    "can be null or zero",
    "can be blank or zero",
    "can be null, negative or zero",
];

/// Rule text phrases that reject negative values.
pub const NEGATIVE_REJECTED_PHRASES: &[&str] = &["> 0", ">= 0", "> = 0", "> zero"];

#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid FIELD SIZE for {mnemonic}: {source}")]
    InvalidEncoding {
        row: u64,
        mnemonic: String,
        #[source]
        source: PasParseError,
    },
    #[error("unknown record kind: {0}")]
    UnknownRecordKind(String),
    #[error("specification table has no fields for record kind {0}")]
    RecordKindNotInTable(RecordKind),
    #[error("failed to read record file {path}: {source}")]
    RecordIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("record file {file}: {source}")]
    RecordCsv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("record file {file}: {message}")]
    Record { file: String, message: String },
}

/// Null, zero and negative tolerance derived once from the rule text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleFlags {
    pub optional: bool,
    pub zero_allowed: bool,
    pub negative_allowed: bool,
}

impl RuleFlags {
    pub fn from_rule_text(text: &str) -> Self {
        let contains_any = |phrases: &[&str]| phrases.iter().any(|phrase| text.contains(phrase));
        Self {
            optional: contains_any(NULL_ALLOWED_PHRASES),
            zero_allowed: contains_any(ZERO_ALLOWED_PHRASES),
            negative_allowed: !contains_any(NEGATIVE_REJECTED_PHRASES),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub mnemonic: CompactString,
    pub section: Option<CompactString>,
    pub encoding: FieldEncoding,
    pub rule_text: String,
    pub flags: RuleFlags,
    pub analysis: CompactString,
}

impl FieldSpec {
    pub fn new(
        mnemonic: &str,
        section: Option<&str>,
        encoding: FieldEncoding,
        rule_text: &str,
        analysis: &str,
    ) -> Self {
        let rule_text = normalize_rule_text(rule_text);
        Self {
            mnemonic: mnemonic.trim().into(),
            section: section
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(CompactString::from),
            encoding,
            flags: RuleFlags::from_rule_text(&rule_text),
            rule_text,
            analysis: analysis.trim().to_ascii_uppercase().into(),
        }
    }
}

fn normalize_rule_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Deserialize)]
struct SpecRow {
    #[serde(rename = "MNEMONIC NAME")]
    mnemonic: String,
    #[serde(rename = "FIELD SIZE")]
    field_size: String,
    #[serde(rename = "BUSINESS RULES AND EDITS", default)]
    business_rules: Option<String>,
    #[serde(rename = "FIELD", default)]
    field: Option<String>,
    #[serde(rename = "ANALYSIS")]
    analysis: String,
}

/// The full specification table across every analysis kind.
#[derive(Debug, Clone, Default)]
pub struct SpecTable {
    fields: Vec<FieldSpec>,
}

impl SpecTable {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SpecError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(
            "loaded {} specification rows from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SpecError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let mut fields = Vec::new();
        for (index, result) in reader.deserialize::<SpecRow>().enumerate() {
            let row: SpecRow = result?;
            let row_number = index as u64 + 2;
            if row.mnemonic.trim().is_empty() {
                debug!("skipping specification row {} with no mnemonic", row_number);
                continue;
            }
            let encoding =
                FieldEncoding::parse(&row.field_size).map_err(|source| SpecError::InvalidEncoding {
                    row: row_number,
                    mnemonic: row.mnemonic.trim().to_string(),
                    source,
                })?;
            fields.push(FieldSpec::new(
                &row.mnemonic,
                row.field.as_deref(),
                encoding,
                row.business_rules.as_deref().unwrap_or_default(),
                &row.analysis,
            ));
        }
        Ok(Self { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Copies the rows tagged with `kind`, in table order, into an immutable view.
    pub fn subset(&self, kind: RecordKind) -> Result<SpecView, SpecError> {
        let fields: Vec<FieldSpec> = self
            .fields
            .iter()
            .filter(|field| field.analysis.as_str() == kind.code())
            .cloned()
            .collect();
        if fields.is_empty() {
            return Err(SpecError::RecordKindNotInTable(kind));
        }
        Ok(SpecView::new(kind, fields))
    }

    pub fn subset_by_code(&self, code: &str) -> Result<SpecView, SpecError> {
        let kind = RecordKind::from_code(code)
            .map_err(|_| SpecError::UnknownRecordKind(code.to_string()))?;
        self.subset(kind)
    }
}

/// The specification rows for one record kind.
#[derive(Debug, Clone)]
pub struct SpecView {
    kind: RecordKind,
    fields: Vec<FieldSpec>,
    by_mnemonic: FxHashMap<CompactString, usize>,
}

impl SpecView {
    pub fn new(kind: RecordKind, fields: Vec<FieldSpec>) -> Self {
        let mut by_mnemonic = FxHashMap::default();
        for (index, field) in fields.iter().enumerate() {
            by_mnemonic.entry(field.mnemonic.clone()).or_insert(index);
        }
        Self {
            kind,
            fields,
            by_mnemonic,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First row declaring `mnemonic`.
    pub fn field(&self, mnemonic: &str) -> Option<&FieldSpec> {
        self.by_mnemonic
            .get(mnemonic)
            .and_then(|index| self.fields.get(*index))
    }
}
