use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use csv::{ReaderBuilder, StringRecord, Trim};
use pas_model::{FieldEncoding, PasValue};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::spec_table::{SpecError, SpecView};

/// One reported row: mnemonic to value. Absent fields have no entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PasRecord {
    row: u64,
    values: FxHashMap<CompactString, PasValue>,
}

impl PasRecord {
    pub fn new(row: u64) -> Self {
        Self {
            row,
            values: FxHashMap::default(),
        }
    }

    pub fn from_pairs<I, K, V>(row: u64, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CompactString>,
        V: Into<PasValue>,
    {
        let mut record = Self::new(row);
        for (mnemonic, value) in pairs {
            record.insert(mnemonic, value);
        }
        record
    }

    pub fn row(&self) -> u64 {
        self.row
    }

    pub fn insert(&mut self, mnemonic: impl Into<CompactString>, value: impl Into<PasValue>) {
        self.values.insert(mnemonic.into(), value.into());
    }

    pub fn remove(&mut self, mnemonic: &str) -> Option<PasValue> {
        self.values.remove(mnemonic)
    }

    /// The value of `mnemonic`, treating blank text as absent.
    pub fn get(&self, mnemonic: &str) -> Option<&PasValue> {
        match self.values.get(mnemonic) {
            Some(PasValue::Text(text)) if text.trim().is_empty() => None,
            Some(PasValue::Number(number)) if number.is_nan() => None,
            other => other,
        }
    }

    pub fn is_present(&self, mnemonic: &str) -> bool {
        self.get(mnemonic).is_some()
    }

    pub fn code(&self, mnemonic: &str) -> Option<Cow<'_, str>> {
        self.get(mnemonic).map(PasValue::as_code)
    }

    pub fn number(&self, mnemonic: &str) -> Option<f64> {
        self.get(mnemonic).and_then(PasValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reads a delimited data file whose header row names mnemonics and coerces
/// each cell to the encoding its specification row declares.
#[derive(Debug, Clone)]
pub struct RecordReader {
    delimiter: u8,
}

impl Default for RecordReader {
    fn default() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl RecordReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn read_path(&self, path: impl AsRef<Path>, view: &SpecView) -> Result<Vec<PasRecord>, SpecError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SpecError::RecordIo {
            path: path.to_path_buf(),
            source,
        })?;
        let records = self.read(file, view, &path.display().to_string())?;
        info!("read {} records from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn read<R: Read>(
        &self,
        mut reader: R,
        view: &SpecView,
        file_label: &str,
    ) -> Result<Vec<PasRecord>, SpecError> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|source| SpecError::RecordIo {
                path: PathBuf::from(file_label),
                source,
            })?;
        let lines = LineIndex::new(&data);
        let csv_error = |source: csv::Error| SpecError::RecordCsv {
            file: file_label.to_string(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .trim(Trim::Headers)
            .from_reader(data.as_slice());

        let headers = reader.headers().map_err(csv_error)?.clone();
        if headers.iter().all(|header| header.trim().is_empty()) {
            return Err(SpecError::Record {
                file: file_label.to_string(),
                message: "missing header row".to_string(),
            });
        }
        let header_index: FxHashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(index, value)| (value, index))
            .collect();
        for header in headers.iter() {
            if !header.is_empty() && view.field(header).is_none() {
                debug!("{}: ignoring column {} not declared for {}", file_label, header, view.kind());
            }
        }

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = result.map_err(csv_error)?;
            let row_number = row
                .position()
                .map(|pos| lines.line_of_record_at(pos.byte()))
                .unwrap_or(index as u64 + 2);
            if row.iter().all(|value| value.trim().is_empty()) {
                debug!("{}: skipping empty row {}", file_label, row_number);
                continue;
            }
            records.push(format_row(view, &header_index, &row, row_number));
        }
        Ok(records)
    }
}

/// Maps byte offsets to 1-based physical line numbers.
///
/// Record positions from `csv` start where the previous record ended, so any
/// blank lines the reader skipped sit between the offset and the record.
struct LineIndex<'a> {
    data: &'a [u8],
    newlines: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(data: &'a [u8]) -> Self {
        let newlines = data
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
            .map(|(offset, _)| offset)
            .collect();
        Self { data, newlines }
    }

    fn line_of_record_at(&self, byte: u64) -> u64 {
        let offset = usize::try_from(byte).unwrap_or(usize::MAX).min(self.data.len());
        let start = self.data[offset..]
            .iter()
            .position(|byte| *byte != b'\n' && *byte != b'\r')
            .map_or(self.data.len(), |skipped| offset + skipped);
        self.newlines.partition_point(|newline| *newline < start) as u64 + 1
    }
}

fn format_row(
    view: &SpecView,
    header_index: &FxHashMap<&str, usize>,
    row: &StringRecord,
    row_number: u64,
) -> PasRecord {
    let mut record = PasRecord::new(row_number);
    for field in view.iter() {
        if record.values.contains_key(field.mnemonic.as_str()) {
            continue;
        }
        let raw = header_index
            .get(field.mnemonic.as_str())
            .and_then(|index| row.get(*index));
        if let Some(value) = raw.and_then(|raw| format_value(&field.encoding, raw)) {
            record.values.insert(field.mnemonic.clone(), value);
        }
    }
    record
}

/// Coerces one raw cell. Blank cells and `nan` are absent.
pub fn format_value(encoding: &FieldEncoding, raw: &str) -> Option<PasValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }
    match encoding {
        FieldEncoding::Text { .. } | FieldEncoding::Date(_) => Some(PasValue::text(trimmed)),
        FieldEncoding::Numeric { decimals, .. } => match trimmed.parse::<f64>() {
            Ok(number) if number.is_nan() => None,
            Ok(number) => Some(PasValue::number(round_to(number, *decimals))),
            Err(_) => Some(PasValue::text(trimmed)),
        },
    }
}

fn round_to(value: f64, decimals: Option<u8>) -> f64 {
    match decimals {
        None => value.trunc(),
        Some(decimals) => {
            let factor = 10f64.powi(i32::from(decimals));
            (value * factor).round() / factor
        }
    }
}
