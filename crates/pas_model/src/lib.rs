use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use compact_str::CompactString;

/// Descriptor tokens used by the FIELD SIZE column.
pub const TEXT_DESCRIPTOR: &str = "CHAR";
pub const NUMERIC_DESCRIPTOR: &str = "NUMB";
pub const DAY_DESCRIPTOR: &str = "YYYY MM DD";
pub const DAY_HOUR_DESCRIPTOR: &str = "YYYY MM DD HHHH";
pub const DAY_HOUR_SECOND_DESCRIPTOR: &str = "YYYY MM DD HHHH:SS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasParseError {
    #[error("unknown record kind: {0}")]
    UnknownRecordKind(String),
    #[error("invalid field size descriptor: {0}")]
    InvalidEncoding(String),
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    #[error("invalid date value: {0}")]
    InvalidDateValue(String),
}

/// The analysis categories a PAS record can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Oil,
    Water,
    Gas,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Oil, RecordKind::Water, RecordKind::Gas];

    pub fn from_code(code: &str) -> Result<Self, PasParseError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "OAN" => Ok(RecordKind::Oil),
            "WAN" => Ok(RecordKind::Water),
            "GAN" => Ok(RecordKind::Gas),
            _ => Err(PasParseError::UnknownRecordKind(code.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RecordKind::Oil => "OAN",
            RecordKind::Water => "WAN",
            RecordKind::Gas => "GAN",
        }
    }
}

impl FromStr for RecordKind {
    type Err = PasParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RecordKind::from_code(value)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for RecordKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for RecordKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordKindVisitor;

        impl<'de> Visitor<'de> for RecordKindVisitor {
            type Value = RecordKind;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("one of OAN, WAN or GAN")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RecordKind, E> {
                RecordKind::from_code(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(RecordKindVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateLayout {
    Day,
    DayHour,
    DayHourSecond,
}

impl DateLayout {
    /// Number of space separated tokens a value in this layout carries.
    pub fn token_count(&self) -> usize {
        self.as_str().split(' ').count()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateLayout::Day => DAY_DESCRIPTOR,
            DateLayout::DayHour => DAY_HOUR_DESCRIPTOR,
            DateLayout::DayHourSecond => DAY_HOUR_SECOND_DESCRIPTOR,
        }
    }
}

/// Physical encoding of a field, parsed from its FIELD SIZE descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEncoding {
    Text { max_len: usize },
    /// `decimals` is `None` for integer fields (`NUMB 2`).
    Numeric { width: u8, decimals: Option<u8> },
    Date(DateLayout),
}

impl FieldEncoding {
    pub fn parse(descriptor: &str) -> Result<Self, PasParseError> {
        let cleaned = descriptor.replace(['[', ']'], "");
        let cleaned = cleaned.trim();
        let invalid = || PasParseError::InvalidEncoding(descriptor.to_string());

        if cleaned.contains(DAY_DESCRIPTOR) {
            let layout = if cleaned.contains("HHHH:SS") {
                DateLayout::DayHourSecond
            } else if cleaned.contains("HHHH") {
                DateLayout::DayHour
            } else {
                DateLayout::Day
            };
            return Ok(FieldEncoding::Date(layout));
        }

        let mut tokens = cleaned.split_whitespace();
        let kind = tokens.next().ok_or_else(invalid)?;
        let size = tokens.next().ok_or_else(invalid)?;
        if tokens.next().is_some() {
            return Err(invalid());
        }

        match kind.to_ascii_uppercase().as_str() {
            TEXT_DESCRIPTOR => {
                let max_len = size.parse().map_err(|_| invalid())?;
                Ok(FieldEncoding::Text { max_len })
            }
            NUMERIC_DESCRIPTOR => match size.split_once(',') {
                Some((width, decimals)) => Ok(FieldEncoding::Numeric {
                    width: width.trim().parse().map_err(|_| invalid())?,
                    decimals: Some(decimals.trim().parse().map_err(|_| invalid())?),
                }),
                None => Ok(FieldEncoding::Numeric {
                    width: size.parse().map_err(|_| invalid())?,
                    decimals: None,
                }),
            },
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for FieldEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldEncoding::Text { max_len } => write!(f, "{} {}", TEXT_DESCRIPTOR, max_len),
            FieldEncoding::Numeric {
                width,
                decimals: Some(decimals),
            } => write!(f, "{} {},{}", NUMERIC_DESCRIPTOR, width, decimals),
            FieldEncoding::Numeric {
                width,
                decimals: None,
            } => write!(f, "{} {}", NUMERIC_DESCRIPTOR, width),
            FieldEncoding::Date(layout) => f.write_str(layout.as_str()),
        }
    }
}

impl FromStr for FieldEncoding {
    type Err = PasParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FieldEncoding::parse(value)
    }
}

/// A reported value after the formatting step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PasValue {
    Number(f64),
    Text(String),
}

impl PasValue {
    pub fn text(value: impl Into<String>) -> Self {
        PasValue::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        PasValue::Number(value)
    }

    /// Coerces the value to a float; text that does not parse yields `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PasValue::Number(value) => Some(*value),
            PasValue::Text(value) => value.trim().parse::<f64>().ok(),
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            PasValue::Text(value) => Cow::Borrowed(value.as_str()),
            PasValue::Number(_) => Cow::Owned(self.to_string()),
        }
    }

    /// String-normalized form used when comparing against code values.
    pub fn as_code(&self) -> Cow<'_, str> {
        match self {
            PasValue::Text(value) => Cow::Borrowed(value.trim()),
            PasValue::Number(value) => Cow::Owned(format_number(*value)),
        }
    }
}

impl fmt::Display for PasValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasValue::Text(value) => f.write_str(value),
            PasValue::Number(value) => f.write_str(&format_number(*value)),
        }
    }
}

impl From<&str> for PasValue {
    fn from(value: &str) -> Self {
        PasValue::Text(value.to_string())
    }
}

impl From<String> for PasValue {
    fn from(value: String) -> Self {
        PasValue::Text(value)
    }
}

impl From<f64> for PasValue {
    fn from(value: f64) -> Self {
        PasValue::Number(value)
    }
}

impl From<i64> for PasValue {
    fn from(value: i64) -> Self {
        PasValue::Number(value as f64)
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A sample date in `YYYY MM DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PasDate(NaiveDate);

impl PasDate {
    pub fn parse(value: &str) -> Result<Self, PasParseError> {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        let well_formed = tokens.len() == 3
            && tokens[0].len() == 4
            && tokens[1].len() == 2
            && tokens[2].len() == 2
            && tokens
                .iter()
                .all(|token| token.chars().all(|ch| ch.is_ascii_digit()));
        if !well_formed {
            return Err(PasParseError::InvalidDateFormat(value.to_string()));
        }

        let year: i32 = tokens[0]
            .parse()
            .map_err(|_| PasParseError::InvalidDateFormat(value.to_string()))?;
        let month: u32 = tokens[1]
            .parse()
            .map_err(|_| PasParseError::InvalidDateFormat(value.to_string()))?;
        let day: u32 = tokens[2]
            .parse()
            .map_err(|_| PasParseError::InvalidDateFormat(value.to_string()))?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(PasDate)
            .ok_or_else(|| PasParseError::InvalidDateValue(value.to_string()))
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for PasDate {
    fn from(date: NaiveDate) -> Self {
        PasDate(date)
    }
}

impl fmt::Display for PasDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y %m %d"))
    }
}

impl Serialize for PasDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PasDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PasDateVisitor;

        impl<'de> Visitor<'de> for PasDateVisitor {
            type Value = PasDate;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a PAS date in YYYY MM DD format")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<PasDate, E> {
                PasDate::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PasDateVisitor)
    }
}

/// Unit token of a mnemonic: `SPRES.KPAA` has unit `KPAA`, `SPNT.` has none.
pub fn mnemonic_unit(mnemonic: &str) -> Option<&str> {
    let mut parts = mnemonic.split('.');
    let _name = parts.next()?;
    let unit = parts.next()?;
    if parts.next().is_some() || unit.is_empty() {
        return None;
    }
    Some(unit)
}
