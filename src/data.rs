use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

/// Years an xlsx date cell can hold.
const EXCEL_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;
const OUTSIDE_EXCEL_RANGE: &str = "outside Excel date range 1900..=9999";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    String(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Error(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::String(value.into())
    }

    /// Collapses midnight timestamps to plain dates.
    pub fn from_datetime(value: NaiveDateTime) -> Self {
        if value.time() == NaiveTime::MIN {
            Cell::Date(value.date())
        } else {
            Cell::DateTime(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// No value at all. Whitespace-only text still counts as present.
    pub fn is_absent(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::String(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Cell::Float(f) => Decimal::from_f64(*f).map(|d| d.normalize()),
            Cell::Int(i) => Some(Decimal::from(*i)),
            Cell::String(s) => s.trim().replace(',', "").parse::<Decimal>().ok(),
            _ => None,
        }
    }

    /// Trimmed display text, `None` when the cell is empty.
    pub fn non_empty_text(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.as_display().trim().to_string())
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::String(s) => s.clone(),
            Cell::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Cell::Int(i) => i.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Cell::Error(e) => e.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Outcome of normalizing one date cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DateNormalization {
    Empty,
    AlreadyStructured,
    Parsed { original: String, date: NaiveDate },
    YearOnly { year: i32, date: NaiveDate },
    Kept { original: String, reason: String },
}

impl DateNormalization {
    pub fn replacement(&self) -> Option<NaiveDate> {
        match self {
            DateNormalization::Parsed { date, .. } | DateNormalization::YearOnly { date, .. } => {
                Some(*date)
            }
            _ => None,
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, DateNormalization::Kept { .. })
    }
}

pub fn normalize_date(cell: &Cell, text_format: &str) -> DateNormalization {
    match cell {
        Cell::Empty => DateNormalization::Empty,
        Cell::Date(_) | Cell::DateTime(_) => DateNormalization::AlreadyStructured,
        Cell::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return DateNormalization::Empty;
            }
            match NaiveDate::parse_from_str(trimmed, text_format) {
                Ok(date) if EXCEL_YEAR_RANGE.contains(&date.year()) => {
                    DateNormalization::Parsed {
                        original: raw.clone(),
                        date,
                    }
                }
                Ok(_) => DateNormalization::Kept {
                    original: raw.clone(),
                    reason: OUTSIDE_EXCEL_RANGE.to_string(),
                },
                Err(err) => DateNormalization::Kept {
                    original: raw.clone(),
                    reason: format!("does not match '{text_format}': {err}"),
                },
            }
        }
        Cell::Float(value) => year_only(*value, cell),
        Cell::Int(value) => year_only(*value as f64, cell),
        Cell::Bool(_) | Cell::Error(_) => DateNormalization::Kept {
            original: cell.as_display(),
            reason: "not a date value".to_string(),
        },
    }
}

fn year_only(value: f64, cell: &Cell) -> DateNormalization {
    let kept = |reason: &str| DateNormalization::Kept {
        original: cell.as_display(),
        reason: reason.to_string(),
    };
    if value.fract() != 0.0 {
        return kept("number is not a whole year");
    }
    let year = value as i32;
    if !EXCEL_YEAR_RANGE.contains(&year) {
        return kept(OUTSIDE_EXCEL_RANGE);
    }
    match NaiveDate::from_ymd_opt(year, 1, 1) {
        Some(date) => DateNormalization::YearOnly { year, date },
        None => kept("year cannot be represented as a date"),
    }
}

pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => c,
            _ => '_',
        })
        .collect::<String>()
        .to_ascii_lowercase()
}
