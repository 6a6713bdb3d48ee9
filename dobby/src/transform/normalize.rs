//! Cell-level normalizers: addresses, phones, dates and names.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::tabular::Cell;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

// =============================================================================
// Addresses
// =============================================================================

/// Removes locality names, commas and redundant whitespace from addresses.
#[derive(Debug, Clone)]
pub struct AddressCleaner {
    patterns: Vec<Regex>,
}

impl AddressCleaner {
    /// Build one case-insensitive whole-word pattern per locality name.
    pub fn new(localities: &[String]) -> Result<Self, regex::Error> {
        let patterns = localities
            .iter()
            .map(|name| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Clean one address. Localities are removed in list order.
    pub fn clean(&self, address: &str) -> String {
        let mut cleaned = address.to_string();
        for pattern in &self.patterns {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
        let cleaned = cleaned.replace(',', "");
        WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
    }

    /// Clean a cell; anything that is not text becomes an empty string.
    pub fn clean_cell(&self, cell: &Cell) -> String {
        match cell.as_str() {
            Some(address) => self.clean(address),
            None => String::new(),
        }
    }
}

// =============================================================================
// Phones
// =============================================================================

/// Kind of a valid 9-digit Chilean phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneKind {
    /// 900000000–999999999
    Mobile,
    /// 200000000–799999999
    Fixed,
}

/// Outcome of normalizing one phone cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumber {
    /// Empty, zero or nothing left after cleanup. Stored as `0`.
    Absent,
    Valid { number: i64, kind: PhoneKind },
    /// Digits that are not a mobile or fixed number. Stored as `0`.
    Invalid { digits: String },
}

impl PhoneNumber {
    /// Value written to the table: the number when valid, `0` otherwise.
    pub fn stored_value(&self) -> i64 {
        match self {
            PhoneNumber::Valid { number, .. } => *number,
            _ => 0,
        }
    }
}

/// Classify a cleaned number by range.
pub fn classify_phone(number: u64) -> Option<PhoneKind> {
    match number {
        900_000_000..=999_999_999 => Some(PhoneKind::Mobile),
        200_000_000..=799_999_999 => Some(PhoneKind::Fixed),
        _ => None,
    }
}

/// Normalize a phone cell.
///
/// Spreadsheet float artifacts (`932832346.0`) are truncated, spaces,
/// hyphens and the `+56` prefix are removed, then any remaining non-digit.
pub fn normalize_phone(cell: &Cell) -> PhoneNumber {
    let mut text = match cell {
        Cell::Missing | Cell::Int(0) => return PhoneNumber::Absent,
        other => other.to_string().trim().to_string(),
    };
    if text.is_empty() {
        return PhoneNumber::Absent;
    }

    if text.contains('.') {
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() {
                text = format!("{}", value.trunc() as i64);
            }
        }
    }

    let stripped = text.replace(' ', "").replace('-', "").replace("+56", "");
    let digits: String = stripped.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return PhoneNumber::Absent;
    }

    match digits.parse::<u64>() {
        Ok(0) => PhoneNumber::Absent,
        Ok(number) => match classify_phone(number) {
            Some(kind) => PhoneNumber::Valid {
                number: number as i64,
                kind,
            },
            None => PhoneNumber::Invalid { digits },
        },
        Err(_) => PhoneNumber::Invalid { digits },
    }
}

// =============================================================================
// Dates
// =============================================================================

/// Parse a day-first date.
///
/// Accepts `d-m-Y`, `d/m/Y`, `d.m.Y`, two-digit years (`00`–`68` → 2000s,
/// `69`–`99` → 1900s) and ISO `Y-m-d`. A trailing time component is ignored.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split_whitespace().next()?;
    let date_part = date_part.split('T').next()?;

    let parts: Vec<&str> = date_part.split(|c| matches!(c, '-' | '/' | '.')).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let (day, month, year) = if parts[0].len() == 4 {
        (parts[2], parts[1], parts[0])
    } else {
        (parts[0], parts[1], parts[2])
    };

    let year: i32 = match year.len() {
        4 => year.parse().ok()?,
        2 => {
            let short: i32 = year.parse().ok()?;
            if short < 69 {
                2000 + short
            } else {
                1900 + short
            }
        }
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

// =============================================================================
// Names
// =============================================================================

/// Split a full name on its first space into first and second name.
///
/// A single-token name has no second name; a missing name yields two
/// missing cells.
pub fn split_first_space(cell: &Cell) -> (Cell, Cell) {
    let Some(name) = cell.text_value() else {
        return (Cell::Missing, Cell::Missing);
    };
    match name.split_once(' ') {
        Some((first, rest)) => (Cell::text(first), Cell::text(rest)),
        None => (Cell::text(name), Cell::Missing),
    }
}
