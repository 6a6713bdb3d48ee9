//! Chilean RUT validation.
//!
//! A RUT is a 7–9 digit body followed by one check character (`0`-`9` or
//! `K`) computed with the modulo-11 algorithm. Bodies in the provisional
//! student range (IPE, 100–299 million) carry no checksum and are accepted
//! as they are.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static RUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{7,9}[0-9K]$").expect("Invalid RUT pattern"));

const CHECK_WEIGHTS: [u32; 6] = [2, 3, 4, 5, 6, 7];

/// Provisional identifier ranges exempt from checksum validation.
pub const PROVISIONAL_RANGES: [Range<u64>; 2] =
    [100_000_000..200_000_000, 200_000_000..300_000_000];

/// Strip `.` and `-`, uppercase and trim.
pub fn normalize_rut(rut: &str) -> String {
    rut.replace('.', "").replace('-', "").to_uppercase().trim().to_string()
}

/// Whether a RUT body falls in a provisional (IPE) range.
pub fn is_provisional(body: u64) -> bool {
    PROVISIONAL_RANGES.iter().any(|range| range.contains(&body))
}

/// Compute the modulo-11 check character of a digit-only body.
///
/// Returns `None` for an empty body or one containing non-digits.
pub fn check_character(body: &str) -> Option<char> {
    if body.is_empty() {
        return None;
    }

    let mut sum = 0u32;
    for (digit, weight) in body.chars().rev().zip(CHECK_WEIGHTS.iter().cycle()) {
        sum += digit.to_digit(10)? * weight;
    }

    match 11 - sum % 11 {
        11 => Some('0'),
        10 => Some('K'),
        d => char::from_digit(d, 10),
    }
}

/// Validate a RUT such as `12.345.678-5` or `23762615-K`.
///
/// Malformed input of any kind yields `false`; this never panics.
pub fn validate_rut(rut: &str) -> bool {
    let clean = normalize_rut(rut);
    if !RUT_PATTERN.is_match(&clean) {
        return false;
    }

    let (body, check) = clean.split_at(clean.len() - 1);
    let Ok(number) = body.parse::<u64>() else {
        return false;
    };
    if is_provisional(number) {
        return true;
    }

    check_character(body).is_some_and(|expected| check.starts_with(expected))
}

/// Join a RUT body and check character as `body-check`.
pub fn format_rut(body: &str, check: &str) -> String {
    format!("{}-{}", body, check)
}
