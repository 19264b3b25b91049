//! Depth value normalization.
//!
//! Operators type depths in whatever convention their locale uses (`2,900.00`, `1.500,50`), often
//! with a unit suffix (`1500 m`). [`normalize_depth`] turns any of these into meters as `f64` and
//! never fails: unreadable input becomes `0.0`.

use crate::types::CellValue;

/// Unit tokens stripped from the end of a depth string, longest first.
const UNIT_SUFFIXES: [&str; 5] = ["meters", "pies", "mts", "ft", "m"];

/// Normalize a raw cell into a depth.
///
/// - Native numbers are returned unchanged.
/// - Falsy cells (empty, `""`, `false`) yield `0.0`.
/// - Text is handed to [`normalize_depth_str`].
pub fn normalize_depth(raw: &CellValue) -> f64 {
    match raw {
        CellValue::Number(n) => *n,
        v if v.is_falsy() => 0.0,
        CellValue::Text(s) => normalize_depth_str(s),
        CellValue::Bool(_) | CellValue::Empty => 0.0,
    }
}

/// Normalize a textual depth.
///
/// When both `,` and `.` appear, whichever comes last is the decimal separator. A lone `,` is
/// always read as a thousands separator, so `"1500,5"` becomes `15005.0`. Depths are whole or
/// near-whole meters in practice; true comma decimals are a known misread.
pub fn normalize_depth_str(raw: &str) -> f64 {
    let s = strip_unit_suffix(raw.trim());

    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');
    let unified = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => {
            // 1.500,50 -> 1500.50
            let mut out = String::with_capacity(s.len());
            for (i, c) in s.char_indices() {
                match c {
                    '.' => {}
                    ',' if i == comma => out.push('.'),
                    _ => out.push(c),
                }
            }
            out
        }
        (Some(_), _) => s.replace(',', ""),
        (None, _) => s.to_string(),
    };

    let cleaned: String = unified
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    parse_float_prefix(&cleaned).unwrap_or(0.0)
}

fn strip_unit_suffix(s: &str) -> &str {
    for unit in UNIT_SUFFIXES {
        if s.len() < unit.len() {
            continue;
        }
        let split = s.len() - unit.len();
        if let Some(tail) = s.get(split..) {
            if tail.eq_ignore_ascii_case(unit) {
                return s[..split].trim_end();
            }
        }
    }
    s
}

/// Parse the longest leading `-?digits[.digits]` run.
///
/// Trailing garbage (a second `.`, a stray `-`) is ignored; a run without any digit is `None`.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        let mut frac_digits = 0;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            frac_digits += 1;
        }
        if digits + frac_digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }

    if digits == 0 {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}
