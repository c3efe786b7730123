use crate::model::{CellValue, Material, Process};
use crate::parsing::normalize::{map_value, slugify, MATERIALS, PROCESSES};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Separators accepted inside list cells (processes, accessories).
pub const LIST_SEPARATORS: &[char] = &[',', ';', '|'];

/// Parse a numeric cell into a Decimal.
///
/// Handles formats like:
/// - 200 (numeric cell) -> 200
/// - "200" -> 200
/// - "0,5" -> 0.5 (decimal comma)
/// - "65%" -> 65
///
/// Returns `None` for blank cells and for anything that is not a finite number.
pub fn cell_to_decimal(cell: &CellValue) -> Option<Decimal> {
    match cell {
        CellValue::Number(f) => f64_to_decimal(*f),
        CellValue::Text(s) => parse_decimal(s),
        CellValue::Blank => None,
    }
}

/// Parse a decimal value, accepting a decimal comma and a trailing percent sign.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim().trim_end_matches('%').trim();
    if s.is_empty() {
        return None;
    }
    let normalized = s.replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// True for text like "1,000" or "-12,500": a single comma followed by
/// exactly three digits, which reads as either a decimal comma or a
/// thousands separator. `parse_decimal` takes the decimal reading.
pub fn is_ambiguous_comma(s: &str) -> bool {
    let s = s.trim().trim_end_matches('%').trim();
    let s = s.strip_prefix('-').unwrap_or(s);
    let Some((whole, fraction)) = s.split_once(',') else {
        return false;
    };
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    digits(whole)
        && digits(fraction)
        && whole.len() <= 3
        && !whole.starts_with('0')
        && fraction.len() == 3
}

/// Convert f64 to Decimal via its shortest string form so that spreadsheet
/// values like 0.3 do not turn into 0.29999...
fn f64_to_decimal(f: f64) -> Option<Decimal> {
    if !f.is_finite() {
        return None;
    }
    let s = format!("{f}");
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::try_from(f).ok())
}

/// Split a delimited cell into trimmed, non-empty items in source order.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a process cell, map every token on its own, and deduplicate while
/// keeping first-seen order. Tokens no dictionary knows survive as a slug.
pub fn parse_processes(raw: &str) -> Vec<Process> {
    let mut processes: Vec<Process> = Vec::new();
    for token in parse_list(raw) {
        let process = match map_value(&token, &PROCESSES, "") {
            "" => {
                let slug = slugify(&token);
                if slug.is_empty() {
                    continue;
                }
                Process::Other(slug)
            }
            code => Process::from_code(code),
        };
        if !processes.contains(&process) {
            processes.push(process);
        }
    }
    processes
}

/// Map a material cell. Unknown materials keep a slug of the original text;
/// text with nothing sluggable left is treated as missing.
pub fn parse_material(raw: &str) -> Option<Material> {
    match map_value(raw, &MATERIALS, "") {
        "" => {
            let slug = slugify(raw);
            if slug.is_empty() {
                None
            } else {
                Some(Material::Other(slug))
            }
        }
        code => Some(Material::from_code(code)),
    }
}
