//! Language utilities for ISO language code handling
//!
//! Translation backends and language detectors report languages in a mix of
//! ISO 639-1, ISO 639-2/T, ISO 639-2/B and BCP 47 tags ("pt-BR", "zh_Hant").
//! These helpers reduce all of them to one comparable form.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Code a language detector returns when it cannot decide
pub const UNDETERMINED: &str = "und";

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

// "pt-BR" -> "pt", " EN " -> "en"
fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn lookup(code: &str) -> Option<Language> {
    let primary = primary_subtag(code);
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => {
            let terminological = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == primary)
                .map_or(primary.as_str(), |(_, terminological)| *terminological);
            Language::from_639_3(terminological)
        }
        _ => None,
    }
}

/// Whether a detector result means "no idea"
pub fn is_undetermined(code: &str) -> bool {
    let primary = primary_subtag(code);
    primary.is_empty() || primary == UNDETERMINED
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = lookup(code).ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map_or_else(|| lang.to_639_3().to_string(), |part1| part1.to_string()))
}

/// Check if two language codes represent the same language
///
/// Codes that are not recognised compare by their primary subtag, so a
/// backend-specific code still matches itself.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(lang1), Some(lang2)) => lang1 == lang2,
        _ => primary_subtag(code1) == primary_subtag(code2),
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
