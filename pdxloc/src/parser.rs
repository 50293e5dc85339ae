//! Line parser for Paradox-style localization files.
//!
//! The format is line-oriented:
//!
//! ```text
//! l_english:
//!  # comment
//!  key_name: "value text"
//!  key_name2: 0 "value with $PLACEHOLDER$ £ICON£ [Function]"
//! ```
//!
//! Comments, blank lines, and the language-header line are skipped; the
//! optional integer after the key is a version ordinal the games ignore.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::Error;
use crate::types::LanguagePair;

lazy_static! {
    // Optional leading ordinal, then the (possibly quoted) value text.
    static ref ORDINAL_VALUE_REGEX: Regex = Regex::new(r#"^(?:(\d+)\s*)?"?(.*)"?$"#).unwrap();
}

/// Reads a file as UTF-8 (tolerating a leading BOM) and returns its
/// non-blank lines.
pub fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let content = fs::read_to_string(path)?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

/// Normalizes the text after the `:` separator: strips an optional leading
/// integer ordinal, then surrounding spaces and double quotes.
pub fn normalize_value(remainder: &str) -> String {
    let remainder = remainder.trim();
    match ORDINAL_VALUE_REGEX
        .captures(remainder)
        .and_then(|caps| caps.get(2))
    {
        Some(value) => value
            .as_str()
            .trim_matches(|c| c == ' ' || c == '"')
            .to_string(),
        None => remainder.to_string(),
    }
}

/// Parses raw lines into a key→value dictionary.
///
/// Skips blank lines, comments, lines carrying either language header of
/// `languages`, and lines with no `:` separator. Duplicate keys overwrite
/// (last wins).
pub fn parse_lines<'a, I>(lines: I, languages: &LanguagePair) -> HashMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut dictionary = HashMap::new();

    for line in lines {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        if line.starts_with(&languages.source) || line.starts_with(&languages.target) {
            continue;
        }

        let Some(separator) = line.find(':') else {
            continue;
        };

        let key = line[..separator].trim().to_string();
        let value = normalize_value(&line[separator + 1..]);
        dictionary.insert(key, value);
    }

    dictionary
}

/// Reads and parses a localization file into a fresh dictionary.
pub fn parse_file(path: &Path, languages: &LanguagePair) -> Result<HashMap<String, String>, Error> {
    let lines = read_lines(path)?;
    Ok(parse_lines(lines.iter().map(String::as_str), languages))
}
