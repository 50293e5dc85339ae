//! Placeholder token extraction for parity validation.
//!
//! Paradox localization values interpolate three token classes at runtime:
//! value tokens (`$gold$`), icon tokens (`£energy£`), and function tokens
//! (`[Root.GetName]` — only the simple `[word]` form is matched). A
//! translation must carry exactly the tokens of its original.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Candidate runs; single-$ delimiters are enforced after matching since
    // the regex crate has no lookaround ($$ is the escape for a literal $).
    static ref VALUE_TOKEN_REGEX: Regex = Regex::new(r"\$+\w+\$+").unwrap();
    static ref ICON_TOKEN_REGEX: Regex = Regex::new(r"£\w+£").unwrap();
    static ref FUNCTION_TOKEN_REGEX: Regex = Regex::new(r"\[\w+\]").unwrap();
}

/// Extracts `$word$` value tokens. Tokens adjacent to a second `$` on either
/// side are escapes, not placeholders, and are not extracted.
pub fn extract_value_tokens(text: &str) -> HashSet<String> {
    VALUE_TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| {
            let leading = token.chars().take_while(|&c| c == '$').count();
            let trailing = token.chars().rev().take_while(|&c| c == '$').count();
            leading == 1 && trailing == 1
        })
        .map(str::to_string)
        .collect()
}

/// Extracts `£word£` icon tokens.
pub fn extract_icon_tokens(text: &str) -> HashSet<String> {
    ICON_TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extracts `[word]` function tokens.
pub fn extract_function_tokens(text: &str) -> HashSet<String> {
    FUNCTION_TOKEN_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Whether `text` contains a character from the CJK Unified Ideographs
/// block. Used to catch source-script leakage in translated values.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}
