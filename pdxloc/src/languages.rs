//! The game languages supported by the localization pipeline.
//!
//! Paradox localization files tag their language with an `l_<code>:` header
//! line; this module maps those codes to the display names the translation
//! prompt uses.

/// Language code of Simplified Chinese, the one target for which the CJK
/// leakage check is suppressed.
pub const SIMPLIFIED_CHINESE: &str = "l_simp_chinese";

/// Display name → language code, for every language the games ship with.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("Simplified Chinese", "l_simp_chinese"),
    ("English", "l_english"),
    ("Portuguese", "l_braz_por"),
    ("French", "l_french"),
    ("German", "l_german"),
    ("Japanese", "l_japanese"),
    ("Korean", "l_korean"),
    ("Polish", "l_polish"),
    ("Russian", "l_russian"),
    ("Spanish", "l_spanish"),
];

/// Looks up the display name for a language code (e.g. `l_french` → `French`).
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Looks up the language code for a display name.
pub fn language_code(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// Whether `code` is one of the known `l_<code>` language tags.
pub fn is_known_code(code: &str) -> bool {
    language_name(code).is_some()
}
