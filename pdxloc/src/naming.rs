//! File-name conventions linking the three pipeline stages.
//!
//! A generated delta file carries the `pdxloc_ToBeTranslated_` marker, its
//! translated counterpart `pdxloc_Translated_`. Pairing a source file with
//! its target-language sibling compares basenames with language codes and
//! markers removed.

use std::path::{Path, PathBuf};

pub const APP_MARKER: &str = "pdxloc_";
pub const TO_BE_TRANSLATED_MARKER: &str = "pdxloc_ToBeTranslated_";
pub const TRANSLATED_MARKER: &str = "pdxloc_Translated_";

pub const TO_BE_TRANSLATED_DIR: &str = "ToBeTranslated";
pub const VALIDATIONS_DIR: &str = "Validations";

/// The file stem (basename without extension), lossily decoded.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The stem with the given language code and all pipeline markers removed;
/// the canonical identity used to pair files across languages and stages.
pub fn stripped_stem(path: &Path, lang_code: &str) -> String {
    file_stem(path)
        .replace(lang_code, "")
        .replace(TRANSLATED_MARKER, "")
        .replace(APP_MARKER, "")
}

/// Finds the candidate whose stripped stem matches the original's.
pub fn find_matching_file<'a>(
    original: &Path,
    candidates: &'a [PathBuf],
    original_code: &str,
    candidate_code: &str,
) -> Option<&'a PathBuf> {
    let original_stem = stripped_stem(original, original_code);
    candidates
        .iter()
        .find(|c| stripped_stem(c, candidate_code) == original_stem)
}

/// File name of the delta file generated from `source_file` for
/// `target_code`.
pub fn delta_file_name(source_file: &Path, source_code: &str, target_code: &str) -> String {
    let stem = file_stem(source_file).replace(source_code, "");
    format!("{stem}{TO_BE_TRANSLATED_MARKER}{target_code}.yml")
}

/// Output path of a delta file: `<folder>/ToBeTranslated/<delta file name>`.
pub fn delta_file_path(
    folder: &Path,
    source_file: &Path,
    source_code: &str,
    target_code: &str,
) -> PathBuf {
    folder
        .join(TO_BE_TRANSLATED_DIR)
        .join(delta_file_name(source_file, source_code, target_code))
}

/// Directory translated files land in, mirroring the mod layout the game
/// loads from.
pub fn translated_output_dir(folder: &Path, lang_code: &str) -> PathBuf {
    folder
        .join("TranslatedFiles")
        .join("localisation")
        .join("replace")
        .join(lang_code)
}

/// Translated file name derived from a `ToBeTranslated` file name.
pub fn translated_file_name(to_be_translated_name: &str) -> String {
    to_be_translated_name.replace(TO_BE_TRANSLATED_MARKER, TRANSLATED_MARKER)
}

/// Path of the validation report for `original_file`:
/// `<folder>/Validations/<stem without language code>_pdxloc_Validations.yml`.
pub fn validations_file_path(folder: &Path, original_file: &Path, original_code: &str) -> PathBuf {
    let stem = file_stem(original_file).replace(original_code, "");
    folder
        .join(VALIDATIONS_DIR)
        .join(format!("{stem}_{APP_MARKER}Validations.yml"))
}
