//! The validation service: checks placeholder parity between original and
//! translated files and reports every divergence.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::languages;
use crate::naming;
use crate::parser;
use crate::placeholder;
use crate::types::{LanguagePair, Outcome};

/// Inputs for one validation run.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Folder reports are written under (`<folder>/Validations`).
    pub folder: PathBuf,

    /// All files under consideration, original and translated mixed.
    pub files: Vec<PathBuf>,

    pub languages: LanguagePair,
}

/// Compares every original/translated file pair and appends findings to a
/// per-pair report file. A non-empty report anywhere makes the run a
/// failure; a clean run writes nothing.
pub fn run_validation(options: &ValidateOptions) -> Outcome {
    let languages = &options.languages;

    let original_files: Vec<&PathBuf> = options
        .files
        .iter()
        .filter(|f| naming::file_stem(f).contains(&languages.source))
        .collect();
    let translated_files: Vec<PathBuf> = options
        .files
        .iter()
        .filter(|f| naming::file_stem(f).contains(&languages.target))
        .cloned()
        .collect();

    let mut warnings = String::new();
    let mut reports_written = 0;

    for original_file in original_files {
        let Some(translated_file) = naming::find_matching_file(
            original_file,
            &translated_files,
            &languages.source,
            &languages.target,
        ) else {
            debug!(file = %original_file.display(), "no translated counterpart");
            continue;
        };

        let pair = (
            parser::parse_file(original_file, languages),
            parser::parse_file(translated_file, languages),
        );
        let (original_dict, translated_dict) = match pair {
            (Ok(original), Ok(translated)) => (original, translated),
            (Err(err), _) | (_, Err(err)) => {
                warn!(file = %original_file.display(), %err, "skipping unreadable file pair");
                warnings.push_str(&format!(
                    "Warning: could not validate {}: {}.\n",
                    original_file.display(),
                    err
                ));
                continue;
            }
        };

        let differences =
            compare_dictionaries(&original_dict, &translated_dict, &languages.target);
        if differences.is_empty() {
            continue;
        }

        let report_path =
            naming::validations_file_path(&options.folder, original_file, &languages.source);
        if let Err(err) = append_report(&report_path, &differences) {
            warn!(file = %report_path.display(), %err, "failed to write validation report");
            warnings.push_str(&format!(
                "Error: could not write file {}: {}.\n",
                report_path.display(),
                err
            ));
        }
        reports_written += 1;
    }

    if reports_written > 0 {
        Outcome::failure(format!(
            "{warnings}There could be some issues in the files, details were logged in a file inside the Validations folder."
        ))
    } else {
        Outcome {
            success: true,
            message: format!("{warnings}No issues found."),
        }
    }
}

/// Builds the difference report for one file pair: one block per key whose
/// translation diverges in placeholder tokens or leaks CJK script.
///
/// Keys are visited in sorted order so repeated runs produce identical
/// reports.
pub fn compare_dictionaries(
    original: &HashMap<String, String>,
    translated: &HashMap<String, String>,
    target_code: &str,
) -> String {
    let mut result = String::new();
    let check_cjk = target_code != languages::SIMPLIFIED_CHINESE;

    let sorted: BTreeMap<&String, &String> = original.iter().collect();
    for (key, original_value) in sorted {
        let translated_value = translated.get(key).map(String::as_str).unwrap_or("");

        let original_values = placeholder::extract_value_tokens(original_value);
        let translated_values = placeholder::extract_value_tokens(translated_value);
        let original_functions = placeholder::extract_function_tokens(original_value);
        let translated_functions = placeholder::extract_function_tokens(translated_value);
        let original_icons = placeholder::extract_icon_tokens(original_value);
        let translated_icons = placeholder::extract_icon_tokens(translated_value);

        let missing_values = difference(&original_values, &translated_values);
        let extra_values = difference(&translated_values, &original_values);
        let missing_functions = difference(&original_functions, &translated_functions);
        let extra_functions = difference(&translated_functions, &original_functions);
        let missing_icons = difference(&original_icons, &translated_icons);
        let extra_icons = difference(&translated_icons, &original_icons);

        let cjk_found = check_cjk && placeholder::contains_cjk(translated_value);

        if missing_values.is_empty()
            && extra_values.is_empty()
            && missing_functions.is_empty()
            && extra_functions.is_empty()
            && missing_icons.is_empty()
            && extra_icons.is_empty()
            && !cjk_found
        {
            continue;
        }

        result.push_str(&format!("Difference found in key: {key}\n"));

        if !missing_values.is_empty() {
            result.push_str(&format!(
                " # Missing keys in new: {}\n",
                missing_values.join(", ")
            ));
        }
        if !extra_values.is_empty() {
            result.push_str(&format!(
                " # Extra keys in new: {}\n",
                extra_values.join(", ")
            ));
        }
        if !missing_functions.is_empty() {
            result.push_str(&format!(
                " # Missing functions in new: {}\n",
                missing_functions.join(", ")
            ));
        }
        if !extra_functions.is_empty() {
            result.push_str(&format!(
                " # Extra functions in new: {}\n",
                extra_functions.join(", ")
            ));
        }
        if !missing_icons.is_empty() {
            result.push_str(&format!(
                " # Missing icons in new: {}\n",
                missing_icons.join(", ")
            ));
        }
        if !extra_icons.is_empty() {
            result.push_str(&format!(
                " # Extra icons in new: {}\n",
                extra_icons.join(", ")
            ));
        }
        if cjk_found {
            result.push_str(" # Chinese characters found in the translation\n");
        }

        result.push_str(&format!(" # Original value: {original_value}\n"));
        result.push_str(&format!(" # New value: {translated_value}\n"));
        result.push('\n');
    }

    result
}

fn difference(left: &HashSet<String>, right: &HashSet<String>) -> Vec<String> {
    let mut out: Vec<String> = left.difference(right).cloned().collect();
    out.sort();
    out
}

fn append_report(path: &PathBuf, content: &str) -> Result<(), crate::error::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
