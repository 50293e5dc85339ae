//! The generate service: compares source- and target-language files and
//! emits delta files of the keys still missing for the target.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::diff;
use crate::emitter;
use crate::naming;
use crate::parser;
use crate::types::{LanguagePair, Outcome};

/// Inputs for one generate run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Folder the localization files live in; output goes to its
    /// `ToBeTranslated` subfolder.
    pub folder: PathBuf,

    /// All localization files under consideration, both languages mixed.
    pub files: Vec<PathBuf>,

    pub languages: LanguagePair,
}

/// Generates delta files for every source-language file with keys missing
/// from its target-language counterpart.
///
/// Unreadable files are skipped with a warning; the run keeps going. The
/// outcome message accumulates warnings and ends with the total line count
/// awaiting translation.
pub fn run_generate(options: &GenerateOptions) -> Outcome {
    let languages = &options.languages;

    let source_files: Vec<&PathBuf> = options
        .files
        .iter()
        .filter(|f| naming::file_stem(f).contains(&languages.source))
        .collect();
    let target_files: Vec<PathBuf> = options
        .files
        .iter()
        .filter(|f| naming::file_stem(f).contains(&languages.target))
        .cloned()
        .collect();

    let mut message = String::new();
    let mut success = true;
    let mut lines_to_translate = 0;

    for source_file in source_files {
        let source_dict = match parser::parse_file(source_file, languages) {
            Ok(dict) => dict,
            Err(err) => {
                warn!(file = %source_file.display(), %err, "skipping unreadable source file");
                message.push_str(&format!(
                    "Warning: could not read file {}: {}.\n",
                    source_file.display(),
                    err
                ));
                continue;
            }
        };

        let target_file = naming::find_matching_file(
            source_file,
            &target_files,
            &languages.source,
            &languages.target,
        );

        let target_dict = match target_file {
            Some(path) => match parser::parse_file(path, languages) {
                Ok(dict) => dict,
                Err(err) => {
                    warn!(file = %path.display(), %err, "skipping unreadable target file");
                    message.push_str(&format!(
                        "Warning: could not read file {}: {}.\n",
                        path.display(),
                        err
                    ));
                    continue;
                }
            },
            None => HashMap::new(),
        };

        if let Some(target_path) = target_file
            && diff::target_is_oversized(&source_dict, &target_dict)
        {
            message.push_str(&format!(
                "Warning: file {} has more lines than {}.\n",
                naming::file_stem(target_path),
                naming::file_stem(source_file)
            ));
        }

        let missing = diff::missing_entries(&source_dict, &target_dict);
        if missing.is_empty() {
            debug!(file = %source_file.display(), "nothing to translate");
            continue;
        }

        let output_path = naming::delta_file_path(
            &options.folder,
            source_file,
            &languages.source,
            &languages.target,
        );
        let content = emitter::render_delta(&languages.target, &missing);

        if let Err(err) = emitter::write_with_bom(&output_path, &content) {
            warn!(file = %output_path.display(), %err, "failed to write delta file");
            message.push_str(&format!(
                "Error: could not write file {}: {}.\n",
                output_path.display(),
                err
            ));
            success = false;
            continue;
        }

        lines_to_translate += missing.len();
    }

    message.push_str(&format!(
        "Amount of lines to translate: {lines_to_translate}"
    ));

    Outcome { success, message }
}
