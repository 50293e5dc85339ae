//! The translation orchestrator: resumes, partitions, dispatches, merges,
//! and finalizes per-file translation runs.
//!
//! Each file moves through `ResumeMerge → Partition → Dispatch → Merge →
//! Finalize`. Batches within a file run concurrently under a semaphore;
//! files run sequentially. The partition is computed once, up front, so the
//! batches are disjoint and cover every remaining line exactly once without
//! any runtime claim coordination.

pub mod api;

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, warn};

use crate::config::{AppSettings, InputErrorPolicy};
use crate::emitter::UTF8_BOM;
use crate::error::Error;
use crate::languages;
use crate::naming;
use crate::parser;
use crate::types::Outcome;

use api::TranslationApi;

const FILE_FINISHED_TRAILER: &str = "#File translation finished";
const MISMATCH_MARKER: &str = "#Error: Mismatch in translated lines count. Review the following:";
const INVALID_LANGUAGE_HEADER: &str =
    "The language value in the first line of the file is invalid.";

/// Inputs for one translation run.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Folder translated output is written under
    /// (`<folder>/TranslatedFiles/localisation/replace/<langcode>`).
    pub folder: PathBuf,

    /// The `ToBeTranslated` delta files to process, in order.
    pub files: Vec<PathBuf>,

    pub settings: AppSettings,
}

/// What one batch reports back to the join point.
struct BatchStatus {
    mismatched: bool,
}

/// Translates every file in `options.files` through `api`.
///
/// An unconfigured API key aborts before any file is touched. A bad input
/// file aborts the run or skips the file per the configured policy. Batch
/// failures (transport, timeout, line-count mismatch) stay local to their
/// batch but turn the overall outcome into a failure.
pub async fn run_translation(
    options: &TranslateOptions,
    api: Arc<dyn TranslationApi>,
) -> Outcome {
    if !options.settings.api_key_is_configured() {
        return Outcome::failure(
            "Go into the settings file and input your API settings.",
        );
    }

    let mut has_errors = false;
    let mut skipped = String::new();

    for file in &options.files {
        match translate_file(file, options, Arc::clone(&api)).await {
            Ok(file_had_errors) => has_errors |= file_had_errors,
            Err(err) => match options.settings.input_error_policy {
                InputErrorPolicy::Abort => return Outcome::failure(err.to_string()),
                InputErrorPolicy::Skip => {
                    warn!(file = %file.display(), %err, "skipping file");
                    has_errors = true;
                    skipped.push_str(&format!("Skipped {}: {}\n", file.display(), err));
                }
            },
        }
    }

    let mut message = format!("{skipped}Translation finished.");
    if has_errors {
        message.push_str("\nThere could be errors in the translation, please review the files.");
    }

    Outcome {
        success: !has_errors,
        message,
    }
}

/// Runs the per-file state machine. Returns whether any batch of this file
/// failed or mismatched; `Err` only for input errors (unreadable file,
/// invalid header), which the caller resolves against the error policy.
async fn translate_file(
    path: &Path,
    options: &TranslateOptions,
    api: Arc<dyn TranslationApi>,
) -> Result<bool, Error> {
    let lines = parser::read_lines(path)?;
    let header = lines
        .first()
        .cloned()
        .ok_or_else(|| Error::invalid_input(format!("file {} is empty", path.display())))?;

    let lang_code = header.trim().trim_end_matches(':').to_string();
    let language_name = languages::language_name(&lang_code)
        .ok_or_else(|| Error::invalid_input(INVALID_LANGUAGE_HEADER))?;

    let output_dir = naming::translated_output_dir(&options.folder, &lang_code);
    fs::create_dir_all(&output_dir)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let output_path = output_dir.join(naming::translated_file_name(&file_name));

    // ResumeMerge: drop lines whose key already made it into the output on
    // an earlier run; otherwise start the file with BOM + header.
    let mut work_lines = lines;
    if output_path.exists() {
        let translated_keys = existing_keys(&output_path)?;
        debug!(file = %output_path.display(), keys = translated_keys.len(), "resuming");
        work_lines.retain(|line| match line_key(line) {
            Some(key) => !translated_keys.contains(key),
            None => true,
        });
    } else {
        let mut file = fs::File::create(&output_path)?;
        file.write_all(UTF8_BOM)?;
        file.write_all(header.as_bytes())?;
        file.write_all(b"\n")?;
    }

    // Partition: one static split, computed before any request goes out.
    let remaining: Vec<String> = work_lines
        .iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.starts_with(&lang_code))
        .collect();
    let batches = partition(&remaining, options.settings.requests.max_length_of_requests);

    // Dispatch: bounded by the semaphore; every batch runs to completion or
    // individual failure, reduced at the join below.
    let semaphore = Arc::new(Semaphore::new(
        options.settings.requests.max_concurrent_requests.max(1),
    ));
    let write_lock = Arc::new(Mutex::new(()));
    let prompt = Arc::new(system_prompt(language_name));
    let timeout_seconds = options.settings.requests.timeout_seconds;

    let mut handles = Vec::with_capacity(batches.len());
    for batch in batches {
        let api = Arc::clone(&api);
        let semaphore = Arc::clone(&semaphore);
        let write_lock = Arc::clone(&write_lock);
        let prompt = Arc::clone(&prompt);
        let output_path = output_path.clone();
        handles.push(tokio::spawn(async move {
            process_batch(
                batch,
                api,
                semaphore,
                write_lock,
                output_path,
                prompt,
                timeout_seconds,
            )
            .await
        }));
    }

    let mut file_had_errors = false;
    for handle in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(Error::api_error(format!(
                "translation task aborted: {join_error}"
            ))),
        };
        match result {
            Ok(status) => file_had_errors |= status.mismatched,
            Err(err) => {
                file_had_errors = true;
                append_lines(
                    &output_path,
                    &[format!("#Error in translation tasks: {err}")],
                )?;
            }
        }
    }

    append_lines(&output_path, &[FILE_FINISHED_TRAILER.to_string()])?;
    Ok(file_had_errors)
}

/// Sends one batch and appends its merged output under the file lock.
async fn process_batch(
    batch: Vec<String>,
    api: Arc<dyn TranslationApi>,
    semaphore: Arc<Semaphore>,
    write_lock: Arc<Mutex<()>>,
    output_path: PathBuf,
    prompt: Arc<String>,
    timeout_seconds: u64,
) -> Result<BatchStatus, Error> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|_| Error::api_error("concurrency limiter closed"))?;

    let request_body = batch.join("\n");
    let translation = tokio::time::timeout(
        Duration::from_secs(timeout_seconds),
        api.translate_batch(&prompt, &request_body),
    )
    .await
    .map_err(|_| Error::Timeout(timeout_seconds))??;

    let (output, mismatched) = merge_batch(&batch, &translation);

    let _guard = write_lock.lock().await;
    append_lines(&output_path, &output)?;
    Ok(BatchStatus { mismatched })
}

/// Splits the remaining lines into fixed-size batches. Every line lands in
/// exactly one batch; `ceil(len / max_len)` batches come out.
fn partition(lines: &[String], max_len: usize) -> Vec<Vec<String>> {
    lines
        .chunks(max_len.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Pairs translated lines with their source keys.
///
/// A response with the wrong line count is never paired: the raw lines are
/// preserved under a mismatch marker so a human can review them.
fn merge_batch(original_lines: &[String], translation: &str) -> (Vec<String>, bool) {
    let translated: Vec<&str> = translation
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect();

    if translated.len() != original_lines.len() {
        let mut output = vec![MISMATCH_MARKER.to_string()];
        output.extend(translated.iter().map(|line| format!("  {line}")));
        return (output, true);
    }

    let merged = original_lines
        .iter()
        .zip(&translated)
        .map(|(original, &translated)| {
            let Some(colon) = original.find(':') else {
                return original.clone();
            };
            let key = original[..colon].trim();
            let value = translated.splitn(2, ':').nth(1).unwrap_or(translated).trim();
            format!("  {key}: {value}")
        })
        .collect();

    (merged, false)
}

fn system_prompt(language_name: &str) -> String {
    format!(
        "You are a helpful assistant translating to {language_name}.\n\
         You provide translations for sentences in Paradox games mods localization files.\n\
         Maintain any placeholder values like \"$value$\", \"£value£\", or \"[value.function]\" without translating them."
    )
}

/// Keys already present in a previously written output file (header line
/// excluded).
fn existing_keys(path: &Path) -> Result<HashSet<String>, Error> {
    let lines = parser::read_lines(path)?;
    Ok(lines
        .iter()
        .skip(1)
        .filter_map(|line| line_key(line))
        .map(str::to_string)
        .collect())
}

/// The key of a `key: value` line; `None` for blanks, comments, and lines
/// without a separator after the first column.
fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let colon = trimmed.find(':')?;
    if colon == 0 {
        return None;
    }
    Some(trimmed[..colon].trim())
}

fn append_lines(path: &Path, lines: &[String]) -> Result<(), Error> {
    if lines.is_empty() {
        return Ok(());
    }
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    for line in lines {
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes every line back unchanged, counting calls.
    struct EchoApi {
        calls: AtomicUsize,
    }

    impl EchoApi {
        fn new() -> Arc<Self> {
            Arc::new(EchoApi {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationApi for EchoApi {
        async fn translate_batch(&self, _prompt: &str, content: &str) -> Result<String, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(content.to_string())
        }
    }

    /// Always returns a single line, forcing mismatches for larger batches.
    struct OneLineApi;

    #[async_trait]
    impl TranslationApi for OneLineApi {
        async fn translate_batch(&self, _prompt: &str, _content: &str) -> Result<String, Error> {
            Ok("only: one line".to_string())
        }
    }

    /// Always fails with a transport-class error.
    struct BrokenApi;

    #[async_trait]
    impl TranslationApi for BrokenApi {
        async fn translate_batch(&self, _prompt: &str, _content: &str) -> Result<String, Error> {
            Err(Error::api_error("connection refused"))
        }
    }

    fn configured_settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.api.api_key = "sk-test".to_string();
        settings.api.url = "https://api.example.com/v1/chat/completions".to_string();
        settings.api.model = "test-model".to_string();
        settings
    }

    fn write_delta(dir: &Path, name: &str, content: &str) -> PathBuf {
        let folder = dir.join(naming::TO_BE_TRANSLATED_DIR);
        fs::create_dir_all(&folder).unwrap();
        let path = folder.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn output_path(dir: &Path, lang: &str, name: &str) -> PathBuf {
        naming::translated_output_dir(dir, lang).join(name)
    }

    #[test]
    fn test_partition_counts() {
        let lines: Vec<String> = (0..5).map(|i| format!("k{i}: v")).collect();
        let batches = partition(&lines, 2);
        assert_eq!(batches.len(), 3); // ceil(5 / 2)
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn test_partition_covers_every_line_exactly_once() {
        let lines: Vec<String> = (0..17).map(|i| format!("k{i}: v")).collect();
        let batches = partition(&lines, 4);
        let flattened: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, lines);
    }

    #[test]
    fn test_partition_zero_batch_size_clamps_to_one() {
        let lines = vec!["a: 1".to_string(), "b: 2".to_string()];
        assert_eq!(partition(&lines, 0).len(), 2);
    }

    #[test]
    fn test_partition_empty_input() {
        assert!(partition(&[], 10).is_empty());
    }

    #[test]
    fn test_merge_batch_pairs_positionally() {
        let original = vec![
            "key1: \"Hello\"".to_string(),
            "key2: \"World\"".to_string(),
        ];
        let (output, mismatched) = merge_batch(&original, "key1: \"Bonjour\"\nkey2: \"Monde\"");
        assert!(!mismatched);
        assert_eq!(output, vec!["  key1: \"Bonjour\"", "  key2: \"Monde\""]);
    }

    #[test]
    fn test_merge_batch_mismatch_never_pairs() {
        let original = vec![
            "key1: \"Hello\"".to_string(),
            "key2: \"World\"".to_string(),
        ];
        let (output, mismatched) = merge_batch(&original, "a single line: oops");
        assert!(mismatched);
        assert!(output[0].contains("Mismatch in translated lines count"));
        assert_eq!(output[1], "  a single line: oops");
        assert!(!output.iter().any(|l| l.starts_with("  key1:")));
    }

    #[test]
    fn test_merge_batch_translated_line_without_colon() {
        let original = vec!["key1: \"Hello\"".to_string()];
        let (output, mismatched) = merge_batch(&original, "Bonjour");
        assert!(!mismatched);
        assert_eq!(output, vec!["  key1: Bonjour"]);
    }

    #[test]
    fn test_merge_batch_comment_line_passes_through() {
        let original = vec!["# a comment".to_string()];
        let (output, mismatched) = merge_batch(&original, "# un commentaire");
        assert!(!mismatched);
        // no colon in the source line: re-emitted verbatim
        assert_eq!(output, vec!["# a comment"]);
    }

    #[test]
    fn test_merge_batch_ignores_crlf_and_blank_lines() {
        let original = vec!["key1: \"Hello\"".to_string()];
        let (output, mismatched) = merge_batch(&original, "key1: \"Bonjour\"\r\n\n");
        assert!(!mismatched);
        assert_eq!(output, vec!["  key1: \"Bonjour\""]);
    }

    #[test]
    fn test_line_key() {
        assert_eq!(line_key("  key1: \"v\""), Some("key1"));
        assert_eq!(line_key("# comment"), None);
        assert_eq!(line_key("   "), None);
        assert_eq!(line_key("no separator"), None);
        assert_eq!(line_key(": starts with colon"), None);
    }

    #[test]
    fn test_system_prompt_names_language_and_placeholders() {
        let prompt = system_prompt("French");
        assert!(prompt.contains("translating to French"));
        assert!(prompt.contains("$value$"));
        assert!(prompt.contains("£value£"));
        assert!(prompt.contains("[value.function]"));
    }

    #[tokio::test]
    async fn test_run_translation_requires_configured_key() {
        let outcome = run_translation(
            &TranslateOptions {
                folder: PathBuf::from("/tmp"),
                files: vec![],
                settings: AppSettings::default(),
            },
            EchoApi::new(),
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("API settings"));
    }

    #[tokio::test]
    async fn test_run_translation_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let delta = write_delta(
            dir.path(),
            "events_pdxloc_ToBeTranslated_l_french.yml",
            "\u{feff}l_french:\n  key1: \"Hello $name$\"\n  key2: \"World\"\n",
        );

        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![delta],
                settings: configured_settings(),
            },
            EchoApi::new(),
        )
        .await;

        assert!(outcome.success, "{}", outcome.message);
        assert!(outcome.message.contains("Translation finished."));

        let out = output_path(
            dir.path(),
            "l_french",
            "events_pdxloc_Translated_l_french.yml",
        );
        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[..3], UTF8_BOM);

        let content = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(content.starts_with("l_french:\n"));
        assert!(content.contains("  key1: \"Hello $name$\""));
        assert!(content.contains("  key2: \"World\""));
        assert!(content.contains(FILE_FINISHED_TRAILER));
    }

    #[tokio::test]
    async fn test_run_translation_resume_skips_existing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let delta = write_delta(
            dir.path(),
            "events_pdxloc_ToBeTranslated_l_french.yml",
            "l_french:\n  key1: \"Hello\"\n  key2: \"World\"\n",
        );

        let out = output_path(
            dir.path(),
            "l_french",
            "events_pdxloc_Translated_l_french.yml",
        );
        fs::create_dir_all(out.parent().unwrap()).unwrap();
        fs::write(&out, "l_french:\n  key1: \"Bonjour déjà fait\"\n").unwrap();

        let api = EchoApi::new();
        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![delta],
                settings: configured_settings(),
            },
            Arc::clone(&api) as Arc<dyn TranslationApi>,
        )
        .await;

        assert!(outcome.success);
        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content.matches("key1").count(), 1);
        assert!(content.contains("  key2: \"World\""));
    }

    #[tokio::test]
    async fn test_run_translation_mismatch_flags_failure_and_keeps_raw_lines() {
        let dir = tempfile::tempdir().unwrap();
        let delta = write_delta(
            dir.path(),
            "events_pdxloc_ToBeTranslated_l_french.yml",
            "l_french:\n  key1: \"Hello\"\n  key2: \"World\"\n",
        );

        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![delta],
                settings: configured_settings(),
            },
            Arc::new(OneLineApi),
        )
        .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("review the files"));

        let out = output_path(
            dir.path(),
            "l_french",
            "events_pdxloc_Translated_l_french.yml",
        );
        let content = fs::read_to_string(&out).unwrap();
        assert!(content.contains("Mismatch in translated lines count"));
        assert!(content.contains("  only: one line"));
        assert!(!content.contains("  key1: one line"));
    }

    #[tokio::test]
    async fn test_run_translation_transport_error_is_batch_local() {
        let dir = tempfile::tempdir().unwrap();
        let delta = write_delta(
            dir.path(),
            "events_pdxloc_ToBeTranslated_l_french.yml",
            "l_french:\n  key1: \"Hello\"\n",
        );

        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![delta],
                settings: configured_settings(),
            },
            Arc::new(BrokenApi),
        )
        .await;

        assert!(!outcome.success);

        let out = output_path(
            dir.path(),
            "l_french",
            "events_pdxloc_Translated_l_french.yml",
        );
        let content = fs::read_to_string(&out).unwrap();
        assert!(content.contains("#Error in translation tasks: "));
        assert!(content.contains("connection refused"));
        assert!(content.contains(FILE_FINISHED_TRAILER));
    }

    #[tokio::test]
    async fn test_run_translation_invalid_header_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_delta(
            dir.path(),
            "bad_pdxloc_ToBeTranslated_l_french.yml",
            "not_a_language:\n  key1: \"Hello\"\n",
        );
        let good = write_delta(
            dir.path(),
            "good_pdxloc_ToBeTranslated_l_french.yml",
            "l_french:\n  key1: \"Hello\"\n",
        );

        let api = EchoApi::new();
        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![bad, good],
                settings: configured_settings(),
            },
            Arc::clone(&api) as Arc<dyn TranslationApi>,
        )
        .await;

        assert!(!outcome.success);
        assert!(outcome.message.contains("language value in the first line"));
        // aborted before the good file was dispatched
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_translation_skip_policy_continues() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_delta(
            dir.path(),
            "bad_pdxloc_ToBeTranslated_l_french.yml",
            "not_a_language:\n  key1: \"Hello\"\n",
        );
        let good = write_delta(
            dir.path(),
            "good_pdxloc_ToBeTranslated_l_french.yml",
            "l_french:\n  key1: \"Hello\"\n",
        );

        let mut settings = configured_settings();
        settings.input_error_policy = InputErrorPolicy::Skip;

        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![bad, good],
                settings,
            },
            EchoApi::new(),
        )
        .await;

        // the skipped file marks the run as failed but the good file went
        // through
        assert!(!outcome.success);
        assert!(outcome.message.contains("Skipped"));

        let out = output_path(
            dir.path(),
            "l_french",
            "good_pdxloc_Translated_l_french.yml",
        );
        assert!(fs::read_to_string(&out)
            .unwrap()
            .contains("  key1: \"Hello\""));
    }

    #[tokio::test]
    async fn test_run_translation_bounded_concurrency_processes_all_batches() {
        let dir = tempfile::tempdir().unwrap();
        let body: String = (0..10).map(|i| format!("  key{i}: \"v{i}\"\n")).collect();
        let delta = write_delta(
            dir.path(),
            "many_pdxloc_ToBeTranslated_l_french.yml",
            &format!("l_french:\n{body}"),
        );

        let mut settings = configured_settings();
        settings.requests.max_length_of_requests = 3;
        settings.requests.max_concurrent_requests = 2;

        let api = EchoApi::new();
        let outcome = run_translation(
            &TranslateOptions {
                folder: dir.path().to_path_buf(),
                files: vec![delta],
                settings,
            },
            Arc::clone(&api) as Arc<dyn TranslationApi>,
        )
        .await;

        assert!(outcome.success);
        assert_eq!(api.calls.load(Ordering::SeqCst), 4); // ceil(10 / 3)

        let out = output_path(
            dir.path(),
            "l_french",
            "many_pdxloc_Translated_l_french.yml",
        );
        let content = fs::read_to_string(&out).unwrap();
        for i in 0..10 {
            assert!(content.contains(&format!("  key{i}: \"v{i}\"")));
        }
    }
}
