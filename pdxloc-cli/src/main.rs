use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pdxloc::{
    AppSettings, GenerateOptions, HttpTranslationApi, LanguagePair, Outcome, TranslateOptions,
    ValidateOptions, languages, naming, run_generate, run_translation, run_validation,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate delta files of the keys missing for the target language.
    Generate {
        /// Folder containing the localization files
        #[arg(short, long)]
        folder: PathBuf,

        /// Source language code (e.g. l_english)
        #[arg(long)]
        from: String,

        /// Target language code (e.g. l_french)
        #[arg(long)]
        to: String,
    },

    /// Translate generated delta files through the configured API.
    Translate {
        /// Folder containing the localization files
        #[arg(short, long)]
        folder: PathBuf,

        /// Path to the settings file
        #[arg(short, long, default_value = "pdxloc.json")]
        config: PathBuf,
    },

    /// Validate placeholder parity between original and translated files.
    Validate {
        /// Folder containing the localization files
        #[arg(short, long)]
        folder: PathBuf,

        /// Source language code (e.g. l_english)
        #[arg(long)]
        from: String,

        /// Target language code (e.g. l_french)
        #[arg(long)]
        to: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let outcome = match args.commands {
        Commands::Generate { folder, from, to } => generate(&folder, &from, &to),
        Commands::Translate { folder, config } => translate(&folder, &config).await,
        Commands::Validate { folder, from, to } => validate(&folder, &from, &to),
    };

    println!("{}", outcome.message);
    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn generate(folder: &Path, from: &str, to: &str) -> Outcome {
    if let Err(outcome) = check_language_codes(from, to) {
        return outcome;
    }

    run_generate(&GenerateOptions {
        folder: folder.to_path_buf(),
        files: yaml_files(folder),
        languages: LanguagePair::new(from, to),
    })
}

async fn translate(folder: &Path, config: &Path) -> Outcome {
    let settings = match AppSettings::load(config) {
        Ok(settings) => settings,
        Err(err) => {
            return Outcome::failure(format!(
                "Could not load settings from {}: {}",
                config.display(),
                err
            ));
        }
    };

    let api = match HttpTranslationApi::new(&settings) {
        Ok(api) => api,
        Err(err) => return Outcome::failure(err.to_string()),
    };

    let files = yaml_files(&folder.join(naming::TO_BE_TRANSLATED_DIR));
    if files.is_empty() {
        return Outcome::failure(format!(
            "No files to translate under {}",
            folder.join(naming::TO_BE_TRANSLATED_DIR).display()
        ));
    }

    run_translation(
        &TranslateOptions {
            folder: folder.to_path_buf(),
            files,
            settings,
        },
        Arc::new(api),
    )
    .await
}

fn validate(folder: &Path, from: &str, to: &str) -> Outcome {
    if let Err(outcome) = check_language_codes(from, to) {
        return outcome;
    }

    // Originals sit in the folder itself, translations under the per-language
    // output directories.
    let mut files = yaml_files(folder);
    files.extend(glob_files(&format!(
        "{}/TranslatedFiles/localisation/replace/*/*.yml",
        folder.display()
    )));

    run_validation(&ValidateOptions {
        folder: folder.to_path_buf(),
        files,
        languages: LanguagePair::new(from, to),
    })
}

fn check_language_codes(from: &str, to: &str) -> Result<(), Outcome> {
    for code in [from, to] {
        if !languages::is_known_code(code) {
            let known: Vec<&str> = languages::LANGUAGES.iter().map(|(_, c)| *c).collect();
            return Err(Outcome::failure(format!(
                "Unknown language code '{}'; expected one of: {}",
                code,
                known.join(", ")
            )));
        }
    }
    Ok(())
}

fn yaml_files(folder: &Path) -> Vec<PathBuf> {
    glob_files(&format!("{}/*.yml", folder.display()))
}

fn glob_files(pattern: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = glob::glob(pattern)
        .map(|paths| paths.filter_map(Result::ok).collect())
        .unwrap_or_default();
    files.sort();
    files
}
