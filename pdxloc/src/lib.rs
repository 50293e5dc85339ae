#![forbid(unsafe_code)]
//! Localization toolkit for Paradox game mods.
//!
//! Covers the three stages of getting a mod translated:
//!
//! 1. **Generate** — diff a source-language localization file against its
//!    target-language counterpart and emit a delta file of the keys still
//!    missing, under `ToBeTranslated/`.
//! 2. **Translate** — send delta files through an OpenAI-compatible chat
//!    API in bounded-concurrency batches, appending results under
//!    `TranslatedFiles/`. Runs are idempotent: already-translated keys are
//!    skipped on resume.
//! 3. **Validate** — check placeholder parity (`$value$`, `£icon£`,
//!    `[Function]`) and CJK leakage between original and translated values,
//!    writing findings under `Validations/`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pdxloc::{GenerateOptions, LanguagePair, run_generate};
//!
//! let outcome = run_generate(&GenerateOptions {
//!     folder: "my_mod/localisation".into(),
//!     files: vec!["my_mod/localisation/events_l_english.yml".into()],
//!     languages: LanguagePair::new("l_english", "l_french"),
//! });
//! println!("{}", outcome.message);
//! ```
//!
//! Every top-level operation returns an [`Outcome`] instead of an error:
//! whatever went wrong is folded into its message.

pub mod config;
pub mod diff;
pub mod emitter;
pub mod error;
pub mod generate;
pub mod languages;
pub mod naming;
pub mod parser;
pub mod placeholder;
pub mod translate;
pub mod types;
pub mod validate;

// Re-export most used types for easy consumption
pub use crate::{
    config::{AppSettings, InputErrorPolicy},
    error::Error,
    generate::{GenerateOptions, run_generate},
    translate::{
        TranslateOptions,
        api::{HttpTranslationApi, TranslationApi},
        run_translation,
    },
    types::{LanguagePair, Outcome},
    validate::{ValidateOptions, run_validation},
};
