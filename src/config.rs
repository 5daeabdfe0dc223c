//! Run configuration, loaded from RON.
//!
//! Every field has a default, so an empty `()` file (or no file at all)
//! gives the stock behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::format::{Format, FormatError};
use crate::schema::gender::{GenderCatalog, GenderError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid default format: {0}")]
    Format(#[from] FormatError),
    #[error("gender definitions: {0}")]
    Gender(#[from] GenderError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory searched for the sentence and word folders.
    pub vocabulary_root: PathBuf,
    pub sentence_prefix: String,
    pub word_prefix: String,
    pub words_alias: String,
    pub sentences_alias: String,
    /// Format codes in force before the first `FORMAT`.
    pub format: String,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub output_extension: String,
    /// Longest stem taken from the first sentence when naming the output.
    pub stem_length: usize,
    /// Stem used when the first sentence has no letters.
    pub fallback_stem: String,
    /// RON file replacing the built-in gender definitions.
    pub genders: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            vocabulary_root: PathBuf::from("."),
            sentence_prefix: "sentence".to_string(),
            word_prefix: "word".to_string(),
            words_alias: "wfolder".to_string(),
            sentences_alias: "sfolder".to_string(),
            format: "ACPS".to_string(),
            seed: None,
            output_extension: "md".to_string(),
            stem_length: 9,
            fallback_stem: "YourStory".to_string(),
            genders: None,
        }
    }
}

impl RunConfig {
    pub fn load_from_ron(path: &Path) -> Result<RunConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<RunConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn default_format(&self) -> Result<Format, ConfigError> {
        Ok(Format::parse(&self.format)?)
    }

    /// The configured gender definitions, or the built-in ones.
    pub fn gender_catalog(&self) -> Result<GenderCatalog, ConfigError> {
        match &self.genders {
            Some(path) => Ok(GenderCatalog::load_from_ron(path)?),
            None => Ok(GenderCatalog::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = RunConfig::parse_ron("()").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.default_format().unwrap().to_string(), "ACPS");
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = RunConfig::parse_ron(
            r#"(
                vocabulary_root: "vocab",
                word_prefix: "lexicon",
                seed: Some(42),
                format: "cps",
            )"#,
        )
        .unwrap();
        assert_eq!(config.vocabulary_root, PathBuf::from("vocab"));
        assert_eq!(config.word_prefix, "lexicon");
        assert_eq!(config.sentence_prefix, "sentence");
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.default_format().unwrap().to_string(), "CPS");
    }

    #[test]
    fn bad_format_is_reported() {
        let config = RunConfig::parse_ron(r#"(format: "PV")"#).unwrap();
        assert!(matches!(config.default_format(), Err(ConfigError::Format(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            RunConfig::parse_ron("(colour: 3)"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn missing_gender_file_is_io_error() {
        let config = RunConfig {
            genders: Some(PathBuf::from("/nonexistent/genders.ron")),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.gender_catalog(),
            Err(ConfigError::Gender(GenderError::Io(_)))
        ));
    }
}
