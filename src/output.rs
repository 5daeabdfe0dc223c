//! Writing the finished story to disk.

use rand::Rng;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::RunConfig;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("desired filename {} already exists; no changes were made to it", .0.display())]
    OutputExists(PathBuf),
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How output files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePolicy {
    pub stem_length: usize,
    pub fallback_stem: String,
    pub extension: String,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self::from(&RunConfig::default())
    }
}

impl From<&RunConfig> for NamePolicy {
    fn from(config: &RunConfig) -> Self {
        Self {
            stem_length: config.stem_length,
            fallback_stem: config.fallback_stem.clone(),
            extension: config.output_extension.clone(),
        }
    }
}

impl NamePolicy {
    /// The letters of the first sentence (or of `STORY` when there is no
    /// output), cut to the stem length.
    pub fn stem(&self, output: &[String]) -> String {
        let first = output.first().map(|s| s.trim()).unwrap_or("STORY");
        let stem: String = first
            .chars()
            .filter(|c| c.is_alphabetic())
            .take(self.stem_length)
            .collect();
        if stem.is_empty() {
            self.fallback_stem.clone()
        } else {
            stem
        }
    }

    /// `stem_NNNN.ext` with a random four-digit suffix.
    pub fn propose<R: Rng + ?Sized>(&self, output: &[String], rng: &mut R) -> String {
        let suffix: u32 = rng.gen_range(1000..=9999);
        format!("{}_{}.{}", self.stem(output), suffix, self.extension)
    }
}

/// Write the sentences back to back. Never overwrites an existing file.
pub fn write_story(path: &Path, output: &[String]) -> Result<(), OutputError> {
    let io_error = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(OutputError::OutputExists(path.to_path_buf()))
        }
        Err(e) => return Err(io_error(e)),
    };
    for sentence in output {
        file.write_all(sentence.as_bytes()).map_err(io_error)?;
    }
    file.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stem_takes_letters_of_first_sentence() {
        let policy = NamePolicy::default();
        assert_eq!(policy.stem(&strings(&["  The cat's 3rd nap. ", "x"])), "Thecatsrd");
        assert_eq!(policy.stem(&strings(&["Hi. "])), "Hi");
        assert_eq!(policy.stem(&[]), "STORY");
        assert_eq!(policy.stem(&strings(&["  \n\n"])), "YourStory");
    }

    #[test]
    fn proposal_has_suffix_and_extension() {
        let mut rng = StdRng::seed_from_u64(1);
        let name = NamePolicy::default().propose(&strings(&["Hi. "]), &mut rng);
        assert!(name.starts_with("Hi_"), "{}", name);
        assert!(name.ends_with(".md"), "{}", name);
        let digits: u32 = name[3..7].parse().unwrap();
        assert!((1000..=9999).contains(&digits));
    }

    #[test]
    fn writes_sentences_without_separators() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("story.md");
        write_story(&path, &strings(&["One. ", "Two. "])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "One. Two. ");
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("story.md");
        std::fs::write(&path, "keep me").unwrap();
        let err = write_story(&path, &strings(&["new"])).unwrap_err();
        assert!(matches!(err, OutputError::OutputExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
