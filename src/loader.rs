//! Vocabulary loading.
//!
//! The vocabulary root holds one folder of sentence files and one of word
//! files, found by name prefix. Each file becomes one list, keyed by its
//! lowercased name up to the first period, with one item per non-blank line.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::error::Warning;
use crate::schema::value::Catalog;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// The two starting catalogs plus any warnings raised while reading them.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    pub sentences: Catalog,
    pub words: Catalog,
    pub warnings: Vec<Warning>,
}

/// Load the sentence and word folders under `root`.
pub fn load_vocabulary(
    root: &Path,
    sentence_prefix: &str,
    word_prefix: &str,
) -> Result<Vocabulary, LoadError> {
    let mut warnings = Vec::new();
    let sentences = load_prefixed(root, sentence_prefix, &mut warnings)?;
    let words = load_prefixed(root, word_prefix, &mut warnings)?;
    info!(
        sentence_sets = sentences.len(),
        word_sets = words.len(),
        "vocabulary loaded"
    );
    Ok(Vocabulary {
        sentences,
        words,
        warnings,
    })
}

fn load_prefixed(root: &Path, prefix: &str, warnings: &mut Vec<Warning>) -> Result<Catalog, LoadError> {
    match find_folder(root, prefix)? {
        Some(dir) => load_folder(&dir, warnings),
        None => {
            warnings.push(Warning::severe(format!(
                "no folder starting with '{}' found in {}",
                prefix,
                root.display()
            )));
            Ok(Catalog::new())
        }
    }
}

/// The first directory, in name order, whose name starts with `prefix`
/// ignoring case.
pub fn find_folder(root: &Path, prefix: &str) -> Result<Option<PathBuf>, LoadError> {
    let prefix = prefix.to_lowercase();
    let mut matches = Vec::new();
    for entry in std::fs::read_dir(root).map_err(io_error(root))? {
        let path = entry.map_err(io_error(root))?.path();
        let matches_prefix = path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|name| name.to_lowercase().starts_with(&prefix));
        if matches_prefix && path.is_dir() {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}

/// Read every regular file in `dir` into a catalog.
pub fn load_folder(dir: &Path, warnings: &mut Vec<Warning>) -> Result<Catalog, LoadError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        paths.push(entry.map_err(io_error(dir))?.path());
    }
    paths.sort();

    let mut catalog = Catalog::new();
    for path in paths {
        if !path.is_file() {
            warnings.push(Warning::mild(format!(
                "skipping {}: not a regular file",
                path.display()
            )));
            continue;
        }
        let Some(key) = set_name(&path) else {
            warnings.push(Warning::mild(format!(
                "skipping {}: no usable name before the first period",
                path.display()
            )));
            continue;
        };
        let contents = std::fs::read_to_string(&path).map_err(io_error(&path))?;
        let items = unique_lines(&contents);
        if items.is_empty() {
            warnings.push(Warning::mild(format!("skipping {}: file is empty", path.display())));
            continue;
        }
        debug!(set = %key, items = items.len(), "loaded set");
        catalog.insert(key, items);
    }
    Ok(catalog)
}

/// `Nouns.Animals.txt` becomes `nouns`.
fn set_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    (!stem.is_empty()).then(|| stem.to_lowercase())
}

/// Trimmed, non-blank lines with duplicates dropped, in first-seen order.
fn unique_lines(contents: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !items.iter().any(|existing| existing == line) {
            items.push(line.to_string());
        }
    }
    items
}
