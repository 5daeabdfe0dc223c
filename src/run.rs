//! Wiring for a whole run: configuration, vocabulary, program source.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};
use crate::core::error::{ScriptError, Warning};
use crate::core::interpreter::ProgramSeed;
use crate::core::structure::parse_source;
use crate::loader::{load_vocabulary, LoadError};
use crate::output::OutputError;
use crate::schema::command::Program;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("vocabulary error: {0}")]
    Load(#[from] LoadError),
    #[error("unable to read program {path}: {source}")]
    Program {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("STOPPING: ERROR - {0}")]
    Script(#[from] ScriptError),
    #[error("STOPPING: ERROR - {0}")]
    Output(#[from] OutputError),
}

/// Build the immutable starting point of a run. Loader warnings are
/// returned alongside so the caller can report them before execution.
pub fn prepare_seed(config: &RunConfig) -> Result<(ProgramSeed, Vec<Warning>), RunError> {
    let format = config.default_format()?;
    let genders = config.gender_catalog()?;
    let vocab = load_vocabulary(
        &config.vocabulary_root,
        &config.sentence_prefix,
        &config.word_prefix,
    )?;
    let seed = ProgramSeed::new(vocab.words, vocab.sentences)
        .with_genders(genders)
        .with_format(format)
        .with_aliases(&config.words_alias, &config.sentences_alias);
    Ok((seed, vocab.warnings))
}

/// Read and parse a program file.
pub fn read_program(path: &Path) -> Result<Program, RunError> {
    let source = std::fs::read_to_string(path).map_err(|source| RunError::Program {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_source(&source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::interpreter::Interpreter;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prepared_seed_runs_a_program() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("words")).unwrap();
        fs::create_dir(dir.path().join("sentences")).unwrap();
        fs::write(dir.path().join("words/noun.txt"), "owl\n").unwrap();
        fs::write(dir.path().join("sentences/s.txt"), "a _noun_ hooted\n").unwrap();
        fs::write(dir.path().join("story.txt"), "LOOP 2\nWRITE lexis vocab\nLOOPEND\n").unwrap();

        let config = RunConfig {
            vocabulary_root: dir.path().to_path_buf(),
            words_alias: "vocab".to_string(),
            sentences_alias: "lexis".to_string(),
            seed: Some(7),
            ..RunConfig::default()
        };
        let (seed, warnings) = prepare_seed(&config).unwrap();
        assert!(warnings.is_empty());
        let program = read_program(&dir.path().join("story.txt")).unwrap();
        let state = Interpreter::builder()
            .seed_opt(config.seed)
            .build()
            .run(&seed, &program)
            .unwrap();
        assert_eq!(state.output, vec!["An owl hooted. "; 2]);
    }

    #[test]
    fn structural_errors_surface_as_script_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "NEWLINE\nLOOPEND\n").unwrap();
        match read_program(&path) {
            Err(RunError::Script(e)) => assert_eq!(e.kind, ErrorKind::UnmatchedCloser),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            read_program(&dir.path().join("missing.txt")),
            Err(RunError::Program { .. })
        ));
    }
}
