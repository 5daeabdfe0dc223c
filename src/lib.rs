//! proseloop: an interpreter for a small line-oriented language that
//! generates procedurally varied prose.
//!
//! A program mixes assignments, randomized sentence writing with word
//! substitution, nested repeat blocks and character generation. Running it
//! produces an ordered list of formatted sentences that is written out as a
//! markdown document.

pub mod config;
pub mod core;
pub mod loader;
pub mod output;
pub mod run;
pub mod schema;

pub use crate::core::error::{ErrorKind, ScriptError, Severity, Warning};
pub use crate::core::interpreter::{Interpreter, ProgramSeed, ProgramState};
pub use crate::core::structure::parse_source;
