//! Fatal script errors and non-fatal warnings.

use std::fmt;
use thiserror::Error;

use crate::schema::command::Line;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    #[error("incorrect number of parameters")]
    ParameterCount,
    #[error("incorrect parameter value")]
    InvalidParameterValue,
    #[error("incorrect syntax")]
    Syntax,
    #[error("unknown variable")]
    UnknownVariable,
    #[error("type mismatch")]
    TypeMismatch,
    #[error("unrecognized command")]
    UnknownCommand,
    #[error("too many END-style commands")]
    UnmatchedCloser,
    #[error("insufficient END-style commands")]
    UnclosedBlock,
    #[error("nested structure not allowed")]
    NestedBlock,
    #[error("undefined gender")]
    UnknownGender,
    #[error("empty source")]
    EmptySource,
    #[error("unknown format code")]
    UnknownFormatCode,
}

/// A fatal error. Execution halts at the first one.
///
/// Always carries the offending command keyword, its line number and raw
/// text; `expected`/`actual` describe a bad parameter when there is one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message} in {command} at line {line}: {text}{}", describe_expectation(.expected, .actual))]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub command: String,
    pub line: usize,
    pub text: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

fn describe_expectation(expected: &Option<String>, actual: &Option<String>) -> String {
    match (expected, actual) {
        (Some(e), Some(a)) => format!("\n Expected: {}. You put: {}", e, a),
        (Some(e), None) => format!("\n Expected: {}", e),
        _ => String::new(),
    }
}

impl ScriptError {
    /// An error raised while executing (or parsing) `line`.
    pub fn new(kind: ErrorKind, line: &Line, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            command: line.keyword(),
            line: line.number,
            text: line.text.clone(),
            expected: None,
            actual: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Name a command other than the line's own keyword, e.g. a body line
    /// of a `GEN` block.
    pub fn in_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn parameter_count(line: &Line, expected: impl Into<String>, actual: usize) -> Self {
        Self::new(ErrorKind::ParameterCount, line, "wrong number of parameters")
            .expected(expected)
            .actual(format!("{} parameters", actual))
    }

    pub fn parameter_value(line: &Line, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameterValue, line, "invalid parameter value")
            .expected(expected)
            .actual(actual)
    }

    pub fn syntax(line: &Line, expected: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, line, "malformed command").expected(expected)
    }

    pub fn unknown_variable(line: &Line, name: &str) -> Self {
        Self::new(
            ErrorKind::UnknownVariable,
            line,
            format!("unknown variable name {}", name),
        )
    }

    pub fn type_mismatch(line: &Line, name: &str, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            line,
            format!("incompatible variable type for {}", name),
        )
        .expected(expected)
        .actual(actual)
    }
}

/// How serious a warning is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Severe,
    Mild,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Severe => "SEVERE",
            Self::Mild => "MILD",
        }
    }
}

/// A non-fatal problem. Execution continues with a documented fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub severity: Severity,
    pub message: String,
    pub command: Option<String>,
    pub line: Option<usize>,
    pub text: Option<String>,
}

impl Warning {
    pub fn severe(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Severe, message)
    }

    pub fn mild(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Mild, message)
    }

    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            command: None,
            line: None,
            text: None,
        }
    }

    /// Attach the command line the warning was raised on.
    pub fn at(mut self, line: &Line) -> Self {
        self.command = Some(line.keyword());
        self.line = Some(line.number);
        self.text = Some(line.text.clone());
        self
    }

    /// Override the command name, e.g. `WRITE` for a substitution warning.
    pub fn in_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} WARNING: {}", self.severity.label(), self.message)?;
        if let Some(command) = &self.command {
            write!(f, " in command {}", command)?;
            if let Some(line) = self.line {
                write!(f, " at line number {}", line)?;
                if let Some(text) = &self.text {
                    write!(f, ": {}", text)?;
                }
            }
        }
        Ok(())
    }
}
