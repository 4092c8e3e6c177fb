//! Shared error type used across the compilation pipeline.
//!
//! Every stage returns a `CompileResult`; nothing is recovered locally. The
//! first error bubbles up to the driver, which reports it and exits, so the
//! variants only need enough context to point at the offending line.

use std::path::PathBuf;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompileError {
  /// Illegal characters, unterminated strings, malformed numbers.
  #[snafu(display("lexing error on line {line}: {message}"))]
  Lexical { line: usize, message: String },

  /// The token stream does not fit the grammar.
  #[snafu(display("parsing error on line {line}: {message}"))]
  Syntax { line: usize, message: String },

  /// Well-formed input that refers to something undeclared, redeclares
  /// something unique, or uses a type where it is not allowed.
  #[snafu(display("semantic error on line {line}: {message}"))]
  Semantic { line: usize, message: String },

  #[snafu(display("couldn't access file {}: {source}", path.display()))]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },
}

impl CompileError {
  pub fn lexical(line: usize, message: impl Into<String>) -> Self {
    Self::Lexical {
      line,
      message: message.into(),
    }
  }

  pub fn syntax(line: usize, message: impl Into<String>) -> Self {
    Self::Syntax {
      line,
      message: message.into(),
    }
  }

  pub fn semantic(line: usize, message: impl Into<String>) -> Self {
    Self::Semantic {
      line,
      message: message.into(),
    }
  }

  /// Source line the error points at, when it has one.
  pub fn line(&self) -> Option<usize> {
    match self {
      Self::Lexical { line, .. } | Self::Syntax { line, .. } | Self::Semantic { line, .. } => {
        Some(*line)
      }
      Self::Io { .. } => None,
    }
  }

  /// The message without the category and line prefix.
  pub fn message(&self) -> String {
    match self {
      Self::Lexical { message, .. }
      | Self::Syntax { message, .. }
      | Self::Semantic { message, .. } => message.clone(),
      Self::Io { source, .. } => source.to_string(),
    }
  }
}
