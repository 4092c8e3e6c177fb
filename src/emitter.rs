//! Output buffers for the generated C++.
//!
//! The parser appends fragments as it recognises constructs. Declarations
//! that must precede their first use (includes and variables introduced by
//! `INPUT`) go to the header; everything else goes to the body. Nothing reaches the filesystem until [`Emitter::finalize`].

use std::fs::File;
use std::io::Write;
use std::path::Path;

use snafu::ResultExt;

use crate::error::{CompileResult, IoSnafu};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Emitter {
  header: String,
  code: String,
}

impl Emitter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a fragment to the body.
  pub fn emit(&mut self, fragment: &str) {
    self.code.push_str(fragment);
  }

  /// Append a fragment and a line break to the body.
  pub fn emit_line(&mut self, fragment: &str) {
    self.code.push_str(fragment);
    self.code.push('\n');
  }

  /// Append a fragment and a line break to the header.
  pub fn header_line(&mut self, fragment: &str) {
    self.header.push_str(fragment);
    self.header.push('\n');
  }

  pub fn header(&self) -> &str {
    &self.header
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  /// Header followed by body: the complete translation unit.
  pub fn output(&self) -> String {
    let mut out = String::with_capacity(self.header.len() + self.code.len());
    out.push_str(&self.header);
    out.push_str(&self.code);
    out
  }

  /// Write the translation unit to `path`, replacing any existing file.
  pub fn finalize(&self, path: &Path) -> CompileResult<()> {
    let mut file = File::create(path).context(IoSnafu { path })?;
    file
      .write_all(self.output().as_bytes())
      .context(IoSnafu { path })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::CompileError;

  #[test]
  fn header_precedes_body() {
    let mut emitter = Emitter::new();
    emitter.emit("std::cout << ");
    emitter.emit_line("x;");
    emitter.header_line("#include <iostream>");
    emitter.header_line("int x {};");

    assert_eq!(emitter.header(), "#include <iostream>\nint x {};\n");
    assert_eq!(emitter.code(), "std::cout << x;\n");
    assert_eq!(
      emitter.output(),
      "#include <iostream>\nint x {};\nstd::cout << x;\n"
    );
  }

  #[test]
  fn finalize_writes_header_then_body() {
    let path = std::env::temp_dir().join(format!("nubbc-emitter-{}.cpp", std::process::id()));
    let mut emitter = Emitter::new();
    emitter.header_line("// head");
    emitter.emit_line("// body");
    emitter.finalize(&path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, "// head\n// body\n");
  }

  #[test]
  fn finalize_reports_unwritable_destination() {
    let path = std::env::temp_dir()
      .join("nubbc-no-such-directory")
      .join("nested")
      .join("out.cpp");
    let err = Emitter::new().finalize(&path).unwrap_err();
    assert!(matches!(err, CompileError::Io { .. }));
  }
}
