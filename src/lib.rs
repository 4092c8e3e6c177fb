//! Crate root: wires together the Nubb++ to C++ pipeline.
//!
//! The stages are small and each owns one concern:
//! - `tokenizer` performs lexical analysis, producing tokens on demand.
//! - `parser` owns all syntactic knowledge and emits C++ while it parses.
//! - `symbols` tracks declared identifiers, functions and labels.
//! - `emitter` holds the header and body buffers and writes the result.
//! - `error` is the single error type shared by the other modules.

pub mod emitter;
pub mod error;
pub mod parser;
pub mod symbols;
pub mod tokenizer;
pub mod ty;

use std::path::Path;

pub use emitter::Emitter;
pub use error::{CompileError, CompileResult};
pub use parser::Parser;

/// Compile a source string, returning the filled output buffers.
pub fn compile(source: &str) -> CompileResult<Emitter> {
  let mut parser = Parser::new(source)?;
  parser.program()?;
  Ok(parser.into_emitter())
}

/// Compile a source string into a complete C++ translation unit.
pub fn generate_cpp(source: &str) -> CompileResult<String> {
  compile(source).map(|emitter| emitter.output())
}

/// Compile a source string and write the C++ to `output`. The file is only
/// touched once the whole program has compiled.
pub fn compile_to_path(source: &str, output: &Path) -> CompileResult<()> {
  compile(source)?.finalize(output)
}
