//! Declared identifiers, functions and labels for one compilation.
//!
//! There is no scope stack. Loop iterators are inserted before their body and
//! removed after it, which is all the scoping the language has. GOTO targets
//! are only collected here; they are checked against the declared labels once
//! the whole program has been read, so forward jumps work.

use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default)]
pub struct Registry {
  symbols: HashSet<String>,
  functions: HashSet<String>,
  labels_declared: HashSet<String>,
  // Label name -> line of its first GOTO, kept ordered so the reported
  // missing label does not depend on hashing.
  labels_referenced: BTreeMap<String, usize>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_declared(&self, name: &str) -> bool {
    self.symbols.contains(name)
  }

  /// Returns `false` when the name was already declared.
  pub fn declare(&mut self, name: &str) -> bool {
    self.symbols.insert(name.to_string())
  }

  pub fn undeclare(&mut self, name: &str) {
    self.symbols.remove(name);
  }

  pub fn is_function(&self, name: &str) -> bool {
    self.functions.contains(name)
  }

  /// Functions are also ordinary symbols so they can be named in
  /// expressions. Returns `false` if the name is already taken by either.
  pub fn declare_function(&mut self, name: &str) -> bool {
    if self.is_function(name) || self.is_declared(name) {
      return false;
    }
    self.functions.insert(name.to_string());
    self.symbols.insert(name.to_string());
    true
  }

  /// Returns `false` when the label already exists.
  pub fn declare_label(&mut self, name: &str) -> bool {
    self.labels_declared.insert(name.to_string())
  }

  pub fn reference_label(&mut self, name: &str, line: usize) {
    self
      .labels_referenced
      .entry(name.to_string())
      .or_insert(line);
  }

  /// First GOTO target (by name) that was never declared, with the line of
  /// the GOTO that referenced it.
  pub fn undefined_label(&self) -> Option<(&str, usize)> {
    self
      .labels_referenced
      .iter()
      .find(|(name, _)| !self.labels_declared.contains(name.as_str()))
      .map(|(name, line)| (name.as_str(), *line))
  }
}
