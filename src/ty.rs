use crate::tokenizer::TokenKind;

/// Type names a declaration, cast or FOR iterator may spell out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
  Int,
  Float,
  Double,
  String,
  Bool,
  Auto,
  Array,
}

impl TypeName {
  pub fn from_token(kind: TokenKind) -> Option<Self> {
    let ty = match kind {
      TokenKind::IntT => Self::Int,
      TokenKind::FloatT => Self::Float,
      TokenKind::DoubleT => Self::Double,
      TokenKind::StringT => Self::String,
      TokenKind::BoolT => Self::Bool,
      TokenKind::AutoT => Self::Auto,
      TokenKind::ArrayT => Self::Array,
      _ => return None,
    };
    Some(ty)
  }

  /// Spelling in the generated C++.
  pub fn cpp_name(self) -> &'static str {
    match self {
      Self::Int => "int",
      Self::Float => "float",
      Self::Double => "double",
      Self::String => "std::string",
      Self::Bool => "bool",
      Self::Auto => "auto",
      Self::Array => "std::vector",
    }
  }

  /// Only numeric types may drive a FOR loop.
  pub fn is_numeric(self) -> bool {
    matches!(self, Self::Int | Self::Float | Self::Double)
  }

  pub fn is_auto(self) -> bool {
    matches!(self, Self::Auto)
  }

  pub fn is_array(self) -> bool {
    matches!(self, Self::Array)
  }
}
