//! Lexical analysis: turns Nubb++ source text into tokens on demand.
//!
//! The tokenizer is lazy. The parser pulls one token at a time with
//! [`Tokenizer::next_token`] and never rewinds. Newlines are significant and
//! come back as their own tokens; spaces, tabs, carriage returns and `#`
//! comments are skipped. Two-character operators are recognised with one
//! character of lookahead on top of the current character.

use std::fmt;

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Eof,
  Newline,
  Number,
  Ident,
  Str,
  // Keywords.
  Label,
  Goto,
  Print,
  Input,
  Let,
  Cast,
  If,
  Then,
  Elif,
  Else,
  Endif,
  While,
  Repeat,
  Endwhile,
  For,
  Endfor,
  AddArray,
  PopArray,
  Function,
  Void,
  Endfunction,
  Return,
  Call,
  // Operators.
  Eq,
  Plus,
  PlusPlus,
  PlusEq,
  Minus,
  MinusMinus,
  MinusEq,
  Asterisk,
  Slash,
  EqEq,
  NotEq,
  Lt,
  LtEq,
  Gt,
  GtEq,
  // Logical operators.
  Or,
  And,
  Not,
  // Literal values.
  True,
  False,
  None,
  // Type names.
  IntT,
  FloatT,
  DoubleT,
  StringT,
  BoolT,
  AutoT,
  ArrayT,
  // Punctuation.
  Colon,
  Comma,
}

impl TokenKind {
  /// Exact, case-sensitive lookup of reserved words. Anything else is an
  /// identifier.
  pub fn keyword(text: &str) -> Option<Self> {
    let kind = match text {
      "LABEL" => Self::Label,
      "GOTO" => Self::Goto,
      "PRINT" => Self::Print,
      "INPUT" => Self::Input,
      "LET" => Self::Let,
      "CAST" => Self::Cast,
      "IF" => Self::If,
      "THEN" => Self::Then,
      "ELIF" => Self::Elif,
      "ELSE" => Self::Else,
      "ENDIF" => Self::Endif,
      "WHILE" => Self::While,
      "REPEAT" => Self::Repeat,
      "ENDWHILE" => Self::Endwhile,
      "FOR" => Self::For,
      "ENDFOR" => Self::Endfor,
      "ADD" => Self::AddArray,
      "POP" => Self::PopArray,
      "FUNCTION" => Self::Function,
      "VOID" => Self::Void,
      "ENDFUNCTION" => Self::Endfunction,
      "RETURN" => Self::Return,
      "CALL" => Self::Call,
      "OR" => Self::Or,
      "AND" => Self::And,
      "NOT" => Self::Not,
      "True" => Self::True,
      "False" => Self::False,
      "None" => Self::None,
      "int" => Self::IntT,
      "float" => Self::FloatT,
      "double" => Self::DoubleT,
      "string" => Self::StringT,
      "bool" => Self::BoolT,
      "auto" => Self::AutoT,
      "array" => Self::ArrayT,
      _ => return None,
    };
    Some(kind)
  }

  pub fn is_type_name(self) -> bool {
    matches!(
      self,
      Self::IntT
        | Self::FloatT
        | Self::DoubleT
        | Self::StringT
        | Self::BoolT
        | Self::AutoT
        | Self::ArrayT
    )
  }

  /// Operators allowed between the operands of a comparison.
  pub fn is_comparison_operator(self) -> bool {
    matches!(
      self,
      Self::EqEq
        | Self::NotEq
        | Self::Lt
        | Self::LtEq
        | Self::Gt
        | Self::GtEq
        | Self::Or
        | Self::And
    )
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::Eof => "end of input",
      Self::Newline => "newline",
      Self::Number => "number",
      Self::Ident => "identifier",
      Self::Str => "string",
      Self::Label => "LABEL",
      Self::Goto => "GOTO",
      Self::Print => "PRINT",
      Self::Input => "INPUT",
      Self::Let => "LET",
      Self::Cast => "CAST",
      Self::If => "IF",
      Self::Then => "THEN",
      Self::Elif => "ELIF",
      Self::Else => "ELSE",
      Self::Endif => "ENDIF",
      Self::While => "WHILE",
      Self::Repeat => "REPEAT",
      Self::Endwhile => "ENDWHILE",
      Self::For => "FOR",
      Self::Endfor => "ENDFOR",
      Self::AddArray => "ADD",
      Self::PopArray => "POP",
      Self::Function => "FUNCTION",
      Self::Void => "VOID",
      Self::Endfunction => "ENDFUNCTION",
      Self::Return => "RETURN",
      Self::Call => "CALL",
      Self::Eq => "=",
      Self::Plus => "+",
      Self::PlusPlus => "++",
      Self::PlusEq => "+=",
      Self::Minus => "-",
      Self::MinusMinus => "--",
      Self::MinusEq => "-=",
      Self::Asterisk => "*",
      Self::Slash => "/",
      Self::EqEq => "==",
      Self::NotEq => "!=",
      Self::Lt => "<",
      Self::LtEq => "<=",
      Self::Gt => ">",
      Self::GtEq => ">=",
      Self::Or => "OR",
      Self::And => "AND",
      Self::Not => "NOT",
      Self::True => "True",
      Self::False => "False",
      Self::None => "None",
      Self::IntT => "int",
      Self::FloatT => "float",
      Self::DoubleT => "double",
      Self::StringT => "string",
      Self::BoolT => "bool",
      Self::AutoT => "auto",
      Self::ArrayT => "array",
      Self::Colon => ":",
      Self::Comma => ",",
    };
    f.write_str(name)
  }
}

/// A lexeme borrowed from the source. String literals exclude their quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
  pub kind: TokenKind,
  pub text: &'a str,
  pub line: usize,
}

impl<'a> Token<'a> {
  pub fn new(kind: TokenKind, text: &'a str, line: usize) -> Self {
    Self { kind, text, line }
  }
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: &Token<'_>) -> String {
  match token.kind {
    TokenKind::Eof | TokenKind::Newline => token.kind.to_string(),
    TokenKind::Str => format!("\"{}\"", token.text),
    _ => token.text.to_string(),
  }
}

/// Character-level position in the source.
///
/// `current` is the character at `pos`, or `None` once the source is
/// exhausted. Position only ever moves forward.
#[derive(Debug, Clone)]
struct Cursor<'a> {
  source: &'a str,
  pos: usize,
  current: Option<char>,
  line: usize,
}

impl<'a> Cursor<'a> {
  fn new(source: &'a str) -> Self {
    Self {
      source,
      pos: 0,
      current: source.chars().next(),
      line: 1,
    }
  }

  fn bump(&mut self) {
    let Some(c) = self.current else {
      return;
    };
    if c == '\n' {
      self.line += 1;
    }
    self.pos += c.len_utf8();
    self.current = self.source.get(self.pos..).and_then(|rest| rest.chars().next());
  }

  fn peek(&self) -> Option<char> {
    let c = self.current?;
    self
      .source
      .get(self.pos + c.len_utf8()..)
      .and_then(|rest| rest.chars().next())
  }

  fn slice(&self, start: usize) -> &'a str {
    self.source.get(start..self.pos).unwrap_or_default()
  }
}

/// Pull-based tokenizer over a single source string.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
  cursor: Cursor<'a>,
  // The source always behaves as if it ended in a newline, so the last
  // statement is terminated even when the file is not.
  terminated: bool,
}

impl<'a> Tokenizer<'a> {
  pub fn new(source: &'a str) -> Self {
    Self {
      cursor: Cursor::new(source),
      terminated: source.ends_with('\n'),
    }
  }

  fn skip_whitespace(&mut self) {
    while matches!(self.cursor.current, Some(' ' | '\t' | '\r')) {
      self.cursor.bump();
    }
  }

  fn skip_comment(&mut self) {
    if self.cursor.current == Some('#') {
      while !matches!(self.cursor.current, Some('\n') | None) {
        self.cursor.bump();
      }
    }
  }

  /// Consume a one-character operator, or its two-character form when the
  /// following character matches one of `pairs`.
  fn operator(&mut self, pairs: &[(char, TokenKind)], single: TokenKind) -> TokenKind {
    let next = self.cursor.peek();
    let kind = pairs
      .iter()
      .find(|(second, _)| Some(*second) == next)
      .map(|&(_, kind)| kind);
    self.cursor.bump();
    match kind {
      Some(kind) => {
        self.cursor.bump();
        kind
      }
      None => single,
    }
  }

  /// Lex one token, advancing past it. Once the input is exhausted every
  /// further call returns `Eof`.
  pub fn next_token(&mut self) -> CompileResult<Token<'a>> {
    self.skip_whitespace();
    self.skip_comment();

    let line = self.cursor.line;
    let start = self.cursor.pos;

    let Some(c) = self.cursor.current else {
      if !self.terminated {
        self.terminated = true;
        return Ok(Token::new(TokenKind::Newline, "\n", line));
      }
      return Ok(Token::new(TokenKind::Eof, "", line));
    };

    let kind = match c {
      '+' => self.operator(
        &[('=', TokenKind::PlusEq), ('+', TokenKind::PlusPlus)],
        TokenKind::Plus,
      ),
      '-' => self.operator(
        &[('=', TokenKind::MinusEq), ('-', TokenKind::MinusMinus)],
        TokenKind::Minus,
      ),
      '=' => self.operator(&[('=', TokenKind::EqEq)], TokenKind::Eq),
      '<' => self.operator(&[('=', TokenKind::LtEq)], TokenKind::Lt),
      '>' => self.operator(&[('=', TokenKind::GtEq)], TokenKind::Gt),
      '!' => {
        if self.cursor.peek() != Some('=') {
          return Err(CompileError::lexical(
            line,
            "Expected token != but got a lone '!' (logical NOT is spelled NOT)",
          ));
        }
        self.cursor.bump();
        self.cursor.bump();
        TokenKind::NotEq
      }
      '*' | '/' | ':' | ',' | '\n' => {
        self.cursor.bump();
        match c {
          '*' => TokenKind::Asterisk,
          '/' => TokenKind::Slash,
          ':' => TokenKind::Colon,
          ',' => TokenKind::Comma,
          _ => TokenKind::Newline,
        }
      }
      '"' => return self.string(line),
      c if c.is_ascii_digit() => {
        self.number(line)?;
        TokenKind::Number
      }
      c if c.is_ascii_alphabetic() => {
        while self.cursor.current.is_some_and(|c| c.is_ascii_alphanumeric()) {
          self.cursor.bump();
        }
        TokenKind::keyword(self.cursor.slice(start)).unwrap_or(TokenKind::Ident)
      }
      other => {
        return Err(CompileError::lexical(line, format!("Unknown token: {other:?}")));
      }
    };

    Ok(Token::new(kind, self.cursor.slice(start), line))
  }

  fn string(&mut self, line: usize) -> CompileResult<Token<'a>> {
    self.cursor.bump();
    let start = self.cursor.pos;
    loop {
      match self.cursor.current {
        Some('"') => break,
        Some('\n') | None => {
          return Err(CompileError::lexical(
            line,
            "Illegal character found in string: unterminated string literal",
          ));
        }
        Some(c @ ('\r' | '\t' | '\\' | '%')) => {
          return Err(CompileError::lexical(
            line,
            format!("Illegal character found in string: {c:?}"),
          ));
        }
        Some(_) => self.cursor.bump(),
      }
    }
    let text = self.cursor.slice(start);
    self.cursor.bump();
    Ok(Token::new(TokenKind::Str, text, line))
  }

  fn number(&mut self, line: usize) -> CompileResult<()> {
    while self.cursor.current.is_some_and(|c| c.is_ascii_digit()) {
      self.cursor.bump();
    }
    if self.cursor.current == Some('.') {
      self.cursor.bump();
      if !self.cursor.current.is_some_and(|c| c.is_ascii_digit()) {
        let got = self
          .cursor
          .current
          .map_or_else(|| "end of input".to_string(), |c| format!("{c:?}"));
        return Err(CompileError::lexical(
          line,
          format!("Illegal character in number: expected a digit after '.', got {got}"),
        ));
      }
      while self.cursor.current.is_some_and(|c| c.is_ascii_digit()) {
        self.cursor.bump();
      }
    }
    Ok(())
  }
}

/// Lex the whole input into a vector terminated by a single `Eof` token.
pub fn tokenize(source: &str) -> CompileResult<Vec<Token<'_>>> {
  let mut tokenizer = Tokenizer::new(source);
  let mut tokens = Vec::new();
  loop {
    let token = tokenizer.next_token()?;
    tokens.push(token);
    if token.kind == TokenKind::Eof {
      return Ok(tokens);
    }
  }
}
