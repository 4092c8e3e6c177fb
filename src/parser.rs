//! Recursive-descent parser that generates C++ as it goes.
//!
//! There is no AST. Each grammar rule validates its tokens and appends the
//! matching C++ to the [`Emitter`] in the same pass, so output order is
//! exactly source order. The parser keeps one token of lookahead (`peek`)
//! beyond `current` and never backtracks.
//!
//! ```text
//! program    ::= {nl} {statement}
//! comparison ::= ["NOT"] expression {("==" | "!=" | "<" | "<=" | ">" | ">=" | "AND" | "OR") expression}
//! expression ::= term {("+" | "-" | "+=" | "-=") term} ["++" | "--"]
//! term       ::= unary {("*" | "/") unary}
//! unary      ::= ["+" | "-"] primary
//! primary    ::= number | string | "True" | "False" | "None" | ident [":" expression]
//! ```

use crate::emitter::Emitter;
use crate::error::{CompileError, CompileResult};
use crate::symbols::Registry;
use crate::tokenizer::{Token, TokenKind, Tokenizer, describe_token};
use crate::ty::TypeName;

/// Banner and includes every translation unit starts with.
const PROLOGUE: [&str; 5] = [
  "// Generated by nubbc",
  "#include <iostream>",
  "#include <limits>",
  "#include <string>",
  "#include <vector>\n",
];

/// Whether top-level code runs inside an implicit `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramStyle {
  /// Only global declarations so far.
  Undecided,
  /// Top-level statements are wrapped in `int main()`.
  Script,
  /// The program is made of functions and defines `main` itself.
  Functions,
}

/// Parser state for a single compilation. Nothing here outlives the run.
pub struct Parser<'a> {
  tokenizer: Tokenizer<'a>,
  current: Token<'a>,
  peek: Token<'a>,
  registry: Registry,
  emitter: Emitter,
  /// The previous statement at this nesting level was an IF or ELIF block.
  trailing_if: bool,
  in_function: bool,
  style: ProgramStyle,
  /// Inside `FOR ... THEN`, where `:` separates clauses instead of indexing.
  in_for_header: bool,
}

impl<'a> Parser<'a> {
  /// Prime `current` and `peek` with the first two tokens.
  pub fn new(source: &'a str) -> CompileResult<Self> {
    let mut tokenizer = Tokenizer::new(source);
    let current = tokenizer.next_token()?;
    let peek = tokenizer.next_token()?;
    Ok(Self {
      tokenizer,
      current,
      peek,
      registry: Registry::new(),
      emitter: Emitter::new(),
      trailing_if: false,
      in_function: false,
      style: ProgramStyle::Undecided,
      in_for_header: false,
    })
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub fn emitter(&self) -> &Emitter {
    &self.emitter
  }

  pub fn into_emitter(self) -> Emitter {
    self.emitter
  }

  fn check_token(&self, kind: TokenKind) -> bool {
    self.current.kind == kind
  }

  fn check_peek(&self, kind: TokenKind) -> bool {
    self.peek.kind == kind
  }

  fn next_token(&mut self) -> CompileResult<()> {
    self.current = self.peek;
    self.peek = self.tokenizer.next_token()?;
    Ok(())
  }

  /// Require the current token to be `kind`, consume it and hand it back.
  fn match_token(&mut self, kind: TokenKind) -> CompileResult<Token<'a>> {
    if !self.check_token(kind) {
      return Err(self.syntax_error(format!(
        "Expected {kind}, got {}",
        describe_token(&self.current)
      )));
    }
    let token = self.current;
    self.next_token()?;
    Ok(token)
  }

  fn syntax_error(&self, message: impl Into<String>) -> CompileError {
    CompileError::syntax(self.current.line, message)
  }

  fn semantic_error(&self, message: impl Into<String>) -> CompileError {
    CompileError::semantic(self.current.line, message)
  }

  /// Consume a type name, rejecting anything the language doesn't know.
  fn type_name(&mut self) -> CompileResult<TypeName> {
    let Some(ty) = TypeName::from_token(self.current.kind) else {
      return Err(self.semantic_error(format!(
        "Statement couldn't use type: {}",
        describe_token(&self.current)
      )));
    };
    self.next_token()?;
    Ok(ty)
  }

  /// Consume an identifier that must already be declared.
  fn declared_ident(&mut self, what: &str) -> CompileResult<&'a str> {
    if self.check_token(TokenKind::Ident) && !self.registry.is_declared(self.current.text) {
      return Err(self.semantic_error(format!("{what}: {}", self.current.text)));
    }
    Ok(self.match_token(TokenKind::Ident)?.text)
  }

  /// nl ::= '\n'+
  fn nl(&mut self) -> CompileResult<()> {
    self.match_token(TokenKind::Newline)?;
    while self.check_token(TokenKind::Newline) {
      self.next_token()?;
    }
    Ok(())
  }

  /// program ::= {statement}
  ///
  /// Leading `LET` declarations stay global. The first top-level `FUNCTION`
  /// makes the program function based, and it must define `main` itself.
  /// Any other top-level statement opens an implicit `main` instead, which
  /// also makes the rest of the program a function body for nesting purposes.
  pub fn program(&mut self) -> CompileResult<()> {
    for line in PROLOGUE {
      self.emitter.header_line(line);
    }

    while self.check_token(TokenKind::Newline) {
      self.next_token()?;
    }

    while !self.check_token(TokenKind::Eof) {
      if self.style == ProgramStyle::Undecided {
        match self.current.kind {
          TokenKind::Let => {}
          TokenKind::Function => self.style = ProgramStyle::Functions,
          _ => self.open_entry_point(),
        }
      }
      self.statement()?;
    }

    if self.style == ProgramStyle::Undecided {
      self.open_entry_point();
    }
    if self.style == ProgramStyle::Script {
      self.emitter.emit_line("\treturn 0;");
      self.emitter.emit_line("}");
    }

    if let Some((label, line)) = self.registry.undefined_label() {
      return Err(CompileError::semantic(
        line,
        format!("Attempting to GOTO an undefined label: {label}"),
      ));
    }

    Ok(())
  }

  fn open_entry_point(&mut self) {
    self.emitter.emit_line("int main()");
    self.emitter.emit_line("{");
    self.style = ProgramStyle::Script;
    self.in_function = true;
  }

  fn statement(&mut self) -> CompileResult<()> {
    let chain_open = self.trailing_if;
    let kind = self.current.kind;

    match kind {
      TokenKind::Print => self.print_statement()?,
      TokenKind::If => self.if_statement()?,
      TokenKind::Elif => self.elif_statement(chain_open)?,
      TokenKind::Else => self.else_statement(chain_open)?,
      TokenKind::While => self.while_statement()?,
      TokenKind::For => self.for_statement()?,
      TokenKind::Label => self.label_statement()?,
      TokenKind::Goto => self.goto_statement()?,
      TokenKind::Let => self.let_statement()?,
      TokenKind::Cast => self.cast_statement()?,
      TokenKind::Input => self.input_statement()?,
      TokenKind::AddArray => self.add_statement()?,
      TokenKind::PopArray => self.pop_statement()?,
      TokenKind::Function => self.function_statement()?,
      TokenKind::Call => self.call_statement()?,
      TokenKind::Return => {
        return Err(self.syntax_error(
          "RETURN is only allowed as the last statement of a non-VOID function",
        ));
      }
      _ => {
        return Err(self.syntax_error(format!(
          "Invalid statement at: {}",
          describe_token(&self.current)
        )));
      }
    }

    // Only a statement that just closed an IF/ELIF block may be followed by
    // ELIF or ELSE.
    self.trailing_if = matches!(kind, TokenKind::If | TokenKind::Elif);
    self.nl()
  }

  /// Statements up to and including the closing keyword `end`.
  fn block(&mut self, end: TokenKind) -> CompileResult<()> {
    self.trailing_if = false;
    while !self.check_token(end) {
      if self.check_token(TokenKind::Eof) {
        return Err(self.syntax_error(format!("Expected {end} before end of input")));
      }
      self.statement()?;
    }
    self.match_token(end)?;
    Ok(())
  }

  // "PRINT" (string | expression)
  fn print_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    if self.check_token(TokenKind::Str) {
      self
        .emitter
        .emit_line(&format!("std::cout << \"{}\\n\";", self.current.text));
      self.next_token()?;
    } else {
      self.emitter.emit("std::cout << ");
      self.expression()?;
      self.emitter.emit_line(";");
    }
    Ok(())
  }

  // "IF" comparison "THEN" nl {statement} "ENDIF"
  fn if_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    self.emitter.emit("if (");
    self.conditional_block()
  }

  // "ELIF" comparison "THEN" nl {statement} "ENDIF"
  fn elif_statement(&mut self, chain_open: bool) -> CompileResult<()> {
    if !chain_open {
      return Err(self.semantic_error("Cannot have ELIF statement without trailing IF statement"));
    }
    self.next_token()?;
    self.emitter.emit("else if (");
    self.conditional_block()
  }

  fn conditional_block(&mut self) -> CompileResult<()> {
    self.comparison()?;
    self.match_token(TokenKind::Then)?;
    self.nl()?;
    self.emitter.emit_line(")");
    self.emitter.emit_line("{");
    self.block(TokenKind::Endif)?;
    self.emitter.emit_line("}");
    Ok(())
  }

  // "ELSE" nl {statement} "ENDIF"
  fn else_statement(&mut self, chain_open: bool) -> CompileResult<()> {
    if !chain_open {
      return Err(self.semantic_error("Cannot have ELSE statement without trailing IF statement"));
    }
    self.next_token()?;
    self.emitter.emit_line("else");
    self.emitter.emit_line("{");
    self.nl()?;
    self.block(TokenKind::Endif)?;
    self.emitter.emit_line("}");
    Ok(())
  }

  // "WHILE" comparison "REPEAT" nl {statement} "ENDWHILE"
  fn while_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    self.emitter.emit("while (");
    self.comparison()?;
    self.match_token(TokenKind::Repeat)?;
    self.nl()?;
    self.emitter.emit_line(")");
    self.emitter.emit_line("{");
    self.block(TokenKind::Endwhile)?;
    self.emitter.emit_line("}");
    Ok(())
  }

  // "FOR" type ident ":" comparison ":" expression "THEN" nl {statement} "ENDFOR"
  //
  // The iterator is declared for the header and body only. A name that was
  // already declared outside the loop stays declared afterwards.
  fn for_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;

    let ty_token = self.current;
    let ty = self.type_name()?;
    if !ty.is_numeric() {
      return Err(CompileError::semantic(
        ty_token.line,
        format!("Illegal use of type: '{}' in FOR statement", ty_token.text),
      ));
    }

    let iterator = self.match_token(TokenKind::Ident)?.text;
    let fresh = self.registry.declare(iterator);
    self
      .emitter
      .emit(&format!("for ({} {iterator} {{}}; ", ty.cpp_name()));

    self.match_token(TokenKind::Colon)?;
    self.in_for_header = true;
    self.comparison()?;
    self.emitter.emit("; ");
    self.match_token(TokenKind::Colon)?;
    self.expression()?;
    self.in_for_header = false;
    self.emitter.emit_line(")");

    self.match_token(TokenKind::Then)?;
    self.nl()?;
    self.emitter.emit_line("{");
    self.block(TokenKind::Endfor)?;
    if fresh {
      self.registry.undeclare(iterator);
    }
    self.emitter.emit_line("}");
    Ok(())
  }

  // "LABEL" ident
  fn label_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let token = self.match_token(TokenKind::Ident)?;
    if !self.registry.declare_label(token.text) {
      return Err(CompileError::semantic(
        token.line,
        format!("Redefinition of label: {}", token.text),
      ));
    }
    self.emitter.emit_line(&format!("{}:", token.text));
    Ok(())
  }

  // "GOTO" ident
  fn goto_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let token = self.match_token(TokenKind::Ident)?;
    self.registry.reference_label(token.text, token.line);
    self.emitter.emit_line(&format!("goto {};", token.text));
    Ok(())
  }

  // "LET" [type] ident "=" (expression | {expression ","})
  //
  // Naming an identifier that already exists is an assignment, whether or not
  // a type is given.
  fn let_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;

    let ty = if self.current.kind.is_type_name() {
      Some(self.type_name()?)
    } else {
      None
    };
    let token = self.match_token(TokenKind::Ident)?;
    let name = token.text;
    self.match_token(TokenKind::Eq)?;

    if self.registry.is_declared(name) {
      // An assignment is executable, so it can't stay at global scope.
      if self.style == ProgramStyle::Undecided {
        self.open_entry_point();
      }
      if ty.is_some_and(TypeName::is_array) {
        self.emitter.emit(&format!("{name} = {{ "));
        self.array_elements()?;
        self.emitter.emit_line(" };");
      } else {
        self.emitter.emit(&format!("{name} = "));
        self.expression()?;
        self.emitter.emit_line(";");
      }
      return Ok(());
    }

    let Some(ty) = ty else {
      return Err(CompileError::semantic(
        token.line,
        format!("Variable {name} must be declared with a type before use"),
      ));
    };

    if ty.is_array() {
      // Element type is left to class template argument deduction.
      self.emitter.emit(&format!("std::vector {name} {{ "));
      self.array_elements()?;
    } else {
      self.emitter.emit(&format!("{} {name} {{ ", ty.cpp_name()));
      self.expression()?;
    }
    self.emitter.emit_line(" };");
    self.registry.declare(name);
    Ok(())
  }

  /// Comma-terminated elements up to the end of the line.
  fn array_elements(&mut self) -> CompileResult<()> {
    while !self.check_token(TokenKind::Newline) {
      self.expression()?;
      self.match_token(TokenKind::Comma)?;
      self.emitter.emit(",");
    }
    Ok(())
  }

  // "CAST" ident ":" type
  fn cast_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let name = self.declared_ident("Cannot cast undefined variable")?;
    self.match_token(TokenKind::Colon)?;

    let ty = self.type_name()?;
    if ty.is_auto() || ty.is_array() {
      return Err(CompileError::semantic(
        self.current.line,
        format!("Cannot cast variable {name} to type '{}'", ty.cpp_name()),
      ));
    }
    self
      .emitter
      .emit_line(&format!("static_cast<{}>({name});", ty.cpp_name()));
    Ok(())
  }

  // "INPUT" [type] ident
  //
  // A new identifier is forward-declared in the header with a concrete type.
  // When extraction fails at runtime the stream is reset, the rest of the
  // line discarded and the target set back to its value-initialised default.
  fn input_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;

    let ty_token = self.current;
    let ty = if ty_token.kind.is_type_name() {
      Some(self.type_name()?)
    } else {
      None
    };
    let token = self.match_token(TokenKind::Ident)?;
    let name = token.text;

    if !self.registry.is_declared(name) {
      match ty {
        None => {
          return Err(CompileError::semantic(
            token.line,
            format!("INPUT of new variable {name} needs a type"),
          ));
        }
        Some(ty) if ty.is_auto() || ty.is_array() => {
          return Err(CompileError::semantic(
            ty_token.line,
            format!(
              "Cannot use variable of type '{}' in INPUT: {name}",
              ty_token.text
            ),
          ));
        }
        Some(ty) => {
          self
            .emitter
            .header_line(&format!("{} {name} {{}};", ty.cpp_name()));
          self.registry.declare(name);
        }
      }
    }

    self.emitter.emit_line(&format!("\tstd::cin >> {name};"));
    self.emitter.emit_line("\tif (std::cin.fail())");
    self.emitter.emit_line("\t{");
    self.emitter.emit_line("\t\tstd::cin.clear();");
    self
      .emitter
      .emit_line("\t\tstd::cin.ignore(std::numeric_limits<std::streamsize>::max(), '\\n');");
    self.emitter.emit_line(&format!("\t\t{name} = {{}};"));
    self.emitter.emit_line("\t}");
    Ok(())
  }

  // "ADD" ident ":" expression
  fn add_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let name = self.declared_ident("Cannot add element to undefined array")?;
    self.match_token(TokenKind::Colon)?;
    self.emitter.emit(&format!("{name}.push_back("));
    self.expression()?;
    self.emitter.emit_line(");");
    Ok(())
  }

  // "POP" ident
  fn pop_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let name = self.declared_ident("Cannot pop element from undefined array")?;
    self.emitter.emit_line(&format!("{name}.pop_back();"));
    Ok(())
  }

  // "FUNCTION" ["VOID"] ident ":" nl {statement} ["RETURN" expression nl] "ENDFUNCTION"
  fn function_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let is_void = self.check_token(TokenKind::Void);
    if is_void {
      self.next_token()?;
    }

    let token = self.match_token(TokenKind::Ident)?;
    let name = token.text;
    if self.in_function {
      return Err(CompileError::semantic(
        token.line,
        format!("Cannot nest function {name} inside another function body"),
      ));
    }
    if !self.registry.declare_function(name) {
      return Err(CompileError::semantic(
        token.line,
        format!("Redefinition of function identifier: {name}"),
      ));
    }

    if name == "main" {
      self.emitter.emit_line("int main()");
    } else if is_void {
      self.emitter.emit_line(&format!("void {name}()"));
    } else {
      self.emitter.emit_line(&format!("auto {name}()"));
    }
    self.emitter.emit_line("{");

    self.match_token(TokenKind::Colon)?;
    self.nl()?;
    self.in_function = true;

    if is_void {
      self.block(TokenKind::Endfunction)?;
    } else {
      self.trailing_if = false;
      while !self.check_token(TokenKind::Return) {
        if self.check_token(TokenKind::Endfunction) || self.check_token(TokenKind::Eof) {
          return Err(self.syntax_error(format!(
            "Function {name} must RETURN a value before ENDFUNCTION"
          )));
        }
        self.statement()?;
      }
      self.next_token()?;
      self.emitter.emit("return ");
      self.expression()?;
      self.emitter.emit_line(";");
      self.nl()?;
      self.match_token(TokenKind::Endfunction)?;
    }

    self.emitter.emit_line("}");
    self.in_function = false;
    Ok(())
  }

  // "CALL" ident
  fn call_statement(&mut self) -> CompileResult<()> {
    self.next_token()?;
    let token = self.match_token(TokenKind::Ident)?;
    if !self.registry.is_function(token.text) {
      return Err(CompileError::semantic(
        token.line,
        format!("Cannot call an undefined function: {}", token.text),
      ));
    }
    self.emitter.emit_line(&format!("{}();", token.text));
    Ok(())
  }

  fn comparison(&mut self) -> CompileResult<()> {
    let negated = self.check_token(TokenKind::Not);
    if negated {
      self.emitter.emit("!(");
      self.next_token()?;
    }

    self.expression()?;

    if self.current.kind.is_comparison_operator() {
      while self.current.kind.is_comparison_operator() {
        let op = match self.current.kind {
          TokenKind::And => " && ",
          TokenKind::Or => " || ",
          _ => self.current.text,
        };
        self.emitter.emit(op);
        self.next_token()?;
        self.expression()?;
      }
    } else if !self.check_token(TokenKind::Then) && !self.check_token(TokenKind::Repeat) {
      // A bare operand is only a condition when it closes an IF/ELIF/WHILE
      // header.
      return Err(self.syntax_error(format!(
        "Expected comparison at: {}",
        describe_token(&self.current)
      )));
    }

    if negated {
      self.emitter.emit(")");
    }
    Ok(())
  }

  fn expression(&mut self) -> CompileResult<()> {
    self.term()?;
    while matches!(
      self.current.kind,
      TokenKind::Plus | TokenKind::Minus | TokenKind::PlusEq | TokenKind::MinusEq
    ) {
      self.emitter.emit(self.current.text);
      self.next_token()?;
      self.term()?;
    }

    if matches!(
      self.current.kind,
      TokenKind::PlusPlus | TokenKind::MinusMinus
    ) {
      self.emitter.emit(self.current.text);
      self.next_token()?;
    }
    Ok(())
  }

  fn term(&mut self) -> CompileResult<()> {
    self.unary()?;
    while matches!(self.current.kind, TokenKind::Asterisk | TokenKind::Slash) {
      self.emitter.emit(self.current.text);
      self.next_token()?;
      self.unary()?;
    }
    Ok(())
  }

  fn unary(&mut self) -> CompileResult<()> {
    if matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
      self.emitter.emit(self.current.text);
      self.next_token()?;
    }
    self.primary()
  }

  fn primary(&mut self) -> CompileResult<()> {
    match self.current.kind {
      TokenKind::Number => self.emitter.emit(self.current.text),
      TokenKind::True => self.emitter.emit("true"),
      TokenKind::False => self.emitter.emit("false"),
      TokenKind::None => self.emitter.emit("NULL"),
      TokenKind::Str => self.emitter.emit(&format!("\"{}\"", self.current.text)),
      TokenKind::Ident => {
        let name = self.current.text;
        if !self.registry.is_declared(name) {
          return Err(self.semantic_error(format!(
            "Referencing variable before assignment: {name}"
          )));
        }
        self.emitter.emit(name);

        // `items : i` indexes into an array.
        if self.check_peek(TokenKind::Colon) && !self.in_for_header {
          self.next_token()?;
          self.next_token()?;
          self.emitter.emit("[");
          self.expression()?;
          self.emitter.emit("]");
          return Ok(());
        }
      }
      _ => {
        return Err(self.syntax_error(format!(
          "Unexpected primary token at: {}",
          describe_token(&self.current)
        )));
      }
    }
    self.next_token()
  }
}
