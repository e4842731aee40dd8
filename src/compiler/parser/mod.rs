//! Single-token lookahead recursive descent, driving the analyzer and the
//! emitter at grammar action points.
//!
//! Error recovery is panic mode with a single `recovering` flag: a
//! diagnostic is reported only when the flag is clear, and reporting sets
//! it. While recovering, `expect` skips ahead to the expected symbol and
//! `synchronize` skips to a production's follow set; reaching either clears
//! the flag. No diagnostic is ever emitted while the flag is set, which
//! keeps one mistake from cascading.

mod expression_parser;
mod statement_parser;

use super::codegen::CodeGen;
use super::errors::{codes, expected, ErrorSink};
use super::lexer::{Lexer, SymbolKind, Token};
use super::semantics::Semantics;
use super::types::Type;

/// Safe tokens to resynchronize on between declarations.
const DECL_FOLLOW: [SymbolKind; 5] = [
  SymbolKind::Identifier,
  SymbolKind::Constant,
  SymbolKind::Procedure,
  SymbolKind::Function,
  SymbolKind::Begin,
];

pub struct Parser {
  lex: Lexer,
  sink: ErrorSink,
  sem: Semantics,
  gen: CodeGen,
  look: Token,
  prev: Option<Token>,
  recovering: bool,
  loop_exit_labels: Vec<String>,
}

impl Parser {
  pub fn new(mut lex: Lexer, mut sink: ErrorSink, sem: Semantics, gen: CodeGen) -> Self {
    let look = lex.next_token(&mut sink);
    Self {
      lex,
      sink,
      sem,
      gen,
      look,
      prev: None,
      recovering: false,
      loop_exit_labels: Vec::new(),
    }
  }

  /// Hands the sink and the emitter back to the driver after parsing.
  pub fn into_parts(self) -> (ErrorSink, CodeGen) {
    (self.sink, self.gen)
  }

  fn s(&self) -> SymbolKind {
    self.look.kind
  }

  fn advance(&mut self) {
    let next = self.lex.next_token(&mut self.sink);
    self.prev = Some(std::mem::replace(&mut self.look, next));
  }

  /// Consumes the lookahead if it matches, without any diagnostics.
  fn accept(&mut self, kind: SymbolKind) -> bool {
    if self.s() == kind {
      self.advance();
      true
    } else {
      false
    }
  }

  /// Requires `kind`. When already recovering, skips ahead to it instead of
  /// reporting; finding it ends recovery.
  fn expect(&mut self, kind: SymbolKind, code: u16) {
    if self.recovering {
      while self.s() != kind && self.s() != SymbolKind::EndOfProgram {
        self.advance();
      }
      if self.s() == kind {
        self.advance();
        self.recovering = false;
      }
      return;
    }
    if self.s() == kind {
      self.advance();
    } else {
      self.sink.flag_token(&self.look, code);
      self.recovering = true;
    }
  }

  fn expect_sym(&mut self, kind: SymbolKind) {
    self.expect(kind, expected(kind));
  }

  /// Skips to the first token in `follow` (or end of program) and clears
  /// the recovery flag.
  fn synchronize(&mut self, follow: &[SymbolKind]) {
    while self.s() != SymbolKind::EndOfProgram {
      if follow.contains(&self.s()) {
        self.recovering = false;
        return;
      }
      self.advance();
    }
    self.recovering = false;
  }

  /// Reports `code` at the lookahead and enters recovery, unless already
  /// recovering.
  fn flag_here(&mut self, code: u16) {
    if !self.recovering {
      self.sink.flag_token(&self.look, code);
      self.recovering = true;
    }
  }

  /// Reports `code` just past the previous token; reads better for
  /// something-missing errors such as a dropped semicolon.
  fn flag_prev(&mut self, code: u16) {
    if !self.recovering {
      match &self.prev {
        Some(prev) => self.sink.flag(prev.line, prev.column + 1, code),
        None => self.sink.flag_token(&self.look, code),
      }
      self.recovering = true;
    }
  }

  fn flag_at(&mut self, token: &Token, code: u16) {
    if !self.recovering {
      self.sink.flag_token(token, code);
      self.recovering = true;
    }
  }

  fn starts_decl(&self) -> bool {
    matches!(
      self.s(),
      SymbolKind::Identifier | SymbolKind::Constant | SymbolKind::Procedure | SymbolKind::Function
    )
  }

  fn starts_stmt(&self) -> bool {
    matches!(
      self.s(),
      SymbolKind::Identifier
        | SymbolKind::Null
        | SymbolKind::If
        | SymbolKind::While
        | SymbolKind::For
        | SymbolKind::Loop
        | SymbolKind::Begin
        | SymbolKind::Exit
        | SymbolKind::Write
        | SymbolKind::Writeln
        | SymbolKind::Read
        | SymbolKind::Return
    )
  }

  /// The one public entry: parses the whole compilation unit.
  ///
  /// `program id is decls begin stmts end [id] ;`
  pub fn parse_program(&mut self) {
    self.expect_sym(SymbolKind::Program);
    let name_token = (self.s() == SymbolKind::Identifier).then(|| self.look.clone());
    if let Some(token) = &name_token {
      let token = token.clone();
      self.sem.declare_program(token.identifier(), &token, &mut self.sink);
    }
    self.expect_sym(SymbolKind::Identifier);
    if !self.accept(SymbolKind::Is) {
      self.flag_here(expected(SymbolKind::Is));
      self.synchronize(&DECL_FOLLOW);
    }
    self.sem.open_scope();
    self.gen.open_frame();
    let body = self.gen.gen_program_start();
    self.decls();
    self.gen.gen_body_start(&body);
    self.expect_sym(SymbolKind::Begin);
    self.stmt_list(&[SymbolKind::End]);
    self.expect_sym(SymbolKind::End);
    self.match_end_name(name_token.as_ref().map(|t| t.identifier().to_string()));
    self.expect_sym(SymbolKind::Semicolon);
    while self.accept(SymbolKind::Semicolon) {}
    if self.s() != SymbolKind::EndOfProgram {
      self.flag_here(codes::END_OF_PROGRAM_EXPECTED);
    }
    self.gen.gen_program_end();
    self.sem.close_scope_and_dump();
    self.gen.close_scope();
  }

  /// The optional repeated identifier after `end`; must match the unit
  /// name when present.
  fn match_end_name(&mut self, unit_name: Option<String>) {
    if self.s() == SymbolKind::Identifier {
      if let Some(name) = unit_name {
        if self.look.identifier() != name {
          self.flag_here(codes::END_NAME_MISMATCH);
        }
      }
      self.advance();
    }
  }

  fn decls(&mut self) {
    while self.starts_decl() {
      match self.s() {
        SymbolKind::Constant => self.const_decl(),
        SymbolKind::Procedure => self.subprogram_decl(false),
        SymbolKind::Function => self.subprogram_decl(true),
        _ => self.var_decl(),
      }
    }
  }

  /// Collects `id {, id}` and returns the identifier tokens seen.
  fn ident_list(&mut self) -> Vec<Token> {
    let mut names = Vec::new();
    if self.s() == SymbolKind::Identifier {
      names.push(self.look.clone());
    }
    self.expect_sym(SymbolKind::Identifier);
    while self.accept(SymbolKind::Comma) {
      if self.s() == SymbolKind::Identifier {
        names.push(self.look.clone());
      }
      self.expect_sym(SymbolKind::Identifier);
    }
    names
  }

  /// `id {, id} : type [ := expr {, expr} ] ;`
  fn var_decl(&mut self) {
    let names = self.ident_list();
    self.expect_sym(SymbolKind::Colon);
    let ty = self.parse_type();
    for token in &names {
      let token = token.clone();
      self.sem.declare_var(token.identifier(), ty, &token, &mut self.sink);
      self.gen.declare_local(token.identifier());
    }
    if self.accept(SymbolKind::Becomes) {
      self.gen.begin_init();
      let mut index = 0;
      loop {
        let value_ty = self.expr();
        if let Some(token) = names.get(index) {
          let token = token.clone();
          self.sem.check_assignment(token.identifier(), value_ty, &token, &mut self.sink);
          self.gen.gen_store(token.identifier());
        }
        index += 1;
        if !self.accept(SymbolKind::Comma) {
          break;
        }
      }
      self.gen.end_init();
    }
    if !self.accept(SymbolKind::Semicolon) {
      self.flag_prev(expected(SymbolKind::Semicolon));
      self.synchronize(&DECL_FOLLOW);
    }
  }

  /// `constant id {, id} [ : type ] (:=|is) expr {, expr} ;`
  ///
  /// Without a type the first initializer's type is used for every name.
  fn const_decl(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Constant);
    self.advance();
    let names = self.ident_list();
    let mut ty = Type::Unknown;
    let mut declared = false;
    if self.accept(SymbolKind::Colon) {
      ty = self.parse_type();
      self.declare_constants(&names, ty);
      declared = true;
    }
    if !self.accept(SymbolKind::Becomes) && !self.accept(SymbolKind::Is) {
      self.flag_here(expected(SymbolKind::Becomes));
    }
    if self.s() != SymbolKind::Semicolon {
      self.gen.begin_init();
      let mut index = 0;
      loop {
        let value_ty = self.expr();
        if !declared {
          ty = value_ty;
          self.declare_constants(&names, ty);
          declared = true;
        }
        if let Some(token) = names.get(index) {
          let token = token.clone();
          self.sem.check_const_init(token.identifier(), value_ty, &token, &mut self.sink);
          self.gen.gen_store(token.identifier());
        }
        index += 1;
        if !self.accept(SymbolKind::Comma) {
          break;
        }
      }
      self.gen.end_init();
    }
    if !declared {
      self.declare_constants(&names, ty);
    }
    if !self.accept(SymbolKind::Semicolon) {
      self.flag_prev(expected(SymbolKind::Semicolon));
      self.synchronize(&DECL_FOLLOW);
    }
  }

  fn declare_constants(&mut self, names: &[Token], ty: Type) {
    for token in names {
      let token = token.clone();
      self.sem.declare_const(token.identifier(), ty, &token, &mut self.sink);
      self.gen.declare_local(token.identifier());
    }
  }

  /// `procedure id [( params )] is decls begin stmts end [id] ;`
  /// `function id [( params )] return type is decls begin stmts end [id] ;`
  fn subprogram_decl(&mut self, is_function: bool) {
    self.advance();
    let name_token = (self.s() == SymbolKind::Identifier).then(|| self.look.clone());
    let name = name_token
      .as_ref()
      .map(|t| t.identifier().to_string())
      .unwrap_or_default();
    if let Some(token) = &name_token {
      let token = token.clone();
      self.sem.declare_subprogram(token.identifier(), is_function, &token, &mut self.sink);
    }
    self.expect_sym(SymbolKind::Identifier);
    let entry = self.gen.gen_subprogram_start(&name);
    self.sem.open_scope();
    self.gen.open_frame();
    if self.accept(SymbolKind::LeftParen) {
      self.param_list();
      self.expect_sym(SymbolKind::RightParen);
    }
    if is_function {
      self.expect_sym(SymbolKind::Return);
      let return_ty = self.parse_type();
      self.sem.set_function_return(&name, return_ty);
    }
    self.expect_sym(SymbolKind::Is);
    self.decls();
    self.gen.gen_body_start(&entry);
    self.expect_sym(SymbolKind::Begin);
    self.stmt_list(&[SymbolKind::End]);
    self.expect_sym(SymbolKind::End);
    self.match_end_name((!name.is_empty()).then(|| name.clone()));
    self.expect_sym(SymbolKind::Semicolon);
    if is_function {
      self.gen.gen_function_return();
    } else {
      self.gen.gen_procedure_return();
    }
    self.sem.close_scope_and_dump();
    self.gen.close_scope();
  }

  /// `param {; param}` where `param := id {, id} : (value|ref) type`
  fn param_list(&mut self) {
    while self.s() != SymbolKind::RightParen && self.s() != SymbolKind::EndOfProgram {
      let names = self.ident_list();
      self.expect_sym(SymbolKind::Colon);
      if !self.accept(SymbolKind::Value) && !self.accept(SymbolKind::Ref) {
        self.flag_here(codes::PARAM_MODE_EXPECTED);
      }
      let ty = self.parse_type();
      for token in &names {
        let token = token.clone();
        self.sem.declare_param(token.identifier(), ty, &token, &mut self.sink);
        self.gen.declare_local(token.identifier());
      }
      if !self.accept(SymbolKind::Semicolon) {
        break;
      }
    }
  }

  /// `integer | real | string | boolean`
  fn parse_type(&mut self) -> Type {
    if self.accept(SymbolKind::Integer) {
      Type::Integer
    } else if self.accept(SymbolKind::Real) {
      Type::Real
    } else if self.accept(SymbolKind::StringKw) {
      Type::String
    } else if self.accept(SymbolKind::Boolean) {
      Type::Boolean
    } else {
      if !self.recovering {
        self.flag_here(codes::TYPE_NAME_EXPECTED);
        self.advance();
      }
      Type::Unknown
    }
  }
}
