use super::*;

/// Safe tokens after a botched statement.
const STMT_FOLLOW: [SymbolKind; 5] = [
  SymbolKind::Semicolon,
  SymbolKind::End,
  SymbolKind::Else,
  SymbolKind::Elsif,
  SymbolKind::Loop,
];

impl Parser {
  /// Parses statements until a follower is seen. Extra semicolons between
  /// statements are legal and consumed silently.
  pub(super) fn stmt_list(&mut self, followers: &[SymbolKind]) {
    loop {
      while self.s() == SymbolKind::Semicolon {
        self.advance();
      }
      if followers.contains(&self.s()) || self.s() == SymbolKind::EndOfProgram {
        break;
      }
      if !self.starts_stmt() {
        self.flag_here(codes::STATEMENT_EXPECTED);
        let mut follow: Vec<SymbolKind> = followers.to_vec();
        follow.extend_from_slice(&STMT_FOLLOW);
        self.synchronize(&follow);
        if followers.contains(&self.s()) || self.s() == SymbolKind::EndOfProgram {
          break;
        }
        if !self.starts_stmt() && self.s() != SymbolKind::Semicolon {
          break;
        }
        continue;
      }
      self.stmt();
    }
  }

  fn stmt(&mut self) {
    match self.s() {
      SymbolKind::Identifier => self.assign_or_call(),
      SymbolKind::Null => {
        self.advance();
        self.expect_sym(SymbolKind::Semicolon);
      }
      SymbolKind::If => self.if_stmt(),
      SymbolKind::While => self.while_stmt(),
      SymbolKind::For => self.for_stmt(),
      SymbolKind::Loop => self.loop_stmt(),
      SymbolKind::Begin => {
        self.block_stmt();
        self.expect_sym(SymbolKind::Semicolon);
      }
      SymbolKind::Exit => self.exit_stmt(),
      SymbolKind::Write => self.write_stmt(),
      SymbolKind::Writeln => self.writeln_stmt(),
      SymbolKind::Read => self.read_stmt(),
      SymbolKind::Return => self.return_stmt(),
      _ => unreachable!("stmt() called on a non-statement token"),
    }
  }

  /// `id := expr ;` or `id [( args )] ;` (a call).
  fn assign_or_call(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Identifier);
    let id_token = self.look.clone();
    self.advance();
    match self.s() {
      SymbolKind::Becomes => {
        self.advance();
        let value_ty = self.expr();
        let id = id_token.clone();
        self.sem.check_assignment(id.identifier(), value_ty, &id, &mut self.sink);
        self.gen.gen_store(id.identifier());
        self.expect_sym(SymbolKind::Semicolon);
      }
      SymbolKind::LeftParen => {
        self.advance();
        self.gen.gen_call_start();
        if self.s() != SymbolKind::RightParen {
          self.expr();
          while self.accept(SymbolKind::Comma) {
            self.expr();
          }
        }
        self.expect_sym(SymbolKind::RightParen);
        self.gen.gen_call(id_token.identifier());
        let id = id_token.clone();
        let _ = self.sem.lookup_type(id.identifier(), &id, &mut self.sink);
        self.expect_sym(SymbolKind::Semicolon);
      }
      _ => {
        // a bare identifier statement is a parameterless call
        self.gen.gen_call_start();
        self.gen.gen_call(id_token.identifier());
        let id = id_token.clone();
        let _ = self.sem.lookup_type(id.identifier(), &id, &mut self.sink);
        self.expect_sym(SymbolKind::Semicolon);
      }
    }
  }

  /// `if expr then stmts {elsif expr then stmts} [else stmts] end [if] ;`
  fn if_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::If);
    self.advance();
    let else_label = self.gen.new_label();
    let end_label = self.gen.new_label();
    self.condition();
    self.gen.gen_jump_false(&else_label);
    self.expect_sym(SymbolKind::Then);
    let followers = [SymbolKind::Elsif, SymbolKind::Else, SymbolKind::End];
    self.stmt_list(&followers);
    self.gen.gen_jump(&end_label);
    self.gen.place_label(&else_label);
    while self.accept(SymbolKind::Elsif) {
      let next_else = self.gen.new_label();
      self.condition();
      self.gen.gen_jump_false(&next_else);
      self.expect_sym(SymbolKind::Then);
      self.stmt_list(&followers);
      self.gen.gen_jump(&end_label);
      self.gen.place_label(&next_else);
    }
    if self.accept(SymbolKind::Else) {
      self.stmt_list(&[SymbolKind::End]);
    }
    self.gen.place_label(&end_label);
    self.expect_sym(SymbolKind::End);
    if self.s() == SymbolKind::If {
      self.advance();
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// Parses a condition expression and requires it boolean.
  fn condition(&mut self) {
    let where_token = self.look.clone();
    let ty = self.expr();
    self.sem.require_boolean(ty, &where_token, &mut self.sink);
  }

  /// `while expr loop stmts end [loop] ;`
  fn while_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::While);
    self.advance();
    let start_label = self.gen.new_label();
    let end_label = self.gen.new_label();
    self.gen.place_label(&start_label);
    self.loop_exit_labels.push(end_label.clone());
    self.condition();
    self.gen.gen_jump_false(&end_label);
    self.expect_sym(SymbolKind::Loop);
    self.stmt_list(&[SymbolKind::End]);
    self.gen.gen_jump(&start_label);
    self.gen.place_label(&end_label);
    self.loop_exit_labels.pop();
    self.expect_sym(SymbolKind::End);
    if self.s() == SymbolKind::Loop {
      self.advance();
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// `for id in [reverse] simple_expr .. simple_expr loop stmts end [loop] ;`
  ///
  /// The index is implicitly an integer, lives in its own scope, and is not
  /// assignable inside the body.
  fn for_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::For);
    self.advance();
    let index_token = (self.s() == SymbolKind::Identifier).then(|| self.look.clone());
    self.expect_sym(SymbolKind::Identifier);
    self.sem.open_scope();
    self.gen.open_scope();
    let index_name = match &index_token {
      Some(token) => {
        let token = token.clone();
        self.sem.declare_loop_index(token.identifier(), &token, &mut self.sink);
        self.gen.declare_local(token.identifier());
        token.identifier().to_string()
      }
      None => String::new(),
    };
    self.expect_sym(SymbolKind::In);
    let reverse = self.accept(SymbolKind::Reverse);
    self.simple_expr();
    self.expect_sym(SymbolKind::Range);
    self.simple_expr();
    let start_label = self.gen.new_label();
    let end_label = self.gen.new_label();
    self.gen.gen_for_init(&index_name, reverse);
    self.gen.place_label(&start_label);
    self.gen.gen_for_test(&end_label);
    self.loop_exit_labels.push(end_label.clone());
    self.expect_sym(SymbolKind::Loop);
    self.stmt_list(&[SymbolKind::End]);
    self.gen.gen_for_step();
    self.gen.gen_jump(&start_label);
    self.gen.place_label(&end_label);
    self.gen.gen_for_end();
    self.loop_exit_labels.pop();
    self.sem.close_scope_and_dump();
    self.gen.close_scope();
    self.expect_sym(SymbolKind::End);
    if self.s() == SymbolKind::Loop {
      self.advance();
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// `loop stmts end [loop] ;` is infinite; leaving it takes an `exit`.
  fn loop_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Loop);
    self.advance();
    let start_label = self.gen.new_label();
    let end_label = self.gen.new_label();
    self.gen.place_label(&start_label);
    self.loop_exit_labels.push(end_label.clone());
    self.stmt_list(&[SymbolKind::End]);
    self.gen.gen_jump(&start_label);
    self.gen.place_label(&end_label);
    self.loop_exit_labels.pop();
    self.expect_sym(SymbolKind::End);
    if self.s() == SymbolKind::Loop {
      self.advance();
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// `begin stmts end` as a statement, with its own scope.
  fn block_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Begin);
    self.advance();
    self.sem.open_scope();
    self.gen.open_scope();
    self.stmt_list(&[SymbolKind::End]);
    self.sem.close_scope_and_dump();
    self.gen.close_scope();
    self.expect_sym(SymbolKind::End);
  }

  /// `exit [when expr] ;`
  fn exit_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Exit);
    let exit_token = self.look.clone();
    self.advance();
    if self.loop_exit_labels.is_empty() {
      self.flag_at(&exit_token, codes::EXIT_OUTSIDE_LOOP);
    }
    let exit_label = self.loop_exit_labels.last().cloned();
    if self.accept(SymbolKind::When) {
      self.condition();
      if let Some(label) = &exit_label {
        self.gen.gen_jump_true(label);
      }
    } else if let Some(label) = &exit_label {
      self.gen.gen_jump(label);
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// `write [(] expr {, expr} [)] ;`
  fn write_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Write);
    self.advance();
    let had_paren = self.accept(SymbolKind::LeftParen);
    if self.s() != SymbolKind::RightParen && self.s() != SymbolKind::Semicolon {
      self.expr();
      self.gen.gen_write();
      while self.accept(SymbolKind::Comma) {
        self.expr();
        self.gen.gen_write();
      }
    }
    if had_paren {
      self.expect_sym(SymbolKind::RightParen);
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// `writeln [ [(] expr {, expr} [)] ] ;` where the bare form just ends the
  /// output line.
  fn writeln_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Writeln);
    self.advance();
    if self.s() == SymbolKind::Semicolon {
      self.gen.gen_writeln();
      self.expect_sym(SymbolKind::Semicolon);
      return;
    }
    let had_paren = self.accept(SymbolKind::LeftParen);
    if self.s() != SymbolKind::RightParen && self.s() != SymbolKind::Semicolon {
      self.expr();
      self.gen.gen_write();
      while self.accept(SymbolKind::Comma) {
        self.expr();
        self.gen.gen_write();
      }
    }
    if had_paren {
      self.expect_sym(SymbolKind::RightParen);
    }
    self.gen.gen_writeln();
    self.expect_sym(SymbolKind::Semicolon);
  }

  /// `read [(] id {, id} [)] ;`
  fn read_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Read);
    self.advance();
    let had_paren = self.accept(SymbolKind::LeftParen);
    self.read_target();
    while self.accept(SymbolKind::Comma) {
      self.read_target();
    }
    if had_paren {
      self.expect_sym(SymbolKind::RightParen);
    }
    self.expect_sym(SymbolKind::Semicolon);
  }

  fn read_target(&mut self) {
    if self.s() == SymbolKind::Identifier {
      let id = self.look.clone();
      let ty = self.sem.lookup_type(id.identifier(), &id, &mut self.sink);
      self.gen.gen_read(id.identifier(), ty);
    }
    self.expect_sym(SymbolKind::Identifier);
  }

  /// `return [expr] ;`
  fn return_stmt(&mut self) {
    debug_assert_eq!(self.s(), SymbolKind::Return);
    self.advance();
    if self.s() != SymbolKind::Semicolon {
      self.expr();
      self.gen.gen_function_return();
    } else {
      self.gen.gen_procedure_return();
    }
    self.expect_sym(SymbolKind::Semicolon);
  }
}
