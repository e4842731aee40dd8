use super::*;

impl Parser {
  /// `expr := simple_expr [ relop simple_expr ]`
  pub(super) fn expr(&mut self) -> Type {
    let left = self.simple_expr();
    match self.s() {
      SymbolKind::Equals
      | SymbolKind::NotEquals
      | SymbolKind::LessThan
      | SymbolKind::LessOrEqual
      | SymbolKind::GreaterThan
      | SymbolKind::GreaterOrEqual => {
        let op_token = self.look.clone();
        let op = self.s();
        self.advance();
        let right = self.simple_expr();
        self.gen.gen_binary_operator(op);
        self.sem.check_binary(left, op, right, &op_token, &mut self.sink)
      }
      _ => left,
    }
  }

  /// `simple_expr := [+|-] term { (+|-|or|&) term }`
  pub(super) fn simple_expr(&mut self) -> Type {
    let mut leading = None;
    if matches!(self.s(), SymbolKind::Plus | SymbolKind::Minus) {
      leading = Some((self.s(), self.look.clone()));
      self.advance();
    }
    let mut result = self.term();
    if let Some((op, op_token)) = leading {
      result = self.sem.check_unary(op, result, &op_token, &mut self.sink);
      if op == SymbolKind::Minus {
        self.gen.gen_negate();
      }
    }
    while matches!(
      self.s(),
      SymbolKind::Plus | SymbolKind::Minus | SymbolKind::Or | SymbolKind::Ampersand
    ) {
      let op_token = self.look.clone();
      let op = self.s();
      self.advance();
      let right = self.term();
      self.gen.gen_binary_operator(op);
      result = self.sem.check_binary(result, op, right, &op_token, &mut self.sink);
    }
    result
  }

  /// `term := factor { (*|/|and) factor }`
  fn term(&mut self) -> Type {
    let mut result = self.factor();
    while matches!(self.s(), SymbolKind::Asterisk | SymbolKind::Slash | SymbolKind::And) {
      let op_token = self.look.clone();
      let op = self.s();
      self.advance();
      let right = self.factor();
      self.gen.gen_binary_operator(op);
      result = self.sem.check_binary(result, op, right, &op_token, &mut self.sink);
    }
    result
  }

  /// `factor := [+|-|not|odd] primary [ ** primary ]`
  ///
  /// The unary applies to the whole power, so `-2 ** 3` negates `2 ** 3`.
  fn factor(&mut self) -> Type {
    let mut unary = None;
    if matches!(
      self.s(),
      SymbolKind::Plus | SymbolKind::Minus | SymbolKind::Not | SymbolKind::Odd
    ) {
      unary = Some((self.s(), self.look.clone()));
      self.advance();
    }
    let mut result = self.primary();
    if self.s() == SymbolKind::Power {
      let op_token = self.look.clone();
      self.advance();
      let exponent = self.primary();
      self.gen.gen_binary_operator(SymbolKind::Power);
      result = self
        .sem
        .check_binary(result, SymbolKind::Power, exponent, &op_token, &mut self.sink);
    }
    if let Some((op, op_token)) = unary {
      match op {
        SymbolKind::Odd => self.gen.gen_odd(),
        SymbolKind::Not => self.gen.gen_not(),
        SymbolKind::Minus => self.gen.gen_negate(),
        _ => {}
      }
      result = self.sem.check_unary(op, result, &op_token, &mut self.sink);
    }
    result
  }

  /// `primary := id [( args )] | int | real | string | true | false | ( expr )`
  fn primary(&mut self) -> Type {
    match self.s() {
      SymbolKind::Identifier => {
        let id_token = self.look.clone();
        self.advance();
        if self.accept(SymbolKind::LeftParen) {
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
          self.sem.lookup_type(id.identifier(), &id, &mut self.sink)
        } else {
          self.gen.gen_load(id_token.identifier());
          let id = id_token.clone();
          self.sem.lookup_type(id.identifier(), &id, &mut self.sink)
        }
      }
      SymbolKind::IntLit => {
        let value = self.look.int_value();
        self.advance();
        self.gen.gen_load_int(value);
        Type::Integer
      }
      SymbolKind::RealLit => {
        let value = self.look.real_value();
        self.advance();
        self.gen.gen_load_real(value);
        Type::Real
      }
      SymbolKind::StrLit => {
        let value = self.look.string_value().to_string();
        self.advance();
        self.gen.gen_load_string(&value);
        Type::String
      }
      SymbolKind::True => {
        self.advance();
        self.gen.gen_load_bool(true);
        Type::Boolean
      }
      SymbolKind::False => {
        self.advance();
        self.gen.gen_load_bool(false);
        Type::Boolean
      }
      SymbolKind::LeftParen => {
        self.advance();
        let inner = self.expr();
        self.expect_sym(SymbolKind::RightParen);
        inner
      }
      // natural expression boundaries: let the caller's expect() report
      SymbolKind::Semicolon
      | SymbolKind::RightParen
      | SymbolKind::End
      | SymbolKind::Else
      | SymbolKind::Elsif
      | SymbolKind::Then
      | SymbolKind::EndOfProgram => Type::Unknown,
      _ => {
        if !self.recovering {
          self.flag_here(expected(SymbolKind::Identifier));
          self.advance();
        }
        Type::Unknown
      }
    }
  }
}
